use crate::helpers::cli_runner::CliRunner;

#[test]
fn help_lists_every_subcommand() {
    let cli = CliRunner::new();
    let res = cli.run(&["--help"]);
    assert_eq!(res.exit_code, 0);
    for cmd in ["cfg", "rng", "board", "highlow", "gacha", "sim"] {
        assert!(res.stdout.contains(cmd), "help is missing {cmd}");
    }
}

#[test]
fn unknown_subcommand_exits_2_with_usage() {
    let cli = CliRunner::new();
    let res = cli.run(&["blackjack"]);
    assert_eq!(res.exit_code, 2);
    assert!(res.stdout.is_empty());
    assert!(res.stderr.contains("Usage: popcorn <command> [options]"));
    assert!(res.stderr.contains("  highlow"));
}

#[test]
fn rng_is_reproducible() {
    let cli = CliRunner::new();
    let a = cli.run(&["rng", "--seed", "99"]);
    let b = cli.run(&["rng", "--seed", "99"]);
    assert_eq!(a.exit_code, 0);
    assert_eq!(a.stdout, b.stdout);
    assert!(a.stdout.contains("seed: 99"));
}

#[test]
fn board_prints_rows_of_seven() {
    let cli = CliRunner::new();
    let res = cli.run(&["board", "--seed", "7"]);
    assert_eq!(res.exit_code, 0);

    let mut lines = res.stdout.lines();
    assert_eq!(lines.next(), Some("board: pairs=21 seed=7"));
    let rows: Vec<&str> = lines.collect();
    assert_eq!(rows.len(), 6);
    for row in &rows {
        assert_eq!(row.split_whitespace().count(), 7);
    }
    assert_eq!(res.stdout, cli.run(&["board", "--seed", "7"]).stdout);
}

#[test]
fn board_rejects_bad_pair_counts() {
    let cli = CliRunner::new();
    let res = cli.run(&["board", "--pairs", "40"]);
    assert_eq!(res.exit_code, 2);
    assert!(res.stderr.starts_with("Error: Invalid input: pairs must be between 1 and 21"));

    let res = cli.run(&["board", "--pairs", "many"]);
    assert_eq!(res.exit_code, 2);
    assert!(res.stderr.contains("invalid value 'many'"));
}

use crate::helpers::cli_runner::CliRunner;

fn final_balance(stdout: &str) -> u64 {
    stdout
        .lines()
        .find_map(|l| l.strip_prefix("Final balance: "))
        .and_then(|v| v.trim().parse().ok())
        .expect("final balance line")
}

#[test]
fn a_round_moves_the_balance_by_the_bet() {
    let cli = CliRunner::new();
    let res = cli.run_with_input(&["highlow", "--seed", "12", "--balance", "100"], "25\n2\nb\nn\n");
    assert_eq!(res.exit_code, 0, "stderr: {}", res.stderr);
    assert!(res.stdout.starts_with("highlow: seed=12 balance=100"));
    assert!(res.stdout.contains("Cards: [0] [1] [2] [3] [4] [5] [6]"));
    assert!(res.stdout.contains("Rounds played: 1"));

    let balance = final_balance(&res.stdout);
    let result = res
        .stdout
        .lines()
        .find_map(|l| l.split("Result: ").nth(1))
        .expect("result line")
        .to_string();
    let expected = match result.as_str() {
        "win" => 125,
        "lose" => 75,
        _ => 100,
    };
    assert_eq!(balance, expected);
}

#[test]
fn same_seed_same_session() {
    let cli = CliRunner::new();
    let input = "10\n0\ns\ny\n10\n1\nb\nn\n";
    let a = cli.run_with_input(&["highlow", "--seed", "77"], input);
    let b = cli.run_with_input(&["highlow", "--seed", "77"], input);
    assert_eq!(a.stdout, b.stdout);
    assert!(a.stdout.contains("Rounds played: 2"));
}

#[test]
fn losing_everything_ends_the_session() {
    let cli = CliRunner::new();
    // Stake one per round until the balance hits zero or input runs out.
    let mut input = String::new();
    for _ in 0..40 {
        input.push_str("1\n0\nb\ny\n");
    }
    let res = cli.run_with_input(&["highlow", "--seed", "5", "--balance", "1"], &input);
    assert_eq!(res.exit_code, 0);
    let balance = final_balance(&res.stdout);
    if balance == 0 {
        assert!(res.stdout.contains("Out of popcorn."));
    }
}

#[test]
fn bad_input_is_reported_on_stderr() {
    let cli = CliRunner::new();
    let res = cli.run_with_input(&["highlow", "--balance", "20"], "twenty\n0\nq\n");
    assert_eq!(res.exit_code, 0);
    assert!(res.stderr.contains("Error: Invalid bet amount 'twenty'"));
    assert!(res.stderr.contains("Error: Bet amount must be positive"));
    assert!(res.stdout.contains("Final balance: 20"));
}

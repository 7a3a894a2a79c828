use crate::helpers::cli_runner::CliRunner;
use serde_json::Value;

#[test]
fn cfg_shows_defaults() {
    let cli = CliRunner::new();
    let res = cli.run(&["cfg"]);
    assert_eq!(res.exit_code, 0, "stderr: {}", res.stderr);
    let json: Value = serde_json::from_str(&res.stdout).unwrap();

    assert_eq!(json["starting_balance"]["value"], 100);
    assert_eq!(json["starting_balance"]["source"], "default");
    assert_eq!(json["memory_pairs"]["value"], 21);
    assert!(json["seed"]["value"].is_null());
    assert_eq!(json["pool_dir"]["source"], "default");
}

#[test]
fn env_beats_file_and_file_beats_defaults() {
    let cli = CliRunner::new();
    let path = cli.write_file("popcorn.toml", "seed = 3\nmemory_pairs = 5\nstarting_balance = 40\n");
    let path = path.to_string_lossy().into_owned();

    let res = cli.run_with_env(
        &["cfg"],
        &[("POPCORN_CONFIG", path.as_str()), ("POPCORN_SEED", "11")],
    );
    assert_eq!(res.exit_code, 0, "stderr: {}", res.stderr);
    let json: Value = serde_json::from_str(&res.stdout).unwrap();

    assert_eq!(json["seed"]["value"], 11);
    assert_eq!(json["seed"]["source"], "env");
    assert_eq!(json["memory_pairs"]["value"], 5);
    assert_eq!(json["memory_pairs"]["source"], "file");
    assert_eq!(json["starting_balance"]["value"], 40);
    assert_eq!(json["starting_balance"]["source"], "file");
}

#[test]
fn explicit_flags_beat_configuration() {
    let cli = CliRunner::new();
    let env = [("POPCORN_SEED", "5"), ("POPCORN_MEMORY_PAIRS", "2")];

    let from_env = cli.run_with_env(&["board"], &env);
    assert!(from_env.stdout.starts_with("board: pairs=2 seed=5"));

    let flagged = cli.run_with_env(&["board", "--seed", "6", "--pairs", "3"], &env);
    assert!(flagged.stdout.starts_with("board: pairs=3 seed=6"));
}

#[test]
fn invalid_configuration_fails_every_command() {
    let cli = CliRunner::new();
    let res = cli.run_with_env(&["cfg"], &[("POPCORN_MEMORY_PAIRS", "0")]);
    assert_eq!(res.exit_code, 2);
    assert!(res.stderr.contains("memory_pairs must be between 1 and 21"));

    let res = cli.run_with_env(&["board"], &[("POPCORN_SEED", "-4")]);
    assert_eq!(res.exit_code, 2);
    assert!(res.stderr.contains("Invalid seed"));

    let bad = cli.write_file("bad.toml", "seed = \"soon\"\n");
    let bad = bad.to_string_lossy().into_owned();
    let res = cli.run_with_env(&["cfg"], &[("POPCORN_CONFIG", bad.as_str())]);
    assert_eq!(res.exit_code, 2);
    assert!(res.stderr.contains("malformed config file"));
}

use crate::helpers::cli_runner::CliRunner;
use crate::helpers::pool_fixture::PoolFixture;
use once_cell::sync::Lazy;
use serde_json::Value;

static SPRING: Lazy<PoolFixture> = Lazy::new(PoolFixture::standard);

fn drawn_lines(stdout: &str) -> Vec<&str> {
    stdout
        .lines()
        .skip(1)
        .take_while(|l| !l.starts_with("Cost:"))
        .collect()
}

#[test]
fn single_draw_costs_ten() {
    let cli = CliRunner::new();
    let res = cli.run(&["gacha", "--pool-dir", SPRING.root_arg(), "--seed", "4"]);
    assert_eq!(res.exit_code, 0, "stderr: {}", res.stderr);
    assert!(res.stdout.starts_with("gacha: pool=spring draws=1 seed=4 balance=100"));
    assert_eq!(drawn_lines(&res.stdout).len(), 1);
    assert!(res.stdout.contains("Cost: 10 Balance: 90"));
    assert!(res.stderr.is_empty());
}

#[test]
fn ten_pull_always_has_a_top_tier_card() {
    let cli = CliRunner::new();
    for seed in 0..20 {
        let seed = seed.to_string();
        let res = cli.run(&[
            "gacha",
            "--pool-dir",
            SPRING.root_arg(),
            "--pool",
            "spring",
            "--draws",
            "10",
            "--seed",
            &seed,
        ]);
        assert_eq!(res.exit_code, 0, "stderr: {}", res.stderr);
        let cards = drawn_lines(&res.stdout);
        assert_eq!(cards.len(), 10);
        assert!(
            cards.iter().any(|l| l.starts_with("SSR") || l.starts_with("SP ")),
            "seed {seed}: {cards:?}"
        );
    }
}

#[test]
fn pool_dir_can_come_from_the_environment() {
    let cli = CliRunner::new();
    let res = cli.run_with_env(
        &["gacha", "--draws", "10", "--balance", "60"],
        &[("POPCORN_POOL_DIR", SPRING.root_arg())],
    );
    assert_eq!(res.exit_code, 2);
    assert!(res.stderr.contains("Insufficient balance: need 100, have 60"));
}

#[test]
fn missing_card_back_only_warns() {
    let pools = PoolFixture::empty();
    pools.add_pool("plain", &[("R", &["a", "b"][..])], false);
    assert!(pools.root().join("plain").join("R").join("a.jpg").is_file());

    let cli = CliRunner::new();
    let res = cli.run(&["gacha", "--pool-dir", pools.root_arg(), "--seed", "1"]);
    assert_eq!(res.exit_code, 0);
    assert!(res.stderr.contains("WARNING: pool plain has no card back image"));
    assert!(res.stdout.contains("  R   1/2"));
}

#[test]
fn pool_errors_exit_2() {
    let cli = CliRunner::new();
    let res = cli.run(&["gacha"]);
    assert_eq!(res.exit_code, 2);
    assert!(res.stderr.contains("pool directory required"));

    let res = cli.run(&["gacha", "--pool-dir", SPRING.root_arg(), "--pool", "winter"]);
    assert_eq!(res.exit_code, 2);
    assert!(res.stderr.contains("Unknown card pool: winter"));

    let res = cli.run(&["gacha", "--pool-dir", SPRING.root_arg(), "--draws", "5"]);
    assert_eq!(res.exit_code, 2);
    assert!(res.stderr.contains("Unsupported draw count: 5"));

    let empty = PoolFixture::empty();
    empty.add_pool("bare", &[], true);
    let res = cli.run(&["gacha", "--pool-dir", empty.root_arg()]);
    assert_eq!(res.exit_code, 2);
    assert!(res.stderr.contains("Card pool bare has no cards"));
}

#[test]
fn sim_reports_every_tier() {
    let cli = CliRunner::new();
    let res = cli.run(&["sim", "--draws", "2000", "--seed", "3"]);
    assert_eq!(res.exit_code, 0, "stderr: {}", res.stderr);
    let json: Value = serde_json::from_str(&res.stdout).unwrap();

    assert_eq!(json["draws"], 2000);
    assert_eq!(json["seed"], 3);
    assert!(json["generated_at"].as_str().is_some());
    let tiers: Vec<&str> = json["tiers"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["rarity"].as_str().unwrap())
        .collect();
    assert_eq!(tiers, ["SP", "SSR", "SR", "R"]);
}

#[test]
fn sim_against_a_pool_directory() {
    let cli = CliRunner::new();
    let res = cli.run(&["sim", "--draws", "300", "--seed", "8", "--pool-dir", SPRING.root_arg()]);
    assert_eq!(res.exit_code, 0, "stderr: {}", res.stderr);
    let json: Value = serde_json::from_str(&res.stdout).unwrap();
    assert_eq!(json["pool"], "spring");
    let total: u64 = json["tiers"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["count"].as_u64().unwrap())
        .sum();
    assert_eq!(total, 300);
}

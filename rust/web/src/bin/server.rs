//! Standalone web server binary
//!
//! Usage: cargo run -p popcorn_web --bin popcorn-web-server -- [OPTIONS]

use popcorn_web::{AppSettings, ServerConfig, WebServer, DEFAULT_LOG_FILTER};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

const CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    popcorn_web::init_logging(DEFAULT_LOG_FILTER)?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = match parse_args(&args) {
        Ok(Some(config)) => config,
        Ok(None) => {
            print_help();
            return Ok(());
        }
        Err(message) => {
            eprintln!("Error: {message}");
            print_help();
            std::process::exit(2);
        }
    };

    tracing::info!(
        host = %config.host(),
        port = config.port(),
        pool_dir = ?config.pool_dir(),
        journal = ?config.journal_path(),
        "starting popcorn web server"
    );

    let server = WebServer::new(config)?;
    let sessions = server.context().sessions();
    let handle = server.start().await?;

    let cleanup = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(CLEANUP_INTERVAL);
        loop {
            ticker.tick().await;
            let removed = sessions.cleanup_expired_sessions();
            if removed > 0 {
                tracing::info!(removed, "expired sessions cleaned up");
            }
        }
    });

    println!("Server running at http://{}", handle.address());
    println!("Press Ctrl+C to stop");

    tokio::signal::ctrl_c().await?;

    tracing::info!("shutting down server");
    cleanup.abort();
    handle.shutdown().await?;
    tracing::info!("server stopped cleanly");

    Ok(())
}

/// `Ok(None)` means help was requested.
fn parse_args(args: &[String]) -> Result<Option<ServerConfig>, String> {
    let mut host = "127.0.0.1".to_string();
    let mut port = 8080u16;
    let mut pool_dir: Option<PathBuf> = None;
    let mut journal: Option<PathBuf> = None;
    let mut settings = AppSettings::default();

    let mut iter = args.iter();
    while let Some(flag) = iter.next() {
        let mut value = || {
            iter.next()
                .cloned()
                .ok_or_else(|| format!("{flag} requires a value"))
        };
        match flag.as_str() {
            "--host" | "-h" => host = value()?,
            "--port" | "-p" => port = parse(flag, &value()?)?,
            "--pool-dir" | "-d" => pool_dir = Some(PathBuf::from(value()?)),
            "--journal" | "-j" => journal = Some(PathBuf::from(value()?)),
            "--starting-balance" => settings.starting_balance = parse(flag, &value()?)?,
            "--session-timeout" => settings.session_timeout_minutes = parse(flag, &value()?)?,
            "--memory-time-limit" => settings.memory_time_limit_secs = parse(flag, &value()?)?,
            "--memory-pairs" => settings.memory_pairs = parse(flag, &value()?)?,
            "--help" => return Ok(None),
            other => return Err(format!("unknown argument: {other}")),
        }
    }

    settings.validate().map_err(|err| err.to_string())?;

    let mut config = ServerConfig::new(host, port).with_settings(settings);
    if let Some(dir) = pool_dir {
        config = config.with_pool_dir(dir);
    }
    if let Some(path) = journal {
        config = config.with_journal(path);
    }
    Ok(Some(config))
}

fn parse<T: FromStr>(flag: &str, raw: &str) -> Result<T, String> {
    raw.parse()
        .map_err(|_| format!("invalid value for {flag}: {raw}"))
}

fn print_help() {
    println!("Popcorn Arcade Web Server");
    println!();
    println!("Usage: popcorn-web-server [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --host, -h <HOST>            Host to bind to (default: 127.0.0.1)");
    println!("  --port, -p <PORT>            Port to bind to (default: 8080)");
    println!("  --pool-dir, -d <DIR>         Gacha pool asset directory (default: built-in starter pool)");
    println!("  --journal, -j <FILE>         Append ledger movements to a JSONL journal");
    println!("  --starting-balance <N>       Balance for new accounts (default: 100)");
    println!("  --session-timeout <MIN>      Idle minutes before a session expires (default: 30)");
    println!("  --memory-time-limit <SECS>   Memory game clock (default: 60)");
    println!("  --memory-pairs <N>           Pairs per memory board, 1-21 (default: 21)");
    println!("  --help                       Show this help message");
}

//! # Popcorn CLI Library
//!
//! Command-line tools for the popcorn arcade engine: inspect seeded memory
//! boards, play high-low from a terminal and exercise gacha pools without
//! running the web server.
//!
//! The entry point is [`run`], which parses arguments and dispatches to a
//! subcommand while writing only to the streams it is given.
//!
//! ```no_run
//! use std::io;
//! let args = vec!["popcorn", "board", "--seed", "7", "--pairs", "4"];
//! let code = popcorn_cli::run(args, &mut io::stdout(), &mut io::stderr());
//! assert_eq!(code, 0);
//! ```
//!
//! ## Available Subcommands
//!
//! - `cfg`: Resolved configuration and the source of each value
//! - `rng`: Sample the seeded ChaCha20 generator
//! - `board`: Print a shuffled memory board
//! - `highlow`: Interactive high-low rounds over stdin
//! - `gacha`: Draw from a pool directory against a scratch ledger
//! - `sim`: Rarity distribution report for single draws

use clap::Parser;
use std::io::Write;
pub mod cli;
mod commands;
mod config;
mod error;
pub mod exit_code;
pub mod formatters;
pub mod io_utils;
#[macro_use]
mod macros;
pub mod ui;
pub mod validation;

use cli::{Commands, PopcornCli};
use commands::{
    handle_board_command, handle_cfg_command, handle_gacha_command, handle_highlow_command,
    handle_rng_command, handle_sim_command,
};

pub use config::{Config, ConfigError, ValueSource};
pub use error::CliError;

const COMMANDS: &[&str] = &["cfg", "rng", "board", "highlow", "gacha", "sim"];

/// Runs the CLI with `args` (program name first) and returns the exit code.
///
/// Help and version go to `out` with [`exit_code::SUCCESS`]. Argument errors
/// print the parser message plus a command summary to `err`; command
/// failures print `Error: ...`. Both return [`exit_code::ERROR`].
pub fn run<I, S>(args: I, out: &mut dyn Write, err: &mut dyn Write) -> i32
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let argv: Vec<String> = args.into_iter().map(|s| s.as_ref().to_string()).collect();

    let cli = match PopcornCli::try_parse_from(&argv) {
        Ok(cli) => cli,
        Err(e) => {
            use clap::error::ErrorKind;

            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                    if write!(out, "{}", e).is_err() {
                        return exit_code::ERROR;
                    }
                    exit_code::SUCCESS
                }
                _ => {
                    write_or_exit!(err, "{}", e);
                    write_or_exit!(err, "Popcorn Arcade CLI");
                    write_or_exit!(err, "Usage: popcorn <command> [options]\n");
                    write_or_exit!(err, "Commands:");
                    for c in COMMANDS {
                        write_or_exit!(err, "  {}", c);
                    }
                    write_or_exit!(err, "\nFor full help, run: popcorn --help");
                    exit_code::ERROR
                }
            };
        }
    };

    let result = match cli.cmd {
        Commands::Cfg => handle_cfg_command(out),
        Commands::Rng { seed } => handle_rng_command(seed, out),
        Commands::Board { seed, pairs } => handle_board_command(seed, pairs, out),
        Commands::Highlow { seed, balance } => {
            let stdin = std::io::stdin();
            let mut stdin_lock = stdin.lock();
            handle_highlow_command(seed, balance, out, err, &mut stdin_lock)
        }
        Commands::Gacha {
            pool_dir,
            pool,
            draws,
            seed,
            balance,
        } => handle_gacha_command(pool_dir, pool, draws, seed, balance, out, err),
        Commands::Sim {
            draws,
            seed,
            pool_dir,
            pool,
        } => handle_sim_command(draws, seed, pool_dir, pool, out),
    };

    match result {
        Ok(()) => exit_code::SUCCESS,
        Err(e) => {
            write_or_exit!(err, "Error: {}", e);
            exit_code::ERROR
        }
    }
}

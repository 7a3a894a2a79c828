//! Command-line argument definitions.

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "popcorn",
    version,
    about = "Popcorn arcade CLI: inspect boards, play high-low and simulate gacha draws"
)]
pub struct PopcornCli {
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the resolved configuration and where each value came from
    Cfg,
    /// Print a sample from the seeded RNG
    Rng {
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Deal and print a shuffled memory board
    Board {
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long)]
        pairs: Option<usize>,
    },
    /// Play high-low rounds from stdin against a scratch balance
    Highlow {
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long)]
        balance: Option<u64>,
    },
    /// Draw from a pool directory against a scratch ledger
    Gacha {
        #[arg(long)]
        pool_dir: Option<String>,
        #[arg(long)]
        pool: Option<String>,
        /// Cards per draw: 1 or 10
        #[arg(long, default_value_t = 1)]
        draws: u32,
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long)]
        balance: Option<u64>,
    },
    /// Report the rarity distribution of many single draws
    Sim {
        #[arg(long, default_value_t = 1000)]
        draws: u32,
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long)]
        pool_dir: Option<String>,
        #[arg(long)]
        pool: Option<String>,
    },
}

//! `popcorn cfg`: the resolved configuration with the source of every value.
//!
//! ```json
//! {
//!   "starting_balance": { "value": 100, "source": "default" },
//!   "memory_pairs": { "value": 21, "source": "default" },
//!   "seed": { "value": 7, "source": "env" },
//!   "pool_dir": { "value": "assets", "source": "file" }
//! }
//! ```

use crate::config;
use crate::error::CliError;
use std::io::Write;

pub fn handle_cfg_command(out: &mut dyn Write) -> Result<(), CliError> {
    let config::ConfigResolved { config, sources } = config::load_with_sources()?;
    let display = serde_json::json!({
        "starting_balance": {
            "value": config.starting_balance,
            "source": sources.starting_balance,
        },
        "memory_pairs": {
            "value": config.memory_pairs,
            "source": sources.memory_pairs,
        },
        "seed": {
            "value": config.seed,
            "source": sources.seed,
        },
        "pool_dir": {
            "value": config.pool_dir,
            "source": sources.pool_dir,
        }
    });
    let json_str = serde_json::to_string_pretty(&display).map_err(std::io::Error::other)?;
    writeln!(out, "{}", json_str)?;
    Ok(())
}

//! Command handlers, one module per subcommand.
//!
//! Every handler has the shape
//! `handle_<name>_command(..., out: &mut dyn Write, ...) -> Result<(), CliError>`
//! and writes only to the streams it is given, so tests drive them with
//! in-memory buffers.

mod board;
mod cfg;
mod gacha;
mod highlow;
mod rng;
mod sim;

pub use board::handle_board_command;
pub use cfg::handle_cfg_command;
pub use gacha::handle_gacha_command;
pub use highlow::handle_highlow_command;
pub use rng::handle_rng_command;
pub use sim::handle_sim_command;

use crate::config::{self, Config};
use crate::error::CliError;
use popcorn_engine::errors::GameError;
use popcorn_engine::pool::{CardPool, DirectoryPoolProvider, PoolProvider};

pub(crate) fn load_config() -> Result<Config, CliError> {
    Ok(config::load()?)
}

/// Loads `pool` (or the first pool found) from `pool_dir`, falling back to
/// the configured pool directory.
pub(crate) fn open_pool(
    pool_dir: Option<String>,
    pool: Option<String>,
    config: &Config,
) -> Result<CardPool, CliError> {
    let Some(dir) = pool_dir.or_else(|| config.pool_dir.clone()) else {
        return Err(CliError::InvalidInput(format!(
            "pool directory required (--pool-dir or {})",
            config::POOL_DIR_ENV
        )));
    };
    let provider = DirectoryPoolProvider::new(&dir);
    let name = match pool {
        Some(name) => name,
        None => provider
            .list_pools()
            .into_iter()
            .next()
            .ok_or_else(|| CliError::InvalidInput(format!("no pools found in {}", dir)))?,
    };
    let pool = provider.pool(&name)?;
    if pool.is_empty() {
        return Err(GameError::EmptyPool(name).into());
    }
    Ok(pool)
}

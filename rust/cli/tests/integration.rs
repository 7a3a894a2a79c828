#![deny(missing_debug_implementations, unused_must_use)]
#![warn(clippy::all)]
mod helpers;
mod integration {
    mod cli_basic;
    mod config_precedence;
    mod gacha_pools;
    mod highlow_session;
}

//! CLI configuration resolved from defaults, an optional TOML file and
//! `POPCORN_*` environment variables, in that order of precedence.
//!
//! The file is located through `POPCORN_CONFIG`. Every resolved value
//! remembers where it came from so `popcorn cfg` can report it.

use popcorn_engine::cards::MEMORY_FACES;
use popcorn_engine::ledger::STARTING_BALANCE;
use serde::{Deserialize, Serialize};
use std::fs;

pub const CONFIG_ENV: &str = "POPCORN_CONFIG";
pub const SEED_ENV: &str = "POPCORN_SEED";
pub const STARTING_BALANCE_ENV: &str = "POPCORN_STARTING_BALANCE";
pub const MEMORY_PAIRS_ENV: &str = "POPCORN_MEMORY_PAIRS";
pub const POOL_DIR_ENV: &str = "POPCORN_POOL_DIR";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub starting_balance: u64,
    pub memory_pairs: usize,
    pub seed: Option<u64>,
    pub pool_dir: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueSource {
    Default,
    File,
    Env,
}

#[derive(Debug, Clone, Copy)]
pub struct ConfigSources {
    pub starting_balance: ValueSource,
    pub memory_pairs: ValueSource,
    pub seed: ValueSource,
    pub pool_dir: ValueSource,
}

impl Default for ConfigSources {
    fn default() -> Self {
        Self {
            starting_balance: ValueSource::Default,
            memory_pairs: ValueSource::Default,
            seed: ValueSource::Default,
            pool_dir: ValueSource::Default,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConfigResolved {
    pub config: Config,
    pub sources: ConfigSources,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            starting_balance: STARTING_BALANCE,
            memory_pairs: MEMORY_FACES.len(),
            seed: None,
            pool_dir: None,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Invalid(String),
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}
impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::Parse(e)
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "cannot read config file: {}", e),
            ConfigError::Parse(e) => write!(f, "malformed config file: {}", e),
            ConfigError::Invalid(msg) => f.write_str(msg),
        }
    }
}

impl std::error::Error for ConfigError {}

pub fn load() -> Result<Config, ConfigError> {
    load_with_sources().map(|resolved| resolved.config)
}

pub fn load_with_sources() -> Result<ConfigResolved, ConfigError> {
    let mut cfg = Config::default();
    let mut sources = ConfigSources::default();

    if let Ok(path) = std::env::var(CONFIG_ENV)
        && !path.is_empty()
    {
        let s = fs::read_to_string(path)?;
        let f: FileConfig = toml::from_str(&s)?;
        if let Some(v) = f.starting_balance {
            cfg.starting_balance = v;
            sources.starting_balance = ValueSource::File;
        }
        if let Some(v) = f.memory_pairs {
            cfg.memory_pairs = v;
            sources.memory_pairs = ValueSource::File;
        }
        if let Some(v) = f.seed {
            cfg.seed = Some(v);
            sources.seed = ValueSource::File;
        }
        if let Some(v) = f.pool_dir {
            cfg.pool_dir = Some(v);
            sources.pool_dir = ValueSource::File;
        }
    }

    if let Ok(seed) = std::env::var(SEED_ENV)
        && !seed.is_empty()
    {
        cfg.seed = Some(
            seed.parse()
                .map_err(|_| ConfigError::Invalid(format!("Invalid seed: {}", seed)))?,
        );
        sources.seed = ValueSource::Env;
    }
    if let Ok(balance) = std::env::var(STARTING_BALANCE_ENV)
        && !balance.is_empty()
    {
        cfg.starting_balance = balance.parse().map_err(|_| {
            ConfigError::Invalid(format!("Invalid starting balance: {}", balance))
        })?;
        sources.starting_balance = ValueSource::Env;
    }
    if let Ok(pairs) = std::env::var(MEMORY_PAIRS_ENV)
        && !pairs.is_empty()
    {
        cfg.memory_pairs = pairs
            .parse()
            .map_err(|_| ConfigError::Invalid(format!("Invalid memory pairs: {}", pairs)))?;
        sources.memory_pairs = ValueSource::Env;
    }
    if let Ok(dir) = std::env::var(POOL_DIR_ENV)
        && !dir.is_empty()
    {
        cfg.pool_dir = Some(dir);
        sources.pool_dir = ValueSource::Env;
    }

    validate(&cfg)?;
    Ok(ConfigResolved {
        config: cfg,
        sources,
    })
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    #[serde(default)]
    starting_balance: Option<u64>,
    #[serde(default)]
    memory_pairs: Option<usize>,
    #[serde(default)]
    seed: Option<u64>,
    #[serde(default)]
    pool_dir: Option<String>,
}

fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if cfg.starting_balance == 0 {
        return Err(ConfigError::Invalid(
            "Invalid configuration: starting_balance must be >0".into(),
        ));
    }
    if cfg.memory_pairs == 0 || cfg.memory_pairs > MEMORY_FACES.len() {
        return Err(ConfigError::Invalid(format!(
            "Invalid configuration: memory_pairs must be between 1 and {}",
            MEMORY_FACES.len()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write as _;

    fn clear_env() {
        for key in [
            CONFIG_ENV,
            SEED_ENV,
            STARTING_BALANCE_ENV,
            MEMORY_PAIRS_ENV,
            POOL_DIR_ENV,
        ] {
            unsafe {
                std::env::remove_var(key);
            }
        }
    }

    #[test]
    #[serial]
    fn defaults_when_nothing_is_set() {
        clear_env();
        let resolved = load_with_sources().unwrap();
        assert_eq!(resolved.config, Config::default());
        assert_eq!(resolved.sources.seed, ValueSource::Default);
        assert_eq!(resolved.config.memory_pairs, 21);
        assert_eq!(resolved.config.starting_balance, 100);
    }

    #[test]
    #[serial]
    fn env_overrides_file() {
        clear_env();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "seed = 5\nmemory_pairs = 6\npool_dir = \"assets\"").unwrap();
        unsafe {
            std::env::set_var(CONFIG_ENV, file.path());
            std::env::set_var(SEED_ENV, "9");
        }

        let resolved = load_with_sources().unwrap();
        clear_env();

        assert_eq!(resolved.config.seed, Some(9));
        assert_eq!(resolved.sources.seed, ValueSource::Env);
        assert_eq!(resolved.config.memory_pairs, 6);
        assert_eq!(resolved.sources.memory_pairs, ValueSource::File);
        assert_eq!(resolved.config.pool_dir.as_deref(), Some("assets"));
        assert_eq!(resolved.sources.starting_balance, ValueSource::Default);
    }

    #[test]
    #[serial]
    fn rejects_out_of_range_pairs() {
        clear_env();
        unsafe {
            std::env::set_var(MEMORY_PAIRS_ENV, "22");
        }
        let result = load_with_sources();
        clear_env();
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    #[serial]
    fn rejects_unparsable_seed() {
        clear_env();
        unsafe {
            std::env::set_var(SEED_ENV, "abc");
        }
        let result = load();
        clear_env();
        let err = result.unwrap_err();
        assert!(err.to_string().contains("Invalid seed"));
    }

    #[test]
    #[serial]
    fn unknown_file_keys_are_parse_errors() {
        clear_env();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "volume = 11").unwrap();
        unsafe {
            std::env::set_var(CONFIG_ENV, file.path());
        }
        let result = load();
        clear_env();
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }
}

use popcorn_engine::cards::MEMORY_FACES;
use popcorn_engine::ledger::STARTING_BALANCE;
use popcorn_engine::memory::MatchConfig;
use serde::{Deserialize, Serialize};
use std::sync::RwLock;
use std::time::Duration;
use thiserror::Error;

/// Operator-tunable arcade settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppSettings {
    /// Balance granted to newly registered accounts
    pub starting_balance: u64,
    /// Inactivity window before a session is discarded
    pub session_timeout_minutes: u64,
    pub memory_time_limit_secs: u64,
    /// Pairs dealt on a memory board (1-21)
    pub memory_pairs: usize,
}

impl Default for AppSettings {
    fn default() -> Self {
        let classic = MatchConfig::classic();
        Self {
            starting_balance: STARTING_BALANCE,
            session_timeout_minutes: 30,
            memory_time_limit_secs: classic.time_limit_secs,
            memory_pairs: classic.pair_count,
        }
    }
}

impl AppSettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.session_timeout_minutes == 0 {
            return Err(SettingsError::InvalidValue(
                "session_timeout_minutes must be greater than 0".to_string(),
            ));
        }

        if self.memory_time_limit_secs == 0 {
            return Err(SettingsError::InvalidValue(
                "memory_time_limit_secs must be greater than 0".to_string(),
            ));
        }

        if self.memory_pairs == 0 || self.memory_pairs > MEMORY_FACES.len() {
            return Err(SettingsError::InvalidValue(format!(
                "memory_pairs must be between 1 and {}",
                MEMORY_FACES.len()
            )));
        }

        Ok(())
    }

    pub fn match_config(&self) -> MatchConfig {
        MatchConfig {
            pair_count: self.memory_pairs,
            time_limit_secs: self.memory_time_limit_secs,
        }
    }

    pub fn session_timeout(&self) -> Duration {
        Duration::from_secs(self.session_timeout_minutes * 60)
    }
}

#[derive(Debug)]
pub struct SettingsStore {
    settings: RwLock<AppSettings>,
}

impl SettingsStore {
    pub fn new() -> Self {
        Self {
            settings: RwLock::new(AppSettings::default()),
        }
    }

    pub fn with_settings(settings: AppSettings) -> Result<Self, SettingsError> {
        settings.validate()?;
        Ok(Self {
            settings: RwLock::new(settings),
        })
    }

    pub fn get(&self) -> Result<AppSettings, SettingsError> {
        self.settings
            .read()
            .map(|guard| guard.clone())
            .map_err(|_| SettingsError::StoragePoisoned)
    }

    /// Replaces the settings; invalid values leave the store untouched.
    pub fn update(&self, new_settings: AppSettings) -> Result<AppSettings, SettingsError> {
        new_settings.validate()?;

        let mut guard = self
            .settings
            .write()
            .map_err(|_| SettingsError::StoragePoisoned)?;
        *guard = new_settings.clone();
        Ok(new_settings)
    }

    pub fn update_field(
        &self,
        field: &str,
        value: serde_json::Value,
    ) -> Result<AppSettings, SettingsError> {
        let mut current = self.get()?;
        let number = |name: &str| {
            value
                .as_u64()
                .ok_or_else(|| SettingsError::InvalidValue(format!("{name} must be a number")))
        };

        match field {
            "starting_balance" => current.starting_balance = number(field)?,
            "session_timeout_minutes" => current.session_timeout_minutes = number(field)?,
            "memory_time_limit_secs" => current.memory_time_limit_secs = number(field)?,
            "memory_pairs" => current.memory_pairs = number(field)? as usize,
            _ => {
                return Err(SettingsError::InvalidValue(format!(
                    "unknown field: {}",
                    field
                )))
            }
        }

        self.update(current)
    }

    pub fn reset(&self) -> Result<AppSettings, SettingsError> {
        self.update(AppSettings::default())
    }
}

impl Default for SettingsStore {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Invalid settings value: {0}")]
    InvalidValue(String),
    #[error("Settings storage poisoned")]
    StoragePoisoned,
}

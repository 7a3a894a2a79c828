use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;
use thiserror::Error;

/// Balance granted to every newly opened account.
pub const STARTING_BALANCE: u64 = 100;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Unknown account: {0}")]
    UnknownAccount(String),
    #[error("Insufficient funds: balance {balance}, adjustment {delta}")]
    InsufficientFunds { balance: u64, delta: i64 },
    #[error("Account already exists: {0}")]
    AccountExists(String),
    #[error("Invalid username: {0}")]
    InvalidUsername(String),
    #[error("Ledger unavailable: {0}")]
    Unavailable(String),
}

/// Store of each player's spendable balance.
///
/// `adjust` must apply the whole delta atomically or nothing at all; a delta
/// that would leave the balance negative is rejected.
pub trait Ledger: Send + Sync {
    fn balance(&self, user: &str) -> Result<u64, LedgerError>;

    /// Applies `delta` and returns the resulting balance.
    fn adjust(&self, user: &str, delta: i64) -> Result<u64, LedgerError>;
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Account {
    pub username: String,
    pub display_name: String,
    pub balance: u64,
}

/// Process-local ledger doubling as the account directory.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    accounts: RwLock<HashMap<String, Account>>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens an account with [`STARTING_BALANCE`]. Usernames are lower-cased
    /// and must be non-empty ASCII alphanumerics.
    pub fn open_account(&self, username: &str, display_name: &str) -> Result<Account, LedgerError> {
        self.open_account_with_balance(username, display_name, STARTING_BALANCE)
    }

    pub fn open_account_with_balance(
        &self,
        username: &str,
        display_name: &str,
        balance: u64,
    ) -> Result<Account, LedgerError> {
        let username = normalize_username(username)?;
        let display_name = match display_name.trim() {
            "" => username.clone(),
            name => name.to_string(),
        };
        let mut guard = self.write()?;
        if guard.contains_key(&username) {
            return Err(LedgerError::AccountExists(username));
        }
        let account = Account {
            username: username.clone(),
            display_name,
            balance,
        };
        guard.insert(username, account.clone());
        Ok(account)
    }

    pub fn account(&self, username: &str) -> Result<Account, LedgerError> {
        let guard = self.read()?;
        guard
            .get(&username.to_ascii_lowercase())
            .cloned()
            .ok_or_else(|| LedgerError::UnknownAccount(username.to_string()))
    }

    pub fn close_account(&self, username: &str) -> Result<Account, LedgerError> {
        let mut guard = self.write()?;
        guard
            .remove(&username.to_ascii_lowercase())
            .ok_or_else(|| LedgerError::UnknownAccount(username.to_string()))
    }

    fn read(
        &self,
    ) -> Result<std::sync::RwLockReadGuard<'_, HashMap<String, Account>>, LedgerError> {
        self.accounts
            .read()
            .map_err(|_| LedgerError::Unavailable("ledger lock poisoned".into()))
    }

    fn write(
        &self,
    ) -> Result<std::sync::RwLockWriteGuard<'_, HashMap<String, Account>>, LedgerError> {
        self.accounts
            .write()
            .map_err(|_| LedgerError::Unavailable("ledger lock poisoned".into()))
    }
}

impl Ledger for InMemoryLedger {
    fn balance(&self, user: &str) -> Result<u64, LedgerError> {
        self.account(user).map(|a| a.balance)
    }

    fn adjust(&self, user: &str, delta: i64) -> Result<u64, LedgerError> {
        let mut guard = self.write()?;
        let account = guard
            .get_mut(&user.to_ascii_lowercase())
            .ok_or_else(|| LedgerError::UnknownAccount(user.to_string()))?;
        let next = apply_delta(account.balance, delta)?;
        account.balance = next;
        Ok(next)
    }
}

fn apply_delta(balance: u64, delta: i64) -> Result<u64, LedgerError> {
    let next = if delta >= 0 {
        balance.checked_add(delta.unsigned_abs())
    } else {
        balance.checked_sub(delta.unsigned_abs())
    };
    next.ok_or(LedgerError::InsufficientFunds { balance, delta })
}

fn normalize_username(raw: &str) -> Result<String, LedgerError> {
    let username = raw.trim().to_ascii_lowercase();
    if username.is_empty() || !username.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(LedgerError::InvalidUsername(raw.to_string()));
    }
    Ok(username)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn new_accounts_start_with_hundred() {
        let ledger = InMemoryLedger::new();
        let acct = ledger.open_account("Alice", "").unwrap();
        assert_eq!(acct.username, "alice");
        assert_eq!(acct.display_name, "alice");
        assert_eq!(ledger.balance("alice").unwrap(), STARTING_BALANCE);
    }

    #[test]
    fn duplicate_and_invalid_usernames_are_rejected() {
        let ledger = InMemoryLedger::new();
        ledger.open_account("bob", "Bob").unwrap();
        assert_eq!(
            ledger.open_account("BOB", "again"),
            Err(LedgerError::AccountExists("bob".into()))
        );
        assert!(matches!(
            ledger.open_account("bob smith", "x"),
            Err(LedgerError::InvalidUsername(_))
        ));
    }

    #[test]
    fn overdraft_is_rejected_without_partial_apply() {
        let ledger = InMemoryLedger::new();
        ledger.open_account("carol", "Carol").unwrap();
        let err = ledger.adjust("carol", -150).unwrap_err();
        assert_eq!(
            err,
            LedgerError::InsufficientFunds {
                balance: 100,
                delta: -150
            }
        );
        assert_eq!(ledger.balance("carol").unwrap(), 100);
    }

    #[test]
    fn concurrent_adjustments_do_not_lose_updates() {
        let ledger = Arc::new(InMemoryLedger::new());
        ledger.open_account("dave", "Dave").unwrap();
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let ledger = Arc::clone(&ledger);
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        ledger.adjust("dave", 1).unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(ledger.balance("dave").unwrap(), 100 + 800);
    }

    #[test]
    fn closing_account_removes_balance() {
        let ledger = InMemoryLedger::new();
        ledger.open_account("erin", "Erin").unwrap();
        ledger.close_account("erin").unwrap();
        assert!(matches!(
            ledger.balance("erin"),
            Err(LedgerError::UnknownAccount(_))
        ));
    }
}

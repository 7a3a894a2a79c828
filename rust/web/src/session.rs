use crate::errors::IntoErrorResponse;
use crate::settings::{SettingsError, SettingsStore};
use popcorn_engine::collection::{
    list_collection, Collection, CollectionQuery, InMemoryOwnership, OwnershipStore,
};
use popcorn_engine::controller::{
    dispatch, Action, ActionOutcome, LedgerMovement, PlayerSession, SessionView, TurnContext,
};
use popcorn_engine::errors::GameError;
use popcorn_engine::ledger::{Account, InMemoryLedger, LedgerError};
use popcorn_engine::pool::PoolProvider;
use popcorn_engine::settlement::SettlementLogger;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use std::time::{Duration, Instant};
use thiserror::Error;
use uuid::Uuid;

pub type SessionId = String;

const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(30 * 60);

/// Session body returned when a session is opened.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionResponse {
    pub session_id: SessionId,
    pub user: String,
    pub view: SessionView,
}

/// Result of one action, tagged with the session it ran in.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActionResponse {
    pub session_id: SessionId,
    #[serde(flatten)]
    pub outcome: ActionOutcome,
}

/// Owns the player sessions and the shared arcade stores.
///
/// Each session serializes its own actions behind a mutex; the ledger and
/// ownership stores are shared by every session of every player.
pub struct SessionManager {
    sessions: RwLock<HashMap<SessionId, Arc<ArcadeSession>>>,
    ledger: Arc<InMemoryLedger>,
    ownership: Arc<InMemoryOwnership>,
    pools: Arc<dyn PoolProvider>,
    settings: Arc<SettingsStore>,
    journal: Option<Arc<Mutex<SettlementLogger>>>,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("sessions", &self.active_sessions().len())
            .field("pools", &self.pools.list_pools())
            .field("journal", &self.journal.is_some())
            .finish()
    }
}

impl SessionManager {
    pub fn new(pools: Arc<dyn PoolProvider>, settings: Arc<SettingsStore>) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ledger: Arc::new(InMemoryLedger::new()),
            ownership: Arc::new(InMemoryOwnership::new()),
            pools,
            settings,
            journal: None,
        }
    }

    pub fn with_journal(mut self, journal: Arc<Mutex<SettlementLogger>>) -> Self {
        self.journal = Some(journal);
        self
    }

    pub fn ledger(&self) -> Arc<InMemoryLedger> {
        Arc::clone(&self.ledger)
    }

    pub fn ownership(&self) -> Arc<InMemoryOwnership> {
        Arc::clone(&self.ownership)
    }

    pub fn settings(&self) -> Arc<SettingsStore> {
        Arc::clone(&self.settings)
    }

    pub fn session_ttl(&self) -> Duration {
        self.settings
            .get()
            .map(|s| s.session_timeout())
            .unwrap_or(DEFAULT_SESSION_TTL)
    }

    pub fn register(&self, username: &str, display_name: &str) -> Result<Account, SessionError> {
        let starting_balance = self.settings.get()?.starting_balance;
        let account =
            self.ledger
                .open_account_with_balance(username, display_name, starting_balance)?;
        tracing::info!(
            user = %account.username,
            balance = account.balance,
            "account registered"
        );
        Ok(account)
    }

    pub fn account(&self, username: &str) -> Result<Account, SessionError> {
        Ok(self.ledger.account(username)?)
    }

    /// Removes the account, its collection and every session it still has open.
    pub fn close_account(&self, username: &str) -> Result<Account, SessionError> {
        let account = self.ledger.close_account(username)?;
        self.ownership.forget(&account.username)?;

        let closed: Vec<SessionId> = {
            let mut guard = self
                .sessions
                .write()
                .map_err(|_| SessionError::StoragePoisoned)?;
            let ids: Vec<SessionId> = guard
                .iter()
                .filter(|(_, s)| s.user == account.username)
                .map(|(id, _)| id.clone())
                .collect();
            for id in &ids {
                guard.remove(id);
            }
            ids
        };

        tracing::info!(
            user = %account.username,
            closed_sessions = closed.len(),
            "account closed"
        );
        Ok(account)
    }

    /// Opens a session in the lobby. A player has at most one live session:
    /// any session the user already holds is closed first, settling a
    /// finished game it still owes. If that settlement fails the old session
    /// is kept and the error is returned.
    pub fn create_session(
        &self,
        username: &str,
        seed: Option<u64>,
    ) -> Result<SessionResponse, SessionError> {
        let account = self.ledger.account(username)?;
        let match_config = self.settings.get()?.match_config();

        let previous = self.sessions_of(&account.username)?;
        for old in &previous {
            self.settle_before_close(old)?;
        }

        let id = Uuid::new_v4().to_string();
        tracing::info!(
            session_id = %id,
            user = %account.username,
            seed = ?seed,
            replaced = previous.len(),
            "creating arcade session"
        );

        let player = PlayerSession::new(account.username.clone(), seed)
            .with_match_config(match_config);
        let session = Arc::new(ArcadeSession::new(id.clone(), player));
        let view = session.view(Instant::now())?;

        {
            let mut guard = self
                .sessions
                .write()
                .map_err(|_| SessionError::StoragePoisoned)?;
            guard.retain(|_, s| s.user != account.username);
            guard.insert(id.clone(), session);
        }

        Ok(SessionResponse {
            session_id: id,
            user: account.username,
            view,
        })
    }

    pub fn get_session(&self, id: &SessionId) -> Result<Arc<ArcadeSession>, SessionError> {
        let guard = self
            .sessions
            .read()
            .map_err(|_| SessionError::StoragePoisoned)?;
        guard
            .get(id)
            .cloned()
            .ok_or_else(|| SessionError::NotFound(id.clone()))
    }

    /// Re-renders the session, which also claims a finished memory reward.
    pub fn state(&self, id: &SessionId) -> Result<ActionResponse, SessionError> {
        self.process_action(id, Action::Refresh)
    }

    pub fn process_action(
        &self,
        id: &SessionId,
        action: Action,
    ) -> Result<ActionResponse, SessionError> {
        self.process_action_at(id, action, Instant::now())
    }

    pub fn process_action_at(
        &self,
        id: &SessionId,
        action: Action,
        now: Instant,
    ) -> Result<ActionResponse, SessionError> {
        let session = self.get_session(id)?;
        if session.is_expired_at(self.session_ttl(), now) {
            self.expire_session(id)?;
            return Err(SessionError::Expired(id.clone()));
        }
        session.touch(now);

        tracing::debug!(
            session_id = %id,
            user = %session.user,
            action = action.name(),
            "processing action"
        );

        let ctx = self.turn_context(now);
        let outcome = {
            let mut player = session
                .player
                .lock()
                .map_err(|_| SessionError::StoragePoisoned)?;
            dispatch(&mut player, action, &ctx)?
        };

        if let Some(movement) = &outcome.movement {
            self.journal_movement(&session.user, movement);
        }
        if let Some(error) = &outcome.settlement_error {
            tracing::warn!(
                session_id = %id,
                user = %session.user,
                error = %error,
                "automatic settlement failed; will retry on next action"
            );
        }

        Ok(ActionResponse {
            session_id: id.clone(),
            outcome,
        })
    }

    pub fn pools(&self) -> Vec<String> {
        self.pools.list_pools()
    }

    pub fn collection(
        &self,
        username: &str,
        pool: &str,
        query: &CollectionQuery,
    ) -> Result<Collection, SessionError> {
        let account = self.ledger.account(username)?;
        let pool = self.pools.pool(pool)?;
        let owned = self.ownership.owned(&account.username, &pool.name)?;
        Ok(list_collection(&pool, &owned, query))
    }

    pub fn delete_session(&self, id: &SessionId) -> Result<(), SessionError> {
        match self.remove_session(id)? {
            Some(session) => {
                tracing::info!(session_id = %id, user = %session.user, "session ended by request");
                Ok(())
            }
            None => Err(SessionError::NotFound(id.clone())),
        }
    }

    /// Drops every session idle for longer than the configured timeout.
    pub fn cleanup_expired_sessions(&self) -> usize {
        let ttl = self.session_ttl();
        let now = Instant::now();
        let mut guard = match self.sessions.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let before = guard.len();
        guard.retain(|id, session| {
            let keep = !session.is_expired_at(ttl, now);
            if !keep {
                tracing::info!(session_id = %id, user = %session.user, "session expired");
            }
            keep
        });
        before - guard.len()
    }

    pub fn active_sessions(&self) -> Vec<SessionId> {
        match self.sessions.read() {
            Ok(guard) => guard.keys().cloned().collect(),
            Err(_) => Vec::new(),
        }
    }

    fn journal_movement(&self, user: &str, movement: &LedgerMovement) {
        tracing::info!(
            user = %user,
            game = movement.game.as_str(),
            delta = movement.delta,
            balance = ?movement.balance,
            "ledger movement"
        );
        let Some(journal) = &self.journal else {
            return;
        };
        let written = match journal.lock() {
            Ok(mut logger) => logger
                .record(user, movement.game, movement.delta, movement.balance)
                .map(|_| ()),
            Err(_) => Err(std::io::Error::other("settlement journal poisoned")),
        };
        if let Err(err) = written {
            tracing::error!(user = %user, error = %err, "failed to journal ledger movement");
        }
    }

    fn sessions_of(&self, user: &str) -> Result<Vec<Arc<ArcadeSession>>, SessionError> {
        let guard = self
            .sessions
            .read()
            .map_err(|_| SessionError::StoragePoisoned)?;
        Ok(guard.values().filter(|s| s.user == user).cloned().collect())
    }

    /// Leaves the session's game so a finished round is paid out before the
    /// session is dropped.
    fn settle_before_close(&self, session: &ArcadeSession) -> Result<(), SessionError> {
        let ctx = self.turn_context(Instant::now());
        let outcome = {
            let mut player = session
                .player
                .lock()
                .map_err(|_| SessionError::StoragePoisoned)?;
            dispatch(&mut player, Action::ReturnToLobby, &ctx)?
        };
        if let Some(movement) = &outcome.movement {
            self.journal_movement(&session.user, movement);
        }
        tracing::info!(session_id = %session.id, user = %session.user, "session replaced");
        Ok(())
    }

    fn turn_context(&self, now: Instant) -> TurnContext<'_> {
        TurnContext {
            ledger: self.ledger.as_ref(),
            pools: self.pools.as_ref(),
            ownership: self.ownership.as_ref(),
            now,
        }
    }

    fn expire_session(&self, id: &SessionId) -> Result<(), SessionError> {
        if let Some(session) = self.remove_session(id)? {
            tracing::info!(
                session_id = %id,
                user = %session.user,
                "session expired due to inactivity"
            );
        }
        Ok(())
    }

    fn remove_session(&self, id: &SessionId) -> Result<Option<Arc<ArcadeSession>>, SessionError> {
        match self.sessions.write() {
            Ok(mut guard) => Ok(guard.remove(id)),
            Err(_) => Err(SessionError::StoragePoisoned),
        }
    }
}

pub struct ArcadeSession {
    id: SessionId,
    user: String,
    player: Mutex<PlayerSession>,
    created_at: Instant,
    last_active: Mutex<Instant>,
}

impl std::fmt::Debug for ArcadeSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArcadeSession")
            .field("id", &self.id)
            .field("user", &self.user)
            .field("created_at", &self.created_at)
            .finish()
    }
}

impl ArcadeSession {
    fn new(id: SessionId, player: PlayerSession) -> Self {
        let now = Instant::now();
        Self {
            id,
            user: player.user().to_string(),
            player: Mutex::new(player),
            created_at: now,
            last_active: Mutex::new(now),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    /// Current view without running the reducer.
    pub fn view(&self, now: Instant) -> Result<SessionView, SessionError> {
        self.player
            .lock()
            .map(|player| player.view(now))
            .map_err(|_| SessionError::StoragePoisoned)
    }

    fn touch(&self, now: Instant) {
        if let Ok(mut guard) = self.last_active.lock() {
            if now > *guard {
                *guard = now;
            }
        }
    }

    fn is_expired_at(&self, ttl: Duration, now: Instant) -> bool {
        match self.last_active.lock() {
            Ok(last) => now.saturating_duration_since(*last) >= ttl,
            Err(_) => false,
        }
    }

    pub fn force_last_active(&self, instant: Instant) {
        if let Ok(mut guard) = self.last_active.lock() {
            *guard = instant;
        }
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session not found: {0}")]
    NotFound(SessionId),
    #[error("Session expired: {0}")]
    Expired(SessionId),
    #[error(transparent)]
    Game(#[from] GameError),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error("Session storage poisoned")]
    StoragePoisoned,
}

impl IntoErrorResponse for SessionError {
    fn status_code(&self) -> warp::http::StatusCode {
        use warp::http::StatusCode;
        match self {
            SessionError::NotFound(_) => StatusCode::NOT_FOUND,
            SessionError::Expired(_) => StatusCode::GONE,
            SessionError::Game(err) => err.status_code(),
            SessionError::Ledger(err) => err.status_code(),
            SessionError::Settings(err) => err.status_code(),
            SessionError::StoragePoisoned => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            SessionError::NotFound(_) => "session_not_found",
            SessionError::Expired(_) => "session_expired",
            SessionError::Game(err) => err.error_code(),
            SessionError::Ledger(err) => err.error_code(),
            SessionError::Settings(err) => err.error_code(),
            SessionError::StoragePoisoned => "session_storage_error",
        }
    }

    fn error_message(&self) -> String {
        match self {
            SessionError::Game(err) => err.error_message(),
            SessionError::Ledger(err) => err.error_message(),
            _ => self.to_string(),
        }
    }

    fn error_details(&self) -> Option<serde_json::Value> {
        match self {
            SessionError::NotFound(id) => Some(serde_json::json!({
                "session_id": id
            })),
            SessionError::Expired(id) => Some(serde_json::json!({
                "session_id": id,
                "reason": "Session expired due to inactivity"
            })),
            SessionError::Game(err) => err.error_details(),
            _ => None,
        }
    }

    fn severity(&self) -> crate::errors::ErrorSeverity {
        use crate::errors::ErrorSeverity;
        match self {
            SessionError::StoragePoisoned => ErrorSeverity::Critical,
            other if other.status_code().is_server_error() => ErrorSeverity::Server,
            _ => ErrorSeverity::Client,
        }
    }
}

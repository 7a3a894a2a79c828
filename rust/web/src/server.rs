use crate::errors::ErrorResponse;
use crate::handlers;
use crate::middleware::with_request_logging;
use crate::session::{SessionError, SessionManager};
use crate::settings::{AppSettings, SettingsStore};
use popcorn_engine::cards::Rarity;
use popcorn_engine::collection::CollectionQuery;
use popcorn_engine::pool::{CardPool, DirectoryPoolProvider, PoolProvider, StaticPoolProvider};
use popcorn_engine::settlement::SettlementLogger;
use std::convert::Infallible;
use std::net::{SocketAddr, ToSocketAddrs};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::info;
use warp::filters::body::BodyDeserializeError;
use warp::filters::BoxedFilter;
use warp::http::StatusCode;
use warp::reject::{InvalidQuery, MethodNotAllowed};
use warp::reply::{Reply, Response};
use warp::{Filter, Rejection};

#[derive(Debug, Clone)]
pub struct ServerConfig {
    host: String,
    port: u16,
    pool_dir: Option<PathBuf>,
    journal_path: Option<PathBuf>,
    settings: AppSettings,
}

impl ServerConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            pool_dir: None,
            journal_path: None,
            settings: AppSettings::default(),
        }
    }

    /// Loopback on an ephemeral port with the built-in starter pool.
    pub fn for_tests() -> Self {
        Self::new("127.0.0.1", 0)
    }

    /// Serve pools from `<dir>/<pool>/<tier>/*.jpg` instead of the starter pool.
    pub fn with_pool_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.pool_dir = Some(dir.into());
        self
    }

    /// Append every ledger movement to a JSONL journal at `path`.
    pub fn with_journal(mut self, path: impl Into<PathBuf>) -> Self {
        self.journal_path = Some(path.into());
        self
    }

    pub fn with_settings(mut self, settings: AppSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn pool_dir(&self) -> Option<&Path> {
        self.pool_dir.as_deref()
    }

    pub fn journal_path(&self) -> Option<&Path> {
        self.journal_path.as_deref()
    }

    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }
}

/// Pool served when no asset directory is configured.
pub fn starter_pools() -> StaticPoolProvider {
    StaticPoolProvider::new([CardPool::new("starter")
        .with_tier(Rarity::R, (1..=6).map(|n| format!("starter/R/{n:02}.jpg")))
        .with_tier(Rarity::SR, (1..=4).map(|n| format!("starter/SR/{n:02}.jpg")))
        .with_tier(Rarity::SSR, (1..=2).map(|n| format!("starter/SSR/{n:02}.jpg")))
        .with_tier(Rarity::SP, ["starter/SP/01.jpg"])
        .with_card_back("starter/card_back.jpg")])
}

#[derive(Debug, Clone)]
pub struct AppContext {
    config: ServerConfig,
    sessions: Arc<SessionManager>,
    settings: Arc<SettingsStore>,
}

impl AppContext {
    pub fn new(config: ServerConfig) -> Result<Self, ServerError> {
        let settings = Arc::new(
            SettingsStore::with_settings(config.settings().clone())
                .map_err(|err| ServerError::ConfigError(err.to_string()))?,
        );

        let pools: Arc<dyn PoolProvider> = match config.pool_dir() {
            Some(dir) => {
                if !dir.is_dir() {
                    return Err(ServerError::ConfigError(format!(
                        "pool directory `{}` does not exist",
                        dir.display()
                    )));
                }
                Arc::new(DirectoryPoolProvider::new(dir))
            }
            None => Arc::new(starter_pools()),
        };

        let mut sessions = SessionManager::new(pools, Arc::clone(&settings));
        if let Some(path) = config.journal_path() {
            let journal = SettlementLogger::create(path).map_err(|err| {
                ServerError::ConfigError(format!(
                    "cannot open journal `{}`: {err}",
                    path.display()
                ))
            })?;
            sessions = sessions.with_journal(Arc::new(Mutex::new(journal)));
        }

        Ok(Self::new_with_dependencies(
            config,
            Arc::new(sessions),
            settings,
        ))
    }

    pub fn new_with_dependencies(
        config: ServerConfig,
        sessions: Arc<SessionManager>,
        settings: Arc<SettingsStore>,
    ) -> Self {
        Self {
            config,
            sessions,
            settings,
        }
    }

    pub fn new_for_tests() -> Result<Self, ServerError> {
        Self::new(ServerConfig::for_tests())
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn sessions(&self) -> Arc<SessionManager> {
        Arc::clone(&self.sessions)
    }

    pub fn settings(&self) -> Arc<SettingsStore> {
        Arc::clone(&self.settings)
    }
}

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Failed to bind to address: {0}")]
    BindError(#[from] std::io::Error),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Session error: {0}")]
    SessionError(#[from] SessionError),
}

#[derive(Debug, Clone)]
pub struct WebServer {
    context: AppContext,
}

impl WebServer {
    pub fn new(config: ServerConfig) -> Result<Self, ServerError> {
        let context = AppContext::new(config)?;
        Ok(Self { context })
    }

    pub fn from_context(context: AppContext) -> Self {
        Self { context }
    }

    pub fn context(&self) -> &AppContext {
        &self.context
    }

    pub async fn start(self) -> Result<ServerHandle, ServerError> {
        let WebServer { context } = self;
        let config = context.config().clone();
        let bind_addr = Self::bind_addr(&config)?;

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let app = Self::app(&context);
        let shutdown_signal = async move {
            let _ = shutdown_rx.await;
        };

        let (addr, server_future) = warp::serve(app)
            .try_bind_with_graceful_shutdown(bind_addr, shutdown_signal)
            .map_err(Self::map_warp_error)?;

        info!(address = %addr, "web server listening");

        let task = tokio::spawn(async move {
            server_future.await;
            Ok(())
        });

        Ok(ServerHandle::new(addr, shutdown_tx, task, context))
    }

    fn bind_addr(config: &ServerConfig) -> Result<SocketAddr, ServerError> {
        let host = config.host();

        if let Ok(addr) = host.parse::<SocketAddr>() {
            return Ok(addr);
        }

        if let Ok(ip) = host.parse::<std::net::IpAddr>() {
            return Ok(SocketAddr::new(ip, config.port()));
        }

        let candidate = format!("{}:{}", host, config.port());
        let mut addrs = candidate.to_socket_addrs().map_err(|err| {
            ServerError::ConfigError(format!("failed to resolve address `{candidate}`: {err}"))
        })?;

        addrs.next().ok_or_else(|| {
            ServerError::ConfigError(format!("failed to resolve address `{candidate}`"))
        })
    }

    fn map_warp_error(err: warp::Error) -> ServerError {
        use std::error::Error as StdError;

        if let Some(source) = err.source() {
            if let Some(io_err) = source.downcast_ref::<std::io::Error>() {
                let recreated = std::io::Error::new(io_err.kind(), io_err.to_string());
                return ServerError::BindError(recreated);
            }
        }

        ServerError::ConfigError(err.to_string())
    }

    /// Every route with request logging and JSON rejection bodies.
    pub fn app(
        context: &AppContext,
    ) -> impl Filter<Extract = (Response,), Error = Infallible> + Clone {
        with_request_logging(Self::routes(context))
            .recover(handle_rejection)
            .unify()
    }

    pub fn routes(context: &AppContext) -> BoxedFilter<(Response,)> {
        Self::health_route(context)
            .or(Self::account_routes(context))
            .unify()
            .or(Self::session_routes(context))
            .unify()
            .or(Self::pool_routes(context))
            .unify()
            .or(Self::settings_routes(context))
            .unify()
            .boxed()
    }

    fn health_route(context: &AppContext) -> BoxedFilter<(Response,)> {
        warp::path("health")
            .and(warp::get())
            .and(warp::path::end())
            .and(Self::with_session_manager(context.sessions()))
            .map(|sessions: Arc<SessionManager>| {
                handlers::health(sessions.active_sessions().len()).into_response()
            })
            .boxed()
    }

    fn account_routes(context: &AppContext) -> BoxedFilter<(Response,)> {
        let sessions = context.sessions();

        let register = warp::path!("api" / "accounts")
            .and(warp::post())
            .and(Self::with_session_manager(sessions.clone()))
            .and(warp::body::json())
            .and_then(
                |sessions: Arc<SessionManager>, request: handlers::RegisterRequest| async move {
                    Ok::<_, Infallible>(handlers::register(sessions, request).await)
                },
            );

        let get = warp::path!("api" / "accounts" / String)
            .and(warp::get())
            .and(Self::with_session_manager(sessions.clone()))
            .and_then(|username: String, sessions: Arc<SessionManager>| async move {
                Ok::<_, Infallible>(handlers::get_account(sessions, username).await)
            });

        let close = warp::path!("api" / "accounts" / String)
            .and(warp::delete())
            .and(Self::with_session_manager(sessions))
            .and_then(|username: String, sessions: Arc<SessionManager>| async move {
                Ok::<_, Infallible>(handlers::close_account(sessions, username).await)
            });

        register.or(get).unify().or(close).unify().boxed()
    }

    fn session_routes(context: &AppContext) -> BoxedFilter<(Response,)> {
        let sessions = context.sessions();

        let create = warp::path!("api" / "sessions")
            .and(warp::post())
            .and(Self::with_session_manager(sessions.clone()))
            .and(warp::body::json())
            .and_then(
                |sessions: Arc<SessionManager>,
                 request: handlers::CreateSessionRequest| async move {
                    Ok::<_, Infallible>(handlers::create_session(sessions, request).await)
                },
            );

        let state = warp::path!("api" / "sessions" / String)
            .and(warp::get())
            .and(Self::with_session_manager(sessions.clone()))
            .and_then(
                |session_id: String, sessions: Arc<SessionManager>| async move {
                    Ok::<_, Infallible>(handlers::get_session(sessions, session_id).await)
                },
            );

        let actions = warp::path!("api" / "sessions" / String / "actions")
            .and(warp::post())
            .and(Self::with_session_manager(sessions.clone()))
            .and(warp::body::json())
            .and_then(
                |session_id: String,
                 sessions: Arc<SessionManager>,
                 request: handlers::PlayerActionRequest| async move {
                    Ok::<_, Infallible>(
                        handlers::submit_action(sessions, session_id, request).await,
                    )
                },
            );

        let delete = warp::path!("api" / "sessions" / String)
            .and(warp::delete())
            .and(Self::with_session_manager(sessions))
            .and_then(
                |session_id: String, sessions: Arc<SessionManager>| async move {
                    Ok::<_, Infallible>(handlers::delete_session(sessions, session_id).await)
                },
            );

        create
            .or(actions)
            .unify()
            .or(state)
            .unify()
            .or(delete)
            .unify()
            .boxed()
    }

    fn pool_routes(context: &AppContext) -> BoxedFilter<(Response,)> {
        let sessions = context.sessions();

        let pools = warp::path!("api" / "pools")
            .and(warp::get())
            .and(Self::with_session_manager(sessions.clone()))
            .and_then(|sessions: Arc<SessionManager>| async move {
                Ok::<_, Infallible>(handlers::list_pools(sessions).await)
            });

        let collection = warp::path!("api" / "collection" / String / String)
            .and(warp::get())
            .and(warp::query::<CollectionQuery>())
            .and(Self::with_session_manager(sessions))
            .and_then(
                |username: String,
                 pool: String,
                 query: CollectionQuery,
                 sessions: Arc<SessionManager>| async move {
                    Ok::<_, Infallible>(
                        handlers::get_collection(sessions, username, pool, query).await,
                    )
                },
            );

        pools.or(collection).unify().boxed()
    }

    fn settings_routes(context: &AppContext) -> BoxedFilter<(Response,)> {
        let store = context.settings();

        let get = warp::path!("api" / "settings")
            .and(warp::get())
            .and(Self::with_settings(store.clone()))
            .and_then(|store: Arc<SettingsStore>| async move {
                Ok::<_, Infallible>(handlers::get_settings(store).await)
            });

        let update = warp::path!("api" / "settings")
            .and(warp::put())
            .and(Self::with_settings(store.clone()))
            .and(warp::body::json())
            .and_then(
                |store: Arc<SettingsStore>, request: handlers::UpdateSettingsRequest| async move {
                    Ok::<_, Infallible>(handlers::update_settings(store, request).await)
                },
            );

        let field = warp::path!("api" / "settings" / "field")
            .and(warp::post())
            .and(Self::with_settings(store.clone()))
            .and(warp::body::json())
            .and_then(
                |store: Arc<SettingsStore>, request: handlers::UpdateFieldRequest| async move {
                    Ok::<_, Infallible>(handlers::update_field(store, request).await)
                },
            );

        let reset = warp::path!("api" / "settings" / "reset")
            .and(warp::post())
            .and(Self::with_settings(store))
            .and_then(|store: Arc<SettingsStore>| async move {
                Ok::<_, Infallible>(handlers::reset_settings(store).await)
            });

        get.or(update)
            .unify()
            .or(field)
            .unify()
            .or(reset)
            .unify()
            .boxed()
    }

    fn with_session_manager(
        sessions: Arc<SessionManager>,
    ) -> impl Filter<Extract = (Arc<SessionManager>,), Error = Infallible> + Clone {
        warp::any().map(move || Arc::clone(&sessions))
    }

    fn with_settings(
        store: Arc<SettingsStore>,
    ) -> impl Filter<Extract = (Arc<SettingsStore>,), Error = Infallible> + Clone {
        warp::any().map(move || Arc::clone(&store))
    }
}

/// Turns unmatched routes and malformed requests into `ErrorResponse` bodies.
pub async fn handle_rejection(err: Rejection) -> Result<Response, Infallible> {
    let (status, body) = if err.is_not_found() {
        (
            StatusCode::NOT_FOUND,
            ErrorResponse::new("not_found", "No such route"),
        )
    } else if let Some(e) = err.find::<BodyDeserializeError>() {
        (
            StatusCode::BAD_REQUEST,
            ErrorResponse::new("invalid_body", e.to_string()),
        )
    } else if let Some(e) = err.find::<InvalidQuery>() {
        (
            StatusCode::BAD_REQUEST,
            ErrorResponse::new("invalid_query", e.to_string()),
        )
    } else if err.find::<MethodNotAllowed>().is_some() {
        (
            StatusCode::METHOD_NOT_ALLOWED,
            ErrorResponse::new("method_not_allowed", "Method not allowed"),
        )
    } else {
        tracing::error!(rejection = ?err, "unhandled rejection");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorResponse::new("internal_error", "Unhandled request error"),
        )
    };

    Ok(body.into_response(status))
}

#[derive(Debug)]
pub struct ServerHandle {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<Result<(), ServerError>>>,
    context: AppContext,
}

impl ServerHandle {
    fn new(
        addr: SocketAddr,
        shutdown: oneshot::Sender<()>,
        task: JoinHandle<Result<(), ServerError>>,
        context: AppContext,
    ) -> Self {
        Self {
            addr,
            shutdown: Some(shutdown),
            task: Some(task),
            context,
        }
    }

    pub fn address(&self) -> SocketAddr {
        self.addr
    }

    pub fn context(&self) -> &AppContext {
        &self.context
    }

    pub async fn shutdown(mut self) -> Result<(), ServerError> {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }

        if let Some(task) = self.task.take() {
            match task.await {
                Ok(result) => result?,
                Err(err) => {
                    return Err(ServerError::ConfigError(format!(
                        "server task join error: {err}"
                    )))
                }
            }
        }

        Ok(())
    }
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }

        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

use crate::config::{StoreBackend, TodoConfig};
use crate::handlers;
use crate::services::{InMemoryTodoStore, MongoTodoStore, TodoStore};
use axum::{
    middleware::from_fn,
    routing::{get, put},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{
    metrics::metrics_middleware,
    tracing::{request_id_middleware, request_logging_middleware, REQUEST_ID_HEADER},
};
use std::future::{Future, IntoFuture};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tokio::sync::oneshot;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

/// Upper bound on a single request, reading the body through writing the response.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// How long shutdown waits for in-flight requests before closing the store.
pub const SHUTDOWN_GRACE_PERIOD: Duration = Duration::from_secs(5);

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn TodoStore>,
}

pub fn todo_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/todo",
            get(handlers::list_todos).post(handlers::create_todo),
        )
        .route(
            "/todo/",
            get(handlers::list_todos).post(handlers::create_todo),
        )
        .route(
            "/todo/:id",
            put(handlers::update_todo).delete(handlers::delete_todo),
        )
}

pub fn build_router(state: AppState) -> Router {
    build_router_with_timeout(state, REQUEST_TIMEOUT)
}

pub fn build_router_with_timeout(state: AppState, request_timeout: Duration) -> Router {
    Router::new()
        .route("/", get(handlers::home))
        .merge(todo_routes())
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics_endpoint))
        .layer(from_fn(request_logging_middleware))
        .layer(from_fn(metrics_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .layer(TimeoutLayer::new(request_timeout))
        .with_state(state)
}

pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
    request_timeout: Duration,
    grace_period: Duration,
}

impl Application {
    /// Connects the configured store and binds the listener.
    pub async fn build(config: TodoConfig) -> Result<Self, AppError> {
        let store: Arc<dyn TodoStore> = match config.store.backend {
            StoreBackend::MongoDb => {
                let uri = config.store.uri.as_deref().ok_or_else(|| {
                    AppError::ConfigError(anyhow::anyhow!(
                        "Set your 'MONGO_URI' environment variable"
                    ))
                })?;
                Arc::new(
                    MongoTodoStore::connect(
                        uri,
                        &config.store.database,
                        &config.store.collection,
                    )
                    .await?,
                )
            }
            StoreBackend::Memory => {
                tracing::info!("Using in-memory todo store");
                Arc::new(InMemoryTodoStore::new())
            }
        };

        Self::build_with_store(config, store).await
    }

    pub async fn build_with_store(
        config: TodoConfig,
        store: Arc<dyn TodoStore>,
    ) -> Result<Self, AppError> {
        let state = AppState { store };

        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Server Initialised!");

        Ok(Self {
            port,
            listener,
            state,
            request_timeout: REQUEST_TIMEOUT,
            grace_period: SHUTDOWN_GRACE_PERIOD,
        })
    }

    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    pub fn with_grace_period(mut self, grace_period: Duration) -> Self {
        self.grace_period = grace_period;
        self
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn store(&self) -> Arc<dyn TodoStore> {
        self.state.store.clone()
    }

    /// Serves until Ctrl+C or SIGTERM.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        self.run_with_shutdown(shutdown_signal()).await
    }

    /// Serves until `signal` resolves, then stops accepting connections, waits
    /// up to the grace period for in-flight requests and closes the store.
    pub async fn run_with_shutdown<F>(self, signal: F) -> std::io::Result<()>
    where
        F: Future<Output = ()>,
    {
        let Application {
            port,
            listener,
            state,
            request_timeout,
            grace_period,
        } = self;

        let router = build_router_with_timeout(state.clone(), request_timeout);

        tracing::info!("Listening on port {}", port);

        let (drain_tx, drain_rx) = oneshot::channel::<()>();
        let server = axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                let _ = drain_rx.await;
            })
            .into_future();
        let mut server = tokio::spawn(server);

        let stopped_early = tokio::select! {
            joined = &mut server => Some(joined),
            _ = signal => None,
        };

        let result = match stopped_early {
            Some(joined) => {
                tracing::error!("Server stopped before a shutdown signal");
                flatten(joined)
            }
            None => {
                tracing::info!("Shutting down server...");
                let _ = drain_tx.send(());
                match tokio::time::timeout(grace_period, &mut server).await {
                    Ok(joined) => flatten(joined),
                    Err(_) => {
                        tracing::warn!(
                            grace_period_secs = grace_period.as_secs_f64(),
                            "In-flight requests did not finish within the grace period"
                        );
                        server.abort();
                        Ok(())
                    }
                }
            }
        };

        state.store.close().await;

        match &result {
            Ok(()) => tracing::info!("Server gracefully shut down"),
            Err(e) => tracing::error!("Server error: {}", e),
        }

        result
    }
}

fn flatten(
    joined: Result<std::io::Result<()>, tokio::task::JoinError>,
) -> std::io::Result<()> {
    joined.map_err(std::io::Error::other)?
}

pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

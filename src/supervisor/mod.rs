//! The Supervisor module manages the lifecycle of the dashboard service.
//!
//! The `Supervisor` is the top-level owner of the refresh scheduler, the
//! cached dashboard state and the HTTP API. It starts every service, watches
//! their health, and on SIGINT/SIGTERM cancels them and waits for a clean
//! exit within the configured shutdown timeout.

mod builder;

use std::sync::Arc;

pub use builder::SupervisorBuilder;
use thiserror::Error;
use tokio::signal;
use tokio_util::sync::CancellationToken;

use crate::{
    aggregators::Aggregator,
    config::{AppConfig, AppConfigError},
    http_client::HttpClientError,
    http_server,
    providers::SourceError,
    scheduler::{DashboardState, RefreshScheduler},
};

/// Represents the set of errors that can occur during the supervisor's
/// operation.
#[derive(Debug, Error)]
pub enum SupervisorError {
    /// A required configuration was not provided to the `SupervisorBuilder`.
    #[error("Missing configuration for Supervisor")]
    MissingConfig,

    /// The configuration failed validation.
    #[error("Invalid configuration: {0}")]
    Config(#[from] AppConfigError),

    /// The shared HTTP client could not be built.
    #[error("HTTP client creation failed: {0}")]
    HttpClient(#[from] HttpClientError),

    /// The upstream client could not be created.
    #[error("Order source creation failed: {0}")]
    Source(#[from] SourceError),
}

/// The primary runtime manager for the application.
pub struct Supervisor {
    /// Shared application configuration.
    config: Arc<AppConfig>,

    /// Cached results and refresh state of every aggregator.
    dashboard: Arc<DashboardState>,

    /// The aggregators in evaluation order.
    aggregators: Vec<Arc<dyn Aggregator>>,

    /// A token used to signal a graceful shutdown to all supervised tasks.
    cancellation_token: CancellationToken,

    /// A set of all spawned tasks that the supervisor is actively managing.
    join_set: tokio::task::JoinSet<()>,
}

impl Supervisor {
    /// Creates a new Supervisor instance with all its required components.
    pub fn new(
        config: AppConfig,
        dashboard: Arc<DashboardState>,
        aggregators: Vec<Arc<dyn Aggregator>>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            dashboard,
            aggregators,
            cancellation_token: CancellationToken::new(),
            join_set: tokio::task::JoinSet::new(),
        }
    }

    /// Returns a new `SupervisorBuilder` instance.
    pub fn builder() -> SupervisorBuilder {
        SupervisorBuilder::new()
    }

    /// The cached dashboard state shared with the HTTP API.
    pub fn dashboard(&self) -> &Arc<DashboardState> {
        &self.dashboard
    }

    /// A token that shuts the supervisor down when cancelled.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation_token.clone()
    }

    /// Starts the supervisor and all its managed services.
    ///
    /// 1. Spawns a signal handler for `SIGINT` (Ctrl+C) and `SIGTERM`.
    /// 2. Spawns the HTTP server when enabled.
    /// 3. Spawns the refresh scheduler.
    /// 4. Watches the tasks until cancellation or a task failure, then waits
    ///    for every task to finish within the shutdown timeout.
    pub async fn run(mut self) -> Result<(), SupervisorError> {
        let cancellation_token = self.cancellation_token.clone();

        self.join_set.spawn(async move {
            let ctrl_c = signal::ctrl_c();
            #[cfg(unix)]
            let terminate = async {
                match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                    Ok(mut sigterm) => {
                        sigterm.recv().await;
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Failed to register SIGTERM handler.");
                        std::future::pending::<()>().await;
                    }
                }
            };
            #[cfg(not(unix))]
            let terminate = std::future::pending::<()>();

            tokio::select! {
                _ = ctrl_c => tracing::info!("SIGINT (Ctrl+C) received, initiating graceful shutdown."),
                _ = terminate => tracing::info!("SIGTERM received, initiating graceful shutdown."),
                _ = cancellation_token.cancelled() => {}
            }

            cancellation_token.cancel();
        });

        if self.config.server.enabled {
            let server_config = Arc::clone(&self.config);
            let server_dashboard = Arc::clone(&self.dashboard);
            let http_cancellation_token = self.cancellation_token.clone();
            self.join_set.spawn(async move {
                tokio::select! {
                    result = http_server::run_server_from_config(server_config, server_dashboard) => {
                        if let Err(e) = result {
                            tracing::error!(error = %e, "HTTP server stopped. Initiating shutdown.");
                            http_cancellation_token.cancel();
                        }
                    },
                    _ = http_cancellation_token.cancelled() => {
                        tracing::info!("HTTP server received shutdown signal.");
                    }
                }
            });
        }

        let scheduler = RefreshScheduler::new(
            Arc::clone(&self.dashboard),
            std::mem::take(&mut self.aggregators),
            self.config.refresh.clone(),
            self.cancellation_token.clone(),
        );
        self.join_set.spawn(scheduler.run());

        loop {
            tokio::select! {
                maybe_result = self.join_set.join_next() => {
                    match maybe_result {
                        Some(Ok(_)) => {}
                        Some(Err(e)) => {
                            tracing::error!("A critical task failed: {:?}. Initiating shutdown.", e);
                            self.cancellation_token.cancel();
                        }
                        None => break,
                    }
                }
                _ = self.cancellation_token.cancelled() => break,
            }
        }

        tracing::info!("Waiting for supervised tasks to finish...");
        let shutdown_timeout = self.config.shutdown_timeout;
        let drain = async {
            while let Some(result) = self.join_set.join_next().await {
                if let Err(e) = result {
                    tracing::warn!(error = %e, "Task ended abnormally during shutdown.");
                }
            }
        };

        if tokio::time::timeout(shutdown_timeout, drain).await.is_err() {
            tracing::warn!(
                "Tasks did not finish within the timeout of {:?}. Aborting them.",
                shutdown_timeout
            );
            self.join_set.shutdown().await;
        } else {
            tracing::info!("All supervised tasks have completed.");
        }

        tracing::info!("Supervisor shutdown complete.");
        Ok(())
    }
}

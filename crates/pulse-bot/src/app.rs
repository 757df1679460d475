//! Application wiring.
//!
//! Owns the scheduler and the response surface state, and runs them until
//! ctrl-c or an external cancellation.

use crate::config::{AppConfig, Secrets};
use crate::error::{AppError, AppResult};
use pulse_advice::{AdviceGenerator, ChatAdvisor};
use pulse_api::{serve, AnalysisPublisher, ApiError, ApiState};
use pulse_core::CycleResult;
use pulse_engine::{CycleOrchestrator, HistoryStore, Scheduler};
use pulse_signal::SignalEngine;
use pulse_upstream::{MetricsClient, MetricsClientConfig, SnapshotSource};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Main application.
pub struct Application {
    config: AppConfig,
    orchestrator: Arc<CycleOrchestrator>,
    scheduler: Arc<Scheduler>,
    api_state: ApiState,
    advice_enabled: bool,
    shutdown: CancellationToken,
}

impl Application {
    /// Create the application against the real upstream and advice APIs.
    pub fn new(config: AppConfig, secrets: Secrets) -> AppResult<Self> {
        let client = MetricsClient::new(MetricsClientConfig {
            base_url: config.upstream.base_url.clone(),
            api_key: secrets.upstream_api_key.clone(),
            timeout: config.upstream.timeout(),
        })?;

        let advisor: Option<Arc<dyn AdviceGenerator>> = match secrets.advice_api_key {
            Some(key) if config.advice.enabled => {
                Some(Arc::new(ChatAdvisor::new(&config.advice, key)?))
            }
            _ => None,
        };

        Self::with_components(config, Arc::new(client), advisor)
    }

    /// Create the application around an arbitrary snapshot source and
    /// advice generator.
    pub fn with_components(
        config: AppConfig,
        source: Arc<dyn SnapshotSource>,
        advisor: Option<Arc<dyn AdviceGenerator>>,
    ) -> AppResult<Self> {
        config.validate()?;

        let history = Arc::new(HistoryStore::new(config.history.capacity));
        let orchestrator = Arc::new(CycleOrchestrator::new(
            source,
            config.roster.clone(),
            config.upstream.preferred_interval,
            SignalEngine::new(&config.signal),
            history,
        )?);

        let api_state = ApiState::new();
        let shutdown = CancellationToken::new();
        let advice_enabled = advisor.is_some();
        let publisher = Arc::new(AnalysisPublisher::new(api_state.clone(), advisor));

        let scheduler = Arc::new(
            Scheduler::new(orchestrator.clone(), config.scheduler.interval())
                .with_sink(publisher)
                .with_shutdown_token(shutdown.clone()),
        );

        Ok(Self {
            config,
            orchestrator,
            scheduler,
            api_state,
            advice_enabled,
            shutdown,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn api_state(&self) -> ApiState {
        self.api_state.clone()
    }

    pub fn history(&self) -> &Arc<HistoryStore> {
        self.orchestrator.history()
    }

    /// Token stopping the scheduler and the server.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Run exactly one cycle and publish it.
    pub async fn run_once(&self) -> CycleResult {
        self.scheduler.run_once().await
    }

    /// Run until ctrl-c or cancellation of [`Self::shutdown_token`].
    pub async fn run(&self) -> AppResult<()> {
        self.log_startup();

        let server = if self.config.api.enabled {
            let addr = self.config.api.socket_addr();
            let listener = TcpListener::bind(addr)
                .await
                .map_err(|source| ApiError::Bind {
                    addr: addr.to_string(),
                    source,
                })?;
            info!(%addr, "API server listening");

            let state = self.api_state.clone();
            let token = self.shutdown.clone();
            Some(tokio::spawn(async move {
                if let Err(e) = serve(listener, state, token.clone()).await {
                    error!(error = %e, "API server failed, shutting down");
                    token.cancel();
                }
            }))
        } else {
            None
        };

        let shutdown = self.shutdown.clone();
        let signal_task = tokio::spawn(async move {
            tokio::select! {
                result = tokio::signal::ctrl_c() => {
                    match result {
                        Ok(()) => info!("Shutdown signal received"),
                        Err(e) => warn!(error = %e, "Failed to listen for ctrl-c"),
                    }
                    shutdown.cancel();
                }
                () = shutdown.cancelled() => {}
            }
        });

        self.scheduler.run().await;

        self.shutdown.cancel();
        if let Some(server) = server {
            server
                .await
                .map_err(|e| AppError::Task(format!("API server task: {e}")))?;
        }
        signal_task
            .await
            .map_err(|e| AppError::Task(format!("Signal task: {e}")))?;

        info!("Application stopped");
        Ok(())
    }

    fn log_startup(&self) {
        let (min_calls, max_calls) = self.config.upstream_calls_per_minute();
        info!(
            roster = self.config.roster.len(),
            interval_secs = self.config.scheduler.interval_secs,
            preferred_interval = %self.config.upstream.preferred_interval,
            scoring_mode = self.config.signal.scoring_mode.as_str(),
            history_capacity = self.config.history.capacity,
            advice = self.advice_enabled,
            api = self.config.api.enabled,
            "Starting agentpulse"
        );
        info!(
            min_per_minute = format!("{min_calls:.2}"),
            max_per_minute = format!("{max_calls:.2}"),
            "Expected upstream call volume"
        );
    }
}

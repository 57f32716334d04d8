//! The polling loop: reload config, ask the catalog for the latest image,
//! and fetch + render it once per distinct version.

mod shutdown;
mod state;

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::catalog::{Catalog, CatalogEntry};
use crate::config::{Config, ConfigSource};
use crate::fetcher::Fetcher;
use crate::render::Renderer;

pub use shutdown::{install_signal_handlers, listen_for_signals, Shutdown};
pub use state::{LoopState, Phase, TickOutcome};

/// Upper bound on how long a sleeping loop takes to notice shutdown.
pub const SHUTDOWN_POLL_GRANULARITY: Duration = Duration::from_secs(1);

pub struct SyncLoop<C, F> {
    source: ConfigSource,
    config: Config,
    catalog: C,
    fetcher: F,
    renderer: Arc<Renderer>,
    shutdown: Shutdown,
    state: LoopState,
}

impl<C, F> SyncLoop<C, F>
where
    C: Catalog,
    F: Fetcher,
{
    /// `config` is the result of the initial (fatal-on-error) load.
    pub fn new(
        source: ConfigSource,
        config: Config,
        catalog: C,
        fetcher: F,
        renderer: Arc<Renderer>,
        shutdown: Shutdown,
    ) -> Self {
        Self {
            source,
            config,
            catalog,
            fetcher,
            renderer,
            shutdown,
            state: LoopState::default(),
        }
    }

    pub fn state(&self) -> &LoopState {
        &self.state
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run ticks until shutdown is requested, then return the final state.
    pub async fn run(mut self) -> LoopState {
        info!(
            interval_secs = self.config.poll_interval().as_secs(),
            "Starting Love Notes Display service"
        );

        while self.shutdown.is_running() {
            self.state.enter(Phase::Idle);
            let outcome = self.tick().await;
            debug!(outcome = ?outcome, "Tick finished");
            self.sleep().await;
        }

        self.state.enter(Phase::Stopped);
        info!("Love Notes Display service stopped");
        self.state
    }

    /// One pass of reload, query, compare, fetch and render.
    /// Every failure is logged here and reported as an outcome.
    pub async fn tick(&mut self) -> TickOutcome {
        self.state.enter(Phase::CheckingConfig);
        if let Err(err) = self.source.reload(&mut self.config).await {
            warn!(error = %err, "Failed to reload config, keeping previous configuration");
        }

        self.state.enter(Phase::QueryingCatalog);
        let entry = match self.catalog.latest(&self.config).await {
            Ok(Some(entry)) => entry,
            Ok(None) => {
                debug!("No image published yet");
                return TickOutcome::NoEntry;
            }
            Err(err) => {
                error!(error = %err, "Failed to query catalog");
                return TickOutcome::CatalogFailed;
            }
        };

        if !self.shutdown.is_running() {
            return TickOutcome::Interrupted;
        }

        if !self.state.is_new(&entry.version) {
            self.state.enter(Phase::NoChange);
            debug!(version = %entry.version, "No new image available");
            return TickOutcome::Unchanged;
        }

        self.fetch_and_render(entry).await
    }

    async fn fetch_and_render(&mut self, entry: CatalogEntry) -> TickOutcome {
        info!(
            version = %entry.version,
            published_at = ?entry.published_at(),
            "New image detected"
        );

        self.state.enter(Phase::Fetching);
        let content = match self.fetcher.fetch(&entry.fetch_location).await {
            Ok(content) => content,
            Err(err) => {
                error!(version = %entry.version, error = %err, "Failed to download image");
                return TickOutcome::FetchFailed;
            }
        };

        if !self.shutdown.is_running() {
            return TickOutcome::Interrupted;
        }

        self.state.enter(Phase::Rendering);
        match self.renderer.render(content).await {
            Ok(()) => {
                self.state.mark_rendered(entry.version.clone());
                TickOutcome::Rendered(entry.version)
            }
            Err(err) => {
                let attempts = self.state.mark_render_failed(&entry.version);
                error!(
                    version = %entry.version,
                    attempts,
                    error = %err,
                    "Error displaying image"
                );
                TickOutcome::RenderFailed
            }
        }
    }

    /// Wait one poll interval, checking for shutdown every granularity step.
    async fn sleep(&mut self) {
        self.state.enter(Phase::Sleeping);
        let interval = self.config.poll_interval();
        let mut slept = Duration::ZERO;

        while slept < interval && self.shutdown.is_running() {
            let step = SHUTDOWN_POLL_GRANULARITY.min(interval - slept);
            tokio::time::sleep(step).await;
            slept += step;
        }
    }
}

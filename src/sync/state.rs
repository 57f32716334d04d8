use std::fmt;

use tracing::debug;

use crate::catalog::Version;

/// Where the loop currently is within a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    CheckingConfig,
    QueryingCatalog,
    NoChange,
    Fetching,
    Rendering,
    Sleeping,
    Stopped,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Idle => "idle",
            Phase::CheckingConfig => "checking_config",
            Phase::QueryingCatalog => "querying_catalog",
            Phase::NoChange => "no_change",
            Phase::Fetching => "fetching",
            Phase::Rendering => "rendering",
            Phase::Sleeping => "sleeping",
            Phase::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// Result of a single tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    Rendered(Version),
    Unchanged,
    NoEntry,
    CatalogFailed,
    FetchFailed,
    RenderFailed,
    /// Shutdown was requested while the tick was in flight.
    Interrupted,
}

/// In-memory loop state. Lives for the process only.
#[derive(Debug, Clone)]
pub struct LoopState {
    last_rendered: Option<Version>,
    phase: Phase,
    failing: Option<Version>,
    failed_renders: u32,
}

impl Default for LoopState {
    fn default() -> Self {
        Self {
            last_rendered: None,
            phase: Phase::Idle,
            failing: None,
            failed_renders: 0,
        }
    }
}

impl LoopState {
    pub fn last_rendered(&self) -> Option<&Version> {
        self.last_rendered.as_ref()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Consecutive failed renders of the version currently being retried
    pub fn failed_renders(&self) -> u32 {
        self.failed_renders
    }

    pub fn is_new(&self, version: &Version) -> bool {
        self.last_rendered.as_ref() != Some(version)
    }

    pub(super) fn enter(&mut self, phase: Phase) {
        if self.phase != phase {
            debug!(from = %self.phase, to = %phase, "Sync loop transition");
            self.phase = phase;
        }
    }

    pub(super) fn mark_rendered(&mut self, version: Version) {
        self.last_rendered = Some(version);
        self.failing = None;
        self.failed_renders = 0;
    }

    /// Record a failed render of `version`; returns the consecutive count.
    pub(super) fn mark_render_failed(&mut self, version: &Version) -> u32 {
        if self.failing.as_ref() == Some(version) {
            self.failed_renders = self.failed_renders.saturating_add(1);
        } else {
            self.failing = Some(version.clone());
            self.failed_renders = 1;
        }
        self.failed_renders
    }
}

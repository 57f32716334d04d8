use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::signal::unix::{signal, SignalKind};
use tracing::{info, warn};

/// Process-wide running flag. Cloned into whoever may request a stop.
#[derive(Debug, Clone)]
pub struct Shutdown {
    running: Arc<AtomicBool>,
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

impl Shutdown {
    pub fn new() -> Self {
        Self {
            running: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn trigger(&self) {
        self.running.store(false, Ordering::SeqCst);
    }
}

/// Spawn a task that flips `shutdown` on SIGINT or SIGTERM.
pub fn listen_for_signals(shutdown: Shutdown) -> std::io::Result<()> {
    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut terminate = signal(SignalKind::terminate())?;

    tokio::spawn(async move {
        let name = tokio::select! {
            _ = interrupt.recv() => "SIGINT",
            _ = terminate.recv() => "SIGTERM",
        };
        info!(signal = name, "Received signal, shutting down...");
        shutdown.trigger();
    });

    Ok(())
}

/// Installs the signal listener, degrading to "no graceful stop" on failure.
pub fn install_signal_handlers(shutdown: &Shutdown) {
    if let Err(err) = listen_for_signals(shutdown.clone()) {
        warn!(error = ?err, "Failed to install signal handlers");
    }
}

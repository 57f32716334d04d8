use std::process::ExitCode;
use std::sync::Arc;

use tracing::{error, info};

use love_notes_display::catalog::HttpCatalog;
use love_notes_display::config::{paths, ConfigSource};
use love_notes_display::fetcher::HttpFetcher;
use love_notes_display::logging;
use love_notes_display::render::{Display, FramebufferDisplay, Renderer};
use love_notes_display::sync::{install_signal_handlers, Shutdown, SyncLoop};
use love_notes_display::types::InitError;

#[tokio::main]
async fn main() -> ExitCode {
    let _logging = logging::init(&paths::log_dir());

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "Fatal error");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), InitError> {
    let shutdown = Shutdown::new();
    install_signal_handlers(&shutdown);

    let source = ConfigSource::from_env();
    let config = source.load().await?;

    let display = FramebufferDisplay::open(&config.display).await?;
    let (width, height) = display.dimensions();
    info!(
        device = %config.display.framebuffer.display(),
        width,
        height,
        "Initialized display"
    );
    let renderer = Arc::new(Renderer::new(Box::new(display)));

    let sync = SyncLoop::new(
        source,
        config,
        HttpCatalog::new()?,
        HttpFetcher::new()?,
        renderer,
        shutdown,
    );
    sync.run().await;
    Ok(())
}

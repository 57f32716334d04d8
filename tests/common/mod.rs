#![allow(dead_code)]

use std::collections::VecDeque;
use std::io::Cursor;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use serde_json::json;
use tempfile::TempDir;

use love_notes_display::catalog::{Catalog, CatalogEntry, Version};
use love_notes_display::config::{Config, ConfigSource};
use love_notes_display::fetcher::Fetcher;
use love_notes_display::render::{Display, Renderer};
use love_notes_display::sync::{Shutdown, SyncLoop};
use love_notes_display::types::{CatalogError, FetchError, RenderError};

pub const WIDTH: u32 = 4;
pub const HEIGHT: u32 = 3;

/// One scripted catalog answer.
#[derive(Debug, Clone)]
pub enum Step {
    Entry(&'static str, &'static str),
    NoEntry,
    Fail,
}

/// Catalog that replays a script, repeating the final step once exhausted.
#[derive(Clone, Default)]
pub struct ScriptedCatalog {
    steps: Arc<Mutex<VecDeque<Step>>>,
    last: Arc<Mutex<Option<Step>>>,
    seen_configs: Arc<Mutex<Vec<Config>>>,
    stop_on_query: Arc<Mutex<Option<Shutdown>>>,
}

impl ScriptedCatalog {
    pub fn new(steps: impl IntoIterator<Item = Step>) -> Self {
        let catalog = Self::default();
        catalog.steps.lock().unwrap().extend(steps);
        catalog
    }

    pub fn push(&self, step: Step) {
        self.steps.lock().unwrap().push_back(step);
    }

    pub fn seen_users(&self) -> Vec<String> {
        self.seen_configs
            .lock()
            .unwrap()
            .iter()
            .map(|config| config.user.clone())
            .collect()
    }

    pub fn queries(&self) -> usize {
        self.seen_configs.lock().unwrap().len()
    }

    /// Request shutdown from inside the next query, as a signal would mid-request.
    pub fn stop_on_query(&self, shutdown: Shutdown) {
        *self.stop_on_query.lock().unwrap() = Some(shutdown);
    }
}

#[async_trait]
impl Catalog for ScriptedCatalog {
    async fn latest(&self, config: &Config) -> Result<Option<CatalogEntry>, CatalogError> {
        self.seen_configs.lock().unwrap().push(config.clone());
        if let Some(shutdown) = self.stop_on_query.lock().unwrap().take() {
            shutdown.trigger();
        }

        let step = {
            let mut last = self.last.lock().unwrap();
            match self.steps.lock().unwrap().pop_front() {
                Some(step) => {
                    *last = Some(step.clone());
                    step
                }
                None => last.clone().unwrap_or(Step::NoEntry),
            }
        };

        match step {
            Step::Entry(version, location) => Ok(Some(CatalogEntry {
                version: Version::new(version),
                fetch_location: location.to_string(),
            })),
            Step::NoEntry => Ok(None),
            Step::Fail => Err(CatalogError::Timeout),
        }
    }
}

/// Fetcher serving a PNG for every location unless told otherwise.
#[derive(Clone, Default)]
pub struct FakeFetcher {
    requests: Arc<Mutex<Vec<String>>>,
    failing: Arc<AtomicBool>,
    corrupt: Arc<AtomicBool>,
}

impl FakeFetcher {
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn set_corrupt(&self, corrupt: bool) {
        self.corrupt.store(corrupt, Ordering::SeqCst);
    }
}

#[async_trait]
impl Fetcher for FakeFetcher {
    async fn fetch(&self, location: &str) -> Result<Vec<u8>, FetchError> {
        self.requests.lock().unwrap().push(location.to_string());
        if self.failing.load(Ordering::SeqCst) {
            return Err(FetchError::Timeout);
        }
        if self.corrupt.load(Ordering::SeqCst) {
            return Ok(b"definitely not an image".to_vec());
        }
        Ok(png_bytes(WIDTH, HEIGHT))
    }
}

/// Display that records frames and can be made to fail.
#[derive(Clone, Default)]
pub struct RecordingDisplay {
    shown: Arc<AtomicUsize>,
    failing: Arc<AtomicBool>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
    commit_delay: Option<Duration>,
}

impl RecordingDisplay {
    pub fn with_commit_delay(delay: Duration) -> Self {
        Self {
            commit_delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn shown(&self) -> usize {
        self.shown.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl Display for RecordingDisplay {
    fn dimensions(&self) -> (u32, u32) {
        (WIDTH, HEIGHT)
    }

    async fn show(&mut self, _image: &DynamicImage) -> Result<(), RenderError> {
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        if let Some(delay) = self.commit_delay {
            tokio::time::sleep(delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(RenderError::Device(std::io::Error::other("panel busy")));
        }
        self.shown.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([200, 40, 90])));
    let mut buf = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .expect("encode png");
    buf
}

/// Config file in a temp dir plus the fakes wired into a loop.
pub struct TestEnv {
    _tmp: TempDir,
    pub config_path: PathBuf,
    pub catalog: ScriptedCatalog,
    pub fetcher: FakeFetcher,
    pub display: RecordingDisplay,
    pub shutdown: Shutdown,
}

impl TestEnv {
    pub fn new(steps: impl IntoIterator<Item = Step>) -> Self {
        Self::with_display(steps, RecordingDisplay::default())
    }

    pub fn with_display(steps: impl IntoIterator<Item = Step>, display: RecordingDisplay) -> Self {
        let tmp = TempDir::new().expect("create temp dir");
        let config_path = tmp.path().join("config.json");
        let env = Self {
            _tmp: tmp,
            config_path,
            catalog: ScriptedCatalog::new(steps),
            fetcher: FakeFetcher::default(),
            display,
            shutdown: Shutdown::new(),
        };
        env.write_config("alice", "https://notes.example/api");
        env
    }

    pub fn write_config(&self, user: &str, api_url: &str) {
        let contents = json!({
            "user": user,
            "password": "secret",
            "api_url": api_url,
        });
        std::fs::write(&self.config_path, contents.to_string()).expect("write config");
    }

    pub fn corrupt_config(&self) {
        std::fs::write(&self.config_path, "user: [unterminated").expect("write config");
    }

    pub async fn sync_loop(&self) -> SyncLoop<ScriptedCatalog, FakeFetcher> {
        let source = ConfigSource::new(&self.config_path);
        let config = source.load().await.expect("initial config");
        let renderer = Arc::new(Renderer::new(Box::new(self.display.clone())));
        SyncLoop::new(
            source,
            config,
            self.catalog.clone(),
            self.fetcher.clone(),
            renderer,
            self.shutdown.clone(),
        )
    }
}

/// Serve exactly one HTTP response on a local port.
/// Resolves to the raw request head the client sent.
pub async fn serve_once(
    status_line: &'static str,
    body: Vec<u8>,
) -> (String, tokio::task::JoinHandle<String>) {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let base_url = format!("http://{}", listener.local_addr().expect("local addr"));

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.expect("accept");
        let mut head = Vec::new();
        let mut buf = [0u8; 1024];
        while !head.windows(4).any(|window| window == b"\r\n\r\n") {
            let read = socket.read(&mut buf).await.expect("read request");
            if read == 0 {
                break;
            }
            head.extend_from_slice(&buf[..read]);
        }

        let response_head = format!(
            "HTTP/1.1 {status_line}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            body.len()
        );
        socket
            .write_all(response_head.as_bytes())
            .await
            .expect("write head");
        socket.write_all(&body).await.expect("write body");
        socket.shutdown().await.ok();

        String::from_utf8_lossy(&head).into_owned()
    });

    (base_url, handle)
}

/// Config pointing at `api_url` with fixed credentials.
pub fn config_for(api_url: &str) -> Config {
    serde_json::from_value(json!({
        "user": "alice",
        "password": "open sesame",
        "api_url": api_url,
    }))
    .expect("valid config")
}

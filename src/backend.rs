//! Requests to the analysis backend.
//!
//! Every call is fire-and-forget: [`Backend::send`] returns nothing, and an
//! implementation that fails logs the failure and moves on. The backend only
//! receives telemetry and analysis requests, so local play never waits on it.

use std::fmt;
#[cfg(feature = "http")]
use std::sync::mpsc;
#[cfg(feature = "http")]
use std::thread;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::constants::ANALYSIS_REQUEST;

/// One request to the backend, with everything needed to put it on the wire.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BackendRequest {
    /// A move log line, e.g. `BLACK played D5`.
    Log(String),
    /// Ask for a fresh analysis; `seq` numbers requests within a session.
    AnalysisRequest { seq: u64 },
    /// Description of an undone move.
    Undo(String),
    /// Seat configuration, e.g. `players B=human W=ai`.
    PlayerStatus(String),
    ClearBoard,
    BoardSize(usize),
}

#[derive(Serialize)]
struct BoardSizeBody {
    size: usize,
}

impl BackendRequest {
    pub fn path(&self) -> &'static str {
        match self {
            BackendRequest::Log(_) | BackendRequest::AnalysisRequest { .. } => "/log",
            BackendRequest::Undo(_) => "/undo",
            BackendRequest::PlayerStatus(_) => "/player_status",
            BackendRequest::ClearBoard => "/clear_board",
            BackendRequest::BoardSize(_) => "/board_size",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            BackendRequest::ClearBoard | BackendRequest::BoardSize(_) => "application/json",
            _ => "text/plain",
        }
    }

    /// The request body. The analysis sequence number is not part of the
    /// wire format; the backend only understands the bare token.
    pub fn body(&self) -> String {
        match self {
            BackendRequest::Log(text)
            | BackendRequest::Undo(text)
            | BackendRequest::PlayerStatus(text) => text.clone(),
            BackendRequest::AnalysisRequest { .. } => ANALYSIS_REQUEST.to_string(),
            BackendRequest::ClearBoard => String::new(),
            BackendRequest::BoardSize(size) => {
                serde_json::to_string(&BoardSizeBody { size: *size }).unwrap_or_default()
            }
        }
    }
}

impl fmt::Display for BackendRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "POST {} {:?}", self.path(), self.body())
    }
}

/// A failed backend call. Only ever logged.
#[derive(Debug)]
pub enum BackendError {
    Transport(String),
    Status { path: &'static str, status: u16 },
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendError::Transport(err) => write!(f, "request failed: {err}"),
            BackendError::Status { path, status } => {
                write!(f, "POST {path} returned status {status}")
            }
        }
    }
}

impl std::error::Error for BackendError {}

/// Where the bridge sends its requests.
pub trait Backend {
    fn send(&mut self, request: BackendRequest);
}

impl<B: Backend + ?Sized> Backend for &mut B {
    fn send(&mut self, request: BackendRequest) {
        (**self).send(request)
    }
}

impl<B: Backend + ?Sized> Backend for Box<B> {
    fn send(&mut self, request: BackendRequest) {
        (**self).send(request)
    }
}

/// Logs requests instead of sending them. Used when no backend is configured.
#[derive(Debug, Default)]
pub struct TracingBackend;

impl Backend for TracingBackend {
    fn send(&mut self, request: BackendRequest) {
        info!(path = request.path(), body = %request.body(), "Backend request (offline)");
    }
}

/// Keeps every request in memory, in order.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    pub requests: Vec<BackendRequest>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bodies of all `/log` requests, analysis requests included.
    pub fn log_bodies(&self) -> Vec<String> {
        self.requests
            .iter()
            .filter(|r| r.path() == "/log")
            .map(BackendRequest::body)
            .collect()
    }

    pub fn analysis_requests(&self) -> usize {
        self.requests
            .iter()
            .filter(|r| matches!(r, BackendRequest::AnalysisRequest { .. }))
            .count()
    }

    pub fn take(&mut self) -> Vec<BackendRequest> {
        std::mem::take(&mut self.requests)
    }
}

impl Backend for RecordingBackend {
    fn send(&mut self, request: BackendRequest) {
        debug!(%request, "Recording backend request");
        self.requests.push(request);
    }
}

/// Sends requests to the backend over HTTP from a worker thread.
///
/// [`Backend::send`] only queues the request, so a slow or unreachable
/// backend never holds up the session. Requests are posted in the order they
/// were sent. Dropping the backend lets the worker finish the queue first.
#[cfg(feature = "http")]
pub struct HttpBackend {
    sender: Option<mpsc::Sender<BackendRequest>>,
    worker: Option<thread::JoinHandle<()>>,
}

#[cfg(feature = "http")]
struct HttpPoster {
    client: reqwest::blocking::Client,
    base: String,
}

#[cfg(feature = "http")]
impl HttpPoster {
    fn post(&self, request: &BackendRequest) -> Result<(), BackendError> {
        let url = format!("{}{}", self.base, request.path());
        let response = self
            .client
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, request.content_type())
            .body(request.body())
            .send()
            .map_err(|err| BackendError::Transport(err.to_string()))?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(BackendError::Status {
                path: request.path(),
                status: response.status().as_u16(),
            })
        }
    }

    fn run(self, requests: mpsc::Receiver<BackendRequest>) {
        for request in requests {
            if let Err(err) = self.post(&request) {
                warn!(%err, "Backend request dropped");
            }
        }
        debug!("Backend worker stopped");
    }
}

#[cfg(feature = "http")]
impl HttpBackend {
    pub fn new(base: &str, timeout: std::time::Duration) -> Result<Self, BackendError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| BackendError::Transport(err.to_string()))?;
        let poster = HttpPoster {
            client,
            base: base.trim_end_matches('/').to_string(),
        };

        let (sender, receiver) = mpsc::channel();
        let worker = thread::Builder::new()
            .name("backend-poster".to_string())
            .spawn(move || poster.run(receiver))
            .map_err(|err| BackendError::Transport(err.to_string()))?;
        Ok(Self {
            sender: Some(sender),
            worker: Some(worker),
        })
    }
}

#[cfg(feature = "http")]
impl Backend for HttpBackend {
    fn send(&mut self, request: BackendRequest) {
        debug!(%request, "Queueing backend request");
        let Some(sender) = &self.sender else {
            return;
        };
        if let Err(mpsc::SendError(request)) = sender.send(request) {
            warn!(%request, "Backend worker is gone, request dropped");
        }
    }
}

#[cfg(feature = "http")]
impl Drop for HttpBackend {
    fn drop(&mut self) {
        // Closing the channel ends the worker once the queue is drained.
        self.sender.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("Backend worker panicked");
            }
        }
    }
}

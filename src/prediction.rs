//! Classifier client: the `/predict` request, the backend status probe, and
//! the single-flight requester the UI drives.

use crate::candidate::CandidateParameters;
use crate::http_client::{build_agent, endpoint, read_response_string, RequestTimeouts, MAX_RESPONSE_BYTES};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::{mpsc, Arc};
use std::time::{Duration, Instant};
use thiserror::Error;

/// Label shown in place of a prediction when the request failed.
pub const ERROR_LABEL: &str = "Error";

#[derive(Debug, Error)]
pub enum PredictionError {
    #[error("backend returned HTTP {status}: {message}")]
    Status { status: u16, message: String },
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: Box<ureq::Transport>,
    },
    #[error("failed to read response: {0}")]
    Read(#[from] std::io::Error),
    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Outcome of one prediction request, replaced wholesale on every request.
#[derive(Clone, Debug, PartialEq)]
pub enum PredictionResult {
    Classified {
        prediction: String,
        probabilities: BTreeMap<String, f64>,
    },
    Failed {
        message: String,
    },
}

#[derive(Deserialize)]
struct PredictResponse {
    prediction: String,
    #[serde(default)]
    probabilities: BTreeMap<String, f64>,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
    message: Option<String>,
}

impl From<PredictResponse> for PredictionResult {
    fn from(resp: PredictResponse) -> Self {
        PredictionResult::Classified {
            prediction: resp.prediction,
            probabilities: resp.probabilities,
        }
    }
}

impl PredictionResult {
    pub fn failed(message: impl Into<String>) -> Self {
        PredictionResult::Failed { message: message.into() }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, PredictionResult::Failed { .. })
    }

    pub fn label(&self) -> &str {
        match self {
            PredictionResult::Classified { prediction, .. } => prediction,
            PredictionResult::Failed { .. } => ERROR_LABEL,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            PredictionResult::Classified { .. } => None,
            PredictionResult::Failed { message } => Some(message),
        }
    }

    /// `label: xx.xx%` lines in label order. Empty for a failed request.
    pub fn formatted_probabilities(&self) -> Vec<String> {
        match self {
            PredictionResult::Classified { probabilities, .. } => probabilities
                .iter()
                .map(|(label, p)| format!("{}: {}", label, format_percent(*p)))
                .collect(),
            PredictionResult::Failed { .. } => Vec::new(),
        }
    }
}

/// A finished request as shown in the side panel.
#[derive(Clone, Debug)]
pub struct PredictionReport {
    pub result: PredictionResult,
    pub received_at: chrono::DateTime<chrono::Local>,
    pub elapsed: Duration,
}

impl PredictionReport {
    pub fn new(result: PredictionResult, elapsed: Duration) -> Self {
        Self { result, received_at: chrono::Local::now(), elapsed }
    }

    pub fn summary(&self) -> String {
        format!(
            "{} in {} ms at {}",
            if self.result.is_error() { "failed" } else { "answered" },
            self.elapsed.as_millis(),
            self.received_at.format("%H:%M:%S")
        )
    }
}

pub fn format_percent(probability: f64) -> String {
    format!("{:.2}%", probability * 100.0)
}

/// Response of `GET /`.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct BackendStatus {
    pub status: String,
    #[serde(default)]
    pub message: String,
}

impl BackendStatus {
    pub fn is_online(&self) -> bool {
        self.status == "online"
    }
}

pub struct PredictionClient {
    agent: ureq::Agent,
    base_url: String,
}

impl PredictionClient {
    pub fn new(base_url: &str, timeouts: RequestTimeouts) -> Self {
        Self {
            agent: build_agent(timeouts),
            base_url: base_url.to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn predict(&self, params: &CandidateParameters) -> Result<PredictionResult, PredictionError> {
        let url = endpoint(&self.base_url, "predict");
        match self.agent.post(&url).send_json(params) {
            Ok(response) => {
                let body = read_response_string(response, MAX_RESPONSE_BYTES)?;
                let parsed: PredictResponse = serde_json::from_str(&body)?;
                Ok(parsed.into())
            }
            Err(ureq::Error::Status(status, response)) => {
                let body = error_body(response);
                Err(PredictionError::Status { status, message: error_message(&body) })
            }
            Err(ureq::Error::Transport(source)) => Err(PredictionError::Transport {
                url,
                source: Box::new(source),
            }),
        }
    }

    /// Probe `GET /`. A non-2xx reply that still carries a status body is
    /// returned as `Ok` so the caller can show the backend's own message.
    pub fn status(&self) -> Result<BackendStatus, PredictionError> {
        let url = endpoint(&self.base_url, "");
        match self.agent.get(&url).call() {
            Ok(response) => {
                let body = read_response_string(response, MAX_RESPONSE_BYTES)?;
                Ok(serde_json::from_str(&body)?)
            }
            Err(ureq::Error::Status(status, response)) => {
                let body = error_body(response);
                serde_json::from_str::<BackendStatus>(&body)
                    .map_err(|_| PredictionError::Status { status, message: error_message(&body) })
            }
            Err(ureq::Error::Transport(source)) => Err(PredictionError::Transport {
                url,
                source: Box::new(source),
            }),
        }
    }
}

/// Body of a non-2xx reply, or the status reason when the body is empty or
/// unreadable.
fn error_body(response: ureq::Response) -> String {
    let reason = response.status_text().to_string();
    match read_response_string(response, MAX_RESPONSE_BYTES) {
        Ok(body) if !body.trim().is_empty() => body,
        Ok(_) => reason,
        Err(err) => {
            log::warn!("failed to read error body: {err}");
            reason
        }
    }
}

fn error_message(body: &str) -> String {
    let parsed = serde_json::from_str::<ErrorBody>(body).ok();
    parsed
        .and_then(|b| b.error.or(b.message))
        .unwrap_or_else(|| body.trim().chars().take(200).collect())
}

/// Run one prediction and fold any failure into the error placeholder.
pub fn run_prediction(client: &PredictionClient, params: &CandidateParameters) -> PredictionResult {
    match client.predict(params) {
        Ok(result) => {
            log::info!("prediction from {}: {}", client.base_url(), result.label());
            result
        }
        Err(err) => {
            log::error!("error making prediction: {err}");
            PredictionResult::failed(err.to_string())
        }
    }
}

struct InFlight {
    rx: mpsc::Receiver<PredictionResult>,
    started: Instant,
}

/// Runs predictions on a worker thread, at most one at a time.
#[derive(Default)]
pub struct PredictionRequester {
    in_flight: Option<InFlight>,
}

impl PredictionRequester {
    pub fn is_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn elapsed(&self) -> Option<Duration> {
        self.in_flight.as_ref().map(|f| f.started.elapsed())
    }

    /// Start a request. Returns `false` without doing anything when one is
    /// already in flight.
    pub fn submit(&mut self, client: &Arc<PredictionClient>, params: CandidateParameters) -> bool {
        if self.in_flight.is_some() {
            log::debug!("prediction already in flight; ignoring submit");
            return false;
        }
        let (tx, rx) = mpsc::channel();
        let client = Arc::clone(client);
        std::thread::spawn(move || {
            let _ = tx.send(run_prediction(&client, &params));
        });
        self.in_flight = Some(InFlight { rx, started: Instant::now() });
        true
    }

    /// Collect the finished result, if any, with how long the request took.
    pub fn poll(&mut self) -> Option<(PredictionResult, Duration)> {
        let flight = self.in_flight.as_ref()?;
        let result = match flight.rx.try_recv() {
            Ok(result) => result,
            Err(mpsc::TryRecvError::Empty) => return None,
            Err(mpsc::TryRecvError::Disconnected) => {
                log::error!("prediction worker exited without a result");
                PredictionResult::failed("prediction worker stopped")
            }
        };
        let elapsed = flight.started.elapsed();
        self.in_flight = None;
        Some((result, elapsed))
    }
}

pub enum BackendStatusState {
    Unknown,
    Checking(mpsc::Receiver<Result<BackendStatus, String>>),
    Reported(BackendStatus),
    Unreachable(String),
}

impl BackendStatusState {
    /// Start a probe on a worker thread. A probe already running is kept.
    pub fn check(&mut self, client: &Arc<PredictionClient>) {
        if matches!(self, BackendStatusState::Checking(_)) {
            return;
        }
        let (tx, rx) = mpsc::channel();
        let client = Arc::clone(client);
        std::thread::spawn(move || {
            let _ = tx.send(client.status().map_err(|e| e.to_string()));
        });
        *self = BackendStatusState::Checking(rx);
    }

    /// Returns `true` when a probe finished this call.
    pub fn poll(&mut self) -> bool {
        let BackendStatusState::Checking(rx) = self else {
            return false;
        };
        let next = match rx.try_recv() {
            Ok(Ok(status)) => {
                log::info!("backend status: {} ({})", status.status, status.message);
                BackendStatusState::Reported(status)
            }
            Ok(Err(err)) => {
                log::warn!("backend unreachable: {err}");
                BackendStatusState::Unreachable(err)
            }
            Err(mpsc::TryRecvError::Empty) => return false,
            Err(mpsc::TryRecvError::Disconnected) => {
                BackendStatusState::Unreachable("status probe stopped".to_string())
            }
        };
        *self = next;
        true
    }

    pub fn is_checking(&self) -> bool {
        matches!(self, BackendStatusState::Checking(_))
    }
}

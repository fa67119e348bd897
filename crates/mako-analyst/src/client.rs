// Analysis gateway client
//
// Speaks the common chat-completion streaming protocol against the analysis
// gateway: POST with `stream: true`, response body fed through the SSE frame
// decoder and exposed as a finite, non-restartable stream. Non-2xx statuses
// map to labeled retryable errors; transport failures surface as Unavailable.

use std::collections::VecDeque;
use std::pin::Pin;
use std::sync::Mutex;

use async_trait::async_trait;
use futures::stream::{self, BoxStream, Stream, StreamExt};
use reqwest::Client;
use serde::Serialize;
use tracing::debug;

use mako_core::{QuinnError, Result};

use crate::message::ChatMessage;
use crate::sse::SseFrameDecoder;

pub const DEFAULT_GATEWAY_URL: &str = "https://ai.gateway.lovable.dev/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "google/gemini-3-flash-preview";

pub const API_KEY_ENV: &str = "MAKO_GATEWAY_API_KEY";
pub const GATEWAY_URL_ENV: &str = "MAKO_GATEWAY_URL";

/// One element of an analysis stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisEvent {
    /// Incremental assistant text
    Delta(String),
    /// Stream complete; no further events follow
    Done,
}

/// Finite stream of analysis events. Dropping it stops further reads.
pub type AnalysisStream = Pin<Box<dyn Stream<Item = Result<AnalysisEvent>> + Send>>;

/// Seam between the transcript and the gateway, mockable in tests.
#[async_trait]
pub trait AnalysisDriver: Send + Sync {
    /// Starts one streamed analysis request. The returned stream is finite
    /// and not restartable.
    async fn analysis_stream(
        &self,
        system_message: String,
        messages: Vec<ChatMessage>,
    ) -> Result<AnalysisStream>;
}

/// HTTP client for the analysis gateway.
///
/// # Example
///
/// ```ignore
/// let client = AnalystClient::from_env()?;
/// // or
/// let client = AnalystClient::new("your-api-key");
/// // or with a custom endpoint
/// let client = AnalystClient::with_base_url("your-api-key", "https://gateway.example/v1/chat/completions");
/// ```
#[derive(Clone)]
pub struct AnalystClient {
    client: Client,
    api_key: String,
    api_url: String,
    model: String,
}

impl AnalystClient {
    /// Creates a client for the default gateway with the given API key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            api_url: DEFAULT_GATEWAY_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    /// Creates a client from `MAKO_GATEWAY_API_KEY` (and `MAKO_GATEWAY_URL`
    /// when set)
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var(API_KEY_ENV).map_err(|_| {
            QuinnError::unavailable(format!("{API_KEY_ENV} environment variable not set"))
        })?;
        let mut client = Self::new(api_key);
        if let Ok(url) = std::env::var(GATEWAY_URL_ENV) {
            client.api_url = url;
        }
        Ok(client)
    }

    /// Creates a client for a custom gateway endpoint
    pub fn with_base_url(api_key: impl Into<String>, api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            ..Self::new(api_key)
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }
}

impl std::fmt::Debug for AnalystClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalystClient")
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

struct DecodeState {
    bytes: BoxStream<'static, Result<Vec<u8>>>,
    decoder: SseFrameDecoder,
    pending: VecDeque<AnalysisEvent>,
    finished: bool,
}

#[async_trait]
impl AnalysisDriver for AnalystClient {
    async fn analysis_stream(
        &self,
        system_message: String,
        messages: Vec<ChatMessage>,
    ) -> Result<AnalysisStream> {
        let mut wire = Vec::with_capacity(messages.len() + 1);
        wire.push(WireMessage {
            role: "system",
            content: &system_message,
        });
        for msg in &messages {
            wire.push(WireMessage {
                role: msg.role.as_str(),
                content: &msg.content,
            });
        }
        let request = ChatRequest {
            model: &self.model,
            messages: wire,
            stream: true,
        };

        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| QuinnError::unavailable(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            debug!(status = status.as_u16(), "analysis gateway rejected request");
            return Err(QuinnError::from_gateway_status(status.as_u16(), message));
        }

        let state = DecodeState {
            bytes: response
                .bytes_stream()
                .map(|chunk| {
                    chunk
                        .map(|b| b.to_vec())
                        .map_err(|e| QuinnError::unavailable(format!("stream read failed: {e}")))
                })
                .boxed(),
            decoder: SseFrameDecoder::new(),
            pending: VecDeque::new(),
            finished: false,
        };

        Ok(Box::pin(stream::unfold(state, |mut state| async move {
            loop {
                if let Some(event) = state.pending.pop_front() {
                    return Some((Ok(event), state));
                }
                if state.finished {
                    return None;
                }
                if state.decoder.is_done() {
                    state.finished = true;
                    return Some((Ok(AnalysisEvent::Done), state));
                }
                match state.bytes.next().await {
                    Some(Ok(chunk)) => {
                        for delta in state.decoder.push(&chunk) {
                            state.pending.push_back(AnalysisEvent::Delta(delta));
                        }
                    }
                    Some(Err(e)) => {
                        state.finished = true;
                        return Some((Err(e), state));
                    }
                    None => {
                        // Server closed without the sentinel; flush residuals.
                        for delta in state.decoder.finish() {
                            state.pending.push_back(AnalysisEvent::Delta(delta));
                        }
                        state.pending.push_back(AnalysisEvent::Done);
                        state.finished = true;
                    }
                }
            }
        })))
    }
}

// ============================================================================
// Mock driver for tests
// ============================================================================

/// One scripted turn of a [`MockAnalysisDriver`]
pub enum MockTurn {
    /// Stream these events in order
    Events(Vec<Result<AnalysisEvent>>),
    /// Fail the request before any event
    Fail(QuinnError),
}

/// Scripted driver: replays one [`MockTurn`] per request, in order.
/// Exhausted scripts reply with an immediate `Done`.
#[derive(Default)]
pub struct MockAnalysisDriver {
    script: Mutex<VecDeque<MockTurn>>,
    last_system_message: Mutex<Option<String>>,
}

impl MockAnalysisDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a turn that streams `deltas` then completes
    pub fn streaming(self, deltas: &[&str]) -> Self {
        let mut events: Vec<Result<AnalysisEvent>> = deltas
            .iter()
            .map(|d| Ok(AnalysisEvent::Delta(d.to_string())))
            .collect();
        events.push(Ok(AnalysisEvent::Done));
        self.push(MockTurn::Events(events))
    }

    /// Queues a turn that fails before producing any event
    pub fn failing(self, error: QuinnError) -> Self {
        self.push(MockTurn::Fail(error))
    }

    /// Queues a turn that streams `deltas` and then errors mid-stream
    pub fn failing_mid_stream(self, deltas: &[&str], error: QuinnError) -> Self {
        let mut events: Vec<Result<AnalysisEvent>> = deltas
            .iter()
            .map(|d| Ok(AnalysisEvent::Delta(d.to_string())))
            .collect();
        events.push(Err(error));
        self.push(MockTurn::Events(events))
    }

    fn push(self, turn: MockTurn) -> Self {
        self.lock_script().push_back(turn);
        self
    }

    /// System message of the most recent request, for assertions
    pub fn last_system_message(&self) -> Option<String> {
        self.last_system_message
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
    }

    fn lock_script(&self) -> std::sync::MutexGuard<'_, VecDeque<MockTurn>> {
        self.script.lock().unwrap_or_else(|p| p.into_inner())
    }
}

#[async_trait]
impl AnalysisDriver for MockAnalysisDriver {
    async fn analysis_stream(
        &self,
        system_message: String,
        _messages: Vec<ChatMessage>,
    ) -> Result<AnalysisStream> {
        *self
            .last_system_message
            .lock()
            .unwrap_or_else(|p| p.into_inner()) = Some(system_message);

        match self.lock_script().pop_front() {
            Some(MockTurn::Fail(error)) => Err(error),
            Some(MockTurn::Events(events)) => Ok(Box::pin(stream::iter(events))),
            None => Ok(Box::pin(stream::iter(vec![Ok(AnalysisEvent::Done)]))),
        }
    }
}

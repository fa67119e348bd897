// Mako Analyst - streaming analysis decoder and context builder
//
// Decision: SSE framing is decoded by an explicit line-buffer state machine;
//           a frame split across reads is re-buffered, never dropped
// Decision: The gateway speaks the common chat-completion streaming protocol;
//           the delta path is choices[0].delta.content
// Decision: run_turn takes &mut self, so overlapping turns are structurally
//           impossible and stale streams cannot interleave

pub mod client;
pub mod context;
pub mod message;
pub mod sse;
pub mod transcript;

// Re-exports for convenience
pub use client::{
    AnalysisDriver, AnalysisEvent, AnalysisStream, AnalystClient, MockAnalysisDriver, MockTurn,
    DEFAULT_GATEWAY_URL, DEFAULT_MODEL,
};
pub use context::{AnalysisContext, SYSTEM_PROMPT};
pub use message::{ChatMessage, ChatRole};
pub use sse::SseFrameDecoder;
pub use transcript::ChatTranscript;

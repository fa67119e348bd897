// Chat transcript
//
// Owns the conversation with the analyst. One turn pushes the user message,
// streams the reply into a single in-progress assistant message, and
// finalizes on Done or stream end. `run_turn` takes `&mut self`, so a new
// turn cannot start while one is outstanding and stale output can never
// interleave with a newer request.

use futures::StreamExt;
use tracing::debug;

use mako_core::Result;

use crate::client::{AnalysisDriver, AnalysisEvent};
use crate::context::AnalysisContext;
use crate::message::ChatMessage;

#[derive(Debug, Default)]
pub struct ChatTranscript {
    messages: Vec<ChatMessage>,
}

impl ChatTranscript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Runs one conversation turn and returns the assistant's full reply.
    ///
    /// A failure before any delta leaves the transcript with the user message
    /// only; a mid-stream failure keeps the partial assistant text. Both
    /// surface the error to the caller (retry = send again).
    pub async fn run_turn(
        &mut self,
        driver: &dyn AnalysisDriver,
        context: &AnalysisContext,
        text: impl Into<String>,
    ) -> Result<String> {
        self.messages.push(ChatMessage::user(text));
        let history = self.messages.clone();

        let mut stream = driver
            .analysis_stream(context.system_message(), history)
            .await?;

        let mut assistant_index: Option<usize> = None;
        while let Some(event) = stream.next().await {
            match event? {
                AnalysisEvent::Delta(delta) => match assistant_index {
                    Some(idx) => self.messages[idx].content.push_str(&delta),
                    None => {
                        self.messages.push(ChatMessage::assistant(delta));
                        assistant_index = Some(self.messages.len() - 1);
                    }
                },
                AnalysisEvent::Done => break,
            }
        }

        let reply = assistant_index
            .map(|idx| self.messages[idx].content.clone())
            .unwrap_or_default();
        debug!(chars = reply.len(), "analysis turn complete");
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MockAnalysisDriver;
    use crate::message::ChatRole;
    use mako_core::QuinnError;

    fn empty_context() -> AnalysisContext {
        AnalysisContext {
            incidents: vec![],
            events: vec![],
            session_name: None,
        }
    }

    #[tokio::test]
    async fn test_turn_assembles_single_assistant_message() {
        let driver = MockAnalysisDriver::new().streaming(&["Hello", " world"]);
        let mut transcript = ChatTranscript::new();

        let reply = transcript
            .run_turn(&driver, &empty_context(), "what broke?")
            .await
            .unwrap();

        assert_eq!(reply, "Hello world");
        let messages = transcript.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, ChatRole::User);
        assert_eq!(messages[1].role, ChatRole::Assistant);
        assert_eq!(messages[1].content, "Hello world");
    }

    #[tokio::test]
    async fn test_request_failure_keeps_user_message_only() {
        let driver = MockAnalysisDriver::new().failing(QuinnError::RateLimited);
        let mut transcript = ChatTranscript::new();

        let err = transcript
            .run_turn(&driver, &empty_context(), "status?")
            .await
            .unwrap_err();

        assert!(matches!(err, QuinnError::RateLimited));
        assert!(err.is_retryable());
        let messages = transcript.messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, ChatRole::User);
    }

    #[tokio::test]
    async fn test_mid_stream_failure_keeps_partial_reply() {
        let driver = MockAnalysisDriver::new()
            .failing_mid_stream(&["partial "], QuinnError::unavailable("connection reset"));
        let mut transcript = ChatTranscript::new();

        let err = transcript
            .run_turn(&driver, &empty_context(), "status?")
            .await
            .unwrap_err();

        assert!(matches!(err, QuinnError::Unavailable(_)));
        let messages = transcript.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].content, "partial ");
    }

    #[tokio::test]
    async fn test_consecutive_turns_do_not_interleave() {
        let driver = MockAnalysisDriver::new()
            .streaming(&["first"])
            .streaming(&["second"]);
        let mut transcript = ChatTranscript::new();

        transcript
            .run_turn(&driver, &empty_context(), "one")
            .await
            .unwrap();
        transcript
            .run_turn(&driver, &empty_context(), "two")
            .await
            .unwrap();

        let messages = transcript.messages();
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[1].content, "first");
        assert_eq!(messages[3].content, "second");
    }

    #[tokio::test]
    async fn test_system_message_reaches_driver() {
        let driver = MockAnalysisDriver::new().streaming(&["ok"]);
        let mut transcript = ChatTranscript::new();

        transcript
            .run_turn(&driver, &empty_context(), "hi")
            .await
            .unwrap();

        let system = driver.last_system_message().unwrap();
        assert!(system.starts_with("You are Quinn"));
        assert!(system.ends_with("No incident data available."));
    }
}

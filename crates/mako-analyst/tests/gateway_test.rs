// Gateway integration tests
//
// Exercises AnalystClient against a wiremock server: streamed bodies decode
// into ordered deltas, non-2xx statuses map to the labeled retryable errors,
// and a rejected request leaves the transcript's prior messages untouched.

use futures::StreamExt;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use mako_analyst::{
    AnalysisContext, AnalysisDriver, AnalysisEvent, AnalystClient, ChatMessage, ChatTranscript,
};
use mako_core::QuinnError;

const SSE_BODY: &str = "data: {\"choices\":[{\"delta\":{\"content\":\"Hello\"}}]}\n\ndata: {\"choices\":[{\"delta\":{\"content\":\" world\"}}]}\n\ndata: [DONE]\n\n";

fn client_for(server: &MockServer) -> AnalystClient {
    AnalystClient::with_base_url("test-key", format!("{}/v1/chat/completions", server.uri()))
}

fn empty_context() -> AnalysisContext {
    AnalysisContext {
        incidents: vec![],
        events: vec![],
        session_name: None,
    }
}

async fn mount_stream(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("Authorization", "Bearer test-key"))
        .and(body_partial_json(serde_json::json!({ "stream": true })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(SSE_BODY.as_bytes(), "text/event-stream"),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn streamed_body_decodes_into_ordered_deltas() {
    let server = MockServer::start().await;
    mount_stream(&server).await;

    let client = client_for(&server);
    let mut stream = client
        .analysis_stream("system prompt".to_string(), vec![ChatMessage::user("hi")])
        .await
        .unwrap();

    let mut deltas = Vec::new();
    let mut done = false;
    while let Some(event) = stream.next().await {
        match event.unwrap() {
            AnalysisEvent::Delta(d) => deltas.push(d),
            AnalysisEvent::Done => done = true,
        }
    }

    assert_eq!(deltas, vec!["Hello".to_string(), " world".to_string()]);
    assert!(done);
}

#[tokio::test]
async fn run_turn_against_live_stream() {
    let server = MockServer::start().await;
    mount_stream(&server).await;

    let client = client_for(&server);
    let mut transcript = ChatTranscript::new();
    let reply = transcript
        .run_turn(&client, &empty_context(), "what broke?")
        .await
        .unwrap();

    assert_eq!(reply, "Hello world");
    assert_eq!(transcript.messages().len(), 2);
}

#[tokio::test]
async fn rate_limit_maps_to_labeled_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .analysis_stream("system".to_string(), vec![])
        .await
        .err().unwrap();

    assert!(matches!(err, QuinnError::RateLimited));
    assert!(err.to_string().contains("Rate limit exceeded"));
}

#[tokio::test]
async fn exhausted_credits_map_to_labeled_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(402))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .analysis_stream("system".to_string(), vec![])
        .await
        .err().unwrap();

    assert!(matches!(err, QuinnError::CreditsExhausted));
    assert!(err.to_string().contains("AI credits exhausted"));
}

#[tokio::test]
async fn other_gateway_errors_carry_the_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .analysis_stream("system".to_string(), vec![])
        .await
        .err().unwrap();

    match err {
        QuinnError::Gateway { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "upstream exploded");
        }
        other => panic!("expected gateway error, got {other:?}"),
    }
}

#[tokio::test]
async fn rejected_request_leaves_transcript_history_intact() {
    let server = MockServer::start().await;
    mount_stream(&server).await;

    let client = client_for(&server);
    let mut transcript = ChatTranscript::new();
    transcript
        .run_turn(&client, &empty_context(), "first question")
        .await
        .unwrap();

    // Swap the gateway behavior to a rejection for the second turn.
    server.reset().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let err = transcript
        .run_turn(&client, &empty_context(), "second question")
        .await
        .err().unwrap();
    assert!(matches!(err, QuinnError::RateLimited));

    // First turn untouched; only the optimistic second user message was added.
    let messages = transcript.messages();
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[0].content, "first question");
    assert_eq!(messages[1].content, "Hello world");
    assert_eq!(messages[2].content, "second question");
}

#[tokio::test]
async fn stream_without_sentinel_still_completes() {
    let server = MockServer::start().await;
    let body = "data: {\"choices\":[{\"delta\":{\"content\":\"cut\"}}]}\n";
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body.as_bytes(), "text/event-stream"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut stream = client
        .analysis_stream("system".to_string(), vec![])
        .await
        .unwrap();

    let mut deltas = Vec::new();
    let mut done = false;
    while let Some(event) = stream.next().await {
        match event.unwrap() {
            AnalysisEvent::Delta(d) => deltas.push(d),
            AnalysisEvent::Done => done = true,
        }
    }
    assert_eq!(deltas, vec!["cut".to_string()]);
    assert!(done);
}

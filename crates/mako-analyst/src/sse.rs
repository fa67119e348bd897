// SSE frame decoder
//
// Decodes a chunked byte stream of `data: <json>` frames into incremental
// assistant text. The decoder is a state machine over one byte buffer: bytes
// after the last newline stay buffered, so neither UTF-8 code points nor
// frames are corrupted by chunk boundaries. A complete line whose JSON fails
// to parse is pushed back (newline restored) until more bytes arrive; the
// final flush skips such lines instead so one bad line cannot swallow the
// rest of the stream.

use serde::Deserialize;

const DATA_PREFIX: &str = "data: ";
const DONE_SENTINEL: &str = "[DONE]";

/// Wire shape of one streamed chat-completion chunk.
/// Everything defaults so shape drift degrades to "no delta", not an error.
#[derive(Debug, Deserialize)]
struct StreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: StreamDelta,
}

#[derive(Debug, Default, Deserialize)]
struct StreamDelta {
    #[serde(default)]
    content: Option<String>,
}

enum LineOutcome {
    /// Blank, comment, non-data, or delta-less line
    Nothing,
    Delta(String),
    Done,
    /// JSON parse failure, possibly a line split across reads
    Malformed,
}

fn classify(line: &str) -> LineOutcome {
    let line = line.strip_suffix('\r').unwrap_or(line);
    if line.is_empty() || line.starts_with(':') {
        return LineOutcome::Nothing;
    }
    let Some(payload) = line.strip_prefix(DATA_PREFIX) else {
        return LineOutcome::Nothing;
    };
    let payload = payload.trim();
    if payload == DONE_SENTINEL {
        return LineOutcome::Done;
    }

    let value: serde_json::Value = match serde_json::from_str(payload) {
        Ok(value) => value,
        Err(_) => return LineOutcome::Malformed,
    };
    // Valid JSON of an unexpected shape is tolerated, not re-buffered.
    let Ok(chunk) = serde_json::from_value::<StreamChunk>(value) else {
        return LineOutcome::Nothing;
    };
    match chunk.choices.into_iter().next().and_then(|c| c.delta.content) {
        Some(text) if !text.is_empty() => LineOutcome::Delta(text),
        _ => LineOutcome::Nothing,
    }
}

/// Incremental decoder for one server-sent analysis response.
///
/// Feed chunks with [`push`](Self::push); call [`finish`](Self::finish) once
/// the underlying read reports end-of-stream. After the `[DONE]` sentinel all
/// further input is discarded.
#[derive(Debug, Default)]
pub struct SseFrameDecoder {
    buffer: Vec<u8>,
    done: bool,
}

impl SseFrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the completion sentinel has been observed
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Consumes one received chunk, returning the text deltas of every frame
    /// completed by it, in order.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        if self.done {
            return Vec::new();
        }
        self.buffer.extend_from_slice(chunk);
        self.drain(false)
    }

    /// Final pass over residual buffered content after end-of-stream.
    ///
    /// A well-formed stream already terminated via `[DONE]`; this guards
    /// against a server closing the connection without the sentinel.
    pub fn finish(&mut self) -> Vec<String> {
        if self.done {
            self.buffer.clear();
            return Vec::new();
        }
        let mut deltas = self.drain(true);
        if !self.done && !self.buffer.is_empty() {
            // Trailing content without a newline still counts as a line here.
            let line = String::from_utf8_lossy(&self.buffer).into_owned();
            self.buffer.clear();
            match classify(&line) {
                LineOutcome::Delta(delta) => deltas.push(delta),
                LineOutcome::Done => self.done = true,
                LineOutcome::Nothing | LineOutcome::Malformed => {}
            }
        }
        deltas
    }

    fn drain(&mut self, final_flush: bool) -> Vec<String> {
        let mut deltas = Vec::new();
        while let Some(newline) = self.buffer.iter().position(|&b| b == b'\n') {
            let line_bytes: Vec<u8> = self.buffer.drain(..=newline).collect();
            let line = String::from_utf8_lossy(&line_bytes[..newline]).into_owned();
            match classify(&line) {
                LineOutcome::Nothing => {}
                LineOutcome::Delta(delta) => deltas.push(delta),
                LineOutcome::Done => {
                    self.done = true;
                    self.buffer.clear();
                    return deltas;
                }
                LineOutcome::Malformed => {
                    if final_flush {
                        continue;
                    }
                    // The line may be split across reads: restore it with its
                    // newline and wait for more bytes before retrying.
                    let mut restored = line_bytes;
                    restored.extend_from_slice(&self.buffer);
                    self.buffer = restored;
                    return deltas;
                }
            }
        }
        deltas
    }
}

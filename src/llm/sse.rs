//! Incremental Server-Sent Events line parsing shared by every
//! OpenAI-wire-compatible adapter and Gemini's SSE transport.
//!
//! Bytes arrive in arbitrary chunks from the HTTP body; this buffers them,
//! splits on newlines, and yields the payload of every `data: ` line. A
//! literal `[DONE]` payload is reported as `SseEvent::Done` so callers can
//! stop without trying to parse it as JSON. Lines that aren't `data: `
//! prefixed (blank keep-alives, `event:` lines, comments) are dropped.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseEvent {
    Data(String),
    Done,
}

#[derive(Default)]
pub struct SseDecoder {
    buffer: String,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one more chunk of bytes, returning every complete event it
    /// produced. Any trailing partial line is held until the next call.
    pub fn push(&mut self, chunk: &str) -> Vec<SseEvent> {
        self.buffer.push_str(chunk);
        let mut events = Vec::new();

        while let Some(pos) = self.buffer.find('\n') {
            let line = self.buffer[..pos].trim_end_matches('\r').to_string();
            self.buffer.drain(..=pos);

            let payload = if let Some(rest) = line.strip_prefix("data: ") {
                Some(rest)
            } else if let Some(rest) = line.strip_prefix("data:") {
                Some(rest.trim_start())
            } else {
                None
            };

            if let Some(payload) = payload {
                if payload.trim() == "[DONE]" {
                    events.push(SseEvent::Done);
                } else if !payload.is_empty() {
                    events.push(SseEvent::Data(payload.to_string()));
                }
            }
        }

        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_multiple_events_in_one_chunk() {
        let mut decoder = SseDecoder::new();
        let events = decoder.push("data: {\"a\":1}\n\ndata: {\"a\":2}\n\n");
        assert_eq!(
            events,
            vec![
                SseEvent::Data("{\"a\":1}".to_string()),
                SseEvent::Data("{\"a\":2}".to_string()),
            ]
        );
    }

    #[test]
    fn holds_partial_line_across_chunks() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.push("data: {\"a\"").is_empty());
        let events = decoder.push(":1}\n");
        assert_eq!(events, vec![SseEvent::Data("{\"a\":1}".to_string())]);
    }

    #[test]
    fn recognizes_done_sentinel() {
        let mut decoder = SseDecoder::new();
        let events = decoder.push("data: [DONE]\n");
        assert_eq!(events, vec![SseEvent::Done]);
    }

    #[test]
    fn ignores_non_data_lines() {
        let mut decoder = SseDecoder::new();
        let events = decoder.push("event: ping\n: comment\n\ndata: {\"a\":1}\n");
        assert_eq!(events, vec![SseEvent::Data("{\"a\":1}".to_string())]);
    }
}

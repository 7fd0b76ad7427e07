use std::collections::VecDeque;
use std::pin::Pin;

use futures_util::stream::{self, Stream, StreamExt};

use crate::AnalysisError;
use crate::sse::{DecodeStats, SseDecoder, SseItem};

#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    Delta { content: String },
    /// Last item of a cleanly finished stream (sentinel or end of body)
    Done { stats: DecodeStats },
}

pub type DeltaStream = Pin<Box<dyn Stream<Item = Result<StreamEvent, AnalysisError>> + Send>>;

struct DecodeState<S> {
    bytes: Pin<Box<S>>,
    decoder: SseDecoder,
    pending: VecDeque<String>,
    finished: bool,
    closed: bool,
}

impl<S> DecodeState<S> {
    fn absorb(&mut self, items: Vec<SseItem>) {
        for item in items {
            match item {
                SseItem::Delta(content) => self.pending.push_back(content),
                SseItem::Done => self.finished = true,
            }
        }
    }
}

/// Turn a raw response body into ordered text deltas.
///
/// Nothing is read until the stream is polled. A transport error is yielded
/// once after every delta decoded before it and ends the stream.
pub fn delta_stream<S, B, E>(bytes: S) -> DeltaStream
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Into<AnalysisError> + Send + 'static,
{
    let state = DecodeState {
        bytes: Box::pin(bytes),
        decoder: SseDecoder::new(),
        pending: VecDeque::new(),
        finished: false,
        closed: false,
    };

    Box::pin(stream::unfold(state, |mut state| async move {
        loop {
            if let Some(content) = state.pending.pop_front() {
                return Some((Ok(StreamEvent::Delta { content }), state));
            }
            if state.closed {
                return None;
            }
            if state.finished {
                state.closed = true;
                let stats = state.decoder.stats();
                tracing::debug!(
                    "Stream finished: {} deltas, {} skipped events",
                    stats.deltas,
                    stats.skipped()
                );
                return Some((Ok(StreamEvent::Done { stats }), state));
            }

            match state.bytes.next().await {
                Some(Ok(chunk)) => {
                    let items = state.decoder.feed(chunk.as_ref());
                    state.absorb(items);
                }
                Some(Err(e)) => {
                    state.closed = true;
                    return Some((Err(e.into()), state));
                }
                None => {
                    let items = state.decoder.finish();
                    state.absorb(items);
                    state.finished = true;
                }
            }
        }
    }))
}

#[cfg(test)]
mod tests {
    use futures_util::StreamExt;

    use super::*;

    fn chunk(text: &str) -> Result<Vec<u8>, AnalysisError> {
        Ok(text.as_bytes().to_vec())
    }

    #[tokio::test]
    async fn test_deltas_then_done() {
        let body = stream::iter(vec![
            chunk("data: {\"choices\":[{\"delta\":{\"content\":\"Hel\"}}]}\n\ndata: {\"cho"),
            chunk("ices\":[{\"delta\":{\"content\":\"lo\"}}]}\n\n"),
            chunk("data: [DONE]\n\n"),
        ]);

        let events: Vec<_> = delta_stream(body).collect().await;
        let events: Vec<_> = events.into_iter().map(Result::unwrap).collect();

        assert_eq!(events.len(), 3);
        assert_eq!(
            events[0],
            StreamEvent::Delta {
                content: "Hel".to_string()
            }
        );
        assert_eq!(
            events[1],
            StreamEvent::Delta {
                content: "lo".to_string()
            }
        );
        assert!(matches!(events[2], StreamEvent::Done { stats } if stats.deltas == 2));
    }

    #[tokio::test]
    async fn test_body_without_sentinel_still_completes() {
        let body = stream::iter(vec![chunk(
            "data: {\"choices\":[{\"delta\":{\"content\":\"tail\"}}]}",
        )]);

        let events: Vec<_> = delta_stream(body).collect().await;
        assert_eq!(events.len(), 2);
        assert!(matches!(events[1], Ok(StreamEvent::Done { .. })));
    }

    #[tokio::test]
    async fn test_error_after_partial_content() {
        let body = stream::iter(vec![
            chunk("data: {\"choices\":[{\"delta\":{\"content\":\"partial\"}}]}\n"),
            Err(AnalysisError::Api {
                status: 502,
                message: "connection reset".to_string(),
            }),
            chunk("data: {\"choices\":[{\"delta\":{\"content\":\"never\"}}]}\n"),
        ]);

        let mut events = delta_stream(body);
        assert!(matches!(
            events.next().await,
            Some(Ok(StreamEvent::Delta { content })) if content == "partial"
        ));
        assert!(matches!(
            events.next().await,
            Some(Err(AnalysisError::Api { status: 502, .. }))
        ));
        assert!(events.next().await.is_none());
    }
}

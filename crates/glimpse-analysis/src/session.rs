use std::future::Future;

use futures_util::StreamExt;
use glimpse_types::SessionId;

use crate::sse::DecodeStats;
use crate::stream::StreamEvent;
use crate::{AnalysisError, AnalysisRequest, VisionProvider};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Requesting,
    Streaming,
    Complete,
    Failed(String),
}

/// Text accumulated for one capture's analysis
#[derive(Debug, Clone)]
pub struct AnalysisSession {
    id: SessionId,
    prompt: String,
    accumulated_text: String,
    state: SessionState,
}

impl AnalysisSession {
    pub fn new(id: SessionId, prompt: impl Into<String>) -> Self {
        Self {
            id,
            prompt: prompt.into(),
            accumulated_text: String::new(),
            state: SessionState::Idle,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn text(&self) -> &str {
        &self.accumulated_text
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.state, SessionState::Complete | SessionState::Failed(_))
    }

    pub fn begin_request(&mut self) {
        self.accumulated_text.clear();
        self.state = SessionState::Requesting;
    }

    pub fn push_delta(&mut self, delta: &str) {
        if self.is_finished() {
            return;
        }
        self.accumulated_text.push_str(delta);
        self.state = SessionState::Streaming;
    }

    pub fn complete(&mut self) {
        if !self.is_finished() {
            self.state = SessionState::Complete;
        }
    }

    /// Partial text is kept
    pub fn fail(&mut self, reason: impl Into<String>) {
        if !self.is_finished() {
            self.state = SessionState::Failed(reason.into());
        }
    }
}

/// Run one analysis to the end, handing every delta to `on_delta` in order.
///
/// The session ends `Complete` or `Failed`; dropping the returned future
/// abandons the HTTP stream and leaves the session where it was.
pub async fn analyze<F, Fut>(
    provider: &dyn VisionProvider,
    session: &mut AnalysisSession,
    png: Vec<u8>,
    api_key: &str,
    mut on_delta: F,
) -> Result<DecodeStats, AnalysisError>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = ()>,
{
    session.begin_request();
    let request = AnalysisRequest {
        png,
        prompt: session.prompt().to_string(),
        api_key: api_key.to_string(),
    };

    let mut events = match provider.analyze(request).await {
        Ok(events) => events,
        Err(e) => {
            session.fail(e.to_string());
            return Err(e);
        }
    };

    while let Some(event) = events.next().await {
        match event {
            Ok(StreamEvent::Delta { content }) => {
                session.push_delta(&content);
                on_delta(content).await;
            }
            Ok(StreamEvent::Done { stats }) => {
                session.complete();
                return Ok(stats);
            }
            Err(e) => {
                tracing::warn!(
                    "Analysis {} failed after {} bytes: {}",
                    session.id(),
                    session.text().len(),
                    e
                );
                session.fail(e.to_string());
                return Err(e);
            }
        }
    }

    session.complete();
    Ok(DecodeStats::default())
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use futures_util::stream;

    use super::*;
    use crate::stream::{DeltaStream, delta_stream};
    use crate::{OpenAiCompatibleProvider, ProviderMetadata};

    /// Replays a canned body, optionally cut short by a transport error
    struct ScriptedProvider {
        chunks: Vec<&'static str>,
        fail_at_end: bool,
        seen: Arc<Mutex<Vec<AnalysisRequest>>>,
    }

    #[async_trait::async_trait]
    impl VisionProvider for ScriptedProvider {
        async fn analyze(&self, request: AnalysisRequest) -> Result<DeltaStream, AnalysisError> {
            self.seen.lock().unwrap().push(request);
            let mut body: Vec<Result<Vec<u8>, AnalysisError>> = self
                .chunks
                .iter()
                .map(|c| Ok(c.as_bytes().to_vec()))
                .collect();
            if self.fail_at_end {
                body.push(Err(AnalysisError::Api {
                    status: 0,
                    message: "stream reset".to_string(),
                }));
            }
            Ok(delta_stream(stream::iter(body)))
        }

        fn metadata(&self) -> ProviderMetadata {
            ProviderMetadata {
                name: "scripted".to_string(),
                model: "none".to_string(),
                requires_api_key: false,
            }
        }
    }

    fn scripted(fail_at_end: bool) -> ScriptedProvider {
        ScriptedProvider {
            chunks: vec![
                "data: {\"choices\":[{\"delta\":{\"content\":\"It shows \"}}]}\n",
                "data: {\"choices\":[{\"delta\":{\"content\":\"a chart\"}}]}\n",
            ],
            fail_at_end,
            seen: Arc::default(),
        }
    }

    #[test]
    fn test_state_transitions() {
        let mut session = AnalysisSession::new(SessionId::new(), "prompt");
        assert_eq!(session.state(), &SessionState::Idle);

        session.begin_request();
        assert_eq!(session.state(), &SessionState::Requesting);

        session.push_delta("a");
        session.push_delta("b");
        assert_eq!(session.state(), &SessionState::Streaming);
        assert_eq!(session.text(), "ab");

        session.complete();
        session.push_delta("late");
        session.fail("too late");
        assert_eq!(session.state(), &SessionState::Complete);
        assert_eq!(session.text(), "ab");
    }

    #[tokio::test]
    async fn test_analyze_delivers_deltas_in_order() {
        let provider = scripted(false);
        let mut session = AnalysisSession::new(SessionId::new(), "What is on screen?");
        let received = Arc::new(Mutex::new(Vec::new()));

        let sink = received.clone();
        let stats = analyze(&provider, &mut session, vec![1, 2, 3], "key", |delta| {
            sink.lock().unwrap().push(delta);
            async {}
        })
        .await
        .unwrap();

        assert_eq!(*received.lock().unwrap(), vec!["It shows ", "a chart"]);
        assert_eq!(session.text(), "It shows a chart");
        assert_eq!(session.state(), &SessionState::Complete);
        assert_eq!(stats.deltas, 2);

        let seen = provider.seen.lock().unwrap();
        assert_eq!(seen[0].prompt, "What is on screen?");
        assert_eq!(seen[0].png, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_transport_error_keeps_partial_text() {
        let provider = scripted(true);
        let mut session = AnalysisSession::new(SessionId::new(), "prompt");

        let result = analyze(&provider, &mut session, vec![], "key", |_| async {}).await;

        assert!(result.is_err());
        assert_eq!(session.text(), "It shows a chart");
        assert!(matches!(session.state(), SessionState::Failed(reason) if reason.contains("stream reset")));
    }

    #[tokio::test]
    async fn test_missing_credential_fails_session() {
        let provider = OpenAiCompatibleProvider::new(
            "http://127.0.0.1:9/v1/chat/completions".to_string(),
            "model".to_string(),
            16,
        );
        let mut session = AnalysisSession::new(SessionId::new(), "prompt");

        let result = analyze(&provider, &mut session, vec![], "", |_| async {}).await;

        assert!(matches!(result, Err(AnalysisError::MissingCredential)));
        assert_eq!(
            session.state(),
            &SessionState::Failed("No API key configured".to_string())
        );
    }
}

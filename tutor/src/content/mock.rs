//! Scriptable provider for tests and offline demos.
//!
//! Responses are scripted per `ContentKind`: queued one-shot responses are served first,
//! then the sticky default for that kind. Unscripted kinds answer `Malformed`, which drives
//! the steps' fallback paths.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;

use super::{ContentKind, ContentProvider, ContentRequest, ProviderError};

type Reply = Result<String, ProviderError>;

#[derive(Default)]
struct Script {
    queued: HashMap<ContentKind, VecDeque<Reply>>,
    defaults: HashMap<ContentKind, Reply>,
    calls: HashMap<ContentKind, usize>,
    requests: Vec<ContentRequest>,
}

/// Mock content provider.
///
/// **Interaction**: Implements `ContentProvider`; handed to `StepRegistry::standard` in
/// tests so classifications and lesson content are deterministic.
#[derive(Default)]
pub struct MockProvider {
    script: Mutex<Script>,
}

impl MockProvider {
    /// Every kind unscripted: all steps take their fallback path.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sticky response for `kind` (builder).
    pub fn with_default(self, kind: ContentKind, text: impl Into<String>) -> Self {
        self.set_default(kind, Ok(text.into()));
        self
    }

    /// Sticky failure for `kind` (builder).
    pub fn with_default_failure(self, kind: ContentKind, err: ProviderError) -> Self {
        self.set_default(kind, Err(err));
        self
    }

    /// Classifier that always answers `label` with confidence 0.9.
    pub fn classifying(label: &str) -> Self {
        Self::new().with_default(ContentKind::Classification, classification_json(label, 0.9))
    }

    /// Replaces the sticky reply for `kind`; usable while the provider is shared.
    pub fn set_default(&self, kind: ContentKind, reply: Reply) {
        self.lock().defaults.insert(kind, reply);
    }

    /// One-shot reply served before the default.
    pub fn push(&self, kind: ContentKind, text: impl Into<String>) {
        self.lock()
            .queued
            .entry(kind)
            .or_default()
            .push_back(Ok(text.into()));
    }

    /// One-shot failure served before the default.
    pub fn push_failure(&self, kind: ContentKind, err: ProviderError) {
        self.lock().queued.entry(kind).or_default().push_back(Err(err));
    }

    /// Number of `generate` calls seen for `kind`.
    pub fn calls(&self, kind: ContentKind) -> usize {
        self.lock().calls.get(&kind).copied().unwrap_or(0)
    }

    /// All requests seen, in order.
    pub fn requests(&self) -> Vec<ContentRequest> {
        self.lock().requests.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// JSON a classifier would return.
pub fn classification_json(label: &str, confidence: f32) -> String {
    serde_json::json!({
        "understanding": label,
        "confidence": confidence,
        "reasoning": "scripted",
    })
    .to_string()
}

#[async_trait]
impl ContentProvider for MockProvider {
    async fn generate(&self, request: &ContentRequest) -> Result<String, ProviderError> {
        let kind = request.kind();
        let mut script = self.lock();
        *script.calls.entry(kind).or_insert(0) += 1;
        script.requests.push(request.clone());
        if let Some(reply) = script.queued.get_mut(&kind).and_then(VecDeque::pop_front) {
            return reply;
        }
        script
            .defaults
            .get(&kind)
            .cloned()
            .unwrap_or_else(|| Err(ProviderError::Malformed(format!("no scripted {kind:?} response"))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify() -> ContentRequest {
        ContentRequest::ClassifyUnderstanding {
            concept: "c".into(),
            explanation: "e".into(),
            question: "q".into(),
            response: "r".into(),
        }
    }

    #[tokio::test]
    async fn queued_then_default_then_counts() {
        let mock = MockProvider::classifying("understood");
        mock.push_failure(ContentKind::Classification, ProviderError::Unavailable("down".into()));

        let first = mock.generate(&classify()).await;
        assert_eq!(first, Err(ProviderError::Unavailable("down".into())));
        let second = mock.generate(&classify()).await.unwrap();
        assert!(second.contains("understood"));
        assert_eq!(mock.calls(ContentKind::Classification), 2);
        assert_eq!(mock.calls(ContentKind::Mcqs), 0);
        assert_eq!(mock.requests().len(), 2);
    }

    #[tokio::test]
    async fn unscripted_kind_is_malformed() {
        let mock = MockProvider::new();
        let r = mock.generate(&classify()).await;
        assert!(matches!(r, Err(ProviderError::Malformed(_))));
    }
}

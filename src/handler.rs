//! The query handler — the whole request path.
//!
//! Trim and validate, check the answer store, pace and issue the remote
//! call on a miss, persist fresh answers, and degrade to the canned-answer
//! table when anything on the remote path fails. Every request is
//! independent; the answer store is the only shared mutable state.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::cache::{cache_key, AnswerStore};
use crate::error::{GatewiseError, Result};
use crate::fallback::FallbackTable;
use crate::providers::InferenceProvider;
use crate::throttle::RequestGate;

/// Persona and response-shape guidance sent with every inference request.
pub const SYSTEM_PROMPT: &str = "You are an AI airport travel assistant specializing in global airport navigation. Provide:
1. Terminal/gate navigation tips
2. Security checkpoint advice
3. Lounge access information
4. Transportation options
5. Airport-specific amenities
6. Real-time guidance (when possible)
Keep responses under 150 words, factual, and include estimated walking times where applicable.";

/// Fixed prompt returned for empty or whitespace-only queries.
pub const EMPTY_QUERY_PROMPT: &str = "Please enter your airport travel question.";

/// Terminal outcome of handling one query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerOutcome {
    /// A real answer: cache hit, fresh remote answer, or fallback match.
    Reply(String),
    /// The query was empty after trimming; caller renders the fixed prompt.
    EmptyQuery,
    /// Remote path failed and no fallback keyword matched: the generic tip
    /// plus the underlying failure description as a diagnostic.
    Unresolved { reply: String, error: String },
}

/// Handles one free-text travel query end to end.
pub struct QueryHandler {
    provider: Option<Arc<dyn InferenceProvider>>,
    store: Arc<Mutex<Box<dyn AnswerStore>>>,
    fallbacks: FallbackTable,
    gate: RequestGate,
}

impl QueryHandler {
    pub fn new(
        provider: Option<Arc<dyn InferenceProvider>>,
        store: Box<dyn AnswerStore>,
        fallbacks: FallbackTable,
        gate: RequestGate,
    ) -> Self {
        Self {
            provider,
            store: Arc::new(Mutex::new(store)),
            fallbacks,
            gate,
        }
    }

    /// Resolve a query to its terminal outcome. Never surfaces a raw error.
    pub async fn handle(&self, query: &str) -> AnswerOutcome {
        let query = query.trim();
        match self.resolve_remote(query).await {
            Ok(answer) => AnswerOutcome::Reply(answer),
            // Validation short-circuit — never reaches fallback resolution.
            Err(GatewiseError::EmptyQuery) => AnswerOutcome::EmptyQuery,
            Err(err) => self.resolve_fallback(query, err),
        }
    }

    /// Validate, then cache-or-remote resolution.
    async fn resolve_remote(&self, query: &str) -> Result<String> {
        if query.is_empty() {
            return Err(GatewiseError::EmptyQuery);
        }

        let provider = self
            .provider
            .as_ref()
            .ok_or_else(|| GatewiseError::NotConfigured("no API credential".to_string()))?;

        let key = cache_key(query);

        if let Some(answer) = self.store.lock().await.get(&key) {
            debug!(key = %&key[..8], "Answer cache hit");
            return Ok(answer);
        }

        // Pay the pacing cost on every miss, never on hits.
        self.gate.acquire().await;

        let answer = provider.generate(SYSTEM_PROMPT, query).await?;

        // Persist best-effort: a store failure must not cost the caller a
        // freshly generated answer.
        if let Err(e) = self.store.lock().await.put(key, answer.clone()) {
            warn!("Failed to persist answer store: {}", e);
        }

        Ok(answer)
    }

    /// Degrade to the canned-answer table, or the generic tip + diagnostic.
    fn resolve_fallback(&self, query: &str, err: GatewiseError) -> AnswerOutcome {
        warn!(error = %err, "Remote path failed, using fallback resolution");

        if let Some(canned) = self.fallbacks.resolve(query) {
            return AnswerOutcome::Reply(canned.to_string());
        }

        AnswerOutcome::Unresolved {
            reply: self.fallbacks.default_tip().to_string(),
            error: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::JsonFileStore;
    use crate::providers::QUOTA_RELABEL;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tempfile::TempDir;

    /// Mock provider that returns a fixed answer and counts calls.
    struct CountingProvider {
        answer: String,
        calls: AtomicUsize,
    }

    impl CountingProvider {
        fn new(answer: &str) -> Arc<Self> {
            Arc::new(Self {
                answer: answer.to_string(),
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl InferenceProvider for CountingProvider {
        async fn generate(&self, _system_prompt: &str, _query: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.answer.clone())
        }

        fn name(&self) -> &str {
            "counting-mock"
        }
    }

    /// Mock provider that always fails with the given description.
    struct FailingProvider {
        description: String,
    }

    #[async_trait]
    impl InferenceProvider for FailingProvider {
        async fn generate(&self, _system_prompt: &str, _query: &str) -> Result<String> {
            Err(crate::providers::classify_provider_error(&self.description))
        }

        fn name(&self) -> &str {
            "failing-mock"
        }
    }

    fn handler_with(provider: Option<Arc<dyn InferenceProvider>>, tmp: &TempDir) -> QueryHandler {
        QueryHandler::new(
            provider,
            Box::new(JsonFileStore::open(tmp.path().join("answers.json"))),
            FallbackTable::default(),
            RequestGate::new(Duration::from_millis(0)),
        )
    }

    #[tokio::test]
    async fn test_empty_query_short_circuits() {
        let tmp = TempDir::new().unwrap();
        let handler = handler_with(Some(CountingProvider::new("unused")), &tmp);
        assert_eq!(handler.handle("").await, AnswerOutcome::EmptyQuery);
        assert_eq!(handler.handle("   \t\n").await, AnswerOutcome::EmptyQuery);
    }

    #[tokio::test]
    async fn test_fresh_answer_then_cache_hit() {
        let tmp = TempDir::new().unwrap();
        let provider = CountingProvider::new("Gate B12 is 8 minutes from security.");
        let handler = handler_with(Some(provider.clone()), &tmp);

        let first = handler.handle("where is gate B12?").await;
        let second = handler.handle("where is gate B12?").await;

        assert_eq!(
            first,
            AnswerOutcome::Reply("Gate B12 is 8 minutes from security.".into())
        );
        assert_eq!(first, second);
        // Second call must be served from the store, not the provider.
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_query_is_trimmed_before_keying() {
        let tmp = TempDir::new().unwrap();
        let provider = CountingProvider::new("answer");
        let handler = handler_with(Some(provider.clone()), &tmp);

        handler.handle("lost luggage desk?").await;
        handler.handle("  lost luggage desk?  ").await;

        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_missing_credential_never_calls_provider() {
        let tmp = TempDir::new().unwrap();
        let handler = handler_with(None, &tmp);

        let outcome = handler.handle("What about baggage limits?").await;
        match outcome {
            AnswerOutcome::Reply(text) => assert!(text.contains("Checked bags")),
            other => panic!("expected canned baggage answer, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_credential_no_match_yields_default_with_diagnostic() {
        let tmp = TempDir::new().unwrap();
        let handler = handler_with(None, &tmp);

        let outcome = handler.handle("tell me about gate signage").await;
        match outcome {
            AnswerOutcome::Unresolved { reply, error } => {
                assert!(reply.starts_with("✈️ General tip:"));
                assert!(error.contains("not configured"));
            }
            other => panic!("expected Unresolved, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_remote_failure_falls_back_to_keyword_match() {
        let tmp = TempDir::new().unwrap();
        let provider: Arc<dyn InferenceProvider> = Arc::new(FailingProvider {
            description: "connection reset by peer".into(),
        });
        let handler = handler_with(Some(provider), &tmp);

        let outcome = handler.handle("security line wait time").await;
        match outcome {
            AnswerOutcome::Reply(text) => assert!(text.contains("30-45 mins")),
            other => panic!("expected canned security answer, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_quota_failure_diagnostic_is_relabeled() {
        let tmp = TempDir::new().unwrap();
        let provider: Arc<dyn InferenceProvider> = Arc::new(FailingProvider {
            description: "429: quota exceeded".into(),
        });
        let handler = handler_with(Some(provider), &tmp);

        let outcome = handler.handle("gate signage rules").await;
        match outcome {
            AnswerOutcome::Unresolved { error, .. } => {
                assert_eq!(error, QUOTA_RELABEL);
            }
            other => panic!("expected Unresolved, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_remote_failure_no_side_effects_on_store() {
        let tmp = TempDir::new().unwrap();
        let provider: Arc<dyn InferenceProvider> = Arc::new(FailingProvider {
            description: "boom".into(),
        });
        let handler = handler_with(Some(provider), &tmp);

        let _ = handler.handle("security rules").await;
        assert_eq!(handler.store.lock().await.len(), 0);
    }

    #[tokio::test]
    async fn test_fallback_precedence_follows_table_order() {
        let tmp = TempDir::new().unwrap();
        let handler = handler_with(None, &tmp);

        let outcome = handler.handle("can I reach the lounge after security?").await;
        match outcome {
            AnswerOutcome::Reply(text) => {
                assert!(text.contains("30-45 mins"), "security should win: {text}")
            }
            other => panic!("expected Reply, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fresh_answer_is_persisted() {
        let tmp = TempDir::new().unwrap();
        let provider = CountingProvider::new("persisted answer");
        {
            let handler = handler_with(Some(provider), &tmp);
            handler.handle("customs forms?").await;
        }
        // A brand-new handler on the same file must serve the cached answer.
        let revived = handler_with(None, &tmp);
        let key = cache_key("customs forms?");
        assert_eq!(
            revived.store.lock().await.get(&key).as_deref(),
            Some("persisted answer")
        );
    }
}

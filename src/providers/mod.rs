//! Remote inference providers.
//!
//! The service treats the generative backend as a single-call, single-turn
//! collaborator: one system instruction, one user query, one text answer.
//! No conversation history is retained or replayed.

pub mod gemini;

pub use gemini::GeminiProvider;

use async_trait::async_trait;

use crate::error::{GatewiseError, Result};

/// User-facing relabel for quota/rate exhaustion from the remote service.
pub const QUOTA_RELABEL: &str = "Service temporarily unavailable. Please try again later.";

/// Single-turn inference backend.
#[async_trait]
pub trait InferenceProvider: Send + Sync {
    /// Issue one inference request and return the answer text.
    async fn generate(&self, system_prompt: &str, query: &str) -> Result<String>;

    /// Provider name for logs.
    fn name(&self) -> &str;
}

/// Classify a remote failure from its description string.
///
/// Quota/rate exhaustion is detected by a case-insensitive substring check
/// for "quota" and relabeled with [`QUOTA_RELABEL`]; everything else keeps
/// its original description. The substring check is a boundary heuristic —
/// the relabel must also catch transport-level messages that never carry a
/// structured code.
pub fn classify_provider_error(description: &str) -> GatewiseError {
    if description.to_lowercase().contains("quota") {
        GatewiseError::QuotaExceeded(QUOTA_RELABEL.to_string())
    } else {
        GatewiseError::Provider(description.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quota_substring_is_relabeled() {
        let err = classify_provider_error("429: Quota exceeded for requests per minute");
        match err {
            GatewiseError::QuotaExceeded(msg) => assert_eq!(msg, QUOTA_RELABEL),
            other => panic!("expected QuotaExceeded, got {other:?}"),
        }
    }

    #[test]
    fn test_quota_detection_is_case_insensitive() {
        assert!(matches!(
            classify_provider_error("QUOTA limit reached"),
            GatewiseError::QuotaExceeded(_)
        ));
    }

    #[test]
    fn test_other_failures_keep_description() {
        let err = classify_provider_error("connection reset by peer");
        match err {
            GatewiseError::Provider(msg) => assert_eq!(msg, "connection reset by peer"),
            other => panic!("expected Provider, got {other:?}"),
        }
    }

    #[test]
    fn test_quota_mid_sentence_still_matches() {
        assert!(matches!(
            classify_provider_error("generateContent: insufficient quota for project"),
            GatewiseError::QuotaExceeded(_)
        ));
    }
}

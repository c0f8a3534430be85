//! Error types for gatewise.
//!
//! Every expected failure on the request path is a distinct variant so the
//! handler can match structurally instead of inspecting strings. The one
//! exception is quota detection at the provider boundary — see
//! [`crate::providers::classify_provider_error`].

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, GatewiseError>;

/// All error conditions gatewise models.
#[derive(Error, Debug)]
pub enum GatewiseError {
    /// The query was empty (or whitespace-only) after trimming.
    ///
    /// Validation short-circuit — reported straight to the caller and never
    /// routed through fallback resolution.
    #[error("empty query")]
    EmptyQuery,

    /// No credential is available, so the remote path cannot be attempted.
    #[error("service not configured: {0}")]
    NotConfigured(String),

    /// The remote service reported quota/rate exhaustion.
    ///
    /// Carries the user-friendly relabel rather than the raw provider
    /// message; the relabel becomes the diagnostic string when no fallback
    /// entry matches.
    #[error("{0}")]
    QuotaExceeded(String),

    /// Any other failure from the remote inference service.
    #[error("provider error: {0}")]
    Provider(String),

    /// Filesystem failure (answer store, config file).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encode/decode failure.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Shared error types for the wallet operation dispatcher
///
/// Design Philosophy:
/// - A small typed taxonomy (`ErrorKind`) drives retry dispatch: the kind,
///   not the message text, decides whether an endpoint rotation happens.
/// - Operation-level errors (`OpError`) are data: they are captured into the
///   failed item's Outcome and serialized into the result report, never
///   propagated as control flow past the executor.
/// - Setup problems (`ConfigError`) are fatal and surface before any item
///   runs.
use serde::{Deserialize, Serialize};
use std::fmt;

use thiserror::Error;

/// Classification of a failed operation attempt
///
/// Produced by the operation collaborator from structured JSON-RPC error
/// codes; the executor only ever inspects the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// Rate-limit or capacity signal from the endpoint itself
    EndpointExhausted,

    /// Connection, timeout or missing-response failures
    TransientNetwork,

    /// The chain or contract rejected the call deterministically
    OperationRejected,
}

impl ErrorKind {
    /// Whether this failure should move the shared pool to the next endpoint
    /// before the item's next attempt.
    pub fn triggers_rotation(&self) -> bool {
        matches!(self, ErrorKind::EndpointExhausted)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::EndpointExhausted => "ENDPOINT_EXHAUSTED",
            ErrorKind::TransientNetwork => "TRANSIENT_NETWORK",
            ErrorKind::OperationRejected => "OPERATION_REJECTED",
        }
    }
}

/// Terminal record of one failed operation attempt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpError {
    /// Classification that drives retry/rotation dispatch
    pub kind: ErrorKind,

    /// Human-readable error message
    pub message: String,

    /// Optional additional context (endpoint, tx hash, row id)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

impl OpError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            context: None,
        }
    }

    /// Add context to an error
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    // Endpoint-capacity constructors
    pub fn rate_limited(detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::EndpointExhausted, "RPC endpoint rate limited").with_context(detail)
    }

    // Transient network constructors
    pub fn connection(detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::TransientNetwork, "RPC transport failed").with_context(detail)
    }

    pub fn timeout(detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::TransientNetwork, "RPC request timed out").with_context(detail)
    }

    pub fn no_response(detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::TransientNetwork, "RPC returned no response").with_context(detail)
    }

    // Deterministic rejection constructors
    pub fn rejected(detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::OperationRejected, detail)
    }

    pub fn reverted(detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::OperationRejected, "transaction reverted").with_context(detail)
    }

    pub fn unusable_key(address: impl fmt::Display, reason: impl Into<String>) -> Self {
        Self::new(
            ErrorKind::OperationRejected,
            format!("wallet {} has no usable signing key", address),
        )
        .with_context(reason)
    }
}

impl fmt::Display for OpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(context) = &self.context {
            write!(f, "[{}] {}: {}", self.kind.as_str(), self.message, context)
        } else {
            write!(f, "[{}] {}", self.kind.as_str(), self.message)
        }
    }
}

impl std::error::Error for OpError {}

/// Invalid setup detected at construction time, before any item runs
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("endpoint list is empty")]
    NoEndpoints,

    #[error("invalid endpoint URL {url}: {reason}")]
    InvalidEndpoint { url: String, reason: String },

    #[error("batch size must be greater than zero")]
    ZeroBatchSize,

    #[error("max retries must be at least 1")]
    ZeroMaxRetries,
}

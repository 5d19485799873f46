//! Outcome of a single protected call
//!
//! `CallOutcome<T>` is a plain `Result`: `Ok` is a successful payload,
//! `CallError::Transport` is a transport failure (network, timeout,
//! non-2xx, undecodable body) and `CallError::Rejected` is a deliberate
//! refusal by the breaker or the bulkhead.

use thiserror::Error;

use super::DependencyKey;

pub type CallOutcome<T> = Result<T, CallError>;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("call timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("peer answered with status {0}")]
    Status(u16),

    #[error("undecodable payload: {0}")]
    Decode(String),

    #[error("request failed: {0}")]
    Request(String),

    #[error("no address for {0}")]
    Unresolved(DependencyKey),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_connect() {
            Self::Connect(err.to_string())
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            Self::Status(status.as_u16())
        } else {
            Self::Request(err.to_string())
        }
    }
}

impl From<serde_json::Error> for TransportError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

/// Deliberate protection; never retried.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum Rejection {
    #[error("circuit breaker is open")]
    CircuitOpen,

    #[error("bulkhead is full")]
    BulkheadFull,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CallError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("rejected: {0}")]
    Rejected(#[from] Rejection),
}

impl CallError {
    /// Only transport failures are worth another attempt, and not a
    /// missing address: that will not change between attempts.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(TransportError::Unresolved(_)) => false,
            Self::Transport(_) => true,
            Self::Rejected(_) => false,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Transport(_) => "transport_failure",
            Self::Rejected(Rejection::CircuitOpen) => "circuit_open",
            Self::Rejected(Rejection::BulkheadFull) => "bulkhead_full",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejections_are_not_retryable() {
        assert!(CallError::from(TransportError::Timeout).is_retryable());
        assert!(CallError::from(TransportError::Status(404)).is_retryable());
        assert!(!CallError::from(Rejection::CircuitOpen).is_retryable());
        assert!(!CallError::from(Rejection::BulkheadFull).is_retryable());
    }

    #[test]
    fn missing_address_is_not_retryable() {
        let err = CallError::from(TransportError::Unresolved(DependencyKey::ORDER_SERVICE));
        assert!(!err.is_retryable());
        assert_eq!(err.label(), "transport_failure");
    }

    #[test]
    fn labels_name_the_failure_kind() {
        assert_eq!(CallError::from(TransportError::Timeout).label(), "transport_failure");
        assert_eq!(CallError::from(Rejection::BulkheadFull).label(), "bulkhead_full");
    }
}

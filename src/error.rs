//! Error taxonomy for cross-chain interop operations
//!
//! Five categories cover every failure mode:
//!
//! - [`InteropError::Validation`] - bad input, raised synchronously, never retried
//! - [`InteropError::Rpc`] - chain client failure (transient or permanent)
//! - [`InteropError::State`] - on-chain data absent or inconsistent
//! - [`InteropError::Timeout`] - polling deadline exceeded
//! - [`InteropError::Execution`] - destination transaction reverted or unconfirmable
//!
//! Transient-vs-permanent RPC classification is done by inspecting the
//! provider error text, not the error type: providers disagree on error
//! shapes but converge on wording.

use std::time::Duration;
use thiserror::Error;

/// Crate-wide result type.
pub type Result<T> = std::result::Result<T, InteropError>;

/// Error raised by interop core operations.
#[derive(Debug, Error)]
pub enum InteropError {
    /// Invalid caller input. Never retried.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Chain client failure while performing `stage`.
    #[error("rpc failure during {stage}: {source}")]
    Rpc {
        /// Operation being performed when the client failed.
        stage: &'static str,
        /// Underlying client error (cause text preserved).
        source: eyre::Report,
    },

    /// On-chain data absent or inconsistent with the protocol invariants.
    #[error("inconsistent chain state: {0}")]
    State(String),

    /// A polling loop exceeded its absolute deadline.
    #[error("timed out during {stage} after {elapsed:?}")]
    Timeout {
        /// Polling stage that hit the deadline.
        stage: &'static str,
        /// Time spent before giving up.
        elapsed: Duration,
    },

    /// Destination transaction reverted or could not be confirmed.
    #[error("execution failed: {0}")]
    Execution(String),
}

impl InteropError {
    /// Build a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        InteropError::Validation(msg.into())
    }

    /// Build a state error.
    pub fn state(msg: impl Into<String>) -> Self {
        InteropError::State(msg.into())
    }

    /// Build an execution error.
    pub fn execution(msg: impl Into<String>) -> Self {
        InteropError::Execution(msg.into())
    }

    /// Wrap a client error with the stage it occurred in.
    pub fn rpc(stage: &'static str, source: eyre::Report) -> Self {
        InteropError::Rpc { stage, source }
    }
}

// ============================================================================
// Transient-error classification
// ============================================================================

/// True if the error text indicates the inclusion proof is not produced yet.
///
/// Only this condition is retried while waiting for a proof; any other
/// client error propagates immediately.
pub fn is_proof_pending(error: &str) -> bool {
    let error_lower = error.to_lowercase();

    error_lower.contains("not yet available")
        || error_lower.contains("proof not found")
        || error_lower.contains("batch not sealed")
        || error_lower.contains("no proof for")
        || error_lower.contains("null result")
}

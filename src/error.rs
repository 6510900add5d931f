//! Error types for the simulation and decision core

use thiserror::Error;

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, AdvisorError>;

#[derive(Error, Debug)]
pub enum AdvisorError {

    // =============================
    // Core Pipeline Errors
    // =============================

    /// The one hard simulator failure: the action dispatcher saw a kind
    /// outside save/invest/spend. Every other degenerate input (negative
    /// amounts, achieved goals, zero budgets, missing thresholds) is modeled
    /// as a value, never an error.
    #[error("Unknown action kind: {0}")]
    UnknownActionKind(String),

    #[error("Audit error: {0}")]
    AuditError(String),

    // =============================
    // External Library Conversions
    // =============================

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

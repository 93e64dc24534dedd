//! Error types for the MHT decision pipeline.
//!
//! Missing clinical data is never an error: it surfaces as an
//! insufficient-data recommendation or an unavailable risk score. The
//! variants here cover the genuinely fatal paths (no knowledge loaded,
//! malformed configuration) and the collaborator failures that callers
//! are expected to log and swallow (persistence).

use thiserror::Error;

/// The unified error type for the MHT crates.
#[derive(Debug, Error)]
pub enum MhtError {
    /// Plan generation was requested before any knowledge was loaded.
    ///
    /// No safe recommendation can be produced without rules, so this is fatal.
    #[error("knowledge pack not available: {reason}")]
    KnowledgeUnavailable { reason: String },

    /// A knowledge document or engine configuration is missing or invalid.
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },

    /// The key/value collaborator could not read or write a value.
    #[error("persistence failed: {reason}")]
    PersistenceFailed { reason: String },

    /// A generated plan did not satisfy its output contract.
    #[error("plan verification failed: {reason}")]
    VerificationFailed { reason: String },

    /// A JSON Schema document could not be compiled or applied.
    #[error("schema validation error: {reason}")]
    SchemaValidation { reason: String },

    /// A value could not be converted to or from JSON.
    #[error("serialization error: {reason}")]
    Serialization { reason: String },
}

/// Convenience alias used throughout the MHT crates.
pub type MhtResult<T> = Result<T, MhtError>;

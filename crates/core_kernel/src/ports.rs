//! Port infrastructure for the remote ledger and directory services
//!
//! Every backend interaction in this system goes through a port trait
//! (`LedgerPort`, `DirectoryPort`) defined in the owning domain crate.
//! Adapters implement those traits: the HTTP adapter in `infra_http` for
//! production, an in-memory mock in `test_utils` for workflow tests.
//!
//! There is deliberately no retry, backoff or circuit-breaker machinery
//! here: the client submits each request exactly once and surfaces the
//! outcome. The backend is the authority on idempotency.

use std::fmt;
use thiserror::Error;

/// Error type for port operations
///
/// Provides a unified error type that all port implementations must use,
/// so call sites handle remote failures identically whether they came from
/// the HTTP adapter or a test double.
#[derive(Debug, Error)]
pub enum PortError {
    /// The requested entity was not found
    #[error("Not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },

    /// A validation error occurred before or instead of sending the request
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        field: Option<String>,
    },

    /// The operation conflicts with existing state (including an identical
    /// operation still in flight)
    #[error("Conflict: {message}")]
    Conflict { message: String },

    /// Connection to the backend failed
    #[error("Connection error: {message}")]
    Connection {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The operation timed out
    #[error("Timeout after {duration_ms}ms: {operation}")]
    Timeout { operation: String, duration_ms: u64 },

    /// The backend rejected the bearer token (401)
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    /// The locally held token is expired; the session was cleared and the
    /// caller must send the user back to the login route
    #[error("Session expired; sign in again at {login_path}")]
    SessionExpired { login_path: String },

    /// The backend answered with an error payload; `message` is the result
    /// of probing the error envelope in its documented priority order
    #[error("Remote error ({status}): {message}")]
    Remote { status: u16, message: String },

    /// A response could not be mapped into domain types
    #[error("Transformation error: {message}")]
    Transformation { message: String },

    /// An internal error occurred
    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl PortError {
    /// Creates a NotFound error
    pub fn not_found(entity_type: impl Into<String>, id: impl fmt::Display) -> Self {
        PortError::NotFound {
            entity_type: entity_type.into(),
            id: id.to_string(),
        }
    }

    /// Creates a Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        PortError::Validation {
            message: message.into(),
            field: None,
        }
    }

    /// Creates a Validation error with field information
    pub fn validation_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        PortError::Validation {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Creates a Conflict error
    pub fn conflict(message: impl Into<String>) -> Self {
        PortError::Conflict {
            message: message.into(),
        }
    }

    /// Creates a Connection error
    pub fn connection(message: impl Into<String>) -> Self {
        PortError::Connection {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a Transformation error
    pub fn transformation(message: impl Into<String>) -> Self {
        PortError::Transformation {
            message: message.into(),
        }
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        PortError::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// Returns true if this error indicates the entity was not found
    pub fn is_not_found(&self) -> bool {
        matches!(self, PortError::NotFound { .. })
    }

    /// Returns true if this error means the user must authenticate again
    pub fn is_session(&self) -> bool {
        matches!(
            self,
            PortError::Unauthorized { .. } | PortError::SessionExpired { .. }
        )
    }
}

/// Marker trait for all domain ports
///
/// All port traits should extend this marker to ensure they are
/// thread-safe and can be used in async contexts.
pub trait DomainPort: Send + Sync + 'static {}

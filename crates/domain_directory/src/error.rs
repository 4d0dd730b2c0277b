//! Directory domain errors

use thiserror::Error;

use core_kernel::PortError;

use crate::nickname::NicknameError;

/// Errors that can occur in the directory domain
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// Nickname derivation failed; no request was sent
    #[error(transparent)]
    Nickname(#[from] NicknameError),

    /// A request payload failed client-side validation; nothing was sent
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The backend call failed
    #[error(transparent)]
    Port(#[from] PortError),
}

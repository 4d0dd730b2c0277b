//! Billing domain errors

use thiserror::Error;

use core_kernel::{FieldError, MoneyError, PortError};

use crate::export::ExportError;
use crate::receipt::ReceiptStatus;

/// Errors that can occur in the billing domain
#[derive(Debug, Error)]
pub enum BillingError {
    /// A request payload failed client-side validation; nothing was sent
    #[error("Validation failed: {}", format_fields(.0))]
    Validation(Vec<FieldError>),

    /// The receipt's current status does not admit the requested transition;
    /// nothing was sent
    #[error("Cannot {action} a receipt in status {status}")]
    InvalidTransition {
        action: &'static str,
        status: ReceiptStatus,
    },

    /// Deletion requested for a receipt that has received payments
    #[error("Receipt {folio} has applied payments and cannot be deleted")]
    NotDeletable { folio: String },

    /// The backend call failed
    #[error(transparent)]
    Port(#[from] PortError),

    /// Export generation failed
    #[error(transparent)]
    Export(#[from] ExportError),

    /// Money arithmetic failed
    #[error(transparent)]
    Money(#[from] MoneyError),
}

fn format_fields(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_lists_fields() {
        let err = BillingError::Validation(vec![
            FieldError::new("monto", "must be greater than zero"),
            FieldError::new("concepto", "must not be blank"),
        ]);
        let text = err.to_string();
        assert!(text.contains("monto"));
        assert!(text.contains("concepto"));
    }

    #[test]
    fn test_invalid_transition_message() {
        let err = BillingError::InvalidTransition {
            action: "cancel",
            status: ReceiptStatus::Paid,
        };
        assert_eq!(err.to_string(), "Cannot cancel a receipt in status Pagado");
    }
}

//! Payment registration and application
//!
//! Registration and application are two distinct state transitions on the
//! backend: a payment is first registered (`POST /Pagos`), then applied
//! against one or more receipt lines (`POST /Pagos/aplicar`). The composite
//! register-and-apply exists for the single-receipt cashier flow; the
//! decomposed form is what multi-receipt settlement uses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use core_kernel::{
    Money, PaymentId, PaymentMethodId, ReceiptId, ReceiptLineId, ValidationResult,
};

use crate::receipt::ReceiptStatus;

/// Payment status
///
/// The backend transmits this as a numeric code. It is a separate
/// enumeration from [`ReceiptStatus`]; the two do not share ordinal values
/// and must never be converted into each other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentStatus {
    /// Registered but not yet applied to any receipt line
    #[default]
    Registered,
    /// Applied against one or more receipt lines
    Applied,
    /// Rolled back by a receipt reversal
    Reversed,
    /// Voided before application
    Cancelled,
}

impl PaymentStatus {
    /// The backend's numeric wire code for this status
    pub fn wire_code(&self) -> u8 {
        match self {
            PaymentStatus::Registered => 1,
            PaymentStatus::Applied => 2,
            PaymentStatus::Reversed => 3,
            PaymentStatus::Cancelled => 4,
        }
    }

    /// Parses the backend's numeric wire code
    pub fn from_wire_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(PaymentStatus::Registered),
            2 => Some(PaymentStatus::Applied),
            3 => Some(PaymentStatus::Reversed),
            4 => Some(PaymentStatus::Cancelled),
            _ => None,
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PaymentStatus::Registered => "Registered",
            PaymentStatus::Applied => "Applied",
            PaymentStatus::Reversed => "Reversed",
            PaymentStatus::Cancelled => "Cancelled",
        };
        write!(f, "{name}")
    }
}

/// A payment record as returned by the ledger service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    /// Unique identifier (`idPago`)
    pub id: PaymentId,
    /// When the payment was taken, UTC
    pub paid_at_utc: DateTime<Utc>,
    /// Payment-method catalog reference (`idMedioPago`)
    pub method: PaymentMethodId,
    /// Amount
    pub amount: Money,
    /// Status
    pub status: PaymentStatus,
    /// External reference (bank ref, card auth)
    pub reference: Option<String>,
    /// Free-form notes
    pub notes: Option<String>,
}

/// Request payload for registering a payment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPayment {
    /// When the payment was taken, UTC
    pub paid_at_utc: DateTime<Utc>,
    /// Payment-method catalog reference
    pub method: PaymentMethodId,
    /// Amount; must be positive
    pub amount: Money,
    /// Caller-supplied initial status; defaults to Registered
    pub status: PaymentStatus,
    /// External reference
    pub reference: Option<String>,
    /// Free-form notes
    pub notes: Option<String>,
}

impl NewPayment {
    /// Creates a registration request defaulting to the unapplied status
    pub fn new(method: PaymentMethodId, amount: Money) -> Self {
        Self {
            paid_at_utc: Utc::now(),
            method,
            amount,
            status: PaymentStatus::default(),
            reference: None,
            notes: None,
        }
    }

    /// Sets the external reference
    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    /// Sets the notes
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Validates the payload before it is sent
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::ok();
        if !self.amount.is_positive() {
            result.add_error("monto", "must be greater than zero");
        }
        if self.method.raw() <= 0 {
            result.add_error("idMedioPago", "must reference a payment method");
        }
        result
    }
}

/// One slice of a payment applied to a specific receipt line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentApplication {
    /// Target receipt line (`idReciboDetalle`)
    pub line: ReceiptLineId,
    /// Amount applied to that line; must be positive
    pub amount: Money,
}

/// Before/after snapshot of a receipt affected by a payment application,
/// as computed and returned by the backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppliedPaymentOutcome {
    pub receipt: ReceiptId,
    pub balance_before: Money,
    pub balance_after: Money,
    pub status_before: ReceiptStatus,
    pub status_after: ReceiptStatus,
}

/// Before/after snapshot returned by the line/surcharge adjustment calls
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdjustmentOutcome {
    pub receipt: ReceiptId,
    pub total_before: Money,
    pub total_after: Money,
    pub balance_before: Money,
    pub balance_after: Money,
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::Currency;
    use rust_decimal_macros::dec;

    #[test]
    fn test_wire_code_round_trip() {
        for status in [
            PaymentStatus::Registered,
            PaymentStatus::Applied,
            PaymentStatus::Reversed,
            PaymentStatus::Cancelled,
        ] {
            assert_eq!(PaymentStatus::from_wire_code(status.wire_code()), Some(status));
        }
        assert_eq!(PaymentStatus::from_wire_code(0), None);
        assert_eq!(PaymentStatus::from_wire_code(9), None);
    }

    #[test]
    fn test_default_status_is_registered() {
        let p = NewPayment::new(
            PaymentMethodId::new(2),
            Money::new(dec!(500), Currency::MXN),
        );
        assert_eq!(p.status, PaymentStatus::Registered);
    }

    #[test]
    fn test_validate_rejects_non_positive_amount() {
        let p = NewPayment::new(
            PaymentMethodId::new(2),
            Money::zero(Currency::MXN),
        );
        let result = p.validate();
        assert!(!result.is_valid());
        assert_eq!(result.errors()[0].field, "monto");
    }

    #[test]
    fn test_validate_rejects_missing_method() {
        let p = NewPayment::new(
            PaymentMethodId::new(0),
            Money::new(dec!(100), Currency::MXN),
        );
        assert!(!p.validate().is_valid());
    }

    #[test]
    fn test_builder_helpers() {
        let p = NewPayment::new(
            PaymentMethodId::new(1),
            Money::new(dec!(750), Currency::MXN),
        )
        .with_reference("SPEI-991")
        .with_notes("ventanilla");

        assert_eq!(p.reference.as_deref(), Some("SPEI-991"));
        assert_eq!(p.notes.as_deref(), Some("ventanilla"));
        assert!(p.validate().is_valid());
    }
}

//! Receipt lifecycle
//!
//! Receipts (recibos) are owned by the remote ledger service; the client
//! holds read-mostly projections of them. Receipts are never constructed
//! locally from scratch, only deserialized from backend responses, and the
//! helpers here are *checks*, not recalculations: the server is the single
//! authority on totals and balances.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use core_kernel::{
    ApplicantId, CoreError, Currency, Money, ReceiptId, ReceiptLineId, StudentId, StudyPlanId,
    TermId,
};

/// Receipt status
///
/// Wire values are the backend's Spanish status strings. This enumeration is
/// unrelated to [`crate::payment::PaymentStatus`]; the two must never be
/// mapped onto each other by ordinal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReceiptStatus {
    /// No payment applied yet
    #[serde(rename = "Pendiente")]
    Pending,
    /// Partially covered by one or more payments
    #[serde(rename = "Parcial")]
    Partial,
    /// Balance fully covered
    #[serde(rename = "Pagado")]
    Paid,
    /// Past its due date with an open balance
    #[serde(rename = "Vencido")]
    Overdue,
    /// Voided with a mandatory reason
    #[serde(rename = "Cancelado")]
    Cancelled,
    /// Written off by a credit note (bonificado)
    #[serde(rename = "Bonificado")]
    Credited,
}

impl ReceiptStatus {
    /// The backend's wire string for this status
    pub fn wire_name(&self) -> &'static str {
        match self {
            ReceiptStatus::Pending => "Pendiente",
            ReceiptStatus::Partial => "Parcial",
            ReceiptStatus::Paid => "Pagado",
            ReceiptStatus::Overdue => "Vencido",
            ReceiptStatus::Cancelled => "Cancelado",
            ReceiptStatus::Credited => "Bonificado",
        }
    }

    /// Parses the backend's wire string
    pub fn from_wire_name(s: &str) -> Option<Self> {
        match s {
            "Pendiente" => Some(ReceiptStatus::Pending),
            "Parcial" => Some(ReceiptStatus::Partial),
            "Pagado" => Some(ReceiptStatus::Paid),
            "Vencido" => Some(ReceiptStatus::Overdue),
            "Cancelado" => Some(ReceiptStatus::Cancelled),
            "Bonificado" => Some(ReceiptStatus::Credited),
            _ => None,
        }
    }
}

impl fmt::Display for ReceiptStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.wire_name())
    }
}

/// Who a receipt bills: an applicant (pre-enrollment) or an enrolled student
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum ReceiptOwner {
    Applicant(ApplicantId),
    Student(StudentId),
}

/// A line item on a receipt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiptLine {
    /// Line identity (`idReciboDetalle`), the target of payment application
    pub id: ReceiptLineId,
    /// Description
    pub description: String,
    /// Quantity
    pub quantity: Decimal,
    /// Unit price
    pub unit_price: Money,
    /// Server-computed line amount
    pub amount: Money,
}

impl ReceiptLine {
    /// Recomputes quantity * unit price for display cross-checks only;
    /// `amount` as sent by the server remains authoritative
    pub fn extended(&self) -> Money {
        self.unit_price.multiply(self.quantity)
    }
}

/// A receipt projection as returned by the ledger service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Receipt {
    /// Internal identity (`idRecibo`)
    pub id: ReceiptId,
    /// Human-readable receipt number, distinct from the internal id
    pub folio: String,
    /// Billed party
    pub owner: ReceiptOwner,
    /// Issue date
    pub issued_on: NaiveDate,
    /// Due date
    pub due_on: NaiveDate,
    /// Sum of line amounts
    pub subtotal: Money,
    /// Scholarship/agreement discount
    pub discount: Money,
    /// Late surcharges
    pub surcharges: Money,
    /// subtotal - discount + surcharges
    pub total: Money,
    /// total minus the sum of applied payments
    pub balance: Money,
    /// Current status
    pub status: ReceiptStatus,
    /// Line items
    pub lines: Vec<ReceiptLine>,
    /// Study-plan scope, when the receipt came from a template batch
    pub study_plan: Option<StudyPlanId>,
    /// Term scope, when the receipt came from a template batch
    pub term: Option<TermId>,
}

impl Receipt {
    /// Currency of this receipt's amounts
    pub fn currency(&self) -> Currency {
        self.total.currency()
    }

    /// Amount already applied against this receipt
    pub fn amount_paid(&self) -> Money {
        self.total - self.balance
    }

    /// Verifies the arithmetic invariants the server guarantees:
    /// `total == subtotal - discount + surcharges` and `0 <= balance <= total`
    /// (the balance bound does not apply to cancelled receipts).
    ///
    /// A failure here means the projection is stale or the response was
    /// mis-mapped; it is reported, never "fixed" locally.
    pub fn check_invariants(&self) -> Result<(), CoreError> {
        let expected_total = self
            .subtotal
            .checked_sub(&self.discount)?
            .checked_add(&self.surcharges)?;
        if self.total != expected_total {
            return Err(CoreError::validation(format!(
                "receipt {}: total {} != subtotal - discount + surcharges = {}",
                self.id, self.total, expected_total
            )));
        }

        if self.status != ReceiptStatus::Cancelled {
            if self.balance.is_negative() {
                return Err(CoreError::validation(format!(
                    "receipt {}: negative balance {}",
                    self.id, self.balance
                )));
            }
            if self.balance.amount() > self.total.amount() {
                return Err(CoreError::validation(format!(
                    "receipt {}: balance {} exceeds total {}",
                    self.id, self.balance, self.total
                )));
            }
        }

        Ok(())
    }

    /// Whether a payment reversal may be requested: only receipts that have
    /// actually received payments can be reversed
    pub fn can_reverse(&self) -> bool {
        matches!(self.status, ReceiptStatus::Paid | ReceiptStatus::Partial)
    }

    /// Whether cancellation may be requested: never for already-cancelled or
    /// fully paid receipts (paid ones must be reversed first)
    pub fn can_cancel(&self) -> bool {
        !matches!(self.status, ReceiptStatus::Cancelled | ReceiptStatus::Paid)
    }

    /// Whether deletion may be requested: only when no payment was ever
    /// applied, i.e. the balance still equals the total
    pub fn can_delete(&self) -> bool {
        self.balance == self.total
    }

    /// Whether the receipt is past due with an open balance
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        today > self.due_on
            && !matches!(
                self.status,
                ReceiptStatus::Paid | ReceiptStatus::Cancelled | ReceiptStatus::Credited
            )
    }
}

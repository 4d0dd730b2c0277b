//! Cash-register cuts (cortes de caja)
//!
//! A cut is generated by the backend as a draft summary over a date range,
//! then closed into an immutable record retrievable as PDF. Every total here
//! is server-computed; the client only displays them.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{CashCutId, CashierId, Money, PaymentMethodId};

use crate::payment::Payment;

/// Inclusive date range a cut covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Self {
        Self { from, to }
    }

    /// A range is well-formed when it does not end before it starts
    pub fn is_well_formed(&self) -> bool {
        self.from <= self.to
    }
}

/// Server-computed total for one payment method within a cut
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodTotal {
    pub method: PaymentMethodId,
    pub method_name: String,
    pub payment_count: u32,
    pub total: Money,
}

/// Draft summary of a cash cut, produced by the backend on request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashCutSummary {
    /// Date range covered
    pub range: DateRange,
    /// Cashier the cut is scoped to, if any
    pub cashier: Option<CashierId>,
    /// Totals broken down by payment method
    pub totals_by_method: Vec<MethodTotal>,
    /// Payments included in the cut
    pub payments: Vec<Payment>,
    /// Grand total across all methods
    pub grand_total: Money,
}

/// A closed, immutable cash cut
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashCut {
    /// Unique identifier
    pub id: CashCutId,
    /// When the cut was closed
    pub closed_at: DateTime<Utc>,
    /// The frozen summary
    pub summary: CashCutSummary,
}

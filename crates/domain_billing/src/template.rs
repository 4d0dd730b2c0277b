//! Billing templates (plantillas de cobro)
//!
//! A template is a reusable recipe scoped to a study plan and term; the
//! backend expands it into a batch of draft receipts for one applicant.
//! The lookup returning `None` when no template matches is a valid outcome,
//! not a failure.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{BillingTemplateId, Money, StudyPlanId, TermId};

/// One concept line in a template
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateLine {
    /// Concept description
    pub concept: String,
    /// Quantity per generated receipt
    pub quantity: Decimal,
    /// Unit price
    pub unit_price: Money,
}

/// A billing template as returned by the ledger service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillingTemplate {
    /// Unique identifier
    pub id: BillingTemplateId,
    /// Study-plan scope
    pub study_plan: StudyPlanId,
    /// Term scope
    pub term: TermId,
    /// How many receipts an expansion produces
    pub receipt_count: u32,
    /// Day of month each generated receipt falls due
    pub due_day_of_month: u8,
    /// Concept lines replicated into every generated receipt
    pub lines: Vec<TemplateLine>,
}

//! Scholarships and institutional agreements (becas/convenios)
//!
//! Discount rules live on the backend; changing one requires an explicit
//! recalculation call so existing receipts' discounts are resynced. The
//! client holds the rule as a projection for display and never applies it
//! to receipt amounts itself.

use serde::{Deserialize, Serialize};

use core_kernel::{Money, Rate, ScholarshipId, StudentId};

/// How a scholarship or agreement discounts receipts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DiscountRule {
    /// Percentage off the subtotal
    Percentage { rate: Rate },
    /// Fixed amount off each receipt
    Fixed { amount: Money },
    /// Full exemption
    FullExemption,
}

/// A scholarship or agreement attached to a student
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scholarship {
    /// Unique identifier
    pub id: ScholarshipId,
    /// Beneficiary
    pub student: StudentId,
    /// Discount rule
    pub rule: DiscountRule,
    /// Whether the rule is currently in force
    pub active: bool,
}

//! Core Kernel - Foundational types for the campus billing client
//!
//! This crate provides the fundamental building blocks used across all domain
//! modules:
//! - Money types with precise decimal arithmetic
//! - Strongly-typed numeric identifiers mirroring the backend's ids
//! - Field-level validation primitives
//! - Port infrastructure shared by the HTTP adapter and test doubles

pub mod error;
pub mod identifiers;
pub mod money;
pub mod ports;
pub mod validation;

pub use error::CoreError;
pub use identifiers::{
    ApplicantId, BillingTemplateId, CashCutId, CashierId, ChargeConceptId, PaymentId,
    PaymentMethodId, ReceiptId, ReceiptLineId, ScholarshipId, StudentId, StudyPlanId, TermId,
};
pub use money::{Currency, Money, MoneyError, Rate};
pub use ports::{DomainPort, PortError};
pub use validation::{FieldError, ValidationResult};

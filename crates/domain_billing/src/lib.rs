//! Billing Domain - Receipt Lifecycle and Payment Application
//!
//! This crate models the client-observable contract of the school's remote
//! ledger service: receipts with their status machine, the two-step payment
//! register/apply workflow, billing-template expansion, cash-register cuts,
//! and scholarship-driven discount recalculation.
//!
//! Receipts are remote-owned. They are created only by generation endpoints,
//! mutated only through named transitions (cancel, reverse, apply-payment,
//! adjust-line, adjust-surcharge), and deleted only when no payment was ever
//! applied. The client validates what it is about to send and checks the
//! invariants of what it received; it never computes totals or infers status
//! transitions on its own.
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_billing::{BillingService, NewPayment};
//!
//! let billing = BillingService::new(ledger_adapter);
//!
//! // Cashier flow: one receipt, one payment, backend returns the
//! // before/after snapshot.
//! let outcome = billing
//!     .register_and_apply(receipt.id, &NewPayment::new(method, amount))
//!     .await?;
//! ```

pub mod cash_cut;
pub mod error;
pub mod export;
pub mod payment;
pub mod ports;
pub mod query;
pub mod receipt;
pub mod scholarship;
pub mod service;
pub mod template;

pub use cash_cut::{CashCut, CashCutSummary, DateRange, MethodTotal};
pub use error::BillingError;
pub use export::{receipts_to_csv, ExportError};
pub use payment::{
    AdjustmentOutcome, AppliedPaymentOutcome, NewPayment, Payment, PaymentApplication,
    PaymentStatus,
};
pub use ports::{LedgerPort, NewManualReceipt};
pub use query::{ReceiptPage, ReceiptQuery, ReceiptStats, ReceiptSummary};
pub use receipt::{Receipt, ReceiptLine, ReceiptOwner, ReceiptStatus};
pub use scholarship::{DiscountRule, Scholarship};
pub use service::BillingService;
pub use template::{BillingTemplate, TemplateLine};

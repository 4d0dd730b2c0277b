//! Shared test utilities for the campus billing workspace
//!
//! Provides builders for domain projections, domain-aware assertions, and
//! `MockLedger`, an in-memory implementation of the ledger contract that
//! enforces the backend's lifecycle rules so workflow tests can run the
//! full receipt/payment state machine without a network.

pub mod assertions;
pub mod builders;
pub mod mock_ledger;

pub use assertions::{
    assert_money_approx_eq, assert_money_zero, assert_receipt_consistent, assert_receipt_status,
};
pub use builders::{PaymentBuilder, ReceiptBuilder};
pub use mock_ledger::MockLedger;

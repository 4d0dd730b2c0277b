//! Custom Test Assertions
//!
//! Provides specialized assertion helpers for domain types that give
//! more meaningful error messages than standard assertions.

use core_kernel::Money;
use domain_billing::{Receipt, ReceiptStatus};
use rust_decimal::Decimal;

/// Asserts that two Money values are approximately equal within a tolerance
///
/// # Panics
///
/// Panics if the currencies don't match or the amounts differ by more than
/// tolerance
pub fn assert_money_approx_eq(actual: &Money, expected: &Money, tolerance: Decimal) {
    assert_eq!(
        actual.currency(),
        expected.currency(),
        "Currency mismatch: actual={}, expected={}",
        actual.currency(),
        expected.currency()
    );

    let diff = (actual.amount() - expected.amount()).abs();
    assert!(
        diff <= tolerance,
        "Money amounts differ by more than tolerance: actual={}, expected={}, diff={}, tolerance={}",
        actual.amount(),
        expected.amount(),
        diff,
        tolerance
    );
}

/// Asserts that a Money value is zero
pub fn assert_money_zero(money: &Money) {
    assert!(
        money.is_zero(),
        "Expected zero money, got {} {}",
        money.currency().symbol(),
        money.amount()
    );
}

/// Asserts that a receipt satisfies the server-guaranteed arithmetic
/// invariants
pub fn assert_receipt_consistent(receipt: &Receipt) {
    if let Err(e) = receipt.check_invariants() {
        panic!("Receipt {} violates invariants: {e}", receipt.folio);
    }
}

/// Asserts a receipt's status with the folio in the failure message
pub fn assert_receipt_status(receipt: &Receipt, expected: ReceiptStatus) {
    assert_eq!(
        receipt.status, expected,
        "Receipt {} expected status {expected}, got {}",
        receipt.folio, receipt.status
    );
}

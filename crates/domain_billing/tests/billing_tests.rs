//! Domain-level billing tests over builder-produced projections

use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use domain_billing::{receipts_to_csv, ExportError, ReceiptStatus};
use test_utils::{assert_receipt_consistent, ReceiptBuilder};

#[test]
fn builder_receipts_satisfy_invariants() {
    let untouched = ReceiptBuilder::new(1).subtotal(dec!(1200)).build();
    assert_receipt_consistent(&untouched);
    assert_eq!(untouched.balance, untouched.total);

    let discounted = ReceiptBuilder::new(2)
        .subtotal(dec!(2000))
        .discount(dec!(500))
        .surcharges(dec!(75))
        .paid(dec!(1000))
        .build();
    assert_receipt_consistent(&discounted);
    assert_eq!(discounted.total.amount(), dec!(1575));
    assert_eq!(discounted.balance.amount(), dec!(575));
    assert_eq!(discounted.status, ReceiptStatus::Partial);
}

#[test]
fn paid_builder_receipt_gates_transitions() {
    let paid = ReceiptBuilder::new(3).subtotal(dec!(800)).paid(dec!(800)).build();
    assert_eq!(paid.status, ReceiptStatus::Paid);
    assert!(paid.can_reverse());
    assert!(!paid.can_cancel());
    assert!(!paid.can_delete());
}

#[test]
fn export_of_empty_listing_is_refused() {
    assert!(matches!(receipts_to_csv(&[]), Err(ExportError::EmptyResult)));
}

proptest! {
    /// Any receipt built with discount <= subtotal and paid <= total passes
    /// the arithmetic invariant check.
    #[test]
    fn built_receipts_are_always_consistent(
        subtotal in 1i64..1_000_000,
        discount_pct in 0i64..=100,
        surcharges in 0i64..10_000,
        paid_pct in 0i64..=100,
    ) {
        let subtotal = Decimal::new(subtotal, 2);
        let discount = subtotal * Decimal::new(discount_pct, 0) / dec!(100);
        let surcharges = Decimal::new(surcharges, 2);
        let total = subtotal - discount + surcharges;
        let paid = (total * Decimal::new(paid_pct, 0) / dec!(100)).round_dp(4);

        let receipt = ReceiptBuilder::new(1)
            .subtotal(subtotal)
            .discount(discount)
            .surcharges(surcharges)
            .paid(paid)
            .build();

        prop_assert!(receipt.check_invariants().is_ok());
        // Delete is admitted exactly when nothing was ever applied
        prop_assert_eq!(receipt.can_delete(), paid.is_zero());
    }
}

//! Full-lifecycle workflow tests against the in-memory mock ledger
//!
//! These exercise the service layer end to end: generation, the two-step
//! payment state machine, terminal transitions and their gating, template
//! expansion with purge semantics, cash cuts, and discount recalculation.

use std::sync::Arc;

use rust_decimal_macros::dec;

use core_kernel::{
    ApplicantId, BillingTemplateId, CashierId, ChargeConceptId, Currency, Money, PortError,
    ScholarshipId, StudentId, StudyPlanId, TermId,
};
use domain_billing::{
    BillingError, BillingService, BillingTemplate, DateRange, DiscountRule, NewManualReceipt,
    PaymentApplication, PaymentStatus, Receipt, ReceiptQuery, ReceiptStatus, Scholarship,
    TemplateLine,
};
use test_utils::{
    assert_money_approx_eq, assert_money_zero, assert_receipt_consistent, assert_receipt_status,
    MockLedger, PaymentBuilder,
};

fn service_with_mock() -> (BillingService, Arc<MockLedger>) {
    let mock = Arc::new(MockLedger::new());
    let service = BillingService::new(mock.clone());
    (service, mock)
}

fn mxn(amount: rust_decimal::Decimal) -> Money {
    Money::new(amount, Currency::MXN)
}

async fn generate_receipt(service: &BillingService, amount: rust_decimal::Decimal) -> Receipt {
    service
        .generate_manual_receipt(
            ApplicantId::new(910),
            NewManualReceipt::new(mxn(amount), "Inscripción", 15),
        )
        .await
        .unwrap()
}

// --- Generation -------------------------------------------------------------

#[tokio::test]
async fn generated_receipt_is_pending_and_consistent() {
    let (service, _mock) = service_with_mock();

    let receipt = generate_receipt(&service, dec!(1500)).await;
    assert_receipt_consistent(&receipt);
    assert_receipt_status(&receipt, ReceiptStatus::Pending);
    assert_eq!(receipt.balance, receipt.total);
    assert_eq!(receipt.lines.len(), 1);
}

#[tokio::test]
async fn manual_generation_rejects_bad_payload_before_sending() {
    let (service, mock) = service_with_mock();

    let zero_amount = service
        .generate_manual_receipt(
            ApplicantId::new(910),
            NewManualReceipt::new(mxn(dec!(0)), "Inscripción", 15),
        )
        .await;
    assert!(matches!(zero_amount, Err(BillingError::Validation(_))));

    let blank_concept = service
        .generate_manual_receipt(
            ApplicantId::new(910),
            NewManualReceipt::new(mxn(dec!(100)), "   ", 15),
        )
        .await;
    assert!(matches!(blank_concept, Err(BillingError::Validation(_))));

    // Nothing reached the ledger
    assert!(mock.applicant_receipts(ApplicantId::new(910)).is_empty());
}

#[tokio::test]
async fn concept_generation_resolves_amount_from_catalog() {
    let (service, mock) = service_with_mock();
    mock.set_concept(ChargeConceptId::new(3), "Colegiatura", mxn(dec!(2300)));

    let receipt = service
        .generate_concept_receipt(ApplicantId::new(910), ChargeConceptId::new(3), 30)
        .await
        .unwrap();
    assert_eq!(receipt.total.amount(), dec!(2300));
    assert_eq!(receipt.lines[0].description, "Colegiatura");

    let invalid = service
        .generate_concept_receipt(ApplicantId::new(910), ChargeConceptId::new(0), 30)
        .await;
    assert!(matches!(invalid, Err(BillingError::Validation(_))));
}

// --- Two-step payment state machine ----------------------------------------

#[tokio::test]
async fn partial_application_moves_receipt_to_partial() {
    let (service, mock) = service_with_mock();
    let receipt = generate_receipt(&service, dec!(1500)).await;

    let payment = service
        .register_payment(&PaymentBuilder::cash(dec!(500)).build())
        .await
        .unwrap();
    let outcomes = service
        .apply_payment(
            payment,
            &[PaymentApplication {
                line: receipt.lines[0].id,
                amount: mxn(dec!(500)),
            }],
        )
        .await
        .unwrap();

    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].status_before, ReceiptStatus::Pending);
    assert_eq!(outcomes[0].status_after, ReceiptStatus::Partial);
    assert_eq!(outcomes[0].balance_after.amount(), dec!(1000));

    let stored = mock.receipt(receipt.id).unwrap();
    assert_receipt_status(&stored, ReceiptStatus::Partial);
    assert_eq!(stored.amount_paid().amount(), dec!(500));
    assert_eq!(mock.payment(payment).unwrap().status, PaymentStatus::Applied);
}

#[tokio::test]
async fn exact_cover_moves_receipt_to_paid_and_rejects_further_applications() {
    let (service, mock) = service_with_mock();
    let receipt = generate_receipt(&service, dec!(1500)).await;
    let line = receipt.lines[0].id;

    let payment = service
        .register_payment(&PaymentBuilder::transfer(dec!(1500), "SPEI-991").build())
        .await
        .unwrap();
    let outcomes = service
        .apply_payment(
            payment,
            &[PaymentApplication {
                line,
                amount: mxn(dec!(1500)),
            }],
        )
        .await
        .unwrap();
    assert_eq!(outcomes[0].status_after, ReceiptStatus::Paid);
    assert_money_zero(&outcomes[0].balance_after);

    // Applying anything to a paid receipt is a server-side rejection
    let second = service
        .register_payment(&PaymentBuilder::cash(dec!(100)).build())
        .await
        .unwrap();
    let rejected = service
        .apply_payment(
            second,
            &[PaymentApplication {
                line,
                amount: mxn(dec!(100)),
            }],
        )
        .await;
    assert!(matches!(
        rejected,
        Err(BillingError::Port(PortError::Validation { .. }))
    ));
    assert_receipt_status(&mock.receipt(receipt.id).unwrap(), ReceiptStatus::Paid);
}

#[tokio::test]
async fn composite_register_and_apply_returns_before_after_snapshot() {
    let (service, _mock) = service_with_mock();
    let receipt = generate_receipt(&service, dec!(800)).await;

    let outcome = service
        .register_and_apply(receipt.id, &PaymentBuilder::cash(dec!(800)).build())
        .await
        .unwrap();
    assert_eq!(outcome.balance_before.amount(), dec!(800));
    assert_money_zero(&outcome.balance_after);
    assert_eq!(outcome.status_before, ReceiptStatus::Pending);
    assert_eq!(outcome.status_after, ReceiptStatus::Paid);
}

#[tokio::test]
async fn apply_rejects_empty_or_non_positive_applications_locally() {
    let (service, _mock) = service_with_mock();
    let receipt = generate_receipt(&service, dec!(500)).await;

    let payment = service
        .register_payment(&PaymentBuilder::cash(dec!(500)).build())
        .await
        .unwrap();

    let empty = service.apply_payment(payment, &[]).await;
    assert!(matches!(empty, Err(BillingError::Validation(_))));

    let zero = service
        .apply_payment(
            payment,
            &[PaymentApplication {
                line: receipt.lines[0].id,
                amount: mxn(dec!(0)),
            }],
        )
        .await;
    assert!(matches!(zero, Err(BillingError::Validation(_))));
}

// --- Terminal transitions ---------------------------------------------------

#[tokio::test]
async fn cancel_is_refused_for_paid_receipts_without_a_port_call() {
    let (service, mock) = service_with_mock();
    let receipt = generate_receipt(&service, dec!(400)).await;
    service
        .register_and_apply(receipt.id, &PaymentBuilder::cash(dec!(400)).build())
        .await
        .unwrap();

    let paid = mock.receipt(receipt.id).unwrap();
    let result = service.cancel_receipt(&paid, "captura errónea").await;
    assert!(matches!(
        result,
        Err(BillingError::InvalidTransition { action: "cancel", .. })
    ));
    // The mock never saw the cancel; the receipt is still paid
    assert_receipt_status(&mock.receipt(receipt.id).unwrap(), ReceiptStatus::Paid);
}

#[tokio::test]
async fn cancel_requires_a_reason() {
    let (service, _mock) = service_with_mock();
    let receipt = generate_receipt(&service, dec!(400)).await;

    let result = service.cancel_receipt(&receipt, "   ").await;
    assert!(matches!(result, Err(BillingError::Validation(_))));

    let cancelled = service
        .cancel_receipt(&receipt, "duplicado por error")
        .await
        .unwrap();
    assert_receipt_status(&cancelled, ReceiptStatus::Cancelled);
}

#[tokio::test]
async fn reverse_restores_pending_and_rolls_back_the_payment() {
    let (service, mock) = service_with_mock();
    let receipt = generate_receipt(&service, dec!(1000)).await;

    let payment = service
        .register_payment(&PaymentBuilder::cash(dec!(600)).build())
        .await
        .unwrap();
    service
        .apply_payment(
            payment,
            &[PaymentApplication {
                line: receipt.lines[0].id,
                amount: mxn(dec!(600)),
            }],
        )
        .await
        .unwrap();

    let partial = mock.receipt(receipt.id).unwrap();
    let reversed = service
        .reverse_receipt(&partial, "pago aplicado al recibo equivocado")
        .await
        .unwrap();

    assert_receipt_status(&reversed, ReceiptStatus::Pending);
    assert_eq!(reversed.balance, reversed.total);
    assert_eq!(
        mock.payment(payment).unwrap().status,
        PaymentStatus::Reversed
    );
}

#[tokio::test]
async fn reverse_is_refused_when_nothing_was_applied() {
    let (service, _mock) = service_with_mock();
    let receipt = generate_receipt(&service, dec!(1000)).await;

    let result = service.reverse_receipt(&receipt, "motivo").await;
    assert!(matches!(
        result,
        Err(BillingError::InvalidTransition { action: "reverse", .. })
    ));
}

#[tokio::test]
async fn delete_is_refused_once_any_payment_was_applied() {
    let (service, mock) = service_with_mock();
    let receipt = generate_receipt(&service, dec!(1000)).await;
    service
        .register_and_apply(receipt.id, &PaymentBuilder::cash(dec!(100)).build())
        .await
        .unwrap();

    let partial = mock.receipt(receipt.id).unwrap();
    let result = service.delete_receipt(&partial).await;
    assert!(matches!(result, Err(BillingError::NotDeletable { .. })));
    // Refused locally; the receipt is still stored
    assert!(mock.receipt(receipt.id).is_some());

    let untouched = generate_receipt(&service, dec!(300)).await;
    service.delete_receipt(&untouched).await.unwrap();
    assert!(mock.receipt(untouched.id).is_none());
}

// --- Template expansion -----------------------------------------------------

fn tuition_template() -> BillingTemplate {
    BillingTemplate {
        id: BillingTemplateId::new(3),
        study_plan: StudyPlanId::new(12),
        term: TermId::new(7),
        receipt_count: 3,
        due_day_of_month: 10,
        lines: vec![TemplateLine {
            concept: "Colegiatura".to_string(),
            quantity: dec!(1),
            unit_price: mxn(dec!(2300)),
        }],
    }
}

#[tokio::test]
async fn missing_template_is_a_valid_absent_outcome() {
    let (service, _mock) = service_with_mock();
    let found = service
        .find_available_template(ApplicantId::new(910))
        .await
        .unwrap();
    assert!(found.is_none());
}

#[tokio::test]
async fn template_expansion_with_purge_replaces_only_unpaid_receipts() {
    let (service, mock) = service_with_mock();
    let applicant = ApplicantId::new(910);
    let template = tuition_template();
    mock.set_template(applicant, template.clone());

    let found = service.find_available_template(applicant).await.unwrap();
    assert_eq!(found.map(|t| t.id), Some(template.id));

    let first_batch = service
        .expand_template(applicant, &template, false)
        .await
        .unwrap();
    assert_eq!(first_batch.len(), 3);
    for receipt in &first_batch {
        assert_receipt_consistent(receipt);
        assert_eq!(receipt.total.amount(), dec!(2300));
    }

    // Pay the first receipt in full, then regenerate purging unpaid ones
    service
        .register_and_apply(
            first_batch[0].id,
            &PaymentBuilder::cash(dec!(2300)).build(),
        )
        .await
        .unwrap();

    let second_batch = service
        .expand_template(applicant, &template, true)
        .await
        .unwrap();
    assert_eq!(second_batch.len(), 3);

    let remaining = mock.applicant_receipts(applicant);
    // The paid receipt survives the purge; the two unpaid ones are gone
    assert_eq!(remaining.len(), 4);
    assert!(remaining.iter().any(|r| r.id == first_batch[0].id));
    assert!(!remaining.iter().any(|r| r.id == first_batch[1].id));
}

#[tokio::test]
async fn template_expansion_without_purge_accumulates() {
    let (service, mock) = service_with_mock();
    let applicant = ApplicantId::new(911);
    let template = tuition_template();
    mock.set_template(applicant, template.clone());

    service
        .expand_template(applicant, &template, false)
        .await
        .unwrap();
    service
        .expand_template(applicant, &template, false)
        .await
        .unwrap();

    assert_eq!(mock.applicant_receipts(applicant).len(), 6);
}

// --- Adjustments ------------------------------------------------------------

#[tokio::test]
async fn line_adjustment_returns_server_computed_before_after() {
    let (service, mock) = service_with_mock();
    let receipt = generate_receipt(&service, dec!(1000)).await;

    let outcome = service
        .adjust_line_amount(receipt.id, receipt.lines[0].id, mxn(dec!(1250)))
        .await
        .unwrap();
    assert_eq!(outcome.total_before.amount(), dec!(1000));
    assert_eq!(outcome.total_after.amount(), dec!(1250));
    assert_eq!(outcome.balance_after.amount(), dec!(1250));
    assert_receipt_consistent(&mock.receipt(receipt.id).unwrap());
}

#[tokio::test]
async fn surcharge_adjustment_is_absolute_not_additive() {
    let (service, mock) = service_with_mock();
    let receipt = generate_receipt(&service, dec!(1000)).await;

    service
        .adjust_surcharge(receipt.id, mxn(dec!(150)))
        .await
        .unwrap();
    let outcome = service
        .adjust_surcharge(receipt.id, mxn(dec!(80)))
        .await
        .unwrap();

    assert_eq!(outcome.total_after.amount(), dec!(1080));
    let stored = mock.receipt(receipt.id).unwrap();
    assert_eq!(stored.surcharges.amount(), dec!(80));
    assert_receipt_consistent(&stored);
}

#[tokio::test]
async fn negative_adjustments_are_refused_locally() {
    let (service, _mock) = service_with_mock();
    let receipt = generate_receipt(&service, dec!(1000)).await;

    let result = service
        .adjust_surcharge(receipt.id, mxn(dec!(-10)))
        .await;
    assert!(matches!(result, Err(BillingError::Validation(_))));
}

// --- Cash cuts --------------------------------------------------------------

#[tokio::test]
async fn cash_cut_aggregates_applied_payments_by_method() {
    let (service, mock) = service_with_mock();
    let a = generate_receipt(&service, dec!(1500)).await;
    let b = generate_receipt(&service, dec!(900)).await;

    service
        .register_and_apply(a.id, &PaymentBuilder::cash(dec!(1500)).build())
        .await
        .unwrap();
    service
        .register_and_apply(b.id, &PaymentBuilder::cash(dec!(400)).build())
        .await
        .unwrap();
    service
        .register_and_apply(b.id, &PaymentBuilder::transfer(dec!(500), "SPEI-1").build())
        .await
        .unwrap();

    // A payment that was only registered stays out of the cut
    service
        .register_payment(&PaymentBuilder::cash(dec!(9999)).build())
        .await
        .unwrap();

    let today = chrono::Utc::now().date_naive();
    let summary = service
        .generate_cash_cut(DateRange::new(today, today), Some(CashierId::new(7)))
        .await
        .unwrap();

    assert_eq!(summary.payments.len(), 3);
    assert_eq!(summary.grand_total.amount(), dec!(2400));
    let cash = summary
        .totals_by_method
        .iter()
        .find(|t| t.method.raw() == 1)
        .unwrap();
    assert_eq!(cash.payment_count, 2);
    assert_money_approx_eq(&cash.total, &mxn(dec!(1900)), dec!(0.01));

    let cut = service.close_cash_cut(&summary).await.unwrap();
    let pdf = service.cash_cut_pdf(cut.id).await.unwrap();
    assert!(pdf.starts_with(b"%PDF"));
}

#[tokio::test]
async fn inverted_cut_range_is_refused_locally() {
    let (service, _mock) = service_with_mock();
    let today = chrono::Utc::now().date_naive();
    let yesterday = today.pred_opt().unwrap();

    let result = service
        .generate_cash_cut(DateRange::new(today, yesterday), None)
        .await;
    assert!(matches!(result, Err(BillingError::Validation(_))));
}

// --- Scholarships -----------------------------------------------------------

#[tokio::test]
async fn discount_recalculation_resyncs_student_receipts() {
    let (service, mock) = service_with_mock();
    let student = StudentId::new(42);
    mock.seed_receipt(
        test_utils::ReceiptBuilder::new(700)
            .for_student(42)
            .subtotal(dec!(1000))
            .build(),
    );
    mock.set_scholarship(Scholarship {
        id: ScholarshipId::new(1),
        student,
        rule: DiscountRule::Percentage {
            rate: core_kernel::Rate::from_percentage(dec!(50)),
        },
        active: true,
    });

    service.recalculate_discounts(student).await.unwrap();

    let resynced = mock.receipt(core_kernel::ReceiptId::new(700)).unwrap();
    assert_eq!(resynced.discount.amount(), dec!(500));
    assert_eq!(resynced.total.amount(), dec!(500));
    assert_eq!(resynced.balance.amount(), dec!(500));
    assert_receipt_consistent(&resynced);
}

// --- Search -----------------------------------------------------------------

#[tokio::test]
async fn search_filters_and_counts_are_consistent() {
    let (service, _mock) = service_with_mock();
    let a = generate_receipt(&service, dec!(1000)).await;
    let _b = generate_receipt(&service, dec!(2000)).await;
    service
        .register_and_apply(a.id, &PaymentBuilder::cash(dec!(1000)).build())
        .await
        .unwrap();

    let pending = service
        .search_receipts(&ReceiptQuery::new().only_pending())
        .await
        .unwrap();
    assert_eq!(pending.items.len(), 1);
    assert_eq!(pending.stats.total_records, 1);
    assert_eq!(pending.stats.pending_balance.amount(), dec!(2000));

    let paid = service
        .search_receipts(&ReceiptQuery::new().with_status(ReceiptStatus::Paid))
        .await
        .unwrap();
    assert_eq!(paid.items.len(), 1);
    assert_eq!(paid.stats.total_paid, 1);
}

//! Ledger service contract
//!
//! `LedgerPort` is everything the billing domain needs from the remote
//! ledger backend. The HTTP adapter in `infra_http` implements it against
//! the REST API; `test_utils::MockLedger` implements it in memory for
//! workflow tests.
//!
//! Generation endpoints are idempotent-unsafe: repeating a call creates
//! duplicate receipts, so callers must gate triggers while a call is in
//! flight (the HTTP adapter enforces this with an in-flight guard).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use core_kernel::{
    ApplicantId, CashCutId, CashierId, ChargeConceptId, DomainPort, Money, PaymentId, PortError,
    ReceiptId, ReceiptLineId, StudentId, ValidationResult,
};

use crate::cash_cut::{CashCut, CashCutSummary, DateRange};
use crate::payment::{AdjustmentOutcome, AppliedPaymentOutcome, NewPayment, PaymentApplication};
use crate::query::{ReceiptPage, ReceiptQuery};
use crate::receipt::Receipt;
use crate::template::BillingTemplate;

/// Request payload for manual receipt generation
///
/// Catalog-concept generation is a separate operation
/// ([`LedgerPort::generate_concept_receipt`]) even though the backend serves
/// both from one endpoint; the amount there is resolved server-side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewManualReceipt {
    /// Amount to bill; must be positive
    pub amount: Money,
    /// Concept description; must not be blank
    pub concept: String,
    /// Days until the generated receipt falls due
    pub due_days: u32,
}

impl NewManualReceipt {
    pub fn new(amount: Money, concept: impl Into<String>, due_days: u32) -> Self {
        Self {
            amount,
            concept: concept.into(),
            due_days,
        }
    }

    /// Validates the payload before it is sent
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::ok();
        if !self.amount.is_positive() {
            result.add_error("monto", "must be greater than zero");
        }
        if self.concept.trim().is_empty() {
            result.add_error("concepto", "must not be blank");
        }
        result
    }
}

/// Backend contract for the receipt/payment lifecycle
#[async_trait]
pub trait LedgerPort: DomainPort {
    // --- Receipt generation -------------------------------------------------

    /// Generates a single receipt from a manually captured amount and concept
    async fn generate_manual_receipt(
        &self,
        applicant: ApplicantId,
        request: NewManualReceipt,
    ) -> Result<Receipt, PortError>;

    /// Generates a single receipt from a payment-concept catalog entry;
    /// the backend resolves the amount
    async fn generate_concept_receipt(
        &self,
        applicant: ApplicantId,
        concept: ChargeConceptId,
        due_days: u32,
    ) -> Result<Receipt, PortError>;

    /// Looks up the billing template matching the applicant's plan and term.
    /// `None` means no template is available, a valid non-error outcome.
    async fn find_available_template(
        &self,
        applicant: ApplicantId,
    ) -> Result<Option<BillingTemplate>, PortError>;

    /// Expands a template into a batch of receipts for the applicant.
    /// `purge_pending` removes previously generated unpaid receipts for the
    /// same plan before creating the new batch.
    async fn expand_template(
        &self,
        applicant: ApplicantId,
        template: &BillingTemplate,
        purge_pending: bool,
    ) -> Result<Vec<Receipt>, PortError>;

    // --- Search and listing -------------------------------------------------

    /// Searches receipts; results and aggregate counters are server-computed
    async fn search_receipts(&self, query: &ReceiptQuery) -> Result<ReceiptPage, PortError>;

    /// Fetches all receipts for one applicant (the modal sub-resource view)
    async fn receipts_for_applicant(
        &self,
        applicant: ApplicantId,
    ) -> Result<Vec<Receipt>, PortError>;

    /// Fetches one receipt by id
    async fn get_receipt(&self, receipt: ReceiptId) -> Result<Receipt, PortError>;

    // --- Terminal transitions -----------------------------------------------

    /// Cancels a receipt with a mandatory reason
    async fn cancel_receipt(&self, receipt: ReceiptId, reason: &str) -> Result<Receipt, PortError>;

    /// Reverses a paid or partially paid receipt with a mandatory reason,
    /// removing its applied payments and returning it to pending
    async fn reverse_receipt(&self, receipt: ReceiptId, reason: &str)
        -> Result<Receipt, PortError>;

    /// Deletes a receipt that never received a payment
    async fn delete_receipt(&self, receipt: ReceiptId) -> Result<(), PortError>;

    // --- Payments -----------------------------------------------------------

    /// Registers a payment; the first of the two-step state machine
    async fn register_payment(&self, payment: &NewPayment) -> Result<PaymentId, PortError>;

    /// Applies a registered payment across one or more receipt lines;
    /// the second of the two-step state machine
    async fn apply_payment(
        &self,
        payment: PaymentId,
        applications: &[PaymentApplication],
    ) -> Result<Vec<AppliedPaymentOutcome>, PortError>;

    /// Composite register-and-apply for the single-receipt cashier flow
    async fn register_and_apply(
        &self,
        receipt: ReceiptId,
        payment: &NewPayment,
    ) -> Result<AppliedPaymentOutcome, PortError>;

    // --- Ad-hoc adjustments -------------------------------------------------

    /// Changes one line's amount; the backend recomputes total and balance
    async fn adjust_line_amount(
        &self,
        receipt: ReceiptId,
        line: ReceiptLineId,
        amount: Money,
    ) -> Result<AdjustmentOutcome, PortError>;

    /// Changes a receipt's surcharge; the backend recomputes total and balance
    async fn adjust_surcharge(
        &self,
        receipt: ReceiptId,
        amount: Money,
    ) -> Result<AdjustmentOutcome, PortError>;

    // --- Cash cuts ----------------------------------------------------------

    /// Generates a draft cut summary for a date range
    async fn generate_cash_cut(
        &self,
        range: DateRange,
        cashier: Option<CashierId>,
    ) -> Result<CashCutSummary, PortError>;

    /// Persists a draft summary as an immutable cut
    async fn close_cash_cut(&self, summary: &CashCutSummary) -> Result<CashCut, PortError>;

    /// Fetches a closed cut rendered as PDF
    async fn cash_cut_pdf(&self, cut: CashCutId) -> Result<Vec<u8>, PortError>;

    // --- Scholarships -------------------------------------------------------

    /// Triggers backend recalculation of receipt discounts after a
    /// scholarship or agreement change; no local computation
    async fn recalculate_discounts(&self, student: StudentId) -> Result<(), PortError>;

    // --- Backend-rendered exports -------------------------------------------

    /// Fetches the Excel rendering of a receipt listing
    async fn receipts_excel(&self, query: &ReceiptQuery) -> Result<Vec<u8>, PortError>;
}

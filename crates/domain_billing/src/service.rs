//! Billing application service
//!
//! `BillingService` sits between callers and the ledger port. It owns the
//! client-side discipline the backend expects:
//!
//! - request payloads are validated before anything is sent;
//! - terminal transitions (cancel, reverse, delete) are refused locally when
//!   the receipt's current status does not admit them, mirroring the
//!   server-side rule without re-deriving state;
//! - reasons for cancel/reverse must be non-blank;
//! - absence of a billing template is passed through as `None`, never as an
//!   error.
//!
//! The service never recomputes totals or infers a new receipt status; all
//! outcomes displayed to the user are the backend's before/after snapshots.

use std::sync::Arc;
use tracing::{info, instrument};

use core_kernel::{
    ApplicantId, CashCutId, CashierId, ChargeConceptId, Money, PaymentId, ReceiptId,
    ReceiptLineId, StudentId,
};

use crate::cash_cut::{CashCut, CashCutSummary, DateRange};
use crate::error::BillingError;
use crate::export::receipts_to_csv;
use crate::payment::{AdjustmentOutcome, AppliedPaymentOutcome, NewPayment, PaymentApplication};
use crate::ports::{LedgerPort, NewManualReceipt};
use crate::query::{ReceiptPage, ReceiptQuery, ReceiptSummary};
use crate::receipt::Receipt;
use crate::template::BillingTemplate;

/// Application service for the receipt/payment workflow
#[derive(Clone)]
pub struct BillingService {
    ledger: Arc<dyn LedgerPort>,
}

impl BillingService {
    pub fn new(ledger: Arc<dyn LedgerPort>) -> Self {
        Self { ledger }
    }

    // --- Receipt generation -------------------------------------------------

    /// Generates a receipt from a manually captured amount and concept
    #[instrument(skip(self, request), fields(applicant = %applicant))]
    pub async fn generate_manual_receipt(
        &self,
        applicant: ApplicantId,
        request: NewManualReceipt,
    ) -> Result<Receipt, BillingError> {
        let validation = request.validate();
        if !validation.is_valid() {
            return Err(BillingError::Validation(validation.errors().to_vec()));
        }

        let receipt = self.ledger.generate_manual_receipt(applicant, request).await?;
        info!(receipt = %receipt.id, folio = %receipt.folio, "manual receipt generated");
        Ok(receipt)
    }

    /// Generates a receipt from a payment-concept catalog entry
    #[instrument(skip(self), fields(applicant = %applicant, concept = %concept))]
    pub async fn generate_concept_receipt(
        &self,
        applicant: ApplicantId,
        concept: ChargeConceptId,
        due_days: u32,
    ) -> Result<Receipt, BillingError> {
        if concept.raw() <= 0 {
            return Err(BillingError::Validation(vec![core_kernel::FieldError::new(
                "idConceptoPago",
                "must reference a catalog concept",
            )]));
        }

        let receipt = self
            .ledger
            .generate_concept_receipt(applicant, concept, due_days)
            .await?;
        info!(receipt = %receipt.id, "concept receipt generated");
        Ok(receipt)
    }

    /// Finds the billing template matching the applicant's plan and term;
    /// `None` is the "no template available" affordance, not a failure
    pub async fn find_available_template(
        &self,
        applicant: ApplicantId,
    ) -> Result<Option<BillingTemplate>, BillingError> {
        Ok(self.ledger.find_available_template(applicant).await?)
    }

    /// Expands a template into a batch of receipts
    #[instrument(skip(self, template), fields(applicant = %applicant, template = %template.id))]
    pub async fn expand_template(
        &self,
        applicant: ApplicantId,
        template: &BillingTemplate,
        purge_pending: bool,
    ) -> Result<Vec<Receipt>, BillingError> {
        let receipts = self
            .ledger
            .expand_template(applicant, template, purge_pending)
            .await?;
        info!(count = receipts.len(), purge_pending, "template expanded");
        Ok(receipts)
    }

    // --- Search and listing -------------------------------------------------

    /// Runs a search; called only on an explicit trigger, never on filter edit
    pub async fn search_receipts(&self, query: &ReceiptQuery) -> Result<ReceiptPage, BillingError> {
        Ok(self.ledger.search_receipts(query).await?)
    }

    /// Fetches the receipts-by-applicant sub-resource (refetched each time
    /// its modal opens)
    pub async fn receipts_for_applicant(
        &self,
        applicant: ApplicantId,
    ) -> Result<Vec<Receipt>, BillingError> {
        Ok(self.ledger.receipts_for_applicant(applicant).await?)
    }

    // --- Terminal transitions -----------------------------------------------

    /// Cancels a receipt; refused locally when the status forbids it or the
    /// reason is blank
    #[instrument(skip(self, receipt, reason), fields(receipt = %receipt.id))]
    pub async fn cancel_receipt(
        &self,
        receipt: &Receipt,
        reason: &str,
    ) -> Result<Receipt, BillingError> {
        if !receipt.can_cancel() {
            return Err(BillingError::InvalidTransition {
                action: "cancel",
                status: receipt.status,
            });
        }
        require_reason(reason)?;

        let updated = self.ledger.cancel_receipt(receipt.id, reason.trim()).await?;
        info!(folio = %updated.folio, "receipt cancelled");
        Ok(updated)
    }

    /// Reverses applied payments on a paid or partially paid receipt;
    /// refused locally when the status forbids it or the reason is blank
    #[instrument(skip(self, receipt, reason), fields(receipt = %receipt.id))]
    pub async fn reverse_receipt(
        &self,
        receipt: &Receipt,
        reason: &str,
    ) -> Result<Receipt, BillingError> {
        if !receipt.can_reverse() {
            return Err(BillingError::InvalidTransition {
                action: "reverse",
                status: receipt.status,
            });
        }
        require_reason(reason)?;

        let updated = self.ledger.reverse_receipt(receipt.id, reason.trim()).await?;
        info!(folio = %updated.folio, "receipt reversed");
        Ok(updated)
    }

    /// Deletes a receipt; refused locally unless no payment was ever applied
    #[instrument(skip(self, receipt), fields(receipt = %receipt.id))]
    pub async fn delete_receipt(&self, receipt: &Receipt) -> Result<(), BillingError> {
        if !receipt.can_delete() {
            return Err(BillingError::NotDeletable {
                folio: receipt.folio.clone(),
            });
        }

        self.ledger.delete_receipt(receipt.id).await?;
        info!(folio = %receipt.folio, "receipt deleted");
        Ok(())
    }

    // --- Payments -----------------------------------------------------------

    /// Registers a payment (step one of the two-step state machine)
    pub async fn register_payment(&self, payment: &NewPayment) -> Result<PaymentId, BillingError> {
        let validation = payment.validate();
        if !validation.is_valid() {
            return Err(BillingError::Validation(validation.errors().to_vec()));
        }
        Ok(self.ledger.register_payment(payment).await?)
    }

    /// Applies a registered payment across receipt lines (step two);
    /// the application list must be non-empty with positive amounts
    pub async fn apply_payment(
        &self,
        payment: PaymentId,
        applications: &[PaymentApplication],
    ) -> Result<Vec<AppliedPaymentOutcome>, BillingError> {
        let mut validation = core_kernel::ValidationResult::ok();
        if applications.is_empty() {
            validation.add_error("aplicaciones", "must apply to at least one receipt line");
        }
        for (i, application) in applications.iter().enumerate() {
            if !application.amount.is_positive() {
                validation.add_error(format!("aplicaciones[{i}].monto"), "must be greater than zero");
            }
        }
        if !validation.is_valid() {
            return Err(BillingError::Validation(validation.errors().to_vec()));
        }

        Ok(self.ledger.apply_payment(payment, applications).await?)
    }

    /// Registers and applies in one call against a single receipt; returns
    /// the backend's before/after snapshot for display
    #[instrument(skip(self, payment), fields(receipt = %receipt))]
    pub async fn register_and_apply(
        &self,
        receipt: ReceiptId,
        payment: &NewPayment,
    ) -> Result<AppliedPaymentOutcome, BillingError> {
        let validation = payment.validate();
        if !validation.is_valid() {
            return Err(BillingError::Validation(validation.errors().to_vec()));
        }

        let outcome = self.ledger.register_and_apply(receipt, payment).await?;
        info!(
            balance_before = %outcome.balance_before,
            balance_after = %outcome.balance_after,
            status_after = %outcome.status_after,
            "payment registered and applied"
        );
        Ok(outcome)
    }

    // --- Ad-hoc adjustments -------------------------------------------------

    /// Changes one line's amount; totals are recomputed server-side
    pub async fn adjust_line_amount(
        &self,
        receipt: ReceiptId,
        line: ReceiptLineId,
        amount: Money,
    ) -> Result<AdjustmentOutcome, BillingError> {
        if amount.is_negative() {
            return Err(BillingError::Validation(vec![core_kernel::FieldError::new(
                "monto",
                "must not be negative",
            )]));
        }
        Ok(self.ledger.adjust_line_amount(receipt, line, amount).await?)
    }

    /// Changes a receipt's surcharge; totals are recomputed server-side
    pub async fn adjust_surcharge(
        &self,
        receipt: ReceiptId,
        amount: Money,
    ) -> Result<AdjustmentOutcome, BillingError> {
        if amount.is_negative() {
            return Err(BillingError::Validation(vec![core_kernel::FieldError::new(
                "recargo",
                "must not be negative",
            )]));
        }
        Ok(self.ledger.adjust_surcharge(receipt, amount).await?)
    }

    // --- Cash cuts ----------------------------------------------------------

    /// Generates a draft cut summary for a date range
    pub async fn generate_cash_cut(
        &self,
        range: DateRange,
        cashier: Option<CashierId>,
    ) -> Result<CashCutSummary, BillingError> {
        if !range.is_well_formed() {
            return Err(BillingError::Validation(vec![core_kernel::FieldError::new(
                "rango",
                "end date precedes start date",
            )]));
        }
        Ok(self.ledger.generate_cash_cut(range, cashier).await?)
    }

    /// Closes a draft summary into an immutable cut
    pub async fn close_cash_cut(&self, summary: &CashCutSummary) -> Result<CashCut, BillingError> {
        let cut = self.ledger.close_cash_cut(summary).await?;
        info!(cut = %cut.id, "cash cut closed");
        Ok(cut)
    }

    /// Fetches a closed cut rendered as PDF
    pub async fn cash_cut_pdf(&self, cut: CashCutId) -> Result<Vec<u8>, BillingError> {
        Ok(self.ledger.cash_cut_pdf(cut).await?)
    }

    // --- Scholarships -------------------------------------------------------

    /// Triggers backend discount recalculation after a scholarship change
    pub async fn recalculate_discounts(&self, student: StudentId) -> Result<(), BillingError> {
        self.ledger.recalculate_discounts(student).await?;
        info!(student = %student, "discount recalculation triggered");
        Ok(())
    }

    // --- Exports ------------------------------------------------------------

    /// Renders a listing as CSV; refuses a zero-row export
    pub fn export_csv(&self, rows: &[ReceiptSummary]) -> Result<Vec<u8>, BillingError> {
        Ok(receipts_to_csv(rows)?)
    }

    /// Fetches the backend-rendered Excel listing
    pub async fn export_excel(&self, query: &ReceiptQuery) -> Result<Vec<u8>, BillingError> {
        Ok(self.ledger.receipts_excel(query).await?)
    }
}

/// Cancel/reverse require a non-blank reason before the request is sent
fn require_reason(reason: &str) -> Result<(), BillingError> {
    if reason.trim().is_empty() {
        return Err(BillingError::Validation(vec![core_kernel::FieldError::new(
            "motivo",
            "must not be blank",
        )]));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_reason() {
        assert!(require_reason("ajuste administrativo").is_ok());
        assert!(require_reason("").is_err());
        assert!(require_reason("   ").is_err());
    }
}

//! In-memory ledger double
//!
//! `MockLedger` implements [`LedgerPort`] with the server-side rules the
//! client observes: status transitions on payment application, reversal and
//! cancellation gating, template expansion with optional purge of unpaid
//! receipts, discount recalculation, and cash-cut aggregation. Workflow
//! tests run the full lifecycle against it without a network.

use async_trait::async_trait;
use chrono::{Datelike, Days, NaiveDate, Utc};
use rust_decimal_macros::dec;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;

use core_kernel::{
    ApplicantId, CashCutId, CashierId, ChargeConceptId, Currency, DomainPort, Money, PaymentId,
    PaymentMethodId, PortError, ReceiptId, ReceiptLineId, StudentId,
};
use domain_billing::{
    AdjustmentOutcome, AppliedPaymentOutcome, BillingTemplate, CashCut, CashCutSummary, DateRange,
    DiscountRule, LedgerPort, MethodTotal, NewManualReceipt, NewPayment, Payment,
    PaymentApplication, PaymentStatus, Receipt, ReceiptLine, ReceiptOwner, ReceiptPage,
    ReceiptQuery, ReceiptStats, ReceiptStatus, ReceiptSummary, Scholarship,
};

#[derive(Default)]
struct LedgerState {
    receipts: HashMap<ReceiptId, Receipt>,
    payments: HashMap<PaymentId, Payment>,
    /// payment -> (receipt, applied amount)
    applications: HashMap<PaymentId, Vec<(ReceiptId, Money)>>,
    templates: HashMap<ApplicantId, BillingTemplate>,
    concepts: HashMap<ChargeConceptId, (String, Money)>,
    scholarships: HashMap<StudentId, Scholarship>,
    cuts: HashMap<CashCutId, CashCut>,
}

/// In-memory stand-in for the remote ledger service
pub struct MockLedger {
    state: Mutex<LedgerState>,
    next_id: AtomicI64,
}

impl Default for MockLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl MockLedger {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(LedgerState::default()),
            next_id: AtomicI64::new(1),
        }
    }

    fn alloc(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Registers the billing template the given applicant will match
    pub fn set_template(&self, applicant: ApplicantId, template: BillingTemplate) {
        self.state
            .lock()
            .unwrap()
            .templates
            .insert(applicant, template);
    }

    /// Registers a payment-concept catalog entry
    pub fn set_concept(&self, concept: ChargeConceptId, description: &str, amount: Money) {
        self.state
            .lock()
            .unwrap()
            .concepts
            .insert(concept, (description.to_string(), amount));
    }

    /// Registers the scholarship rule used by discount recalculation
    pub fn set_scholarship(&self, scholarship: Scholarship) {
        self.state
            .lock()
            .unwrap()
            .scholarships
            .insert(scholarship.student, scholarship);
    }

    /// Inserts a pre-built receipt, for scenarios the generation endpoints
    /// cannot produce (student-owned receipts, unusual statuses)
    pub fn seed_receipt(&self, receipt: Receipt) {
        self.state
            .lock()
            .unwrap()
            .receipts
            .insert(receipt.id, receipt);
    }

    /// Snapshot of a stored receipt
    pub fn receipt(&self, id: ReceiptId) -> Option<Receipt> {
        self.state.lock().unwrap().receipts.get(&id).cloned()
    }

    /// Snapshot of a stored payment
    pub fn payment(&self, id: PaymentId) -> Option<Payment> {
        self.state.lock().unwrap().payments.get(&id).cloned()
    }

    /// All receipts currently stored for an applicant
    pub fn applicant_receipts(&self, applicant: ApplicantId) -> Vec<Receipt> {
        let state = self.state.lock().unwrap();
        let mut receipts: Vec<Receipt> = state
            .receipts
            .values()
            .filter(|r| r.owner == ReceiptOwner::Applicant(applicant))
            .cloned()
            .collect();
        receipts.sort_by_key(|r| r.id);
        receipts
    }

    fn make_receipt(
        &self,
        state: &mut LedgerState,
        owner: ReceiptOwner,
        lines: Vec<(String, rust_decimal::Decimal, Money)>,
        due_on: NaiveDate,
    ) -> Receipt {
        let id = ReceiptId::new(self.alloc());
        let lines: Vec<ReceiptLine> = lines
            .into_iter()
            .map(|(description, quantity, unit_price)| ReceiptLine {
                id: ReceiptLineId::new(self.alloc()),
                description,
                quantity,
                unit_price,
                amount: unit_price.multiply(quantity),
            })
            .collect();
        let subtotal = lines
            .iter()
            .fold(Money::zero(Currency::MXN), |acc, l| acc + l.amount);

        let receipt = Receipt {
            id,
            folio: format!("F-{:05}", id.raw()),
            owner,
            issued_on: Utc::now().date_naive(),
            due_on,
            subtotal,
            discount: Money::zero(Currency::MXN),
            surcharges: Money::zero(Currency::MXN),
            total: subtotal,
            balance: subtotal,
            status: ReceiptStatus::Pending,
            lines,
            study_plan: None,
            term: None,
        };
        state.receipts.insert(id, receipt.clone());
        receipt
    }

    fn apply_to_receipt(
        state: &mut LedgerState,
        receipt_id: ReceiptId,
        amount: Money,
    ) -> Result<AppliedPaymentOutcome, PortError> {
        let receipt = state
            .receipts
            .get_mut(&receipt_id)
            .ok_or_else(|| PortError::not_found("Receipt", receipt_id))?;

        if receipt.status == ReceiptStatus::Paid {
            return Err(PortError::validation("receipt is already paid"));
        }
        if matches!(receipt.status, ReceiptStatus::Cancelled) {
            return Err(PortError::validation("receipt is cancelled"));
        }
        if amount.amount() > receipt.balance.amount() {
            return Err(PortError::validation("applied amount exceeds balance"));
        }

        let balance_before = receipt.balance;
        let status_before = receipt.status;

        receipt.balance = receipt.balance - amount;
        receipt.status = if receipt.balance.is_zero() {
            ReceiptStatus::Paid
        } else {
            ReceiptStatus::Partial
        };

        Ok(AppliedPaymentOutcome {
            receipt: receipt_id,
            balance_before,
            balance_after: receipt.balance,
            status_before,
            status_after: receipt.status,
        })
    }
}

impl DomainPort for MockLedger {}

#[async_trait]
impl LedgerPort for MockLedger {
    async fn generate_manual_receipt(
        &self,
        applicant: ApplicantId,
        request: NewManualReceipt,
    ) -> Result<Receipt, PortError> {
        let validation = request.validate();
        if !validation.is_valid() {
            return Err(PortError::validation(validation.errors()[0].to_string()));
        }

        let mut state = self.state.lock().unwrap();
        let due_on = Utc::now()
            .date_naive()
            .checked_add_days(Days::new(request.due_days as u64))
            .expect("due date overflow");
        Ok(self.make_receipt(
            &mut state,
            ReceiptOwner::Applicant(applicant),
            vec![(request.concept, dec!(1), request.amount)],
            due_on,
        ))
    }

    async fn generate_concept_receipt(
        &self,
        applicant: ApplicantId,
        concept: ChargeConceptId,
        due_days: u32,
    ) -> Result<Receipt, PortError> {
        let mut state = self.state.lock().unwrap();
        let (description, amount) = state
            .concepts
            .get(&concept)
            .cloned()
            .ok_or_else(|| PortError::not_found("ChargeConcept", concept))?;
        let due_on = Utc::now()
            .date_naive()
            .checked_add_days(Days::new(due_days as u64))
            .expect("due date overflow");
        Ok(self.make_receipt(
            &mut state,
            ReceiptOwner::Applicant(applicant),
            vec![(description, dec!(1), amount)],
            due_on,
        ))
    }

    async fn find_available_template(
        &self,
        applicant: ApplicantId,
    ) -> Result<Option<BillingTemplate>, PortError> {
        Ok(self.state.lock().unwrap().templates.get(&applicant).cloned())
    }

    async fn expand_template(
        &self,
        applicant: ApplicantId,
        template: &BillingTemplate,
        purge_pending: bool,
    ) -> Result<Vec<Receipt>, PortError> {
        let mut state = self.state.lock().unwrap();

        if purge_pending {
            // Unpaid receipts for the same plan are removed; anything that
            // ever received a payment stays.
            state.receipts.retain(|_, r| {
                !(r.owner == ReceiptOwner::Applicant(applicant)
                    && r.study_plan == Some(template.study_plan)
                    && r.balance == r.total
                    && matches!(r.status, ReceiptStatus::Pending | ReceiptStatus::Overdue))
            });
        }

        let today = Utc::now().date_naive();
        let mut receipts = Vec::with_capacity(template.receipt_count as usize);
        for n in 0..template.receipt_count {
            let due_on = nth_due_date(today, template.due_day_of_month, n);
            let lines = template
                .lines
                .iter()
                .map(|l| (l.concept.clone(), l.quantity, l.unit_price))
                .collect();
            let mut receipt =
                self.make_receipt(&mut state, ReceiptOwner::Applicant(applicant), lines, due_on);
            receipt.study_plan = Some(template.study_plan);
            receipt.term = Some(template.term);
            state.receipts.insert(receipt.id, receipt.clone());
            receipts.push(receipt);
        }
        Ok(receipts)
    }

    async fn search_receipts(&self, query: &ReceiptQuery) -> Result<ReceiptPage, PortError> {
        let state = self.state.lock().unwrap();
        let today = Utc::now().date_naive();

        let mut matching: Vec<&Receipt> = state
            .receipts
            .values()
            .filter(|r| {
                if let Some(status) = query.status {
                    if r.status != status {
                        return false;
                    }
                }
                if let Some(fragment) = &query.folio_contains {
                    if !r.folio.contains(fragment.as_str()) {
                        return false;
                    }
                }
                if query.only_overdue && !r.is_overdue(today) {
                    return false;
                }
                if query.only_pending && r.balance.is_zero() {
                    return false;
                }
                if query.only_paid && r.status != ReceiptStatus::Paid {
                    return false;
                }
                if let Some((from, to)) = query.due_between {
                    if r.due_on < from || r.due_on > to {
                        return false;
                    }
                }
                true
            })
            .collect();
        matching.sort_by_key(|r| r.id);

        let stats = ReceiptStats {
            total_records: matching.len() as u64,
            total_paid: matching
                .iter()
                .filter(|r| r.status == ReceiptStatus::Paid)
                .count() as u64,
            total_pending: matching
                .iter()
                .filter(|r| r.balance.is_positive())
                .count() as u64,
            total_overdue: matching.iter().filter(|r| r.is_overdue(today)).count() as u64,
            pending_balance: matching
                .iter()
                .fold(Money::zero(Currency::MXN), |acc, r| acc + r.balance),
            total_surcharges: matching
                .iter()
                .fold(Money::zero(Currency::MXN), |acc, r| acc + r.surcharges),
        };

        let start = ((query.page.max(1) - 1) * query.page_size) as usize;
        let items = matching
            .into_iter()
            .skip(start)
            .take(query.page_size as usize)
            .map(|r| ReceiptSummary {
                id: r.id,
                folio: r.folio.clone(),
                owner: r.owner,
                matricula: None,
                holder_name: String::new(),
                due_on: r.due_on,
                total: r.total,
                balance: r.balance,
                status: r.status,
            })
            .collect();

        Ok(ReceiptPage {
            items,
            stats,
            page: query.page,
            page_size: query.page_size,
        })
    }

    async fn receipts_for_applicant(
        &self,
        applicant: ApplicantId,
    ) -> Result<Vec<Receipt>, PortError> {
        Ok(self.applicant_receipts(applicant))
    }

    async fn get_receipt(&self, receipt: ReceiptId) -> Result<Receipt, PortError> {
        self.receipt(receipt)
            .ok_or_else(|| PortError::not_found("Receipt", receipt))
    }

    async fn cancel_receipt(&self, receipt: ReceiptId, reason: &str) -> Result<Receipt, PortError> {
        if reason.trim().is_empty() {
            return Err(PortError::validation_field("reason is required", "motivo"));
        }
        let mut state = self.state.lock().unwrap();
        let r = state
            .receipts
            .get_mut(&receipt)
            .ok_or_else(|| PortError::not_found("Receipt", receipt))?;
        if matches!(r.status, ReceiptStatus::Cancelled | ReceiptStatus::Paid) {
            return Err(PortError::validation(format!(
                "cannot cancel a receipt in status {}",
                r.status
            )));
        }
        r.status = ReceiptStatus::Cancelled;
        Ok(r.clone())
    }

    async fn reverse_receipt(
        &self,
        receipt: ReceiptId,
        reason: &str,
    ) -> Result<Receipt, PortError> {
        if reason.trim().is_empty() {
            return Err(PortError::validation_field("reason is required", "motivo"));
        }
        let mut state = self.state.lock().unwrap();
        let r = state
            .receipts
            .get_mut(&receipt)
            .ok_or_else(|| PortError::not_found("Receipt", receipt))?;
        if !matches!(r.status, ReceiptStatus::Paid | ReceiptStatus::Partial) {
            return Err(PortError::validation(format!(
                "cannot reverse a receipt in status {}",
                r.status
            )));
        }
        r.balance = r.total;
        r.status = ReceiptStatus::Pending;

        // Payments whose applications touched this receipt roll back
        let affected: Vec<PaymentId> = state
            .applications
            .iter()
            .filter(|(_, apps)| apps.iter().any(|(rid, _)| *rid == receipt))
            .map(|(pid, _)| *pid)
            .collect();
        for pid in affected {
            state.applications.remove(&pid);
            if let Some(payment) = state.payments.get_mut(&pid) {
                payment.status = PaymentStatus::Reversed;
            }
        }

        Ok(state.receipts[&receipt].clone())
    }

    async fn delete_receipt(&self, receipt: ReceiptId) -> Result<(), PortError> {
        let mut state = self.state.lock().unwrap();
        let r = state
            .receipts
            .get(&receipt)
            .ok_or_else(|| PortError::not_found("Receipt", receipt))?;
        if r.balance != r.total {
            return Err(PortError::validation(
                "receipt has applied payments and cannot be deleted",
            ));
        }
        state.receipts.remove(&receipt);
        Ok(())
    }

    async fn register_payment(&self, payment: &NewPayment) -> Result<PaymentId, PortError> {
        let validation = payment.validate();
        if !validation.is_valid() {
            return Err(PortError::validation(validation.errors()[0].to_string()));
        }

        let id = PaymentId::new(self.alloc());
        self.state.lock().unwrap().payments.insert(
            id,
            Payment {
                id,
                paid_at_utc: payment.paid_at_utc,
                method: payment.method,
                amount: payment.amount,
                status: payment.status,
                reference: payment.reference.clone(),
                notes: payment.notes.clone(),
            },
        );
        Ok(id)
    }

    async fn apply_payment(
        &self,
        payment: PaymentId,
        applications: &[PaymentApplication],
    ) -> Result<Vec<AppliedPaymentOutcome>, PortError> {
        let mut state = self.state.lock().unwrap();
        if !state.payments.contains_key(&payment) {
            return Err(PortError::not_found("Payment", payment));
        }

        let mut outcomes = Vec::with_capacity(applications.len());
        let mut recorded = Vec::with_capacity(applications.len());
        for application in applications {
            let receipt_id = state
                .receipts
                .values()
                .find(|r| r.lines.iter().any(|l| l.id == application.line))
                .map(|r| r.id)
                .ok_or_else(|| PortError::not_found("ReceiptLine", application.line))?;

            let outcome = Self::apply_to_receipt(&mut state, receipt_id, application.amount)?;
            recorded.push((receipt_id, application.amount));
            outcomes.push(outcome);
        }

        state.applications.entry(payment).or_default().extend(recorded);
        if let Some(p) = state.payments.get_mut(&payment) {
            p.status = PaymentStatus::Applied;
        }
        Ok(outcomes)
    }

    async fn register_and_apply(
        &self,
        receipt: ReceiptId,
        payment: &NewPayment,
    ) -> Result<AppliedPaymentOutcome, PortError> {
        let id = self.register_payment(payment).await?;

        let mut state = self.state.lock().unwrap();
        let outcome = Self::apply_to_receipt(&mut state, receipt, payment.amount)?;
        state
            .applications
            .entry(id)
            .or_default()
            .push((receipt, payment.amount));
        if let Some(p) = state.payments.get_mut(&id) {
            p.status = PaymentStatus::Applied;
        }
        Ok(outcome)
    }

    async fn adjust_line_amount(
        &self,
        receipt: ReceiptId,
        line: ReceiptLineId,
        amount: Money,
    ) -> Result<AdjustmentOutcome, PortError> {
        let mut state = self.state.lock().unwrap();
        let r = state
            .receipts
            .get_mut(&receipt)
            .ok_or_else(|| PortError::not_found("Receipt", receipt))?;
        let target = r
            .lines
            .iter_mut()
            .find(|l| l.id == line)
            .ok_or_else(|| PortError::not_found("ReceiptLine", line))?;

        let delta = amount - target.amount;
        target.amount = amount;
        target.unit_price = amount;
        target.quantity = dec!(1);

        let total_before = r.total;
        let balance_before = r.balance;
        r.subtotal = r.subtotal + delta;
        r.total = r.total + delta;
        r.balance = r.balance + delta;

        Ok(AdjustmentOutcome {
            receipt,
            total_before,
            total_after: r.total,
            balance_before,
            balance_after: r.balance,
        })
    }

    async fn adjust_surcharge(
        &self,
        receipt: ReceiptId,
        amount: Money,
    ) -> Result<AdjustmentOutcome, PortError> {
        let mut state = self.state.lock().unwrap();
        let r = state
            .receipts
            .get_mut(&receipt)
            .ok_or_else(|| PortError::not_found("Receipt", receipt))?;

        let delta = amount - r.surcharges;
        let total_before = r.total;
        let balance_before = r.balance;
        r.surcharges = amount;
        r.total = r.total + delta;
        r.balance = r.balance + delta;

        Ok(AdjustmentOutcome {
            receipt,
            total_before,
            total_after: r.total,
            balance_before,
            balance_after: r.balance,
        })
    }

    async fn generate_cash_cut(
        &self,
        range: DateRange,
        cashier: Option<CashierId>,
    ) -> Result<CashCutSummary, PortError> {
        let state = self.state.lock().unwrap();
        let included: Vec<Payment> = state
            .payments
            .values()
            .filter(|p| {
                let day = p.paid_at_utc.date_naive();
                p.status == PaymentStatus::Applied && day >= range.from && day <= range.to
            })
            .cloned()
            .collect();

        let mut by_method: HashMap<PaymentMethodId, (u32, Money)> = HashMap::new();
        for p in &included {
            let entry = by_method
                .entry(p.method)
                .or_insert((0, Money::zero(p.amount.currency())));
            entry.0 += 1;
            entry.1 = entry.1 + p.amount;
        }

        let mut totals_by_method: Vec<MethodTotal> = by_method
            .into_iter()
            .map(|(method, (payment_count, total))| MethodTotal {
                method,
                method_name: format!("Medio {}", method.raw()),
                payment_count,
                total,
            })
            .collect();
        totals_by_method.sort_by_key(|t| t.method);

        let grand_total = totals_by_method
            .iter()
            .fold(Money::zero(Currency::MXN), |acc, t| acc + t.total);

        Ok(CashCutSummary {
            range,
            cashier,
            totals_by_method,
            payments: included,
            grand_total,
        })
    }

    async fn close_cash_cut(&self, summary: &CashCutSummary) -> Result<CashCut, PortError> {
        let cut = CashCut {
            id: CashCutId::new(self.alloc()),
            closed_at: Utc::now(),
            summary: summary.clone(),
        };
        self.state.lock().unwrap().cuts.insert(cut.id, cut.clone());
        Ok(cut)
    }

    async fn cash_cut_pdf(&self, cut: CashCutId) -> Result<Vec<u8>, PortError> {
        let state = self.state.lock().unwrap();
        if !state.cuts.contains_key(&cut) {
            return Err(PortError::not_found("CashCut", cut));
        }
        Ok(b"%PDF-1.4 mock corte".to_vec())
    }

    async fn recalculate_discounts(&self, student: StudentId) -> Result<(), PortError> {
        let mut state = self.state.lock().unwrap();
        let rule = match state.scholarships.get(&student) {
            Some(s) if s.active => s.rule.clone(),
            _ => return Ok(()),
        };

        let ids: Vec<ReceiptId> = state
            .receipts
            .values()
            .filter(|r| {
                r.owner == ReceiptOwner::Student(student) && r.status != ReceiptStatus::Cancelled
            })
            .map(|r| r.id)
            .collect();

        for id in ids {
            let r = state.receipts.get_mut(&id).expect("receipt disappeared");
            let paid = r.total - r.balance;
            r.discount = match &rule {
                DiscountRule::Percentage { rate } => rate.apply(&r.subtotal),
                DiscountRule::Fixed { amount } => *amount,
                DiscountRule::FullExemption => r.subtotal,
            };
            r.total = r.subtotal - r.discount + r.surcharges;
            r.balance = r.total - paid;
        }
        Ok(())
    }

    async fn receipts_excel(&self, _query: &ReceiptQuery) -> Result<Vec<u8>, PortError> {
        Ok(b"PK mock xlsx".to_vec())
    }
}

/// Due date of the nth receipt in a template batch: the template's due day
/// in each successive month, clamped to the month's length
fn nth_due_date(today: NaiveDate, due_day: u8, n: u32) -> NaiveDate {
    let month0 = today.month0() + 1 + n; // start next month
    let year = today.year() + (month0 / 12) as i32;
    let month = month0 % 12 + 1;
    let mut day = (due_day as u32).max(1);
    loop {
        if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
            return date;
        }
        day -= 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nth_due_date_clamps_short_months() {
        let jan = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
        // first batch entry lands in February, day 31 clamps to 28
        assert_eq!(
            nth_due_date(jan, 31, 0),
            NaiveDate::from_ymd_opt(2026, 2, 28).unwrap()
        );
        assert_eq!(
            nth_due_date(jan, 10, 1),
            NaiveDate::from_ymd_opt(2026, 3, 10).unwrap()
        );
    }

    #[test]
    fn test_nth_due_date_zero_day_falls_on_the_first() {
        let jan = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
        assert_eq!(
            nth_due_date(jan, 0, 0),
            NaiveDate::from_ymd_opt(2026, 2, 1).unwrap()
        );
    }

    #[test]
    fn test_nth_due_date_year_rollover() {
        let nov = NaiveDate::from_ymd_opt(2026, 11, 5).unwrap();
        assert_eq!(
            nth_due_date(nov, 10, 2),
            NaiveDate::from_ymd_opt(2027, 2, 10).unwrap()
        );
    }
}

//! Builder patterns for test data construction
//!
//! Builders produce realistic projections with sensible defaults so tests
//! only state what they care about.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{
    ApplicantId, Currency, Money, PaymentMethodId, ReceiptId, ReceiptLineId, StudentId,
};
use domain_billing::{NewPayment, Receipt, ReceiptLine, ReceiptOwner, ReceiptStatus};

/// Builds receipt projections for tests
pub struct ReceiptBuilder {
    id: ReceiptId,
    folio: String,
    owner: ReceiptOwner,
    subtotal: Decimal,
    discount: Decimal,
    surcharges: Decimal,
    paid: Decimal,
    status: ReceiptStatus,
    due_on: NaiveDate,
    lines: Vec<ReceiptLine>,
}

impl ReceiptBuilder {
    pub fn new(id: i64) -> Self {
        Self {
            id: ReceiptId::new(id),
            folio: format!("F-{id:05}"),
            owner: ReceiptOwner::Applicant(ApplicantId::new(1)),
            subtotal: dec!(1000),
            discount: dec!(0),
            surcharges: dec!(0),
            paid: dec!(0),
            status: ReceiptStatus::Pending,
            due_on: NaiveDate::from_ymd_opt(2026, 6, 15).unwrap(),
            lines: Vec::new(),
        }
    }

    pub fn folio(mut self, folio: impl Into<String>) -> Self {
        self.folio = folio.into();
        self
    }

    pub fn for_student(mut self, student: i64) -> Self {
        self.owner = ReceiptOwner::Student(StudentId::new(student));
        self
    }

    pub fn subtotal(mut self, subtotal: Decimal) -> Self {
        self.subtotal = subtotal;
        self
    }

    pub fn discount(mut self, discount: Decimal) -> Self {
        self.discount = discount;
        self
    }

    pub fn surcharges(mut self, surcharges: Decimal) -> Self {
        self.surcharges = surcharges;
        self
    }

    /// Marks an amount as already applied; status moves to Partial or Paid
    /// to match
    pub fn paid(mut self, paid: Decimal) -> Self {
        self.paid = paid;
        let total = self.subtotal - self.discount + self.surcharges;
        self.status = if paid >= total {
            ReceiptStatus::Paid
        } else if paid > dec!(0) {
            ReceiptStatus::Partial
        } else {
            ReceiptStatus::Pending
        };
        self
    }

    pub fn status(mut self, status: ReceiptStatus) -> Self {
        self.status = status;
        self
    }

    pub fn due_on(mut self, due_on: NaiveDate) -> Self {
        self.due_on = due_on;
        self
    }

    pub fn line(mut self, id: i64, description: &str, quantity: Decimal, unit_price: Decimal) -> Self {
        self.lines.push(ReceiptLine {
            id: ReceiptLineId::new(id),
            description: description.to_string(),
            quantity,
            unit_price: Money::new(unit_price, Currency::MXN),
            amount: Money::new(quantity * unit_price, Currency::MXN),
        });
        self
    }

    pub fn build(self) -> Receipt {
        let total = self.subtotal - self.discount + self.surcharges;
        let lines = if self.lines.is_empty() {
            vec![ReceiptLine {
                id: ReceiptLineId::new(self.id.raw() * 100),
                description: "Concepto único".to_string(),
                quantity: dec!(1),
                unit_price: Money::new(self.subtotal, Currency::MXN),
                amount: Money::new(self.subtotal, Currency::MXN),
            }]
        } else {
            self.lines
        };

        Receipt {
            id: self.id,
            folio: self.folio,
            owner: self.owner,
            issued_on: NaiveDate::from_ymd_opt(2026, 6, 1).unwrap(),
            due_on: self.due_on,
            subtotal: Money::new(self.subtotal, Currency::MXN),
            discount: Money::new(self.discount, Currency::MXN),
            surcharges: Money::new(self.surcharges, Currency::MXN),
            total: Money::new(total, Currency::MXN),
            balance: Money::new(total - self.paid, Currency::MXN),
            status: self.status,
            lines,
            study_plan: None,
            term: None,
        }
    }
}

/// Builds payment registration payloads for tests
pub struct PaymentBuilder {
    method: PaymentMethodId,
    amount: Decimal,
    reference: Option<String>,
}

impl PaymentBuilder {
    pub fn cash(amount: Decimal) -> Self {
        Self {
            method: PaymentMethodId::new(1),
            amount,
            reference: None,
        }
    }

    pub fn transfer(amount: Decimal, reference: &str) -> Self {
        Self {
            method: PaymentMethodId::new(2),
            amount,
            reference: Some(reference.to_string()),
        }
    }

    pub fn build(self) -> NewPayment {
        let mut payment = NewPayment::new(self.method, Money::new(self.amount, Currency::MXN));
        if let Some(reference) = self.reference {
            payment = payment.with_reference(reference);
        }
        payment
    }
}

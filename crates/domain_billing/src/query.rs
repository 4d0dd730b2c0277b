//! Receipt search model
//!
//! Filters map one-to-one onto the backend's query parameters; the response
//! page comes back with six server-computed aggregate counters. Ordering is
//! server-determined and the client performs no re-sorting. A filter change
//! does not imply a fetch: callers fetch only on an explicit search trigger.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use core_kernel::{Money, ReceiptId, TermId};

use crate::receipt::{ReceiptOwner, ReceiptStatus};

/// Filter set for the receipt search endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReceiptQuery {
    /// Scope to a school term
    pub term: Option<TermId>,
    /// Scope to one status
    pub status: Option<ReceiptStatus>,
    /// Substring match on the student's matricula
    pub matricula_contains: Option<String>,
    /// Substring match on the folio
    pub folio_contains: Option<String>,
    /// Only receipts past their due date
    pub only_overdue: bool,
    /// Only receipts with an open balance
    pub only_pending: bool,
    /// Only fully paid receipts
    pub only_paid: bool,
    /// Issue-date range, inclusive
    pub issued_between: Option<(NaiveDate, NaiveDate)>,
    /// Due-date range, inclusive
    pub due_between: Option<(NaiveDate, NaiveDate)>,
    /// 1-based page number
    pub page: u32,
    /// Page size
    pub page_size: u32,
}

impl ReceiptQuery {
    /// Default page geometry used by the admin listing
    pub const DEFAULT_PAGE_SIZE: u32 = 25;

    /// Creates an unfiltered first-page query
    pub fn new() -> Self {
        Self {
            page: 1,
            page_size: Self::DEFAULT_PAGE_SIZE,
            ..Default::default()
        }
    }

    /// Scopes the query to a term
    pub fn for_term(mut self, term: TermId) -> Self {
        self.term = Some(term);
        self
    }

    /// Scopes the query to a status
    pub fn with_status(mut self, status: ReceiptStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Filters by matricula substring
    pub fn matricula(mut self, fragment: impl Into<String>) -> Self {
        self.matricula_contains = Some(fragment.into());
        self
    }

    /// Filters by folio substring
    pub fn folio(mut self, fragment: impl Into<String>) -> Self {
        self.folio_contains = Some(fragment.into());
        self
    }

    /// Restricts to overdue receipts
    pub fn only_overdue(mut self) -> Self {
        self.only_overdue = true;
        self
    }

    /// Restricts to receipts with an open balance
    pub fn only_pending(mut self) -> Self {
        self.only_pending = true;
        self
    }

    /// Restricts to fully paid receipts
    pub fn only_paid(mut self) -> Self {
        self.only_paid = true;
        self
    }

    /// Selects a page
    pub fn page(mut self, page: u32, page_size: u32) -> Self {
        self.page = page;
        self.page_size = page_size;
        self
    }
}

/// The six aggregate counters returned alongside every search page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiptStats {
    /// Receipts matching the filter, across all pages
    pub total_records: u64,
    /// How many of those are fully paid
    pub total_paid: u64,
    /// How many still carry a balance
    pub total_pending: u64,
    /// How many are past due
    pub total_overdue: u64,
    /// Sum of open balances
    pub pending_balance: Money,
    /// Sum of surcharges
    pub total_surcharges: Money,
}

/// Extended receipt projection used by listings and CSV export
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiptSummary {
    pub id: ReceiptId,
    pub folio: String,
    pub owner: ReceiptOwner,
    /// Student matricula, when the owner is enrolled
    pub matricula: Option<String>,
    /// Billed party's display name
    pub holder_name: String,
    pub due_on: NaiveDate,
    pub total: Money,
    pub balance: Money,
    pub status: ReceiptStatus,
}

/// One page of search results, in server order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiptPage {
    pub items: Vec<ReceiptSummary>,
    pub stats: ReceiptStats,
    pub page: u32,
    pub page_size: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_builder_defaults() {
        let q = ReceiptQuery::new();
        assert_eq!(q.page, 1);
        assert_eq!(q.page_size, ReceiptQuery::DEFAULT_PAGE_SIZE);
        assert!(q.status.is_none());
        assert!(!q.only_overdue);
    }

    #[test]
    fn test_query_builder_chaining() {
        let q = ReceiptQuery::new()
            .for_term(TermId::new(7))
            .with_status(ReceiptStatus::Pending)
            .matricula("2024")
            .only_overdue()
            .page(3, 50);

        assert_eq!(q.term, Some(TermId::new(7)));
        assert_eq!(q.status, Some(ReceiptStatus::Pending));
        assert_eq!(q.matricula_contains.as_deref(), Some("2024"));
        assert!(q.only_overdue);
        assert_eq!((q.page, q.page_size), (3, 50));
    }
}

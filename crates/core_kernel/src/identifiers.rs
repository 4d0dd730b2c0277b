//! Strongly-typed identifiers for domain entities
//!
//! The ledger backend exposes numeric identities (`idRecibo`, `idPago`, ...).
//! Newtype wrappers around those raw integers prevent accidental mixing of
//! different identifier types in client code.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

macro_rules! define_numeric_id {
    ($name:ident, $prefix:literal) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Creates an identifier from the backend's raw numeric id
            pub fn new(raw: i64) -> Self {
                Self(raw)
            }

            /// Returns the raw numeric id as sent on the wire
            pub fn raw(&self) -> i64 {
                self.0
            }

            /// Returns the identifier prefix for display
            pub fn prefix() -> &'static str {
                $prefix
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}-{}", $prefix, self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                // Strip prefix if present
                let raw = s.strip_prefix(concat!($prefix, "-")).unwrap_or(s);
                Ok(Self(raw.parse()?))
            }
        }

        impl From<i64> for $name {
            fn from(raw: i64) -> Self {
                Self(raw)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> i64 {
                id.0
            }
        }
    };
}

// Billing domain identifiers
define_numeric_id!(ReceiptId, "REC");
define_numeric_id!(ReceiptLineId, "RECL");
define_numeric_id!(PaymentId, "PAY");
define_numeric_id!(PaymentMethodId, "PM");
define_numeric_id!(ChargeConceptId, "CON");
define_numeric_id!(BillingTemplateId, "TPL");
define_numeric_id!(CashCutId, "CUT");
define_numeric_id!(ScholarshipId, "SCH");

// People and scope identifiers
define_numeric_id!(ApplicantId, "ASP");
define_numeric_id!(StudentId, "EST");
define_numeric_id!(CashierId, "CAJ");
define_numeric_id!(TermId, "TRM");
define_numeric_id!(StudyPlanId, "PLN");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_receipt_id_display() {
        let id = ReceiptId::new(4182);
        assert_eq!(id.to_string(), "REC-4182");
    }

    #[test]
    fn test_id_parsing_with_and_without_prefix() {
        let parsed: ReceiptId = "REC-4182".parse().unwrap();
        assert_eq!(parsed, ReceiptId::new(4182));

        let bare: ReceiptId = "4182".parse().unwrap();
        assert_eq!(bare, ReceiptId::new(4182));
    }

    #[test]
    fn test_serde_transparent() {
        let id = PaymentId::new(77);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "77");

        let back: PaymentId = serde_json::from_str("77").unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_raw_conversion() {
        let id = ApplicantId::from(910);
        let raw: i64 = id.into();
        assert_eq!(raw, 910);
    }
}

//! Typed IDs for type-safe entity references.
//!
//! Using typed IDs prevents accidentally passing a `StudentId` where an
//! `InvoiceId` is expected.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Macro to generate typed ID wrappers.
macro_rules! typed_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Creates a new random ID using UUID v7 (time-ordered).
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Creates an ID from an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner UUID.
            #[must_use]
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

typed_id!(StudentId, "Unique identifier for a student.");
typed_id!(ClassId, "Unique identifier for a school class.");
typed_id!(AcademicYearId, "Unique identifier for an academic year.");
typed_id!(StaffId, "Unique identifier for a staff member (opaque actor reference).");
typed_id!(FeeStructureId, "Unique identifier for a fee structure.");
typed_id!(
    FeeStructureItemId,
    "Unique identifier for a fee structure line."
);
typed_id!(InvoiceId, "Unique identifier for an invoice.");
typed_id!(InvoiceItemId, "Unique identifier for an invoice item.");
typed_id!(PaymentId, "Unique identifier for a payment.");
typed_id!(PaymentItemId, "Unique identifier for a payment allocation.");
typed_id!(
    CarryForwardId,
    "Unique identifier for a balance carry-forward transfer."
);
typed_id!(
    CarryForwardDetailId,
    "Unique identifier for a carry-forward detail line."
);

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_id_roundtrip_through_string() {
        let id = InvoiceId::new();
        let parsed = InvoiceId::from_str(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_ids_are_unique() {
        assert_ne!(PaymentId::new(), PaymentId::new());
    }

    #[test]
    fn test_from_uuid_preserves_value() {
        let uuid = uuid::Uuid::now_v7();
        assert_eq!(StudentId::from_uuid(uuid).into_inner(), uuid);
    }
}

//! Product and loyalty record values.

use serde::{Deserialize, Serialize};

/// Payload written for items whose sku has no usable loyalty row.
pub const LOYALTY_OFF: &str = "Loyalty_off";

/// One product row, as read from and written back to the store.
///
/// `payload` carries the raw input data before enrichment and the loyalty
/// string afterwards. Enrichment produces a replacement record; it never
/// mutates one in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub id: i64,
    pub sku: i64,
    pub name: String,
    pub amount: i64,
    pub payload: String,
}

impl ProductRecord {
    /// Copy of this record with the payload replaced by `enrichment`.
    pub fn with_payload(&self, enrichment: impl Into<String>) -> Self {
        Self {
            id: self.id,
            sku: self.sku,
            name: self.name.clone(),
            amount: self.amount,
            payload: enrichment.into(),
        }
    }
}

/// One loyalty row; exists only for the duration of a lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoyaltyRecord {
    pub sku: i64,
    pub data: String,
}

//! Types for holdings API requests and responses.
//!
//! The wire format is snake_case JSON; the product type travels under the
//! key `type`. Response records are decoded defensively: optional fields
//! tolerate absence, and the repository skips records it cannot interpret
//! instead of failing the whole read.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use ingot_core::holdings::{Holding, HoldingInput, Metal, WeightUnit};

// ─────────────────────────────────────────────────────────────────────────────
// Response Types
// ─────────────────────────────────────────────────────────────────────────────

/// A holdings row as stored by the service.
///
/// `metal`, `type`, and `notes` arrive as raw text because foreign clients
/// are known to write JSON metadata into them; the decode pipeline in this
/// crate turns a record into a domain [`Holding`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HoldingRecord {
    /// Unique record id assigned by the service
    pub id: String,
    /// User that owns this record
    pub user_id: String,
    /// Metal name ("gold", "silver", "platinum", "palladium")
    pub metal: String,
    /// Product type; may carry foreign JSON metadata
    #[serde(rename = "type")]
    pub product_type: Option<String>,
    /// Canonical weight in troy ounces
    pub weight: Decimal,
    /// Unit the weight was originally entered in
    pub weight_unit: Option<String>,
    pub quantity: i32,
    pub purchase_price: Decimal,
    pub purchase_date: NaiveDate,
    /// Free-form note; may carry foreign JSON metadata
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    /// Tombstone timestamp; non-null hides the record from reads
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Error response body from the service.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    pub code: String,
    pub message: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Request Types
// ─────────────────────────────────────────────────────────────────────────────

/// Request body for creating or updating a holding.
#[derive(Debug, Clone, Serialize)]
pub struct HoldingPayload {
    pub user_id: String,
    pub metal: Metal,
    #[serde(rename = "type")]
    pub product_type: String,
    /// Canonical weight in troy ounces
    pub weight: Decimal,
    pub weight_unit: WeightUnit,
    pub quantity: i32,
    pub purchase_price: Decimal,
    pub purchase_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl HoldingPayload {
    /// Builds a payload from validated form input, canonicalizing the weight.
    pub fn from_input(input: &HoldingInput, user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            metal: input.metal,
            product_type: input.product_type.trim().to_string(),
            weight: input.canonical_weight_oz(),
            weight_unit: input.weight_unit,
            quantity: input.quantity,
            purchase_price: input.purchase_price,
            purchase_date: input.purchase_date,
            notes: input.notes.clone(),
        }
    }

    /// Builds a payload from an existing holding. The stored weight is
    /// already canonical.
    pub fn from_holding(holding: &Holding, user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            metal: holding.metal,
            product_type: holding.product_type.clone(),
            weight: holding.weight,
            weight_unit: holding.weight_unit,
            quantity: holding.quantity,
            purchase_price: holding.purchase_price,
            purchase_date: holding.purchase_date,
            notes: holding.notes.clone(),
        }
    }
}

/// Request body for the tombstone write that soft-deletes a holding.
#[derive(Debug, Clone, Serialize)]
pub struct TombstonePayload {
    pub user_id: String,
    pub deleted_at: DateTime<Utc>,
}

/// Request body for migrating a batch of local-only holdings.
#[derive(Debug, Clone, Serialize)]
pub struct MigrateRequest {
    pub user_id: String,
    pub holdings: Vec<HoldingPayload>,
}

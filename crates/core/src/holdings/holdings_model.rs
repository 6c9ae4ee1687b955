//! Holdings domain models.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rand::{distributions::Alphanumeric, Rng};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::holdings_constants::{GRAM_TO_OZ, KILOGRAM_TO_OZ};
use crate::{errors::ValidationError, Error, Result};

/// Precious metals supported by the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metal {
    Gold,
    Silver,
    Platinum,
    Palladium,
}

impl Metal {
    /// All supported metals in display order.
    pub const ALL: [Metal; 4] = [Metal::Gold, Metal::Silver, Metal::Platinum, Metal::Palladium];

    pub fn as_str(&self) -> &'static str {
        match self {
            Metal::Gold => "gold",
            Metal::Silver => "silver",
            Metal::Platinum => "platinum",
            Metal::Palladium => "palladium",
        }
    }
}

impl fmt::Display for Metal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metal {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "gold" => Ok(Metal::Gold),
            "silver" => Ok(Metal::Silver),
            "platinum" => Ok(Metal::Platinum),
            "palladium" => Ok(Metal::Palladium),
            other => Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Unknown metal '{}'",
                other
            )))),
        }
    }
}

/// Weight unit a holding was originally entered in.
///
/// Kept only for display/edit round-trip. Stored weights are always troy
/// ounces; aggregation never looks at this field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WeightUnit {
    #[default]
    Oz,
    G,
    Kg,
}

impl WeightUnit {
    /// Conversion factor from this unit to troy ounces.
    pub fn oz_factor(&self) -> Decimal {
        match self {
            WeightUnit::Oz => dec!(1),
            WeightUnit::G => GRAM_TO_OZ,
            WeightUnit::Kg => KILOGRAM_TO_OZ,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WeightUnit::Oz => "oz",
            WeightUnit::G => "g",
            WeightUnit::Kg => "kg",
        }
    }
}

impl fmt::Display for WeightUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WeightUnit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "oz" => Ok(WeightUnit::Oz),
            "g" => Ok(WeightUnit::G),
            "kg" => Ok(WeightUnit::Kg),
            other => Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Unknown weight unit '{}'",
                other
            )))),
        }
    }
}

/// Domain model representing a single line item of a physical metal position.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Holding {
    /// Globally unique id. Local and remote ids come from disjoint
    /// generators and are never interchangeable.
    pub id: String,
    pub metal: Metal,
    /// Free-text product description, e.g. "Coin" or "1oz Eagle".
    pub product_type: String,
    /// Per-item weight in troy ounces. The single source of truth for
    /// computation; any other unit is a derived display transform.
    pub weight: Decimal,
    /// Unit the user originally entered the weight in.
    pub weight_unit: WeightUnit,
    /// Positive item count.
    pub quantity: i32,
    /// Purchase price per item, not multiplied by quantity.
    pub purchase_price: Decimal,
    pub purchase_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Holding {
    /// Materializes a holding from validated input under the given id.
    pub fn from_input(id: String, input: &HoldingInput) -> Self {
        let now = Utc::now();
        Self {
            id,
            metal: input.metal,
            product_type: input.product_type.trim().to_string(),
            weight: input.canonical_weight_oz(),
            weight_unit: input.weight_unit,
            quantity: input.quantity,
            purchase_price: input.purchase_price,
            purchase_date: input.purchase_date,
            notes: input.notes.clone(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrites the mutable fields from validated input, keeping id and
    /// creation timestamp, and refreshes `updated_at`.
    pub fn apply_input(&mut self, input: &HoldingInput) {
        self.metal = input.metal;
        self.product_type = input.product_type.trim().to_string();
        self.weight = input.canonical_weight_oz();
        self.weight_unit = input.weight_unit;
        self.quantity = input.quantity;
        self.purchase_price = input.purchase_price;
        self.purchase_date = input.purchase_date;
        self.notes = input.notes.clone();
        self.updated_at = Utc::now();
    }

    /// Total ounces represented by this line item (weight × quantity).
    pub fn total_oz(&self) -> Decimal {
        self.weight * Decimal::from(self.quantity)
    }

    /// Weight converted back into the originally entered unit, for edit
    /// forms. Never persisted.
    pub fn display_weight(&self) -> Decimal {
        self.weight / self.weight_unit.oz_factor()
    }
}

/// Form payload for creating, updating, or importing a holding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldingInput {
    pub metal: Metal,
    pub product_type: String,
    /// Weight as entered, expressed in `weight_unit`.
    pub weight: Decimal,
    #[serde(default)]
    pub weight_unit: WeightUnit,
    pub quantity: i32,
    pub purchase_price: Decimal,
    pub purchase_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl HoldingInput {
    /// Validates the form data before it reaches any store.
    pub fn validate(&self) -> Result<()> {
        if self.product_type.trim().is_empty() {
            return Err(Error::Validation(ValidationError::MissingField(
                "productType".to_string(),
            )));
        }
        if self.weight <= Decimal::ZERO {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Weight must be greater than zero".to_string(),
            )));
        }
        if self.quantity <= 0 {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Quantity must be a positive whole number".to_string(),
            )));
        }
        if self.purchase_price < Decimal::ZERO {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Purchase price cannot be negative".to_string(),
            )));
        }
        if self.purchase_date > Utc::now().date_naive() {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Purchase date cannot be in the future".to_string(),
            )));
        }
        Ok(())
    }

    /// The entered weight converted to canonical troy ounces.
    pub fn canonical_weight_oz(&self) -> Decimal {
        self.weight * self.weight_unit.oz_factor()
    }
}

/// Aggregated position for one metal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetalTotal {
    pub metal: Metal,
    /// Sum of weight × quantity across holdings of this metal.
    pub total_oz: Decimal,
    /// Sum of per-item purchase prices across holdings of this metal.
    /// Intentionally not multiplied by quantity.
    pub total_cost: Decimal,
}

/// Folds a holding collection into per-metal totals.
///
/// Always returns all supported metals in display order; metals without
/// holdings carry zero totals.
pub fn totals_by_metal(holdings: &[Holding]) -> Vec<MetalTotal> {
    Metal::ALL
        .iter()
        .map(|metal| {
            let mut total_oz = Decimal::ZERO;
            let mut total_cost = Decimal::ZERO;
            for holding in holdings.iter().filter(|h| h.metal == *metal) {
                total_oz += holding.total_oz();
                total_cost += holding.purchase_price;
            }
            MetalTotal {
                metal: *metal,
                total_oz,
                total_cost,
            }
        })
        .collect()
}

/// Generates a device-local holding id: millisecond timestamp plus a random
/// alphanumeric suffix. Unique enough for one device, never valid as a
/// remote key.
pub fn generate_local_id() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(char::from)
        .collect();
    format!("{}-{}", Utc::now().timestamp_millis(), suffix)
}

use async_trait::async_trait;
use chrono::Utc;
use log::warn;

use ingot_core::errors::{Error, RemoteError, Result};
use ingot_core::holdings::{
    Holding, HoldingInput, Metal, RemoteHoldingsRepositoryTrait, WeightUnit,
};

use crate::client::HoldingsApiClient;
use crate::decode::{decode_notes, decode_product_type};
use crate::types::{HoldingPayload, HoldingRecord, MigrateRequest, TombstonePayload};

/// Remote holdings repository backed by the HTTP API client.
///
/// Owns the record-to-domain conversion: tombstone filtering, newest-first
/// ordering, and the defensive decoding of text fields.
pub struct ApiHoldingsRepository {
    client: HoldingsApiClient,
}

impl ApiHoldingsRepository {
    /// Creates a new ApiHoldingsRepository over the given client.
    pub fn new(client: HoldingsApiClient) -> Self {
        Self { client }
    }
}

/// Decodes one raw response row. Rows that cannot be interpreted are
/// skipped with a warning; one foreign row must not fail the whole read.
fn decode_row(value: serde_json::Value) -> Option<Holding> {
    let record: HoldingRecord = match serde_json::from_value(value) {
        Ok(record) => record,
        Err(e) => {
            warn!("Skipping undecodable remote holding row: {}", e);
            return None;
        }
    };
    if record.deleted_at.is_some() {
        return None;
    }
    holding_from_record(record)
}

/// Converts a wire record into a domain holding.
fn holding_from_record(record: HoldingRecord) -> Option<Holding> {
    let metal = match record.metal.parse::<Metal>() {
        Ok(metal) => metal,
        Err(_) => {
            warn!(
                "Skipping remote holding {} with unknown metal '{}'",
                record.id, record.metal
            );
            return None;
        }
    };
    let weight_unit = record
        .weight_unit
        .as_deref()
        .and_then(|unit| unit.parse::<WeightUnit>().ok())
        .unwrap_or_default();

    Some(Holding {
        id: record.id,
        metal,
        product_type: decode_product_type(record.product_type.as_deref().unwrap_or_default()),
        weight: record.weight,
        weight_unit,
        quantity: record.quantity,
        purchase_price: record.purchase_price,
        purchase_date: record.purchase_date,
        notes: decode_notes(record.notes),
        created_at: record.created_at,
        updated_at: record.updated_at.unwrap_or(record.created_at),
    })
}

/// Decodes a single-record response. Echoes of our own writes must decode;
/// one that does not is reported as a service fault.
fn require_holding(record: HoldingRecord) -> Result<Holding> {
    let id = record.id.clone();
    holding_from_record(record).ok_or_else(|| {
        Error::Remote(RemoteError::Unavailable(format!(
            "holding record {} in response is undecodable",
            id
        )))
    })
}

#[async_trait]
impl RemoteHoldingsRepositoryTrait for ApiHoldingsRepository {
    async fn fetch(&self, user_id: &str) -> Result<Vec<Holding>> {
        let rows = self.client.fetch_holdings(user_id).await?;
        let mut holdings: Vec<Holding> = rows.into_iter().filter_map(decode_row).collect();
        holdings.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(holdings)
    }

    async fn add(&self, input: HoldingInput, user_id: &str) -> Result<Holding> {
        input.validate()?;
        let payload = HoldingPayload::from_input(&input, user_id);
        let record = self.client.create_holding(&payload).await?;
        require_holding(record)
    }

    async fn update(&self, id: &str, input: HoldingInput, user_id: &str) -> Result<Holding> {
        input.validate()?;
        let payload = HoldingPayload::from_input(&input, user_id);
        let record = self.client.patch_holding(id, &payload).await?;
        require_holding(record)
    }

    async fn delete(&self, id: &str, user_id: &str) -> Result<()> {
        let payload = TombstonePayload {
            user_id: user_id.to_string(),
            deleted_at: Utc::now(),
        };
        self.client.tombstone_holding(id, &payload).await?;
        Ok(())
    }

    async fn migrate_batch(&self, holdings: Vec<Holding>, user_id: &str) -> Result<Vec<Holding>> {
        if holdings.is_empty() {
            return Ok(Vec::new());
        }
        let request = MigrateRequest {
            user_id: user_id.to_string(),
            holdings: holdings
                .iter()
                .map(|holding| HoldingPayload::from_holding(holding, user_id))
                .collect(),
        };
        let records = self.client.migrate_holdings(&request).await?;
        records.into_iter().map(require_holding).collect()
    }
}

use std::sync::Mutex;

use async_trait::async_trait;
use log::{debug, info};

use crate::document::{JsonDocumentStore, HOLDINGS_DOCUMENT_KEY};
use ingot_core::errors::{Error, Result, StorageError};
use ingot_core::holdings::{
    generate_local_id, holdings_to_csv, parse_holdings_csv, Holding, HoldingInput,
    LocalHoldingsRepositoryTrait,
};

/// Repository for the device-local holdings collection.
///
/// The collection is one JSON array blob: every mutation loads it, applies
/// the change, and rewrites the whole document. Mutations serialize on an
/// internal guard so two writers cannot interleave the read-modify-write.
pub struct JsonHoldingsRepository {
    store: JsonDocumentStore,
    write_guard: Mutex<()>,
}

impl JsonHoldingsRepository {
    /// Creates a new JsonHoldingsRepository backed by the given store.
    pub fn new(store: JsonDocumentStore) -> Self {
        Self {
            store,
            write_guard: Mutex::new(()),
        }
    }

    fn load(&self) -> Result<Vec<Holding>> {
        Ok(self.store.read(HOLDINGS_DOCUMENT_KEY)?.unwrap_or_default())
    }

    fn save(&self, holdings: &[Holding]) -> Result<()> {
        self.store.write(HOLDINGS_DOCUMENT_KEY, &holdings)
    }
}

#[async_trait]
impl LocalHoldingsRepositoryTrait for JsonHoldingsRepository {
    fn list(&self) -> Result<Vec<Holding>> {
        self.load()
    }

    async fn add(&self, input: HoldingInput) -> Result<Holding> {
        input.validate()?;

        let _guard = self.write_guard.lock().unwrap();
        let mut holdings = self.load()?;
        let holding = Holding::from_input(generate_local_id(), &input);
        holdings.push(holding.clone());
        self.save(&holdings)?;
        debug!("Added local holding {}", holding.id);
        Ok(holding)
    }

    async fn update(&self, id: &str, input: HoldingInput) -> Result<Holding> {
        input.validate()?;

        let _guard = self.write_guard.lock().unwrap();
        let mut holdings = self.load()?;
        let holding = holdings
            .iter_mut()
            .find(|holding| holding.id == id)
            .ok_or_else(|| Error::Storage(StorageError::NotFound(id.to_string())))?;
        holding.apply_input(&input);
        let updated = holding.clone();
        self.save(&holdings)?;
        debug!("Updated local holding {}", id);
        Ok(updated)
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let _guard = self.write_guard.lock().unwrap();
        let mut holdings = self.load()?;
        let before = holdings.len();
        holdings.retain(|holding| holding.id != id);
        if holdings.len() == before {
            return Err(Error::Storage(StorageError::NotFound(id.to_string())));
        }
        self.save(&holdings)?;
        debug!("Deleted local holding {}", id);
        Ok(())
    }

    async fn import_csv(&self, text: &str) -> Result<Vec<Holding>> {
        let outcome = parse_holdings_csv(text)?;

        let _guard = self.write_guard.lock().unwrap();
        let mut holdings = self.load()?;
        let mut created = Vec::with_capacity(outcome.inputs.len());
        for input in outcome.inputs {
            let holding = Holding::from_input(generate_local_id(), &input);
            holdings.push(holding.clone());
            created.push(holding);
        }
        self.save(&holdings)?;
        info!(
            "Imported {} holdings into the local store ({} rows skipped)",
            created.len(),
            outcome.skipped
        );
        Ok(created)
    }

    fn export_csv(&self) -> Result<String> {
        let holdings = self.load()?;
        holdings_to_csv(&holdings)
    }

    async fn replace_all(&self, holdings: Vec<Holding>) -> Result<()> {
        let _guard = self.write_guard.lock().unwrap();
        self.save(&holdings)?;
        info!(
            "Replaced local holdings collection ({} records)",
            holdings.len()
        );
        Ok(())
    }

    async fn clear_all(&self) -> Result<()> {
        let _guard = self.write_guard.lock().unwrap();
        self.store.remove(HOLDINGS_DOCUMENT_KEY)?;
        info!("Cleared local holdings collection");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use ingot_core::holdings::{Metal, WeightUnit};
    use rust_decimal_macros::dec;

    fn repository_in(dir: &tempfile::TempDir) -> JsonHoldingsRepository {
        let store = JsonDocumentStore::new(dir.path()).unwrap();
        JsonHoldingsRepository::new(store)
    }

    fn gold_input() -> HoldingInput {
        HoldingInput {
            metal: Metal::Gold,
            product_type: "Coin".to_string(),
            weight: dec!(1),
            weight_unit: WeightUnit::Oz,
            quantity: 1,
            purchase_price: dec!(2000),
            purchase_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_add_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let holding = {
            let repository = repository_in(&dir);
            repository.add(gold_input()).await.unwrap()
        };

        let reopened = repository_in(&dir);
        let holdings = reopened.list().unwrap();
        assert_eq!(holdings.len(), 1);
        assert_eq!(holdings[0].id, holding.id);
    }

    #[tokio::test]
    async fn test_invalid_input_is_rejected_before_persisting() {
        let dir = tempfile::tempdir().unwrap();
        let repository = repository_in(&dir);
        let mut input = gold_input();
        input.weight = dec!(0);

        assert!(repository.add(input).await.is_err());
        assert!(repository.list().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_missing_id_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let repository = repository_in(&dir);

        let err = repository
            .update("missing", gold_input())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_update_keeps_identity_and_creation_time() {
        let dir = tempfile::tempdir().unwrap();
        let repository = repository_in(&dir);
        let holding = repository.add(gold_input()).await.unwrap();

        let mut input = gold_input();
        input.purchase_price = dec!(2150);
        let updated = repository.update(&holding.id, input).await.unwrap();

        assert_eq!(updated.id, holding.id);
        assert_eq!(updated.created_at, holding.created_at);
        assert_eq!(updated.purchase_price, dec!(2150));
    }

    #[tokio::test]
    async fn test_delete_rewrites_collection() {
        let dir = tempfile::tempdir().unwrap();
        let repository = repository_in(&dir);
        let kept = repository.add(gold_input()).await.unwrap();
        let removed = repository.add(gold_input()).await.unwrap();

        repository.delete(&removed.id).await.unwrap();

        let holdings = repository.list().unwrap();
        assert_eq!(holdings.len(), 1);
        assert_eq!(holdings[0].id, kept.id);

        let err = repository.delete(&removed.id).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_import_merges_and_generates_fresh_ids() {
        let dir = tempfile::tempdir().unwrap();
        let repository = repository_in(&dir);
        let existing = repository.add(gold_input()).await.unwrap();

        let csv = "\"Silver\",\"Bar\",\"10.0000\",\"1\",\"10.0000\",\"500.00\",\"2024-02-01\",\"\",\"\"\n\
                   \"Gold\",\"Round\",\"0.5000\",\"2\",\"1.0000\",\"1000.00\",\"2024-03-01\",\"\",\"\"\n";
        let created = repository.import_csv(csv).await.unwrap();

        assert_eq!(created.len(), 2);
        let holdings = repository.list().unwrap();
        assert_eq!(holdings.len(), 3);
        assert!(created.iter().all(|holding| holding.id != existing.id));
    }

    #[tokio::test]
    async fn test_export_round_trips_through_import() {
        let dir = tempfile::tempdir().unwrap();
        let repository = repository_in(&dir);
        repository.add(gold_input()).await.unwrap();
        let csv = repository.export_csv().unwrap();

        let other_dir = tempfile::tempdir().unwrap();
        let other = repository_in(&other_dir);
        let imported = other.import_csv(&csv).await.unwrap();

        assert_eq!(imported.len(), 1);
        assert_eq!(imported[0].metal, Metal::Gold);
        assert_eq!(imported[0].weight, dec!(1));
    }

    #[tokio::test]
    async fn test_replace_all_overwrites_collection() {
        let dir = tempfile::tempdir().unwrap();
        let repository = repository_in(&dir);
        repository.add(gold_input()).await.unwrap();

        let replacement = vec![Holding::from_input("kept".to_string(), &gold_input())];
        repository.replace_all(replacement).await.unwrap();

        let holdings = repository.list().unwrap();
        assert_eq!(holdings.len(), 1);
        assert_eq!(holdings[0].id, "kept");
    }

    #[tokio::test]
    async fn test_clear_all_removes_document() {
        let dir = tempfile::tempdir().unwrap();
        let repository = repository_in(&dir);
        repository.add(gold_input()).await.unwrap();

        repository.clear_all().await.unwrap();

        assert!(repository.list().unwrap().is_empty());
        assert!(!dir.path().join("holdings.json").exists());
    }
}

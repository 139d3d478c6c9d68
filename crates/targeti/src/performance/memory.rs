use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::NaiveDate;

use super::domain::{DailyRecord, Shop, ShopId, ShopUpdate, TargetSet};
use super::repository::{PerformanceRepository, RepositoryError};

#[derive(Debug, Default)]
struct StoreState {
    shops: BTreeMap<ShopId, Shop>,
    records: HashMap<ShopId, BTreeMap<NaiveDate, DailyRecord>>,
}

/// Process-local store keyed by shop id and record date.
#[derive(Debug, Default, Clone)]
pub struct InMemoryPerformanceStore {
    state: Arc<Mutex<StoreState>>,
}

impl InMemoryPerformanceStore {
    fn lock(&self) -> Result<MutexGuard<'_, StoreState>, RepositoryError> {
        self.state
            .lock()
            .map_err(|_| RepositoryError::Unavailable("store mutex poisoned".to_string()))
    }
}

impl PerformanceRepository for InMemoryPerformanceStore {
    fn shops(&self) -> Result<Vec<Shop>, RepositoryError> {
        Ok(self.lock()?.shops.values().cloned().collect())
    }

    fn fetch_shop(&self, id: &ShopId) -> Result<Option<Shop>, RepositoryError> {
        Ok(self.lock()?.shops.get(id).cloned())
    }

    fn insert_shop(&self, shop: Shop) -> Result<Shop, RepositoryError> {
        let mut guard = self.lock()?;
        if guard.shops.contains_key(&shop.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.shops.insert(shop.id.clone(), shop.clone());
        Ok(shop)
    }

    fn update_shop_profile(
        &self,
        id: &ShopId,
        profile: ShopUpdate,
    ) -> Result<Shop, RepositoryError> {
        let mut guard = self.lock()?;
        let shop = guard.shops.get_mut(id).ok_or(RepositoryError::NotFound)?;
        shop.name = profile.name;
        shop.description = profile.description;
        shop.sales_representatives = profile.sales_representatives;
        Ok(shop.clone())
    }

    fn delete_shop(&self, id: &ShopId) -> Result<(), RepositoryError> {
        let mut guard = self.lock()?;
        guard.shops.remove(id).ok_or(RepositoryError::NotFound)?;
        guard.records.remove(id);
        Ok(())
    }

    fn save_targets(&self, id: &ShopId, targets: TargetSet) -> Result<(), RepositoryError> {
        let mut guard = self.lock()?;
        let shop = guard.shops.get_mut(id).ok_or(RepositoryError::NotFound)?;
        shop.monthly_targets = targets;
        Ok(())
    }

    fn daily_records(&self, id: &ShopId) -> Result<Vec<DailyRecord>, RepositoryError> {
        Ok(self
            .lock()?
            .records
            .get(id)
            .map(|book| book.values().cloned().collect())
            .unwrap_or_default())
    }

    fn upsert_daily_record(
        &self,
        id: &ShopId,
        record: DailyRecord,
    ) -> Result<Option<DailyRecord>, RepositoryError> {
        let mut guard = self.lock()?;
        if !guard.shops.contains_key(id) {
            return Err(RepositoryError::NotFound);
        }
        Ok(guard
            .records
            .entry(id.clone())
            .or_default()
            .insert(record.date, record))
    }

    fn upsert_daily_records(
        &self,
        id: &ShopId,
        records: Vec<DailyRecord>,
    ) -> Result<usize, RepositoryError> {
        let mut guard = self.lock()?;
        if !guard.shops.contains_key(id) {
            return Err(RepositoryError::NotFound);
        }
        let book = guard.records.entry(id.clone()).or_default();
        Ok(records
            .into_iter()
            .filter_map(|record| book.insert(record.date, record))
            .count())
    }
}

use super::domain::{DailyRecord, Shop, ShopId, ShopUpdate, TargetSet};

/// Storage abstraction so the service and engine can be exercised with in-memory fixtures.
pub trait PerformanceRepository: Send + Sync {
    fn shops(&self) -> Result<Vec<Shop>, RepositoryError>;
    fn fetch_shop(&self, id: &ShopId) -> Result<Option<Shop>, RepositoryError>;
    fn insert_shop(&self, shop: Shop) -> Result<Shop, RepositoryError>;
    /// Overwrite name, description and roster in place; monthly targets are left untouched.
    fn update_shop_profile(
        &self,
        id: &ShopId,
        profile: ShopUpdate,
    ) -> Result<Shop, RepositoryError>;
    fn delete_shop(&self, id: &ShopId) -> Result<(), RepositoryError>;

    fn save_targets(&self, id: &ShopId, targets: TargetSet) -> Result<(), RepositoryError>;

    /// Daily records for a shop, ascending by date.
    fn daily_records(&self, id: &ShopId) -> Result<Vec<DailyRecord>, RepositoryError>;
    /// Replace the record for the same date or insert it, returning the replaced record.
    fn upsert_daily_record(
        &self,
        id: &ShopId,
        record: DailyRecord,
    ) -> Result<Option<DailyRecord>, RepositoryError>;
    /// Upsert every record or none of them, returning how many replaced an existing date.
    fn upsert_daily_records(
        &self,
        id: &ShopId,
        records: Vec<DailyRecord>,
    ) -> Result<usize, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

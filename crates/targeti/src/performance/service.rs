use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::achievement::AchievementCalculator;
use super::domain::{
    DailyRecord, MetricTotals, NewShop, RepresentativeId, Shop, ShopId, ShopUpdate, TargetSet,
};
use super::forecast::MonthProgress;
use super::report::views::{AchievementQuote, NetworkOverview, ShopDetail};
use super::report::{PerformanceReport, ShopSnapshot};
use super::repository::{PerformanceRepository, RepositoryError};

/// Whether a saved daily record created a new date or replaced an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordOutcome {
    Created,
    Replaced,
}

/// Service composing the persistence port with the scoring engine.
pub struct PerformanceService<R> {
    repository: Arc<R>,
    calculator: AchievementCalculator,
    shop_sequence: AtomicU64,
}

impl<R> PerformanceService<R>
where
    R: PerformanceRepository + 'static,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self::with_calculator(repository, AchievementCalculator::default())
    }

    pub fn with_calculator(repository: Arc<R>, calculator: AchievementCalculator) -> Self {
        Self {
            repository,
            calculator,
            shop_sequence: AtomicU64::new(1),
        }
    }

    fn next_shop_id(&self) -> ShopId {
        let id = self.shop_sequence.fetch_add(1, Ordering::Relaxed);
        ShopId(format!("shop-{id:06}"))
    }

    pub fn shops(&self) -> Result<Vec<Shop>, PerformanceServiceError> {
        Ok(self.repository.shops()?)
    }

    pub fn shop(&self, shop_id: &ShopId) -> Result<Shop, PerformanceServiceError> {
        self.repository
            .fetch_shop(shop_id)?
            .ok_or_else(|| PerformanceServiceError::ShopNotFound(shop_id.clone()))
    }

    /// Create a shop with the catalog default targets and no representatives.
    pub fn add_shop(&self, new_shop: NewShop) -> Result<Shop, PerformanceServiceError> {
        let name = validated_name(&new_shop.name)?;

        // Skip ids already taken by records stored outside this service.
        loop {
            let shop = Shop {
                id: self.next_shop_id(),
                name: name.clone(),
                description: normalized_description(new_shop.description.as_deref()),
                sales_representatives: Vec::new(),
                monthly_targets: TargetSet::default(),
            };
            match self.repository.insert_shop(shop) {
                Ok(stored) => {
                    info!(shop_id = %stored.id, name = %stored.name, "shop created");
                    return Ok(stored);
                }
                Err(RepositoryError::Conflict) => continue,
                Err(other) => return Err(other.into()),
            }
        }
    }

    pub fn update_shop(
        &self,
        shop_id: &ShopId,
        update: ShopUpdate,
    ) -> Result<Shop, PerformanceServiceError> {
        let name = validated_name(&update.name)?;

        let mut seen = BTreeSet::new();
        for rep in &update.sales_representatives {
            if rep.id.0.trim().is_empty() || rep.name.trim().is_empty() {
                warn!(%shop_id, "rejected representative without id or name");
                return Err(PerformanceServiceError::InvalidRepresentative);
            }
            if !seen.insert(&rep.id) {
                warn!(%shop_id, representative_id = %rep.id, "rejected duplicate representative");
                return Err(PerformanceServiceError::DuplicateRepresentative(
                    rep.id.clone(),
                ));
            }
        }

        let profile = ShopUpdate {
            name,
            description: normalized_description(update.description.as_deref()),
            sales_representatives: update.sales_representatives,
        };
        let shop = self
            .repository
            .update_shop_profile(shop_id, profile)
            .map_err(|err| not_found_as_shop(err, shop_id))?;

        info!(
            %shop_id,
            representatives = shop.sales_representatives.len(),
            "shop updated"
        );
        Ok(shop)
    }

    /// Remove a shop together with all of its daily records.
    pub fn delete_shop(&self, shop_id: &ShopId) -> Result<(), PerformanceServiceError> {
        self.repository
            .delete_shop(shop_id)
            .map_err(|err| not_found_as_shop(err, shop_id))?;
        info!(%shop_id, "shop deleted");
        Ok(())
    }

    pub fn save_targets(
        &self,
        shop_id: &ShopId,
        targets: TargetSet,
    ) -> Result<Shop, PerformanceServiceError> {
        self.repository
            .save_targets(shop_id, targets)
            .map_err(|err| not_found_as_shop(err, shop_id))?;
        info!(%shop_id, "monthly targets saved");
        self.shop(shop_id)
    }

    /// Save a day of activity, replacing any record already stored for that date.
    pub fn record_day(
        &self,
        shop_id: &ShopId,
        record: DailyRecord,
    ) -> Result<RecordOutcome, PerformanceServiceError> {
        reject_duplicate_entries(shop_id, &record)?;

        let date = record.date;
        let entries = record.entries.len();
        let replaced = self
            .repository
            .upsert_daily_record(shop_id, record)
            .map_err(|err| not_found_as_shop(err, shop_id))?;

        let outcome = if replaced.is_some() {
            RecordOutcome::Replaced
        } else {
            RecordOutcome::Created
        };
        info!(%shop_id, %date, entries, ?outcome, "daily record saved");
        Ok(outcome)
    }

    /// Save a batch of records (e.g. from a CSV import), returning how many were stored.
    ///
    /// The batch is validated up front and written as a whole; a rejected batch stores nothing.
    pub fn import_records(
        &self,
        shop_id: &ShopId,
        records: Vec<DailyRecord>,
    ) -> Result<usize, PerformanceServiceError> {
        for record in &records {
            reject_duplicate_entries(shop_id, record)?;
        }

        let saved = records.len();
        let replaced = self
            .repository
            .upsert_daily_records(shop_id, records)
            .map_err(|err| not_found_as_shop(err, shop_id))?;
        info!(%shop_id, saved, replaced, "daily records imported");
        Ok(saved)
    }

    /// Stored daily records for one shop, ascending by date.
    pub fn daily_records(
        &self,
        shop_id: &ShopId,
    ) -> Result<Vec<DailyRecord>, PerformanceServiceError> {
        self.shop(shop_id)?;
        Ok(self.repository.daily_records(shop_id)?)
    }

    /// Network-wide rankings and averages for the month containing `today`.
    pub fn dashboard(&self, today: NaiveDate) -> Result<NetworkOverview, PerformanceServiceError> {
        let shops = self.repository.shops()?;
        let records = shops
            .iter()
            .map(|shop| self.repository.daily_records(&shop.id))
            .collect::<Result<Vec<_>, _>>()?;

        let snapshots: Vec<ShopSnapshot<'_>> = shops
            .iter()
            .zip(records.iter())
            .map(|(shop, records)| ShopSnapshot::new(shop, records))
            .collect();

        let overview = PerformanceReport::new(&self.calculator, today).network(&snapshots);
        debug!(
            %today,
            shops = overview.shops.len(),
            average = %overview.average_achievement,
            "dashboard computed"
        );
        Ok(overview)
    }

    pub fn shop_detail(
        &self,
        shop_id: &ShopId,
        today: NaiveDate,
    ) -> Result<ShopDetail, PerformanceServiceError> {
        let shop = self.shop(shop_id)?;
        let records = self.repository.daily_records(shop_id)?;

        let detail =
            PerformanceReport::new(&self.calculator, today).shop(&ShopSnapshot::new(&shop, &records));
        debug!(
            %shop_id,
            %today,
            achievement = %detail.achievement,
            forecast = %detail.forecast_achievement,
            "shop detail computed"
        );
        Ok(detail)
    }

    /// Score arbitrary totals; with a month position the totals are also projected and scored.
    pub fn quote(
        &self,
        totals: &MetricTotals,
        targets: &TargetSet,
        month: Option<MonthProgress>,
    ) -> AchievementQuote {
        let projected_totals = month.map(|progress| progress.project(totals));
        let forecast_achievement = projected_totals
            .as_ref()
            .map(|projected| self.calculator.score(projected, targets));

        AchievementQuote {
            achievement: self.calculator.score(totals, targets),
            month,
            projected_totals,
            forecast_achievement,
        }
    }
}

fn validated_name(name: &str) -> Result<String, PerformanceServiceError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        warn!("rejected empty shop name");
        return Err(PerformanceServiceError::InvalidShopName);
    }
    Ok(trimmed.to_string())
}

fn normalized_description(description: Option<&str>) -> Option<String> {
    description
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

fn reject_duplicate_entries(
    shop_id: &ShopId,
    record: &DailyRecord,
) -> Result<(), PerformanceServiceError> {
    match record.duplicate_representative() {
        Some(representative_id) => {
            warn!(%shop_id, date = %record.date, %representative_id, "rejected duplicate entry");
            Err(PerformanceServiceError::DuplicateRepresentativeEntry {
                date: record.date,
                representative_id: representative_id.clone(),
            })
        }
        None => Ok(()),
    }
}

fn not_found_as_shop(err: RepositoryError, shop_id: &ShopId) -> PerformanceServiceError {
    match err {
        RepositoryError::NotFound => PerformanceServiceError::ShopNotFound(shop_id.clone()),
        other => PerformanceServiceError::Repository(other),
    }
}

/// Error raised by the performance service.
#[derive(Debug, thiserror::Error)]
pub enum PerformanceServiceError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("shop {0} not found")]
    ShopNotFound(ShopId),
    #[error("shop name must not be empty")]
    InvalidShopName,
    #[error("sales representatives need a non-empty id and name")]
    InvalidRepresentative,
    #[error("sales representative {0} is listed more than once")]
    DuplicateRepresentative(RepresentativeId),
    #[error("representative {representative_id} appears more than once in the record for {date}")]
    DuplicateRepresentativeEntry {
        date: NaiveDate,
        representative_id: RepresentativeId,
    },
}

impl PerformanceServiceError {
    /// Input the caller can fix, as opposed to a missing resource or a storage failure.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidShopName
                | Self::InvalidRepresentative
                | Self::DuplicateRepresentative(_)
                | Self::DuplicateRepresentativeEntry { .. }
        )
    }
}

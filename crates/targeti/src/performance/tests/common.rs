use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request};
use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::performance::domain::{
    DailyRecord, RepresentativeEntry, RepresentativeId, SalesRepresentative, Shop, ShopId,
    ShopUpdate, TargetSet,
};
use crate::performance::memory::InMemoryPerformanceStore;
use crate::performance::repository::{PerformanceRepository, RepositoryError};
use crate::performance::service::PerformanceService;
use crate::performance::{Metric, NewShop};

pub(super) fn april(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 4, day).expect("valid date")
}

pub(super) fn build_service() -> (
    PerformanceService<InMemoryPerformanceStore>,
    Arc<InMemoryPerformanceStore>,
) {
    let repository = Arc::new(InMemoryPerformanceStore::default());
    (PerformanceService::new(repository.clone()), repository)
}

pub(super) fn representative(id: &str, name: &str) -> SalesRepresentative {
    SalesRepresentative {
        id: RepresentativeId(id.to_string()),
        name: name.to_string(),
    }
}

/// Creates "Main Street" with Alice and Bob and a single-metric target of 100 SIMs.
pub(super) fn main_street(service: &PerformanceService<InMemoryPerformanceStore>) -> Shop {
    let shop = service
        .add_shop(NewShop {
            name: "Main Street".to_string(),
            description: Some("Flagship".to_string()),
        })
        .expect("shop created");
    service
        .update_shop(
            &shop.id,
            ShopUpdate {
                name: shop.name.clone(),
                description: shop.description.clone(),
                sales_representatives: vec![
                    representative("alice", "Alice"),
                    representative("bob", "Bob"),
                ],
            },
        )
        .expect("representatives saved");
    service
        .save_targets(&shop.id, TargetSet::new([(Metric::NewSim, 100.0)]))
        .expect("targets saved")
}

pub(super) fn sim_day(date: NaiveDate, counts: &[(&str, u32)]) -> DailyRecord {
    DailyRecord::new(
        date,
        counts
            .iter()
            .map(|(id, count)| {
                RepresentativeEntry::new(RepresentativeId(id.to_string()))
                    .with_count(Metric::NewSim, *count)
            })
            .collect(),
    )
}

pub(super) fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request builds")
}

pub(super) fn empty_request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("request builds")
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

/// Repository whose backing store is always down.
#[derive(Default)]
pub(super) struct UnavailableRepository;

impl UnavailableRepository {
    fn down<T>() -> Result<T, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

impl PerformanceRepository for UnavailableRepository {
    fn shops(&self) -> Result<Vec<Shop>, RepositoryError> {
        Self::down()
    }

    fn fetch_shop(&self, _id: &ShopId) -> Result<Option<Shop>, RepositoryError> {
        Self::down()
    }

    fn insert_shop(&self, _shop: Shop) -> Result<Shop, RepositoryError> {
        Self::down()
    }

    fn update_shop_profile(
        &self,
        _id: &ShopId,
        _profile: ShopUpdate,
    ) -> Result<Shop, RepositoryError> {
        Self::down()
    }

    fn delete_shop(&self, _id: &ShopId) -> Result<(), RepositoryError> {
        Self::down()
    }

    fn save_targets(&self, _id: &ShopId, _targets: TargetSet) -> Result<(), RepositoryError> {
        Self::down()
    }

    fn daily_records(&self, _id: &ShopId) -> Result<Vec<DailyRecord>, RepositoryError> {
        Self::down()
    }

    fn upsert_daily_record(
        &self,
        _id: &ShopId,
        _record: DailyRecord,
    ) -> Result<Option<DailyRecord>, RepositoryError> {
        Self::down()
    }

    fn upsert_daily_records(
        &self,
        _id: &ShopId,
        _records: Vec<DailyRecord>,
    ) -> Result<usize, RepositoryError> {
        Self::down()
    }
}

/// In-memory store that saves `interleaved_targets` whenever a shop is read or its profile
/// is written, standing in for a request racing the one under test.
pub(super) struct RacingTargetsRepository {
    pub(super) inner: InMemoryPerformanceStore,
    pub(super) interleaved_targets: TargetSet,
}

impl RacingTargetsRepository {
    fn race(&self, id: &ShopId) {
        let _ = self.inner.save_targets(id, self.interleaved_targets.clone());
    }
}

impl PerformanceRepository for RacingTargetsRepository {
    fn shops(&self) -> Result<Vec<Shop>, RepositoryError> {
        self.inner.shops()
    }

    fn fetch_shop(&self, id: &ShopId) -> Result<Option<Shop>, RepositoryError> {
        let shop = self.inner.fetch_shop(id);
        self.race(id);
        shop
    }

    fn insert_shop(&self, shop: Shop) -> Result<Shop, RepositoryError> {
        self.inner.insert_shop(shop)
    }

    fn update_shop_profile(
        &self,
        id: &ShopId,
        profile: ShopUpdate,
    ) -> Result<Shop, RepositoryError> {
        self.race(id);
        self.inner.update_shop_profile(id, profile)
    }

    fn delete_shop(&self, id: &ShopId) -> Result<(), RepositoryError> {
        self.inner.delete_shop(id)
    }

    fn save_targets(&self, id: &ShopId, targets: TargetSet) -> Result<(), RepositoryError> {
        self.inner.save_targets(id, targets)
    }

    fn daily_records(&self, id: &ShopId) -> Result<Vec<DailyRecord>, RepositoryError> {
        self.inner.daily_records(id)
    }

    fn upsert_daily_record(
        &self,
        id: &ShopId,
        record: DailyRecord,
    ) -> Result<Option<DailyRecord>, RepositoryError> {
        self.inner.upsert_daily_record(id, record)
    }

    fn upsert_daily_records(
        &self,
        id: &ShopId,
        records: Vec<DailyRecord>,
    ) -> Result<usize, RepositoryError> {
        self.inner.upsert_daily_records(id, records)
    }
}

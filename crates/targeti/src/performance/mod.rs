//! Sales achievement scoring, month-end forecasting, and the shop dashboard built on them.
//!
//! The engine modules (`catalog`, `achievement`, `forecast`, `aggregation`) are pure and
//! synchronous. `service` composes them with a [`PerformanceRepository`] and `router`
//! exposes the service over HTTP.

pub mod achievement;
pub mod aggregation;
pub mod catalog;
pub mod domain;
pub mod forecast;
pub mod import;
pub mod memory;
pub mod report;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use achievement::{compute_achievement, AchievementCalculator, AchievementScore};
pub use aggregation::{aggregate, AggregationScope};
pub use catalog::{Metric, MetricWeights};
pub use domain::{
    parse_record_date, DailyRecord, MetricTotals, NewShop, RepresentativeEntry, RepresentativeId,
    SalesRepresentative, Shop, ShopId, ShopUpdate, TargetSet,
};
pub use forecast::{project_month_end, MonthProgress};
pub use import::{DailyRecordImporter, RecordImportError};
pub use memory::InMemoryPerformanceStore;
pub use repository::{PerformanceRepository, RepositoryError};
pub use router::performance_router;
pub use service::{PerformanceService, PerformanceServiceError, RecordOutcome};

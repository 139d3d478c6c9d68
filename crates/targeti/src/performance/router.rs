use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use serde_json::json;

use super::domain::{
    parse_record_date, DailyRecord, MetricTotals, NewShop, RepresentativeEntry, ShopId, ShopUpdate, TargetSet,
};
use super::forecast::MonthProgress;
use super::repository::{PerformanceRepository, RepositoryError};
use super::service::{PerformanceService, PerformanceServiceError, RecordOutcome};

/// Optional evaluation date; defaults to the local calendar date.
#[derive(Debug, Default, Deserialize)]
pub struct EvaluationQuery {
    #[serde(default)]
    pub today: Option<NaiveDate>,
}

impl EvaluationQuery {
    fn resolve(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }
}

/// Body for saving one day of activity; the date comes from the path.
#[derive(Debug, Deserialize)]
pub struct RecordDayRequest {
    #[serde(default)]
    pub reps: Vec<RepresentativeEntry>,
}

/// Body for scoring arbitrary totals. Omitted targets fall back to the catalog defaults.
#[derive(Debug, Deserialize)]
pub struct AchievementRequest {
    pub totals: MetricTotals,
    #[serde(default)]
    pub targets: TargetSet,
    #[serde(default)]
    pub month: Option<MonthProgress>,
}

/// Router builder exposing the dashboard, shop management, and scoring endpoints.
pub fn performance_router<R>(service: Arc<PerformanceService<R>>) -> Router
where
    R: PerformanceRepository + 'static,
{
    Router::new()
        .route("/api/v1/dashboard", get(dashboard_handler::<R>))
        .route(
            "/api/v1/shops",
            get(list_shops_handler::<R>).post(create_shop_handler::<R>),
        )
        .route(
            "/api/v1/shops/:shop_id",
            get(shop_detail_handler::<R>)
                .put(update_shop_handler::<R>)
                .delete(delete_shop_handler::<R>),
        )
        .route(
            "/api/v1/shops/:shop_id/targets",
            put(save_targets_handler::<R>),
        )
        .route(
            "/api/v1/shops/:shop_id/records",
            get(daily_records_handler::<R>),
        )
        .route(
            "/api/v1/shops/:shop_id/records/:date",
            put(record_day_handler::<R>),
        )
        .route("/api/v1/achievement", post(achievement_handler::<R>))
        .with_state(service)
}

pub(crate) async fn dashboard_handler<R>(
    State(service): State<Arc<PerformanceService<R>>>,
    Query(query): Query<EvaluationQuery>,
) -> Response
where
    R: PerformanceRepository + 'static,
{
    match service.dashboard(query.resolve()) {
        Ok(overview) => (StatusCode::OK, Json(overview)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn list_shops_handler<R>(
    State(service): State<Arc<PerformanceService<R>>>,
) -> Response
where
    R: PerformanceRepository + 'static,
{
    match service.shops() {
        Ok(shops) => (StatusCode::OK, Json(shops)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn create_shop_handler<R>(
    State(service): State<Arc<PerformanceService<R>>>,
    Json(new_shop): Json<NewShop>,
) -> Response
where
    R: PerformanceRepository + 'static,
{
    match service.add_shop(new_shop) {
        Ok(shop) => (StatusCode::CREATED, Json(shop)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn shop_detail_handler<R>(
    State(service): State<Arc<PerformanceService<R>>>,
    Path(shop_id): Path<String>,
    Query(query): Query<EvaluationQuery>,
) -> Response
where
    R: PerformanceRepository + 'static,
{
    match service.shop_detail(&ShopId(shop_id), query.resolve()) {
        Ok(detail) => (StatusCode::OK, Json(detail)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn update_shop_handler<R>(
    State(service): State<Arc<PerformanceService<R>>>,
    Path(shop_id): Path<String>,
    Json(update): Json<ShopUpdate>,
) -> Response
where
    R: PerformanceRepository + 'static,
{
    match service.update_shop(&ShopId(shop_id), update) {
        Ok(shop) => (StatusCode::OK, Json(shop)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn delete_shop_handler<R>(
    State(service): State<Arc<PerformanceService<R>>>,
    Path(shop_id): Path<String>,
) -> Response
where
    R: PerformanceRepository + 'static,
{
    match service.delete_shop(&ShopId(shop_id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn save_targets_handler<R>(
    State(service): State<Arc<PerformanceService<R>>>,
    Path(shop_id): Path<String>,
    Json(targets): Json<TargetSet>,
) -> Response
where
    R: PerformanceRepository + 'static,
{
    match service.save_targets(&ShopId(shop_id), targets) {
        Ok(shop) => (StatusCode::OK, Json(shop)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn daily_records_handler<R>(
    State(service): State<Arc<PerformanceService<R>>>,
    Path(shop_id): Path<String>,
) -> Response
where
    R: PerformanceRepository + 'static,
{
    match service.daily_records(&ShopId(shop_id)) {
        Ok(records) => (StatusCode::OK, Json(records)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn record_day_handler<R>(
    State(service): State<Arc<PerformanceService<R>>>,
    Path((shop_id, date)): Path<(String, String)>,
    Json(request): Json<RecordDayRequest>,
) -> Response
where
    R: PerformanceRepository + 'static,
{
    let Ok(date) = parse_record_date(&date) else {
        let payload = json!({
            "error": format!("'{date}' is not a YYYY-MM-DD date"),
        });
        return (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response();
    };

    let shop_id = ShopId(shop_id);
    match service.record_day(&shop_id, DailyRecord::new(date, request.reps)) {
        Ok(outcome) => {
            let status = match outcome {
                RecordOutcome::Created => StatusCode::CREATED,
                RecordOutcome::Replaced => StatusCode::OK,
            };
            let payload = json!({
                "shop_id": shop_id,
                "date": date,
                "outcome": outcome,
            });
            (status, Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn achievement_handler<R>(
    State(service): State<Arc<PerformanceService<R>>>,
    Json(request): Json<AchievementRequest>,
) -> Response
where
    R: PerformanceRepository + 'static,
{
    if let Some(month) = request.month {
        if month.days_in_month == 0 || month.day_of_month > month.days_in_month {
            let payload = json!({
                "error": "month.day_of_month must lie within month.days_in_month",
            });
            return (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response();
        }
    }

    let quote = service.quote(&request.totals, &request.targets, request.month);
    (StatusCode::OK, Json(quote)).into_response()
}

fn error_response(error: PerformanceServiceError) -> Response {
    let status = match &error {
        PerformanceServiceError::ShopNotFound(_)
        | PerformanceServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        PerformanceServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        other if other.is_validation() => StatusCode::UNPROCESSABLE_ENTITY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let payload = json!({
        "error": error.to_string(),
    });
    (status, Json(payload)).into_response()
}

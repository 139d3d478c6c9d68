use super::super::achievement::AchievementScore;
use super::super::aggregation::DailyTotals;
use super::super::catalog::Metric;
use super::super::domain::{MetricTotals, RepresentativeId, ShopId};
use super::super::forecast::MonthProgress;
use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct ShopRankingEntry {
    pub shop_id: ShopId,
    pub shop_name: String,
    pub achievement: AchievementScore,
    pub forecast_achievement: AchievementScore,
}

#[derive(Debug, Clone, Serialize)]
pub struct RepresentativeRankingEntry {
    pub representative_id: RepresentativeId,
    pub representative_name: String,
    pub shop_id: ShopId,
    pub shop_name: String,
    pub achievement: AchievementScore,
    pub forecast_achievement: AchievementScore,
}

#[derive(Debug, Clone, Serialize)]
pub struct NetworkOverview {
    pub evaluated_on: NaiveDate,
    pub month: MonthProgress,
    pub average_achievement: AchievementScore,
    pub average_forecast_achievement: AchievementScore,
    pub network_totals: MetricTotals,
    pub shops: Vec<ShopRankingEntry>,
    pub representatives: Vec<RepresentativeRankingEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricBreakdownEntry {
    pub metric: Metric,
    pub metric_label: &'static str,
    pub weight: f64,
    pub total: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<f64>,
    pub achievement_pct: f64,
    pub projected_total: f64,
    pub projected_pct: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceStanding {
    OnTrack,
    Monitor,
    AtRisk,
}

impl PerformanceStanding {
    pub const fn label(self) -> &'static str {
        match self {
            Self::OnTrack => "On Track",
            Self::Monitor => "Monitor",
            Self::AtRisk => "At Risk",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PerformanceInsights {
    pub standing: PerformanceStanding,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub lagging_metrics: Vec<&'static str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub observations: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
    pub status_message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShopDetail {
    pub shop_id: ShopId,
    pub shop_name: String,
    pub evaluated_on: NaiveDate,
    pub month: MonthProgress,
    pub achievement: AchievementScore,
    pub forecast_achievement: AchievementScore,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_day: Option<NaiveDate>,
    pub latest_day_contribution: f64,
    pub metrics: Vec<MetricBreakdownEntry>,
    pub daily_trend: Vec<DailyTotals>,
    pub representatives: Vec<RepresentativeRankingEntry>,
    pub insights: PerformanceInsights,
}

/// Score of caller-supplied totals, with an optional month-end forecast.
#[derive(Debug, Clone, Serialize)]
pub struct AchievementQuote {
    pub achievement: AchievementScore,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month: Option<MonthProgress>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projected_totals: Option<MetricTotals>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forecast_achievement: Option<AchievementScore>,
}

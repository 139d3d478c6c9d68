use super::super::achievement::{capped_metric_pct, AchievementCalculator, AchievementScore};
use super::super::aggregation::{
    aggregate, daily_series, representative_targets, representative_totals, AggregationScope,
};
use super::super::domain::{DailyRecord, MetricTotals, RepresentativeId, Shop, TargetSet};
use super::super::forecast::{same_month, MonthProgress};
use super::insights::InsightContext;
use super::views::{
    MetricBreakdownEntry, NetworkOverview, RepresentativeRankingEntry, ShopDetail,
    ShopRankingEntry,
};
use chrono::NaiveDate;
use std::cmp::Ordering;

/// One shop and every daily record stored for it.
#[derive(Debug, Clone, Copy)]
pub struct ShopSnapshot<'a> {
    pub shop: &'a Shop,
    pub records: &'a [DailyRecord],
}

impl<'a> ShopSnapshot<'a> {
    pub fn new(shop: &'a Shop, records: &'a [DailyRecord]) -> Self {
        Self { shop, records }
    }
}

/// Current and projected scoring of one set of totals against one target set.
#[derive(Debug, Clone)]
pub(crate) struct Scorecard {
    pub(crate) current: MetricTotals,
    pub(crate) projected: MetricTotals,
    pub(crate) achievement: AchievementScore,
    pub(crate) forecast_achievement: AchievementScore,
}

/// Month-to-date report builder for a fixed evaluation date.
///
/// Only records dated within the evaluation month, up to and including the evaluation
/// date, are aggregated.
#[derive(Debug, Clone, Copy)]
pub struct PerformanceReport<'c> {
    calculator: &'c AchievementCalculator,
    evaluated_on: NaiveDate,
    progress: MonthProgress,
}

impl<'c> PerformanceReport<'c> {
    pub fn new(calculator: &'c AchievementCalculator, evaluated_on: NaiveDate) -> Self {
        Self {
            calculator,
            evaluated_on,
            progress: MonthProgress::from_date(evaluated_on),
        }
    }

    pub fn network(&self, snapshots: &[ShopSnapshot<'_>]) -> NetworkOverview {
        let mut shops: Vec<ShopRankingEntry> = snapshots
            .iter()
            .map(|snapshot| {
                let totals = aggregate(self.month_records(snapshot), AggregationScope::Shop);
                let card = self.scorecard(totals, &snapshot.shop.monthly_targets);
                ShopRankingEntry {
                    shop_id: snapshot.shop.id.clone(),
                    shop_name: snapshot.shop.name.clone(),
                    achievement: card.achievement,
                    forecast_achievement: card.forecast_achievement,
                }
            })
            .collect();
        shops.sort_by(|a, b| {
            rank_order(a.achievement, b.achievement).then_with(|| a.shop_name.cmp(&b.shop_name))
        });

        let mut representatives: Vec<RepresentativeRankingEntry> = snapshots
            .iter()
            .flat_map(|snapshot| self.representative_rankings(snapshot))
            .collect();
        sort_representatives(&mut representatives);

        let network_totals = aggregate(
            snapshots
                .iter()
                .flat_map(|snapshot| self.month_records(snapshot)),
            AggregationScope::Network,
        );

        NetworkOverview {
            evaluated_on: self.evaluated_on,
            month: self.progress,
            average_achievement: AchievementScore::mean(shops.iter().map(|s| s.achievement)),
            average_forecast_achievement: AchievementScore::mean(
                shops.iter().map(|s| s.forecast_achievement),
            ),
            network_totals,
            shops,
            representatives,
        }
    }

    pub fn shop(&self, snapshot: &ShopSnapshot<'_>) -> ShopDetail {
        let targets = &snapshot.shop.monthly_targets;
        let records: Vec<&DailyRecord> = self.month_records(snapshot).collect();
        let totals = aggregate(records.iter().copied(), AggregationScope::Shop);
        let card = self.scorecard(totals, targets);

        let latest = records.iter().copied().max_by_key(|record| record.date);
        let latest_day_contribution = latest.map_or(0.0, |record| {
            let day_totals = aggregate(std::iter::once(record), AggregationScope::Shop);
            self.calculator.contribution(&day_totals, targets)
        });

        let metrics = self.metric_breakdown(&card, targets);
        let mut representatives = self.representative_rankings(snapshot);
        sort_representatives(&mut representatives);

        let insights = super::generate_insights(&InsightContext {
            shop_name: &snapshot.shop.name,
            progress: self.progress,
            forecast_achievement: card.forecast_achievement,
            metrics: &metrics,
            representatives: &representatives,
            latest,
        });

        ShopDetail {
            shop_id: snapshot.shop.id.clone(),
            shop_name: snapshot.shop.name.clone(),
            evaluated_on: self.evaluated_on,
            month: self.progress,
            achievement: card.achievement,
            forecast_achievement: card.forecast_achievement,
            latest_day: latest.map(|record| record.date),
            latest_day_contribution,
            metrics,
            daily_trend: daily_series(records.iter().copied()),
            representatives,
            insights,
        }
    }

    pub(crate) fn scorecard(&self, current: MetricTotals, targets: &TargetSet) -> Scorecard {
        let projected = self.progress.project(&current);
        Scorecard {
            achievement: self.calculator.score(&current, targets),
            forecast_achievement: self.calculator.score(&projected, targets),
            current,
            projected,
        }
    }

    fn month_records<'s>(
        &self,
        snapshot: &ShopSnapshot<'s>,
    ) -> impl Iterator<Item = &'s DailyRecord> + 's {
        let evaluated_on = self.evaluated_on;
        snapshot
            .records
            .iter()
            .filter(move |record| {
                same_month(record.date, evaluated_on) && record.date <= evaluated_on
            })
    }

    fn metric_breakdown(&self, card: &Scorecard, targets: &TargetSet) -> Vec<MetricBreakdownEntry> {
        let weights = self.calculator.weights();
        weights
            .by_importance()
            .into_iter()
            .map(|metric| {
                let target = targets.get(metric);
                let total = card.current.get(metric);
                let projected_total = card.projected.get(metric);
                MetricBreakdownEntry {
                    metric,
                    metric_label: metric.label(),
                    weight: weights.weight(metric),
                    total,
                    target,
                    achievement_pct: capped_metric_pct(total, target),
                    projected_total,
                    projected_pct: capped_metric_pct(projected_total, target),
                }
            })
            .collect()
    }

    fn representative_rankings(
        &self,
        snapshot: &ShopSnapshot<'_>,
    ) -> Vec<RepresentativeRankingEntry> {
        let shop = snapshot.shop;
        let Some(rep_targets) =
            representative_targets(&shop.monthly_targets, shop.sales_representatives.len())
        else {
            return Vec::new();
        };

        let ids: Vec<RepresentativeId> = shop
            .sales_representatives
            .iter()
            .map(|rep| rep.id.clone())
            .collect();
        let mut totals = representative_totals(self.month_records(snapshot), &ids);

        shop.sales_representatives
            .iter()
            .map(|rep| {
                let current = totals.remove(&rep.id).unwrap_or_default();
                let card = self.scorecard(current, &rep_targets);
                RepresentativeRankingEntry {
                    representative_id: rep.id.clone(),
                    representative_name: rep.name.clone(),
                    shop_id: shop.id.clone(),
                    shop_name: shop.name.clone(),
                    achievement: card.achievement,
                    forecast_achievement: card.forecast_achievement,
                }
            })
            .collect()
    }
}

fn rank_order(a: AchievementScore, b: AchievementScore) -> Ordering {
    b.value().total_cmp(&a.value())
}

fn sort_representatives(entries: &mut [RepresentativeRankingEntry]) {
    entries.sort_by(|a, b| {
        rank_order(a.achievement, b.achievement)
            .then_with(|| a.representative_name.cmp(&b.representative_name))
    });
}

use super::super::achievement::AchievementScore;
use super::super::catalog::{Metric, MetricWeights};
use super::super::domain::DailyRecord;
use super::super::forecast::MonthProgress;
use super::views::{
    MetricBreakdownEntry, PerformanceInsights, PerformanceStanding, RepresentativeRankingEntry,
};

/// Longest status message drafted for chat broadcast, in characters.
pub const STATUS_MESSAGE_LIMIT: usize = 200;

const ON_TRACK_PCT: f64 = 100.0;
const MONITOR_PCT: f64 = 80.0;

pub(crate) struct InsightContext<'a> {
    pub(crate) shop_name: &'a str,
    pub(crate) progress: MonthProgress,
    pub(crate) forecast_achievement: AchievementScore,
    /// Heaviest metric first.
    pub(crate) metrics: &'a [MetricBreakdownEntry],
    pub(crate) representatives: &'a [RepresentativeRankingEntry],
    pub(crate) latest: Option<&'a DailyRecord>,
}

pub(crate) fn standing_for(forecast: AchievementScore) -> PerformanceStanding {
    if forecast.value() >= ON_TRACK_PCT {
        PerformanceStanding::OnTrack
    } else if forecast.value() >= MONITOR_PCT {
        PerformanceStanding::Monitor
    } else {
        PerformanceStanding::AtRisk
    }
}

pub(crate) fn generate_insights(context: &InsightContext<'_>) -> PerformanceInsights {
    let standing = standing_for(context.forecast_achievement);
    let progress = context.progress;

    let lagging: Vec<&MetricBreakdownEntry> = context
        .metrics
        .iter()
        .filter(|entry| entry.weight > 0.0)
        .filter(|entry| matches!(entry.target, Some(target) if target > 0.0))
        .filter(|entry| entry.projected_pct < ON_TRACK_PCT)
        .collect();

    let mut observations = Vec::new();
    if context.latest.is_none() {
        observations.push("No activity recorded yet this month".to_string());
    }
    observations.push(format!(
        "Day {} of {}: on pace for {} by month end",
        progress.day_of_month, progress.days_in_month, context.forecast_achievement
    ));
    if !lagging.is_empty() {
        observations.push(format!(
            "{} weighted metric(s) projected below target",
            lagging.len()
        ));
    }
    if let Some(leader) = context.representatives.first() {
        observations.push(format!(
            "{} leads the team at {} (EOM {})",
            leader.representative_name, leader.achievement, leader.forecast_achievement
        ));
    }

    let remaining_days = progress.days_in_month.saturating_sub(progress.day_of_month);
    let mut suggestions: Vec<String> = lagging
        .iter()
        .take(3)
        .filter_map(|entry| {
            let gap = entry.target? - entry.total;
            if gap <= 0.0 {
                return None;
            }
            Some(if remaining_days > 0 {
                format!(
                    "Lift {} to about {:.1} per day to close a gap of {:.0}",
                    entry.metric_label,
                    gap / f64::from(remaining_days),
                    gap.ceil()
                )
            } else {
                format!("{} closed {:.0} short of target", entry.metric_label, gap.ceil())
            })
        })
        .collect();

    suggestions.extend(
        context
            .representatives
            .iter()
            .rev()
            .filter(|rep| standing_for(rep.forecast_achievement) == PerformanceStanding::AtRisk)
            .take(2)
            .map(|rep| {
                format!(
                    "Check in with {} (EOM {})",
                    rep.representative_name, rep.forecast_achievement
                )
            }),
    );

    if suggestions.is_empty() {
        suggestions.push("Keep the current pace; every weighted metric is on target".to_string());
    }

    PerformanceInsights {
        standing,
        lagging_metrics: lagging.iter().map(|entry| entry.metric_label).collect(),
        observations,
        suggestions,
        status_message: draft_status_message(context, standing),
    }
}

/// Short broadcast summary of the latest day: heaviest metrics first, then an upbeat close.
pub(crate) fn draft_status_message(
    context: &InsightContext<'_>,
    standing: PerformanceStanding,
) -> String {
    let shop_name: String = context.shop_name.chars().take(40).collect();
    let closing = match standing {
        PerformanceStanding::OnTrack => "Great pace, keep it up!",
        PerformanceStanding::Monitor => "Close to target, push on!",
        PerformanceStanding::AtRisk => "Let's rally and close the gap!",
    };
    let forecast = format!(" | EOM {}. {closing}", context.forecast_achievement);

    let Some(latest) = context.latest else {
        return format!("{shop_name}: no sales logged yet{forecast}");
    };

    let mut message = format!("{shop_name} {}:", latest.date.format("%d/%m"));
    let order = if context.metrics.is_empty() {
        MetricWeights::default().by_importance()
    } else {
        context.metrics.iter().map(|entry| entry.metric).collect()
    };

    let mut first = true;
    for metric in order {
        let count: u32 = latest
            .entries
            .iter()
            .map(|entry| entry.count(metric))
            .sum();
        let part = format!(
            "{}{} {}",
            if first { " " } else { ", " },
            short_label(metric),
            count
        );
        if message.chars().count() + part.chars().count() + forecast.chars().count()
            > STATUS_MESSAGE_LIMIT
        {
            break;
        }
        message.push_str(&part);
        first = false;
    }

    message.push_str(&forecast);
    message
}

fn short_label(metric: Metric) -> &'static str {
    match metric {
        Metric::NewSim => "SIM",
        Metric::NewLine => "Lines",
        Metric::Migrations => "Migr",
        Metric::FixContractRenewal => "Fix renew",
        Metric::MobileContractRenewal => "Mob renew",
        Metric::NewTv => "TV",
        Metric::NewPostpaid => "Postpaid",
        Metric::Device => "Devices",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::performance::domain::{RepresentativeEntry, RepresentativeId};
    use chrono::NaiveDate;

    fn metric_entry(metric: Metric, weight: f64, total: f64, projected: f64) -> MetricBreakdownEntry {
        let target = 100.0;
        MetricBreakdownEntry {
            metric,
            metric_label: metric.label(),
            weight,
            total,
            target: Some(target),
            achievement_pct: (total / target * 100.0).min(120.0),
            projected_total: projected,
            projected_pct: (projected / target * 100.0).min(120.0),
        }
    }

    fn latest_record() -> DailyRecord {
        DailyRecord::new(
            NaiveDate::from_ymd_opt(2025, 4, 10).expect("valid date"),
            vec![
                RepresentativeEntry::new(RepresentativeId("a".to_string()))
                    .with_count(Metric::NewSim, 3)
                    .with_count(Metric::Device, 1),
                RepresentativeEntry::new(RepresentativeId("b".to_string()))
                    .with_count(Metric::NewSim, 2),
            ],
        )
    }

    #[test]
    fn standing_thresholds() {
        assert_eq!(
            standing_for(AchievementScore::new(100.0)),
            PerformanceStanding::OnTrack
        );
        assert_eq!(
            standing_for(AchievementScore::new(85.0)),
            PerformanceStanding::Monitor
        );
        assert_eq!(
            standing_for(AchievementScore::new(79.9)),
            PerformanceStanding::AtRisk
        );
    }

    #[test]
    fn lagging_metrics_drive_suggestions() {
        let metrics = [
            metric_entry(Metric::NewSim, 0.6, 20.0, 60.0),
            metric_entry(Metric::NewLine, 0.4, 50.0, 150.0),
        ];
        let record = latest_record();
        let context = InsightContext {
            shop_name: "Main Street",
            progress: MonthProgress::new(10, 30),
            forecast_achievement: AchievementScore::ZERO,
            metrics: &metrics,
            representatives: &[],
            latest: Some(&record),
        };

        let insights = generate_insights(&context);
        assert_eq!(insights.lagging_metrics, vec!["New SIM"]);
        assert!(insights.suggestions[0].contains("New SIM"));
        assert!(insights.suggestions[0].contains("4.0 per day"));
    }

    #[test]
    fn status_message_leads_with_heaviest_metrics_and_fits_limit() {
        let metrics: Vec<MetricBreakdownEntry> = MetricWeights::default()
            .by_importance()
            .into_iter()
            .map(|metric| metric_entry(metric, metric.default_weight(), 10.0, 30.0))
            .collect();
        let record = latest_record();
        let long_name = "A".repeat(120);
        let context = InsightContext {
            shop_name: &long_name,
            progress: MonthProgress::new(10, 30),
            forecast_achievement: AchievementScore::ZERO,
            metrics: &metrics,
            representatives: &[],
            latest: Some(&record),
        };

        let message = draft_status_message(&context, PerformanceStanding::Monitor);
        assert!(message.chars().count() <= STATUS_MESSAGE_LIMIT, "{message}");
        assert!(message.contains("SIM 5"));
        assert!(message.ends_with("push on!"));
    }

    #[test]
    fn status_message_without_activity() {
        let context = InsightContext {
            shop_name: "Main Street",
            progress: MonthProgress::new(1, 30),
            forecast_achievement: AchievementScore::ZERO,
            metrics: &[],
            representatives: &[],
            latest: None,
        };
        let message = draft_status_message(&context, PerformanceStanding::AtRisk);
        assert_eq!(
            message,
            "Main Street: no sales logged yet | EOM 0.0%. Let's rally and close the gap!"
        );
    }

    #[test]
    fn empty_insight_lists_are_left_out_of_json() {
        let insights = PerformanceInsights {
            standing: PerformanceStanding::OnTrack,
            lagging_metrics: Vec::new(),
            observations: vec!["SIM ahead of pace".to_string()],
            suggestions: Vec::new(),
            status_message: "Main Street: great day".to_string(),
        };

        let json = serde_json::to_value(&insights).expect("serializes");
        assert_eq!(json["standing"], serde_json::json!("on_track"));
        assert_eq!(json["observations"][0], serde_json::json!("SIM ahead of pace"));
        assert!(json.get("lagging_metrics").is_none());
        assert!(json.get("suggestions").is_none());
    }
}

use serde::{Deserialize, Serialize};
use std::fmt;

use super::catalog::{Metric, MetricWeights};
use super::domain::{MetricTotals, TargetSet};

/// Ceiling applied per metric and to the weighted total, in percent.
pub const ACHIEVEMENT_CAP_PCT: f64 = 120.0;

/// Weighted attainment across all metrics, in percent.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AchievementScore(f64);

impl AchievementScore {
    pub const ZERO: Self = Self(0.0);

    pub fn new(value: f64) -> Self {
        Self(value)
    }

    pub fn value(self) -> f64 {
        self.0
    }

    /// Mean of a set of scores; zero for an empty set.
    pub fn mean(scores: impl IntoIterator<Item = Self>) -> Self {
        let (sum, count) = scores
            .into_iter()
            .fold((0.0, 0usize), |(sum, count), score| (sum + score.0, count + 1));
        if count == 0 {
            Self::ZERO
        } else {
            Self(sum / count as f64)
        }
    }
}

impl fmt::Display for AchievementScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}%", self.0)
    }
}

/// Uncapped attainment of a single metric. Zero when the target is missing or not positive.
pub fn raw_metric_pct(value: f64, target: Option<f64>) -> f64 {
    match target {
        Some(target) if target > 0.0 => value / target * 100.0,
        _ => 0.0,
    }
}

/// Attainment of a single metric, capped at [`ACHIEVEMENT_CAP_PCT`].
pub fn capped_metric_pct(value: f64, target: Option<f64>) -> f64 {
    raw_metric_pct(value, target).min(ACHIEVEMENT_CAP_PCT)
}

/// Stateless scorer applying one weight set to totals and targets.
#[derive(Debug, Clone, Default)]
pub struct AchievementCalculator {
    weights: MetricWeights,
}

impl AchievementCalculator {
    pub fn new(weights: MetricWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &MetricWeights {
        &self.weights
    }

    /// Scores totals against targets. Used unchanged for actual and projected totals.
    pub fn score(&self, totals: &MetricTotals, targets: &TargetSet) -> AchievementScore {
        let weighted: f64 = Metric::ordered()
            .into_iter()
            .map(|metric| {
                capped_metric_pct(totals.get(metric), targets.get(metric))
                    * self.weights.weight(metric)
            })
            .sum();

        AchievementScore(weighted.min(ACHIEVEMENT_CAP_PCT))
    }

    /// Weighted, uncapped contribution of a partial total (e.g. a single day) toward the
    /// monthly targets.
    pub fn contribution(&self, totals: &MetricTotals, targets: &TargetSet) -> f64 {
        Metric::ordered()
            .into_iter()
            .map(|metric| {
                raw_metric_pct(totals.get(metric), targets.get(metric)) * self.weights.weight(metric)
            })
            .sum()
    }
}

/// Scores totals against targets with the catalog weights.
pub fn compute_achievement(totals: &MetricTotals, targets: &TargetSet) -> AchievementScore {
    AchievementCalculator::default().score(totals, targets)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_metric_weights() -> MetricWeights {
        MetricWeights::new([(Metric::NewSim, 0.6), (Metric::NewLine, 0.4)])
    }

    #[test]
    fn zero_or_missing_target_contributes_nothing() {
        assert_eq!(raw_metric_pct(50.0, Some(0.0)), 0.0);
        assert_eq!(raw_metric_pct(50.0, None), 0.0);
        assert_eq!(raw_metric_pct(50.0, Some(-10.0)), 0.0);
        assert_eq!(raw_metric_pct(25.0, Some(50.0)), 50.0);
    }

    #[test]
    fn per_metric_cap_applies_before_weighting() {
        let calculator = AchievementCalculator::new(two_metric_weights());
        let targets = TargetSet::new([(Metric::NewSim, 100.0), (Metric::NewLine, 100.0)]);
        let totals = MetricTotals::new([(Metric::NewSim, 50.0), (Metric::NewLine, 200.0)]);

        let score = calculator.score(&totals, &targets);
        assert!((score.value() - 78.0).abs() < 1e-9, "got {score}");
    }

    #[test]
    fn total_cap_bounds_oversized_weights() {
        let calculator = AchievementCalculator::new(MetricWeights::new(
            Metric::ordered().into_iter().map(|metric| (metric, 1.0)),
        ));
        let totals = MetricTotals::new(Metric::ordered().into_iter().map(|m| (m, 500.0)));

        let score = calculator.score(&totals, &TargetSet::default());
        assert_eq!(score.value(), ACHIEVEMENT_CAP_PCT);
    }

    #[test]
    fn contribution_is_not_capped() {
        let calculator = AchievementCalculator::new(two_metric_weights());
        let targets = TargetSet::new([(Metric::NewSim, 10.0)]);
        let day = MetricTotals::new([(Metric::NewSim, 30.0)]);

        assert!((calculator.contribution(&day, &targets) - 180.0).abs() < 1e-9);
    }

    #[test]
    fn mean_of_no_scores_is_zero() {
        assert_eq!(AchievementScore::mean(Vec::new()), AchievementScore::ZERO);
        let mean = AchievementScore::mean([AchievementScore(40.0), AchievementScore(80.0)]);
        assert!((mean.value() - 60.0).abs() < 1e-9);
    }
}

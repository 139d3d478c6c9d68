use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Tracked sales activity categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Metric {
    NewSim,
    NewLine,
    Migrations,
    FixContractRenewal,
    MobileContractRenewal,
    NewTv,
    NewPostpaid,
    Device,
}

impl Metric {
    pub const COUNT: usize = 8;

    /// Display order.
    pub const fn ordered() -> [Self; Self::COUNT] {
        [
            Self::NewSim,
            Self::NewLine,
            Self::Migrations,
            Self::FixContractRenewal,
            Self::MobileContractRenewal,
            Self::NewTv,
            Self::NewPostpaid,
            Self::Device,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::NewSim => "New SIM",
            Self::NewLine => "New Line",
            Self::Migrations => "Migrations",
            Self::FixContractRenewal => "Fix Contract Renewal",
            Self::MobileContractRenewal => "Mobile Contract Renewal",
            Self::NewTv => "New TV",
            Self::NewPostpaid => "New Postpaid",
            Self::Device => "Device",
        }
    }

    /// Wire key, shared by JSON payloads and CSV headers.
    pub const fn key(self) -> &'static str {
        match self {
            Self::NewSim => "newSim",
            Self::NewLine => "newLine",
            Self::Migrations => "migrations",
            Self::FixContractRenewal => "fixContractRenewal",
            Self::MobileContractRenewal => "mobileContractRenewal",
            Self::NewTv => "newTv",
            Self::NewPostpaid => "newPostpaid",
            Self::Device => "device",
        }
    }

    pub const fn default_weight(self) -> f64 {
        match self {
            Self::NewSim => 0.3,
            Self::NewLine => 0.25,
            Self::Migrations => 0.2,
            Self::FixContractRenewal
            | Self::MobileContractRenewal
            | Self::NewTv
            | Self::NewPostpaid
            | Self::Device => 0.05,
        }
    }

    pub const fn default_target(self) -> f64 {
        match self {
            Self::NewSim => 100.0,
            Self::NewLine => 120.0,
            Self::Migrations => 50.0,
            Self::FixContractRenewal => 80.0,
            Self::MobileContractRenewal => 90.0,
            Self::NewTv => 40.0,
            Self::NewPostpaid => 70.0,
            Self::Device => 60.0,
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Relative importance of each metric in the achievement score.
///
/// Weights are not required to sum to one; the calculator caps the final score
/// regardless of the weight total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetricWeights(BTreeMap<Metric, f64>);

impl MetricWeights {
    pub fn new(weights: impl IntoIterator<Item = (Metric, f64)>) -> Self {
        Self(weights.into_iter().collect())
    }

    /// Weight for a metric; metrics without an entry carry no weight.
    pub fn weight(&self, metric: Metric) -> f64 {
        self.0.get(&metric).copied().unwrap_or(0.0)
    }

    pub fn total(&self) -> f64 {
        self.0.values().sum()
    }

    /// Metrics ordered by weight, heaviest first. Ties keep display order.
    pub fn by_importance(&self) -> Vec<Metric> {
        let mut metrics = Metric::ordered().to_vec();
        metrics.sort_by(|a, b| self.weight(*b).total_cmp(&self.weight(*a)));
        metrics
    }
}

impl Default for MetricWeights {
    fn default() -> Self {
        Self::new(
            Metric::ordered()
                .into_iter()
                .map(|metric| (metric, metric.default_weight())),
        )
    }
}

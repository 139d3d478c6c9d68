use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::catalog::Metric;

/// Parse a `YYYY-MM-DD` calendar date as used in paths, CLI flags and CSV cells.
pub fn parse_record_date(raw: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
}

/// Identifier wrapper for shops (the tenant grouping).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ShopId(pub String);

impl fmt::Display for ShopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier wrapper for sales representatives.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RepresentativeId(pub String);

impl fmt::Display for RepresentativeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesRepresentative {
    pub id: RepresentativeId,
    pub name: String,
}

/// A retail location with its team and monthly goals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shop {
    pub id: ShopId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub sales_representatives: Vec<SalesRepresentative>,
    #[serde(default)]
    pub monthly_targets: TargetSet,
}

impl Shop {
    pub fn representative(&self, id: &RepresentativeId) -> Option<&SalesRepresentative> {
        self.sales_representatives.iter().find(|rep| &rep.id == id)
    }
}

/// Payload for creating a shop. Targets start from the catalog defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewShop {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Editable shop attributes; targets are changed through their own operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopUpdate {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub sales_representatives: Vec<SalesRepresentative>,
}

/// Per-metric sums derived from daily records. Absent metrics read as zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetricTotals(BTreeMap<Metric, f64>);

impl MetricTotals {
    pub fn new(values: impl IntoIterator<Item = (Metric, f64)>) -> Self {
        Self(values.into_iter().collect())
    }

    pub fn get(&self, metric: Metric) -> f64 {
        self.0.get(&metric).copied().unwrap_or(0.0)
    }

    pub fn add(&mut self, metric: Metric, value: f64) {
        *self.0.entry(metric).or_insert(0.0) += value;
    }

    /// Every catalog metric in display order, zero-filled.
    pub fn iter(&self) -> impl Iterator<Item = (Metric, f64)> + '_ {
        Metric::ordered()
            .into_iter()
            .map(move |metric| (metric, self.get(metric)))
    }

    pub fn is_zero(&self) -> bool {
        self.0.values().all(|value| *value == 0.0)
    }
}

/// Monthly goals for one shop or one representative's share of it.
///
/// A missing or zero target means the metric contributes nothing to the score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetSet(BTreeMap<Metric, f64>);

impl TargetSet {
    pub fn new(targets: impl IntoIterator<Item = (Metric, f64)>) -> Self {
        Self(targets.into_iter().collect())
    }

    pub fn empty() -> Self {
        Self(BTreeMap::new())
    }

    pub fn get(&self, metric: Metric) -> Option<f64> {
        self.0.get(&metric).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Metric, f64)> + '_ {
        self.0.iter().map(|(metric, target)| (*metric, *target))
    }
}

impl Default for TargetSet {
    fn default() -> Self {
        Self::new(
            Metric::ordered()
                .into_iter()
                .map(|metric| (metric, metric.default_target())),
        )
    }
}

/// One representative's counts for a single day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepresentativeEntry {
    pub rep_id: RepresentativeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rep_name: Option<String>,
    #[serde(flatten)]
    pub counts: BTreeMap<Metric, u32>,
}

impl RepresentativeEntry {
    pub fn new(rep_id: RepresentativeId) -> Self {
        Self {
            rep_id,
            rep_name: None,
            counts: BTreeMap::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.rep_name = Some(name.into());
        self
    }

    pub fn with_count(mut self, metric: Metric, count: u32) -> Self {
        self.counts.insert(metric, count);
        self
    }

    pub fn count(&self, metric: Metric) -> u32 {
        self.counts.get(&metric).copied().unwrap_or(0)
    }
}

/// All entries captured for one shop on one calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyRecord {
    pub date: NaiveDate,
    #[serde(rename = "reps", default)]
    pub entries: Vec<RepresentativeEntry>,
}

impl DailyRecord {
    pub fn new(date: NaiveDate, entries: Vec<RepresentativeEntry>) -> Self {
        Self { date, entries }
    }

    /// First representative id that appears more than once, if any.
    pub fn duplicate_representative(&self) -> Option<&RepresentativeId> {
        self.entries.iter().enumerate().find_map(|(index, entry)| {
            self.entries[..index]
                .iter()
                .any(|earlier| earlier.rep_id == entry.rep_id)
                .then_some(&entry.rep_id)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn representative_entry_reads_flat_metric_keys() {
        let entry: RepresentativeEntry = serde_json::from_value(json!({
            "repId": "rep1",
            "repName": "Alice",
            "newSim": 4,
            "device": 2
        }))
        .expect("entry parses");

        assert_eq!(entry.rep_id, RepresentativeId("rep1".to_string()));
        assert_eq!(entry.rep_name.as_deref(), Some("Alice"));
        assert_eq!(entry.count(Metric::NewSim), 4);
        assert_eq!(entry.count(Metric::Device), 2);
        assert_eq!(entry.count(Metric::Migrations), 0);
    }

    #[test]
    fn daily_record_uses_reps_field_name() {
        let record: DailyRecord = serde_json::from_value(json!({
            "date": "2025-03-04",
            "reps": [{ "repId": "rep1", "newLine": 3 }]
        }))
        .expect("record parses");

        assert_eq!(
            record.date,
            NaiveDate::from_ymd_opt(2025, 3, 4).expect("valid date")
        );
        assert_eq!(record.entries.len(), 1);
        assert_eq!(record.entries[0].count(Metric::NewLine), 3);
    }

    #[test]
    fn record_dates_are_iso_calendar_days() {
        assert_eq!(
            parse_record_date(" 2025-03-04"),
            Ok(NaiveDate::from_ymd_opt(2025, 3, 4).expect("valid date"))
        );
        assert!(parse_record_date("04/03/2025").is_err());
        assert!(parse_record_date("2025-02-30").is_err());
    }

    #[test]
    fn duplicate_representative_is_detected() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 4).expect("valid date");
        let rep = RepresentativeId("rep1".to_string());
        let record = DailyRecord::new(
            date,
            vec![
                RepresentativeEntry::new(rep.clone()),
                RepresentativeEntry::new(RepresentativeId("rep2".to_string())),
                RepresentativeEntry::new(rep.clone()),
            ],
        );
        assert_eq!(record.duplicate_representative(), Some(&rep));

        let unique = DailyRecord::new(date, vec![RepresentativeEntry::new(rep)]);
        assert!(unique.duplicate_representative().is_none());
    }

    #[test]
    fn missing_totals_read_as_zero() {
        let mut totals = MetricTotals::default();
        assert_eq!(totals.get(Metric::NewTv), 0.0);
        totals.add(Metric::NewTv, 2.0);
        totals.add(Metric::NewTv, 3.0);
        assert_eq!(totals.get(Metric::NewTv), 5.0);
        assert_eq!(totals.iter().count(), Metric::COUNT);
    }
}

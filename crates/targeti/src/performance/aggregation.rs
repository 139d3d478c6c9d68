use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use super::catalog::Metric;
use super::domain::{DailyRecord, MetricTotals, RepresentativeEntry, RepresentativeId, TargetSet};

/// Granularity of a roll-up.
///
/// `Network` and `Shop` both sum every entry of the records they are given; they differ in
/// which records the caller supplies (all shops versus one shop).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregationScope<'a> {
    Network,
    Shop,
    Representative(&'a RepresentativeId),
}

impl AggregationScope<'_> {
    fn includes(&self, entry: &RepresentativeEntry) -> bool {
        match self {
            Self::Network | Self::Shop => true,
            Self::Representative(id) => &entry.rep_id == *id,
        }
    }
}

/// Sums per-metric counts across records and the entries the scope selects.
pub fn aggregate<'a, I>(records: I, scope: AggregationScope<'_>) -> MetricTotals
where
    I: IntoIterator<Item = &'a DailyRecord>,
{
    let mut totals = MetricTotals::default();
    for entry in records
        .into_iter()
        .flat_map(|record| record.entries.iter())
        .filter(|entry| scope.includes(entry))
    {
        add_entry(&mut totals, entry);
    }
    totals
}

/// Totals for each listed representative in one pass. Entries for unlisted ids are ignored.
pub fn representative_totals<'a, I>(
    records: I,
    representatives: &[RepresentativeId],
) -> BTreeMap<RepresentativeId, MetricTotals>
where
    I: IntoIterator<Item = &'a DailyRecord>,
{
    let mut totals: BTreeMap<RepresentativeId, MetricTotals> = representatives
        .iter()
        .map(|id| (id.clone(), MetricTotals::default()))
        .collect();

    for entry in records.into_iter().flat_map(|record| record.entries.iter()) {
        if let Some(rep_totals) = totals.get_mut(&entry.rep_id) {
            add_entry(rep_totals, entry);
        }
    }

    totals
}

/// Per-day shop totals, ascending by date. Records sharing a date are merged.
pub fn daily_series<'a, I>(records: I) -> Vec<DailyTotals>
where
    I: IntoIterator<Item = &'a DailyRecord>,
{
    let mut by_day: BTreeMap<NaiveDate, MetricTotals> = BTreeMap::new();
    for record in records {
        let day = by_day.entry(record.date).or_default();
        for entry in &record.entries {
            add_entry(day, entry);
        }
    }

    by_day
        .into_iter()
        .map(|(date, totals)| DailyTotals { date, totals })
        .collect()
}

/// Even share of a shop's targets for each of `rep_count` representatives.
///
/// Returns `None` for an empty team, since there is nobody to share the goal with.
pub fn representative_targets(shop_targets: &TargetSet, rep_count: usize) -> Option<TargetSet> {
    if rep_count == 0 {
        return None;
    }

    Some(TargetSet::new(
        shop_targets
            .iter()
            .map(|(metric, target)| (metric, target / rep_count as f64)),
    ))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyTotals {
    pub date: NaiveDate,
    pub totals: MetricTotals,
}

fn add_entry(totals: &mut MetricTotals, entry: &RepresentativeEntry) {
    for metric in Metric::ordered() {
        totals.add(metric, f64::from(entry.count(metric)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rep(id: &str) -> RepresentativeId {
        RepresentativeId(id.to_string())
    }

    fn day(d: u32, entries: Vec<RepresentativeEntry>) -> DailyRecord {
        DailyRecord::new(
            NaiveDate::from_ymd_opt(2025, 5, d).expect("valid date"),
            entries,
        )
    }

    #[test]
    fn representative_scope_filters_entries() {
        let records = vec![
            day(
                1,
                vec![
                    RepresentativeEntry::new(rep("a")).with_count(Metric::NewSim, 2),
                    RepresentativeEntry::new(rep("b")).with_count(Metric::NewSim, 9),
                ],
            ),
            day(
                2,
                vec![RepresentativeEntry::new(rep("a")).with_count(Metric::NewSim, 3)],
            ),
        ];

        let alice = rep("a");
        let rep_totals = aggregate(&records, AggregationScope::Representative(&alice));
        let shop_totals = aggregate(&records, AggregationScope::Shop);

        assert_eq!(rep_totals.get(Metric::NewSim), 5.0);
        assert_eq!(shop_totals.get(Metric::NewSim), 14.0);
    }

    #[test]
    fn representative_totals_ignore_unknown_ids() {
        let records = vec![day(
            1,
            vec![
                RepresentativeEntry::new(rep("a")).with_count(Metric::Device, 1),
                RepresentativeEntry::new(rep("ghost")).with_count(Metric::Device, 7),
            ],
        )];

        let totals = representative_totals(&records, &[rep("a"), rep("b")]);
        assert_eq!(totals.len(), 2);
        assert_eq!(totals[&rep("a")].get(Metric::Device), 1.0);
        assert!(totals[&rep("b")].is_zero());
    }

    #[test]
    fn daily_series_is_sorted_by_date() {
        let records = vec![
            day(
                3,
                vec![RepresentativeEntry::new(rep("a")).with_count(Metric::NewTv, 1)],
            ),
            day(
                1,
                vec![
                    RepresentativeEntry::new(rep("a")).with_count(Metric::NewTv, 2),
                    RepresentativeEntry::new(rep("b")).with_count(Metric::NewTv, 4),
                ],
            ),
        ];

        let series = daily_series(&records);
        assert_eq!(series.len(), 2);
        assert!(series[0].date < series[1].date);
        assert_eq!(series[0].totals.get(Metric::NewTv), 6.0);
        assert_eq!(series[1].totals.get(Metric::NewTv), 1.0);
    }

    #[test]
    fn representative_targets_split_evenly() {
        let shop = TargetSet::new([(Metric::NewSim, 100.0), (Metric::Device, 60.0)]);
        let share = representative_targets(&shop, 4).expect("team is not empty");

        assert_eq!(share.get(Metric::NewSim), Some(25.0));
        assert_eq!(share.get(Metric::Device), Some(15.0));
        assert!(representative_targets(&shop, 0).is_none());
    }
}

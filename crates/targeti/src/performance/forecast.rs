use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use super::domain::MetricTotals;

/// Position of an evaluation date inside its calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthProgress {
    pub day_of_month: u32,
    pub days_in_month: u32,
}

impl MonthProgress {
    pub fn new(day_of_month: u32, days_in_month: u32) -> Self {
        Self {
            day_of_month,
            days_in_month,
        }
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            day_of_month: date.day(),
            days_in_month: days_in_month(date),
        }
    }

    pub fn project(&self, totals: &MetricTotals) -> MetricTotals {
        project_month_end(totals, self.day_of_month, self.days_in_month)
    }
}

/// Number of days in the month containing `date`.
pub fn days_in_month(date: NaiveDate) -> u32 {
    let first = date.with_day(1).unwrap_or(date);
    first
        .checked_add_months(Months::new(1))
        .map_or(date.day(), |next| (next - first).num_days() as u32)
}

/// Whether two dates fall in the same calendar month.
pub fn same_month(a: NaiveDate, b: NaiveDate) -> bool {
    a.year() == b.year() && a.month() == b.month()
}

/// Linear run-rate projection of partial-month totals to month end.
///
/// With no elapsed days there is no rate to extrapolate from, so every metric projects to zero.
pub fn project_month_end(
    totals: &MetricTotals,
    day_of_month: u32,
    days_in_month: u32,
) -> MetricTotals {
    MetricTotals::new(totals.iter().map(|(metric, value)| {
        let projected = if day_of_month > 0 {
            value / f64::from(day_of_month) * f64::from(days_in_month)
        } else {
            0.0
        };
        (metric, projected)
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::performance::catalog::Metric;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn days_in_month_handles_leap_years_and_december() {
        assert_eq!(days_in_month(date(2024, 2, 10)), 29);
        assert_eq!(days_in_month(date(2025, 2, 10)), 28);
        assert_eq!(days_in_month(date(2025, 12, 31)), 31);
        assert_eq!(days_in_month(date(2025, 4, 1)), 30);
    }

    #[test]
    fn progress_reads_day_and_length() {
        let progress = MonthProgress::from_date(date(2025, 4, 10));
        assert_eq!(progress, MonthProgress::new(10, 30));
        assert_eq!(
            MonthProgress::from_date(date(2024, 2, 29)),
            MonthProgress::new(29, 29)
        );
    }

    #[test]
    fn projection_scales_by_run_rate() {
        let totals = MetricTotals::new([(Metric::NewSim, 20.0), (Metric::Device, 5.0)]);
        let projected = project_month_end(&totals, 10, 30);

        assert!((projected.get(Metric::NewSim) - 60.0).abs() < 1e-9);
        assert!((projected.get(Metric::Device) - 15.0).abs() < 1e-9);
        assert_eq!(projected.get(Metric::NewTv), 0.0);
    }

    #[test]
    fn zero_elapsed_days_projects_zero() {
        let totals = MetricTotals::new([(Metric::NewSim, 20.0)]);
        assert!(project_month_end(&totals, 0, 30).is_zero());
    }

    #[test]
    fn same_month_compares_year_and_month() {
        assert!(same_month(date(2025, 4, 1), date(2025, 4, 30)));
        assert!(!same_month(date(2025, 4, 1), date(2024, 4, 1)));
        assert!(!same_month(date(2025, 4, 30), date(2025, 5, 1)));
    }
}

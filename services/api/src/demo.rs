use crate::infra::{parse_date, seed_sample_data};
use chrono::{Local, NaiveDate};
use clap::Args;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use targeti::error::AppError;
use targeti::performance::report::views::{NetworkOverview, ShopDetail};
use targeti::performance::{
    DailyRecord, DailyRecordImporter, InMemoryPerformanceStore, Metric, NewShop,
    PerformanceService, SalesRepresentative, ShopUpdate, TargetSet,
};

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Evaluation date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Include the per-day totals for each shop.
    #[arg(long)]
    pub(crate) show_trend: bool,
}

#[derive(Args, Debug)]
pub(crate) struct ReportArgs {
    /// CSV export with one row per representative per day
    #[arg(long)]
    pub(crate) records: PathBuf,
    /// Display name for the shop in the report
    #[arg(long, default_value = "Imported shop")]
    pub(crate) shop_name: String,
    /// JSON object of monthly targets keyed by metric (defaults to the catalog targets)
    #[arg(long)]
    pub(crate) targets: Option<PathBuf>,
    /// Evaluation date (defaults to the latest date in the export)
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Include the per-day totals
    #[arg(long)]
    pub(crate) show_trend: bool,
}

pub(crate) fn run_report(args: ReportArgs) -> Result<(), AppError> {
    let ReportArgs {
        records,
        shop_name,
        targets,
        today,
        show_trend,
    } = args;

    let records = DailyRecordImporter::from_path(&records)?;
    let targets = match targets {
        Some(path) => load_targets(&path)?,
        None => TargetSet::default(),
    };
    let today = today
        .or_else(|| records.iter().map(|record| record.date).max())
        .unwrap_or_else(|| Local::now().date_naive());

    let service = PerformanceService::new(Arc::new(InMemoryPerformanceStore::default()));
    let shop = service.add_shop(NewShop {
        name: shop_name,
        description: None,
    })?;
    service.update_shop(
        &shop.id,
        ShopUpdate {
            name: shop.name.clone(),
            description: None,
            sales_representatives: representatives_from_records(&records),
        },
    )?;
    service.save_targets(&shop.id, targets)?;
    service.import_records(&shop.id, records)?;

    let detail = service.shop_detail(&shop.id, today)?;
    render_shop_detail(&detail, show_trend);
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());

    let service = PerformanceService::new(Arc::new(InMemoryPerformanceStore::default()));
    seed_sample_data(&service, today)?;

    println!("Sales performance demo");
    let overview = service.dashboard(today)?;
    render_network_overview(&overview);

    for entry in &overview.shops {
        println!();
        let detail = service.shop_detail(&entry.shop_id, today)?;
        render_shop_detail(&detail, args.show_trend);
    }
    Ok(())
}

fn load_targets(path: &Path) -> Result<TargetSet, AppError> {
    let raw = std::fs::read_to_string(path)?;
    serde_json::from_str(&raw)
        .map_err(|err| AppError::Input(format!("targets file {}: {err}", path.display())))
}

/// Team roster in order of first appearance; entries without a name fall back to the id.
pub(crate) fn representatives_from_records(records: &[DailyRecord]) -> Vec<SalesRepresentative> {
    let mut seen = BTreeSet::new();
    records
        .iter()
        .flat_map(|record| record.entries.iter())
        .filter(|entry| seen.insert(entry.rep_id.clone()))
        .map(|entry| SalesRepresentative {
            id: entry.rep_id.clone(),
            name: entry
                .rep_name
                .clone()
                .unwrap_or_else(|| entry.rep_id.0.clone()),
        })
        .collect()
}

pub(crate) fn render_network_overview(overview: &NetworkOverview) {
    println!(
        "Network dashboard for {} (day {} of {})",
        overview.evaluated_on, overview.month.day_of_month, overview.month.days_in_month
    );
    println!(
        "Average achievement {} | average EOM forecast {}",
        overview.average_achievement, overview.average_forecast_achievement
    );

    if overview.shops.is_empty() {
        println!("\nShop rankings: no shops configured");
    } else {
        println!("\nShop rankings");
        for (rank, shop) in overview.shops.iter().enumerate() {
            println!(
                "  {:>2}. {:<24} {:>7} | EOM {:>7}",
                rank + 1,
                shop.shop_name,
                shop.achievement.to_string(),
                shop.forecast_achievement.to_string()
            );
        }
    }

    if !overview.representatives.is_empty() {
        println!("\nRepresentative rankings");
        for (rank, rep) in overview.representatives.iter().enumerate() {
            println!(
                "  {:>2}. {:<24} {:<16} {:>7} | EOM {:>7}",
                rank + 1,
                rep.representative_name,
                rep.shop_name,
                rep.achievement.to_string(),
                rep.forecast_achievement.to_string()
            );
        }
    }

    println!("\nNetwork totals");
    for metric in Metric::ordered() {
        println!(
            "  - {:<26} {:>6.0}",
            metric.label(),
            overview.network_totals.get(metric)
        );
    }
}

pub(crate) fn render_shop_detail(detail: &ShopDetail, show_trend: bool) {
    println!("Shop: {} ({})", detail.shop_name, detail.shop_id);
    println!(
        "Evaluated {} (day {} of {})",
        detail.evaluated_on, detail.month.day_of_month, detail.month.days_in_month
    );
    println!(
        "Achievement {} | EOM forecast {} | standing {}",
        detail.achievement,
        detail.forecast_achievement,
        detail.insights.standing.label()
    );
    match detail.latest_day {
        Some(day) => println!(
            "Latest day {} contributed {:.1} points",
            day, detail.latest_day_contribution
        ),
        None => println!("No activity recorded this month"),
    }

    println!("\nMetric breakdown (heaviest first)");
    for entry in &detail.metrics {
        let target = entry
            .target
            .map_or_else(|| "-".to_string(), |target| format!("{target:.0}"));
        println!(
            "  - {:<26} w {:.2} | {:>5.0} / {:>5} = {:>5.1}% | EOM {:>6.0} = {:>5.1}%",
            entry.metric_label,
            entry.weight,
            entry.total,
            target,
            entry.achievement_pct,
            entry.projected_total,
            entry.projected_pct
        );
    }

    if detail.representatives.is_empty() {
        println!("\nRepresentatives: none on the roster");
    } else {
        println!("\nRepresentatives");
        for rep in &detail.representatives {
            println!(
                "  - {:<24} {:>7} | EOM {:>7}",
                rep.representative_name,
                rep.achievement.to_string(),
                rep.forecast_achievement.to_string()
            );
        }
    }

    if show_trend {
        println!("\nDaily totals");
        for day in &detail.daily_trend {
            let parts: Vec<String> = day
                .totals
                .iter()
                .filter(|(_, value)| *value > 0.0)
                .map(|(metric, value)| format!("{} {value:.0}", metric.label()))
                .collect();
            println!("  {}: {}", day.date, parts.join(", "));
        }
    }

    if !detail.insights.observations.is_empty() {
        println!("\nObservations");
        for note in &detail.insights.observations {
            println!("- {}", note);
        }
    }
    if !detail.insights.suggestions.is_empty() {
        println!("\nSuggested actions");
        for action in &detail.insights.suggestions {
            println!("- {}", action);
        }
    }
    println!("\nStatus message: {}", detail.insights.status_message);
}

#[cfg(test)]
mod tests {
    use super::*;
    use targeti::performance::{RepresentativeEntry, RepresentativeId};

    #[test]
    fn roster_is_built_in_first_appearance_order() {
        let day = |d| NaiveDate::from_ymd_opt(2025, 4, d).expect("valid date");
        let records = vec![
            DailyRecord::new(
                day(1),
                vec![
                    RepresentativeEntry::new(RepresentativeId("zoe".to_string()))
                        .with_name("Zoe Park"),
                    RepresentativeEntry::new(RepresentativeId("amir".to_string())),
                ],
            ),
            DailyRecord::new(
                day(2),
                vec![RepresentativeEntry::new(RepresentativeId("zoe".to_string()))],
            ),
        ];

        let roster = representatives_from_records(&records);

        let names: Vec<&str> = roster.iter().map(|rep| rep.name.as_str()).collect();
        assert_eq!(names, vec!["Zoe Park", "amir"]);
    }

    #[test]
    fn report_rejects_malformed_targets_file() {
        let path = std::env::temp_dir().join(format!(
            "targeti-targets-{}.json",
            std::process::id()
        ));
        std::fs::write(&path, "{ \"newSim\": \"plenty\" }").expect("write temp file");

        let result = load_targets(&path);
        std::fs::remove_file(&path).ok();

        match result {
            Err(AppError::Input(message)) => assert!(message.contains("targets file")),
            other => panic!("expected input error, got {other:?}"),
        }
    }
}

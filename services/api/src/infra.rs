use chrono::{Datelike, NaiveDate};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use targeti::performance::{
    parse_record_date, DailyRecord, Metric, NewShop, PerformanceRepository, PerformanceService,
    PerformanceServiceError, RepresentativeEntry, RepresentativeId, SalesRepresentative, ShopId,
    ShopUpdate, TargetSet,
};
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    parse_record_date(raw)
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

struct SampleShop {
    name: &'static str,
    description: &'static str,
    representatives: &'static [(&'static str, &'static str)],
    /// Scales the generated daily counts so the shops rank apart.
    pace: u32,
}

const SAMPLE_SHOPS: [SampleShop; 3] = [
    SampleShop {
        name: "Main Street",
        description: "Flagship store",
        representatives: &[("alice", "Alice Moreau"), ("bob", "Bob Lindqvist")],
        pace: 3,
    },
    SampleShop {
        name: "Harbour Kiosk",
        description: "Ferry terminal kiosk",
        representatives: &[("chen", "Chen Wei")],
        pace: 2,
    },
    SampleShop {
        name: "Riverside Mall",
        description: "Second floor, next to the food court",
        representatives: &[
            ("dara", "Dara Okafor"),
            ("emil", "Emil Sandoval"),
            ("fay", "Fay Huang"),
        ],
        pace: 2,
    },
];

/// Populate the store with demo shops and activity from the first of `today`'s month up to
/// `today`. Counts are deterministic so demos and tests render the same figures.
pub(crate) fn seed_sample_data<R>(
    service: &PerformanceService<R>,
    today: NaiveDate,
) -> Result<Vec<ShopId>, PerformanceServiceError>
where
    R: PerformanceRepository + 'static,
{
    let mut seeded = Vec::with_capacity(SAMPLE_SHOPS.len());
    for sample in &SAMPLE_SHOPS {
        let shop = service.add_shop(NewShop {
            name: sample.name.to_string(),
            description: Some(sample.description.to_string()),
        })?;
        let representatives: Vec<SalesRepresentative> = sample
            .representatives
            .iter()
            .map(|(id, name)| SalesRepresentative {
                id: RepresentativeId(id.to_string()),
                name: name.to_string(),
            })
            .collect();

        service.update_shop(
            &shop.id,
            ShopUpdate {
                name: shop.name.clone(),
                description: shop.description.clone(),
                sales_representatives: representatives.clone(),
            },
        )?;

        // Targets scale with team size around the catalog defaults.
        let team = representatives.len() as f64;
        service.save_targets(
            &shop.id,
            TargetSet::new(
                Metric::ordered()
                    .into_iter()
                    .map(|metric| (metric, (metric.default_target() * team / 2.0).ceil())),
            ),
        )?;

        let records = (1..=today.day())
            .filter_map(|day| today.with_day(day))
            .map(|date| sample_day(date, &representatives, sample.pace))
            .collect();
        service.import_records(&shop.id, records)?;
        seeded.push(shop.id);
    }

    info!(shops = seeded.len(), %today, "sample data seeded");
    Ok(seeded)
}

fn sample_day(date: NaiveDate, representatives: &[SalesRepresentative], pace: u32) -> DailyRecord {
    let entries = representatives
        .iter()
        .enumerate()
        .map(|(rep_index, rep)| {
            Metric::ordered().into_iter().enumerate().fold(
                RepresentativeEntry::new(rep.id.clone()).with_name(&rep.name),
                |entry, (metric_index, metric)| {
                    let swing = (date.day() as usize + rep_index * 2 + metric_index) % 3;
                    let base = if metric_index < 3 { pace } else { pace / 2 };
                    entry.with_count(metric, base + swing as u32)
                },
            )
        })
        .collect();
    DailyRecord::new(date, entries)
}

use super::catalog::Metric;
use super::domain::{parse_record_date, DailyRecord, RepresentativeEntry, RepresentativeId};
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

#[derive(Debug)]
pub enum RecordImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    InvalidDate { line: u64, value: String },
    MissingRepresentative { line: u64 },
}

impl std::fmt::Display for RecordImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordImportError::Io(err) => write!(f, "failed to read daily records: {}", err),
            RecordImportError::Csv(err) => write!(f, "invalid daily record CSV data: {}", err),
            RecordImportError::InvalidDate { line, value } => {
                write!(f, "line {}: '{}' is not a YYYY-MM-DD date", line, value)
            }
            RecordImportError::MissingRepresentative { line } => {
                write!(f, "line {}: repId is required", line)
            }
        }
    }
}

impl std::error::Error for RecordImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RecordImportError::Io(err) => Some(err),
            RecordImportError::Csv(err) => Some(err),
            RecordImportError::InvalidDate { .. }
            | RecordImportError::MissingRepresentative { .. } => None,
        }
    }
}

impl From<std::io::Error> for RecordImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for RecordImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// One spreadsheet row: a representative's counts for one day. Blank cells count as zero.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecordRow {
    date: String,
    rep_id: String,
    #[serde(default)]
    rep_name: Option<String>,
    #[serde(default)]
    new_sim: Option<u32>,
    #[serde(default)]
    new_line: Option<u32>,
    #[serde(default)]
    migrations: Option<u32>,
    #[serde(default)]
    fix_contract_renewal: Option<u32>,
    #[serde(default)]
    mobile_contract_renewal: Option<u32>,
    #[serde(default)]
    new_tv: Option<u32>,
    #[serde(default)]
    new_postpaid: Option<u32>,
    #[serde(default)]
    device: Option<u32>,
}

impl RecordRow {
    fn count(&self, metric: Metric) -> u32 {
        let value = match metric {
            Metric::NewSim => self.new_sim,
            Metric::NewLine => self.new_line,
            Metric::Migrations => self.migrations,
            Metric::FixContractRenewal => self.fix_contract_renewal,
            Metric::MobileContractRenewal => self.mobile_contract_renewal,
            Metric::NewTv => self.new_tv,
            Metric::NewPostpaid => self.new_postpaid,
            Metric::Device => self.device,
        };
        value.unwrap_or(0)
    }
}

/// Reads daily records from a CSV export with one row per representative per day.
///
/// Rows are grouped by date. A representative listed twice for the same date is merged into
/// a single entry whose counts are the sums of both rows.
pub struct DailyRecordImporter;

impl DailyRecordImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<DailyRecord>, RecordImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<DailyRecord>, RecordImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut days: BTreeMap<NaiveDate, Vec<RepresentativeEntry>> = BTreeMap::new();

        let headers = csv_reader.headers()?.clone();
        for result in csv_reader.records() {
            let record = result?;
            let line = record.position().map_or(0, |position| position.line());
            let row: RecordRow = record.deserialize(Some(&headers))?;

            let date = parse_record_date(&row.date).map_err(|_| {
                RecordImportError::InvalidDate {
                    line,
                    value: row.date.clone(),
                }
            })?;
            if row.rep_id.is_empty() {
                return Err(RecordImportError::MissingRepresentative { line });
            }

            let rep_id = RepresentativeId(row.rep_id.clone());
            let entries = days.entry(date).or_default();
            let position = entries.iter().position(|entry| entry.rep_id == rep_id);
            let entry = match position {
                Some(position) => &mut entries[position],
                None => {
                    entries.push(RepresentativeEntry::new(rep_id));
                    let last = entries.len() - 1;
                    &mut entries[last]
                }
            };

            if entry.rep_name.is_none() {
                entry.rep_name = row.rep_name.clone().filter(|name| !name.is_empty());
            }
            for metric in Metric::ordered() {
                let count = row.count(metric);
                if count > 0 {
                    let slot = entry.counts.entry(metric).or_insert(0);
                    *slot = slot.saturating_add(count);
                }
            }
        }

        Ok(days
            .into_iter()
            .map(|(date, entries)| DailyRecord::new(date, entries))
            .collect())
    }
}

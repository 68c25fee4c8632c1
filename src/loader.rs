use std::fs;
use std::path::Path;

use anyhow::{bail, Context};
use chrono::NaiveDateTime;
use encoding_rs::WINDOWS_1251;

use crate::models::{District, EventKind, EventRecord};

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Reads the event log from disk. The file is windows-1251 encoded comma
/// separated text; any decode or parse failure is fatal, nothing is retried.
pub fn load_events(path: &Path) -> anyhow::Result<Vec<EventRecord>> {
    let bytes =
        fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let (decoded, _, had_errors) = WINDOWS_1251.decode(&bytes);
    if had_errors {
        bail!("{} is not valid windows-1251 text", path.display());
    }
    parse_events(&decoded).with_context(|| format!("failed to parse {}", path.display()))
}

#[derive(serde::Deserialize)]
struct RawRow {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Event_Name")]
    event_name: String,
    #[serde(rename = "FederalDistrict_Name")]
    district: String,
    #[serde(rename = "Event_Count")]
    count: u64,
}

pub fn parse_events(input: &str) -> anyhow::Result<Vec<EventRecord>> {
    let mut reader = csv::Reader::from_reader(input.as_bytes());
    let mut records = Vec::new();

    for (index, result) in reader.deserialize::<RawRow>().enumerate() {
        // Header is line 1, first data row is line 2.
        let line = index + 2;
        let row = result.with_context(|| format!("line {line}: malformed row"))?;

        let occurred_at = NaiveDateTime::parse_from_str(&row.date, DATE_FORMAT)
            .with_context(|| format!("line {line}: bad date {:?}", row.date))?;
        let kind = EventKind::parse(&row.event_name)
            .with_context(|| format!("line {line}: unknown event {:?}", row.event_name))?;
        let district = District::parse(&row.district)
            .with_context(|| format!("line {line}: unknown district {:?}", row.district))?;

        records.push(EventRecord {
            occurred_at,
            kind,
            district,
            count: row.count,
        });
    }

    Ok(records)
}

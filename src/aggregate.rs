use std::collections::BTreeMap;

use chrono::NaiveDateTime;

use crate::models::{DailyCount, District, EventKind, EventRecord};

/// Groups records by an arbitrary key and sums their counts. Pure; an empty
/// input produces an empty map.
pub fn sum_by<'a, I, K, F>(records: I, key: F) -> BTreeMap<K, u64>
where
    I: IntoIterator<Item = &'a EventRecord>,
    K: Ord,
    F: Fn(&EventRecord) -> K,
{
    let mut totals = BTreeMap::new();
    for record in records {
        *totals.entry(key(record)).or_insert(0) += record.count;
    }
    totals
}

/// Summed counts per (district, kind), for pie/bar/map rendering.
pub fn totals_by_district_kind(
    records: &[EventRecord],
) -> BTreeMap<(District, EventKind), u64> {
    sum_by(records, |r| (r.district, r.kind))
}

pub fn totals_by_kind(records: &[EventRecord]) -> BTreeMap<EventKind, u64> {
    sum_by(records, |r| r.kind)
}

/// Daily series for one event kind: duplicate dates are summed and the
/// result is sorted ascending, which is exactly the precondition the
/// peak analyzer relies on.
pub fn daily_series(records: &[EventRecord], kind: EventKind) -> Vec<DailyCount> {
    sum_by(records.iter().filter(|r| r.kind == kind), |r| r.occurred_at)
        .into_iter()
        .map(|(date, count)| DailyCount { date, count })
        .collect()
}

/// Daily activation counts per district, for the filterable per-district
/// line chart.
pub fn activation_daily_by_district(
    records: &[EventRecord],
) -> BTreeMap<(NaiveDateTime, District), u64> {
    sum_by(
        records.iter().filter(|r| r.kind == EventKind::Activation),
        |r| (r.occurred_at, r.district),
    )
}

/// Per-date difference between activations and registrations. Since every
/// registration happens during an activation, the surplus is the number of
/// already-registered users redeeming a code that day. Dates present in only
/// one of the two series are skipped; the surplus can be negative.
pub fn returning_users(records: &[EventRecord]) -> Vec<(NaiveDateTime, i64)> {
    let activations = sum_by(
        records.iter().filter(|r| r.kind == EventKind::Activation),
        |r| r.occurred_at,
    );
    let registrations = sum_by(
        records.iter().filter(|r| r.kind == EventKind::Registration),
        |r| r.occurred_at,
    );

    activations
        .into_iter()
        .filter_map(|(date, acts)| {
            registrations
                .get(&date)
                .map(|regs| (date, acts as i64 - *regs as i64))
        })
        .collect()
}

use std::fmt::Write;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::aggregate;
use crate::models::{DailyCount, District, EventKind, EventRecord, PeakIntervals};
use crate::peaks;

/// Activation totals per district, largest first. Shared by the report and
/// the export bundle.
pub fn ranked_activation_totals(records: &[EventRecord]) -> Vec<(District, u64)> {
    let mut totals: Vec<(District, u64)> = aggregate::totals_by_district_kind(records)
        .into_iter()
        .filter_map(|((district, kind), count)| {
            (kind == EventKind::Activation).then_some((district, count))
        })
        .collect();
    totals.sort_by(|a, b| b.1.cmp(&a.1));
    totals
}

pub fn build_report(records: &[EventRecord]) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "# Activation Analytics Report");

    if records.is_empty() {
        let _ = writeln!(output, "No events loaded.");
        return output;
    }

    let first = records.iter().map(|r| r.occurred_at).min();
    let last = records.iter().map(|r| r.occurred_at).max();
    if let (Some(first), Some(last)) = (first, last) {
        let _ = writeln!(
            output,
            "Covering {} rows from {} to {}.",
            records.len(),
            first.format("%Y-%m-%d"),
            last.format("%Y-%m-%d")
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Daily Activity");
    for (kind, total) in aggregate::totals_by_kind(records) {
        let _ = writeln!(output, "- Total {kind}: {total}");
    }

    let activations = aggregate::daily_series(records, EventKind::Activation);
    if let (Some(first), Some(last)) = (activations.first(), activations.last()) {
        if first.count > 0 && activations.len() > 1 {
            let _ = writeln!(
                output,
                "- Daily activations went from {} to {} over the period (x{:.1})",
                first.count,
                last.count,
                last.count as f64 / first.count as f64
            );
        }
    }

    let surplus = aggregate::returning_users(records);
    if !surplus.is_empty() {
        let above = surplus.iter().filter(|(_, diff)| *diff > 0).count();
        let _ = writeln!(
            output,
            "- Activations exceeded registrations on {above} of {} shared days; \
             the surplus is already-registered users redeeming another code",
            surplus.len()
        );
    }

    let registrations = aggregate::daily_series(records, EventKind::Registration);
    write_peaks_section(&mut output, &peaks::analyze(&registrations));
    write_district_section(&mut output, records);

    output
}

fn write_peaks_section(output: &mut String, intervals: &PeakIntervals) {
    let _ = writeln!(output);
    let _ = writeln!(output, "## Registration Peaks");

    if intervals.peak_dates.is_empty() {
        let _ = writeln!(output, "No peaks detected in the registration series.");
        return;
    }

    let dates: Vec<String> = intervals
        .peak_dates
        .iter()
        .map(|date| date.format("%Y-%m-%d").to_string())
        .collect();
    let _ = writeln!(output, "- Peak dates: {}", dates.join(", "));

    match &intervals.gap_stats {
        Some(stats) => {
            let _ = writeln!(
                output,
                "- Mean gap between peaks: {:.2} days (population stddev {:.2})",
                stats.mean_days, stats.stddev_days
            );
            let _ = writeln!(
                output,
                "- A steady gap suggests buyers return for the product on \
                 roughly that cycle"
            );
        }
        None => {
            let _ = writeln!(
                output,
                "- Fewer than two peaks; the interval statistic is undefined"
            );
        }
    }
}

fn write_district_section(output: &mut String, records: &[EventRecord]) {
    let _ = writeln!(output);
    let _ = writeln!(output, "## District Distribution");

    let ranked = ranked_activation_totals(records);
    if ranked.is_empty() {
        let _ = writeln!(output, "No activations recorded.");
        return;
    }

    let grand_total: u64 = ranked.iter().map(|(_, count)| count).sum();
    for (district, count) in &ranked {
        let share = *count as f64 / grand_total as f64 * 100.0;
        let _ = writeln!(output, "- {district}: {count} activations ({share:.1}%)");
    }

    let mut per_capita = per_capita_entries(&ranked);
    per_capita.sort_by(|a, b| {
        b.per_100_residents
            .partial_cmp(&a.per_100_residents)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    if !per_capita.is_empty() {
        let _ = writeln!(output);
        let _ = writeln!(output, "Per 100 residents:");
        for entry in per_capita {
            let _ = writeln!(
                output,
                "- {}: {:.4} (population {})",
                entry.district, entry.per_100_residents, entry.population
            );
        }
    }
}

fn per_capita_entries(ranked: &[(District, u64)]) -> Vec<PerCapitaEntry> {
    ranked
        .iter()
        .filter_map(|&(district, activations)| {
            district.population().map(|population| PerCapitaEntry {
                district,
                population,
                activations,
                per_100_residents: activations as f64 / population as f64 * 100.0,
            })
        })
        .collect()
}

/// Everything the presentation layer needs, flattened for JSON. Tuple-keyed
/// maps become vectors of named rows.
#[derive(Debug, Serialize)]
pub struct DashboardBundle {
    pub district_totals: Vec<DistrictKindTotal>,
    pub activations_daily: Vec<DailyCount>,
    pub registrations_daily: Vec<DailyCount>,
    pub returning_users: Vec<ReturningUsersPoint>,
    pub registration_peaks: PeakIntervals,
    pub district_daily: Vec<DistrictDailyPoint>,
    pub map_points: Vec<MapPoint>,
    pub per_capita: Vec<PerCapitaEntry>,
}

#[derive(Debug, Serialize)]
pub struct DistrictKindTotal {
    pub district: District,
    pub kind: EventKind,
    pub count: u64,
}

#[derive(Debug, Serialize)]
pub struct DistrictDailyPoint {
    pub date: NaiveDateTime,
    pub district: District,
    pub count: u64,
}

#[derive(Debug, Serialize)]
pub struct ReturningUsersPoint {
    pub date: NaiveDateTime,
    pub surplus: i64,
}

#[derive(Debug, Serialize)]
pub struct MapPoint {
    pub district: District,
    pub lat: f64,
    pub lon: f64,
    pub count: u64,
}

#[derive(Debug, Serialize)]
pub struct PerCapitaEntry {
    pub district: District,
    pub population: u64,
    pub activations: u64,
    pub per_100_residents: f64,
}

pub fn build_bundle(records: &[EventRecord]) -> DashboardBundle {
    let district_totals: Vec<DistrictKindTotal> =
        aggregate::totals_by_district_kind(records)
            .into_iter()
            .map(|((district, kind), count)| DistrictKindTotal {
                district,
                kind,
                count,
            })
            .collect();

    let district_daily: Vec<DistrictDailyPoint> =
        aggregate::activation_daily_by_district(records)
            .into_iter()
            .map(|((date, district), count)| DistrictDailyPoint {
                date,
                district,
                count,
            })
            .collect();

    let returning_users: Vec<ReturningUsersPoint> = aggregate::returning_users(records)
        .into_iter()
        .map(|(date, surplus)| ReturningUsersPoint { date, surplus })
        .collect();

    let ranked = ranked_activation_totals(records);
    let map_points: Vec<MapPoint> = ranked
        .iter()
        .filter_map(|&(district, count)| {
            district.coordinates().map(|(lat, lon)| MapPoint {
                district,
                lat,
                lon,
                count,
            })
        })
        .collect();

    let registrations = aggregate::daily_series(records, EventKind::Registration);

    DashboardBundle {
        district_totals,
        activations_daily: aggregate::daily_series(records, EventKind::Activation),
        registrations_daily: registrations.clone(),
        returning_users,
        registration_peaks: peaks::analyze(&registrations),
        district_daily,
        map_points,
        per_capita: per_capita_entries(&ranked),
    }
}

use crate::models::{DailyCount, GapStats, PeakIntervals};

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Indices of strict local maxima: a point counts only when it is greater
/// than both neighbors, so endpoints and plateaus never qualify. Expects a
/// series sorted ascending by date with no duplicate dates; `daily_series`
/// produces exactly that.
pub fn find_peaks(series: &[DailyCount]) -> Vec<usize> {
    if series.len() < 3 {
        return Vec::new();
    }
    (1..series.len() - 1)
        .filter(|&i| {
            series[i].count > series[i - 1].count && series[i].count > series[i + 1].count
        })
        .collect()
}

/// Finds the peaks of a daily series and summarizes the spacing between
/// them. With fewer than two peaks there are no gaps and `gap_stats` is
/// `None`; callers render that case explicitly instead of a NaN.
pub fn analyze(series: &[DailyCount]) -> PeakIntervals {
    let peak_dates: Vec<_> = find_peaks(series)
        .into_iter()
        .map(|i| series[i].date)
        .collect();

    let gap_days: Vec<f64> = peak_dates
        .windows(2)
        .map(|pair| (pair[1] - pair[0]).num_seconds() as f64 / SECONDS_PER_DAY)
        .collect();

    let gap_stats = if gap_days.is_empty() {
        None
    } else {
        let mean = gap_days.iter().sum::<f64>() / gap_days.len() as f64;
        let variance = gap_days
            .iter()
            .map(|gap| (gap - mean).powi(2))
            .sum::<f64>()
            / gap_days.len() as f64;
        Some(GapStats {
            mean_days: mean,
            stddev_days: variance.sqrt(),
        })
    };

    PeakIntervals {
        peak_dates,
        gap_days,
        gap_stats,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, day)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn series(counts: &[u64]) -> Vec<DailyCount> {
        counts
            .iter()
            .enumerate()
            .map(|(i, &count)| DailyCount {
                date: at(i as u32 + 1),
                count,
            })
            .collect()
    }

    #[test]
    fn single_interior_maximum_is_one_peak() {
        assert_eq!(find_peaks(&series(&[1, 5, 2])), vec![1]);
        assert_eq!(find_peaks(&series(&[1, 2, 7, 3, 1])), vec![2]);
    }

    #[test]
    fn monotonic_series_has_no_peaks() {
        assert!(find_peaks(&series(&[1, 2, 3, 4, 5])).is_empty());
        assert!(find_peaks(&series(&[5, 4, 3, 2, 1])).is_empty());
    }

    #[test]
    fn plateau_is_not_a_peak() {
        // Two adjacent equal maxima; strict inequality rejects both.
        assert!(find_peaks(&series(&[1, 4, 4, 1])).is_empty());
        assert!(find_peaks(&series(&[1, 4, 4, 4, 1])).is_empty());
    }

    #[test]
    fn endpoints_are_never_peaks() {
        assert!(find_peaks(&series(&[9, 1, 8])).is_empty());
        assert!(find_peaks(&series(&[9, 1])).is_empty());
        assert!(find_peaks(&series(&[9])).is_empty());
        assert!(find_peaks(&[]).is_empty());
    }

    #[test]
    fn equal_gaps_have_zero_stddev() {
        // Spikes every four days: peaks land on Jan 2, 6 and 10.
        let counts = [0, 5, 0, 0, 0, 5, 0, 0, 0, 5, 0];
        let series = series(&counts);
        let result = analyze(&series);
        assert_eq!(result.peak_dates, vec![at(2), at(6), at(10)]);
        assert_eq!(result.gap_days, vec![4.0, 4.0]);
        let stats = result.gap_stats.unwrap();
        assert_eq!(stats.mean_days, 4.0);
        assert_eq!(stats.stddev_days, 0.0);
    }

    #[test]
    fn uneven_gaps_use_population_stddev() {
        // Peaks at Jan 2, Jan 5, Jan 11: gaps 3 and 6 days.
        let days_and_counts = [
            (1u32, 1u64),
            (2, 9),
            (3, 1),
            (4, 1),
            (5, 9),
            (6, 1),
            (7, 1),
            (8, 1),
            (9, 1),
            (10, 1),
            (11, 9),
            (12, 1),
        ];
        let series: Vec<DailyCount> = days_and_counts
            .iter()
            .map(|&(day, count)| DailyCount {
                date: at(day),
                count,
            })
            .collect();
        let result = analyze(&series);
        assert_eq!(result.peak_dates, vec![at(2), at(5), at(11)]);
        assert_eq!(result.gap_days, vec![3.0, 6.0]);
        let stats = result.gap_stats.unwrap();
        assert_eq!(stats.mean_days, 4.5);
        assert_eq!(stats.stddev_days, 1.5);
    }

    #[test]
    fn fewer_than_two_peaks_has_no_stats() {
        let result = analyze(&series(&[1, 5, 2]));
        assert_eq!(result.peak_dates.len(), 1);
        assert!(result.gap_days.is_empty());
        assert!(result.gap_stats.is_none());

        let result = analyze(&series(&[1, 2, 3]));
        assert!(result.peak_dates.is_empty());
        assert!(result.gap_stats.is_none());
    }

    #[test]
    fn sub_day_spacing_keeps_fractional_days() {
        let noon = NaiveDate::from_ymd_opt(2024, 1, 4)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        let series = vec![
            DailyCount { date: at(1), count: 1 },
            DailyCount { date: at(2), count: 5 },
            DailyCount { date: at(3), count: 1 },
            DailyCount { date: noon, count: 5 },
            DailyCount { date: at(6), count: 1 },
        ];
        let result = analyze(&series);
        assert_eq!(result.gap_days, vec![2.5]);
        let stats = result.gap_stats.unwrap();
        assert_eq!(stats.mean_days, 2.5);
        assert_eq!(stats.stddev_days, 0.0);
    }
}

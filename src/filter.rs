use std::fmt;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::models::Record;

/// Named look-back window for the entity summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
pub enum TimeRange {
    #[default]
    #[serde(rename = "All Time", alias = "all-time")]
    AllTime,
    #[serde(rename = "Past Week", alias = "past-week")]
    PastWeek,
    #[serde(rename = "Past Month", alias = "past-month")]
    PastMonth,
}

impl TimeRange {
    pub const ALL: [TimeRange; 3] = [TimeRange::AllTime, TimeRange::PastWeek, TimeRange::PastMonth];

    pub fn label(self) -> &'static str {
        match self {
            TimeRange::AllTime => "All Time",
            TimeRange::PastWeek => "Past Week",
            TimeRange::PastMonth => "Past Month",
        }
    }

    pub fn lookback(self) -> Option<Duration> {
        match self {
            TimeRange::AllTime => None,
            TimeRange::PastWeek => Some(Duration::days(7)),
            TimeRange::PastMonth => Some(Duration::days(30)),
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

pub fn filter_by_time_range(
    records: &[Record],
    range: TimeRange,
    reference: NaiveDateTime,
) -> Vec<Record> {
    match range.lookback() {
        None => records.to_vec(),
        Some(lookback) => {
            let cutoff = reference - lookback;
            records
                .iter()
                .filter(|record| record.submitted_at >= cutoff)
                .cloned()
                .collect()
        }
    }
}

/// Records with `start <= submitted_at <= end`; empty when `start > end`.
pub fn filter_by_date_range(
    records: &[Record],
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> Vec<Record> {
    records
        .iter()
        .filter(|record| record.submitted_at >= start && record.submitted_at <= end)
        .cloned()
        .collect()
}

pub fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

pub fn end_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_hms_opt(23, 59, 59)
        .unwrap_or_else(|| start_of_day(date))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(value: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn record(entity: &str, rating: u8, submitted_at: &str) -> Record {
        Record {
            entity: entity.to_string(),
            rating,
            submitted_at: at(submitted_at),
        }
    }

    fn sample() -> Vec<Record> {
        vec![
            record("Support", 5, "2024-06-29 08:00:00"),
            record("Support", 3, "2024-06-20 12:00:00"),
            record("Billing", 4, "2024-06-05 16:30:00"),
            record("Billing", 1, "2024-04-01 10:00:00"),
        ]
    }

    #[test]
    fn all_time_keeps_everything() {
        let records = sample();
        let kept = filter_by_time_range(&records, TimeRange::AllTime, at("2024-07-01 00:00:00"));
        assert_eq!(kept, records);
    }

    #[test]
    fn past_week_and_month_use_reference_time() {
        let records = sample();
        let now = at("2024-07-01 00:00:00");

        let week = filter_by_time_range(&records, TimeRange::PastWeek, now);
        assert_eq!(week.len(), 1);
        assert_eq!(week[0].submitted_at, at("2024-06-29 08:00:00"));

        let month = filter_by_time_range(&records, TimeRange::PastMonth, now);
        assert_eq!(month.len(), 3);
    }

    #[test]
    fn cutoff_is_inclusive() {
        let records = vec![record("Support", 5, "2024-06-24 00:00:00")];
        let kept = filter_by_time_range(&records, TimeRange::PastWeek, at("2024-07-01 00:00:00"));
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn ranges_widen_monotonically() {
        let records = sample();
        let now = at("2024-07-01 00:00:00");
        let week = filter_by_time_range(&records, TimeRange::PastWeek, now);
        let month = filter_by_time_range(&records, TimeRange::PastMonth, now);
        let all = filter_by_time_range(&records, TimeRange::AllTime, now);

        assert!(week.iter().all(|r| month.contains(r)));
        assert!(month.iter().all(|r| all.contains(r)));
        assert!(week.len() <= month.len() && month.len() <= all.len());
    }

    #[test]
    fn date_range_is_inclusive_on_both_ends() {
        let records = sample();
        let kept = filter_by_date_range(
            &records,
            at("2024-06-05 16:30:00"),
            at("2024-06-29 08:00:00"),
        );
        assert_eq!(kept.len(), 3);
    }

    #[test]
    fn inverted_date_range_is_empty() {
        let records = sample();
        let kept = filter_by_date_range(
            &records,
            at("2024-06-30 00:00:00"),
            at("2024-06-01 00:00:00"),
        );
        assert!(kept.is_empty());
    }

    #[test]
    fn day_bounds_cover_the_whole_day() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 20).unwrap();
        let kept = filter_by_date_range(&sample(), start_of_day(date), end_of_day(date));
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].rating, 3);
    }

    #[test]
    fn deserializes_labels_and_cli_names() {
        let parse = |value: &str| serde_json::from_str::<TimeRange>(value);
        assert_eq!(parse("\"Past Week\"").unwrap(), TimeRange::PastWeek);
        assert_eq!(parse("\"past-month\"").unwrap(), TimeRange::PastMonth);
        assert_eq!(parse("\"All Time\"").unwrap(), TimeRange::AllTime);
        assert!(parse("\"Yesterday\"").is_err());
    }
}

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::{DayRange, Record};

// ---------------------------------------------------------------------------
// Dataset
// ---------------------------------------------------------------------------

/// Accumulated, deduplicated records, kept sorted by timestamp.
///
/// Coverage is the contiguous window between the first and last stored day.
/// Days inside that window that produced no rows are still considered covered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    records: Vec<Record>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalizes arbitrary input: sorts and drops exact duplicate rows.
    pub fn from_records(records: Vec<Record>) -> Self {
        Self::new().merge(records)
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn first_day(&self) -> Option<NaiveDate> {
        self.records.first().map(Record::day)
    }

    pub fn last_day(&self) -> Option<NaiveDate> {
        self.records.last().map(Record::day)
    }

    /// Days the snapshot is assumed complete for; None when empty.
    pub fn coverage(&self) -> Option<DayRange> {
        match (self.first_day(), self.last_day()) {
            (Some(first), Some(last)) => DayRange::new(first, last).ok(),
            _ => None,
        }
    }

    /// Folds freshly fetched rows in. Pure: the result depends only on `self` and `fetched`.
    /// Rows equal in every field collapse to one.
    pub fn merge(self, fetched: Vec<Record>) -> Self {
        let mut records = self.records;
        records.extend(fetched);
        records.sort();
        records.dedup();
        Self { records }
    }

    /// Rows whose day falls inside `range` (the end day counts in full).
    pub fn view(&self, range: &DayRange) -> Dataset {
        let lo = self.records.partition_point(|r| r.day() < range.start());
        let hi = self.records.partition_point(|r| r.day() <= range.end());
        Dataset {
            records: self.records[lo..hi].to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Sport, Status};

    fn rec(day: u32, hour: u32, event: &str) -> Record {
        Record {
            timestamp: NaiveDate::from_ymd_opt(2020, 4, day)
                .unwrap()
                .and_hms_opt(hour, 0, 0)
                .unwrap(),
            sport: Sport::Football,
            league: "Serie A".to_string(),
            event: event.to_string(),
            tip: "1".to_string(),
            odds: "2.10".to_string(),
            outcome_score: "1-0".to_string(),
            status: Status::Won,
        }
    }

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 4, day).unwrap()
    }

    #[test]
    fn empty_has_no_coverage() {
        assert_eq!(Dataset::new().coverage(), None);
    }

    #[test]
    fn coverage_spans_first_to_last_day() {
        let ds = Dataset::from_records(vec![rec(15, 20, "b"), rec(12, 9, "a")]);
        let cov = ds.coverage().unwrap();
        assert_eq!((cov.start(), cov.end()), (d(12), d(15)));
    }

    #[test]
    fn merging_same_day_twice_keeps_one_copy() {
        let day = vec![rec(12, 9, "a"), rec(12, 9, "b"), rec(12, 18, "c")];
        let ds = Dataset::new().merge(day.clone()).merge(day.clone());
        assert_eq!(ds.len(), 3);
        assert_eq!(Dataset::new().merge([day.clone(), day].concat()).len(), 3);
    }

    #[test]
    fn same_timestamp_different_rows_both_kept() {
        let ds = Dataset::from_records(vec![rec(12, 9, "a"), rec(12, 9, "b")]);
        assert_eq!(ds.len(), 2);
    }

    #[test]
    fn merge_keeps_timestamp_order() {
        let ds = Dataset::from_records(vec![rec(14, 9, "x")]).merge(vec![rec(16, 1, "y"), rec(10, 23, "z")]);
        let stamps: Vec<_> = ds.records().iter().map(|r| r.timestamp).collect();
        let mut sorted = stamps.clone();
        sorted.sort();
        assert_eq!(stamps, sorted);
        assert_eq!(ds.first_day(), Some(d(10)));
        assert_eq!(ds.last_day(), Some(d(16)));
    }

    #[test]
    fn view_includes_whole_end_day() {
        let ds = Dataset::from_records(vec![
            rec(11, 23, "before"),
            rec(12, 0, "start"),
            rec(14, 23, "late on end day"),
            rec(15, 0, "after"),
        ]);
        let v = ds.view(&DayRange::new(d(12), d(14)).unwrap());
        let events: Vec<_> = v.records().iter().map(|r| r.event.as_str()).collect();
        assert_eq!(events, vec!["start", "late on end day"]);
    }

    #[test]
    fn view_outside_data_is_empty() {
        let ds = Dataset::from_records(vec![rec(12, 9, "a")]);
        assert!(ds.view(&DayRange::new(d(20), d(20)).unwrap()).is_empty());
    }
}

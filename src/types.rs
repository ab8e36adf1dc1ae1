use chrono::{Days, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, ExtractError, FetchError, Result};

// ---------------------------------------------------------------------------
// Sport / Status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Sport {
    Football,
    Tennis,
    Basketball,
    Unknown,
}

impl std::fmt::Display for Sport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Sport::Football => "Football",
            Sport::Tennis => "Tennis",
            Sport::Basketball => "Basketball",
            Sport::Unknown => "Unknown",
        };
        write!(f, "{s}")
    }
}

/// Labels round-trip through `Display`; anything else is `Unknown`.
pub fn parse_sport_str(s: &str) -> Sport {
    match s.trim().to_lowercase().as_str() {
        "football" => Sport::Football,
        "tennis" => Sport::Tennis,
        "basketball" => Sport::Basketball,
        _ => Sport::Unknown,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Status {
    Won,
    Lost,
    /// Score is still the unresolved sentinel.
    Pending,
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Status::Won => "Won",
            Status::Lost => "Lost",
            Status::Pending => "Pending",
        };
        write!(f, "{s}")
    }
}

pub fn parse_status_str(s: &str) -> Option<Status> {
    match s.trim().to_lowercase().as_str() {
        "won" => Some(Status::Won),
        "lost" => Some(Status::Lost),
        "pending" => Some(Status::Pending),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Record
// ---------------------------------------------------------------------------

/// One normalized tip. Field order matters: the derived `Ord` sorts by timestamp first.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Record {
    pub timestamp: NaiveDateTime,
    pub sport: Sport,
    pub league: String,
    pub event: String,
    pub tip: String,
    pub odds: String,
    pub outcome_score: String,
    pub status: Status,
}

impl Record {
    pub fn day(&self) -> NaiveDate {
        self.timestamp.date()
    }
}

/// What one day's page yielded.
#[derive(Debug, Clone, PartialEq)]
pub enum DailyPage {
    Table(Vec<Record>),
    /// No tips were published for the day. Not an error.
    NoData,
}

// ---------------------------------------------------------------------------
// DayRange
// ---------------------------------------------------------------------------

/// Inclusive `[start, end]` span of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DayRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(AppError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn len_days(&self) -> u64 {
        (self.end - self.start).num_days() as u64 + 1
    }

    /// Days in ascending order.
    pub fn days(&self) -> impl DoubleEndedIterator<Item = NaiveDate> {
        let start = self.start;
        (0..self.len_days()).map(move |i| start + Days::new(i))
    }

    /// Same range with the end pulled back to `last`, or None if nothing is left.
    pub fn capped_at(&self, last: NaiveDate) -> Option<Self> {
        let end = self.end.min(last);
        (self.start <= end).then_some(Self { start: self.start, end })
    }
}

impl std::fmt::Display for DayRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}

// ---------------------------------------------------------------------------
// Gap-fill loop outcome
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum LoopOutcome {
    /// Every day of the gap was fetched (or skipped as no-data).
    Completed,
    /// Stopped early; rows gathered before `day` are kept.
    AbortedPartial(AbortReason),
}

impl LoopOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, LoopOutcome::Completed)
    }
}

#[derive(Debug)]
pub enum AbortReason {
    Fetch { day: NaiveDate, error: FetchError },
    Structure { day: NaiveDate, error: ExtractError },
}

impl AbortReason {
    pub fn day(&self) -> NaiveDate {
        match self {
            AbortReason::Fetch { day, .. } | AbortReason::Structure { day, .. } => *day,
        }
    }
}

impl std::fmt::Display for AbortReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AbortReason::Fetch { day, error } => write!(f, "fetch failed on {day}: {error}"),
            AbortReason::Structure { day, error } => {
                write!(f, "page format changed on {day}: {error}")
            }
        }
    }
}

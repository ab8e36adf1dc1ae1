use chrono::NaiveDate;
use tracing::{debug, error, info, warn};

use crate::extractor::extract;
use crate::fetcher::{day_url, PageFetcher};
use crate::types::{AbortReason, DailyPage, LoopOutcome, Record};

/// Rows gathered by one gap-fill loop, and how the loop ended.
#[derive(Debug)]
pub struct GapFill {
    pub rows: Vec<Record>,
    /// Pages actually requested, including the one that failed.
    pub fetch_calls: usize,
    pub outcome: LoopOutcome,
}

/// What a single day contributed.
enum Step {
    Accumulate(Vec<Record>),
    Skip,
    Abort(AbortReason),
}

/// Walks `days` in the order given, one fetch at a time. Stops at the first fetch or
/// page-format failure and keeps everything gathered before it. Never retries.
pub async fn fill_gap<F, I>(fetcher: &F, days: I) -> GapFill
where
    F: PageFetcher + ?Sized,
    I: IntoIterator<Item = NaiveDate>,
{
    let mut rows = Vec::new();
    let mut fetch_calls = 0usize;

    for day in days {
        fetch_calls += 1;
        match fetch_day(fetcher, day).await {
            Step::Accumulate(records) => rows.extend(records),
            Step::Skip => {}
            Step::Abort(reason) => {
                return GapFill {
                    rows,
                    fetch_calls,
                    outcome: LoopOutcome::AbortedPartial(reason),
                };
            }
        }
    }

    GapFill {
        rows,
        fetch_calls,
        outcome: LoopOutcome::Completed,
    }
}

async fn fetch_day<F: PageFetcher + ?Sized>(fetcher: &F, day: NaiveDate) -> Step {
    let url = day_url(day);
    debug!(%day, url = %url, "fetching tips page");

    let raw = match fetcher.fetch(&url).await {
        Ok(raw) => raw,
        Err(e) => {
            warn!(event = "FETCH_FAILED", %day, error = %e, "FETCH FAILED | {day} | {e}");
            return Step::Abort(AbortReason::Fetch { day, error: e });
        }
    };

    match extract(&raw, day) {
        Ok(DailyPage::Table(records)) => {
            info!(event = "DAY_FETCHED", %day, rows = records.len(), "DAY FETCHED  | {day} | rows: {}", records.len());
            Step::Accumulate(records)
        }
        Ok(DailyPage::NoData) => {
            info!(event = "DAY_NO_DATA", %day, "DAY NO DATA  | {day}");
            Step::Skip
        }
        Err(e) => {
            error!(
                event = "PAGE_FORMAT_CHANGED",
                %day,
                url = %url,
                error = %e,
                "PAGE FORMAT CHANGED | {day} | {e} | fixed-offset layout no longer matches"
            );
            Step::Abort(AbortReason::Structure { day, error: e })
        }
    }
}

use chrono::{Days, Local, NaiveDate};
use tracing::{error, info, warn};

use crate::db::SnapshotStore;
use crate::error::Result;
use crate::fetcher::PageFetcher;
use crate::reconciler::gap_fill::fill_gap;
use crate::state::Dataset;
use crate::types::{DayRange, LoopOutcome};

// ---------------------------------------------------------------------------
// Gap planning
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GapSide {
    /// Nothing stored yet: the whole requested span.
    Initial,
    /// Before the stored window. Walked newest-first.
    Left,
    /// After the stored window. Walked oldest-first.
    Right,
}

impl std::fmt::Display for GapSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GapSide::Initial => write!(f, "initial"),
            GapSide::Left => write!(f, "left"),
            GapSide::Right => write!(f, "right"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gap {
    pub side: GapSide,
    pub range: DayRange,
}

impl Gap {
    /// Fetch order. Each gap is walked outward from the stored window, so a loop that
    /// stops early still leaves stored days contiguous and the failed day uncovered.
    pub fn days(&self) -> Vec<NaiveDate> {
        match self.side {
            GapSide::Left => self.range.days().rev().collect(),
            GapSide::Initial | GapSide::Right => self.range.days().collect(),
        }
    }
}

/// Days that must be fetched to serve `requested`, given what is stored.
/// Nothing after `today` is ever planned.
pub fn plan_gaps(coverage: Option<DayRange>, requested: DayRange, today: NaiveDate) -> Vec<Gap> {
    let Some(wanted) = requested.capped_at(today) else {
        return Vec::new();
    };

    let Some(covered) = coverage else {
        return vec![Gap {
            side: GapSide::Initial,
            range: wanted,
        }];
    };

    let mut gaps = Vec::new();

    if wanted.start() < covered.start() {
        let before = covered.start() - Days::new(1);
        if let Ok(range) = DayRange::new(wanted.start(), before.min(today)) {
            gaps.push(Gap {
                side: GapSide::Left,
                range,
            });
        }
    }

    if wanted.end() > covered.end() {
        let after = covered.end() + Days::new(1);
        if let Ok(range) = DayRange::new(after, wanted.end()) {
            gaps.push(Gap {
                side: GapSide::Right,
                range,
            });
        }
    }

    gaps
}

// ---------------------------------------------------------------------------
// Reconciler
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct GapReport {
    pub gap: Gap,
    pub fetch_calls: usize,
    pub rows: usize,
    pub outcome: LoopOutcome,
}

#[derive(Debug)]
pub struct ReconcileReport {
    pub requested: DayRange,
    /// Stored rows inside `requested`.
    pub view: Dataset,
    /// Everything stored after this run; identical to what was persisted.
    pub full: Dataset,
    pub gaps: Vec<GapReport>,
}

impl ReconcileReport {
    pub fn fetch_calls(&self) -> usize {
        self.gaps.iter().map(|g| g.fetch_calls).sum()
    }

    /// True when some gap stopped early; the missing days are retried on the next run.
    pub fn is_partial(&self) -> bool {
        self.gaps.iter().any(|g| !g.outcome.is_completed())
    }
}

/// Keeps the stored snapshot in step with the remote per-day pages.
pub struct Reconciler<F, S> {
    fetcher: F,
    store: S,
    today: Option<NaiveDate>,
}

impl<F: PageFetcher, S: SnapshotStore> Reconciler<F, S> {
    pub fn new(fetcher: F, store: S) -> Self {
        Self {
            fetcher,
            store,
            today: None,
        }
    }

    /// Pins "today" instead of reading the local clock.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    #[cfg(test)]
    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    #[cfg(test)]
    pub fn store(&self) -> &S {
        &self.store
    }

    fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }

    /// Fetches the days of `[start, end]` missing from the snapshot, merges them in,
    /// persists the full result and returns it with the range-restricted view.
    ///
    /// Per-day failures end a gap early but never fail the call; only an unwritable
    /// snapshot does. A snapshot that cannot be read is copied aside before it is replaced.
    pub async fn reconcile(&self, start: NaiveDate, end: NaiveDate) -> Result<ReconcileReport> {
        let requested = DayRange::new(start, end)?;
        let today = self.today();
        let prior = self.load_snapshot().await?;
        let coverage = prior.coverage();

        let plan = plan_gaps(coverage, requested, today);
        info!(
            requested = %requested,
            covered = ?coverage.map(|c| c.to_string()),
            gaps = plan.len(),
            "Reconciling {requested} against {} stored rows",
            prior.len()
        );

        let mut fetched = Vec::new();
        let mut gaps = Vec::with_capacity(plan.len());
        for gap in plan {
            let fill = fill_gap(&self.fetcher, gap.days()).await;
            match &fill.outcome {
                LoopOutcome::Completed => info!(
                    event = "GAP_FILL_DONE",
                    side = %gap.side,
                    range = %gap.range,
                    rows = fill.rows.len(),
                    "GAP FILLED   | {} {} | rows: {}",
                    gap.side,
                    gap.range,
                    fill.rows.len()
                ),
                LoopOutcome::AbortedPartial(reason) => warn!(
                    event = "GAP_FILL_ABORTED",
                    side = %gap.side,
                    range = %gap.range,
                    rows = fill.rows.len(),
                    "GAP PARTIAL  | {} {} | rows kept: {} | {reason}",
                    gap.side,
                    gap.range,
                    fill.rows.len()
                ),
            }
            gaps.push(GapReport {
                gap,
                fetch_calls: fill.fetch_calls,
                rows: fill.rows.len(),
                outcome: fill.outcome,
            });
            fetched.extend(fill.rows);
        }

        let full = prior.merge(fetched);
        self.store.save(&full).await?;
        info!(event = "SNAPSHOT_SAVED", rows = full.len(), "Snapshot saved ({} rows)", full.len());

        let view = full.view(&requested);
        Ok(ReconcileReport {
            requested,
            view,
            full,
            gaps,
        })
    }

    /// An unreadable snapshot counts as no coverage at all. Its rows are backed up
    /// first; if that fails the run stops before anything is overwritten.
    async fn load_snapshot(&self) -> Result<Dataset> {
        match self.store.load().await {
            Ok(Some(ds)) => Ok(ds),
            Ok(None) => {
                info!("No snapshot yet, starting empty");
                Ok(Dataset::new())
            }
            Err(e) => {
                error!(
                    event = "SNAPSHOT_UNREADABLE",
                    error = %e,
                    "SNAPSHOT UNREADABLE | {e} | starting empty, stored rows are backed up and replaced on save"
                );
                self.store.backup().await?;
                Ok(Dataset::new())
            }
        }
    }
}

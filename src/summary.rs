use std::collections::BTreeMap;
use std::fmt::Write;

use crate::types::{Record, Sport, Status};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub won: usize,
    pub lost: usize,
    pub pending: usize,
}

impl StatusCounts {
    fn add(&mut self, status: Status) {
        match status {
            Status::Won => self.won += 1,
            Status::Lost => self.lost += 1,
            Status::Pending => self.pending += 1,
        }
    }

    pub fn settled(&self) -> usize {
        self.won + self.lost
    }

    /// Share of settled tips that won; None until something has settled.
    pub fn win_rate(&self) -> Option<f64> {
        match self.settled() {
            0 => None,
            n => Some(self.won as f64 / n as f64),
        }
    }

    fn combine(self, other: StatusCounts) -> StatusCounts {
        StatusCounts {
            won: self.won + other.won,
            lost: self.lost + other.lost,
            pending: self.pending + other.pending,
        }
    }
}

/// Status counts grouped by sport. Sports with no records are absent.
pub fn summarize<'a, I>(records: I) -> BTreeMap<Sport, StatusCounts>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut by_sport: BTreeMap<Sport, StatusCounts> = BTreeMap::new();
    for r in records {
        by_sport.entry(r.sport).or_default().add(r.status);
    }
    by_sport
}

fn format_rate(rate: Option<f64>) -> String {
    rate.map_or("—".to_string(), |r| format!("{:.1}%", r * 100.0))
}

/// Fixed-width text table with a totals line.
pub fn render_table(summary: &BTreeMap<Sport, StatusCounts>) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<12} | {:>6} | {:>6} | {:>7} | {:>6}",
        "Sport", "Won", "Lost", "Pending", "Win %"
    );
    let _ = writeln!(out, "{}", "-".repeat(50));

    for (sport, c) in summary {
        let _ = writeln!(
            out,
            "{:<12} | {:>6} | {:>6} | {:>7} | {:>6}",
            sport.to_string(),
            c.won,
            c.lost,
            c.pending,
            format_rate(c.win_rate())
        );
    }

    let total = summary
        .values()
        .fold(StatusCounts::default(), |acc, c| acc.combine(*c));
    let _ = writeln!(out, "{}", "-".repeat(50));
    let _ = writeln!(
        out,
        "{:<12} | {:>6} | {:>6} | {:>7} | {:>6}",
        "Total",
        total.won,
        total.lost,
        total.pending,
        format_rate(total.win_rate())
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn rec(sport: Sport, status: Status) -> Record {
        Record {
            timestamp: NaiveDate::from_ymd_opt(2020, 4, 12)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap(),
            sport,
            league: String::new(),
            event: String::new(),
            tip: String::new(),
            odds: String::new(),
            outcome_score: if status == Status::Pending { "?".into() } else { "1-0".into() },
            status,
        }
    }

    #[test]
    fn counts_group_by_sport() {
        let records = vec![
            rec(Sport::Football, Status::Won),
            rec(Sport::Football, Status::Won),
            rec(Sport::Football, Status::Lost),
            rec(Sport::Tennis, Status::Pending),
        ];
        let s = summarize(&records);
        assert_eq!(s.len(), 2);
        assert_eq!(s[&Sport::Football], StatusCounts { won: 2, lost: 1, pending: 0 });
        assert_eq!(s[&Sport::Tennis], StatusCounts { won: 0, lost: 0, pending: 1 });
    }

    #[test]
    fn win_rate_ignores_pending() {
        let c = StatusCounts { won: 3, lost: 1, pending: 10 };
        assert_eq!(c.win_rate(), Some(0.75));
        assert_eq!(StatusCounts { won: 0, lost: 0, pending: 2 }.win_rate(), None);
    }

    #[test]
    fn table_has_row_per_sport_and_totals() {
        let records = vec![
            rec(Sport::Basketball, Status::Lost),
            rec(Sport::Football, Status::Won),
        ];
        let table = render_table(&summarize(&records));
        let lines: Vec<_> = table.lines().collect();
        assert_eq!(lines.len(), 6);
        assert!(lines[2].starts_with("Football"));
        assert!(lines[3].starts_with("Basketball"));
        assert!(lines[5].starts_with("Total"));
        assert!(lines[5].contains("50.0%"));
    }

    #[test]
    fn empty_summary_renders_zero_totals() {
        let table = render_table(&BTreeMap::new());
        assert!(table.lines().last().unwrap().contains('—'));
    }
}

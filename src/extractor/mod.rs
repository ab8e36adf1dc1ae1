//! Turns one day's tips page into typed records.
//!
//! The page is expected to hold a single fixed-layout table (see `config::layout`).
//! A page without that table is a day with no tips; a page whose table no longer
//! matches the layout is an [`ExtractError`].

pub mod cues;
pub mod table;

#[cfg(test)]
pub(crate) mod fixtures;

use chrono::{NaiveDate, NaiveTime};
use scraper::Html;

use crate::config::layout::{RESULT_SEPARATOR, TABLE_SELECTOR, UNRESOLVED_SCORE};
use crate::error::ExtractError;
use crate::types::{parse_sport_str, parse_status_str, DailyPage, Record, Status};
use table::{selector, RawTable};

pub fn extract(raw_page: &str, day: NaiveDate) -> Result<DailyPage, ExtractError> {
    let document = Html::parse_document(raw_page);
    let table_sel = selector(TABLE_SELECTOR)?;

    let Some(table) = document.select(&table_sel).next() else {
        return Ok(DailyPage::NoData);
    };
    let Some(raw) = RawTable::from_element(table)? else {
        return Ok(DailyPage::NoData);
    };

    Ok(DailyPage::Table(build_records(&raw, day)?))
}

/// Types the raw rows: splits the result column, drops `Date` and `Flag`,
/// and stamps each row with `day` + its time of day.
fn build_records(raw: &RawTable, day: NaiveDate) -> Result<Vec<Record>, ExtractError> {
    let time = raw.column("Time")?;
    let sport = raw.column("Sport")?;
    let league = raw.column("League")?;
    let event = raw.column("Match")?;
    let tip = raw.column("Tip")?;
    let odds = raw.column("Odds")?;
    let result = raw.column("Result")?;

    raw.rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let time_of_day = parse_time_of_day(&row[time]).ok_or_else(|| ExtractError::BadTime {
                row: i,
                value: row[time].clone(),
            })?;
            let (outcome_score, status) = split_result(&row[result]);
            Ok(Record {
                timestamp: day.and_time(time_of_day),
                sport: parse_sport_str(&row[sport]),
                league: row[league].clone(),
                event: row[event].clone(),
                tip: row[tip].clone(),
                odds: row[odds].clone(),
                outcome_score,
                status,
            })
        })
        .collect()
}

fn parse_time_of_day(s: &str) -> Option<NaiveTime> {
    let s = s.trim();
    NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .ok()
}

/// `"2-1 | Won"` -> (`2-1`, Won). Text without a status label is the unresolved sentinel.
pub fn split_result(text: &str) -> (String, Status) {
    text.rsplit_once(RESULT_SEPARATOR)
        .and_then(|(score, label)| Some((score.trim().to_string(), parse_status_str(label)?)))
        .unwrap_or_else(|| (UNRESOLVED_SCORE.to_string(), Status::Pending))
}

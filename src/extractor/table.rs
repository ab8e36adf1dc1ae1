use scraper::{ElementRef, Selector};
use tracing::trace;

use crate::config::layout::{COLUMNS, RESULT_OFFSET, RESULT_SEPARATOR, ROW_WIDTH, UNRESOLVED_SCORE};
use crate::error::ExtractError;
use crate::extractor::cues::{colour_cue, icon_sport, status_for_colour};

pub(crate) fn selector(css: &'static str) -> Result<Selector, ExtractError> {
    Selector::parse(css).map_err(|e| ExtractError::Selector {
        css,
        reason: format!("{e:?}"),
    })
}

/// Header + rows of cell text, after icons and result colours have been folded into text.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Flattens the data cells of `table`, rewrites icon and result cells, and regroups
    /// them into fixed-width rows. `None` when the table holds no data rows.
    pub fn from_element(table: ElementRef<'_>) -> Result<Option<Self>, ExtractError> {
        let tr = selector("tr")?;
        let th = selector("th")?;
        let td = selector("td")?;
        let img = selector("img")?;

        let mut header: Vec<String> = Vec::new();
        let mut cells: Vec<ElementRef<'_>> = Vec::new();
        for row in table.select(&tr) {
            if header.is_empty() {
                header = row.select(&th).map(cell_text).collect();
            }
            let tds: Vec<_> = row.select(&td).collect();
            // Single-cell rows are banners ("no tips today"), not data.
            if tds.len() > 1 {
                cells.extend(tds);
            }
        }

        if cells.is_empty() {
            return Ok(None);
        }
        check_header(&header)?;
        if cells.len() % ROW_WIDTH != 0 {
            return Err(ExtractError::RaggedTable {
                cells: cells.len(),
                width: ROW_WIDTH,
            });
        }

        // Icons become the label of the sport they stand for.
        let mut texts: Vec<String> = cells
            .iter()
            .map(|cell| match cell.select(&img).next() {
                Some(icon) => icon_sport(icon.value().attr("src").unwrap_or("")).to_string(),
                None => cell_text(*cell),
            })
            .collect();

        for idx in (RESULT_OFFSET..cells.len()).step_by(ROW_WIDTH) {
            let score = texts[idx].clone();
            // A blank score has not been settled either.
            if score.is_empty() || score == UNRESOLVED_SCORE {
                texts[idx] = UNRESOLVED_SCORE.to_string();
                continue;
            }
            let colour = colour_cue(cells[idx]);
            let status = colour
                .as_deref()
                .and_then(status_for_colour)
                .ok_or_else(|| ExtractError::UnknownResultColour {
                    row: idx / ROW_WIDTH,
                    score: score.clone(),
                    colour: colour.clone(),
                })?;
            texts[idx] = format!("{score} {RESULT_SEPARATOR} {status}");
        }

        let rows: Vec<Vec<String>> = texts.chunks(ROW_WIDTH).map(<[String]>::to_vec).collect();
        trace!(rows = rows.len(), "raw tips table");
        Ok(Some(Self { header, rows }))
    }

    /// Index of the column headed `name`.
    pub fn column(&self, name: &'static str) -> Result<usize, ExtractError> {
        self.header
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
            .ok_or(ExtractError::MissingColumn(name))
    }
}

fn check_header(header: &[String]) -> Result<(), ExtractError> {
    let matches = header.len() == COLUMNS.len()
        && header
            .iter()
            .zip(COLUMNS)
            .all(|(found, expected)| found.eq_ignore_ascii_case(expected));
    if matches {
        Ok(())
    } else {
        Err(ExtractError::UnexpectedHeader {
            found: header.to_vec(),
        })
    }
}

/// Visible text with whitespace runs collapsed.
fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    const HEADER: &str = "<tr><th>Date</th><th>Time</th><th>Sport</th><th>Flag</th><th>League</th>\
                          <th>Match</th><th>Tip</th><th>Odds</th><th>Result</th></tr>";

    fn raw(body: &str) -> Result<Option<RawTable>, ExtractError> {
        let html = format!(r#"<table id="t">{HEADER}{body}</table>"#);
        let doc = Html::parse_document(&html);
        let sel = Selector::parse("table").unwrap();
        let table = doc.select(&sel).next().unwrap();
        RawTable::from_element(table)
    }

    fn row(sport_icon: &str, result_cell: &str) -> String {
        format!(
            r#"<tr><td>12.04</td><td>15:30</td><td><img src="/icons/{sport_icon}.png"></td>
               <td><img src="/flags/gb.png"></td><td>Premier   League</td><td>A v B</td>
               <td>Over 2.5</td><td>1.85</td>{result_cell}</tr>"#
        )
    }

    #[test]
    fn rewrites_icons_and_result_cells() {
        let body = row("football", r#"<td style="color:green">2-1</td>"#)
            + &row("tennis", r#"<td><span style="color:red">0-2</span></td>"#)
            + &row("darts", r#"<td style="color:green">?</td>"#);
        let t = raw(&body).unwrap().unwrap();
        assert_eq!(t.rows.len(), 3);
        assert_eq!(t.rows[0][2], "Football");
        assert_eq!(t.rows[0][3], "Unknown");
        assert_eq!(t.rows[0][4], "Premier League");
        assert_eq!(t.rows[0][8], "2-1 | Won");
        assert_eq!(t.rows[1][2], "Tennis");
        assert_eq!(t.rows[1][8], "0-2 | Lost");
        assert_eq!(t.rows[2][2], "Unknown");
        assert_eq!(t.rows[2][8], "?");
    }

    #[test]
    fn blank_result_is_unresolved_whatever_the_colour() {
        let body = row("football", r#"<td style="color:green"> </td>"#)
            + &row("tennis", "<td></td>");
        let t = raw(&body).unwrap().unwrap();
        assert_eq!(t.rows[0][8], "?");
        assert_eq!(t.rows[1][8], "?");
    }

    #[test]
    fn banner_rows_are_not_data() {
        let body = r#"<tr><td colspan="9">No tips today</td></tr>"#;
        assert_eq!(raw(body).unwrap(), None);
        assert_eq!(raw("").unwrap(), None);
    }

    #[test]
    fn ragged_rows_are_structural_failures() {
        let body = row("football", r#"<td style="color:green">2-1</td>"#)
            + "<tr><td>12.04</td><td>16:00</td><td>x</td></tr>";
        assert!(matches!(
            raw(&body),
            Err(ExtractError::RaggedTable { cells: 12, width: 9 })
        ));
    }

    #[test]
    fn settled_score_without_colour_fails() {
        let body = row("football", "<td>2-1</td>");
        match raw(&body) {
            Err(ExtractError::UnknownResultColour { row, score, colour }) => {
                assert_eq!(row, 0);
                assert_eq!(score, "2-1");
                assert_eq!(colour, None);
            }
            other => panic!("expected UnknownResultColour, got {other:?}"),
        }
    }

    #[test]
    fn header_change_fails() {
        let html = format!(
            r#"<table><tr><th>Kick-off</th><th>Game</th></tr>{}</table>"#,
            row("football", r#"<td style="color:green">2-1</td>"#)
        );
        let doc = Html::parse_document(&html);
        let sel = Selector::parse("table").unwrap();
        let table = doc.select(&sel).next().unwrap();
        assert!(matches!(
            RawTable::from_element(table),
            Err(ExtractError::UnexpectedHeader { .. })
        ));
    }

    #[test]
    fn column_lookup_ignores_case() {
        let t = RawTable {
            header: vec!["time".into(), "RESULT".into()],
            rows: vec![],
        };
        assert_eq!(t.column("Time").unwrap(), 0);
        assert_eq!(t.column("Result").unwrap(), 1);
        assert!(matches!(t.column("Odds"), Err(ExtractError::MissingColumn("Odds"))));
    }
}

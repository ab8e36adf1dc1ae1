//! Tips page markup for tests.

pub struct Tip<'a> {
    pub time: &'a str,
    pub icon: &'a str,
    pub event: &'a str,
    pub score: &'a str,
    pub colour: &'a str,
}

pub fn tips_page(tips: &[Tip<'_>]) -> String {
    let rows: String = tips
        .iter()
        .map(|t| {
            format!(
                "<tr><td>-</td><td>{}</td><td><img src=\"/images/{}.png\"></td>\
                 <td><img src=\"/flags/eu.png\"></td><td>Friendly</td><td>{}</td>\
                 <td>Home</td><td>1.90</td><td><span style=\"color:{}\">{}</span></td></tr>",
                t.time, t.icon, t.event, t.colour, t.score
            )
        })
        .collect();
    format!(
        "<html><body><table id=\"table-tipsbet\"><thead><tr><th>Date</th><th>Time</th>\
         <th>Sport</th><th>Flag</th><th>League</th><th>Match</th><th>Tip</th><th>Odds</th>\
         <th>Result</th></tr></thead><tbody>{rows}</tbody></table></body></html>"
    )
}

/// A day nobody published tips for.
pub fn no_tips_page() -> String {
    "<html><body><h2>Check back tomorrow</h2></body></html>".to_string()
}

/// The tips table, but with a column the extractor does not know about.
pub fn changed_layout_page() -> String {
    "<html><body><table id=\"table-tipsbet\"><tr><th>Date</th><th>Time</th><th>Sport</th>\
     <th>Flag</th><th>League</th><th>Match</th><th>Tip</th><th>Odds</th><th>Bookie</th>\
     <th>Result</th></tr><tr><td>-</td><td>12:00</td><td>x</td><td>x</td><td>L</td><td>M</td>\
     <td>T</td><td>1.5</td><td>bet365</td><td style=\"color:green\">1-0</td></tr></table></body></html>"
        .to_string()
}

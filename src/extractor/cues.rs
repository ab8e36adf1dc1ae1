use scraper::ElementRef;

use crate::types::{Sport, Status};

/// Sport for an icon, keyed by the lower-cased file stem of its `src`.
pub fn icon_sport(src: &str) -> Sport {
    match icon_stem(src).as_str() {
        "football" | "soccer" => Sport::Football,
        "tennis" => Sport::Tennis,
        "basketball" => Sport::Basketball,
        _ => Sport::Unknown,
    }
}

/// `/img/icons/Football.png?v=3` -> `football`.
fn icon_stem(src: &str) -> String {
    let path = src.split(['?', '#']).next().unwrap_or("");
    let file = path.rsplit('/').next().unwrap_or("");
    let stem = match file.rsplit_once('.') {
        Some((stem, _ext)) => stem,
        None => file,
    };
    stem.trim().to_lowercase()
}

pub fn status_for_colour(colour: &str) -> Option<Status> {
    match colour.trim().to_lowercase().as_str() {
        "green" | "#008000" | "#00ff00" | "#0f0" => Some(Status::Won),
        "red" | "#ff0000" | "#f00" => Some(Status::Lost),
        _ => None,
    }
}

/// First colour declared on `cell` or any descendant, in document order.
/// Reads the `color` property of inline styles and the legacy `color` attribute.
pub fn colour_cue(cell: ElementRef<'_>) -> Option<String> {
    cell.descendants()
        .filter_map(ElementRef::wrap)
        .find_map(|el| {
            let v = el.value();
            v.attr("style")
                .and_then(style_colour)
                .or_else(|| v.attr("color").map(|c| c.trim().to_lowercase()))
        })
}

/// `"font-weight:bold; color: Green"` -> `green`. `background-color` is not a colour cue.
/// The last `color` declaration wins, as in CSS; `!important` is dropped.
fn style_colour(style: &str) -> Option<String> {
    style.rsplit(';').find_map(|decl| {
        let (prop, value) = decl.split_once(':')?;
        if !prop.trim().eq_ignore_ascii_case("color") {
            return None;
        }
        let value = value.trim().to_lowercase();
        let value = value.strip_suffix("!important").unwrap_or(value.as_str()).trim();
        (!value.is_empty()).then(|| value.to_string())
    })
}

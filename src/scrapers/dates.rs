//! Day-first publication date normalization.

use chrono::NaiveDate;
use tracing::debug;

/// Accepted date shapes, day-first, tried in order. Two-digit-year
/// forms come first: `%Y` also consumes short years, but pins them to
/// the first century instead of the 2000s.
const FORMATS: &[&str] = &[
    "%d/%m/%y",
    "%d-%m-%y",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%d %B %Y",
    "%d %b %Y",
    "%d %B, %Y",
    "%d %b, %Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%Y-%m-%d",
];

/// Normalize a scraped date string to a calendar date.
///
/// Ambiguous numeric dates are read day-first (`02/03/2026` is 2 March).
/// Ordinal suffixes and irregular whitespace are tolerated. Returns
/// `None` when nothing matches; the caller stores the raw string either
/// way, so an unparsable date loses nothing.
pub fn normalize_date(raw: &str) -> Option<NaiveDate> {
    let cleaned = strip_ordinals(raw);
    let cleaned = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    if cleaned.is_empty() {
        return None;
    }

    for format in FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(&cleaned, format) {
            return Some(date);
        }
    }

    debug!("Unparsable date text: {:?}", raw);
    None
}

/// Drop `st`/`nd`/`rd`/`th` when it directly follows a digit and ends
/// at a word boundary, so `25th August` parses like `25 August`.
fn strip_ordinals(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut out = String::with_capacity(s.len());
    let mut i = 0;

    while i < chars.len() {
        if i > 0 && i + 1 < chars.len() && chars[i - 1].is_ascii_digit() {
            let pair: String = chars[i..i + 2]
                .iter()
                .collect::<String>()
                .to_ascii_lowercase();
            let at_boundary = chars.get(i + 2).map_or(true, |c| !c.is_ascii_alphanumeric());
            if at_boundary && matches!(pair.as_str(), "st" | "nd" | "rd" | "th") {
                i += 2;
                continue;
            }
        }
        out.push(chars[i]);
        i += 1;
    }

    out
}

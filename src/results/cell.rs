use std::sync::LazyLock;

use regex::Regex;

use crate::types::PollKey;

/// Marker text of a poll whose votes were tallied with another poll.
pub const COMBINED_MARKER: &str = "COMBINED WITH POLL";
/// Marker text of a poll where no votes were taken.
pub const VOID_MARKER: &str = "NO POLL";

static DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").unwrap());
static LEADING_DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+").unwrap());

/// A raw spreadsheet cell as handed over by the workbook reader.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Number(f64),
    Text(String),
}

impl Cell {
    /// Text rendering used for header and marker comparisons. Integral numbers render without a fraction.
    pub fn text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Number(n) if n.fract() == 0.0 && n.is_finite() => format!("{}", *n as i64),
            Cell::Number(n) => n.to_string(),
            Cell::Text(s) => s.trim().to_string(),
        }
    }

    #[inline] pub fn is_empty(&self) -> bool { self.text().is_empty() }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self { Cell::Text(s.to_string()) }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Self { Cell::Number(n) }
}

/// What a single cell means once classified.
#[derive(Debug, Clone, PartialEq)]
pub enum CellClass {
    /// A vote count, including numbers stored as text.
    Numeric(f64),
    /// "combined with poll N": this poll's votes are tallied under poll N.
    Combined(u32),
    /// "no poll": no votes were taken here.
    Void,
    Empty,
    Unrecognized(String),
}

/// Classify one cell. Markers are matched case-insensitively anywhere in the text.
pub fn classify(cell: &Cell) -> CellClass {
    match cell {
        Cell::Empty => CellClass::Empty,
        Cell::Number(n) => CellClass::Numeric(*n),
        Cell::Text(raw) => {
            let text = raw.trim();
            let upper = text.to_uppercase();
            if text.is_empty() {
                CellClass::Empty
            } else if let Some(at) = upper.find(COMBINED_MARKER) {
                DIGITS.find(&upper[at + COMBINED_MARKER.len()..])
                    .and_then(|m| m.as_str().parse().ok())
                    .map_or_else(|| CellClass::Unrecognized(text.to_string()), CellClass::Combined)
            } else if upper.contains(VOID_MARKER) {
                CellClass::Void
            } else if let Some(n) = text.replace(',', "").parse::<f64>().ok().filter(|n| n.is_finite()) {
                CellClass::Numeric(n)
            } else {
                CellClass::Unrecognized(text.to_string())
            }
        }
    }
}

/// Read a poll label: `ADV...` is the advance bucket, otherwise the leading run of digits.
/// Returns `None` for header/footer noise without a poll number.
pub fn parse_poll_label(cell: &Cell, advance_prefix: &str) -> Option<PollKey> {
    match cell {
        Cell::Empty => None,
        Cell::Number(n) if n.is_finite() && *n >= 0.0 => Some(PollKey::Number(n.trunc() as u32)),
        Cell::Number(_) => None,
        Cell::Text(raw) => {
            let text = raw.trim();
            if !advance_prefix.is_empty() && text.to_uppercase().starts_with(&advance_prefix.to_uppercase()) {
                return Some(PollKey::Advance);
            }
            LEADING_DIGITS.find(text)
                .and_then(|m| m.as_str().parse().ok())
                .map(PollKey::Number)
        }
    }
}

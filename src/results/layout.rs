use serde::{Deserialize, Serialize};

/// Declarative description of one election year's poll-by-poll results sheets.
///
/// Years differ only in where things sit and which literals delimit them; the
/// reconciler reads every year through this record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct YearLayout {
    /// First column holding candidate vote counts.
    pub start_col: usize,
    /// Row scanned for `stop_marker` to find the end of the candidate columns.
    pub header_row: usize,
    /// Row holding candidate names, matched against the roster.
    pub name_row: usize,
    /// First row of poll results.
    pub first_row: usize,
    /// Header cell text that ends the candidate columns (empty string: first empty cell).
    pub stop_marker: String,
    /// Column holding the poll label.
    pub name_col: usize,
    /// Text in column 0 of the totals row that ends the poll rows.
    pub totals_marker: String,
    /// Columns that may carry a combined/void marker, highest priority first.
    pub info_cols: Vec<usize>,
    /// Prefix of the advance-poll label.
    pub advance_prefix: String,
    /// Which run of digits in a results file name is the district number.
    pub file_number_index: usize,
}

impl Default for YearLayout {
    fn default() -> Self {
        Self {
            start_col: 3,
            header_row: 1,
            name_row: 1,
            first_row: 2,
            stop_marker: String::new(),
            name_col: 0,
            totals_marker: "Totals".into(),
            info_cols: vec![2, 1],
            advance_prefix: "ADV".into(),
            file_number_index: 0,
        }
    }
}

impl YearLayout {
    /// Sheets of the 2011 general election: candidates from column 5 up to `REJECTED`,
    /// poll labels in column 2, file names carry the year before the district number.
    pub fn legacy_2011() -> Self {
        Self {
            start_col: 5,
            stop_marker: "REJECTED".into(),
            name_col: 2,
            totals_marker: "TOTALS:".into(),
            file_number_index: 1,
            ..Self::default()
        }
    }

    /// Sheets of the 2014 general election: candidates from column 3 up to the first
    /// empty header cell, poll labels in column 0.
    pub fn legacy_2014() -> Self {
        Self::default()
    }
}

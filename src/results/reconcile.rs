use std::collections::BTreeMap;

use ahash::AHashMap;
use rayon::prelude::*;

use crate::{
    error::{Diagnostics, ProjectionError, ProjectionResult},
    types::{DistrictId, Party, PartyTally, PollKey},
};
use super::{
    cell::{classify, parse_poll_label, CellClass},
    party_columns, missing_parties, CellGrid, DistrictVotes, Roster, VoidedPolls, VoteTable, YearLayout,
};

/// One source district's poll-by-poll results sheet.
#[derive(Debug, Clone)]
pub struct ResultSheet {
    pub district: DistrictId,
    pub grid: CellGrid,
}

/// How a results row reads once its cells are classified.
#[derive(Debug, Clone, PartialEq)]
pub enum RowClass {
    /// Header, footer, or blank line without a poll label.
    Noise,
    /// Votes cast at `poll`.
    Normal { poll: PollKey, votes: PartyTally },
    /// `poll` was tallied together with poll `into`.
    Combined { poll: u32, into: u32 },
    /// No votes were taken at `poll`.
    Void { poll: PollKey },
}

fn combined(poll: PollKey, into: u32) -> Result<RowClass, String> {
    match poll {
        PollKey::Advance => Err(format!("advance poll marked as combined with poll {into}")),
        PollKey::Number(p) if p == into => Err(format!("poll {p} is combined with itself")),
        PollKey::Number(p) => Ok(RowClass::Combined { poll: p, into }),
    }
}

/// Classify one results row.
///
/// Marker precedence: the first non-empty cell among `layout.info_cols` decides
/// first; only if it carries no marker are the vote cells scanned left to right,
/// where the first marker met decides. A vote cell that is neither a number nor
/// a marker makes the row malformed.
pub fn classify_row(
    grid: &CellGrid,
    row: usize,
    columns: &[(usize, Party)],
    layout: &YearLayout,
) -> Result<RowClass, String> {
    let Some(poll) = parse_poll_label(grid.get(row, layout.name_col), &layout.advance_prefix) else {
        return Ok(RowClass::Noise);
    };

    let info = layout.info_cols.iter()
        .map(|&col| grid.get(row, col))
        .find(|cell| !cell.is_empty());
    match info.map(classify) {
        Some(CellClass::Combined(into)) => return combined(poll, into),
        Some(CellClass::Void) => return Ok(RowClass::Void { poll }),
        _ => {}
    }

    let mut votes = PartyTally::default();
    for &(col, party) in columns {
        match classify(grid.get(row, col)) {
            CellClass::Numeric(n) if n >= 0.0 => votes[party] += n,
            CellClass::Numeric(n) => return Err(format!("negative vote count {n} in column {col}")),
            CellClass::Combined(into) => return combined(poll, into),
            CellClass::Void => return Ok(RowClass::Void { poll }),
            CellClass::Empty => return Err(format!("empty vote cell in column {col}")),
            CellClass::Unrecognized(text) => return Err(format!("unrecognized vote cell {text:?} in column {col}")),
        }
    }

    Ok(RowClass::Normal { poll, votes })
}

/// Reconcile one district's rows into a vote table keyed by poll.
///
/// Normal rows accumulate under their poll. Each poll N that absorbed k combined
/// polls is split evenly afterwards: N and every absorbed poll receive N's total
/// divided by `k + 1`. Malformed rows are reported and skipped. Void rows are
/// returned separately, minus any poll that ended up with counted votes.
pub fn reconcile_sheet(
    district: DistrictId,
    grid: &CellGrid,
    columns: &[(usize, Party)],
    layout: &YearLayout,
) -> (DistrictVotes, VoidedPolls, Diagnostics) {
    let mut diagnostics = Diagnostics::new();
    let mut votes = DistrictVotes::new();
    let mut voided = VoidedPolls::new();
    let mut absorbed: BTreeMap<u32, Vec<(u32, usize)>> = BTreeMap::new();

    let totals = layout.totals_marker.trim();
    for row in layout.first_row..grid.height() {
        if !totals.is_empty() && grid.get(row, 0).text() == totals { break }

        match classify_row(grid, row, columns, layout) {
            Ok(RowClass::Normal { poll, votes: tally }) => {
                let entry = votes.entry(poll).or_default();
                *entry = *entry + tally;
            }
            Ok(RowClass::Combined { poll, into }) => {
                let members = absorbed.entry(into).or_default();
                if !members.iter().any(|&(p, _)| p == poll) {
                    members.push((poll, row));
                }
            }
            Ok(RowClass::Void { poll }) => { voided.insert(poll); }
            Ok(RowClass::Noise) => {}
            Err(reason) => diagnostics.report(ProjectionError::MalformedRow { district, row, reason }),
        }
    }

    for (into, members) in absorbed {
        let key = PollKey::Number(into);
        let Some(total) = votes.get(&key).copied() else {
            let row = members.first().map_or(0, |&(_, row)| row);
            diagnostics.report(ProjectionError::MalformedRow {
                district,
                row,
                reason: format!("combined with poll {into}, which has no results"),
            });
            continue;
        };

        let share = total.scaled(1.0 / (members.len() + 1) as f64);
        votes.insert(key, share);
        for (poll, _) in members {
            if votes.insert(PollKey::Number(poll), share).is_some() {
                log::warn!("[reconcile] district {district}: poll {poll} has its own results but is combined with poll {into}");
            }
        }
    }

    voided.retain(|poll| !votes.contains_key(poll));
    (votes, voided, diagnostics)
}

/// Reconcile every district sheet of one election year into a single vote table.
///
/// Sheets are processed in parallel and merged in input order. A sheet without
/// a roster, or two sheets for the same district, abort the run.
pub fn reconcile(
    sheets: &[ResultSheet],
    rosters: &AHashMap<DistrictId, Roster>,
    layout: &YearLayout,
) -> ProjectionResult<(VoteTable, Diagnostics)> {
    let reconciled: Vec<ProjectionResult<(DistrictId, DistrictVotes, VoidedPolls, Diagnostics)>> = sheets.par_iter()
        .map(|sheet| {
            let roster = rosters.get(&sheet.district).ok_or_else(|| {
                ProjectionError::InconsistentDistricts(format!("no candidate roster for district {}", sheet.district))
            })?;
            let columns = party_columns(&sheet.grid, layout, roster);
            let missing = missing_parties(&columns);
            if !missing.is_empty() {
                log::warn!("[reconcile] no candidate for {missing:?} in district {}", sheet.district);
            }
            let (votes, voided, diagnostics) = reconcile_sheet(sheet.district, &sheet.grid, &columns, layout);
            Ok((sheet.district, votes, voided, diagnostics))
        })
        .collect();

    let mut table = VoteTable::new();
    let mut diagnostics = Diagnostics::new();
    for result in reconciled {
        let (district, votes, voided, sheet_diagnostics) = result?;
        if table.contains_district(district) {
            return Err(ProjectionError::InconsistentDistricts(format!("two results sheets for district {district}")));
        }
        table.insert(district, votes);
        table.insert_voided(district, voided);
        diagnostics.merge(sheet_diagnostics);
    }

    Ok((table, diagnostics))
}

use ahash::AHashMap;

use crate::types::Party;
use super::{CellGrid, YearLayout};

/// Upper-cased, trimmed form used for candidate and district name matching.
/// Also drops byte-order marks that leak in from exported rosters.
pub fn normalize_name(name: &str) -> String {
    name.replace('\u{feff}', "").trim().to_uppercase()
}

/// Candidates standing in one district and the party each ran for.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Roster {
    candidates: AHashMap<String, Party>,
}

impl Roster {
    pub fn new() -> Self { Self::default() }

    /// Roster of the three tracked parties' candidates.
    pub fn from_candidates(lib: &str, pc: &str, ndp: &str) -> Self {
        let mut roster = Self::new();
        roster.insert(lib, Party::Lib);
        roster.insert(pc, Party::Pc);
        roster.insert(ndp, Party::Ndp);
        roster
    }

    pub fn insert(&mut self, candidate: &str, party: Party) {
        let name = normalize_name(candidate);
        if !name.is_empty() {
            self.candidates.insert(name, party);
        }
    }

    /// Party of a candidate; anyone not on the roster counts as OTH.
    pub fn party_of(&self, candidate: &str) -> Party {
        self.candidates.get(&normalize_name(candidate)).copied().unwrap_or(Party::Oth)
    }

    #[inline] pub fn len(&self) -> usize { self.candidates.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.candidates.is_empty() }
}

/// Rosters of one election year, keyed by normalized district name.
#[derive(Debug, Clone, Default)]
pub struct RosterBook {
    by_district: AHashMap<String, Roster>,
}

impl RosterBook {
    pub fn new() -> Self { Self::default() }

    pub fn insert(&mut self, district_name: &str, roster: Roster) {
        self.by_district.insert(normalize_name(district_name), roster);
    }

    pub fn get(&self, district_name: &str) -> Option<&Roster> {
        self.by_district.get(&normalize_name(district_name))
    }

    #[inline] pub fn len(&self) -> usize { self.by_district.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.by_district.is_empty() }
}

/// Map each candidate vote column of a sheet to a party.
///
/// Columns run from `start_col` until the header cell equals `stop_marker`
/// (or the sheet ends); the candidate name is read from `name_row`.
pub fn party_columns(grid: &CellGrid, layout: &YearLayout, roster: &Roster) -> Vec<(usize, Party)> {
    let stop = layout.stop_marker.trim();
    (layout.start_col..grid.width())
        .take_while(|&col| grid.get(layout.header_row, col).text() != stop)
        .map(|col| (col, roster.party_of(&grid.get(layout.name_row, col).text())))
        .collect()
}

/// Tracked parties (LIB, PC, NDP) with no column on the sheet.
pub fn missing_parties(columns: &[(usize, Party)]) -> Vec<Party> {
    [Party::Lib, Party::Pc, Party::Ndp].into_iter()
        .filter(|party| !columns.iter().any(|(_, p)| p == party))
        .collect()
}

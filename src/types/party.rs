use std::{fmt, ops::{Add, Index, IndexMut}};

use serde::{Deserialize, Serialize};

/// Closed set of party labels. Candidates not matched to LIB/PC/NDP fall into OTH.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Party {
    #[serde(rename = "LIB")] Lib,
    #[serde(rename = "PC")] Pc,
    #[serde(rename = "NDP")] Ndp,
    #[serde(rename = "OTH")] Oth,
}

impl Party {
    pub fn to_str(&self) -> &'static str {
        match self {
            Party::Lib => "LIB",
            Party::Pc => "PC",
            Party::Ndp => "NDP",
            Party::Oth => "OTH",
        }
    }

    /// Parse a roster label; anything unknown is `None`.
    pub fn from_label(label: &str) -> Option<Party> {
        match label.trim().to_ascii_uppercase().as_str() {
            "LIB" => Some(Party::Lib),
            "PC" => Some(Party::Pc),
            "NDP" => Some(Party::Ndp),
            "OTH" => Some(Party::Oth),
            _ => None,
        }
    }

    pub fn order() -> [Party; 4] {
        [Party::Lib, Party::Pc, Party::Ndp, Party::Oth]
    }
}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_str())
    }
}

/// One real value per party: vote totals, percentages, or swings.
/// Serializes as `{"LIB": .., "PC": .., "NDP": .., "OTH": ..}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PartyTally {
    #[serde(rename = "LIB")] lib: f64,
    #[serde(rename = "PC")] pc: f64,
    #[serde(rename = "NDP")] ndp: f64,
    #[serde(rename = "OTH")] oth: f64,
}

impl PartyTally {
    /// Build a tally by evaluating `f` for every party.
    pub fn from_fn(f: impl Fn(Party) -> f64) -> Self {
        Self {
            lib: f(Party::Lib),
            pc: f(Party::Pc),
            ndp: f(Party::Ndp),
            oth: f(Party::Oth),
        }
    }

    /// Convenience constructor in `Party::order()` order.
    pub fn new(lib: f64, pc: f64, ndp: f64, oth: f64) -> Self {
        Self { lib, pc, ndp, oth }
    }

    #[inline] pub fn sum(&self) -> f64 { self.lib + self.pc + self.ndp + self.oth }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (Party, f64)> + '_ {
        Party::order().into_iter().map(|party| (party, self[party]))
    }

    /// Every value multiplied by `factor`.
    pub fn scaled(&self, factor: f64) -> Self {
        Self::from_fn(|party| self[party] * factor)
    }

    /// Add `other * weight` to every party in place.
    pub fn add_scaled(&mut self, other: &PartyTally, weight: f64) {
        for party in Party::order() {
            self[party] += other[party] * weight;
        }
    }
}

impl Index<Party> for PartyTally {
    type Output = f64;

    fn index(&self, party: Party) -> &f64 {
        match party {
            Party::Lib => &self.lib,
            Party::Pc => &self.pc,
            Party::Ndp => &self.ndp,
            Party::Oth => &self.oth,
        }
    }
}

impl IndexMut<Party> for PartyTally {
    fn index_mut(&mut self, party: Party) -> &mut f64 {
        match party {
            Party::Lib => &mut self.lib,
            Party::Pc => &mut self.pc,
            Party::Ndp => &mut self.ndp,
            Party::Oth => &mut self.oth,
        }
    }
}

impl Add for PartyTally {
    type Output = PartyTally;

    fn add(self, rhs: PartyTally) -> PartyTally {
        PartyTally::from_fn(|party| self[party] + rhs[party])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_round_trip() {
        for party in Party::order() {
            assert_eq!(Party::from_label(party.to_str()), Some(party));
        }
        assert_eq!(Party::from_label(" ndp "), Some(Party::Ndp));
        assert_eq!(Party::from_label("GRN"), None);
    }

    #[test]
    fn index_and_sum() {
        let mut tally = PartyTally::default();
        tally[Party::Pc] += 3.0;
        tally[Party::Oth] = 2.0;
        assert_eq!(tally[Party::Pc], 3.0);
        assert_eq!(tally[Party::Lib], 0.0);
        assert_eq!(tally.sum(), 5.0);
    }

    #[test]
    fn add_scaled_accumulates() {
        let mut tally = PartyTally::new(1.0, 1.0, 1.0, 1.0);
        tally.add_scaled(&PartyTally::new(10.0, 20.0, 30.0, 40.0), 0.5);
        assert_eq!(tally, PartyTally::new(6.0, 11.0, 16.0, 21.0));
    }

    #[test]
    fn serializes_with_party_keys() {
        let json = serde_json::to_value(PartyTally::new(1.0, 2.0, 3.0, 4.0)).unwrap();
        assert_eq!(json["LIB"], 1.0);
        assert_eq!(json["PC"], 2.0);
        assert_eq!(json["NDP"], 3.0);
        assert_eq!(json["OTH"], 4.0);
    }
}

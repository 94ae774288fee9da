use std::collections::{BTreeMap, BTreeSet};

use ahash::AHashMap;

use crate::types::{DistrictId, PartyTally, PollKey};

/// Reconciled vote counts of one source district, by poll.
pub type DistrictVotes = BTreeMap<PollKey, PartyTally>;

/// Polls of one source district marked as taking no votes.
pub type VoidedPolls = BTreeSet<PollKey>;

/// Outcome of looking up one poll.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PollVotes<'a> {
    Counted(&'a PartyTally),
    /// The sheet records the poll as taking no votes.
    Voided,
    /// Nothing is known about the poll.
    Missing,
}

/// Vote counts of one source election keyed by (district, poll, party).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VoteTable {
    districts: AHashMap<DistrictId, DistrictVotes>,
    voided: AHashMap<DistrictId, VoidedPolls>,
}

impl VoteTable {
    pub fn new() -> Self { Self::default() }

    /// Add (or replace) the reconciled votes of one district.
    pub fn insert(&mut self, district: DistrictId, votes: DistrictVotes) {
        self.districts.insert(district, votes);
    }

    /// Votes of `poll` in `district`, if any were recorded.
    pub fn get(&self, district: DistrictId, poll: PollKey) -> Option<&PartyTally> {
        self.districts.get(&district)?.get(&poll)
    }

    /// Record the voided polls of one district. Polls with counted votes are never treated as voided.
    pub fn insert_voided(&mut self, district: DistrictId, polls: VoidedPolls) {
        if !polls.is_empty() {
            self.voided.insert(district, polls);
        }
    }

    pub fn lookup(&self, district: DistrictId, poll: PollKey) -> PollVotes<'_> {
        if let Some(tally) = self.get(district, poll) {
            return PollVotes::Counted(tally);
        }
        match self.voided.get(&district) {
            Some(polls) if polls.contains(&poll) => PollVotes::Voided,
            _ => PollVotes::Missing,
        }
    }

    pub fn district(&self, district: DistrictId) -> Option<&DistrictVotes> {
        self.districts.get(&district)
    }

    #[inline] pub fn contains_district(&self, district: DistrictId) -> bool { self.districts.contains_key(&district) }

    /// District ids present in the table, sorted.
    pub fn district_ids(&self) -> Vec<DistrictId> {
        let mut ids: Vec<DistrictId> = self.districts.keys().copied().collect();
        ids.sort();
        ids
    }

    #[inline] pub fn len(&self) -> usize { self.districts.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.districts.is_empty() }

    /// Sum of every recorded tally.
    pub fn total(&self) -> PartyTally {
        self.districts.values()
            .flat_map(|votes| votes.values())
            .fold(PartyTally::default(), |acc, tally| acc + *tally)
    }
}

use std::fmt;

use serde::{Deserialize, Serialize};

/// Numeric electoral district identifier (`ED_ID` in the boundary files).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DistrictId(pub u32);

impl fmt::Display for DistrictId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Key of one row group in a district's vote table: a numbered poll, or the
/// synthetic advance-poll bucket that has no polling-location geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PollKey {
    Number(u32),
    Advance,
}

impl PollKey {
    pub const ADVANCE_LABEL: &'static str = "ADV";
}

impl fmt::Display for PollKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PollKey::Number(n) => write!(f, "{n}"),
            PollKey::Advance => f.write_str(Self::ADVANCE_LABEL),
        }
    }
}

/// One fine-grained polling location of a source election.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourcePoll {
    pub district: DistrictId,
    pub poll: u32,
}

impl SourcePoll {
    pub fn new(district: u32, poll: u32) -> Self {
        Self { district: DistrictId(district), poll }
    }

    /// Key of this poll in its district's vote table.
    #[inline] pub fn key(&self) -> PollKey { PollKey::Number(self.poll) }
}

impl fmt::Display for SourcePoll {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.district, self.poll)
    }
}

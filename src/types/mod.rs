mod ids;
mod party;

pub use ids::{DistrictId, PollKey, SourcePoll};
pub use party::{Party, PartyTally};

mod source;
mod target;
mod weights;

pub use source::{PollLocation, SourceDistrict};
pub use target::{TargetDistrict, TargetSet};
pub use weights::{assign_district_weights, assign_poll_weights, assign_weights, DistrictWeights, WeightTable};

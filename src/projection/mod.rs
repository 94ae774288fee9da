mod aggregate;
mod blend;
mod projection;

pub use aggregate::{aggregate, finalize, tally_district};
pub use blend::blend;
pub use projection::{ProjectedDistrict, Projection};

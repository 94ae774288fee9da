#![doc = "Ridingcast: projects historical poll-by-poll election results onto redrawn districts"]
pub mod config;
pub mod district;
pub mod error;
pub mod geom;
pub mod io;
pub mod pipeline;
pub mod projection;
pub mod results;
pub mod types;

#[doc(inline)]
pub use config::RunConfig;

#[doc(inline)]
pub use error::{Diagnostics, ProjectionError, ProjectionResult};

#[doc(inline)]
pub use pipeline::{blend_years, project_election, run, RunOptions, RunOutput, SourceElection, YearProjection};

#[doc(inline)]
pub use projection::{blend, ProjectedDistrict, Projection};

#[doc(inline)]
pub use types::{DistrictId, Party, PartyTally, PollKey, SourcePoll};

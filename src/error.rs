use thiserror::Error;

use crate::types::{DistrictId, PollKey};

/// Conditions raised by the overlay, reconciliation, aggregation and blending stages.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProjectionError {
    /// The source intersects target districts, but the intersections have zero total area.
    #[error("degenerate geometry for {record}: total intersection area is zero")]
    DegenerateGeometry { record: String },

    /// A weighted poll (or advance bucket) has no entry in the vote table.
    #[error("no vote data for district {district}, poll {poll}")]
    MissingVoteData { district: DistrictId, poll: PollKey },

    /// A target district ended up with no attributed votes at all.
    #[error("target district {district} has a zero vote sum")]
    ZeroVoteSum { district: DistrictId },

    /// A results row that is neither a normal, combined, nor void row.
    #[error("malformed row {row} in results for district {district}: {reason}")]
    MalformedRow { district: DistrictId, row: usize, reason: String },

    /// A district id is missing from one of the projections being blended.
    #[error("district {district} is missing from blended projection {projection}")]
    MissingDistrictInBlend { district: DistrictId, projection: usize },

    /// Source geometry and vote table disagree on the set of source districts.
    #[error("inconsistent source districts: {0}")]
    InconsistentDistricts(String),

    /// Two target districts share an id.
    #[error("duplicate target district id {0}")]
    DuplicateDistrict(DistrictId),

    /// Blend weights must be non-negative and sum to one.
    #[error("invalid blend weights: {0}")]
    InvalidBlendWeights(String),

    /// Too many per-record errors were reported during one run.
    #[error("{count} per-record errors exceed the configured limit of {limit}")]
    ErrorThresholdExceeded { count: usize, limit: usize },
}

pub type ProjectionResult<T> = Result<T, ProjectionError>;

/// Per-record problems reported during a run, plus counters for soft misses
/// that contributed zero without failing.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    errors: Vec<ProjectionError>,
    missing_votes: usize,
    unattributable: usize,
}

impl Diagnostics {
    pub fn new() -> Self { Self::default() }

    /// Record a per-record error.
    pub fn report(&mut self, error: ProjectionError) {
        log::warn!("[diagnostics] {error}");
        self.errors.push(error);
    }

    /// Record a vote table lookup that missed and contributed zero.
    pub fn note_missing_votes(&mut self, district: DistrictId, poll: PollKey) {
        log::debug!("[diagnostics] no vote data for district {district}, poll {poll}; contributing zero");
        self.missing_votes += 1;
    }

    /// Record a source geometry that intersects no target district.
    pub fn note_unattributable(&mut self, source: &str) {
        log::warn!("[diagnostics] {source} intersects no target district; its votes are dropped");
        self.unattributable += 1;
    }

    #[inline] pub fn errors(&self) -> &[ProjectionError] { &self.errors }
    #[inline] pub fn missing_votes(&self) -> usize { self.missing_votes }
    #[inline] pub fn unattributable(&self) -> usize { self.unattributable }
    #[inline] pub fn is_clean(&self) -> bool { self.errors.is_empty() }

    /// Fold another stage's diagnostics into this one.
    pub fn merge(&mut self, other: Diagnostics) {
        self.errors.extend(other.errors);
        self.missing_votes += other.missing_votes;
        self.unattributable += other.unattributable;
    }

    /// Fail once more errors have been reported than `limit` allows.
    pub fn check_threshold(&self, limit: usize) -> ProjectionResult<()> {
        if self.errors.len() > limit {
            return Err(ProjectionError::ErrorThresholdExceeded { count: self.errors.len(), limit });
        }
        Ok(())
    }
}

use geo::MultiPolygon;

use crate::{geom::HasGeometry, types::{DistrictId, SourcePoll}};

/// A district of a source (historical) generation. Used for advance-poll attribution.
#[derive(Debug, Clone)]
pub struct SourceDistrict {
    pub id: DistrictId,
    /// Display name, used to find the district's candidate roster.
    pub name: String,
    pub geometry: MultiPolygon<f64>,
}

/// A polling location of a source generation, with its geometry.
#[derive(Debug, Clone)]
pub struct PollLocation {
    pub poll: SourcePoll,
    pub geometry: MultiPolygon<f64>,
}

impl HasGeometry for SourceDistrict {
    #[inline] fn geometry(&self) -> &MultiPolygon<f64> { &self.geometry }
}

impl HasGeometry for PollLocation {
    #[inline] fn geometry(&self) -> &MultiPolygon<f64> { &self.geometry }
}

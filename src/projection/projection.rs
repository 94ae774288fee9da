use serde::{Deserialize, Serialize};

use crate::types::{DistrictId, PartyTally};

/// Final projected result of one target district. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectedDistrict {
    pub name: String,
    pub id: DistrictId,
    /// Attributed (fractional) vote totals.
    pub results: PartyTally,
    /// Vote shares in percent.
    pub percents: PartyTally,
    /// Vote share minus the baseline share, in percentage points.
    pub swings: PartyTally,
}

impl ProjectedDistrict {
    /// Name with the stray U+0097 dash of legacy boundary files replaced by `-`.
    pub fn display_name(&self) -> String {
        self.name.replace('\u{0097}', "-")
    }

    /// Copy with `display_name()` applied, ready for output.
    pub fn sanitized(&self) -> Self {
        Self { name: self.display_name(), ..self.clone() }
    }
}

/// Projected results for every target district, in target load order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Projection {
    districts: Vec<ProjectedDistrict>,
}

impl Projection {
    pub fn new(districts: Vec<ProjectedDistrict>) -> Self { Self { districts } }

    #[inline] pub fn districts(&self) -> &[ProjectedDistrict] { &self.districts }

    #[inline] pub fn len(&self) -> usize { self.districts.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.districts.is_empty() }

    pub fn get(&self, id: DistrictId) -> Option<&ProjectedDistrict> {
        self.districts.iter().find(|district| district.id == id)
    }

    /// Copy with every district name sanitized for display.
    pub fn sanitized(&self) -> Self {
        Self::new(self.districts.iter().map(ProjectedDistrict::sanitized).collect())
    }
}

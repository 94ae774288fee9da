use ahash::AHashMap;
use geo::MultiPolygon;

use crate::{
    error::{ProjectionError, ProjectionResult},
    geom::{overlay, HasGeometry, Overlap, SpatialIndex},
    types::DistrictId,
};

/// A district of the target (newer) generation.
#[derive(Debug, Clone)]
pub struct TargetDistrict {
    pub id: DistrictId,
    pub name: String,
    pub geometry: MultiPolygon<f64>,
}

impl HasGeometry for TargetDistrict {
    #[inline] fn geometry(&self) -> &MultiPolygon<f64> { &self.geometry }
}

/// The target generation: districts in load order, an id lookup, and their bounding-box index.
#[derive(Debug, Clone)]
pub struct TargetSet {
    districts: Vec<TargetDistrict>,
    by_id: AHashMap<DistrictId, usize>,
    index: SpatialIndex,
}

impl TargetSet {
    /// Index `districts`, rejecting duplicate ids.
    pub fn new(districts: Vec<TargetDistrict>) -> ProjectionResult<Self> {
        let mut by_id = AHashMap::with_capacity(districts.len());
        for (i, district) in districts.iter().enumerate() {
            if by_id.insert(district.id, i).is_some() {
                return Err(ProjectionError::DuplicateDistrict(district.id));
            }
        }

        Ok(Self { index: SpatialIndex::new(&districts), districts, by_id })
    }

    #[inline] pub fn len(&self) -> usize { self.districts.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.districts.is_empty() }

    #[inline] pub fn districts(&self) -> &[TargetDistrict] { &self.districts }

    /// Look up a district by id.
    pub fn get(&self, id: DistrictId) -> Option<&TargetDistrict> {
        self.by_id.get(&id).map(|&i| &self.districts[i])
    }

    /// Position of a district in load order.
    #[inline] pub fn position(&self, id: DistrictId) -> Option<usize> { self.by_id.get(&id).copied() }

    /// Intersection areas of `source` with each target district it intersects.
    /// `Overlap::target` is a position in `districts()`.
    pub fn overlay(&self, source: &MultiPolygon<f64>) -> Vec<Overlap> {
        overlay(source, &self.index, &self.districts)
    }

    /// Like `overlay`, but keyed by district id.
    pub fn overlay_ids(&self, source: &MultiPolygon<f64>) -> Vec<(DistrictId, f64)> {
        self.overlay(source).into_iter()
            .map(|overlap| (self.districts[overlap.target].id, overlap.area))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use geo::polygon;

    use super::*;

    fn district(id: u32, x0: f64, x1: f64) -> TargetDistrict {
        TargetDistrict {
            id: DistrictId(id),
            name: format!("District {id}"),
            geometry: MultiPolygon(vec![polygon![
                (x: x0, y: 0.0), (x: x1, y: 0.0), (x: x1, y: 1.0), (x: x0, y: 1.0), (x: x0, y: 0.0),
            ]]),
        }
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let result = TargetSet::new(vec![district(1, 0.0, 1.0), district(1, 1.0, 2.0)]);
        assert_eq!(result.err(), Some(ProjectionError::DuplicateDistrict(DistrictId(1))));
    }

    #[test]
    fn lookup_by_id() {
        let set = TargetSet::new(vec![district(7, 0.0, 1.0), district(3, 1.0, 2.0)]).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.get(DistrictId(3)).map(|d| d.name.as_str()), Some("District 3"));
        assert_eq!(set.position(DistrictId(7)), Some(0));
        assert!(set.get(DistrictId(99)).is_none());
    }

    #[test]
    fn overlay_reports_ids() {
        let set = TargetSet::new(vec![district(10, 0.0, 1.0), district(20, 1.0, 2.0)]).unwrap();
        let source = MultiPolygon(vec![polygon![
            (x: 0.5, y: 0.0), (x: 1.5, y: 0.0), (x: 1.5, y: 1.0), (x: 0.5, y: 1.0), (x: 0.5, y: 0.0),
        ]]);
        let mut hits = set.overlay_ids(&source);
        hits.sort_by_key(|(id, _)| *id);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].0, DistrictId(10));
        assert!((hits[0].1 - 0.5).abs() < 1e-9);
        assert!((hits[1].1 - 0.5).abs() < 1e-9);
    }
}

use geo::{Area, BooleanOps, BoundingRect, Intersects, MultiPolygon};

use crate::error::{ProjectionError, ProjectionResult};
use super::{HasGeometry, SpatialIndex};

/// Intersection of one source geometry with one target geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Overlap {
    pub target: usize,
    pub area: f64,
}

/// Normalized share of a source geometry falling in one target geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Weight {
    pub target: usize,
    pub weight: f64,
}

/// Compute the exact intersection area of `source` with every target that intersects it.
///
/// Bounding-box candidates come from `index`; a candidate is kept iff the exact
/// intersects test passes, so a boundary touch is retained with zero area.
/// Returns an empty list when `source` intersects nothing.
pub fn overlay<T: HasGeometry>(source: &MultiPolygon<f64>, index: &SpatialIndex, targets: &[T]) -> Vec<Overlap> {
    let Some(bbox) = source.bounding_rect() else { return Vec::new() };

    index.query(&bbox).into_iter()
        .filter_map(|target| {
            let shape = targets.get(target)?.geometry();
            source.intersects(shape)
                .then(|| Overlap { target, area: source.intersection(shape).unsigned_area() })
        })
        .collect()
}

/// Turn overlaps into weights `area / Σ area`, which sum to 1.
///
/// `record` names the source in the error raised when the overlaps exist but
/// their total area is zero. An empty overlap list yields no weights.
pub fn normalize(overlaps: &[Overlap], record: impl FnOnce() -> String) -> ProjectionResult<Vec<Weight>> {
    if overlaps.is_empty() { return Ok(Vec::new()) }

    let total: f64 = overlaps.iter().map(|overlap| overlap.area).sum();
    if !(total > 0.0) || !total.is_finite() {
        return Err(ProjectionError::DegenerateGeometry { record: record() });
    }

    Ok(overlaps.iter()
        .map(|overlap| Weight { target: overlap.target, weight: overlap.area / total })
        .collect())
}

use geo::{BoundingRect, MultiPolygon, Rect};
use rstar::{RTree, RTreeObject, AABB};

/// Anything carrying an areal geometry that can be indexed and overlaid.
pub trait HasGeometry {
    fn geometry(&self) -> &MultiPolygon<f64>;
}

impl HasGeometry for MultiPolygon<f64> {
    #[inline] fn geometry(&self) -> &MultiPolygon<f64> { self }
}

/// A bounding box in the R-tree, tied to a geometry by its position in the indexed slice.
#[derive(Debug, Clone)]
pub(crate) struct IndexedBox {
    idx: usize,
    bbox: Rect<f64>,
}

impl IndexedBox {
    #[inline] pub(crate) fn idx(&self) -> usize { self.idx }
}

impl RTreeObject for IndexedBox {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(self.bbox.min().into(), self.bbox.max().into())
    }
}

/// Bounding-box index over a fixed slice of target geometries.
///
/// Queries return a superset of the geometries that truly intersect the query:
/// false positives are possible, false negatives are not.
#[derive(Debug, Clone)]
pub struct SpatialIndex {
    rtree: RTree<IndexedBox>,
    len: usize,
}

impl SpatialIndex {
    /// Bulk-load an index over `shapes`. Empty shapes have no bounding box and are never returned.
    pub fn new<T: HasGeometry>(shapes: &[T]) -> Self {
        Self {
            rtree: RTree::bulk_load(
                shapes.iter().enumerate()
                    .filter_map(|(idx, shape)| shape.geometry().bounding_rect().map(|bbox| IndexedBox { idx, bbox }))
                    .collect()
            ),
            len: shapes.len(),
        }
    }

    /// Number of geometries the index was built over.
    #[inline] pub fn len(&self) -> usize { self.len }

    #[inline] pub fn is_empty(&self) -> bool { self.len == 0 }

    /// Positions of all indexed geometries whose bounding box overlaps `bbox`, in no particular order.
    pub fn query(&self, bbox: &Rect<f64>) -> Vec<usize> {
        let envelope = AABB::from_corners(bbox.min().into(), bbox.max().into());
        self.rtree
            .locate_in_envelope_intersecting(&envelope)
            .map(IndexedBox::idx)
            .collect()
    }
}

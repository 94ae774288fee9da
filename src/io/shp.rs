//! Shapefile reading for district and polling-location boundaries.

use std::path::Path;

use anyhow::{bail, Context, Result};
use geo::MultiPolygon;
use shapefile::{dbase::{FieldValue, Record}, Reader, Shape};

use crate::{
    district::{PollLocation, SourceDistrict, TargetDistrict},
    types::{DistrictId, SourcePoll},
};

/// Convert a shapefile polygon into a multipolygon.
///
/// Shapefiles store rings flat: each clockwise outer ring is followed by its
/// counter-clockwise holes.
fn polygon_to_geo(polygon: &shapefile::Polygon) -> MultiPolygon<f64> {
    fn signed_area(coords: &[geo::Coord<f64>]) -> f64 {
        coords.windows(2).map(|w| w[0].x * w[1].y - w[1].x * w[0].y).sum::<f64>() / 2.0
    }

    let mut polygons = Vec::new();
    let mut exterior: Option<geo::LineString<f64>> = None;
    let mut holes = Vec::new();

    for ring in polygon.rings() {
        let mut coords: Vec<geo::Coord<f64>> = ring.points().iter().map(|pt| geo::Coord { x: pt.x, y: pt.y }).collect();
        if coords.first() != coords.last() {
            if let Some(&first) = coords.first() { coords.push(first) }
        }

        if signed_area(&coords) < 0.0 {
            if let Some(outer) = exterior.take() {
                polygons.push(geo::Polygon::new(outer, std::mem::take(&mut holes)));
            }
            exterior = Some(geo::LineString(coords));
        } else {
            holes.push(geo::LineString(coords));
        }
    }
    if let Some(outer) = exterior {
        polygons.push(geo::Polygon::new(outer, holes));
    }

    MultiPolygon(polygons)
}

/// Coerce a generic shape into an owned multipolygon, raising error if different shape.
fn shape_to_multipolygon(shape: Shape) -> Result<MultiPolygon<f64>> {
    match shape {
        Shape::Polygon(polygon) => Ok(polygon_to_geo(&polygon)),
        other => bail!("[io::shp] found non-Polygon shape: {:?}", other.shapetype()),
    }
}

/// Get the value of a character field from a Record.
fn get_character_field(record: &Record, field: &str) -> Result<String> {
    match record.get(field) {
        Some(FieldValue::Character(Some(s))) => Ok(s.trim().to_string()),
        _ => bail!("[io::shp] missing or invalid character field: {}", field),
    }
}

/// Get a non-negative integer field, accepting any numeric dBase type or digits stored as text.
fn get_integer_field(record: &Record, field: &str) -> Result<u32> {
    let value = match record.get(field) {
        Some(FieldValue::Numeric(Some(n))) => *n,
        Some(FieldValue::Double(n)) => *n,
        Some(FieldValue::Float(Some(n))) => f64::from(*n),
        Some(FieldValue::Integer(n)) => f64::from(*n),
        Some(FieldValue::Character(Some(s))) => s.trim().parse::<f64>()
            .with_context(|| format!("[io::shp] field {field} is not numeric: {s:?}"))?,
        _ => bail!("[io::shp] missing or invalid numeric field: {}", field),
    };
    if !(value >= 0.0 && value.fract() == 0.0 && value <= f64::from(u32::MAX)) {
        bail!("[io::shp] field {field} is not a non-negative integer: {value}");
    }
    Ok(value as u32)
}

/// Reads all polygons + attribute records from a given `.shp` file path.
pub(crate) fn read_shapefile(path: &Path) -> Result<Vec<(MultiPolygon<f64>, Record)>> {
    let mut reader = Reader::from_path(path)
        .with_context(|| format!("[io::shp] Failed to open shapefile: {}", path.display()))?;

    let mut items = Vec::with_capacity(reader.shape_count()?);
    for result in reader.iter_shapes_and_records() {
        let (shape, record) = result.context("[io::shp] Error reading shape+record")?;
        items.push((shape_to_multipolygon(shape)?, record));
    }
    Ok(items)
}

/// Load the target generation's districts.
pub fn read_target_districts(path: &Path, id_field: &str, name_field: &str) -> Result<Vec<TargetDistrict>> {
    read_shapefile(path)?.into_iter()
        .map(|(geometry, record)| Ok(TargetDistrict {
            id: DistrictId(get_integer_field(&record, id_field)?),
            name: get_character_field(&record, name_field)?,
            geometry,
        }))
        .collect::<Result<Vec<_>>>()
        .with_context(|| format!("[io::shp] Failed to read districts from {}", path.display()))
}

/// Load a source generation's districts.
pub fn read_source_districts(path: &Path, id_field: &str, name_field: &str) -> Result<Vec<SourceDistrict>> {
    read_shapefile(path)?.into_iter()
        .map(|(geometry, record)| Ok(SourceDistrict {
            id: DistrictId(get_integer_field(&record, id_field)?),
            name: get_character_field(&record, name_field)?,
            geometry,
        }))
        .collect::<Result<Vec<_>>>()
        .with_context(|| format!("[io::shp] Failed to read districts from {}", path.display()))
}

/// Load a source generation's polling locations.
pub fn read_poll_locations(path: &Path, district_field: &str, poll_field: &str) -> Result<Vec<PollLocation>> {
    read_shapefile(path)?.into_iter()
        .map(|(geometry, record)| Ok(PollLocation {
            poll: SourcePoll::new(get_integer_field(&record, district_field)?, get_integer_field(&record, poll_field)?),
            geometry,
        }))
        .collect::<Result<Vec<_>>>()
        .with_context(|| format!("[io::shp] Failed to read polls from {}", path.display()))
}

#[cfg(test)]
mod tests {
    use geo::Area;
    use shapefile::{Point, PolygonRing};

    use super::*;

    fn ring(points: &[(f64, f64)]) -> Vec<Point> {
        points.iter().map(|&(x, y)| Point { x, y }).collect()
    }

    #[test]
    fn outer_ring_with_hole() {
        let polygon = shapefile::Polygon::with_rings(vec![
            PolygonRing::Outer(ring(&[(0.0, 0.0), (0.0, 4.0), (4.0, 4.0), (4.0, 0.0), (0.0, 0.0)])),
            PolygonRing::Inner(ring(&[(1.0, 1.0), (2.0, 1.0), (2.0, 2.0), (1.0, 2.0), (1.0, 1.0)])),
        ]);
        let multi = polygon_to_geo(&polygon);
        assert_eq!(multi.0.len(), 1);
        assert_eq!(multi.0[0].interiors().len(), 1);
        assert!((multi.unsigned_area() - 15.0).abs() < 1e-9);
    }

    #[test]
    fn two_outer_rings_make_two_polygons() {
        let polygon = shapefile::Polygon::with_rings(vec![
            PolygonRing::Outer(ring(&[(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0), (0.0, 0.0)])),
            PolygonRing::Outer(ring(&[(5.0, 5.0), (5.0, 6.0), (6.0, 6.0), (6.0, 5.0), (5.0, 5.0)])),
        ]);
        let multi = polygon_to_geo(&polygon);
        assert_eq!(multi.0.len(), 2);
        assert!((multi.unsigned_area() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn integer_fields_accept_numeric_and_text() {
        let mut record = Record::default();
        record.insert("ED_ID".into(), FieldValue::Numeric(Some(52.0)));
        record.insert("POLL".into(), FieldValue::Character(Some(" 7 ".into())));
        record.insert("BAD".into(), FieldValue::Numeric(Some(-1.0)));
        assert_eq!(get_integer_field(&record, "ED_ID").unwrap(), 52);
        assert_eq!(get_integer_field(&record, "POLL").unwrap(), 7);
        assert!(get_integer_field(&record, "BAD").is_err());
        assert!(get_integer_field(&record, "MISSING").is_err());
    }
}

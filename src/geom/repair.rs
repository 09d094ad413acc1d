use geo::{
    BooleanOps, Coord, Geometry, GeometryCollection, LineString, MultiLineString, MultiPoint,
    MultiPolygon, Point, Polygon, Validation,
};

/// Outcome of a repair: the repaired geometry, if anything survived, and whether it is valid.
/// The default (nothing, invalid) stands for a feature without geometry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Repaired {
    pub geometry: Option<Geometry<f64>>,
    pub valid: bool,
}

/// Repairs or normalises a single geometry.
pub trait GeometryValidator {
    fn repair(&self, geometry: &Geometry<f64>) -> Repaired;
}

/// Removes repeated and non-finite vertices, closes rings, drops degenerate
/// parts, and rebuilds polygons that are still invalid by overlaying them
/// with nothing (which resolves self-intersections).
#[derive(Debug, Clone, Copy, Default)]
pub struct TopologyRepair;

impl GeometryValidator for TopologyRepair {
    fn repair(&self, geometry: &Geometry<f64>) -> Repaired {
        let Some(cleaned) = clean(geometry) else {
            return Repaired { geometry: None, valid: false };
        };
        if cleaned.is_valid() {
            return Repaired { geometry: Some(cleaned), valid: true };
        }

        let rebuilt = match cleaned {
            Geometry::Polygon(polygon) => rebuild(MultiPolygon::new(vec![polygon])),
            Geometry::MultiPolygon(multi) => rebuild(multi),
            other => Some(other),
        };
        let valid = rebuilt.as_ref().is_some_and(|g| g.is_valid());
        Repaired { geometry: rebuilt, valid }
    }
}

fn rebuild(multi: MultiPolygon<f64>) -> Option<Geometry<f64>> {
    let mut resolved = multi.union(&MultiPolygon::new(Vec::new()));
    match resolved.0.len() {
        0 => None,
        1 => resolved.0.pop().map(Geometry::Polygon),
        _ => Some(Geometry::MultiPolygon(resolved)),
    }
}

#[inline]
fn is_finite(coord: &Coord<f64>) -> bool {
    coord.x.is_finite() && coord.y.is_finite()
}

/// Finite coordinates with consecutive repeats removed.
fn clean_coords(line: &LineString<f64>) -> Vec<Coord<f64>> {
    let mut coords: Vec<Coord<f64>> = line.0.iter().copied().filter(is_finite).collect();
    coords.dedup();
    coords
}

fn clean_line(line: &LineString<f64>) -> Option<LineString<f64>> {
    let coords = clean_coords(line);
    (coords.len() >= 2).then(|| LineString::new(coords))
}

/// A closed ring with at least three distinct vertices.
fn clean_ring(ring: &LineString<f64>) -> Option<LineString<f64>> {
    let mut coords = clean_coords(ring);
    if coords.len() > 1 && coords.first() == coords.last() { coords.pop(); }
    if coords.len() < 3 { return None }
    coords.push(coords[0]);
    Some(LineString::new(coords))
}

fn clean_polygon(polygon: &Polygon<f64>) -> Option<Polygon<f64>> {
    let exterior = clean_ring(polygon.exterior())?;
    let interiors = polygon.interiors().iter().filter_map(clean_ring).collect();
    Some(Polygon::new(exterior, interiors))
}

fn clean(geometry: &Geometry<f64>) -> Option<Geometry<f64>> {
    match geometry {
        Geometry::Point(point) => is_finite(&point.0).then_some(Geometry::Point(*point)),
        Geometry::MultiPoint(multi) => {
            let points: Vec<Point<f64>> = multi.iter().copied().filter(|p| is_finite(&p.0)).collect();
            (!points.is_empty()).then(|| Geometry::MultiPoint(MultiPoint::new(points)))
        }
        Geometry::Line(line) => clean_line(&LineString::from(*line)).map(Geometry::LineString),
        Geometry::LineString(line) => clean_line(line).map(Geometry::LineString),
        Geometry::MultiLineString(multi) => {
            let lines: Vec<_> = multi.iter().filter_map(clean_line).collect();
            (!lines.is_empty()).then(|| Geometry::MultiLineString(MultiLineString::new(lines)))
        }
        Geometry::Polygon(polygon) => clean_polygon(polygon).map(Geometry::Polygon),
        Geometry::MultiPolygon(multi) => {
            let polygons: Vec<_> = multi.iter().filter_map(clean_polygon).collect();
            (!polygons.is_empty()).then(|| Geometry::MultiPolygon(MultiPolygon::new(polygons)))
        }
        Geometry::Rect(rect) => clean_polygon(&rect.to_polygon()).map(Geometry::Polygon),
        Geometry::Triangle(triangle) => clean_polygon(&triangle.to_polygon()).map(Geometry::Polygon),
        Geometry::GeometryCollection(collection) => {
            let members: Vec<_> = collection.iter().filter_map(clean).collect();
            (!members.is_empty()).then(|| Geometry::GeometryCollection(GeometryCollection::new_from(members)))
        }
    }
}

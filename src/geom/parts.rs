use geo::Geometry;

/// True for multi-geometries and collections, whatever their number of parts.
pub fn is_multipart(geometry: &Geometry<f64>) -> bool {
    matches!(
        geometry,
        Geometry::MultiPoint(_)
            | Geometry::MultiLineString(_)
            | Geometry::MultiPolygon(_)
            | Geometry::GeometryCollection(_)
    )
}

/// Decompose a geometry into its single-part constituents.
/// Nested collections are flattened; a single-part geometry yields itself.
pub fn single_parts(geometry: &Geometry<f64>) -> Vec<Geometry<f64>> {
    let mut parts = Vec::new();
    collect_parts(geometry, &mut parts);
    parts
}

fn collect_parts(geometry: &Geometry<f64>, parts: &mut Vec<Geometry<f64>>) {
    match geometry {
        Geometry::MultiPoint(mp) => parts.extend(mp.iter().copied().map(Geometry::Point)),
        Geometry::MultiLineString(mls) => parts.extend(mls.iter().cloned().map(Geometry::LineString)),
        Geometry::MultiPolygon(mp) => parts.extend(mp.iter().cloned().map(Geometry::Polygon)),
        Geometry::GeometryCollection(collection) => {
            for member in collection.iter() { collect_parts(member, parts) }
        }
        single => parts.push(single.clone()),
    }
}

#[cfg(test)]
mod tests {
    use geo::{line_string, point, polygon, GeometryCollection, MultiLineString, MultiPolygon};

    use super::*;

    #[test]
    fn single_part_yields_itself() {
        let pt: Geometry<f64> = point!(x: 1.0, y: 2.0).into();
        assert!(!is_multipart(&pt));
        assert_eq!(single_parts(&pt), vec![pt]);
    }

    #[test]
    fn multi_polygon_splits_into_polygons() {
        let a = polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0)];
        let b = polygon![(x: 5.0, y: 5.0), (x: 6.0, y: 5.0), (x: 6.0, y: 6.0)];
        let multi: Geometry<f64> = MultiPolygon::new(vec![a.clone(), b.clone()]).into();
        assert!(is_multipart(&multi));
        assert_eq!(single_parts(&multi), vec![Geometry::Polygon(a), Geometry::Polygon(b)]);
    }

    #[test]
    fn nested_collections_are_flattened() {
        let line = line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 1.0)];
        let inner = Geometry::MultiLineString(MultiLineString::new(vec![line.clone(), line.clone()]));
        let outer: Geometry<f64> = Geometry::GeometryCollection(GeometryCollection::new_from(vec![
            inner,
            Geometry::Point(point!(x: 3.0, y: 3.0)),
        ]));
        assert_eq!(single_parts(&outer).len(), 3);
    }
}

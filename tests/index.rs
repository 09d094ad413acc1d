// Integration tests for the spatial index:
//   envelope and nearest-neighbour queries, and refusal to answer for edited layers.

use geo::{point, polygon, Geometry, Rect};
use riskvector::{build_spatial_index, create_layer, Crs, Error, FeatureId, GeometryFamily, Layer, SpatialIndex};

/// A row of unit squares at x = 0, 2, 4, ... plus one feature without geometry.
fn squares(count: usize) -> Layer {
    let mut layer = create_layer("squares", GeometryFamily::Polygon, Some(&Crs::wgs84()), &[]).unwrap();
    let mut session = layer.start_editing();
    for i in 0..count {
        let x = 2.0 * i as f64;
        let square: Geometry<f64> = polygon![(x: x, y: 0.0), (x: x + 1.0, y: 0.0), (x: x + 1.0, y: 1.0), (x: x, y: 1.0)].into();
        session.add_feature(Some(square), vec![]);
    }
    session.add_feature(None, vec![]);
    session.commit().unwrap();
    layer
}

#[test]
fn features_without_geometry_are_not_indexed() {
    let layer = squares(4);
    let index = build_spatial_index(&layer);
    assert_eq!(layer.feature_count(), 5);
    assert_eq!(index.len(), 4);
    assert!(index.is_current(&layer));
}

#[test]
fn finds_features_intersecting_a_rectangle() {
    let layer = squares(6);
    let index = build_spatial_index(&layer);

    let hits = index.intersecting(&layer, Rect::new((1.5, 0.5), (6.5, 2.0))).unwrap();
    assert_eq!(hits, vec![FeatureId(1), FeatureId(2), FeatureId(3)]);

    let none = index.intersecting(&layer, Rect::new((0.0, 5.0), (10.0, 6.0))).unwrap();
    assert!(none.is_empty());
}

#[test]
fn finds_nearest_features_in_order() {
    let layer = squares(6);
    let index = build_spatial_index(&layer);

    let nearest = index.nearest(&layer, point!(x: 6.4, y: 0.5), 3).unwrap();
    assert_eq!(nearest[0], FeatureId(3));
    assert_eq!(nearest[1], FeatureId(2));
    assert_eq!(nearest.len(), 3);
}

#[test]
fn index_goes_stale_after_an_edit() {
    let mut layer = squares(3);
    let index = build_spatial_index(&layer);
    let built = layer.revision();

    let mut session = layer.start_editing();
    session.add_feature(Some(point!(x: 0.5, y: 0.5).into()), vec![]);
    // A point in a polygon layer fails the commit, leaving the revision alone.
    assert!(session.commit().is_err());
    assert!(index.is_current(&layer));

    let mut session = layer.start_editing();
    session.add_feature(None, vec![]);
    session.commit().unwrap();

    assert!(!index.is_current(&layer));
    let err = index.intersecting(&layer, Rect::new((0.0, 0.0), (1.0, 1.0))).unwrap_err();
    assert!(matches!(err, Error::StaleIndex { built: b, current, .. } if b == built && current == built + 1));

    let rebuilt = SpatialIndex::build(&layer);
    assert_eq!(rebuilt.intersecting(&layer, Rect::new((0.0, 0.0), (1.0, 1.0))).unwrap(), vec![FeatureId(0)]);
}

#[test]
fn index_refuses_another_layer() {
    let layer = squares(3);
    let other = squares(3);
    let index = build_spatial_index(&layer);

    assert!(!index.is_current(&other));
    assert!(matches!(index.nearest(&other, point!(x: 0.0, y: 0.0), 1), Err(Error::StaleIndex { .. })));
}

#[test]
fn index_of_a_clone_is_not_current_for_the_original() {
    let mut original = create_layer("points", GeometryFamily::Point, None, &[]).unwrap();
    let mut copy = original.clone();
    assert_ne!(copy.id(), original.id());

    let mut session = copy.start_editing();
    session.add_feature(Some(point!(x: 100.0, y: 100.0).into()), vec![]);
    session.commit().unwrap();
    let index = build_spatial_index(&copy);

    let mut session = original.start_editing();
    session.add_feature(Some(point!(x: 0.0, y: 0.0).into()), vec![]);
    session.commit().unwrap();
    assert_eq!(original.revision(), copy.revision());

    assert!(index.is_current(&copy));
    assert!(!index.is_current(&original));
    let around = Rect::new((99.0, 99.0), (101.0, 101.0));
    assert!(matches!(index.intersecting(&original, around), Err(Error::StaleIndex { .. })));
    assert_eq!(index.intersecting(&copy, around).unwrap(), vec![FeatureId(0)]);
}

#[test]
fn empty_layer_builds_empty_index() {
    let layer = create_layer("empty", GeometryFamily::Line, None, &[]).unwrap();
    let index = build_spatial_index(&layer);
    assert!(index.is_empty());
    assert!(index.nearest(&layer, point!(x: 0.0, y: 0.0), 5).unwrap().is_empty());
}

use std::{fmt, str::FromStr};

use geo::Geometry;

use crate::error::Error;

/// The geometry family shared by every feature of a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeometryFamily {
    Point,
    Line,
    Polygon,
    NoGeometry, // Attribute-only table
}

/// Concrete shape kinds, including the 2.5D variants some providers report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Point,
    MultiPoint,
    Point25D,
    MultiPoint25D,
    LineString,
    MultiLineString,
    LineString25D,
    MultiLineString25D,
    Polygon,
    MultiPolygon,
    Polygon25D,
    MultiPolygon25D,
}

impl GeometryFamily {
    pub const ALL: [GeometryFamily; 4] = [
        GeometryFamily::Point,
        GeometryFamily::Line,
        GeometryFamily::Polygon,
        GeometryFamily::NoGeometry,
    ];

    pub fn to_str(&self) -> &'static str {
        match self {
            GeometryFamily::Point => "Point",
            GeometryFamily::Line => "LineString",
            GeometryFamily::Polygon => "Polygon",
            GeometryFamily::NoGeometry => "none",
        }
    }

    /// Group a concrete shape kind into its family.
    pub fn of_kind(kind: ShapeKind) -> Self {
        use ShapeKind::*;
        match kind {
            Point | MultiPoint | Point25D | MultiPoint25D => GeometryFamily::Point,
            LineString | MultiLineString | LineString25D | MultiLineString25D => GeometryFamily::Line,
            Polygon | MultiPolygon | Polygon25D | MultiPolygon25D => GeometryFamily::Polygon,
        }
    }

    /// The family of a geometry value, or `None` for a mixed or empty collection.
    pub fn of_geometry(geometry: &Geometry<f64>) -> Option<Self> {
        match geometry {
            Geometry::Point(_) | Geometry::MultiPoint(_) => Some(GeometryFamily::Point),
            Geometry::Line(_) | Geometry::LineString(_) | Geometry::MultiLineString(_) => Some(GeometryFamily::Line),
            Geometry::Polygon(_) | Geometry::MultiPolygon(_)
                | Geometry::Rect(_) | Geometry::Triangle(_) => Some(GeometryFamily::Polygon),
            Geometry::GeometryCollection(collection) => {
                let mut families = collection.iter().map(Self::of_geometry);
                let first = families.next()??;
                families.all(|family| family == Some(first)).then_some(first)
            }
        }
    }

    /// True if a geometry may be stored in a layer of this family.
    pub fn admits(&self, geometry: &Geometry<f64>) -> bool {
        match self {
            GeometryFamily::NoGeometry => false,
            family => match Self::of_geometry(geometry) {
                Some(other) => other == *family,
                // An empty collection carries no shape at all.
                None => matches!(geometry, Geometry::GeometryCollection(c) if c.0.is_empty()),
            },
        }
    }
}

impl fmt::Display for GeometryFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_str())
    }
}

impl FromStr for GeometryFamily {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "point" | "multipoint" => Ok(GeometryFamily::Point),
            "line" | "linestring" | "multilinestring" => Ok(GeometryFamily::Line),
            "polygon" | "multipolygon" => Ok(GeometryFamily::Polygon),
            "none" | "nogeometry" => Ok(GeometryFamily::NoGeometry),
            _ => Err(Error::UnsupportedGeometry(s.to_string())),
        }
    }
}

impl FromStr for ShapeKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        use ShapeKind::*;
        Ok(match s {
            "Point" => Point,
            "MultiPoint" => MultiPoint,
            "Point25D" => Point25D,
            "MultiPoint25D" => MultiPoint25D,
            "LineString" => LineString,
            "MultiLineString" => MultiLineString,
            "LineString25D" => LineString25D,
            "MultiLineString25D" => MultiLineString25D,
            "Polygon" => Polygon,
            "MultiPolygon" => MultiPolygon,
            "Polygon25D" => Polygon25D,
            "MultiPolygon25D" => MultiPolygon25D,
            _ => return Err(Error::UnsupportedGeometry(s.to_string())),
        })
    }
}

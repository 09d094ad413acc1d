use geo::{Coord, GeodesicArea, Geometry, LineString, MapCoords};
use geographiclib_rs::{Geodesic, InverseGeodesic};
use proj4rs::{proj::Proj as Proj4, transform::transform};

use crate::error::{Error, Result};
use crate::types::Crs;

const WGS84_LONLAT: &str = "+proj=longlat +datum=WGS84 +no_defs +type=crs";

/// Raw length and area on a curved-earth model.
///
/// Results may be non-finite for degenerate input; callers decide what to do with them.
pub trait EllipsoidalMeasure: Send + Sync {
    /// Length in metres. Zero for points and polygons.
    fn measure_length(&self, geometry: &Geometry<f64>) -> f64;

    /// Area in square metres. Zero for points and lines.
    fn measure_area(&self, geometry: &Geometry<f64>) -> f64;
}

/// Geodesic measurement on the WGS84 ellipsoid.
///
/// Coordinates in any other CRS are first transformed to WGS84 lon/lat.
pub struct Wgs84Ellipsoid {
    geodesic: Geodesic,
    reprojection: Option<(Proj4, Proj4, bool)>, // (source, WGS84 lon/lat, source is geographic)
}

impl std::fmt::Debug for Wgs84Ellipsoid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wgs84Ellipsoid")
            .field("reprojects", &self.reprojection.is_some())
            .finish()
    }
}

impl Wgs84Ellipsoid {
    pub fn new(crs: &Crs) -> Result<Self> {
        let reprojection = if crs.proj4() == WGS84_LONLAT {
            None
        } else {
            let from = Proj4::from_proj_string(crs.proj4())
                .map_err(|e| Error::Projection(format!("failed to build source PROJ.4 '{}': {e}", crs.proj4())))?;
            let to = Proj4::from_proj_string(WGS84_LONLAT)
                .map_err(|e| Error::Projection(format!("failed to build target PROJ.4 '{WGS84_LONLAT}': {e}")))?;
            Some((from, to, crs.is_geographic()))
        };
        Ok(Self { geodesic: Geodesic::wgs84(), reprojection })
    }

    /// Coordinates as WGS84 lon/lat degrees. Points that fail to transform become NaN.
    fn to_lonlat(&self, geometry: &Geometry<f64>) -> Geometry<f64> {
        let Some((from, to, geographic)) = &self.reprojection else { return geometry.clone() };
        geometry.map_coords(|coord: Coord<f64>| {
            let mut point = if *geographic {
                (coord.x.to_radians(), coord.y.to_radians(), 0.0)
            } else {
                (coord.x, coord.y, 0.0)
            };
            match transform(from, to, &mut point) {
                Ok(()) => Coord { x: point.0.to_degrees(), y: point.1.to_degrees() },
                Err(_) => Coord { x: f64::NAN, y: f64::NAN },
            }
        })
    }

    fn line_length(&self, line: &LineString<f64>) -> f64 {
        line.lines()
            .map(|segment| {
                let s12: f64 = self.geodesic.inverse(segment.start.y, segment.start.x, segment.end.y, segment.end.x);
                s12
            })
            .sum()
    }

    fn length(&self, geometry: &Geometry<f64>) -> f64 {
        match geometry {
            Geometry::Line(line) => self.line_length(&LineString::from(*line)),
            Geometry::LineString(line) => self.line_length(line),
            Geometry::MultiLineString(multi) => multi.iter().map(|line| self.line_length(line)).sum(),
            Geometry::GeometryCollection(collection) => collection.iter().map(|g| self.length(g)).sum(),
            _ => 0.0,
        }
    }
}

impl EllipsoidalMeasure for Wgs84Ellipsoid {
    fn measure_length(&self, geometry: &Geometry<f64>) -> f64 {
        self.length(&self.to_lonlat(geometry))
    }

    fn measure_area(&self, geometry: &Geometry<f64>) -> f64 {
        match geometry {
            Geometry::Polygon(_) | Geometry::MultiPolygon(_) | Geometry::Rect(_)
                | Geometry::Triangle(_) | Geometry::GeometryCollection(_) => {
                self.to_lonlat(geometry).geodesic_area_unsigned()
            }
            _ => 0.0,
        }
    }
}

mod ellipsoid;

use std::sync::Arc;

use geo::{Geometry, Validation};
use geozero::ToWkt;
use tracing::{debug, info, warn};

use crate::definitions::DefinitionLookup;
use crate::error::{Error, Result};
use crate::geom::{is_multipart, single_parts};
use crate::types::{Crs, GeometryFamily};
use crate::units::{AreaUnit, LengthUnit, UnitConverter, UnitTable, UNIT_METRES, UNIT_SQUARE_METRES};

pub use ellipsoid::{EllipsoidalMeasure, Wgs84Ellipsoid};

/// Which size a calculator measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Measure {
    Length,
    Area,
}

impl Measure {
    /// Lines are measured by length; everything else by area.
    pub fn for_family(family: GeometryFamily) -> Self {
        match family {
            GeometryFamily::Line => Measure::Length,
            _ => Measure::Area,
        }
    }

    /// Unit key the raw measurement comes out in.
    pub fn default_unit(&self) -> &'static str {
        match self {
            Measure::Length => UNIT_METRES,
            Measure::Area => UNIT_SQUARE_METRES,
        }
    }
}

/// Result of measuring one geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    /// Size in the calculator's output unit.
    pub size: f64,
    /// Parts whose raw measurement was not finite and that contributed zero.
    pub skipped_parts: usize,
}

/// Measures the length or area of geometries on the WGS84 ellipsoid, in a fixed output unit.
///
/// Multi-part geometries are measured part by part, since the ellipsoidal routine is
/// not reliable on whole multi-part inputs. Non-finite parts count as zero and are
/// logged. The configuration is fixed at construction and `measure` takes `&self`,
/// so one calculator may serve concurrent callers.
pub struct SizeCalculator {
    crs: Crs,
    measure: Measure,
    output_unit: Option<String>,
    ellipsoid: Box<dyn EllipsoidalMeasure>,
    converter: Arc<dyn UnitConverter>,
}

impl std::fmt::Debug for SizeCalculator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SizeCalculator")
            .field("crs", &self.crs)
            .field("measure", &self.measure)
            .field("output_unit", &self.output_unit)
            .finish_non_exhaustive()
    }
}

impl SizeCalculator {
    /// A calculator reporting in its natural unit (metres or square metres).
    pub fn new(crs: &Crs, family: GeometryFamily) -> Result<Self> {
        let measure = Measure::for_family(family);
        match measure {
            Measure::Length => {
                let unit = LengthUnit::from_code(0);
                info!(key = ?unit.key(), "The size calculator is set to use {unit}");
            }
            Measure::Area => {
                let unit = AreaUnit::from_code(0);
                info!(key = ?unit.key(), "The size calculator is set to use {unit}");
            }
        }

        Ok(Self {
            crs: crs.clone(),
            measure,
            output_unit: None,
            ellipsoid: Box::new(Wgs84Ellipsoid::new(crs)?),
            converter: Arc::new(UnitTable::builtin()),
        })
    }

    /// Report sizes in the `size_unit` of the exposure `key`.
    /// Exposures without a size unit keep the natural unit.
    pub fn with_exposure(self, key: &str, definitions: &dyn DefinitionLookup) -> Result<Self> {
        let definition = definitions.definition(key)
            .ok_or_else(|| Error::UnknownDefinition(key.to_string()))?;
        match definition.size_unit.clone() {
            Some(unit) => self.with_output_unit(&unit),
            None => Ok(self),
        }
    }

    /// Report sizes in `unit`. Fails if the converter cannot reach it from the natural unit.
    pub fn with_output_unit(mut self, unit: &str) -> Result<Self> {
        self.converter.convert(0.0, self.measure.default_unit(), unit)?;
        self.output_unit = Some(unit.to_string());
        Ok(self)
    }

    /// Use another unit converter. The output unit, if any, is checked against it.
    pub fn with_converter(mut self, converter: Arc<dyn UnitConverter>) -> Result<Self> {
        if let Some(unit) = &self.output_unit {
            converter.convert(0.0, self.measure.default_unit(), unit)?;
        }
        self.converter = converter;
        Ok(self)
    }

    /// Use another raw measurement routine.
    pub fn with_ellipsoid(mut self, ellipsoid: Box<dyn EllipsoidalMeasure>) -> Self {
        self.ellipsoid = ellipsoid;
        self
    }

    #[inline] pub fn crs(&self) -> &Crs { &self.crs }

    #[inline] pub fn measure_kind(&self) -> Measure { self.measure }

    #[inline] pub fn default_unit(&self) -> &'static str { self.measure.default_unit() }

    /// The unit sizes are reported in.
    pub fn output_unit(&self) -> &str {
        self.output_unit.as_deref().unwrap_or(self.measure.default_unit())
    }

    /// Size of `geometry` in the output unit. Never fails; see [`SizeCalculator::measure_detailed`].
    pub fn measure(&self, geometry: &Geometry<f64>) -> f64 {
        self.measure_detailed(geometry).size
    }

    pub fn measure_detailed(&self, geometry: &Geometry<f64>) -> Measurement {
        let mut skipped_parts = 0;

        let raw: f64 = if is_multipart(geometry) {
            single_parts(geometry).iter()
                .map(|part| self.raw_size(part, &mut skipped_parts))
                .sum()
        } else {
            self.raw_size(geometry, &mut skipped_parts)
        };

        let rounded = raw.round() + 0.0; // no -0
        let size = match &self.output_unit {
            Some(unit) if unit != self.measure.default_unit() => {
                self.converter.convert(rounded, self.measure.default_unit(), unit)
                    .unwrap_or_else(|err| {
                        warn!(%err, "size conversion failed, keeping {}", self.measure.default_unit());
                        rounded
                    })
            }
            _ => rounded,
        };

        Measurement { size, skipped_parts }
    }

    /// Raw size of one part in the natural unit, or zero if it is not finite.
    fn raw_size(&self, part: &Geometry<f64>, skipped: &mut usize) -> f64 {
        let size = match self.measure {
            Measure::Length => self.ellipsoid.measure_length(part),
            Measure::Area => self.ellipsoid.measure_area(part),
        };
        if size.is_finite() { return size }

        *skipped += 1;
        debug!(
            valid = part.is_valid(),
            wkt = %part.to_wkt().unwrap_or_else(|_| format!("{part:?}")),
            "Size with NaN value"
        );
        0.0
    }
}

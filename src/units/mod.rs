mod codes;

use std::path::Path;

use ahash::AHashMap;
use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub use codes::{AreaUnit, LengthUnit};

pub const UNIT_METRES: &str = "metres";
pub const UNIT_SQUARE_METRES: &str = "square_metres";

/// What a unit measures. Conversion only happens within one quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quantity {
    Length,
    Area,
}

/// A unit of measure, scaled against metres or square metres.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    pub key: String,
    pub name: String,
    pub quantity: Quantity,
    /// How many base units (metres or square metres) one of this unit is worth.
    pub factor: f64,
}

impl Unit {
    pub fn new(key: &str, name: &str, quantity: Quantity, factor: f64) -> Self {
        Self { key: key.into(), name: name.into(), quantity, factor }
    }
}

/// Converts a scalar length or area between two units identified by key.
pub trait UnitConverter: Send + Sync {
    fn convert(&self, value: f64, from_unit: &str, to_unit: &str) -> Result<f64>;
}

/// A registry of units, looked up by key.
#[derive(Debug, Clone, Default)]
pub struct UnitTable {
    units: AHashMap<String, Unit>,
}

impl UnitTable {
    pub fn new(units: impl IntoIterator<Item = Unit>) -> Self {
        Self { units: units.into_iter().map(|unit| (unit.key.clone(), unit)).collect() }
    }

    /// Metric, imperial and nautical lengths and areas.
    pub fn builtin() -> Self {
        use Quantity::*;
        Self::new([
            Unit::new(UNIT_METRES, "metres", Length, 1.0),
            Unit::new("kilometres", "kilometres", Length, 1_000.0),
            Unit::new("feet", "feet", Length, 0.3048),
            Unit::new("yards", "yards", Length, 0.9144),
            Unit::new("miles", "miles", Length, 1_609.344),
            Unit::new("nautical_miles", "nautical miles", Length, 1_852.0),
            Unit::new(UNIT_SQUARE_METRES, "square metres", Area, 1.0),
            Unit::new("square_kilometres", "square kilometres", Area, 1_000_000.0),
            Unit::new("square_feet", "square feet", Area, 0.092_903_04),
            Unit::new("square_yards", "square yards", Area, 0.836_127_36),
            Unit::new("square_miles", "square miles", Area, 2_589_988.110_336),
            Unit::new("hectares", "hectares", Area, 10_000.0),
            Unit::new("acres", "acres", Area, 4_046.856_422_4),
        ])
    }

    /// Parse a JSON array of units.
    pub fn from_json_str(json: &str) -> anyhow::Result<Self> {
        let units: Vec<Unit> = serde_json::from_str(json)
            .context("Failed to parse unit table")?;
        Ok(Self::new(units))
    }

    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read unit table {}", path.display()))?;
        Self::from_json_str(&json)
    }

    #[inline] pub fn get(&self, key: &str) -> Option<&Unit> { self.units.get(key) }

    #[inline] pub fn len(&self) -> usize { self.units.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.units.is_empty() }
}

impl UnitConverter for UnitTable {
    fn convert(&self, value: f64, from_unit: &str, to_unit: &str) -> Result<f64> {
        let unsupported = || Error::UnsupportedUnit { from: from_unit.into(), to: to_unit.into() };

        let from = self.get(from_unit).ok_or_else(unsupported)?;
        let to = self.get(to_unit).ok_or_else(unsupported)?;
        if from.quantity != to.quantity || to.factor == 0.0 { return Err(unsupported()) }

        if from.key == to.key { return Ok(value) }
        Ok(value * from.factor / to.factor)
    }
}

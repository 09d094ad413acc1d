use std::fmt;

use super::{UNIT_METRES, UNIT_SQUARE_METRES};

/// Distance units as numbered by the host's measurement engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LengthUnit {
    Meters,
    Kilometres,
    Feet,
    NauticalMiles,
    Yards,
    Miles,
    Degrees,
    Unknown,
}

/// Area units as numbered by the host's measurement engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AreaUnit {
    SquareMeters,
    SquareKilometres,
    SquareFeet,
    SquareYards,
    SquareMiles,
    Hectares,
    Acres,
    SquareNauticalMiles,
    SquareDegrees,
    Unknown,
}

impl LengthUnit {
    const BY_CODE: [LengthUnit; 8] = [
        LengthUnit::Meters,
        LengthUnit::Kilometres,
        LengthUnit::Feet,
        LengthUnit::NauticalMiles,
        LengthUnit::Yards,
        LengthUnit::Miles,
        LengthUnit::Degrees,
        LengthUnit::Unknown,
    ];

    /// Out-of-range codes map to `Unknown`.
    pub fn from_code(code: u8) -> Self {
        Self::BY_CODE.get(code as usize).copied().unwrap_or(LengthUnit::Unknown)
    }

    pub fn code(&self) -> u8 {
        Self::BY_CODE.iter().position(|unit| unit == self).unwrap_or(7) as u8
    }

    pub fn name(&self) -> &'static str {
        match self {
            LengthUnit::Meters => "Meters",
            LengthUnit::Kilometres => "Kilometres",
            LengthUnit::Feet => "Feet",
            LengthUnit::NauticalMiles => "Nautical Miles",
            LengthUnit::Yards => "Yards",
            LengthUnit::Miles => "Miles",
            LengthUnit::Degrees => "Degrees",
            LengthUnit::Unknown => "Unknown Unit",
        }
    }

    /// Key in the unit table, for units the table can convert.
    pub fn key(&self) -> Option<&'static str> {
        match self {
            LengthUnit::Meters => Some(UNIT_METRES),
            LengthUnit::Kilometres => Some("kilometres"),
            LengthUnit::Feet => Some("feet"),
            LengthUnit::NauticalMiles => Some("nautical_miles"),
            LengthUnit::Yards => Some("yards"),
            LengthUnit::Miles => Some("miles"),
            LengthUnit::Degrees | LengthUnit::Unknown => None,
        }
    }
}

impl AreaUnit {
    const BY_CODE: [AreaUnit; 10] = [
        AreaUnit::SquareMeters,
        AreaUnit::SquareKilometres,
        AreaUnit::SquareFeet,
        AreaUnit::SquareYards,
        AreaUnit::SquareMiles,
        AreaUnit::Hectares,
        AreaUnit::Acres,
        AreaUnit::SquareNauticalMiles,
        AreaUnit::SquareDegrees,
        AreaUnit::Unknown,
    ];

    /// Out-of-range codes map to `Unknown`.
    pub fn from_code(code: u8) -> Self {
        Self::BY_CODE.get(code as usize).copied().unwrap_or(AreaUnit::Unknown)
    }

    pub fn code(&self) -> u8 {
        Self::BY_CODE.iter().position(|unit| unit == self).unwrap_or(9) as u8
    }

    pub fn name(&self) -> &'static str {
        match self {
            AreaUnit::SquareMeters => "Square Meters",
            AreaUnit::SquareKilometres => "Square Kilometres",
            AreaUnit::SquareFeet => "Square Feet",
            AreaUnit::SquareYards => "Square Yards",
            AreaUnit::SquareMiles => "Square Miles",
            AreaUnit::Hectares => "Hectares",
            AreaUnit::Acres => "Acres",
            AreaUnit::SquareNauticalMiles => "Square Nautical Miles",
            AreaUnit::SquareDegrees => "Square Degrees",
            AreaUnit::Unknown => "Unknown Unit",
        }
    }

    pub fn key(&self) -> Option<&'static str> {
        match self {
            AreaUnit::SquareMeters => Some(UNIT_SQUARE_METRES),
            AreaUnit::SquareKilometres => Some("square_kilometres"),
            AreaUnit::SquareFeet => Some("square_feet"),
            AreaUnit::SquareYards => Some("square_yards"),
            AreaUnit::SquareMiles => Some("square_miles"),
            AreaUnit::Hectares => Some("hectares"),
            AreaUnit::Acres => Some("acres"),
            AreaUnit::SquareNauticalMiles | AreaUnit::SquareDegrees | AreaUnit::Unknown => None,
        }
    }
}

impl fmt::Display for LengthUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.name()) }
}

impl fmt::Display for AreaUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.name()) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip() {
        for code in 0..8 { assert_eq!(LengthUnit::from_code(code).code(), code) }
        for code in 0..10 { assert_eq!(AreaUnit::from_code(code).code(), code) }
    }

    #[test]
    fn out_of_range_codes_are_unknown() {
        assert_eq!(LengthUnit::from_code(42), LengthUnit::Unknown);
        assert_eq!(AreaUnit::from_code(200).name(), "Unknown Unit");
    }

    #[test]
    fn default_units_have_table_keys() {
        assert_eq!(LengthUnit::from_code(0).key(), Some(UNIT_METRES));
        assert_eq!(AreaUnit::from_code(0).key(), Some(UNIT_SQUARE_METRES));
        assert_eq!(AreaUnit::from_code(5).to_string(), "Hectares");
    }
}

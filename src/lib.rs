#![doc = "riskvector: vector layer preparation and ellipsoidal size measurement"]
mod definitions;
mod error;
mod geom;
mod layer;
mod measure;
mod tools;
mod types;
mod units;

#[doc(inline)]
pub use error::{Error, Result};

#[doc(inline)]
pub use types::{Crs, GeometryFamily, ShapeKind, Value};

#[doc(inline)]
pub use layer::{
    EditSession, Feature, FeatureId, FeatureRequest, Field, FieldType, Layer, LayerId, LayerPurpose,
    KEY_LAYER_FIELDS, KEY_LAYER_PURPOSE,
};

#[doc(inline)]
pub use geom::{is_multipart, single_parts, GeometryValidator, Repaired, SpatialIndex, TopologyRepair};

#[doc(inline)]
pub use units::{AreaUnit, LengthUnit, Quantity, Unit, UnitConverter, UnitTable, UNIT_METRES, UNIT_SQUARE_METRES};

#[doc(inline)]
pub use definitions::{read_dynamic_fields, DefinitionLookup, Definitions, ExposureDefinition, FieldTemplate, NAME_TOKEN};

#[doc(inline)]
pub use measure::{EllipsoidalMeasure, Measure, Measurement, SizeCalculator, Wgs84Ellipsoid};

#[doc(inline)]
pub use tools::{
    build_spatial_index, copy_fields, copy_layer, copy_layer_with, create_layer, make_size_calculator,
    remove_fields, CopyReport,
};

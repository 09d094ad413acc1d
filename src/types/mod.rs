mod crs;
mod family;
mod value;

pub use crs::Crs;
pub use family::{GeometryFamily, ShapeKind};
pub use value::Value;

mod bbox;
mod index;
mod parts;
mod repair;

pub use index::SpatialIndex;
pub use parts::{is_multipart, single_parts};
pub use repair::{GeometryValidator, Repaired, TopologyRepair};

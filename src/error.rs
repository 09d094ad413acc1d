use thiserror::Error;

use crate::layer::LayerId;

/// Errors raised by layer construction, editing, indexing and measurement.
///
/// Diagnostic anomalies (a geometry still invalid after repair, a non-finite
/// partial measurement) are never errors: they are logged and counted.
#[derive(Debug, Error)]
pub enum Error {
    /// A geometry family outside Point, Line, Polygon and None.
    #[error("Layer is neither Point nor Line nor Polygon nor None, got '{0}'")]
    UnsupportedGeometry(String),

    /// No conversion is registered between the two units.
    #[error("Unsupported unit conversion from '{from}' to '{to}'")]
    UnsupportedUnit {
        from: String,
        to: String,
    },

    /// The definition lookup has no record for the key.
    #[error("No definition found for key '{0}'")]
    UnknownDefinition(String),

    /// The authority identifier cannot be resolved to a projection.
    #[error("Unsupported coordinate reference system '{0}'")]
    UnsupportedCrs(String),

    /// A coordinate transformation failed.
    #[error("Projection error: {0}")]
    Projection(String),

    /// An edit session failed to commit; the layer is left as it was.
    #[error("Failed to commit changes to layer '{layer}': {reason}")]
    Commit {
        layer: String,
        reason: String,
    },

    /// The index was built from another layer, or from an older revision of this one.
    #[error("Spatial index is stale for layer {layer} (built at revision {built}, layer is at {current}); rebuild required")]
    StaleIndex {
        layer: LayerId,
        built: u64,
        current: u64,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

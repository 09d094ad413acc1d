use std::collections::BTreeSet;

use geo::Geometry;
use serde_json::{Map, Value as JsonValue};
use tracing::{info, instrument};

use crate::definitions::Definitions;
use crate::error::Result;
use crate::geom::{GeometryValidator, SpatialIndex, TopologyRepair};
use crate::layer::{FeatureRequest, Field, Layer, LayerPurpose, KEY_LAYER_FIELDS};
use crate::measure::SizeCalculator;
use crate::types::{Crs, GeometryFamily};

/// Create an empty in-memory layer.
///
/// Fields are appended in the order given. The `layer_fields` keyword is initialised
/// to an empty object for downstream per-field annotations.
#[instrument(skip_all, fields(layer = name, family = %family))]
pub fn create_layer(name: &str, family: GeometryFamily, crs: Option<&Crs>, fields: &[Field]) -> Result<Layer> {
    let mut layer = Layer::new(name, family, crs.cloned());
    layer.keywords_mut().insert(KEY_LAYER_FIELDS.into(), JsonValue::Object(Map::new()));

    if !fields.is_empty() {
        let mut session = layer.start_editing();
        for field in fields {
            session.add_field(field.clone());
        }
        session.commit()?;
    }
    Ok(layer)
}

/// Build an R-tree over the current features of `layer`. Rebuild after any edit.
#[instrument(skip_all, fields(layer = layer.name()))]
pub fn build_spatial_index(layer: &Layer) -> SpatialIndex {
    SpatialIndex::build(layer)
}

/// What [`copy_layer`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CopyReport {
    pub copied: usize,
    /// Geometries (or missing geometries) that were still invalid after repair.
    pub invalid_after_repair: usize,
}

/// Copy every feature of `source` into `target` in one edit session, repairing
/// geometries with [`TopologyRepair`] when `source` is an aggregation layer.
pub fn copy_layer(source: &Layer, target: &mut Layer) -> Result<CopyReport> {
    copy_layer_with(source, target, &TopologyRepair)
}

/// [`copy_layer`] with another geometry validator.
///
/// For an aggregation layer only the selection is copied when the layer asks for
/// selected features only and has a selection, and geometries go through
/// `validator`. A geometry still invalid afterwards is copied anyway and reported.
/// Other layers are copied verbatim. Attributes are copied in source field order;
/// if they do not fit the target schema the commit fails and `target` is unchanged.
#[instrument(skip_all, fields(source = source.name(), target = target.name()))]
pub fn copy_layer_with(source: &Layer, target: &mut Layer, validator: &dyn GeometryValidator) -> Result<CopyReport> {
    let aggregation = source.purpose() == Some(LayerPurpose::Aggregation);
    let request = if aggregation && source.use_selected_only() && source.selected_count() > 0 {
        FeatureRequest::with_ids(source.selected_ids().iter().copied())
    } else {
        FeatureRequest::all()
    };

    let mut report = CopyReport::default();
    let mut session = target.start_editing();

    for feature in source.features(&request) {
        let geometry: Option<Geometry<f64>> = if aggregation {
            let repaired = feature.geometry.as_ref()
                .map(|geometry| validator.repair(geometry))
                .unwrap_or_default();
            if !repaired.valid {
                report.invalid_after_repair += 1;
                info!(
                    event = "invalid-geometry-after-repair",
                    feature = %feature.id,
                    "One geometry in the aggregation layer is still invalid after cleaning"
                );
            }
            repaired.geometry
        } else {
            feature.geometry.clone()
        };

        session.add_feature(geometry, feature.attributes.clone());
        report.copied += 1;
    }

    session.commit()?;
    Ok(report)
}

/// Copy fields under new names, one `(old, new)` pair at a time, in one edit session.
///
/// The new field clones the old one's type, length and precision and receives every
/// feature's old value, read by name when the session commits. Pairs whose old field
/// does not exist are skipped.
#[instrument(skip_all, fields(layer = layer.name()))]
pub fn copy_fields<'a>(layer: &mut Layer, renames: impl IntoIterator<Item = (&'a str, &'a str)>) -> Result<()> {
    let mut session = layer.start_editing();
    let mut staged: Vec<Field> = session.layer().fields().to_vec();

    for (old, new) in renames {
        let Some(source) = staged.iter().find(|field| field.name == old) else { continue };
        let field = source.renamed(new);
        staged.push(field.clone());
        session.add_field(field);
        session.copy_attribute(old, new);
    }

    if session.is_empty() { return Ok(()) }
    session.commit()
}

/// Remove the named fields in a single batch. Names that do not exist are ignored.
#[instrument(skip_all, fields(layer = layer.name()))]
pub fn remove_fields<'a>(layer: &mut Layer, names: impl IntoIterator<Item = &'a str>) -> Result<()> {
    let indices: BTreeSet<usize> = names.into_iter()
        .filter_map(|name| layer.field_index(name))
        .collect();
    if indices.is_empty() { return Ok(()) }

    let mut session = layer.start_editing();
    session.delete_fields(indices);
    session.commit()
}

/// A size calculator for `family` features in `crs`, reporting in the size unit
/// of the built-in exposure `exposure_key` when one is given.
pub fn make_size_calculator(crs: &Crs, family: GeometryFamily, exposure_key: Option<&str>) -> Result<SizeCalculator> {
    let calculator = SizeCalculator::new(crs, family)?;
    match exposure_key {
        Some(key) => calculator.with_exposure(key, &Definitions::builtin()),
        None => Ok(calculator),
    }
}

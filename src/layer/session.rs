use geo::Geometry;
use tracing::debug;

use crate::error::{Error, Result};
use crate::types::Value;

use super::{feature_position, Feature, FeatureId, Field, Layer};

/// A staged edit, replayed in order at commit time.
#[derive(Debug)]
enum Edit {
    AddFeature { geometry: Option<Geometry<f64>>, attributes: Vec<Value> },
    AddField(Field),
    ChangeAttribute { id: FeatureId, field: String, value: Value },
    CopyAttribute { from: String, to: String },
    DeleteFields(Vec<usize>),
}

/// A scoped transaction on one layer.
///
/// Edits are recorded, then replayed on a working copy by [`commit`](Self::commit).
/// The layer only changes if every edit applies and the result satisfies the layer
/// invariants (attribute count equals field count, unique field names, geometries
/// of the layer's family). Dropping the session without committing rolls back.
#[derive(Debug)]
pub struct EditSession<'a> {
    layer: &'a mut Layer,
    edits: Vec<Edit>,
}

/// The mutable parts of a layer, rebuilt during commit.
struct Working {
    fields: Vec<Field>,
    features: Vec<Feature>,
    next_fid: u64,
}

impl<'a> EditSession<'a> {
    pub(super) fn new(layer: &'a mut Layer) -> Self {
        Self { layer, edits: Vec::new() }
    }

    /// The layer as last committed.
    #[inline] pub fn layer(&self) -> &Layer { self.layer }

    /// Number of staged edits.
    #[inline] pub fn len(&self) -> usize { self.edits.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.edits.is_empty() }

    /// Stage a new feature; its id is assigned on commit.
    pub fn add_feature(&mut self, geometry: Option<Geometry<f64>>, attributes: Vec<Value>) {
        self.edits.push(Edit::AddFeature { geometry, attributes });
    }

    /// Stage a new field, appended to the schema. Existing features get `Null`.
    pub fn add_field(&mut self, field: Field) {
        self.edits.push(Edit::AddField(field));
    }

    /// Stage a value change. The field is resolved by name when the edit is applied.
    pub fn change_attribute(&mut self, id: FeatureId, field: &str, value: Value) {
        self.edits.push(Edit::ChangeAttribute { id, field: field.into(), value });
    }

    /// Stage a copy of every feature's `from` value into field `to`.
    pub fn copy_attribute(&mut self, from: &str, to: &str) {
        self.edits.push(Edit::CopyAttribute { from: from.into(), to: to.into() });
    }

    /// Stage the deletion of several fields at once. Indices refer to the schema
    /// as it stands when this edit is applied, before any of them is removed.
    pub fn delete_fields(&mut self, indices: impl IntoIterator<Item = usize>) {
        self.edits.push(Edit::DeleteFields(indices.into_iter().collect()));
    }

    /// Apply every staged edit atomically.
    pub fn commit(self) -> Result<()> {
        let layer = self.layer;
        let fail = |reason: String| Error::Commit { layer: layer.name.clone(), reason };

        let mut working = Working {
            fields: layer.fields.clone(),
            features: layer.features.clone(),
            next_fid: layer.next_fid,
        };

        let count = self.edits.len();
        for edit in self.edits {
            working.apply(edit).map_err(fail)?;
        }
        working.validate(layer).map_err(fail)?;

        debug!(layer = %layer.name, edits = count, "committing edit session");

        layer.fields = working.fields;
        layer.features = working.features;
        layer.next_fid = working.next_fid;
        layer.revision += 1;
        Ok(())
    }

    /// Discard every staged edit.
    pub fn rollback(self) {
        debug!(layer = %self.layer.name, edits = self.edits.len(), "rolling back edit session");
    }
}

impl Working {
    fn field_index(&self, name: &str) -> std::result::Result<usize, String> {
        self.fields.iter().position(|field| field.name == name)
            .ok_or_else(|| format!("field '{name}' does not exist"))
    }

    fn apply(&mut self, edit: Edit) -> std::result::Result<(), String> {
        match edit {
            Edit::AddFeature { geometry, attributes } => {
                let id = FeatureId(self.next_fid);
                self.next_fid += 1;
                self.features.push(Feature { id, geometry, attributes });
            }
            Edit::AddField(field) => {
                if self.fields.iter().any(|existing| existing.name == field.name) {
                    return Err(format!("field '{}' already exists", field.name));
                }
                self.fields.push(field);
                for feature in &mut self.features {
                    feature.attributes.push(Value::Null);
                }
            }
            Edit::ChangeAttribute { id, field, value } => {
                let index = self.field_index(&field)?;
                let position = feature_position(&self.features, id)
                    .ok_or_else(|| format!("feature {id} does not exist"))?;
                let feature = &mut self.features[position];
                let slot = feature.attributes.get_mut(index)
                    .ok_or_else(|| format!("feature {id} has no value for field '{field}'"))?;
                *slot = value;
            }
            Edit::CopyAttribute { from, to } => {
                let source = self.field_index(&from)?;
                let target = self.field_index(&to)?;
                for feature in &mut self.features {
                    let value = feature.attributes.get(source).cloned()
                        .ok_or_else(|| format!("feature {} has no value for field '{from}'", feature.id))?;
                    let slot = feature.attributes.get_mut(target)
                        .ok_or_else(|| format!("feature {} has no value for field '{to}'", feature.id))?;
                    *slot = value;
                }
            }
            Edit::DeleteFields(mut indices) => {
                indices.sort_unstable();
                indices.dedup();
                if let Some(&last) = indices.last() {
                    if last >= self.fields.len() {
                        return Err(format!("field index {last} out of range"));
                    }
                }
                // Highest first, so the remaining indices stay valid.
                for &index in indices.iter().rev() {
                    self.fields.remove(index);
                    for feature in &mut self.features {
                        if index < feature.attributes.len() { feature.attributes.remove(index); }
                    }
                }
            }
        }
        Ok(())
    }

    fn validate(&self, layer: &Layer) -> std::result::Result<(), String> {
        for feature in &self.features {
            if feature.attributes.len() != self.fields.len() {
                return Err(format!(
                    "feature {} has {} attributes but the layer has {} fields",
                    feature.id, feature.attributes.len(), self.fields.len()
                ));
            }
            if let Some(geometry) = &feature.geometry {
                if !layer.family.admits(geometry) {
                    return Err(format!("feature {} does not fit a {} layer", feature.id, layer.family));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use geo::{line_string, point};

    use super::*;
    use crate::layer::{FeatureRequest, FieldType};
    use crate::types::{Crs, GeometryFamily};

    fn lines() -> Layer {
        let mut layer = Layer::new("roads", GeometryFamily::Line, Some(Crs::wgs84()));
        let mut session = layer.start_editing();
        session.add_field(Field::new("name", FieldType::String, 20, 0));
        session.add_field(Field::new("lanes", FieldType::Integer, 4, 0));
        session.add_feature(Some(line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0)].into()), vec!["a".into(), 2i64.into()]);
        session.add_feature(None, vec!["b".into(), 4i64.into()]);
        session.commit().unwrap();
        layer
    }

    #[test]
    fn commit_assigns_sequential_ids() {
        let layer = lines();
        let ids: Vec<_> = layer.features(&FeatureRequest::all()).map(|f| f.id).collect();
        assert_eq!(ids, vec![FeatureId(0), FeatureId(1)]);
        assert_eq!(layer.revision(), 1);
    }

    #[test]
    fn dropped_session_changes_nothing() {
        let mut layer = lines();
        {
            let mut session = layer.start_editing();
            session.add_feature(None, vec!["c".into(), 1i64.into()]);
            session.add_field(Field::new("speed", FieldType::Double, 8, 2));
        }
        assert_eq!(layer.feature_count(), 2);
        assert_eq!(layer.field_count(), 2);
        assert_eq!(layer.revision(), 1);
    }

    #[test]
    fn failure_after_staging_leaves_layer_untouched() {
        let mut layer = lines();
        let mut session = layer.start_editing();
        for i in 0..4 {
            session.add_feature(None, vec![format!("n{i}").into(), (i as i64).into()]);
        }
        // Fifth feature has the wrong arity.
        session.add_feature(None, vec!["bad".into()]);
        let err = session.commit().unwrap_err();

        assert!(matches!(err, Error::Commit { .. }));
        assert_eq!(layer.feature_count(), 2);
        assert_eq!(layer.revision(), 1);
    }

    #[test]
    fn rejects_geometry_of_another_family() {
        let mut layer = lines();
        let mut session = layer.start_editing();
        session.add_feature(Some(point!(x: 0.0, y: 0.0).into()), vec!["p".into(), 1i64.into()]);
        assert!(session.commit().is_err());
        assert_eq!(layer.feature_count(), 2);
    }

    #[test]
    fn added_field_backfills_null() {
        let mut layer = lines();
        let mut session = layer.start_editing();
        session.add_field(Field::new("speed", FieldType::Double, 8, 2));
        session.change_attribute(FeatureId(1), "speed", 50.0.into());
        session.commit().unwrap();

        assert_eq!(layer.value(FeatureId(0), "speed"), Some(&Value::Null));
        assert_eq!(layer.value(FeatureId(1), "speed"), Some(&Value::Double(50.0)));
    }

    #[test]
    fn many_attribute_changes_apply_by_id() {
        let mut layer = Layer::new("table", GeometryFamily::NoGeometry, None);
        let mut session = layer.start_editing();
        session.add_field(Field::new("n", FieldType::Integer, 10, 0));
        for _ in 0..50_000 {
            session.add_feature(None, vec![Value::Null]);
        }
        session.commit().unwrap();

        let mut session = layer.start_editing();
        for id in (0..50_000u64).rev() {
            session.change_attribute(FeatureId(id), "n", Value::Int(id as i64 * 2));
        }
        session.commit().unwrap();

        assert_eq!(layer.value(FeatureId(0), "n"), Some(&Value::Int(0)));
        assert_eq!(layer.value(FeatureId(49_999), "n"), Some(&Value::Int(99_998)));
    }

    #[test]
    fn change_of_missing_feature_fails() {
        let mut layer = lines();
        let mut session = layer.start_editing();
        session.change_attribute(FeatureId(9), "lanes", Value::Int(1));
        assert!(matches!(session.commit(), Err(Error::Commit { .. })));
    }

    #[test]
    fn duplicate_field_name_fails() {
        let mut layer = lines();
        let mut session = layer.start_editing();
        session.add_field(Field::new("name", FieldType::String, 20, 0));
        assert!(session.commit().is_err());
        assert_eq!(layer.field_count(), 2);
    }

    #[test]
    fn delete_batch_uses_pre_deletion_indices() {
        let mut layer = lines();
        let mut session = layer.start_editing();
        session.add_field(Field::new("speed", FieldType::Double, 8, 2));
        session.delete_fields([2, 0]);
        session.commit().unwrap();

        let names: Vec<_> = layer.fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["lanes"]);
        assert_eq!(layer.value(FeatureId(1), "lanes"), Some(&Value::Int(4)));
    }

    #[test]
    fn out_of_range_delete_fails() {
        let mut layer = lines();
        let mut session = layer.start_editing();
        session.delete_fields([5]);
        assert!(session.commit().is_err());
        assert_eq!(layer.field_count(), 2);
    }

    #[test]
    fn rollback_keeps_selection() {
        let mut layer = lines();
        layer.select([FeatureId(0)]);
        layer.start_editing().rollback();
        assert_eq!(layer.selected_count(), 1);
    }
}

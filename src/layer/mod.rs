mod field;
mod request;
mod session;

use std::collections::BTreeSet;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use geo::Geometry;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::types::{Crs, GeometryFamily, Value};

pub use field::{Field, FieldType};
pub use request::FeatureRequest;
pub use session::EditSession;

/// Keyword holding the semantic role of a layer.
pub const KEY_LAYER_PURPOSE: &str = "layer_purpose";

/// Keyword holding per-field semantic annotations.
pub const KEY_LAYER_FIELDS: &str = "layer_fields";

/// Process-unique identity of a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerId(u64);

impl LayerId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LayerId({})", self.0)
    }
}

/// Feature identifier, assigned by the layer when the feature is committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FeatureId(pub u64);

impl fmt::Display for FeatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A geometry (possibly absent) with attribute values aligned to the layer's fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub id: FeatureId,
    pub geometry: Option<Geometry<f64>>,
    pub attributes: Vec<Value>,
}

/// The semantic role a layer plays in an analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerPurpose {
    Hazard,
    Exposure,
    Aggregation,
    Impact,
}

/// A named in-memory collection of features sharing a geometry family and CRS.
///
/// Mutations go through [`Layer::start_editing`]; an exclusive borrow of the layer
/// is held for the session, so there is at most one writer per layer.
/// Features are kept in ascending id order. A clone is a new layer with its own id.
#[derive(Debug)]
pub struct Layer {
    id: LayerId,
    name: String,
    family: GeometryFamily,
    crs: Option<Crs>,
    fields: Vec<Field>,
    features: Vec<Feature>,
    keywords: Map<String, JsonValue>,
    selection: BTreeSet<FeatureId>,
    use_selected_only: bool,
    next_fid: u64,
    revision: u64, // Bumped on every commit
}

impl Clone for Layer {
    fn clone(&self) -> Self {
        Self {
            id: LayerId::next(),
            name: self.name.clone(),
            family: self.family,
            crs: self.crs.clone(),
            fields: self.fields.clone(),
            features: self.features.clone(),
            keywords: self.keywords.clone(),
            selection: self.selection.clone(),
            use_selected_only: self.use_selected_only,
            next_fid: self.next_fid,
            revision: self.revision,
        }
    }
}

/// Position of feature `id` in `features`, which is sorted by id.
pub(crate) fn feature_position(features: &[Feature], id: FeatureId) -> Option<usize> {
    features.binary_search_by_key(&id, |feature| feature.id).ok()
}

impl Layer {
    pub(crate) fn new(name: &str, family: GeometryFamily, crs: Option<Crs>) -> Self {
        Self {
            id: LayerId::next(),
            name: name.into(),
            family,
            crs,
            fields: Vec::new(),
            features: Vec::new(),
            keywords: Map::new(),
            selection: BTreeSet::new(),
            use_selected_only: false,
            next_fid: 0,
            revision: 0,
        }
    }

    #[inline] pub fn id(&self) -> LayerId { self.id }

    #[inline] pub fn name(&self) -> &str { &self.name }

    #[inline] pub fn family(&self) -> GeometryFamily { self.family }

    #[inline] pub fn crs(&self) -> Option<&Crs> { self.crs.as_ref() }

    pub fn set_crs(&mut self, crs: Crs) { self.crs = Some(crs) }

    #[inline] pub fn fields(&self) -> &[Field] { &self.fields }

    #[inline] pub fn field_count(&self) -> usize { self.fields.len() }

    /// Index of the field called `name`, if any.
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|field| field.name == name)
    }

    #[inline] pub fn feature_count(&self) -> usize { self.features.len() }

    /// Iterate the features matching `request`, in storage order.
    pub fn features<'a>(&'a self, request: &'a FeatureRequest) -> impl Iterator<Item = &'a Feature> + 'a {
        self.features.iter().filter(move |feature| request.matches(feature.id))
    }

    pub fn feature(&self, id: FeatureId) -> Option<&Feature> {
        feature_position(&self.features, id).map(|position| &self.features[position])
    }

    /// The value of field `name` on feature `id`.
    pub fn value(&self, id: FeatureId, name: &str) -> Option<&Value> {
        let index = self.field_index(name)?;
        self.feature(id)?.attributes.get(index)
    }

    /// Revision counter, incremented by every committed edit session.
    #[inline] pub fn revision(&self) -> u64 { self.revision }

    // ----- Keywords -----

    #[inline] pub fn keywords(&self) -> &Map<String, JsonValue> { &self.keywords }

    #[inline] pub fn keywords_mut(&mut self) -> &mut Map<String, JsonValue> { &mut self.keywords }

    /// The purpose keyword, if it is set to a known role.
    pub fn purpose(&self) -> Option<LayerPurpose> {
        self.keywords.get(KEY_LAYER_PURPOSE)
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }

    pub fn set_purpose(&mut self, purpose: LayerPurpose) {
        let value = serde_json::to_value(purpose).unwrap_or(JsonValue::Null);
        self.keywords.insert(KEY_LAYER_PURPOSE.into(), value);
    }

    // ----- Selection -----

    /// Add features to the selection. Ids not present in the layer are ignored.
    pub fn select(&mut self, ids: impl IntoIterator<Item = FeatureId>) {
        let features = &self.features;
        self.selection.extend(ids.into_iter().filter(|&id| feature_position(features, id).is_some()));
    }

    pub fn deselect_all(&mut self) { self.selection.clear() }

    #[inline] pub fn selected_ids(&self) -> &BTreeSet<FeatureId> { &self.selection }

    #[inline] pub fn selected_count(&self) -> usize { self.selection.len() }

    #[inline] pub fn use_selected_only(&self) -> bool { self.use_selected_only }

    pub fn set_use_selected_only(&mut self, enabled: bool) { self.use_selected_only = enabled }

    // ----- Editing -----

    /// Open an edit session. Nothing is visible until [`EditSession::commit`] succeeds;
    /// dropping the session discards its edits.
    pub fn start_editing(&mut self) -> EditSession<'_> {
        EditSession::new(self)
    }
}

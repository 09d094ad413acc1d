mod template;

use std::path::Path;

use ahash::AHashMap;
use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::layer::FieldType;
use crate::units::{UNIT_METRES, UNIT_SQUARE_METRES};

pub use template::{read_dynamic_fields, FieldTemplate, NAME_TOKEN};

/// An exposure type and the unit its sizes are reported in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExposureDefinition {
    pub key: String,
    pub name: String,
    /// Unit key (see [`crate::UnitTable`]); `None` for exposures that are counted, not measured.
    #[serde(default)]
    pub size_unit: Option<String>,
}

impl ExposureDefinition {
    pub fn new(key: &str, name: &str, size_unit: Option<&str>) -> Self {
        Self { key: key.into(), name: name.into(), size_unit: size_unit.map(Into::into) }
    }
}

/// Resolves exposure keys to their definitions.
pub trait DefinitionLookup {
    fn definition(&self, key: &str) -> Option<&ExposureDefinition>;
}

/// Exposure definitions and field templates, keyed by their `key`.
#[derive(Debug, Clone, Default)]
pub struct Definitions {
    exposures: AHashMap<String, ExposureDefinition>,
    fields: AHashMap<String, FieldTemplate>,
}

#[derive(Deserialize)]
struct DefinitionsFile {
    #[serde(default)]
    exposures: Vec<ExposureDefinition>,
    #[serde(default)]
    fields: Vec<FieldTemplate>,
}

impl Definitions {
    pub fn new(
        exposures: impl IntoIterator<Item = ExposureDefinition>,
        fields: impl IntoIterator<Item = FieldTemplate>,
    ) -> Self {
        Self {
            exposures: exposures.into_iter().map(|e| (e.key.clone(), e)).collect(),
            fields: fields.into_iter().map(|f| (f.key.clone(), f)).collect(),
        }
    }

    pub fn builtin() -> Self {
        Self::new(
            [
                ExposureDefinition::new("road", "Roads", Some(UNIT_METRES)),
                ExposureDefinition::new("structure", "Structures", Some(UNIT_SQUARE_METRES)),
                ExposureDefinition::new("land_cover", "Land cover", Some("hectares")),
                ExposureDefinition::new("population", "Population", None),
                ExposureDefinition::new("place", "Places", None),
            ],
            [
                FieldTemplate::new("size_field", "size", FieldType::Double, 16, 2),
                FieldTemplate::new("exposure_type_field", "exposure_class", FieldType::String, 1024, 0),
                FieldTemplate::new("aggregation_id_field", "aggregation_id", FieldType::Integer, 10, 0)
                    .with_fallbacks([FieldType::String]),
                FieldTemplate::new("aggregation_name_field", "aggregation_name", FieldType::String, 1024, 0),
                FieldTemplate::new("{}_count_field", "{}_count", FieldType::Double, 16, 2)
                    .with_fallbacks([FieldType::Integer]),
                FieldTemplate::new("{}_affected_field", "{}_affected", FieldType::Double, 16, 2),
            ],
        )
    }

    /// Parse `{"exposures": [...], "fields": [...]}`; both lists are optional.
    pub fn from_json_str(json: &str) -> anyhow::Result<Self> {
        let file: DefinitionsFile = serde_json::from_str(json)
            .context("Failed to parse definitions")?;
        Ok(Self::new(file.exposures, file.fields))
    }

    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read definitions {}", path.display()))?;
        Self::from_json_str(&json)
    }

    #[inline] pub fn field(&self, key: &str) -> Option<&FieldTemplate> { self.fields.get(key) }
}

impl DefinitionLookup for Definitions {
    fn definition(&self, key: &str) -> Option<&ExposureDefinition> {
        self.exposures.get(key)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn builtin_road_is_measured_in_metres() {
        let definitions = Definitions::builtin();
        let road = definitions.definition("road").unwrap();
        assert_eq!(road.size_unit.as_deref(), Some(UNIT_METRES));
        assert!(definitions.definition("population").unwrap().size_unit.is_none());
        assert!(definitions.definition("volcano").is_none());
    }

    #[test]
    fn builtin_count_template_is_dynamic() {
        let definitions = Definitions::builtin();
        let template = definitions.field("{}_count_field").unwrap();
        assert!(template.is_dynamic());
        assert_eq!(template.materialize(Some("high")).name, "high_count");
    }

    #[test]
    fn loads_definitions_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{
            "exposures": [{{"key": "pipeline", "name": "Pipelines", "size_unit": "kilometres"}}],
            "fields": [{{"key": "length_field", "field_name": "length", "type": "double", "length": 16, "precision": 3}}]
        }}"#).unwrap();

        let definitions = Definitions::from_path(file.path()).unwrap();
        assert_eq!(definitions.definition("pipeline").unwrap().size_unit.as_deref(), Some("kilometres"));
        assert_eq!(definitions.field("length_field").unwrap().precision, 3);
    }

    #[test]
    fn missing_file_reports_path() {
        let err = Definitions::from_path(Path::new("/nonexistent/definitions.json")).unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/definitions.json"));
    }
}

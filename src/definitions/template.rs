use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::layer::{Field, FieldType};

/// Placeholder a dynamic field name or key substitutes its token into.
pub const NAME_TOKEN: &str = "{}";

/// Token substituted when a dynamic name is requested without one.
const NULL_TOKEN: &str = "NULL";

/// A template from which concrete fields are materialised.
///
/// Dynamic templates (one per hazard class, exposure type, ...) carry the
/// [`NAME_TOKEN`] placeholder in both `key` and `name`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawTemplate", into = "RawTemplate")]
pub struct FieldTemplate {
    pub key: String,
    pub name: String,
    pub primary: FieldType,
    /// Types a host may fall back to when it cannot store `primary`.
    pub fallbacks: Vec<FieldType>,
    pub length: u32,
    pub precision: u32,
}

/// On-disk shape: `type` is either one type or a list, first entry preferred.
#[derive(Serialize, Deserialize)]
struct RawTemplate {
    key: String,
    #[serde(rename = "field_name")]
    name: String,
    #[serde(rename = "type")]
    ty: OneOrMany,
    #[serde(default)]
    length: u32,
    #[serde(default)]
    precision: u32,
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(FieldType),
    Many(Vec<FieldType>),
}

impl From<RawTemplate> for FieldTemplate {
    fn from(raw: RawTemplate) -> Self {
        let (primary, fallbacks) = match raw.ty {
            OneOrMany::One(ty) => (ty, Vec::new()),
            OneOrMany::Many(types) => match types.split_first() {
                Some((first, rest)) => (*first, rest.to_vec()),
                None => (FieldType::String, Vec::new()),
            },
        };
        Self { key: raw.key, name: raw.name, primary, fallbacks, length: raw.length, precision: raw.precision }
    }
}

impl From<FieldTemplate> for RawTemplate {
    fn from(template: FieldTemplate) -> Self {
        let ty = if template.fallbacks.is_empty() {
            OneOrMany::One(template.primary)
        } else {
            OneOrMany::Many(std::iter::once(template.primary).chain(template.fallbacks).collect())
        };
        Self { key: template.key, name: template.name, ty, length: template.length, precision: template.precision }
    }
}

impl FieldTemplate {
    pub fn new(key: &str, name: &str, ty: FieldType, length: u32, precision: u32) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            primary: ty,
            fallbacks: Vec::new(),
            length,
            precision,
        }
    }

    pub fn with_fallbacks(mut self, fallbacks: impl IntoIterator<Item = FieldType>) -> Self {
        self.fallbacks = fallbacks.into_iter().collect();
        self
    }

    #[inline] pub fn is_dynamic(&self) -> bool { self.name.contains(NAME_TOKEN) }

    /// Build the concrete field. For a dynamic template `Some(token)` fills the
    /// placeholder and `None` fills it with `NULL`; static templates ignore the token.
    pub fn materialize(&self, token: Option<&str>) -> Field {
        let name = if self.is_dynamic() {
            self.name.replace(NAME_TOKEN, token.unwrap_or(NULL_TOKEN))
        } else {
            self.name.clone()
        };
        Field::new(name, self.primary, self.length, self.precision)
    }
}

/// Tokens of every keyword key produced by the dynamic template `template`.
///
/// With a template key `{}_count`, the keywords `{"flood_count": .., "fire_count": ..}`
/// yield `["fire", "flood"]`.
pub fn read_dynamic_fields(keywords: &Map<String, JsonValue>, template: &FieldTemplate) -> Vec<String> {
    let suffix = template.key.replace(NAME_TOKEN, "");
    let mut tokens: Vec<String> = keywords.keys()
        .filter(|key| key.len() > suffix.len())
        .filter_map(|key| key.strip_suffix(suffix.as_str()))
        .map(str::to_string)
        .collect();
    tokens.sort();
    tokens
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn count_template() -> FieldTemplate {
        FieldTemplate::new("{}_count_field", "{}_count", FieldType::Double, 10, 0)
    }

    #[test]
    fn dynamic_template_substitutes_token() {
        let field = count_template().materialize(Some("flood"));
        assert_eq!(field, Field::new("flood_count", FieldType::Double, 10, 0));
    }

    #[test]
    fn dynamic_template_without_token_uses_null() {
        assert_eq!(count_template().materialize(None).name, "NULL_count");
    }

    #[test]
    fn static_template_ignores_token() {
        let template = FieldTemplate::new("population_field", "population", FieldType::Integer, 10, 0);
        assert!(!template.is_dynamic());
        assert_eq!(template.materialize(Some("ignored")).name, "population");
    }

    #[test]
    fn type_list_resolves_to_first_entry() {
        let template: FieldTemplate = serde_json::from_value(json!({
            "key": "size_field",
            "field_name": "size",
            "type": ["double", "integer"],
            "length": 12,
            "precision": 2
        })).unwrap();
        assert_eq!(template.primary, FieldType::Double);
        assert_eq!(template.fallbacks, vec![FieldType::Integer]);
        assert_eq!(template.materialize(None).ty, FieldType::Double);
    }

    #[test]
    fn reads_dynamic_tokens_from_keywords() {
        let keywords = json!({
            "flood_count_field": "flood_count",
            "fire_count_field": "fire_count",
            "population_field": "population",
            "_count_field": "orphan"
        });
        let tokens = read_dynamic_fields(keywords.as_object().unwrap(), &count_template());
        assert_eq!(tokens, vec!["fire".to_string(), "flood".to_string()]);
    }
}

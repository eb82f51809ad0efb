//! Form data model shared with the host form-builder
//!
//! The host owns form authoring and rendering; this crate only reads
//! submitted values and writes field defaults back before display.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Per-instance processor configuration authored in the host UI.
///
/// An ordered mapping from logical field name to either a literal value or a
/// form-field identifier. Control keys such as `contact_link` and the record
/// type discriminator live alongside the field mappings; handlers exclude
/// them with an ignore list. Iteration order is the author's configuration
/// order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProcessorConfig(Map<String, Value>);

impl ProcessorConfig {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Builder-style insert, handy when assembling configs in code.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// Numeric config values arrive either as numbers or as numeric strings,
    /// depending on the host's config UI.
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        match self.0.get(key)? {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// The name of the upstream contact processor this instance is linked to.
    /// An absent or empty link means the instance was never wired up.
    pub fn contact_link(&self) -> Option<&str> {
        self.get_str("contact_link").filter(|s| !s.is_empty())
    }

    /// Field mappings in configuration order: `(attribute, form_field_id)`
    /// pairs, excluding `ignore`d control keys and mappings the form author
    /// left blank.
    pub fn mappings<'a>(
        &'a self,
        ignore: &'a [&'a str],
    ) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
        self.0.iter().filter_map(move |(key, value)| {
            if ignore.contains(&key.as_str()) {
                return None;
            }
            match value {
                Value::String(field_id) if !field_id.is_empty() => {
                    Some((key.as_str(), field_id.as_str()))
                }
                _ => None,
            }
        })
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, Value)> for ProcessorConfig {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// A processor instance attached to a form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessorInstance {
    /// Instance identifier assigned by the host (unique within the form).
    pub id: String,
    /// Processor key this instance runs, e.g. `civicrm_address`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Inactive instances are skipped by both pipeline passes.
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub config: ProcessorConfig,
}

fn default_active() -> bool {
    true
}

impl ProcessorInstance {
    pub fn new(id: impl Into<String>, kind: impl Into<String>, config: ProcessorConfig) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            active: true,
            config,
        }
    }
}

/// Per-field configuration block. Only the `default` slot matters to this
/// crate: the render pass writes prefill values into it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

/// A single form field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormField {
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub config: FieldConfig,
    /// Submitted value, present only during the submit pass.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl FormField {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            config: FieldConfig::default(),
            value: None,
        }
    }

    pub fn with_value(mut self, value: impl Into<Value>) -> Self {
        self.value = Some(value.into());
        self
    }
}

/// The host's in-memory representation of a form: an ordered field list plus
/// the processor instances attached to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormDefinition {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FormField>,
    #[serde(default)]
    pub processors: Vec<ProcessorInstance>,
}

impl FormDefinition {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            fields: Vec::new(),
            processors: Vec::new(),
        }
    }

    pub fn field(&self, id: &str) -> Option<&FormField> {
        self.fields.iter().find(|f| f.id == id)
    }

    pub fn field_mut(&mut self, id: &str) -> Option<&mut FormField> {
        self.fields.iter_mut().find(|f| f.id == id)
    }

    /// Submitted value for a field, treating JSON null as absent.
    pub fn submitted_value(&self, field_id: &str) -> Option<&Value> {
        self.field(field_id)
            .and_then(|f| f.value.as_ref())
            .filter(|v| !v.is_null())
    }

    pub fn has_processors(&self) -> bool {
        !self.processors.is_empty()
    }
}

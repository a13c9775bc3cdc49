use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::definition::{CheckDefinition, CheckFailure};

/// Accepted value shape for a configurable check parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionKind {
    String,
    Number,
    Integer,
    Boolean,
}

impl OptionKind {
    fn accepts(self, value: &Value) -> bool {
        match self {
            OptionKind::String => value.is_string(),
            OptionKind::Number => value.is_number(),
            OptionKind::Integer => value.is_i64() || value.is_u64(),
            OptionKind::Boolean => value.is_boolean(),
        }
    }

    const fn label(self) -> &'static str {
        match self {
            OptionKind::String => "string",
            OptionKind::Number => "number",
            OptionKind::Integer => "integer",
            OptionKind::Boolean => "boolean",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckOptionDefinition {
    pub id: String,
    pub kind: OptionKind,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

impl CheckOptionDefinition {
    pub fn new(id: impl Into<String>, kind: OptionKind, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            description: description.into(),
            required: false,
            default: None,
        }
    }

    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

/// Options handed to a check after schema validation and default filling.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CheckOptions(Map<String, Value>);

impl CheckOptions {
    pub fn get(&self, id: &str) -> Option<&Value> {
        self.0.get(id)
    }

    pub fn integer(&self, id: &str) -> Option<i64> {
        self.0.get(id).and_then(Value::as_i64)
    }

    pub fn number(&self, id: &str) -> Option<f64> {
        self.0.get(id).and_then(Value::as_f64)
    }

    pub fn string(&self, id: &str) -> Option<&str> {
        self.0.get(id).and_then(Value::as_str)
    }

    pub fn boolean(&self, id: &str) -> Option<bool> {
        self.0.get(id).and_then(Value::as_bool)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Map<String, Value>> for CheckOptions {
    fn from(value: Map<String, Value>) -> Self {
        Self(value)
    }
}

/// Validate caller-supplied options against the definition's schema and fill defaults.
pub(crate) fn resolve_options(
    definition: &CheckDefinition,
    supplied: Option<&Map<String, Value>>,
) -> Result<CheckOptions, CheckFailure> {
    let mut resolved = Map::new();

    if let Some(supplied) = supplied {
        for (key, value) in supplied {
            let schema = definition
                .options
                .iter()
                .find(|option| &option.id == key)
                .ok_or_else(|| CheckFailure::UnknownOption(key.clone()))?;

            if !schema.kind.accepts(value) {
                return Err(CheckFailure::InvalidOption {
                    option: key.clone(),
                    reason: format!("expected {}, found {value}", schema.kind.label()),
                });
            }
            resolved.insert(key.clone(), value.clone());
        }
    }

    for option in &definition.options {
        if resolved.contains_key(&option.id) {
            continue;
        }
        match &option.default {
            Some(default) => {
                resolved.insert(option.id.clone(), default.clone());
            }
            None if option.required => {
                return Err(CheckFailure::MissingOption(option.id.clone()));
            }
            None => {}
        }
    }

    Ok(CheckOptions(resolved))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn definition() -> CheckDefinition {
        CheckDefinition::new("abstract-length", "Abstract length", "", "abstract")
            .with_option(
                CheckOptionDefinition::new("max", OptionKind::Integer, "maximum words")
                    .with_default(250),
            )
            .with_option(
                CheckOptionDefinition::new("part", OptionKind::String, "part name").required(),
            )
    }

    fn map(value: Value) -> Map<String, Value> {
        value.as_object().cloned().expect("object literal")
    }

    #[test]
    fn defaults_fill_absent_values() {
        let supplied = map(json!({ "part": "abstract" }));
        let options = resolve_options(&definition(), Some(&supplied)).expect("options resolve");
        assert_eq!(options.integer("max"), Some(250));
        assert_eq!(options.string("part"), Some("abstract"));
    }

    #[test]
    fn rejects_unknown_mistyped_and_missing_options() {
        let unknown = map(json!({ "part": "abstract", "colour": "blue" }));
        assert_eq!(
            resolve_options(&definition(), Some(&unknown)),
            Err(CheckFailure::UnknownOption("colour".to_string()))
        );

        let mistyped = map(json!({ "part": "abstract", "max": "lots" }));
        assert!(matches!(
            resolve_options(&definition(), Some(&mistyped)),
            Err(CheckFailure::InvalidOption { option, .. }) if option == "max"
        ));

        assert_eq!(
            resolve_options(&definition(), None),
            Err(CheckFailure::MissingOption("part".to_string()))
        );
    }
}

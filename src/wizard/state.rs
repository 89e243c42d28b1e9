//! Form state carried between wizard transitions.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::schema::FormSchema;

/// Value of a single form field.
///
/// Serialized untagged: `null`, a JSON string, or a JSON boolean.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    #[default]
    Empty,
    Text(String),
    Flag(bool),
}

impl FieldValue {
    /// Text content, if this is a text value
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Boolean content, treating anything other than `Flag(true)` as false
    pub fn is_checked(&self) -> bool {
        matches!(self, FieldValue::Flag(true))
    }

    /// True for `Empty` and for text that is blank after trimming
    pub fn is_blank(&self) -> bool {
        match self {
            FieldValue::Empty => true,
            FieldValue::Text(s) => s.trim().is_empty(),
            FieldValue::Flag(_) => false,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Flag(b)
    }
}

/// Field name to value mapping. This is the submission payload.
pub type FormValues = BTreeMap<String, FieldValue>;

/// Field name to validation message mapping
pub type FormErrors = BTreeMap<String, String>;

/// Complete state of one wizard session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormState {
    /// One entry per declared schema field
    pub values: FormValues,
    /// 1-based step index, always within `[1, step_count]`
    pub step: usize,
    /// Messages for fields currently failing validation
    #[serde(default)]
    pub errors: FormErrors,
}

impl FormState {
    /// Fresh state for a schema: every declared field empty, step 1, no errors
    pub fn initial(schema: &FormSchema) -> Self {
        Self {
            values: schema
                .fields()
                .map(|f| (f.name.to_string(), FieldValue::Empty))
                .collect(),
            step: 1,
            errors: FormErrors::new(),
        }
    }

    /// Value of a field, `Empty` when the field is not present
    pub fn value(&self, field: &str) -> &FieldValue {
        static EMPTY: FieldValue = FieldValue::Empty;
        self.values.get(field).unwrap_or(&EMPTY)
    }

    /// Validation message currently attached to a field
    pub fn error(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

//! Field Catalog: every discovered form field and its fill status.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Normalized input kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    Text,
    Email,
    Password,
    Number,
    Tel,
    Url,
    Search,
    Date,
    Time,
    DatetimeLocal,
    Month,
    Week,
    Color,
    Range,
    File,
    Checkbox,
    Radio,
    Select,
    Multiselect,
    Textarea,
    /// Any input type the loop does not interact with (`hidden`, `submit`, ...).
    Other(String),
}

impl FieldType {
    /// Normalize from an element's tag, `type` attribute and `multiple` flag.
    pub fn normalize(tag: &str, type_attr: Option<&str>, multiple: bool) -> Self {
        match tag.to_ascii_lowercase().as_str() {
            "select" if multiple => FieldType::Multiselect,
            "select" => FieldType::Select,
            "textarea" => FieldType::Textarea,
            _ => {
                let raw = type_attr.map(str::trim).unwrap_or_default();
                if raw.is_empty() {
                    FieldType::Text
                } else {
                    Self::from_type_attr(&raw.to_ascii_lowercase())
                }
            }
        }
    }

    fn from_type_attr(raw: &str) -> Self {
        match raw {
            "text" => FieldType::Text,
            "email" => FieldType::Email,
            "password" => FieldType::Password,
            "number" => FieldType::Number,
            "tel" => FieldType::Tel,
            "url" => FieldType::Url,
            "search" => FieldType::Search,
            "date" => FieldType::Date,
            "time" => FieldType::Time,
            "datetime-local" => FieldType::DatetimeLocal,
            "month" => FieldType::Month,
            "week" => FieldType::Week,
            "color" => FieldType::Color,
            "range" => FieldType::Range,
            "file" => FieldType::File,
            "checkbox" => FieldType::Checkbox,
            "radio" => FieldType::Radio,
            "select" | "select-one" => FieldType::Select,
            "multiselect" | "select-multiple" => FieldType::Multiselect,
            "textarea" => FieldType::Textarea,
            other => FieldType::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            FieldType::Text => "text",
            FieldType::Email => "email",
            FieldType::Password => "password",
            FieldType::Number => "number",
            FieldType::Tel => "tel",
            FieldType::Url => "url",
            FieldType::Search => "search",
            FieldType::Date => "date",
            FieldType::Time => "time",
            FieldType::DatetimeLocal => "datetime-local",
            FieldType::Month => "month",
            FieldType::Week => "week",
            FieldType::Color => "color",
            FieldType::Range => "range",
            FieldType::File => "file",
            FieldType::Checkbox => "checkbox",
            FieldType::Radio => "radio",
            FieldType::Select => "select",
            FieldType::Multiselect => "multiselect",
            FieldType::Textarea => "textarea",
            FieldType::Other(raw) => raw,
        }
    }

    /// Types whose values come from a fixed option set.
    pub fn is_choice(&self) -> bool {
        matches!(
            self,
            FieldType::Select | FieldType::Multiselect | FieldType::Radio
        )
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for FieldType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for FieldType {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(FieldType::from_type_attr(&raw.to_ascii_lowercase()))
    }
}

/// A synthesized value, shaped by the field type it was made for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Flag(bool),
    Choices(Vec<String>),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Flag(b) => write!(f, "{b}"),
            FieldValue::Choices(c) => write!(f, "[{}]", c.join(", ")),
        }
    }
}

/// One form input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub id: String,
    pub label: String,
    pub r#type: FieldType,
    /// Selectable choice labels; empty for non-choice fields.
    pub options: Vec<String>,
    pub filled: bool,
    pub value: Option<FieldValue>,
}

impl Field {
    pub fn new(id: impl Into<String>, label: impl Into<String>, r#type: FieldType) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            r#type,
            options: Vec::new(),
            filled: false,
            value: None,
        }
    }

    pub fn with_options(mut self, options: Vec<String>) -> Self {
        self.options = options;
        self
    }
}

/// Ordered field list keyed by id; insertion order is discovery order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldCatalog {
    fields: Vec<Field>,
}

impl FieldCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append fields whose ids are not yet known. Known fields keep their
    /// state untouched. Returns how many fields were added.
    pub fn merge(&mut self, discovered: impl IntoIterator<Item = Field>) -> usize {
        let mut added = 0;
        for field in discovered {
            if self.contains(&field.id) {
                continue;
            }
            self.fields.push(field);
            added += 1;
        }
        added
    }

    pub fn contains(&self, id: &str) -> bool {
        self.fields.iter().any(|f| f.id == id)
    }

    pub fn get(&self, id: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Field> {
        self.fields.iter_mut().find(|f| f.id == id)
    }

    /// First unfilled field in discovery order.
    pub fn first_unfilled(&self) -> Option<&Field> {
        self.fields.iter().find(|f| !f.filled)
    }

    pub fn unfilled_count(&self) -> usize {
        self.fields.iter().filter(|f| !f.filled).count()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Field> {
        self.fields.iter()
    }
}

impl<'a> IntoIterator for &'a FieldCatalog {
    type Item = &'a Field;
    type IntoIter = std::slice::Iter<'a, Field>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

impl FromIterator<Field> for FieldCatalog {
    fn from_iter<T: IntoIterator<Item = Field>>(iter: T) -> Self {
        let mut catalog = FieldCatalog::new();
        catalog.merge(iter);
        catalog
    }
}

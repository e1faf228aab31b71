use serde::{Deserialize, Serialize};

use crate::ScalarValue;

/// Direction a field flows in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldSide {
    Input,
    Output,
}

/// Primitive type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldType {
    String,
    Number,
    Boolean,
    File,
}

impl FieldType {
    /// Key used in the JSON body of a scalar upload (`{"string": ...}` etc).
    ///
    /// `None` for [`FieldType::File`], which is uploaded as a file or a URL reference.
    pub fn upload_key(&self) -> Option<&'static str> {
        match self {
            FieldType::String => Some("string"),
            FieldType::Number => Some("number"),
            FieldType::Boolean => Some("boolean"),
            FieldType::File => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::String => "STRING",
            FieldType::Number => "NUMBER",
            FieldType::Boolean => "BOOLEAN",
            FieldType::File => "FILE",
        }
    }
}

/// Declaration of one input or output slot of an execution instance.
///
/// Field names on the wire follow the control plane's record layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Which direction the field flows.
    #[serde(rename = "schema_type")]
    pub side: FieldSide,
    /// Unique name within the execution instance.
    #[serde(rename = "field_name")]
    pub name: String,
    /// Declared primitive type.
    pub field_type: FieldType,
    /// Presence on an output field makes it optional.
    #[serde(default)]
    pub default_value: Option<ScalarValue>,
    /// Value supplied by the control plane for input fields.
    #[serde(default)]
    pub value: Option<ScalarValue>,
}

impl FieldSpec {
    pub fn input(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            side: FieldSide::Input,
            name: name.into(),
            field_type,
            default_value: None,
            value: None,
        }
    }

    pub fn output(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            side: FieldSide::Output,
            name: name.into(),
            field_type,
            default_value: None,
            value: None,
        }
    }

    pub fn with_value(mut self, value: impl Into<ScalarValue>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_default(mut self, default: impl Into<ScalarValue>) -> Self {
        self.default_value = Some(default.into());
        self
    }

    #[inline]
    pub fn is_input(&self) -> bool {
        self.side == FieldSide::Input
    }

    #[inline]
    pub fn is_output(&self) -> bool {
        self.side == FieldSide::Output
    }

    /// An output field without a default must be produced by the task.
    #[inline]
    pub fn is_required_output(&self) -> bool {
        self.is_output() && self.default_value.is_none()
    }
}

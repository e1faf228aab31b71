use std::collections::HashMap;

use crate::{FieldSpec, MAX_FIELDS, SchemaError};

/// All fields declared for one execution instance, keyed by name.
///
/// Inputs and outputs share one namespace. Declaration order is kept for iteration.
/// A `FieldSet` always holds between 1 and [`MAX_FIELDS`] entries.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSet {
    fields: Vec<FieldSpec>,
    by_name: HashMap<String, usize>,
}

impl FieldSet {
    /// Parse the raw `get_values` response body.
    pub fn from_slice(body: &[u8]) -> Result<Self, SchemaError> {
        let fields: Vec<FieldSpec> =
            serde_json::from_slice(body).map_err(|e| SchemaError::Malformed(e.to_string()))?;
        Self::try_from(fields)
    }

    pub fn get(&self, name: &str) -> Option<&FieldSpec> {
        self.by_name.get(name).map(|&i| &self.fields[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Always `false`: a set holds at least one field.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter()
    }

    pub fn inputs(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(|f| f.is_input())
    }

    pub fn outputs(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(|f| f.is_output())
    }

    /// Names of output fields that carry no default and must be produced.
    pub fn required_outputs(&self) -> impl Iterator<Item = &str> {
        self.fields
            .iter()
            .filter(|f| f.is_required_output())
            .map(|f| f.name.as_str())
    }
}

impl TryFrom<Vec<FieldSpec>> for FieldSet {
    type Error = SchemaError;

    fn try_from(fields: Vec<FieldSpec>) -> Result<Self, Self::Error> {
        if fields.is_empty() {
            return Err(SchemaError::Empty);
        }
        if fields.len() > MAX_FIELDS {
            return Err(SchemaError::TooMany(fields.len()));
        }

        let mut by_name = HashMap::with_capacity(fields.len());
        for (i, field) in fields.iter().enumerate() {
            if by_name.insert(field.name.clone(), i).is_some() {
                return Err(SchemaError::DuplicateField(field.name.clone()));
            }
        }
        Ok(Self { fields, by_name })
    }
}

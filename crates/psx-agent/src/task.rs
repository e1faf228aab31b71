//! Plug-in point for the work an execution instance performs.
//!
//! A [`Task`] receives the input values the control plane supplied and returns the
//! outputs it produced. The [`Agent`](crate::Agent) takes one as a dependency; tasks
//! never see the platform directly.
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use psx_model::{FieldSet, ScalarValue};
use serde_json::Value;

use crate::TaskError;

/// Shared handle to a task.
pub type TaskRef = Arc<dyn Task>;

#[async_trait]
pub trait Task: Send + Sync {
    /// Human-readable name, used in the start-up report.
    fn name(&self) -> &str;

    /// Run the task once.
    async fn execute(&self, inputs: Inputs) -> Result<Outputs, TaskError>;
}

/// Adapter turning an async closure into a [`Task`].
pub struct TaskFn<F> {
    name: String,
    f: F,
}

impl<F, Fut> TaskFn<F>
where
    F: Fn(Inputs) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Outputs, TaskError>> + Send + 'static,
{
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    pub fn arc(name: impl Into<String>, f: F) -> TaskRef {
        Arc::new(Self::new(name, f))
    }
}

#[async_trait]
impl<F, Fut> Task for TaskFn<F>
where
    F: Fn(Inputs) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Outputs, TaskError>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&self, inputs: Inputs) -> Result<Outputs, TaskError> {
        (self.f)(inputs).await
    }
}

/// Input values by field name. A value may be absent when the control plane sent `null`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Inputs(HashMap<String, Option<ScalarValue>>);

impl Inputs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect `name -> value` for every INPUT field.
    pub fn from_fields(fields: &FieldSet) -> Self {
        fields
            .inputs()
            .map(|f| (f.name.clone(), f.value.clone()))
            .collect()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Option<ScalarValue>) {
        self.0.insert(name.into(), value);
    }

    /// `true` if the field was declared, even when its value is absent.
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&ScalarValue> {
        self.0.get(name).and_then(Option::as_ref)
    }

    pub fn string(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(ScalarValue::as_str)
    }

    pub fn number(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(ScalarValue::as_f64)
    }

    pub fn boolean(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(ScalarValue::as_bool)
    }

    /// Like [`Inputs::string`], but a missing value is a [`TaskError::InvalidInput`].
    pub fn require_string(&self, name: &str) -> Result<&str, TaskError> {
        self.string(name).ok_or_else(|| TaskError::InvalidInput {
            field: name.to_string(),
            reason: "expected a string value".to_string(),
        })
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&ScalarValue>)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_ref()))
    }
}

impl<K: Into<String>> FromIterator<(K, Option<ScalarValue>)> for Inputs {
    fn from_iter<I: IntoIterator<Item = (K, Option<ScalarValue>)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Produced outputs in the order the task returned them.
///
/// Values are raw JSON so type mismatches surface at validation rather than here.
/// Re-inserting a name replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Outputs(Vec<(String, Value)>);

impl Outputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        let name = name.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == name) {
            Some(slot) => slot.1 = value,
            None => self.0.push((name, value)),
        }
        self
    }

    /// Builder form of [`Outputs::insert`].
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl IntoIterator for Outputs {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Outputs {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut out = Outputs::new();
        for (k, v) in iter {
            out.insert(k, v);
        }
        out
    }
}

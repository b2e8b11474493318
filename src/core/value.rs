//! Free-form values read by value-comparing conditions.

use std::sync::{Arc, Mutex, PoisonError};

pub use serde_json::Value;

/// Cloneable cell holding a [`Value`].
///
/// A `Value` condition keeps one clone and compares its content at
/// evaluation time; the caller keeps another and updates it.
///
/// # Example
///
/// ```rust
/// use tickwise::core::SharedValue;
/// use serde_json::json;
///
/// let cell = SharedValue::new(json!(false));
/// let reader = cell.clone();
/// cell.set(json!(true));
/// assert_eq!(reader.get(), json!(true));
/// ```
#[derive(Debug, Clone, Default)]
pub struct SharedValue {
    inner: Arc<Mutex<Value>>,
}

impl SharedValue {
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(value.into())),
        }
    }

    pub fn get(&self) -> Value {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set(&self, value: impl Into<Value>) {
        *self.inner.lock().unwrap_or_else(PoisonError::into_inner) = value.into();
    }

    /// Compare the held value without cloning it.
    pub fn matches(&self, expected: &Value) -> bool {
        *self.inner.lock().unwrap_or_else(PoisonError::into_inner) == *expected
    }
}

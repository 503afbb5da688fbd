//! Pool descriptor types.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Descriptor of the inference pool this activator fronts.
///
/// Identified by `(namespace, name)`. All scaling behavior is configured
/// declaratively through the annotation map; the recognized keys live in
/// the activator's configuration module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InferencePool {
    pub name: String,
    pub namespace: String,
    #[serde(default)]
    pub annotations: HashMap<String, String>,
}

impl InferencePool {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            annotations: HashMap::new(),
        }
    }

    /// Look up an annotation value.
    pub fn annotation(&self, key: &str) -> Option<&str> {
        self.annotations.get(key).map(String::as_str)
    }

    /// `namespace/name` identity, as used in logs.
    pub fn id(&self) -> String {
        format!("{}/{}", self.namespace, self.name)
    }
}

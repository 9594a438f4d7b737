use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::SchemaViolation;
use crate::models::variable::Variable;

/// A named set of variables. The pipeline only ever reads it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Environment {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Keyed by variable name.
    #[serde(default)]
    pub variables: HashMap<String, Variable>,
}

impl Environment {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            variables: HashMap::new(),
        }
    }

    /// An environment with no variables; resolution against it is the identity.
    pub fn empty() -> Self {
        Self::new("empty", "No Environment")
    }

    /// Add (or replace) a variable, keyed by its name.
    pub fn with_variable(mut self, variable: Variable) -> Self {
        self.variables.insert(variable.name.clone(), variable);
        self
    }

    /// Value of `name` if the variable exists and is enabled.
    pub fn enabled_value(&self, name: &str) -> Option<&str> {
        self.variables
            .get(name)
            .filter(|v| v.enabled)
            .map(|v| v.value.as_str())
    }

    pub fn validate(&self) -> Result<(), SchemaViolation> {
        if self.id.is_empty() {
            return Err(SchemaViolation::new("environment", "`id` must not be empty"));
        }
        for (key, variable) in &self.variables {
            variable.validate()?;
            if key != &variable.name {
                return Err(SchemaViolation::new(
                    "environment",
                    format!(
                        "variable key '{}' does not match variable name '{}'",
                        key, variable.name
                    ),
                ));
            }
        }
        Ok(())
    }
}

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::SchemaViolation;

const MASK: &str = "••••••";

#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Variable {
    pub id: String,
    pub name: String,
    pub value: String,
    /// Masks the value for display. Substitution ignores it.
    #[serde(default)]
    pub secure: bool,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl Variable {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            value: value.into(),
            secure: false,
            enabled: true,
        }
    }

    pub fn secure(mut self) -> Self {
        self.secure = true;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Value as it may be shown to a user or written to logs.
    pub fn display_value(&self) -> &str {
        if self.secure {
            MASK
        } else {
            &self.value
        }
    }

    pub fn validate(&self) -> Result<(), SchemaViolation> {
        if self.id.is_empty() {
            return Err(SchemaViolation::new("variable", "`id` must not be empty"));
        }
        if self.name.is_empty() {
            return Err(SchemaViolation::new("variable", "`name` must not be empty"));
        }
        Ok(())
    }
}

impl fmt::Debug for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Variable")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("value", &self.display_value())
            .field("secure", &self.secure)
            .field("enabled", &self.enabled)
            .finish()
    }
}

use serde::{Deserialize, Serialize};

use crate::domain::fields::FieldSpec;

/// Configuration for the profile_update module
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileUpdateConfig {
    /// Additional fields registered at startup.
    #[serde(default)]
    pub fields: Vec<FieldSpec>,
    #[serde(default = "default_max_fields_per_update")]
    pub max_fields_per_update: usize,
}

impl Default for ProfileUpdateConfig {
    fn default() -> Self {
        Self {
            fields: Vec::new(),
            max_fields_per_update: default_max_fields_per_update(),
        }
    }
}

fn default_max_fields_per_update() -> usize {
    64
}

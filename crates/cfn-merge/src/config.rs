//! Classification configuration file.
//!
//! The default tables cover the CloudFormation and Serverless constructs the
//! merger is usually pointed at. Other resource types can be classified with
//! a small YAML file:
//!
//! ```yaml
//! array-eligible-keys: [SecurityGroupIds, SubnetIds]
//! identity-keys:
//!   Tags: Key
//! replace-keys: [Fn::Select]
//! ```
//!
//! Entries are added to the defaults unless `replace-defaults: true`.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::classification::Classification;
use crate::error::ConfigError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct ClassificationConfig {
    /// Start from empty tables instead of the CloudFormation defaults
    pub replace_defaults: bool,

    /// Additional keys that may hold a single value or a list
    pub array_eligible_keys: Vec<String>,

    /// Additional element name to identity field entries
    pub identity_keys: BTreeMap<String, String>,

    /// Additional names whose values are replaced wholesale
    pub replace_keys: Vec<String>,
}

impl ClassificationConfig {
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        // An empty file means "no changes".
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&text)
    }

    /// Build the classification this configuration describes.
    pub fn into_classification(self) -> Classification {
        let base = if self.replace_defaults {
            Classification::empty()
        } else {
            Classification::cloudformation()
        };

        let with_arrays = self
            .array_eligible_keys
            .iter()
            .fold(base, |c, key| c.with_array_eligible(key));
        let with_identities = self
            .identity_keys
            .into_iter()
            .fold(with_arrays, |c, (element, field)| c.with_identity_key(element, field));
        self.replace_keys
            .iter()
            .fold(with_identities, |c, key| c.with_replace_key(key))
    }
}

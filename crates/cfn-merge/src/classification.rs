//! Lookup tables deciding how individual keys are merged.

use std::collections::{HashMap, HashSet};

/// Keys whose value may be written as a single item or as a list.
const ARRAY_ELIGIBLE_KEYS: &[&str] = &[
    "Statement",
    "Action",
    "NotAction",
    "Resource",
    "NotResource",
    "AWS",
    "Service",
    "Federated",
    "Condition",
    "ManagedPolicyArns",
    "DependsOn",
    "Policies",
    // Serverless Framework provider settings
    "iamRoleStatements",
    "iamManagedPolicies",
];

/// List elements whose entries are identified by one of their fields.
const IDENTITY_KEYS: &[(&str, &str)] = &[
    ("Statement", "Sid"),
    ("Policies", "PolicyName"),
    ("iamRoleStatements", "Sid"),
];

/// Intrinsic functions whose argument list is atomic.
const REPLACE_KEYS: &[&str] = &["Fn::If", "Fn::Equals", "Fn::Not", "Fn::Or", "Fn::And"];

/// Classification of template keys for merging.
///
/// All lookups are case-insensitive. A classification is immutable once
/// built; construct it once and share it (it is `Send + Sync`).
///
/// # Example
///
/// ```rust
/// use cfn_merge::Classification;
///
/// let classification = Classification::cloudformation().with_identity_key("Tags", "Key");
/// assert!(classification.is_array_eligible("action"));
/// assert_eq!(classification.identity_key("STATEMENT"), Some("Sid"));
/// assert_eq!(classification.identity_key("Tags"), Some("Key"));
/// assert!(classification.replaces("fn::if"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    /// Lower-cased keys that may hold a single value or a list
    array_eligible: HashSet<String>,

    /// Lower-cased element name to identity field name
    identity_keys: HashMap<String, String>,

    /// Lower-cased names whose values are replaced rather than merged
    replace_keys: HashSet<String>,
}

impl Classification {
    /// A classification with no entries: every key merges structurally.
    pub fn empty() -> Self {
        Self {
            array_eligible: HashSet::new(),
            identity_keys: HashMap::new(),
            replace_keys: HashSet::new(),
        }
    }

    /// The tables for CloudFormation and Serverless templates.
    pub fn cloudformation() -> Self {
        let mut classification = Self::empty();
        for key in ARRAY_ELIGIBLE_KEYS {
            classification = classification.with_array_eligible(key);
        }
        for (element, field) in IDENTITY_KEYS {
            classification = classification.with_identity_key(element, *field);
        }
        for key in REPLACE_KEYS {
            classification = classification.with_replace_key(key);
        }
        classification
    }

    /// Add a key whose value may be a single item or a list.
    pub fn with_array_eligible(mut self, key: impl AsRef<str>) -> Self {
        self.array_eligible.insert(normalize(key.as_ref()));
        self
    }

    /// Identify entries of `element` lists by their `field` value.
    pub fn with_identity_key(mut self, element: impl AsRef<str>, field: impl Into<String>) -> Self {
        self.identity_keys
            .insert(normalize(element.as_ref()), field.into());
        self
    }

    /// Replace values under `name` wholesale instead of merging them.
    pub fn with_replace_key(mut self, name: impl AsRef<str>) -> Self {
        self.replace_keys.insert(normalize(name.as_ref()));
        self
    }

    pub fn is_array_eligible(&self, key: &str) -> bool {
        self.array_eligible.contains(&normalize(key))
    }

    /// Field identifying entries of a list stored under `key`.
    pub fn identity_key(&self, key: &str) -> Option<&str> {
        self.identity_keys.get(&normalize(key)).map(String::as_str)
    }

    pub fn replaces(&self, key: &str) -> bool {
        self.replace_keys.contains(&normalize(key))
    }
}

impl Default for Classification {
    fn default() -> Self {
        Self::cloudformation()
    }
}

fn normalize(name: &str) -> String {
    name.to_ascii_lowercase()
}

//! CloudFormation-aware merging of template fragments.
//!
//! This crate merges a partial template (the *source* fragment) into a larger
//! one (the *target*), following the loose typing CloudFormation and
//! Serverless templates allow.
//!
//! # Key Features
//!
//! - **Recursive mapping merge**: keys from both sides are kept, conflicts
//!   between scalars go to the source
//! - **Array reconciliation**: keys such as `Action` or `Condition` may be a
//!   single value or a list; both shapes are combined into one de-duplicated list
//! - **Identity-keyed lists**: IAM statements with the same `Sid` (or policies
//!   with the same `PolicyName`) are merged into one entry
//! - **Atomic intrinsics**: condition functions (`!If`, `!Equals`, ...) are
//!   replaced wholesale, never concatenated
//!
//! # Architecture
//!
//! - [`Classification`]: the lookup tables deciding which keys get list,
//!   identity or replace treatment
//! - [`FragmentMerger`]: the pure merge engine, closing over a classification
//! - [`ClassificationConfig`]: YAML file extending the default tables
//! - [`batch`]: file and directory orchestration around the engine
//!
//! # Example
//!
//! ```rust
//! use cfn_merge::FragmentMerger;
//!
//! let target = cfn_yaml::parse("Action: [s3:GetObject]").unwrap();
//! let source = cfn_yaml::parse("Action: s3:PutObject").unwrap();
//!
//! let merged = FragmentMerger::default().merge(target, source);
//! assert_eq!(
//!     cfn_yaml::to_yaml_string(&merged),
//!     "Action:\n  - s3:GetObject\n  - s3:PutObject\n"
//! );
//! ```

pub mod batch;
mod classification;
mod config;
mod error;
mod merge;
mod unique;

pub use classification::Classification;
pub use config::ClassificationConfig;
pub use error::{ConfigError, MergeError};
pub use merge::{merge, FragmentMerger};
pub use unique::unique;

// Re-export for convenience
pub use cfn_yaml::DocumentNode;

//! # cfn-yaml
//!
//! YAML parsing and emission for CloudFormation and Serverless templates.
//!
//! This crate provides [`DocumentNode`], a small tree model that keeps the
//! short-form intrinsic function tags (`!Ref`, `!GetAtt`, `!If`, ...) as
//! explicit [`TaggedNode`] values instead of collapsing them into strings.
//! Trees round-trip through [`parse`] and [`to_yaml_string`] with tags and
//! sibling key order preserved.
//!
//! ## Example
//!
//! ```rust
//! use cfn_yaml::{parse, to_yaml_string};
//!
//! let doc = parse("Value: !Ref Bucket").unwrap();
//! let tagged = doc.get("Value").and_then(|v| v.as_tagged()).unwrap();
//! assert_eq!(tagged.tag, "Ref");
//! assert_eq!(to_yaml_string(&doc), "Value: !Ref Bucket\n");
//! ```

mod emitter;
mod error;
pub mod intrinsics;
mod json;
mod node;
mod parser;
mod source_info;

pub use emitter::to_yaml_string;
pub use error::{Error, Result};
pub use json::{from_json, to_json};
pub use node::{DocumentNode, Mapping, Scalar, TaggedNode};
pub use parser::{parse, parse_file};
pub use source_info::SourceInfo;

//! Conversion between template trees and JSON values.
//!
//! JSON templates have no tags, so intrinsic functions use the long form:
//! `!Ref Bucket` becomes `{"Ref": "Bucket"}`. Reading JSON never produces
//! tagged nodes; long-form intrinsics stay single-key mappings.

use crate::{DocumentNode, Mapping, Scalar};
use serde_json::{Map, Number, Value};

/// Convert a tree to a JSON value using long-form intrinsics.
pub fn to_json(node: &DocumentNode) -> Value {
    match node {
        DocumentNode::Mapping(map) => Value::Object(
            map.iter()
                .map(|(key, value)| (key.clone(), to_json(value)))
                .collect(),
        ),
        DocumentNode::Sequence(items) => Value::Array(items.iter().map(to_json).collect()),
        DocumentNode::Scalar(scalar) => scalar_to_json(scalar),
        DocumentNode::Tagged(tagged) => {
            let body = match (tagged.tag.as_str(), tagged.body.as_str()) {
                // `!GetAtt Resource.Attribute` is only valid in short form.
                ("Fn::GetAtt", Some(path)) => match path.split_once('.') {
                    Some((resource, attribute)) => Value::Array(vec![
                        Value::String(resource.to_string()),
                        Value::String(attribute.to_string()),
                    ]),
                    None => Value::String(path.to_string()),
                },
                _ => to_json(&tagged.body),
            };
            let mut object = Map::new();
            object.insert(tagged.tag.clone(), body);
            Value::Object(object)
        }
    }
}

fn scalar_to_json(scalar: &Scalar) -> Value {
    match scalar {
        Scalar::Null => Value::Null,
        Scalar::Bool(b) => Value::Bool(*b),
        Scalar::Integer(i) => Value::Number((*i).into()),
        Scalar::Real(r) => r
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map_or_else(|| Value::String(r.clone()), Value::Number),
        Scalar::String(s) => Value::String(s.clone()),
    }
}

/// Convert a JSON value to a tree.
pub fn from_json(value: Value) -> DocumentNode {
    match value {
        Value::Null => DocumentNode::null(),
        Value::Bool(b) => DocumentNode::from(b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => DocumentNode::from(i),
            None => DocumentNode::Scalar(Scalar::Real(n.to_string())),
        },
        Value::String(s) => DocumentNode::string(s),
        Value::Array(items) => DocumentNode::Sequence(items.into_iter().map(from_json).collect()),
        Value::Object(object) => DocumentNode::Mapping(
            object
                .into_iter()
                .map(|(key, value)| (key, from_json(value)))
                .collect::<Mapping>(),
        ),
    }
}

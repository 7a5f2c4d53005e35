//! The fragment merge engine.
//!
//! Merging walks both trees together. Where a key exists on both sides the
//! value is resolved by the first rule that applies:
//!
//! 1. **Replace**: keys classified as atomic (`Fn::If`, `Fn::Equals`, ...)
//!    take the source value verbatim.
//! 2. **List**: array-eligible keys, or values where either side is a
//!    sequence, are combined target-first into one list, then de-duplicated
//!    (see [`unique`](crate::unique)).
//! 3. **Structural**: two mappings merge key by key; anything else goes to
//!    the source.
//!
//! Tagged nodes behave like single-key mappings `{tag: body}`: two calls to
//! the same function resolve their bodies under the function name, so two
//! `!If` calls end up replaced by rule 1.

use std::sync::Arc;

use cfn_yaml::{DocumentNode, Mapping, TaggedNode};
use tracing::trace;

use crate::classification::Classification;

/// Merges template fragments according to a [`Classification`].
///
/// The merger is cheap to clone and safe to share between threads. Each call
/// consumes its input trees; clone them first if the originals are still
/// needed.
#[derive(Debug, Clone, Default)]
pub struct FragmentMerger {
    classification: Arc<Classification>,
}

impl FragmentMerger {
    pub fn new(classification: Classification) -> Self {
        Self::from_shared(Arc::new(classification))
    }

    /// Create a merger over tables shared with other mergers.
    pub fn from_shared(classification: Arc<Classification>) -> Self {
        Self { classification }
    }

    pub fn classification(&self) -> &Classification {
        &self.classification
    }

    /// Merge `source` into `target`.
    pub fn merge(&self, target: DocumentNode, source: DocumentNode) -> DocumentNode {
        merge(target, source, &self.classification)
    }

    /// De-duplicate a list, merging entries that share `identity_field`.
    pub fn unique(
        &self,
        items: Vec<DocumentNode>,
        identity_field: Option<&str>,
    ) -> Vec<DocumentNode> {
        crate::unique(items, identity_field, &self.classification)
    }
}

/// Merge `source` into `target` using `classification`.
///
/// # Example
///
/// ```rust
/// use cfn_merge::{merge, Classification};
///
/// let target = cfn_yaml::parse("Value: !If [IsProd, a, b]").unwrap();
/// let source = cfn_yaml::parse("Value: !If [IsDev, c, d]").unwrap();
///
/// let merged = merge(target, source.clone(), &Classification::cloudformation());
/// assert_eq!(merged, source);
/// ```
pub fn merge(
    target: DocumentNode,
    source: DocumentNode,
    classification: &Classification,
) -> DocumentNode {
    Resolver { classification }.resolve(None, target, source)
}

/// One merge invocation over borrowed tables.
pub(crate) struct Resolver<'a> {
    pub(crate) classification: &'a Classification,
}

impl Resolver<'_> {
    /// Resolve a value present on both sides. `key` is the mapping key (or
    /// function name) the values sit under, if any.
    pub(crate) fn resolve(
        &self,
        key: Option<&str>,
        target: DocumentNode,
        source: DocumentNode,
    ) -> DocumentNode {
        if let Some(key) = key {
            if self.classification.replaces(key) {
                trace!(key, "replacing value");
                return source;
            }
        }

        let array_eligible = key.is_some_and(|key| self.classification.is_array_eligible(key));
        if array_eligible || target.is_sequence() || source.is_sequence() {
            return self.combine_lists(key, target, source);
        }

        match (target, source) {
            (DocumentNode::Mapping(target), DocumentNode::Mapping(source)) => {
                DocumentNode::Mapping(self.merge_mappings(target, source))
            }
            (DocumentNode::Tagged(target), DocumentNode::Tagged(source))
                if target.tag == source.tag =>
            {
                let body = self.resolve(Some(&target.tag), *target.body, *source.body);
                DocumentNode::Tagged(TaggedNode::new(target.tag, body))
            }
            (_, source) => source,
        }
    }

    fn merge_mappings(&self, mut target: Mapping, source: Mapping) -> Mapping {
        for (key, source_value) in source {
            match target.get_mut(&key) {
                Some(slot) => {
                    let target_value = std::mem::take(slot);
                    *slot = self.resolve(Some(&key), target_value, source_value);
                }
                None => {
                    target.insert(key, source_value);
                }
            }
        }
        target
    }

    /// Combine two values into one list, target entries first.
    fn combine_lists(
        &self,
        key: Option<&str>,
        target: DocumentNode,
        source: DocumentNode,
    ) -> DocumentNode {
        let items = match (target, source) {
            (DocumentNode::Sequence(mut target), DocumentNode::Sequence(source)) => {
                target.extend(source);
                target
            }
            (DocumentNode::Sequence(mut target), source) => {
                target.push(source);
                target
            }
            (target, DocumentNode::Sequence(mut source)) => {
                source.insert(0, target);
                source
            }
            (target, source) => {
                if target == source {
                    return target;
                }
                vec![target, source]
            }
        };

        let identity_field = key.and_then(|key| self.classification.identity_key(key));
        DocumentNode::Sequence(self.unique(items, identity_field))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cfn_yaml::parse;

    fn merge_yaml(target: &str, source: &str) -> DocumentNode {
        FragmentMerger::default().merge(parse(target).unwrap(), parse(source).unwrap())
    }

    #[test]
    fn test_disjoint_keys_are_combined() {
        let merged = merge_yaml("a: 1\nb: 2", "c: 3");
        assert_eq!(merged, parse("a: 1\nb: 2\nc: 3").unwrap());
    }

    #[test]
    fn test_target_key_order_is_kept() {
        let merged = merge_yaml("b: 1\na: 2", "a: 3\nc: 4");
        let keys: Vec<&str> = merged.as_mapping().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_scalar_conflict_goes_to_source() {
        let merged = merge_yaml("Timeout: 30", "Timeout: 60");
        assert_eq!(merged, parse("Timeout: 60").unwrap());
    }

    #[test]
    fn test_type_mismatch_goes_to_source() {
        let merged = merge_yaml("Properties: {A: 1}", "Properties: none");
        assert_eq!(merged, parse("Properties: none").unwrap());

        let merged = merge_yaml("Value: plain", "Value: !Ref Param");
        assert_eq!(merged, parse("Value: !Ref Param").unwrap());
    }

    #[test]
    fn test_nested_mappings_merge() {
        let merged = merge_yaml(
            "environment:\n  STAGE: dev\n  TABLE: users",
            "environment:\n  TABLE: accounts\n  QUEUE: jobs",
        );
        assert_eq!(
            merged,
            parse("environment:\n  STAGE: dev\n  TABLE: accounts\n  QUEUE: jobs").unwrap()
        );
    }

    #[test]
    fn test_sequences_concatenate_target_first() {
        let merged = merge_yaml("Action: [a1, a2]", "Action: [a2, a3]");
        assert_eq!(merged, parse("Action: [a1, a2, a3]").unwrap());
    }

    #[test]
    fn test_unclassified_sequences_also_concatenate() {
        let merged = merge_yaml("Layers: [one]", "Layers: [two, one]");
        assert_eq!(merged, parse("Layers: [one, two]").unwrap());
    }

    #[test]
    fn test_single_target_value_is_prepended() {
        let merged = merge_yaml("Action: s3:GetObject", "Action: [s3:PutObject]");
        assert_eq!(merged, parse("Action: [s3:GetObject, s3:PutObject]").unwrap());
    }

    #[test]
    fn test_two_single_values_become_a_list() {
        let merged = merge_yaml("Resource: arn:a", "Resource: arn:b");
        assert_eq!(merged, parse("Resource: [arn:a, arn:b]").unwrap());
    }

    #[test]
    fn test_equal_single_values_stay_single() {
        let merged = merge_yaml("Resource: arn:a", "Resource: arn:a");
        assert_eq!(merged, parse("Resource: arn:a").unwrap());
    }

    #[test]
    fn test_condition_functions_are_replaced() {
        let merged = merge_yaml("Foo: !If [A, 1, 2]", "Foo: !If [B, 3, 4]");
        assert_eq!(merged, parse("Foo: !If [B, 3, 4]").unwrap());

        let merged = merge_yaml("Foo: !Equals [a, b]", "Foo: !Equals [c, d]");
        assert_eq!(merged, parse("Foo: !Equals [c, d]").unwrap());
    }

    #[test]
    fn test_long_form_condition_functions_are_replaced() {
        let merged = merge_yaml("Foo:\n  Fn::Or: [A, B]", "Foo:\n  Fn::Or: [C]");
        assert_eq!(merged, parse("Foo:\n  Fn::Or: [C]").unwrap());
    }

    #[test]
    fn test_other_functions_merge_their_arguments() {
        let merged = merge_yaml("Value: !Join ['', [a]]", "Value: !Join ['', [b]]");
        assert_eq!(merged, parse("Value: !Join ['', [a], [b]]").unwrap());
    }

    #[test]
    fn test_different_functions_go_to_source() {
        let merged = merge_yaml("Value: !Ref Param", "Value: !Sub '${Param}-x'");
        assert_eq!(merged, parse("Value: !Sub '${Param}-x'").unwrap());
    }

    #[test]
    fn test_root_sequences_concatenate() {
        let merged = merge_yaml("[a, b]", "[b, c]");
        assert_eq!(merged, parse("[a, b, c]").unwrap());
    }

    #[test]
    fn test_root_scalars_go_to_source() {
        let merged = merge_yaml("one", "two");
        assert_eq!(merged, DocumentNode::from("two"));
    }

    #[test]
    fn test_custom_classification() {
        let merger = FragmentMerger::new(Classification::empty().with_replace_key("Tags"));
        let merged = merger.merge(
            parse("Tags: [{Key: a, Value: 1}]").unwrap(),
            parse("Tags: [{Key: b, Value: 2}]").unwrap(),
        );
        assert_eq!(merged, parse("Tags: [{Key: b, Value: 2}]").unwrap());
    }
}

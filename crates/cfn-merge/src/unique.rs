//! List de-duplication with identity-keyed merging.

use cfn_yaml::{DocumentNode, Scalar};
use tracing::trace;

use crate::classification::Classification;
use crate::merge::Resolver;

/// De-duplicate a list produced by a merge.
///
/// With an `identity_field` (such as `Sid`), mapping entries that carry the
/// same scalar value for that field are merged into one: the earlier entry is
/// the target, the later one the source, and the result takes the later
/// entry's position. The whole list is scanned, so matching entries need not
/// be adjacent. Entries without the field, or with a non-scalar value, are
/// left alone.
///
/// Only the identity field is looked up case-insensitively. The merge of two
/// matched entries compares keys exactly, so `{sid: S1}` merged with
/// `{Sid: S1}` keeps both the `sid` and the `Sid` key.
///
/// Afterwards exact duplicates are removed, keeping the first occurrence.
///
/// # Example
///
/// ```rust
/// use cfn_merge::{unique, Classification};
/// use cfn_yaml::{parse, DocumentNode};
///
/// let list = parse("- {Sid: Read, Action: [a]}\n- other\n- {Sid: Read, Action: [b]}\n- other").unwrap();
/// let items = list.into_sequence();
///
/// let result = unique(items, Some("Sid"), &Classification::cloudformation());
/// assert_eq!(
///     DocumentNode::Sequence(result),
///     parse("- other\n- {Sid: Read, Action: [a, b]}").unwrap()
/// );
/// ```
pub fn unique(
    items: Vec<DocumentNode>,
    identity_field: Option<&str>,
    classification: &Classification,
) -> Vec<DocumentNode> {
    Resolver { classification }.unique(items, identity_field)
}

impl Resolver<'_> {
    pub(crate) fn unique(
        &self,
        items: Vec<DocumentNode>,
        identity_field: Option<&str>,
    ) -> Vec<DocumentNode> {
        let items = match identity_field {
            Some(field) => self.merge_by_identity(items, field),
            None => items,
        };
        dedupe(items)
    }

    fn merge_by_identity(&self, items: Vec<DocumentNode>, field: &str) -> Vec<DocumentNode> {
        let mut slots: Vec<Option<DocumentNode>> = items.into_iter().map(Some).collect();

        for i in 0..slots.len() {
            let Some(id) = slots[i]
                .as_ref()
                .and_then(|node| identity_value(node, field))
                .cloned()
            else {
                continue;
            };

            let partner = (i + 1..slots.len()).find(|&j| {
                slots[j]
                    .as_ref()
                    .and_then(|node| identity_value(node, field))
                    == Some(&id)
            });

            if let Some(j) = partner {
                trace!(field, identity = ?id, "merging list entries");
                let earlier = slots[i].take();
                if let (Some(earlier), Some(slot)) = (earlier, slots[j].as_mut()) {
                    let later = std::mem::take(slot);
                    *slot = self.resolve(None, earlier, later);
                }
            }
        }

        slots.into_iter().flatten().collect()
    }
}

/// Scalar value of `field` in a mapping entry. Null counts as absent.
fn identity_value<'a>(node: &'a DocumentNode, field: &str) -> Option<&'a Scalar> {
    match node.get_ignore_case(field)? {
        DocumentNode::Scalar(Scalar::Null) => None,
        DocumentNode::Scalar(scalar) => Some(scalar),
        _ => None,
    }
}

/// Remove structurally equal entries, keeping first occurrences in order.
fn dedupe(items: Vec<DocumentNode>) -> Vec<DocumentNode> {
    let mut result: Vec<DocumentNode> = Vec::with_capacity(items.len());
    for item in items {
        if !result.contains(&item) {
            result.push(item);
        }
    }
    result
}

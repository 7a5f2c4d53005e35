//! YAML parser that builds [`DocumentNode`] trees.

use crate::intrinsics;
use crate::{DocumentNode, Error, Mapping, Result, Scalar, SourceInfo};
use yaml_rust2::parser::{Event, MarkedEventReceiver, Parser, Tag};
use yaml_rust2::scanner::{Marker, TScalarStyle};

/// Handles the YAML core schema tags (`!!str`, `!!int`, ...) resolve to.
const CORE_TAG_HANDLES: &[&str] = &["!!", "tag:yaml.org,2002:"];

/// Parse a template from a string.
///
/// Only the first document of a multi-document stream is read. An input
/// with no document at all (empty, or only comments) parses to an empty
/// mapping.
///
/// # Example
///
/// ```rust
/// use cfn_yaml::parse;
///
/// let doc = parse("Conditions:\n  IsProd: !Equals [!Ref Env, prod]").unwrap();
/// let equals = doc.get_path(&["Conditions", "IsProd"]).unwrap();
/// assert_eq!(equals.as_tagged().unwrap().tag, "Fn::Equals");
/// ```
///
/// # Errors
///
/// Returns an error on invalid YAML, aliases, and non-scalar mapping keys.
pub fn parse(content: &str) -> Result<DocumentNode> {
    let mut parser = Parser::new_from_str(content);
    let mut builder = TreeBuilder::default();

    parser.load(&mut builder, false)?; // false = single document only

    builder.result()
}

/// Parse a template, attaching `filename` to error locations.
pub fn parse_file(content: &str, filename: &str) -> Result<DocumentNode> {
    parse(content).map_err(|err| err.with_file(filename))
}

/// Receives parser events and assembles the tree.
#[derive(Default)]
struct TreeBuilder {
    /// Containers still being filled, innermost last
    stack: Vec<BuildNode>,

    /// The completed root node
    root: Option<DocumentNode>,

    /// First structural error; later events are ignored once set
    error: Option<Error>,
}

/// A container being constructed during parsing.
enum BuildNode {
    Sequence {
        tag: Option<String>,
        items: Vec<DocumentNode>,
    },
    Mapping {
        tag: Option<String>,
        entries: Mapping,
        pending_key: Option<String>,
    },
}

impl TreeBuilder {
    fn result(self) -> Result<DocumentNode> {
        if let Some(err) = self.error {
            return Err(err);
        }
        Ok(self.root.unwrap_or_else(DocumentNode::mapping))
    }

    fn fail(&mut self, message: impl Into<String>, marker: &Marker) {
        if self.error.is_none() {
            self.error = Some(Error::Unsupported {
                message: message.into(),
                location: SourceInfo::from_marker(marker),
            });
        }
    }

    /// True when the innermost container is a mapping waiting for a key.
    fn expecting_key(&self) -> bool {
        matches!(
            self.stack.last(),
            Some(BuildNode::Mapping {
                pending_key: None,
                ..
            })
        )
    }

    fn push_complete(&mut self, node: DocumentNode, marker: &Marker) {
        match self.stack.last_mut() {
            None => self.root = Some(node),
            Some(BuildNode::Sequence { items, .. }) => items.push(node),
            Some(BuildNode::Mapping {
                entries,
                pending_key,
                ..
            }) => match pending_key.take() {
                Some(key) => {
                    entries.insert(key, node);
                }
                None => self.fail("mapping keys must be scalars", marker),
            },
        }
    }

    fn push_key(&mut self, key: String) {
        if let Some(BuildNode::Mapping { pending_key, .. }) = self.stack.last_mut() {
            *pending_key = Some(key);
        }
    }
}

impl MarkedEventReceiver for TreeBuilder {
    fn on_event(&mut self, ev: Event, marker: Marker) {
        if self.error.is_some() {
            return;
        }

        match ev {
            Event::Scalar(value, style, _anchor_id, tag) => {
                if self.expecting_key() {
                    if tag.as_ref().is_some_and(|t| local_tag(t).is_some()) {
                        self.fail("tagged mapping keys are not supported", &marker);
                    } else {
                        self.push_key(value);
                    }
                    return;
                }

                let node = match tag.as_ref().and_then(local_tag) {
                    // Function arguments keep their source text: `!GetAZs` with
                    // no argument is the empty string, not null.
                    Some(name) => DocumentNode::tagged(name, DocumentNode::string(value)),
                    None => {
                        let core = tag.as_ref().and_then(core_tag);
                        DocumentNode::Scalar(resolve_scalar(value, style, core))
                    }
                };
                self.push_complete(node, &marker);
            }

            Event::SequenceStart(_anchor_id, tag) => {
                if self.expecting_key() {
                    self.fail("mapping keys must be scalars", &marker);
                    return;
                }
                self.stack.push(BuildNode::Sequence {
                    tag: tag.as_ref().and_then(local_tag),
                    items: Vec::new(),
                });
            }

            Event::SequenceEnd => match self.stack.pop() {
                Some(BuildNode::Sequence { tag, items }) => {
                    let node = wrap(tag, DocumentNode::Sequence(items));
                    self.push_complete(node, &marker);
                }
                _ => self.fail("unbalanced sequence end", &marker),
            },

            Event::MappingStart(_anchor_id, tag) => {
                if self.expecting_key() {
                    self.fail("mapping keys must be scalars", &marker);
                    return;
                }
                self.stack.push(BuildNode::Mapping {
                    tag: tag.as_ref().and_then(local_tag),
                    entries: Mapping::new(),
                    pending_key: None,
                });
            }

            Event::MappingEnd => match self.stack.pop() {
                Some(BuildNode::Mapping { tag, entries, .. }) => {
                    let node = wrap(tag, DocumentNode::Mapping(entries));
                    self.push_complete(node, &marker);
                }
                _ => self.fail("unbalanced mapping end", &marker),
            },

            Event::Alias(_anchor_id) => {
                self.fail("aliases are not supported in templates", &marker);
            }

            Event::Nothing
            | Event::StreamStart
            | Event::StreamEnd
            | Event::DocumentStart
            | Event::DocumentEnd => {}
        }
    }
}

fn wrap(tag: Option<String>, node: DocumentNode) -> DocumentNode {
    match tag {
        Some(name) => DocumentNode::tagged(name, node),
        None => node,
    }
}

/// Long-form function name for an application tag such as `!If`.
fn local_tag(tag: &Tag) -> Option<String> {
    if CORE_TAG_HANDLES.contains(&tag.handle.as_str()) || tag.suffix.is_empty() {
        return None;
    }
    Some(intrinsics::long_name(&tag.suffix))
}

/// Suffix of a core schema tag such as `!!str`.
fn core_tag(tag: &Tag) -> Option<&str> {
    CORE_TAG_HANDLES
        .contains(&tag.handle.as_str())
        .then_some(tag.suffix.as_str())
}

fn resolve_scalar(value: String, style: TScalarStyle, core: Option<&str>) -> Scalar {
    match core {
        Some("str") => return Scalar::String(value),
        Some("null") => return Scalar::Null,
        Some("float") => return Scalar::Real(value),
        Some("int") => {
            return match value.parse::<i64>() {
                Ok(i) => Scalar::Integer(i),
                Err(_) => Scalar::String(value),
            };
        }
        Some("bool") => {
            if let Scalar::Bool(b) = resolve_plain(&value) {
                return Scalar::Bool(b);
            }
        }
        _ => {}
    }

    if style != TScalarStyle::Plain {
        return Scalar::String(value);
    }

    match resolve_plain(&value) {
        Scalar::String(_) => Scalar::String(value),
        other => other,
    }
}

/// Resolve a plain (unquoted) scalar per the YAML 1.2 core schema.
///
/// Integers written with a leading zero stay strings: account ids such as
/// `012345678901` must survive a round trip.
pub(crate) fn resolve_plain(value: &str) -> Scalar {
    match value {
        "" | "~" | "null" | "Null" | "NULL" => return Scalar::Null,
        "true" | "True" | "TRUE" => return Scalar::Bool(true),
        "false" | "False" | "FALSE" => return Scalar::Bool(false),
        _ => {}
    }

    let digits = value.strip_prefix(['-', '+']).unwrap_or(value);
    if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
        if digits.len() > 1 && digits.starts_with('0') {
            return Scalar::String(value.to_string());
        }
        return match value.parse::<i64>() {
            Ok(i) => Scalar::Integer(i),
            Err(_) => Scalar::String(value.to_string()),
        };
    }

    if is_float(digits) {
        return Scalar::Real(value.to_string());
    }

    Scalar::String(value.to_string())
}

fn is_float(unsigned: &str) -> bool {
    if matches!(unsigned, ".inf" | ".Inf" | ".INF" | ".nan" | ".NaN" | ".NAN") {
        return true;
    }
    unsigned.bytes().any(|b| b.is_ascii_digit())
        && unsigned
            .bytes()
            .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'e' | b'E' | b'-' | b'+'))
        && unsigned.parse::<f64>().is_ok()
}

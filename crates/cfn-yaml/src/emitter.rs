//! YAML emitter for [`DocumentNode`] trees.
//!
//! Output is block style with two-space indentation. Intrinsic functions are
//! written back in short form (`!Sub`, `!If`), and arguments made only of
//! scalars use flow style the way templates are usually written by hand:
//!
//! ```yaml
//! Conditions:
//!   IsProd: !Equals [!Ref Env, prod]
//! ```

use crate::parser::resolve_plain;
use crate::{DocumentNode, Mapping, Scalar, TaggedNode};

const INDENT: usize = 2;

/// Serialize a tree to YAML text.
///
/// The result always ends with a newline and parses back to an equal tree.
pub fn to_yaml_string(node: &DocumentNode) -> String {
    let mut emitter = Emitter::default();
    match node {
        DocumentNode::Mapping(map) if !map.is_empty() => emitter.mapping_block(map, 0, false),
        DocumentNode::Sequence(items) if !items.is_empty() => emitter.sequence_block(items, 0),
        other => {
            // A root-level value with nothing before it; drop the separator
            // space that `value` puts after a prefix.
            emitter.value(other, 0, Prefix::Root);
            if emitter.out.starts_with(' ') {
                emitter.out.remove(0);
            }
        }
    }
    emitter.out
}

/// What was written on the current line just before a value.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Prefix {
    /// `key:`
    Key,
    /// `-`
    Item,
    /// `!Tag`
    Tag,
    /// Nothing; the value is the whole document.
    Root,
}

#[derive(Default)]
struct Emitter {
    out: String,
}

impl Emitter {
    fn pad(&mut self, indent: usize) {
        self.out.extend(std::iter::repeat_n(' ', indent));
    }

    /// Write mapping entries, one per line, at `indent`.
    ///
    /// With `first_inline` the first key continues the current line (after
    /// `- `).
    fn mapping_block(&mut self, map: &Mapping, indent: usize, first_inline: bool) {
        for (i, (key, value)) in map.iter().enumerate() {
            if i > 0 || !first_inline {
                self.pad(indent);
            }
            self.out.push_str(&scalar_text(&Scalar::String(key.clone()), false));
            self.out.push(':');
            self.value(value, indent + INDENT, Prefix::Key);
        }
    }

    /// Write sequence items, one `- ` per item, at `indent`.
    fn sequence_block(&mut self, items: &[DocumentNode], indent: usize) {
        for item in items {
            self.pad(indent);
            self.out.push('-');
            self.value(item, indent + INDENT, Prefix::Item);
        }
    }

    /// Write a value after a prefix, ending the line. Nested block content is
    /// indented to `child_indent`.
    fn value(&mut self, node: &DocumentNode, child_indent: usize, prefix: Prefix) {
        match node {
            DocumentNode::Mapping(map) if !map.is_empty() => {
                if prefix == Prefix::Item {
                    self.out.push(' ');
                    self.mapping_block(map, child_indent, true);
                } else {
                    self.out.push('\n');
                    self.mapping_block(map, child_indent, false);
                }
            }
            DocumentNode::Sequence(items) if !items.is_empty() => {
                if prefix == Prefix::Tag && items.iter().all(is_flow_safe) {
                    self.out.push(' ');
                    self.flow(node);
                    self.out.push('\n');
                } else {
                    self.out.push('\n');
                    self.sequence_block(items, child_indent);
                }
            }
            DocumentNode::Tagged(tagged) if tagged.body.is_tagged() => {
                // One tag per node: spell the outer function in long form.
                let mut map = Mapping::new();
                map.insert(tagged.tag.clone(), (*tagged.body).clone());
                self.value(&DocumentNode::Mapping(map), child_indent, prefix);
            }
            DocumentNode::Tagged(tagged) => {
                self.out.push_str(" !");
                self.out.push_str(tagged.short_tag());
                self.value(&tagged.body, child_indent, Prefix::Tag);
            }
            DocumentNode::Scalar(Scalar::String(s)) if use_literal_block(s) => {
                self.literal_block(s, child_indent);
            }
            other => {
                self.out.push(' ');
                self.flow(other);
                self.out.push('\n');
            }
        }
    }

    /// Write a node on the current line in flow style.
    fn flow(&mut self, node: &DocumentNode) {
        match node {
            DocumentNode::Scalar(scalar) => self.out.push_str(&scalar_text(scalar, true)),
            DocumentNode::Sequence(items) => {
                self.out.push('[');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        self.out.push_str(", ");
                    }
                    self.flow(item);
                }
                self.out.push(']');
            }
            DocumentNode::Mapping(map) => {
                self.out.push('{');
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        self.out.push_str(", ");
                    }
                    self.out.push_str(&scalar_text(&Scalar::String(key.clone()), true));
                    self.out.push_str(": ");
                    self.flow(value);
                }
                self.out.push('}');
            }
            DocumentNode::Tagged(tagged) => self.flow_tagged(tagged),
        }
    }

    fn flow_tagged(&mut self, tagged: &TaggedNode) {
        if tagged.body.is_tagged() {
            let mut map = Mapping::new();
            map.insert(tagged.tag.clone(), (*tagged.body).clone());
            self.flow(&DocumentNode::Mapping(map));
            return;
        }
        self.out.push('!');
        self.out.push_str(tagged.short_tag());
        self.out.push(' ');
        self.flow(&tagged.body);
    }

    fn literal_block(&mut self, s: &str, indent: usize) {
        let body = s.trim_end_matches('\n');
        let trailing = s.len() - body.len();
        self.out.push_str(match trailing {
            0 => " |-",
            1 => " |",
            _ => " |+",
        });
        self.out.push('\n');
        for line in body.split('\n') {
            if !line.is_empty() {
                self.pad(indent);
                self.out.push_str(line);
            }
            self.out.push('\n');
        }
        for _ in 1..trailing {
            self.out.push('\n');
        }
    }
}

/// Nodes that can go inside a one-line `!Tag [...]` argument list.
fn is_flow_safe(node: &DocumentNode) -> bool {
    match node {
        DocumentNode::Scalar(Scalar::String(s)) => !s.contains('\n'),
        DocumentNode::Scalar(_) => true,
        DocumentNode::Sequence(items) => items.iter().all(is_flow_safe),
        DocumentNode::Mapping(map) => map.is_empty(),
        DocumentNode::Tagged(tagged) => !tagged.body.is_tagged() && is_flow_safe(&tagged.body),
    }
}

/// Multi-line strings are written as literal blocks unless their content
/// cannot be represented that way.
fn use_literal_block(s: &str) -> bool {
    s.contains('\n')
        && !s.starts_with([' ', '\t', '\n'])
        && !s.chars().any(|c| c.is_control() && c != '\n')
        && s.split('\n').all(|line| !line.ends_with([' ', '\t']))
}

fn scalar_text(scalar: &Scalar, in_flow: bool) -> String {
    match scalar {
        Scalar::Null => "null".to_string(),
        Scalar::Bool(b) => b.to_string(),
        Scalar::Integer(i) => i.to_string(),
        Scalar::Real(r) => r.clone(),
        Scalar::String(s) => quote_if_needed(s, in_flow),
    }
}

fn quote_if_needed(s: &str, in_flow: bool) -> String {
    if s.chars().any(|c| c.is_control()) {
        return double_quoted(s);
    }
    if needs_quotes(s, in_flow) {
        return format!("'{}'", s.replace('\'', "''"));
    }
    s.to_string()
}

fn needs_quotes(s: &str, in_flow: bool) -> bool {
    if s.is_empty() || s != s.trim() {
        return true;
    }
    if !matches!(resolve_plain(s), Scalar::String(_)) || is_yaml_1_1_typed(s) {
        return true;
    }
    if s.starts_with([
        '-', '?', ':', ',', '[', ']', '{', '}', '#', '&', '*', '!', '|', '>', '\'', '"', '%',
        '@', '`',
    ]) {
        return true;
    }
    if s.contains(": ") || s.contains(" #") || s.ends_with(':') {
        return true;
    }
    in_flow && s.contains([',', '[', ']', '{', '}'])
}

/// Plain scalars that YAML 1.1 readers (CloudFormation among them) resolve
/// to something other than a string, even though the 1.2 core schema does not.
fn is_yaml_1_1_typed(s: &str) -> bool {
    let lower = s.to_ascii_lowercase();
    if matches!(lower.as_str(), "y" | "n" | "yes" | "no" | "on" | "off") {
        return true;
    }

    let unsigned = lower.strip_prefix(['-', '+']).unwrap_or(&lower);
    let radix = [("0x", 16), ("0o", 8), ("0b", 2)]
        .into_iter()
        .find_map(|(prefix, radix)| unsigned.strip_prefix(prefix).map(|digits| (digits, radix)));
    if let Some((digits, radix)) = radix {
        return digits.chars().any(|c| c.is_digit(radix))
            && digits.chars().all(|c| c.is_digit(radix) || c == '_');
    }

    // 1_000, sexagesimal 1:30, and leading-zero octal/decimal such as 0755
    unsigned.starts_with(|c: char| c.is_ascii_digit())
        && unsigned
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '_' | ':' | '.'))
}

fn double_quoted(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c if c.is_control() => out.push_str(&format!("\\u{:04X}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

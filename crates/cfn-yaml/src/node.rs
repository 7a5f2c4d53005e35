//! Template tree model.

use indexmap::IndexMap;

/// Ordered mapping of keys to nodes.
pub type Mapping = IndexMap<String, DocumentNode>;

/// A node in a parsed template.
///
/// Equality is deep and structural. Mapping equality ignores key order, so two
/// statements written with their fields in different orders compare equal.
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentNode {
    /// Ordered key/value pairs. Keys are unique and case-sensitive.
    Mapping(Mapping),

    /// Ordered list of nodes.
    Sequence(Vec<DocumentNode>),

    /// Leaf value.
    Scalar(Scalar),

    /// Intrinsic function call such as `!If [Cond, a, b]`.
    Tagged(TaggedNode),
}

/// Leaf value of a template.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Integer(i64),
    /// Floating point number, kept in its lexical form so it re-emits unchanged.
    Real(String),
    String(String),
}

/// A tagged node: an intrinsic function name wrapped around its arguments.
///
/// `tag` holds the long-form name (`Fn::If`, `Ref`, ...). Unknown local tags
/// are stored verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct TaggedNode {
    pub tag: String,
    pub body: Box<DocumentNode>,
}

impl TaggedNode {
    pub fn new(tag: impl Into<String>, body: DocumentNode) -> Self {
        Self {
            tag: tag.into(),
            body: Box::new(body),
        }
    }

    /// The YAML short-form tag, without the leading `!`.
    pub fn short_tag(&self) -> &str {
        crate::intrinsics::short_tag(&self.tag)
    }
}

impl DocumentNode {
    /// An empty mapping.
    pub fn mapping() -> Self {
        DocumentNode::Mapping(Mapping::new())
    }

    /// A null scalar.
    pub fn null() -> Self {
        DocumentNode::Scalar(Scalar::Null)
    }

    /// A string scalar.
    pub fn string(value: impl Into<String>) -> Self {
        DocumentNode::Scalar(Scalar::String(value.into()))
    }

    /// A tagged node with the given long-form function name.
    pub fn tagged(tag: impl Into<String>, body: DocumentNode) -> Self {
        DocumentNode::Tagged(TaggedNode::new(tag, body))
    }

    pub fn is_mapping(&self) -> bool {
        matches!(self, DocumentNode::Mapping(_))
    }

    pub fn is_sequence(&self) -> bool {
        matches!(self, DocumentNode::Sequence(_))
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self, DocumentNode::Scalar(_))
    }

    pub fn is_tagged(&self) -> bool {
        matches!(self, DocumentNode::Tagged(_))
    }

    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            DocumentNode::Mapping(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[DocumentNode]> {
        match self {
            DocumentNode::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            DocumentNode::Scalar(scalar) => Some(scalar),
            _ => None,
        }
    }

    pub fn as_tagged(&self) -> Option<&TaggedNode> {
        match self {
            DocumentNode::Tagged(tagged) => Some(tagged),
            _ => None,
        }
    }

    /// String content if this is a string scalar.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            DocumentNode::Scalar(Scalar::String(s)) => Some(s),
            _ => None,
        }
    }

    /// Get a mapping value by exact key.
    pub fn get(&self, key: &str) -> Option<&DocumentNode> {
        self.as_mapping().and_then(|map| map.get(key))
    }

    /// Get a mapping value by key, ignoring ASCII case.
    ///
    /// Returns the first matching entry in document order.
    pub fn get_ignore_case(&self, key: &str) -> Option<&DocumentNode> {
        self.as_mapping().and_then(|map| {
            map.iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(key))
                .map(|(_, v)| v)
        })
    }

    /// Follow a path of mapping keys.
    pub fn get_path(&self, path: &[&str]) -> Option<&DocumentNode> {
        path.iter().try_fold(self, |node, key| node.get(key))
    }

    /// Consume the node as a list: sequences yield their items, anything
    /// else becomes a one-element list.
    pub fn into_sequence(self) -> Vec<DocumentNode> {
        match self {
            DocumentNode::Sequence(items) => items,
            other => vec![other],
        }
    }
}

impl Default for DocumentNode {
    fn default() -> Self {
        DocumentNode::mapping()
    }
}

impl From<&str> for DocumentNode {
    fn from(value: &str) -> Self {
        DocumentNode::string(value)
    }
}

impl From<String> for DocumentNode {
    fn from(value: String) -> Self {
        DocumentNode::string(value)
    }
}

impl From<bool> for DocumentNode {
    fn from(value: bool) -> Self {
        DocumentNode::Scalar(Scalar::Bool(value))
    }
}

impl From<i64> for DocumentNode {
    fn from(value: i64) -> Self {
        DocumentNode::Scalar(Scalar::Integer(value))
    }
}

impl From<Vec<DocumentNode>> for DocumentNode {
    fn from(items: Vec<DocumentNode>) -> Self {
        DocumentNode::Sequence(items)
    }
}

impl From<Mapping> for DocumentNode {
    fn from(map: Mapping) -> Self {
        DocumentNode::Mapping(map)
    }
}

impl From<TaggedNode> for DocumentNode {
    fn from(tagged: TaggedNode) -> Self {
        DocumentNode::Tagged(tagged)
    }
}

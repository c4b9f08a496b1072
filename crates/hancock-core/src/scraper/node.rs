//! Declaration nodes recorded while scraping.

use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Index of a node in its [`NodeDirectory`](super::NodeDirectory).
///
/// Ids are assigned sequentially within one scrape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NodeId(usize);

impl NodeId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What produced a node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SignatureKind {
    /// Matched the named signature.
    Signature(String),
    /// A control construct (`if`, `for`, ...) that declares nothing.
    Placeholder,
    /// A scope whose header matched nothing.
    Error,
}

impl SignatureKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Signature(name) => name,
            Self::Placeholder => "placeholder",
            Self::Error => "error",
        }
    }

    /// Whether the node declares something.
    pub fn is_declaration(&self) -> bool {
        matches!(self, Self::Signature(_))
    }
}

impl fmt::Display for SignatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for SignatureKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Fields captured by a signature's named groups.
///
/// Only groups that matched non-empty text are stored. Values are kept
/// exactly as captured, surrounding whitespace included.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeclarationFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,

    /// Name of a declaration this one attaches to textually
    /// (prototype owner, static owner, superclass).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_ref: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub qualifiers: Option<String>,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub accessor: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub arguments: Option<String>,

    /// Groups with names outside the fixed set.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

impl DeclarationFields {
    /// Store a captured group under its field. Empty values are dropped.
    pub fn insert(&mut self, field: &str, value: &str) {
        if value.is_empty() {
            return;
        }
        let value = value.to_string();
        match field {
            "name" | "identifier" => self.identifier = Some(value),
            "parent" => self.parent_ref = Some(value),
            "qualifiers" | "qualifier" => self.qualifiers = Some(value),
            "type" => self.type_name = Some(value),
            "accessor" => self.accessor = Some(value),
            "arguments" => self.arguments = Some(value),
            other => {
                self.extra.insert(other.to_string(), value);
            }
        }
    }

    /// Collect every participating named group of a match.
    pub fn from_captures(regex: &regex::Regex, captures: &regex::Captures<'_>) -> Self {
        let mut fields = Self::default();
        for name in regex.capture_names().flatten() {
            if let Some(m) = captures.name(name) {
                fields.insert(name, m.as_str());
            }
        }
        fields
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// One recognized declaration, control placeholder, or unclassified scope.
///
/// `parent` and `children` are only changed through the directory, which
/// keeps them consistent: `a` is among `b`'s children exactly when
/// `a.parent() == Some(b)`.
#[derive(Debug, Clone, Serialize)]
pub struct DeclarationNode {
    id: NodeId,
    #[serde(rename = "signature")]
    kind: SignatureKind,
    fields: DeclarationFields,
    #[serde(skip_serializing_if = "Option::is_none")]
    parent: Option<NodeId>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    children: Vec<NodeId>,
}

impl DeclarationNode {
    pub(crate) fn new(id: NodeId, kind: SignatureKind, fields: DeclarationFields) -> Self {
        Self {
            id,
            kind,
            fields,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn kind(&self) -> &SignatureKind {
        &self.kind
    }

    pub fn fields(&self) -> &DeclarationFields {
        &self.fields
    }

    /// The declared name, trimmed.
    pub fn identifier(&self) -> Option<&str> {
        self.fields
            .identifier
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// The textual parent reference, trimmed.
    pub fn parent_ref(&self) -> Option<&str> {
        self.fields
            .parent_ref
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Structural parent: the scope lexically containing this node.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn is_declaration(&self) -> bool {
        self.kind.is_declaration()
    }

    pub(crate) fn set_parent(&mut self, parent: Option<NodeId>) {
        self.parent = parent;
    }

    pub(crate) fn push_child(&mut self, child: NodeId) {
        self.children.push(child);
    }

    pub(crate) fn remove_child(&mut self, child: NodeId) {
        self.children.retain(|c| *c != child);
    }
}

//! Arena of declaration nodes produced by one scrape.

use serde::Serialize;
use std::fmt;

use super::node::{DeclarationFields, DeclarationNode, NodeId, SignatureKind};

/// Recoverable problems noticed while scraping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScrapeWarning {
    /// Braces left in the buffer after peeling stopped.
    MalformedInput {
        unmatched_open: usize,
        unmatched_close: usize,
    },
}

impl fmt::Display for ScrapeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedInput {
                unmatched_open,
                unmatched_close,
            } => write!(
                f,
                "Malformed input: {} unmatched '{{' and {} unmatched '}}'",
                unmatched_open, unmatched_close
            ),
        }
    }
}

/// Append-only ledger of the nodes of one scrape, addressed by [`NodeId`].
///
/// Structural links are stored as ids, never as references, so nodes can be
/// re-parented freely without ownership cycles.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NodeDirectory {
    nodes: Vec<DeclarationNode>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<ScrapeWarning>,
    passes: usize,
}

impl NodeDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a node under the next sequential id.
    pub(crate) fn insert(&mut self, kind: SignatureKind, fields: DeclarationFields) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(DeclarationNode::new(id, kind, fields));
        id
    }

    pub fn get(&self, id: NodeId) -> Option<&DeclarationNode> {
        self.nodes.get(id.index())
    }

    pub fn contains(&self, id: NodeId) -> bool {
        id.index() < self.nodes.len()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes in id order.
    pub fn iter(&self) -> impl Iterator<Item = &DeclarationNode> {
        self.nodes.iter()
    }

    /// Nodes without a structural parent, in id order.
    pub fn roots(&self) -> impl Iterator<Item = &DeclarationNode> {
        self.nodes.iter().filter(|n| n.parent().is_none())
    }

    /// Structural ancestors of `id`, nearest first.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            directory: self,
            next: self.get(id).and_then(|n| n.parent()),
        }
    }

    /// Whether `ancestor` lies on the parent chain of `id`.
    pub fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        self.ancestors(id).any(|n| n.id() == ancestor)
    }

    /// Declarations whose identifier equals `name`, in id order.
    pub fn find_by_identifier<'a>(
        &'a self,
        name: &'a str,
    ) -> impl Iterator<Item = &'a DeclarationNode> + 'a {
        self.nodes
            .iter()
            .filter(move |n| n.is_declaration() && n.identifier() == Some(name))
    }

    /// Make `child` a structural child of `parent`, detaching it from any
    /// previous parent.
    ///
    /// Returns `false` and changes nothing if either id is unknown, or if
    /// the link would make a node its own ancestor.
    pub(crate) fn link(&mut self, parent: NodeId, child: NodeId) -> bool {
        if !self.contains(parent)
            || !self.contains(child)
            || parent == child
            || self.is_ancestor(child, parent)
        {
            return false;
        }

        if let Some(previous) = self.nodes[child.index()].parent() {
            self.nodes[previous.index()].remove_child(child);
        }
        self.nodes[child.index()].set_parent(Some(parent));
        self.nodes[parent.index()].push_child(child);
        true
    }

    pub fn warnings(&self) -> &[ScrapeWarning] {
        &self.warnings
    }

    pub(crate) fn warn(&mut self, warning: ScrapeWarning) {
        self.warnings.push(warning);
    }

    /// Number of peeling passes that consumed at least one scope.
    pub fn passes(&self) -> usize {
        self.passes
    }

    pub(crate) fn record_pass(&mut self) {
        self.passes += 1;
    }
}

/// Iterator over a node's structural ancestors.
pub struct Ancestors<'a> {
    directory: &'a NodeDirectory,
    next: Option<NodeId>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = &'a DeclarationNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.directory.get(self.next?)?;
        self.next = node.parent();
        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(directory: &mut NodeDirectory, name: &str) -> NodeId {
        let mut fields = DeclarationFields::default();
        fields.insert("name", name);
        directory.insert(SignatureKind::Signature("test".into()), fields)
    }

    #[test]
    fn test_ids_are_sequential() {
        let mut directory = NodeDirectory::new();
        let a = named(&mut directory, "a");
        let b = named(&mut directory, "b");
        assert_eq!(a.index(), 0);
        assert_eq!(b.index(), 1);
        assert_eq!(directory.len(), 2);
    }

    #[test]
    fn test_link_keeps_parent_and_children_consistent() {
        let mut directory = NodeDirectory::new();
        let a = named(&mut directory, "a");
        let b = named(&mut directory, "b");
        let c = named(&mut directory, "c");

        assert!(directory.link(b, c));
        assert_eq!(directory.get(b).unwrap().children(), &[c]);
        assert_eq!(directory.get(c).unwrap().parent(), Some(b));

        // Re-parenting removes the child from its previous parent.
        assert!(directory.link(a, c));
        assert!(directory.get(b).unwrap().children().is_empty());
        assert_eq!(directory.get(a).unwrap().children(), &[c]);
        assert_eq!(directory.get(c).unwrap().parent(), Some(a));
    }

    #[test]
    fn test_link_rejects_cycles() {
        let mut directory = NodeDirectory::new();
        let a = named(&mut directory, "a");
        let b = named(&mut directory, "b");

        assert!(directory.link(a, b));
        assert!(!directory.link(b, a));
        assert!(!directory.link(a, a));
        assert_eq!(directory.get(a).unwrap().parent(), None);
    }

    #[test]
    fn test_ancestors_and_roots() {
        let mut directory = NodeDirectory::new();
        let a = named(&mut directory, "a");
        let b = named(&mut directory, "b");
        let c = named(&mut directory, "c");
        directory.link(a, b);
        directory.link(b, c);

        let chain: Vec<_> = directory.ancestors(c).map(|n| n.id()).collect();
        assert_eq!(chain, vec![b, a]);
        assert!(directory.is_ancestor(a, c));
        assert!(!directory.is_ancestor(c, a));

        let roots: Vec<_> = directory.roots().map(|n| n.id()).collect();
        assert_eq!(roots, vec![a]);
    }

    #[test]
    fn test_find_by_identifier_skips_placeholders() {
        let mut directory = NodeDirectory::new();
        directory.insert(SignatureKind::Placeholder, DeclarationFields::default());
        let animal = named(&mut directory, "Animal");

        let found: Vec<_> = directory.find_by_identifier("Animal").map(|n| n.id()).collect();
        assert_eq!(found, vec![animal]);
    }
}

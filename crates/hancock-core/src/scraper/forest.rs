//! Grouping of a node directory into a name-indexed forest.

use serde::Serialize;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use crate::language::CompiledLanguage;

use super::directory::NodeDirectory;
use super::node::{DeclarationNode, NodeId};

/// The presentation shape of one declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeclarationSummary {
    pub identifier: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arguments: Option<String>,
    pub signature: String,
}

impl DeclarationSummary {
    fn from_node(node: &DeclarationNode) -> Option<Self> {
        Some(Self {
            identifier: node.identifier()?.to_string(),
            arguments: node
                .fields()
                .arguments
                .as_deref()
                .map(|a| a.trim().to_string()),
            signature: node.kind().to_string(),
        })
    }
}

/// Declarations grouped under the name of the root that owns them.
///
/// Within a bucket names are unique: the first declaration with a given
/// name wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Forest {
    trees: BTreeMap<String, Vec<DeclarationSummary>>,
}

impl Forest {
    pub fn get(&self, root: &str) -> Option<&[DeclarationSummary]> {
        self.trees.get(root).map(Vec::as_slice)
    }

    pub fn contains_root(&self, root: &str) -> bool {
        self.trees.contains_key(root)
    }

    /// Root names in sorted order.
    pub fn roots(&self) -> impl Iterator<Item = &str> {
        self.trees.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[DeclarationSummary])> {
        self.trees.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.trees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }

    /// Total number of declarations over every bucket.
    pub fn declaration_count(&self) -> usize {
        self.trees.values().map(Vec::len).sum()
    }

    /// Seed the bucket `root` with `summary` unless the bucket exists.
    fn seed(&mut self, root: &str, summary: DeclarationSummary) {
        self.trees.entry(root.to_string()).or_insert_with(|| vec![summary]);
    }

    /// Add `summary` to `root`'s bucket unless the name is already there.
    fn assign(&mut self, root: &str, summary: DeclarationSummary) {
        match self.trees.entry(root.to_string()) {
            Entry::Occupied(mut bucket) => {
                let bucket = bucket.get_mut();
                if !bucket.iter().any(|s| s.identifier == summary.identifier) {
                    bucket.push(summary);
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(vec![summary]);
            }
        }
    }
}

/// Builds a [`Forest`] from a scraped directory.
pub(crate) struct ForestBuilder<'a> {
    language: &'a CompiledLanguage,
    directory: NodeDirectory,
}

impl<'a> ForestBuilder<'a> {
    pub(crate) fn new(language: &'a CompiledLanguage, directory: NodeDirectory) -> Self {
        Self {
            language,
            directory,
        }
    }

    pub(crate) fn build(mut self) -> Forest {
        self.reattach_textual_parents();

        let mut forest = Forest::default();
        let mut anchors = Vec::with_capacity(self.directory.len());
        for node in self.directory.iter() {
            if !node.is_declaration() || node.identifier().is_none() {
                continue;
            }
            anchors.push((node.id(), self.anchor(node.id())));
        }

        // Roots seed their buckets before anything is assigned to them.
        for (id, anchor) in &anchors {
            if id == anchor {
                if let Some(summary) = self.summary(*id) {
                    forest.seed(&summary.identifier.clone(), summary);
                }
            }
        }

        for (id, anchor) in &anchors {
            if id == anchor {
                continue;
            }
            let (Some(root), Some(summary)) = (self.summary(*anchor), self.summary(*id)) else {
                continue;
            };
            forest.seed(&root.identifier.clone(), root.clone());
            forest.assign(&root.identifier, summary);
        }

        tracing::debug!(
            roots = forest.len(),
            declarations = forest.declaration_count(),
            "built forest"
        );
        forest
    }

    /// Attach parentless nodes to the declaration their textual parent
    /// reference names. Subclass declarations keep their reference but
    /// stay roots.
    fn reattach_textual_parents(&mut self) {
        let candidates: Vec<(NodeId, String)> = self
            .directory
            .roots()
            .filter(|node| !self.language.is_subclass_signature(node.kind().as_str()))
            .filter_map(|node| Some((node.id(), node.parent_ref()?.to_string())))
            .collect();

        for (root, reference) in candidates {
            let target = self
                .directory
                .find_by_identifier(&reference)
                .map(DeclarationNode::id)
                .find(|&target| target != root && !self.directory.is_ancestor(root, target));

            if let Some(target) = target {
                if self.directory.link(target, root) {
                    tracing::trace!(node = %root, parent = %target, reference = %reference, "reattached");
                }
            }
        }
    }

    /// The node whose bucket `id` belongs to.
    ///
    /// Walks up the structural parents, stopping at the first subclass
    /// declaration above `id`; otherwise the topmost named declaration on
    /// the chain. Placeholder and unclassified ancestors are passed over.
    fn anchor(&self, id: NodeId) -> NodeId {
        let mut anchor = id;
        for ancestor in self.directory.ancestors(id) {
            if !ancestor.is_declaration() || ancestor.identifier().is_none() {
                continue;
            }
            anchor = ancestor.id();
            if self.language.is_subclass_signature(ancestor.kind().as_str()) {
                break;
            }
        }
        anchor
    }

    fn summary(&self, id: NodeId) -> Option<DeclarationSummary> {
        self.directory
            .get(id)
            .and_then(DeclarationSummary::from_node)
    }
}

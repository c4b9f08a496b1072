//! Scope peeling and forest building over a compiled language.
//!
//! A [`Scraper`] turns source text into a [`NodeDirectory`] of declarations
//! linked by lexical containment, then groups the directory into a
//! [`Forest`] keyed by root declaration name.

mod classifier;
mod directory;
mod forest;
mod node;
mod peeler;

pub use classifier::{Classification, Classifier};
pub use directory::{Ancestors, NodeDirectory, ScrapeWarning};
pub use forest::{DeclarationSummary, Forest};
pub use node::{DeclarationFields, DeclarationNode, NodeId, SignatureKind};

use std::sync::Arc;

use crate::language::CompiledLanguage;

use forest::ForestBuilder;
use peeler::ScopePeeler;

/// Extracts declarations from source text for one language.
///
/// Cheap to clone; the compiled language is shared.
#[derive(Debug, Clone)]
pub struct Scraper {
    language: Arc<CompiledLanguage>,
}

impl Scraper {
    pub fn new(language: Arc<CompiledLanguage>) -> Self {
        Self { language }
    }

    pub fn language(&self) -> &CompiledLanguage {
        &self.language
    }

    /// Peel `source` into a directory of nodes.
    ///
    /// Never fails: unrecognized text is dropped and unbalanced braces are
    /// reported through [`NodeDirectory::warnings`].
    pub fn scrape(&self, source: &str) -> NodeDirectory {
        let directory = ScopePeeler::new(Classifier::new(&self.language)).run(source);
        tracing::debug!(
            language = self.language.name(),
            nodes = directory.len(),
            passes = directory.passes(),
            "scraped source"
        );
        directory
    }

    /// Group a directory into a forest. Consumes the directory because
    /// textual reattachment re-parents its nodes.
    pub fn build_forest(&self, directory: NodeDirectory) -> Forest {
        ForestBuilder::new(&self.language, directory).build()
    }

    /// [`scrape`](Self::scrape) followed by [`build_forest`](Self::build_forest).
    pub fn scrape_forest(&self, source: &str) -> Forest {
        self.build_forest(self.scrape(source))
    }
}

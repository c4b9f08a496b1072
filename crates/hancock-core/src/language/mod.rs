//! Declarative language grammars and their compilation.
//!
//! A [`LanguageDefinition`] describes the declaration shapes of one language
//! as signature templates. [`compile`] turns it into a [`CompiledLanguage`]:
//! one anchored, named-group regular expression per signature, kept in
//! declaration order because that order is the match priority.
//!
//! ## Components
//!
//! - `LanguageDefinition` - immutable grammar data, loadable from TOML/YAML/JSON
//! - `Template` - parsed placeholder/literal form of a template string
//! - `CompiledLanguage` - compiled expressions, shared read-only behind `Arc`
//! - `LanguageRegistry` - maps names and file extensions to compiled languages
//!
//! ## Built-in Languages
//!
//! - JavaScript (functions, classes, methods, prototype and static attachments)

mod compiler;
mod error;
mod javascript;
mod registry;
mod template;

pub use compiler::{compile, CompiledExpression, CompiledLanguage};
pub use error::{GrammarError, LanguageError};
pub use javascript::javascript;
pub use registry::LanguageRegistry;
pub use template::{Modifiers, Placeholder, PlaceholderKind, Segment, Template};

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Header keywords that open a scope without declaring anything.
pub const DEFAULT_CONTROL_KEYWORDS: &[&str] = &["if", "else", "switch", "for", "when"];

/// A named template string (signature or argument pattern).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedTemplate {
    pub name: String,
    #[serde(alias = "pattern")]
    pub template: String,
}

impl NamedTemplate {
    pub fn new(name: impl Into<String>, template: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            template: template.into(),
        }
    }
}

/// Grammar of one language's declaration shapes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageDefinition {
    /// Human-readable language name.
    pub name: String,

    /// File extensions (without leading dot) handled by this language.
    #[serde(default)]
    pub extensions: Vec<String>,

    /// Regular expression matching one identifier.
    pub identifier_pattern: String,

    /// Type keywords, e.g. `const`, `let`.
    #[serde(default)]
    pub types: Vec<String>,

    /// Qualifier keywords, e.g. `static`, `async`.
    #[serde(default)]
    pub qualifiers: Vec<String>,

    /// Argument-list patterns, referenced as `<<arguments_NAME>>`.
    #[serde(default)]
    pub argument_patterns: Vec<NamedTemplate>,

    /// Signature templates in match-priority order.
    pub signatures: Vec<NamedTemplate>,

    /// Signatures whose nodes declare subclasses. Their textual parent
    /// reference is kept for lookup but never used for reattachment.
    #[serde(default)]
    pub subclass_signatures: Vec<String>,

    /// Keywords of non-declaring scope headers (`if`, `for`, ...).
    #[serde(default = "default_control_keywords")]
    pub control_keywords: Vec<String>,
}

fn default_control_keywords() -> Vec<String> {
    DEFAULT_CONTROL_KEYWORDS.iter().map(|s| s.to_string()).collect()
}

/// Serialization format of a definition file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefinitionFormat {
    Toml,
    Yaml,
    Json,
}

impl DefinitionFormat {
    /// Pick the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "toml" => Some(Self::Toml),
            "yaml" | "yml" => Some(Self::Yaml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

impl LanguageDefinition {
    /// Parse a definition from text in the given format.
    pub fn parse(content: &str, format: DefinitionFormat) -> Result<Self, LanguageError> {
        let definition = match format {
            DefinitionFormat::Toml => toml::from_str(content)?,
            DefinitionFormat::Yaml => serde_yaml::from_str(content)?,
            DefinitionFormat::Json => serde_json::from_str(content)?,
        };
        Ok(definition)
    }

    /// Load a definition file, choosing the format by extension.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, LanguageError> {
        let path = path.as_ref();
        let format = DefinitionFormat::from_path(path)
            .ok_or_else(|| LanguageError::UnsupportedFormat(path.to_path_buf()))?;
        let content =
            std::fs::read_to_string(path).map_err(|e| LanguageError::io(path, e))?;
        Self::parse(&content, format)
    }

    /// Look up a signature template by name.
    pub fn signature(&self, name: &str) -> Option<&str> {
        self.signatures
            .iter()
            .find(|s| s.name == name)
            .map(|s| s.template.as_str())
    }

    /// Look up an argument pattern by name.
    pub fn argument_pattern(&self, name: &str) -> Option<&str> {
        self.argument_patterns
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.template.as_str())
    }

    pub fn is_subclass_signature(&self, name: &str) -> bool {
        self.subclass_signatures.iter().any(|s| s == name)
    }

    pub fn is_control_keyword(&self, word: &str) -> bool {
        self.control_keywords.iter().any(|k| k == word)
    }

    /// Compile this definition, failing on the first grammar error.
    pub fn compile(self) -> Result<CompiledLanguage, GrammarError> {
        compile(self)
    }
}

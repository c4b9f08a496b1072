//! Registry of compiled languages.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use super::compiler::CompiledLanguage;
use super::error::LanguageError;
use super::javascript::javascript;
use super::{DefinitionFormat, LanguageDefinition};

/// Maps language names and file extensions to compiled languages.
///
/// Lookups are case-insensitive. Registering a language whose name or
/// extensions are already taken replaces the earlier entries.
pub struct LanguageRegistry {
    by_name: HashMap<String, Arc<CompiledLanguage>>,
    by_extension: HashMap<String, Arc<CompiledLanguage>>,
}

impl LanguageRegistry {
    /// Create a registry holding the built-in languages.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        match javascript().compile() {
            Ok(language) => registry.register(Arc::new(language)),
            Err(e) => tracing::error!("built-in JavaScript grammar failed to compile: {}", e),
        }
        registry
    }

    /// Create a registry with no languages.
    pub fn empty() -> Self {
        Self {
            by_name: HashMap::new(),
            by_extension: HashMap::new(),
        }
    }

    /// Register a compiled language under its name and extensions.
    pub fn register(&mut self, language: Arc<CompiledLanguage>) {
        for ext in &language.definition().extensions {
            self.by_extension
                .insert(ext.to_lowercase(), Arc::clone(&language));
        }
        self.by_name
            .insert(language.name().to_lowercase(), language);
    }

    /// Compile and register a definition.
    pub fn register_definition(
        &mut self,
        definition: LanguageDefinition,
    ) -> Result<Arc<CompiledLanguage>, LanguageError> {
        let name = definition.name.clone();
        let language = definition
            .compile()
            .map_err(|source| LanguageError::Grammar {
                language: name,
                source,
            })?;
        let language = Arc::new(language);
        self.register(Arc::clone(&language));
        Ok(language)
    }

    /// Load and register every definition file in `dir`.
    ///
    /// Files with an unrecognized extension are ignored; the first invalid
    /// definition aborts the load.
    pub fn load_dir(&mut self, dir: impl AsRef<Path>) -> Result<usize, LanguageError> {
        let dir = dir.as_ref();
        let entries = std::fs::read_dir(dir).map_err(|e| LanguageError::io(dir, e))?;

        let mut paths: Vec<_> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file() && DefinitionFormat::from_path(path).is_some())
            .collect();
        paths.sort();

        for path in &paths {
            let definition = LanguageDefinition::from_file(path)?;
            tracing::debug!("loaded language '{}' from {}", definition.name, path.display());
            self.register_definition(definition)?;
        }

        Ok(paths.len())
    }

    pub fn by_name(&self, name: &str) -> Option<Arc<CompiledLanguage>> {
        self.by_name.get(&name.to_lowercase()).cloned()
    }

    pub fn by_extension(&self, extension: &str) -> Option<Arc<CompiledLanguage>> {
        self.by_extension.get(&extension.to_lowercase()).cloned()
    }

    /// Get the language for a file path by its extension.
    pub fn for_path(&self, path: impl AsRef<Path>) -> Option<Arc<CompiledLanguage>> {
        path.as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .and_then(|ext| self.by_extension(ext))
    }

    pub fn can_scrape(&self, extension: &str) -> bool {
        self.by_extension.contains_key(&extension.to_lowercase())
    }

    /// Registered languages with their extensions, sorted by name.
    pub fn list(&self) -> Vec<(&str, &[String])> {
        let mut languages: Vec<_> = self
            .by_name
            .values()
            .map(|l| (l.name(), l.definition().extensions.as_slice()))
            .collect();
        languages.sort_by(|a, b| a.0.cmp(b.0));
        languages
    }
}

impl Default for LanguageRegistry {
    fn default() -> Self {
        Self::new()
    }
}

//! Language definition and grammar compilation errors.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while compiling a language definition into expressions.
///
/// Any of these is fatal for the definition: it must not be used to scrape.
#[derive(Debug, Error)]
pub enum GrammarError {
    /// A signature references an argument pattern the language never declares.
    #[error("Signature '{signature}' references undeclared argument pattern '{pattern}'")]
    UndeclaredArgumentPattern { signature: String, pattern: String },

    /// A signature consists only of placeholders and whitespace.
    #[error("Signature '{signature}' has no literal anchor token")]
    MissingAnchor { signature: String },

    /// The same field name is captured twice in one template.
    #[error("Template '{template}' captures field '{field}' more than once")]
    DuplicateField { template: String, field: String },

    /// A field-carrying placeholder appears inside an argument pattern.
    #[error("Argument pattern '{pattern}' may not capture field '{field}'")]
    NestedField { pattern: String, field: String },

    /// A `<<...>>` placeholder names a kind the compiler does not know.
    #[error("Template '{template}' contains unknown placeholder '<<{placeholder}>>'")]
    UnknownPlaceholder { template: String, placeholder: String },

    /// A `<<` without a closing `>>`.
    #[error("Template '{template}' has an unterminated placeholder at byte {offset}")]
    UnterminatedPlaceholder { template: String, offset: usize },

    /// A `type` or `qualifier` placeholder is used but the keyword list is empty.
    #[error("Template '{template}' uses '{kind}' but the language declares no {kind} keywords")]
    EmptyKeywordList { template: String, kind: &'static str },

    /// The expanded pattern was rejected by the regex engine.
    #[error("Expression '{template}' failed to compile: {source}")]
    InvalidExpression {
        template: String,
        #[source]
        source: regex::Error,
    },
}

/// Errors raised while loading language definitions.
#[derive(Debug, Error)]
pub enum LanguageError {
    #[error("IO error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported definition format for {}: expected .toml, .yaml, .yml or .json", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error("Failed to parse TOML definition: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Failed to parse YAML definition: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON definition: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid grammar in language '{language}': {source}")]
    Grammar {
        language: String,
        #[source]
        source: GrammarError,
    },
}

impl LanguageError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        LanguageError::Io {
            path: path.into(),
            source,
        }
    }
}

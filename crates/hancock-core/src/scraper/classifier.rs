//! Statement classification against a language's compiled expressions.

use crate::language::CompiledLanguage;

use super::node::DeclarationFields;

/// Outcome of classifying one statement or scope header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// Matched the named signature.
    Declaration {
        signature: String,
        fields: DeclarationFields,
    },
    /// A control construct such as `if (...)` or `else`.
    Placeholder,
    /// Nothing recognizable; the statement is dropped.
    NoMatch,
}

impl Classification {
    pub fn is_match(&self) -> bool {
        !matches!(self, Self::NoMatch)
    }
}

/// Matches text against every expression in priority order.
///
/// The first expression to match wins. A match whose identifier is a
/// control keyword is skipped, so `if (x) {` never becomes a method `if`.
pub struct Classifier<'a> {
    language: &'a CompiledLanguage,
}

impl<'a> Classifier<'a> {
    pub fn new(language: &'a CompiledLanguage) -> Self {
        Self { language }
    }

    pub fn classify(&self, text: &str) -> Classification {
        for expression in self.language.expressions() {
            let regex = expression.regex();
            for captures in regex.captures_iter(text) {
                let fields = DeclarationFields::from_captures(regex, &captures);
                let names_keyword = fields
                    .identifier
                    .as_deref()
                    .is_some_and(|id| self.language.is_control_keyword(id.trim()));
                if names_keyword {
                    continue;
                }

                tracing::trace!(signature = expression.name(), text, "classified");
                return Classification::Declaration {
                    signature: expression.name().to_string(),
                    fields,
                };
            }
        }

        if self.language.is_control_header(text) {
            return Classification::Placeholder;
        }

        Classification::NoMatch
    }
}

//! Grammar compiler: signature templates to anchored regular expressions.

use regex::Regex;
use std::collections::{HashMap, HashSet};

use super::error::GrammarError;
use super::template::{Placeholder, PlaceholderKind, Segment, Template};
use super::LanguageDefinition;

/// Matches only at a statement boundary: start of text or line, or right
/// after a `;` or carriage return. The boundary text is never captured.
const STATEMENT_ANCHOR: &str = r"(?m)(?:^|[;\r])\s*";

const SEPARATOR: &str = r"\s+";
const SPREAD_PREFIX: &str = r"(?:\.\.\.)?";

/// One signature compiled to a regular expression.
#[derive(Debug, Clone)]
pub struct CompiledExpression {
    name: String,
    regex: Regex,
}

impl CompiledExpression {
    /// Signature name; also the `signature_kind` of matching nodes.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    /// The expanded pattern text.
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

/// A language definition with every signature compiled.
///
/// Immutable once built; share it across scrapes behind an `Arc`.
#[derive(Debug, Clone)]
pub struct CompiledLanguage {
    definition: LanguageDefinition,
    expressions: Vec<CompiledExpression>,
    identifier: Regex,
    control_header: Option<Regex>,
}

impl CompiledLanguage {
    pub fn name(&self) -> &str {
        &self.definition.name
    }

    pub fn definition(&self) -> &LanguageDefinition {
        &self.definition
    }

    /// Compiled expressions in match-priority order.
    pub fn expressions(&self) -> &[CompiledExpression] {
        &self.expressions
    }

    pub fn expression(&self, name: &str) -> Option<&CompiledExpression> {
        self.expressions.iter().find(|e| e.name == name)
    }

    /// Whether the whole of `text` is one identifier.
    pub fn is_identifier(&self, text: &str) -> bool {
        self.identifier.is_match(text)
    }

    /// Whether a scope header opens a non-declaring control construct.
    pub fn is_control_header(&self, header: &str) -> bool {
        self.control_header
            .as_ref()
            .is_some_and(|re| re.is_match(header))
    }

    pub fn is_control_keyword(&self, word: &str) -> bool {
        self.definition.is_control_keyword(word)
    }

    pub fn is_subclass_signature(&self, name: &str) -> bool {
        self.definition.is_subclass_signature(name)
    }
}

/// Compile every signature of `definition`.
pub fn compile(definition: LanguageDefinition) -> Result<CompiledLanguage, GrammarError> {
    let expander = Expander::new(&definition)?;

    let mut expressions = Vec::with_capacity(definition.signatures.len());
    for signature in &definition.signatures {
        let template = Template::parse(&signature.name, &signature.template)?;
        let pattern = expander.expand_signature(&template)?;
        let regex = Regex::new(&pattern).map_err(|source| GrammarError::InvalidExpression {
            template: signature.name.clone(),
            source,
        })?;
        expressions.push(CompiledExpression {
            name: signature.name.clone(),
            regex,
        });
    }

    let identifier = Regex::new(&format!("^(?:{})$", definition.identifier_pattern)).map_err(
        |source| GrammarError::InvalidExpression {
            template: "identifier_pattern".to_string(),
            source,
        },
    )?;

    let control_header = if definition.control_keywords.is_empty() {
        None
    } else {
        let keywords = alternation(&definition.control_keywords, "");
        let pattern = format!(r"^\s*(?:{keywords})\b");
        Some(
            Regex::new(&pattern).map_err(|source| GrammarError::InvalidExpression {
                template: "control_keywords".to_string(),
                source,
            })?,
        )
    };

    Ok(CompiledLanguage {
        definition,
        expressions,
        identifier,
        control_header,
    })
}

/// Expands placeholders against one language's keyword lists and patterns.
struct Expander<'a> {
    definition: &'a LanguageDefinition,
    arguments: HashMap<&'a str, String>,
}

impl<'a> Expander<'a> {
    fn new(definition: &'a LanguageDefinition) -> Result<Self, GrammarError> {
        let mut expander = Self {
            definition,
            arguments: HashMap::new(),
        };

        for pattern in &definition.argument_patterns {
            let template = Template::parse(&pattern.name, &pattern.template)?;
            let expanded = expander.expand_argument_pattern(&template)?;
            expander.arguments.insert(pattern.name.as_str(), expanded);
        }

        Ok(expander)
    }

    /// Argument patterns keep their literal text verbatim; only their
    /// anonymous sub-placeholders are expanded.
    fn expand_argument_pattern(&self, template: &Template) -> Result<String, GrammarError> {
        let mut out = String::new();
        for segment in template.segments() {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Placeholder(placeholder) => {
                    if let Some(field) = &placeholder.field {
                        return Err(GrammarError::NestedField {
                            pattern: template.name().to_string(),
                            field: field.clone(),
                        });
                    }
                    if matches!(placeholder.kind, PlaceholderKind::Arguments(_)) {
                        return Err(GrammarError::UnknownPlaceholder {
                            template: template.name().to_string(),
                            placeholder: render_placeholder(placeholder),
                        });
                    }
                    let body = self.body(template, placeholder)?;
                    out.push_str(&group(&body, placeholder));
                }
            }
        }
        Ok(out)
    }

    fn expand_signature(&self, template: &Template) -> Result<String, GrammarError> {
        if !template.has_anchor() {
            return Err(GrammarError::MissingAnchor {
                signature: template.name().to_string(),
            });
        }

        let mut seen = HashSet::new();
        for field in template.fields() {
            if !seen.insert(field) {
                return Err(GrammarError::DuplicateField {
                    template: template.name().to_string(),
                    field: field.to_string(),
                });
            }
        }

        let mut out = String::from(STATEMENT_ANCHOR);
        for segment in template.segments() {
            match segment {
                Segment::Literal(text) => out.push_str(&normalize_literal(text)),
                Segment::Placeholder(placeholder) => {
                    let body = self.body(template, placeholder)?;
                    out.push_str(&group(&body, placeholder));
                }
            }
        }

        Ok(out.replace(")(", r")\s*("))
    }

    /// The alternation wrapped by a placeholder's group.
    fn body(&self, template: &Template, placeholder: &Placeholder) -> Result<String, GrammarError> {
        let separator = if placeholder.modifiers.separator {
            SEPARATOR
        } else {
            ""
        };
        let identifier = &self.definition.identifier_pattern;

        let body = match &placeholder.kind {
            PlaceholderKind::Identifier if separator.is_empty() => identifier.clone(),
            PlaceholderKind::Identifier => format!("(?:{identifier}){separator}"),
            PlaceholderKind::ArgumentIdentifier => {
                format!("{SPREAD_PREFIX}(?:{identifier}){separator}")
            }
            PlaceholderKind::Type => {
                self.keywords(template, "type", &self.definition.types, separator)?
            }
            PlaceholderKind::Qualifier => {
                self.keywords(template, "qualifier", &self.definition.qualifiers, separator)?
            }
            PlaceholderKind::Arguments(name) => {
                let pattern = self.arguments.get(name.as_str()).ok_or_else(|| {
                    GrammarError::UndeclaredArgumentPattern {
                        signature: template.name().to_string(),
                        pattern: name.clone(),
                    }
                })?;
                if separator.is_empty() {
                    pattern.clone()
                } else {
                    format!("(?:{pattern}){separator}")
                }
            }
        };

        Ok(body)
    }

    fn keywords(
        &self,
        template: &Template,
        kind: &'static str,
        keywords: &[String],
        separator: &str,
    ) -> Result<String, GrammarError> {
        if keywords.is_empty() {
            return Err(GrammarError::EmptyKeywordList {
                template: template.name().to_string(),
                kind,
            });
        }
        Ok(alternation(keywords, separator))
    }
}

fn alternation(keywords: &[String], separator: &str) -> String {
    keywords
        .iter()
        .map(|k| format!("{}{}", regex::escape(k), separator))
        .collect::<Vec<_>>()
        .join("|")
}

/// Wrap `body` as the placeholder's (possibly named) group.
fn group(body: &str, placeholder: &Placeholder) -> String {
    let mut inner = format!("(?:{body})");
    if placeholder.modifiers.repeat {
        inner.push('*');
    }
    let mut out = match &placeholder.field {
        Some(field) => format!("(?P<{field}>{inner})"),
        None => format!("(?:{inner})"),
    };
    if placeholder.modifiers.optional {
        out.push('?');
    }
    out
}

/// Make literal template syntax whitespace tolerant.
///
/// A space means one-or-more whitespace, `=` and `=>` may be surrounded by
/// whitespace, and a brace is a literal that may follow whitespace. Escapes
/// and counted repetitions (`{2,3}`) are left untouched.
fn normalize_literal(text: &str) -> String {
    let mut out = String::with_capacity(text.len() * 2);
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        match c {
            '\\' => {
                out.push(c);
                if let Some((_, escaped)) = chars.next() {
                    out.push(escaped);
                }
            }
            ' ' => {
                while matches!(chars.peek(), Some((_, ' '))) {
                    chars.next();
                }
                out.push_str(SEPARATOR);
            }
            '=' => {
                if matches!(chars.peek(), Some((_, '>'))) {
                    chars.next();
                    out.push_str(r"\s*=>\s*");
                } else {
                    out.push_str(r"\s*=\s*");
                }
            }
            '{' => match repetition_len(&text[i..]) {
                Some(len) => {
                    out.push_str(&text[i..i + len]);
                    for _ in 1..len {
                        chars.next();
                    }
                }
                None => out.push_str(r"\s*\{"),
            },
            '}' => out.push_str(r"\}"),
            _ => out.push(c),
        }
    }

    out
}

/// Byte length of a counted repetition (`{n}`, `{n,}`, `{n,m}`) at the
/// start of `text`.
fn repetition_len(text: &str) -> Option<usize> {
    let inner = text.strip_prefix('{')?;
    let close = inner.find('}')?;
    let (min, max) = match inner[..close].split_once(',') {
        Some((min, max)) => (min, Some(max)),
        None => (&inner[..close], None),
    };
    let digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if min.is_empty() || !digits(min) || !max.map_or(true, digits) {
        return None;
    }
    Some(close + 2)
}

fn render_placeholder(placeholder: &Placeholder) -> String {
    let kind = match &placeholder.kind {
        PlaceholderKind::Identifier => "identifier".to_string(),
        PlaceholderKind::Type => "type".to_string(),
        PlaceholderKind::Qualifier => "qualifier".to_string(),
        PlaceholderKind::ArgumentIdentifier => "argument_identifier".to_string(),
        PlaceholderKind::Arguments(name) => format!("arguments_{name}"),
    };
    match &placeholder.field {
        Some(field) => format!("{kind}#{field}#"),
        None => kind,
    }
}

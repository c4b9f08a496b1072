//! Parsed form of signature and argument-pattern templates.
//!
//! A template is raw regular-expression text interleaved with placeholders:
//!
//! ```text
//! <<[ ][*][?]kind[#field#]>>
//! ```
//!
//! - leading space: the group also absorbs trailing whitespace
//! - `*`: the group repeats zero or more times
//! - `?`: the whole group is optional
//! - `kind`: `identifier`, `type`, `qualifier`, `argument_identifier`
//!   or `arguments_<pattern>`
//! - `#field#`: capture the group under `field`; omitted means recognition only

use super::error::GrammarError;

const OPEN: &str = "<<";
const CLOSE: &str = ">>";
const ARGUMENTS_PREFIX: &str = "arguments_";

/// What a placeholder expands to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaceholderKind {
    /// The language's identifier pattern.
    Identifier,
    /// Alternation of the language's type keywords.
    Type,
    /// Alternation of the language's qualifier keywords.
    Qualifier,
    /// An identifier that may carry a spread prefix (`...rest`).
    ArgumentIdentifier,
    /// A named argument-list pattern.
    Arguments(String),
}

impl PlaceholderKind {
    fn parse(kind: &str) -> Option<Self> {
        match kind {
            "identifier" => Some(Self::Identifier),
            "type" => Some(Self::Type),
            "qualifier" => Some(Self::Qualifier),
            "argument_identifier" => Some(Self::ArgumentIdentifier),
            other => other
                .strip_prefix(ARGUMENTS_PREFIX)
                .filter(|name| !name.is_empty())
                .map(|name| Self::Arguments(name.to_string())),
        }
    }
}

/// Placeholder modifiers, in the order they are written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub separator: bool,
    pub repeat: bool,
    pub optional: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    pub kind: PlaceholderKind,
    pub field: Option<String>,
    pub modifiers: Modifiers,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Placeholder(Placeholder),
}

/// A template split into literal and placeholder segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    name: String,
    segments: Vec<Segment>,
}

impl Template {
    /// Parse `source`, reporting errors against the template `name`.
    pub fn parse(name: &str, source: &str) -> Result<Self, GrammarError> {
        let mut segments = Vec::new();
        let mut rest = source;
        let mut offset = 0;

        while let Some(start) = rest.find(OPEN) {
            if start > 0 {
                segments.push(Segment::Literal(rest[..start].to_string()));
            }

            let inner_start = start + OPEN.len();
            let inner_len = rest[inner_start..].find(CLOSE).ok_or_else(|| {
                GrammarError::UnterminatedPlaceholder {
                    template: name.to_string(),
                    offset: offset + start,
                }
            })?;
            let inner = &rest[inner_start..inner_start + inner_len];
            segments.push(Segment::Placeholder(parse_placeholder(name, inner)?));

            let consumed = inner_start + inner_len + CLOSE.len();
            offset += consumed;
            rest = &rest[consumed..];
        }

        if !rest.is_empty() {
            segments.push(Segment::Literal(rest.to_string()));
        }

        Ok(Self {
            name: name.to_string(),
            segments,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Whether some literal segment carries non-whitespace syntax.
    pub fn has_anchor(&self) -> bool {
        self.segments.iter().any(|segment| match segment {
            Segment::Literal(text) => !text.trim().is_empty(),
            Segment::Placeholder(_) => false,
        })
    }

    pub fn placeholders(&self) -> impl Iterator<Item = &Placeholder> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Placeholder(placeholder) => Some(placeholder),
            Segment::Literal(_) => None,
        })
    }

    /// Captured field names in template order.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.placeholders()
            .filter_map(|placeholder| placeholder.field.as_deref())
    }
}

fn parse_placeholder(template: &str, inner: &str) -> Result<Placeholder, GrammarError> {
    let unknown = || GrammarError::UnknownPlaceholder {
        template: template.to_string(),
        placeholder: inner.to_string(),
    };

    let mut modifiers = Modifiers::default();
    let mut body = inner;
    if let Some(stripped) = body.strip_prefix(' ') {
        modifiers.separator = true;
        body = stripped;
    }
    if let Some(stripped) = body.strip_prefix('*') {
        modifiers.repeat = true;
        body = stripped;
    }
    if let Some(stripped) = body.strip_prefix('?') {
        modifiers.optional = true;
        body = stripped;
    }

    let (kind, field) = match body.split_once('#') {
        Some((kind, field)) => {
            let field = field.strip_suffix('#').ok_or_else(unknown)?;
            if !is_field_name(field) {
                return Err(unknown());
            }
            (kind, Some(field.to_string()))
        }
        None => (body, None),
    };

    Ok(Placeholder {
        kind: PlaceholderKind::parse(kind).ok_or_else(unknown)?,
        field,
        modifiers,
    })
}

/// Field names become regex group names, so they follow the same rules.
fn is_field_name(field: &str) -> bool {
    let mut chars = field.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

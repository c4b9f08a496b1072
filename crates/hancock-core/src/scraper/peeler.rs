//! Innermost-first scope peeling.
//!
//! Regular expressions cannot match balanced braces, so nesting is recovered
//! by repetition instead. Each pass finds every *leaf scope* (a `{...}`
//! region whose body holds no braces), classifies its header and body
//! statements, and rewrites the region in the buffer as a reference token
//! `##node-<id>##`. Scopes nested N deep become leaves once their children
//! are rewritten, so the loop ends after at most N+1 passes. Every pass
//! removes at least one brace pair, which also bounds the loop on
//! unbalanced input.

use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::Range;

use super::classifier::{Classification, Classifier};
use super::directory::{NodeDirectory, ScrapeWarning};
use super::node::{DeclarationFields, NodeId, SignatureKind};

/// A brace-free header region, then a brace-free body.
static LEAF_SCOPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?P<header>[^{};]*)\{(?P<body>[^{}]*)\}").unwrap());

static REFERENCE_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"##node-(\d+)##").unwrap());

const STATEMENT_TERMINATORS: &[char] = &[';', '\n', '\r'];

const SCOPE_BOUNDARIES: &[char] = &[';', '{', '}'];

pub(crate) fn reference_token(id: NodeId) -> String {
    format!("##node-{}##", id)
}

/// One leaf scope located in the buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
struct LeafScope {
    header: Range<usize>,
    body: Range<usize>,
    end: usize,
}

/// Turns source text into a [`NodeDirectory`].
pub(crate) struct ScopePeeler<'a> {
    classifier: Classifier<'a>,
    directory: NodeDirectory,
}

impl<'a> ScopePeeler<'a> {
    pub(crate) fn new(classifier: Classifier<'a>) -> Self {
        Self {
            classifier,
            directory: NodeDirectory::new(),
        }
    }

    pub(crate) fn run(mut self, source: &str) -> NodeDirectory {
        let mut buffer = source.to_string();

        loop {
            let scopes = find_leaf_scopes(&buffer);
            if scopes.is_empty() {
                break;
            }
            self.directory.record_pass();
            tracing::debug!(
                pass = self.directory.passes(),
                scopes = scopes.len(),
                buffer_len = buffer.len(),
                "peeling leaf scopes"
            );

            let mut rewritten = String::with_capacity(buffer.len());
            let mut cursor = 0;
            for scope in &scopes {
                let id = self.consume(&buffer[scope.header.clone()], &buffer[scope.body.clone()]);
                rewritten.push_str(&buffer[cursor..scope.header.start]);
                rewritten.push_str(&reference_token(id));
                cursor = scope.end;
            }
            rewritten.push_str(&buffer[cursor..]);
            buffer = rewritten;
        }

        let unmatched_open = buffer.matches('{').count();
        let unmatched_close = buffer.matches('}').count();
        if unmatched_open > 0 || unmatched_close > 0 {
            let warning = ScrapeWarning::MalformedInput {
                unmatched_open,
                unmatched_close,
            };
            tracing::warn!("{}", warning);
            self.directory.warn(warning);
        }

        // Declarations never wrapped in a scope.
        for statement in split_statements(&buffer) {
            let text = strip_references(statement);
            let text = text.trim();
            if text.is_empty() {
                continue;
            }
            if let Classification::Declaration { signature, fields } = self.classifier.classify(text) {
                self.directory
                    .insert(SignatureKind::Signature(signature), fields);
            }
        }

        self.directory
    }

    /// Record one leaf scope and return the id standing in for it.
    fn consume(&mut self, header: &str, body: &str) -> NodeId {
        let mut children = Vec::new();
        for statement in split_statements(body) {
            let text = strip_references(statement);
            let text = text.trim();
            if !text.is_empty() {
                if let Classification::Declaration { signature, fields } =
                    self.classifier.classify(text)
                {
                    children.push(
                        self.directory
                            .insert(SignatureKind::Signature(signature), fields),
                    );
                }
            }
            children.extend(resolve_references(statement, &self.directory));
        }

        let header_text = format!("{}{{", header.trim());
        let (kind, fields, adopts_children) = match self.classifier.classify(&header_text) {
            Classification::Declaration { signature, fields } => {
                (SignatureKind::Signature(signature), fields, true)
            }
            Classification::Placeholder => {
                (SignatureKind::Placeholder, DeclarationFields::default(), true)
            }
            // Children of an unrecognized scope stay parentless.
            Classification::NoMatch => (SignatureKind::Error, DeclarationFields::default(), false),
        };

        let id = self.directory.insert(kind, fields);
        if adopts_children {
            for child in children {
                self.directory.link(id, child);
            }
        }
        id
    }
}

/// Locate every non-overlapping leaf scope, header trimmed to the
/// statement that opens the scope.
fn find_leaf_scopes(buffer: &str) -> Vec<LeafScope> {
    LEAF_SCOPE
        .captures_iter(buffer)
        .filter_map(|caps| {
            let header = caps.name("header")?;
            let body = caps.name("body")?;
            let end = caps.get(0)?.end();
            let region_start = balanced_region_start(buffer, header.start(), header.as_str())
                .unwrap_or(header.start());
            // Tokens of earlier scopes stay in the buffer for the
            // enclosing scope to resolve.
            let region = &buffer[region_start..header.end()];
            let after_token = REFERENCE_TOKEN
                .find_iter(region)
                .last()
                .map_or(0, |m| m.end());
            let start = region_start + after_token + header_start(&region[after_token..]);
            Some(LeafScope {
                header: start..header.end(),
                body: body.range(),
                end,
            })
        })
        .collect()
}

/// Start of a header region whose parentheses open before `start`.
///
/// A header such as `for(init;cond;step)` is cut at its last `;`, leaving a
/// region with unmatched `)`. Walks back across `;` to the balancing `(`,
/// then on to the previous `;`, `{` or `}`. Returns `None` when the region
/// is balanced or a brace comes first.
fn balanced_region_start(buffer: &str, start: usize, region: &str) -> Option<usize> {
    let mut depth = paren_depth(region);
    if depth >= 0 {
        return None;
    }

    let before = &buffer[..start];
    let mut open = None;
    for (i, c) in before.char_indices().rev() {
        match c {
            ')' => depth -= 1,
            '(' => {
                depth += 1;
                if depth == 0 {
                    open = Some(i);
                    break;
                }
            }
            '{' | '}' => return None,
            _ => {}
        }
    }

    let open = open?;
    Some(before[..open].rfind(SCOPE_BOUNDARIES).map_or(0, |i| i + 1))
}

/// Offset within `region` where the scope header begins.
///
/// The region runs back to the previous `;`, `{` or `}` and may hold
/// earlier terminator-less statements. The header is the shortest
/// non-blank suffix starting at a line break that closes no parenthesis
/// it did not open, so a multi-line argument list stays whole.
fn header_start(region: &str) -> usize {
    let line_starts = std::iter::once(0).chain(
        region
            .char_indices()
            .filter(|(_, c)| *c == '\n' || *c == '\r')
            .map(|(i, _)| i + 1),
    );
    let mut starts: Vec<usize> = line_starts.collect();
    starts.reverse();

    for start in starts {
        let suffix = &region[start..];
        if suffix.trim().is_empty() {
            continue;
        }
        if paren_depth(suffix) >= 0 {
            return start;
        }
    }
    0
}

fn paren_depth(text: &str) -> i64 {
    text.chars().fold(0, |depth, c| match c {
        '(' => depth + 1,
        ')' => depth - 1,
        _ => depth,
    })
}

fn split_statements(text: &str) -> impl Iterator<Item = &str> {
    text.split(STATEMENT_TERMINATORS)
}

fn strip_references(text: &str) -> std::borrow::Cow<'_, str> {
    REFERENCE_TOKEN.replace_all(text, "")
}

fn resolve_references<'t>(
    text: &'t str,
    directory: &'t NodeDirectory,
) -> impl Iterator<Item = NodeId> + 't {
    REFERENCE_TOKEN.captures_iter(text).filter_map(|caps| {
        let id = NodeId::new(caps.get(1)?.as_str().parse().ok()?);
        directory.contains(id).then_some(id)
    })
}

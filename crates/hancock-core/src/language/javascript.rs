//! Built-in JavaScript grammar.

use super::{LanguageDefinition, NamedTemplate};

const IDENTIFIER: &str = r"[A-Za-z$_][\w$]*";

const TYPES: &[&str] = &["const", "let", "var"];
const QUALIFIERS: &[&str] = &["static", "async"];

/// Scope openers that share the method shape `name (...) {`.
const CONTROL_KEYWORDS: &[&str] = &[
    "if", "else", "switch", "for", "while", "do", "try", "catch", "finally",
];

const ARGUMENT_PATTERNS: &[(&str, &str)] = &[
    (
        "standard",
        r"\((?:\s*(?:<<argument_identifier>>\s*,\s*)*<<argument_identifier>>\s*)?\)",
    ),
    (
        "arrow",
        r"(?:\((?:\s*(?:<<argument_identifier>>\s*,\s*)*<<argument_identifier>>\s*)?\))|(?:\s*<<argument_identifier>>\s*)",
    ),
];

// Order is match priority: prototype attachments must precede the plain
// static forms, and functions must precede properties.
const SIGNATURES: &[(&str, &str)] = &[
    (
        "function_standard",
        "<< *?qualifier#qualifiers#>>function <<identifier#name#>><<arguments_standard#arguments#>>{",
    ),
    (
        "function_anonymous",
        "<<type#type#>> <<identifier#name#>>=<< *?qualifier#qualifiers#>>function<<arguments_standard#arguments#>>{",
    ),
    (
        "function_anonymous_arrow",
        "<<type#type#>> <<identifier#name#>>=<< *?qualifier#qualifiers#>><<arguments_arrow#arguments#>>=>{?",
    ),
    ("class_standard", "class <<identifier#name#>>{"),
    (
        "class_extends",
        "class <<identifier#name#>> extends <<identifier#parent#>>{",
    ),
    (
        "class_method",
        "<< *?qualifier#qualifiers#>><<identifier#name#>><<arguments_standard#arguments#>>{",
    ),
    (
        "class_prototype_function_anonymous",
        r"<<identifier#parent#>>\.prototype\.<<identifier#name#>>=<< *?qualifier#qualifiers#>>function<<arguments_standard#arguments#>>{",
    ),
    (
        "class_prototype_function_anonymous_arrow",
        r"<<identifier#parent#>>\.prototype\.<<identifier#name#>>=<< *?qualifier#qualifiers#>><<arguments_arrow#arguments#>>=>{?",
    ),
    (
        "class_static_function_anonymous",
        r"<<identifier#parent#>>\.<<identifier#name#>>=<< *?qualifier#qualifiers#>>function<<arguments_standard#arguments#>>{",
    ),
    (
        "class_static_function_anonymous_arrow",
        r"<<identifier#parent#>>\.<<identifier#name#>>=<< *?qualifier#qualifiers#>><<arguments_arrow#arguments#>>=>{?",
    ),
    ("class_property_standard", r"this\.<<identifier#name#>>="),
    (
        "class_property_static",
        r"<<identifier#parent#>>\.<<identifier#name#>>=",
    ),
    (
        "class_property_prototype",
        r"<<identifier#parent#>>\.prototype\.<<identifier#name#>>=",
    ),
];

/// The JavaScript grammar: functions, classes, methods, and prototype or
/// static attachments.
pub fn javascript() -> LanguageDefinition {
    LanguageDefinition {
        name: "JavaScript".to_string(),
        extensions: ["js", "jsx", "mjs", "cjs"]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        identifier_pattern: IDENTIFIER.to_string(),
        types: TYPES.iter().map(|s| s.to_string()).collect(),
        qualifiers: QUALIFIERS.iter().map(|s| s.to_string()).collect(),
        argument_patterns: ARGUMENT_PATTERNS
            .iter()
            .map(|(name, pattern)| NamedTemplate::new(*name, *pattern))
            .collect(),
        signatures: SIGNATURES
            .iter()
            .map(|(name, template)| NamedTemplate::new(*name, *template))
            .collect(),
        subclass_signatures: vec!["class_extends".to_string()],
        control_keywords: CONTROL_KEYWORDS.iter().map(|s| s.to_string()).collect(),
    }
}

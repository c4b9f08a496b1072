use std::fs;

use hancock_core::language::{DefinitionFormat, NamedTemplate};
use hancock_core::{compile, javascript, GrammarError, LanguageDefinition, LanguageError, LanguageRegistry};
use proptest::prelude::*;

fn minimal(signatures: &[(&str, &str)]) -> LanguageDefinition {
    LanguageDefinition {
        name: "Mini".to_string(),
        extensions: vec!["mini".to_string()],
        identifier_pattern: r"[a-z_]\w*".to_string(),
        types: vec!["int".to_string()],
        qualifiers: vec!["pub".to_string()],
        argument_patterns: vec![NamedTemplate::new(
            "plain",
            r"\((?:<<argument_identifier>>)?\)",
        )],
        signatures: signatures
            .iter()
            .map(|(name, template)| NamedTemplate::new(*name, *template))
            .collect(),
        subclass_signatures: Vec::new(),
        control_keywords: vec!["if".to_string()],
    }
}

#[test]
fn test_undeclared_argument_pattern() {
    let definition = minimal(&[("function", "fn <<identifier#name#>><<arguments_missing#arguments#>>{")]);
    let err = compile(definition).unwrap_err();
    assert!(matches!(
        err,
        GrammarError::UndeclaredArgumentPattern { ref signature, ref pattern }
            if signature == "function" && pattern == "missing"
    ));
}

#[test]
fn test_missing_anchor() {
    let definition = minimal(&[("bare", "<<type#type#>> <<identifier#name#>>")]);
    let err = compile(definition).unwrap_err();
    assert!(matches!(err, GrammarError::MissingAnchor { ref signature } if signature == "bare"));
}

#[test]
fn test_duplicate_field() {
    let definition = minimal(&[("twice", "<<identifier#name#>>=<<identifier#name#>>")]);
    assert!(matches!(
        compile(definition),
        Err(GrammarError::DuplicateField { .. })
    ));
}

#[test]
fn test_order_is_priority() {
    let definition = minimal(&[
        ("typed", "<<type#type#>> <<identifier#name#>>="),
        ("assign", "<<identifier#name#>>="),
    ]);
    let language = compile(definition).unwrap();
    let names: Vec<_> = language.expressions().iter().map(|e| e.name()).collect();
    assert_eq!(names, vec!["typed", "assign"]);

    assert!(language.expression("typed").unwrap().is_match("int x = 1"));
    assert!(!language.expression("assign").unwrap().is_match("int x = 1"));
}

#[test]
fn test_match_is_anchored_to_statement_start() {
    let language = compile(minimal(&[("function", "fn <<identifier#name#>><<arguments_plain#arguments#>>{")])).unwrap();
    let expression = language.expression("function").unwrap();

    assert!(expression.is_match("fn main(){"));
    assert!(expression.is_match("x = 1;fn main(){"));
    assert!(expression.is_match("x = 1\n   fn main(){"));
    assert!(!expression.is_match("x = fn main(){"));
    assert!(!expression.is_match("define(){"));
}

#[test]
fn test_load_definition_files() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mini.json");
    let definition = minimal(&[("function", "fn <<identifier#name#>><<arguments_plain#arguments#>>{")]);
    fs::write(&path, serde_json::to_string_pretty(&definition).unwrap()).unwrap();
    fs::write(dir.path().join("notes.txt"), "not a grammar").unwrap();

    assert_eq!(LanguageDefinition::from_file(&path).unwrap(), definition);
    assert!(matches!(
        LanguageDefinition::from_file(dir.path().join("notes.txt")),
        Err(LanguageError::UnsupportedFormat(_))
    ));

    let mut registry = LanguageRegistry::empty();
    assert_eq!(registry.load_dir(dir.path()).unwrap(), 1);
    assert!(registry.by_name("mini").is_some());
    assert!(registry.for_path("src/lib.mini").is_some());
    assert!(registry.for_path("src/lib.js").is_none());
}

#[test]
fn test_invalid_definition_is_reported_with_language() {
    let dir = tempfile::tempdir().unwrap();
    let definition = minimal(&[("bare", "<<identifier#name#>>")]);
    fs::write(
        dir.path().join("bad.yaml"),
        serde_yaml::to_string(&definition).unwrap(),
    )
    .unwrap();

    let mut registry = LanguageRegistry::new();
    let err = registry.load_dir(dir.path()).unwrap_err();
    assert!(matches!(
        err,
        LanguageError::Grammar { ref language, source: GrammarError::MissingAnchor { .. } } if language == "Mini"
    ));
    assert!(registry.by_name("javascript").is_some());
}

#[test]
fn test_builtin_survives_yaml() {
    let yaml = serde_yaml::to_string(&javascript()).unwrap();
    let definition = LanguageDefinition::parse(&yaml, DefinitionFormat::Yaml).unwrap();
    assert_eq!(definition, javascript());
}

proptest! {
    #[test]
    fn identifiers_are_accepted(name in "[A-Za-z$_][A-Za-z0-9$_]{0,24}") {
        let language = javascript().compile().unwrap();
        prop_assert!(language.is_identifier(&name));

        let text = format!("function {}(){{", name);
        let caps = language.expression("function_standard").unwrap().regex().captures(&text);
        prop_assert_eq!(caps.and_then(|c| c.name("name")).map(|m| m.as_str()), Some(name.as_str()));
    }

    #[test]
    fn leading_digits_are_rejected(name in "[0-9][A-Za-z0-9$_]{0,24}") {
        let language = javascript().compile().unwrap();
        prop_assert!(!language.is_identifier(&name));
    }

    #[test]
    fn compilation_is_deterministic(text in "[ a-z(){}=;.,]{0,40}") {
        let first = javascript().compile().unwrap();
        let second = javascript().compile().unwrap();
        for (a, b) in first.expressions().iter().zip(second.expressions()) {
            prop_assert_eq!(a.as_str(), b.as_str());
            prop_assert_eq!(a.is_match(&text), b.is_match(&text));
        }
    }
}

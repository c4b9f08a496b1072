use std::sync::Arc;

use hancock_core::scraper::{ScrapeWarning, SignatureKind};
use hancock_core::{javascript, Forest, Scraper};

fn scraper() -> Scraper {
    Scraper::new(Arc::new(javascript().compile().unwrap()))
}

fn names(forest: &Forest, root: &str) -> Vec<String> {
    forest
        .get(root)
        .unwrap_or_default()
        .iter()
        .map(|s| s.identifier.clone())
        .collect()
}

const ANIMALS: &str = r#"
class Animal {
    constructor(name, sound){
        this.species = name;
        this.sound = sound;
        this.data = {
            name: name,
            sound: sound
        }
    }

    speak(){
        console.log(this.sound);
    }
}

class Dog extends Animal {
    constructor(name, color){
        this.timeout = setTimeout(() => {
            this.name = name;
        },5000);
    }
}
"#;

#[test]
fn test_single_function() {
    let forest = scraper().scrape_forest("function foo(a,b){ }");

    assert_eq!(forest.roots().collect::<Vec<_>>(), vec!["foo"]);
    let bucket = forest.get("foo").unwrap();
    assert_eq!(bucket.len(), 1);
    assert_eq!(bucket[0].signature, "function_standard");
    assert_eq!(bucket[0].arguments.as_deref(), Some("(a,b)"));
}

#[test]
fn test_uninteresting_statement_yields_nothing() {
    let directory = scraper().scrape("1 + 1;");
    assert!(directory.is_empty());
    assert!(directory.warnings().is_empty());
}

#[test]
fn test_unterminated_scope_terminates() {
    let scraper = scraper();
    let directory = scraper.scrape("function foo(){");

    assert_eq!(
        directory.warnings(),
        &[ScrapeWarning::MalformedInput {
            unmatched_open: 1,
            unmatched_close: 0
        }]
    );
    let node = directory.iter().next().unwrap();
    assert_eq!(node.identifier(), Some("foo"));

    let forest = scraper.build_forest(directory);
    assert!(forest.contains_root("foo"));
}

#[test]
fn test_stray_closing_brace_terminates() {
    let directory = scraper().scrape("}} function foo(){ } }");
    assert_eq!(
        directory.warnings(),
        &[ScrapeWarning::MalformedInput {
            unmatched_open: 0,
            unmatched_close: 3
        }]
    );
    assert!(directory.find_by_identifier("foo").next().is_some());
}

#[test]
fn test_prototype_attachment() {
    let source = "const dogCollection = [];\nclass Animal { speak(){} }\nAnimal.prototype.bark = function(){};";
    let forest = scraper().scrape_forest(source);

    assert_eq!(forest.roots().collect::<Vec<_>>(), vec!["Animal"]);
    assert_eq!(names(&forest, "Animal"), vec!["Animal", "speak", "bark"]);
}

#[test]
fn test_nested_declaration_belongs_to_outer_class() {
    let source = r#"
class Animal {
    speak() {
        function helper(){ }
    }
}
"#;
    let forest = scraper().scrape_forest(source);

    assert_eq!(forest.len(), 1);
    let animal = names(&forest, "Animal");
    assert!(animal.contains(&"helper".to_string()));
    assert!(animal.contains(&"speak".to_string()));
    assert_eq!(forest.declaration_count(), 3);
}

#[test]
fn test_duplicate_names_in_a_bucket() {
    let source = r#"
class Animal { speak(){} }
Animal.prototype.speak = function(){};
"#;
    let forest = scraper().scrape_forest(source);
    assert_eq!(names(&forest, "Animal"), vec!["Animal", "speak"]);
}

#[test]
fn test_structure_is_consistent() {
    let directory = scraper().scrape(ANIMALS);

    for node in directory.iter() {
        for child in node.children() {
            assert_eq!(directory.get(*child).unwrap().parent(), Some(node.id()));
        }
        if let Some(parent) = node.parent() {
            assert!(directory.get(parent).unwrap().children().contains(&node.id()));
        }
    }
    // Scopes nest three deep.
    assert_eq!(directory.passes(), 3);
}

#[test]
fn test_subclass_is_its_own_root() {
    let forest = scraper().scrape_forest(ANIMALS);

    assert_eq!(forest.roots().collect::<Vec<_>>(), vec!["Animal", "Dog"]);

    let animal = names(&forest, "Animal");
    for expected in ["Animal", "constructor", "species", "sound", "speak"] {
        assert!(animal.contains(&expected.to_string()), "Animal lacks {expected}");
    }

    let dog = forest.get("Dog").unwrap();
    assert_eq!(dog[0].signature, "class_extends");
    let dog = names(&forest, "Dog");
    assert!(dog.contains(&"constructor".to_string()));
    assert!(dog.contains(&"timeout".to_string()));
    assert!(!dog.contains(&"speak".to_string()));
}

#[test]
fn test_control_scopes_become_placeholders() {
    let source = r#"
function feed(dogs) {
    for (let dog of dogs) {
        if (dog.hungry) {
            dog.bowl = 1;
        } else {
            dog.bowl = 0;
        }
    }
}
"#;
    let scraper = scraper();
    let directory = scraper.scrape(source);

    let placeholders = directory
        .iter()
        .filter(|n| *n.kind() == SignatureKind::Placeholder)
        .count();
    assert_eq!(placeholders, 3);
    assert!(directory.find_by_identifier("if").next().is_none());

    let forest = scraper.build_forest(directory);
    assert_eq!(forest.roots().collect::<Vec<_>>(), vec!["feed"]);
    assert_eq!(names(&forest, "feed"), vec!["feed", "bowl"]);
}

#[test]
fn test_classic_for_loop_keeps_nested_declarations() {
    let source = "class A { m(){ for(let i=0;i<3;i++){ function helper(){ } } } }";
    let scraper = scraper();
    let directory = scraper.scrape(source);

    let placeholders = directory
        .iter()
        .filter(|n| *n.kind() == SignatureKind::Placeholder)
        .count();
    assert_eq!(placeholders, 1);
    assert!(directory.iter().all(|n| *n.kind() != SignatureKind::Error));

    let forest = scraper.build_forest(directory);
    assert_eq!(forest.roots().collect::<Vec<_>>(), vec!["A"]);
    let a = names(&forest, "A");
    assert!(a.contains(&"helper".to_string()));
    assert!(a.contains(&"m".to_string()));
}

#[test]
fn test_loops_and_exception_handlers_are_not_methods() {
    let source = "class B { m(){ while (running) { x(); } try { y(); } catch (e) { z(); } } }";
    let forest = scraper().scrape_forest(source);

    assert_eq!(forest.roots().collect::<Vec<_>>(), vec!["B"]);
    assert_eq!(names(&forest, "B"), vec!["B", "m"]);
}

#[test]
fn test_unclassified_scope_orphans_children() {
    let source = "weird stuff here { function inner(){ } }";
    let directory = scraper().scrape(source);

    let error = directory
        .iter()
        .find(|n| *n.kind() == SignatureKind::Error)
        .unwrap();
    assert!(error.children().is_empty());

    let inner = directory.find_by_identifier("inner").next().unwrap();
    assert_eq!(inner.parent(), None);
}

#[test]
fn test_static_members_attach_to_class() {
    let source = r#"
class Counter {
    tick(){ }
}
Counter.total = 0;
Counter.reset = () => { Counter.total = 0; };
"#;
    let forest = scraper().scrape_forest(source);
    assert_eq!(forest.roots().collect::<Vec<_>>(), vec!["Counter"]);
    assert_eq!(names(&forest, "Counter"), vec!["Counter", "tick", "total", "reset"]);
}

#[test]
fn test_forest_serializes_as_map() {
    let forest = scraper().scrape_forest("function foo(a,b){ }");
    let json = serde_json::to_value(&forest).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "foo": [{"identifier": "foo", "arguments": "(a,b)", "signature": "function_standard"}]
        })
    );
}

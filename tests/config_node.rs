//! Parse/serialize behaviour of config trees, including generated trees.

use proptest::prelude::*;
use tank_patcher::{ConfigNode, NamedObject, Operator, SearchQuery, SearchTerm, Value};
use tank_patcher::object::ModuleSwitchableTank;

fn ident() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z0-9_]{0,8}"
}

fn value_text() -> impl Strategy<Value = String> {
    "[A-Za-z0-9_.,-]{1,6}( [A-Za-z0-9_.,-]{1,6})?"
}

fn comment_text() -> impl Strategy<Value = Option<String>> {
    prop::option::of("[A-Za-z0-9]{1,8}( [A-Za-z0-9]{1,8})?")
}

fn operator() -> impl Strategy<Value = Option<Operator>> {
    prop::option::of(prop_oneof![
        Just(Operator::Replace),
        Just(Operator::Delete),
        Just(Operator::EditOrCreate),
        Just(Operator::Copy),
    ])
}

fn leaf() -> impl Strategy<Value = ConfigNode> {
    (
        operator(),
        ident(),
        prop::collection::vec((operator(), ident(), value_text(), comment_text()), 0..4),
    )
        .prop_map(|(prefix, name, values)| {
            let mut node = ConfigNode::new(name);
            if let Some(op) = prefix {
                node = node.with_prefix(op);
            }
            for (op, key, value, comment) in values {
                let value = match op {
                    Some(op) => Value::with_operator(op, key, value),
                    None => Value::new(key, value),
                };
                node.add_value_item(value).set_comment(comment);
            }
            node
        })
}

fn tree() -> impl Strategy<Value = ConfigNode> {
    leaf().prop_recursive(3, 24, 4, |inner| {
        (leaf(), prop::collection::vec(inner, 0..4)).prop_map(|(mut node, children)| {
            for child in children {
                node.add_child(child);
            }
            node
        })
    })
}

proptest! {
    #[test]
    fn serialized_tree_parses_back(children in prop::collection::vec(tree(), 0..4)) {
        let mut root = ConfigNode::root();
        for child in children {
            root.add_child(child);
        }
        let text = root.serialize();
        let parsed = ConfigNode::parse(&text).unwrap();
        prop_assert_eq!(&parsed, &root);
        prop_assert_eq!(parsed.serialize(), text);
    }
}

#[test]
fn deletions_keep_value_and_body() {
    let text = "@PART[fuelTank]\n{\n\t!mass = DEL\n\t!MODULE[ModuleX]\n\t{\n\t\tname = ModuleX\n\t}\n}\n";
    let first = ConfigNode::parse(text).unwrap();
    let patch = &first.children()[0];
    assert_eq!(
        patch.value_with(Some(Operator::Delete), "mass").map(Value::value),
        Some("DEL")
    );
    let module = patch.child_with(Some(Operator::Delete), "MODULE").unwrap();
    assert_eq!(module.value("name"), Some("ModuleX"));

    assert_eq!(first.serialize(), text);
    assert_eq!(ConfigNode::parse(&first.serialize()).unwrap(), first);
}

#[test]
fn handwritten_text_normalizes_once() {
    let text = "PART{name=a   // first\n  MODULE { name = ModuleEngines }\nRESOURCE\n{\nname=Ore\n}}\n@PART[b]:FOR[X] { %cost = 5 }";
    let first = ConfigNode::parse(text).unwrap();
    let normalized = first.serialize();
    let second = ConfigNode::parse(&normalized).unwrap();
    assert_eq!(first, second);
    assert_eq!(second.serialize(), normalized);
}

#[test]
fn duplicates_keep_their_order() {
    let root = ConfigNode::parse("NODE\n{\n\tA = 1\n\tB = 2\n\tA = 3\n}\n").unwrap();
    let node = &root.children()[0];
    let pairs: Vec<_> = node
        .values()
        .iter()
        .map(|v| (v.key(), v.value()))
        .collect();
    assert_eq!(pairs, vec![("A", "1"), ("B", "2"), ("A", "3")]);
    assert_eq!(root.serialize(), "NODE\n{\n\tA = 1\n\tB = 2\n\tA = 3\n}\n");
}

#[test]
fn second_duplicate_child_can_satisfy_a_term() {
    let root = ConfigNode::parse(
        "PART\n{\n\tMODULE\n\t{\n\t\tname = ModuleCommand\n\t}\n\tMODULE\n\t{\n\t\tname = ModuleEngines\n\t}\n}\n",
    )
    .unwrap();
    let part = &root.children()[0];
    let term = SearchTerm::parse("MODULE/name:ModuleEngines").unwrap();
    assert!(term.matches(part));
    assert!(!SearchTerm::parse("MODULE/name:ModuleRCS").unwrap().matches(part));
}

#[test]
fn query_or_semantics() {
    let query = SearchQuery::from_terms(["A/B", "C/D"]).unwrap();
    let only_cd = ConfigNode::parse("C\n{\n\tD\n\t{\n\t}\n}\n").unwrap();
    let neither = ConfigNode::parse("A\n{\n\tD\n\t{\n\t}\n}\n").unwrap();
    assert!(query.matches(&only_cd.children()[0]));
    assert!(!query.matches(&neither.children()[0]));
}

#[test]
fn rounding_is_stable_across_cycles() {
    let mut tank = ModuleSwitchableTank::new();
    tank.set_volume(0.1234567);
    let mut text = tank.node().serialize();
    assert!(text.contains("Volume = 0.123457"));
    for _ in 0..3 {
        let root = ConfigNode::parse(&text).unwrap();
        let reloaded = ModuleSwitchableTank::load(root.into_children().remove(0)).unwrap();
        let volume = reloaded.volume().unwrap().unwrap();
        assert!((volume - 0.123457).abs() < 1e-9);
        text = reloaded.node().serialize();
    }
    assert!(text.contains("Volume = 0.123457"));
}

#[test]
fn patch_header_round_trips() {
    let root = ConfigNode::parse(
        "@PART[fuelTank*]:HAS[@RESOURCE[LiquidFuel]]:FOR[ConfigurableContainers]\n{\n\t!RESOURCE[LiquidFuel]\n\t{\n\t}\n\t@title = Tank\n}\n",
    )
    .unwrap();
    let patch = &root.children()[0];
    assert_eq!(patch.prefix(), Some(Operator::Replace));
    assert_eq!(patch.selector(), Some("fuelTank*"));
    assert_eq!(
        patch.filter(),
        Some(":HAS[@RESOURCE[LiquidFuel]]:FOR[ConfigurableContainers]")
    );
    assert_eq!(patch.children()[0].prefix(), Some(Operator::Delete));
    assert_eq!(ConfigNode::parse(&root.serialize()).unwrap(), root);
}

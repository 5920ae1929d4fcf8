use logconf_model::{ModelValue, ResourceTree, ResourceType};
use logconf_test_utils::{
    attrs, base, list, minimal_tree, tree_with_profile, FULL_1_5, LEGACY_1_0, MINIMAL_1_5,
};
use logconf_xml::{parse, write, LoggingSubsystem, ParserConfig, SchemaVersion, WriterConfig};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn tree_of(source: &str) -> ResourceTree {
    let ops = parse(source, &ParserConfig::default()).unwrap();
    ResourceTree::from_operations(&ops, &base()).unwrap()
}

fn round_trip(tree: &ResourceTree) -> ResourceTree {
    tree_of(&write(tree, &WriterConfig::default()).unwrap())
}

#[test]
fn minimal_document_round_trips() {
    let tree = tree_of(MINIMAL_1_5);
    assert_eq!(tree, minimal_tree());
    assert_eq!(round_trip(&tree), tree);
}

#[test]
fn full_document_round_trips() {
    let tree = tree_of(FULL_1_5);
    assert_eq!(tree.profiles().count(), 2);
    assert_eq!(
        tree.attribute("add-logging-api-dependencies"),
        Some(&ModelValue::Boolean(false))
    );
    assert_eq!(round_trip(&tree), tree);
}

#[test]
fn writing_is_deterministic() {
    let tree = tree_of(FULL_1_5);
    let config = WriterConfig::default();
    let first = write(&tree, &config).unwrap();
    let second = write(&round_trip(&tree), &config).unwrap();
    assert_eq!(first, second);
}

#[test]
fn legacy_document_is_upgraded() {
    let out = LoggingSubsystem::new().rewrite_str(LEGACY_1_0).unwrap();
    assert!(out.contains(SchemaVersion::CURRENT.namespace()));
    assert!(!out.contains("<filter>"));
    assert!(out.contains("<filter-spec value="));

    assert_eq!(tree_of(&out), tree_of(LEGACY_1_0));
}

#[test]
fn output_follows_fixed_category_order() {
    let out = write(&tree_of(FULL_1_5), &WriterConfig::default()).unwrap();
    let order = [
        "<add-logging-api-dependencies",
        "<async-handler",
        "<console-handler",
        "<custom-handler",
        "<periodic-rotating-file-handler",
        "<periodic-size-rotating-file-handler",
        "<size-rotating-file-handler",
        "<syslog-handler",
        "<logger",
        "<root-logger",
        r#"<formatter name="PATTERN">"#,
        r#"<formatter name="JSON">"#,
        "<logging-profiles>",
    ];
    let positions: Vec<usize> = order
        .iter()
        .map(|needle| out.find(needle).unwrap_or_else(|| panic!("{needle} missing")))
        .collect();
    let mut sorted = positions.clone();
    sorted.sort_unstable();
    assert_eq!(positions, sorted);
}

#[test]
fn profile_round_trips() {
    let tree = tree_with_profile("dev");
    assert_eq!(round_trip(&tree), tree);
}

#[test]
fn named_formatter_reference_is_written() {
    let mut tree = ResourceTree::new();
    tree.insert(
        ResourceType::FileHandler,
        "FILE",
        attrs([
            ("named-formatter", ModelValue::from("PATTERN")),
            (
                "file",
                logconf_xml::codec::file_value("server.log".into(), Some("log.dir".into())),
            ),
        ]),
    )
    .unwrap();
    let out = write(&tree, &WriterConfig::new().with_indent(0).with_xml_declaration(false)).unwrap();
    assert!(out.contains(
        r#"<formatter><named-formatter name="PATTERN"/></formatter><file relative-to="log.dir" path="server.log"/>"#
    ), "{out}");
}

#[test]
fn formatter_and_named_formatter_conflict() {
    let mut tree = ResourceTree::new();
    tree.insert(
        ResourceType::ConsoleHandler,
        "C",
        attrs([
            ("formatter", ModelValue::from("%m")),
            ("named-formatter", ModelValue::from("F")),
        ]),
    )
    .unwrap();
    assert!(write(&tree, &WriterConfig::default()).is_err());
}

#[test]
fn invalid_filter_spec_is_not_written() {
    let mut tree = minimal_tree();
    tree.insert(
        ResourceType::Logger,
        "a",
        attrs([("filter-spec", ModelValue::from("all("))]),
    )
    .unwrap();
    assert!(write(&tree, &WriterConfig::default()).is_err());
}

#[test]
fn unknown_level_is_not_written() {
    let mut tree = ResourceTree::new();
    tree.set_root_logger(attrs([("level", ModelValue::from("LOUD"))]));
    let err = write(&tree, &WriterConfig::default()).unwrap_err();
    assert_eq!(
        err.to_string(),
        "cannot encode 'level' of root-logger: unknown level"
    );
}

#[test]
fn lower_case_level_is_not_written() {
    let mut tree = ResourceTree::new();
    tree.insert(
        ResourceType::ConsoleHandler,
        "CONSOLE",
        attrs([("level", ModelValue::from("info"))]),
    )
    .unwrap();
    let err = write(&tree, &WriterConfig::default()).unwrap_err();
    assert!(err.to_string().contains("canonical upper-case"), "{err}");

    let mut canonical = ResourceTree::new();
    canonical
        .insert(
            ResourceType::ConsoleHandler,
            "CONSOLE",
            attrs([("level", ModelValue::from("INFO"))]),
        )
        .unwrap();
    assert_eq!(round_trip(&canonical), canonical);
}

#[test]
fn empty_handler_list_survives() {
    let mut tree = ResourceTree::new();
    tree.set_root_logger(attrs([("handlers", list(&[]))]));
    assert_eq!(round_trip(&tree), tree);
}

fn name() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z0-9._-]{0,8}"
}

fn level() -> impl Strategy<Value = ModelValue> {
    prop::sample::select(vec!["TRACE", "DEBUG", "INFO", "WARN", "ERROR"]).prop_map(ModelValue::from)
}

proptest! {
    #[test]
    fn prop_written_trees_read_back(
        handlers in prop::collection::btree_map(name(), (level(), any::<bool>()), 0..6),
        loggers in prop::collection::btree_map(name(), (level(), any::<bool>()), 0..6),
        root_level in prop::option::of(level()),
    ) {
        let mut tree = ResourceTree::new();
        for (name, (level, autoflush)) in &handlers {
            tree.insert(
                ResourceType::ConsoleHandler,
                name.clone(),
                attrs([("level", level.clone()), ("autoflush", ModelValue::Boolean(*autoflush))]),
            )
            .unwrap();
        }
        let refs: Vec<&str> = handlers.keys().map(String::as_str).collect();
        for (category, (level, use_parent)) in &loggers {
            tree.insert(
                ResourceType::Logger,
                category.clone(),
                attrs([
                    ("level", level.clone()),
                    ("use-parent-handlers", ModelValue::Boolean(*use_parent)),
                    ("handlers", list(&refs)),
                ]),
            )
            .unwrap();
        }
        if let Some(level) = root_level {
            tree.set_root_logger(attrs([("level", level)]));
        }

        prop_assert_eq!(round_trip(&tree), tree);
    }
}

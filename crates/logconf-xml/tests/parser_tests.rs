use logconf_model::{ModelValue, Operation, PathAddress, ROOT_LOGGER_NAME};
use logconf_test_utils::{base, document, list, LEGACY_1_0, MINIMAL_1_5};
use logconf_xml::{
    parse, parse_document, ExtensionError, ExtensionParser, ParseError, ParseErrorKind,
    ParserConfig, RawElement, SchemaVersion,
};
use pretty_assertions::assert_eq;

fn kind_of(tag: &str, body: &str) -> ParseErrorKind {
    parse(&document(tag, body), &ParserConfig::default())
        .unwrap_err()
        .kind()
}

fn keys(source: &str) -> Vec<String> {
    parse(source, &ParserConfig::default())
        .unwrap()
        .iter()
        .map(|op| op.address().to_string())
        .collect()
}

#[test]
fn minimal_document_yields_handler_then_root_logger() {
    let ops = parse(MINIMAL_1_5, &ParserConfig::default()).unwrap();
    assert_eq!(ops.len(), 2);

    let handler = &ops.as_slice()[0];
    assert_eq!(handler.address(), &base().append("console-handler", "CONSOLE"));
    assert_eq!(handler.attributes().len(), 1);
    assert_eq!(handler.attribute("level"), Some(&ModelValue::from("INFO")));

    let root = &ops.as_slice()[1];
    assert_eq!(root.address(), &base().append("root-logger", ROOT_LOGGER_NAME));
    assert_eq!(root.attribute("handlers"), Some(&list(&["CONSOLE"])));
}

#[test]
fn version_is_reported() {
    let parsed = parse_document(LEGACY_1_0, &ParserConfig::default()).unwrap();
    assert_eq!(parsed.version, SchemaVersion::V1_0);
}

#[test]
fn emission_is_bucketed_regardless_of_document_order() {
    let body = r#"
        <root-logger/>
        <logger category="a"/>
        <async-handler name="ASYNC"><queue-length value="8"/></async-handler>
        <console-handler name="CONSOLE"/>
        <formatter name="F"><pattern-formatter pattern="%m"/></formatter>
    "#;
    assert_eq!(
        keys(&document("1.5", body)),
        vec![
            "subsystem=logging/pattern-formatter=F",
            "subsystem=logging/console-handler=CONSOLE",
            "subsystem=logging/async-handler=ASYNC",
            "subsystem=logging/logger=a",
            "subsystem=logging/root-logger=ROOT",
        ]
    );
}

#[test]
fn custom_handler_requires_1_1() {
    let body = r#"<custom-handler name="C" class="a.B" module="a"/>"#;
    assert_eq!(kind_of("1.0", body), ParseErrorKind::UnexpectedElement);
    assert!(parse(&document("1.1", body), &ParserConfig::default()).is_ok());
}

#[test]
fn enabled_attribute_requires_1_2() {
    let body = r#"<console-handler name="C" enabled="false"/>"#;
    assert_eq!(kind_of("1.1", body), ParseErrorKind::UnexpectedAttribute);

    let ops = parse(&document("1.2", body), &ParserConfig::default()).unwrap();
    assert_eq!(
        ops.as_slice()[0].attribute("enabled"),
        Some(&ModelValue::Boolean(false))
    );
}

#[test]
fn filter_forms_are_split_by_version() {
    let nested = r#"<logger category="a"><filter><accept/></filter></logger>"#;
    let spec = r#"<logger category="a"><filter-spec value="accept"/></logger>"#;
    assert_eq!(kind_of("1.2", nested), ParseErrorKind::UnexpectedElement);
    assert_eq!(kind_of("1.1", spec), ParseErrorKind::UnexpectedElement);
    assert!(parse(&document("1.1", nested), &ParserConfig::default()).is_ok());
    assert!(parse(&document("1.2", spec), &ParserConfig::default()).is_ok());
}

#[test]
fn later_additions_are_gated() {
    let api = r#"<add-logging-api-dependencies value="true"/>"#;
    assert_eq!(kind_of("1.3", api), ParseErrorKind::UnexpectedElement);

    let boot = r#"<size-rotating-file-handler name="S" rotate-on-boot="true"><file path="s.log"/></size-rotating-file-handler>"#;
    assert_eq!(kind_of("1.2", boot), ParseErrorKind::UnexpectedAttribute);
    assert!(parse(&document("1.3", boot), &ParserConfig::default()).is_ok());

    let named = r#"<formatter name="F"><pattern-formatter pattern="%m"/></formatter>"#;
    assert_eq!(kind_of("1.3", named), ParseErrorKind::UnexpectedElement);

    let periodic_size = r#"<periodic-size-rotating-file-handler name="P"><file path="p.log"/></periodic-size-rotating-file-handler>"#;
    assert_eq!(kind_of("1.4", periodic_size), ParseErrorKind::UnexpectedElement);
    assert!(parse(&document("1.5", periodic_size), &ParserConfig::default()).is_ok());
}

#[test]
fn handler_names_share_one_scope() {
    let body = r#"
        <console-handler name="H"/>
        <file-handler name="H"><file path="h.log"/></file-handler>
    "#;
    let err = parse(&document("1.5", body), &ParserConfig::default()).unwrap_err();
    match err {
        ParseError::DuplicateName { category, name, .. } => {
            assert_eq!(category, "handler");
            assert_eq!(name, "H");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn profiles_have_independent_name_scopes() {
    let body = r#"
        <console-handler name="CONSOLE"/>
        <logging-profiles>
            <logging-profile name="a"><console-handler name="CONSOLE"/></logging-profile>
            <logging-profile name="b"><console-handler name="CONSOLE"/></logging-profile>
        </logging-profiles>
    "#;
    assert_eq!(
        keys(&document("1.2", body)),
        vec![
            "subsystem=logging/console-handler=CONSOLE",
            "subsystem=logging/logging-profile=a",
            "subsystem=logging/logging-profile=a/console-handler=CONSOLE",
            "subsystem=logging/logging-profile=b",
            "subsystem=logging/logging-profile=b/console-handler=CONSOLE",
        ]
    );
}

#[test]
fn duplicate_profile_name_is_rejected() {
    let body = r#"<logging-profiles>
        <logging-profile name="a"/>
        <logging-profile name="a"/>
    </logging-profiles>"#;
    assert_eq!(kind_of("1.5", body), ParseErrorKind::DuplicateName);
}

#[test]
fn repeated_single_child_is_duplicate_element() {
    let body = r#"<console-handler name="C"><level name="INFO"/><level name="DEBUG"/></console-handler>"#;
    assert_eq!(kind_of("1.5", body), ParseErrorKind::DuplicateElement);
}

#[test]
fn logger_without_category() {
    let err = parse(
        &document("1.5", r#"<logger><level name="INFO"/></logger>"#),
        &ParserConfig::default(),
    )
    .unwrap_err();
    match err {
        ParseError::MissingRequiredAttributes { element, attributes, .. } => {
            assert_eq!(element, "logger");
            assert_eq!(attributes, vec!["category".to_string()]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn file_handler_without_file() {
    let body = r#"<file-handler name="F"><level name="INFO"/></file-handler>"#;
    assert_eq!(kind_of("1.5", body), ParseErrorKind::MissingRequiredElements);
}

#[test]
fn async_handler_without_queue_length() {
    let body = r#"<async-handler name="A"/>"#;
    assert_eq!(kind_of("1.5", body), ParseErrorKind::MissingRequiredElements);
}

#[test]
fn invalid_values_are_validation_errors() {
    let queue = r#"<async-handler name="A"><queue-length value="0"/></async-handler>"#;
    assert_eq!(kind_of("1.5", queue), ParseErrorKind::Validation);

    let level = r#"<root-logger><level name="LOUD"/></root-logger>"#;
    assert_eq!(kind_of("1.5", level), ParseErrorKind::Validation);

    let flag = r#"<console-handler name="C" autoflush="maybe"/>"#;
    assert_eq!(kind_of("1.5", flag), ParseErrorKind::Validation);
}

#[test]
fn filter_spec_grammar_errors() {
    let body = r#"<root-logger><filter-spec value="all(accept,"/></root-logger>"#;
    assert_eq!(kind_of("1.5", body), ParseErrorKind::Grammar);
}

#[test]
fn legacy_filters_become_filter_spec() {
    let ops = parse(LEGACY_1_0, &ParserConfig::default()).unwrap();
    let console = ops
        .find(&base().append("console-handler", "CONSOLE"))
        .unwrap();
    assert_eq!(
        console.attribute("filter-spec"),
        Some(&ModelValue::from(r#"any(match("JBAS.*"),levelRange(DEBUG,ERROR])"#))
    );
    assert_eq!(
        console.attribute("formatter"),
        Some(&ModelValue::from("%d %-5p %m%n"))
    );

    let logger = ops.find(&base().append("logger", "com.arjuna")).unwrap();
    assert_eq!(
        logger.attribute("filter-spec"),
        Some(&ModelValue::from(r#"not(substituteAll("secret","***"))"#))
    );
}

#[test]
fn legacy_and_text_filters_accept_the_same_level_names() {
    let filter_spec = |tag: &str, body: &str| {
        let ops = parse(&document(tag, body), &ParserConfig::default()).unwrap();
        ops.find(&base().append("logger", "a"))
            .and_then(|op| op.attribute("filter-spec"))
            .cloned()
    };

    let nested = filter_spec(
        "1.0",
        r#"<logger category="a"><filter><any>
            <level name="AUDIT"/>
            <change-level new-level="custom.Level$1"/>
            <level-range min-level="debug" max-level="AUDIT"/>
        </any></filter></logger>"#,
    );
    let text = filter_spec(
        "1.2",
        r#"<logger category="a">
            <filter-spec value="any(level(AUDIT),levelChange(custom.Level$1),levelRange(debug,AUDIT))"/>
        </logger>"#,
    );
    assert_eq!(
        nested,
        Some(ModelValue::from(
            "any(level(AUDIT),levelChange(custom.Level$1),levelRange(debug,AUDIT))"
        ))
    );
    assert_eq!(nested, text);

    let bad = r#"<logger category="a"><filter><level name="a b"/></filter></logger>"#;
    let err = parse(&document("1.0", bad), &ParserConfig::default()).unwrap_err();
    assert_eq!(err.kind(), ParseErrorKind::Validation);
    assert!(err.to_string().contains("a b"), "{err}");
}

#[test]
fn legacy_filter_needs_one_expression() {
    let empty = r#"<logger category="a"><filter/></logger>"#;
    assert_eq!(kind_of("1.0", empty), ParseErrorKind::MissingRequiredElements);

    let two = r#"<logger category="a"><filter><accept/><deny/></filter></logger>"#;
    assert_eq!(kind_of("1.0", two), ParseErrorKind::UnexpectedElement);
}

#[test]
fn unknown_namespace_is_unsupported() {
    let source = r#"<subsystem xmlns="urn:jboss:domain:logging:9.9"/>"#;
    let err = parse(source, &ParserConfig::default()).unwrap_err();
    assert_eq!(err.kind(), ParseErrorKind::UnsupportedSchema);
    assert!(err.to_string().contains("urn:jboss:domain:logging:9.9"));
}

#[test]
fn errors_carry_positions() {
    let source = "<subsystem xmlns=\"urn:jboss:domain:logging:1.5\">\n    <console-handler name=\"C\" colour=\"red\"/>\n</subsystem>";
    let err = parse(source, &ParserConfig::default()).unwrap_err();
    assert_eq!(err.kind(), ParseErrorKind::UnexpectedAttribute);
    assert_eq!(err.position().line, 2);
}

#[test]
fn malformed_markup_is_an_xml_error() {
    let source = r#"<subsystem xmlns="urn:jboss:domain:logging:1.5"><root-logger></subsystem>"#;
    assert_eq!(
        parse(source, &ParserConfig::default()).unwrap_err().kind(),
        ParseErrorKind::Xml
    );
}

#[derive(Debug)]
struct Audit;

impl ExtensionParser for Audit {
    fn element_names(&self) -> &[&str] {
        &["audit-log"]
    }

    fn parse(&self, element: &RawElement, scope: &PathAddress) -> Result<Vec<Operation>, ExtensionError> {
        let name = element
            .attribute("name")
            .ok_or_else(|| ExtensionError::new("audit-log needs a name"))?;
        Ok(vec![Operation::add(scope.append("audit-log", name))])
    }
}

const WITH_AUDIT: &str = r#"<subsystem xmlns="urn:jboss:domain:logging:1.5">
    <audit-log xmlns="urn:example:audit:1.0" name="main"><sink path="audit.log"/></audit-log>
    <console-handler name="CONSOLE"/>
</subsystem>"#;

#[test]
fn extension_elements_are_passed_through() {
    let config = ParserConfig::new().with_extension(Audit);
    let ops = parse(WITH_AUDIT, &config).unwrap();
    let keys: Vec<String> = ops.iter().map(|op| op.address().to_string()).collect();
    assert_eq!(
        keys,
        vec![
            "subsystem=logging/console-handler=CONSOLE",
            "subsystem=logging/audit-log=main",
        ]
    );
}

#[test]
fn unclaimed_foreign_elements_are_rejected() {
    let err = parse(WITH_AUDIT, &ParserConfig::default()).unwrap_err();
    assert_eq!(err.kind(), ParseErrorKind::UnsupportedSchema);
}

#[test]
fn custom_base_address() {
    let base = PathAddress::single("profile", "full").append("subsystem", "logging");
    let config = ParserConfig::new().with_base_address(base.clone());
    let ops = parse(MINIMAL_1_5, &config).unwrap();
    assert!(ops.iter().all(|op| base.is_prefix_of(op.address())));
}

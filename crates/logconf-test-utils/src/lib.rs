//! Testing utilities for the logconf workspace
//!
//! Document fixtures for each schema generation and helpers for building
//! attribute maps and resource trees.

#![allow(missing_docs)]

use logconf_model::{AttributeMap, ModelValue, PathAddress, ResourceTree, ResourceType};

/// Namespace URI for a version tag such as `1.2`
pub fn namespace(tag: &str) -> String {
    format!("urn:jboss:domain:logging:{tag}")
}

/// Wrap `body` in a subsystem root of the given version
pub fn document(tag: &str, body: &str) -> String {
    format!(r#"<subsystem xmlns="{}">{body}</subsystem>"#, namespace(tag))
}

pub fn base() -> PathAddress {
    PathAddress::logging_subsystem()
}

/// One console handler and a root logger referencing it
pub const MINIMAL_1_5: &str = r#"<subsystem xmlns="urn:jboss:domain:logging:1.5">
    <console-handler name="CONSOLE">
        <level name="INFO"/>
    </console-handler>
    <root-logger>
        <handlers>
            <handler name="CONSOLE"/>
        </handlers>
    </root-logger>
</subsystem>"#;

/// Every element kind the current schema knows, including two profiles
pub const FULL_1_5: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<subsystem xmlns="urn:jboss:domain:logging:1.5">
    <add-logging-api-dependencies value="false"/>
    <console-handler name="CONSOLE" autoflush="true">
        <level name="INFO"/>
        <formatter>
            <named-formatter name="COLOR-PATTERN"/>
        </formatter>
        <target name="System.out"/>
    </console-handler>
    <periodic-rotating-file-handler name="FILE" autoflush="true">
        <formatter>
            <named-formatter name="PATTERN"/>
        </formatter>
        <file relative-to="jboss.server.log.dir" path="server.log"/>
        <suffix value=".yyyy-MM-dd"/>
        <append value="true"/>
    </periodic-rotating-file-handler>
    <size-rotating-file-handler name="SIZE" rotate-on-boot="true">
        <encoding value="UTF-8"/>
        <file path="/var/log/size.log"/>
        <rotate-size value="10m"/>
        <max-backup-index value="5"/>
        <suffix value=".yyyy-MM-dd"/>
    </size-rotating-file-handler>
    <periodic-size-rotating-file-handler name="PERIODIC-SIZE" enabled="false">
        <filter-spec value="levelRange[DEBUG,ERROR)"/>
        <file relative-to="jboss.server.log.dir" path="mixed.log"/>
        <rotate-size value="1g"/>
        <suffix value=".yyyy-MM-dd-HH"/>
    </periodic-size-rotating-file-handler>
    <async-handler name="ASYNC">
        <level name="DEBUG"/>
        <queue-length value="512"/>
        <overflow-action value="block"/>
        <subhandlers>
            <handler name="FILE"/>
            <handler name="SIZE"/>
        </subhandlers>
    </async-handler>
    <custom-handler name="CUSTOM" class="org.example.Handler" module="org.example">
        <formatter>
            <pattern-formatter pattern="%d %-5p %m%n"/>
        </formatter>
        <properties>
            <property name="host" value="localhost"/>
            <property name="flag"/>
        </properties>
    </custom-handler>
    <syslog-handler name="SYSLOG" enabled="true">
        <app-name value="server"/>
        <facility value="user-level"/>
        <hostname value="node-1"/>
        <level name="WARN"/>
        <formatter>
            <syslog-format syslog-type="RFC5424"/>
        </formatter>
        <port value="514"/>
        <server-address value="localhost"/>
    </syslog-handler>
    <logger category="com.arjuna">
        <level name="WARN"/>
    </logger>
    <logger category="org.jboss.as.config" use-parent-handlers="false">
        <level name="DEBUG"/>
        <filter-spec value="not(match(&quot;JBAS.*&quot;))"/>
        <handlers>
            <handler name="ASYNC"/>
        </handlers>
    </logger>
    <root-logger>
        <level name="INFO"/>
        <handlers>
            <handler name="CONSOLE"/>
            <handler name="FILE"/>
        </handlers>
    </root-logger>
    <formatter name="PATTERN">
        <pattern-formatter pattern="%d{yyyy-MM-dd HH:mm:ss,SSS} %-5p [%c] (%t) %s%e%n"/>
    </formatter>
    <formatter name="COLOR-PATTERN">
        <pattern-formatter pattern="%K{level}%d{HH:mm:ss,SSS} %-5p %s%e%n" color-map="info:cyan"/>
    </formatter>
    <formatter name="JSON">
        <custom-formatter class="org.example.JsonFormatter" module="org.example">
            <properties>
                <property name="pretty" value="false"/>
            </properties>
        </custom-formatter>
    </formatter>
    <logging-profiles>
        <logging-profile name="prod">
            <file-handler name="FILE">
                <level name="ERROR"/>
                <file relative-to="jboss.server.log.dir" path="prod.log"/>
                <append value="false"/>
            </file-handler>
            <logger category="org.example">
                <handlers>
                    <handler name="FILE"/>
                </handlers>
            </logger>
        </logging-profile>
        <logging-profile name="dev">
            <console-handler name="CONSOLE"/>
            <root-logger>
                <level name="TRACE"/>
                <handlers>
                    <handler name="CONSOLE"/>
                </handlers>
            </root-logger>
        </logging-profile>
    </logging-profiles>
</subsystem>"#;

/// First-generation document using the nested filter form
pub const LEGACY_1_0: &str = r#"<subsystem xmlns="urn:jboss:domain:logging:1.0">
    <console-handler name="CONSOLE" autoflush="true">
        <level name="INFO"/>
        <filter>
            <any>
                <match pattern="JBAS.*"/>
                <level-range min-level="DEBUG" max-level="ERROR" max-inclusive="true"/>
            </any>
        </filter>
        <formatter>
            <pattern-formatter pattern="%d %-5p %m%n"/>
        </formatter>
    </console-handler>
    <logger category="com.arjuna">
        <level name="WARN"/>
        <filter>
            <not>
                <replace pattern="secret" replacement="***" replace-all="true"/>
            </not>
        </filter>
    </logger>
    <root-logger>
        <level name="INFO"/>
        <handlers>
            <handler name="CONSOLE"/>
        </handlers>
    </root-logger>
</subsystem>"#;

/// Attribute map from `(name, value)` pairs
pub fn attrs<const N: usize>(pairs: [(&str, ModelValue); N]) -> AttributeMap {
    pairs
        .into_iter()
        .map(|(name, value)| (name.to_string(), value))
        .collect()
}

/// List value from string slices
pub fn list(names: &[&str]) -> ModelValue {
    ModelValue::List(names.iter().map(|n| (*n).to_string()).collect())
}

/// Tree matching [`MINIMAL_1_5`]
pub fn minimal_tree() -> ResourceTree {
    let mut tree = ResourceTree::new();
    tree.insert(
        ResourceType::ConsoleHandler,
        "CONSOLE",
        attrs([("level", ModelValue::from("INFO"))]),
    )
    .unwrap();
    tree.set_root_logger(attrs([("handlers", list(&["CONSOLE"]))]));
    tree
}

/// Tree with a profile reusing top-level names
pub fn tree_with_profile(profile: &str) -> ResourceTree {
    let mut tree = minimal_tree();
    *tree.profile_mut(profile) = minimal_tree();
    tree
}

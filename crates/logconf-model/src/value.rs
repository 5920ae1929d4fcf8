//! Typed attribute values
//!
//! [`ModelValue`] is the decoded form of an XML attribute or leaf element.
//! Codecs produce it on the way in and consume it on the way out.

use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};

use indexmap::IndexMap;
use serde::Serialize;

/// Attribute name → value, sorted for stable comparison and output
pub type AttributeMap = BTreeMap<String, ModelValue>;

/// Ordered property map; a property may be declared without a value
pub type PropertyMap = IndexMap<String, Option<String>>;

/// Decoded attribute value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ModelValue {
    /// Free-form or enumerated text
    String(String),
    /// `true` / `false`
    Boolean(bool),
    /// Range-checked integer
    Int(i64),
    /// Ordered list of names (handler references)
    List(Vec<String>),
    /// Ordered `name → value` properties
    Properties(PropertyMap),
    /// Composite value such as a file `{path, relative-to}`
    Object(BTreeMap<String, ModelValue>),
}

impl ModelValue {
    /// String view, if this is a string value
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Boolean view
    #[inline]
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Integer view
    #[inline]
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// List view
    #[inline]
    #[must_use]
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Property map view
    #[inline]
    #[must_use]
    pub fn as_properties(&self) -> Option<&PropertyMap> {
        match self {
            Self::Properties(props) => Some(props),
            _ => None,
        }
    }

    /// Object view
    #[inline]
    #[must_use]
    pub fn as_object(&self) -> Option<&BTreeMap<String, ModelValue>> {
        match self {
            Self::Object(fields) => Some(fields),
            _ => None,
        }
    }

    /// Short name of the value kind, used in error messages
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::Boolean(_) => "boolean",
            Self::Int(_) => "int",
            Self::List(_) => "list",
            Self::Properties(_) => "properties",
            Self::Object(_) => "object",
        }
    }
}

impl Display for ModelValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => f.write_str(s),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::List(items) => write!(f, "[{}]", items.join(", ")),
            Self::Properties(props) => {
                f.write_str("{")?;
                for (i, (name, value)) in props.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    match value {
                        Some(v) => write!(f, "{name}={v}")?,
                        None => f.write_str(name)?,
                    }
                }
                f.write_str("}")
            }
            Self::Object(fields) => {
                f.write_str("{")?;
                for (i, (name, value)) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{name}={value}")?;
                }
                f.write_str("}")
            }
        }
    }
}

impl From<&str> for ModelValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for ModelValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for ModelValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<i64> for ModelValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<Vec<String>> for ModelValue {
    fn from(value: Vec<String>) -> Self {
        Self::List(value)
    }
}

impl From<PropertyMap> for ModelValue {
    fn from(value: PropertyMap) -> Self {
        Self::Properties(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors_match_variant() {
        assert_eq!(ModelValue::from("x").as_str(), Some("x"));
        assert_eq!(ModelValue::from(true).as_bool(), Some(true));
        assert_eq!(ModelValue::from(7_i64).as_int(), Some(7));
        assert_eq!(ModelValue::from("x").as_bool(), None);
    }

    #[test]
    fn display_properties_keeps_order() {
        let mut props = PropertyMap::new();
        props.insert("zeta".into(), Some("1".into()));
        props.insert("alpha".into(), None);
        assert_eq!(ModelValue::from(props).to_string(), "{zeta=1, alpha}");
    }

    #[test]
    fn serializes_untagged() {
        let list = ModelValue::List(vec!["A".into(), "B".into()]);
        assert_eq!(serde_json::to_string(&list).unwrap(), r#"["A","B"]"#);
        assert_eq!(serde_json::to_string(&ModelValue::Int(3)).unwrap(), "3");
    }
}

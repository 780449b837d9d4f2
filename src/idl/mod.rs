//! Varlink IDL Parser and Type Model
//!
//! An interface description looks like this:
//!
//! ```text
//! # Example service
//! interface org.example.ping
//!
//! type Pong (
//!   message: string,
//!   count: int
//! )
//!
//! method Ping(message: string) -> (pong: Pong)
//!
//! error PingFailed (reason: string)
//! ```
//!
//! [`parse_interface`] turns such text into an [`Interface`]; the `Display`
//! impl renders it back into canonical form.

mod default;
mod parser;
mod render;
mod types;
mod validation;

pub use default::DefaultValue;
pub use parser::parse_interface;
pub use types::*;
pub use validation::ValidationError;

use std::collections::HashMap;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// The description text is not a valid interface.
///
/// Parsing is all-or-nothing and carries no position information.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("invalid interface description")]
pub struct ParseError;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid interface name: {0:?}")]
pub struct InvalidName(pub String);

/// Check the reverse-domain interface name grammar: `[a-z.-]`, 3 to 255
/// characters, at least two dot-separated segments, no empty segment and no
/// segment starting or ending with `-`.
pub fn is_valid_interface_name(name: &str) -> bool {
    if name.len() < 3 || name.len() > 255 {
        return false;
    }

    if !name
        .bytes()
        .all(|b| b.is_ascii_lowercase() || b == b'-' || b == b'.')
    {
        return false;
    }

    let mut segments = 0;
    for segment in name.split('.') {
        if segment.is_empty() || segment.starts_with('-') || segment.ends_with('-') {
            return false;
        }
        segments += 1;
    }

    segments >= 2
}

/// A parsed varlink interface.
///
/// `members` keeps declaration order; the three name indexes point into it
/// and are never updated independently. A later declaration with the same
/// name shadows an earlier one in the index but both stay in `members`.
#[derive(Debug, Clone)]
pub struct Interface {
    name: String,
    description: String,
    members: Vec<Member>,
    aliases: HashMap<String, usize>,
    methods: HashMap<String, usize>,
    errors: HashMap<String, usize>,
}

impl Interface {
    pub fn new(name: impl Into<String>) -> Result<Self, InvalidName> {
        let name = name.into();
        if !is_valid_interface_name(&name) {
            return Err(InvalidName(name));
        }

        Ok(Self {
            name,
            description: String::new(),
            members: Vec::new(),
            aliases: HashMap::new(),
            methods: HashMap::new(),
            errors: HashMap::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    /// All declarations in declaration order.
    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn add_member(&mut self, member: impl Into<Member>) {
        let member = member.into();
        let index = self.members.len();
        let name = member.name().to_string();
        match member {
            Member::Alias(_) => self.aliases.insert(name, index),
            Member::Method(_) => self.methods.insert(name, index),
            Member::Error(_) => self.errors.insert(name, index),
        };
        self.members.push(member);
    }

    pub fn alias(&self, name: &str) -> Option<&TypeAlias> {
        match self.aliases.get(name).map(|&i| &self.members[i]) {
            Some(Member::Alias(alias)) => Some(alias),
            _ => None,
        }
    }

    pub fn method(&self, name: &str) -> Option<&Method> {
        match self.methods.get(name).map(|&i| &self.members[i]) {
            Some(Member::Method(method)) => Some(method),
            _ => None,
        }
    }

    pub fn error(&self, name: &str) -> Option<&ErrorDecl> {
        match self.errors.get(name).map(|&i| &self.members[i]) {
            Some(Member::Error(error)) => Some(error),
            _ => None,
        }
    }

    pub fn aliases(&self) -> impl Iterator<Item = &TypeAlias> {
        self.members.iter().filter_map(|member| match member {
            Member::Alias(alias) => Some(alias),
            _ => None,
        })
    }

    pub fn methods(&self) -> impl Iterator<Item = &Method> {
        self.members.iter().filter_map(|member| match member {
            Member::Method(method) => Some(method),
            _ => None,
        })
    }

    pub fn errors(&self) -> impl Iterator<Item = &ErrorDecl> {
        self.members.iter().filter_map(|member| match member {
            Member::Error(error) => Some(error),
            _ => None,
        })
    }

    /// Fully-qualified name of a member, e.g. `org.example.ping.Ping`.
    pub fn qualify(&self, member: &str) -> String {
        format!("{}.{}", self.name, member)
    }
}

/// Indexes are caches of `members`, so equality ignores them.
impl PartialEq for Interface {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.description == other.description
            && self.members == other.members
    }
}

impl Eq for Interface {}

impl FromStr for Interface {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_interface(s)
    }
}

/// Serialized as its canonical description text.
impl Serialize for Interface {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Interface {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        parse_interface(&text).map_err(|_| serde::de::Error::custom("invalid interface"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interface_names() {
        assert!(is_valid_interface_name("org.example.test"));
        assert!(is_valid_interface_name("org.varlink.service"));
        assert!(is_valid_interface_name("a.b"));
        assert!(is_valid_interface_name("com.example-corp.x"));

        assert!(!is_valid_interface_name(""));
        assert!(!is_valid_interface_name("a"));
        assert!(!is_valid_interface_name("abc"));
        assert!(!is_valid_interface_name("a.b-"));
        assert!(!is_valid_interface_name("a.-b"));
        assert!(!is_valid_interface_name("a..b"));
        assert!(!is_valid_interface_name(".ab"));
        assert!(!is_valid_interface_name("org.Example"));
        assert!(!is_valid_interface_name(&format!("a.{}", "b".repeat(254))));
    }

    #[test]
    fn new_rejects_bad_names() {
        assert_eq!(Interface::new("a").unwrap_err(), InvalidName("a".into()));
        assert!(Interface::new("org.example.test").is_ok());
    }

    #[test]
    fn indexes_follow_members() {
        let mut interface = Interface::new("org.example.test").expect("name");
        interface.add_member(TypeAlias {
            name: "Point".into(),
            description: String::new(),
            ty: Type::Struct(vec![Field::new("x", Type::Int), Field::new("y", Type::Int)]),
        });
        interface.add_member(Method {
            name: "Move".into(),
            description: "Move a point".into(),
            input: Type::Struct(vec![Field::new("to", Type::alias("Point"))]),
            output: Type::Struct(Vec::new()),
        });
        interface.add_member(ErrorDecl {
            name: "OutOfBounds".into(),
            description: String::new(),
            payload: None,
        });

        assert_eq!(interface.members().len(), 3);
        assert!(interface.alias("Point").is_some());
        assert!(interface.method("Move").is_some());
        assert!(interface.error("OutOfBounds").is_some());

        // Names live in separate indexes.
        assert!(interface.method("Point").is_none());
        assert!(interface.alias("Move").is_none());

        assert_eq!(interface.qualify("Move"), "org.example.test.Move");
    }

    #[test]
    fn later_declaration_shadows_in_index() {
        let mut interface = Interface::new("org.example.test").expect("name");
        interface.add_member(ErrorDecl {
            name: "Failed".into(),
            description: "first".into(),
            payload: None,
        });
        interface.add_member(ErrorDecl {
            name: "Failed".into(),
            description: "second".into(),
            payload: None,
        });

        assert_eq!(interface.members().len(), 2);
        assert_eq!(interface.error("Failed").map(|e| e.description.as_str()), Some("second"));
    }

    #[test]
    fn serde_uses_description_text() {
        let text = "interface org.example.test\n\nmethod Ping() -> ()";
        let interface: Interface =
            serde_json::from_value(serde_json::Value::String(text.into())).expect("deserialize");
        assert!(interface.method("Ping").is_some());

        let json = serde_json::to_value(&interface).expect("serialize");
        assert_eq!(json, serde_json::Value::String(text.into()));

        let err = serde_json::from_str::<Interface>("\"interface nope\"").expect_err("invalid");
        assert!(err.to_string().contains("invalid interface"));
    }
}

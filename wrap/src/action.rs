//! Request verbs
//!
//! [`Action`] is the closed set of verbs a handler chain is keyed on. There
//! are two ways to build one and they deliberately disagree on failure:
//!
//! - [`Action::new`] is strict. It is meant for values produced inside the
//!   program, where an out-of-range number is a logic error.
//! - `Action::from(&str)` is lenient. Transports feed it whatever verb the
//!   caller sent; anything unknown becomes [`Action::Invalid`], which a
//!   handler chain routes to its `otherwise` branch instead of aborting.

use std::fmt;

use crate::error::{Error, Result};

/// Request action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum Action {
    /// Unset or unrecognised verb
    #[default]
    Invalid = 0,
    /// Create a resource (POST)
    Create = 1,
    /// Read a resource or a collection (GET)
    Read = 2,
    /// Replace or modify a resource (PUT)
    Update = 3,
    /// Remove a resource (DELETE)
    Delete = 4,
    /// Capability check, e.g. a CORS preflight (OPTIONS)
    Options = 5,
}

impl Action {
    /// Build an action from its numeric value.
    ///
    /// Only `0 < value < 5` is accepted; `Options` cannot be built this way.
    pub fn new(value: i64) -> Result<Self> {
        match value {
            1 => Ok(Self::Create),
            2 => Ok(Self::Read),
            3 => Ok(Self::Update),
            4 => Ok(Self::Delete),
            _ => Err(Error::InvalidAction(value)),
        }
    }

    /// Map a verb to an action, case-insensitively. Never fails.
    pub fn from_verb(verb: &str) -> Self {
        match verb.to_ascii_uppercase().as_str() {
            "POST" | "CREATE" => Self::Create,
            "GET" | "READ" => Self::Read,
            "PUT" | "UPDATE" => Self::Update,
            "DELETE" => Self::Delete,
            "OPTIONS" => Self::Options,
            _ => Self::Invalid,
        }
    }

    /// Numeric value of the action
    #[must_use]
    pub const fn value(self) -> u8 {
        self as u8
    }

    /// True for the CRUD actions accepted by [`Action::new`]
    #[must_use]
    pub const fn is_valid(self) -> bool {
        let value = self.value();
        value > 0 && value < 5
    }

    /// Upper-case name; empty for [`Action::Invalid`]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Invalid => "",
            Self::Create => "CREATE",
            Self::Read => "READ",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
            Self::Options => "OPTIONS",
        }
    }
}

impl TryFrom<i64> for Action {
    type Error = Error;

    fn try_from(value: i64) -> Result<Self> {
        Self::new(value)
    }
}

impl From<&str> for Action {
    fn from(verb: &str) -> Self {
        Self::from_verb(verb)
    }
}

impl From<&http::Method> for Action {
    fn from(method: &http::Method) -> Self {
        Self::from_verb(method.as_str())
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_accepts_crud_range() {
        let action = Action::new(3).unwrap();
        assert_eq!(action, Action::Update);
        assert!(action.is_valid());
        assert_eq!(Action::new(1).unwrap(), Action::Create);
        assert_eq!(Action::new(4).unwrap(), Action::Delete);
    }

    #[test]
    fn test_new_rejects_out_of_range() {
        assert!(matches!(Action::new(0), Err(Error::InvalidAction(0))));
        assert!(matches!(Action::new(5), Err(Error::InvalidAction(5))));
        assert!(Action::new(-1).is_err());
        assert!(Action::try_from(42).is_err());
    }

    #[test]
    fn test_from_verb_is_case_insensitive() {
        assert_eq!(Action::from("get"), Action::Read);
        assert_eq!(Action::from("GET"), Action::Read);
        assert_eq!(Action::from("Post"), Action::Create);
        assert_eq!(Action::from("put"), Action::Update);
        assert_eq!(Action::from("delete"), Action::Delete);
        assert_eq!(Action::from("options"), Action::Options);
    }

    #[test]
    fn test_from_verb_accepts_action_names() {
        assert_eq!(Action::from("create"), Action::Create);
        assert_eq!(Action::from("READ"), Action::Read);
        assert_eq!(Action::from("update"), Action::Update);
    }

    #[test]
    fn test_from_verb_unknown_is_invalid() {
        let action = Action::from("frobnicate");
        assert_eq!(action, Action::Invalid);
        assert!(!action.is_valid());
        assert_eq!(action.value(), 0);
        assert_eq!(Action::from(""), Action::Invalid);
    }

    #[test]
    fn test_options_is_not_crud() {
        assert_eq!(Action::Options.value(), 5);
        assert!(!Action::Options.is_valid());
    }

    #[test]
    fn test_from_method() {
        assert_eq!(Action::from(&http::Method::POST), Action::Create);
        assert_eq!(Action::from(&http::Method::PATCH), Action::Invalid);
    }

    #[test]
    fn test_display() {
        assert_eq!(Action::Create.to_string(), "CREATE");
        assert_eq!(Action::Read.to_string(), "READ");
        assert_eq!(Action::Invalid.to_string(), "");
        assert_eq!(Action::default(), Action::Invalid);
    }
}

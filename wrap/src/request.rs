//! Transport-neutral view of an incoming request

use std::collections::HashMap;

use axum::body::Bytes;
use serde::de::DeserializeOwned;

use crate::{action::Action, error::Result, path::Path};

/// What a handler needs to know about the request
///
/// Flags are multi-valued: query string pairs over HTTP, `--flag key=value`
/// pairs on the command line.
#[derive(Debug, Clone)]
pub struct Request {
    action: Action,
    path: Path,
    body: Bytes,
    flags: HashMap<String, Vec<String>>,
}

impl Request {
    pub fn new(action: Action, path: Path) -> Self {
        Self {
            action,
            path,
            body: Bytes::new(),
            flags: HashMap::new(),
        }
    }

    /// Attach a raw body
    #[must_use]
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Add one flag value
    #[must_use]
    pub fn with_flag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.flags.entry(key.into()).or_default().push(value.into());
        self
    }

    /// Add many flag values, keeping their order per key
    #[must_use]
    pub fn with_flags<I, K, V>(self, flags: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        flags
            .into_iter()
            .fold(self, |request, (key, value)| request.with_flag(key, value))
    }

    pub fn action(&self) -> Action {
        self.action
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn path_mut(&mut self) -> &mut Path {
        &mut self.path
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn flags(&self) -> &HashMap<String, Vec<String>> {
        &self.flags
    }

    /// First value of a flag
    pub fn flag(&self, key: &str) -> Option<&str> {
        self.flags
            .get(key)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Decode the body as JSON
    pub fn bind<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }
}

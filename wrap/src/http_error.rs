//! Errors a handler returns instead of writing a response
//!
//! Every kind pairs a public part, which is serialized to the caller, with an
//! internal diagnostic that is logged once when the error is built and is
//! never serialized. The status code of each kind is fixed:
//!
//! | Kind                  | Status | Body                          |
//! |-----------------------|--------|-------------------------------|
//! | `BadRequest`          | 400    | `{"message": ...}`            |
//! | `Unauthorized`        | 401    | `{"message": ...}`            |
//! | `NotFound`            | 404    | `{"message": ...}`            |
//! | `MethodNotAllowed`    | 405    | `{"message": ...}`            |
//! | `UnprocessableEntity` | 422    | `{"errors": [{path, message}]}` |
//! | `InternalServerError` | 500    | `{"message": ...}`            |
//!
//! Adding a kind means adding a variant here and an arm in
//! [`HttpError::status`]; [`crate::dispatch`] needs no change.

use std::borrow::Cow;
use std::fmt;

use http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A validation failure attached to one input field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Location of the field, outermost first. Empty for input-wide failures.
    pub path: Vec<String>,
    /// What is wrong with the field
    pub message: String,
}

impl FieldError {
    /// Failure on the field at `path`
    pub fn new<I, S>(path: I, message: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            path: path.into_iter().map(Into::into).collect(),
            message: message.into(),
        }
    }

    /// Failure that is not tied to a single field
    pub fn general(message: impl Into<String>) -> Self {
        Self {
            path: Vec::new(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "Field: GENERAL, Message: {}", self.message)
        } else {
            write!(f, "Field: {}, Message: {}", self.path.join("."), self.message)
        }
    }
}

/// Ordered list of [`FieldError`]s
///
/// Renders as one `Field: ..., Message: ...` line per entry, each ending in
/// a newline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    /// Empty list
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a failure
    pub fn push(&mut self, error: FieldError) {
        self.0.push(error);
    }

    /// Append a failure for the field at `path`
    pub fn add<I, S>(&mut self, path: I, message: impl Into<String>)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.push(FieldError::new(path, message));
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FieldError> {
        self.0.iter()
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for error in &self.0 {
            writeln!(f, "{error}")?;
        }
        Ok(())
    }
}

impl From<Vec<FieldError>> for FieldErrors {
    fn from(errors: Vec<FieldError>) -> Self {
        Self(errors)
    }
}

impl FromIterator<FieldError> for FieldErrors {
    fn from_iter<T: IntoIterator<Item = FieldError>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for FieldErrors {
    type Item = FieldError;
    type IntoIter = std::vec::IntoIter<FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a FieldErrors {
    type Item = &'a FieldError;
    type IntoIter = std::slice::Iter<'a, FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Public message plus internal diagnostic
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct Reason {
    message: String,
    #[serde(skip)]
    internal: String,
}

impl Reason {
    pub fn new(message: impl Into<String>, internal: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            internal: internal.into(),
        }
    }

    /// Message that is safe to show the caller
    pub fn message(&self) -> &str {
        &self.message
    }
}

// Debug output shows the public part only
impl fmt::Debug for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reason")
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Field failures plus internal diagnostic
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct Validation {
    errors: FieldErrors,
    #[serde(skip)]
    internal: String,
}

impl Validation {
    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }
}

impl fmt::Debug for Validation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validation")
            .field("errors", &self.errors)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Validation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.errors.fmt(f)
    }
}

/// The closed set of errors a handler can hand to the dispatcher
///
/// Serializes to the public body only; see the module table.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(untagged)]
pub enum HttpError {
    /// 400
    #[error("{0}")]
    BadRequest(Reason),

    /// 401
    #[error("{0}")]
    Unauthorized(Reason),

    /// 405
    #[error("{0}")]
    MethodNotAllowed(Reason),

    /// 404
    #[error("{0}")]
    NotFound(Reason),

    /// 500
    #[error("{0}")]
    InternalServerError(Reason),

    /// 422
    #[error("{0}")]
    UnprocessableEntity(Validation),
}

impl HttpError {
    /// Caller-supplied message, e.g. a decoding complaint
    pub fn bad_request(message: impl Into<String>, internal: impl Into<String>) -> Self {
        Self::BadRequest(Reason::new(message, internal))
    }

    pub fn unauthorized(internal: impl Into<String>) -> Self {
        Self::Unauthorized(Reason::new("unauthorized", internal))
    }

    pub fn method_not_allowed(internal: impl Into<String>) -> Self {
        Self::MethodNotAllowed(Reason::new("method not allowed", internal))
    }

    pub fn not_found(internal: impl Into<String>) -> Self {
        Self::NotFound(Reason::new("not found", internal))
    }

    pub fn internal_server_error(internal: impl Into<String>) -> Self {
        Self::InternalServerError(Reason::new("internal server error", internal))
    }

    pub fn unprocessable_entity(errors: FieldErrors) -> Self {
        let internal = format!("UnprocessableEntity errors: {errors} ");
        Self::UnprocessableEntity(Validation { errors, internal })
    }

    /// Wrap an error from outside the taxonomy.
    ///
    /// Its text becomes the public message as-is.
    pub fn unrecognized(err: &dyn fmt::Display) -> Self {
        let message = err.to_string();
        Self::InternalServerError(Reason::new(message.clone(), message))
    }

    /// Fixed status code of the kind
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::UnprocessableEntity(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    /// Public message; the rendered field list for `UnprocessableEntity`
    pub fn message(&self) -> Cow<'_, str> {
        match self {
            Self::BadRequest(reason)
            | Self::Unauthorized(reason)
            | Self::MethodNotAllowed(reason)
            | Self::NotFound(reason)
            | Self::InternalServerError(reason) => Cow::Borrowed(reason.message()),
            Self::UnprocessableEntity(validation) => Cow::Owned(validation.errors.to_string()),
        }
    }

    /// Diagnostic for the logging sink. Not part of the public surface.
    pub(crate) fn internal(&self) -> &str {
        match self {
            Self::BadRequest(reason)
            | Self::Unauthorized(reason)
            | Self::MethodNotAllowed(reason)
            | Self::NotFound(reason)
            | Self::InternalServerError(reason) => &reason.internal,
            Self::UnprocessableEntity(validation) => &validation.internal,
        }
    }
}

//! Per-response output accumulators
//!
//! A [`Responder`] collects status, headers and body for one response and
//! commits them once. Two transports implement it:
//!
//! - [`HttpResponder`] becomes an axum response and is written to the
//!   connection by hyper.
//! - [`LocalResponder`] keeps everything in memory for command-line and test
//!   invocations, logs each write and can echo the body to stdout.
//!
//! Handlers are generic over the responder, so the transport is picked when
//! the [`crate::Ctx`] is built.
//!
//! Callers own single-write discipline: check [`Responder::committed`] before
//! writing if another write may already have happened.

mod http;
mod local;

pub use self::http::HttpResponder;
pub use self::local::LocalResponder;

use ::http::StatusCode;
use serde::Serialize;

use crate::error::Result;

/// CORS header names set by [`Responder::enable_cors`]
pub const ALLOW_ORIGIN: &str = "Access-Control-Allow-Origin";
pub const ALLOW_METHODS: &str = "Access-Control-Allow-Methods";
pub const ALLOW_HEADERS: &str = "Access-Control-Allow-Headers";

/// Response contract shared by every transport
pub trait Responder {
    /// Set the status code. Later calls overwrite earlier ones.
    fn set_status(&mut self, status: StatusCode);

    /// Set a header. Later values for the same key win.
    fn set_header(&mut self, key: &str, value: &str);

    /// Status set so far; `None` until set or written
    fn status(&self) -> Option<StatusCode>;

    /// Whether the response has been committed
    fn committed(&self) -> bool;

    /// Serialize `body` and commit the response.
    ///
    /// An unset status becomes 200. On a serialization error nothing is
    /// committed.
    fn write<T: Serialize + ?Sized>(&mut self, body: &T) -> Result<()>;

    /// Commit with status 204 and no body
    fn success_with_no_content(&mut self);

    /// Allow cross-origin callers
    fn enable_cors(&mut self, origin: &str, methods: &str, headers: &str) {
        self.set_header(ALLOW_ORIGIN, origin);
        self.set_header(ALLOW_METHODS, methods);
        self.set_header(ALLOW_HEADERS, headers);
    }
}

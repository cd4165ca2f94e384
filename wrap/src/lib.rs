//! # wrap
//!
//! Request-dispatch layer shared by an HTTP server and a command-line
//! invoker. Application handlers are written once against [`Ctx`] and the
//! [`Responder`] trait; the transport decides where the response goes.
//!
//! ## Features
//!
//! - **Path cursor**: nested handlers walk the request path one segment at a time
//! - **Actions**: CREATE, READ, UPDATE, DELETE and OPTIONS mapped from HTTP verbs or CLI words
//! - **Error taxonomy**: six response kinds with a caller-facing message and a logged diagnostic
//! - **Transports**: axum server with request tracking, or a local responder printing JSON
//! - **Graceful shutdown**: Proper signal handling (SIGTERM, SIGINT)
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use wrap::prelude::*;
//!
//! struct Hello;
//!
//! impl Handler for Hello {
//!     fn handle<R: Responder>(&self, ctx: &mut Ctx<R>) -> HandlerResult {
//!         match ctx.path().next() {
//!             "hello" => ActionRoutes::new()
//!                 .read(|ctx| ctx.json("world"))
//!                 .run(ctx),
//!             _ => Err(ctx.not_found().into()),
//!         }
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = Config::load()?;
//!     init_tracing(&config)?;
//!
//!     Server::new(config).serve(Arc::new(Hello)).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod action;
pub mod config;
pub mod context;
pub mod diagnostics;
pub mod dispatch;
pub mod error;
pub mod handler;
pub mod http_error;
pub mod middleware;
pub mod observability;
pub mod path;
pub mod request;
pub mod responder;
pub mod routes;
pub mod server;

pub use action::Action;
pub use config::Config;
pub use context::Ctx;
pub use dispatch::dispatch;
pub use error::{Error, Result};
pub use handler::{Handler, HandlerResult};
pub use http_error::{FieldError, FieldErrors, HttpError};
pub use path::Path;
pub use request::Request;
pub use responder::{HttpResponder, LocalResponder, Responder};
pub use routes::ActionRoutes;
pub use server::Server;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::action::Action;
    pub use crate::config::{Config, CorsConfig, LogFormat, RequestConfig, ServiceConfig};
    pub use crate::context::{Ctx, ANONYMOUS};
    pub use crate::diagnostics::{DiagnosticSink, MemorySink, TracingSink};
    pub use crate::dispatch::dispatch;
    pub use crate::error::{Error, Result};
    pub use crate::handler::{Handler, HandlerResult};
    pub use crate::http_error::{FieldError, FieldErrors, HttpError};
    pub use crate::observability::init_tracing;
    pub use crate::path::Path;
    pub use crate::request::Request;
    pub use crate::responder::{HttpResponder, LocalResponder, Responder};
    pub use crate::routes::ActionRoutes;
    pub use crate::server::Server;

    pub use http::StatusCode;
}

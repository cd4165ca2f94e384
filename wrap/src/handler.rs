//! Handler trait

use crate::{context::Ctx, responder::Responder};

/// Outcome of a handler. Any error type can be returned; the dispatcher
/// sorts them out.
pub type HandlerResult = anyhow::Result<()>;

/// Application logic reachable from every transport
///
/// `handle` is generic over the responder, so the same handler runs behind
/// the HTTP server and the command-line harness. A handler either writes a
/// success body through the context or returns an error; it never writes an
/// error body itself.
///
/// Routers call [`crate::Path::next`] to choose a child, and children call
/// [`crate::Path::increment`] before reading their own level:
///
/// ```rust
/// use wrap::prelude::*;
///
/// struct Api;
///
/// impl Handler for Api {
///     fn handle<R: Responder>(&self, ctx: &mut Ctx<R>) -> HandlerResult {
///         match ctx.path().next() {
///             "ping" => {
///                 ctx.path_mut().increment();
///                 ctx.json("pong")
///             }
///             _ => Err(ctx.not_found().into()),
///         }
///     }
/// }
///
/// let request = Request::new(Action::Read, Path::parse("/ping").unwrap());
/// let response = Ctx::new(request, LocalResponder::new()).serve(&Api);
/// assert_eq!(response.output(), Some(&serde_json::json!("pong")));
/// ```
pub trait Handler: Send + Sync + 'static {
    fn handle<R: Responder>(&self, ctx: &mut Ctx<R>) -> HandlerResult;
}

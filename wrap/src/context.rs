//! Per-request context handed to handlers
//!
//! A [`Ctx`] owns everything one request needs: the [`Request`], the
//! responder for the chosen transport, the caller's identity and the sink
//! for error diagnostics.
//!
//! The error helpers build one [`HttpError`], log its internal diagnostic
//! through the sink and return it. They never touch the responder; a handler
//! returns the error and [`Ctx::error`] (or [`Ctx::serve`]) dispatches it.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::{
    action::Action,
    diagnostics::{DiagnosticSink, TracingSink},
    dispatch::dispatch,
    handler::{Handler, HandlerResult},
    http_error::{FieldErrors, HttpError},
    path::Path,
    request::Request,
    responder::Responder,
};

/// Identity shown in diagnostics when the request carries none
pub const ANONYMOUS: &str = "anonymous";

/// Request context, generic over the transport's responder
pub struct Ctx<R> {
    request: Request,
    response: R,
    user: Option<String>,
    sink: Arc<dyn DiagnosticSink>,
}

impl<R: Responder> Ctx<R> {
    /// Context logging diagnostics through `tracing`
    pub fn new(request: Request, response: R) -> Self {
        Self {
            request,
            response,
            user: None,
            sink: Arc::new(TracingSink),
        }
    }

    /// Replace the diagnostic sink
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Attach the caller's identity
    #[must_use]
    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    pub fn request(&self) -> &Request {
        &self.request
    }

    pub fn action(&self) -> Action {
        self.request.action()
    }

    pub fn path(&self) -> &Path {
        self.request.path()
    }

    /// Cursor for handlers that consume a routing level
    pub fn path_mut(&mut self) -> &mut Path {
        self.request.path_mut()
    }

    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    pub fn response(&self) -> &R {
        &self.response
    }

    pub fn response_mut(&mut self) -> &mut R {
        &mut self.response
    }

    pub fn into_response(self) -> R {
        self.response
    }

    /// Write a success body
    pub fn json<T: Serialize + ?Sized>(&mut self, body: &T) -> HandlerResult {
        self.response.write(body)?;
        Ok(())
    }

    /// Commit a 204 with no body
    pub fn no_content(&mut self) -> HandlerResult {
        self.response.success_with_no_content();
        Ok(())
    }

    /// Dispatch an error returned by a handler
    pub fn error(&mut self, err: anyhow::Error) {
        dispatch(&mut self.response, err);
    }

    /// Run `handler` and dispatch whatever error it returns.
    ///
    /// If the handler already committed the response before failing, the
    /// error is logged and dropped instead of writing a second body.
    pub fn serve<H: Handler>(mut self, handler: &H) -> R {
        if let Err(err) = handler.handle(&mut self) {
            if self.response.committed() {
                tracing::warn!(
                    path = %self.path(),
                    error = %err,
                    "Handler failed after committing the response"
                );
            } else {
                self.error(err);
            }
        }
        self.response
    }

    /// 404 for the current path
    pub fn not_found(&self) -> HttpError {
        self.report(HttpError::not_found(format!(
            "url: {} not found",
            self.path()
        )))
    }

    /// 401 for the current user and path
    pub fn unauthorized(&self) -> HttpError {
        self.report(HttpError::unauthorized(format!(
            "user: {} is unauthorized to request: {}",
            self.user_label(),
            self.path()
        )))
    }

    /// 500 wrapping `cause`; only the diagnostic carries its text
    pub fn internal_server_error(&self, cause: impl fmt::Display) -> HttpError {
        self.report(HttpError::internal_server_error(cause.to_string()))
    }

    /// 400 with a caller-facing `message`
    pub fn bad_request(&self, message: impl Into<String>) -> HttpError {
        let message = message.into();
        let internal = format!(
            "bad request: {} {} (user: {}), message: {}",
            self.action(),
            self.path(),
            self.user_label(),
            message
        );
        self.report(HttpError::bad_request(message, internal))
    }

    /// 405 for the current user and path
    pub fn method_not_allowed(&self) -> HttpError {
        self.report(HttpError::method_not_allowed(format!(
            "user: {} is not allowed to request: {}",
            self.user_label(),
            self.path()
        )))
    }

    /// 422 listing every field failure
    pub fn unprocessable_entity(&self, errors: FieldErrors) -> HttpError {
        self.report(HttpError::unprocessable_entity(errors))
    }

    fn report(&self, err: HttpError) -> HttpError {
        self.sink.error(err.internal());
        err
    }

    fn user_label(&self) -> &str {
        self.user.as_deref().unwrap_or(ANONYMOUS)
    }
}

impl<R: fmt::Debug> fmt::Debug for Ctx<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ctx")
            .field("request", &self.request)
            .field("response", &self.response)
            .field("user", &self.user)
            .finish_non_exhaustive()
    }
}

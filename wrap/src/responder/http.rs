use axum::{
    body::{Body, Bytes},
    response::{IntoResponse, Response},
};
use http::{
    header::{self, HeaderName},
    HeaderMap, HeaderValue, StatusCode,
};
use serde::Serialize;

use super::Responder;
use crate::error::Result;

/// Responder backed by an HTTP connection
///
/// Status, headers and body are held until the server turns the responder
/// into an axum [`Response`], which hyper then writes to the connection in
/// one go. An uncommitted responder becomes an empty response with its
/// status (or 200).
#[derive(Debug, Default)]
pub struct HttpResponder {
    headers: HeaderMap,
    status: Option<StatusCode>,
    committed: bool,
    body: Option<Bytes>,
}

impl HttpResponder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Encoded body, if one was written
    pub fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }
}

impl Responder for HttpResponder {
    fn set_status(&mut self, status: StatusCode) {
        self.status = Some(status);
    }

    fn set_header(&mut self, key: &str, value: &str) {
        match (
            HeaderName::from_bytes(key.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                self.headers.insert(name, value);
            }
            _ => tracing::warn!(header = key, "Ignoring invalid response header"),
        }
    }

    fn status(&self) -> Option<StatusCode> {
        self.status
    }

    fn committed(&self) -> bool {
        self.committed
    }

    fn write<T: Serialize + ?Sized>(&mut self, body: &T) -> Result<()> {
        let encoded = serde_json::to_vec(body)?;
        self.status.get_or_insert(StatusCode::OK);
        self.headers
            .entry(header::CONTENT_TYPE)
            .or_insert(HeaderValue::from_static("application/json"));
        self.body = Some(Bytes::from(encoded));
        self.committed = true;
        Ok(())
    }

    fn success_with_no_content(&mut self) {
        self.set_status(StatusCode::NO_CONTENT);
        self.committed = true;
    }
}

impl IntoResponse for HttpResponder {
    fn into_response(self) -> Response {
        let status = self.status.unwrap_or(StatusCode::OK);
        let body = self.body.map_or_else(Body::empty, Body::from);
        let mut response = (status, body).into_response();
        response.headers_mut().extend(self.headers);
        response
    }
}

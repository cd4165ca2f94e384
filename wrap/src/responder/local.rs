use std::collections::HashMap;
use std::fmt;
use std::io::{self, Write};

use http::StatusCode;
use serde::Serialize;
use serde_json::Value;

use super::Responder;
use crate::error::Result;

/// In-memory responder for command-line and offline invocations
///
/// Every write is logged at info level. When built with an echo writer
/// (see [`LocalResponder::stdout`]) the body is also printed there as one
/// line of JSON.
pub struct LocalResponder {
    headers: HashMap<String, String>,
    status: Option<StatusCode>,
    committed: bool,
    output: Option<Value>,
    echo: Option<Box<dyn Write + Send>>,
}

impl LocalResponder {
    /// Buffer only
    pub fn new() -> Self {
        Self {
            headers: HashMap::new(),
            status: None,
            committed: false,
            output: None,
            echo: None,
        }
    }

    /// Buffer and print bodies to stdout
    pub fn stdout() -> Self {
        Self::with_writer(io::stdout())
    }

    /// Buffer and print bodies to `writer`
    pub fn with_writer(writer: impl Write + Send + 'static) -> Self {
        Self {
            echo: Some(Box::new(writer)),
            ..Self::new()
        }
    }

    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.get(key).map(String::as_str)
    }

    /// Last body written, as JSON
    pub fn output(&self) -> Option<&Value> {
        self.output.as_ref()
    }
}

impl Default for LocalResponder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for LocalResponder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalResponder")
            .field("headers", &self.headers)
            .field("status", &self.status)
            .field("committed", &self.committed)
            .field("output", &self.output)
            .field("echo", &self.echo.is_some())
            .finish()
    }
}

impl Responder for LocalResponder {
    fn set_status(&mut self, status: StatusCode) {
        self.status = Some(status);
    }

    fn set_header(&mut self, key: &str, value: &str) {
        self.headers.insert(key.to_string(), value.to_string());
    }

    fn status(&self) -> Option<StatusCode> {
        self.status
    }

    fn committed(&self) -> bool {
        self.committed
    }

    fn write<T: Serialize + ?Sized>(&mut self, body: &T) -> Result<()> {
        let value = serde_json::to_value(body)?;
        let status = *self.status.get_or_insert(StatusCode::OK);
        self.committed = true;

        tracing::info!(status = status.as_u16(), body = %value, "<--- response");

        let output = self.output.insert(value);

        if let Some(echo) = self.echo.as_mut() {
            serde_json::to_writer(&mut *echo, &*output)?;
            writeln!(echo)?;
            echo.flush()?;
        }

        Ok(())
    }

    fn success_with_no_content(&mut self) {
        self.set_status(StatusCode::NO_CONTENT);
        self.committed = true;
        tracing::info!(status = StatusCode::NO_CONTENT.as_u16(), "<--- response");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use serde::ser::{self, Serializer};
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    /// Writer whose contents stay readable after the responder takes it
    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    struct Unserializable;

    impl Serialize for Unserializable {
        fn serialize<S: Serializer>(&self, _serializer: S) -> std::result::Result<S::Ok, S::Error> {
            Err(ser::Error::custom("cannot encode"))
        }
    }

    #[test]
    fn test_first_write_defaults_status_and_commits() {
        let mut responder = LocalResponder::new();
        assert_eq!(responder.status(), None);
        assert!(!responder.committed());

        responder.write(&json!({ "ok": true })).unwrap();

        assert_eq!(responder.status(), Some(StatusCode::OK));
        assert!(responder.committed());
        assert_eq!(responder.output(), Some(&json!({ "ok": true })));
    }

    #[test]
    fn test_write_keeps_explicit_status() {
        let mut responder = LocalResponder::new();
        responder.set_status(StatusCode::CREATED);
        responder.write("made").unwrap();
        assert_eq!(responder.status(), Some(StatusCode::CREATED));
    }

    #[test]
    fn test_no_content_commits_without_body() {
        let mut responder = LocalResponder::new();
        responder.success_with_no_content();
        assert_eq!(responder.status(), Some(StatusCode::NO_CONTENT));
        assert!(responder.committed());
        assert!(responder.output().is_none());
    }

    #[test]
    fn test_serialization_failure_leaves_uncommitted() {
        let mut responder = LocalResponder::new();
        let result = responder.write(&Unserializable);
        assert!(matches!(result, Err(Error::Json(_))));
        assert!(!responder.committed());
        assert_eq!(responder.status(), None);
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::ErrorKind::BrokenPipe.into())
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::ErrorKind::BrokenPipe.into())
        }
    }

    #[test]
    fn test_echo_failure_keeps_output() {
        let mut responder = LocalResponder::with_writer(BrokenPipe);
        let result = responder.write(&json!({ "ok": true }));

        assert!(result.is_err());
        assert!(responder.committed());
        assert_eq!(responder.status(), Some(StatusCode::OK));
        assert_eq!(responder.output(), Some(&json!({ "ok": true })));
    }

    #[test]
    fn test_echo_writes_one_json_line() {
        let buffer = SharedBuffer::default();
        let mut responder = LocalResponder::with_writer(buffer.clone());
        responder.write(&json!({ "message": "not found" })).unwrap();

        let printed = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
        assert_eq!(printed, "{\"message\":\"not found\"}\n");
    }

    #[test]
    fn test_headers_last_write_wins() {
        let mut responder = LocalResponder::new();
        responder.set_header("X-Mode", "a");
        responder.set_header("X-Mode", "b");
        assert_eq!(responder.header("X-Mode"), Some("b"));
        assert_eq!(responder.headers().len(), 1);
    }

    #[test]
    fn test_enable_cors_sets_three_headers() {
        let mut responder = LocalResponder::new();
        responder.enable_cors("*", "GET, POST", "Content-Type");
        assert_eq!(responder.header("Access-Control-Allow-Origin"), Some("*"));
        assert_eq!(responder.header("Access-Control-Allow-Methods"), Some("GET, POST"));
        assert_eq!(responder.header("Access-Control-Allow-Headers"), Some("Content-Type"));
    }
}

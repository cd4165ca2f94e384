//! Turning a returned error into a response
//!
//! [`dispatch`] is the only place that knows how errors map onto the wire.
//! It does not log: the diagnostic was logged when the error was built.

use crate::{http_error::HttpError, responder::Responder};

/// Set the status and write the body for `err`.
///
/// Errors from outside [`HttpError`] become a 500 whose message is their
/// own text. Always performs exactly one status set and one body write.
pub fn dispatch<R: Responder>(responder: &mut R, err: anyhow::Error) {
    let err = match err.downcast::<HttpError>() {
        Ok(known) => known,
        Err(unknown) => HttpError::unrecognized(&unknown),
    };

    responder.set_status(err.status());
    // Encoding an HttpError cannot fail; an echo failure has nowhere to go
    let _ = responder.write(&err);
}

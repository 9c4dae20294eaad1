//! Panic isolation for user callbacks.
//!
//! Handler methods are user code. A panic inside one must not take down
//! the dispatch worker, so every invocation runs under `catch_unwind` and
//! a panic is turned into [`WebsocketError::CallbackPanicked`].
//!
//! `catch_unwind` only catches unwinding panics; a build with
//! `panic = "abort"` still aborts the process.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;

use super::base::{WebsocketError, WebsocketResult};

/// Await a callback future, converting a panic into an error.
///
/// Panics raised while the future is being polled are caught. Panics in
/// tasks the callback spawns are not.
pub async fn call_handler_safely<F>(callback: &'static str, fut: F) -> WebsocketResult<()>
where
    F: Future<Output = ()>,
{
    match AssertUnwindSafe(fut).catch_unwind().await {
        Ok(()) => Ok(()),
        Err(panic_info) => {
            let msg = extract_panic_message(&panic_info);
            tracing::error!(callback, message = %msg, "Callback panicked");
            Err(WebsocketError::CallbackPanicked(format!("{callback}: {msg}")))
        }
    }
}

/// Extract a human-readable message from a panic payload.
fn extract_panic_message(panic_info: &Box<dyn Any + Send>) -> String {
    if let Some(s) = panic_info.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic_info.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic (non-string payload)".to_string()
    }
}

//! Fault boundary for errors raised inside event callbacks.
//!
//! A change-feed callback has no caller to return a `Result` to. Components
//! hand such errors to their `FaultHandler` instead. The default handler is
//! the crash boundary: it logs and panics. Hosts that own a different
//! boundary install their own handler.

use crate::error::Error;
use std::rc::Rc;

/// Receives errors that cannot be returned to a caller.
pub type FaultHandler = Rc<dyn Fn(&Error)>;

/// Logs the fault and panics.
pub fn panic_on_fault() -> FaultHandler {
    Rc::new(|err: &Error| {
        tracing::error!(error = %err, "unrecoverable fault in derived view");
        panic!("vista fault: {err}");
    })
}

/// Logs the fault and keeps going.
pub fn log_fault() -> FaultHandler {
    Rc::new(|err: &Error| {
        tracing::error!(error = %err, "fault in derived view");
    })
}

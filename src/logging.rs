//! Tracing shim for the library.
//!
//! With the `logging` feature the level macros forward to `tracing` and
//! [`phase!`] opens an entered span around registry building, batch
//! synthesis and each member. Without it every macro expands to nothing and
//! `phase!` yields a [`NoSpan`] guard, so call sites never need a `cfg`.
//!
//! Spans carry the `gdmarshal::phase` target so a subscriber can follow one
//! generation run with `RUST_LOG=gdmarshal::phase=debug`.

#[cfg(feature = "logging")]
macro_rules! log_event {
    ($level:ident, $($arg:tt)*) => { tracing::$level!($($arg)*) };
}

#[cfg(not(feature = "logging"))]
macro_rules! log_event {
    ($level:ident, $($arg:tt)*) => {};
}

macro_rules! log_trace {
    ($($arg:tt)*) => { $crate::logging::log_event!(trace, $($arg)*) };
}

macro_rules! log_debug {
    ($($arg:tt)*) => { $crate::logging::log_event!(debug, $($arg)*) };
}

macro_rules! log_info {
    ($($arg:tt)*) => { $crate::logging::log_event!(info, $($arg)*) };
}

macro_rules! log_warn {
    ($($arg:tt)*) => { $crate::logging::log_event!(warn, $($arg)*) };
}

macro_rules! log_error {
    ($($arg:tt)*) => { $crate::logging::log_event!(error, $($arg)*) };
}

/// Enter a debug-level span named after a synthesis phase.
///
/// Bind the result (`let _phase = phase!(...)`); the span closes when the
/// guard drops.
#[cfg(feature = "logging")]
macro_rules! phase {
    ($name:literal $(, $($field:tt)*)?) => {
        tracing::debug_span!(target: "gdmarshal::phase", $name $(, $($field)*)?).entered()
    };
}

#[cfg(not(feature = "logging"))]
macro_rules! phase {
    ($name:literal $(, $($field:tt)*)?) => {
        $crate::logging::NoSpan
    };
}

/// Guard returned by `phase!` when tracing is compiled out.
#[cfg(not(feature = "logging"))]
pub(crate) struct NoSpan;

pub(crate) use log_event;
pub(crate) use log_debug as debug;
pub(crate) use log_error as error;
pub(crate) use log_info as info;
pub(crate) use log_trace as trace;
pub(crate) use log_warn as warn;
pub(crate) use phase;

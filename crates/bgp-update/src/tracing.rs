//! BGP-specific tracing macros that automatically include proto="bgp" field
//!
//! Every event emitted by the codec carries the same field the rest of the
//! daemon filters on. Subscriber setup is left to the embedding process.

/// Log an info-level message with proto="bgp" field
#[macro_export]
macro_rules! bgp_info {
    ($($arg:tt)*) => {
        ::tracing::info!(proto = "bgp", $($arg)*)
    };
}

/// Log a warning-level message with proto="bgp" field
#[macro_export]
macro_rules! bgp_warn {
    ($($arg:tt)*) => {
        ::tracing::warn!(proto = "bgp", $($arg)*)
    };
}

/// Log an error-level message with proto="bgp" field
#[macro_export]
macro_rules! bgp_error {
    ($($arg:tt)*) => {
        ::tracing::error!(proto = "bgp", $($arg)*)
    };
}

/// Log a debug-level message with proto="bgp" field
#[macro_export]
macro_rules! bgp_debug {
    ($($arg:tt)*) => {
        ::tracing::debug!(proto = "bgp", $($arg)*)
    };
}

/// Log a trace-level message with proto="bgp" field
#[macro_export]
macro_rules! bgp_trace {
    ($($arg:tt)*) => {
        ::tracing::trace!(proto = "bgp", $($arg)*)
    };
}

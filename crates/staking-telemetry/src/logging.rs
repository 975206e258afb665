//! Structured logging macros.
//!
//! Every event carries a `component` field so that logs from the worker,
//! the scanner and the cache can be separated downstream.

/// Log an event with a `component` field.
#[macro_export]
macro_rules! log_event {
    (info, $component:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::info!(
            component = $component,
            $($($field)*,)?
            $msg
        )
    };

    (warn, $component:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::warn!(
            component = $component,
            $($($field)*,)?
            $msg
        )
    };

    (error, $component:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::error!(
            component = $component,
            $($($field)*,)?
            $msg
        )
    };

    (debug, $component:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::debug!(
            component = $component,
            $($($field)*,)?
            $msg
        )
    };
}

/// Log an era-scoped scan event with the standard `network`, `account` and
/// `era` fields.
#[macro_export]
macro_rules! log_era_event {
    ($level:ident, $component:expr, $msg:expr, $network:expr, $account:expr, $era:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            component = $component,
            network = %$network,
            account = %$account,
            era = $era,
            $($($field)*,)?
            $msg
        )
    };
}

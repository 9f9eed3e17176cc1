//! Verbosity-gated `tracing` events for the planner core.
//!
//! Every event the core emits passes through one of these macros, so
//! `ScheduleConfig::verbosity` alone decides what reaches the host's
//! subscriber. The parser and cycle checker emit nothing; callers that need
//! their failures use `try_parse_dependencies` and `check_candidate`.
//!
//! | level | macro          | tracing level | emitted by the calculator           |
//! |-------|----------------|---------------|-------------------------------------|
//! | 0     | none           | none          | nothing                             |
//! | 1     | `log_changes!` | `INFO`        | task count, makespan, critical path |
//! | 2     | `log_checks!`  | `DEBUG`       | per-task timing, unreadable lists   |
//! | 3     | `log_debug!`   | `TRACE`       | queue pops, trace steps             |

pub const VERBOSITY_SILENT: u8 = 0;
pub const VERBOSITY_CHANGES: u8 = 1;
pub const VERBOSITY_CHECKS: u8 = 2;
pub const VERBOSITY_DEBUG: u8 = 3;

/// `INFO` event when verbosity is at least [`VERBOSITY_CHANGES`].
#[macro_export]
macro_rules! log_changes {
    ($verbosity:expr, $($arg:tt)*) => {
        if $verbosity >= $crate::logging::VERBOSITY_CHANGES {
            ::tracing::info!($($arg)*);
        }
    };
}

/// `DEBUG` event when verbosity is at least [`VERBOSITY_CHECKS`].
#[macro_export]
macro_rules! log_checks {
    ($verbosity:expr, $($arg:tt)*) => {
        if $verbosity >= $crate::logging::VERBOSITY_CHECKS {
            ::tracing::debug!($($arg)*);
        }
    };
}

/// `TRACE` event when verbosity is at least [`VERBOSITY_DEBUG`].
#[macro_export]
macro_rules! log_debug {
    ($verbosity:expr, $($arg:tt)*) => {
        if $verbosity >= $crate::logging::VERBOSITY_DEBUG {
            ::tracing::trace!($($arg)*);
        }
    };
}

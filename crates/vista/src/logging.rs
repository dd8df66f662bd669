//! Tracing bootstrap.
//!
//! Vista logs through `tracing` and never installs a subscriber on its own.
//! Hosts without one can call [`init_tracing`].
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Fault boundary reached; derived state is untrustworthy |
//! | WARN  | Desync recovered by a rebuild, failed background load |
//! | DEBUG | Rebuilds, resets, attach/detach, filter signal batches |
//! | TRACE | Per-item inserts, removals and superseded loads |

use tracing_subscriber::EnvFilter;

/// Default directives used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "vista=info";

/// Installs a formatted global subscriber.
///
/// `RUST_LOG` takes precedence over `default_filter`. Fails instead of
/// panicking when the filter does not parse or a global subscriber is
/// already installed.
pub fn init_tracing(default_filter: &str) -> Result<(), String> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_filter)
            .map_err(|err| format!("invalid log filter `{default_filter}`: {err}"))?,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|err| err.to_string())
}

/// Routes events to the test harness' captured output. Safe to call from
/// every test.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_is_an_error_not_a_panic() {
        init_test_tracing();
        assert!(init_tracing(DEFAULT_FILTER).is_err());
    }
}

#![warn(missing_docs)]

//! Logging bootstrap and runtime control for the MoveMyCam workspace.
//!
//! This crate consolidates logging infrastructure:
//! - [`LogLevel`]: the 0..5 verbosity scale stored in configuration files
//! - [`init`] / [`LogHandle`]: install the global subscriber, then switch its
//!   level and output sink at runtime
//! - CLI argument parsing for log level configuration

use std::env;

use clap::Args;
use tracing_subscriber::EnvFilter;

mod handle;
mod level;
mod sink;

pub use handle::{LogHandle, init};
pub use level::LogLevel;
pub use sink::{ROTATE_BYTES, SharedSink};

/// Logging controls for CLI apps.
#[derive(Debug, Clone, Default, Args)]
pub struct LogArgs {
    /// Set global log level to trace (our crates only)
    #[arg(long, conflicts_with_all = ["debug", "log_level", "log_filter"])]
    pub trace: bool,

    /// Set global log level to debug (our crates only)
    #[arg(long, conflicts_with_all = ["trace", "log_level", "log_filter"])]
    pub debug: bool,

    /// Set a single global log level for our crates (error|warn|info|debug|trace)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Set an explicit tracing filter directive (overrides other flags)
    /// e.g. "movemycam_engine=trace,camera=debug"
    #[arg(long)]
    pub log_filter: Option<String>,
}

impl LogArgs {
    /// Filter spec for these arguments, see [`compute_spec`].
    pub fn spec(&self) -> String {
        compute_spec(
            self.trace,
            self.debug,
            self.log_level.as_deref(),
            self.log_filter.as_deref(),
        )
    }

    /// True when the command line chose a level explicitly.
    ///
    /// An explicit choice pins the filter so a configuration file's
    /// `log_level` does not override it.
    pub fn is_explicit(&self) -> bool {
        self.trace || self.debug || self.log_level.is_some() || self.log_filter.is_some()
    }
}

/// List of crate targets that constitute "our" logs.
pub fn our_crates() -> &'static [&'static str] {
    &[
        "movemycam",
        "movemycam_engine",
        "camera",
        "config",
        "keyname",
        "logging",
    ]
}

/// Build a filter directive string that sets the same `level` for all of our crates.
pub fn level_spec_for(level: &str) -> String {
    let lvl = level.to_ascii_lowercase();
    our_crates()
        .iter()
        .map(|t| format!("{}={}", t, lvl))
        .collect::<Vec<_>>()
        .join(",")
}

/// Compute the final filter spec string with precedence:
/// - `log_filter`
/// - `trace`/`debug`/`log_level` (crate-scoped)
/// - `RUST_LOG` env
/// - default to crate-scoped `info`
pub fn compute_spec(
    trace: bool,
    debug: bool,
    log_level: Option<&str>,
    log_filter: Option<&str>,
) -> String {
    if let Some(spec) = log_filter {
        return spec.to_string();
    }
    if trace {
        return level_spec_for("trace");
    }
    if debug {
        return level_spec_for("debug");
    }
    if let Some(lvl) = log_level {
        return level_spec_for(lvl);
    }
    env::var("RUST_LOG").unwrap_or_else(|_| level_spec_for("info"))
}

/// Create an `EnvFilter` from a spec string.
pub fn env_filter_from_spec(spec: &str) -> EnvFilter {
    EnvFilter::new(spec)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_spec_covers_every_crate() {
        let spec = level_spec_for("DEBUG");
        for krate in our_crates() {
            assert!(spec.contains(&format!("{krate}=debug")), "{spec}");
        }
    }

    #[test]
    fn explicit_filter_wins() {
        let spec = compute_spec(false, false, Some("warn"), Some("camera=trace"));
        assert_eq!(spec, "camera=trace");
    }

    #[test]
    fn flags_beat_level() {
        assert_eq!(compute_spec(true, false, None, None), level_spec_for("trace"));
        assert_eq!(compute_spec(false, true, None, None), level_spec_for("debug"));
        assert_eq!(
            compute_spec(false, false, Some("warn"), None),
            level_spec_for("warn")
        );
    }

    #[test]
    fn explicit_args_are_detected() {
        assert!(!LogArgs::default().is_explicit());
        let args = LogArgs {
            debug: true,
            ..LogArgs::default()
        };
        assert!(args.is_explicit());
        assert_eq!(args.spec(), level_spec_for("debug"));
    }
}

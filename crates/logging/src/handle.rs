use std::{io, path::Path, sync::Arc};

use parking_lot::Mutex;
use tracing::warn;
use tracing_subscriber::{EnvFilter, Registry, fmt, prelude::*, reload};

use crate::{LogLevel, SharedSink, env_filter_from_spec, level_spec_for};

type FilterHandle = reload::Handle<EnvFilter, Registry>;

#[derive(Default)]
struct State {
    level: Option<LogLevel>,
    pinned: bool,
}

/// Runtime control over the installed subscriber.
///
/// Cloning is cheap; every clone controls the same filter and sink.
#[derive(Clone)]
pub struct LogHandle {
    filter: Option<FilterHandle>,
    sink: SharedSink,
    state: Arc<Mutex<State>>,
}

/// Install the global subscriber with `spec` as the initial filter.
///
/// If a global subscriber already exists the returned handle is detached:
/// it records level changes and still owns a sink, but reloads nothing.
pub fn init(spec: &str) -> LogHandle {
    let (filter, reload_handle) = reload::Layer::new(env_filter_from_spec(spec));
    let sink = SharedSink::console();
    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_ansi(false).with_writer(sink.clone()))
        .try_init()
        .is_ok();
    LogHandle {
        filter: installed.then_some(reload_handle),
        sink,
        state: Arc::default(),
    }
}

impl LogHandle {
    /// A handle not bound to any subscriber.
    pub fn detached() -> Self {
        Self {
            filter: None,
            sink: SharedSink::console(),
            state: Arc::default(),
        }
    }

    /// Keep the current filter regardless of later [`set_level`](Self::set_level) calls.
    pub fn pin(&self) {
        self.state.lock().pinned = true;
    }

    /// Whether the filter is pinned.
    pub fn is_pinned(&self) -> bool {
        self.state.lock().pinned
    }

    /// Apply a configuration verbosity to our crates.
    pub fn set_level(&self, level: LogLevel) {
        let pinned = {
            let mut st = self.state.lock();
            st.level = Some(level);
            st.pinned
        };
        if pinned {
            return;
        }
        let Some(filter) = &self.filter else { return };
        let spec = match level {
            LogLevel::Disabled => "off".to_string(),
            other => level_spec_for(other.directive()),
        };
        if let Err(e) = filter.reload(env_filter_from_spec(&spec)) {
            warn!(error = %e, %spec, "log_filter_reload_failed");
        }
    }

    /// Last level applied through [`set_level`](Self::set_level).
    pub fn level(&self) -> Option<LogLevel> {
        self.state.lock().level
    }

    /// Send output to `path`; the previous target stays on error.
    pub fn set_file(&self, path: &Path) -> io::Result<()> {
        self.sink.use_file(path)
    }

    /// Send output to the console.
    pub fn use_console(&self) {
        self.sink.use_console();
    }

    /// The shared output sink.
    pub fn sink(&self) -> &SharedSink {
        &self.sink
    }
}

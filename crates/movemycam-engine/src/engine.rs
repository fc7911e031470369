use std::sync::Arc;

use camera::DeviceApi;
use config::SharedStore;
use parking_lot::Mutex;
use tracing::{debug, error, info, warn};

use crate::{
    Result,
    deps::{HookGuard, KeyboardHook},
    dispatch::{DispatchMode, Dispatcher},
    matcher::{KeyHandler, snapshot},
    mover::Mover,
    notification::{NoopNotifier, NotificationDispatcher, Notifier},
};

/// Listener lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// No hook installed.
    Stopped,
    /// Installing the hook.
    Starting,
    /// Delivering key events.
    Running,
    /// Removing the hook.
    Stopping,
}

/// Engine construction options.
#[derive(Debug, Clone, Copy, Default)]
pub struct EngineOptions {
    /// Where matched moves run.
    pub dispatch: DispatchMode,
}

struct Lifecycle {
    state: EngineState,
    guard: Option<Box<dyn HookGuard>>,
}

/// Global hotkey engine: listens for chords and moves the bound cameras.
///
/// The engine reads bindings from the shared [`config::ConfigStore`] when it
/// starts and on [`load_configuration`](Self::load_configuration); edits to
/// the store in between take effect at the next of those. Keys are named for
/// the store's [`platform`](config::ConfigStore::platform), the same names
/// its bindings were validated against.
pub struct Engine {
    store: SharedStore,
    hook: Arc<dyn KeyboardHook>,
    handler: Arc<KeyHandler>,
    notifications: Arc<NotificationDispatcher>,
    lifecycle: Mutex<Lifecycle>,
}

impl Engine {
    /// Build a stopped engine.
    pub fn new(
        store: SharedStore,
        hook: Arc<dyn KeyboardHook>,
        api: Arc<dyn DeviceApi>,
        options: EngineOptions,
    ) -> Result<Self> {
        let notifications = Arc::new(NotificationDispatcher::new(Arc::new(NoopNotifier)));
        let mover = Arc::new(Mover::new(api, notifications.clone()));
        let dispatcher = Dispatcher::new(options.dispatch, mover)?;
        let platform = store.lock().platform();
        let handler = Arc::new(KeyHandler::new(dispatcher, platform));
        Ok(Self {
            store,
            hook,
            handler,
            notifications,
            lifecycle: Mutex::new(Lifecycle {
                state: EngineState::Stopped,
                guard: None,
            }),
        })
    }

    /// Replace the notification surface.
    pub fn set_notifier(&self, notifier: Arc<dyn Notifier>) {
        self.notifications.set_notifier(notifier);
    }

    /// True when the store holds at least one activated binding with a non-empty chord.
    pub fn ready(&self) -> bool {
        self.store.lock().is_ready()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> EngineState {
        self.lifecycle.lock().state
    }

    /// True while the hook is installed.
    pub fn is_running(&self) -> bool {
        self.state() == EngineState::Running
    }

    /// Start listening. Returns `Ok(false)` when the store has no armed binding.
    pub fn start(&self) -> Result<bool> {
        let mut lc = self.lifecycle.lock();
        self.start_locked(&mut lc)
    }

    /// Stop listening and forget held keys. Queued moves that have not started
    /// are dropped. Stopping a stopped engine is a no-op.
    pub fn stop(&self) {
        let mut lc = self.lifecycle.lock();
        self.stop_locked(&mut lc);
    }

    /// Reload the configuration file.
    ///
    /// A running engine is stopped first and restarted afterwards, on the
    /// reloaded bindings or, if the file was rejected, on the previous ones.
    /// Returns false when the file held an invalid binding.
    pub fn load_configuration(&self) -> bool {
        let mut lc = self.lifecycle.lock();
        let was_running = lc.state == EngineState::Running;
        self.stop_locked(&mut lc);

        let result = self.store.lock().load();
        let ok = match result {
            Ok(true) => {
                info!("configuration_loaded");
                true
            }
            Ok(false) => {
                warn!("configuration_not_loaded");
                true
            }
            Err(e) => {
                error!(error = %e.pretty(), "configuration_rejected");
                false
            }
        };

        if was_running {
            match self.start_locked(&mut lc) {
                Ok(true) => {}
                Ok(false) => warn!("engine_not_restarted_no_bindings"),
                Err(e) => error!(error = %e, "engine_restart_failed"),
            }
        }
        ok
    }

    fn start_locked(&self, lc: &mut Lifecycle) -> Result<bool> {
        if lc.state == EngineState::Running {
            return Ok(true);
        }
        let bindings = {
            let store = self.store.lock();
            if !store.is_ready() {
                debug!("engine_start_skipped_not_ready");
                return Ok(false);
            }
            snapshot(store.cameras())
        };
        lc.state = EngineState::Starting;
        let armed = bindings.len();
        self.handler.set_bindings(bindings);
        self.handler.pressed.clear();
        match self.hook.install(self.handler.clone()) {
            Ok(guard) => {
                lc.guard = Some(guard);
                lc.state = EngineState::Running;
                info!(armed, "engine_started");
                Ok(true)
            }
            Err(e) => {
                lc.state = EngineState::Stopped;
                error!(error = %e, "engine_start_failed");
                Err(e)
            }
        }
    }

    fn stop_locked(&self, lc: &mut Lifecycle) {
        if lc.state == EngineState::Stopped {
            return;
        }
        lc.state = EngineState::Stopping;
        drop(lc.guard.take());
        self.handler.pressed.clear();
        self.handler.discard_pending();
        lc.state = EngineState::Stopped;
        info!("engine_stopped");
    }

    /// Number of keys currently held, as tracked by the engine.
    pub fn held_keys(&self) -> usize {
        self.handler.pressed.len()
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.stop();
    }
}

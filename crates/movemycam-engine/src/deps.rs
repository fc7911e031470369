use std::sync::Arc;

use keyname::RawKey;
use parking_lot::Mutex;

use crate::Result;

// ---- Keyboard hook abstraction ----

/// Whether a key went down or up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEventKind {
    /// Key pressed.
    Press,
    /// Key released.
    Release,
}

/// One raw key event from a keyboard hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// Press or release.
    pub kind: KeyEventKind,
    /// The key, before naming.
    pub key: RawKey,
}

impl KeyEvent {
    /// A press of `key`.
    pub fn press(key: impl Into<RawKey>) -> Self {
        Self {
            kind: KeyEventKind::Press,
            key: key.into(),
        }
    }

    /// A release of `key`.
    pub fn release(key: impl Into<RawKey>) -> Self {
        Self {
            kind: KeyEventKind::Release,
            key: key.into(),
        }
    }
}

/// Receiver of key events, called on the hook's delivery thread.
pub trait KeySink: Send + Sync {
    /// Handle one event. Events arrive in the order the OS produced them.
    fn on_key(&self, event: KeyEvent);
}

/// Keeps a hook installed; dropping it uninstalls the hook.
pub trait HookGuard: Send {}

/// Source of global press and release events.
pub trait KeyboardHook: Send + Sync {
    /// Start delivering events to `sink` until the guard is dropped.
    fn install(&self, sink: Arc<dyn KeySink>) -> Result<Box<dyn HookGuard>>;
}

/// Slot a hook delivers into; empty while uninstalled.
pub(crate) type SinkSlot = Arc<Mutex<Option<Arc<dyn KeySink>>>>;

/// Guard that empties a [`SinkSlot`] on drop.
pub(crate) struct SlotGuard {
    pub(crate) slot: SinkSlot,
}

impl HookGuard for SlotGuard {}

impl Drop for SlotGuard {
    fn drop(&mut self) {
        self.slot.lock().take();
    }
}

/// Deliver `event` to the installed sink, if any, without holding the slot lock.
pub(crate) fn deliver(slot: &SinkSlot, event: KeyEvent) {
    let sink = slot.lock().clone();
    if let Some(sink) = sink {
        sink.on_key(event);
    }
}

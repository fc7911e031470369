//! Test helpers: a keyboard hook driven by hand.

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use keyname::{RawKey, SpecialKey};
use parking_lot::Mutex;

use crate::{
    Error, Result,
    deps::{HookGuard, KeyEvent, KeyboardHook, KeySink, SinkSlot, SlotGuard, deliver},
};

/// Keyboard hook whose events come from [`press`](Self::press) and
/// [`release`](Self::release), delivered synchronously on the caller's thread.
#[derive(Clone, Default)]
pub struct ManualHook {
    slot: SinkSlot,
    installs: Arc<AtomicUsize>,
    fail_next: Arc<Mutex<Option<String>>>,
}

impl ManualHook {
    /// An uninstalled hook.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `install` fail with `message`.
    pub fn fail_next_install(&self, message: &str) {
        *self.fail_next.lock() = Some(message.to_string());
    }

    /// True while a sink is installed.
    pub fn is_installed(&self) -> bool {
        self.slot.lock().is_some()
    }

    /// Number of successful installs so far.
    pub fn install_count(&self) -> usize {
        self.installs.load(Ordering::SeqCst)
    }

    /// Deliver a press of the key named `name`.
    pub fn press(&self, name: &str) {
        if let Some(key) = key_for(name) {
            deliver(&self.slot, KeyEvent::press(key));
        }
    }

    /// Deliver a release of the key named `name`.
    pub fn release(&self, name: &str) {
        if let Some(key) = key_for(name) {
            deliver(&self.slot, KeyEvent::release(key));
        }
    }

    /// Deliver a raw event.
    pub fn send(&self, event: KeyEvent) {
        deliver(&self.slot, event);
    }

    /// Press every key in order, then release them in reverse.
    pub fn chord(&self, names: &[&str]) {
        for n in names {
            self.press(n);
        }
        for n in names.iter().rev() {
            self.release(n);
        }
    }
}

impl KeyboardHook for ManualHook {
    fn install(&self, sink: Arc<dyn KeySink>) -> Result<Box<dyn HookGuard>> {
        if let Some(msg) = self.fail_next.lock().take() {
            return Err(Error::Hook(msg));
        }
        *self.slot.lock() = Some(sink);
        self.installs.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(SlotGuard {
            slot: self.slot.clone(),
        }))
    }
}

/// Raw key that the resolver names `name`, using Windows numpad codes.
pub fn key_for(name: &str) -> Option<RawKey> {
    let mut chars = name.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return Some(RawKey::Char(c));
    }
    if let Some(k) = SpecialKey::from_name(name) {
        return Some(RawKey::Special(k));
    }
    name.strip_prefix("NUM ")
        .and_then(|d| d.parse::<u32>().ok())
        .filter(|d| *d <= 9)
        .map(|d| RawKey::Virtual(96 + d))
}

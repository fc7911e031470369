use std::{collections::HashSet, sync::Arc};

use parking_lot::Mutex;

/// Canonical names of the keys currently held down.
#[derive(Clone, Default)]
pub struct PressedKeys {
    held: Arc<Mutex<HashSet<String>>>,
}

impl PressedKeys {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a key down; returns true for the first down, false for repeats.
    pub fn press(&self, name: &str) -> bool {
        self.held.lock().insert(name.to_string())
    }

    /// Record a key up.
    pub fn release(&self, name: &str) {
        self.held.lock().remove(name);
    }

    /// Return true if the key is currently considered down.
    pub fn is_down(&self, name: &str) -> bool {
        self.held.lock().contains(name)
    }

    /// True when every name in `chord` is down.
    pub fn all_down(&self, chord: &[String]) -> bool {
        let held = self.held.lock();
        chord.iter().all(|k| held.contains(k))
    }

    /// Forget every held key.
    pub fn clear(&self) {
        self.held.lock().clear();
    }

    /// Number of keys held.
    pub fn len(&self) -> usize {
        self.held.lock().len()
    }

    /// True when nothing is held.
    pub fn is_empty(&self) -> bool {
        self.held.lock().is_empty()
    }
}

//! Chord matching on key release.

use std::sync::Arc;

use config::CameraBinding;
use keyname::Platform;
use parking_lot::RwLock;
use tracing::{debug, trace};

use crate::{
    deps::{KeyEvent, KeyEventKind, KeySink},
    dispatch::Dispatcher,
    key_state::PressedKeys,
};

/// Armed bindings with canonical chords, as of the last snapshot.
pub(crate) type Snapshot = Arc<Vec<CameraBinding>>;

/// Armed bindings, in store order, with chords rewritten to canonical names.
pub(crate) fn snapshot(cameras: &[CameraBinding]) -> Snapshot {
    Arc::new(
        cameras
            .iter()
            .filter(|b| b.is_armed())
            .map(|b| CameraBinding {
                hot_keys: b.chord(),
                ..b.clone()
            })
            .collect(),
    )
}

/// Bindings whose whole chord is held, in snapshot order.
pub(crate) fn matching<'a>(
    bindings: &'a [CameraBinding],
    pressed: &'a PressedKeys,
) -> impl Iterator<Item = &'a CameraBinding> + 'a {
    bindings
        .iter()
        .filter(move |b| !b.hot_keys.is_empty() && pressed.all_down(&b.hot_keys))
}

/// Key sink that tracks held keys and fires matches on release.
pub(crate) struct KeyHandler {
    pub(crate) pressed: PressedKeys,
    bindings: RwLock<Snapshot>,
    dispatcher: Dispatcher,
    platform: Platform,
}

impl KeyHandler {
    pub(crate) fn new(dispatcher: Dispatcher, platform: Platform) -> Self {
        Self {
            pressed: PressedKeys::new(),
            bindings: RwLock::new(Arc::new(Vec::new())),
            dispatcher,
            platform,
        }
    }

    pub(crate) fn set_bindings(&self, bindings: Snapshot) {
        *self.bindings.write() = bindings;
    }

    pub(crate) fn bindings(&self) -> Snapshot {
        self.bindings.read().clone()
    }

    pub(crate) fn discard_pending(&self) -> usize {
        self.dispatcher.discard_pending()
    }
}

impl KeySink for KeyHandler {
    fn on_key(&self, event: KeyEvent) {
        let name = keyname::resolve_on(&event.key, self.platform);
        match event.kind {
            KeyEventKind::Press => {
                if let Some(name) = name {
                    if self.pressed.press(&name) {
                        trace!(key = %name, "key_down");
                    }
                }
            }
            KeyEventKind::Release => {
                let bindings = self.bindings();
                for binding in matching(&bindings, &self.pressed) {
                    debug!(number = binding.number, chord = ?binding.hot_keys, "chord_matched");
                    self.dispatcher.dispatch(binding);
                }
                if let Some(name) = name {
                    trace!(key = %name, "key_up");
                    self.pressed.release(&name);
                }
            }
        }
    }
}

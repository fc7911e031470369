//! Global keyboard hook backed by `rdev`.
//!
//! `rdev::listen` blocks its thread for the life of the process and cannot be
//! stopped, so the listener thread is started once and gated by a sink slot:
//! installing fills the slot, dropping the guard empties it.

use std::{result::Result as StdResult, sync::Arc, thread, time::Duration};

use crossbeam_channel::{RecvTimeoutError, bounded};
use keyname::{Platform, RawKey, SpecialKey};
use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use rdev::{EventType, Key};
use tracing::{debug, error, trace};

use crate::{
    Error, Result,
    deps::{HookGuard, KeyEvent, KeyboardHook, KeySink, SinkSlot, SlotGuard, deliver},
};

/// How long `install` waits for `rdev::listen` to fail before assuming it runs.
const STARTUP_GRACE: Duration = Duration::from_millis(200);

/// Keyboard hook over `rdev::listen`.
pub struct RdevHook {
    slot: SinkSlot,
    started: OnceCell<()>,
    platform: Platform,
}

impl Default for RdevHook {
    fn default() -> Self {
        Self::new()
    }
}

impl RdevHook {
    /// Hook for the running platform.
    pub fn new() -> Self {
        Self {
            slot: Arc::new(Mutex::new(None)),
            started: OnceCell::new(),
            platform: Platform::current(),
        }
    }

    fn spawn_listener(&self) -> Result<()> {
        let slot = self.slot.clone();
        let platform = self.platform;
        let (ready_tx, ready_rx) = bounded::<StdResult<(), String>>(1);
        thread::Builder::new()
            .name("movemycam-keys".into())
            .spawn(move || {
                let callback = move |event: rdev::Event| {
                    let (press, key) = match event.event_type {
                        EventType::KeyPress(k) => (true, k),
                        EventType::KeyRelease(k) => (false, k),
                        _ => return,
                    };
                    let Some(raw) = raw_key(key, platform) else {
                        trace!(?key, "key_unmapped");
                        return;
                    };
                    let ev = if press {
                        KeyEvent::press(raw)
                    } else {
                        KeyEvent::release(raw)
                    };
                    deliver(&slot, ev);
                };
                if let Err(e) = rdev::listen(callback) {
                    ready_tx.send(Err(format!("{e:?}"))).ok();
                }
            })?;

        match ready_rx.recv_timeout(STARTUP_GRACE) {
            Ok(Err(msg)) => {
                error!(error = %msg, "keyboard_listen_failed");
                Err(Error::Hook(msg))
            }
            Ok(Ok(())) | Err(RecvTimeoutError::Timeout) => {
                debug!("keyboard_listener_running");
                Ok(())
            }
            Err(RecvTimeoutError::Disconnected) => {
                Err(Error::Hook("keyboard listener exited".to_string()))
            }
        }
    }
}

impl KeyboardHook for RdevHook {
    fn install(&self, sink: Arc<dyn KeySink>) -> Result<Box<dyn HookGuard>> {
        self.started.get_or_try_init(|| self.spawn_listener())?;
        *self.slot.lock() = Some(sink);
        Ok(Box::new(SlotGuard {
            slot: self.slot.clone(),
        }))
    }
}

/// Translate an `rdev` key into a [`RawKey`].
///
/// Character keys map to their unshifted US-layout character. Keypad digits
/// carry their virtual-key code on Windows and their digit elsewhere. Left
/// modifiers are sided on Windows and generic elsewhere.
pub fn raw_key(key: Key, platform: Platform) -> Option<RawKey> {
    use SpecialKey as S;

    let windows = platform == Platform::Windows;
    let left = |sided: SpecialKey, generic: SpecialKey| {
        Some(RawKey::Special(if windows { sided } else { generic }))
    };
    let special = |s: SpecialKey| Some(RawKey::Special(s));
    let ch = |c: char| Some(RawKey::Char(c));
    let keypad = |n: u32| {
        if platform.reports_numpad_codes() {
            Some(RawKey::Virtual(96 + n))
        } else {
            char::from_digit(n, 10).map(RawKey::Char)
        }
    };

    match key {
        Key::Alt => left(S::AltL, S::Alt),
        Key::AltGr if platform == Platform::MacOs => special(S::AltR),
        Key::AltGr => special(S::AltGr),
        Key::Backspace => special(S::Backspace),
        Key::CapsLock => special(S::CapsLock),
        Key::ControlLeft => left(S::CtrlL, S::Ctrl),
        Key::ControlRight => special(S::CtrlR),
        Key::Delete | Key::KpDelete => special(S::Delete),
        Key::DownArrow => special(S::Down),
        Key::End => special(S::End),
        Key::Escape => special(S::Esc),
        Key::F1 => special(S::F1),
        Key::F2 => special(S::F2),
        Key::F3 => special(S::F3),
        Key::F4 => special(S::F4),
        Key::F5 => special(S::F5),
        Key::F6 => special(S::F6),
        Key::F7 => special(S::F7),
        Key::F8 => special(S::F8),
        Key::F9 => special(S::F9),
        Key::F10 => special(S::F10),
        Key::F11 => special(S::F11),
        Key::F12 => special(S::F12),
        Key::Home => special(S::Home),
        Key::LeftArrow => special(S::Left),
        Key::MetaLeft => left(S::CmdL, S::Cmd),
        Key::MetaRight => special(S::CmdR),
        Key::PageDown => special(S::PageDown),
        Key::PageUp => special(S::PageUp),
        Key::Return | Key::KpReturn => special(S::Enter),
        Key::RightArrow => special(S::Right),
        Key::ShiftLeft => left(S::ShiftL, S::Shift),
        Key::ShiftRight => special(S::ShiftR),
        Key::Space => special(S::Space),
        Key::Tab => special(S::Tab),
        Key::UpArrow => special(S::Up),
        Key::ScrollLock => special(S::ScrollLock),
        Key::Pause => special(S::Pause),
        Key::NumLock => special(S::NumLock),
        Key::Insert => special(S::Insert),

        Key::BackQuote => ch('`'),
        Key::Num1 => ch('1'),
        Key::Num2 => ch('2'),
        Key::Num3 => ch('3'),
        Key::Num4 => ch('4'),
        Key::Num5 => ch('5'),
        Key::Num6 => ch('6'),
        Key::Num7 => ch('7'),
        Key::Num8 => ch('8'),
        Key::Num9 => ch('9'),
        Key::Num0 => ch('0'),
        Key::Minus => ch('-'),
        Key::Equal => ch('='),
        Key::KeyQ => ch('Q'),
        Key::KeyW => ch('W'),
        Key::KeyE => ch('E'),
        Key::KeyR => ch('R'),
        Key::KeyT => ch('T'),
        Key::KeyY => ch('Y'),
        Key::KeyU => ch('U'),
        Key::KeyI => ch('I'),
        Key::KeyO => ch('O'),
        Key::KeyP => ch('P'),
        Key::LeftBracket => ch('['),
        Key::RightBracket => ch(']'),
        Key::KeyA => ch('A'),
        Key::KeyS => ch('S'),
        Key::KeyD => ch('D'),
        Key::KeyF => ch('F'),
        Key::KeyG => ch('G'),
        Key::KeyH => ch('H'),
        Key::KeyJ => ch('J'),
        Key::KeyK => ch('K'),
        Key::KeyL => ch('L'),
        Key::SemiColon => ch(';'),
        Key::Quote => ch('\''),
        Key::BackSlash | Key::IntlBackslash => ch('\\'),
        Key::KeyZ => ch('Z'),
        Key::KeyX => ch('X'),
        Key::KeyC => ch('C'),
        Key::KeyV => ch('V'),
        Key::KeyB => ch('B'),
        Key::KeyN => ch('N'),
        Key::KeyM => ch('M'),
        Key::Comma => ch(','),
        Key::Dot => ch('.'),
        Key::Slash => ch('/'),
        Key::KpMinus => ch('-'),
        Key::KpPlus => ch('+'),
        Key::KpMultiply => ch('*'),
        Key::KpDivide => ch('/'),

        Key::Kp0 => keypad(0),
        Key::Kp1 => keypad(1),
        Key::Kp2 => keypad(2),
        Key::Kp3 => keypad(3),
        Key::Kp4 => keypad(4),
        Key::Kp5 => keypad(5),
        Key::Kp6 => keypad(6),
        Key::Kp7 => keypad(7),
        Key::Kp8 => keypad(8),
        Key::Kp9 => keypad(9),

        Key::Unknown(code) if windows => windows_vk(code),
        _ => None,
    }
}

/// Windows virtual-key codes `rdev` reports as `Unknown`.
fn windows_vk(code: u32) -> Option<RawKey> {
    use SpecialKey as S;

    let key = match code {
        0x5D => S::Menu,
        0x7C => S::F13,
        0x7D => S::F14,
        0x7E => S::F15,
        0x7F => S::F16,
        0x80 => S::F17,
        0x81 => S::F18,
        0x82 => S::F19,
        0x83 => S::F20,
        0xAD => S::MediaVolumeMute,
        0xAE => S::MediaVolumeDown,
        0xAF => S::MediaVolumeUp,
        0xB0 => S::MediaNext,
        0xB1 => S::MediaPrevious,
        0xB3 => S::MediaPlayPause,
        _ => return Some(RawKey::Virtual(code)),
    };
    Some(RawKey::Special(key))
}

//! MoveMyCam Engine
//!
//! The engine turns global key chords into camera moves:
//! - listens to every key press and release through a [`KeyboardHook`]
//! - tracks which keys are held, by canonical name
//! - on each release, moves every armed camera whose whole chord is held
//! - reports each move through a [`Notifier`]
//!
//! Construct an [`Engine`] over a [`config::SharedStore`], a hook
//! ([`RdevHook`] in production, [`test_support::ManualHook`] in tests), and a
//! [`camera::DeviceApi`].

mod deps;
mod dispatch;
mod engine;
mod error;
mod key_state;
mod listener;
mod matcher;
mod mover;
mod notification;
pub mod test_support;

pub use deps::{HookGuard, KeyEvent, KeyEventKind, KeySink, KeyboardHook};
pub use dispatch::DispatchMode;
pub use engine::{Engine, EngineOptions, EngineState};
pub use error::{Error, Result};
pub use key_state::PressedKeys;
pub use listener::{RdevHook, raw_key};
pub use mover::MoveOutcome;
pub use notification::{
    ChannelNotifier, NoopNotifier, Notification, NotificationDispatcher, Notifier,
};

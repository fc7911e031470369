//! keyname: canonical key names for hotkey chords.
//!
//! - [`RawKey`]: what an input backend reports for one key event.
//! - [`SpecialKey`]: the fixed table of non-printable keys and their names.
//! - [`resolve`]: raw key to canonical name (`None` means "ignore this event").
//! - [`is_valid_key_name`]: accepts every name [`resolve`] can produce, plus any
//!   single printable ASCII character. Both are driven by the same table, so a
//!   stored chord token is legal exactly when a live key can produce it.
//!
//! Names are per platform: Windows reports sided modifiers (`CTRL L`) where
//! other platforms report the generic name (`CTRL`), see
//! [`SpecialKey::available_on`].
//!
//! Numeric keypad digits arrive as raw virtual-key codes on Windows only; they
//! resolve to `NUM 0`..`NUM 9` there and are not valid names elsewhere.
#![warn(missing_docs)]

mod names;
mod platform;
mod raw;
mod resolve;

pub use names::SpecialKey;
pub use platform::Platform;
pub use raw::RawKey;
pub use resolve::{
    all_names_on, canonical, is_valid_key_name, is_valid_key_name_on, resolve, resolve_on,
};

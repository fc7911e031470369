use crate::Platform;

// Central table of non-printable keys and their canonical names. The enum,
// `name()`, `from_name()` and `ALL` are all generated from this one list.
macro_rules! special_keys {
    ( $( $variant:ident => $name:literal, )* ) => {
        /// A non-printable key with a canonical name.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum SpecialKey {
            $(
                #[doc = $name]
                $variant,
            )*
        }

        impl SpecialKey {
            /// Every special key, in table order.
            pub const ALL: &'static [Self] = &[ $( Self::$variant, )* ];

            /// Canonical name of this key.
            pub fn name(self) -> &'static str {
                match self {
                    $( Self::$variant => $name, )*
                }
            }

            /// Look up a key by its exact canonical name.
            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    $( $name => Some(Self::$variant), )*
                    _ => None,
                }
            }
        }
    };
}

special_keys! {
    Alt => "ALT",
    AltR => "ALT R",
    AltL => "ALT L",
    AltGr => "ALT GR",
    Backspace => "BACKSPACE",
    CapsLock => "CAPS LOCK",
    Cmd => "CMD",
    CmdL => "CMD L",
    CmdR => "CMD R",
    Delete => "DEL",
    Down => "DOWN",
    End => "END",
    Enter => "ENTER",
    Esc => "ESC",
    F1 => "F1",
    F2 => "F2",
    F3 => "F3",
    F4 => "F4",
    F5 => "F5",
    F6 => "F6",
    F7 => "F7",
    F8 => "F8",
    F9 => "F9",
    F10 => "F10",
    F11 => "F11",
    F12 => "F12",
    F13 => "F13",
    F14 => "F14",
    F15 => "F15",
    F16 => "F16",
    F17 => "F17",
    F18 => "F18",
    F19 => "F19",
    F20 => "F20",
    Home => "HOME",
    PageDown => "PAGE DOWN",
    PageUp => "PAGE UP",
    Right => "RIGHT",
    Shift => "SHIFT",
    ShiftL => "SHIFT L",
    ShiftR => "SHIFT R",
    Space => "SPACE",
    Tab => "TAB",
    Up => "UP",
    MediaPlayPause => "PLAY/PAUSE",
    MediaVolumeMute => "MUTE",
    MediaVolumeDown => "VOL DOWN",
    MediaVolumeUp => "VOL UP",
    MediaPrevious => "PRE MEDIA",
    MediaNext => "NEXT MEDIA",
    Insert => "INSERT",
    Menu => "MENU",
    NumLock => "NUM LOCK",
    Pause => "PAUSE",
    ScrollLock => "SCROLL LOCK",
    Ctrl => "CTRL",
    CtrlL => "CTRL L",
    CtrlR => "CTRL R",
    Left => "LEFT",
}

impl SpecialKey {
    /// Whether a keyboard hook on `platform` reports this key.
    ///
    /// Windows reports sided modifiers (`CTRL L`), other platforms fold the
    /// left modifier into the generic name (`CTRL`). Right Option on macOS is
    /// `ALT R`; elsewhere the right Alt is `ALT GR`. F13-F20, media keys and
    /// `MENU` only arrive as Windows virtual-key codes.
    pub fn available_on(self, platform: Platform) -> bool {
        let windows = platform == Platform::Windows;
        match self {
            Self::Ctrl | Self::Shift | Self::Alt | Self::Cmd => !windows,
            Self::CtrlL | Self::ShiftL | Self::AltL | Self::CmdL => windows,
            Self::AltR => platform == Platform::MacOs,
            Self::AltGr => platform != Platform::MacOs,
            Self::F13
            | Self::F14
            | Self::F15
            | Self::F16
            | Self::F17
            | Self::F18
            | Self::F19
            | Self::F20
            | Self::MediaPlayPause
            | Self::MediaVolumeMute
            | Self::MediaVolumeDown
            | Self::MediaVolumeUp
            | Self::MediaPrevious
            | Self::MediaNext
            | Self::Menu => windows,
            _ => true,
        }
    }
}

/// Windows virtual-key codes of the numeric keypad digits.
pub(crate) const NUMPAD_KEYS: &[(u32, &str)] = &[
    (96, "NUM 0"),
    (97, "NUM 1"),
    (98, "NUM 2"),
    (99, "NUM 3"),
    (100, "NUM 4"),
    (101, "NUM 5"),
    (102, "NUM 6"),
    (103, "NUM 7"),
    (104, "NUM 8"),
    (105, "NUM 9"),
];

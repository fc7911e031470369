/// Operating system family, as far as key naming cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// Microsoft Windows.
    Windows,
    /// Apple macOS.
    MacOs,
    /// Linux and other Unix desktops.
    Linux,
    /// Anything else.
    Other,
}

impl Platform {
    /// The platform this binary was built for.
    pub fn current() -> Self {
        if cfg!(windows) {
            Self::Windows
        } else if cfg!(target_os = "macos") {
            Self::MacOs
        } else if cfg!(target_os = "linux") {
            Self::Linux
        } else {
            Self::Other
        }
    }

    /// Whether keypad digits are reported as raw virtual-key codes here.
    pub fn reports_numpad_codes(self) -> bool {
        matches!(self, Self::Windows)
    }
}

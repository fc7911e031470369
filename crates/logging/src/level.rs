use std::fmt;

/// Verbosity scale persisted in configuration files as an integer 0..5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum LogLevel {
    /// 0
    Debug,
    /// 1
    Info,
    /// 2
    Warning,
    /// 3
    Error,
    /// 4; tracing has no separate level, so it filters like `Error`.
    Critical,
    /// 5; no output at all.
    #[default]
    Disabled,
}

impl LogLevel {
    /// The on-disk integer.
    pub fn as_i64(self) -> i64 {
        match self {
            Self::Debug => 0,
            Self::Info => 1,
            Self::Warning => 2,
            Self::Error => 3,
            Self::Critical => 4,
            Self::Disabled => 5,
        }
    }

    /// Directive level used in `EnvFilter` specs.
    pub fn directive(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warning => "warn",
            Self::Error | Self::Critical => "error",
            Self::Disabled => "off",
        }
    }
}

impl TryFrom<i64> for LogLevel {
    type Error = i64;

    fn try_from(value: i64) -> Result<Self, i64> {
        Ok(match value {
            0 => Self::Debug,
            1 => Self::Info,
            2 => Self::Warning,
            3 => Self::Error,
            4 => Self::Critical,
            5 => Self::Disabled,
            other => return Err(other),
        })
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
            Self::Critical => "CRITICAL",
            Self::Disabled => "DISABLED",
        };
        f.write_str(s)
    }
}

use crate::SpecialKey;

/// A key as reported by an input backend, before naming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RawKey {
    /// A key that produced a character.
    Char(char),
    /// A non-printable key from the canonical table.
    Special(SpecialKey),
    /// A key only known by its raw virtual-key code.
    Virtual(u32),
}

impl From<SpecialKey> for RawKey {
    fn from(key: SpecialKey) -> Self {
        Self::Special(key)
    }
}

impl From<char> for RawKey {
    fn from(c: char) -> Self {
        Self::Char(c)
    }
}

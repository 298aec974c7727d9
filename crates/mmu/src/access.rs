use core::{fmt, str::FromStr};

/// The kind of memory access being translated or allocated for.
///
/// The discriminants match the framework's `RW_READ`/`RW_WRITE` bit encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Access {
    Read = 1,
    Write = 2,
    ReadWrite = 3,
}

impl Access {
    /// Decodes the framework's bit encoding.
    pub const fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            1 => Some(Self::Read),
            2 => Some(Self::Write),
            3 => Some(Self::ReadWrite),
            _ => None,
        }
    }

    pub const fn to_raw(self) -> u32 {
        self as u32
    }

    /// Returns whether the access may modify the page.
    ///
    /// Write-only pages are treated as read-write; protection in this simulator only
    /// distinguishes writable from read-only.
    pub const fn is_write(self) -> bool {
        matches!(self, Self::Write | Self::ReadWrite)
    }
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Read => "r",
            Self::Write => "w",
            Self::ReadWrite => "rw",
        })
    }
}

/// Error returned when parsing an [`Access`] fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseAccessError;

impl fmt::Display for ParseAccessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("access must be one of r, w, rw")
    }
}

impl core::error::Error for ParseAccessError {}

impl FromStr for Access {
    type Err = ParseAccessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "r" => Ok(Self::Read),
            "w" => Ok(Self::Write),
            "rw" | "wr" => Ok(Self::ReadWrite),
            _ => Err(ParseAccessError),
        }
    }
}

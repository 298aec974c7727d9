//! Trace file commands.
//!
//! A trace holds one command per line. Blank lines and everything after a `#` are
//! ignored. Page numbers are decimal or `0x`-prefixed hexadecimal.

use std::fmt;

use mmu::{Access, PageNumber, Pid};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// `alloc <vpn> <r|w|rw>`
    Alloc { vpn: PageNumber, access: Access },
    /// `free <vpn>`
    Free { vpn: PageNumber },
    /// `read <vpn>` / `write <vpn>`
    Access { vpn: PageNumber, access: Access },
    /// `switch <pid>`
    Switch { pid: Pid },
    /// `show`: dump the current page table.
    Show,
    /// `pages`: dump the mapcounts of frames in use.
    Pages,
    /// `tlb`: dump the valid TLB slots.
    Tlb,
    /// `stats`: dump the MMU counters.
    Stats,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    UnknownCommand(String),
    MissingArgument(&'static str),
    InvalidNumber(String),
    InvalidAccess(String),
    UnexpectedArgument(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownCommand(name) => write!(f, "unknown command `{}`", name),
            Self::MissingArgument(what) => write!(f, "missing {}", what),
            Self::InvalidNumber(text) => write!(f, "`{}` is not a number", text),
            Self::InvalidAccess(text) => {
                write!(f, "`{}` is not an access mode (r, w, rw)", text)
            }
            Self::UnexpectedArgument(text) => write!(f, "unexpected argument `{}`", text),
        }
    }
}

impl std::error::Error for ParseError {}

impl Command {
    /// Parses one trace line. Returns `Ok(None)` for blank and comment-only lines.
    pub fn parse_line(line: &str) -> Result<Option<Self>, ParseError> {
        let line = match line.split_once('#') {
            Some((code, _comment)) => code,
            None => line,
        };
        let mut words = line.split_whitespace();
        let Some(name) = words.next() else {
            return Ok(None);
        };

        let command = match name {
            "alloc" => Self::Alloc {
                vpn: page(&mut words)?,
                access: access(&mut words)?,
            },
            "free" => Self::Free {
                vpn: page(&mut words)?,
            },
            "read" => Self::Access {
                vpn: page(&mut words)?,
                access: Access::Read,
            },
            "write" => Self::Access {
                vpn: page(&mut words)?,
                access: Access::Write,
            },
            "switch" => Self::Switch {
                pid: Pid::new(number::<u32>(
                    words.next().ok_or(ParseError::MissingArgument("pid"))?,
                )?),
            },
            "show" => Self::Show,
            "pages" => Self::Pages,
            "tlb" => Self::Tlb,
            "stats" => Self::Stats,
            other => return Err(ParseError::UnknownCommand(other.to_string())),
        };

        match words.next() {
            Some(extra) => Err(ParseError::UnexpectedArgument(extra.to_string())),
            None => Ok(Some(command)),
        }
    }
}

fn page<'a>(words: &mut impl Iterator<Item = &'a str>) -> Result<PageNumber, ParseError> {
    let text = words.next().ok_or(ParseError::MissingArgument("page number"))?;
    number::<usize>(text).map(PageNumber::new)
}

fn access<'a>(words: &mut impl Iterator<Item = &'a str>) -> Result<Access, ParseError> {
    let text = words.next().ok_or(ParseError::MissingArgument("access mode"))?;
    text.parse()
        .map_err(|_| ParseError::InvalidAccess(text.to_string()))
}

fn number<T: TryFrom<u64>>(text: &str) -> Result<T, ParseError> {
    let value = if let Some(hex) = text.strip_prefix("0x") {
        u64::from_str_radix(hex, 16).ok()
    } else {
        text.parse::<u64>().ok()
    };
    value
        .and_then(|value| T::try_from(value).ok())
        .ok_or_else(|| ParseError::InvalidNumber(text.to_string()))
}

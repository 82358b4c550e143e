//! Open modes for path-backed resources
//!
//! The vocabulary is the familiar `r`, `w`, `a` access flag plus an optional
//! `t` (text, the default) or `b` (binary) format flag.

use crate::error::Error;
use std::fmt;
use std::fs::OpenOptions;
use std::str::FromStr;

/// How a file is accessed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Access {
    /// Open an existing file for reading
    #[default]
    Read,
    /// Create or truncate, then write
    Write,
    /// Create if needed, write at the end
    Append,
}

/// Whether the stream carries text or raw bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Format {
    #[default]
    Text,
    Binary,
}

/// Mode used to open a path. Defaults to read-text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct OpenMode {
    pub access: Access,
    pub format: Format,
}

impl OpenMode {
    pub const READ_TEXT: OpenMode = OpenMode::new(Access::Read, Format::Text);
    pub const WRITE_TEXT: OpenMode = OpenMode::new(Access::Write, Format::Text);
    pub const APPEND_TEXT: OpenMode = OpenMode::new(Access::Append, Format::Text);
    pub const READ_BINARY: OpenMode = OpenMode::new(Access::Read, Format::Binary);
    pub const WRITE_BINARY: OpenMode = OpenMode::new(Access::Write, Format::Binary);
    pub const APPEND_BINARY: OpenMode = OpenMode::new(Access::Append, Format::Binary);

    pub const fn new(access: Access, format: Format) -> Self {
        Self { access, format }
    }

    pub fn is_binary(self) -> bool {
        self.format == Format::Binary
    }

    pub fn is_read(self) -> bool {
        self.access == Access::Read
    }

    /// `OpenOptions` matching this mode
    pub fn open_options(self) -> OpenOptions {
        let mut options = OpenOptions::new();
        match self.access {
            Access::Read => options.read(true),
            Access::Write => options.write(true).create(true).truncate(true),
            Access::Append => options.append(true).create(true),
        };
        options
    }
}

impl FromStr for OpenMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut access = None;
        let mut format = None;

        for c in s.chars() {
            let slot_was_empty = match c {
                'r' => access.replace(Access::Read).is_none(),
                'w' => access.replace(Access::Write).is_none(),
                'a' => access.replace(Access::Append).is_none(),
                't' => format.replace(Format::Text).is_none(),
                'b' => format.replace(Format::Binary).is_none(),
                _ => false,
            };
            if !slot_was_empty {
                return Err(Error::InvalidMode(s.to_string()));
            }
        }

        let access = access.ok_or_else(|| Error::InvalidMode(s.to_string()))?;
        Ok(OpenMode::new(access, format.unwrap_or_default()))
    }
}

impl fmt::Display for OpenMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let access = match self.access {
            Access::Read => "r",
            Access::Write => "w",
            Access::Append => "a",
        };
        let format = match self.format {
            Format::Text => "",
            Format::Binary => "b",
        };
        write!(f, "{}{}", access, format)
    }
}

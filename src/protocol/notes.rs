// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Fixed-capacity note script carried in the record's `notes` field.
//!
//! On the wire the script is a 14-byte field. Shorter scripts are NUL-terminated and padded with
//! NULs; a script that fills all 14 bytes has no terminator. The field is kept byte-for-byte so a
//! record round-trips unchanged; the playable script ends at the first NUL or non-ASCII byte.

use core::fmt;

use crate::config::NOTE_CAPACITY;

/// Reasons a string cannot become a [`NoteScript`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NoteScriptError {
    /// Script is longer than the field capacity.
    TooLong { len: usize },
    /// Script contains a non-ASCII or NUL byte at `index`.
    InvalidByte { index: usize },
}

impl fmt::Display for NoteScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoteScriptError::TooLong { len } => {
                write!(f, "note script is {} bytes, capacity is {}", len, NOTE_CAPACITY)
            }
            NoteScriptError::InvalidByte { index } => {
                write!(f, "note script has an invalid byte at index {}", index)
            }
        }
    }
}

/// Bounded note script, NUL-terminated unless it fills the field.
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct NoteScript {
    bytes: [u8; NOTE_CAPACITY],
}

impl NoteScript {
    /// Empty script.
    pub const fn empty() -> Self {
        Self {
            bytes: [0; NOTE_CAPACITY],
        }
    }

    /// Build a script, rejecting anything that does not fit or is not printable ASCII.
    pub fn new(script: &str) -> Result<Self, NoteScriptError> {
        let raw = script.as_bytes();
        if raw.len() > NOTE_CAPACITY {
            return Err(NoteScriptError::TooLong { len: raw.len() });
        }
        if let Some(index) = raw.iter().position(|&b| b == 0 || !b.is_ascii()) {
            return Err(NoteScriptError::InvalidByte { index });
        }

        let mut bytes = [0; NOTE_CAPACITY];
        bytes[..raw.len()].copy_from_slice(raw);
        Ok(Self { bytes })
    }

    /// Build a script from the longest valid prefix of `script` that fits.
    pub fn truncated(script: &str) -> Self {
        let raw = script.as_bytes();
        let len = raw
            .iter()
            .take(NOTE_CAPACITY)
            .position(|&b| b == 0 || !b.is_ascii())
            .unwrap_or(raw.len().min(NOTE_CAPACITY));

        let mut bytes = [0; NOTE_CAPACITY];
        bytes[..len].copy_from_slice(&raw[..len]);
        Self { bytes }
    }

    /// Wrap a raw wire field.
    #[inline]
    pub const fn from_wire(field: [u8; NOTE_CAPACITY]) -> Self {
        Self { bytes: field }
    }

    /// Wire encoding.
    #[inline]
    pub fn to_wire(&self) -> [u8; NOTE_CAPACITY] {
        self.bytes
    }

    /// Length of the playable script.
    pub fn len(&self) -> usize {
        self.bytes
            .iter()
            .position(|&b| b == 0 || !b.is_ascii())
            .unwrap_or(NOTE_CAPACITY)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The playable script as text.
    pub fn as_str(&self) -> &str {
        core::str::from_utf8(&self.bytes[..self.len()]).unwrap_or("")
    }
}

impl Default for NoteScript {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for NoteScript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NoteScript").field(&self.as_str()).finish()
    }
}

impl TryFrom<&str> for NoteScript {
    type Error = NoteScriptError;

    fn try_from(script: &str) -> Result<Self, Self::Error> {
        Self::new(script)
    }
}

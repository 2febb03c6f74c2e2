//! iCalendar UID re-encoding.
//!
//! Exchange stores the `GlobalObjectId` (PidLidGlobalObjectId) of a meeting
//! as raw bytes. Graph exposes the same bytes in two ways: the event's
//! `iCalUId` carries them as uppercase hexadecimal, while the binary
//! extended property carries them as standard base64. [`reencode`] converts
//! the former into the latter so both can be compared directly.
//!
//! Input is decoded strictly: odd-length strings and non-hex characters are
//! rejected with [`UidError::InvalidFormat`] instead of being truncated.

use std::fmt;
use std::str::FromStr;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use thiserror::Error;

/// Errors produced while re-encoding an identifier.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum UidError {
    /// The input is not a sequence of hexadecimal byte pairs.
    #[error("invalid identifier format: {0}")]
    InvalidFormat(#[from] hex::FromHexError),
}

/// Converts a hexadecimal identifier into standard base64.
///
/// Hex digits are accepted in either case. The empty string maps to the
/// empty string.
///
/// # Errors
///
/// Returns [`UidError::InvalidFormat`] if the input has an odd length or
/// contains a character outside `0-9`, `a-f`, `A-F`.
///
/// # Example
///
/// ```
/// use graphcal_core::uid::reencode;
///
/// assert_eq!(reencode("48656C6C6F").unwrap(), "SGVsbG8=");
/// ```
pub fn reencode(hex_id: &str) -> Result<String, UidError> {
    let bytes = hex::decode(hex_id)?;
    Ok(STANDARD.encode(bytes))
}

/// A meeting's `GlobalObjectId` in base64 form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GlobalObjectId(String);

impl GlobalObjectId {
    /// Derives the identifier from an event's hexadecimal `iCalUId`.
    pub fn from_ical_uid(ical_uid: &str) -> Result<Self, UidError> {
        reencode(ical_uid).map(Self)
    }

    /// Returns the base64 text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if this identifier matches a base64 value reported by
    /// the extended property.
    pub fn matches(&self, encoded: &str) -> bool {
        self.0 == encoded.trim()
    }

    /// Consumes the wrapper, returning the base64 text.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for GlobalObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for GlobalObjectId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for GlobalObjectId {
    type Err = UidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_ical_uid(s)
    }
}

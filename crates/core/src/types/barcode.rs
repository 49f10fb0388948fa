//! Barcode type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Barcode`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum BarcodeError {
    /// The input is empty after trimming whitespace.
    #[error("barcode cannot be empty")]
    Empty,
    /// The input is too long.
    #[error("barcode must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input contains whitespace or control characters.
    #[error("barcode contains an invalid character: {0:?}")]
    InvalidCharacter(char),
}

/// A scanned or typed product barcode.
///
/// Scanner input frequently arrives with a trailing newline or padding, so
/// parsing trims surrounding whitespace before validation. Blank input is
/// rejected rather than matched against the catalog.
///
/// ## Constraints
///
/// - Length: 1-64 characters after trimming
/// - No interior whitespace or control characters
///
/// ## Examples
///
/// ```
/// use till_core::Barcode;
///
/// assert_eq!(Barcode::parse("  8901234 \n").unwrap().as_str(), "8901234");
/// assert!(Barcode::parse("   ").is_err());
/// assert!(Barcode::parse("89 01").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Barcode(String);

impl Barcode {
    /// Maximum length of a barcode.
    pub const MAX_LENGTH: usize = 64;

    /// Parse a `Barcode` from raw input.
    ///
    /// # Errors
    ///
    /// Returns an error if the trimmed input:
    /// - Is empty
    /// - Is longer than 64 characters
    /// - Contains whitespace or control characters
    pub fn parse(s: &str) -> Result<Self, BarcodeError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(BarcodeError::Empty);
        }

        if trimmed.chars().count() > Self::MAX_LENGTH {
            return Err(BarcodeError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        if let Some(c) = trimmed
            .chars()
            .find(|c| c.is_whitespace() || c.is_control())
        {
            return Err(BarcodeError::InvalidCharacter(c));
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the barcode as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Barcode` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Barcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Barcode {
    type Err = BarcodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Barcode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

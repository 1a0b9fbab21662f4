//! Validated text types shared by the MedRec crates.

use std::str::FromStr;

/// Errors that can occur when creating validated text types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TextError {
    /// The input text was empty or contained only whitespace
    #[error("Text cannot be empty")]
    Empty,
    /// The input text exceeded the permitted number of characters
    #[error("Text exceeds maximum length of {max} characters")]
    TooLong { max: usize },
    /// The input text contained control characters
    #[error("Text cannot contain control characters")]
    ControlCharacter,
}

/// The human-facing name of a patient or doctor.
///
/// Construction trims the input, collapses runs of internal whitespace to a single space and
/// rejects empty values, control characters and names longer than [`DisplayName::MAX_CHARS`].
/// The stored value is what is shown in listings; the UHID is derived from it separately and
/// never recomputed when the name changes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DisplayName(String);

impl DisplayName {
    /// Upper bound on the number of characters (not bytes) in a display name.
    pub const MAX_CHARS: usize = 200;

    /// Creates a new `DisplayName` from the given input.
    ///
    /// # Errors
    ///
    /// - [`TextError::Empty`] if nothing but whitespace was supplied.
    /// - [`TextError::ControlCharacter`] if the input contains control characters other than
    ///   whitespace.
    /// - [`TextError::TooLong`] if the normalised name has more than [`Self::MAX_CHARS`]
    ///   characters.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let input = input.as_ref();
        if input
            .chars()
            .any(|c| c.is_control() && !c.is_whitespace())
        {
            return Err(TextError::ControlCharacter);
        }

        let normalised = input.split_whitespace().collect::<Vec<_>>().join(" ");
        if normalised.is_empty() {
            return Err(TextError::Empty);
        }
        if normalised.chars().count() > Self::MAX_CHARS {
            return Err(TextError::TooLong {
                max: Self::MAX_CHARS,
            });
        }

        Ok(Self(normalised))
    }

    /// Returns the inner string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

}

impl std::fmt::Display for DisplayName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for DisplayName {
    type Err = TextError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for DisplayName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl serde::Serialize for DisplayName {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for DisplayName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        DisplayName::new(&s).map_err(serde::de::Error::custom)
    }
}

//! Validated input newtypes.
//!
//! Raw field text from the host is parsed into these types before any
//! request leaves the client, so malformed input is caught without a
//! network round trip.

use crate::constants::{challenge, input};
use crate::error::AuthFlowError;
use serde::{Deserialize, Serialize};

/// The last four digits of a customer's phone number.
///
/// Construction goes through [`LastFour::parse`], which strips non-digit
/// characters and truncates to four digits, so a held value is always
/// exactly four ASCII digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LastFour(String);

impl LastFour {
    /// Parse raw field text into a phone fragment.
    ///
    /// Non-digit characters are stripped and anything past the fourth
    /// digit is dropped.
    ///
    /// # Errors
    ///
    /// Returns [`AuthFlowError::Validation`] if fewer than four digits
    /// remain after stripping.
    ///
    /// # Examples
    ///
    /// ```
    /// # use wholesale_portal_auth::LastFour;
    /// let fragment = LastFour::parse(" 48-21 ")?;
    /// assert_eq!(fragment.as_str(), "4821");
    ///
    /// assert!(LastFour::parse("12x").is_err());
    /// # Ok::<(), wholesale_portal_auth::AuthFlowError>(())
    /// ```
    pub fn parse(raw: &str) -> Result<Self, AuthFlowError> {
        let digits: String = raw
            .chars()
            .filter(char::is_ascii_digit)
            .take(input::LAST_FOUR_LEN)
            .collect();

        if digits.len() < input::LAST_FOUR_LEN {
            return Err(AuthFlowError::Validation(format!(
                "Expected {} phone digits",
                input::LAST_FOUR_LEN
            )));
        }

        Ok(Self(digits))
    }

    /// The fragment as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for LastFour {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A six-digit one-time verification code.
///
/// Construction goes through [`OneTimeCode::parse`], which strips
/// whitespace and separators, so a held value is always exactly six
/// ASCII digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OneTimeCode(String);

impl OneTimeCode {
    /// Parse raw field text into a one-time code.
    ///
    /// Non-digit characters are stripped, which tolerates codes pasted
    /// with spaces or dashes.
    ///
    /// # Errors
    ///
    /// Returns [`AuthFlowError::Validation`] unless exactly six digits
    /// remain after stripping.
    ///
    /// # Examples
    ///
    /// ```
    /// # use wholesale_portal_auth::OneTimeCode;
    /// let code = OneTimeCode::parse("123 456")?;
    /// assert_eq!(code.as_str(), "123456");
    ///
    /// assert!(OneTimeCode::parse("12345").is_err());
    /// assert!(OneTimeCode::parse("1234567").is_err());
    /// # Ok::<(), wholesale_portal_auth::AuthFlowError>(())
    /// ```
    pub fn parse(raw: &str) -> Result<Self, AuthFlowError> {
        let digits: String = raw.chars().filter(char::is_ascii_digit).collect();

        if digits.len() != challenge::CODE_LENGTH {
            return Err(AuthFlowError::Validation(format!(
                "Expected a {}-digit code",
                challenge::CODE_LENGTH
            )));
        }

        Ok(Self(digits))
    }

    /// The code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for OneTimeCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

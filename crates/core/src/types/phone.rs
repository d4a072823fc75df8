//! WhatsApp phone number type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`PhoneNumber`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PhoneNumberError {
    /// The input string is empty after trimming.
    #[error("phone number cannot be empty")]
    Empty,
    /// The input contains something other than digits and separators.
    #[error("phone number may only contain digits")]
    InvalidCharacter,
    /// Too few or too many digits.
    #[error("phone number must have between {min} and {max} digits")]
    InvalidLength {
        /// Minimum allowed digit count.
        min: usize,
        /// Maximum allowed digit count.
        max: usize,
    },
}

/// A customer phone number as the WhatsApp bot stores it.
///
/// Numbers are kept as bare digit strings in international form
/// (`6281234567890`). Parsing trims whitespace and strips spaces, dashes and
/// a single leading `+`, so `+62 812-3456-7890` and `6281234567890` compare
/// equal.
///
/// ## Constraints
///
/// - 8-15 digits (E.164 upper bound)
/// - Only ASCII digits after separators are removed
///
/// ## Examples
///
/// ```
/// use cs_console_core::PhoneNumber;
///
/// assert_eq!(PhoneNumber::parse("+62 812-3456-7890").unwrap().as_str(), "6281234567890");
/// assert!(PhoneNumber::parse("").is_err());
/// assert!(PhoneNumber::parse("0812abc").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Minimum number of digits.
    pub const MIN_DIGITS: usize = 8;
    /// Maximum number of digits (E.164).
    pub const MAX_DIGITS: usize = 15;

    /// Parse and normalize a `PhoneNumber`.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, contains non-digit characters
    /// other than spaces, dashes and a leading `+`, or has the wrong length.
    pub fn parse(s: &str) -> Result<Self, PhoneNumberError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(PhoneNumberError::Empty);
        }

        let body = trimmed.strip_prefix('+').unwrap_or(trimmed);
        let mut digits = String::with_capacity(body.len());
        for c in body.chars() {
            match c {
                '0'..='9' => digits.push(c),
                ' ' | '-' => {}
                _ => return Err(PhoneNumberError::InvalidCharacter),
            }
        }

        if !(Self::MIN_DIGITS..=Self::MAX_DIGITS).contains(&digits.len()) {
            return Err(PhoneNumberError::InvalidLength {
                min: Self::MIN_DIGITS,
                max: Self::MAX_DIGITS,
            });
        }

        Ok(Self(digits))
    }

    /// Returns the digits as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `PhoneNumber` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for PhoneNumber {
    type Err = PhoneNumberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for PhoneNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for PhoneNumber {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for PhoneNumber {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        // The bot writes these rows too; keep whatever it stored
        Ok(Self(s))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for PhoneNumber {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_digits() {
        let phone = PhoneNumber::parse("6281234567890").unwrap();
        assert_eq!(phone.as_str(), "6281234567890");
    }

    #[test]
    fn test_parse_strips_separators_and_plus() {
        let phone = PhoneNumber::parse("  +62 812-3456-7890 ").unwrap();
        assert_eq!(phone.as_str(), "6281234567890");
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(PhoneNumber::parse("   "), Err(PhoneNumberError::Empty));
    }

    #[test]
    fn test_parse_rejects_letters() {
        assert_eq!(
            PhoneNumber::parse("0812abcd99"),
            Err(PhoneNumberError::InvalidCharacter)
        );
    }

    #[test]
    fn test_parse_rejects_inner_plus() {
        assert_eq!(
            PhoneNumber::parse("62+81234567"),
            Err(PhoneNumberError::InvalidCharacter)
        );
    }

    #[test]
    fn test_parse_length_bounds() {
        assert!(PhoneNumber::parse("1234567").is_err());
        assert!(PhoneNumber::parse("12345678").is_ok());
        assert!(PhoneNumber::parse("123456789012345").is_ok());
        assert!(matches!(
            PhoneNumber::parse("1234567890123456"),
            Err(PhoneNumberError::InvalidLength { min: 8, max: 15 })
        ));
    }

    #[test]
    fn test_equivalent_inputs_compare_equal() {
        let a = PhoneNumber::parse("+62 812 3456 7890").unwrap();
        let b: PhoneNumber = "6281234567890".parse().unwrap();
        assert_eq!(a, b);
    }
}

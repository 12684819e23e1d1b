use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AddressError {
    #[error("{0}")]
    Invalid(#[from] email_address::Error),
    #[error("address is not in canonical form (expected '{0}')")]
    NonCanonical(String),
}

/// A single mailbox address in `local@domain` form.
///
/// Syntax checking (RFC 5322 with the RFC 6531 UTF-8 extensions) is delegated
/// to `email_address`. Inbound requests are held to the stricter rule that the
/// text must already be the mailbox's canonical `local@domain` rendering.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Parses `input` and requires it to equal its own canonical form.
    ///
    /// # Errors
    /// Returns `AddressError::Invalid` for syntax errors and
    /// `AddressError::NonCanonical` when `input` parses but carries a display
    /// name or other decoration.
    pub fn parse_canonical(input: &str) -> Result<Self, AddressError> {
        let parsed = email_address::EmailAddress::from_str(input)?;
        let canonical = parsed.email();
        if canonical != input {
            return Err(AddressError::NonCanonical(canonical));
        }
        Ok(Self(canonical))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for EmailAddress {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_canonical(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_addresses_are_canonical() {
        for input in ["user1@test.com", "first.last@example.org", "a+tag@sub.domain.io", "root@localhost"] {
            let parsed: EmailAddress = input.parse().expect(input);
            assert_eq!(parsed.as_str(), input);
        }
    }

    #[test]
    fn test_unicode_local_part_and_domain() {
        for input in ["a@例子.com", "用户@x.com", "jöhn@x.com"] {
            let parsed: EmailAddress = input.parse().expect(input);
            assert_eq!(parsed.to_string(), input);
        }
    }

    #[test]
    fn test_angle_brackets_inside_quoted_local_part() {
        for input in ["\"a<b\"@x.com", "\"a>b\"@x.com", "\"john doe\"@x.com"] {
            let parsed: EmailAddress = input.parse().expect(input);
            assert_eq!(parsed.as_str(), input);
        }
    }

    #[test]
    fn test_rejects_malformed_addresses() {
        for input in ["", "not-an-email", "@test.com", "a@", "a..b@test.com", "a@x.com, b@x.com"] {
            assert!(
                matches!(input.parse::<EmailAddress>(), Err(AddressError::Invalid(_))),
                "{input:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_rejects_display_name_wrapping() {
        let err = "Jane <jane@test.com>".parse::<EmailAddress>().unwrap_err();
        assert!(matches!(err, AddressError::NonCanonical(ref canonical) if canonical == "jane@test.com"));
    }

    #[test]
    fn test_rejects_surrounding_whitespace() {
        assert!(" jane@test.com".parse::<EmailAddress>().is_err());
        assert!("jane@test.com ".parse::<EmailAddress>().is_err());
    }

    #[test]
    fn test_rejects_overlong_local_part() {
        let input = format!("{}@test.com", "a".repeat(65));
        assert!(matches!(input.parse::<EmailAddress>(), Err(AddressError::Invalid(_))));
    }
}

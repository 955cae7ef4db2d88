use std::fmt;
use std::str::FromStr;

use regex::Regex;

use serde::Serialize;

/// A Chilean mobile phone number.
///
/// Canonical form is always `9` followed by 8 digits; the `56`/`+56`
/// country prefix is stripped before storage.
#[derive(Debug, PartialEq, Eq, Clone, Serialize)]
pub struct PhoneNumber(String);

impl FromStr for PhoneNumber {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        lazy_static::lazy_static! {
            static ref PHONE_REGEX: Regex = Regex::new(r"^(\+?56)?(9\d{8})$").unwrap();
        }

        let value: String = value
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-')
            .collect();

        let captures = PHONE_REGEX
            .captures(&value)
            .ok_or_else(|| "Phone must be a 9-digit mobile number, optionally prefixed with +56".to_string())?;

        Ok(Self(captures[2].to_string()))
    }
}

impl AsRef<str> for PhoneNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

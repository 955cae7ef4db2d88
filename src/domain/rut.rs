use std::fmt;
use std::str::FromStr;

use regex::Regex;

use serde::Serialize;

const MIN_LEN: usize = 7;
const MAX_LEN: usize = 12;

/// A user supplied RUT in canonical form (internal spaces removed).
///
/// Validation is purely syntactic: dots and the check digit are kept as
/// entered, and the check-digit algorithm is not verified.
#[derive(Debug, PartialEq, Eq, Clone, Serialize)]
pub struct Rut(String);

impl FromStr for Rut {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        lazy_static::lazy_static! {
            static ref RUT_REGEX: Regex = Regex::new(r"^[0-9\.\-kK]+$").unwrap();
        }

        let value: String = value.chars().filter(|c| !c.is_whitespace()).collect();

        let len = value.chars().count();
        if len < MIN_LEN || len > MAX_LEN {
            return Err("RUT must be between 7 and 12 characters".into());
        }
        if !RUT_REGEX.is_match(&value) {
            return Err("RUT may only contain digits, dots, a hyphen and K".into());
        }

        Ok(Self(value))
    }
}

impl AsRef<str> for Rut {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Rut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

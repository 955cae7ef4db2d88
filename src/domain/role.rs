use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Staff role, stored by value on the account record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text")]
pub enum Role {
    Administrator,
    Seller,
}

impl Role {
    /// May mutate requests, manage accounts and run deduplication
    pub fn is_administrator(&self) -> bool {
        matches!(self, Self::Administrator)
    }

    /// May read and search requests only
    pub fn is_seller(&self) -> bool {
        matches!(self, Self::Seller)
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "Administrator" => Ok(Self::Administrator),
            "Seller" => Ok(Self::Seller),
            other => Err(format!(
                "\"{}\" is not a valid role (expected Administrator or Seller)",
                other
            )),
        }
    }
}

impl AsRef<str> for Role {
    fn as_ref(&self) -> &str {
        match self {
            Self::Administrator => "Administrator",
            Self::Seller => "Seller",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_ref().fmt(f)
    }
}

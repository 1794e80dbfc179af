use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// A registered account.
///
/// Accounts are append-only rows in the user table. There is no duplicate
/// prevention at registration time: two rows may share a username, and
/// credential lookup returns the first row that matches. Passwords are stored
/// and compared as plaintext. Both gaps are inherited from the on-disk format
/// and documented here rather than silently fixed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Account name used to log in.
    pub username: String,
    /// Plaintext password.
    pub password: String,
    /// Role fixed at registration.
    pub role: Role,
}

/// What an account is allowed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    /// Submits book donations.
    Donor,
    /// Submits book requests and views matches.
    Receiver,
    /// Browses all tables and aggregate counts.
    Admin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Donor => "Donor",
            Self::Receiver => "Receiver",
            Self::Admin => "Admin",
        };
        f.write_str(name)
    }
}

/// The string was not a recognised role name.
#[derive(Debug, thiserror::Error)]
#[error("unknown role '{0}' (expected Donor, Receiver or Admin)")]
pub struct ParseRoleError(String);

impl FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "donor" => Ok(Self::Donor),
            "receiver" => Ok(Self::Receiver),
            "admin" => Ok(Self::Admin),
            _ => Err(ParseRoleError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parses_case_insensitively() {
        assert_eq!("donor".parse::<Role>().unwrap(), Role::Donor);
        assert_eq!("Receiver".parse::<Role>().unwrap(), Role::Receiver);
        assert_eq!("ADMIN".parse::<Role>().unwrap(), Role::Admin);
    }

    #[test]
    fn unknown_role_is_an_error() {
        assert!("librarian".parse::<Role>().is_err());
    }

    #[test]
    fn role_displays_capitalised() {
        assert_eq!(Role::Donor.to_string(), "Donor");
        assert_eq!(Role::Admin.to_string(), "Admin");
    }
}

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// A book offered by a donor.
///
/// Immutable once appended. Field order is the on-disk column order of the
/// donation table. All free-text fields are stored as entered; coordinates
/// are whatever the geocoder returned at submission time (empty fields when
/// the lookup produced nothing).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Donation {
    /// Username of the donor who submitted the record.
    pub owner: String,
    /// Book title.
    pub book: String,
    /// Subject the book covers, matched fuzzily against requests.
    pub subject: String,
    /// School grade (1–12), stored as text and compared for exact equality.
    pub grade: String,
    /// Physical condition of the book.
    pub condition: Condition,
    /// Free-text city, compared after trimming and lowercasing.
    pub city: String,
    /// Contact email.
    pub email: String,
    /// Path to the uploaded book image relative to the data root, or empty.
    pub image: String,
    /// Latitude from geocoding the city, if any.
    pub latitude: Option<f64>,
    /// Longitude from geocoding the city, if any.
    pub longitude: Option<f64>,
}

/// Physical condition of a donated book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Condition {
    /// Unused.
    New,
    /// Used but intact.
    Good,
    /// Heavily used.
    Worn,
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::New => "New",
            Self::Good => "Good",
            Self::Worn => "Worn",
        };
        f.write_str(name)
    }
}

/// The string was not a recognised condition name.
#[derive(Debug, thiserror::Error)]
#[error("unknown condition '{0}' (expected New, Good or Worn)")]
pub struct ParseConditionError(String);

impl FromStr for Condition {
    type Err = ParseConditionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "new" => Ok(Self::New),
            "good" => Ok(Self::Good),
            "worn" => Ok(Self::Worn),
            _ => Err(ParseConditionError(s.to_string())),
        }
    }
}

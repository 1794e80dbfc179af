use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// A book need submitted by a receiver.
///
/// Immutable once appended. Field order is the on-disk column order of the
/// request table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookRequest {
    /// Username of the receiver who submitted the record.
    pub owner: String,
    /// Subject needed, matched fuzzily against donations.
    pub subject: String,
    /// School grade (1–12), stored as text and compared for exact equality.
    pub grade: String,
    /// Free-text city, compared after trimming and lowercasing.
    pub city: String,
    /// How urgently the book is needed.
    pub urgency: Urgency,
    /// Contact email.
    pub email: String,
    /// Latitude from geocoding the city, if any.
    pub latitude: Option<f64>,
    /// Longitude from geocoding the city, if any.
    pub longitude: Option<f64>,
}

/// How urgently a requested book is needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Urgency {
    /// Whenever a copy turns up.
    Low,
    /// Needed this term.
    Medium,
    /// Needed now.
    High,
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        };
        f.write_str(name)
    }
}

/// The string was not a recognised urgency name.
#[derive(Debug, thiserror::Error)]
#[error("unknown urgency '{0}' (expected Low, Medium or High)")]
pub struct ParseUrgencyError(String);

impl FromStr for Urgency {
    type Err = ParseUrgencyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(ParseUrgencyError(s.to_string())),
        }
    }
}

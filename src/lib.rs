//! Book donation matching
//!
//! Donations, requests and user accounts are rows in headerless CSV tables
//! under a data root. Requests are matched against donations on exact grade
//! and normalized city, with a fuzzy token-sort score over subject names.

pub mod domain;
pub use domain::{BookRequest, Condition, Config, Donation, Role, Urgency, User};

/// Plaintext credential checks and the per-interaction session state.
pub mod auth;
pub use auth::Session;

/// Best-effort city geocoding against a Nominatim-style endpoint.
pub mod geo;
pub use geo::{Coordinates, Geocoder};

/// Request/donation matching.
pub mod matching;
pub use matching::Match;

/// Flat-file storage for users, donations and requests.
pub mod storage;
pub use storage::Store;

//! Domain types: user accounts, donation and request records, configuration.

mod config;
pub use config::Config;

mod donation;
pub use donation::{Condition, Donation};

mod request;
pub use request::{BookRequest, Urgency};

mod user;
pub use user::{Role, User};

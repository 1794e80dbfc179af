use std::path::Path;

use serde::{Deserialize, Serialize};

/// Tool configuration.
///
/// Stored as a versioned TOML file under the data root. Controls the
/// geocoding endpoint and the similarity threshold used when matching
/// requests against donations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct Config {
    /// URL of the Nominatim-style search endpoint used to geocode cities.
    geocoder_endpoint: String,

    /// User-agent string sent with geocoding requests.
    ///
    /// Public Nominatim instances require an identifying user agent.
    geocoder_user_agent: String,

    /// Minimum subject similarity for a match, exclusive, on a 0–100 scale.
    ///
    /// A request/donation pair is kept only when its token-sort score is
    /// strictly greater than this value.
    match_threshold: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            geocoder_endpoint: default_geocoder_endpoint(),
            geocoder_user_agent: default_geocoder_user_agent(),
            match_threshold: default_match_threshold(),
        }
    }
}

impl Config {
    /// Loads the configuration from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the TOML content is
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {e}"))?;
        toml::from_str(&content).map_err(|e| format!("Failed to parse config file: {e}"))
    }

    /// Saves the configuration to a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized to TOML or
    /// if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), String> {
        let content =
            toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize config: {e}"))?;
        std::fs::write(path, content).map_err(|e| format!("Failed to write config file: {e}"))
    }

    /// Returns the geocoding endpoint URL.
    #[must_use]
    pub fn geocoder_endpoint(&self) -> &str {
        &self.geocoder_endpoint
    }

    /// Returns the user-agent string sent with geocoding requests.
    #[must_use]
    pub fn geocoder_user_agent(&self) -> &str {
        &self.geocoder_user_agent
    }

    /// Returns the match threshold (exclusive, 0–100).
    #[must_use]
    pub const fn match_threshold(&self) -> u8 {
        self.match_threshold
    }

    /// Sets the geocoding endpoint URL.
    pub fn set_geocoder_endpoint(&mut self, endpoint: String) {
        self.geocoder_endpoint = endpoint;
    }

    /// Sets the user-agent string sent with geocoding requests.
    pub fn set_geocoder_user_agent(&mut self, user_agent: String) {
        self.geocoder_user_agent = user_agent;
    }

    /// Sets the match threshold.
    pub const fn set_match_threshold(&mut self, threshold: u8) {
        self.match_threshold = threshold;
    }
}

fn default_geocoder_endpoint() -> String {
    "https://nominatim.openstreetmap.org/search".to_string()
}

fn default_geocoder_user_agent() -> String {
    "bookbridge".to_string()
}

const fn default_match_threshold() -> u8 {
    80
}

/// The serialized versions of the configuration.
/// This allows for future changes to the configuration format and to the
/// domain type without breaking compatibility.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default = "default_geocoder_endpoint")]
        geocoder_endpoint: String,

        #[serde(default = "default_geocoder_user_agent")]
        geocoder_user_agent: String,

        #[serde(default = "default_match_threshold")]
        match_threshold: u8,
    },
}

impl From<Versions> for Config {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 {
                geocoder_endpoint,
                geocoder_user_agent,
                match_threshold,
            } => Self {
                geocoder_endpoint,
                geocoder_user_agent,
                match_threshold,
            },
        }
    }
}

impl From<Config> for Versions {
    fn from(config: Config) -> Self {
        Self::V1 {
            geocoder_endpoint: config.geocoder_endpoint,
            geocoder_user_agent: config.geocoder_user_agent,
            match_threshold: config.match_threshold,
        }
    }
}

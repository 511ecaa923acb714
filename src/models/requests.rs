use serde::{Deserialize, Serialize};
use validator::Validate;

/// Query string for the nearby search endpoint
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NearbySearchRequest {
    /// Postal code (optionally `<code>,<radius>`) or free text
    #[validate(length(min = 1, max = 64))]
    pub q: String,
    /// Explicit radius in miles; wins over an inline radius.
    /// Malformed values fall back to the default radius.
    #[serde(default)]
    pub radius: Option<String>,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default, alias = "per_page", rename = "perPage")]
    pub per_page: Option<u32>,
}

/// Query string for the directory listing endpoint
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DirectoryRequest {
    #[validate(length(max = 64))]
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default, alias = "per_page", rename = "perPage")]
    pub per_page: Option<u32>,
}

fn default_page() -> u32 {
    1
}

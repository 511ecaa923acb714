use serde::{Deserialize, Serialize};
use crate::models::domain::{ChannelHit, Coordinate, GeoCode, MatchKind};
use crate::services::CacheStats;

/// Pagination block attached to list responses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    pub page: u32,
    #[serde(rename = "perPage")]
    pub per_page: u32,
    pub total: usize,
    #[serde(rename = "totalPages")]
    pub total_pages: u32,
}

/// Which search strategy produced the results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    Proximity,
    Text,
}

/// Response for the nearby search and directory endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelSearchResponse {
    pub mode: SearchMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub center: Option<Coordinate>,
    #[serde(rename = "matchKind", skip_serializing_if = "Option::is_none")]
    pub match_kind: Option<MatchKind>,
    #[serde(rename = "placeName", skip_serializing_if = "Option::is_none")]
    pub place_name: Option<String>,
    #[serde(rename = "radiusMiles", skip_serializing_if = "Option::is_none")]
    pub radius_miles: Option<f64>,
    pub results: Vec<ChannelHit>,
    pub pagination: PageInfo,
}

/// Response for the geocode endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodeResponse {
    #[serde(flatten)]
    pub geocode: GeoCode,
    #[serde(rename = "matchKind")]
    pub match_kind: MatchKind,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub cache: CacheStats,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

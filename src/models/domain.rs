use serde::{Deserialize, Deserializer, Serialize};

/// A latitude/longitude pair in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Build a coordinate only when both parts are finite and on the globe
    pub fn checked(latitude: f64, longitude: f64) -> Option<Self> {
        let valid = latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude);

        valid.then(|| Self::new(latitude, longitude))
    }
}

/// Postal code geocode row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoCode {
    #[serde(rename = "postalCode")]
    pub postal_code: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(rename = "placeName")]
    pub place_name: String,
    #[serde(rename = "regionName")]
    pub region_name: String,
}

impl GeoCode {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }
}

/// How a postal code was resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchKind {
    /// The code itself is in the geocode table
    Exact,
    /// Another code sharing the prefix stood in for it
    Approximate,
}

/// A channel from the ION directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(rename = "cityName", default)]
    pub city_name: Option<String>,
    #[serde(rename = "stateName", default)]
    pub state_name: Option<String>,
    #[serde(default)]
    pub population: Option<i64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(rename = "customDomain", default)]
    pub custom_domain: Option<String>,
    #[serde(default, deserialize_with = "lenient_coordinate")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "lenient_coordinate")]
    pub longitude: Option<f64>,
}

impl Channel {
    /// Both coordinates, if present and valid
    pub fn coordinate(&self) -> Option<Coordinate> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Coordinate::checked(lat, lon),
            _ => None,
        }
    }
}

/// Channel as returned by a search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelHit {
    #[serde(flatten)]
    pub channel: Channel,
    #[serde(rename = "distanceMiles", skip_serializing_if = "Option::is_none", default)]
    pub distance_miles: Option<f64>,
    #[serde(default)]
    pub boosted: bool,
}

impl From<Channel> for ChannelHit {
    fn from(channel: Channel) -> Self {
        Self {
            channel,
            distance_miles: None,
            boosted: false,
        }
    }
}

/// Number of channels per status value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCount {
    pub status: String,
    pub count: i64,
}

/// Geospatial bounding box
#[derive(Debug, Clone, Copy)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

/// Parse a stored coordinate string, treating blanks and junk as absent
pub fn parse_coordinate(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawCoordinate {
    Number(f64),
    Text(String),
    Other(serde::de::IgnoredAny),
}

/// Accept numbers, numeric strings, empty strings and null
fn lenient_coordinate<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawCoordinate>::deserialize(deserializer)?;

    Ok(match raw {
        Some(RawCoordinate::Number(v)) if v.is_finite() => Some(v),
        Some(RawCoordinate::Text(s)) => parse_coordinate(&s),
        _ => None,
    })
}

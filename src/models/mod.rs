// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{BoundingBox, Channel, ChannelHit, Coordinate, GeoCode, MatchKind, StatusCount, parse_coordinate};
pub use requests::{DirectoryRequest, NearbySearchRequest};
pub use responses::{ChannelSearchResponse, ErrorResponse, GeocodeResponse, HealthResponse, PageInfo, SearchMode};

// Core algorithm exports
pub mod distance;
pub mod filters;
pub mod geolookup;
pub mod locator;
pub mod pagination;
pub mod policy;
pub mod query;

pub use distance::{haversine_miles, distance_between, calculate_bounding_box, is_within_bounding_box, EARTH_RADIUS_MILES};
pub use filters::{DistanceFilter, Locatable, Ranked};
pub use geolookup::{GeoLookup, Resolution};
pub use locator::{ChannelLocator, LocatorError, SearchOutcome};
pub use pagination::{paginate, Page};
pub use policy::{PlaceOverride, SearchPolicy};
pub use query::{parse_search_input, PostalQuery, SearchInput};

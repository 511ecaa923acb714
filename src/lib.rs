//! ION Locator - postal-code proximity search for the ION channel directory
//!
//! This library resolves a postal code (exactly, or by prefix) to a point and
//! returns the channels within a radius of it, nearest first. Input that is
//! not a postal code, or a code that cannot be resolved, becomes a text search.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{ChannelLocator, SearchOutcome, SearchPolicy, distance::{haversine_miles, calculate_bounding_box}};
pub use models::{Channel, ChannelHit, Coordinate, GeoCode, MatchKind};

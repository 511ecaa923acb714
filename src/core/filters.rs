use std::cmp::Ordering;
use crate::models::{Channel, ChannelHit, Coordinate};
use super::distance::{calculate_bounding_box, distance_between, is_within_bounding_box, round_tenth};

/// A record that may carry a position
pub trait Locatable {
    /// Both coordinates, or `None` when either is absent or invalid
    fn coordinate(&self) -> Option<Coordinate>;

    fn display_name(&self) -> &str;

    /// Whether this record is named after `place`
    fn is_named(&self, place: &str) -> bool {
        names_match(self.display_name(), place)
    }
}

impl Locatable for Channel {
    fn coordinate(&self) -> Option<Coordinate> {
        Channel::coordinate(self)
    }

    fn display_name(&self) -> &str {
        &self.name
    }

    fn is_named(&self, place: &str) -> bool {
        names_match(&self.name, place)
            || self.city_name.as_deref().is_some_and(|city| names_match(city, place))
    }
}

#[inline]
fn names_match(name: &str, place: &str) -> bool {
    let place = place.trim();
    !place.is_empty() && name.trim().to_lowercase() == place.to_lowercase()
}

/// A record kept by [`DistanceFilter`]
#[derive(Debug, Clone, PartialEq)]
pub struct Ranked<T> {
    pub item: T,
    /// Distance from the center in miles, rounded to one decimal
    pub distance_miles: f64,
    /// Moved ahead of closer records by the named-place boost
    pub boosted: bool,
}

impl From<Ranked<Channel>> for ChannelHit {
    fn from(ranked: Ranked<Channel>) -> Self {
        Self {
            channel: ranked.item,
            distance_miles: Some(ranked.distance_miles),
            boosted: ranked.boosted,
        }
    }
}

/// Keeps records within a radius of a center, nearest first
///
/// # Pipeline Stages
/// 1. Drop records without a usable coordinate
/// 2. Bounding box pre-filter
/// 3. Haversine distance, keep `distance <= radius`
/// 4. Order by distance, optionally boosting records named after the
///    expected place to the front
///
/// The boost is a display heuristic: a channel for the searched town
/// outranks a slightly closer neighbour.
#[derive(Debug, Clone, Default)]
pub struct DistanceFilter {
    expected_place: Option<String>,
}

impl DistanceFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_expected_place(mut self, place: Option<&str>) -> Self {
        self.expected_place = place
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string);
        self
    }

    pub fn filter<T, I>(&self, center: Coordinate, candidates: I, radius_miles: f64) -> Vec<Ranked<T>>
    where
        T: Locatable,
        I: IntoIterator<Item = T>,
    {
        let bbox = calculate_bounding_box(center, radius_miles);

        let mut kept: Vec<(f64, bool, T)> = candidates
            .into_iter()
            // Stage 1: coordinates must be present before any distance math
            .filter_map(|item| item.coordinate().map(|point| (point, item)))
            // Stage 2: bounding box pre-filter
            .filter(|(point, _)| is_within_bounding_box(*point, &bbox))
            // Stage 3: exact distance
            .filter_map(|(point, item)| {
                let distance = distance_between(center, point);
                (distance <= radius_miles).then_some((distance, item))
            })
            .map(|(distance, item)| {
                let boosted = self
                    .expected_place
                    .as_deref()
                    .is_some_and(|place| item.is_named(place));
                (distance, boosted, item)
            })
            .collect();

        // Stage 4: boosted first, then nearest first
        kept.sort_by(|a, b| {
            b.1.cmp(&a.1)
                .then_with(|| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal))
        });

        kept.into_iter()
            .map(|(distance, boosted, item)| Ranked {
                item,
                distance_miles: round_tenth(distance),
                boosted,
            })
            .collect()
    }
}

use geo::{coord, Intersects, Rect};
use crate::models::{BoundingBox, Coordinate};

/// Earth's radius in miles
pub const EARTH_RADIUS_MILES: f64 = 3959.0;

/// Calculate the Haversine distance between two points in miles
///
/// # Arguments
/// * `lat1` - Latitude of first point in degrees
/// * `lon1` - Longitude of first point in degrees
/// * `lat2` - Latitude of second point in degrees
/// * `lon2` - Longitude of second point in degrees
///
/// # Returns
/// Distance in miles
#[inline]
pub fn haversine_miles(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_MILES * c
}

/// Haversine distance between two coordinates in miles
#[inline]
pub fn distance_between(from: Coordinate, to: Coordinate) -> f64 {
    haversine_miles(from.latitude, from.longitude, to.latitude, to.longitude)
}

/// Round a distance to one decimal place for display
#[inline]
pub fn round_tenth(miles: f64) -> f64 {
    (miles * 10.0).round() / 10.0
}

/// Calculate a bounding box around a center point
///
/// Cheaper than Haversine, used as a pre-filter. The box is the exact
/// latitude/longitude extent of the radius circle on the sphere, so it never
/// drops a point Haversine would keep. A circle crossing the antimeridian
/// gets the full longitude range instead of a wrapped box.
pub fn calculate_bounding_box(center: Coordinate, radius_miles: f64) -> BoundingBox {
    let angular = radius_miles.max(0.0) / EARTH_RADIUS_MILES;
    let lat_delta = angular.to_degrees();

    let min_lat = center.latitude - lat_delta;
    let max_lat = center.latitude + lat_delta;

    // A pole inside the circle, or a circle wider than the parallel, spans all longitudes
    let ratio = angular.sin() / center.latitude.to_radians().cos();
    let lon_delta = if max_lat >= 90.0 || min_lat <= -90.0 || !ratio.is_finite() || ratio >= 1.0 {
        180.0
    } else {
        ratio.asin().to_degrees()
    };

    let (min_lon, max_lon) = (center.longitude - lon_delta, center.longitude + lon_delta);
    let (min_lon, max_lon) = if min_lon < -180.0 || max_lon > 180.0 {
        (-180.0, 180.0)
    } else {
        (min_lon, max_lon)
    };

    BoundingBox {
        min_lat,
        max_lat,
        min_lon,
        max_lon,
    }
}

/// Check if a point is within a bounding box (edges inclusive)
#[inline]
pub fn is_within_bounding_box(point: Coordinate, bbox: &BoundingBox) -> bool {
    let rect = Rect::new(
        coord! { x: bbox.min_lon, y: bbox.min_lat },
        coord! { x: bbox.max_lon, y: bbox.max_lat },
    );

    rect.intersects(&coord! { x: point.longitude, y: point.latitude })
}

#[cfg(test)]
mod tests {
    use super::*;

    const MILES_PER_DEGREE: f64 = 69.0;

    const BEVERLY_HILLS: Coordinate = Coordinate { latitude: 34.0736, longitude: -118.4004 };
    const LA_CITY_HALL: Coordinate = Coordinate { latitude: 34.0522, longitude: -118.2437 };

    #[test]
    fn test_haversine_fixture() {
        let distance = distance_between(BEVERLY_HILLS, LA_CITY_HALL);
        assert!((distance - 8.0).abs() <= 1.0, "Distance should be ~8mi, got {}", distance);
    }

    #[test]
    fn test_haversine_zero_and_symmetric() {
        assert_eq!(distance_between(BEVERLY_HILLS, BEVERLY_HILLS), 0.0);
        let there = distance_between(BEVERLY_HILLS, LA_CITY_HALL);
        let back = distance_between(LA_CITY_HALL, BEVERLY_HILLS);
        assert!((there - back).abs() < 1e-9);
    }

    #[test]
    fn test_haversine_agrees_with_geo() {
        use geo::{HaversineDistance, Point};

        let ours = distance_between(BEVERLY_HILLS, Coordinate::new(40.7128, -74.0060));
        let theirs_m = Point::new(-118.4004, 34.0736)
            .haversine_distance(&Point::new(-74.0060, 40.7128));
        let theirs = theirs_m / 1609.344;

        // Different Earth radius constants; agreement within 0.1%
        assert!((ours - theirs).abs() / theirs < 0.001, "{} vs {}", ours, theirs);
    }

    #[test]
    fn test_round_tenth() {
        assert_eq!(round_tenth(7.96), 8.0);
        assert_eq!(round_tenth(7.94), 7.9);
        assert_eq!(round_tenth(0.0), 0.0);
    }

    #[test]
    fn test_bounding_box() {
        let center = Coordinate::new(40.7128, -74.0060);
        let bbox = calculate_bounding_box(center, 10.0);

        assert!(bbox.min_lat < 40.7128);
        assert!(bbox.max_lat > 40.7128);
        assert!(bbox.min_lon < -74.0060);
        assert!(bbox.max_lon > -74.0060);

        // 20mi / ~69mi per degree = ~0.29 degrees
        let lat_span = bbox.max_lat - bbox.min_lat;
        assert!((lat_span - 0.29).abs() < 0.02, "Lat span should be ~0.29 degrees");
    }

    #[test]
    fn test_point_within_bbox() {
        let center = Coordinate::new(40.7128, -74.0060);
        let bbox = calculate_bounding_box(center, 10.0);

        assert!(is_within_bounding_box(center, &bbox));
        assert!(is_within_bounding_box(Coordinate::new(40.71, -74.0), &bbox));
        assert!(!is_within_bounding_box(Coordinate::new(50.0, -80.0), &bbox));

        // Edges count as inside
        assert!(is_within_bounding_box(Coordinate::new(bbox.max_lat, bbox.max_lon), &bbox));
    }

    #[test]
    fn test_bbox_never_excludes_points_within_radius() {
        let centers = [
            Coordinate::new(34.0901, -118.4065),
            Coordinate::new(78.2232, 15.6267),
            // Aleutians, either side of the antimeridian
            Coordinate::new(52.0, 179.95),
            Coordinate::new(51.9, -179.9),
        ];
        for center in centers {
            assert_circle_inside_box(center, 35.0);
            assert_circle_inside_box(center, 100.0);
        }
    }

    #[test]
    fn test_bbox_crossing_antimeridian() {
        let bbox = calculate_bounding_box(Coordinate::new(52.0, 179.95), 30.0);
        assert_eq!(bbox.min_lon, -180.0);
        assert_eq!(bbox.max_lon, 180.0);
        assert!(is_within_bounding_box(Coordinate::new(52.0, -179.95), &bbox));
    }

    #[test]
    fn test_bbox_spanning_pole() {
        let bbox = calculate_bounding_box(Coordinate::new(89.9, 0.0), 50.0);
        assert_eq!(bbox.min_lon, -180.0);
        assert_eq!(bbox.max_lon, 180.0);
    }

    fn assert_circle_inside_box(center: Coordinate, radius: f64) {
        let bbox = calculate_bounding_box(center, radius);

        for step in 0..360 {
            let bearing = (step as f64).to_radians();
            // Points just inside the radius in every direction
            let dlat = (radius * 0.99 / MILES_PER_DEGREE) * bearing.cos();
            let dlon = (radius * 0.99 / (MILES_PER_DEGREE * center.latitude.to_radians().cos()))
                * bearing.sin();
            let point = Coordinate::new(center.latitude + dlat, wrap_longitude(center.longitude + dlon));

            if distance_between(center, point) <= radius {
                assert!(is_within_bounding_box(point, &bbox), "bearing {}", step);
            }
        }
    }

    fn wrap_longitude(lon: f64) -> f64 {
        if lon > 180.0 {
            lon - 360.0
        } else if lon < -180.0 {
            lon + 360.0
        } else {
            lon
        }
    }
}

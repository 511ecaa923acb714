// Integration tests for ION Locator

use actix_web::{test, web, App};
use ion_locator::config::PaginationSettings;
use ion_locator::core::{ChannelLocator, PlaceOverride, SearchOutcome, SearchPolicy};
use ion_locator::models::{Channel, GeoCode, MatchKind};
use ion_locator::routes::{configure_routes, AppState};
use ion_locator::services::{CacheManager, CachedGeocodeStore, MemoryStore};
use serde_json::Value;
use std::sync::Arc;

fn create_geocode(code: &str, lat: f64, lon: f64, place: &str) -> GeoCode {
    GeoCode {
        postal_code: code.to_string(),
        latitude: lat,
        longitude: lon,
        place_name: place.to_string(),
        region_name: "CA".to_string(),
    }
}

fn create_channel(id: &str, city: &str, status: &str, coords: Option<(f64, f64)>) -> Channel {
    Channel {
        id: id.to_string(),
        name: format!("ION {}", city),
        slug: None,
        city_name: Some(city.to_string()),
        state_name: Some("CA".to_string()),
        population: None,
        status: Some(status.to_string()),
        custom_domain: None,
        latitude: coords.map(|c| c.0),
        longitude: coords.map(|c| c.1),
    }
}

fn create_store() -> MemoryStore {
    MemoryStore::new()
        .with_geocodes([
            create_geocode("90210", 34.0901, -118.4065, "Beverly Hills"),
            create_geocode("94103", 37.7726, -122.4099, "San Francisco"),
        ])
        .with_channels([
            create_channel("bh", "Beverly Hills", "active", Some((34.0736, -118.4004))),
            create_channel("cc", "Culver City", "active", Some((34.0211, -118.3965))),
            create_channel("slo", "San Luis Obispo", "pending", Some((35.2828, -120.6596))),
            // About 200 miles from Beverly Hills
            create_channel("fno", "Fresno", "active", Some((36.7378, -119.7871))),
            create_channel("sf", "San Francisco", "active", Some((37.7749, -122.4194))),
            create_channel("tbd", "Bakersfield", "", None),
        ])
}

fn beverly_hills_policy() -> SearchPolicy {
    SearchPolicy {
        overrides: vec![PlaceOverride {
            postal_code: "90210".to_string(),
            radius_miles: Some(35.0),
            expected_place: Some("Beverly Hills".to_string()),
        }],
        ..SearchPolicy::default()
    }
}

#[tokio::test]
async fn test_beverly_hills_end_to_end() {
    let store = create_store();
    let locator = ChannelLocator::new(store.clone(), store, beverly_hills_policy());

    match locator.search("90210", None).await.unwrap() {
        SearchOutcome::Proximity { geocode, match_kind, radius_miles, hits } => {
            assert_eq!(geocode.place_name, "Beverly Hills");
            assert_eq!(match_kind, MatchKind::Exact);
            assert_eq!(radius_miles, 35.0);

            let ids: Vec<_> = hits.iter().map(|h| h.item.id.as_str()).collect();
            assert_eq!(ids, vec!["bh", "cc"]);
            assert!(!ids.contains(&"fno"));
            assert!(hits[0].boosted);
            assert!(hits.iter().all(|h| h.distance_miles <= 35.0));
        }
        other => panic!("expected proximity outcome, got {:?}", other),
    }
}

#[tokio::test]
async fn test_wide_radius_reaches_distant_channel() {
    let store = create_store();
    let locator = ChannelLocator::new(store.clone(), store, beverly_hills_policy());

    // Explicit radius is clamped to 100 miles, still short of San Luis Obispo and Fresno
    let outcome = locator.search("90210", Some("250")).await.unwrap();
    assert_eq!(outcome.len(), 2);

    let policy = SearchPolicy {
        max_radius_miles: 250.0,
        ..beverly_hills_policy()
    };
    let store = create_store();
    let locator = ChannelLocator::new(store.clone(), store, policy);

    let hits = locator.search("90210", Some("250")).await.unwrap().into_hits();
    let ids: Vec<_> = hits.iter().map(|h| h.channel.id.as_str()).collect();
    assert_eq!(ids, vec!["bh", "cc", "slo", "fno"]);
    let fresno = hits.iter().find(|h| h.channel.id == "fno").unwrap();
    assert!((fresno.distance_miles.unwrap() - 200.0).abs() < 5.0);
}

#[tokio::test]
async fn test_prefix_fallback_is_approximate() {
    let store = create_store();
    let locator = ChannelLocator::new(store.clone(), store, SearchPolicy::default());

    match locator.search("94199", None).await.unwrap() {
        SearchOutcome::Proximity { geocode, match_kind, hits, .. } => {
            assert_eq!(geocode.postal_code, "94103");
            assert_eq!(match_kind, MatchKind::Approximate);
            assert_eq!(hits.len(), 1);
            assert_eq!(hits[0].item.id, "sf");
        }
        other => panic!("expected proximity outcome, got {:?}", other),
    }
}

#[tokio::test]
async fn test_cached_geocode_store_serves_repeat_lookups() {
    let cache = Arc::new(CacheManager::in_memory(100, 60));
    let store = create_store();
    let locator = ChannelLocator::new(
        CachedGeocodeStore::new(store.clone(), Arc::clone(&cache)),
        store,
        SearchPolicy::default(),
    );

    locator.search("90210", None).await.unwrap();
    locator.search("90210", None).await.unwrap();

    let stats = cache.stats();
    assert_eq!(stats.miss_count, 1);
    assert_eq!(stats.hit_count, 1);
}

fn create_state() -> AppState<MemoryStore, MemoryStore> {
    let store = create_store();
    AppState {
        locator: Arc::new(ChannelLocator::new(store.clone(), store, beverly_hills_policy())),
        cache: Arc::new(CacheManager::in_memory(100, 60)),
        pagination: PaginationSettings::default(),
    }
}

macro_rules! init_app {
    () => {
        test::init_service(
            App::new()
                .app_data(web::Data::new(create_state()))
                .configure(configure_routes::<MemoryStore, MemoryStore>),
        )
        .await
    };
}

#[actix_web::test]
async fn test_nearby_endpoint() {
    let app = init_app!();

    let req = test::TestRequest::get()
        .uri("/api/v1/channels/nearby?q=90210&perPage=1")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["mode"], "proximity");
    assert_eq!(body["matchKind"], "exact");
    assert_eq!(body["radiusMiles"], 35.0);
    assert_eq!(body["pagination"]["total"], 2);
    assert_eq!(body["pagination"]["totalPages"], 2);
    assert_eq!(body["results"][0]["id"], "bh");
    assert!(body["results"][0]["distanceMiles"].is_number());
}

#[actix_web::test]
async fn test_nearby_endpoint_text_fallback() {
    let app = init_app!();

    let req = test::TestRequest::get()
        .uri("/api/v1/channels/nearby?q=bakersfield")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["mode"], "text");
    assert!(body.get("center").is_none());
    assert_eq!(body["results"][0]["id"], "tbd");
}

#[actix_web::test]
async fn test_nearby_endpoint_rejects_oversized_query() {
    let app = init_app!();

    let q = "9".repeat(100);
    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/channels/nearby?q={}", q))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 400);
}

#[actix_web::test]
async fn test_directory_endpoint() {
    let app = init_app!();

    let req = test::TestRequest::get().uri("/api/v1/channels").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["mode"], "text");
    assert_eq!(body["pagination"]["total"], 6);
    assert_eq!(body["pagination"]["perPage"], 20);
}

#[actix_web::test]
async fn test_geocode_endpoint() {
    let app = init_app!();

    let req = test::TestRequest::get().uri("/api/v1/geocode/90299").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["postalCode"], "90210");
    assert_eq!(body["matchKind"], "approximate");

    let req = test::TestRequest::get().uri("/api/v1/geocode/10001").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);
}

#[actix_web::test]
async fn test_status_counts_endpoint() {
    let app = init_app!();

    let req = test::TestRequest::get()
        .uri("/api/v1/channels/status-counts")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    let total: i64 = body
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["count"].as_i64().unwrap())
        .sum();
    assert_eq!(total, 6);
}

#[actix_web::test]
async fn test_health_endpoint() {
    let app = init_app!();

    let req = test::TestRequest::get().uri("/api/v1/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["status"], "healthy");
    assert_eq!(body["cache"]["redis_enabled"], false);
}

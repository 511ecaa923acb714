use actix_web::{web, HttpResponse, Responder};
use std::sync::Arc;
use validator::Validate;
use crate::config::PaginationSettings;
use crate::core::{paginate, ChannelLocator, Resolution, SearchOutcome};
use crate::models::{
    ChannelSearchResponse, DirectoryRequest, ErrorResponse, GeocodeResponse, HealthResponse,
    NearbySearchRequest, SearchMode, StatusCount,
};
use crate::services::{CacheKey, CacheManager, ChannelStore, GeocodeStore};

/// Application state shared across all handlers
pub struct AppState<G, C> {
    pub locator: Arc<ChannelLocator<G, C>>,
    pub cache: Arc<CacheManager>,
    pub pagination: PaginationSettings,
}

impl<G, C> Clone for AppState<G, C> {
    fn clone(&self) -> Self {
        Self {
            locator: Arc::clone(&self.locator),
            cache: Arc::clone(&self.cache),
            pagination: self.pagination.clone(),
        }
    }
}

/// Configure all channel-related routes
pub fn configure<G, C>(cfg: &mut web::ServiceConfig)
where
    G: GeocodeStore + 'static,
    C: ChannelStore + 'static,
{
    cfg
        .route("/health", web::get().to(health_check::<G, C>))
        .route("/channels", web::get().to(directory::<G, C>))
        .route("/channels/nearby", web::get().to(nearby::<G, C>))
        .route("/channels/status-counts", web::get().to(status_counts::<G, C>))
        .route("/geocode/{code}", web::get().to(geocode::<G, C>));
}

/// Health check endpoint
async fn health_check<G, C>(state: web::Data<AppState<G, C>>) -> impl Responder
where
    G: GeocodeStore + 'static,
    C: ChannelStore + 'static,
{
    let healthy = state.locator.channels().ping().await;
    let status = if healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
        cache: state.cache.stats(),
    })
}

/// Nearby search endpoint
///
/// GET /api/v1/channels/nearby?q=90210,25&radius=40&page=1&perPage=20
///
/// `q` is a postal code with an optional inline radius, or free text. Codes
/// that cannot be resolved fall back to a text search.
async fn nearby<G, C>(
    state: web::Data<AppState<G, C>>,
    query: web::Query<NearbySearchRequest>,
) -> impl Responder
where
    G: GeocodeStore + 'static,
    C: ChannelStore + 'static,
{
    if let Err(errors) = query.validate() {
        tracing::info!("Validation failed for nearby request: {:?}", errors);
        return validation_error(errors);
    }

    tracing::info!("Nearby search: q={:?}, radius={:?}", query.q, query.radius);

    match state.locator.search(&query.q, query.radius.as_deref()).await {
        Ok(outcome) => {
            let response = search_response(outcome, query.page, query.per_page, &state.pagination);
            tracing::info!(
                "Returning {} of {} channels ({:?}) for {:?}",
                response.results.len(),
                response.pagination.total,
                response.mode,
                query.q
            );
            HttpResponse::Ok().json(response)
        }
        Err(e) => {
            tracing::error!("Nearby search for {:?} failed: {}", query.q, e);
            internal_error("Failed to search channels", e)
        }
    }
}

/// Directory listing endpoint
///
/// GET /api/v1/channels?q=beverly&page=1&perPage=20
async fn directory<G, C>(
    state: web::Data<AppState<G, C>>,
    query: web::Query<DirectoryRequest>,
) -> impl Responder
where
    G: GeocodeStore + 'static,
    C: ChannelStore + 'static,
{
    if let Err(errors) = query.validate() {
        return validation_error(errors);
    }

    match state.locator.list(query.q.as_deref()).await {
        Ok(outcome) => {
            HttpResponse::Ok().json(search_response(outcome, query.page, query.per_page, &state.pagination))
        }
        Err(e) => {
            tracing::error!("Directory listing failed: {}", e);
            internal_error("Failed to list channels", e)
        }
    }
}

/// Geocode lookup endpoint
///
/// GET /api/v1/geocode/{code}
async fn geocode<G, C>(
    state: web::Data<AppState<G, C>>,
    path: web::Path<String>,
) -> impl Responder
where
    G: GeocodeStore + 'static,
    C: ChannelStore + 'static,
{
    let code = path.into_inner();

    match state.locator.lookup().resolve(&code).await {
        Resolution::Found { geocode, kind } => HttpResponse::Ok().json(GeocodeResponse {
            geocode,
            match_kind: kind,
        }),
        Resolution::NotFound => HttpResponse::NotFound().json(ErrorResponse {
            error: "Postal code not found".to_string(),
            message: format!("No geocode for {}", code.trim()),
            status_code: 404,
        }),
    }
}

/// Channel counts per status, cached for the configured TTL
///
/// GET /api/v1/channels/status-counts
async fn status_counts<G, C>(state: web::Data<AppState<G, C>>) -> impl Responder
where
    G: GeocodeStore + 'static,
    C: ChannelStore + 'static,
{
    let cache_key = CacheKey::status_counts();

    if let Ok(counts) = state.cache.get::<Vec<StatusCount>>(&cache_key).await {
        return HttpResponse::Ok().json(counts);
    }

    match state.locator.channels().status_counts().await {
        Ok(counts) => {
            if let Err(e) = state.cache.set(&cache_key, &counts).await {
                tracing::warn!("Failed to cache status counts: {}", e);
            }
            HttpResponse::Ok().json(counts)
        }
        Err(e) => {
            tracing::error!("Failed to load status counts: {}", e);
            internal_error("Failed to load status counts", e)
        }
    }
}

/// Shape a search outcome into a paginated response
pub fn search_response(
    outcome: SearchOutcome,
    page: u32,
    per_page: Option<u32>,
    pagination: &PaginationSettings,
) -> ChannelSearchResponse {
    let (mode, center, match_kind, place_name, radius_miles) = match &outcome {
        SearchOutcome::Proximity { geocode, match_kind, radius_miles, .. } => (
            SearchMode::Proximity,
            Some(geocode.coordinate()),
            Some(*match_kind),
            Some(geocode.place_name.clone()),
            Some(*radius_miles),
        ),
        SearchOutcome::Text { .. } => (SearchMode::Text, None, None, None, None),
    };

    let per_page = per_page.unwrap_or(pagination.default_per_page);
    let page = paginate(outcome.into_hits(), page, per_page, pagination.max_per_page);

    ChannelSearchResponse {
        mode,
        center,
        match_kind,
        place_name,
        radius_miles,
        results: page.items,
        pagination: page.info,
    }
}

fn validation_error(errors: validator::ValidationErrors) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorResponse {
        error: "Validation failed".to_string(),
        message: errors.to_string(),
        status_code: 400,
    })
}

fn internal_error(error: &str, cause: impl std::fmt::Display) -> HttpResponse {
    HttpResponse::InternalServerError().json(ErrorResponse {
        error: error.to_string(),
        message: cause.to_string(),
        status_code: 500,
    })
}

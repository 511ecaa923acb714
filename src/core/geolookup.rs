use crate::models::{Coordinate, GeoCode, MatchKind};
use crate::services::store::GeocodeStore;

/// Outcome of resolving a postal code
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Found { geocode: GeoCode, kind: MatchKind },
    NotFound,
}

impl Resolution {
    pub fn coordinate(&self) -> Option<Coordinate> {
        match self {
            Resolution::Found { geocode, .. } => Some(geocode.coordinate()),
            Resolution::NotFound => None,
        }
    }
}

/// Resolves postal codes to coordinates
///
/// Exact match first, then any code sharing the first `prefix_len`
/// characters. The prefix stage is an approximation and is reported as
/// [`MatchKind::Approximate`]; which row wins among several sharing a prefix
/// is up to the store.
///
/// Store failures (including a missing table) are logged and reported as
/// [`Resolution::NotFound`]; callers fall back to text search either way.
#[derive(Debug, Clone)]
pub struct GeoLookup<S> {
    store: S,
    prefix_len: usize,
}

impl<S: GeocodeStore> GeoLookup<S> {
    pub fn new(store: S, prefix_len: usize) -> Self {
        Self { store, prefix_len }
    }

    pub async fn resolve(&self, postal_code: &str) -> Resolution {
        let code = postal_code.trim();
        if code.is_empty() {
            return Resolution::NotFound;
        }

        match self.store.find_exact(code).await {
            Ok(Some(geocode)) => {
                return Resolution::Found { geocode, kind: MatchKind::Exact };
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!("Geocode lookup for {} failed, treating as not found: {}", code, e);
                return Resolution::NotFound;
            }
        }

        let Some(prefix) = self.prefix_of(code) else {
            tracing::debug!("No geocode for {} and too short for prefix fallback", code);
            return Resolution::NotFound;
        };

        match self.store.find_by_prefix(prefix).await {
            Ok(Some(geocode)) => {
                tracing::debug!(
                    "Approximated {} with {} via prefix {}",
                    code,
                    geocode.postal_code,
                    prefix
                );
                Resolution::Found { geocode, kind: MatchKind::Approximate }
            }
            Ok(None) => {
                tracing::debug!("No geocode for {} or prefix {}", code, prefix);
                Resolution::NotFound
            }
            Err(e) => {
                tracing::warn!("Prefix geocode lookup for {} failed: {}", prefix, e);
                Resolution::NotFound
            }
        }
    }

    fn prefix_of<'a>(&self, code: &'a str) -> Option<&'a str> {
        if self.prefix_len == 0 {
            return None;
        }

        if code.chars().count() < self.prefix_len {
            return None;
        }

        // Char-aware so odd input never splits a code point
        let end = code
            .char_indices()
            .nth(self.prefix_len)
            .map(|(i, _)| i)
            .unwrap_or(code.len());
        Some(&code[..end])
    }
}

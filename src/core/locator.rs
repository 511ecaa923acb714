use thiserror::Error;
use crate::models::{Channel, ChannelHit, GeoCode, MatchKind};
use crate::services::store::{ChannelStore, GeocodeStore, StoreError};
use super::{
    filters::{DistanceFilter, Ranked},
    geolookup::{GeoLookup, Resolution},
    policy::SearchPolicy,
    query::{parse_search_input, SearchInput},
};

/// Errors from the channel search pipeline
#[derive(Debug, Error)]
pub enum LocatorError {
    #[error("Failed to load channels: {0}")]
    Store(#[from] StoreError),
}

/// Result of a directory search
#[derive(Debug, Clone)]
pub enum SearchOutcome {
    /// The input resolved to a location; hits are nearest first
    Proximity {
        geocode: GeoCode,
        match_kind: MatchKind,
        radius_miles: f64,
        hits: Vec<Ranked<Channel>>,
    },
    /// Substring search over channel names (or the whole directory)
    Text {
        term: Option<String>,
        hits: Vec<Channel>,
    },
}

impl SearchOutcome {
    pub fn len(&self) -> usize {
        match self {
            SearchOutcome::Proximity { hits, .. } => hits.len(),
            SearchOutcome::Text { hits, .. } => hits.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flatten into display hits, keeping order
    pub fn into_hits(self) -> Vec<ChannelHit> {
        match self {
            SearchOutcome::Proximity { hits, .. } => hits.into_iter().map(ChannelHit::from).collect(),
            SearchOutcome::Text { hits, .. } => hits.into_iter().map(ChannelHit::from).collect(),
        }
    }
}

/// Finds channels for directory search input
///
/// # Pipeline
/// 1. Classify input (postal code with optional radius, or free text)
/// 2. Resolve postal codes through [`GeoLookup`]
/// 3. Distance filter over located channels
/// 4. Fall back to text search when the code cannot be resolved
#[derive(Debug, Clone)]
pub struct ChannelLocator<G, C> {
    lookup: GeoLookup<G>,
    channels: C,
    policy: SearchPolicy,
}

impl<G, C> ChannelLocator<G, C>
where
    G: GeocodeStore,
    C: ChannelStore,
{
    pub fn new(geocodes: G, channels: C, policy: SearchPolicy) -> Self {
        Self {
            lookup: GeoLookup::new(geocodes, policy.prefix_len),
            channels,
            policy,
        }
    }

    pub fn policy(&self) -> &SearchPolicy {
        &self.policy
    }

    pub fn lookup(&self) -> &GeoLookup<G> {
        &self.lookup
    }

    pub fn channels(&self) -> &C {
        &self.channels
    }

    /// Search the directory
    ///
    /// # Arguments
    /// * `raw` - Postal code (`90210`, `90210,25`, `90210.25`) or free text
    /// * `radius_param` - Separately supplied radius; wins over an inline one
    pub async fn search(
        &self,
        raw: &str,
        radius_param: Option<&str>,
    ) -> Result<SearchOutcome, LocatorError> {
        let query = match parse_search_input(raw, radius_param, &self.policy) {
            SearchInput::Empty => return self.text_search(None).await,
            SearchInput::Text(term) => return self.text_search(Some(term)).await,
            SearchInput::Postal(query) => query,
        };

        let (geocode, match_kind) = match self.lookup.resolve(&query.code).await {
            Resolution::Found { geocode, kind } => (geocode, kind),
            Resolution::NotFound => {
                tracing::info!(
                    "Postal code {} not resolved, falling back to text search",
                    query.code
                );
                return self.text_search(Some(query.code)).await;
            }
        };

        let candidates = self.channels.located_channels().await?;
        let total_candidates = candidates.len();

        let expected_place = self
            .policy
            .expected_place(&query.code, &geocode.place_name);

        let hits = DistanceFilter::new()
            .with_expected_place(expected_place)
            .filter(geocode.coordinate(), candidates, query.radius_miles);

        tracing::debug!(
            "Postal {} ({:?}) radius {}mi: {} of {} located channels kept",
            query.code,
            match_kind,
            query.radius_miles,
            hits.len(),
            total_candidates
        );

        Ok(SearchOutcome::Proximity {
            geocode,
            match_kind,
            radius_miles: query.radius_miles,
            hits,
        })
    }

    /// Directory listing: text search when a term is given, else every channel
    pub async fn list(&self, term: Option<&str>) -> Result<SearchOutcome, LocatorError> {
        let term = term.map(str::trim).filter(|t| !t.is_empty()).map(str::to_string);
        self.text_search(term).await
    }

    async fn text_search(&self, term: Option<String>) -> Result<SearchOutcome, LocatorError> {
        let hits = match term.as_deref() {
            Some(term) => self.channels.search_channels(term).await?,
            None => self.channels.all_channels().await?,
        };

        Ok(SearchOutcome::Text { term, hits })
    }
}

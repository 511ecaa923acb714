use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;
use crate::models::{Channel, GeoCode, StatusCount};
use super::postgres::PostgresError;

/// Errors surfaced by record stores
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Postgres error: {0}")]
    Postgres(#[from] PostgresError),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Read access to the postal code geocode table
pub trait GeocodeStore: Send + Sync {
    /// Row whose code equals `postal_code`
    fn find_exact(
        &self,
        postal_code: &str,
    ) -> impl Future<Output = Result<Option<GeoCode>, StoreError>> + Send;

    /// Any row whose code starts with `prefix`
    fn find_by_prefix(
        &self,
        prefix: &str,
    ) -> impl Future<Output = Result<Option<GeoCode>, StoreError>> + Send;
}

/// Read access to the channel directory
pub trait ChannelStore: Send + Sync {
    /// Channels with both coordinate fields filled in (validity is checked by the caller)
    fn located_channels(&self) -> impl Future<Output = Result<Vec<Channel>, StoreError>> + Send;

    /// Channels whose name, city or state contains `term`, case-insensitively
    fn search_channels(
        &self,
        term: &str,
    ) -> impl Future<Output = Result<Vec<Channel>, StoreError>> + Send;

    /// Every channel, ordered by name
    fn all_channels(&self) -> impl Future<Output = Result<Vec<Channel>, StoreError>> + Send;

    /// Channel counts grouped by status
    fn status_counts(&self) -> impl Future<Output = Result<Vec<StatusCount>, StoreError>> + Send;

    /// Whether the backing store is reachable
    fn ping(&self) -> impl Future<Output = bool> + Send;
}

impl<T: GeocodeStore> GeocodeStore for Arc<T> {
    async fn find_exact(&self, postal_code: &str) -> Result<Option<GeoCode>, StoreError> {
        (**self).find_exact(postal_code).await
    }

    async fn find_by_prefix(&self, prefix: &str) -> Result<Option<GeoCode>, StoreError> {
        (**self).find_by_prefix(prefix).await
    }
}

impl<T: ChannelStore> ChannelStore for Arc<T> {
    async fn located_channels(&self) -> Result<Vec<Channel>, StoreError> {
        (**self).located_channels().await
    }

    async fn search_channels(&self, term: &str) -> Result<Vec<Channel>, StoreError> {
        (**self).search_channels(term).await
    }

    async fn all_channels(&self) -> Result<Vec<Channel>, StoreError> {
        (**self).all_channels().await
    }

    async fn status_counts(&self) -> Result<Vec<StatusCount>, StoreError> {
        (**self).status_counts().await
    }

    async fn ping(&self) -> bool {
        (**self).ping().await
    }
}

/// Case-insensitive substring match over a channel's name fields
pub fn channel_matches_text(channel: &Channel, term: &str) -> bool {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }

    std::iter::once(channel.name.as_str())
        .chain(channel.city_name.as_deref())
        .chain(channel.state_name.as_deref())
        .any(|field| field.to_lowercase().contains(&needle))
}

/// In-process store, used for tests, benches and fixtures
#[derive(Debug, Clone)]
pub struct MemoryStore {
    geocodes: BTreeMap<String, GeoCode>,
    channels: Vec<Channel>,
    available: bool,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self {
            geocodes: BTreeMap::new(),
            channels: Vec::new(),
            available: true,
        }
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_geocodes(mut self, geocodes: impl IntoIterator<Item = GeoCode>) -> Self {
        for geocode in geocodes {
            self.geocodes.insert(geocode.postal_code.clone(), geocode);
        }
        self
    }

    pub fn with_channels(mut self, channels: impl IntoIterator<Item = Channel>) -> Self {
        self.channels.extend(channels);
        self
    }

    /// Every call fails, as if the backing table were missing
    pub fn unavailable(mut self) -> Self {
        self.available = false;
        self
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.available {
            Ok(())
        } else {
            Err(StoreError::Unavailable("memory store marked unavailable".to_string()))
        }
    }

    fn sorted_by_name(mut channels: Vec<Channel>) -> Vec<Channel> {
        channels.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        channels
    }
}

impl GeocodeStore for MemoryStore {
    async fn find_exact(&self, postal_code: &str) -> Result<Option<GeoCode>, StoreError> {
        self.check()?;
        Ok(self.geocodes.get(postal_code).cloned())
    }

    async fn find_by_prefix(&self, prefix: &str) -> Result<Option<GeoCode>, StoreError> {
        self.check()?;
        Ok(self
            .geocodes
            .range(prefix.to_string()..)
            .next()
            .filter(|(code, _)| code.starts_with(prefix))
            .map(|(_, geocode)| geocode.clone()))
    }
}

impl ChannelStore for MemoryStore {
    async fn located_channels(&self) -> Result<Vec<Channel>, StoreError> {
        self.check()?;
        Ok(self
            .channels
            .iter()
            .filter(|c| c.latitude.is_some() && c.longitude.is_some())
            .cloned()
            .collect())
    }

    async fn search_channels(&self, term: &str) -> Result<Vec<Channel>, StoreError> {
        self.check()?;
        let hits = self
            .channels
            .iter()
            .filter(|c| channel_matches_text(c, term))
            .cloned()
            .collect();
        Ok(Self::sorted_by_name(hits))
    }

    async fn all_channels(&self) -> Result<Vec<Channel>, StoreError> {
        self.check()?;
        Ok(Self::sorted_by_name(self.channels.clone()))
    }

    async fn status_counts(&self) -> Result<Vec<StatusCount>, StoreError> {
        self.check()?;
        let mut counts: BTreeMap<String, i64> = BTreeMap::new();
        for channel in &self.channels {
            let status = channel
                .status
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .unwrap_or("unknown");
            *counts.entry(status.to_string()).or_default() += 1;
        }

        Ok(counts
            .into_iter()
            .map(|(status, count)| StatusCount { status, count })
            .collect())
    }

    async fn ping(&self) -> bool {
        self.available
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geocode(code: &str, lat: f64, lon: f64) -> GeoCode {
        GeoCode {
            postal_code: code.to_string(),
            latitude: lat,
            longitude: lon,
            place_name: "Somewhere".to_string(),
            region_name: "CA".to_string(),
        }
    }

    fn channel(id: &str, name: &str, city: Option<&str>, status: Option<&str>) -> Channel {
        Channel {
            id: id.to_string(),
            name: name.to_string(),
            slug: None,
            city_name: city.map(str::to_string),
            state_name: Some("California".to_string()),
            population: None,
            status: status.map(str::to_string),
            custom_domain: None,
            latitude: None,
            longitude: None,
        }
    }

    #[tokio::test]
    async fn test_prefix_lookup() {
        let store = MemoryStore::new().with_geocodes([
            geocode("90210", 34.09, -118.41),
            geocode("90211", 34.06, -118.38),
            geocode("10001", 40.75, -73.99),
        ]);

        let hit = store.find_by_prefix("902").await.unwrap().unwrap();
        assert!(hit.postal_code.starts_with("902"));

        assert!(store.find_by_prefix("555").await.unwrap().is_none());
        // Lexically after every key
        assert!(store.find_by_prefix("999").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unavailable_store_errors() {
        let store = MemoryStore::new().unavailable();
        assert!(matches!(
            store.find_exact("90210").await,
            Err(StoreError::Unavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_text_search_and_ordering() {
        let store = MemoryStore::new().with_channels([
            channel("1", "ION Malibu", Some("Malibu"), Some("active")),
            channel("2", "ION Beverly Hills", Some("Beverly Hills"), Some("active")),
            channel("3", "Pasadena Now", Some("Pasadena"), None),
        ]);

        let hits = store.search_channels("beverly").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "2");

        // State name is searched too
        assert_eq!(store.search_channels("CALIF").await.unwrap().len(), 3);

        let all = store.all_channels().await.unwrap();
        let names: Vec<_> = all.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["ION Beverly Hills", "ION Malibu", "Pasadena Now"]);
    }

    #[tokio::test]
    async fn test_status_counts() {
        let store = MemoryStore::new().with_channels([
            channel("1", "A", None, Some("active")),
            channel("2", "B", None, Some("active")),
            channel("3", "C", None, Some("")),
            channel("4", "D", None, None),
        ]);

        let counts = store.status_counts().await.unwrap();
        assert_eq!(
            counts,
            vec![
                StatusCount { status: "active".to_string(), count: 2 },
                StatusCount { status: "unknown".to_string(), count: 2 },
            ]
        );
    }
}

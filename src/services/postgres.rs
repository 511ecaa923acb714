use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use std::time::Duration;
use thiserror::Error;
use crate::config::DatabaseSettings;
use crate::models::{parse_coordinate, Channel, GeoCode, StatusCount};
use super::store::{ChannelStore, GeocodeStore, StoreError};

/// Errors that can occur when interacting with PostgreSQL
#[derive(Debug, Error)]
pub enum PostgresError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),
}

const CHANNEL_COLUMNS: &str = r#"
    id, name, slug, city_name, state_name, population, status, custom_domain,
    latitude, longitude
"#;

/// PostgreSQL client for the geocode table and the channel directory
pub struct PostgresClient {
    pool: PgPool,
}

impl PostgresClient {
    /// Create a new PostgreSQL client from a connection string
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout: Duration,
        idle_timeout: Duration,
    ) -> Result<Self, PostgresError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(acquire_timeout)
            .idle_timeout(idle_timeout)
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    /// Create a new PostgreSQL client from settings, running migrations if enabled
    pub async fn from_settings(settings: &DatabaseSettings) -> Result<Self, PostgresError> {
        tracing::info!(
            "Connecting to PostgreSQL (max {} connections)",
            settings.max_connections.unwrap_or(10)
        );

        let client = Self::new(
            &settings.url,
            settings.max_connections.unwrap_or(10),
            settings.min_connections.unwrap_or(1),
            Duration::from_secs(settings.acquire_timeout_secs.unwrap_or(5)),
            Duration::from_secs(settings.idle_timeout_secs.unwrap_or(600)),
        )
        .await?;

        if settings.run_migrations {
            client.migrate().await?;
        }

        Ok(client)
    }

    /// Apply pending migrations from ./migrations
    pub async fn migrate(&self) -> Result<(), PostgresError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        tracing::info!("Database migrations applied");
        Ok(())
    }

    /// Geocode row with exactly this postal code
    pub async fn find_geocode(&self, postal_code: &str) -> Result<Option<GeoCode>, PostgresError> {
        let query = r#"
            SELECT postal_code, latitude, longitude, place_name, region_name
            FROM geocodes
            WHERE postal_code = $1
        "#;

        let row = sqlx::query(query)
            .bind(postal_code)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| geocode_from_row(&r)).transpose().map_err(Into::into)
    }

    /// First geocode row (by code) whose postal code starts with `prefix`
    pub async fn find_geocode_by_prefix(&self, prefix: &str) -> Result<Option<GeoCode>, PostgresError> {
        let query = r#"
            SELECT postal_code, latitude, longitude, place_name, region_name
            FROM geocodes
            WHERE postal_code LIKE $1
            ORDER BY postal_code
            LIMIT 1
        "#;

        let row = sqlx::query(query)
            .bind(format!("{}%", escape_like(prefix)))
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| geocode_from_row(&r)).transpose().map_err(Into::into)
    }

    /// Channels with both coordinate columns filled in
    ///
    /// Coordinates are stored as text; numeric validity is checked when the
    /// rows are turned into [`Channel`]s.
    pub async fn located_channels(&self) -> Result<Vec<Channel>, PostgresError> {
        let query = format!(
            r#"
            SELECT {CHANNEL_COLUMNS}
            FROM channels
            WHERE NULLIF(TRIM(latitude), '') IS NOT NULL
              AND NULLIF(TRIM(longitude), '') IS NOT NULL
            "#
        );

        let rows = sqlx::query(&query).fetch_all(&self.pool).await?;
        let channels = rows.iter().map(channel_from_row).collect::<Result<Vec<_>, _>>()?;

        tracing::debug!("Loaded {} located channels", channels.len());

        Ok(channels)
    }

    /// Case-insensitive substring search over name, city and state
    pub async fn search_channels(&self, term: &str) -> Result<Vec<Channel>, PostgresError> {
        let query = format!(
            r#"
            SELECT {CHANNEL_COLUMNS}
            FROM channels
            WHERE name ILIKE $1
               OR city_name ILIKE $1
               OR state_name ILIKE $1
            ORDER BY LOWER(name)
            "#
        );

        let rows = sqlx::query(&query)
            .bind(format!("%{}%", escape_like(term.trim())))
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(channel_from_row).collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Every channel ordered by name
    pub async fn all_channels(&self) -> Result<Vec<Channel>, PostgresError> {
        let query = format!("SELECT {CHANNEL_COLUMNS} FROM channels ORDER BY LOWER(name)");

        let rows = sqlx::query(&query).fetch_all(&self.pool).await?;

        rows.iter().map(channel_from_row).collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Channel counts per status; blank statuses count as "unknown"
    pub async fn status_counts(&self) -> Result<Vec<StatusCount>, PostgresError> {
        let query = r#"
            SELECT COALESCE(NULLIF(TRIM(status), ''), 'unknown') AS status,
                   COUNT(*) AS count
            FROM channels
            GROUP BY 1
            ORDER BY 1
        "#;

        let rows = sqlx::query(query).fetch_all(&self.pool).await?;

        rows.iter()
            .map(|row| {
                Ok(StatusCount {
                    status: row.try_get("status")?,
                    count: row.try_get("count")?,
                })
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()
            .map_err(Into::into)
    }

    /// Health check for the database connection
    pub async fn health_check(&self) -> Result<bool, PostgresError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}

impl GeocodeStore for PostgresClient {
    async fn find_exact(&self, postal_code: &str) -> Result<Option<GeoCode>, StoreError> {
        Ok(self.find_geocode(postal_code).await?)
    }

    async fn find_by_prefix(&self, prefix: &str) -> Result<Option<GeoCode>, StoreError> {
        Ok(self.find_geocode_by_prefix(prefix).await?)
    }
}

impl ChannelStore for PostgresClient {
    async fn located_channels(&self) -> Result<Vec<Channel>, StoreError> {
        Ok(PostgresClient::located_channels(self).await?)
    }

    async fn search_channels(&self, term: &str) -> Result<Vec<Channel>, StoreError> {
        Ok(PostgresClient::search_channels(self, term).await?)
    }

    async fn all_channels(&self) -> Result<Vec<Channel>, StoreError> {
        Ok(PostgresClient::all_channels(self).await?)
    }

    async fn status_counts(&self) -> Result<Vec<StatusCount>, StoreError> {
        Ok(PostgresClient::status_counts(self).await?)
    }

    async fn ping(&self) -> bool {
        match self.health_check().await {
            Ok(healthy) => healthy,
            Err(e) => {
                tracing::warn!("PostgreSQL health check failed: {}", e);
                false
            }
        }
    }
}

fn geocode_from_row(row: &PgRow) -> Result<GeoCode, sqlx::Error> {
    Ok(GeoCode {
        postal_code: row.try_get("postal_code")?,
        latitude: row.try_get("latitude")?,
        longitude: row.try_get("longitude")?,
        place_name: row.try_get("place_name")?,
        region_name: row.try_get("region_name")?,
    })
}

fn channel_from_row(row: &PgRow) -> Result<Channel, sqlx::Error> {
    let latitude: Option<String> = row.try_get("latitude")?;
    let longitude: Option<String> = row.try_get("longitude")?;

    Ok(Channel {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        slug: row.try_get("slug")?,
        city_name: row.try_get("city_name")?,
        state_name: row.try_get("state_name")?,
        population: row.try_get("population")?,
        status: row.try_get("status")?,
        custom_domain: row.try_get("custom_domain")?,
        latitude: latitude.as_deref().and_then(parse_coordinate),
        longitude: longitude.as_deref().and_then(parse_coordinate),
    })
}

/// Escape LIKE wildcards so user input matches literally
fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

//! Postgres-backed arrival source.
//!
//! The ingest job writes the same rows to two tables, `arrivals` and
//! `arrivals_secondary`, optionally on different databases. Each
//! [`PgArrivalSource`] reads from exactly one of them.

use std::time::Duration;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::debug;

use crate::domain::Arrival;

use super::error::NetworkFailure;
use super::source::{ArrivalQuery, ArrivalSource};

/// Columns in the shape of [`Arrival`]. Timestamps are read as text and
/// parsed by the normaliser, which knows about Eastern time. Ordering must
/// use the qualified column, since the bare name is the text alias.
const COLUMNS: &str = "arrival_id::bigint AS arrival_id, route_id, trip_id, stop_id, \
                       arrival_time::text AS arrival_time, destination";

/// Which arrivals table a source reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrivalTable {
    Primary,
    Secondary,
}

impl ArrivalTable {
    pub fn name(self) -> &'static str {
        match self {
            ArrivalTable::Primary => "arrivals",
            ArrivalTable::Secondary => "arrivals_secondary",
        }
    }

    fn stops_sql(self) -> String {
        format!(
            "SELECT {COLUMNS} FROM {} WHERE stop_id = ANY($1)",
            self.name()
        )
    }

    fn trip_sql(self) -> String {
        format!(
            "SELECT {COLUMNS} FROM {table} WHERE trip_id = $1 ORDER BY {table}.arrival_time ASC",
            table = self.name()
        )
    }
}

/// Connection pool settings.
#[derive(Debug, Clone)]
pub struct PgSourceConfig {
    /// Maximum pooled connections per source
    pub max_connections: u32,
    /// How long to wait for a free connection
    pub acquire_timeout: Duration,
}

impl Default for PgSourceConfig {
    fn default() -> Self {
        Self {
            max_connections: 5,
            acquire_timeout: Duration::from_secs(3),
        }
    }
}

impl PgSourceConfig {
    pub fn with_max_connections(mut self, n: u32) -> Self {
        self.max_connections = n;
        self
    }

    pub fn with_acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }
}

/// Reads one arrivals table through a lazily connected pool.
#[derive(Debug, Clone)]
pub struct PgArrivalSource {
    pool: PgPool,
    table: ArrivalTable,
}

impl PgArrivalSource {
    /// Create a source without connecting.
    ///
    /// Connections are opened on first use, so an unreachable database shows
    /// up as failed attempts rather than a startup error.
    pub fn connect_lazy(
        url: &str,
        table: ArrivalTable,
        config: &PgSourceConfig,
    ) -> Result<Self, NetworkFailure> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect_lazy(url)?;
        Ok(Self { pool, table })
    }

    /// Wrap an existing pool.
    pub fn with_pool(pool: PgPool, table: ArrivalTable) -> Self {
        Self { pool, table }
    }

    /// The underlying pool, for sharing with a source on another table.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl ArrivalSource for PgArrivalSource {
    async fn fetch(&self, query: &ArrivalQuery) -> Result<Vec<Arrival>, NetworkFailure> {
        let rows = match query {
            ArrivalQuery::Stops(ids) => {
                let sql = self.table.stops_sql();
                sqlx::query_as::<_, Arrival>(&sql)
                    .bind(ids.as_slice())
                    .fetch_all(&self.pool)
                    .await?
            }
            ArrivalQuery::Trip(trip_id) => {
                let sql = self.table.trip_sql();
                sqlx::query_as::<_, Arrival>(&sql)
                    .bind(trip_id.as_str())
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        debug!(table = self.table.name(), rows = rows.len(), "arrivals query returned");
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_names() {
        assert_eq!(ArrivalTable::Primary.name(), "arrivals");
        assert_eq!(ArrivalTable::Secondary.name(), "arrivals_secondary");
    }

    #[test]
    fn generated_sql() {
        let sql = ArrivalTable::Secondary.stops_sql();
        assert!(sql.starts_with("SELECT arrival_id::bigint AS arrival_id"));
        assert!(sql.ends_with("FROM arrivals_secondary WHERE stop_id = ANY($1)"));

        let sql = ArrivalTable::Primary.trip_sql();
        assert!(sql.ends_with(
            "FROM arrivals WHERE trip_id = $1 ORDER BY arrivals.arrival_time ASC"
        ));
    }

    #[test]
    fn config_builder() {
        let config = PgSourceConfig::default()
            .with_max_connections(10)
            .with_acquire_timeout(Duration::from_secs(1));
        assert_eq!(config.max_connections, 10);
        assert_eq!(config.acquire_timeout, Duration::from_secs(1));
    }

    #[test]
    fn config_defaults() {
        let config = PgSourceConfig::default();
        assert_eq!(config.max_connections, 5);
        assert_eq!(config.acquire_timeout, Duration::from_secs(3));
    }

    #[tokio::test]
    async fn lazy_pool_does_not_connect() {
        let source = PgArrivalSource::connect_lazy(
            "postgres://nobody@127.0.0.1:1/none",
            ArrivalTable::Primary,
            &PgSourceConfig::default(),
        );
        assert!(source.is_ok());
    }

    #[tokio::test]
    async fn tls_is_negotiated_when_required() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        // Agrees to the SSLRequest, then hangs up before any handshake
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let mut ssl_request = [0u8; 8];
                if socket.read_exact(&mut ssl_request).await.is_ok() {
                    let _ = socket.write_all(b"S").await;
                }
            }
        });

        let source = PgArrivalSource::connect_lazy(
            &format!("postgres://nobody@127.0.0.1:{port}/none?sslmode=require"),
            ArrivalTable::Primary,
            &PgSourceConfig::default().with_acquire_timeout(Duration::from_secs(1)),
        )
        .unwrap();

        let err = source.fetch(&ArrivalQuery::trip("x")).await.unwrap_err();
        assert!(matches!(err, NetworkFailure::Database(_)));
        assert!(!err.to_string().contains("without TLS support"), "{err}");
    }

    // Queries against a live database belong in an #[ignore]d integration
    // test with DATABASE_URL set.
}

//! The arrival source abstraction.

use std::future::Future;

use crate::domain::Arrival;

use super::error::NetworkFailure;
use super::file::FileArrivalSource;
use super::postgres::PgArrivalSource;

/// What to read from a source.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ArrivalQuery {
    /// Every arrival at any of these stop ids
    Stops(Vec<String>),

    /// Every stop of one trip, earliest first
    Trip(String),
}

impl ArrivalQuery {
    /// Query by stop ids. Ids are sorted and de-duplicated so equal sets
    /// produce equal queries.
    pub fn stops<I, T>(ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let mut ids: Vec<String> = ids.into_iter().map(Into::into).collect();
        ids.sort();
        ids.dedup();
        ArrivalQuery::Stops(ids)
    }

    pub fn trip(trip_id: impl Into<String>) -> Self {
        ArrivalQuery::Trip(trip_id.into())
    }

    /// Whether a row answers this query.
    pub fn matches(&self, row: &Arrival) -> bool {
        match self {
            ArrivalQuery::Stops(ids) => ids.iter().any(|id| *id == row.stop_id),
            ArrivalQuery::Trip(trip_id) => *trip_id == row.trip_id,
        }
    }
}

/// Something that can answer arrival queries.
///
/// Implementations report every failure as a [`NetworkFailure`]; retrying
/// is the coordinator's job, not theirs.
pub trait ArrivalSource: Send + Sync + 'static {
    fn fetch(
        &self,
        query: &ArrivalQuery,
    ) -> impl Future<Output = Result<Vec<Arrival>, NetworkFailure>> + Send;
}

/// The concrete sources the server can be configured with.
#[derive(Debug, Clone)]
pub enum Backend {
    Postgres(PgArrivalSource),
    File(FileArrivalSource),
}

impl ArrivalSource for Backend {
    async fn fetch(&self, query: &ArrivalQuery) -> Result<Vec<Arrival>, NetworkFailure> {
        match self {
            Backend::Postgres(source) => source.fetch(query).await,
            Backend::File(source) => source.fetch(query).await,
        }
    }
}

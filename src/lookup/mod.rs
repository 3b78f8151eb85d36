//! Flight lookup service interface

pub mod fr24;

pub use fr24::{Fr24Client, Fr24Config};

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::flight::FlightSnapshot;

/// Resolves flights against a live tracking source
#[async_trait]
pub trait FlightLookup: Send + Sync {
    /// The single flight with `code` scheduled to depart on `date`.
    ///
    /// `Ok(None)` when the service knows the code but has no (unique) match
    /// for the date.
    async fn find_by_date(
        &self,
        code: &str,
        date: NaiveDate,
    ) -> Result<Option<FlightSnapshot>, LookupError>;

    /// The flight with `code` and lookup id `flight_id`, if still listed
    async fn find_by_id(
        &self,
        code: &str,
        flight_id: &str,
    ) -> Result<Option<FlightSnapshot>, LookupError>;
}

#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    /// The service has no data at all for this flight code
    #[error("No data for flight code {0}")]
    NoData(String),

    #[error("Lookup request failed: {0}")]
    Transport(String),

    #[error("Lookup response could not be decoded: {0}")]
    Decode(String),
}

impl LookupError {
    pub fn is_no_data(&self) -> bool {
        matches!(self, LookupError::NoData(_))
    }
}

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::{cmp::Ordering, collections::BTreeMap};
use time::{format_description::FormatItem, macros::format_description, Date};

/// Calendar dates are stored and exchanged as `YYYY-MM-DD`
pub const DATE_FORMAT: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");

pub(crate) mod iso_date {
    use time::Date;

    time::serde::format_description!(format, Date, "[year]-[month]-[day]");

    pub(crate) use format::{deserialize, serialize};
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("No measurements are available in the dataset")]
    EmptyDataset,
    #[error("Failed to query sqlite: {0}")]
    Query(#[from] sqlx::Error),
    #[error("Stored date is not a valid YYYY-MM-DD date: {0}")]
    InvalidStoredDate(String),
}

/// Read-only access to the station dataset.
///
/// Implementations must be safe to call from concurrent requests; none of the
/// methods mutate the underlying records.
#[async_trait]
pub trait RecordStore: Sync + Send {
    /// Latest measurement date, fails with [`Error::EmptyDataset`] when there are no measurements
    async fn max_date(&self) -> Result<Date, Error>;
    /// Earliest measurement date, fails with [`Error::EmptyDataset`] when there are no measurements
    async fn min_date(&self) -> Result<Date, Error>;
    /// Measurements with `start <= date <= end`, ordered by date then station
    async fn measurements_in_range(&self, start: Date, end: Date)
        -> Result<Vec<Measurement>, Error>;
    async fn measurements_in_range_for_station(
        &self,
        start: Date,
        end: Date,
        station_id: &str,
    ) -> Result<Vec<Measurement>, Error>;
    async fn station_names(&self) -> Result<Vec<String>, Error>;
    /// Number of measurements per station across the whole dataset
    async fn observation_counts_by_station(&self) -> Result<BTreeMap<String, u64>, Error>;
}

/// One daily observation for one station
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Measurement {
    pub station_id: String,
    #[serde(with = "iso_date")]
    pub date: Date,
    /// Precipitation in inches, absent when the station did not report it
    pub precipitation: Option<f64>,
    /// Observed temperature in degrees Fahrenheit
    pub temperature_observation: f64,
}

impl Measurement {
    fn sort_key(&self) -> (Date, &str) {
        (self.date, self.station_id.as_str())
    }

    pub fn cmp_by_date(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Station {
    pub station_id: String,
    pub name: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub elevation: Option<f64>,
}

/// Inclusive range of calendar dates
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    #[serde(with = "iso_date")]
    pub start: Date,
    #[serde(with = "iso_date")]
    pub end: Date,
}

impl DateWindow {
    pub fn contains(&self, date: Date) -> bool {
        self.start <= date && date <= self.end
    }
}

pub fn parse_date(value: &str) -> Result<Date, time::error::Parse> {
    Date::parse(value, DATE_FORMAT)
}

pub fn format_date(date: Date) -> String {
    date.format(DATE_FORMAT).unwrap_or_else(|_| date.to_string())
}

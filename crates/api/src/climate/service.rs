use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use time::Date;
use utoipa::ToSchema;

use crate::{
    climate::{aggregate, most_observed_station, trailing_window, TemperatureSummary, TRAILING_DAYS},
    db::{self, RecordStore},
};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Failed to read dataset: {0}")]
    Store(#[from] db::Error),
}

impl Error {
    pub fn is_empty_dataset(&self) -> bool {
        matches!(self, Error::Store(db::Error::EmptyDataset))
    }
}

/// One station's precipitation reading for one date
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, ToSchema)]
pub struct PrecipitationEntry {
    #[serde(with = "crate::db::iso_date")]
    #[schema(value_type = String, format = Date, example = "2017-08-23")]
    pub date: Date,
    /// Inches of rain, null when the station did not report precipitation
    pub prcp: Option<f64>,
}

/// One temperature observation for one date
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, ToSchema)]
pub struct TemperatureEntry {
    #[serde(with = "crate::db::iso_date")]
    #[schema(value_type = String, format = Date, example = "2017-08-23")]
    pub date: Date,
    pub tobs: f64,
}

/// Earliest and latest measurement dates in the dataset
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, ToSchema)]
pub struct DateSpan {
    #[serde(with = "crate::db::iso_date")]
    #[schema(value_type = String, format = Date)]
    pub first: Date,
    #[serde(with = "crate::db::iso_date")]
    #[schema(value_type = String, format = Date)]
    pub last: Date,
}

/// The read operations served by the API, composed from the record store.
///
/// Holds no per-request state; a single instance is shared by all handlers.
pub struct QueryService {
    store: Arc<dyn RecordStore>,
}

impl QueryService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Every station's precipitation over the 365 days ending on the latest date
    pub async fn precipitation_last_year(&self) -> Result<Vec<PrecipitationEntry>, Error> {
        let end = self.store.max_date().await?;
        let window = trailing_window(end, TRAILING_DAYS);
        debug!("precipitation window: {} to {}", window.start, window.end);

        let measurements = self
            .store
            .measurements_in_range(window.start, window.end)
            .await?;

        Ok(measurements
            .into_iter()
            .map(|m| PrecipitationEntry {
                date: m.date,
                prcp: m.precipitation,
            })
            .collect())
    }

    pub async fn station_names(&self) -> Result<Vec<String>, Error> {
        Ok(self.store.station_names().await?)
    }

    /// Temperature observations of the most observed station over the last 365 days
    pub async fn top_station_temperatures_last_year(
        &self,
    ) -> Result<Vec<TemperatureEntry>, Error> {
        let station_id = most_observed_station(self.store.as_ref()).await?;
        let end = self.store.max_date().await?;
        let window = trailing_window(end, TRAILING_DAYS);
        info!(
            "temperatures for {} from {} to {}",
            station_id, window.start, window.end
        );

        let measurements = self
            .store
            .measurements_in_range_for_station(window.start, window.end, &station_id)
            .await?;

        Ok(measurements
            .into_iter()
            .map(|m| TemperatureEntry {
                date: m.date,
                tobs: m.temperature_observation,
            })
            .collect())
    }

    /// Min, mean and max temperature across all stations between `start` and `end`.
    ///
    /// `end` defaults to the latest date in the dataset. Ranges outside the
    /// data produce an empty summary rather than an error.
    pub async fn temperature_summary(
        &self,
        start: Date,
        end: Option<Date>,
    ) -> Result<TemperatureSummary, Error> {
        let end = match end {
            Some(end) => end,
            None => self.store.max_date().await?,
        };

        let measurements = self.store.measurements_in_range(start, end).await?;
        let summary = aggregate(&measurements);
        if summary.is_empty() {
            debug!("no temperature data between {} and {}", start, end);
        }

        Ok(summary)
    }

    pub async fn date_span(&self) -> Result<DateSpan, Error> {
        Ok(DateSpan {
            first: self.store.min_date().await?,
            last: self.store.max_date().await?,
        })
    }
}

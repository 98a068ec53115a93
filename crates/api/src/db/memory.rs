use async_trait::async_trait;
use itertools::Itertools;
use std::collections::BTreeMap;
use time::Date;

use super::{Error, Measurement, RecordStore, Station};

/// Record store backed by vectors loaded once at construction
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    measurements: Vec<Measurement>,
    stations: Vec<Station>,
}

impl MemoryStore {
    pub fn new(mut measurements: Vec<Measurement>, stations: Vec<Station>) -> Self {
        measurements.sort_by(Measurement::cmp_by_date);
        Self {
            measurements,
            stations,
        }
    }

    fn in_range(&self, start: Date, end: Date) -> impl Iterator<Item = &Measurement> {
        // measurements are sorted by date, so the matching rows are one contiguous run
        let first = self.measurements.partition_point(|m| m.date < start);
        self.measurements[first..]
            .iter()
            .take_while(move |m| m.date <= end)
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn max_date(&self) -> Result<Date, Error> {
        self.measurements
            .last()
            .map(|m| m.date)
            .ok_or(Error::EmptyDataset)
    }

    async fn min_date(&self) -> Result<Date, Error> {
        self.measurements
            .first()
            .map(|m| m.date)
            .ok_or(Error::EmptyDataset)
    }

    async fn measurements_in_range(
        &self,
        start: Date,
        end: Date,
    ) -> Result<Vec<Measurement>, Error> {
        Ok(self.in_range(start, end).cloned().collect())
    }

    async fn measurements_in_range_for_station(
        &self,
        start: Date,
        end: Date,
        station_id: &str,
    ) -> Result<Vec<Measurement>, Error> {
        Ok(self
            .in_range(start, end)
            .filter(|m| m.station_id == station_id)
            .cloned()
            .collect())
    }

    async fn station_names(&self) -> Result<Vec<String>, Error> {
        Ok(self.stations.iter().map(|s| s.name.clone()).collect())
    }

    async fn observation_counts_by_station(&self) -> Result<BTreeMap<String, u64>, Error> {
        Ok(self
            .measurements
            .iter()
            .map(|m| m.station_id.as_str())
            .counts()
            .into_iter()
            .map(|(station_id, count)| (station_id.to_owned(), count as u64))
            .collect())
    }
}

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::{debug, info};
use sqlx::{
    pool::PoolConnection,
    sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions},
    Sqlite,
};
use std::{collections::BTreeMap, time::Duration};
use time::Date;

use super::{format_date, parse_date, Error, Measurement, RecordStore};

type MeasurementRow = (String, String, Option<f64>, f64);

const MEASUREMENT_COLUMNS: &str = "station, date, prcp, tobs";

/// Read-only access to the station dataset stored in SQLite.
///
/// Expects the `measurement` and `station` tables of the reference dataset.
/// Every query checks out its own pooled connection and hands it back when the
/// call returns, so concurrent requests never share a connection.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub async fn open(path: &str) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .read_only(true)
            .create_if_missing(false)
            .pragma("busy_timeout", "5000")
            .pragma("cache_size", "-64000")
            .pragma("temp_store", "MEMORY");

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(30))
            .connect_with(options)
            .await
            .with_context(|| format!("Failed to open dataset: {}", path))?;

        let store = Self { pool };
        store.health_check().await?;
        info!("SQLite dataset opened at: {}", path);

        Ok(store)
    }

    /// Wrap an already configured pool, used when the caller owns the connection setup
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Check connectivity and that the dataset tables are present.
    pub async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("Database connectivity check failed")?;

        let tables: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM sqlite_master
             WHERE type = 'table' AND name IN ('measurement', 'station')",
        )
        .fetch_one(&self.pool)
        .await
        .context("Failed to inspect dataset schema")?;
        if tables != 2 {
            return Err(anyhow::anyhow!(
                "Dataset is missing the measurement or station table"
            ));
        }

        Ok(())
    }

    async fn connection(&self) -> Result<PoolConnection<Sqlite>, Error> {
        Ok(self.pool.acquire().await?)
    }

    async fn date_bound(&self, sql: &str) -> Result<Date, Error> {
        let mut conn = self.connection().await?;
        let value: Option<String> = sqlx::query_scalar(sql).fetch_one(&mut *conn).await?;
        match value {
            Some(date) => to_date(&date),
            None => Err(Error::EmptyDataset),
        }
    }
}

fn to_date(value: &str) -> Result<Date, Error> {
    parse_date(value).map_err(|_| Error::InvalidStoredDate(value.to_owned()))
}

fn to_measurements(rows: Vec<MeasurementRow>) -> Result<Vec<Measurement>, Error> {
    rows.into_iter()
        .map(|(station_id, date, precipitation, temperature_observation)| {
            Ok(Measurement {
                station_id,
                date: to_date(&date)?,
                precipitation,
                temperature_observation,
            })
        })
        .collect()
}

#[async_trait]
impl RecordStore for SqliteStore {
    async fn max_date(&self) -> Result<Date, Error> {
        self.date_bound("SELECT MAX(date) FROM measurement").await
    }

    async fn min_date(&self) -> Result<Date, Error> {
        self.date_bound("SELECT MIN(date) FROM measurement").await
    }

    async fn measurements_in_range(
        &self,
        start: Date,
        end: Date,
    ) -> Result<Vec<Measurement>, Error> {
        debug!("querying measurements between {} and {}", start, end);
        let mut conn = self.connection().await?;
        let rows: Vec<MeasurementRow> = sqlx::query_as(&format!(
            "SELECT {} FROM measurement
             WHERE date BETWEEN ? AND ?
             ORDER BY date, station",
            MEASUREMENT_COLUMNS
        ))
        .bind(format_date(start))
        .bind(format_date(end))
        .fetch_all(&mut *conn)
        .await?;

        to_measurements(rows)
    }

    async fn measurements_in_range_for_station(
        &self,
        start: Date,
        end: Date,
        station_id: &str,
    ) -> Result<Vec<Measurement>, Error> {
        debug!(
            "querying measurements for {} between {} and {}",
            station_id, start, end
        );
        let mut conn = self.connection().await?;
        let rows: Vec<MeasurementRow> = sqlx::query_as(&format!(
            "SELECT {} FROM measurement
             WHERE date BETWEEN ? AND ? AND station = ?
             ORDER BY date, station",
            MEASUREMENT_COLUMNS
        ))
        .bind(format_date(start))
        .bind(format_date(end))
        .bind(station_id)
        .fetch_all(&mut *conn)
        .await?;

        to_measurements(rows)
    }

    async fn station_names(&self) -> Result<Vec<String>, Error> {
        let mut conn = self.connection().await?;
        let names: Vec<String> = sqlx::query_scalar("SELECT name FROM station ORDER BY rowid")
            .fetch_all(&mut *conn)
            .await?;
        Ok(names)
    }

    async fn observation_counts_by_station(&self) -> Result<BTreeMap<String, u64>, Error> {
        let mut conn = self.connection().await?;
        let rows: Vec<(String, i64)> =
            sqlx::query_as("SELECT station, COUNT(*) FROM measurement GROUP BY station")
                .fetch_all(&mut *conn)
                .await?;

        Ok(rows
            .into_iter()
            .map(|(station_id, count)| (station_id, count.max(0) as u64))
            .collect())
    }
}

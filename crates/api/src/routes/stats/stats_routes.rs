use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use log::error;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use time::Date;
use utoipa::IntoParams;

use crate::{
    climate::{self, PrecipitationEntry, TemperatureEntry, TemperatureSummary},
    db::parse_date,
    AppState,
};

#[derive(Clone, Debug, Deserialize, Serialize, IntoParams)]
pub struct RangeParams {
    /// First date of the range, YYYY-MM-DD
    pub start: String,
    /// Last date of the range, YYYY-MM-DD; defaults to the latest date in the dataset
    pub end: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/v1.0/precipitation",
    responses(
        (status = OK, description = "Precipitation of every station over the last year of data", body = Vec<PrecipitationEntry>),
        (status = INTERNAL_SERVER_ERROR, description = "Failed to read the dataset")
    ))]
pub async fn precipitation(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<PrecipitationEntry>>, (StatusCode, String)> {
    state
        .queries
        .precipitation_last_year()
        .await
        .map(Json)
        .map_err(|e| query_failed("precipitation", e))
}

#[utoipa::path(
    get,
    path = "/api/v1.0/stations",
    responses(
        (status = OK, description = "Names of all stations in the dataset", body = Vec<String>),
        (status = INTERNAL_SERVER_ERROR, description = "Failed to read the dataset")
    ))]
pub async fn stations(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<String>>, (StatusCode, String)> {
    state
        .queries
        .station_names()
        .await
        .map(Json)
        .map_err(|e| query_failed("stations", e))
}

#[utoipa::path(
    get,
    path = "/api/v1.0/tobs",
    responses(
        (status = OK, description = "Temperature observations of the most observed station over the last year of data", body = Vec<TemperatureEntry>),
        (status = INTERNAL_SERVER_ERROR, description = "Failed to read the dataset")
    ))]
pub async fn tobs(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<TemperatureEntry>>, (StatusCode, String)> {
    state
        .queries
        .top_station_temperatures_last_year()
        .await
        .map(Json)
        .map_err(|e| query_failed("tobs", e))
}

#[utoipa::path(
    get,
    path = "/api/v1.0/{start}",
    params(
        ("start" = String, Path, description = "First date of the range, YYYY-MM-DD"),
    ),
    responses(
        (status = OK, description = "[min, avg, max] temperature from start to the latest date, nulls when no data", body = Vec<Option<f64>>),
        (status = BAD_REQUEST, description = "Start is not a YYYY-MM-DD date"),
        (status = INTERNAL_SERVER_ERROR, description = "Failed to read the dataset")
    ))]
pub async fn range_from(
    State(state): State<Arc<AppState>>,
    Path(start): Path<String>,
) -> Result<Json<[Option<f64>; 3]>, (StatusCode, String)> {
    let start = date_param("start", &start)?;
    let summary = summarize(&state, start, None).await?;
    Ok(Json(summary.into()))
}

#[utoipa::path(
    get,
    path = "/api/v1.0/{start}/{end}",
    params(
        ("start" = String, Path, description = "First date of the range, YYYY-MM-DD"),
        ("end" = String, Path, description = "Last date of the range, YYYY-MM-DD"),
    ),
    responses(
        (status = OK, description = "[min, avg, max] temperature between start and end inclusive, nulls when no data", body = Vec<Option<f64>>),
        (status = BAD_REQUEST, description = "Start or end is not a YYYY-MM-DD date"),
        (status = INTERNAL_SERVER_ERROR, description = "Failed to read the dataset")
    ))]
pub async fn range_between(
    State(state): State<Arc<AppState>>,
    Path((start, end)): Path<(String, String)>,
) -> Result<Json<[Option<f64>; 3]>, (StatusCode, String)> {
    let start = date_param("start", &start)?;
    let end = date_param("end", &end)?;
    let summary = summarize(&state, start, Some(end)).await?;
    Ok(Json(summary.into()))
}

#[utoipa::path(
    get,
    path = "/api/v1.0/summary",
    params(RangeParams),
    responses(
        (status = OK, description = "Named min/avg/max temperature for the range", body = TemperatureSummary),
        (status = BAD_REQUEST, description = "Start or end is not a YYYY-MM-DD date"),
        (status = INTERNAL_SERVER_ERROR, description = "Failed to read the dataset")
    ))]
pub async fn temperature_summary(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RangeParams>,
) -> Result<Json<TemperatureSummary>, (StatusCode, String)> {
    let start = date_param("start", &params.start)?;
    let end = params
        .end
        .as_deref()
        .map(|end| date_param("end", end))
        .transpose()?;
    let summary = summarize(&state, start, end).await?;
    Ok(Json(summary))
}

async fn summarize(
    state: &AppState,
    start: Date,
    end: Option<Date>,
) -> Result<TemperatureSummary, (StatusCode, String)> {
    state
        .queries
        .temperature_summary(start, end)
        .await
        .map_err(|e| query_failed("temperature summary", e))
}

fn date_param(name: &str, value: &str) -> Result<Date, (StatusCode, String)> {
    parse_date(value).map_err(|e| {
        error!("invalid {} date {:?}: {}", name, value, e);
        (
            StatusCode::BAD_REQUEST,
            format!("Invalid {} date {:?}, expected YYYY-MM-DD: {}", name, value, e),
        )
    })
}

fn query_failed(operation: &str, err: climate::Error) -> (StatusCode, String) {
    if err.is_empty_dataset() {
        error!("dataset has no measurements, cannot serve {}", operation);
    } else {
        error!("error serving {}: {}", operation, err);
    }
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        format!("Failed to load {}: {}", operation, err),
    )
}

use crate::{
    climate::{self, QueryService},
    db::{RecordStore, SqliteStore},
    index_handler, precipitation, range_between, range_from, routes, stations,
    temperature_summary, tobs,
};
use anyhow::anyhow;
use axum::{
    body::Body,
    extract::Request,
    middleware::{self, Next},
    response::IntoResponse,
    routing::get,
    Router,
};
use climate_core::is_file;
use hyper::{
    header::{ACCEPT, CONTENT_TYPE},
    Method,
};
use log::info;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

#[derive(Clone)]
pub struct AppState {
    pub remote_url: String,
    pub queries: Arc<QueryService>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        routes::stats::stats_routes::precipitation,
        routes::stats::stats_routes::stations,
        routes::stats::stats_routes::tobs,
        routes::stats::stats_routes::range_from,
        routes::stats::stats_routes::range_between,
        routes::stats::stats_routes::temperature_summary,
    ),
    components(
        schemas(
                climate::PrecipitationEntry,
                climate::TemperatureEntry,
                climate::TemperatureSummary,
                climate::DateSpan,
        )
    ),
    tags(
        (name = "climate api", description = "a read-only api for precipitation and temperature statistics from a fixed station dataset")
    )
)]
struct ApiDoc;

pub fn app_state(remote_url: String, store: Arc<dyn RecordStore>) -> AppState {
    AppState {
        remote_url,
        queries: Arc::new(QueryService::new(store)),
    }
}

pub async fn build_app_state(
    remote_url: String,
    database: String,
) -> Result<AppState, anyhow::Error> {
    if !is_file(&database) {
        return Err(anyhow!("dataset not found at: {}", database));
    }

    let store = SqliteStore::open(&database)
        .await
        .map_err(|e| anyhow!("error opening dataset: {}", e))?;

    Ok(app_state(remote_url, Arc::new(store)))
}

pub fn app(app_state: AppState) -> Router {
    let api_docs = ApiDoc::openapi();
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([ACCEPT, CONTENT_TYPE])
        .allow_origin(Any);

    Router::new()
        .route("/", get(index_handler))
        .route("/api/v1.0/precipitation", get(precipitation))
        .route("/api/v1.0/stations", get(stations))
        .route("/api/v1.0/tobs", get(tobs))
        .route("/api/v1.0/summary", get(temperature_summary))
        .route("/api/v1.0/{start}", get(range_from))
        .route("/api/v1.0/{start}/{end}", get(range_between))
        .with_state(Arc::new(app_state))
        .layer(middleware::from_fn(log_request))
        .merge(Scalar::with_url("/docs", api_docs))
        .layer(cors)
}

async fn log_request(request: Request<Body>, next: Next) -> impl IntoResponse {
    let now = time::OffsetDateTime::now_utc();
    let path = request
        .uri()
        .path_and_query()
        .map(|p| p.as_str())
        .unwrap_or_default();
    info!(target: "http_request", "new request, {} {}", request.method().as_str(), path);

    let response = next.run(request).await;
    let response_time = time::OffsetDateTime::now_utc() - now;
    info!(target: "http_response", "response, code: {}, time: {}", response.status().as_str(), response_time);

    response
}

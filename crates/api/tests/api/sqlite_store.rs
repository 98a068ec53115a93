use climate_api::{
    db::{Error, RecordStore, SqliteStore},
    QueryService,
};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::{env, fs, path::PathBuf, process, str::FromStr, sync::Arc};
use time::macros::date;

const MEASUREMENTS: &[(&str, &str, Option<f64>, f64)] = &[
    ("USC00519397", "2016-08-22", Some(0.4), 70.0),
    ("USC00519397", "2016-08-23", Some(0.0), 81.0),
    ("USC00513117", "2016-08-23", Some(0.15), 76.0),
    ("USC00519397", "2017-08-22", None, 77.0),
    ("USC00513117", "2017-08-22", Some(0.0), 79.0),
    ("USC00519397", "2017-08-23", Some(0.0), 80.0),
];

const STATIONS: &[(&str, &str)] = &[
    ("USC00519397", "WAIKIKI 717.2, HI US"),
    ("USC00513117", "KANEOHE 838.1, HI US"),
];

// A single long-lived connection keeps the in-memory database alive
async fn memory_pool() -> SqlitePool {
    let options = SqliteConnectOptions::from_str("sqlite::memory:").unwrap();
    SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .unwrap()
}

async fn create_tables(pool: &SqlitePool) {
    sqlx::query(
        "CREATE TABLE measurement (
            id INTEGER PRIMARY KEY,
            station TEXT,
            date TEXT,
            prcp FLOAT,
            tobs FLOAT
        )",
    )
    .execute(pool)
    .await
    .unwrap();
    sqlx::query(
        "CREATE TABLE station (
            id INTEGER PRIMARY KEY,
            station TEXT,
            name TEXT,
            latitude FLOAT,
            longitude FLOAT,
            elevation FLOAT
        )",
    )
    .execute(pool)
    .await
    .unwrap();
}

async fn seed(pool: &SqlitePool) {
    create_tables(pool).await;

    for (station, date, prcp, tobs) in MEASUREMENTS {
        sqlx::query("INSERT INTO measurement (station, date, prcp, tobs) VALUES (?, ?, ?, ?)")
            .bind(*station)
            .bind(*date)
            .bind(*prcp)
            .bind(*tobs)
            .execute(pool)
            .await
            .unwrap();
    }
    for (station, name) in STATIONS {
        sqlx::query(
            "INSERT INTO station (station, name, latitude, longitude, elevation)
             VALUES (?, ?, 21.27, -157.82, 3.0)",
        )
        .bind(*station)
        .bind(*name)
        .execute(pool)
        .await
        .unwrap();
    }
}

async fn seeded_store() -> SqliteStore {
    let pool = memory_pool().await;
    seed(&pool).await;
    SqliteStore::from_pool(pool)
}

// Writes a seeded dataset file to a fresh directory under the system temp dir
async fn dataset_file(dir_name: &str) -> PathBuf {
    let dir = env::temp_dir().join(format!("{}-{}", dir_name, process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join("hawaii.sqlite");

    let options = SqliteConnectOptions::new()
        .filename(&path)
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .unwrap();
    seed(&pool).await;
    pool.close().await;

    path
}

#[tokio::test]
async fn health_check_requires_dataset_tables() {
    let store = seeded_store().await;
    assert!(store.health_check().await.is_ok());

    let bare = SqliteStore::from_pool(memory_pool().await);
    assert!(bare.health_check().await.is_err());
}

#[tokio::test]
async fn open_fails_for_missing_file() {
    let result = SqliteStore::open("/nonexistent/dir/hawaii.sqlite").await;
    assert!(result.is_err());
}

#[tokio::test]
async fn opens_dataset_under_directory_with_url_characters() {
    let path = dataset_file("climate-api-q?x#1%20").await;

    let store = SqliteStore::open(path.to_str().unwrap()).await.unwrap();
    assert_eq!(store.max_date().await.unwrap(), date!(2017 - 08 - 23));

    fs::remove_dir_all(path.parent().unwrap()).unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_queries_share_one_store() {
    let path = dataset_file("climate-api-concurrent").await;
    let store = Arc::new(SqliteStore::open(path.to_str().unwrap()).await.unwrap());

    let handles: Vec<_> = (0..20)
        .map(|_| {
            let store = Arc::clone(&store);
            tokio::spawn(async move {
                let latest = store.max_date().await.unwrap();
                let rows = store
                    .measurements_in_range(date!(2016 - 08 - 23), latest)
                    .await
                    .unwrap();
                (latest, rows)
            })
        })
        .collect();

    let mut results = Vec::new();
    for handle in handles {
        results.push(handle.await.unwrap());
    }

    let (latest, rows) = &results[0];
    assert_eq!(*latest, date!(2017 - 08 - 23));
    assert_eq!(rows.len(), 5);
    assert!(results.iter().all(|result| result == &results[0]));

    fs::remove_dir_all(path.parent().unwrap()).unwrap();
}

#[tokio::test]
async fn reads_date_bounds() {
    let store = seeded_store().await;
    assert_eq!(store.max_date().await.unwrap(), date!(2017 - 08 - 23));
    assert_eq!(store.min_date().await.unwrap(), date!(2016 - 08 - 22));
}

#[tokio::test]
async fn empty_tables_have_no_max_date() {
    let pool = memory_pool().await;
    create_tables(&pool).await;
    let store = SqliteStore::from_pool(pool);

    assert!(matches!(store.max_date().await, Err(Error::EmptyDataset)));
    assert!(store.station_names().await.unwrap().is_empty());
    assert!(store
        .observation_counts_by_station()
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn range_query_is_inclusive_and_ordered() {
    let store = seeded_store().await;
    let rows = store
        .measurements_in_range(date!(2016 - 08 - 23), date!(2017 - 08 - 22))
        .await
        .unwrap();

    let keys: Vec<(String, Option<f64>)> = rows
        .iter()
        .map(|m| (format!("{} {}", m.date, m.station_id), m.precipitation))
        .collect();
    assert_eq!(
        keys,
        vec![
            (String::from("2016-08-23 USC00513117"), Some(0.15)),
            (String::from("2016-08-23 USC00519397"), Some(0.0)),
            (String::from("2017-08-22 USC00513117"), Some(0.0)),
            (String::from("2017-08-22 USC00519397"), None),
        ]
    );
}

#[tokio::test]
async fn station_filter_and_counts() {
    let store = seeded_store().await;
    let rows = store
        .measurements_in_range_for_station(
            date!(2016 - 01 - 01),
            date!(2017 - 12 - 31),
            "USC00513117",
        )
        .await
        .unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|m| m.station_id == "USC00513117"));

    let counts = store.observation_counts_by_station().await.unwrap();
    assert_eq!(counts.get("USC00519397"), Some(&4));
    assert_eq!(counts.get("USC00513117"), Some(&2));
}

#[tokio::test]
async fn station_names_follow_table_order() {
    let store = seeded_store().await;
    assert_eq!(
        store.station_names().await.unwrap(),
        vec!["WAIKIKI 717.2, HI US", "KANEOHE 838.1, HI US"]
    );
}

#[tokio::test]
async fn query_service_over_sqlite() {
    let service = QueryService::new(Arc::new(seeded_store().await));

    let precipitation = service.precipitation_last_year().await.unwrap();
    assert_eq!(precipitation.len(), 5);
    assert_eq!(precipitation[0].date, date!(2016 - 08 - 23));

    let tobs = service.top_station_temperatures_last_year().await.unwrap();
    let values: Vec<f64> = tobs.iter().map(|t| t.tobs).collect();
    assert_eq!(values, vec![81.0, 77.0, 80.0]);

    let summary = service
        .temperature_summary(date!(2017 - 08 - 22), Some(date!(2017 - 08 - 22)))
        .await
        .unwrap();
    assert_eq!(summary.min, Some(77.0));
    assert_eq!(summary.avg, Some(78.0));
    assert_eq!(summary.max, Some(79.0));
}

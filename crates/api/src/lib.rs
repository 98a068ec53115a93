pub mod climate;
pub mod db;
pub mod routes;
pub mod startup;
pub mod templates;
mod utils;

pub use climate::{
    DateSpan, PrecipitationEntry, QueryService, TemperatureEntry, TemperatureSummary,
};
pub use db::{DateWindow, Measurement, MemoryStore, RecordStore, SqliteStore, Station};
pub use routes::*;
pub use startup::*;
pub use utils::*;

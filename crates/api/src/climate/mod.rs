pub mod aggregate;
pub mod ranking;
pub mod service;
pub mod window;

pub use aggregate::{aggregate, TemperatureSummary};
pub use ranking::most_observed_station;
pub use service::*;
pub use window::{trailing_window, TRAILING_DAYS};

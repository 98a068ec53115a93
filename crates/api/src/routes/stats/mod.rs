pub mod stats_routes;

pub use stats_routes::*;

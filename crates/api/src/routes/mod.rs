pub mod home;
pub mod stats;

pub use home::*;
pub use stats::*;

use time::{Date, Duration};

use crate::db::DateWindow;

/// Days covered by the "last year" endpoints
pub const TRAILING_DAYS: u32 = 365;

/// Window ending on `anchor` and reaching back `days` calendar days.
///
/// The subtraction counts calendar days, so a window that spans a leap day
/// starts one date later than the same anchor a year earlier.
pub fn trailing_window(anchor: Date, days: u32) -> DateWindow {
    DateWindow {
        start: anchor.saturating_sub(Duration::days(i64::from(days))),
        end: anchor,
    }
}

use itertools::{Itertools, MinMaxResult};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::db::Measurement;

/// Minimum, mean and maximum of the temperature observations in a range.
///
/// All three are `None` when the range held no observations.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default, ToSchema)]
pub struct TemperatureSummary {
    pub min: Option<f64>,
    pub avg: Option<f64>,
    pub max: Option<f64>,
}

impl TemperatureSummary {
    pub fn is_empty(&self) -> bool {
        self.min.is_none() && self.avg.is_none() && self.max.is_none()
    }
}

/// Positional `[min, avg, max]` form served by the range endpoints
impl From<TemperatureSummary> for [Option<f64>; 3] {
    fn from(summary: TemperatureSummary) -> Self {
        [summary.min, summary.avg, summary.max]
    }
}

pub fn aggregate(measurements: &[Measurement]) -> TemperatureSummary {
    let temperatures = measurements.iter().map(|m| m.temperature_observation);

    let (min, max) = match temperatures.clone().minmax_by(|a, b| a.total_cmp(b)) {
        MinMaxResult::NoElements => return TemperatureSummary::default(),
        MinMaxResult::OneElement(value) => (value, value),
        MinMaxResult::MinMax(min, max) => (min, max),
    };
    let avg = temperatures.sum::<f64>() / measurements.len() as f64;

    TemperatureSummary {
        min: Some(min),
        avg: Some(avg),
        max: Some(max),
    }
}

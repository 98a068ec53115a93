use log::debug;
use std::{cmp::Ordering, collections::BTreeMap};

use crate::db::{Error, RecordStore};

/// Station with the most measurements in the whole dataset.
///
/// Ties go to the lexicographically smallest station id.
pub async fn most_observed_station(store: &dyn RecordStore) -> Result<String, Error> {
    let counts = store.observation_counts_by_station().await?;
    let station_id = top_station(&counts).ok_or(Error::EmptyDataset)?;
    debug!(
        "most observed station: {} ({} measurements)",
        station_id, counts[station_id]
    );
    Ok(station_id.to_owned())
}

fn top_station(counts: &BTreeMap<String, u64>) -> Option<&str> {
    counts
        .iter()
        .filter(|(_, count)| **count > 0)
        .max_by(|(a_id, a_count), (b_id, b_count)| match a_count.cmp(b_count) {
            // reversed so the smaller id counts as the larger element on ties
            Ordering::Equal => b_id.cmp(a_id),
            other => other,
        })
        .map(|(station_id, _)| station_id.as_str())
}

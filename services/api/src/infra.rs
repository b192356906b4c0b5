use chrono::NaiveDateTime;
use metrics_exporter_prometheus::PrometheusHandle;
use nemt_dispatch::workflows::dispatch::{
    next_revision, RepositoryError, TripId, TripRecord, TripRepository, TripStatus,
};
use nemt_dispatch::workflows::fulfillment::{MobilityType, RankingConfig};
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) ranking: RankingConfig,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryTripRepository {
    records: Arc<Mutex<HashMap<TripId, TripRecord>>>,
}

impl TripRepository for InMemoryTripRepository {
    fn insert(&self, record: TripRecord) -> Result<TripRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.trip_id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.trip_id.clone(), record.clone());
        Ok(record)
    }

    fn update(&self, record: TripRecord) -> Result<TripRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let stored = guard
            .get(&record.trip_id)
            .ok_or(RepositoryError::NotFound)?;
        let next = next_revision(stored, record)?;
        guard.insert(next.trip_id.clone(), next.clone());
        Ok(next)
    }

    fn fetch(&self, id: &TripId) -> Result<Option<TripRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn open(&self, limit: usize) -> Result<Vec<TripRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        let mut open: Vec<TripRecord> = guard
            .values()
            .filter(|record| {
                matches!(
                    record.status,
                    TripStatus::Searching | TripStatus::OptionsReady
                )
            })
            .cloned()
            .collect();
        open.sort_by(|a, b| a.trip_id.0.cmp(&b.trip_id.0));
        open.truncate(limit);
        Ok(open)
    }
}

pub(crate) fn parse_level(raw: &str) -> Result<MobilityType, String> {
    raw.parse::<MobilityType>().map_err(|err| err.to_string())
}

pub(crate) fn parse_pickup_time(raw: &str) -> Result<NaiveDateTime, String> {
    NaiveDateTime::parse_from_str(raw.trim(), "%Y-%m-%dT%H:%M")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DDTHH:MM ({err})"))
}

pub(crate) fn parse_miles(raw: &str) -> Result<f64, String> {
    let miles = raw
        .trim()
        .parse::<f64>()
        .map_err(|err| format!("failed to parse '{raw}' as miles ({err})"))?;
    if miles.is_finite() && miles >= 0.0 {
        Ok(miles)
    } else {
        Err(format!("miles must be a non-negative number, got {raw}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_cli_values() {
        assert_eq!(parse_level("stretcher"), Ok(MobilityType::Stretcher));
        assert!(parse_level("hovercraft").is_err());
        assert!(parse_pickup_time("2025-11-03T08:30").is_ok());
        assert!(parse_pickup_time("11/03/2025").is_err());
        assert_eq!(parse_miles("12.5"), Ok(12.5));
        assert!(parse_miles("-2").is_err());
    }
}

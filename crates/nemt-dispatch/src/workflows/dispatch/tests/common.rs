use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::workflows::dispatch::domain::{PickupWindow, TripId, TripRequest, TripStatus};
use crate::workflows::dispatch::repository::{
    next_revision, RepositoryError, TripRecord, TripRepository,
};
use crate::workflows::dispatch::{dispatch_router, DispatchService};
use crate::workflows::fulfillment::{
    Address, Capabilities, FleetAssignment, FulfillmentOption, GeoPoint, MarketplaceBid,
    MobilityType, OptionId, RankingConfig, SpecialNeed, TncQuote, TripConstraints,
};

pub(super) fn address(label: &str, street: &str, latitude: f64, longitude: f64) -> Address {
    Address {
        label: label.to_string(),
        street: street.to_string(),
        city: "Des Moines".to_string(),
        state: "IA".to_string(),
        zip: "50309".to_string(),
        location: GeoPoint {
            latitude,
            longitude,
        },
    }
}

pub(super) fn trip_request() -> TripRequest {
    TripRequest {
        pickup: address("Home", "1420 Woodland Ave", 41.5912, -93.6374),
        dropoff: address("Dialysis Center", "1221 Pleasant St", 41.5966, -93.6304),
        constraints: TripConstraints {
            mobility_type: MobilityType::Wheelchair,
            special_needs: [SpecialNeed::Oxygen].into_iter().collect(),
            escort_count: 1,
        },
        pickup_window: PickupWindow::Scheduled {
            pickup_at: NaiveDate::from_ymd_opt(2025, 11, 3)
                .expect("valid date")
                .and_hms_opt(8, 30, 0)
                .expect("valid time"),
        },
    }
}

pub(super) fn search_results() -> Vec<FulfillmentOption> {
    use MobilityType::*;
    vec![
        FulfillmentOption::Fleet(FleetAssignment {
            id: OptionId::new("fleet-12"),
            vehicle_name: "Wheelchair Van 12".to_string(),
            driver_name: Some("Dana Whitfield".to_string()),
            internal_cost: 38.0,
            eta_minutes: 22,
            capabilities: Capabilities::new([Ambulatory, Wheelchair], [SpecialNeed::Oxygen]),
        }),
        FulfillmentOption::Tnc(TncQuote {
            id: OptionId::new("tnc-uber"),
            display_name: "Uber Health".to_string(),
            product: "UberX".to_string(),
            cost: 19.5,
            eta_minutes: 6,
            capabilities: Capabilities::new([Ambulatory], []),
        }),
        FulfillmentOption::Marketplace(MarketplaceBid {
            id: OptionId::new("bid-metro"),
            provider_name: "Metro Medical Transport".to_string(),
            cost: 44.0,
            eta_minutes: 12,
            rating: 4.8,
            capabilities: Capabilities::new(
                [Ambulatory, Wheelchair, Stretcher],
                [SpecialNeed::Oxygen, SpecialNeed::Monitor],
            ),
        }),
    ]
}

pub(super) fn build_service() -> (DispatchService<MemoryTripRepository>, Arc<MemoryTripRepository>) {
    let repository = Arc::new(MemoryTripRepository::default());
    let service = DispatchService::new(repository.clone(), RankingConfig::default());
    (service, repository)
}

pub(super) fn router_with_service(service: DispatchService<MemoryTripRepository>) -> axum::Router {
    dispatch_router(Arc::new(service))
}

#[derive(Default, Clone)]
pub(super) struct MemoryTripRepository {
    pub(super) records: Arc<Mutex<HashMap<TripId, TripRecord>>>,
}

impl TripRepository for MemoryTripRepository {
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
        Ok(guard
            .values()
            .filter(|record| {
                matches!(
                    record.status,
                    TripStatus::Searching | TripStatus::OptionsReady
                )
            })
            .take(limit)
            .cloned()
            .collect())
    }
}

pub(super) struct UnavailableRepository;

impl TripRepository for UnavailableRepository {
    fn insert(&self, _record: TripRecord) -> Result<TripRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _record: TripRecord) -> Result<TripRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &TripId) -> Result<Option<TripRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn open(&self, _limit: usize) -> Result<Vec<TripRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

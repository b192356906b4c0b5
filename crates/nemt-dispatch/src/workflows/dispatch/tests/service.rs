use super::common::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

use axum::http::StatusCode;

use crate::workflows::dispatch::domain::{TripId, TripStatus};
use crate::workflows::dispatch::repository::{RepositoryError, TripRecord, TripRepository};
use crate::workflows::dispatch::router::status_for;
use crate::workflows::dispatch::{DispatchError, DispatchService};
use crate::workflows::fulfillment::{
    calculate_mileage, MobilityType, OptionId, OptionKind, RankingConfig, TopPickBadge,
};
use crate::workflows::pricing::mock_pricing_result;

#[test]
fn post_trip_measures_and_prices_the_request() {
    let (service, repository) = build_service();
    let request = trip_request();
    let expected_miles = calculate_mileage(&request.pickup, &request.dropoff);

    let record = service.post_trip(request).expect("trip posts");

    assert!(record.trip_id.0.starts_with("trip-"));
    assert_eq!(record.status, TripStatus::Searching);
    assert_eq!(record.mileage, expected_miles);
    assert_eq!(
        record.pricing,
        mock_pricing_result(expected_miles, MobilityType::Wheelchair)
    );
    assert!(repository
        .fetch(&record.trip_id)
        .expect("fetch")
        .is_some());
}

#[test]
fn post_trip_rejects_out_of_range_coordinates() {
    let (service, _) = build_service();
    let mut request = trip_request();
    request.dropoff.location.latitude = 123.0;

    match service.post_trip(request) {
        Err(DispatchError::InvalidLocation { field: "dropoff" }) => {}
        other => panic!("expected invalid dropoff, got {other:?}"),
    }
}

#[test]
fn recording_options_ranks_them_against_trip_constraints() {
    let (service, _) = build_service();
    let record = service.post_trip(trip_request()).expect("trip posts");

    let board = service
        .record_options(&record.trip_id, search_results())
        .expect("options recorded");

    // Wheelchair + oxygen rules out the rideshare.
    let picks: Vec<(TopPickBadge, &str)> = board
        .top_picks
        .iter()
        .map(|pick| (pick.badge, pick.option.id().0.as_str()))
        .collect();
    assert_eq!(
        picks,
        vec![
            (TopPickBadge::Cheapest, "fleet-12"),
            (TopPickBadge::Fastest, "bid-metro"),
        ]
    );
    assert!(board.remaining.compatible.is_empty());
    assert_eq!(board.remaining.incompatible.len(), 1);
    assert_eq!(
        service.get(&record.trip_id).expect("stored").status,
        TripStatus::OptionsReady
    );
    assert_eq!(service.board(&record.trip_id).expect("board"), board);
}

#[test]
fn duplicate_or_negative_options_are_rejected() {
    let (service, _) = build_service();
    let record = service.post_trip(trip_request()).expect("trip posts");

    let mut duplicated = search_results();
    duplicated.push(duplicated[0].clone());
    assert!(matches!(
        service.record_options(&record.trip_id, duplicated),
        Err(DispatchError::DuplicateOption(id)) if id == OptionId::new("fleet-12")
    ));

    let mut negative = search_results();
    if let crate::workflows::fulfillment::FulfillmentOption::Tnc(quote) = &mut negative[1] {
        quote.cost = -3.0;
    }
    assert!(matches!(
        service.record_options(&record.trip_id, negative),
        Err(DispatchError::InvalidCost { .. })
    ));
    assert_eq!(
        service.get(&record.trip_id).expect("stored").status,
        TripStatus::Searching
    );
}

#[test]
fn assign_records_badge_and_provider() {
    let (service, _) = build_service();
    let record = service.post_trip(trip_request()).expect("trip posts");
    service
        .record_options(&record.trip_id, search_results())
        .expect("options recorded");

    let assignment = service
        .assign(&record.trip_id, &OptionId::new("bid-metro"))
        .expect("assignment succeeds");

    assert_eq!(assignment.kind, OptionKind::Marketplace);
    assert_eq!(assignment.provider_label, "Metro Medical Transport");
    assert_eq!(assignment.cost, 44.0);
    assert_eq!(assignment.badge, Some(TopPickBadge::Fastest));

    let stored = service.get(&record.trip_id).expect("stored");
    assert_eq!(stored.status, TripStatus::Assigned);
    assert_eq!(stored.assignment, Some(assignment));
}

#[test]
fn assign_rejects_incompatible_and_unknown_options() {
    let (service, _) = build_service();
    let record = service.post_trip(trip_request()).expect("trip posts");
    service
        .record_options(&record.trip_id, search_results())
        .expect("options recorded");

    match service.assign(&record.trip_id, &OptionId::new("tnc-uber")) {
        Err(DispatchError::IncompatibleOption { reasons, .. }) => {
            assert!(reasons.contains("Wheelchair"));
            assert!(reasons.contains("Oxygen"));
        }
        other => panic!("expected incompatible option, got {other:?}"),
    }

    assert!(matches!(
        service.assign(&record.trip_id, &OptionId::new("ghost")),
        Err(DispatchError::UnknownOption { .. })
    ));
}

#[test]
fn assign_requires_options_first() {
    let (service, _) = build_service();
    let record = service.post_trip(trip_request()).expect("trip posts");

    assert!(matches!(
        service.assign(&record.trip_id, &OptionId::new("fleet-12")),
        Err(DispatchError::InvalidTransition {
            status: "searching",
            ..
        })
    ));
}

#[test]
fn cancelled_trips_reject_further_changes() {
    let (service, _) = build_service();
    let record = service.post_trip(trip_request()).expect("trip posts");

    let cancelled = service.cancel(&record.trip_id).expect("cancel succeeds");
    assert_eq!(cancelled.status, TripStatus::Cancelled);

    assert!(matches!(
        service.record_options(&record.trip_id, search_results()),
        Err(DispatchError::InvalidTransition { .. })
    ));
    assert!(matches!(
        service.cancel(&record.trip_id),
        Err(DispatchError::InvalidTransition { .. })
    ));
    assert!(service.open_trips(10).expect("open trips").is_empty());
}

#[test]
fn unknown_trip_is_reported() {
    let (service, _) = build_service();
    assert!(matches!(
        service.get(&TripId("trip-missing".to_string())),
        Err(DispatchError::TripNotFound(_))
    ));
}

#[test]
fn repository_outage_surfaces_as_server_error() {
    let service = DispatchService::new(Arc::new(UnavailableRepository), RankingConfig::default());

    let error = service.post_trip(trip_request()).expect_err("insert fails");

    assert!(matches!(
        error,
        DispatchError::Repository(RepositoryError::Unavailable(_))
    ));
    assert_eq!(status_for(&error), StatusCode::INTERNAL_SERVER_ERROR);
}

/// Holds the next `gated` readers at a barrier after they have read, so their writes race.
struct RacingRepository {
    inner: MemoryTripRepository,
    barrier: Barrier,
    gated: AtomicUsize,
}

impl RacingRepository {
    fn new(readers: usize) -> Self {
        Self {
            inner: MemoryTripRepository::default(),
            barrier: Barrier::new(readers),
            gated: AtomicUsize::new(0),
        }
    }
}

impl TripRepository for RacingRepository {
    fn insert(&self, record: TripRecord) -> Result<TripRecord, RepositoryError> {
        self.inner.insert(record)
    }

    fn update(&self, record: TripRecord) -> Result<TripRecord, RepositoryError> {
        self.inner.update(record)
    }

    fn fetch(&self, id: &TripId) -> Result<Option<TripRecord>, RepositoryError> {
        let record = self.inner.fetch(id)?;
        let gated = self
            .gated
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if gated {
            self.barrier.wait();
        }
        Ok(record)
    }

    fn open(&self, limit: usize) -> Result<Vec<TripRecord>, RepositoryError> {
        self.inner.open(limit)
    }
}

#[test]
fn racing_assignments_leave_exactly_one_winner() {
    let repository = Arc::new(RacingRepository::new(2));
    let service = Arc::new(DispatchService::new(
        repository.clone(),
        RankingConfig::default(),
    ));
    let record = service.post_trip(trip_request()).expect("trip posts");
    service
        .record_options(&record.trip_id, search_results())
        .expect("options recorded");
    repository.gated.store(2, Ordering::SeqCst);

    let handles: Vec<_> = ["fleet-12", "bid-metro"]
        .into_iter()
        .map(|option| {
            let service = Arc::clone(&service);
            let trip_id = record.trip_id.clone();
            thread::spawn(move || service.assign(&trip_id, &OptionId::new(option)))
        })
        .collect();
    let results: Vec<_> = handles
        .into_iter()
        .map(|handle| handle.join().expect("assign thread finished"))
        .collect();

    let winners: Vec<_> = results.iter().filter_map(|result| result.as_ref().ok()).collect();
    assert_eq!(winners.len(), 1, "{results:?}");
    let loser = results
        .iter()
        .find_map(|result| result.as_ref().err())
        .expect("one assignment loses");
    assert!(matches!(
        loser,
        DispatchError::Repository(RepositoryError::StaleRevision { read: 1, stored: 2 })
    ));
    assert_eq!(status_for(loser), StatusCode::CONFLICT);

    let stored = service.get(&record.trip_id).expect("stored");
    assert_eq!(stored.status, TripStatus::Assigned);
    assert_eq!(stored.assignment.as_ref(), Some(winners[0]));
    assert_eq!(stored.revision, 2);
}

#[test]
fn cancel_after_stale_read_does_not_clobber_assignment() {
    let (service, repository) = build_service();
    let record = service.post_trip(trip_request()).expect("trip posts");
    service
        .record_options(&record.trip_id, search_results())
        .expect("options recorded");
    let stale = repository
        .fetch(&record.trip_id)
        .expect("fetch")
        .expect("trip stored");

    service
        .assign(&record.trip_id, &OptionId::new("fleet-12"))
        .expect("assignment succeeds");

    let mut cancelled = stale;
    cancelled.status = TripStatus::Cancelled;
    assert!(matches!(
        repository.update(cancelled),
        Err(RepositoryError::StaleRevision { .. })
    ));
    assert_eq!(
        service.get(&record.trip_id).expect("stored").status,
        TripStatus::Assigned
    );
}

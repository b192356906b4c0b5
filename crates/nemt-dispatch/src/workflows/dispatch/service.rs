use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::{info, warn};

use super::domain::{TripId, TripRequest, TripStatus};
use super::repository::{Assignment, RepositoryError, TripRecord, TripRepository};
use crate::workflows::fulfillment::{
    calculate_mileage, FulfillmentOption, OptionBoard, OptionId, OptionRanker, RankingConfig,
};
use crate::workflows::pricing::PricingModel;

/// Service composing mileage, pricing, and option ranking over a trip repository.
pub struct DispatchService<R> {
    repository: Arc<R>,
    ranker: Arc<OptionRanker>,
    pricing: Arc<PricingModel>,
}

static TRIP_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_trip_id() -> TripId {
    let id = TRIP_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    TripId(format!("trip-{id:06}"))
}

impl<R> DispatchService<R>
where
    R: TripRepository + 'static,
{
    pub fn new(repository: Arc<R>, ranking: RankingConfig) -> Self {
        Self::with_pricing(repository, ranking, PricingModel::standard())
    }

    pub fn with_pricing(repository: Arc<R>, ranking: RankingConfig, pricing: PricingModel) -> Self {
        Self {
            repository,
            ranker: Arc::new(OptionRanker::new(ranking)),
            pricing: Arc::new(pricing),
        }
    }

    /// Measure and price a new trip, storing it in the `Searching` state.
    pub fn post_trip(&self, request: TripRequest) -> Result<TripRecord, DispatchError> {
        if !request.pickup.location.is_valid() {
            return Err(DispatchError::InvalidLocation { field: "pickup" });
        }
        if !request.dropoff.location.is_valid() {
            return Err(DispatchError::InvalidLocation { field: "dropoff" });
        }

        let mileage = calculate_mileage(&request.pickup, &request.dropoff);
        let pricing = self
            .pricing
            .estimate(mileage, request.constraints.mobility_type);

        let record = TripRecord {
            trip_id: next_trip_id(),
            request,
            mileage,
            pricing,
            options: Vec::new(),
            assignment: None,
            status: TripStatus::Searching,
            revision: 0,
        };

        let stored = self.repository.insert(record)?;
        info!(
            trip_id = %stored.trip_id,
            mileage = stored.mileage,
            level = stored.request.constraints.mobility_type.label(),
            "trip posted"
        );
        Ok(stored)
    }

    /// Replace the trip's option list with the latest search results and rank them.
    pub fn record_options(
        &self,
        trip_id: &TripId,
        options: Vec<FulfillmentOption>,
    ) -> Result<OptionBoard, DispatchError> {
        validate_options(&options)?;

        let mut record = self.fetch(trip_id)?;
        match record.status {
            TripStatus::Searching | TripStatus::OptionsReady => {}
            status => {
                return Err(DispatchError::InvalidTransition {
                    status: status.label(),
                    action: "record options",
                })
            }
        }

        let board = self.ranker.board(&options, &record.request.constraints);
        record.options = options;
        record.status = TripStatus::OptionsReady;
        self.repository.update(record)?;

        Ok(board)
    }

    /// Recompute the option board from the stored options and constraints.
    pub fn board(&self, trip_id: &TripId) -> Result<OptionBoard, DispatchError> {
        let record = self.fetch(trip_id)?;
        Ok(self
            .ranker
            .board(&record.options, &record.request.constraints))
    }

    /// Hand the trip to one of its offered options.
    pub fn assign(
        &self,
        trip_id: &TripId,
        option_id: &OptionId,
    ) -> Result<Assignment, DispatchError> {
        let mut record = self.fetch(trip_id)?;
        if record.status != TripStatus::OptionsReady {
            return Err(DispatchError::InvalidTransition {
                status: record.status.label(),
                action: "assign",
            });
        }

        let option = record
            .options
            .iter()
            .find(|option| option.id() == option_id)
            .ok_or_else(|| DispatchError::UnknownOption {
                trip_id: trip_id.clone(),
                option_id: option_id.clone(),
            })?;

        let assessment = self.ranker.assess(option, &record.request.constraints);
        if !assessment.is_compatible() {
            warn!(%trip_id, %option_id, gaps = assessment.gaps.len(), "rejected incompatible assignment");
            return Err(DispatchError::IncompatibleOption {
                option_id: option_id.clone(),
                reasons: assessment.summary(),
            });
        }

        let board = self
            .ranker
            .board(&record.options, &record.request.constraints);
        let assignment = Assignment {
            option_id: option_id.clone(),
            kind: option.kind(),
            provider_label: option.label().to_string(),
            cost: option.cost(),
            badge: board.badge_for(option_id),
        };

        record.assignment = Some(assignment.clone());
        record.status = TripStatus::Assigned;
        self.repository.update(record)?;

        info!(%trip_id, %option_id, provider = %assignment.provider_label, "trip assigned");
        Ok(assignment)
    }

    pub fn cancel(&self, trip_id: &TripId) -> Result<TripRecord, DispatchError> {
        let mut record = self.fetch(trip_id)?;
        if record.status == TripStatus::Cancelled {
            return Err(DispatchError::InvalidTransition {
                status: record.status.label(),
                action: "cancel",
            });
        }

        record.status = TripStatus::Cancelled;
        let stored = self.repository.update(record)?;
        info!(%trip_id, "trip cancelled");
        Ok(stored)
    }

    pub fn get(&self, trip_id: &TripId) -> Result<TripRecord, DispatchError> {
        self.fetch(trip_id)
    }

    /// Trips still waiting on an assignment.
    pub fn open_trips(&self, limit: usize) -> Result<Vec<TripRecord>, DispatchError> {
        Ok(self.repository.open(limit)?)
    }

    fn fetch(&self, trip_id: &TripId) -> Result<TripRecord, DispatchError> {
        self.repository
            .fetch(trip_id)?
            .ok_or_else(|| DispatchError::TripNotFound(trip_id.clone()))
    }
}

fn validate_options(options: &[FulfillmentOption]) -> Result<(), DispatchError> {
    let mut seen = BTreeSet::new();
    for option in options {
        let cost = option.cost();
        if !cost.is_finite() || cost < 0.0 {
            return Err(DispatchError::InvalidCost {
                option_id: option.id().clone(),
            });
        }
        if !seen.insert(option.id()) {
            return Err(DispatchError::DuplicateOption(option.id().clone()));
        }
    }
    Ok(())
}

/// Error raised by the dispatch service.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("trip {0} not found")]
    TripNotFound(TripId),
    #[error("{field} location must have a latitude within ±90 and a longitude within ±180")]
    InvalidLocation { field: &'static str },
    #[error("option {option_id} must have a finite, non-negative cost")]
    InvalidCost { option_id: OptionId },
    #[error("option {0} appears more than once")]
    DuplicateOption(OptionId),
    #[error("option {option_id} is not offered for trip {trip_id}")]
    UnknownOption { trip_id: TripId, option_id: OptionId },
    #[error("option {option_id} cannot serve this trip: {reasons}")]
    IncompatibleOption { option_id: OptionId, reasons: String },
    #[error("trip is {status}; cannot {action}")]
    InvalidTransition {
        status: &'static str,
        action: &'static str,
    },
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

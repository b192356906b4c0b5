use serde::{Deserialize, Serialize};

use super::domain::{TripId, TripRequest, TripStatus};
use crate::workflows::fulfillment::{FulfillmentOption, OptionId, OptionKind, TopPickBadge};
use crate::workflows::pricing::PricingResult;

/// The option a trip was handed to, frozen at assignment time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub option_id: OptionId,
    pub kind: OptionKind,
    pub provider_label: String,
    pub cost: f64,
    pub badge: Option<TopPickBadge>,
}

/// Repository record containing the request, derived values, and search results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripRecord {
    pub trip_id: TripId,
    pub request: TripRequest,
    pub mileage: f64,
    pub pricing: PricingResult,
    pub options: Vec<FulfillmentOption>,
    pub assignment: Option<Assignment>,
    pub status: TripStatus,
    /// Bumped by every successful update; a write carrying an older revision is rejected.
    #[serde(default)]
    pub revision: u64,
}

impl TripRecord {
    pub fn status_view(&self) -> TripStatusView {
        TripStatusView {
            trip_id: self.trip_id.clone(),
            status: self.status.label(),
            mileage: self.mileage,
            suggested_buyer_rate: self.pricing.suggested_buyer_rate,
            suggested_seller_rate: self.pricing.suggested_seller_rate,
            option_count: self.options.len(),
            assignment: self.assignment.clone(),
        }
    }
}

/// Storage abstraction so the dispatch service can be exercised in isolation.
pub trait TripRepository: Send + Sync {
    fn insert(&self, record: TripRecord) -> Result<TripRecord, RepositoryError>;
    /// Replace the stored record. Implementations must check the revision with
    /// [`next_revision`] under the same lock as the write and return the stored record.
    fn update(&self, record: TripRecord) -> Result<TripRecord, RepositoryError>;
    fn fetch(&self, id: &TripId) -> Result<Option<TripRecord>, RepositoryError>;
    /// Trips still waiting on an assignment, up to `limit`.
    fn open(&self, limit: usize) -> Result<Vec<TripRecord>, RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("record changed since it was read (revision {read}, now {stored})")]
    StaleRevision { read: u64, stored: u64 },
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Accept `record` only if it was read at the stored revision, stamping it with the next one.
pub fn next_revision(
    stored: &TripRecord,
    mut record: TripRecord,
) -> Result<TripRecord, RepositoryError> {
    if stored.revision != record.revision {
        return Err(RepositoryError::StaleRevision {
            read: record.revision,
            stored: stored.revision,
        });
    }
    record.revision += 1;
    Ok(record)
}

/// Summary of a trip for API responses.
#[derive(Debug, Clone, Serialize)]
pub struct TripStatusView {
    pub trip_id: TripId,
    pub status: &'static str,
    pub mileage: f64,
    pub suggested_buyer_rate: f64,
    pub suggested_seller_rate: f64,
    pub option_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignment: Option<Assignment>,
}

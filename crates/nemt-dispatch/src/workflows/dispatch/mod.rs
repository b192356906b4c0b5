//! Trip posting: a trip is priced and measured on creation, receives fulfillment options from
//! a search, and is assigned to one compatible option.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{PickupWindow, TripId, TripRequest, TripStatus};
pub use repository::{
    next_revision, Assignment, RepositoryError, TripRecord, TripRepository, TripStatusView,
};
pub use router::dispatch_router;
pub use service::{DispatchError, DispatchService};

//! Fulfillment options for a trip, the ranking that decides which ones get top billing, and
//! the display helpers (mileage, cost, labels) the option cards rely on.

pub mod domain;
mod mileage;
mod ranking;
mod search;

#[cfg(test)]
mod tests;

pub use domain::{
    Address, Capabilities, FleetAssignment, FulfillmentOption, GeoPoint, MarketplaceBid,
    MobilityType, OptionBoard, OptionId, OptionKind, RemainingOptions, SpecialNeed, TncQuote,
    TopPick, TopPickBadge, TripConstraints, UnknownMobilityType,
};
pub use mileage::calculate_mileage;
pub use ranking::{CompatibilityAssessment, CompatibilityGap, OptionRanker, RankingConfig};
pub use search::{SearchPhase, SearchSession};

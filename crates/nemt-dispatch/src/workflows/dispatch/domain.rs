use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::workflows::fulfillment::{Address, TripConstraints};

/// Identifier wrapper for posted trips.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TripId(pub String);

impl fmt::Display for TripId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// When the passenger expects to be picked up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PickupWindow {
    Scheduled { pickup_at: NaiveDateTime },
    /// Passenger calls when ready; no fixed pickup time.
    WillCall,
}

/// Trip as submitted by a facility or broker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripRequest {
    pub pickup: Address,
    pub dropoff: Address,
    pub constraints: TripConstraints,
    pub pickup_window: PickupWindow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TripStatus {
    Searching,
    OptionsReady,
    Assigned,
    Cancelled,
}

impl TripStatus {
    pub const fn label(self) -> &'static str {
        match self {
            TripStatus::Searching => "searching",
            TripStatus::OptionsReady => "options_ready",
            TripStatus::Assigned => "assigned",
            TripStatus::Cancelled => "cancelled",
        }
    }
}

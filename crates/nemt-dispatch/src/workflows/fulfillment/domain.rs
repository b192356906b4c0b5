use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Identifier wrapper for fulfillment options surfaced by a search.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OptionId(pub String);

impl OptionId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }
}

impl fmt::Display for OptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Level of service a trip requires. Declaration order is the tier order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MobilityType {
    Ambulatory,
    Wheelchair,
    Stretcher,
    Bariatric,
    Bls,
}

impl MobilityType {
    pub const ALL: [MobilityType; 5] = [
        MobilityType::Ambulatory,
        MobilityType::Wheelchair,
        MobilityType::Stretcher,
        MobilityType::Bariatric,
        MobilityType::Bls,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            MobilityType::Ambulatory => "Ambulatory",
            MobilityType::Wheelchair => "Wheelchair",
            MobilityType::Stretcher => "Stretcher",
            MobilityType::Bariatric => "Bariatric",
            MobilityType::Bls => "BLS",
        }
    }
}

impl FromStr for MobilityType {
    type Err = UnknownMobilityType;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "ambulatory" => Ok(Self::Ambulatory),
            "wheelchair" => Ok(Self::Wheelchair),
            "stretcher" => Ok(Self::Stretcher),
            "bariatric" => Ok(Self::Bariatric),
            "bls" => Ok(Self::Bls),
            _ => Err(UnknownMobilityType(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown level of service '{0}' (expected ambulatory, wheelchair, stretcher, bariatric or bls)")]
pub struct UnknownMobilityType(pub String);

/// Special-need tags a trip can request and a vehicle can declare support for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecialNeed {
    Oxygen,
    Escort,
    BariatricEquipment,
    IvDrip,
    Monitor,
    CarSeat,
}

impl SpecialNeed {
    pub const fn label(self) -> &'static str {
        match self {
            SpecialNeed::Oxygen => "Oxygen",
            SpecialNeed::Escort => "Escort",
            SpecialNeed::BariatricEquipment => "Bariatric equipment",
            SpecialNeed::IvDrip => "IV drip",
            SpecialNeed::Monitor => "Monitor",
            SpecialNeed::CarSeat => "Car seat",
        }
    }
}

/// Declared vehicle capabilities. Anything not listed is unsupported.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    #[serde(default)]
    pub mobility: BTreeSet<MobilityType>,
    #[serde(default)]
    pub special_needs: BTreeSet<SpecialNeed>,
}

impl Capabilities {
    pub fn new(
        mobility: impl IntoIterator<Item = MobilityType>,
        special_needs: impl IntoIterator<Item = SpecialNeed>,
    ) -> Self {
        Self {
            mobility: mobility.into_iter().collect(),
            special_needs: special_needs.into_iter().collect(),
        }
    }

    /// Ambulatory riders fit any vehicle; every other level must be declared.
    pub fn covers_mobility(&self, requested: MobilityType) -> bool {
        requested == MobilityType::Ambulatory || self.mobility.contains(&requested)
    }

    pub fn supports(&self, need: SpecialNeed) -> bool {
        self.special_needs.contains(&need)
    }
}

/// Internal fleet vehicle and (optionally) an assigned driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FleetAssignment {
    pub id: OptionId,
    pub vehicle_name: String,
    #[serde(default)]
    pub driver_name: Option<String>,
    pub internal_cost: f64,
    pub eta_minutes: u32,
    #[serde(default)]
    pub capabilities: Capabilities,
}

/// Rideshare quote from a transportation network company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TncQuote {
    pub id: OptionId,
    pub display_name: String,
    pub product: String,
    pub cost: f64,
    pub eta_minutes: u32,
    #[serde(default)]
    pub capabilities: Capabilities,
}

/// Bid placed by an external marketplace provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketplaceBid {
    pub id: OptionId,
    pub provider_name: String,
    pub cost: f64,
    pub eta_minutes: u32,
    pub rating: f32,
    #[serde(default)]
    pub capabilities: Capabilities,
}

/// One way a trip can be fulfilled. The `type` tag selects the variant; unknown tags are
/// rejected during deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FulfillmentOption {
    Fleet(FleetAssignment),
    Tnc(TncQuote),
    Marketplace(MarketplaceBid),
}

impl FulfillmentOption {
    pub fn id(&self) -> &OptionId {
        match self {
            FulfillmentOption::Fleet(fleet) => &fleet.id,
            FulfillmentOption::Tnc(quote) => &quote.id,
            FulfillmentOption::Marketplace(bid) => &bid.id,
        }
    }

    pub fn kind(&self) -> OptionKind {
        match self {
            FulfillmentOption::Fleet(_) => OptionKind::Fleet,
            FulfillmentOption::Tnc(_) => OptionKind::Tnc,
            FulfillmentOption::Marketplace(_) => OptionKind::Marketplace,
        }
    }

    /// Cost in USD: the internal cost for fleet runs, the quoted price otherwise.
    pub fn cost(&self) -> f64 {
        match self {
            FulfillmentOption::Fleet(fleet) => fleet.internal_cost,
            FulfillmentOption::Tnc(quote) => quote.cost,
            FulfillmentOption::Marketplace(bid) => bid.cost,
        }
    }

    pub fn eta_minutes(&self) -> u32 {
        match self {
            FulfillmentOption::Fleet(fleet) => fleet.eta_minutes,
            FulfillmentOption::Tnc(quote) => quote.eta_minutes,
            FulfillmentOption::Marketplace(bid) => bid.eta_minutes,
        }
    }

    /// Provider label shown on option cards.
    pub fn label(&self) -> &str {
        match self {
            FulfillmentOption::Fleet(fleet) => fleet.driver_name.as_deref().unwrap_or("Internal"),
            FulfillmentOption::Tnc(quote) => &quote.display_name,
            FulfillmentOption::Marketplace(bid) => &bid.provider_name,
        }
    }

    pub fn capabilities(&self) -> &Capabilities {
        match self {
            FulfillmentOption::Fleet(fleet) => &fleet.capabilities,
            FulfillmentOption::Tnc(quote) => &quote.capabilities,
            FulfillmentOption::Marketplace(bid) => &bid.capabilities,
        }
    }

    pub fn cost_per_mile(&self, miles: f64) -> Option<f64> {
        if miles.is_finite() && miles > 0.0 {
            Some(self.cost() / miles)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionKind {
    Fleet,
    Tnc,
    Marketplace,
}

impl OptionKind {
    pub const fn label(self) -> &'static str {
        match self {
            OptionKind::Fleet => "Fleet",
            OptionKind::Tnc => "TNC",
            OptionKind::Marketplace => "Marketplace",
        }
    }
}

/// Requirements a trip places on whoever fulfills it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripConstraints {
    pub mobility_type: MobilityType,
    #[serde(default)]
    pub special_needs: BTreeSet<SpecialNeed>,
    #[serde(default)]
    pub escort_count: u8,
}

impl TripConstraints {
    pub fn new(mobility_type: MobilityType) -> Self {
        Self {
            mobility_type,
            special_needs: BTreeSet::new(),
            escort_count: 0,
        }
    }

    pub fn with_need(mut self, need: SpecialNeed) -> Self {
        self.special_needs.insert(need);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Pickup or drop-off location. `location` is the geocoded point used for mileage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub label: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub location: GeoPoint,
}

impl Address {
    pub fn one_line(&self) -> String {
        format!("{}, {}, {} {}", self.street, self.city, self.state, self.zip)
    }
}

/// Badge attached to a promoted option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopPickBadge {
    Cheapest,
    Fastest,
    BestMatch,
}

impl TopPickBadge {
    pub const fn label(self) -> &'static str {
        match self {
            TopPickBadge::Cheapest => "Cheapest",
            TopPickBadge::Fastest => "Fastest",
            TopPickBadge::BestMatch => "Best Match",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopPick {
    pub option: FulfillmentOption,
    pub badge: TopPickBadge,
}

/// Options left after top picks are removed, split by compatibility.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RemainingOptions {
    pub compatible: Vec<FulfillmentOption>,
    pub incompatible: Vec<FulfillmentOption>,
}

/// Full presentation of a search result: promoted picks plus everything else.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OptionBoard {
    pub top_picks: Vec<TopPick>,
    pub remaining: RemainingOptions,
}

impl OptionBoard {
    pub fn badge_for(&self, id: &OptionId) -> Option<TopPickBadge> {
        self.top_picks
            .iter()
            .find(|pick| pick.option.id() == id)
            .map(|pick| pick.badge)
    }

    pub fn len(&self) -> usize {
        self.top_picks.len() + self.remaining.compatible.len() + self.remaining.incompatible.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

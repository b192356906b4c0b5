use crate::workflows::fulfillment::domain::{
    Address, Capabilities, FleetAssignment, FulfillmentOption, GeoPoint, MarketplaceBid,
    MobilityType, OptionId, SpecialNeed, TncQuote, TripConstraints,
};
use crate::workflows::fulfillment::OptionRanker;

pub(super) fn fleet(
    id: &str,
    cost: f64,
    eta: u32,
    mobility: &[MobilityType],
    needs: &[SpecialNeed],
) -> FulfillmentOption {
    FulfillmentOption::Fleet(FleetAssignment {
        id: OptionId::new(id),
        vehicle_name: format!("Van {id}"),
        driver_name: Some("Dana Whitfield".to_string()),
        internal_cost: cost,
        eta_minutes: eta,
        capabilities: Capabilities::new(mobility.iter().copied(), needs.iter().copied()),
    })
}

pub(super) fn tnc(id: &str, cost: f64, eta: u32, mobility: &[MobilityType]) -> FulfillmentOption {
    FulfillmentOption::Tnc(TncQuote {
        id: OptionId::new(id),
        display_name: "Lyft".to_string(),
        product: "Lyft Standard".to_string(),
        cost,
        eta_minutes: eta,
        capabilities: Capabilities::new(mobility.iter().copied(), []),
    })
}

pub(super) fn marketplace(
    id: &str,
    cost: f64,
    eta: u32,
    mobility: &[MobilityType],
    needs: &[SpecialNeed],
) -> FulfillmentOption {
    FulfillmentOption::Marketplace(MarketplaceBid {
        id: OptionId::new(id),
        provider_name: "Metro Medical Transport".to_string(),
        cost,
        eta_minutes: eta,
        rating: 4.7,
        capabilities: Capabilities::new(mobility.iter().copied(), needs.iter().copied()),
    })
}

/// Three-option scenario: a wheelchair van, an ambulatory-only rideshare, and a stretcher bid.
pub(super) fn wheelchair_scenario() -> Vec<FulfillmentOption> {
    use MobilityType::*;
    vec![
        fleet("1", 20.0, 15, &[Ambulatory, Wheelchair], &[]),
        tnc("2", 15.0, 8, &[Ambulatory]),
        marketplace("3", 25.0, 30, &[Ambulatory, Wheelchair, Stretcher], &[]),
    ]
}

pub(super) fn constraints(mobility: MobilityType, needs: &[SpecialNeed]) -> TripConstraints {
    TripConstraints {
        mobility_type: mobility,
        special_needs: needs.iter().copied().collect(),
        escort_count: 0,
    }
}

pub(super) fn ranker() -> OptionRanker {
    OptionRanker::default()
}

pub(super) fn ids(options: &[FulfillmentOption]) -> Vec<&str> {
    options.iter().map(|option| option.id().0.as_str()).collect()
}

pub(super) fn address(label: &str, latitude: f64, longitude: f64) -> Address {
    Address {
        label: label.to_string(),
        street: "100 Main St".to_string(),
        city: "Des Moines".to_string(),
        state: "IA".to_string(),
        zip: "50309".to_string(),
        location: GeoPoint {
            latitude,
            longitude,
        },
    }
}

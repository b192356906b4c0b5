use super::super::domain::{FulfillmentOption, MobilityType, SpecialNeed, TripConstraints};
use serde::{Deserialize, Serialize};

/// A single requirement the option fails to meet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "gap", content = "requirement", rename_all = "snake_case")]
pub enum CompatibilityGap {
    MobilityNotSupported(MobilityType),
    SpecialNeedNotSupported(SpecialNeed),
}

impl CompatibilityGap {
    pub fn summary(&self) -> String {
        match self {
            CompatibilityGap::MobilityNotSupported(mobility) => {
                format!("does not support {} trips", mobility.label())
            }
            CompatibilityGap::SpecialNeedNotSupported(need) => {
                format!("does not support {}", need.label())
            }
        }
    }
}

pub(crate) fn compatibility_gaps(
    option: &FulfillmentOption,
    constraints: &TripConstraints,
) -> Vec<CompatibilityGap> {
    let capabilities = option.capabilities();
    let mut gaps = Vec::new();

    if !capabilities.covers_mobility(constraints.mobility_type) {
        gaps.push(CompatibilityGap::MobilityNotSupported(
            constraints.mobility_type,
        ));
    }

    gaps.extend(
        constraints
            .special_needs
            .iter()
            .filter(|need| !capabilities.supports(**need))
            .map(|need| CompatibilityGap::SpecialNeedNotSupported(*need)),
    );

    gaps
}

pub(crate) fn is_compatible(option: &FulfillmentOption, constraints: &TripConstraints) -> bool {
    let capabilities = option.capabilities();
    capabilities.covers_mobility(constraints.mobility_type)
        && constraints
            .special_needs
            .iter()
            .all(|need| capabilities.supports(*need))
}

mod config;
mod policy;
mod rules;

pub use config::RankingConfig;
pub use rules::CompatibilityGap;

use std::collections::BTreeSet;

use super::domain::{
    FulfillmentOption, OptionBoard, OptionId, RemainingOptions, TopPick, TripConstraints,
};
use policy::select_top_picks;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Stateless ranker that promotes up to three options and buckets the rest.
///
/// Every call recomputes from its arguments; nothing is cached between calls.
#[derive(Debug, Clone, Default)]
pub struct OptionRanker {
    config: RankingConfig,
}

impl OptionRanker {
    pub fn new(config: RankingConfig) -> Self {
        Self { config }
    }

    /// Cheapest, Fastest and Best Match picks among compatible options, in that order.
    pub fn top_options(
        &self,
        options: &[FulfillmentOption],
        constraints: &TripConstraints,
    ) -> Vec<TopPick> {
        let compatible: Vec<&FulfillmentOption> = options
            .iter()
            .filter(|option| rules::is_compatible(option, constraints))
            .collect();

        let picks = select_top_picks(&compatible, &self.config);
        debug!(
            options = options.len(),
            compatible = compatible.len(),
            top_picks = picks.len(),
            "ranked fulfillment options"
        );
        picks
    }

    /// Everything not in `excluded`, split by compatibility in original order.
    pub fn remaining_options(
        &self,
        options: &[FulfillmentOption],
        excluded: &BTreeSet<OptionId>,
        constraints: &TripConstraints,
    ) -> RemainingOptions {
        let (compatible, incompatible) = options
            .iter()
            .filter(|option| !excluded.contains(option.id()))
            .cloned()
            .partition(|option| rules::is_compatible(option, constraints));

        RemainingOptions {
            compatible,
            incompatible,
        }
    }

    pub fn board(
        &self,
        options: &[FulfillmentOption],
        constraints: &TripConstraints,
    ) -> OptionBoard {
        let top_picks = self.top_options(options, constraints);
        let excluded: BTreeSet<OptionId> = top_picks
            .iter()
            .map(|pick| pick.option.id().clone())
            .collect();
        let remaining = self.remaining_options(options, &excluded, constraints);

        OptionBoard {
            top_picks,
            remaining,
        }
    }

    pub fn assess(
        &self,
        option: &FulfillmentOption,
        constraints: &TripConstraints,
    ) -> CompatibilityAssessment {
        CompatibilityAssessment {
            option_id: option.id().clone(),
            gaps: rules::compatibility_gaps(option, constraints),
        }
    }
}

/// Explains why an option does or does not fit a trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompatibilityAssessment {
    pub option_id: OptionId,
    pub gaps: Vec<CompatibilityGap>,
}

impl CompatibilityAssessment {
    pub fn is_compatible(&self) -> bool {
        self.gaps.is_empty()
    }

    pub fn summary(&self) -> String {
        if self.gaps.is_empty() {
            "compatible".to_string()
        } else {
            self.gaps
                .iter()
                .map(CompatibilityGap::summary)
                .collect::<Vec<_>>()
                .join("; ")
        }
    }
}

use serde::Serialize;

use super::domain::{FulfillmentOption, OptionKind};

/// Stages of the scripted option search, in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchPhase {
    DispatchingFleet,
    QueryingTnc,
    CollectingBids,
    Complete,
}

impl SearchPhase {
    pub const fn label(self) -> &'static str {
        match self {
            SearchPhase::DispatchingFleet => "Checking fleet availability",
            SearchPhase::QueryingTnc => "Requesting rideshare quotes",
            SearchPhase::CollectingBids => "Collecting marketplace bids",
            SearchPhase::Complete => "Search complete",
        }
    }

    /// Option variant surfaced once this phase has run.
    const fn reveals(self) -> Option<OptionKind> {
        match self {
            SearchPhase::DispatchingFleet => Some(OptionKind::Fleet),
            SearchPhase::QueryingTnc => Some(OptionKind::Tnc),
            SearchPhase::CollectingBids => Some(OptionKind::Marketplace),
            SearchPhase::Complete => None,
        }
    }

    const fn next(self) -> Self {
        match self {
            SearchPhase::DispatchingFleet => SearchPhase::QueryingTnc,
            SearchPhase::QueryingTnc => SearchPhase::CollectingBids,
            SearchPhase::CollectingBids | SearchPhase::Complete => SearchPhase::Complete,
        }
    }
}

/// Progressive reveal of a precomputed option list.
///
/// A fresh session has revealed nothing. Each `advance` runs the current phase, making that
/// phase's option variant visible, and moves on. Revealed options keep their original order.
#[derive(Debug, Clone)]
pub struct SearchSession {
    options: Vec<FulfillmentOption>,
    revealed: Vec<OptionKind>,
    phase: SearchPhase,
    visible: Vec<FulfillmentOption>,
}

impl SearchSession {
    pub fn new(options: Vec<FulfillmentOption>) -> Self {
        Self {
            options,
            revealed: Vec::new(),
            phase: SearchPhase::DispatchingFleet,
            visible: Vec::new(),
        }
    }

    /// The phase that will run on the next `advance`, or `Complete`.
    pub fn phase(&self) -> SearchPhase {
        self.phase
    }

    pub fn is_complete(&self) -> bool {
        self.phase == SearchPhase::Complete
    }

    /// Run the current phase and return the phase that just finished.
    pub fn advance(&mut self) -> SearchPhase {
        let finished = self.phase;
        if let Some(kind) = finished.reveals() {
            self.revealed.push(kind);
            self.visible = self
                .options
                .iter()
                .filter(|option| self.revealed.contains(&option.kind()))
                .cloned()
                .collect();
        }
        self.phase = finished.next();
        finished
    }

    pub fn visible_options(&self) -> &[FulfillmentOption] {
        &self.visible
    }

    pub fn total_options(&self) -> usize {
        self.options.len()
    }
}

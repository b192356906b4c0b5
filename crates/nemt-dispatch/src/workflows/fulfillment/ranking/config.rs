use serde::{Deserialize, Serialize};

/// Weights blended into the Best Match score. Both apply to min-max normalized values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RankingConfig {
    pub cost_weight: f64,
    pub eta_weight: f64,
}

impl RankingConfig {
    pub fn is_valid(&self) -> bool {
        let finite = self.cost_weight.is_finite() && self.eta_weight.is_finite();
        let non_negative = self.cost_weight >= 0.0 && self.eta_weight >= 0.0;
        finite && non_negative && self.cost_weight + self.eta_weight > 0.0
    }
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            cost_weight: 0.5,
            eta_weight: 0.5,
        }
    }
}

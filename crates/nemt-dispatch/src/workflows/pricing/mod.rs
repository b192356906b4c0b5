//! Deterministic pricing suggestion used when a trip is posted to the marketplace.
//!
//! The model is a rate card per level of service plus fixed spreads; it does no learning and
//! has no randomness. Suggested rates rise with distance and with the level-of-service tier.

use serde::{Deserialize, Serialize};

use super::fulfillment::MobilityType;

const SELLER_SHARE: f64 = 0.88;
const MEDIAN_FACTOR: f64 = 0.97;
const LOWER_QUARTILE_FACTOR: f64 = 0.85;
const UPPER_QUARTILE_FACTOR: f64 = 1.15;

/// Base fare, per-mile rate, and the number of historical trips behind them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateCard {
    pub base_rate: f64,
    pub per_mile_rate: f64,
    pub sample_size: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingFactor {
    pub name: String,
    pub weight: f32,
    pub detail: String,
}

/// Suggested rates and the market context they were drawn from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingResult {
    pub level_of_service: MobilityType,
    pub miles: f64,
    pub suggested_buyer_rate: f64,
    pub suggested_seller_rate: f64,
    pub median_rate: f64,
    pub percentile_25: f64,
    pub percentile_75: f64,
    pub confidence_score: f64,
    pub sample_size: u32,
    pub acceptance_probability: f64,
    pub explanation: String,
    pub factors: Vec<PricingFactor>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PricingModel {
    ambulatory: RateCard,
    wheelchair: RateCard,
    stretcher: RateCard,
    bariatric: RateCard,
    bls: RateCard,
}

impl PricingModel {
    pub fn standard() -> Self {
        Self {
            ambulatory: RateCard {
                base_rate: 25.0,
                per_mile_rate: 2.25,
                sample_size: 1240,
            },
            wheelchair: RateCard {
                base_rate: 45.0,
                per_mile_rate: 3.10,
                sample_size: 860,
            },
            stretcher: RateCard {
                base_rate: 95.0,
                per_mile_rate: 4.50,
                sample_size: 310,
            },
            bariatric: RateCard {
                base_rate: 125.0,
                per_mile_rate: 5.25,
                sample_size: 95,
            },
            bls: RateCard {
                base_rate: 260.0,
                per_mile_rate: 7.75,
                sample_size: 180,
            },
        }
    }

    pub fn rate_card(&self, level: MobilityType) -> RateCard {
        match level {
            MobilityType::Ambulatory => self.ambulatory,
            MobilityType::Wheelchair => self.wheelchair,
            MobilityType::Stretcher => self.stretcher,
            MobilityType::Bariatric => self.bariatric,
            MobilityType::Bls => self.bls,
        }
    }

    /// Negative or non-finite mileage is priced as a zero-mile trip.
    ///
    /// Rates never fall as miles grow. Because money is rounded to cents, they only strictly
    /// rise for steps of 0.1 mi or more, the resolution `calculate_mileage` reports.
    pub fn estimate(&self, miles: f64, level: MobilityType) -> PricingResult {
        let miles = if miles.is_finite() && miles > 0.0 {
            miles
        } else {
            0.0
        };
        let card = self.rate_card(level);

        let buyer = card.base_rate + card.per_mile_rate * miles;
        let median = buyer * MEDIAN_FACTOR;
        let confidence = (0.92 - miles / 400.0).clamp(0.55, 0.92);
        let acceptance = (0.9 - miles / 500.0).clamp(0.5, 0.9);

        PricingResult {
            level_of_service: level,
            miles,
            suggested_buyer_rate: round_hundredths(buyer),
            suggested_seller_rate: round_hundredths(buyer * SELLER_SHARE),
            median_rate: round_hundredths(median),
            percentile_25: round_hundredths(median * LOWER_QUARTILE_FACTOR),
            percentile_75: round_hundredths(median * UPPER_QUARTILE_FACTOR),
            confidence_score: round_hundredths(confidence),
            sample_size: card.sample_size,
            acceptance_probability: round_hundredths(acceptance),
            explanation: format!(
                "Based on {} completed {} trips of similar distance in this service area.",
                card.sample_size,
                level.label().to_lowercase()
            ),
            factors: factors(miles, level, card),
        }
    }
}

impl Default for PricingModel {
    fn default() -> Self {
        Self::standard()
    }
}

/// Pricing suggestion from the standard rate card.
pub fn mock_pricing_result(miles: f64, level_of_service: MobilityType) -> PricingResult {
    PricingModel::standard().estimate(miles, level_of_service)
}

fn factors(miles: f64, level: MobilityType, card: RateCard) -> Vec<PricingFactor> {
    vec![
        PricingFactor {
            name: "Trip distance".to_string(),
            weight: 0.45,
            detail: format!("{miles:.1} mi at ${:.2}/mi", card.per_mile_rate),
        },
        PricingFactor {
            name: "Level of service".to_string(),
            weight: 0.30,
            detail: format!("{} base fare ${:.2}", level.label(), card.base_rate),
        },
        PricingFactor {
            name: "Regional demand".to_string(),
            weight: 0.15,
            detail: "Provider supply is steady for this region".to_string(),
        },
        PricingFactor {
            name: "Time of day".to_string(),
            weight: 0.10,
            detail: "Standard daytime window".to_string(),
        },
    ]
}

fn round_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

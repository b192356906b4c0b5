use super::super::domain::{FulfillmentOption, TopPick, TopPickBadge};
use super::config::RankingConfig;

/// Badge slots in display order. Each slot nominates one option; an option already holding a
/// badge is not promoted twice, so collapsed slots are simply dropped.
pub(crate) fn select_top_picks(
    compatible: &[&FulfillmentOption],
    config: &RankingConfig,
) -> Vec<TopPick> {
    let nominees = [
        (TopPickBadge::Cheapest, cheapest(compatible)),
        (TopPickBadge::Fastest, fastest(compatible)),
        (TopPickBadge::BestMatch, best_match(compatible, config)),
    ];

    let mut picks: Vec<TopPick> = Vec::with_capacity(nominees.len());
    for (badge, nominee) in nominees {
        let Some(option) = nominee else {
            continue;
        };
        if picks.iter().any(|pick| pick.option.id() == option.id()) {
            continue;
        }
        picks.push(TopPick {
            option: option.clone(),
            badge,
        });
    }

    picks
}

fn cheapest<'a>(options: &[&'a FulfillmentOption]) -> Option<&'a FulfillmentOption> {
    options.iter().copied().min_by(|a, b| {
        cost_key(a)
            .total_cmp(&cost_key(b))
            .then_with(|| a.eta_minutes().cmp(&b.eta_minutes()))
            .then_with(|| a.id().cmp(b.id()))
    })
}

fn fastest<'a>(options: &[&'a FulfillmentOption]) -> Option<&'a FulfillmentOption> {
    options.iter().copied().min_by(|a, b| {
        a.eta_minutes()
            .cmp(&b.eta_minutes())
            .then_with(|| cost_key(a).total_cmp(&cost_key(b)))
            .then_with(|| a.id().cmp(b.id()))
    })
}

/// `total_cmp` orders `-0.0` before `0.0`; adding zero folds both into `+0.0`.
fn cost_key(option: &FulfillmentOption) -> f64 {
    option.cost() + 0.0
}

fn best_match<'a>(
    options: &[&'a FulfillmentOption],
    config: &RankingConfig,
) -> Option<&'a FulfillmentOption> {
    let cost_range = Range::over(options.iter().map(|option| option.cost()))?;
    let eta_range = Range::over(options.iter().map(|option| f64::from(option.eta_minutes())))?;

    let score = |option: &FulfillmentOption| {
        config.cost_weight * cost_range.normalize(option.cost())
            + config.eta_weight * eta_range.normalize(f64::from(option.eta_minutes()))
    };

    options
        .iter()
        .copied()
        .map(|option| (score(option), option))
        .min_by(|(score_a, a), (score_b, b)| {
            score_a
                .total_cmp(score_b)
                .then_with(|| a.id().cmp(b.id()))
        })
        .map(|(_, option)| option)
}

#[derive(Debug, Clone, Copy)]
struct Range {
    min: f64,
    max: f64,
}

impl Range {
    fn over(values: impl Iterator<Item = f64>) -> Option<Self> {
        values.fold(None, |range, value| match range {
            None => Some(Range {
                min: value,
                max: value,
            }),
            Some(Range { min, max }) => Some(Range {
                min: min.min(value),
                max: max.max(value),
            }),
        })
    }

    fn normalize(&self, value: f64) -> f64 {
        let span = self.max - self.min;
        if span > 0.0 {
            (value - self.min) / span
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_is_zero_for_flat_range() {
        let range = Range::over([12.0, 12.0].into_iter()).expect("non-empty");
        assert_eq!(range.normalize(12.0), 0.0);
    }

    #[test]
    fn normalize_spans_unit_interval() {
        let range = Range::over([10.0, 30.0, 20.0].into_iter()).expect("non-empty");
        assert_eq!(range.normalize(10.0), 0.0);
        assert_eq!(range.normalize(20.0), 0.5);
        assert_eq!(range.normalize(30.0), 1.0);
    }

    #[test]
    fn range_is_none_without_values() {
        assert!(Range::over(std::iter::empty()).is_none());
    }
}

//! Free-tier rough estimate
//!
//! Uses a single blended rate per specification and a fixed +/-8% spread.
//! Paid figures never derive from this preview; they come from
//! [`crate::estimator`].

use crate::estimator::{round_amount, CostRange, EstimateInput, Specification};

/// Spread applied around the blended estimate
const LOWER_SPREAD: f64 = 0.92;
const UPPER_SPREAD: f64 = 1.08;

/// Blended per-square-foot rate used by the free preview
pub fn blended_rate(specification: Specification) -> f64 {
    match specification {
        Specification::Basic => 1750.0,
        Specification::Standard => 2200.0,
        Specification::Premium => 2900.0,
    }
}

/// Approximate cost range shown before payment
pub fn rough_estimate(input: &EstimateInput) -> CostRange {
    let approx = round_amount(
        input.area
            * blended_rate(input.specification)
            * input.location.factor()
            * input.floors.factor(),
    ) as f64;

    CostRange {
        min_cost: round_amount(approx * LOWER_SPREAD),
        max_cost: round_amount(approx * UPPER_SPREAD),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rough_estimate_standard() {
        let input = EstimateInput::parse(1000.0, "standard", "medium", "g0").unwrap();
        let range = rough_estimate(&input);
        assert_eq!(range.min_cost, 2_024_000);
        assert_eq!(range.max_cost, 2_376_000);
    }

    #[test]
    fn test_rough_estimate_is_not_the_paid_figure() {
        let input = EstimateInput::parse(1000.0, "standard", "medium", "g0").unwrap();
        assert_ne!(rough_estimate(&input), input.cost());
    }

    #[test]
    fn test_rough_estimate_ordered() {
        let input = EstimateInput::parse(3210.0, "premium", "high", "g2").unwrap();
        let range = rough_estimate(&input);
        assert!(range.min_cost < range.max_cost);
    }
}

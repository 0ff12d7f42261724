//! Weighted cost model for one task run.
//!
//! # Invariants
//! - Pure and deterministic; no state, no I/O.
//! - All terms are non-negative, so round-half-up equals
//!   round-half-away-from-zero.

use crate::model::group::WeightVector;
use crate::model::task::{Distance, Money, Wait};

/// Computes the integer cost of one run from its three difficulty signals
/// and the group's weight vector.
///
/// `round(distance_base * w.distance + wait_base * w.wait + money_base * w.money)`
///
/// Invalid categorical values are unrepresentable here; string inputs are
/// rejected earlier by the signal parsers. Weight bounds are enforced by
/// [`WeightVector`] construction.
pub fn compute_cost(distance: Distance, wait: Wait, money: Money, weights: &WeightVector) -> u32 {
    let raw = f64::from(distance.base_points()) * weights.distance
        + f64::from(wait.base_points()) * weights.wait
        + f64::from(money.base_points()) * weights.money;
    raw.round() as u32
}

/// Human-readable burden bucket for a computed cost.
pub fn cost_description(cost: u32) -> &'static str {
    match cost {
        0..=5 => "easy stroll",
        6..=10 => "small effort",
        11..=15 => "proper sacrifice",
        16..=20 => "hero of the day",
        _ => "absolute legend",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::group::WeightVector;

    #[test]
    fn default_weights_worked_example() {
        // round(6*1.0 + 8*0.8 + 2*0.6) = round(13.6) = 14
        let cost = compute_cost(
            Distance::Medium,
            Wait::High,
            Money::Low,
            &WeightVector::default(),
        );
        assert_eq!(cost, 14);
    }

    #[test]
    fn unit_weights_sum_base_points() {
        let weights = WeightVector::new(1.0, 1.0, 1.0).unwrap();
        let cost = compute_cost(Distance::Long, Wait::High, Money::High, &weights);
        assert_eq!(cost, 25);
    }

    #[test]
    fn zero_weights_cost_nothing() {
        let weights = WeightVector::new(0.0, 0.0, 0.0).unwrap();
        assert_eq!(
            compute_cost(Distance::Long, Wait::High, Money::High, &weights),
            0
        );
    }

    #[test]
    fn halfway_values_round_up() {
        // 3*0.5 + 2*0.0 + 2*0.0 = 1.5 -> 2
        let weights = WeightVector::new(0.5, 0.0, 0.0).unwrap();
        assert_eq!(
            compute_cost(Distance::Short, Wait::Low, Money::Low, &weights),
            2
        );
    }

    #[test]
    fn cost_is_deterministic() {
        let weights = WeightVector::new(1.3, 0.7, 0.2).unwrap();
        let first = compute_cost(Distance::Medium, Wait::Medium, Money::High, &weights);
        let second = compute_cost(Distance::Medium, Wait::Medium, Money::High, &weights);
        assert_eq!(first, second);
    }

    #[test]
    fn descriptions_cover_all_buckets() {
        assert_eq!(cost_description(0), "easy stroll");
        assert_eq!(cost_description(5), "easy stroll");
        assert_eq!(cost_description(6), "small effort");
        assert_eq!(cost_description(14), "proper sacrifice");
        assert_eq!(cost_description(20), "hero of the day");
        assert_eq!(cost_description(21), "absolute legend");
    }
}

//! Decides how many generation units a run dispatches.

use rand::{rngs::StdRng, Rng, SeedableRng};
use std::ops::RangeInclusive;

use crate::models::{BatchPlan, PlanControls, AI_GROUP_SIZE, MAX_UNITS};

/// Source of per-group sizes when the caller leaves the cap unset.
pub trait GroupSizer: Send {
    /// Returns a value inside `range`, bounds included.
    fn draw(&mut self, range: RangeInclusive<u32>) -> u32;
}

/// Uniform draws from a seedable RNG.
pub struct RandomSizer<R = StdRng> {
    rng: R,
}

impl RandomSizer<StdRng> {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomSizer<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng + Send> RandomSizer<R> {
    pub fn from_rng(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng + Send> GroupSizer for RandomSizer<R> {
    fn draw(&mut self, range: RangeInclusive<u32>) -> u32 {
        self.rng.random_range(range)
    }
}

/// Replays a fixed sequence, cycling when exhausted. Values are clamped into the range.
#[derive(Debug, Clone)]
pub struct ScriptedSizer {
    values: Vec<u32>,
    position: usize,
}

impl ScriptedSizer {
    pub fn new(values: impl Into<Vec<u32>>) -> Self {
        Self {
            values: values.into(),
            position: 0,
        }
    }
}

impl GroupSizer for ScriptedSizer {
    fn draw(&mut self, range: RangeInclusive<u32>) -> u32 {
        if self.values.is_empty() {
            return *range.start();
        }
        let value = self.values[self.position % self.values.len()];
        self.position += 1;
        value.clamp(*range.start(), *range.end())
    }
}

pub fn plan_batch(controls: &PlanControls, sizer: &mut dyn GroupSizer) -> BatchPlan {
    let normalized = controls.normalized();
    if normalized != *controls {
        log::debug!("Plan controls clamped from {:?} to {:?}", controls, normalized);
    }

    if !normalized.grouped {
        return BatchPlan {
            unit_count: normalized.flat_count.min(MAX_UNITS),
            grouped: false,
            per_group_cap: None,
            group_sizes: Vec::new(),
        };
    }

    let group_sizes: Vec<u32> = (0..normalized.group_count)
        .map(|_| match normalized.per_group_cap {
            Some(cap) => cap,
            None => sizer.draw(AI_GROUP_SIZE),
        })
        .collect();

    let requested: u32 = group_sizes.iter().sum();
    let unit_count = requested.min(MAX_UNITS);

    log::debug!(
        "Planned {} groups {:?} -> {} units (requested {})",
        group_sizes.len(),
        group_sizes,
        unit_count,
        requested
    );

    BatchPlan {
        unit_count,
        grouped: true,
        per_group_cap: normalized.per_group_cap,
        group_sizes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_count_is_used_and_clamped() {
        let mut sizer = ScriptedSizer::new(vec![]);
        for count in [1, 5, 250, 500] {
            let plan = plan_batch(&PlanControls::flat(count), &mut sizer);
            assert_eq!(plan.unit_count, count);
            assert!(!plan.grouped);
        }
        assert_eq!(plan_batch(&PlanControls::flat(9000), &mut sizer).unit_count, 500);
        assert_eq!(plan_batch(&PlanControls::flat(0), &mut sizer).unit_count, 1);
    }

    #[test]
    fn test_grouped_with_cap_multiplies() {
        let mut sizer = ScriptedSizer::new(vec![5]);
        let plan = plan_batch(&PlanControls::grouped(7, Some(12)), &mut sizer);
        assert_eq!(plan.unit_count, 84);
        assert_eq!(plan.group_sizes, vec![12; 7]);
        assert_eq!(plan.per_group_cap, Some(12));
    }

    #[test]
    fn test_grouped_cap_is_clamped_to_fifteen() {
        let mut sizer = ScriptedSizer::new(vec![]);
        let plan = plan_batch(&PlanControls::grouped(2, Some(40)), &mut sizer);
        assert_eq!(plan.group_sizes, vec![15, 15]);
    }

    #[test]
    fn test_grouped_without_cap_uses_scripted_draws() {
        let mut sizer = ScriptedSizer::new(vec![5, 15, 10, 8]);
        let plan = plan_batch(&PlanControls::grouped(4, None), &mut sizer);
        assert_eq!(plan.group_sizes, vec![5, 15, 10, 8]);
        assert_eq!(plan.unit_count, 38);
        assert_eq!(plan.requested_units(), 38);
        assert!(!plan.was_capped());
    }

    #[test]
    fn test_random_draws_stay_in_range() {
        let mut sizer = RandomSizer::seeded(42);
        for _ in 0..50 {
            let plan = plan_batch(&PlanControls::grouped(20, None), &mut sizer);
            assert_eq!(plan.group_sizes.len(), 20);
            assert!(plan.group_sizes.iter().all(|size| (5..=15).contains(size)));
            assert_eq!(plan.unit_count, plan.group_sizes.iter().sum::<u32>().min(500));
        }
    }

    #[test]
    fn test_seeded_sizer_is_reproducible() {
        let a = plan_batch(&PlanControls::grouped(10, None), &mut RandomSizer::seeded(7));
        let b = plan_batch(&PlanControls::grouped(10, None), &mut RandomSizer::seeded(7));
        assert_eq!(a, b);
    }

    #[test]
    fn test_scripted_values_are_clamped_into_range() {
        let mut sizer = ScriptedSizer::new(vec![1, 99]);
        assert_eq!(sizer.draw(5..=15), 5);
        assert_eq!(sizer.draw(5..=15), 15);
        assert_eq!(sizer.draw(5..=15), 5);
    }
}

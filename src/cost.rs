use crate::models::{CostEstimate, PlanControls, CREDITS_PER_IMAGE, ESTIMATED_GROUP_SIZE, MAX_UNITS};

/// Credit cost shown before a run.
///
/// With grouping on and no cap, the real per-group size is only drawn at
/// generation time, so the estimate assumes [`ESTIMATED_GROUP_SIZE`] per group
/// and is flagged as approximate. The dispatched count will differ.
pub fn estimate_cost(controls: &PlanControls) -> CostEstimate {
    let controls = controls.normalized();

    let (images, estimated) = if !controls.grouped {
        (controls.flat_count, false)
    } else {
        match controls.per_group_cap {
            Some(cap) => (controls.group_count * cap, false),
            None => (controls.group_count * ESTIMATED_GROUP_SIZE, true),
        }
    };

    CostEstimate {
        credits: images.min(MAX_UNITS) * CREDITS_PER_IMAGE,
        estimated,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_cost() {
        let cost = estimate_cost(&PlanControls::flat(5));
        assert_eq!(cost.credits, 5);
        assert!(!cost.estimated);
        assert_eq!(cost.to_string(), "5");
    }

    #[test]
    fn test_grouped_with_cap_cost() {
        let cost = estimate_cost(&PlanControls::grouped(3, Some(15)));
        assert_eq!(cost.credits, 45);
        assert!(!cost.estimated);
    }

    #[test]
    fn test_grouped_without_cap_uses_display_estimate() {
        let cost = estimate_cost(&PlanControls::grouped(4, None));
        assert_eq!(cost.credits, 40);
        assert!(cost.estimated);
        assert_eq!(cost.to_string(), "~40");
    }

    #[test]
    fn test_cost_respects_input_ranges() {
        assert_eq!(estimate_cost(&PlanControls::flat(10_000)).credits, 500);
        assert_eq!(estimate_cost(&PlanControls::grouped(50, None)).credits, 200);
    }
}

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;

/// Hard ceiling on units per run, whatever the mode.
pub const MAX_UNITS: u32 = 500;
pub const MAX_GROUPS: u32 = 20;
pub const MAX_PER_GROUP: u32 = 15;
/// Range the per-group size is drawn from when the caller leaves it unset.
pub const AI_GROUP_SIZE: RangeInclusive<u32> = 5..=15;
/// Per-group size shown in cost estimates when the real size is drawn at run time.
pub const ESTIMATED_GROUP_SIZE: u32 = 10;
pub const CREDITS_PER_IMAGE: u32 = 1;

/// Raw sizing inputs as the caller collected them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanControls {
    pub grouped: bool,
    pub flat_count: u32,
    pub group_count: u32,
    pub per_group_cap: Option<u32>,
}

impl Default for PlanControls {
    fn default() -> Self {
        Self {
            grouped: false,
            flat_count: 1,
            group_count: 1,
            per_group_cap: None,
        }
    }
}

impl PlanControls {
    pub fn flat(count: u32) -> Self {
        Self {
            flat_count: count,
            ..Default::default()
        }
    }

    pub fn grouped(group_count: u32, per_group_cap: Option<u32>) -> Self {
        Self {
            grouped: true,
            group_count,
            per_group_cap,
            ..Default::default()
        }
    }

    /// Clamps every input into its accepted range.
    pub fn normalized(&self) -> Self {
        Self {
            grouped: self.grouped,
            flat_count: self.flat_count.clamp(1, MAX_UNITS),
            group_count: self.group_count.clamp(1, MAX_GROUPS),
            per_group_cap: self.per_group_cap.map(|cap| cap.clamp(1, MAX_PER_GROUP)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchPlan {
    pub unit_count: u32,
    pub grouped: bool,
    pub per_group_cap: Option<u32>,
    /// Size drawn for each group; empty in flat mode.
    pub group_sizes: Vec<u32>,
}

impl BatchPlan {
    /// Units asked for before the ceiling was applied.
    pub fn requested_units(&self) -> u32 {
        if self.grouped {
            self.group_sizes.iter().sum()
        } else {
            self.unit_count
        }
    }

    pub fn was_capped(&self) -> bool {
        self.requested_units() > self.unit_count
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostEstimate {
    pub credits: u32,
    /// Set when the per-group size is decided at generation time.
    pub estimated: bool,
}

impl fmt::Display for CostEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.estimated {
            write!(f, "~{}", self.credits)
        } else {
            write!(f, "{}", self.credits)
        }
    }
}

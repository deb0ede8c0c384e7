use crate::types::{OptimizationResult, PackedUnit};
use serde::{Deserialize, Serialize};

/// Usage aggregated per material/profile grouping key. `used` and `waste`
/// are millimetres for bar runs and mm² for sheet runs. A unit's waste is
/// attributed to the group of its first cut; runs are filtered per project
/// material, so mixed-group units are the exception, not the rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupUsage {
    pub group: String,
    pub cuts: usize,
    pub used: u64,
    pub waste: u64,
}

/// Read-only aggregates derived from a finished allocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectStats {
    pub units_used: usize,
    pub total_waste: u64,
    pub waste_percent: f64,
    pub efficiency_percent: f64,
    pub by_group: Vec<GroupUsage>,
}

const UNGROUPED: &str = "unspecified";

pub fn compute_stats(result: &OptimizationResult) -> ProjectStats {
    let raw_waste = result.waste_percent();

    let mut by_group: Vec<GroupUsage> = Vec::new();
    for unit in &result.units {
        match unit {
            PackedUnit::Bar { cuts, waste, .. } => {
                for cut in cuts {
                    bump(&mut by_group, cut.group.as_deref(), cut.length as u64, 0);
                }
                if let Some(first) = cuts.first() {
                    bump_waste(&mut by_group, first.group.as_deref(), *waste as u64);
                }
            }
            PackedUnit::Sheet {
                cuts, waste_area, ..
            } => {
                for cut in cuts {
                    bump(&mut by_group, cut.group.as_deref(), cut.area(), 0);
                }
                if let Some(first) = cuts.first() {
                    bump_waste(&mut by_group, first.group.as_deref(), *waste_area);
                }
            }
        }
    }

    ProjectStats {
        units_used: result.unit_count(),
        total_waste: result.total_waste,
        waste_percent: round2(raw_waste),
        efficiency_percent: round2(100.0 - raw_waste),
        by_group,
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

fn bump(groups: &mut Vec<GroupUsage>, key: Option<&str>, used: u64, waste: u64) {
    let key = key.unwrap_or(UNGROUPED);
    match groups.iter_mut().find(|g| g.group == key) {
        Some(g) => {
            g.cuts += 1;
            g.used += used;
            g.waste += waste;
        }
        None => groups.push(GroupUsage {
            group: key.to_owned(),
            cuts: 1,
            used,
            waste,
        }),
    }
}

fn bump_waste(groups: &mut Vec<GroupUsage>, key: Option<&str>, waste: u64) {
    let key = key.unwrap_or(UNGROUPED);
    if let Some(g) = groups.iter_mut().find(|g| g.group == key) {
        g.waste += waste;
    }
}

//! Unlock rules: which commands the learner can use at a given score.

use crate::command::CommandDef;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Stage unlock mode marker carried by the command config.
pub const UNLOCK_MODE_STAGES: &str = "stages";

/// One named unlock tier: commands granted once the learner's score
/// reaches `coefficient x population` for this stage id.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StageRule {
    pub id: String,
    #[serde(default)]
    pub commands: Vec<String>,
}

/// Per-level command catalog and unlock configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantRules {
    #[serde(default)]
    pub label: Option<String>,
    /// Catalog in authoring order.
    #[serde(default)]
    pub commands: Vec<CommandDef>,
    /// Direct per-command score costs, the fallback unlock scheme.
    #[serde(default)]
    pub command_costs: BTreeMap<String, f64>,
    /// Stage id -> threshold coefficient.
    #[serde(default)]
    pub coefficients: Option<BTreeMap<String, f64>>,
    /// Stage tiers in authoring order.
    #[serde(default)]
    pub stage_rules: Vec<StageRule>,
    #[serde(default)]
    pub unlock_mode: Option<String>,
}

impl VariantRules {
    /// Commands currently usable at the given score and population size.
    ///
    /// Precedence mirrors the original rule table exactly: explicit stage
    /// mode wins, direct costs are the fallback, and a variant carrying
    /// coefficients without the stage mode or costs still evaluates the
    /// stage logic. Anything else unlocks nothing.
    pub fn usable_commands(&self, score: f64, population: f64) -> Vec<String> {
        let has_costs = !self.command_costs.is_empty();
        let use_stage_unlocks = self.unlock_mode.as_deref() == Some(UNLOCK_MODE_STAGES);

        if use_stage_unlocks && self.coefficients.is_some() {
            self.stage_unlocks(score, population)
        } else if has_costs {
            self.commands
                .iter()
                .filter(|command| {
                    self.command_costs
                        .get(&command.id)
                        .copied()
                        .is_some_and(|cost| cost.is_finite() && score >= cost * population)
                })
                .map(|command| command.id.clone())
                .collect()
        } else if self.coefficients.is_some() {
            self.stage_unlocks(score, population)
        } else {
            Vec::new()
        }
    }

    /// Union of the commands of every qualifying stage, stage-rule
    /// authoring order, first occurrence wins.
    fn stage_unlocks(&self, score: f64, population: f64) -> Vec<String> {
        let Some(coefficients) = &self.coefficients else {
            return Vec::new();
        };

        let mut usable = Vec::new();
        for stage in &self.stage_rules {
            // A stage without a coefficient never qualifies.
            let Some(coefficient) = coefficients.get(&stage.id) else {
                continue;
            };
            if score >= coefficient * population {
                usable.extend(stage.commands.iter().cloned());
            }
        }

        let mut seen = HashSet::new();
        usable.retain(|id| seen.insert(id.clone()));
        usable
    }

    /// Display cost for one command; absent or non-finite costs read as
    /// zero.
    pub fn command_cost(&self, id: &str) -> f64 {
        self.command_costs
            .get(id)
            .copied()
            .filter(|cost| cost.is_finite())
            .unwrap_or(0.0)
    }
}

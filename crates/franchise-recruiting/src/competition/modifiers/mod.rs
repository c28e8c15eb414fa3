mod rules;
mod table;

pub use table::{ModifierTable, PromiseRule, SeasonOutlook};

use serde::{Deserialize, Serialize};

use super::domain::{Candidate, Promise, PromiseType, RecruitingSettings, TeamProfile};
use rules::{promise_effect, PromiseInputs};

/// Auditable explanation of the modifier shown to a team as "Mod.".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModifierComponent {
    pub promise_type: PromiseType,
    pub value: f64,
    pub notes: String,
}

/// Stateless converter from an active promise to a bounded score modifier.
#[derive(Debug, Clone, Default)]
pub struct ModifierCalculator {
    table: ModifierTable,
    outlook: SeasonOutlook,
}

impl ModifierCalculator {
    pub fn new(table: ModifierTable, outlook: SeasonOutlook) -> Self {
        Self { table, outlook }
    }

    pub fn table(&self) -> &ModifierTable {
        &self.table
    }

    pub fn outlook(&self) -> &SeasonOutlook {
        &self.outlook
    }

    /// Modifier for the profile; `0` without an active promise owned by the same team.
    pub fn compute(
        &self,
        candidate: &Candidate,
        profile: &TeamProfile,
        promise: Option<&Promise>,
        settings: Option<&RecruitingSettings>,
    ) -> f64 {
        self.explain(candidate, profile, promise, settings)
            .map(|component| component.value)
            .unwrap_or(0.0)
    }

    pub fn explain(
        &self,
        candidate: &Candidate,
        profile: &TeamProfile,
        promise: Option<&Promise>,
        settings: Option<&RecruitingSettings>,
    ) -> Option<ModifierComponent> {
        let promise = promise.filter(|promise| {
            promise.is_active
                && promise.team_id == profile.team.id
                && promise.candidate_id == profile.candidate_id
        })?;
        let rule = self.table.rule(promise.promise_type)?;

        let inputs = PromiseInputs {
            candidate,
            promise,
            team: profile.team.id,
            settings,
            outlook: &self.outlook,
        };
        let (raw, notes) = promise_effect(rule, &inputs);

        Some(ModifierComponent {
            promise_type: promise.promise_type,
            value: bound(raw, self.table.max_abs_modifier),
            notes,
        })
    }
}

fn bound(value: f64, limit: f64) -> f64 {
    let limit = if limit.is_finite() { limit.abs() } else { 0.0 };
    if !value.is_finite() {
        return 0.0;
    }
    value.clamp(-limit, limit)
}

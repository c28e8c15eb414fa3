use super::super::domain::{Candidate, Promise, PromiseType, RecruitingSettings, TeamId};
use super::table::{PromiseRule, SeasonOutlook};

pub(crate) struct PromiseInputs<'a> {
    pub candidate: &'a Candidate,
    pub promise: &'a Promise,
    pub team: TeamId,
    pub settings: Option<&'a RecruitingSettings>,
    pub outlook: &'a SeasonOutlook,
}

/// Raw effect of a promise before the table-wide bound is applied.
pub(crate) fn promise_effect(rule: PromiseRule, inputs: &PromiseInputs<'_>) -> (f64, String) {
    let promise = inputs.promise;
    let strength = f64::from(promise.weight.min(100)) / 100.0;

    match promise.promise_type {
        PromiseType::NoRedshirt => {
            if inputs.candidate.is_redshirting {
                (
                    rule.unmet_penalty,
                    "candidate is already redshirting".to_string(),
                )
            } else {
                (
                    rule.max_bonus * strength,
                    format!("no-redshirt promise at weight {}", promise.weight),
                )
            }
        }
        PromiseType::Wins => {
            let target = promise.benchmark.unwrap_or(0.0);
            if !(target.is_finite() && target > 0.0) {
                return (0.0, "no win target set".to_string());
            }
            let achievable = (inputs.outlook.league_average_wins / target).clamp(0.0, 1.0);
            (
                rule.max_bonus * strength * achievable,
                format!(
                    "{target:.0} wins against a league average of {:.1} ({:.0}% achievable)",
                    inputs.outlook.league_average_wins,
                    achievable * 100.0
                ),
            )
        }
        PromiseType::HomeStateGame => {
            let state = promise
                .benchmark_str
                .as_deref()
                .or(inputs.candidate.home_state.as_deref())
                .unwrap_or_default();
            if !state.is_empty() && inputs.outlook.schedules_game_in(inputs.team, state) {
                (rule.max_bonus, format!("schedule includes a game in {state}"))
            } else {
                (
                    rule.unmet_penalty,
                    format!("no scheduled game in {state}"),
                )
            }
        }
        PromiseType::PlayingTime => {
            let share = promise.benchmark.unwrap_or(0.0);
            let share = if share.is_finite() { share } else { 0.0 };
            let share = (share / 100.0).clamp(0.0, 1.0);
            (
                rule.max_bonus * strength * share,
                format!("{:.0}% playing time promised", share * 100.0),
            )
        }
        PromiseType::GameplanFit => {
            let scheme = promise.benchmark_str.as_deref().unwrap_or_default();
            let fits = !scheme.trim().is_empty()
                && inputs
                    .settings
                    .map(|settings| settings.runs_scheme(scheme))
                    .unwrap_or(false);
            if fits {
                (
                    rule.max_bonus * strength,
                    format!("team runs the {scheme} scheme"),
                )
            } else {
                (
                    rule.unmet_penalty,
                    format!("team does not run the {scheme} scheme"),
                )
            }
        }
    }
}

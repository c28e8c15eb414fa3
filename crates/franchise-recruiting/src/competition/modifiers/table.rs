use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::super::domain::{PromiseType, TeamId};

/// Coefficients for one promise type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PromiseRule {
    pub max_bonus: f64,
    pub unmet_penalty: f64,
}

/// League coefficient table keyed by promise type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModifierTable {
    pub rules: BTreeMap<PromiseType, PromiseRule>,
    pub max_abs_modifier: f64,
}

impl ModifierTable {
    pub fn rule(&self, promise_type: PromiseType) -> Option<PromiseRule> {
        self.rules.get(&promise_type).copied()
    }

    pub fn with_rule(mut self, promise_type: PromiseType, rule: PromiseRule) -> Self {
        self.rules.insert(promise_type, rule);
        self
    }
}

impl Default for ModifierTable {
    fn default() -> Self {
        let rules = [
            (PromiseType::NoRedshirt, 10.0, 0.0),
            (PromiseType::Wins, 15.0, 0.0),
            (PromiseType::HomeStateGame, 8.0, 0.0),
            (PromiseType::PlayingTime, 12.0, 0.0),
            (PromiseType::GameplanFit, 6.0, 0.0),
        ]
        .into_iter()
        .map(|(promise_type, max_bonus, unmet_penalty)| {
            (
                promise_type,
                PromiseRule {
                    max_bonus,
                    unmet_penalty,
                },
            )
        })
        .collect();

        Self {
            rules,
            max_abs_modifier: 20.0,
        }
    }
}

/// Season context promises are judged against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonOutlook {
    pub games_per_season: u32,
    pub league_average_wins: f64,
    /// States each team has at least one scheduled game in.
    pub home_state_games: BTreeMap<TeamId, BTreeSet<String>>,
}

impl Default for SeasonOutlook {
    fn default() -> Self {
        Self {
            games_per_season: 12,
            league_average_wins: 6.0,
            home_state_games: BTreeMap::new(),
        }
    }
}

impl SeasonOutlook {
    pub fn with_home_state_game(mut self, team: TeamId, state: &str) -> Self {
        self.home_state_games
            .entry(team)
            .or_default()
            .insert(normalize_state(state));
        self
    }

    pub fn schedules_game_in(&self, team: TeamId, state: &str) -> bool {
        self.home_state_games
            .get(&team)
            .map(|states| states.contains(&normalize_state(state)))
            .unwrap_or(false)
    }
}

fn normalize_state(state: &str) -> String {
    state.trim().to_ascii_uppercase()
}

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::domain::{CandidateId, TeamId};

/// Share of the leading score a team needs to stay in the running.
pub const RUNNING_THRESHOLD_RATIO: f64 = 0.66;

/// How many leaders compact views show.
pub const DISPLAY_LEADER_LIMIT: usize = 4;

/// Input row for the projector: one non-removed profile with its modifier applied.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredProfile {
    pub team_id: TeamId,
    pub team_abbreviation: String,
    pub total_points: f64,
    pub modifier: f64,
}

impl ScoredProfile {
    pub fn effective_score(&self) -> f64 {
        let score = self.total_points + self.modifier;
        if score.is_finite() {
            score.max(0.0)
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Standing {
    pub team_id: TeamId,
    pub team_abbreviation: String,
    pub effective_score: f64,
    pub odds: f64,
}

/// Threshold-filtered, normalized ranking of teams for one candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Standings {
    pub candidate_id: CandidateId,
    pub top_score: f64,
    pub threshold: f64,
    pub pool_total: f64,
    pub entries: Vec<Standing>,
}

impl Standings {
    fn empty(candidate_id: CandidateId) -> Self {
        Self {
            candidate_id,
            top_score: 0.0,
            threshold: 0.0,
            pool_total: 0.0,
            entries: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn odds_for(&self, team: TeamId) -> Option<f64> {
        self.entries
            .iter()
            .find(|standing| standing.team_id == team)
            .map(|standing| standing.odds)
    }

    /// Presentation cut: positive odds only, best `limit` first.
    pub fn leaders(&self, limit: usize) -> Vec<&Standing> {
        self.entries
            .iter()
            .filter(|standing| standing.odds > 0.0)
            .take(limit)
            .collect()
    }
}

/// Converts scored profiles into standings. Holds no state between calls.
pub struct StandingsProjector;

impl StandingsProjector {
    pub fn project<I>(candidate_id: CandidateId, profiles: I) -> Standings
    where
        I: IntoIterator<Item = ScoredProfile>,
    {
        let mut scored: Vec<(ScoredProfile, f64)> = profiles
            .into_iter()
            .map(|profile| {
                let score = profile.effective_score();
                (profile, score)
            })
            .collect();

        scored.sort_by(|(left, left_score), (right, right_score)| {
            right_score
                .partial_cmp(left_score)
                .unwrap_or(Ordering::Equal)
                .then(left.team_id.cmp(&right.team_id))
        });

        let Some(top_score) = scored.first().map(|(_, score)| *score) else {
            return Standings::empty(candidate_id);
        };
        let threshold = top_score * RUNNING_THRESHOLD_RATIO;

        let qualifying: Vec<(ScoredProfile, f64)> = scored
            .into_iter()
            .filter(|(_, score)| *score >= threshold)
            .collect();
        let pool_total = qualifying
            .iter()
            .fold(0.0, |total, (_, score)| total + score);

        if pool_total <= 0.0 {
            return Standings {
                top_score,
                threshold,
                ..Standings::empty(candidate_id)
            };
        }

        let entries = qualifying
            .into_iter()
            .map(|(profile, score)| Standing {
                team_id: profile.team_id,
                team_abbreviation: profile.team_abbreviation,
                effective_score: score,
                odds: score / pool_total,
            })
            .collect();

        Standings {
            candidate_id,
            top_score,
            threshold,
            pool_total,
            entries,
        }
    }
}

/// Memoised projections keyed by candidate and the ledger version they were built from.
#[derive(Debug, Default)]
pub struct StandingsCache {
    entries: HashMap<CandidateId, (u64, Standings)>,
}

impl StandingsCache {
    pub fn get(&self, candidate_id: CandidateId, version: u64) -> Option<&Standings> {
        self.entries
            .get(&candidate_id)
            .filter(|(cached_version, _)| *cached_version == version)
            .map(|(_, standings)| standings)
    }

    pub fn insert(&mut self, candidate_id: CandidateId, version: u64, standings: Standings) {
        self.entries.insert(candidate_id, (version, standings));
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scored(team: u32, total_points: f64) -> ScoredProfile {
        ScoredProfile {
            team_id: TeamId(team),
            team_abbreviation: format!("T{team}"),
            total_points,
            modifier: 0.0,
        }
    }

    fn penalised(team: u32, total_points: f64, modifier: f64) -> ScoredProfile {
        ScoredProfile {
            modifier,
            ..scored(team, total_points)
        }
    }

    #[test]
    fn negative_effective_score_is_floored() {
        let sunk = penalised(1, 10.0, -15.0);
        assert_eq!(sunk.effective_score(), 0.0);

        let standings = StandingsProjector::project(CandidateId(1), vec![sunk, scored(2, 30.0)]);
        assert_eq!(standings.entries.len(), 1);
        assert_eq!(standings.entries[0].team_id, TeamId(2));
        assert_eq!(standings.entries[0].odds, 1.0);
        assert_eq!(standings.pool_total, 30.0);
    }

    #[test]
    fn penalty_pushes_team_under_threshold() {
        let standings = StandingsProjector::project(
            CandidateId(1),
            vec![scored(1, 100.0), penalised(2, 70.0, -15.0)],
        );

        assert!((standings.threshold - 66.0).abs() < 1e-9);
        assert!(standings.odds_for(TeamId(2)).is_none());
        assert_eq!(standings.odds_for(TeamId(1)), Some(1.0));
    }

    #[test]
    fn fully_penalised_pool_projects_empty() {
        let standings = StandingsProjector::project(
            CandidateId(1),
            vec![penalised(1, 5.0, -20.0), penalised(2, 12.0, -12.0)],
        );

        assert!(standings.is_empty());
        assert_eq!(standings.top_score, 0.0);
    }

    #[test]
    fn three_team_example_excludes_trailing_team() {
        let standings = StandingsProjector::project(
            CandidateId(1),
            vec![scored(1, 100.0), scored(2, 70.0), scored(3, 50.0)],
        );

        assert_eq!(standings.threshold, 100.0 * RUNNING_THRESHOLD_RATIO);
        assert_eq!(standings.pool_total, 170.0);
        assert_eq!(standings.entries.len(), 2);
        assert!((standings.odds_for(TeamId(1)).unwrap() - 100.0 / 170.0).abs() < 1e-12);
        assert!((standings.odds_for(TeamId(2)).unwrap() - 70.0 / 170.0).abs() < 1e-12);
        assert!(standings.odds_for(TeamId(3)).is_none());
    }

    #[test]
    fn odds_sum_to_one() {
        let standings = StandingsProjector::project(
            CandidateId(1),
            vec![
                scored(4, 33.3),
                scored(1, 40.0),
                scored(2, 39.9),
                scored(3, 27.0),
            ],
        );
        let total: f64 = standings.entries.iter().map(|standing| standing.odds).sum();
        assert!((total - 1.0).abs() < 1e-9);
        assert_eq!(standings.entries[0].team_id, TeamId(1));
    }

    #[test]
    fn team_exactly_on_threshold_qualifies() {
        let standings =
            StandingsProjector::project(CandidateId(1), vec![scored(1, 100.0), scored(2, 66.0)]);
        assert_eq!(standings.entries.len(), 2);
    }

    #[test]
    fn modifier_counts_toward_effective_score() {
        let mut boosted = scored(2, 60.0);
        boosted.modifier = 10.0;
        let standings =
            StandingsProjector::project(CandidateId(1), vec![scored(1, 100.0), boosted]);
        assert_eq!(standings.entries.len(), 2);
        assert_eq!(standings.entries[1].effective_score, 70.0);
    }

    #[test]
    fn all_zero_scores_project_empty() {
        let standings =
            StandingsProjector::project(CandidateId(1), vec![scored(1, 0.0), scored(2, 0.0)]);
        assert!(standings.is_empty());
        assert_eq!(standings.pool_total, 0.0);
    }

    #[test]
    fn no_profiles_project_empty() {
        let standings = StandingsProjector::project(CandidateId(1), Vec::new());
        assert!(standings.is_empty());
    }

    #[test]
    fn ties_break_by_team_id() {
        let standings =
            StandingsProjector::project(CandidateId(1), vec![scored(9, 50.0), scored(3, 50.0)]);
        assert_eq!(standings.entries[0].team_id, TeamId(3));
        assert_eq!(standings.entries[0].odds, 0.5);
    }

    #[test]
    fn leaders_take_at_most_four() {
        let profiles = (1..=6).map(|team| scored(team, 90.0 + f64::from(team)));
        let standings = StandingsProjector::project(CandidateId(1), profiles);
        assert_eq!(standings.entries.len(), 6);
        let leaders = standings.leaders(DISPLAY_LEADER_LIMIT);
        assert_eq!(leaders.len(), 4);
        assert_eq!(leaders[0].team_id, TeamId(6));
    }

    #[test]
    fn cache_serves_matching_version_only() {
        let mut cache = StandingsCache::default();
        let standings = StandingsProjector::project(CandidateId(1), vec![scored(1, 10.0)]);
        cache.insert(CandidateId(1), 5, standings.clone());

        assert_eq!(cache.get(CandidateId(1), 5), Some(&standings));
        assert!(cache.get(CandidateId(1), 6).is_none());
        assert!(cache.get(CandidateId(2), 5).is_none());

        cache.clear();
        assert!(cache.is_empty());
    }
}

use super::domain::{AiSettings, Candidate, Promise, PromiseType, TeamId};
use super::error::CompetitionError;
use super::requests::{AiSettingsRequest, PromiseRequest};

pub const DEFAULT_AI_MIN_SPREAD: u32 = 5;
const DEFAULT_GAMES_PER_SEASON: u32 = 12;
const MAX_STARS: u8 = 5;

/// Local shape checks run before anything is submitted to the remote store.
#[derive(Debug, Clone)]
pub struct SubmissionGuard {
    games_per_season: u32,
    ai_min_spread: u32,
}

impl Default for SubmissionGuard {
    fn default() -> Self {
        Self::new(DEFAULT_GAMES_PER_SEASON, DEFAULT_AI_MIN_SPREAD)
    }
}

impl SubmissionGuard {
    pub fn new(games_per_season: u32, ai_min_spread: u32) -> Self {
        Self {
            games_per_season: if games_per_season == 0 {
                DEFAULT_GAMES_PER_SEASON
            } else {
                games_per_season
            },
            ai_min_spread,
        }
    }

    pub fn ai_min_spread(&self) -> u32 {
        self.ai_min_spread
    }

    /// Convert a promise payload into a validated promise for `candidate`.
    pub fn promise_from_request(
        &self,
        candidate: &Candidate,
        request: &PromiseRequest,
    ) -> Result<Promise, CompetitionError> {
        let mut messages = Vec::new();

        if request.promise_weight > 100 {
            messages.push(format!(
                "promise weight must be between 0 and 100 (found {})",
                request.promise_weight
            ));
        }

        let benchmark_str = request
            .benchmark_str
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string);

        match request.promise_type {
            PromiseType::NoRedshirt => {
                if candidate.is_redshirting {
                    messages.push(format!("{} is already redshirting", candidate.name));
                }
            }
            PromiseType::Wins => match request.benchmark {
                Some(wins)
                    if wins.is_finite()
                        && wins >= 1.0
                        && wins <= f64::from(self.games_per_season) => {}
                _ => messages.push(format!(
                    "win benchmark must be between 1 and {}",
                    self.games_per_season
                )),
            },
            PromiseType::HomeStateGame => match candidate.home_state.as_deref() {
                None | Some("") => messages.push(format!(
                    "{} has no state field for a home state game",
                    candidate.country
                )),
                Some(home) => {
                    if let Some(target) = &benchmark_str {
                        if !target.eq_ignore_ascii_case(home) {
                            messages.push(format!(
                                "home state game must target {home}, not {target}"
                            ));
                        }
                    }
                }
            },
            PromiseType::PlayingTime => match request.benchmark {
                Some(share) if share.is_finite() && share > 0.0 && share <= 100.0 => {}
                _ => messages.push("playing time share must be above 0 and at most 100".to_string()),
            },
            PromiseType::GameplanFit => {
                if benchmark_str.is_none() {
                    messages.push("gameplan promise needs a scheme name".to_string());
                }
            }
        }

        if !messages.is_empty() {
            return Err(CompetitionError::InvalidPromiseConfiguration(messages));
        }

        let benchmark_str = match request.promise_type {
            PromiseType::HomeStateGame => benchmark_str.or_else(|| candidate.home_state.clone()),
            _ => benchmark_str,
        };

        Ok(Promise {
            candidate_id: candidate.id,
            team_id: request.team_id,
            promise_type: request.promise_type,
            weight: request.promise_weight.min(100) as u8,
            benchmark: request.benchmark,
            benchmark_str,
            is_active: request.is_active,
        })
    }

    /// Range sanity for the settings consumed by the automated allocation process.
    pub fn ai_settings_from_request(
        &self,
        team: TeamId,
        request: &AiSettingsRequest,
    ) -> Result<AiSettings, CompetitionError> {
        let mut messages = Vec::new();

        for (label, stars) in [("minimum", request.ai_star_min), ("maximum", request.ai_star_max)] {
            if stars == 0 || stars > MAX_STARS {
                messages.push(format!("{label} star rating must be between 1 and {MAX_STARS}"));
            }
        }
        if request.ai_star_min > request.ai_star_max {
            messages.push("minimum star rating exceeds the maximum".to_string());
        }

        let spread = request
            .ai_max_threshold
            .saturating_sub(request.ai_min_threshold);
        if request.ai_max_threshold <= request.ai_min_threshold || spread <= self.ai_min_spread {
            messages.push(format!(
                "team {team}: threshold spread must exceed {} points (found {} to {})",
                self.ai_min_spread, request.ai_min_threshold, request.ai_max_threshold
            ));
        }

        for (label, scheme) in [
            ("offensive", &request.offensive_scheme),
            ("defensive", &request.defensive_scheme),
        ] {
            if matches!(scheme.as_deref().map(str::trim), Some("")) {
                messages.push(format!("{label} scheme cannot be blank"));
            }
        }

        if !messages.is_empty() {
            return Err(CompetitionError::InvalidAiSettings(messages));
        }

        Ok(AiSettings {
            is_ai: request.is_ai,
            star_min: request.ai_star_min,
            star_max: request.ai_star_max,
            min_threshold: request.ai_min_threshold,
            max_threshold: request.ai_max_threshold,
            offensive_scheme: request.offensive_scheme.clone(),
            defensive_scheme: request.defensive_scheme.clone(),
        })
    }
}

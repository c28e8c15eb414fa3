//! Hidden-attribute reveals for the team that scouts a candidate.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::domain::{Candidate, ScoutAttribute, TeamProfile};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoutReport {
    pub profile: TeamProfile,
    pub attribute: ScoutAttribute,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revealed: Option<String>,
}

/// Mark `attribute` scouted on the team's row. Only the potential grade carries a value.
pub(crate) fn scout(
    candidate: &Candidate,
    profile: &mut TeamProfile,
    attribute: ScoutAttribute,
    now: DateTime<Utc>,
) -> ScoutReport {
    if profile.scouted.insert(attribute) {
        profile.updated_at = now;
    }
    let revealed = match attribute {
        ScoutAttribute::PotentialGrade => candidate.potential_grade.clone(),
        _ => None,
    };

    ScoutReport {
        profile: profile.clone(),
        attribute,
        revealed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::competition::domain::{
        CandidateId, CandidateStatus, League, Market, ProfileId, TeamId, TeamIdentity,
    };
    use chrono::Duration;
    use std::collections::BTreeSet;

    fn prospect() -> Candidate {
        Candidate {
            id: CandidateId(3),
            name: "Jalen Cole".to_string(),
            league: League::CollegeBasketball,
            market: Market::Recruiting,
            position: "SF".to_string(),
            archetype: "Two-Way".to_string(),
            stars: 5,
            origin_team: None,
            status: CandidateStatus::Uncommitted,
            home_state: Some("GA".to_string()),
            country: "USA".to_string(),
            is_redshirting: false,
            potential_grade: Some("A".to_string()),
        }
    }

    fn row(updated_at: DateTime<Utc>) -> TeamProfile {
        TeamProfile {
            id: ProfileId(9),
            candidate_id: CandidateId(3),
            team: TeamIdentity {
                id: TeamId(2),
                abbreviation: "DUKE".to_string(),
            },
            total_points: 0.0,
            current_cycle_points: 0.0,
            removed_from_board: false,
            scholarship_offered: false,
            scholarship_revoked: false,
            scouted: BTreeSet::new(),
            updated_at,
        }
    }

    #[test]
    fn repeat_scouting_keeps_the_first_stamp() {
        let first = Utc::now();
        let later = first + Duration::minutes(5);
        let mut profile = row(first - Duration::days(1));

        let report = scout(&prospect(), &mut profile, ScoutAttribute::PotentialGrade, first);
        assert_eq!(report.revealed.as_deref(), Some("A"));
        assert_eq!(report.profile.updated_at, first);

        let again = scout(&prospect(), &mut profile, ScoutAttribute::PotentialGrade, later);
        assert_eq!(again.profile.updated_at, first);
        assert_eq!(again.profile.scouted.len(), 1);
    }

    #[test]
    fn other_attributes_reveal_nothing() {
        let mut profile = row(Utc::now());

        let report = scout(&prospect(), &mut profile, ScoutAttribute::Personality, Utc::now());

        assert!(report.revealed.is_none());
        assert!(profile.scouted.contains(&ScoutAttribute::Personality));
    }
}

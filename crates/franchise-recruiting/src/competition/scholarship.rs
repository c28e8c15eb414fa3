//! Scholarship offers drawn from a team's limited pool.

use chrono::{DateTime, Utc};

use super::domain::{RecruitingSettings, TeamProfile};
use super::error::CompetitionError;
use super::requests::ScholarshipAttribute;

/// Flip an offer or a revocation on `profile`, moving the scholarship in or out of the pool.
pub(crate) fn toggle(
    settings: &mut RecruitingSettings,
    profile: &mut TeamProfile,
    attribute: ScholarshipAttribute,
    now: DateTime<Utc>,
) -> Result<(), CompetitionError> {
    match attribute {
        ScholarshipAttribute::Scholarship if profile.scholarship_offered => {
            profile.scholarship_offered = false;
            settings.scholarships_available += 1;
        }
        ScholarshipAttribute::Scholarship => {
            if profile.scholarship_revoked {
                return Err(CompetitionError::OfferRevoked {
                    team: settings.team.id,
                    candidate: profile.candidate_id,
                });
            }
            if settings.scholarships_available == 0 {
                return Err(CompetitionError::NoScholarshipsAvailable(settings.team.id));
            }
            settings.scholarships_available -= 1;
            profile.scholarship_offered = true;
        }
        ScholarshipAttribute::ScholarshipRevoked => {
            profile.scholarship_revoked = !profile.scholarship_revoked;
            // a revocation also pulls back an outstanding offer
            if profile.scholarship_revoked && profile.scholarship_offered {
                profile.scholarship_offered = false;
                settings.scholarships_available += 1;
            }
        }
    }
    profile.updated_at = now;
    Ok(())
}

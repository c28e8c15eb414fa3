use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};

use super::domain::{CandidateId, ProfileId, TeamId, TeamIdentity, TeamProfile};
use super::error::CompetitionError;
use super::gate::CycleGate;

pub const DEFAULT_CYCLE_POINT_CAP: f64 = 20.0;

/// Per-(candidate, team) record of invested points.
#[derive(Debug, Clone)]
pub struct PointsLedger {
    cap: f64,
    profiles: BTreeMap<ProfileId, TeamProfile>,
    index: BTreeMap<(CandidateId, TeamId), ProfileId>,
    next_id: u64,
}

impl Default for PointsLedger {
    fn default() -> Self {
        Self::new(DEFAULT_CYCLE_POINT_CAP)
    }
}

impl PointsLedger {
    pub fn new(cap: f64) -> Self {
        let cap = if cap.is_finite() && cap > 0.0 {
            cap
        } else {
            DEFAULT_CYCLE_POINT_CAP
        };

        Self {
            cap,
            profiles: BTreeMap::new(),
            index: BTreeMap::new(),
            next_id: 1,
        }
    }

    pub fn cap(&self) -> f64 {
        self.cap
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn profile(&self, id: ProfileId) -> Option<&TeamProfile> {
        self.profiles.get(&id)
    }

    pub fn profile_for(&self, candidate: CandidateId, team: TeamId) -> Option<&TeamProfile> {
        self.index
            .get(&(candidate, team))
            .and_then(|id| self.profiles.get(id))
    }

    pub fn profiles_for_candidate(
        &self,
        candidate: CandidateId,
    ) -> impl Iterator<Item = &TeamProfile> + '_ {
        self.index
            .range((candidate, TeamId(u32::MIN))..=(candidate, TeamId(u32::MAX)))
            .filter_map(|(_, id)| self.profiles.get(id))
    }

    pub fn profiles_for_team(&self, team: TeamId) -> impl Iterator<Item = &TeamProfile> + '_ {
        self.profiles
            .values()
            .filter(move |profile| profile.team.id == team)
    }

    /// Profiles stamped after `since`, for the weekly sync to pick up.
    pub fn changes_since(&self, since: DateTime<Utc>) -> Vec<&TeamProfile> {
        self.profiles
            .values()
            .filter(|profile| profile.updated_at > since)
            .collect()
    }

    /// Add `delta` to the team's allocation for this cycle, clamping to `[0, cap]`.
    pub fn add_points(
        &mut self,
        gate: &CycleGate,
        session: TeamId,
        candidate: CandidateId,
        team: &TeamIdentity,
        delta: f64,
        now: DateTime<Utc>,
    ) -> Result<TeamProfile, CompetitionError> {
        gate.ensure_open()?;
        ensure_owner(session, team.id)?;

        if let Some(existing) = self.profile_for(candidate, team.id) {
            if existing.removed_from_board {
                return Err(CompetitionError::NotOnBoard {
                    team: team.id,
                    candidate,
                });
            }
        }

        let cap = self.cap;
        let profile = self.open_profile(candidate, team, now);
        apply_delta(profile, delta, cap, now);
        Ok(profile.clone())
    }

    /// Set the cycle allocation on an existing row to `value`.
    pub fn set_cycle_points(
        &mut self,
        gate: &CycleGate,
        session: TeamId,
        profile_id: ProfileId,
        value: f64,
        now: DateTime<Utc>,
    ) -> Result<TeamProfile, CompetitionError> {
        let profile = self
            .profiles
            .get(&profile_id)
            .ok_or(CompetitionError::UnknownProfile(profile_id))?;
        let delta = value - profile.current_cycle_points;
        let candidate = profile.candidate_id;
        let team = profile.team.clone();

        self.add_points(gate, session, candidate, &team, delta, now)
    }

    /// Logical delete: the row stays for history but leaves the standings.
    pub fn remove_profile(
        &mut self,
        candidate: CandidateId,
        team: TeamId,
        now: DateTime<Utc>,
    ) -> bool {
        let Some(id) = self.index.get(&(candidate, team)).copied() else {
            return false;
        };
        match self.profiles.get_mut(&id) {
            Some(profile) if !profile.removed_from_board => {
                profile.removed_from_board = true;
                profile.updated_at = now;
                true
            }
            _ => false,
        }
    }

    /// Fetch the row for (candidate, team), creating it with zero points or
    /// reactivating a removed one.
    pub(crate) fn open_profile(
        &mut self,
        candidate: CandidateId,
        team: &TeamIdentity,
        now: DateTime<Utc>,
    ) -> &mut TeamProfile {
        let next_id = &mut self.next_id;
        let id = *self.index.entry((candidate, team.id)).or_insert_with(|| {
            let id = ProfileId(*next_id);
            *next_id += 1;
            id
        });

        let profile = self.profiles.entry(id).or_insert_with(|| TeamProfile {
            id,
            candidate_id: candidate,
            team: team.clone(),
            total_points: 0.0,
            current_cycle_points: 0.0,
            removed_from_board: false,
            scholarship_offered: false,
            scholarship_revoked: false,
            scouted: BTreeSet::new(),
            updated_at: now,
        });
        if profile.removed_from_board {
            profile.removed_from_board = false;
            profile.updated_at = now;
        }
        profile
    }

    /// The row for (candidate, team), unless it is missing or removed from the board.
    pub fn active_profile(
        &self,
        candidate: CandidateId,
        team: TeamId,
    ) -> Result<&TeamProfile, CompetitionError> {
        self.profile_for(candidate, team)
            .filter(|profile| !profile.removed_from_board)
            .ok_or(CompetitionError::NotOnBoard { team, candidate })
    }

    pub(crate) fn active_profile_mut(
        &mut self,
        candidate: CandidateId,
        team: TeamId,
    ) -> Result<&mut TeamProfile, CompetitionError> {
        self.profile_for_mut(candidate, team)
            .filter(|profile| !profile.removed_from_board)
            .ok_or(CompetitionError::NotOnBoard { team, candidate })
    }

    pub(crate) fn profile_for_mut(
        &mut self,
        candidate: CandidateId,
        team: TeamId,
    ) -> Option<&mut TeamProfile> {
        let id = self.index.get(&(candidate, team))?;
        self.profiles.get_mut(id)
    }

    /// Load an authoritative row as-is, clamping only the cycle allocation.
    pub(crate) fn restore(&mut self, mut profile: TeamProfile) {
        profile.current_cycle_points = clamp_finite(profile.current_cycle_points, 0.0, self.cap);
        profile.total_points = clamp_finite(profile.total_points, 0.0, f64::MAX);
        self.next_id = self.next_id.max(profile.id.0 + 1);
        let key = (profile.candidate_id, profile.team.id);
        if let Some(stale) = self.profiles.get(&profile.id) {
            let stale_key = (stale.candidate_id, stale.team.id);
            if stale_key != key {
                self.index.remove(&stale_key);
            }
        }
        if let Some(previous) = self
            .index
            .insert(key, profile.id)
        {
            if previous != profile.id {
                self.profiles.remove(&previous);
            }
        }
        self.profiles.insert(profile.id, profile);
    }

    /// Drop every row for a candidate that left the market for good.
    pub(crate) fn purge_candidate(&mut self, candidate: CandidateId) -> usize {
        let ids: Vec<ProfileId> = self
            .profiles_for_candidate(candidate)
            .map(|profile| profile.id)
            .collect();
        for id in &ids {
            if let Some(profile) = self.profiles.remove(id) {
                self.index.remove(&(profile.candidate_id, profile.team.id));
            }
        }
        ids.len()
    }
}

pub(crate) fn ensure_owner(session: TeamId, owner: TeamId) -> Result<(), CompetitionError> {
    if session == owner {
        Ok(())
    } else {
        Err(CompetitionError::PermissionDenied { session, owner })
    }
}

fn apply_delta(profile: &mut TeamProfile, delta: f64, cap: f64, now: DateTime<Utc>) {
    let delta = if delta.is_nan() { 0.0 } else { delta };
    let next = (profile.current_cycle_points + delta).clamp(0.0, cap);
    let applied = next - profile.current_cycle_points;

    profile.current_cycle_points = next;
    profile.total_points = (profile.total_points + applied).max(0.0);
    profile.updated_at = now;
}

fn clamp_finite(value: f64, min: f64, max: f64) -> f64 {
    if value.is_nan() {
        return min;
    }
    value.clamp(min, max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::competition::gate::CycleState;

    fn team(id: u32) -> TeamIdentity {
        TeamIdentity {
            id: TeamId(id),
            abbreviation: format!("T{id}"),
        }
    }

    #[test]
    fn oversized_delta_clamps_to_cap() {
        let mut ledger = PointsLedger::default();
        let gate = CycleGate::default();
        let profile = ledger
            .add_points(&gate, TeamId(3), CandidateId(7), &team(3), 25.0, Utc::now())
            .expect("points accepted");

        assert_eq!(profile.current_cycle_points, 20.0);
        assert_eq!(profile.total_points, 20.0);
    }

    #[test]
    fn negative_delta_clamps_to_zero_and_never_drops_below_commitment() {
        let mut ledger = PointsLedger::default();
        let gate = CycleGate::default();
        let now = Utc::now();
        ledger.restore(TeamProfile {
            id: ProfileId(4),
            candidate_id: CandidateId(1),
            team: team(2),
            total_points: 40.0,
            current_cycle_points: 5.0,
            removed_from_board: false,
            scholarship_offered: false,
            scholarship_revoked: false,
            scouted: BTreeSet::new(),
            updated_at: now,
        });

        let profile = ledger
            .add_points(&gate, TeamId(2), CandidateId(1), &team(2), -100.0, now)
            .expect("points accepted");

        assert_eq!(profile.current_cycle_points, 0.0);
        assert_eq!(profile.total_points, 35.0);
        assert_eq!(profile.committed_points(), 35.0);
    }

    #[test]
    fn nan_delta_is_ignored_and_infinite_delta_clamps() {
        let mut ledger = PointsLedger::default();
        let gate = CycleGate::default();
        let now = Utc::now();

        let profile = ledger
            .add_points(&gate, TeamId(1), CandidateId(1), &team(1), f64::NAN, now)
            .expect("nan accepted");
        assert_eq!(profile.current_cycle_points, 0.0);

        let profile = ledger
            .add_points(&gate, TeamId(1), CandidateId(1), &team(1), f64::INFINITY, now)
            .expect("infinity accepted");
        assert_eq!(profile.current_cycle_points, 20.0);
    }

    #[test]
    fn writing_another_teams_row_is_denied() {
        let mut ledger = PointsLedger::default();
        let gate = CycleGate::default();

        let error = ledger
            .add_points(&gate, TeamId(1), CandidateId(1), &team(2), 5.0, Utc::now())
            .expect_err("foreign write rejected");

        assert_eq!(
            error,
            CompetitionError::PermissionDenied {
                session: TeamId(1),
                owner: TeamId(2)
            }
        );
        assert!(ledger.is_empty());
    }

    #[test]
    fn locked_cycle_rejects_points() {
        let mut ledger = PointsLedger::default();
        let mut gate = CycleGate::default();
        gate.apply(CycleState::Locked, 1, Utc::now());

        let error = ledger
            .add_points(&gate, TeamId(1), CandidateId(1), &team(1), 5.0, Utc::now())
            .expect_err("locked");
        assert_eq!(error, CompetitionError::CycleLocked);
    }

    #[test]
    fn set_cycle_points_replaces_allocation() {
        let mut ledger = PointsLedger::default();
        let gate = CycleGate::default();
        let now = Utc::now();
        let created = ledger
            .add_points(&gate, TeamId(1), CandidateId(9), &team(1), 12.0, now)
            .expect("created");

        let updated = ledger
            .set_cycle_points(&gate, TeamId(1), created.id, 4.0, now)
            .expect("updated");
        assert_eq!(updated.current_cycle_points, 4.0);
        assert_eq!(updated.total_points, 4.0);

        let missing = ledger.set_cycle_points(&gate, TeamId(1), ProfileId(99), 4.0, now);
        assert_eq!(missing, Err(CompetitionError::UnknownProfile(ProfileId(99))));
    }

    #[test]
    fn removed_rows_stay_but_reject_points() {
        let mut ledger = PointsLedger::default();
        let gate = CycleGate::default();
        let now = Utc::now();
        ledger
            .add_points(&gate, TeamId(1), CandidateId(2), &team(1), 6.0, now)
            .expect("created");

        assert!(ledger.remove_profile(CandidateId(2), TeamId(1), now));
        assert!(!ledger.remove_profile(CandidateId(2), TeamId(1), now));
        assert_eq!(ledger.len(), 1);

        let error = ledger
            .add_points(&gate, TeamId(1), CandidateId(2), &team(1), 1.0, now)
            .expect_err("removed row");
        assert!(matches!(error, CompetitionError::NotOnBoard { .. }));
    }

    #[test]
    fn restoring_a_reused_id_drops_the_old_pair() {
        let mut ledger = PointsLedger::default();
        let now = Utc::now();
        let row = |candidate: u32, team_id: u32, total: f64| TeamProfile {
            id: ProfileId(5),
            candidate_id: CandidateId(candidate),
            team: team(team_id),
            total_points: total,
            current_cycle_points: 0.0,
            removed_from_board: false,
            scholarship_offered: false,
            scholarship_revoked: false,
            scouted: BTreeSet::new(),
            updated_at: now,
        };

        ledger.restore(row(1, 1, 40.0));
        ledger.restore(row(2, 2, 90.0));

        assert!(ledger.profile_for(CandidateId(1), TeamId(1)).is_none());
        assert_eq!(ledger.profiles_for_candidate(CandidateId(1)).count(), 0);
        assert_eq!(
            ledger
                .profile_for(CandidateId(2), TeamId(2))
                .map(|profile| profile.total_points),
            Some(90.0)
        );
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn changes_since_reports_recent_rows() {
        let mut ledger = PointsLedger::default();
        let gate = CycleGate::default();
        let earlier = Utc::now();
        let later = earlier + chrono::Duration::seconds(30);

        ledger
            .add_points(&gate, TeamId(1), CandidateId(1), &team(1), 1.0, earlier)
            .expect("first");
        ledger
            .add_points(&gate, TeamId(2), CandidateId(1), &team(2), 1.0, later)
            .expect("second");

        let changed = ledger.changes_since(earlier);
        assert_eq!(changed.len(), 1);
        assert_eq!(changed[0].team.id, TeamId(2));
        assert_eq!(ledger.profiles_for_candidate(CandidateId(1)).count(), 2);
    }
}

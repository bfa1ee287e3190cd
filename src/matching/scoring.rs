use std::collections::HashMap;

use crate::roster::Participant;

// Weight constants for group scoring. The relative ordering is what matters:
// hard team-diversity violations dominate the buddy-group protection, which
// dominates size preferences and the soft recency penalty.

/// Violation for a group of two or more where everyone shares one team.
pub const SINGLE_TEAM_VIOLATION: i64 = 5000;
/// Violation per member beyond two from the same team.
pub const TEAM_OVERFLOW_VIOLATION: i64 = 2000;
/// Multiplier applied to a speculative violation score during force-insert.
pub const VIOLATION_WEIGHT: i64 = 3000;
/// Added to a buddy group already holding its pair, so the reconciler picks
/// it only when no other group fits at all.
pub const BUDDY_GROUP_PENALTY: i64 = 100_000;
/// Candidate bias against joining a group that already has their team.
pub const SAME_TEAM_BIAS: i64 = 100;
/// Multiplier per point of accumulated pair penalty from recent history.
pub const PAIR_PENALTY_WEIGHT: i64 = 10;
/// Bias toward smaller groups during force-insert.
pub const GROUP_SIZE_WEIGHT: i64 = 10;

/// How many of the most recent history records feed the penalty table.
pub const HISTORY_WINDOW: usize = 4;
/// Target and ceiling size for ordinary groups.
pub const DEFAULT_GROUP_SIZE: usize = 3;
/// A pre-seeded mentor/mentee group holds exactly the pair.
pub const BUDDY_GROUP_SIZE: usize = 2;

/// Team-diversity violation score for a prospective group. Zero means the
/// group is acceptable as built.
pub fn violation_score(members: &[Participant]) -> i64 {
    team_violation(members.iter().map(|member| member.team.as_str()))
}

/// Violation score for `members` with `candidate` speculatively added,
/// without mutating the group.
pub fn violation_score_with(members: &[Participant], candidate: &Participant) -> i64 {
    team_violation(
        members
            .iter()
            .map(|member| member.team.as_str())
            .chain(std::iter::once(candidate.team.as_str())),
    )
}

fn team_violation<'a>(teams: impl Iterator<Item = &'a str>) -> i64 {
    let mut counts: HashMap<&str, i64> = HashMap::new();
    let mut total = 0;
    for team in teams {
        *counts.entry(team).or_insert(0) += 1;
        total += 1;
    }
    let max_count = counts.values().copied().max().unwrap_or(0);

    let mut score = 0;
    if total >= 2 && counts.len() == 1 {
        score += SINGLE_TEAM_VIOLATION;
    }
    if max_count > 2 {
        score += TEAM_OVERFLOW_VIOLATION * (max_count - 2);
    }
    score
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::Participant;

    fn participant(id: u64, team: &str) -> Participant {
        Participant {
            id,
            name: format!("p{}", id),
            team: team.to_string(),
            is_participating: true,
            is_new_hire: false,
            buddy_id: None,
        }
    }

    #[test]
    fn empty_and_singleton_groups_are_clean() {
        assert_eq!(violation_score(&[]), 0);
        assert_eq!(violation_score(&[participant(1, "eng")]), 0);
    }

    #[test]
    fn uniform_pair_scores_single_team_violation() {
        let members = [participant(1, "eng"), participant(2, "eng")];
        assert_eq!(violation_score(&members), SINGLE_TEAM_VIOLATION);
    }

    #[test]
    fn three_from_one_team_adds_overflow() {
        let members = [
            participant(1, "eng"),
            participant(2, "eng"),
            participant(3, "eng"),
        ];
        assert_eq!(
            violation_score(&members),
            SINGLE_TEAM_VIOLATION + TEAM_OVERFLOW_VIOLATION
        );
    }

    #[test]
    fn mixed_group_is_clean() {
        let members = [
            participant(1, "eng"),
            participant(2, "design"),
            participant(3, "sales"),
        ];
        assert_eq!(violation_score(&members), 0);
    }

    #[test]
    fn speculative_add_matches_real_add() {
        let members = [participant(1, "eng"), participant(2, "design")];
        let candidate = participant(3, "eng");
        let mut grown = members.to_vec();
        grown.push(candidate.clone());
        assert_eq!(
            violation_score_with(&members, &candidate),
            violation_score(&grown)
        );
    }
}

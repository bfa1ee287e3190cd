use crate::roster::Participant;
use super::penalty::PenaltyTable;
use super::scoring::{
    violation_score_with, BUDDY_GROUP_PENALTY, BUDDY_GROUP_SIZE, DEFAULT_GROUP_SIZE,
    GROUP_SIZE_WEIGHT, PAIR_PENALTY_WEIGHT, VIOLATION_WEIGHT,
};
use super::types::{Draft, Group};

/// Force-inserts one unplaced participant into the existing group where they
/// do the least damage, or opens a new group when nothing can take them.
/// Greedy and one-shot: earlier insertions are never revisited.
pub fn force_insert(participant: Participant, draft: &mut Draft, penalties: &PenaltyTable) {
    if draft.is_empty() {
        draft.push(Group::with_members(vec![participant], DEFAULT_GROUP_SIZE));
        return;
    }

    let mut best: Option<(usize, i64)> = None;
    for (index, group) in draft.iter().enumerate() {
        let buddy_group = group.is_buddy_group();
        // A buddy group stays reachable up to the default size so it can
        // absorb someone when literally nothing else fits; the additive
        // penalty below keeps it a pure last resort.
        let ceiling = if buddy_group {
            group.limit.max(DEFAULT_GROUP_SIZE)
        } else {
            group.limit
        };
        if group.members.len() >= ceiling {
            continue;
        }

        let mut size_penalty = group.members.len() as i64 * GROUP_SIZE_WEIGHT;
        if buddy_group && group.members.len() >= BUDDY_GROUP_SIZE {
            size_penalty += BUDDY_GROUP_PENALTY;
        }
        let violation = violation_score_with(&group.members, &participant);
        let recency: i64 = group
            .members
            .iter()
            .map(|member| penalties.penalty(participant.id, member.id) as i64 * PAIR_PENALTY_WEIGHT)
            .sum();

        let total = violation * VIOLATION_WEIGHT + recency + size_penalty;
        if best.map_or(true, |(_, score)| total < score) {
            best = Some((index, total));
        }
    }

    match best {
        Some((index, _)) => {
            let group = &mut draft[index];
            group.members.push(participant);
            // A forced third member overrides the buddy-pair cap.
            if group.members.len() > group.limit {
                group.limit = group.members.len();
            }
        }
        None => draft.push(Group::with_members(vec![participant], DEFAULT_GROUP_SIZE)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::scoring::violation_score;

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

    fn pair(mentee: u64, mentor: u64, team: &str) -> Group {
        let mut first = participant(mentee, team);
        first.buddy_id = Some(mentor);
        first.is_new_hire = true;
        Group::with_members(vec![first, participant(mentor, team)], BUDDY_GROUP_SIZE)
    }

    #[test]
    fn empty_draft_opens_a_fresh_group() {
        let mut draft = Draft::new();
        force_insert(participant(1, "eng"), &mut draft, &PenaltyTable::default());
        assert_eq!(draft.len(), 1);
        assert_eq!(draft[0].limit, DEFAULT_GROUP_SIZE);
        assert_eq!(draft[0].members.len(), 1);
    }

    #[test]
    fn picks_the_group_with_the_lowest_damage() {
        let mut draft = vec![
            Group::with_members(vec![participant(1, "eng")], 3),
            Group::with_members(vec![participant(2, "design")], 3),
        ];
        force_insert(participant(3, "eng"), &mut draft, &PenaltyTable::default());
        assert_eq!(draft[1].members.len(), 2);
        assert!(draft.iter().all(|g| violation_score(&g.members) == 0));
    }

    #[test]
    fn full_groups_open_a_new_one() {
        let members: Vec<Participant> = vec![
            participant(1, "eng"),
            participant(2, "design"),
            participant(3, "sales"),
        ];
        let mut draft = vec![Group::with_members(members, 3)];
        force_insert(participant(4, "data"), &mut draft, &PenaltyTable::default());
        assert_eq!(draft.len(), 2);
        assert!(draft.iter().all(|g| g.members.len() <= g.limit));
    }

    #[test]
    fn buddy_group_is_a_last_resort() {
        let mut draft = vec![
            pair(1, 2, "eng"),
            Group::with_members(vec![participant(3, "eng"), participant(4, "design")], 3),
        ];
        force_insert(participant(5, "eng"), &mut draft, &PenaltyTable::default());
        assert_eq!(draft[0].members.len(), 2);
        assert_eq!(draft[1].members.len(), 3);
    }

    #[test]
    fn full_buddy_group_absorbs_only_when_nothing_else_fits() {
        let mut draft = vec![pair(1, 2, "eng")];
        force_insert(participant(3, "design"), &mut draft, &PenaltyTable::default());
        // No other group existed, so the pair takes a third member and its
        // limit is raised to keep the capacity invariant.
        assert_eq!(draft.len(), 1);
        assert_eq!(draft[0].members.len(), 3);
        assert_eq!(draft[0].limit, 3);
    }
}

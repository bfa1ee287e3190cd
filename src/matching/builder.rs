use crate::roster::Participant;
use super::penalty::PenaltyTable;
use super::scoring::{
    violation_score, DEFAULT_GROUP_SIZE, PAIR_PENALTY_WEIGHT, SAME_TEAM_BIAS,
};
use super::types::{Draft, Group};

/// Picks a diversity-optimized group of up to `size` members from the pool.
/// The first pool member seeds the group (the pool arrives pre-shuffled, so
/// this is effectively random); each further pick takes the candidate with
/// the lowest score against the partial group, ties broken by pool order.
pub fn build_diverse_group(
    size: usize,
    pool: &mut Vec<Participant>,
    penalties: &PenaltyTable,
) -> Vec<Participant> {
    let mut members = vec![pool.remove(0)];
    while members.len() < size && !pool.is_empty() {
        let mut best_index = 0;
        let mut best_score = i64::MAX;
        for (index, candidate) in pool.iter().enumerate() {
            let mut score = 0;
            if members.iter().any(|member| member.team == candidate.team) {
                score += SAME_TEAM_BIAS;
            }
            for member in &members {
                score += penalties.penalty(candidate.id, member.id) as i64 * PAIR_PENALTY_WEIGHT;
            }
            if score < best_score {
                best_score = score;
                best_index = index;
            }
        }
        members.push(pool.remove(best_index));
    }
    members
}

/// Repeatedly extracts groups of up to `target_size` until the pool is
/// empty. A freshly built group with a non-zero violation score is not
/// committed; its members land in the returned leftover list, as does any
/// remainder too small to form a group. Four remaining members at target
/// size three split into two pairs rather than stranding someone.
pub fn extract_groups(
    pool: &mut Vec<Participant>,
    target_size: usize,
    penalties: &PenaltyTable,
    draft: &mut Draft,
) -> Vec<Participant> {
    let mut leftovers = Vec::new();
    let target = target_size.min(DEFAULT_GROUP_SIZE);

    while !pool.is_empty() {
        if target == 2 {
            if pool.len() >= 2 {
                let members = build_diverse_group(2, pool, penalties);
                commit(members, 2, draft, &mut leftovers);
            } else if let Some(last) = pool.pop() {
                leftovers.push(last);
            }
        } else if pool.len() == 4 {
            let first = build_diverse_group(2, pool, penalties);
            let second = build_diverse_group(2, pool, penalties);
            commit(first, DEFAULT_GROUP_SIZE, draft, &mut leftovers);
            commit(second, DEFAULT_GROUP_SIZE, draft, &mut leftovers);
        } else if pool.len() >= 3 {
            let members = build_diverse_group(DEFAULT_GROUP_SIZE, pool, penalties);
            commit(members, DEFAULT_GROUP_SIZE, draft, &mut leftovers);
        } else if pool.len() == 2 {
            let members = build_diverse_group(2, pool, penalties);
            commit(members, DEFAULT_GROUP_SIZE, draft, &mut leftovers);
        } else if let Some(last) = pool.pop() {
            leftovers.push(last);
        }
    }
    leftovers
}

fn commit(
    members: Vec<Participant>,
    limit: usize,
    draft: &mut Draft,
    leftovers: &mut Vec<Participant>,
) {
    if violation_score(&members) == 0 {
        draft.push(Group::with_members(members, limit));
    } else {
        leftovers.extend(members);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::types::HistoryRecord;

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
    fn selection_prefers_an_unrepresented_team() {
        let mut pool = vec![
            participant(1, "eng"),
            participant(2, "eng"),
            participant(3, "design"),
        ];
        let group = build_diverse_group(2, &mut pool, &PenaltyTable::default());
        assert_eq!(group[0].id, 1);
        assert_eq!(group[1].id, 3);
    }

    #[test]
    fn selection_ties_break_by_pool_order() {
        let mut pool = vec![
            participant(1, "eng"),
            participant(2, "design"),
            participant(3, "sales"),
        ];
        let group = build_diverse_group(2, &mut pool, &PenaltyTable::default());
        assert_eq!(group[1].id, 2);
    }

    #[test]
    fn recency_penalty_steers_selection_away() {
        let history = [HistoryRecord {
            date: "w1".to_string(),
            groups: vec![vec![participant(1, "eng"), participant(2, "design")]],
            timestamp: 0,
        }];
        let penalties = PenaltyTable::from_history(&history);
        let mut pool = vec![
            participant(1, "eng"),
            participant(2, "design"),
            participant(3, "sales"),
        ];
        let group = build_diverse_group(2, &mut pool, &penalties);
        assert_eq!(group[1].id, 3);
    }

    #[test]
    fn four_remaining_split_into_two_pairs() {
        let mut pool = vec![
            participant(1, "eng"),
            participant(2, "design"),
            participant(3, "sales"),
            participant(4, "data"),
        ];
        let mut draft = Draft::new();
        let leftovers = extract_groups(&mut pool, 3, &PenaltyTable::default(), &mut draft);
        assert!(leftovers.is_empty());
        assert_eq!(draft.len(), 2);
        assert!(draft.iter().all(|g| g.members.len() == 2 && g.limit == 3));
    }

    #[test]
    fn uniform_team_pool_commits_nothing() {
        let mut pool = (1..=4).map(|id| participant(id, "eng")).collect::<Vec<_>>();
        let mut draft = Draft::new();
        let leftovers = extract_groups(&mut pool, 3, &PenaltyTable::default(), &mut draft);
        assert!(draft.is_empty());
        assert_eq!(leftovers.len(), 4);
    }

    #[test]
    fn pair_target_commits_with_limit_two() {
        let mut pool = vec![participant(1, "eng"), participant(2, "design")];
        let mut draft = Draft::new();
        let leftovers = extract_groups(&mut pool, 2, &PenaltyTable::default(), &mut draft);
        assert!(leftovers.is_empty());
        assert_eq!(draft.len(), 1);
        assert_eq!(draft[0].limit, 2);
    }

    #[test]
    fn singleton_remainder_becomes_leftover() {
        let mut pool = vec![participant(1, "eng")];
        let mut draft = Draft::new();
        let leftovers = extract_groups(&mut pool, 3, &PenaltyTable::default(), &mut draft);
        assert!(draft.is_empty());
        assert_eq!(leftovers.len(), 1);
    }
}

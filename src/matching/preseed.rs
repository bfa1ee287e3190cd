use crate::roster::{Participant, ParticipantId};
use super::scoring::BUDDY_GROUP_SIZE;
use super::types::{Draft, Group};

/// Removes every mentor/mentee pair whose halves are both still in the pool
/// and seeds each as its own reserved 2-person group, mentee first. Pairs are
/// consumed in pool order (the pool arrives pre-shuffled). A participant
/// whose buddy is absent, already claimed, or a self-reference stays in the
/// general pool.
pub fn preseed_buddy_pairs(pool: &mut Vec<Participant>, draft: &mut Draft) {
    let references: Vec<(ParticipantId, ParticipantId)> = pool
        .iter()
        .filter_map(|p| p.buddy_id.map(|buddy| (p.id, buddy)))
        .collect();

    for (holder, buddy) in references {
        if holder == buddy {
            continue;
        }
        let holder_index = match pool.iter().position(|p| p.id == holder) {
            Some(index) => index,
            None => continue, // claimed by an earlier pairing
        };
        let buddy_index = match pool.iter().position(|p| p.id == buddy) {
            Some(index) => index,
            None => continue, // dangling or inactive reference
        };

        // Remove the higher index first so the lower one stays valid.
        let (high, low) = if holder_index > buddy_index {
            (holder_index, buddy_index)
        } else {
            (buddy_index, holder_index)
        };
        let second = pool.remove(high);
        let first = pool.remove(low);
        let (mentee, mentor) = if first.id == holder {
            (first, second)
        } else {
            (second, first)
        };
        draft.push(Group::with_members(vec![mentee, mentor], BUDDY_GROUP_SIZE));
    }
}

use crate::roster::ParticipantId;
use super::scoring::BUDDY_GROUP_SIZE;
use super::types::Draft;

/// Moves one participant between two groups of an existing draft. The move
/// is rejected with a user-facing message when the destination is a buddy
/// group already holding its pair; the draft is untouched on any rejection.
/// A source group left empty is removed from the draft.
pub fn move_participant(
    draft: &mut Draft,
    participant: ParticipantId,
    from: usize,
    to: usize,
) -> Result<(), String> {
    if from >= draft.len() || to >= draft.len() {
        return Err("No such group in the current draft".to_string());
    }
    if from == to {
        return Ok(());
    }

    let destination = &draft[to];
    if destination.is_buddy_group() && destination.members.len() >= BUDDY_GROUP_SIZE {
        return Err("A buddy group holds only the new hire and their buddy".to_string());
    }

    let position = match draft[from].members.iter().position(|m| m.id == participant) {
        Some(position) => position,
        None => return Err("Participant is not in the source group".to_string()),
    };
    let moved = draft[from].members.remove(position);
    draft[to].members.push(moved);
    if draft[from].members.is_empty() {
        draft.remove(from);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::types::Group;
    use crate::roster::Participant;

    fn participant(id: u64, buddy_id: Option<u64>) -> Participant {
        Participant {
            id,
            name: format!("p{}", id),
            team: "eng".to_string(),
            is_participating: true,
            is_new_hire: false,
            buddy_id,
        }
    }

    fn draft_with_pair() -> Draft {
        vec![
            Group::with_members(vec![participant(1, Some(2)), participant(2, None)], 2),
            Group::with_members(vec![participant(3, None), participant(4, None)], 3),
        ]
    }

    #[test]
    fn moves_between_ordinary_groups() {
        let mut draft = vec![
            Group::with_members(vec![participant(1, None), participant(2, None)], 3),
            Group::with_members(vec![participant(3, None)], 3),
        ];
        assert!(move_participant(&mut draft, 2, 0, 1).is_ok());
        assert_eq!(draft[0].members.len(), 1);
        assert_eq!(draft[1].members.len(), 2);
        assert!(draft[1].contains(2));
    }

    #[test]
    fn emptied_source_group_is_removed() {
        let mut draft = vec![
            Group::with_members(vec![participant(1, None)], 3),
            Group::with_members(vec![participant(2, None)], 3),
        ];
        assert!(move_participant(&mut draft, 1, 0, 1).is_ok());
        assert_eq!(draft.len(), 1);
        assert_eq!(draft[0].members.len(), 2);
    }

    #[test]
    fn full_buddy_group_rejects_incoming_moves() {
        let mut draft = draft_with_pair();
        let result = move_participant(&mut draft, 3, 1, 0);
        assert!(result.is_err());
        assert_eq!(draft[0].members.len(), 2);
        assert_eq!(draft[1].members.len(), 2);
    }

    #[test]
    fn moving_out_of_a_buddy_group_is_allowed() {
        let mut draft = draft_with_pair();
        assert!(move_participant(&mut draft, 2, 0, 1).is_ok());
        assert_eq!(draft[0].members.len(), 1);
        assert!(draft[1].contains(2));
    }

    #[test]
    fn unknown_group_or_member_is_rejected() {
        let mut draft = draft_with_pair();
        assert!(move_participant(&mut draft, 1, 0, 9).is_err());
        assert!(move_participant(&mut draft, 9, 0, 1).is_err());
    }
}

use serde::{Serialize, Deserialize};

use crate::roster::{Participant, ParticipantId};

/// A dining group: an ordered member list plus the maximum size it was
/// allowed to grow to when it was formed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    pub members: Vec<Participant>,
    pub limit: usize,
}

impl Group {
    pub fn new(limit: usize) -> Self {
        Group { members: Vec::new(), limit }
    }

    pub fn with_members(members: Vec<Participant>, limit: usize) -> Self {
        Group { members, limit }
    }

    /// A buddy group contains both halves of a mentor/mentee pair.
    pub fn is_buddy_group(&self) -> bool {
        self.members.iter().any(|member| {
            member
                .buddy_id
                .map_or(false, |buddy| self.members.iter().any(|other| other.id == buddy))
        })
    }

    pub fn contains(&self, id: ParticipantId) -> bool {
        self.members.iter().any(|member| member.id == id)
    }
}

/// The ordered grouping result of one matching run.
pub type Draft = Vec<Group>;

/// A finalized, published draft used to discourage repeat pairings.
/// History is kept most-recent-first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub date: String,
    pub groups: Vec<Vec<Participant>>,
    pub timestamp: i64,
}

/// One affinity pool of a rule configuration: the team labels it claims.
pub type RuleBucket = Vec<String>;

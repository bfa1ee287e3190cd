use std::collections::HashMap;

use crate::roster::ParticipantId;
use super::scoring::HISTORY_WINDOW;
use super::types::HistoryRecord;

/// Symmetric pair-penalty table, built fresh for each matching run from the
/// most recent published records. Never persisted.
#[derive(Debug, Default)]
pub struct PenaltyTable {
    weights: HashMap<(ParticipantId, ParticipantId), u32>,
}

impl PenaltyTable {
    /// Builds the table from history, most-recent-first. A record at rank `k`
    /// contributes `HISTORY_WINDOW - k` for every pair that shared a group in
    /// it; records beyond the window are ignored and repeat co-occurrences
    /// accumulate.
    pub fn from_history(history: &[HistoryRecord]) -> Self {
        let mut table = PenaltyTable::default();
        for (rank, record) in history.iter().take(HISTORY_WINDOW).enumerate() {
            let weight = (HISTORY_WINDOW - rank) as u32;
            for group in &record.groups {
                for i in 0..group.len() {
                    for j in (i + 1)..group.len() {
                        table.add(group[i].id, group[j].id, weight);
                    }
                }
            }
        }
        table
    }

    /// Accumulated penalty for an unordered pair; zero when they have not
    /// been grouped recently.
    pub fn penalty(&self, a: ParticipantId, b: ParticipantId) -> u32 {
        self.weights.get(&Self::key(a, b)).copied().unwrap_or(0)
    }

    fn add(&mut self, a: ParticipantId, b: ParticipantId, weight: u32) {
        *self.weights.entry(Self::key(a, b)).or_insert(0) += weight;
    }

    fn key(a: ParticipantId, b: ParticipantId) -> (ParticipantId, ParticipantId) {
        if a <= b { (a, b) } else { (b, a) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::Participant;

    fn participant(id: u64) -> Participant {
        Participant {
            id,
            name: format!("p{}", id),
            team: "eng".to_string(),
            is_participating: true,
            is_new_hire: false,
            buddy_id: None,
        }
    }

    fn record(groups: Vec<Vec<u64>>) -> HistoryRecord {
        HistoryRecord {
            date: "2026-01-01".to_string(),
            groups: groups
                .into_iter()
                .map(|ids| ids.into_iter().map(participant).collect())
                .collect(),
            timestamp: 0,
        }
    }

    #[test]
    fn empty_history_yields_no_penalties() {
        let table = PenaltyTable::from_history(&[]);
        assert_eq!(table.penalty(1, 2), 0);
    }

    #[test]
    fn most_recent_record_weighs_heaviest() {
        let history = vec![
            record(vec![vec![1, 2]]),
            record(vec![vec![3, 4]]),
        ];
        let table = PenaltyTable::from_history(&history);
        assert_eq!(table.penalty(1, 2), 4);
        assert_eq!(table.penalty(3, 4), 3);
    }

    #[test]
    fn penalty_is_symmetric() {
        let table = PenaltyTable::from_history(&[record(vec![vec![1, 2, 3]])]);
        assert_eq!(table.penalty(1, 3), table.penalty(3, 1));
        assert_eq!(table.penalty(2, 3), 4);
    }

    #[test]
    fn records_beyond_window_are_ignored() {
        let history = vec![
            record(vec![vec![10, 11]]),
            record(vec![vec![10, 11]]),
            record(vec![vec![10, 11]]),
            record(vec![vec![10, 11]]),
            record(vec![vec![1, 2]]),
        ];
        let table = PenaltyTable::from_history(&history);
        assert_eq!(table.penalty(1, 2), 0);
        assert_eq!(table.penalty(10, 11), 4 + 3 + 2 + 1);
    }

    #[test]
    fn extra_cooccurrence_strictly_increases_penalty() {
        let base = vec![record(vec![vec![1, 2]]), record(vec![vec![3, 4]])];
        let mut extended = base.clone();
        extended[1] = record(vec![vec![3, 4], vec![1, 2]]);

        let before = PenaltyTable::from_history(&base).penalty(1, 2);
        let after = PenaltyTable::from_history(&extended).penalty(1, 2);
        assert!(after > before);
    }
}

use rand::seq::SliceRandom;
use rand::Rng;

use crate::roster::Participant;
use super::builder::extract_groups;
use super::penalty::PenaltyTable;
use super::preseed::preseed_buddy_pairs;
use super::reconcile::force_insert;
use super::scoring::DEFAULT_GROUP_SIZE;
use super::types::{Draft, HistoryRecord, RuleBucket};

/// Runs one full matching round over snapshots of the roster, history and
/// rule configuration. The caller's structures are only read; the returned
/// draft is freshly allocated. Randomness enters through the initial shuffle
/// alone; everything after is deterministic given the shuffled order.
///
/// An empty rule list means default mode: the whole active pool is processed
/// once at the default group size with no bucketing.
pub fn generate_draft(
    roster: &[Participant],
    history: &[HistoryRecord],
    rules: &[RuleBucket],
    rng: &mut impl Rng,
) -> Draft {
    let mut pool: Vec<Participant> = roster
        .iter()
        .filter(|p| p.is_participating)
        .cloned()
        .collect();
    pool.shuffle(rng);

    let mut draft = Draft::new();
    preseed_buddy_pairs(&mut pool, &mut draft);

    let penalties = PenaltyTable::from_history(history);

    let leftovers = if rules.is_empty() {
        extract_groups(&mut pool, DEFAULT_GROUP_SIZE, &penalties, &mut draft)
    } else {
        let mut rejects = Vec::new();
        for bucket in rules {
            let (mut claimed, rest): (Vec<Participant>, Vec<Participant>) =
                std::mem::take(&mut pool)
                    .into_iter()
                    .partition(|p| bucket.contains(&p.team));
            pool = rest;
            rejects.extend(extract_groups(&mut claimed, bucket.len(), &penalties, &mut draft));
        }
        // Bucket rejects rejoin the unmatched remainder and re-run at the
        // default size with no bucket restriction.
        pool.extend(rejects);
        extract_groups(&mut pool, DEFAULT_GROUP_SIZE, &penalties, &mut draft)
    };

    for participant in leftovers {
        force_insert(participant, &mut draft, &penalties);
    }
    draft
}

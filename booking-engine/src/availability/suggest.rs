//! Table Suggester
//!
//! Best-fit assignment search over a pre-filtered candidate set (blocked and
//! already-committed tables must be excluded by the caller). Single tables
//! are always preferred; join-group combinations are a fallback, bounded to
//! keep the search tractable. Ties are broken by table identity so repeated
//! runs over the same inventory stay deterministic.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::db::models::DiningTable;

/// Upper bound on tables in one join combination
pub const MAX_JOIN_TABLES: usize = 3;

/// A proposed assignment for a party
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Suggestion {
    Single(i64),
    Joined(Vec<i64>),
}

impl Suggestion {
    pub fn table_ids(&self) -> Vec<i64> {
        match self {
            Suggestion::Single(id) => vec![*id],
            Suggestion::Joined(ids) => ids.clone(),
        }
    }
}

/// Find the best-fit single table or join combination for `party_size`
///
/// Returns `None` when no assignment is available.
pub fn suggest_assignment(candidates: &[&DiningTable], party_size: u32) -> Option<Suggestion> {
    if party_size == 0 {
        return None;
    }

    let mut sorted: Vec<&DiningTable> = candidates.to_vec();
    sorted.sort_by_key(|t| t.id);

    // 1. Single tables whose range contains the party: smallest effective
    //    capacity first (least wasted seats), lowest id on ties.
    if let Some(best) = sorted
        .iter()
        .filter(|t| t.seats(party_size))
        .min_by_key(|t| (t.effective_covers(), t.id))
    {
        return Some(Suggestion::Single(best.id));
    }

    // 2. Combinations within one join group. The per-table minimum does not
    //    apply to the combined total.
    let mut groups: BTreeMap<&str, Vec<&DiningTable>> = BTreeMap::new();
    for table in &sorted {
        if let Some(group) = table.join_group.as_deref() {
            groups.entry(group).or_default().push(table);
        }
    }

    let mut best: Option<(i64, usize, Vec<i64>)> = None;
    for members in groups.values() {
        for size in 2..=MAX_JOIN_TABLES.min(members.len()) {
            for combo in combinations(members, size) {
                let total: i64 = combo.iter().map(|t| t.effective_covers()).sum();
                if total < party_size as i64 {
                    continue;
                }
                let surplus = total - party_size as i64;
                let ids: Vec<i64> = combo.iter().map(|t| t.id).collect();
                let candidate = (surplus, combo.len(), ids);
                let better = match &best {
                    None => true,
                    Some(current) => {
                        (candidate.0, candidate.1, &candidate.2)
                            < (current.0, current.1, &current.2)
                    }
                };
                if better {
                    best = Some(candidate);
                }
            }
        }
    }

    best.map(|(_, _, ids)| Suggestion::Joined(ids))
}

/// All size-`k` combinations of `items`, in input order
fn combinations<'a>(items: &[&'a DiningTable], k: usize) -> Vec<Vec<&'a DiningTable>> {
    let mut out = Vec::new();
    let mut indices: Vec<usize> = (0..k).collect();
    if k == 0 || k > items.len() {
        return out;
    }
    loop {
        out.push(indices.iter().map(|&i| items[i]).collect());
        // Advance to the next lexicographic index combination
        let mut i = k;
        loop {
            if i == 0 {
                return out;
            }
            i -= 1;
            if indices[i] != i + items.len() - k {
                break;
            }
        }
        indices[i] += 1;
        for j in (i + 1)..k {
            indices[j] = indices[j - 1] + 1;
        }
    }
}

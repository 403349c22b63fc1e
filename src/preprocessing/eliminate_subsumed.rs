use log::debug;

use crate::basic_types::Literal;
use crate::containers::KeyedVec;
use crate::containers::StampSet;

/// Remove every clause that is subsumed by another clause of the list, in
/// place. Clauses must be sorted sequences of distinct literals over
/// variables `0..num_variables`. Empty clauses in the input act as deletion
/// tombstones and are removed as well. The order of the surviving clauses
/// is preserved.
///
/// Each clause initially watches its first literal only. When a probe
/// clause stamps its literals and walks the watch lists of each of them, a
/// watched candidate either subsumes the probe (no literal of the candidate
/// is missing from the stamp set) or it is rewatched under a literal the
/// probe does not contain. The rotation guarantees that a candidate meets
/// every later clause it could subsume: at least one of its literals is in
/// that clause, and the watch lands there eventually. Worst-case quadratic,
/// near-linear on typical clause lists.
pub fn eliminate_subsumed(clauses: &mut Vec<Vec<Literal>>, num_variables: u32) {
    let num_clauses_before = clauses.len();
    SubsumptionChecker::new(clauses, num_variables).remove_subsumed();
    debug!(
        "subsumption elimination removed {} of {} clauses",
        num_clauses_before - clauses.len(),
        num_clauses_before
    );
}

struct SubsumptionChecker<'a> {
    clauses: &'a mut Vec<Vec<Literal>>,
    in_clause: StampSet<Literal>,
    watching_clauses: KeyedVec<Literal, Vec<usize>>,
}

impl<'a> SubsumptionChecker<'a> {
    fn new(clauses: &'a mut Vec<Vec<Literal>>, num_variables: u32) -> SubsumptionChecker<'a> {
        let num_literals = 2 * num_variables as usize;
        let mut watching_clauses: KeyedVec<Literal, Vec<usize>> = KeyedVec::default();
        watching_clauses.resize(num_literals, Vec::new());
        for (index, clause) in clauses.iter().enumerate() {
            if let Some(&first) = clause.first() {
                watching_clauses[first].push(index);
            }
        }
        SubsumptionChecker {
            clauses,
            in_clause: StampSet::new(num_literals),
            watching_clauses,
        }
    }

    fn remove_subsumed(mut self) {
        for index in 0..self.clauses.len() {
            self.empty_if_subsumed(index);
        }
        self.clauses.retain(|clause| !clause.is_empty());
    }

    fn empty_if_subsumed(&mut self, index: usize) {
        self.in_clause
            .set_from_iter(self.clauses[index].iter().copied());
        for literal_position in 0..self.clauses[index].len() {
            let literal = self.clauses[index][literal_position];
            if self.walk_watch_list(index, literal) {
                self.clauses[index].clear();
                return;
            }
        }
    }

    /// Walk the watchers of one literal of the probe clause. Returns true
    /// iff some watched clause subsumes the probe.
    fn walk_watch_list(&mut self, index: usize, literal: Literal) -> bool {
        let mut subsumed = false;
        let mut current = 0;
        let mut retained = 0;
        while current < self.watching_clauses[literal].len() {
            let candidate = self.watching_clauses[literal][current];
            // a clause cannot subsume itself; it stays in the watch list
            if candidate == index {
                self.watching_clauses[literal][retained] = candidate;
                retained += 1;
                current += 1;
                continue;
            }
            // tombstones are dropped from the watch list without replacement
            if self.clauses[candidate].is_empty() {
                current += 1;
                continue;
            }
            let missing_literal = self.clauses[candidate]
                .iter()
                .copied()
                .find(|&candidate_literal| !self.in_clause.contains(candidate_literal));
            match missing_literal {
                None => {
                    // every literal of the candidate is in the probe: the
                    // candidate subsumes it; keep the rest of the list intact
                    subsumed = true;
                    while current < self.watching_clauses[literal].len() {
                        self.watching_clauses[literal][retained] =
                            self.watching_clauses[literal][current];
                        retained += 1;
                        current += 1;
                    }
                    break;
                }
                Some(new_watch) => {
                    // not (yet) a subsumer; rewatch it under a literal the
                    // probe does not contain
                    self.watching_clauses[new_watch].push(candidate);
                    current += 1;
                }
            }
        }
        self.watching_clauses[literal].truncate(retained);
        subsumed
    }
}

mod conflict_analysis;
mod variable_state;

use log::debug;

use crate::basic_types::ClauseRef;
use crate::basic_types::Literal;
use crate::basic_types::Reason;
use crate::basic_types::Variable;
use crate::calabash_asserts::calabash_assert_extreme;
use crate::containers::KeyedVec;
use crate::engine::ClauseArena;
use crate::model_builder::ModelBuilder;

use variable_state::LevelInfo;
use variable_state::VariableState;

/// A watch-list entry: the referenced clause watches the literal whose list
/// this entry sits in. The blocker is another literal of the clause; if it
/// is already true the clause is satisfied and the clause body is never
/// touched.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct ClauseWatcher {
    blocker: Literal,
    clause_reference: ClauseRef,
}

/// A propagator for a propositional formula in CNF.
///
/// The propagator owns the clause database, a backtrackable trail of
/// assignments with one [`Reason`] per entry, a decision-level stack, and
/// two-watched-literal watch lists. Callers drive it with
/// [`push_level`](Propagator::push_level) /
/// [`resolve_conflicts`](Propagator::resolve_conflicts) /
/// [`pop_level`](Propagator::pop_level); all logical consequences of an
/// assertion are derived eagerly by unit propagation.
///
/// There is no branching heuristic, no restart policy and no clause-database
/// reduction: the propagator is the engine inside a search procedure, not a
/// self-driving solver.
///
/// Cloning a propagator yields a fully independent snapshot, which callers
/// can use to branch speculative searches.
#[derive(Clone, Debug)]
pub struct Propagator {
    // -------- formula --------
    unary_clauses: Vec<Literal>,
    binary_partners: KeyedVec<Literal, Vec<Literal>>,
    long_clauses: ClauseArena,
    num_variables: u32,

    // -------- per-variable / per-literal state --------
    variable_states: KeyedVec<Variable, VariableState>,
    watch_lists: KeyedVec<Literal, Vec<ClauseWatcher>>,

    // -------- trail --------
    trail: Vec<Literal>,
    trail_reasons: Vec<Reason>,
    levels: Vec<LevelInfo>,
    /// Trail entries before this index have been fully propagated.
    trail_queue_head: usize,

    // -------- conflict state --------
    conflicting: bool,
    conflict_reason: Reason,
    /// The falsified literal the conflicting clause would have propagated;
    /// absent for conflicts discovered while asserting root facts during
    /// construction.
    conflict_literal: Option<Literal>,
    stamp_counter: u32,

    // -------- scratch buffers --------
    learn_buffer: Vec<Literal>,
    supporting_decisions: Vec<(usize, Literal)>,
}

impl Propagator {
    /// Create a propagator for the formula accumulated in the given model.
    ///
    /// The model's clause buckets are copied, root facts are asserted, watch
    /// lists are installed, and propagation is run to quiescence. If the
    /// formula is already contradictory at the root, the propagator starts
    /// out conflicting and [`resolve_conflicts`](Propagator::resolve_conflicts)
    /// will immediately report unsatisfiability.
    pub fn new(model: &ModelBuilder) -> Propagator {
        let num_variables = model.num_variables();
        let mut propagator = Propagator {
            unary_clauses: model.unary_clauses().to_vec(),
            binary_partners: model.binary_partner_lists().clone(),
            long_clauses: ClauseArena::default(),
            num_variables,
            variable_states: KeyedVec::default(),
            watch_lists: KeyedVec::default(),
            trail: Vec::new(),
            trail_reasons: Vec::new(),
            levels: vec![LevelInfo::new(0)],
            trail_queue_head: 0,
            conflicting: false,
            conflict_reason: Reason::Decision,
            conflict_literal: None,
            stamp_counter: 0,
            learn_buffer: Vec::new(),
            supporting_decisions: Vec::new(),
        };
        propagator
            .variable_states
            .resize(num_variables as usize, VariableState::default());
        propagator.normalise_binary_partner_lists();
        propagator.import_long_clauses(model.long_clauses());
        propagator.initialise_watches();
        if !propagator.conflicting {
            let _ = propagator.propagate();
        }
        debug!(
            "constructed propagator over {} variables ({} root facts{})",
            num_variables,
            propagator.trail.len(),
            if propagator.conflicting {
                ", conflicting"
            } else {
                ""
            }
        );
        propagator
    }

    fn normalise_binary_partner_lists(&mut self) {
        for list in self.binary_partners.iter_mut() {
            list.sort_unstable();
            list.dedup();
        }
        self.binary_partners
            .resize(2 * self.num_variables as usize, Vec::new());
    }

    fn import_long_clauses(&mut self, clauses: &[Vec<Literal>]) {
        let total_slots: usize = clauses.iter().map(|clause| clause.len() + 1).sum();
        self.long_clauses.reserve_with_headroom(total_slots);
        for clause in clauses {
            let _ = self.long_clauses.push_clause(clause);
        }
    }

    /// Assign the given literal true at level 0 as a root fact. Returns
    /// false and records a conflict if the literal is already false.
    fn assign_at_root(&mut self, forced_true: Literal) -> bool {
        let state = &mut self.variable_states[forced_true.variable()];
        if state.is_open() {
            state.assign(self.trail.len(), forced_true, 0);
            self.trail.push(forced_true);
            self.trail_reasons.push(Reason::Unary(forced_true));
        } else if state.is_false(forced_true) {
            self.conflicting = true;
            return false;
        }
        true
    }

    fn initialise_watches(&mut self) {
        self.initialise_unary_clauses();
        if self.conflicting {
            return;
        }
        self.watch_lists
            .resize(2 * self.num_variables as usize, Vec::new());
        let mut reference = self.long_clauses.first_clause();
        let end = self.long_clauses.end_reference();
        while reference < end {
            self.install_long_clause(reference);
            if self.conflicting {
                return;
            }
            reference = self.long_clauses.next_clause(reference);
        }
        self.initialise_binary_clauses();
    }

    fn initialise_unary_clauses(&mut self) {
        for index in 0..self.unary_clauses.len() {
            let forced_true = self.unary_clauses[index];
            if !self.assign_at_root(forced_true) {
                return;
            }
        }
    }

    /// Classify a long clause under the level-0 assignment and install its
    /// watchers, unless it is satisfied, forcing, or conflicting.
    fn install_long_clause(&mut self, reference: ClauseRef) {
        let length = self.long_clauses.clause_length(reference);
        let mut open_positions = [0usize; 2];
        let mut num_open = 0;
        for position in 0..length {
            let literal = self.long_clauses.literal(reference, position);
            match self.variable_states[literal.variable()].truth_value(literal) {
                None => {
                    if num_open < 2 {
                        open_positions[num_open] = position;
                        num_open += 1;
                    }
                }
                Some(true) => {
                    // satisfied at level 0; retained in the arena, not watched
                    return;
                }
                Some(false) => {}
            }
        }
        if num_open == 0 {
            // violated at level 0, the formula is unsatisfiable
            self.conflicting = true;
            self.conflict_reason = Reason::Clause {
                length: length as u32,
                reference,
            };
            return;
        }
        if num_open == 1 {
            // forcing at level 0; recorded as a unary, not watched
            let forced_true = self.long_clauses.literal(reference, open_positions[0]);
            self.unary_clauses.push(forced_true);
            let _ = self.assign_at_root(forced_true);
            return;
        }
        self.long_clauses
            .swap_literals(reference, 0, open_positions[0]);
        self.long_clauses
            .swap_literals(reference, 1, open_positions[1]);
        let first_watch = self.long_clauses.literal(reference, 0);
        let second_watch = self.long_clauses.literal(reference, 1);
        self.watch_lists[first_watch].push(ClauseWatcher {
            blocker: second_watch,
            clause_reference: reference,
        });
        self.watch_lists[second_watch].push(ClauseWatcher {
            blocker: first_watch,
            clause_reference: reference,
        });
    }

    /// A binary clause with a falsified side at level 0 forces its partner
    /// as a root fact.
    fn initialise_binary_clauses(&mut self) {
        for code in 0..2 * self.num_variables {
            let literal = Literal::u32_to_literal(code);
            if !self.variable_states[literal.variable()].is_false(literal) {
                continue;
            }
            for index in 0..self.binary_partners[literal].len() {
                let partner = self.binary_partners[literal][index];
                self.unary_clauses.push(partner);
                if !self.assign_at_root(partner) {
                    return;
                }
            }
        }
    }

    fn assign(&mut self, literal: Literal, level: usize, reason: Reason) {
        let state = &mut self.variable_states[literal.variable()];
        state.assign(self.trail.len(), literal, level);
        self.trail.push(literal);
        self.trail_reasons.push(reason);
    }

    // -------- propagation --------

    /// Propagate all queued trail entries to quiescence. Returns false iff a
    /// conflict was found. It should not be necessary to call this manually;
    /// every mutating operation propagates on its own.
    pub fn propagate(&mut self) -> bool {
        if self.conflicting {
            return false;
        }
        calabash_assert_extreme!(self.trail.iter().all(|&literal| self.is_true(literal)));
        while self.trail_queue_head < self.trail.len() {
            let true_literal = self.trail[self.trail_queue_head];
            self.trail_queue_head += 1;
            if !self.propagate_binary_clauses(true_literal) {
                return false;
            }
            if !self.propagate_long_clauses(true_literal) {
                return false;
            }
        }
        true
    }

    fn propagate_binary_clauses(&mut self, true_literal: Literal) -> bool {
        let false_literal = !true_literal;
        let level = self.get_current_level();
        for index in 0..self.binary_partners[false_literal].len() {
            let partner = self.binary_partners[false_literal][index];
            match self.variable_states[partner.variable()].truth_value(partner) {
                None => self.assign(partner, level, Reason::Binary(false_literal, partner)),
                Some(false) => {
                    self.conflicting = true;
                    self.conflict_reason = Reason::Binary(false_literal, partner);
                    self.conflict_literal = Some(partner);
                    return false;
                }
                Some(true) => {}
            }
        }
        true
    }

    /// The classic two-watched-literal walk over `watch_lists[!true_literal]`.
    ///
    /// The walk is in essence a `retain` over the watch list, except that a
    /// rewatched clause moves to another list, and on conflict the untouched
    /// tail must be preserved. Surviving watchers keep their relative order;
    /// conflict discovery order depends on it.
    fn propagate_long_clauses(&mut self, true_literal: Literal) -> bool {
        let false_literal = !true_literal;
        let level = self.get_current_level();
        let mut current_index = 0;
        let mut end_index = 0;
        while current_index < self.watch_lists[false_literal].len() {
            let watcher = self.watch_lists[false_literal][current_index];
            if self.is_true(watcher.blocker) {
                // clause already satisfied, keep the watcher unchanged
                self.watch_lists[false_literal][end_index] = watcher;
                current_index += 1;
                end_index += 1;
                continue;
            }
            let reference = watcher.clause_reference;
            // make sure the falsified watched literal sits at position 1
            if self.long_clauses.literal(reference, 0) == false_literal {
                self.long_clauses.swap_literals(reference, 0, 1);
            }
            let first = self.long_clauses.literal(reference, 0);
            let renewed_watcher = ClauseWatcher {
                blocker: first,
                clause_reference: reference,
            };
            current_index += 1;
            if first != watcher.blocker && self.is_true(first) {
                // the other watched literal satisfies the clause; it becomes
                // the new blocker
                self.watch_lists[false_literal][end_index] = renewed_watcher;
                end_index += 1;
                continue;
            }
            // search the unwatched literals for an open or true replacement
            let length = self.long_clauses.clause_length(reference);
            let mut replacement_position = None;
            for position in 2..length {
                let candidate = self.long_clauses.literal(reference, position);
                if self.is_open_or_true(candidate) {
                    replacement_position = Some(position);
                    break;
                }
            }
            if let Some(position) = replacement_position {
                // move the replacement into the watched slot and rewatch;
                // the watcher leaves this list
                let replacement = self.long_clauses.literal(reference, position);
                self.long_clauses.set_literal(reference, 1, replacement);
                self.long_clauses.set_literal(reference, position, false_literal);
                self.watch_lists[replacement].push(renewed_watcher);
            } else {
                // every unwatched literal is false: the clause is unit on
                // `first`
                self.watch_lists[false_literal][end_index] = renewed_watcher;
                end_index += 1;
                let reason = Reason::Clause {
                    length: length as u32,
                    reference,
                };
                if self.is_false(first) {
                    self.conflicting = true;
                    self.conflict_literal = Some(first);
                    self.conflict_reason = reason;
                    // preserve the watchers we have not inspected yet
                    while current_index < self.watch_lists[false_literal].len() {
                        self.watch_lists[false_literal][end_index] =
                            self.watch_lists[false_literal][current_index];
                        current_index += 1;
                        end_index += 1;
                    }
                    break;
                }
                self.assign(first, level, reason);
            }
        }
        self.watch_lists[false_literal].truncate(end_index);
        !self.conflicting
    }

    // -------- decisions --------

    /// Open a new decision level, assert the decision literal and propagate
    /// its consequences. Returns true iff no conflict arose.
    ///
    /// # Panics
    /// Panics when the propagator is conflicting or the decision literal is
    /// already assigned; both are caller bugs.
    pub fn push_level(&mut self, decision: Literal) -> bool {
        assert!(
            !self.conflicting,
            "push_level called on a conflicting propagator"
        );
        assert!(
            self.is_open(decision),
            "push_level called with the already-assigned decision literal {decision}"
        );
        let new_level = self.levels.len();
        self.levels.push(LevelInfo::new(self.trail.len()));
        self.assign(decision, new_level, Reason::Decision);
        self.propagate()
    }

    /// Roll back exactly the top decision level without learning, clearing
    /// any conflict.
    ///
    /// # Panics
    /// Panics when called at level 0.
    pub fn pop_level(&mut self) {
        assert!(
            self.levels.len() > 1,
            "pop_level called on a propagator at level 0"
        );
        self.rollback_level_silently();
        self.trail_queue_head = self.trail.len();
        if self.conflicting {
            self.reset_conflict();
        }
    }

    /// Pop decision levels until only the root level remains.
    pub fn reset_to_zero(&mut self) {
        while self.get_current_level() > 0 {
            self.pop_level();
        }
    }

    /// Unassign the top level's trail range in reverse order, optionally
    /// reporting each undone assignment.
    fn rollback_level(&mut self, mut on_undone: impl FnMut(Literal)) {
        let begin = self.level_begin(self.get_current_level());
        for position in (begin..self.trail.len()).rev() {
            let literal = self.trail[position];
            on_undone(literal);
            self.variable_states[literal.variable()].make_open();
        }
        self.trail.truncate(begin);
        self.trail_reasons.truncate(begin);
        let _ = self.levels.pop();
    }

    fn rollback_level_silently(&mut self) {
        self.rollback_level(|_| {});
    }

    fn reset_conflict(&mut self) {
        self.conflicting = false;
        self.conflict_literal = None;
        self.conflict_reason = Reason::Decision;
    }

    // -------- state queries --------

    /// Truth value of the literal under the current trail; `None` when open.
    pub fn value_of(&self, literal: Literal) -> Option<bool> {
        self.variable_states[literal.variable()].truth_value(literal)
    }

    pub fn is_true(&self, literal: Literal) -> bool {
        self.variable_states[literal.variable()].is_true(literal)
    }

    pub fn is_false(&self, literal: Literal) -> bool {
        self.variable_states[literal.variable()].is_false(literal)
    }

    pub fn is_open(&self, literal: Literal) -> bool {
        self.variable_states[literal.variable()].is_open()
    }

    pub fn is_open_or_true(&self, literal: Literal) -> bool {
        self.variable_states[literal.variable()].is_open_or_true(literal)
    }

    /// The literals currently assigned true, in assignment order.
    pub fn get_trail(&self) -> &[Literal] {
        &self.trail
    }

    /// One reason per trail entry, parallel to [`get_trail`](Propagator::get_trail).
    pub fn get_reasons(&self) -> &[Reason] {
        &self.trail_reasons
    }

    /// The reason recorded for the given assigned literal.
    ///
    /// # Panics
    /// Panics when the literal is open.
    pub fn get_reason(&self, literal: Literal) -> Reason {
        assert!(
            !self.is_open(literal),
            "get_reason called with the open literal {literal}"
        );
        self.trail_reasons[self.variable_states[literal.variable()].trail_position()]
    }

    /// Whether the given assigned literal was asserted as a decision.
    ///
    /// # Panics
    /// Panics when the literal is open.
    pub fn is_decision(&self, literal: Literal) -> bool {
        self.get_reason(literal).is_decision()
    }

    /// The decision level of the literal, or `None` when it is open.
    pub fn get_decision_level(&self, literal: Literal) -> Option<usize> {
        let state = &self.variable_states[literal.variable()];
        (!state.is_open()).then(|| state.level())
    }

    /// The trail index at which the given assigned literal was asserted.
    ///
    /// # Panics
    /// Panics when the literal is open.
    pub fn get_trail_position(&self, literal: Literal) -> usize {
        assert!(
            !self.is_open(literal),
            "get_trail_position called with the open literal {literal}"
        );
        self.variable_states[literal.variable()].trail_position()
    }

    pub fn get_current_level(&self) -> usize {
        self.levels.len() - 1
    }

    /// The trail index at which the given level's range begins.
    pub fn level_begin(&self, level: usize) -> usize {
        self.levels[level].begin()
    }

    /// The trail window of the given level.
    pub fn level_literals(&self, level: usize) -> &[Literal] {
        let begin = self.levels[level].begin();
        let end = match self.levels.get(level + 1) {
            Some(next) => next.begin(),
            None => self.trail.len(),
        };
        &self.trail[begin..end]
    }

    pub fn current_level_literals(&self) -> &[Literal] {
        self.level_literals(self.get_current_level())
    }

    /// All decision literals on the trail, in level order. Freshly
    /// constructed on every call.
    pub fn get_decisions(&self) -> Vec<Literal> {
        self.levels[1..]
            .iter()
            .map(|level| self.trail[level.begin()])
            .collect()
    }

    /// Whether the propagator currently has a conflict. A conflict at
    /// level 0 (including directly after construction) means the formula is
    /// unsatisfiable.
    pub fn is_conflicting(&self) -> bool {
        self.conflicting
    }

    /// The conflicting clause's falsified literal (absent for conflicts
    /// found while asserting root facts during construction) and its reason.
    ///
    /// # Panics
    /// Panics when the propagator is not conflicting.
    pub fn get_conflict(&self) -> (Option<Literal>, Reason) {
        assert!(
            self.conflicting,
            "get_conflict called on a non-conflicting propagator"
        );
        (self.conflict_literal, self.conflict_reason)
    }

    /// Whether all queued trail entries have been propagated.
    pub fn is_propagation_complete(&self) -> bool {
        self.trail_queue_head == self.trail.len()
    }

    pub fn num_variables(&self) -> u32 {
        self.num_variables
    }

    /// All `2 * num_variables` literals.
    pub fn all_literals(&self) -> impl Iterator<Item = Literal> {
        (0..2 * self.num_variables).map(Literal::u32_to_literal)
    }

    /// The literals of all unary clauses, i.e. the root facts.
    pub fn unary_clauses(&self) -> &[Literal] {
        &self.unary_clauses
    }

    /// All literals that occur together with the given literal in a binary
    /// clause.
    pub fn binary_partners_of(&self, literal: Literal) -> &[Literal] {
        &self.binary_partners[literal]
    }

    /// References to all clauses of length at least three, in arena order.
    pub fn long_clause_references(&self) -> impl Iterator<Item = ClauseRef> + '_ {
        self.long_clauses.references()
    }

    /// The literals of the referenced long clause.
    pub fn long_clause_literals(&self, reference: ClauseRef) -> impl Iterator<Item = Literal> + '_ {
        self.long_clauses.literals(reference)
    }

    // -------- result extraction --------

    /// The complete assignment as one bit per variable.
    ///
    /// # Panics
    /// Panics when the trail does not assign every variable.
    pub fn extract_assignment(&self) -> Vec<bool> {
        assert!(
            self.trail.len() == self.num_variables as usize,
            "extract_assignment called on an incomplete trail"
        );
        let mut assignment = vec![false; self.num_variables as usize];
        for literal in &self.trail {
            if literal.is_positive() {
                assignment[literal.variable().index() as usize] = true;
            }
        }
        assignment
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basic_types::UnsatError;

    fn model_with_variables(count: usize) -> (Vec<Literal>, ModelBuilder) {
        let mut model = ModelBuilder::default();
        let variables = (0..count).map(|_| model.add_variable()).collect();
        (variables, model)
    }

    #[test]
    fn a_fresh_propagator_is_quiescent_at_level_0() {
        let (_, model) = model_with_variables(3);
        let propagator = Propagator::new(&model);
        assert!(!propagator.is_conflicting());
        assert!(propagator.get_trail().is_empty());
        assert_eq!(propagator.get_current_level(), 0);
        assert!(propagator.is_propagation_complete());
    }

    #[test]
    fn unary_clauses_become_root_facts() {
        let (v, mut model) = model_with_variables(2);
        model.add_clause([v[0]]).unwrap();
        model.add_clause([!v[1]]).unwrap();
        let propagator = Propagator::new(&model);
        assert_eq!(propagator.get_trail(), [v[0], !v[1]]);
        assert_eq!(propagator.get_decision_level(v[0]), Some(0));
        assert_eq!(propagator.value_of(v[1]), Some(false));
    }

    #[test]
    fn contradictory_unaries_conflict_at_construction() {
        let (v, mut model) = model_with_variables(1);
        model.add_clause([v[0]]).unwrap();
        model.add_clause([!v[0]]).unwrap();
        let mut propagator = Propagator::new(&model);
        assert!(propagator.is_conflicting());
        assert_eq!(propagator.get_current_level(), 0);
        assert!(!propagator.resolve_conflicts());
        assert_eq!(propagator.resolve_or_unsat(), Err(UnsatError));
    }

    #[test]
    fn a_long_clause_with_all_but_one_literal_false_forces_at_construction() {
        let (v, mut model) = model_with_variables(3);
        model.add_clause([!v[0]]).unwrap();
        model.add_clause([!v[1]]).unwrap();
        model.add_clause([v[0], v[1], v[2]]).unwrap();
        let propagator = Propagator::new(&model);
        assert!(!propagator.is_conflicting());
        assert_eq!(propagator.get_trail(), [!v[0], !v[1], v[2]]);
        assert!(propagator.unary_clauses().contains(&v[2]));
    }

    #[test]
    fn a_falsified_long_clause_conflicts_at_construction() {
        let (v, mut model) = model_with_variables(3);
        model.add_clause([!v[0]]).unwrap();
        model.add_clause([!v[1]]).unwrap();
        model.add_clause([!v[2]]).unwrap();
        model.add_clause([v[0], v[1], v[2]]).unwrap();
        let mut propagator = Propagator::new(&model);
        assert!(propagator.is_conflicting());
        let (conflict_literal, conflict_reason) = propagator.get_conflict();
        assert_eq!(conflict_literal, None);
        assert!(matches!(conflict_reason, Reason::Clause { length: 3, .. }));
        assert!(!propagator.resolve_conflicts());
    }

    #[test]
    fn binary_clauses_propagate_in_a_chain() {
        let (v, mut model) = model_with_variables(3);
        model.add_clause([!v[0], v[1]]).unwrap();
        model.add_clause([!v[1], v[2]]).unwrap();
        let mut propagator = Propagator::new(&model);
        assert!(propagator.push_level(v[0]));
        assert_eq!(propagator.get_trail(), [v[0], v[1], v[2]]);
        assert!(propagator.is_decision(v[0]));
        assert!(!propagator.is_decision(v[1]));
        assert_eq!(propagator.get_reason(v[1]), Reason::Binary(!v[0], v[1]));
        assert_eq!(propagator.get_decisions(), [v[0]]);
        assert_eq!(propagator.current_level_literals(), [v[0], v[1], v[2]]);
    }

    #[test]
    fn pop_level_restores_the_previous_state() {
        let (v, mut model) = model_with_variables(3);
        model.add_clause([!v[0], v[1]]).unwrap();
        let mut propagator = Propagator::new(&model);
        assert!(propagator.push_level(v[2]));
        assert!(propagator.push_level(v[0]));
        assert_eq!(propagator.get_trail(), [v[2], v[0], v[1]]);
        propagator.pop_level();
        assert_eq!(propagator.get_trail(), [v[2]]);
        assert_eq!(propagator.get_current_level(), 1);
        assert!(propagator.is_open(v[0]));
        assert!(propagator.is_open(v[1]));
        propagator.reset_to_zero();
        assert!(propagator.get_trail().is_empty());
    }

    #[test]
    fn trail_positions_and_levels_are_consistent() {
        let (v, mut model) = model_with_variables(4);
        model.add_clause([!v[0], v[1]]).unwrap();
        let mut propagator = Propagator::new(&model);
        assert!(propagator.push_level(v[0]));
        assert!(propagator.push_level(v[2]));

        // P1/P2: the trail and the per-variable positions agree
        for (position, &literal) in propagator.get_trail().iter().enumerate() {
            assert_eq!(propagator.get_trail_position(literal), position);
        }
        // P3: level begins are non-decreasing
        for level in 0..propagator.get_current_level() {
            assert!(propagator.level_begin(level) <= propagator.level_begin(level + 1));
        }
        assert_eq!(propagator.level_literals(1), [v[0], v[1]]);
        assert_eq!(propagator.level_literals(2), [v[2]]);
    }

    #[test]
    fn clones_are_value_independent() {
        let (v, mut model) = model_with_variables(3);
        model.add_clause([!v[0], v[1]]).unwrap();
        let mut original = Propagator::new(&model);
        let mut copy = original.clone();

        assert!(original.push_level(v[0]));
        assert!(copy.push_level(!v[1]));

        assert_eq!(original.get_trail(), [v[0], v[1]]);
        assert_eq!(copy.get_trail(), [!v[1], !v[0]]);
    }

    #[test]
    #[should_panic(expected = "already-assigned decision literal")]
    fn pushing_an_assigned_literal_is_misuse() {
        let (v, mut model) = model_with_variables(2);
        model.add_clause([v[0]]).unwrap();
        let mut propagator = Propagator::new(&model);
        let _ = propagator.push_level(v[0]);
    }

    #[test]
    #[should_panic(expected = "pop_level called on a propagator at level 0")]
    fn popping_the_root_level_is_misuse() {
        let (_, model) = model_with_variables(1);
        let mut propagator = Propagator::new(&model);
        propagator.pop_level();
    }

    #[test]
    #[should_panic(expected = "incomplete trail")]
    fn extracting_an_incomplete_assignment_is_misuse() {
        let (_, model) = model_with_variables(2);
        let propagator = Propagator::new(&model);
        let _ = propagator.extract_assignment();
    }
}

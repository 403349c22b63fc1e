//! First-UIP conflict analysis, learnt-clause installation and backjumping.
//!
//! Conflict analysis marks variables and levels with a stamp epoch that is
//! advanced by three per analysis: `counter` marks a variable as seen,
//! `counter + 1` marks a level as used twice (and a variable as known
//! redundant), `counter + 2` marks a variable as known irredundant. The
//! triple partition lets redundancy minimisation cache its verdicts in the
//! same epoch without extra storage.

use crate::basic_types::ClauseRef;
use crate::basic_types::Literal;
use crate::basic_types::Reason;
use crate::basic_types::UnsatError;
use crate::basic_types::Variable;
use crate::calabash_asserts::calabash_assert_advanced;
use crate::calabash_asserts::calabash_assert_simple;
use crate::engine::AssignmentHandler;
use crate::engine::NoopAssignmentHandler;
use crate::engine::Propagator;

use super::ClauseWatcher;

impl Propagator {
    /// Resolve the current conflict by learning a clause and backjumping,
    /// repeating if propagation after the backjump conflicts again. Returns
    /// false iff a conflict was reached at level 0, i.e. the formula is
    /// unsatisfiable.
    pub fn resolve_conflicts(&mut self) -> bool {
        let mut handler = NoopAssignmentHandler;
        self.resolve_conflicts_with_handler(&mut handler)
    }

    /// Like [`resolve_conflicts`](Propagator::resolve_conflicts), reporting
    /// assignment changes to the given handler.
    ///
    /// The level whose decision led to the conflict is always rolled back
    /// silently. Undone and newly forced assignments at or below the
    /// backjump target are reported; when propagation after the backjump
    /// conflicts again, the assignments undone between the propagation
    /// high-water mark and the resolved level are reported before recursing.
    pub fn resolve_conflicts_with_handler<Handler: AssignmentHandler>(
        &mut self,
        handler: &mut Handler,
    ) -> bool {
        if !self.conflicting {
            return true;
        }
        if self.levels.len() == 1 {
            return false;
        }
        self.compute_conflict_clause();
        self.install_conflict_clause(handler);
        self.reset_conflict();
        let trail_size = self.trail_queue_head;
        let level_begin = self.levels[self.get_current_level()].begin();
        if !self.propagate() {
            for position in (level_begin..trail_size).rev() {
                handler.assignment_undone(self.trail[position]);
            }
            self.resolve_conflicts_with_handler(handler)
        } else {
            for position in trail_size..self.trail.len() {
                handler.assignment_forced(self.trail[position]);
            }
            true
        }
    }

    /// Like [`resolve_conflicts`](Propagator::resolve_conflicts), with
    /// unsatisfiability reported as an error.
    pub fn resolve_or_unsat(&mut self) -> Result<(), UnsatError> {
        if self.resolve_conflicts() {
            Ok(())
        } else {
            Err(UnsatError)
        }
    }

    /// Advance the stamp epoch by three, zeroing all stamps first when the
    /// counter is about to wrap.
    fn increase_stamp(&mut self) -> u32 {
        if self.stamp_counter >= u32::MAX - 6 {
            for state in self.variable_states.iter_mut() {
                state.stamp_with(0);
            }
            for level in self.levels.iter_mut() {
                level.stamp_with(0);
            }
            self.stamp_counter = 0;
        }
        self.stamp_counter += 3;
        self.stamp_counter
    }

    /// Stamp the literals of a reason. Literals at the current level are
    /// counted; literals at lower non-zero levels are pushed into the learn
    /// buffer and their level is stamped (promoted to `counter + 1` when
    /// the level contributes a second literal).
    fn stamp_and_count_reason(&mut self, current_level: usize, reason: Reason) -> u32 {
        let mut on_current_level = 0;
        for literal in reason.literals(&self.long_clauses) {
            let variable = literal.variable();
            let assignment_level = self.variable_states[variable].level();
            if assignment_level >= current_level {
                if self.variable_states[variable].stamp() >= self.stamp_counter {
                    continue;
                }
                on_current_level += 1;
                self.variable_states[variable].stamp_with(self.stamp_counter);
            } else {
                if assignment_level == 0 {
                    continue;
                }
                if self.variable_states[variable].stamp() < self.stamp_counter {
                    let level_info = &mut self.levels[assignment_level];
                    if level_info.stamp() < self.stamp_counter {
                        level_info.stamp_with(self.stamp_counter);
                    } else {
                        level_info.stamp_with(self.stamp_counter + 1);
                    }
                    self.learn_buffer.push(literal);
                    self.variable_states[variable].stamp_with(self.stamp_counter);
                }
            }
        }
        on_current_level
    }

    /// Compute the first-UIP conflict clause into the learn buffer: walk the
    /// trail backwards resolving stamped literals until a single literal of
    /// the current level remains, then strengthen the clause by dropping
    /// redundant literals.
    fn compute_conflict_clause(&mut self) {
        calabash_assert_advanced!(self.conflicting && self.get_current_level() > 0);
        calabash_assert_advanced!(self.learn_buffer.is_empty());
        let _ = self.increase_stamp();
        let current_level = self.get_current_level();
        let conflict_reason = self.conflict_reason;
        let mut on_current_level = self.stamp_and_count_reason(current_level, conflict_reason);
        let mut trail_index = self.trail.len() - 1;
        while on_current_level > 1 {
            let literal = self.trail[trail_index];
            if self.variable_states[literal.variable()].stamp() >= self.stamp_counter {
                let reason = self.trail_reasons[trail_index];
                on_current_level += self.stamp_and_count_reason(current_level, reason);
                on_current_level -= 1;
            }
            trail_index -= 1;
        }
        // the sole remaining stamped literal at the current level is the
        // first UIP; find it
        loop {
            let literal = self.trail[trail_index];
            if self.variable_states[literal.variable()].stamp() >= self.stamp_counter {
                break;
            }
            trail_index -= 1;
        }
        let uip = self.trail[trail_index];
        self.learn_buffer.push(!uip);
        self.filter_redundant_literals();
    }

    /// One literal of a reason clause, by position.
    fn reason_literal(&self, reason: Reason, position: usize) -> Literal {
        match reason {
            Reason::Decision => panic!("a decision reason has no literals"),
            Reason::Unary(literal) => literal,
            Reason::Binary(first, second) => {
                if position == 0 {
                    first
                } else {
                    second
                }
            }
            Reason::Clause { reference, .. } => self.long_clauses.literal(reference, position),
        }
    }

    /// Whether the assigned variable is redundant in the learnt clause: its
    /// reason tree bottoms out in literals that are already part of the
    /// clause (or root facts). Verdicts are cached in the variable stamps:
    /// `counter + 1` = redundant, `counter + 2` = irredundant.
    fn is_redundant(&mut self, variable: Variable) -> bool {
        let stamp = self.variable_states[variable].stamp();
        if stamp == self.stamp_counter + 1 {
            return true;
        }
        if stamp == self.stamp_counter + 2 {
            return false;
        }
        let trail_position = self.variable_states[variable].trail_position();
        let reason = self.trail_reasons[trail_position];
        if reason.is_decision() {
            self.variable_states[variable].stamp_with(self.stamp_counter + 2);
            return false;
        }
        for position in 0..reason.length() {
            let reason_literal = self.reason_literal(reason, position);
            let reason_variable = reason_literal.variable();
            if reason_variable == variable {
                continue;
            }
            let level = self.variable_states[reason_variable].level();
            if level == 0 {
                continue;
            }
            let reason_stamp = self.variable_states[reason_variable].stamp();
            if reason_stamp == self.stamp_counter + 2 {
                return false;
            }
            if reason_stamp < self.stamp_counter {
                // a literal at a level the clause does not touch can never
                // be absorbed, and neither can an irredundant antecedent
                if self.levels[level].stamp() < self.stamp_counter
                    || !self.is_redundant(reason_variable)
                {
                    self.variable_states[reason_variable].stamp_with(self.stamp_counter + 2);
                    return false;
                }
            }
        }
        self.variable_states[variable].stamp_with(self.stamp_counter + 1);
        true
    }

    /// Strengthen the learnt clause: move the UIP to the front, then drop
    /// every other literal whose level carries the double-use stamp and
    /// whose reason tree proves it redundant.
    fn filter_redundant_literals(&mut self) {
        let last = self.learn_buffer.len() - 1;
        self.learn_buffer.swap(0, last);
        let mut end_position = 1;
        for index in 1..self.learn_buffer.len() {
            let literal = self.learn_buffer[index];
            let variable = literal.variable();
            let level = self.variable_states[variable].level();
            let redundant = if level == 0 {
                true
            } else if self.levels[level].stamp() != self.stamp_counter + 1 {
                false
            } else {
                self.is_redundant(variable)
            };
            if !redundant {
                self.learn_buffer[end_position] = literal;
                end_position += 1;
            }
        }
        self.learn_buffer.truncate(end_position);
    }

    /// The backjump target: the maximum level among the non-UIP literals of
    /// the learnt clause (level 0 for a unary clause), together with the
    /// literal assigned at that level.
    fn backjump_target(&self) -> (usize, Literal) {
        let mut target_level = 0;
        let mut target_literal = self.learn_buffer[0];
        for &literal in &self.learn_buffer[1..] {
            let level = self.variable_states[literal.variable()].level();
            if level > target_level {
                target_level = level;
                target_literal = literal;
            }
        }
        (target_level, target_literal)
    }

    /// Roll back to the backjump target. The conflicting level is undone
    /// silently, all further levels with notifications. Leaves the trail
    /// queue head at the trail end so the upcoming assertion is the only
    /// propagation input.
    fn backjump<Handler: AssignmentHandler>(
        &mut self,
        handler: &mut Handler,
    ) -> (usize, Literal) {
        let (target_level, target_literal) = self.backjump_target();
        self.rollback_level_silently();
        while self.levels.len() > target_level + 1 {
            self.rollback_level(|literal| handler.assignment_undone(literal));
        }
        self.trail_queue_head = self.trail.len();
        (target_level, target_literal)
    }

    /// Append the learnt clause to the matching bucket; returns the arena
    /// reference for a long clause.
    fn insert_conflict_clause(&mut self) -> Option<ClauseRef> {
        match self.learn_buffer.len() {
            1 => {
                self.unary_clauses.push(self.learn_buffer[0]);
                None
            }
            2 => {
                let first = self.learn_buffer[0];
                let second = self.learn_buffer[1];
                self.binary_partners[first].push(second);
                self.binary_partners[second].push(first);
                None
            }
            _ => Some(self.long_clauses.push_clause(&self.learn_buffer)),
        }
    }

    /// Install watches for a long learnt clause: the UIP stays at position
    /// 0, the backjump target literal is swapped to position 1.
    fn watch_learned_clause(
        &mut self,
        learned: Literal,
        target_literal: Literal,
        reference: ClauseRef,
    ) {
        calabash_assert_simple!(self.long_clauses.literal(reference, 0) == learned);
        let length = self.long_clauses.clause_length(reference);
        let target_position = (1..length)
            .find(|&position| self.long_clauses.literal(reference, position) == target_literal)
            .expect("the learnt clause contains the backjump target literal");
        self.long_clauses.swap_literals(reference, 1, target_position);
        self.watch_lists[learned].push(ClauseWatcher {
            blocker: target_literal,
            clause_reference: reference,
        });
        self.watch_lists[target_literal].push(ClauseWatcher {
            blocker: learned,
            clause_reference: reference,
        });
    }

    /// Insert the learnt clause, backjump, and assert the UIP at the target
    /// level with the learnt clause as its reason.
    fn install_conflict_clause<Handler: AssignmentHandler>(&mut self, handler: &mut Handler) {
        let reference_if_long = self.insert_conflict_clause();
        let (target_level, target_literal) = self.backjump(handler);
        let learned = self.learn_buffer[0];
        match self.learn_buffer.len() {
            1 => self.assign(learned, target_level, Reason::Unary(learned)),
            2 => {
                let second = self.learn_buffer[1];
                self.assign(learned, target_level, Reason::Binary(learned, second));
            }
            length => {
                let reference = reference_if_long
                    .expect("a learnt clause of length three or more lives in the arena");
                self.assign(
                    learned,
                    target_level,
                    Reason::Clause {
                        length: length as u32,
                        reference,
                    },
                );
                self.watch_learned_clause(learned, target_literal, reference);
            }
        }
        self.learn_buffer.clear();
    }

    // -------- supporting-decision queries --------

    /// The `(level, literal)` pairs of the decisions whose consequences
    /// include the given assigned literal, found by a stamped reverse walk
    /// of the reason graph.
    ///
    /// # Panics
    /// Panics when the propagator is conflicting or the literal is open.
    pub fn decisions_leading_to(&mut self, literal: Literal) -> &[(usize, Literal)] {
        assert!(
            !self.conflicting,
            "decisions_leading_to called on a conflicting propagator"
        );
        assert!(
            !self.is_open(literal),
            "decisions_leading_to called with the open literal {literal}"
        );
        self.supporting_decisions.clear();
        let trail_position = self.variable_states[literal.variable()].trail_position();
        if self.trail_reasons[trail_position].is_decision() {
            let level = self.variable_states[literal.variable()].level();
            self.supporting_decisions.push((level, literal));
            return &self.supporting_decisions;
        }
        let current_stamp = self.increase_stamp();
        let reason = self.trail_reasons[trail_position];
        for reason_literal in reason.literals(&self.long_clauses) {
            if reason_literal != literal {
                self.variable_states[reason_literal.variable()].stamp_with(current_stamp);
                self.learn_buffer.push(!reason_literal);
            }
        }
        self.collect_supporting_decisions(current_stamp);
        self.learn_buffer.clear();
        &self.supporting_decisions
    }

    /// The `(level, literal)` pairs of the decisions that led to the current
    /// conflict.
    ///
    /// # Panics
    /// Panics when the propagator is not conflicting.
    pub fn decisions_leading_to_conflict(&mut self) -> &[(usize, Literal)] {
        assert!(
            self.conflicting,
            "decisions_leading_to_conflict called on a non-conflicting propagator"
        );
        self.supporting_decisions.clear();
        let Some(conflict_literal) = self.conflict_literal else {
            // a conflict discovered while asserting root facts is supported
            // by no decision at all
            return &self.supporting_decisions;
        };
        let current_stamp = self.increase_stamp();
        let conflict_reason = self.conflict_reason;
        for reason_literal in conflict_reason.literals(&self.long_clauses) {
            if reason_literal != conflict_literal {
                self.variable_states[reason_literal.variable()].stamp_with(current_stamp);
                self.learn_buffer.push(!reason_literal);
            }
        }
        self.variable_states[conflict_literal.variable()].stamp_with(current_stamp);
        let assigned_negation = !conflict_literal;
        let negation_reason =
            self.trail_reasons[self.variable_states[assigned_negation.variable()].trail_position()];
        for reason_literal in negation_reason.literals(&self.long_clauses) {
            let variable = reason_literal.variable();
            if self.variable_states[variable].stamp() != current_stamp {
                self.variable_states[variable].stamp_with(current_stamp);
                self.learn_buffer.push(!reason_literal);
            }
        }
        self.collect_supporting_decisions(current_stamp);
        self.learn_buffer.clear();
        &self.supporting_decisions
    }

    /// Breadth-first walk over the reasons of the (true) literals queued in
    /// the learn buffer, recording every decision encountered.
    fn collect_supporting_decisions(&mut self, current_stamp: u32) {
        let mut buffer_position = 0;
        while buffer_position < self.learn_buffer.len() {
            let next = self.learn_buffer[buffer_position];
            buffer_position += 1;
            let trail_position = self.variable_states[next.variable()].trail_position();
            let reason = self.trail_reasons[trail_position];
            if reason.is_decision() {
                let level = self.variable_states[next.variable()].level();
                self.supporting_decisions.push((level, next));
            } else {
                for reason_literal in reason.literals(&self.long_clauses) {
                    if reason_literal != next {
                        let variable = reason_literal.variable();
                        if self.variable_states[variable].stamp() != current_stamp {
                            self.variable_states[variable].stamp_with(current_stamp);
                            self.learn_buffer.push(!reason_literal);
                        }
                    }
                }
            }
        }
    }
}

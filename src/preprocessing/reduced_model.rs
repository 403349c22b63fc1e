use crate::basic_types::Literal;
use crate::calabash_asserts::calabash_assert_simple;
use crate::containers::KeyedVec;
use crate::engine::Propagator;
use crate::preprocessing::eliminate_subsumed;

/// What a literal of the original formula maps to after reduction.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ReducedLiteral {
    /// The literal survives, renumbered into the reduced variable space.
    Kept(Literal),
    /// The literal is true under the partial assignment.
    FixedTrue,
    /// The literal is false under the partial assignment.
    FixedFalse,
}

/// Extracts the residual formula of a propagator holding a non-conflicting
/// partial assignment: satisfied clauses are dropped, false literals are
/// stripped from the remaining clauses, the open variables are renumbered
/// densely, and subsumed residual clauses are eliminated.
///
/// The reduced formula is exactly the problem of extending the partial
/// assignment to a satisfying assignment of the original formula.
#[derive(Default, Debug, Clone)]
pub struct ReducedModelExtractor {
    old_literal_is_true: KeyedVec<Literal, bool>,
    old_literal_is_false: KeyedVec<Literal, bool>,
    new_to_old: Vec<Literal>,
    old_to_new: Vec<ReducedLiteral>,
    reduced_clauses: Vec<Vec<Literal>>,
    clause_buffer: Vec<Literal>,
}

impl ReducedModelExtractor {
    /// Extract the reduced formula from the given propagator. The
    /// propagator must be non-conflicting with no pending propagations.
    pub fn extract(&mut self, propagator: &Propagator) {
        calabash_assert_simple!(!propagator.is_conflicting());
        calabash_assert_simple!(propagator.is_propagation_complete());
        self.initialise(propagator);
        self.build_literal_maps();
        self.translate_binary_clauses(propagator);
        self.translate_long_clauses(propagator);
        let reduced_num_vars = self.reduced_num_vars() as u32;
        eliminate_subsumed(&mut self.reduced_clauses, reduced_num_vars);
    }

    /// The residual clauses over the reduced variable space.
    pub fn reduced_clauses(&self) -> &[Vec<Literal>] {
        &self.reduced_clauses
    }

    pub fn reduced_num_vars(&self) -> usize {
        self.new_to_old.len() / 2
    }

    pub fn reduced_num_clauses(&self) -> usize {
        self.reduced_clauses.len()
    }

    /// The original literal a reduced literal stands for.
    pub fn translate_to_old(&self, reduced: Literal) -> Literal {
        self.new_to_old[reduced.to_u32() as usize]
    }

    /// The reduced counterpart of an original literal, or its fixed truth
    /// value under the partial assignment.
    pub fn translate_to_new(&self, original: Literal) -> ReducedLiteral {
        self.old_to_new[original.to_u32() as usize]
    }

    fn initialise(&mut self, propagator: &Propagator) {
        let num_literals = 2 * propagator.num_variables() as usize;
        self.old_literal_is_true = KeyedVec::default();
        self.old_literal_is_true.resize(num_literals, false);
        self.old_literal_is_false = KeyedVec::default();
        self.old_literal_is_false.resize(num_literals, false);
        for &literal in propagator.get_trail() {
            self.old_literal_is_true[literal] = true;
            self.old_literal_is_false[!literal] = true;
        }
        self.new_to_old.clear();
        self.old_to_new.clear();
        self.reduced_clauses.clear();
    }

    /// Open variables are renumbered densely in increasing order; assigned
    /// variables map to their fixed truth values.
    fn build_literal_maps(&mut self) {
        let num_literals = self.old_literal_is_true.len();
        let mut next_code = 0;
        for code in (0..num_literals as u32).step_by(2) {
            let positive = Literal::u32_to_literal(code);
            if self.old_literal_is_true[positive] {
                self.old_to_new.push(ReducedLiteral::FixedTrue);
                self.old_to_new.push(ReducedLiteral::FixedFalse);
            } else if self.old_literal_is_false[positive] {
                self.old_to_new.push(ReducedLiteral::FixedFalse);
                self.old_to_new.push(ReducedLiteral::FixedTrue);
            } else {
                self.old_to_new
                    .push(ReducedLiteral::Kept(Literal::u32_to_literal(next_code)));
                self.old_to_new
                    .push(ReducedLiteral::Kept(Literal::u32_to_literal(next_code + 1)));
                self.new_to_old.push(positive);
                self.new_to_old.push(!positive);
                next_code += 2;
            }
        }
    }

    fn translated(&self, original: Literal) -> Literal {
        match self.old_to_new[original.to_u32() as usize] {
            ReducedLiteral::Kept(literal) => literal,
            _ => panic!("a fixed literal cannot appear in a residual clause"),
        }
    }

    /// Unary clauses need no translation at all: they are on the trail.
    fn translate_binary_clauses(&mut self, propagator: &Propagator) {
        for first in propagator.all_literals() {
            // a false side forces its partner onto the trail, a true side
            // satisfies the clause; either way there is nothing to keep
            if self.old_literal_is_false[first] || self.old_literal_is_true[first] {
                continue;
            }
            for &second in propagator.binary_partners_of(first) {
                if self.old_literal_is_true[second] {
                    continue;
                }
                if first < second {
                    self.reduced_clauses
                        .push(vec![self.translated(first), self.translated(second)]);
                }
            }
        }
    }

    fn translate_long_clauses(&mut self, propagator: &Propagator) {
        for reference in propagator.long_clause_references() {
            self.clause_buffer.clear();
            let mut satisfied = false;
            for literal in propagator.long_clause_literals(reference) {
                if self.old_literal_is_true[literal] {
                    satisfied = true;
                    break;
                }
                if self.old_literal_is_false[literal] {
                    continue;
                }
                self.clause_buffer.push(self.translated(literal));
            }
            if satisfied {
                continue;
            }
            calabash_assert_simple!(self.clause_buffer.len() > 1);
            self.reduced_clauses.push(self.clause_buffer.clone());
        }
    }
}

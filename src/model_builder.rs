use log::warn;

use crate::basic_types::Literal;
use crate::basic_types::UnsatError;
use crate::basic_types::Variable;
use crate::containers::KeyedVec;

/// Accumulates a propositional formula in CNF and normalises its clauses
/// into the unary / binary / long buckets a [`crate::Propagator`] is built
/// from.
///
/// Clauses can be added in one call with [`add_clause`](ModelBuilder::add_clause)
/// or streamed literal by literal with [`add_literal`](ModelBuilder::add_literal)
/// and [`finalize_clause`](ModelBuilder::finalize_clause). Finalisation
/// sorts and deduplicates the clause, silently drops tautologies, and grows
/// the variable count past the largest variable mentioned, so explicitly
/// adding variables is optional.
#[derive(Default, Debug, Clone)]
pub struct ModelBuilder {
    num_variables: u32,
    unary_clauses: Vec<Literal>,
    binary_partners: KeyedVec<Literal, Vec<Literal>>,
    long_clauses: Vec<Vec<Literal>>,
    clause_buffer: Vec<Literal>,
}

impl ModelBuilder {
    /// Allocate a fresh variable and return its positive literal.
    pub fn add_variable(&mut self) -> Literal {
        let variable = Variable::new(self.num_variables);
        self.num_variables += 1;
        Literal::positive(variable)
    }

    /// Ensure the model has at least `count` variables.
    pub fn reserve_variables(&mut self, count: u32) {
        self.num_variables = self.num_variables.max(count);
    }

    pub fn num_variables(&self) -> u32 {
        self.num_variables
    }

    /// The number of clauses currently in the model.
    pub fn num_clauses(&self) -> usize {
        let num_binary: usize = self.binary_partners.iter().map(|list| list.len()).sum();
        self.unary_clauses.len() + num_binary / 2 + self.long_clauses.len()
    }

    /// Add the literals to the current clause and finalise it.
    ///
    /// An empty clause makes the formula trivially unsatisfiable and is
    /// reported as [`UnsatError`].
    pub fn add_clause(
        &mut self,
        literals: impl IntoIterator<Item = Literal>,
    ) -> Result<(), UnsatError> {
        self.clause_buffer.extend(literals);
        self.finalize_clause()
    }

    /// Add a single literal to the current clause.
    pub fn add_literal(&mut self, literal: Literal) {
        self.clause_buffer.push(literal);
    }

    /// Add several literals to the current clause without finalising it.
    pub fn add_literals(&mut self, literals: impl IntoIterator<Item = Literal>) {
        self.clause_buffer.extend(literals);
    }

    /// Finalise the current clause and route it into its bucket.
    ///
    /// The clause is sorted and deduplicated; a tautology is discarded
    /// without changing the model. Finalising an empty clause yields
    /// [`UnsatError`].
    pub fn finalize_clause(&mut self) -> Result<(), UnsatError> {
        if self.clause_buffer.is_empty() {
            warn!("finalising an empty clause, the formula is trivially unsatisfiable");
            return Err(UnsatError);
        }
        self.clause_buffer.sort_unstable();
        self.clause_buffer.dedup();
        let is_tautology = self
            .clause_buffer
            .windows(2)
            .any(|pair| !pair[0] == pair[1]);
        if is_tautology {
            self.clause_buffer.clear();
            return Ok(());
        }
        let largest = *self
            .clause_buffer
            .last()
            .expect("the clause buffer is non-empty");
        if largest.variable().index() >= self.num_variables {
            self.num_variables = largest.variable().index() + 1;
        }
        match self.clause_buffer.len() {
            1 => self.unary_clauses.push(self.clause_buffer[0]),
            2 => self.add_binary_clause(self.clause_buffer[0], self.clause_buffer[1]),
            _ => self.long_clauses.push(self.clause_buffer.clone()),
        }
        self.clause_buffer.clear();
        Ok(())
    }

    fn add_binary_clause(&mut self, first: Literal, second: Literal) {
        if self.binary_partners.len() < 2 * self.num_variables as usize {
            self.binary_partners
                .resize(2 * self.num_variables as usize, Vec::new());
        }
        self.binary_partners[first].push(second);
        self.binary_partners[second].push(first);
    }

    // -------- bucket access for the propagator --------

    pub(crate) fn unary_clauses(&self) -> &[Literal] {
        &self.unary_clauses
    }

    pub(crate) fn binary_partner_lists(&self) -> &KeyedVec<Literal, Vec<Literal>> {
        &self.binary_partners
    }

    pub(crate) fn long_clauses(&self) -> &[Vec<Literal>] {
        &self.long_clauses
    }

    // -------- verification oracles --------

    /// Check that the given trail is a permutation-free, complete assignment
    /// of the model's variables that satisfies every clause. Returns a
    /// diagnostic naming the first problem found.
    pub fn verify_trail(&self, full_trail: &[Literal]) -> Result<(), String> {
        let num_variables = self.num_variables as usize;
        if full_trail.len() != num_variables {
            return Err(format!(
                "trail has wrong length: expected {}, got {}",
                num_variables,
                full_trail.len()
            ));
        }
        let mut seen = vec![false; num_variables];
        let mut assignment = vec![false; num_variables];
        for &literal in full_trail {
            let variable = literal.variable();
            if variable.index() as usize >= num_variables {
                return Err(format!(
                    "trail contains variable {variable} which is not in the model"
                ));
            }
            if seen[variable.index() as usize] {
                return Err(format!("trail contains variable {variable} multiple times"));
            }
            seen[variable.index() as usize] = true;
            if literal.is_positive() {
                assignment[variable.index() as usize] = true;
            }
        }
        self.verify_assignment(&assignment)
    }

    /// Check that the given complete assignment (one bit per variable)
    /// satisfies every clause of the model.
    pub fn verify_assignment(&self, assignment: &[bool]) -> Result<(), String> {
        let num_variables = self.num_variables as usize;
        if assignment.len() != num_variables {
            return Err(format!(
                "assignment has wrong length: expected {}, got {}",
                num_variables,
                assignment.len()
            ));
        }
        for &literal in &self.unary_clauses {
            if !literal.is_true_in(assignment) {
                return Err(format!("unary clause {literal} is not satisfied"));
            }
        }
        for code in 0..self.binary_partners.len() as u32 {
            let first = Literal::u32_to_literal(code);
            if first.is_true_in(assignment) {
                continue;
            }
            for &second in &self.binary_partners[first] {
                if !second.is_true_in(assignment) {
                    return Err(format!("binary clause {first} {second} is not satisfied"));
                }
            }
        }
        for clause in &self.long_clauses {
            if !clause.iter().any(|literal| literal.is_true_in(assignment)) {
                let rendering: Vec<String> =
                    clause.iter().map(|literal| literal.to_string()).collect();
                return Err(format!(
                    "clause {} is not satisfied",
                    rendering.join(" ")
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clauses_are_sorted_and_deduplicated() {
        let mut model = ModelBuilder::default();
        let a = model.add_variable();
        let b = model.add_variable();
        let c = model.add_variable();
        model.add_clause([c, a, b, a]).unwrap();
        assert_eq!(model.long_clauses(), [vec![a, b, c]]);
    }

    #[test]
    fn a_tautology_leaves_the_model_unchanged() {
        let mut model = ModelBuilder::default();
        let a = model.add_variable();
        let b = model.add_variable();
        model.add_clause([a, !a, b]).unwrap();
        assert_eq!(model.num_clauses(), 0);
        // the next clause still finalises normally
        model.add_clause([a, b]).unwrap();
        assert_eq!(model.num_clauses(), 1);
    }

    #[test]
    fn an_empty_clause_reports_unsat() {
        let mut model = ModelBuilder::default();
        assert_eq!(model.add_clause([]), Err(UnsatError));
        assert_eq!(model.finalize_clause(), Err(UnsatError));
    }

    #[test]
    fn mentioning_a_variable_grows_the_model() {
        let mut model = ModelBuilder::default();
        let far = Literal::positive(Variable::new(6));
        model.add_clause([far]).unwrap();
        assert_eq!(model.num_variables(), 7);
        model.reserve_variables(3);
        assert_eq!(model.num_variables(), 7);
        model.reserve_variables(10);
        assert_eq!(model.num_variables(), 10);
    }

    #[test]
    fn streaming_construction_matches_add_clause() {
        let mut model = ModelBuilder::default();
        let a = model.add_variable();
        let b = model.add_variable();
        let c = model.add_variable();
        model.add_literal(a);
        model.add_literals([b, c]);
        model.finalize_clause().unwrap();
        assert_eq!(model.long_clauses(), [vec![a, b, c]]);
    }

    #[test]
    fn binary_clauses_are_stored_from_both_sides() {
        let mut model = ModelBuilder::default();
        let a = model.add_variable();
        let b = model.add_variable();
        model.add_clause([a, !b]).unwrap();
        assert_eq!(model.binary_partner_lists()[a], [!b]);
        assert_eq!(model.binary_partner_lists()[!b], [a]);
        assert_eq!(model.num_clauses(), 1);
    }

    #[test]
    fn verify_assignment_reports_the_unsatisfied_clause() {
        let mut model = ModelBuilder::default();
        let a = model.add_variable();
        let b = model.add_variable();
        let c = model.add_variable();
        model.add_clause([a, b, c]).unwrap();
        assert!(model.verify_assignment(&[true, false, false]).is_ok());
        let diagnostic = model.verify_assignment(&[false, false, false]).unwrap_err();
        assert!(diagnostic.contains("not satisfied"));
        assert!(model.verify_assignment(&[true, false]).is_err());
    }

    #[test]
    fn verify_trail_rejects_duplicates_and_gaps() {
        let mut model = ModelBuilder::default();
        let a = model.add_variable();
        let b = model.add_variable();
        model.add_clause([a, b]).unwrap();
        assert!(model.verify_trail(&[a, !b]).is_ok());
        assert!(model.verify_trail(&[a, !a]).unwrap_err().contains("multiple times"));
        assert!(model.verify_trail(&[a]).unwrap_err().contains("wrong length"));
    }
}

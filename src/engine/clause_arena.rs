use crate::basic_types::ClauseRef;
use crate::basic_types::Literal;
use crate::calabash_asserts::calabash_assert_moderate;

/// Flat storage for all clauses of length at least three.
///
/// Each clause occupies `1 + len` slots: a length header followed by the
/// literal codes. A [`ClauseRef`] is the arena index of the clause's first
/// literal, so the header lives at `reference - 1`. The literals at
/// positions 0 and 1 are the watched literals and are repositioned in place
/// as watches move.
#[derive(Clone, Debug, Default)]
pub(crate) struct ClauseArena {
    codes: Vec<u32>,
}

impl ClauseArena {
    /// Reserve room for `total_slots` header+literal slots, with headroom
    /// for clauses learned later.
    pub(crate) fn reserve_with_headroom(&mut self, total_slots: usize) {
        self.codes.reserve(total_slots + total_slots / 2);
    }

    pub(crate) fn push_clause(&mut self, literals: &[Literal]) -> ClauseRef {
        calabash_assert_moderate!(literals.len() >= 3);
        let reference = ClauseRef::new(self.codes.len() as u32 + 1);
        self.codes.push(literals.len() as u32);
        self.codes.extend(literals.iter().map(|literal| literal.to_u32()));
        reference
    }

    pub(crate) fn clause_length(&self, reference: ClauseRef) -> usize {
        self.codes[reference.index() - 1] as usize
    }

    pub(crate) fn literal(&self, reference: ClauseRef, position: usize) -> Literal {
        calabash_assert_moderate!(position < self.clause_length(reference));
        Literal::u32_to_literal(self.codes[reference.index() + position])
    }

    pub(crate) fn set_literal(&mut self, reference: ClauseRef, position: usize, literal: Literal) {
        calabash_assert_moderate!(position < self.clause_length(reference));
        self.codes[reference.index() + position] = literal.to_u32();
    }

    pub(crate) fn swap_literals(&mut self, reference: ClauseRef, first: usize, second: usize) {
        let base = reference.index();
        self.codes.swap(base + first, base + second);
    }

    /// The literal codes of the clause as a contiguous slice.
    pub(crate) fn literal_codes(&self, reference: ClauseRef) -> &[u32] {
        let begin = reference.index();
        &self.codes[begin..begin + self.codes[begin - 1] as usize]
    }

    pub(crate) fn literals(
        &self,
        reference: ClauseRef,
    ) -> impl Iterator<Item = Literal> + '_ {
        self.literal_codes(reference)
            .iter()
            .map(|&code| Literal::u32_to_literal(code))
    }

    /// The reference one past the last clause; never a valid clause itself.
    pub(crate) fn end_reference(&self) -> ClauseRef {
        ClauseRef::new(self.codes.len() as u32 + 1)
    }

    pub(crate) fn first_clause(&self) -> ClauseRef {
        ClauseRef::new(1)
    }

    pub(crate) fn next_clause(&self, reference: ClauseRef) -> ClauseRef {
        ClauseRef::new(reference.to_u32() + self.codes[reference.index() - 1] + 1)
    }

    /// All clause references, in arena order.
    pub(crate) fn references(&self) -> impl Iterator<Item = ClauseRef> + '_ {
        let end = self.end_reference();
        let first = (self.first_clause() < end).then_some(self.first_clause());
        std::iter::successors(first, move |&reference| {
            let next = self.next_clause(reference);
            (next < end).then_some(next)
        })
    }
}

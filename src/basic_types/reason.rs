use crate::basic_types::ClauseRef;
use crate::basic_types::Literal;
use crate::engine::ClauseArena;

/// The reason a trail literal was assigned true.
///
/// Unary and binary reasons embed their literals; long reasons borrow them
/// from the clause arena. Reasons never own clause storage, which keeps the
/// trail's reason sequence cheap to push and pop.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Reason {
    /// The literal was asserted speculatively, opening a new level.
    Decision,
    /// The literal is a unary clause, i.e. a root fact.
    Unary(Literal),
    /// The literal was forced by a binary clause consisting of the two
    /// stored literals.
    Binary(Literal, Literal),
    /// The literal was forced by the referenced long clause.
    Clause { length: u32, reference: ClauseRef },
}

impl Reason {
    pub fn is_decision(&self) -> bool {
        matches!(self, Reason::Decision)
    }

    pub(crate) fn length(&self) -> usize {
        match self {
            Reason::Decision => 0,
            Reason::Unary(_) => 1,
            Reason::Binary(_, _) => 2,
            Reason::Clause { length, .. } => *length as usize,
        }
    }

    /// The literals of the backing clause, in clause order. Decisions have
    /// no literals.
    pub(crate) fn literals<'a>(&self, long_clauses: &'a ClauseArena) -> ReasonLiterals<'a> {
        match *self {
            Reason::Decision => ReasonLiterals::inline([Literal::default(); 2], 0),
            Reason::Unary(literal) => ReasonLiterals::inline([literal, Literal::default()], 1),
            Reason::Binary(first, second) => ReasonLiterals::inline([first, second], 2),
            Reason::Clause { reference, .. } => {
                ReasonLiterals::stored(long_clauses.literal_codes(reference))
            }
        }
    }
}

/// Iterator over the literals of a [`Reason`].
pub(crate) struct ReasonLiterals<'a> {
    inline: [Literal; 2],
    stored: Option<&'a [u32]>,
    length: usize,
    next: usize,
}

impl<'a> ReasonLiterals<'a> {
    fn inline(literals: [Literal; 2], length: usize) -> ReasonLiterals<'a> {
        ReasonLiterals {
            inline: literals,
            stored: None,
            length,
            next: 0,
        }
    }

    fn stored(codes: &'a [u32]) -> ReasonLiterals<'a> {
        ReasonLiterals {
            inline: [Literal::default(); 2],
            stored: Some(codes),
            length: codes.len(),
            next: 0,
        }
    }
}

impl Iterator for ReasonLiterals<'_> {
    type Item = Literal;

    fn next(&mut self) -> Option<Literal> {
        if self.next >= self.length {
            return None;
        }
        let literal = match self.stored {
            Some(codes) => Literal::u32_to_literal(codes[self.next]),
            None => self.inline[self.next],
        };
        self.next += 1;
        Some(literal)
    }
}

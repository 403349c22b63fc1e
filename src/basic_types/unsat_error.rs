use thiserror::Error;

/// The formula cannot be satisfied.
///
/// Raised by the model builder when a clause finalises to the empty clause,
/// and by [`crate::Propagator::resolve_or_unsat`] when a conflict is
/// irresolvable at the root level.
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
#[error("the formula is unsatisfiable")]
pub struct UnsatError;

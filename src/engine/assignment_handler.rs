use crate::basic_types::Literal;

/// Observer for assignment changes made while resolving conflicts.
///
/// The propagator reports every assignment it undoes or forces on levels at
/// or below the backjump target; the level whose decision caused the
/// conflict is rolled back silently (see
/// [`crate::Propagator::resolve_conflicts_with_handler`]).
///
/// Handlers must not re-enter the propagator.
pub trait AssignmentHandler {
    fn assignment_undone(&mut self, literal: Literal);

    fn assignment_forced(&mut self, literal: Literal);
}

/// Handler that ignores all notifications.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopAssignmentHandler;

impl AssignmentHandler for NoopAssignmentHandler {
    fn assignment_undone(&mut self, _literal: Literal) {}

    fn assignment_forced(&mut self, _literal: Literal) {}
}

mod clause_reference;
mod literal;
mod reason;
mod unsat_error;

pub use clause_reference::ClauseRef;
pub use literal::Literal;
pub use literal::Variable;
pub use reason::Reason;
pub use unsat_error::UnsatError;

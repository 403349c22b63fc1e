//! The public surface of the crate, re-exported from the crate root.

pub use crate::basic_types::ClauseRef;
pub use crate::basic_types::Literal;
pub use crate::basic_types::Reason;
pub use crate::basic_types::UnsatError;
pub use crate::basic_types::Variable;
pub use crate::containers::StampSet;
pub use crate::containers::StorageKey;
pub use crate::engine::AssignmentHandler;
pub use crate::engine::NoopAssignmentHandler;
pub use crate::engine::Propagator;
pub use crate::model_builder::ModelBuilder;
pub use crate::preprocessing::eliminate_subsumed;
pub use crate::preprocessing::ReducedLiteral;
pub use crate::preprocessing::ReducedModelExtractor;

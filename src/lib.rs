//! # Calabash
//! Calabash is a standalone Boolean-constraint propagator with
//! conflict-driven clause learning, meant to be embedded inside search
//! algorithms.
//!
//! The crate provides the reusable engine one calls to build a CNF formula,
//! push decisions onto a backtrackable trail, propagate all logical
//! consequences through two-watched-literal unit propagation, detect
//! conflicts, learn first-UIP conflict clauses and backjump. It
//! deliberately has no variable-selection heuristic, no restart policy and
//! no clause-database reduction: the driving search loop is the caller's.
//! A subsumption eliminator and a reduced-formula extractor round out the
//! toolbox for search procedures that restart from partial assignments.
//!
//! # Example
//!
//! ```rust
//! use calabash::{ModelBuilder, Propagator};
//!
//! # fn main() -> Result<(), calabash::UnsatError> {
//! let mut model = ModelBuilder::default();
//! let a = model.add_variable();
//! let b = model.add_variable();
//! let c = model.add_variable();
//! model.add_clause([!a, b])?; // a implies b
//! model.add_clause([!b, !c, a])?;
//!
//! let mut propagator = Propagator::new(&model);
//! assert!(propagator.push_level(a));
//! // the consequence b was propagated automatically
//! assert!(propagator.is_true(b));
//!
//! if propagator.push_level(c) || propagator.resolve_conflicts() {
//!     // continue searching below the current level
//! }
//! # Ok(())
//! # }
//! ```
pub(crate) mod basic_types;
pub(crate) mod calabash_asserts;
pub(crate) mod containers;
pub(crate) mod engine;
pub(crate) mod model_builder;
pub(crate) mod preprocessing;

// A private module with public re-exports, so that all exports from the API
// are exports directly from the crate.
//
// Example:
// `use calabash::Propagator;`
// vs.
// `use calabash::engine::Propagator;`
mod api;

pub use api::*;

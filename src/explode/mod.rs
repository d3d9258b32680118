//! The constrained dimension-combination explode engine.
//!
//! A row's dimensions are partitioned by an [`ExplodePolicy`], enumerated
//! into name subsets, expanded into XUnit descriptors, filtered, and
//! forwarded as canonical strings.

pub mod assembler;
pub mod combinations;
pub mod driver;
pub mod policy;

pub use assembler::{assemble, expand_subset, Assembly};
pub use combinations::{combinations, generate_subsets, n_choose_r, CombinationRequest, DimSet};
pub use driver::{Collector, Counter, Explosion, Exploder, RowContext, GLOBAL_UNIT};
pub use policy::{ExplodeMode, ExplodePlan, ExplodePolicy, SpamState, SHALLOW_DEPTH};

//! # XUnit
//!
//! Constrained dimension-combination explode engine.
//!
//! ## Architecture
//!
//! Each row carries a set of categorical segmentation dimensions. The engine
//! enumerates the valid combinations of those dimensions and serializes each
//! one into a canonical multi-dimensional segment key (an "XUnit") for
//! downstream grouping:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                Row (JSON / Dimension list)               │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [policy]
//! ┌─────────────────────────────────────────────────────────┐
//! │     ExplodePlan (required / optional / custom tiers)     │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [combinations]
//! ┌─────────────────────────────────────────────────────────┐
//! │              Dimension-name subsets (DimSet)             │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [assembler]
//! ┌─────────────────────────────────────────────────────────┐
//! │        XUnitDesc (one YPath per dimension, sorted)       │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [inclusion filter]
//! ┌─────────────────────────────────────────────────────────┐
//! │        "/age/bucket=25-34,/event/e=meetme", "/G"         │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use xunit::explode::{Exploder, ExplodePolicy};
//! use xunit::model::Dimension;
//!
//! let dims = vec![Dimension::single("adim", "alpha", "a")];
//! let explosion = Exploder::new(ExplodePolicy::Constrained)
//!     .explode(&dims, 1, true)
//!     .unwrap();
//! assert_eq!(explosion.xunits, vec!["/G", "/adim/alpha=a"]);
//! ```

pub mod config;
pub mod error;
pub mod explode;
pub mod model;
pub mod row;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::config::{Settings, SettingsError};
    pub use crate::error::{ExplodeError, ExplodeResult};
    pub use crate::explode::{
        Collector, Counter, ExplodeMode, ExplodePolicy, Exploder, Explosion, GLOBAL_UNIT,
    };
    pub use crate::model::{Dimension, XUnitDesc, YPath};
    pub use crate::row::{parse_row, Row, RowError};
}

pub use error::{ExplodeError, ExplodeResult};
pub use explode::{ExplodePolicy, Exploder, Explosion};
pub use model::Dimension;

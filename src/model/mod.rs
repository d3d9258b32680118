//! Row data model: dimensions, their YPaths, and XUnit descriptors.

pub mod dimension;
pub mod xunit;
pub mod ypath;

pub use dimension::{
    describe_dimensions, Dimension, CUSTOM_DIM, EVENT_DIM, NONSPAMMER_PREFIX, SPAM_DIM,
    SPAM_VALIDATED,
};
pub use xunit::XUnitDesc;
pub use ypath::{YPath, YPaths};

// src/model/dimension.rs
use std::borrow::Cow;
use std::fmt;

use crate::error::{ExplodeError, ExplodeResult};
use crate::model::ypath::YPaths;

/// Dimension name that marks a row's event.
pub const EVENT_DIM: &str = "event";
/// Dimension name that carries the row's spam classification.
pub const SPAM_DIM: &str = "spam";
/// Dimension name shared by every custom segmentation dimension.
pub const CUSTOM_DIM: &str = "custom";
/// Spam value that unlocks deep combinations.
pub const SPAM_VALIDATED: &str = "nonspammer-validated";
/// Prefix shared by every non-spammer classification.
pub const NONSPAMMER_PREFIX: &str = "nonspammer";

/// One categorical segmentation axis of a row.
///
/// A dimension has one or more nested attribute levels, ordered from the
/// most general to the most specific, e.g. `geo` with
/// `continent=NA / country=USA / state=CA`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Dimension {
    name: String,
    attr_names: Vec<String>,
    attr_values: Vec<String>,
}

impl Dimension {
    /// Create a dimension, checking that names and values pair up.
    pub fn new(
        name: impl Into<String>,
        attr_names: Vec<String>,
        attr_values: Vec<String>,
    ) -> ExplodeResult<Self> {
        let name = name.into();
        if attr_names.is_empty() || attr_names.len() != attr_values.len() {
            return Err(ExplodeError::MalformedDimension {
                name,
                names: attr_names.len(),
                values: attr_values.len(),
            });
        }
        Ok(Self {
            name,
            attr_names,
            attr_values,
        })
    }

    /// Create a dimension with a single attribute level.
    pub fn single(
        name: impl Into<String>,
        attr_name: impl Into<String>,
        attr_value: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            attr_names: vec![attr_name.into()],
            attr_values: vec![attr_value.into()],
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attr_names(&self) -> &[String] {
        &self.attr_names
    }

    pub fn attr_values(&self) -> &[String] {
        &self.attr_values
    }

    /// Number of attribute levels (always at least one).
    pub fn levels(&self) -> usize {
        self.attr_names.len()
    }

    /// Value of the most general attribute level.
    pub fn first_value(&self) -> &str {
        &self.attr_values[0]
    }

    pub fn is_custom(&self) -> bool {
        self.name == CUSTOM_DIM
    }

    pub fn is_event(&self) -> bool {
        self.name == EVENT_DIM
    }

    pub fn is_spam(&self) -> bool {
        self.name == SPAM_DIM
    }

    /// Whether this is a spam dimension classifying the row as a non-spammer.
    pub fn is_nonspammer(&self) -> bool {
        self.is_spam() && self.first_value().starts_with(NONSPAMMER_PREFIX)
    }

    /// Key under which this dimension is stored in a row's dimension map.
    ///
    /// Custom dimensions may appear several times in one row, so their key
    /// is suffixed with the first attribute name.
    pub fn key(&self) -> Cow<'_, str> {
        if self.is_custom() {
            Cow::Owned(format!("{}{}", CUSTOM_DIM, self.attr_names[0]))
        } else {
            Cow::Borrowed(&self.name)
        }
    }

    /// The attribute-depth-truncated paths of this dimension, shallowest first.
    pub fn ypaths(&self) -> YPaths<'_> {
        YPaths::new(self)
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<{}>[{}]=[{}]",
            self.name,
            self.attr_names.join(", "),
            self.attr_values.join(", ")
        )
    }
}

/// Render a list of dimensions for diagnostics.
pub fn describe_dimensions<'a>(dims: impl IntoIterator<Item = &'a Dimension>) -> String {
    let parts: Vec<String> = dims.into_iter().map(|d| d.to_string()).collect();
    format!("[{}]", parts.join(","))
}

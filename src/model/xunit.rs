// src/model/xunit.rs
use std::cmp::Ordering;
use std::fmt;

use crate::model::dimension::Dimension;
use crate::model::ypath::YPath;

/// An immutable combination of YPaths, one per participating dimension.
///
/// The canonical form sorts the YPath strings before joining them with
/// `,`, so descriptors assembled in different orders compare equal.
#[derive(Debug, Clone)]
pub struct XUnitDesc<'a> {
    ypaths: Vec<YPath<'a>>,
}

impl<'a> XUnitDesc<'a> {
    pub fn from_ypath(ypath: YPath<'a>) -> Self {
        Self {
            ypaths: vec![ypath],
        }
    }

    /// New descriptor with `ypath` placed in front of the existing paths.
    pub fn prepend(&self, ypath: YPath<'a>) -> Self {
        let mut ypaths = Vec::with_capacity(self.ypaths.len() + 1);
        ypaths.push(ypath);
        ypaths.extend(self.ypaths.iter().cloned());
        Self { ypaths }
    }

    /// New descriptor with `ypath` appended after the existing paths.
    pub fn extend(&self, ypath: YPath<'a>) -> Self {
        let mut ypaths = self.ypaths.clone();
        ypaths.push(ypath);
        Self { ypaths }
    }

    pub fn num_dims(&self) -> usize {
        self.ypaths.len()
    }

    pub fn ypaths(&self) -> &[YPath<'a>] {
        &self.ypaths
    }

    pub fn dimensions(&self) -> impl Iterator<Item = &'a Dimension> + '_ {
        self.ypaths.iter().map(|yp| yp.dimension())
    }

    pub fn has_custom(&self) -> bool {
        self.dimensions().any(Dimension::is_custom)
    }

    pub fn has_event(&self) -> bool {
        self.dimensions().any(Dimension::is_event)
    }

    /// The spam dimension participating in this combination, if any.
    pub fn spam(&self) -> Option<&'a Dimension> {
        self.dimensions().find(|d| d.is_spam())
    }

    /// Sorted, comma-joined YPath strings.
    pub fn canonical(&self) -> String {
        let mut sorted: Vec<&str> = self.ypaths.iter().map(YPath::as_str).collect();
        sorted.sort_unstable();
        sorted.join(",")
    }
}

impl PartialEq for XUnitDesc<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.canonical() == other.canonical()
    }
}

impl Eq for XUnitDesc<'_> {}

impl PartialOrd for XUnitDesc<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for XUnitDesc<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.canonical().cmp(&other.canonical())
    }
}

impl fmt::Display for XUnitDesc<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}

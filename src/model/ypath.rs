// src/model/ypath.rs
use std::cmp::Ordering;
use std::fmt;

use crate::model::dimension::Dimension;

/// One dimension truncated to a chosen attribute depth.
///
/// Renders as `/{dim}/{name_1}={value_1}/{name_2}={value_2}...` up to
/// `depth` levels. Ordering and equality follow the rendered path.
#[derive(Debug, Clone)]
pub struct YPath<'a> {
    dimension: &'a Dimension,
    depth: usize,
    path: String,
}

impl<'a> YPath<'a> {
    pub fn dimension(&self) -> &'a Dimension {
        self.dimension
    }

    /// Number of attribute levels included, starting at 1.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn as_str(&self) -> &str {
        &self.path
    }
}

impl PartialEq for YPath<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

impl Eq for YPath<'_> {}

impl PartialOrd for YPath<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for YPath<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.path.cmp(&other.path)
    }
}

impl fmt::Display for YPath<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

/// Iterator over the YPaths of one dimension, shallowest first.
///
/// Each path extends the previous one by a single attribute level, so the
/// rendered prefix is carried forward instead of being rebuilt. Calling
/// [`Dimension::ypaths`] again restarts the sequence.
#[derive(Debug, Clone)]
pub struct YPaths<'a> {
    dimension: &'a Dimension,
    depth: usize,
    prefix: String,
}

impl<'a> YPaths<'a> {
    pub(crate) fn new(dimension: &'a Dimension) -> Self {
        Self {
            dimension,
            depth: 0,
            prefix: format!("/{}", dimension.name()),
        }
    }
}

impl<'a> Iterator for YPaths<'a> {
    type Item = YPath<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let names = self.dimension.attr_names();
        let values = self.dimension.attr_values();
        if self.depth >= names.len() || self.depth >= values.len() {
            return None;
        }

        self.prefix.push('/');
        self.prefix.push_str(&names[self.depth]);
        self.prefix.push('=');
        self.prefix.push_str(&values[self.depth]);
        self.depth += 1;

        Some(YPath {
            dimension: self.dimension,
            depth: self.depth,
            path: self.prefix.clone(),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.dimension.levels().saturating_sub(self.depth);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for YPaths<'_> {}

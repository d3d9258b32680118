// src/explode/combinations.rs
//! Enumeration of dimension-name subsets.
//!
//! An XUnit draws on at most `max_depth` of the row's dimensions, so the
//! candidate subsets at depth `d` are the `nCr(n, d)` ways to pick from the
//! optional dimensions, shifted by whatever is required. With 11 optional
//! dimensions and a depth of 2 that is `11 + 55 = 66` subsets; the full
//! power set would be 2048. Subsets are therefore generated directly at
//! each target size instead of being filtered out of a larger family.

use std::collections::BTreeSet;

use tracing::debug;

use crate::error::{ExplodeError, ExplodeResult};

/// A set of dimension keys, ordered for deterministic iteration.
#[derive(Hash, Eq, PartialEq, Ord, PartialOrd, Clone, Debug, Default)]
pub struct DimSet {
    dims: BTreeSet<String>,
}

impl DimSet {
    pub fn new(dims: BTreeSet<String>) -> Self {
        Self { dims }
    }

    pub fn from_vec(dims: Vec<String>) -> Self {
        Self {
            dims: dims.into_iter().collect(),
        }
    }

    pub fn single(dim: &str) -> Self {
        let mut dims = BTreeSet::new();
        dims.insert(dim.to_string());
        Self { dims }
    }

    pub fn size(&self) -> usize {
        self.dims.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dims.is_empty()
    }

    pub fn contains(&self, dim: &str) -> bool {
        self.dims.contains(dim)
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.dims.iter()
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.dims.iter().cloned().collect()
    }

    pub fn insert(&mut self, dim: impl Into<String>) -> bool {
        self.dims.insert(dim.into())
    }

    pub fn remove(&mut self, dim: &str) -> bool {
        self.dims.remove(dim)
    }

    /// A copy of this set with `dim` added.
    pub fn with(&self, dim: &str) -> Self {
        let mut next = self.clone();
        next.insert(dim);
        next
    }

    /// Members of this set that are not in `other`.
    pub fn difference(&self, other: &DimSet) -> Self {
        Self {
            dims: self.dims.difference(&other.dims).cloned().collect(),
        }
    }
}

impl<S: Into<String>> FromIterator<S> for DimSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            dims: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Generate all subsets of the given size from a list of dimension keys.
///
/// Size 0 yields the single empty subset.
pub fn generate_subsets(dims: &[String], size: usize) -> Vec<DimSet> {
    if size > dims.len() {
        return vec![];
    }

    let mut result = Vec::new();
    let mut current = Vec::with_capacity(size);
    generate_subsets_helper(dims, size, 0, &mut current, &mut result);
    result
}

fn generate_subsets_helper(
    dims: &[String],
    size: usize,
    start: usize,
    current: &mut Vec<String>,
    result: &mut Vec<DimSet>,
) {
    if current.len() == size {
        result.push(DimSet::from_vec(current.clone()));
        return;
    }

    // Stop early once too few dims remain to fill the subset.
    let needed = size - current.len();
    for i in start..=(dims.len() - needed) {
        current.push(dims[i].clone());
        generate_subsets_helper(dims, size, i + 1, current, result);
        current.pop();
    }
}

/// Binomial coefficient `nCr`, saturating at `usize::MAX`.
pub fn n_choose_r(n: usize, r: usize) -> usize {
    if r > n {
        return 0;
    }
    let r = r.min(n - r);
    let mut acc: u128 = 1;
    for i in 0..r {
        // acc * (n - i) is always divisible by i + 1.
        match acc.checked_mul((n - i) as u128) {
            Some(product) => acc = product / (i as u128 + 1),
            None => return usize::MAX,
        }
    }
    usize::try_from(acc).unwrap_or(usize::MAX)
}

/// The partition of a row's dimensions for one combination pass.
///
/// Every generated subset contains all of `required`, zero or more of
/// `optional`, and at most one of `custom`. Non-custom subsets have a size
/// in `[min_depth, max_depth]`; subsets holding a custom dimension may go
/// one deeper, unless `max_depth` is zero.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CombinationRequest {
    pub required: DimSet,
    pub optional: DimSet,
    pub custom: DimSet,
    pub min_depth: usize,
    pub max_depth: usize,
}

impl CombinationRequest {
    pub fn new(min_depth: usize, max_depth: usize) -> Self {
        Self {
            min_depth,
            max_depth,
            ..Default::default()
        }
    }

    pub fn with_required(mut self, required: DimSet) -> Self {
        self.required = required;
        self
    }

    pub fn with_optional(mut self, optional: DimSet) -> Self {
        self.optional = optional;
        self
    }

    pub fn with_custom(mut self, custom: DimSet) -> Self {
        self.custom = custom;
        self
    }

    /// Number of subsets [`combinations`] will produce for this request.
    pub fn expected_count(&self) -> usize {
        let optional = self.optional_pool().size();
        let custom = self.custom.difference(&self.required).size();
        let required = self.required.size();

        let plain: usize = self
            .depth_range(required, self.max_depth)
            .map(|d| n_choose_r(optional, d - required))
            .sum();
        let per_custom: usize = self
            .depth_range(required + 1, self.custom_depth())
            .map(|d| n_choose_r(optional, d - required - 1))
            .sum();

        plain + custom * per_custom
    }

    fn optional_pool(&self) -> DimSet {
        self.optional
            .difference(&self.required)
            .difference(&self.custom)
    }

    /// Deepest level a subset holding a custom dimension may reach. A zero
    /// budget stays zero.
    pub fn custom_depth(&self) -> usize {
        if self.max_depth == 0 {
            0
        } else {
            self.max_depth + 1
        }
    }

    fn depth_range(&self, root: usize, max: usize) -> std::ops::RangeInclusive<usize> {
        self.min_depth.max(root).max(1)..=max
    }
}

/// Enumerate the dimension subsets described by `request`.
///
/// Returns [`ExplodeError::UnsatisfiableDepth`] when the required
/// dimensions alone exceed `max_depth`.
pub fn combinations(request: &CombinationRequest) -> ExplodeResult<BTreeSet<DimSet>> {
    let required = &request.required;
    if required.size() > request.max_depth {
        return Err(ExplodeError::UnsatisfiableDepth {
            required: required.size(),
            max_depth: request.max_depth,
        });
    }

    let optional = request.optional_pool().to_vec();
    let mut result = BTreeSet::new();

    extend_rooted(
        &mut result,
        required,
        &optional,
        request.depth_range(required.size(), request.max_depth),
    );

    // Each custom dim stands in as one extra required member, one level
    // past the regular bound. Other customs never join it.
    for custom in request.custom.difference(required).iter() {
        let root = required.with(custom);
        debug!(custom = %custom, "generating custom combinations");
        extend_rooted(
            &mut result,
            &root,
            &optional,
            request.depth_range(root.size(), request.custom_depth()),
        );
    }

    debug!(
        required = required.size(),
        optional = optional.len(),
        custom = request.custom.size(),
        subsets = result.len(),
        "enumerated dimension combinations"
    );
    Ok(result)
}

fn extend_rooted(
    result: &mut BTreeSet<DimSet>,
    root: &DimSet,
    optional: &[String],
    depths: std::ops::RangeInclusive<usize>,
) {
    for depth in depths {
        for picked in generate_subsets(optional, depth - root.size()) {
            let mut combo = root.clone();
            for dim in picked.iter() {
                combo.insert(dim.as_str());
            }
            result.insert(combo);
        }
    }
}

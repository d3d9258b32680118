// src/explode/assembler.rs
//! Expansion of dimension subsets into concrete XUnit descriptors.
//!
//! A subset `{geo, age}` where `geo` has three attribute levels and `age`
//! has one yields `3 * 1` descriptors, one per choice of specificity.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, warn};

use crate::error::{ExplodeError, ExplodeResult};
use crate::explode::combinations::DimSet;
use crate::model::{Dimension, XUnitDesc};

/// Result of assembling every subset for one row.
#[derive(Debug, Default)]
pub struct Assembly<'a> {
    /// Descriptors keyed by canonical string; equivalent ones collapse.
    pub xunits: BTreeMap<String, XUnitDesc<'a>>,
    /// Descriptors built before de-duplication.
    pub generated: usize,
    /// Candidates dropped because of a transient error.
    pub skipped: usize,
}

impl<'a> Assembly<'a> {
    pub fn len(&self) -> usize {
        self.xunits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.xunits.is_empty()
    }
}

/// Assemble every subset, skipping candidates that fail with a transient
/// error. Fatal errors are returned.
pub fn assemble<'a>(
    subsets: &BTreeSet<DimSet>,
    dims: &BTreeMap<String, &'a Dimension>,
) -> ExplodeResult<Assembly<'a>> {
    let mut assembly = Assembly::default();

    for subset in subsets {
        debug!(subset = ?subset.to_vec(), "generating xunits");
        match expand_subset(subset, dims) {
            Ok(xunits) => {
                assembly.generated += xunits.len();
                for xunit in xunits {
                    assembly.xunits.entry(xunit.canonical()).or_insert(xunit);
                }
            }
            Err(err) if err.is_transient() => {
                warn!(subset = ?subset.to_vec(), error = %err, "skipping combination candidate");
                assembly.skipped += 1;
            }
            Err(err) => return Err(err),
        }
    }

    debug!(
        generated = assembly.generated,
        distinct = assembly.xunits.len(),
        skipped = assembly.skipped,
        "assembled xunits"
    );
    Ok(assembly)
}

/// Cartesian expansion of one subset's YPaths.
pub fn expand_subset<'a>(
    subset: &DimSet,
    dims: &BTreeMap<String, &'a Dimension>,
) -> ExplodeResult<Vec<XUnitDesc<'a>>> {
    let structs = subset
        .iter()
        .map(|key| {
            dims.get(key)
                .copied()
                .ok_or_else(|| ExplodeError::UnknownDimension(key.clone()))
        })
        .collect::<ExplodeResult<Vec<_>>>()?;

    expand(&structs)
}

/// Peel off the first dimension and pair each of its YPaths with every
/// descriptor built from the rest.
fn expand<'a>(structs: &[&'a Dimension]) -> ExplodeResult<Vec<XUnitDesc<'a>>> {
    let (&first, rest) = structs.split_first().ok_or(ExplodeError::EmptyCandidate)?;

    if rest.is_empty() {
        return Ok(first.ypaths().map(XUnitDesc::from_ypath).collect());
    }

    let tails = expand(rest)?;
    let ypaths: Vec<_> = first.ypaths().collect();
    let mut xunits = Vec::with_capacity(tails.len() * ypaths.len());
    for tail in &tails {
        for ypath in &ypaths {
            xunits.push(tail.prepend(ypath.clone()));
        }
    }
    Ok(xunits)
}

// src/explode/driver.rs
//! Row driver: turns one row's dimensions into canonical XUnit strings.
//!
//! ```text
//! dims → RowContext → ExplodePlan → combinations → assemble → include → Collector
//! ```
//!
//! Every per-row value lives in a [`RowContext`] built on the stack for the
//! call, so one [`Exploder`] can be shared freely between threads.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use tracing::{debug, warn};

use crate::config::Settings;
use crate::error::{ExplodeError, ExplodeResult};
use crate::explode::assembler::assemble;
use crate::explode::combinations::{combinations, DimSet};
use crate::explode::policy::{ExplodeMode, ExplodePlan, ExplodePolicy, SpamState};
use crate::model::{describe_dimensions, Dimension, SPAM_DIM, SPAM_VALIDATED};

/// Reserved key forwarded once per row in global mode.
pub const GLOBAL_UNIT: &str = "/G";

/// Counters reported once per row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Counter {
    /// XUnits forwarded to the collector.
    Exploded,
    /// XUnits generated but rejected by the inclusion filter.
    Filtered,
    /// Combination candidates dropped on a transient error.
    Skipped,
}

impl Counter {
    pub fn name(&self) -> &'static str {
        match self {
            Counter::Exploded => "NumXUnitsExploded",
            Counter::Filtered => "NumXUnitsFiltered",
            Counter::Skipped => "NumXUnitsSkipped",
        }
    }
}

/// Receives the output of one exploded row.
pub trait Collector {
    fn forward(&mut self, xunit: &str);

    fn incr_counter(&mut self, counter: Counter, by: u64);
}

/// Collected output of one row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Explosion {
    /// Forwarded keys in canonical order, the sentinel first when present.
    pub xunits: Vec<String>,
    pub emitted: u64,
    pub filtered: u64,
    pub skipped: u64,
}

impl Explosion {
    pub fn contains(&self, xunit: &str) -> bool {
        self.xunits.iter().any(|x| x == xunit)
    }

    pub fn len(&self) -> usize {
        self.xunits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.xunits.is_empty()
    }

    /// Forwarded keys as a set.
    pub fn to_set(&self) -> BTreeSet<String> {
        self.xunits.iter().cloned().collect()
    }
}

impl Collector for Explosion {
    fn forward(&mut self, xunit: &str) {
        self.xunits.push(xunit.to_string());
    }

    fn incr_counter(&mut self, counter: Counter, by: u64) {
        match counter {
            Counter::Exploded => self.emitted += by,
            Counter::Filtered => self.filtered += by,
            Counter::Skipped => self.skipped += by,
        }
    }
}

/// Per-row inputs, built fresh for every call.
#[derive(Debug, Clone)]
pub struct RowContext<'a> {
    dims: BTreeMap<String, &'a Dimension>,
    max_dims: usize,
    mode: ExplodeMode,
    spam: SpamState,
}

impl<'a> RowContext<'a> {
    pub fn new(dims: &'a [Dimension], max_dims: usize, global: bool) -> Self {
        let mut map: BTreeMap<String, &'a Dimension> = BTreeMap::new();
        for dim in dims {
            match map.entry(dim.key().into_owned()) {
                Entry::Vacant(slot) => {
                    slot.insert(dim);
                }
                Entry::Occupied(mut slot) => {
                    // Keep the smallest rendering so the winner does not depend
                    // on input order.
                    let (kept, dropped) = if dim.to_string() < slot.get().to_string() {
                        (dim, slot.insert(dim))
                    } else {
                        (*slot.get(), dim)
                    };
                    if kept != dropped {
                        warn!(kept = %kept, dropped = %dropped, "duplicate dimension key");
                    }
                }
            }
        }

        let spam = match map.get(SPAM_DIM) {
            None => SpamState::Absent,
            Some(spam) if spam.first_value() == SPAM_VALIDATED => SpamState::Validated,
            Some(_) => SpamState::Unvalidated,
        };

        Self {
            dims: map,
            max_dims,
            mode: ExplodeMode::from_global_flag(global),
            spam,
        }
    }

    pub fn dimensions(&self) -> &BTreeMap<String, &'a Dimension> {
        &self.dims
    }

    pub fn contains(&self, key: &str) -> bool {
        self.dims.contains_key(key)
    }

    pub fn max_dims(&self) -> usize {
        self.max_dims
    }

    pub fn mode(&self) -> ExplodeMode {
        self.mode
    }

    pub fn spam(&self) -> SpamState {
        self.spam
    }

    pub fn all_keys(&self) -> DimSet {
        self.dims.keys().cloned().collect()
    }

    pub fn non_custom_keys(&self) -> DimSet {
        self.keys_where(|d| !d.is_custom())
    }

    pub fn custom_keys(&self) -> DimSet {
        self.keys_where(Dimension::is_custom)
    }

    fn keys_where(&self, pred: impl Fn(&Dimension) -> bool) -> DimSet {
        self.dims
            .iter()
            .filter(|(_, d)| pred(**d))
            .map(|(k, _)| k.clone())
            .collect()
    }
}

/// The explode engine, parameterized by an [`ExplodePolicy`].
#[derive(Debug, Clone)]
pub struct Exploder {
    policy: ExplodePolicy,
    sentinel: String,
}

impl Default for Exploder {
    fn default() -> Self {
        Self::new(ExplodePolicy::default())
    }
}

impl Exploder {
    pub fn new(policy: ExplodePolicy) -> Self {
        Self {
            policy,
            sentinel: GLOBAL_UNIT.to_string(),
        }
    }

    /// Replace the global sentinel key.
    pub fn with_sentinel(mut self, sentinel: impl Into<String>) -> ExplodeResult<Self> {
        let sentinel = sentinel.into();
        validate_sentinel(&sentinel)?;
        self.sentinel = sentinel;
        Ok(self)
    }

    pub fn from_settings(settings: &Settings) -> ExplodeResult<Self> {
        settings.validate()?;
        Self::new(settings.explode.policy).with_sentinel(settings.explode.sentinel.clone())
    }

    pub fn policy(&self) -> ExplodePolicy {
        self.policy
    }

    pub fn sentinel(&self) -> &str {
        &self.sentinel
    }

    /// Explode one row and collect its output.
    pub fn explode(
        &self,
        dims: &[Dimension],
        max_dims: usize,
        global: bool,
    ) -> ExplodeResult<Explosion> {
        let mut explosion = Explosion::default();
        self.explode_into(dims, max_dims, global, &mut explosion)?;
        Ok(explosion)
    }

    /// Explode one row, forwarding every emitted key to `collector`.
    ///
    /// Nothing is forwarded when the row fails with a fatal error.
    pub fn explode_into<C: Collector + ?Sized>(
        &self,
        dims: &[Dimension],
        max_dims: usize,
        global: bool,
        collector: &mut C,
    ) -> ExplodeResult<()> {
        let ctx = RowContext::new(dims, max_dims, global);
        let plan = self.policy.plan(&ctx).map_err(|err| {
            warn!(row = %describe_dimensions(dims), error = %err, "cannot explode row");
            err
        })?;

        let subsets = plan_subsets(&plan)?;
        let assembly = assemble(&subsets, ctx.dimensions())?;

        if ctx.mode() == ExplodeMode::Global {
            collector.forward(&self.sentinel);
        }

        let mut emitted = 0u64;
        let mut filtered = 0u64;
        for (key, xunit) in &assembly.xunits {
            if self.policy.include(xunit, ctx.mode(), &plan) {
                collector.forward(key);
                emitted += 1;
            } else {
                if self.policy == ExplodePolicy::Constrained {
                    warn!(xunit = %key, "unexpected filter kick-in");
                } else {
                    debug!(xunit = %key, "filtered xunit");
                }
                filtered += 1;
            }
        }

        collector.incr_counter(Counter::Exploded, emitted);
        collector.incr_counter(Counter::Filtered, filtered);
        collector.incr_counter(Counter::Skipped, assembly.skipped as u64);
        Ok(())
    }
}

fn plan_subsets(plan: &ExplodePlan) -> ExplodeResult<BTreeSet<DimSet>> {
    let mut subsets = BTreeSet::new();
    for request in &plan.requests {
        subsets.extend(combinations(request)?);
    }
    Ok(subsets)
}

/// A sentinel must be non-empty and must not look like a YPath.
pub(crate) fn validate_sentinel(sentinel: &str) -> ExplodeResult<()> {
    if sentinel.is_empty() {
        return Err(ExplodeError::Configuration(
            "global sentinel must not be empty".to_string(),
        ));
    }
    if looks_like_ypath(sentinel) {
        return Err(ExplodeError::Configuration(format!(
            "global sentinel '{}' collides with the ypath grammar",
            sentinel
        )));
    }
    Ok(())
}

// Attribute values are not escaped, so anything rooted at `/` that carries
// an `=` can be produced by some row.
fn looks_like_ypath(s: &str) -> bool {
    s.starts_with('/') && s.contains('=')
}

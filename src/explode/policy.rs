// src/explode/policy.rs
//! Explode policies: how a row is partitioned into combination requests,
//! and which assembled XUnits are allowed through.
//!
//! | mode         | spam                | required       | bound              |
//! |--------------|---------------------|----------------|--------------------|
//! | global       | validated           | `{spam}`       | `max_dims`         |
//! | global       | absent / unvalidated| `{}`           | `min(max_dims, 2)` |
//! | event-scoped | absent              | `{event}`      | `max_dims`         |
//! | event-scoped | validated           | `{event,spam}` | `max_dims`         |
//! | event-scoped | unvalidated         | `{event}`      | `min(max_dims, 2)` |
//!
//! Custom dimensions never count as optional: each one is tried alone on
//! top of the required set and may reach one level past the bound.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ExplodeError, ExplodeResult};
use crate::explode::combinations::{CombinationRequest, DimSet};
use crate::explode::driver::RowContext;
use crate::model::{XUnitDesc, EVENT_DIM, SPAM_DIM};

/// Depth used for rows whose spam state does not unlock deep combinations.
pub const SHALLOW_DEPTH: usize = 2;

/// Whether a row is exploded aggregate-wide or scoped to its event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExplodeMode {
    /// Aggregate-wide (DAU-style) explode.
    Global,
    /// Explode anchored on the row's event dimension.
    EventScoped,
}

impl ExplodeMode {
    pub fn from_global_flag(global: bool) -> Self {
        if global {
            ExplodeMode::Global
        } else {
            ExplodeMode::EventScoped
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ExplodeMode::Global => "global",
            ExplodeMode::EventScoped => "event-scoped",
        }
    }
}

impl fmt::Display for ExplodeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Spam classification found on a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpamState {
    Absent,
    Validated,
    Unvalidated,
}

/// The combination requests for one row and the depth they are held to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplodePlan {
    pub requests: Vec<CombinationRequest>,
    /// Effective bound before any custom-dimension allowance.
    pub bound: usize,
}

impl ExplodePlan {
    /// Bound that applies to one particular XUnit. A zero bound admits
    /// nothing, customs included.
    pub fn bound_for(&self, xunit: &XUnitDesc<'_>) -> usize {
        if self.bound == 0 {
            return 0;
        }
        self.bound + usize::from(xunit.has_custom())
    }
}

/// Selects the partition rule and inclusion predicate used by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExplodePolicy {
    /// Depth-constrained explode with required, optional and custom tiers.
    #[default]
    Constrained,
    /// Blind explode to `max_dims`, filtered on event and spam markers.
    Marker,
}

impl ExplodePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExplodePolicy::Constrained => "constrained",
            ExplodePolicy::Marker => "marker",
        }
    }

    /// Partition the row's dimensions into combination requests.
    pub fn plan(&self, ctx: &RowContext<'_>) -> ExplodeResult<ExplodePlan> {
        if ctx.mode() == ExplodeMode::EventScoped && !ctx.contains(EVENT_DIM) {
            return Err(ExplodeError::MissingRequiredDimension {
                mode: ctx.mode().as_str(),
                dimension: EVENT_DIM,
            });
        }

        let plan = match self {
            ExplodePolicy::Constrained => constrained_plan(ctx),
            ExplodePolicy::Marker => ExplodePlan {
                requests: vec![CombinationRequest::new(1, ctx.max_dims())
                    .with_optional(ctx.all_keys())],
                bound: ctx.max_dims(),
            },
        };
        debug!(
            policy = self.as_str(),
            mode = %ctx.mode(),
            bound = plan.bound,
            requests = plan.requests.len(),
            "planned row explode"
        );
        Ok(plan)
    }

    /// Decide whether an assembled XUnit is emitted.
    pub fn include(&self, xunit: &XUnitDesc<'_>, mode: ExplodeMode, plan: &ExplodePlan) -> bool {
        let num_dims = xunit.num_dims();
        match self {
            ExplodePolicy::Constrained => num_dims <= plan.bound_for(xunit),
            ExplodePolicy::Marker => {
                if num_dims > plan.bound {
                    return false;
                }
                let nonspammer = xunit.spam().is_some_and(|spam| spam.is_nonspammer());
                match mode {
                    ExplodeMode::Global => num_dims <= 1 || nonspammer,
                    ExplodeMode::EventScoped => match num_dims {
                        0 => false,
                        1 => xunit.has_event(),
                        2 => xunit.has_event() && xunit.spam().is_some(),
                        _ => xunit.has_event() && nonspammer,
                    },
                }
            }
        }
    }
}

impl fmt::Display for ExplodePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExplodePolicy {
    type Err = ExplodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "constrained" => Ok(ExplodePolicy::Constrained),
            "marker" | "mm" => Ok(ExplodePolicy::Marker),
            other => Err(ExplodeError::Configuration(format!(
                "unknown explode policy '{}'",
                other
            ))),
        }
    }
}

fn constrained_plan(ctx: &RowContext<'_>) -> ExplodePlan {
    let max_dims = ctx.max_dims();
    let shallow = max_dims.min(SHALLOW_DEPTH);
    let optional = ctx.non_custom_keys();
    let custom = ctx.custom_keys();

    match ctx.mode() {
        ExplodeMode::Global => {
            let mut requests = vec![CombinationRequest::new(1, shallow)
                .with_optional(optional.clone())
                .with_custom(custom.clone())];

            if ctx.spam() == SpamState::Validated {
                requests.push(
                    CombinationRequest::new(1, max_dims)
                        .with_required(DimSet::single(SPAM_DIM))
                        .with_optional(optional)
                        .with_custom(custom),
                );
                ExplodePlan {
                    requests,
                    bound: max_dims,
                }
            } else {
                ExplodePlan {
                    requests,
                    bound: shallow,
                }
            }
        }
        ExplodeMode::EventScoped => {
            let event = DimSet::single(EVENT_DIM);
            match ctx.spam() {
                SpamState::Validated => {
                    let required = event.with(SPAM_DIM);
                    ExplodePlan {
                        requests: vec![
                            // The event alone is always reported.
                            CombinationRequest::new(1, 1).with_required(event),
                            CombinationRequest::new(required.size(), max_dims)
                                .with_required(required)
                                .with_optional(optional)
                                .with_custom(custom),
                        ],
                        bound: max_dims,
                    }
                }
                SpamState::Absent | SpamState::Unvalidated => {
                    let bound = if ctx.spam() == SpamState::Absent {
                        max_dims
                    } else {
                        shallow
                    };
                    ExplodePlan {
                        requests: vec![CombinationRequest::new(1, bound)
                            .with_required(event)
                            .with_optional(optional)
                            .with_custom(custom)],
                        bound,
                    }
                }
            }
        }
    }
}

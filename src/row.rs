//! JSON row input.
//!
//! A row is either an object
//!
//! ```json
//! {"dims": [{"dim": "event", "attr_names": ["e"], "attr_values": ["meetme"]}],
//!  "max_dims": 3, "global": false}
//! ```
//!
//! or the positional argument list `[dims, max_dims, global]`, where the
//! last two entries may be omitted. Missing values fall back to settings.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::config::ExplodeSettings;
use crate::error::{ExplodeError, ExplodeResult};
use crate::explode::{Collector, Counter, Explosion, Exploder};
use crate::model::Dimension;

/// Errors raised while reading a row.
#[derive(Debug, thiserror::Error)]
pub enum RowError {
    #[error("Failed to parse row: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid argument list: {0}")]
    Arguments(String),

    #[error(transparent)]
    Explode(#[from] ExplodeError),
}

/// Wire form of a dimension struct.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct DimensionRecord {
    pub dim: String,
    #[serde(default)]
    pub attr_names: Vec<String>,
    #[serde(default)]
    pub attr_values: Vec<String>,
}

impl TryFrom<DimensionRecord> for Dimension {
    type Error = ExplodeError;

    fn try_from(record: DimensionRecord) -> Result<Self, Self::Error> {
        Dimension::new(record.dim, record.attr_names, record.attr_values)
    }
}

impl From<&Dimension> for DimensionRecord {
    fn from(dim: &Dimension) -> Self {
        Self {
            dim: dim.name().to_string(),
            attr_names: dim.attr_names().to_vec(),
            attr_values: dim.attr_values().to_vec(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RowInput {
    Positional(Vec<Value>),
    Named {
        dims: Vec<DimensionRecord>,
        #[serde(default)]
        max_dims: Option<usize>,
        #[serde(default)]
        global: Option<bool>,
    },
}

/// One parsed row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    pub dims: Vec<Dimension>,
    pub max_dims: Option<usize>,
    pub global: Option<bool>,
    /// Dimension structs dropped because their levels did not pair up.
    pub malformed: usize,
}

impl Row {
    /// Explode this row, filling unset values from `defaults`.
    pub fn explode(
        &self,
        exploder: &Exploder,
        defaults: &ExplodeSettings,
    ) -> ExplodeResult<Explosion> {
        let mut explosion = exploder.explode(
            &self.dims,
            self.max_dims.unwrap_or(defaults.max_dims),
            self.global.unwrap_or(defaults.global),
        )?;
        explosion.incr_counter(Counter::Skipped, self.malformed as u64);
        Ok(explosion)
    }
}

/// Parse one JSON row.
pub fn parse_row(line: &str) -> Result<Row, RowError> {
    match serde_json::from_str::<RowInput>(line)? {
        RowInput::Named {
            dims,
            max_dims,
            global,
        } => Ok(build_row(dims, max_dims, global)),
        RowInput::Positional(args) => parse_positional(args),
    }
}

fn parse_positional(args: Vec<Value>) -> Result<Row, RowError> {
    if args.is_empty() || args.len() > 3 {
        return Err(RowError::Arguments(format!(
            "expected 1 to 3 arguments, got {}",
            args.len()
        )));
    }

    let mut args = args.into_iter();
    let dims = match args.next() {
        Some(value @ Value::Array(_)) => serde_json::from_value::<Vec<DimensionRecord>>(value)?,
        _ => {
            return Err(RowError::Arguments(
                "first argument must be an array of dimension structs".to_string(),
            ))
        }
    };
    let max_dims = match args.next() {
        None => None,
        Some(value) => Some(
            value
                .as_u64()
                .and_then(|n| usize::try_from(n).ok())
                .ok_or_else(|| {
                    RowError::Arguments(format!(
                        "second argument must be a non-negative integer, got {}",
                        value
                    ))
                })?,
        ),
    };
    let global = match args.next() {
        None => None,
        Some(Value::Bool(flag)) => Some(flag),
        Some(other) => {
            return Err(RowError::Arguments(format!(
                "third argument must be a boolean, got {}",
                other
            )))
        }
    };

    Ok(build_row(dims, max_dims, global))
}

fn build_row(records: Vec<DimensionRecord>, max_dims: Option<usize>, global: Option<bool>) -> Row {
    let mut row = Row {
        max_dims,
        global,
        ..Default::default()
    };
    for record in records {
        match Dimension::try_from(record) {
            Ok(dim) => row.dims.push(dim),
            Err(err) => {
                warn!(error = %err, "skipping malformed dimension");
                row.malformed += 1;
            }
        }
    }
    row
}

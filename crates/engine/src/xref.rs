//! Bounded cross-reference expansion over call records.

use anyhow::Result;
use ir::{CallRecord, ProgramModel};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Calls into the classes of the frontier.
    To,
    /// Calls made by the classes the frontier calls.
    From,
}

impl Direction {
    /// Class of `call` that seeds the next query.
    pub fn frontier_class(self, call: &CallRecord) -> &str {
        match self {
            Direction::To => &call.from_class,
            Direction::From => &call.to_class,
        }
    }

    /// Class of `call` compared against the queried set.
    pub fn queried_class(self, call: &CallRecord) -> &str {
        match self {
            Direction::To => &call.to_class,
            Direction::From => &call.from_class,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Direction::To => "to",
            Direction::From => "from",
        })
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "to" => Ok(Direction::To),
            "from" => Ok(Direction::From),
            other => Err(format!("unknown direction '{other}', expected 'to' or 'from'")),
        }
    }
}

/// Query interface consumed by [`xref_calls`].
pub trait CallIndex {
    /// All calls whose [`Direction::queried_class`] is in `classes`.
    fn calls_touching(
        &self,
        classes: &BTreeSet<String>,
        direction: Direction,
    ) -> Result<Vec<CallRecord>>;
}

impl CallIndex for ProgramModel {
    fn calls_touching(
        &self,
        classes: &BTreeSet<String>,
        direction: Direction,
    ) -> Result<Vec<CallRecord>> {
        Ok(self
            .iter()
            .flat_map(|c| c.calls())
            .filter(|call| classes.contains(direction.queried_class(call)))
            .cloned()
            .collect())
    }
}

/// Expands `seed` up to `max_depth` times.
///
/// Each iteration collects the distinct frontier classes and asks `index`
/// for the calls touching them. An empty expansion stops the loop and the
/// last non-empty frontier is returned, so `max_depth == 0` or a first
/// iteration with no results yields `seed` unchanged.
///
/// # Example
/// ```
/// use engine::{xref_calls, Direction};
/// use ir::ProgramModel;
/// let model = ProgramModel::new();
/// let out = xref_calls(&model, Vec::new(), Direction::To, 3).unwrap();
/// assert!(out.is_empty());
/// ```
pub fn xref_calls<I>(
    index: &I,
    seed: Vec<CallRecord>,
    direction: Direction,
    max_depth: usize,
) -> Result<Vec<CallRecord>>
where
    I: CallIndex + ?Sized,
{
    let mut frontier = seed;
    for run in 0..max_depth {
        let classes: BTreeSet<String> = frontier
            .iter()
            .map(|c| direction.frontier_class(c).to_string())
            .collect();
        let next = index.calls_touching(&classes, direction)?;
        info!(run, %direction, results = next.len(), "Cross-reference expansion");
        if next.is_empty() {
            break;
        }
        frontier = next;
    }
    Ok(frontier)
}

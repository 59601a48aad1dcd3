//! Pointer → snap rectangle resolution.
//!
//! [`resolve`] finds the cell under the pointer and, in merge mode, widens
//! it toward the neighbours found by probing a fixed distance in each of
//! the four cardinal [`Direction`]s.  The probes are independent, so a
//! pointer near a corner widens both axes at once and the result is the
//! bounding box of up to five cells.

use crate::partition::{Partition, Rect};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default probe radius, in surface units.
pub const DEFAULT_NEIGHBOUR_DISTANCE: f64 = 30.0;

/// Cardinal direction of a neighbour probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    West,
    East,
    North,
    South,
}

impl Direction {
    /// All probe directions, in the order they are applied.
    pub const ALL: [Direction; 4] = [
        Direction::West,
        Direction::East,
        Direction::North,
        Direction::South,
    ];

    /// The probe point `distance` away from `(x, y)` in this direction.
    pub fn offset(self, x: f64, y: f64, distance: f64) -> (f64, f64) {
        match self {
            Direction::West => (x - distance, y),
            Direction::East => (x + distance, y),
            Direction::North => (x, y - distance),
            Direction::South => (x, y + distance),
        }
    }

    /// Copy the edge of `neighbour` facing away from the pointer onto `bounds`.
    fn extend(self, bounds: &mut Rect, neighbour: &Rect) {
        match self {
            Direction::West => bounds.x1 = neighbour.x1,
            Direction::East => bounds.x2 = neighbour.x2,
            Direction::North => bounds.y1 = neighbour.y1,
            Direction::South => bounds.y2 = neighbour.y2,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::West => write!(f, "west"),
            Direction::East => write!(f, "east"),
            Direction::North => write!(f, "north"),
            Direction::South => write!(f, "south"),
        }
    }
}

/// Resolver parameters.
///
/// # Example
///
/// ```json
/// { "neighbour_distance": 30.0, "merge_neighbours": true }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapOptions {
    /// Probe radius used to look for neighbouring cells.  Default: `30.0`.
    pub neighbour_distance: f64,
    /// Widen the matched cell toward neighbours found by the probes.
    /// Default: `true`.
    pub merge_neighbours: bool,
}

impl Default for SnapOptions {
    fn default() -> Self {
        Self {
            neighbour_distance: DEFAULT_NEIGHBOUR_DISTANCE,
            merge_neighbours: true,
        }
    }
}

/// Resolve the pointer position `(x, y)` to a snap rectangle.
///
/// Returns `None` when no cell contains the pointer, which callers treat as
/// "place freely".  With `use_neighbour_merge` off the containing cell is
/// returned as is; otherwise each bound is replaced by the matching bound
/// of the cell found `neighbour_distance` away in that direction, if any.
/// Probes use the same first-match scan as the centre lookup, so a probe
/// landing on a shared edge picks the earlier cell in construction order.
pub fn resolve(
    partition: &Partition,
    x: f64,
    y: f64,
    neighbour_distance: f64,
    use_neighbour_merge: bool,
) -> Option<Rect> {
    let cell = *partition.cell_at(x, y)?;
    if !use_neighbour_merge || neighbour_distance <= 0.0 {
        return Some(cell);
    }

    let mut bounds = cell;
    for dir in Direction::ALL {
        let (px, py) = dir.offset(x, y, neighbour_distance);
        if let Some(neighbour) = partition.cell_at(px, py) {
            if neighbour != &cell {
                debug!("{} probe widens {} toward {}", dir, cell, neighbour);
            }
            dir.extend(&mut bounds, neighbour);
        }
    }
    Some(bounds)
}

impl Partition {
    /// [`resolve`] against this partition with the given options.
    pub fn snap(&self, x: f64, y: f64, options: &SnapOptions) -> Option<Rect> {
        resolve(
            self,
            x,
            y,
            options.neighbour_distance,
            options.merge_neighbours,
        )
    }
}

//  Tests

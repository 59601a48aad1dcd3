//! Surface partitioning.
//!
//! A [`Partition`] tiles a `width × height` surface with axis-aligned
//! [`Rect`]s described by a compact layout string.  Each comma-separated
//! descriptor is one column; its value is the number of equal-height rows
//! in that column.  `"3,2,2"` therefore yields three columns of equal width
//! holding three, two and two cells respectively.
//!
//! Cells are stored column-major, then row-major.  That order is the
//! tie-break whenever a point lies on a boundary shared by two cells.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Separator between column descriptors in a layout string.
pub const DESCRIPTOR_SEPARATOR: char = ',';

/// Upper bound on the number of cells a layout may produce.
pub const MAX_CELLS: usize = 4096;

/// An axis-aligned rectangle `(x1, y1) – (x2, y2)` in surface coordinates.
///
/// Membership is inclusive on all four edges, so neighbouring cells both
/// contain the points on their shared edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl Rect {
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Build a rectangle from its top-left corner and size.
    pub fn from_origin_size(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new(x, y, x + width, y + height)
    }

    pub fn width(&self) -> f64 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f64 {
        self.y2 - self.y1
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// Whether `(x, y)` lies inside or on the edge of this rectangle.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x1 && x <= self.x2 && y >= self.y1 && y <= self.y2
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({:.1}, {:.1})-({:.1}, {:.1})",
            self.x1, self.y1, self.x2, self.y2
        )
    }
}

/// Errors produced while parsing a layout or building a [`Partition`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PartitionError {
    /// A column descriptor is empty or not an integer.
    #[error("column {index}: invalid row count {descriptor:?}")]
    InvalidDescriptor { index: usize, descriptor: String },

    /// A column descriptor asks for zero rows.
    #[error("column {index}: row count must be positive")]
    ZeroRows { index: usize },

    /// The layout asks for more than [`MAX_CELLS`] cells in total.
    #[error("layout has more than {limit} cells")]
    TooManyCells { limit: usize },

    /// The surface has a non-finite or non-positive dimension.
    #[error("invalid surface size {width}x{height}")]
    InvalidSurface { width: String, height: String },
}

/// A parsed layout string: the row count of every column, left to right.
///
/// Serialised as its textual form (`"3,2,2"`), so configuration files and
/// wire commands are validated as they are deserialised.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LayoutSpec {
    columns: Vec<usize>,
}

impl LayoutSpec {
    /// Row counts per column.
    pub fn columns(&self) -> &[usize] {
        &self.columns
    }

    /// Whether the layout describes no cells at all.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Total number of cells the layout produces.  Never above [`MAX_CELLS`].
    pub fn cell_count(&self) -> usize {
        self.columns.iter().sum()
    }
}

impl FromStr for LayoutSpec {
    type Err = PartitionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Ok(Self::default());
        }
        let columns = s
            .split(DESCRIPTOR_SEPARATOR)
            .enumerate()
            .map(|(index, descriptor)| {
                let rows: usize = descriptor.trim().parse().map_err(|_| {
                    PartitionError::InvalidDescriptor {
                        index,
                        descriptor: descriptor.to_string(),
                    }
                })?;
                if rows == 0 {
                    return Err(PartitionError::ZeroRows { index });
                }
                Ok(rows)
            })
            .collect::<Result<Vec<usize>, _>>()?;

        let too_many = PartitionError::TooManyCells { limit: MAX_CELLS };
        let total = columns
            .iter()
            .try_fold(0usize, |acc, &rows| acc.checked_add(rows))
            .ok_or_else(|| too_many.clone())?;
        if total > MAX_CELLS {
            return Err(too_many);
        }
        Ok(Self { columns })
    }
}

impl fmt::Display for LayoutSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, rows) in self.columns.iter().enumerate() {
            if i > 0 {
                write!(f, "{}", DESCRIPTOR_SEPARATOR)?;
            }
            write!(f, "{}", rows)?;
        }
        Ok(())
    }
}

impl TryFrom<String> for LayoutSpec {
    type Error = PartitionError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<LayoutSpec> for String {
    fn from(spec: LayoutSpec) -> Self {
        spec.to_string()
    }
}

/// An immutable tiling of the surface into snap cells.
///
/// Built once per layout change and replaced wholesale when the layout or
/// surface size changes.
#[derive(Debug, Clone, PartialEq)]
pub struct Partition {
    width: f64,
    height: f64,
    spec: String,
    cells: Vec<Rect>,
}

impl Partition {
    /// Parse `spec` and tile a `width × height` surface with it.
    ///
    /// An empty `spec` produces a partition without cells.
    pub fn build(width: f64, height: f64, spec: &str) -> Result<Self, PartitionError> {
        let layout: LayoutSpec = spec.parse()?;
        let mut partition = Self::from_layout(width, height, &layout)?;
        partition.spec = spec.to_string();
        Ok(partition)
    }

    /// Tile a `width × height` surface with an already parsed layout.
    pub fn from_layout(width: f64, height: f64, layout: &LayoutSpec) -> Result<Self, PartitionError> {
        check_surface(width, height)?;

        let cols = layout.columns().len();
        let mut cells = Vec::with_capacity(layout.cell_count());
        for (col, &rows) in layout.columns().iter().enumerate() {
            let x1 = col as f64 * width / cols as f64;
            let x2 = (col + 1) as f64 * width / cols as f64;
            for row in 0..rows {
                let y1 = row as f64 * height / rows as f64;
                let y2 = (row + 1) as f64 * height / rows as f64;
                cells.push(Rect::new(x1, y1, x2, y2));
            }
        }

        Ok(Self {
            width,
            height,
            spec: layout.to_string(),
            cells,
        })
    }

    /// A partition with no cells: every query against it misses.
    pub fn empty(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            spec: String::new(),
            cells: Vec::new(),
        }
    }

    //  Accessors

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    /// The layout string this partition was built from.
    pub fn spec(&self) -> &str {
        &self.spec
    }

    /// Cells in construction order.
    pub fn cells(&self) -> &[Rect] {
        &self.cells
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// The first cell, in construction order, containing `(x, y)`.
    pub fn cell_at(&self, x: f64, y: f64) -> Option<&Rect> {
        self.cells.iter().find(|cell| cell.contains(x, y))
    }
}

fn check_surface(width: f64, height: f64) -> Result<(), PartitionError> {
    let valid = |v: f64| v.is_finite() && v > 0.0;
    if valid(width) && valid(height) {
        Ok(())
    } else {
        Err(PartitionError::InvalidSurface {
            width: width.to_string(),
            height: height.to_string(),
        })
    }
}

//  Tests

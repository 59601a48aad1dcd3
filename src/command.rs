//! Commands and types used throughout snapgrid.
//!
//! [`Command`] is the vocabulary shared by every input path: the GTK shell
//! translates pointer and key events into commands, and the Unix-socket
//! listener deserialises them from JSON.  Both feed the same
//! [`DragSession`](crate::session::DragSession).

use crate::partition::LayoutSpec;
use serde::{Deserialize, Serialize};

/// A pointer position in surface-local coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Every input the drag session reacts to.
///
/// # Wire format
///
/// ```json
/// {"Press":{"x":120,"y":140}}
/// {"Move":{"x":300,"y":200}}
/// {"SelectPreset":1}
/// {"SelectLayout":"3,2,2"}
/// {"Resize":{"width":1200,"height":800}}
/// "ClearLayout"
/// "Release"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// Primary button pressed.  Starts a drag when the point is inside the
    /// dragged object.
    Press(Point),

    /// Pointer moved.  Only has an effect while dragging.
    Move(Point),

    /// Primary button released; ends the drag.
    Release,

    /// Activate the preset layout at this index (0-based).  An index past
    /// the end clears the layout.
    SelectPreset(usize),

    /// Activate an explicit layout.
    SelectLayout(LayoutSpec),

    /// Drop the active layout; subsequent moves place the object freely.
    ClearLayout,

    /// The surface changed size.
    Resize { width: f64, height: f64 },

    /// Stop the event loop.
    Quit,
}

/// Map a key name (as reported by GDK, e.g. `"3"`, `"q"`, `"Escape"`) to a
/// command.
///
/// Digits `1`–`9` pick a preset, `q` and `Escape` quit, and every other key
/// clears the layout.
pub fn key_command(name: &str) -> Command {
    match name {
        "q" | "Escape" => Command::Quit,
        _ => match name.parse::<usize>() {
            Ok(n @ 1..=9) => Command::SelectPreset(n - 1),
            _ => Command::ClearLayout,
        },
    }
}

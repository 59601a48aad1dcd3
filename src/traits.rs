//! Core traits that decouple snapgrid from any specific toolkit or
//! transport mechanism.
//!
//! The [`DragSession`](crate::session::DragSession) only talks to the
//! dragged object through [`SnapTarget`] and only receives input through
//! [`CommandSource`]s, so the GTK shell, the headless daemon and the tests
//! all drive the same code.

use crate::command::Command;
use crate::partition::Rect;
use std::sync::mpsc;

/// The object being dragged and snapped.
///
/// An implementation might be a widget in the GTK shell, a real window
/// behind some compositor IPC, or a recording stub used in tests.
pub trait SnapTarget {
    /// The error type produced by this target.
    type Error: std::error::Error + Send + 'static;

    /// Current bounds of the object in surface coordinates.
    fn geometry(&self) -> Result<Rect, Self::Error>;

    /// Move the object's top-left corner to `(x, y)`.
    fn move_to(&self, x: f64, y: f64) -> Result<(), Self::Error>;

    /// Resize the object, keeping its top-left corner.
    fn resize(&self, width: f64, height: f64) -> Result<(), Self::Error>;

    /// Set the paint opacity (`1.0` when idle, lower while dragging).
    fn set_opacity(&self, opacity: f64) -> Result<(), Self::Error>;
}

//  Overlay

/// Events sent from the session to whatever paints the zone outlines.
///
/// The session holds an `Option<mpsc::Sender<OverlayEvent>>`; painting is
/// entirely the receiver's business.
#[derive(Debug, Clone, PartialEq)]
pub enum OverlayEvent {
    /// A layout became active; outline these cells.
    ShowPartition(Vec<Rect>),
    /// The layout was cleared.
    Hide,
}

//  Command Source

/// A source of [`Command`]s.
///
/// # Contract
///
/// * [`run`](CommandSource::run) **blocks** until the source is exhausted or
///   an unrecoverable error occurs.
/// * Each received command must be sent through `sink` exactly once.
/// * Implementations must be [`Send`] so they can run on a dedicated thread.
pub trait CommandSource: Send {
    /// The error type produced by this source.
    type Error: std::error::Error + Send + 'static;

    /// Start listening and forward every incoming [`Command`] into `sink`.
    fn run(&mut self, sink: mpsc::Sender<Command>) -> Result<(), Self::Error>;
}

//! **snapgrid**: smart window snapping into grid zones.
//!
//! A layout string such as `"3,2,2"` partitions the surface into columns of
//! equal width, each split into its own number of equal-height rows.  While
//! a window is dragged, the pointer position is resolved to the zone under
//! it; near a zone boundary the zone is widened across its neighbours so
//! the window can snap to a larger merged area.
//!
//! # Architecture
//!
//! * [`partition`] builds the immutable [`partition::Partition`] from a
//!   layout string.
//! * [`resolver`] maps a pointer position to a snap rectangle.
//! * [`session::DragSession`] tracks press / move / release and layout
//!   selection and drives a [`traits::SnapTarget`], so the snapping logic
//!   is not coupled to any toolkit.
//! * [`traits::CommandSource`] abstracts where input comes from; the
//!   [`ipc`] listener and the [`visualizer`] GTK shell both produce
//!   [`command::Command`]s.

pub mod command;
pub mod config;
pub mod ipc;
pub mod partition;
pub mod resolver;
pub mod session;
pub mod traits;
pub mod visualizer;

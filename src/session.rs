//! The drag session that ties the partition, the resolver, the snap target
//! and the command sources together.
//!
//! [`DragSession`] owns the active [`Partition`] and reacts to [`Command`]s
//! by resolving pointer positions and issuing calls to the [`SnapTarget`].

use crate::command::{Command, Point};
use crate::partition::{LayoutSpec, Partition, Rect};
use crate::resolver::SnapOptions;
use crate::traits::{OverlayEvent, SnapTarget};
use log::{debug, info, warn};
use std::sync::mpsc;

/// Opacity of the dragged object while idle.
const IDLE_OPACITY: f64 = 1.0;

/// Possible errors from the session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The snap target returned an error.
    #[error("snap target error: {0}")]
    Target(String),
}

/// An in-progress drag: where the pointer grabbed the object.
#[derive(Debug, Clone, Copy, PartialEq)]
struct ActiveDrag {
    offset_x: f64,
    offset_y: f64,
}

/// Orchestrates drag tracking, layout selection and snapping.
///
/// Generic over any [`SnapTarget`], so it does not depend on GTK or any
/// other toolkit.
///
/// # Typical usage
///
/// ```ignore
/// let mut session = DragSession::new(target, (1200.0, 800.0), presets);
/// session.handle(Command::Press(Point::new(150.0, 150.0)))?;
/// session.handle(Command::SelectPreset(0))?;
/// session.handle(Command::Move(Point::new(148.0, 200.0)))?;
/// ```
pub struct DragSession<T: SnapTarget> {
    target: T,
    surface: (f64, f64),
    home_size: (f64, f64),
    presets: Vec<LayoutSpec>,
    options: SnapOptions,
    drag_opacity: f64,
    layout: Option<LayoutSpec>,
    partition: Option<Partition>,
    drag: Option<ActiveDrag>,
    overlay_tx: Option<mpsc::Sender<OverlayEvent>>,
}

impl<T: SnapTarget> DragSession<T> {
    /// Create a new session for `target` on a `surface` of `(width, height)`.
    ///
    /// The target's current size becomes the size it returns to whenever it
    /// is placed without snapping.  If the geometry cannot be queried the
    /// home size starts at zero and is filled in on the first press.
    pub fn new(target: T, surface: (f64, f64), presets: Vec<LayoutSpec>) -> Self {
        let home_size = match target.geometry() {
            Ok(rect) => (rect.width(), rect.height()),
            Err(e) => {
                warn!("could not query target geometry: {}", e);
                (0.0, 0.0)
            }
        };
        Self {
            target,
            surface,
            home_size,
            presets,
            options: SnapOptions::default(),
            drag_opacity: 0.7,
            layout: None,
            partition: None,
            drag: None,
            overlay_tx: None,
        }
    }

    /// Set the resolver options used for every pointer move.
    pub fn set_snap_options(&mut self, options: SnapOptions) {
        self.options = options;
    }

    /// Set the opacity applied to the target while it is dragged.
    pub fn set_drag_opacity(&mut self, opacity: f64) {
        self.drag_opacity = opacity;
    }

    /// Attach an overlay event channel.
    ///
    /// The session sends [`OverlayEvent::ShowPartition`] whenever a layout
    /// becomes active and [`OverlayEvent::Hide`] when it is cleared.
    pub fn set_overlay(&mut self, tx: mpsc::Sender<OverlayEvent>) {
        self.overlay_tx = Some(tx);
    }

    /// The snap target driven by this session.
    pub fn target(&self) -> &T {
        &self.target
    }

    /// The active partition, if a layout is selected.
    pub fn partition(&self) -> Option<&Partition> {
        self.partition.as_ref()
    }

    /// The layout the active partition was built from.
    pub fn layout(&self) -> Option<&LayoutSpec> {
        self.layout.as_ref()
    }

    /// Whether a drag is in progress.
    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Current surface size as `(width, height)`.
    pub fn surface(&self) -> (f64, f64) {
        self.surface
    }

    /// Process a single [`Command`].
    pub fn handle(&mut self, cmd: Command) -> Result<(), SessionError> {
        match cmd {
            Command::Press(p) => self.press(p)?,

            Command::Release => {
                if self.drag.take().is_some() {
                    debug!("drag end");
                }
                self.set_opacity(IDLE_OPACITY)?;
            }

            Command::Move(p) => self.pointer_moved(p)?,

            Command::SelectPreset(index) => {
                if !self.is_dragging() {
                    debug!("preset {} ignored outside a drag", index);
                    self.clear_layout();
                } else if let Some(layout) = self.presets.get(index).cloned() {
                    info!("preset {} selected: {}", index + 1, layout);
                    self.set_layout(layout);
                } else {
                    debug!("no preset {}", index + 1);
                    self.clear_layout();
                }
            }

            Command::SelectLayout(layout) => {
                if self.is_dragging() {
                    info!("layout selected: {}", layout);
                    self.set_layout(layout);
                } else {
                    debug!("layout {} ignored outside a drag", layout);
                    self.clear_layout();
                }
            }

            Command::ClearLayout => self.clear_layout(),

            Command::Resize { width, height } => {
                debug!("surface resized to {}x{}", width, height);
                self.surface = (width, height);
                if let Some(layout) = self.layout.clone() {
                    self.set_layout(layout);
                }
            }

            Command::Quit => debug!("quit requested"),
        }
        Ok(())
    }

    //  Drag handling

    fn press(&mut self, p: Point) -> Result<(), SessionError> {
        let bounds = self.geometry()?;
        if bounds.contains(p.x, p.y) {
            if self.home_size == (0.0, 0.0) {
                self.home_size = (bounds.width(), bounds.height());
            }
            debug!("drag start at ({:.1}, {:.1})", p.x, p.y);
            self.drag = Some(ActiveDrag {
                offset_x: p.x - bounds.x1,
                offset_y: p.y - bounds.y1,
            });
            self.set_opacity(self.drag_opacity)
        } else {
            self.drag = None;
            self.set_opacity(IDLE_OPACITY)
        }
    }

    fn pointer_moved(&mut self, p: Point) -> Result<(), SessionError> {
        let Some(drag) = self.drag else {
            return Ok(());
        };

        let snapped = self
            .partition
            .as_ref()
            .and_then(|partition| partition.snap(p.x, p.y, &self.options));

        match snapped {
            Some(rect) => {
                debug!("snap ({:.1}, {:.1}) -> {}", p.x, p.y, rect);
                self.place(rect)
            }
            None => {
                let (w, h) = self.home_size;
                self.place(Rect::from_origin_size(
                    p.x - drag.offset_x,
                    p.y - drag.offset_y,
                    w,
                    h,
                ))
            }
        }
    }

    fn place(&self, rect: Rect) -> Result<(), SessionError> {
        self.target
            .move_to(rect.x1, rect.y1)
            .map_err(|e| SessionError::Target(e.to_string()))?;
        self.target
            .resize(rect.width(), rect.height())
            .map_err(|e| SessionError::Target(e.to_string()))
    }

    fn geometry(&self) -> Result<Rect, SessionError> {
        self.target
            .geometry()
            .map_err(|e| SessionError::Target(e.to_string()))
    }

    fn set_opacity(&self, opacity: f64) -> Result<(), SessionError> {
        self.target
            .set_opacity(opacity)
            .map_err(|e| SessionError::Target(e.to_string()))
    }

    //  Layout handling

    /// Build `layout` for the current surface and make it active.
    fn set_layout(&mut self, layout: LayoutSpec) {
        let (width, height) = self.surface;
        match Partition::from_layout(width, height, &layout) {
            Ok(partition) => self.replace_partition(Some((layout, partition))),
            Err(e) => {
                warn!("cannot build layout {}: {}", layout, e);
                self.replace_partition(None);
            }
        }
    }

    fn clear_layout(&mut self) {
        if self.partition.is_some() {
            info!("layout cleared");
            self.replace_partition(None);
        }
    }

    /// Swap the active partition and tell the overlay.
    fn replace_partition(&mut self, active: Option<(LayoutSpec, Partition)>) {
        let event = match &active {
            Some((_, p)) => OverlayEvent::ShowPartition(p.cells().to_vec()),
            None => OverlayEvent::Hide,
        };
        (self.layout, self.partition) = match active {
            Some((layout, partition)) => (Some(layout), Some(partition)),
            None => (None, None),
        };
        if let Some(tx) = &self.overlay_tx {
            let _ = tx.send(event);
        }
    }
}

//  Tests

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};

    /// Records every placement and opacity change made by the session.
    #[derive(Debug)]
    struct RecorderTarget {
        bounds: Cell<Rect>,
        opacity: Cell<f64>,
        placements: RefCell<Vec<Rect>>,
    }

    impl RecorderTarget {
        fn new() -> Self {
            Self {
                bounds: Cell::new(Rect::from_origin_size(100.0, 100.0, 500.0, 400.0)),
                opacity: Cell::new(1.0),
                placements: RefCell::new(Vec::new()),
            }
        }
    }

    #[derive(Debug, thiserror::Error)]
    #[error("recorder error")]
    struct RecorderError;

    impl SnapTarget for RecorderTarget {
        type Error = RecorderError;

        fn geometry(&self) -> Result<Rect, RecorderError> {
            Ok(self.bounds.get())
        }

        fn move_to(&self, x: f64, y: f64) -> Result<(), RecorderError> {
            let b = self.bounds.get();
            self.bounds
                .set(Rect::from_origin_size(x, y, b.width(), b.height()));
            Ok(())
        }

        fn resize(&self, width: f64, height: f64) -> Result<(), RecorderError> {
            let b = self.bounds.get();
            let r = Rect::from_origin_size(b.x1, b.y1, width, height);
            self.bounds.set(r);
            self.placements.borrow_mut().push(r);
            Ok(())
        }

        fn set_opacity(&self, opacity: f64) -> Result<(), RecorderError> {
            self.opacity.set(opacity);
            Ok(())
        }
    }

    /// A target whose every call fails.
    struct BrokenTarget;

    impl SnapTarget for BrokenTarget {
        type Error = RecorderError;

        fn geometry(&self) -> Result<Rect, RecorderError> {
            Err(RecorderError)
        }

        fn move_to(&self, _: f64, _: f64) -> Result<(), RecorderError> {
            Err(RecorderError)
        }

        fn resize(&self, _: f64, _: f64) -> Result<(), RecorderError> {
            Err(RecorderError)
        }

        fn set_opacity(&self, _: f64) -> Result<(), RecorderError> {
            Err(RecorderError)
        }
    }

    fn presets() -> Vec<LayoutSpec> {
        ["2,1", "3,3,1", "3,2,2"]
            .iter()
            .map(|s| s.parse().unwrap())
            .collect()
    }

    fn make_session() -> DragSession<RecorderTarget> {
        DragSession::new(RecorderTarget::new(), (300.0, 300.0), presets())
    }

    fn last_placement(s: &DragSession<RecorderTarget>) -> Rect {
        *s.target().placements.borrow().last().expect("no placement")
    }

    #[test]
    fn press_inside_starts_drag() {
        let mut s = make_session();
        s.handle(Command::Press(Point::new(150.0, 120.0))).unwrap();
        assert!(s.is_dragging());
        assert_eq!(s.target().opacity.get(), 0.7);
    }

    #[test]
    fn press_outside_does_not_drag() {
        let mut s = make_session();
        s.handle(Command::Press(Point::new(10.0, 10.0))).unwrap();
        assert!(!s.is_dragging());
        assert_eq!(s.target().opacity.get(), 1.0);
    }

    #[test]
    fn release_ends_drag() {
        let mut s = make_session();
        s.handle(Command::Press(Point::new(150.0, 120.0))).unwrap();
        s.handle(Command::Release).unwrap();
        assert!(!s.is_dragging());
        assert_eq!(s.target().opacity.get(), 1.0);
    }

    #[test]
    fn move_without_drag_is_ignored() {
        let mut s = make_session();
        s.handle(Command::Move(Point::new(50.0, 50.0))).unwrap();
        assert!(s.target().placements.borrow().is_empty());
    }

    #[test]
    fn move_without_layout_follows_pointer() {
        let mut s = make_session();
        s.handle(Command::Press(Point::new(150.0, 120.0))).unwrap();
        s.handle(Command::Move(Point::new(160.0, 140.0))).unwrap();
        assert_eq!(last_placement(&s), Rect::from_origin_size(110.0, 120.0, 500.0, 400.0));
    }

    #[test]
    fn layout_snaps_and_merges() {
        let mut s = make_session();
        s.handle(Command::Press(Point::new(150.0, 120.0))).unwrap();
        s.handle(Command::SelectPreset(0)).unwrap();
        assert_eq!(s.partition().map(|p| p.cells().len()), Some(3));

        s.handle(Command::Move(Point::new(75.0, 75.0))).unwrap();
        assert_eq!(last_placement(&s), Rect::new(0.0, 0.0, 150.0, 150.0));

        s.handle(Command::Move(Point::new(148.0, 200.0))).unwrap();
        assert_eq!(last_placement(&s), Rect::new(0.0, 150.0, 300.0, 300.0));
    }

    #[test]
    fn exact_mode_from_options() {
        let mut s = make_session();
        s.set_snap_options(SnapOptions {
            merge_neighbours: false,
            ..SnapOptions::default()
        });
        s.handle(Command::Press(Point::new(150.0, 120.0))).unwrap();
        s.handle(Command::SelectPreset(0)).unwrap();
        s.handle(Command::Move(Point::new(148.0, 200.0))).unwrap();
        assert_eq!(last_placement(&s), Rect::new(0.0, 150.0, 150.0, 300.0));
    }

    #[test]
    fn no_match_falls_back_to_free_placement() {
        let mut s = make_session();
        s.handle(Command::Press(Point::new(150.0, 120.0))).unwrap();
        s.handle(Command::SelectPreset(0)).unwrap();
        s.handle(Command::Move(Point::new(75.0, 75.0))).unwrap();
        // Outside the surface: no cell, so the original size comes back.
        s.handle(Command::Move(Point::new(350.0, 40.0))).unwrap();
        assert_eq!(last_placement(&s), Rect::from_origin_size(300.0, 20.0, 500.0, 400.0));
    }

    #[test]
    fn clearing_restores_original_size() {
        let mut s = make_session();
        s.handle(Command::Press(Point::new(150.0, 120.0))).unwrap();
        s.handle(Command::SelectPreset(1)).unwrap();
        s.handle(Command::Move(Point::new(50.0, 50.0))).unwrap();
        s.handle(Command::ClearLayout).unwrap();
        assert!(s.partition().is_none());
        s.handle(Command::Move(Point::new(200.0, 200.0))).unwrap();
        assert_eq!(last_placement(&s), Rect::from_origin_size(150.0, 180.0, 500.0, 400.0));
    }

    #[test]
    fn preset_outside_drag_clears() {
        let mut s = make_session();
        s.handle(Command::SelectPreset(0)).unwrap();
        assert!(s.partition().is_none());
    }

    #[test]
    fn unknown_preset_clears() {
        let mut s = make_session();
        s.handle(Command::Press(Point::new(150.0, 120.0))).unwrap();
        s.handle(Command::SelectPreset(0)).unwrap();
        s.handle(Command::SelectPreset(7)).unwrap();
        assert!(s.partition().is_none());
    }

    #[test]
    fn explicit_layout_replaces_partition() {
        let mut s = make_session();
        s.handle(Command::Press(Point::new(150.0, 120.0))).unwrap();
        s.handle(Command::SelectPreset(0)).unwrap();
        s.handle(Command::SelectLayout("1,1,1".parse().unwrap())).unwrap();
        let p = s.partition().unwrap();
        assert_eq!(p.spec(), "1,1,1");
        assert_eq!(p.cells()[1], Rect::new(100.0, 0.0, 200.0, 300.0));
    }

    #[test]
    fn resize_rebuilds_active_layout() {
        let mut s = make_session();
        s.handle(Command::Press(Point::new(150.0, 120.0))).unwrap();
        s.handle(Command::SelectPreset(0)).unwrap();
        s.handle(Command::Resize {
            width: 600.0,
            height: 400.0,
        })
        .unwrap();
        assert_eq!(s.surface(), (600.0, 400.0));
        let p = s.partition().unwrap();
        assert_eq!(p.cells()[2], Rect::new(300.0, 0.0, 600.0, 400.0));
    }

    #[test]
    fn resize_keeps_the_selected_layout() {
        let mut s = make_session();
        s.handle(Command::Press(Point::new(150.0, 120.0))).unwrap();
        s.handle(Command::SelectLayout("3,1".parse().unwrap())).unwrap();
        for (width, height) in [(600.0, 400.0), (900.0, 300.0)] {
            s.handle(Command::Resize { width, height }).unwrap();
            assert_eq!(s.layout().map(|l| l.to_string()).as_deref(), Some("3,1"));
        }
        let p = s.partition().unwrap();
        assert_eq!(p.cells()[3], Rect::new(450.0, 0.0, 900.0, 300.0));
    }

    #[test]
    fn resize_to_empty_surface_drops_layout() {
        let mut s = make_session();
        s.handle(Command::Press(Point::new(150.0, 120.0))).unwrap();
        s.handle(Command::SelectPreset(0)).unwrap();
        s.handle(Command::Resize {
            width: 0.0,
            height: 400.0,
        })
        .unwrap();
        assert!(s.partition().is_none());
        assert!(s.layout().is_none());
    }

    #[test]
    fn clearing_drops_the_layout() {
        let mut s = make_session();
        s.handle(Command::Press(Point::new(150.0, 120.0))).unwrap();
        s.handle(Command::SelectPreset(2)).unwrap();
        assert_eq!(s.layout().map(|l| l.cell_count()), Some(7));
        s.handle(Command::ClearLayout).unwrap();
        assert!(s.layout().is_none());
    }

    #[test]
    fn resize_without_layout_only_updates_surface() {
        let mut s = make_session();
        s.handle(Command::Resize {
            width: 640.0,
            height: 480.0,
        })
        .unwrap();
        assert_eq!(s.surface(), (640.0, 480.0));
        assert!(s.partition().is_none());
    }

    #[test]
    fn overlay_receives_show_and_hide() {
        let mut s = make_session();
        let (tx, rx) = mpsc::channel();
        s.set_overlay(tx);
        s.handle(Command::Press(Point::new(150.0, 120.0))).unwrap();
        s.handle(Command::SelectPreset(0)).unwrap();
        s.handle(Command::ClearLayout).unwrap();
        let events: Vec<OverlayEvent> = rx.try_iter().collect();
        assert!(
            matches!(events.as_slice(), [OverlayEvent::ShowPartition(cells), OverlayEvent::Hide] if cells.len() == 3),
            "expected Show followed by Hide, got: {events:#?}"
        );
    }

    #[test]
    fn clear_without_layout_emits_nothing() {
        let mut s = make_session();
        let (tx, rx) = mpsc::channel();
        s.set_overlay(tx);
        s.handle(Command::ClearLayout).unwrap();
        assert_eq!(rx.try_iter().count(), 0);
    }

    #[test]
    fn quit_is_a_no_op() {
        let mut s = make_session();
        s.handle(Command::Quit).unwrap();
        assert!(!s.is_dragging());
    }

    #[test]
    fn target_errors_propagate() {
        let mut s = DragSession::new(BrokenTarget, (300.0, 300.0), presets());
        let result = s.handle(Command::Press(Point::new(10.0, 10.0)));
        assert!(matches!(result, Err(SessionError::Target(_))));
    }
}

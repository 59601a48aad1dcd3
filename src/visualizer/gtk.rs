//! GTK4 demo shell that runs on the **main thread**.
//!
//! A single window hosts a `DrawingArea` that paints the active zones and
//! the dragged window.  Pointer drags, key presses, key releases and size
//! changes are turned into [`Command`]s and pushed onto the same channel
//! the Unix-socket listener feeds, so the [`DragSession`] sees one ordered
//! stream of input.
//!
//! # Controls
//!
//! | Input                          | Command                         |
//! |--------------------------------|---------------------------------|
//! | Primary-button drag            | `Press` / `Move` / `Release`    |
//! | Hold `1`–`9` while dragging    | `SelectPreset(n - 1)`           |
//! | Release the key                | `ClearLayout`                   |
//! | `q` / `Escape`                 | `Quit`                          |
//!
//! # CSS selectors
//!
//! | Selector         | Targets                                   |
//! |------------------|-------------------------------------------|
//! | `window.snapgrid`| The demo window background                |
//!
//! Zone outlines and the dragged window are painted with cairo; their
//! stroke width and drag opacity come from [`VisualizerConfig`].

use crate::command::{key_command, Command, Point};
use crate::config::{Config, VisualizerConfig};
use crate::partition::Rect;
use crate::session::DragSession;
use crate::traits::{OverlayEvent, SnapTarget};
use gtk4::prelude::*;
use gtk4::{cairo, gdk, glib};
use log::{debug, error, info, warn};
use std::cell::RefCell;
use std::convert::Infallible;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::mpsc;
use std::time::Duration;

const WINDOW_TITLE: &str = "Window Manager Smart Placement Demo";

//  Default CSS

const DEFAULT_CSS: &str = r#"
window.snapgrid,
window.snapgrid.background {
    background-color: rgba(255, 255, 255, 0.15);
}
"#;

//  Scene

/// Everything the draw function paints.
struct Scene {
    window: Rect,
    opacity: f64,
    zones: Vec<Rect>,
}

/// [`SnapTarget`] backed by the painted scene.
///
/// Moving or resizing only updates the scene; the event loop queues a
/// redraw after each batch of commands.
#[derive(Clone)]
struct SceneTarget {
    scene: Rc<RefCell<Scene>>,
}

impl SnapTarget for SceneTarget {
    type Error = Infallible;

    fn geometry(&self) -> Result<Rect, Infallible> {
        Ok(self.scene.borrow().window)
    }

    fn move_to(&self, x: f64, y: f64) -> Result<(), Infallible> {
        let mut scene = self.scene.borrow_mut();
        let w = scene.window;
        scene.window = Rect::from_origin_size(x, y, w.width(), w.height());
        Ok(())
    }

    fn resize(&self, width: f64, height: f64) -> Result<(), Infallible> {
        let mut scene = self.scene.borrow_mut();
        let w = scene.window;
        scene.window = Rect::from_origin_size(w.x1, w.y1, width, height);
        Ok(())
    }

    fn set_opacity(&self, opacity: f64) -> Result<(), Infallible> {
        self.scene.borrow_mut().opacity = opacity;
        Ok(())
    }
}

fn paint(scene: &Scene, cr: &cairo::Context, config: &VisualizerConfig) {
    if !scene.zones.is_empty() {
        cr.set_source_rgba(0.0, 0.0, 0.6, 0.9);
        cr.set_line_width(config.line_width);
        cr.set_line_join(cairo::LineJoin::Round);
        for zone in &scene.zones {
            cr.rectangle(zone.x1, zone.y1, zone.width(), zone.height());
        }
        if let Err(e) = cr.stroke() {
            warn!("stroke failed: {}", e);
        }
    }

    let w = scene.window;
    cr.rectangle(w.x1, w.y1, w.width(), w.height());
    cr.set_source_rgba(0.5, 0.5, 0.5, scene.opacity);
    if let Err(e) = cr.fill() {
        warn!("fill failed: {}", e);
    }
}

//  Public API

/// Run the GTK4 demo on the **current** (main) thread.
///
/// `cmd_tx` is handed to the input controllers; `cmd_rx` is drained every
/// [`VisualizerConfig::tick_ms`].  Returns when the window is closed or a
/// [`Command::Quit`] arrives.
pub fn run_main_loop(
    config: Config,
    cmd_tx: mpsc::Sender<Command>,
    cmd_rx: mpsc::Receiver<Command>,
    css_path: Option<PathBuf>,
) {
    gtk4::init().expect("failed to initialise GTK4");
    info!("GTK4 initialised on main thread");

    load_css(&css_path);

    let vis = config.visualizer.clone();
    let scene = Rc::new(RefCell::new(Scene {
        window: config.window.bounds(),
        opacity: 1.0,
        zones: Vec::new(),
    }));

    //  Session
    let mut session = DragSession::new(
        SceneTarget {
            scene: scene.clone(),
        },
        (vis.surface_width as f64, vis.surface_height as f64),
        config.presets.clone(),
    );
    session.set_snap_options(config.snap);
    session.set_drag_opacity(vis.drag_opacity);
    let (overlay_tx, overlay_rx) = mpsc::channel::<OverlayEvent>();
    session.set_overlay(overlay_tx);

    //  Window + drawing area
    let window = gtk4::Window::new();
    window.set_title(Some(WINDOW_TITLE));
    window.set_default_size(vis.surface_width, vis.surface_height);
    window.add_css_class("snapgrid");

    let area = gtk4::DrawingArea::new();
    area.set_hexpand(true);
    area.set_vexpand(true);
    {
        let scene = scene.clone();
        let vis = vis.clone();
        area.set_draw_func(move |_, cr, _, _| paint(&scene.borrow(), cr, &vis));
    }
    {
        let tx = cmd_tx.clone();
        area.connect_resize(move |_, width, height| {
            let _ = tx.send(Command::Resize {
                width: width as f64,
                height: height as f64,
            });
        });
    }
    window.set_child(Some(&area));

    //  Pointer drag
    let drag = gtk4::GestureDrag::new();
    drag.set_button(1);
    {
        let tx = cmd_tx.clone();
        drag.connect_drag_begin(move |_, x, y| {
            let _ = tx.send(Command::Press(Point::new(x, y)));
        });
    }
    {
        let tx = cmd_tx.clone();
        drag.connect_drag_update(move |gesture, dx, dy| {
            if let Some((x, y)) = gesture.start_point() {
                let _ = tx.send(Command::Move(Point::new(x + dx, y + dy)));
            }
        });
    }
    {
        let tx = cmd_tx.clone();
        drag.connect_drag_end(move |_, _, _| {
            let _ = tx.send(Command::Release);
        });
    }
    area.add_controller(drag);

    //  Keys
    let keys = gtk4::EventControllerKey::new();
    {
        let tx = cmd_tx.clone();
        keys.connect_key_pressed(move |_, key, _, _| {
            let name = key.name().map(|n| n.to_string()).unwrap_or_default();
            let _ = tx.send(key_command(&name));
            glib::Propagation::Stop
        });
    }
    {
        let tx = cmd_tx;
        keys.connect_key_released(move |_, _, _, _| {
            let _ = tx.send(Command::ClearLayout);
        });
    }
    window.add_controller(keys);

    let main_loop = glib::MainLoop::new(None, false);
    {
        let main_loop = main_loop.clone();
        window.connect_close_request(move |_| {
            main_loop.quit();
            glib::Propagation::Proceed
        });
    }

    //  Main event loop
    {
        let main_loop = main_loop.clone();
        let window = window.clone();
        let area = area.clone();
        glib::timeout_add_local(Duration::from_millis(vis.tick_ms), move || {
            let mut dirty = false;
            let mut stop = false;

            // 1. Drain commands.
            loop {
                match cmd_rx.try_recv() {
                    Ok(Command::Quit) => {
                        info!("quit requested");
                        stop = true;
                        break;
                    }
                    Ok(cmd) => {
                        debug!("command: {:?}", cmd);
                        if let Err(e) = session.handle(cmd) {
                            error!("command error: {}", e);
                        }
                        dirty = true;
                    }
                    Err(mpsc::TryRecvError::Empty) => break,
                    Err(mpsc::TryRecvError::Disconnected) => {
                        info!("all sources closed, exiting");
                        stop = true;
                        break;
                    }
                }
            }

            // 2. Drain overlay events.
            while let Ok(event) = overlay_rx.try_recv() {
                let mut scene = scene.borrow_mut();
                match event {
                    OverlayEvent::ShowPartition(cells) => {
                        debug!("showing {} zones", cells.len());
                        scene.zones = cells;
                    }
                    OverlayEvent::Hide => scene.zones.clear(),
                }
                dirty = true;
            }

            if dirty {
                area.queue_draw();
            }

            if stop {
                window.close();
                main_loop.quit();
                return glib::ControlFlow::Break;
            }
            glib::ControlFlow::Continue
        });
    }

    window.present();
    info!("entering GLib main loop");
    main_loop.run();
    info!("GLib main loop exited");
}

//  CSS loading

fn load_css(css_path: &Option<PathBuf>) {
    let provider = gtk4::CssProvider::new();

    let css_content = match css_path.as_ref().filter(|p| p.exists()) {
        Some(p) => match std::fs::read_to_string(p) {
            Ok(content) => {
                info!("user CSS: {} ({} bytes)", p.display(), content.len());
                content
            }
            Err(e) => {
                warn!("CSS read failed ({}): {}, using built-in", p.display(), e);
                DEFAULT_CSS.to_string()
            }
        },
        None => {
            info!("no user CSS, using built-in default");
            DEFAULT_CSS.to_string()
        }
    };

    #[allow(deprecated)]
    provider.load_from_data(&css_content);

    if let Some(display) = gdk::Display::default() {
        gtk4::style_context_add_provider_for_display(
            &display,
            &provider,
            gtk4::STYLE_PROVIDER_PRIORITY_APPLICATION,
        );
    } else {
        warn!("no GDK display, CSS will not be applied");
    }
}

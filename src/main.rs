//! Entry point for the **snapgrid** demo.
//!
//! Spawns the Unix-socket command listener on a background thread and
//! processes commands on the main thread.
//!
//! When the `visualizer-gtk` feature is enabled the main thread runs the
//! GTK4 demo window.  With `--headless` (or without the feature) a simple
//! blocking loop drives a logging snap target instead.
//!
//! ```text
//! snapgrid [--headless] [--config <path>] [LAYOUT...]
//! ```
//!
//! Positional `LAYOUT` arguments (e.g. `2,1 3,3,1`) replace the preset list.

use log::{error, info};
use snapgrid::command::Command;
use snapgrid::config::Config;
use snapgrid::ipc::listener::UnixSocketListener;
use snapgrid::traits::CommandSource;
use std::path::PathBuf;
use std::sync::mpsc;

/// Default socket path for the command listener.
fn default_socket_path() -> String {
    let runtime = std::env::var("XDG_RUNTIME_DIR").unwrap_or_else(|_| "/tmp".into());
    format!("{}/snapgrid.sock", runtime)
}

/// Resolve the config directory (`$XDG_CONFIG_HOME/snapgrid`).
fn config_dir() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME").unwrap_or_else(|_| {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        format!("{}/.config", home)
    });
    PathBuf::from(base).join("snapgrid")
}

/// Load the config from `path`, falling back to compiled-in defaults.
fn load_config(path: PathBuf) -> Config {
    match Config::load(&path) {
        Ok(cfg) => {
            info!("loaded config from {}", path.display());
            cfg
        }
        Err(e) => {
            info!("no config file ({}), using defaults", e);
            Config::default()
        }
    }
}

/// Resolve the CSS stylesheet path.
#[cfg(feature = "visualizer-gtk")]
fn css_path() -> PathBuf {
    config_dir().join("style.css")
}

//  Arguments

struct Args {
    headless: bool,
    config: Option<PathBuf>,
    layouts: Vec<String>,
}

fn parse_args() -> Args {
    let mut args = Args {
        headless: false,
        config: None,
        layouts: Vec::new(),
    };
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--headless" => args.headless = true,
            "--config" => args.config = it.next().map(PathBuf::from),
            _ => args.layouts.push(arg),
        }
    }
    args
}

//  Logging target (--headless)

mod logging_target {
    use log::info;
    use snapgrid::partition::Rect;
    use snapgrid::traits::SnapTarget;
    use std::cell::Cell;
    use std::convert::Infallible;

    /// Keeps the dragged window's geometry in memory and logs every change.
    pub struct LoggingTarget {
        bounds: Cell<Rect>,
    }

    impl LoggingTarget {
        pub fn new(bounds: Rect) -> Self {
            Self {
                bounds: Cell::new(bounds),
            }
        }
    }

    impl SnapTarget for LoggingTarget {
        type Error = Infallible;

        fn geometry(&self) -> Result<Rect, Infallible> {
            Ok(self.bounds.get())
        }

        fn move_to(&self, x: f64, y: f64) -> Result<(), Infallible> {
            let b = self.bounds.get();
            self.bounds
                .set(Rect::from_origin_size(x, y, b.width(), b.height()));
            Ok(())
        }

        fn resize(&self, width: f64, height: f64) -> Result<(), Infallible> {
            let b = self.bounds.get();
            let r = Rect::from_origin_size(b.x1, b.y1, width, height);
            self.bounds.set(r);
            info!("window at {}", r);
            Ok(())
        }

        fn set_opacity(&self, opacity: f64) -> Result<(), Infallible> {
            info!("window opacity {:.2}", opacity);
            Ok(())
        }
    }
}

use logging_target::LoggingTarget;

//  Main

fn main() {
    env_logger::init();

    let args = parse_args();
    let mut config = load_config(
        args.config
            .clone()
            .unwrap_or_else(|| config_dir().join("config.json")),
    );
    if let Err(e) = config.override_presets(&args.layouts) {
        error!("{}", e);
        std::process::exit(2);
    }
    info!(
        "presets: {}",
        config
            .presets
            .iter()
            .map(|p| p.to_string())
            .collect::<Vec<_>>()
            .join(" | ")
    );

    let (cmd_tx, cmd_rx) = mpsc::channel::<Command>();
    spawn_command_sources(cmd_tx.clone());

    if args.headless {
        drop(cmd_tx);
        run_headless(config, cmd_rx);
    } else {
        start_event_loop(config, cmd_tx, cmd_rx);
    }
}

//  Event loops

#[cfg(feature = "visualizer-gtk")]
fn start_event_loop(config: Config, cmd_tx: mpsc::Sender<Command>, cmd_rx: mpsc::Receiver<Command>) {
    snapgrid::visualizer::gtk::run_main_loop(config, cmd_tx, cmd_rx, Some(css_path()));
}

#[cfg(not(feature = "visualizer-gtk"))]
fn start_event_loop(config: Config, cmd_tx: mpsc::Sender<Command>, cmd_rx: mpsc::Receiver<Command>) {
    info!("built without `visualizer-gtk`, running headless");
    drop(cmd_tx);
    run_headless(config, cmd_rx);
}

/// Blocking loop that drives a [`LoggingTarget`] from the command channel.
fn run_headless(config: Config, cmd_rx: mpsc::Receiver<Command>) {
    let surface = (
        config.visualizer.surface_width as f64,
        config.visualizer.surface_height as f64,
    );
    let target = LoggingTarget::new(config.window.bounds());
    let mut session = snapgrid::session::DragSession::new(target, surface, config.presets);
    session.set_snap_options(config.snap);
    session.set_drag_opacity(config.visualizer.drag_opacity);

    info!("snapgrid running headless on {}x{}", surface.0, surface.1);
    for cmd in cmd_rx {
        if cmd == Command::Quit {
            info!("quit requested");
            break;
        }
        if let Err(e) = session.handle(cmd) {
            error!("command error: {}", e);
        }
    }
    info!("exiting");
}

//  Helpers

fn spawn_command_sources(tx: mpsc::Sender<Command>) {
    let path = default_socket_path();
    std::thread::spawn(move || {
        let mut source = UnixSocketListener::new(&path);
        if let Err(e) = source.run(tx) {
            error!("socket listener error: {}", e);
        }
    });
}

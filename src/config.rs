//! Application configuration.
//!
//! Loaded from a JSON file (`$XDG_CONFIG_HOME/snapgrid/config.json` or the
//! path given with `--config`).  Every section is optional and unknown keys
//! are ignored, so a minimal `{}` file is valid.
//!
//! # Example
//!
//! ```json
//! {
//!   "snap": { "neighbour_distance": 30.0, "merge_neighbours": true },
//!   "presets": ["2,1", "3,3,1", "3,2,2"],
//!   "window": { "x": 100, "y": 100, "width": 500, "height": 400 },
//!   "visualizer": { "surface_width": 1200, "surface_height": 800 }
//! }
//! ```
//!
//! Layout strings in `presets` are validated while the file is parsed.

use crate::partition::{LayoutSpec, Rect};
use crate::resolver::SnapOptions;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Layouts available when no configuration overrides them.
pub const DEFAULT_PRESETS: [&str; 3] = ["2,1", "3,3,1", "3,2,2"];

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Resolver settings.
    #[serde(default)]
    pub snap: SnapOptions,

    /// Preset layouts, selected with the keys `1`–`9`.
    #[serde(default = "default_presets")]
    pub presets: Vec<LayoutSpec>,

    /// Initial geometry of the dragged window.
    #[serde(default)]
    pub window: WindowConfig,

    /// Demo window and painting settings.
    #[serde(default)]
    pub visualizer: VisualizerConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            snap: SnapOptions::default(),
            presets: default_presets(),
            window: WindowConfig::default(),
            visualizer: VisualizerConfig::default(),
        }
    }
}

fn default_presets() -> Vec<LayoutSpec> {
    DEFAULT_PRESETS
        .iter()
        .filter_map(|s| s.parse().ok())
        .collect()
}

/// Initial position and size of the dragged window.
///
/// The size is also what the window returns to whenever it is not snapped.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            x: 100.0,
            y: 100.0,
            width: 500.0,
            height: 400.0,
        }
    }
}

impl WindowConfig {
    /// The configured geometry as a rectangle.
    pub fn bounds(&self) -> Rect {
        Rect::from_origin_size(self.x, self.y, self.width, self.height)
    }
}

/// Demo window and painting settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualizerConfig {
    /// Default width of the demo surface (pixels).
    pub surface_width: i32,
    /// Default height of the demo surface (pixels).
    pub surface_height: i32,
    /// Stroke width of the zone outlines.
    pub line_width: f64,
    /// Opacity of the dragged window while a drag is in progress.
    pub drag_opacity: f64,
    /// Interval between command-queue polls (ms).
    pub tick_ms: u64,
}

impl Default for VisualizerConfig {
    fn default() -> Self {
        Self {
            surface_width: 1200,
            surface_height: 800,
            line_width: 7.0,
            drag_opacity: 0.7,
            tick_ms: 16,
        }
    }
}

impl Config {
    /// Load configuration from a JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError(format!("failed to read {}: {}", path.display(), e)))?;
        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| ConfigError(format!("failed to parse {}: {}", path.display(), e)))?;
        Ok(config)
    }

    /// Replace the preset list with layouts given on the command line.
    pub fn override_presets<I, S>(&mut self, specs: I) -> Result<(), ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let presets = specs
            .into_iter()
            .map(|s| {
                let s = s.as_ref();
                s.parse()
                    .map_err(|e| ConfigError(format!("invalid layout {:?}: {}", s, e)))
            })
            .collect::<Result<Vec<LayoutSpec>, _>>()?;
        if !presets.is_empty() {
            self.presets = presets;
        }
        Ok(())
    }
}

/// Error from loading or parsing a configuration file.
#[derive(Debug, thiserror::Error)]
#[error("config error: {0}")]
pub struct ConfigError(String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_full_config() {
        let json = r#"{
            "snap": { "neighbour_distance": 50.0, "merge_neighbours": false },
            "presets": ["1,1", "4"],
            "window": { "x": 10, "y": 20, "width": 300, "height": 200 },
            "visualizer": {
                "surface_width": 1920,
                "surface_height": 1080,
                "line_width": 3.0,
                "drag_opacity": 0.5,
                "tick_ms": 8
            }
        }"#;
        let cfg: Config = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.snap.neighbour_distance, 50.0);
        assert!(!cfg.snap.merge_neighbours);
        assert_eq!(cfg.presets.len(), 2);
        assert_eq!(cfg.presets[1].columns(), &[4]);
        assert_eq!(cfg.window.bounds(), Rect::new(10.0, 20.0, 310.0, 220.0));
        assert_eq!(cfg.visualizer.surface_width, 1920);
        assert_eq!(cfg.visualizer.drag_opacity, 0.5);
        assert_eq!(cfg.visualizer.tick_ms, 8);
    }

    #[test]
    fn deserialize_empty_uses_defaults() {
        let cfg: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg.snap, SnapOptions::default());
        let presets: Vec<String> = cfg.presets.iter().map(|p| p.to_string()).collect();
        assert_eq!(presets, DEFAULT_PRESETS);
        assert_eq!(cfg.window.bounds(), WindowConfig::default().bounds());
        let vd = VisualizerConfig::default();
        assert_eq!(cfg.visualizer.surface_width, vd.surface_width);
        assert_eq!(cfg.visualizer.line_width, vd.line_width);
    }

    #[test]
    fn default_matches_empty_file() {
        let cfg = Config::default();
        assert_eq!(cfg.presets.len(), DEFAULT_PRESETS.len());
        assert_eq!(cfg.snap.neighbour_distance, 30.0);
        assert!(cfg.snap.merge_neighbours);
    }

    #[test]
    fn deserialize_partial_sections() {
        let json = r#"{ "snap": { "neighbour_distance": 12.5 }, "window": { "width": 640 } }"#;
        let cfg: Config = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.snap.neighbour_distance, 12.5);
        assert!(cfg.snap.merge_neighbours);
        assert_eq!(cfg.window.width, 640.0);
        assert_eq!(cfg.window.height, WindowConfig::default().height);
    }

    #[test]
    fn invalid_preset_fails_to_parse() {
        let json = r#"{ "presets": ["2,1", "2,x"] }"#;
        assert!(serde_json::from_str::<Config>(json).is_err());
    }

    #[test]
    fn unknown_top_level_keys_ignored() {
        let json = r#"{ "snap": {}, "future_section": { "key": 42 } }"#;
        let _cfg: Config = serde_json::from_str(json).unwrap();
    }

    #[test]
    fn override_presets_from_arguments() {
        let mut cfg = Config::default();
        cfg.override_presets(["4,4", "1"]).unwrap();
        let presets: Vec<String> = cfg.presets.iter().map(|p| p.to_string()).collect();
        assert_eq!(presets, ["4,4", "1"]);
    }

    #[test]
    fn override_presets_keeps_defaults_when_empty() {
        let mut cfg = Config::default();
        cfg.override_presets(Vec::<String>::new()).unwrap();
        assert_eq!(cfg.presets.len(), DEFAULT_PRESETS.len());
    }

    #[test]
    fn override_presets_rejects_malformed() {
        let mut cfg = Config::default();
        let err = cfg.override_presets(["2,1", "nope"]).unwrap_err();
        assert!(err.to_string().contains("nope"));
        assert_eq!(cfg.presets.len(), DEFAULT_PRESETS.len());
    }

    #[test]
    fn load_missing_file_is_an_error() {
        let path = std::env::temp_dir().join("snapgrid-test-missing-config.json");
        let _ = std::fs::remove_file(&path);
        assert!(Config::load(&path).is_err());
    }

    #[test]
    fn load_from_file() {
        let path = std::env::temp_dir().join(format!(
            "snapgrid-test-config-{}.json",
            std::process::id()
        ));
        std::fs::write(&path, r#"{ "presets": ["5"] }"#).unwrap();
        let cfg = Config::load(&path).unwrap();
        assert_eq!(cfg.presets[0].columns(), &[5]);
        let _ = std::fs::remove_file(&path);
    }
}

use crate::wire::WireStyle;
use glam::DVec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tunable constants for the canvas. Every field has a default, so a
/// config file only needs to name what it overrides.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    /// Size of one grid cell in graph units.
    pub grid_cell: f64,
    /// Screen spacing below which the dot grid doubles its spacing.
    pub grid_collapse_threshold: f64,
    /// Maximum distance of a wire's control point from its anchor, in graph units.
    pub wire_curve_length: f64,
    pub wire_style: WireStyle,
    /// Zoom change per pixel of wheel delta.
    pub wheel_zoom_rate: f64,
    /// Pixels per line for line-based wheel deltas.
    pub lines_to_pixels: f64,
    /// Distance from a port anchor, in graph units, that still hits the port.
    pub port_hit_radius: f64,
    /// Width of a regular node in grid cells.
    pub node_width_cells: u32,
    /// Width of a layer node in grid cells.
    pub layer_width_cells: u32,
    /// Fixed size of the node search menu in screen pixels.
    pub menu_size: DVec2,
    /// Sub-curve size, in graph units, at which curve/box subdivision stops.
    pub intersection_tolerance: f64,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            grid_cell: 24.0,
            grid_collapse_threshold: 10.0,
            wire_curve_length: 200.0,
            wire_style: WireStyle::Direct,
            wheel_zoom_rate: 1.0 / 200.0,
            lines_to_pixels: 20.0,
            port_hit_radius: 8.0,
            node_width_cells: 5,
            layer_width_cells: 8,
            menu_size: DVec2::new(250.0, 400.0),
            intersection_tolerance: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{field} must be a positive finite number, got {value}")]
    NotPositive { field: &'static str, value: f64 },
}

impl CanvasConfig {
    /// Rejects values that would make geometry degenerate.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("grid_cell", self.grid_cell),
            ("grid_collapse_threshold", self.grid_collapse_threshold),
            ("wire_curve_length", self.wire_curve_length),
            ("wheel_zoom_rate", self.wheel_zoom_rate),
            ("lines_to_pixels", self.lines_to_pixels),
            ("port_hit_radius", self.port_hit_radius),
            ("node_width_cells", f64::from(self.node_width_cells)),
            ("layer_width_cells", f64::from(self.layer_width_cells)),
            ("menu_size.x", self.menu_size.x),
            ("menu_size.y", self.menu_size.y),
            ("intersection_tolerance", self.intersection_tolerance),
        ];
        for (field, value) in fields {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::NotPositive { field, value });
            }
        }
        Ok(())
    }
}

//! Colours for the graph editor.

use gpui::Hsla;
use node::DataType;

/// Theme colors for the graph canvas.
#[derive(Clone, Debug)]
pub struct Theme {
    /// Canvas background
    pub canvas_background: Hsla,

    /// Grid dots
    pub grid: Hsla,

    /// Node body fill
    pub node_background: Hsla,

    /// Node body fill when disabled
    pub node_disabled: Hsla,

    /// Node border
    pub node_border: Hsla,

    /// Selection indicator color
    pub selection: Hsla,

    /// Border of the previewed node
    pub preview: Hsla,

    /// UI background (search menu)
    pub ui_background: Hsla,

    /// UI border
    pub ui_border: Hsla,

    /// UI text
    pub ui_text: Hsla,

    /// UI text muted
    pub ui_text_muted: Hsla,
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            canvas_background: hsla(0.0, 0.0, 0.1, 1.0),
            grid: hsla(0.0, 0.0, 0.25, 1.0),
            node_background: hsla(0.0, 0.0, 0.18, 1.0),
            node_disabled: hsla(0.0, 0.0, 0.13, 1.0),
            node_border: hsla(0.0, 0.0, 0.3, 1.0),
            selection: hsla(0.58, 0.9, 0.5, 1.0),
            preview: hsla(0.13, 0.9, 0.55, 1.0),
            ui_background: hsla(0.0, 0.0, 0.12, 1.0),
            ui_border: hsla(0.0, 0.0, 0.2, 1.0),
            ui_text: hsla(0.0, 0.0, 0.9, 1.0),
            ui_text_muted: hsla(0.0, 0.0, 0.5, 1.0),
        }
    }

    /// Wire and port colour for a data type.
    pub fn data_type(&self, data_type: DataType) -> Hsla {
        match data_type {
            DataType::General => hsla(0.0, 0.0, 0.6, 1.0),
            DataType::Number => hsla(0.0, 0.0, 0.8, 1.0),
            DataType::Artboard => hsla(0.9, 0.7, 0.6, 1.0),
            DataType::Graphic => hsla(0.08, 0.9, 0.55, 1.0),
            DataType::Raster => hsla(0.35, 0.7, 0.45, 1.0),
            DataType::Vector => hsla(0.58, 0.8, 0.5, 1.0),
            DataType::Color => hsla(0.13, 0.9, 0.55, 1.0),
            DataType::Gradient => hsla(0.75, 0.6, 0.55, 1.0),
            DataType::Typography => hsla(0.0, 0.8, 0.5, 1.0),
        }
    }
}

/// Helper to create Hsla from h, s, l, a values.
pub fn hsla(h: f32, s: f32, l: f32, a: f32) -> Hsla {
    Hsla { h, s, l, a }
}

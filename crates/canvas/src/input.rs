//! Renderer-independent input events. Front ends translate their native
//! events into these before handing them to the canvas.

use glam::DVec2;
use node::ScreenPoint;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MouseButton {
    #[default]
    Left,
    Middle,
    Right,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    pub shift: bool,
    /// Ctrl, or Cmd on macOS.
    pub ctrl: bool,
    pub alt: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
    };

    pub fn shift() -> Self {
        Self {
            shift: true,
            ..Self::NONE
        }
    }

    pub fn ctrl() -> Self {
        Self {
            ctrl: true,
            ..Self::NONE
        }
    }

    pub fn alt() -> Self {
        Self {
            alt: true,
            ..Self::NONE
        }
    }

    /// True when the modifiers toggle selection membership instead of replacing it.
    pub fn toggles_selection(&self) -> bool {
        self.shift || self.ctrl
    }
}

/// A pointer press, move or release at a screen position.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub position: ScreenPoint,
    #[serde(default)]
    pub button: MouseButton,
    #[serde(default)]
    pub modifiers: Modifiers,
}

impl PointerEvent {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            position: ScreenPoint::new(x, y),
            button: MouseButton::Left,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn with_button(mut self, button: MouseButton) -> Self {
        self.button = button;
        self
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// Scroll amount as reported by the platform.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "unit", content = "delta", rename_all = "snake_case")]
pub enum WheelDelta {
    Pixels(DVec2),
    Lines(DVec2),
}

impl WheelDelta {
    pub fn to_pixels(self, lines_to_pixels: f64) -> DVec2 {
        match self {
            WheelDelta::Pixels(delta) => delta,
            WheelDelta::Lines(delta) => delta * lines_to_pixels,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WheelEvent {
    pub position: ScreenPoint,
    pub delta: WheelDelta,
    #[serde(default)]
    pub modifiers: Modifiers,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Key {
    Escape,
    Delete,
    Backspace,
    Character(char),
}

/// Everything a front end can feed the canvas, in one serializable form.
///
/// Used to script interaction sessions.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum InputEvent {
    PointerDown(PointerEvent),
    PointerMove(PointerEvent),
    PointerUp(PointerEvent),
    Wheel(WheelEvent),
    KeyDown {
        key: Key,
        #[serde(default)]
        modifiers: Modifiers,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_deltas_scale_to_pixels() {
        let delta = WheelDelta::Lines(DVec2::new(0.0, 3.0));
        assert_eq!(delta.to_pixels(20.0), DVec2::new(0.0, 60.0));
        assert_eq!(WheelDelta::Pixels(DVec2::ONE).to_pixels(20.0), DVec2::ONE);
    }

    #[test]
    fn scripted_events_parse() {
        let json = r#"[
            { "event": "pointer_down", "position": [10, 20], "button": "right" },
            { "event": "pointer_move", "position": [12, 20] },
            { "event": "key_down", "key": "escape" },
            { "event": "wheel", "position": [0, 0], "delta": { "unit": "lines", "delta": [0, -1] },
              "modifiers": { "ctrl": true } }
        ]"#;
        let events: Vec<InputEvent> = serde_json::from_str(json).unwrap();
        assert_eq!(events.len(), 4);
        assert_eq!(
            events[0],
            InputEvent::PointerDown(PointerEvent::new(10.0, 20.0).with_button(MouseButton::Right))
        );
        assert!(matches!(events[3], InputEvent::Wheel(WheelEvent { modifiers, .. }) if modifiers.ctrl));
    }
}

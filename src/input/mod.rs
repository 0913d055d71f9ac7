//! @acp:module "Input Router"
//! @acp:summary "Maps raw pointer and keyboard events to overlay actions"
//! @acp:domain input
//! @acp:layer adapter
//!
//! Only the two reserved chords suppress default handling; every other
//! event passes through untouched.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::KeysConfig;
use crate::dom::NodeId;
use crate::error::{InspectorError, Result};
use crate::geometry::Point;

/// A key plus required modifiers, e.g. `Shift+Z`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyChord {
    pub key: String,
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl KeyChord {
    /// Modifiers listed in the chord must be held; others are ignored
    pub fn matches(&self, key: &KeyPress) -> bool {
        key.key.eq_ignore_ascii_case(&self.key)
            && (!self.shift || key.shift)
            && (!self.ctrl || key.ctrl)
            && (!self.alt || key.alt)
            && (!self.meta || key.meta)
    }

    /// True when every press matching `other` also matches `self`
    pub fn shadows(&self, other: &KeyChord) -> bool {
        self.key.eq_ignore_ascii_case(&other.key)
            && (!self.shift || other.shift)
            && (!self.ctrl || other.ctrl)
            && (!self.alt || other.alt)
            && (!self.meta || other.meta)
    }
}

impl FromStr for KeyChord {
    type Err = InspectorError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut chord = KeyChord {
            key: String::new(),
            shift: false,
            ctrl: false,
            alt: false,
            meta: false,
        };

        let parts: Vec<&str> = s.split('+').map(str::trim).collect();
        let Some((key, modifiers)) = parts.split_last() else {
            return Err(InspectorError::InvalidChord(s.to_string()));
        };

        for modifier in modifiers {
            match modifier.to_lowercase().as_str() {
                "shift" => chord.shift = true,
                "ctrl" | "control" => chord.ctrl = true,
                "alt" | "option" => chord.alt = true,
                "meta" | "cmd" | "super" => chord.meta = true,
                _ => return Err(InspectorError::InvalidChord(s.to_string())),
            }
        }

        if key.is_empty() {
            return Err(InspectorError::InvalidChord(s.to_string()));
        }
        chord.key = key.to_string();
        Ok(chord)
    }
}

impl fmt::Display for KeyChord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ctrl {
            write!(f, "Ctrl+")?;
        }
        if self.alt {
            write!(f, "Alt+")?;
        }
        if self.meta {
            write!(f, "Meta+")?;
        }
        if self.shift {
            write!(f, "Shift+")?;
        }
        write!(f, "{}", self.key.to_uppercase())
    }
}

/// A key-down event as delivered by the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyPress {
    pub key: String,
    #[serde(default)]
    pub shift: bool,
    #[serde(default)]
    pub ctrl: bool,
    #[serde(default)]
    pub alt: bool,
    #[serde(default)]
    pub meta: bool,
}

impl KeyPress {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            shift: false,
            ctrl: false,
            alt: false,
            meta: false,
        }
    }

    pub fn shifted(key: impl Into<String>) -> Self {
        Self {
            shift: true,
            ..Self::new(key)
        }
    }
}

/// @acp:summary "Closed set of raw events the inspector consumes"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputEvent {
    KeyDown(KeyPress),
    PointerMove { target: NodeId, x: f32, y: f32 },
    /// Pointer left the document
    PointerLeave,
    /// Press on the pinned overlay's drag handle
    HandleDown { x: f32, y: f32 },
    PointerUp { x: f32, y: f32 },
    CloseClick,
}

/// @acp:summary "Named transitions understood by the overlay controller"
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    ToggleInspection,
    EnableInspection,
    DisableInspection,
    PointerMove { target: NodeId, at: Point },
    PointerLeave,
    PinRequest,
    Escape,
    CloseButton,
    DragStart(Point),
    DragMove(Point),
    DragEnd,
}

/// Result of routing one event
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Routed {
    pub actions: Vec<Action>,
    /// Host should suppress its default handling
    pub prevent_default: bool,
}

impl Routed {
    fn pass(actions: Vec<Action>) -> Self {
        Self {
            actions,
            prevent_default: false,
        }
    }

    fn reserved(action: Action) -> Self {
        Self {
            actions: vec![action],
            prevent_default: true,
        }
    }
}

/// @acp:summary "Event router holding the two reserved chords"
#[derive(Debug, Clone)]
pub struct InputRouter {
    toggle_inspection: KeyChord,
    toggle_pin: KeyChord,
}

impl Default for InputRouter {
    fn default() -> Self {
        Self {
            toggle_inspection: KeyChord {
                key: "z".to_string(),
                shift: true,
                ctrl: false,
                alt: false,
                meta: false,
            },
            toggle_pin: KeyChord {
                key: "a".to_string(),
                shift: true,
                ctrl: false,
                alt: false,
                meta: false,
            },
        }
    }
}

impl InputRouter {
    pub fn new(toggle_inspection: KeyChord, toggle_pin: KeyChord) -> Self {
        Self {
            toggle_inspection,
            toggle_pin,
        }
    }

    /// Rejects chord pairs where one would swallow presses meant for the other
    pub fn from_config(keys: &KeysConfig) -> Result<Self> {
        let toggle_inspection: KeyChord = keys.toggle_inspection.parse()?;
        let toggle_pin: KeyChord = keys.toggle_pin.parse()?;

        if toggle_inspection.shadows(&toggle_pin) || toggle_pin.shadows(&toggle_inspection) {
            return Err(InspectorError::InvalidChord(format!(
                "{} and {} overlap",
                toggle_inspection, toggle_pin
            )));
        }
        Ok(Self::new(toggle_inspection, toggle_pin))
    }

    pub fn pin_chord(&self) -> &KeyChord {
        &self.toggle_pin
    }

    pub fn inspection_chord(&self) -> &KeyChord {
        &self.toggle_inspection
    }

    /// `dragging` reflects whether drag listeners are currently attached
    pub fn route(&self, event: &InputEvent, dragging: bool) -> Routed {
        match event {
            InputEvent::KeyDown(key) => {
                if key.key == "Escape" {
                    Routed::pass(vec![Action::Escape])
                } else if self.toggle_inspection.matches(key) {
                    Routed::reserved(Action::ToggleInspection)
                } else if self.toggle_pin.matches(key) {
                    Routed::reserved(Action::PinRequest)
                } else {
                    Routed::default()
                }
            }
            InputEvent::PointerMove { target, x, y } => {
                let at = Point::new(*x, *y);
                let hover = Action::PointerMove {
                    target: *target,
                    at,
                };
                if dragging {
                    Routed::pass(vec![Action::DragMove(at), hover])
                } else {
                    Routed::pass(vec![hover])
                }
            }
            InputEvent::PointerLeave => Routed::pass(vec![Action::PointerLeave]),
            InputEvent::HandleDown { x, y } => {
                Routed::pass(vec![Action::DragStart(Point::new(*x, *y))])
            }
            InputEvent::PointerUp { .. } if dragging => Routed::pass(vec![Action::DragEnd]),
            InputEvent::PointerUp { .. } => Routed::default(),
            InputEvent::CloseClick => Routed::pass(vec![Action::CloseButton]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chord_from_str() {
        let chord: KeyChord = "Shift+Z".parse().unwrap();
        assert!(chord.shift);
        assert!(!chord.ctrl);
        assert_eq!(chord.key, "Z");
        assert_eq!(chord.to_string(), "Shift+Z");

        let chord: KeyChord = "ctrl + alt + i".parse().unwrap();
        assert!(chord.ctrl && chord.alt && !chord.shift);

        assert!("Shift+".parse::<KeyChord>().is_err());
        assert!("Hyper+Z".parse::<KeyChord>().is_err());
        assert!("".parse::<KeyChord>().is_err());
    }

    #[test]
    fn test_chord_matching_is_case_insensitive() {
        let chord: KeyChord = "Shift+Z".parse().unwrap();
        assert!(chord.matches(&KeyPress::shifted("Z")));
        assert!(chord.matches(&KeyPress::shifted("z")));
        assert!(!chord.matches(&KeyPress::new("z")));
    }

    #[test]
    fn test_overlapping_chords_rejected() {
        let keys = |inspection: &str, pin: &str| KeysConfig {
            toggle_inspection: inspection.to_string(),
            toggle_pin: pin.to_string(),
        };

        assert!(InputRouter::from_config(&keys("Shift+Z", "Ctrl+Shift+Z")).is_err());
        assert!(InputRouter::from_config(&keys("Ctrl+Shift+Z", "shift+z")).is_err());
        assert!(InputRouter::from_config(&keys("Shift+A", "Shift+A")).is_err());

        assert!(InputRouter::from_config(&keys("Shift+Z", "Shift+A")).is_ok());
        assert!(InputRouter::from_config(&keys("Shift+Z", "Ctrl+Z")).is_ok());
    }

    #[test]
    fn test_reserved_chords_prevent_default() {
        let router = InputRouter::default();

        let routed = router.route(&InputEvent::KeyDown(KeyPress::shifted("Z")), false);
        assert_eq!(routed.actions, vec![Action::ToggleInspection]);
        assert!(routed.prevent_default);

        let routed = router.route(&InputEvent::KeyDown(KeyPress::shifted("a")), false);
        assert_eq!(routed.actions, vec![Action::PinRequest]);
        assert!(routed.prevent_default);
    }

    #[test]
    fn test_other_input_passes_through() {
        let router = InputRouter::default();

        let routed = router.route(&InputEvent::KeyDown(KeyPress::new("Escape")), false);
        assert_eq!(routed.actions, vec![Action::Escape]);
        assert!(!routed.prevent_default);

        let routed = router.route(&InputEvent::KeyDown(KeyPress::new("a")), false);
        assert!(routed.actions.is_empty());
        assert!(!routed.prevent_default);
    }

    #[test]
    fn test_drag_routing() {
        let router = InputRouter::default();
        let mv = InputEvent::PointerMove {
            target: NodeId(3),
            x: 5.0,
            y: 6.0,
        };

        assert_eq!(router.route(&mv, false).actions.len(), 1);
        let routed = router.route(&mv, true);
        assert_eq!(routed.actions[0], Action::DragMove(Point::new(5.0, 6.0)));

        let up = InputEvent::PointerUp { x: 0.0, y: 0.0 };
        assert!(router.route(&up, false).actions.is_empty());
        assert_eq!(router.route(&up, true).actions, vec![Action::DragEnd]);
    }

    #[test]
    fn test_event_json() {
        let event: InputEvent =
            serde_json::from_str(r#"{"type": "key_down", "key": "Z", "shift": true}"#).unwrap();
        assert_eq!(event, InputEvent::KeyDown(KeyPress::shifted("Z")));

        let event: InputEvent =
            serde_json::from_str(r#"{"type": "pointer_move", "target": 7, "x": 1, "y": 2}"#).unwrap();
        assert_eq!(
            event,
            InputEvent::PointerMove {
                target: NodeId(7),
                x: 1.0,
                y: 2.0
            }
        );
    }
}

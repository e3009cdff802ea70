//! Input events for editor interaction.
//!
//! Pointer, wheel and touch coordinates are in stage (screen) pixels. Element
//! drag and transform events carry design-space node geometry reported by
//! the rendering surface.

use serde::{Deserialize, Serialize};

use crate::element::{ElementId, PositionalPatch};
use crate::error::{EditorError, EditorResult};

/// What a pointer press landed on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "camelCase")]
pub enum HitTarget {
    /// Empty stage outside the tile.
    Stage,
    /// The tile rectangle itself.
    TemplateOutline,
    /// An element.
    Element(ElementId),
}

/// Phase of a touch event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TouchPhase {
    /// Finger down.
    Start,
    /// Finger moved.
    Move,
    /// Finger up.
    End,
    /// Touch cancelled by the platform.
    Cancel,
}

/// A single touch point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TouchPoint {
    /// Touch identifier.
    pub id: u32,
    /// X position in stage coordinates.
    pub x: f32,
    /// Y position in stage coordinates.
    pub y: f32,
}

impl TouchPoint {
    /// Create a touch point.
    #[must_use]
    pub const fn new(id: u32, x: f32, y: f32) -> Self {
        Self { id, x, y }
    }
}

/// A touch event with all currently active touch points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TouchEvent {
    /// Phase of this event.
    pub phase: TouchPhase,
    /// Active touch points.
    pub touches: Vec<TouchPoint>,
}

impl TouchEvent {
    /// Create a touch event.
    #[must_use]
    pub fn new(phase: TouchPhase, touches: Vec<TouchPoint>) -> Self {
        Self { phase, touches }
    }

    /// The first touch point.
    #[must_use]
    pub fn primary_touch(&self) -> Option<&TouchPoint> {
        self.touches.first()
    }

    /// Distance between the first two touches, when there are two.
    #[must_use]
    pub fn pinch_distance(&self) -> Option<f32> {
        match self.touches.as_slice() {
            [a, b, ..] => Some((b.x - a.x).hypot(b.y - a.y)),
            _ => None,
        }
    }
}

/// Phase of an element drag or transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GesturePhase {
    /// Gesture began.
    Start,
    /// Intermediate frame.
    Move,
    /// Gesture finished; commit.
    End,
}

/// Live node geometry during a resize or rotate.
///
/// `width`/`height` are the node's unscaled size; the handles report their
/// effect through `scale_x`/`scale_y`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveTransform {
    /// Node left edge.
    pub x: f32,
    /// Node top edge.
    pub y: f32,
    /// Unscaled node width.
    pub width: f32,
    /// Unscaled node height.
    pub height: f32,
    /// Horizontal scale applied by the handles.
    pub scale_x: f32,
    /// Vertical scale applied by the handles.
    pub scale_y: f32,
    /// Rotation in degrees.
    pub rotation: f32,
}

impl LiveTransform {
    /// Bake the live scale into a size, never below `min_size`.
    #[must_use]
    pub fn bake(&self, min_size: f32) -> PositionalPatch {
        PositionalPatch {
            x: Some(self.x),
            y: Some(self.y),
            width: Some((self.width * self.scale_x).abs().max(min_size)),
            height: Some((self.height * self.scale_y).abs().max(min_size)),
            rotation: Some(self.rotation),
        }
    }
}

/// All input events the editor can receive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    content = "data",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum InputEvent {
    /// Mouse wheel.
    Wheel {
        /// Pointer X.
        x: f32,
        /// Pointer Y.
        y: f32,
        /// Wheel delta; positive scrolls down (zoom out).
        delta_y: f32,
    },

    /// Mouse button pressed.
    PointerDown {
        /// Pointer X.
        x: f32,
        /// Pointer Y.
        y: f32,
        /// What was hit; `None` lets the editor hit-test itself.
        #[serde(default)]
        target: Option<HitTarget>,
    },

    /// Mouse moved.
    PointerMove {
        /// Pointer X.
        x: f32,
        /// Pointer Y.
        y: f32,
    },

    /// Mouse button released.
    PointerUp {
        /// Pointer X.
        x: f32,
        /// Pointer Y.
        y: f32,
    },

    /// Pointer left the stage.
    PointerLeave,

    /// Raw touch event.
    Touch(TouchEvent),

    /// Editor container resized.
    ContainerResize {
        /// New width.
        width: f32,
        /// New height.
        height: f32,
    },

    /// An element is being dragged.
    ElementDrag {
        /// Dragged element.
        id: ElementId,
        /// Gesture phase.
        phase: GesturePhase,
        /// Node left edge.
        x: f32,
        /// Node top edge.
        y: f32,
    },

    /// An element is being resized or rotated.
    ElementTransform {
        /// Transformed element.
        id: ElementId,
        /// Gesture phase.
        phase: GesturePhase,
        /// Current node geometry.
        live: LiveTransform,
    },
}

impl InputEvent {
    /// Short name for logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Wheel { .. } => "wheel",
            Self::PointerDown { .. } => "pointer_down",
            Self::PointerMove { .. } => "pointer_move",
            Self::PointerUp { .. } => "pointer_up",
            Self::PointerLeave => "pointer_leave",
            Self::Touch(_) => "touch",
            Self::ContainerResize { .. } => "container_resize",
            Self::ElementDrag { .. } => "element_drag",
            Self::ElementTransform { .. } => "element_transform",
        }
    }

    /// Reject events carrying NaN or infinite numbers.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::InvalidInput`] naming the event.
    pub fn validate(&self) -> EditorResult<()> {
        let finite = match self {
            Self::Wheel { x, y, delta_y } => [*x, *y, *delta_y].iter().all(|v| v.is_finite()),
            Self::PointerDown { x, y, .. }
            | Self::PointerMove { x, y }
            | Self::PointerUp { x, y }
            | Self::ElementDrag { x, y, .. } => x.is_finite() && y.is_finite(),
            Self::ContainerResize { width, height } => width.is_finite() && height.is_finite(),
            Self::Touch(touch) => touch
                .touches
                .iter()
                .all(|t| t.x.is_finite() && t.y.is_finite()),
            Self::ElementTransform { live, .. } => [
                live.x,
                live.y,
                live.width,
                live.height,
                live.scale_x,
                live.scale_y,
                live.rotation,
            ]
            .iter()
            .all(|v| v.is_finite()),
            Self::PointerLeave => true,
        };
        if finite {
            Ok(())
        } else {
            Err(EditorError::InvalidInput(format!(
                "non-finite coordinates in {} event",
                self.name()
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pinch_distance() {
        let event = TouchEvent::new(
            TouchPhase::Move,
            vec![TouchPoint::new(0, 0.0, 0.0), TouchPoint::new(1, 3.0, 4.0)],
        );
        assert_eq!(event.pinch_distance(), Some(5.0));
        let single = TouchEvent::new(TouchPhase::Move, vec![TouchPoint::new(0, 1.0, 1.0)]);
        assert!(single.pinch_distance().is_none());
    }

    #[test]
    fn test_bake_applies_floor() {
        let live = LiveTransform {
            x: 10.0,
            y: 20.0,
            width: 200.0,
            height: 50.0,
            scale_x: 0.01,
            scale_y: 2.0,
            rotation: 15.0,
        };
        let patch = live.bake(5.0);
        assert_eq!(patch.width, Some(5.0));
        assert_eq!(patch.height, Some(100.0));
        assert_eq!(patch.rotation, Some(15.0));
    }

    #[test]
    fn test_validate_rejects_non_finite() {
        let wheel = InputEvent::Wheel {
            x: 1.0,
            y: 2.0,
            delta_y: f32::NAN,
        };
        assert!(matches!(wheel.validate(), Err(EditorError::InvalidInput(_))));
        let resize = InputEvent::ContainerResize {
            width: f32::INFINITY,
            height: 10.0,
        };
        assert!(resize.validate().is_err());
        let touch = InputEvent::Touch(TouchEvent::new(
            TouchPhase::Move,
            vec![TouchPoint::new(0, 0.0, f32::NEG_INFINITY)],
        ));
        assert!(touch.validate().is_err());
        assert!(InputEvent::PointerMove { x: 3.0, y: 4.0 }.validate().is_ok());
        assert!(InputEvent::PointerLeave.validate().is_ok());
    }

    #[test]
    fn test_event_json() {
        let event: InputEvent = serde_json::from_str(
            r#"{"type":"pointerDown","data":{"x":1,"y":2,"target":{"kind":"element","id":"t1"}}}"#,
        )
        .expect("parse");
        assert_eq!(
            event,
            InputEvent::PointerDown {
                x: 1.0,
                y: 2.0,
                target: Some(HitTarget::Element(ElementId::new("t1"))),
            }
        );
        let leave: InputEvent = serde_json::from_str(r#"{"type":"pointerLeave"}"#).expect("parse");
        assert_eq!(leave, InputEvent::PointerLeave);
    }
}

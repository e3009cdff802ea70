//! Gesture and viewport controller.
//!
//! Turns raw input into reducer actions. Transient interaction state (pan
//! anchors, pinch baseline, live element previews) lives here and never in
//! the document.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::action::Action;
use crate::document::EditorDocument;
use crate::element::{EditorElement, ElementId, ElementPatch};
use crate::event::{
    GesturePhase, HitTarget, InputEvent, LiveTransform, TouchEvent, TouchPhase,
};
use crate::scene::hit_test;
use crate::viewport::{fit, ScaleBounds};

/// How a one-finger touch moves the viewport.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TouchPanMode {
    /// Offset from the touch-start anchor, like mouse panning.
    #[default]
    Delta,
    /// Viewport origin jumps to the raw touch position.
    Absolute,
}

/// Gesture tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GestureConfig {
    /// Allowed zoom range.
    pub scale_bounds: ScaleBounds,
    /// Multiplier per wheel notch.
    pub wheel_factor: f32,
    /// One-finger touch behaviour.
    pub touch_pan: TouchPanMode,
    /// Smallest committed element side, in pixels.
    pub min_element_size: f32,
    /// Fraction of the container the fitted template occupies.
    pub fit_margin: f32,
    /// Zoom step for the panel editor's buttons.
    pub zoom_step: f32,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            scale_bounds: ScaleBounds::FREE,
            wheel_factor: 1.1,
            touch_pan: TouchPanMode::Delta,
            min_element_size: 5.0,
            fit_margin: 0.9,
            zoom_step: 0.1,
        }
    }
}

impl GestureConfig {
    /// Settings for the simplified panel editor.
    #[must_use]
    pub fn panel() -> Self {
        Self {
            scale_bounds: ScaleBounds::PANEL,
            ..Self::default()
        }
    }
}

/// An uncommitted element change shown while a gesture is in progress.
#[derive(Debug, Clone, PartialEq)]
pub enum Preview {
    /// Element being dragged to a node position.
    Drag {
        /// Dragged element.
        id: ElementId,
        /// Node left edge.
        x: f32,
        /// Node top edge.
        y: f32,
    },
    /// Element being resized or rotated.
    Transform {
        /// Transformed element.
        id: ElementId,
        /// Live node geometry.
        live: LiveTransform,
    },
}

impl Preview {
    /// Element the preview belongs to.
    #[must_use]
    pub fn id(&self) -> &ElementId {
        match self {
            Self::Drag { id, .. } | Self::Transform { id, .. } => id,
        }
    }

    /// Show the preview on a copy of the element.
    pub fn apply(&self, element: &mut EditorElement) {
        match self {
            Self::Drag { x, y, .. } => {
                element.x = *x;
                element.y = *y;
            }
            Self::Transform { live, .. } => live.bake(0.0).apply(element),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct PanAnchor {
    pointer: (f32, f32),
    origin: (f32, f32),
    moved: bool,
    deselect_on_click: bool,
}

#[derive(Debug, Clone, Copy, Default)]
enum TouchState {
    #[default]
    Idle,
    Panning(PanAnchor),
    Pinching {
        last_dist: f32,
    },
}

/// Key deciding whether the viewport needs a new fit.
#[derive(Debug, Clone, Copy, PartialEq)]
struct FitKey {
    container: (f32, f32),
    template: (u32, u32),
}

/// Translates input into actions and owns transient gesture state.
#[derive(Debug, Clone, Default)]
pub struct GestureController {
    config: GestureConfig,
    pan: Option<PanAnchor>,
    touch: TouchState,
    container: Option<(f32, f32)>,
    last_fit: Option<FitKey>,
    preview: Option<Preview>,
}

impl GestureController {
    /// Create a controller with the given tuning.
    #[must_use]
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Current tuning.
    #[must_use]
    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    /// Whether a mouse pan is in progress.
    #[must_use]
    pub fn is_panning(&self) -> bool {
        self.pan.is_some()
    }

    /// In-progress element preview, if any.
    #[must_use]
    pub fn preview(&self) -> Option<&Preview> {
        self.preview.as_ref()
    }

    /// Handle one input event against the latest committed document.
    pub fn handle(&mut self, document: &EditorDocument, event: &InputEvent) -> Vec<Action> {
        match event {
            InputEvent::Wheel { x, y, delta_y } => self.wheel(document, *x, *y, *delta_y),
            InputEvent::PointerDown { x, y, target } => {
                let target = target
                    .clone()
                    .unwrap_or_else(|| hit_test(document, *x, *y));
                self.pointer_down(document, *x, *y, target)
            }
            InputEvent::PointerMove { x, y } => self.pointer_move(*x, *y),
            InputEvent::PointerUp { .. } => self.pointer_up(),
            InputEvent::PointerLeave => {
                self.pan = None;
                Vec::new()
            }
            InputEvent::Touch(touch) => self.touch(document, touch),
            InputEvent::ContainerResize { width, height } => {
                self.container = Some((*width, *height));
                self.refit(document)
            }
            InputEvent::ElementDrag { id, phase, x, y } => {
                let preview = Preview::Drag {
                    id: id.clone(),
                    x: *x,
                    y: *y,
                };
                self.element_gesture(document, *phase, preview)
            }
            InputEvent::ElementTransform { id, phase, live } => {
                let preview = Preview::Transform {
                    id: id.clone(),
                    live: *live,
                };
                self.element_gesture(document, *phase, preview)
            }
        }
    }

    /// Fit the template to the container once per container or template
    /// size change.
    pub fn refit(&mut self, document: &EditorDocument) -> Vec<Action> {
        let Some((width, height)) = self.container else {
            return Vec::new();
        };
        let key = FitKey {
            container: (width, height),
            template: (document.template.width, document.template.height),
        };
        if self.last_fit == Some(key) {
            return Vec::new();
        }
        let Some(fitted) = fit(
            width,
            height,
            &document.template,
            self.config.fit_margin,
            self.config.scale_bounds,
        ) else {
            return Vec::new();
        };
        self.last_fit = Some(key);
        debug!(scale = fitted.scale, x = fitted.x, y = fitted.y, "Fitting template");
        vec![
            Action::SetCanvasScale(fitted.scale),
            Action::SetCanvasPosition {
                x: fitted.x,
                y: fitted.y,
            },
        ]
    }

    /// Additive zoom used by the panel editor's buttons.
    #[must_use]
    pub fn step_zoom(&self, document: &EditorDocument, steps: i8) -> Vec<Action> {
        let step = self.config.zoom_step * f32::from(steps);
        vec![Action::SetCanvasScale(
            document
                .canvas
                .stepped_scale(step, self.config.scale_bounds),
        )]
    }

    fn wheel(&self, document: &EditorDocument, x: f32, y: f32, delta_y: f32) -> Vec<Action> {
        let old = document.canvas.scale;
        let factor = self.config.wheel_factor;
        let proposed = if delta_y > 0.0 {
            old / factor
        } else if delta_y < 0.0 {
            old * factor
        } else {
            return Vec::new();
        };
        let scale = self.config.scale_bounds.clamp(proposed);
        let (nx, ny) = document.canvas.origin_for_zoom_at(x, y, scale);
        vec![
            Action::SetCanvasScale(scale),
            Action::SetCanvasPosition { x: nx, y: ny },
        ]
    }

    fn pointer_down(
        &mut self,
        document: &EditorDocument,
        x: f32,
        y: f32,
        target: HitTarget,
    ) -> Vec<Action> {
        match target {
            HitTarget::Element(id) => {
                self.pan = None;
                vec![Action::SelectElement(Some(id))]
            }
            HitTarget::Stage | HitTarget::TemplateOutline => {
                debug!(x, y, "Pan started");
                self.pan = Some(PanAnchor {
                    pointer: (x, y),
                    origin: (document.canvas.x, document.canvas.y),
                    moved: false,
                    deselect_on_click: target == HitTarget::Stage,
                });
                Vec::new()
            }
        }
    }

    fn pointer_move(&mut self, x: f32, y: f32) -> Vec<Action> {
        let Some(anchor) = self.pan.as_mut() else {
            return Vec::new();
        };
        pan_to(anchor, x, y)
    }

    fn pointer_up(&mut self) -> Vec<Action> {
        match self.pan.take() {
            Some(anchor) if anchor.deselect_on_click && !anchor.moved => {
                vec![Action::SelectElement(None)]
            }
            _ => Vec::new(),
        }
    }

    fn touch(&mut self, document: &EditorDocument, event: &TouchEvent) -> Vec<Action> {
        match event.phase {
            TouchPhase::Start => {
                self.touch = match (event.primary_touch(), event.pinch_distance()) {
                    (_, Some(dist)) => TouchState::Pinching { last_dist: dist },
                    (Some(point), None) => TouchState::Panning(PanAnchor {
                        pointer: (point.x, point.y),
                        origin: (document.canvas.x, document.canvas.y),
                        moved: false,
                        deselect_on_click: false,
                    }),
                    (None, None) => TouchState::Idle,
                };
                Vec::new()
            }
            TouchPhase::Move => self.touch_move(document, event),
            TouchPhase::End | TouchPhase::Cancel => {
                self.touch = TouchState::Idle;
                Vec::new()
            }
        }
    }

    fn touch_move(&mut self, document: &EditorDocument, event: &TouchEvent) -> Vec<Action> {
        let mode = self.config.touch_pan;
        let bounds = self.config.scale_bounds;
        match (&mut self.touch, event.touches.as_slice()) {
            (TouchState::Panning(anchor), [point]) => match mode {
                TouchPanMode::Delta => pan_to(anchor, point.x, point.y),
                TouchPanMode::Absolute => vec![Action::SetCanvasPosition {
                    x: point.x,
                    y: point.y,
                }],
            },
            (TouchState::Pinching { last_dist }, [_, _, ..]) => {
                let Some(dist) = event.pinch_distance() else {
                    return Vec::new();
                };
                if *last_dist <= f32::EPSILON {
                    *last_dist = dist;
                    return Vec::new();
                }
                let scale = bounds.clamp(document.canvas.scale * dist / *last_dist);
                *last_dist = dist;
                vec![Action::SetCanvasScale(scale)]
            }
            (state, touches) => {
                // A second finger landed mid-pan: start pinching from here.
                if let Some(dist) = event.pinch_distance() {
                    *state = TouchState::Pinching { last_dist: dist };
                } else if touches.is_empty() {
                    *state = TouchState::Idle;
                }
                Vec::new()
            }
        }
    }

    fn element_gesture(
        &mut self,
        document: &EditorDocument,
        phase: GesturePhase,
        preview: Preview,
    ) -> Vec<Action> {
        if document.is_read_only() {
            self.preview = None;
            return Vec::new();
        }
        match phase {
            GesturePhase::Start | GesturePhase::Move => {
                self.preview = Some(preview);
                Vec::new()
            }
            GesturePhase::End => {
                self.preview = None;
                let updates = match &preview {
                    Preview::Drag { x, y, .. } => ElementPatch::moved_to(*x, *y),
                    Preview::Transform { live, .. } => {
                        ElementPatch::positional(live.bake(self.config.min_element_size))
                    }
                };
                debug!(element = %preview.id(), "Committing element gesture");
                vec![Action::UpdateElement {
                    id: preview.id().clone(),
                    updates,
                }]
            }
        }
    }
}

fn pan_to(anchor: &mut PanAnchor, x: f32, y: f32) -> Vec<Action> {
    let dx = x - anchor.pointer.0;
    let dy = y - anchor.pointer.1;
    if dx.abs() > f32::EPSILON || dy.abs() > f32::EPSILON {
        anchor.moved = true;
    }
    vec![Action::SetCanvasPosition {
        x: anchor.origin.0 + dx,
        y: anchor.origin.1 + dy,
    }]
}

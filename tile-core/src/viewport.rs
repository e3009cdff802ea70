//! Viewport state: pan offset, zoom level and container size.
//!
//! The viewport maps design-space pixels (relative to the unscaled template)
//! onto the screen: `screen = design * scale + (x, y)`.

use serde::{Deserialize, Serialize};

use crate::template::Template;

/// Inclusive zoom range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaleBounds {
    /// Smallest allowed scale.
    pub min: f32,
    /// Largest allowed scale.
    pub max: f32,
}

impl ScaleBounds {
    /// Free pan/zoom editor.
    pub const FREE: Self = Self { min: 0.1, max: 5.0 };
    /// Simplified panel editor.
    pub const PANEL: Self = Self { min: 1.0, max: 3.0 };

    /// Clamp a scale into range. Non-finite input collapses to `min`.
    #[must_use]
    pub fn clamp(&self, scale: f32) -> f32 {
        if scale.is_finite() {
            scale.clamp(self.min, self.max)
        } else {
            self.min
        }
    }

    /// Whether `scale` lies within the range.
    #[must_use]
    pub fn contains(&self, scale: f32) -> bool {
        (self.min..=self.max).contains(&scale)
    }
}

impl Default for ScaleBounds {
    fn default() -> Self {
        Self::FREE
    }
}

/// Transient view state. Never saved.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasViewport {
    /// Zoom factor.
    pub scale: f32,
    /// Horizontal translation in screen pixels.
    pub x: f32,
    /// Vertical translation in screen pixels.
    pub y: f32,
    /// Container width.
    pub width: f32,
    /// Container height.
    pub height: f32,
}

impl Default for CanvasViewport {
    fn default() -> Self {
        Self {
            scale: 1.0,
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
        }
    }
}

impl CanvasViewport {
    /// Unit-scale viewport at the origin sized to the template.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn for_template(template: &Template) -> Self {
        Self {
            width: template.width as f32,
            height: template.height as f32,
            ..Self::default()
        }
    }

    /// Convert a screen point to design space.
    #[must_use]
    pub fn screen_to_design(&self, sx: f32, sy: f32) -> (f32, f32) {
        if self.scale.abs() < f32::EPSILON {
            return (sx - self.x, sy - self.y);
        }
        ((sx - self.x) / self.scale, (sy - self.y) / self.scale)
    }

    /// Convert a design-space point to screen space.
    #[must_use]
    pub fn design_to_screen(&self, dx: f32, dy: f32) -> (f32, f32) {
        (dx * self.scale + self.x, dy * self.scale + self.y)
    }

    /// Origin that keeps the design point under `(sx, sy)` fixed after
    /// switching to `new_scale`.
    #[must_use]
    pub fn origin_for_zoom_at(&self, sx: f32, sy: f32, new_scale: f32) -> (f32, f32) {
        let (dx, dy) = self.screen_to_design(sx, sy);
        (sx - dx * new_scale, sy - dy * new_scale)
    }

    /// Zoom level as a whole percentage.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn zoom_percent(&self) -> u32 {
        (self.scale * 100.0).round().max(0.0) as u32
    }

    /// Additive zoom step used by the panel editor, rounded to two decimals.
    #[must_use]
    pub fn stepped_scale(&self, step: f32, bounds: ScaleBounds) -> f32 {
        let next = ((self.scale + step) * 100.0).round() / 100.0;
        bounds.clamp(next)
    }
}

/// Scale and origin that fit a template inside a container.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fit {
    /// Fitted zoom factor.
    pub scale: f32,
    /// Horizontal origin that centres the template.
    pub x: f32,
    /// Vertical origin that centres the template.
    pub y: f32,
}

/// Fit a template into a container, never enlarging past 1:1, then apply
/// `margin`, clamp to `bounds` and centre.
///
/// Returns `None` while the container or template has no area.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn fit(
    container_w: f32,
    container_h: f32,
    template: &Template,
    margin: f32,
    bounds: ScaleBounds,
) -> Option<Fit> {
    let tw = template.width as f32;
    let th = template.height as f32;
    if container_w <= 0.0 || container_h <= 0.0 || tw <= 0.0 || th <= 0.0 {
        return None;
    }
    let scale = bounds.clamp((container_w / tw).min(container_h / th).min(1.0) * margin);
    Some(Fit {
        scale,
        x: (container_w - tw * scale) / 2.0,
        y: (container_h - th * scale) / 2.0,
    })
}

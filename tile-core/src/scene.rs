//! The frame handed to a rendering surface, and hit testing against it.

use serde::{Deserialize, Serialize};

use crate::catalog::BackgroundCatalog;
use crate::document::EditorDocument;
use crate::element::{EditorElement, ElementId};
use crate::event::HitTarget;
use crate::gesture::Preview;
use crate::resolve::effective_elements;
use crate::template::Template;
use crate::viewport::CanvasViewport;

/// An axis-aligned rectangle in stage pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    /// Width.
    pub width: f32,
    /// Height.
    pub height: f32,
}

impl Region {
    /// Whether the point lies inside.
    #[must_use]
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x <= self.x + self.width && y >= self.y && y <= self.y + self.height
    }
}

/// Everything a rendering surface needs to draw one frame.
///
/// Built from the document on demand; the surface is a derived cache and
/// never the state of record.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    /// Tile being drawn.
    pub template: Template,
    /// Resolved background image source.
    pub background: Option<String>,
    /// Effective elements, bottom to top.
    pub elements: Vec<EditorElement>,
    /// Element that shows selection handles.
    pub selected: Option<ElementId>,
    /// Stage transform.
    pub viewport: CanvasViewport,
}

impl Scene {
    /// Build the frame for the document's active variant.
    #[must_use]
    pub fn build(document: &EditorDocument, backgrounds: &BackgroundCatalog) -> Self {
        Self {
            template: document.template.clone(),
            background: backgrounds.resolve(&document.template).map(str::to_string),
            elements: effective_elements(document)
                .into_iter()
                .map(std::borrow::Cow::into_owned)
                .collect(),
            selected: document.selected_element_id.clone(),
            viewport: document.canvas,
        }
    }

    /// Overlay an in-progress drag or transform.
    #[must_use]
    pub fn with_preview(mut self, preview: Option<&Preview>) -> Self {
        if let Some(preview) = preview {
            if let Some(element) = self.elements.iter_mut().find(|el| &el.id == preview.id()) {
                preview.apply(element);
            }
        }
        self
    }

    /// The tile rectangle in stage pixels.
    #[must_use]
    pub fn template_region(&self) -> Region {
        template_region(&self.template, &self.viewport)
    }

    /// The selected element, if it is in the frame.
    #[must_use]
    pub fn selected_element(&self) -> Option<&EditorElement> {
        let id = self.selected.as_ref()?;
        self.elements.iter().find(|el| &el.id == id)
    }

    /// Topmost element containing a design-space point.
    #[must_use]
    pub fn element_at(&self, x: f32, y: f32) -> Option<&EditorElement> {
        self.elements.iter().rev().find(|el| el.contains_point(x, y))
    }

    /// Classify a stage-space point.
    #[must_use]
    pub fn hit_target(&self, sx: f32, sy: f32) -> HitTarget {
        let (dx, dy) = self.viewport.screen_to_design(sx, sy);
        classify(
            self.element_at(dx, dy).map(|el| el.id.clone()),
            self.template_region().contains(sx, sy),
        )
    }
}

/// The tile rectangle for a template under a viewport.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn template_region(template: &Template, viewport: &CanvasViewport) -> Region {
    Region {
        x: viewport.x,
        y: viewport.y,
        width: template.width as f32 * viewport.scale,
        height: template.height as f32 * viewport.scale,
    }
}

/// Classify a stage-space point against a document without building a scene.
#[must_use]
pub fn hit_test(document: &EditorDocument, sx: f32, sy: f32) -> HitTarget {
    let (dx, dy) = document.canvas.screen_to_design(sx, sy);
    let element = effective_elements(document)
        .iter()
        .rev()
        .find(|el| el.contains_point(dx, dy))
        .map(|el| el.id.clone());
    let on_tile = template_region(&document.template, &document.canvas).contains(sx, sy);
    classify(element, on_tile)
}

fn classify(element: Option<ElementId>, on_tile: bool) -> HitTarget {
    match element {
        Some(id) => HitTarget::Element(id),
        None if on_tile => HitTarget::TemplateOutline,
        None => HitTarget::Stage,
    }
}

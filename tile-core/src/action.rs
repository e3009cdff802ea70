//! Actions accepted by the reducer.
//!
//! The JSON form is `{"type": "ADD_ELEMENT", "payload": ...}` so a JS host can
//! post actions through the WASM bindings unchanged.

use serde::{Deserialize, Serialize};

use crate::element::{EditorElement, ElementId, ElementPatch};
use crate::template::{Template, TemplatePatch};
use crate::variant::{DynamicVariant, VariantPatch};

/// Direction of a z-order move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MoveDirection {
    /// One layer towards the top.
    Up,
    /// One layer towards the bottom.
    Down,
}

/// A discrete document mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    content = "payload",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum Action {
    /// Set the zoom factor. Callers clamp beforehand.
    SetCanvasScale(f32),
    /// Set the pan offset.
    SetCanvasPosition {
        /// Horizontal offset.
        x: f32,
        /// Vertical offset.
        y: f32,
    },
    /// Record the container size.
    SetCanvasSize {
        /// Container width.
        width: f32,
        /// Container height.
        height: f32,
    },
    /// Change the selection. The id is not validated.
    SelectElement(Option<ElementId>),
    /// Append an element on top and select it.
    AddElement(EditorElement),
    /// Partially update an element.
    UpdateElement {
        /// Target element.
        id: ElementId,
        /// Positional fields and properties to apply.
        updates: ElementPatch,
    },
    /// Remove an element.
    RemoveElement(ElementId),
    /// Swap an element with its z-order neighbour.
    MoveElement {
        /// Target element.
        id: ElementId,
        /// Which neighbour to swap with.
        direction: MoveDirection,
    },
    /// Clear all elements and restore the default viewport.
    ResetCanvas,
    /// Merge a template patch.
    UpdateTemplate(TemplatePatch),
    /// Replace the whole design.
    LoadProject {
        /// New template.
        template: Template,
        /// New elements.
        elements: Vec<EditorElement>,
        /// New variants.
        #[serde(default)]
        dynamic_variants: Vec<DynamicVariant>,
        /// New active variant.
        #[serde(default)]
        active_variant_id: Option<String>,
    },
    /// Append a variant.
    AddVariant(DynamicVariant),
    /// Shallow-update a variant.
    UpdateVariant {
        /// Target variant.
        id: String,
        /// Fields to replace.
        updates: VariantPatch,
    },
    /// Choose the previewed variant; `None` shows the base design.
    SetActiveVariant(Option<String>),
    /// Remove a variant.
    RemoveVariant(String),
    /// Drop variants when no dynamic slot remains.
    CleanupVariants,
}

impl Action {
    /// Whether the action changes the design rather than the view.
    ///
    /// Read-only documents still accept non-mutating actions.
    #[must_use]
    pub const fn is_mutating(&self) -> bool {
        !matches!(
            self,
            Self::SetCanvasScale(_)
                | Self::SetCanvasPosition { .. }
                | Self::SetCanvasSize { .. }
                | Self::SelectElement(_)
                | Self::SetActiveVariant(_)
        )
    }

    /// Whether the variant garbage collector runs after this action.
    #[must_use]
    pub const fn collects_variants(&self) -> bool {
        matches!(
            self,
            Self::AddElement(_)
                | Self::UpdateElement { .. }
                | Self::RemoveElement(_)
                | Self::MoveElement { .. }
                | Self::ResetCanvas
                | Self::LoadProject { .. }
                | Self::CleanupVariants
        )
    }

    /// Wire name, used in logs and errors.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::SetCanvasScale(_) => "SET_CANVAS_SCALE",
            Self::SetCanvasPosition { .. } => "SET_CANVAS_POSITION",
            Self::SetCanvasSize { .. } => "SET_CANVAS_SIZE",
            Self::SelectElement(_) => "SELECT_ELEMENT",
            Self::AddElement(_) => "ADD_ELEMENT",
            Self::UpdateElement { .. } => "UPDATE_ELEMENT",
            Self::RemoveElement(_) => "REMOVE_ELEMENT",
            Self::MoveElement { .. } => "MOVE_ELEMENT",
            Self::ResetCanvas => "RESET_CANVAS",
            Self::UpdateTemplate(_) => "UPDATE_TEMPLATE",
            Self::LoadProject { .. } => "LOAD_PROJECT",
            Self::AddVariant(_) => "ADD_VARIANT",
            Self::UpdateVariant { .. } => "UPDATE_VARIANT",
            Self::SetActiveVariant(_) => "SET_ACTIVE_VARIANT",
            Self::RemoveVariant(_) => "REMOVE_VARIANT",
            Self::CleanupVariants => "CLEANUP_VARIANTS",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_format() {
        let action = Action::MoveElement {
            id: ElementId::new("t1"),
            direction: MoveDirection::Up,
        };
        let json = serde_json::to_value(&action).expect("serialize");
        assert_eq!(json["type"], "MOVE_ELEMENT");
        assert_eq!(json["payload"]["direction"], "UP");
        assert_eq!(json["type"], action.name());
    }

    #[test]
    fn test_parse_host_actions() {
        let action: Action = serde_json::from_str(
            r#"{"type":"UPDATE_ELEMENT","payload":{"id":"t1","updates":{"x":3,"y":4}}}"#,
        )
        .expect("parse");
        let Action::UpdateElement { id, updates } = action else {
            panic!("wrong variant");
        };
        assert_eq!(id.as_str(), "t1");
        assert_eq!(updates.position.x, Some(3.0));

        let cleared: Action =
            serde_json::from_str(r#"{"type":"SET_ACTIVE_VARIANT","payload":null}"#).expect("parse");
        assert_eq!(cleared, Action::SetActiveVariant(None));

        let reset: Action = serde_json::from_str(r#"{"type":"RESET_CANVAS"}"#).expect("parse");
        assert_eq!(reset, Action::ResetCanvas);
    }

    #[test]
    fn test_load_project_optional_fields() {
        let action: Action = serde_json::from_str(
            r#"{"type":"LOAD_PROJECT","payload":{"template":{"id":"t","name":"n","width":1,"height":2,"backgroundImage":null},"elements":[]}}"#,
        )
        .expect("parse");
        let Action::LoadProject {
            dynamic_variants,
            active_variant_id,
            ..
        } = action
        else {
            panic!("wrong variant");
        };
        assert!(dynamic_variants.is_empty());
        assert!(active_variant_id.is_none());
    }

    #[test]
    fn test_view_actions_are_not_mutating() {
        assert!(!Action::SetCanvasScale(2.0).is_mutating());
        assert!(!Action::SelectElement(None).is_mutating());
        assert!(!Action::SetActiveVariant(None).is_mutating());
        assert!(Action::ResetCanvas.is_mutating());
        assert!(Action::UpdateTemplate(TemplatePatch::default()).is_mutating());
    }
}

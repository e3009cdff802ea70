//! Editor session: owns the document and everything that feeds it.

use std::borrow::Cow;

use crate::action::Action;
use crate::catalog::BackgroundCatalog;
use crate::document::EditorDocument;
use crate::element::EditorElement;
use crate::error::{EditorError, EditorResult};
use crate::event::InputEvent;
use crate::gesture::{GestureConfig, GestureController};
use crate::payload::{DesignJson, DesignStats, SavedDesign};
use crate::reducer::reduce;
use crate::resolve::effective_elements;
use crate::scene::Scene;
use crate::template::{Template, TemplatePatch};

/// Host callback receiving saved designs.
pub type SaveHandler = Box<dyn FnMut(&SavedDesign) -> EditorResult<()>>;

/// A live editing session for one design.
pub struct EditorSession {
    document: EditorDocument,
    gestures: GestureController,
    backgrounds: BackgroundCatalog,
    on_save: Option<SaveHandler>,
}

impl std::fmt::Debug for EditorSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorSession")
            .field("document", &self.document)
            .field("gestures", &self.gestures)
            .field("has_save_handler", &self.on_save.is_some())
            .finish_non_exhaustive()
    }
}

impl EditorSession {
    /// Start an empty design on a template.
    #[must_use]
    pub fn new(template: Template) -> Self {
        Self::from_document(EditorDocument::new(template))
    }

    /// Reopen a saved design.
    ///
    /// Works for locked designs too: the document is built directly instead
    /// of going through the reducer.
    #[must_use]
    pub fn from_design(design: DesignJson) -> Self {
        let mut document = EditorDocument::new(design.template);
        document.elements = design.elements;
        document.dynamic_variants = design.dynamic_variants;
        document.active_variant_id = design.active_variant_id;
        document.collect_orphan_variants();
        document.prune_stale_overrides();
        Self::from_document(document)
    }

    fn from_document(document: EditorDocument) -> Self {
        Self {
            document,
            gestures: GestureController::default(),
            backgrounds: BackgroundCatalog::default(),
            on_save: None,
        }
    }

    /// Use custom gesture tuning.
    #[must_use]
    pub fn with_gesture_config(mut self, config: GestureConfig) -> Self {
        self.gestures = GestureController::new(config);
        self
    }

    /// Use a custom background catalog.
    #[must_use]
    pub fn with_backgrounds(mut self, backgrounds: BackgroundCatalog) -> Self {
        self.backgrounds = backgrounds;
        self
    }

    /// Register the host's save callback.
    #[must_use]
    pub fn with_save_handler(
        mut self,
        handler: impl FnMut(&SavedDesign) -> EditorResult<()> + 'static,
    ) -> Self {
        self.on_save = Some(Box::new(handler));
        self
    }

    /// The committed document.
    #[must_use]
    pub fn document(&self) -> &EditorDocument {
        &self.document
    }

    /// Background catalog used for scenes and prices.
    #[must_use]
    pub fn backgrounds(&self) -> &BackgroundCatalog {
        &self.backgrounds
    }

    /// Gesture controller state.
    #[must_use]
    pub fn gestures(&self) -> &GestureController {
        &self.gestures
    }

    /// Whether the design has been committed and is locked.
    #[must_use]
    pub fn is_read_only(&self) -> bool {
        self.document.is_read_only()
    }

    /// Apply an action.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::ReadOnly`] when a mutating action reaches a
    /// locked design. The document is left unchanged.
    pub fn dispatch(&mut self, action: Action) -> EditorResult<()> {
        if self.is_read_only() && action.is_mutating() {
            tracing::warn!(action = action.name(), "Refusing mutation of locked design");
            return Err(EditorError::ReadOnly(action.name()));
        }
        self.apply(action);
        for fit in self.gestures.refit(&self.document) {
            self.apply(fit);
        }
        Ok(())
    }

    fn apply(&mut self, action: Action) {
        let document = std::mem::take(&mut self.document);
        self.document = reduce(document, action);
    }

    /// Feed a raw input event through the gesture controller.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::InvalidInput`] for events with non-finite
    /// numbers, and propagates dispatch errors for the resulting actions.
    pub fn handle_input(&mut self, event: &InputEvent) -> EditorResult<()> {
        if let Err(err) = event.validate() {
            tracing::warn!(event = event.name(), error = %err, "Dropping input event");
            return Err(err);
        }
        let actions = self.gestures.handle(&self.document, event);
        tracing::debug!(event = event.name(), actions = actions.len(), "Handled input");
        for action in actions {
            self.dispatch(action)?;
        }
        Ok(())
    }

    /// Zoom by whole steps of the configured zoom step.
    ///
    /// # Errors
    ///
    /// Propagates dispatch errors.
    pub fn step_zoom(&mut self, steps: i8) -> EditorResult<()> {
        for action in self.gestures.step_zoom(&self.document, steps) {
            self.dispatch(action)?;
        }
        Ok(())
    }

    /// Elements as the active variant shows them.
    #[must_use]
    pub fn effective_elements(&self) -> Vec<Cow<'_, EditorElement>> {
        effective_elements(&self.document)
    }

    /// The frame to draw, including any in-progress gesture preview.
    #[must_use]
    pub fn scene(&self) -> Scene {
        Scene::build(&self.document, &self.backgrounds).with_preview(self.gestures.preview())
    }

    /// The committed frame without gesture previews, as exports see it.
    #[must_use]
    pub fn committed_scene(&self) -> Scene {
        Scene::build(&self.document, &self.backgrounds)
    }

    /// Create a variant seeded from the base text and make it active.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::ReadOnly`] for locked designs.
    pub fn add_variant(&mut self, label: Option<&str>) -> EditorResult<String> {
        let variant = self.document.new_variant(label);
        let id = variant.id.clone();
        self.dispatch(Action::AddVariant(variant))?;
        self.dispatch(Action::SetActiveVariant(Some(id.clone())))?;
        Ok(id)
    }

    /// Persisted size of the design.
    ///
    /// # Errors
    ///
    /// Returns an error if the design cannot be serialized.
    pub fn stats(&self) -> EditorResult<DesignStats> {
        DesignStats::measure(&self.document)
    }

    /// The save payload for the current design.
    #[must_use]
    pub fn saved_design(&self) -> SavedDesign {
        SavedDesign::from_document(&self.document)
    }

    /// Hand the design to the save callback.
    ///
    /// Returns `false` when no callback is registered.
    ///
    /// # Errors
    ///
    /// Propagates the callback's error.
    pub fn save(&mut self) -> EditorResult<bool> {
        let payload = self.saved_design();
        let Some(handler) = self.on_save.as_mut() else {
            return Ok(false);
        };
        handler(&payload)?;
        tracing::info!(title = %payload.title, "Design saved");
        Ok(true)
    }

    /// Save the design as locked and lock this session.
    ///
    /// The session stays editable when the save callback fails.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::ReadOnly`] if already committed, or the
    /// callback's error.
    pub fn commit_to_cart(&mut self) -> EditorResult<SavedDesign> {
        if self.is_read_only() {
            return Err(EditorError::ReadOnly("COMMIT_TO_CART"));
        }
        let mut payload = self.saved_design();
        payload.design_json.template.is_editable = false;
        if let Some(handler) = self.on_save.as_mut() {
            handler(&payload)?;
        }
        self.dispatch(Action::UpdateTemplate(TemplatePatch::lock()))?;
        tracing::info!(title = %payload.title, "Design committed to cart and locked");
        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::element::ElementId;
    use crate::event::HitTarget;

    fn session() -> EditorSession {
        EditorSession::new(Template::new("t", "Tile", 1000, 1000))
    }

    #[test]
    fn test_dispatch_refuses_when_locked() {
        let mut session = session();
        session
            .dispatch(Action::AddElement(EditorElement::new_text().with_id("a")))
            .expect("add");
        session.commit_to_cart().expect("commit");
        assert!(session.is_read_only());

        let err = session
            .dispatch(Action::RemoveElement(ElementId::new("a")))
            .expect_err("locked");
        assert!(matches!(err, EditorError::ReadOnly("REMOVE_ELEMENT")));
        assert_eq!(session.document().elements.len(), 1);

        session
            .dispatch(Action::SelectElement(None))
            .expect("selection still allowed");
        assert!(session.commit_to_cart().is_err());
    }

    #[test]
    fn test_commit_calls_handler_with_locked_payload() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let mut session = session().with_save_handler(move |design| {
            sink.borrow_mut().push(design.clone());
            Ok(())
        });
        let payload = session.commit_to_cart().expect("commit");
        assert!(!payload.design_json.template.is_editable);
        assert_eq!(seen.borrow().len(), 1);
        assert!(!seen.borrow()[0].design_json.template.is_editable);
    }

    #[test]
    fn test_failed_save_keeps_design_editable() {
        let mut session =
            session().with_save_handler(|_| Err(EditorError::Save("offline".to_string())));
        assert!(session.commit_to_cart().is_err());
        assert!(!session.is_read_only());
    }

    #[test]
    fn test_save_without_handler() {
        assert!(!session().save().expect("save"));
    }

    #[test]
    fn test_from_design_reopens_locked_design() {
        let mut template = Template::new("t", "Tile", 10, 10);
        template.is_editable = false;
        let session = EditorSession::from_design(DesignJson {
            template,
            elements: vec![EditorElement::new_text().with_id("a")],
            dynamic_variants: Vec::new(),
            active_variant_id: None,
        });
        assert!(session.is_read_only());
        assert_eq!(session.document().elements.len(), 1);
    }

    #[test]
    fn test_resize_then_orientation_change_refits() {
        let mut session = session();
        session
            .handle_input(&InputEvent::ContainerResize {
                width: 500.0,
                height: 250.0,
            })
            .expect("resize");
        let fitted = session.document().canvas.scale;
        assert!((fitted - 0.225).abs() < 1e-4);

        session
            .dispatch(Action::UpdateTemplate(TemplatePatch::size(2000, 1000)))
            .expect("resize template");
        // min(500/2000, 250/1000, 1) * 0.9
        assert!((session.document().canvas.scale - 0.225).abs() < 1e-4);
        assert!((session.document().canvas.x - 25.0).abs() < 1e-3);
    }

    #[test]
    fn test_panel_zoom_steps_from_fitted_scale() {
        let mut session = session().with_gesture_config(GestureConfig::panel());
        session
            .handle_input(&InputEvent::ContainerResize {
                width: 500.0,
                height: 500.0,
            })
            .expect("resize");
        assert!((session.document().canvas.scale - 1.0).abs() < 1e-4);
        session.step_zoom(1).expect("zoom");
        assert!((session.document().canvas.scale - 1.1).abs() < 1e-4);
        session.step_zoom(-1).expect("zoom");
        session.step_zoom(-1).expect("zoom");
        assert!((session.document().canvas.scale - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_non_finite_input_is_rejected() {
        let mut session = session();
        let before = session.document().canvas;
        let err = session
            .handle_input(&InputEvent::Wheel {
                x: f32::NAN,
                y: 0.0,
                delta_y: -1.0,
            })
            .expect_err("nan");
        assert!(matches!(err, EditorError::InvalidInput(_)));
        assert_eq!(session.document().canvas, before);
    }

    #[test]
    fn test_add_variant_activates_it() {
        let mut session = session();
        let id = session.add_variant(Some("Guest")).expect("variant");
        assert_eq!(session.document().active_variant_id.as_deref(), Some(id.as_str()));
    }

    #[test]
    fn test_pointer_down_hit_tests_when_target_missing() {
        let mut session = session();
        session
            .dispatch(Action::AddElement(
                EditorElement::new_svg("<svg/>", "")
                    .with_id("s")
                    .with_position(0.0, 0.0)
                    .with_size(100.0, 100.0),
            ))
            .expect("add");
        session
            .dispatch(Action::SelectElement(None))
            .expect("deselect");
        session
            .handle_input(&InputEvent::PointerDown {
                x: 10.0,
                y: 10.0,
                target: None,
            })
            .expect("down");
        assert_eq!(
            session.document().selected_element_id,
            Some(ElementId::new("s"))
        );
        assert!(!session.gestures().is_panning());

        session
            .handle_input(&InputEvent::PointerDown {
                x: 900.0,
                y: 900.0,
                target: Some(HitTarget::TemplateOutline),
            })
            .expect("down");
        assert!(session.gestures().is_panning());
    }
}

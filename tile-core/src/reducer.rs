//! The reducer: the single place where a document changes.

use tracing::{debug, warn};

use crate::action::{Action, MoveDirection};
use crate::document::EditorDocument;
use crate::element::{ElementId, ElementPatch};
use crate::viewport::CanvasViewport;

/// Apply an action and return the next document.
///
/// The input is consumed, so no caller can observe a half-applied state.
/// Unknown ids are silent no-ops. Mutating actions against a read-only
/// document return it unchanged.
#[must_use]
pub fn reduce(document: EditorDocument, action: Action) -> EditorDocument {
    let mut next = document;
    apply(&mut next, action);
    next
}

#[allow(clippy::cast_precision_loss)]
fn apply(doc: &mut EditorDocument, action: Action) {
    let name = action.name();

    if doc.is_read_only() && action.is_mutating() {
        warn!(action = name, "Ignoring mutation of read-only design");
        return;
    }

    let collects = action.collects_variants();
    let prunes =
        collects || matches!(action, Action::AddVariant(_) | Action::UpdateVariant { .. });
    debug!(action = name, "Reducing action");

    match action {
        Action::SetCanvasScale(scale) => doc.canvas.scale = scale,
        Action::SetCanvasPosition { x, y } => {
            doc.canvas.x = x;
            doc.canvas.y = y;
        }
        Action::SetCanvasSize { width, height } => {
            doc.canvas.width = width;
            doc.canvas.height = height;
        }
        Action::SelectElement(id) => doc.selected_element_id = id,
        Action::AddElement(element) => {
            doc.selected_element_id = Some(element.id.clone());
            doc.elements.push(element);
        }
        Action::UpdateElement { id, updates } => update_element(doc, &id, updates),
        Action::RemoveElement(id) => {
            doc.elements.retain(|el| el.id != id);
            if doc.selected_element_id.as_ref() == Some(&id) {
                doc.selected_element_id = None;
            }
        }
        Action::MoveElement { id, direction } => move_element(doc, &id, direction),
        Action::ResetCanvas => {
            doc.canvas = CanvasViewport::for_template(&doc.template);
            doc.elements.clear();
            doc.selected_element_id = None;
        }
        Action::UpdateTemplate(patch) => {
            doc.template.apply(&patch);
            if let Some(width) = patch.width {
                doc.canvas.width = width as f32;
            }
            if let Some(height) = patch.height {
                doc.canvas.height = height as f32;
            }
        }
        Action::LoadProject {
            template,
            elements,
            dynamic_variants,
            active_variant_id,
        } => {
            let sized = CanvasViewport::for_template(&template);
            doc.canvas.width = sized.width;
            doc.canvas.height = sized.height;
            doc.template = template;
            doc.elements = elements;
            doc.dynamic_variants = dynamic_variants;
            doc.active_variant_id = active_variant_id;
            doc.selected_element_id = None;
        }
        Action::AddVariant(variant) => doc.dynamic_variants.push(variant),
        Action::UpdateVariant { id, updates } => {
            if let Some(variant) = doc.variant_mut(&id) {
                variant.apply(&updates);
            }
        }
        Action::SetActiveVariant(id) => doc.active_variant_id = id,
        Action::RemoveVariant(id) => {
            doc.dynamic_variants.retain(|v| v.id != id);
            if doc.active_variant_id.as_deref() == Some(id.as_str()) {
                doc.active_variant_id = None;
            }
        }
        Action::CleanupVariants => {}
    }

    if collects && doc.collect_orphan_variants() {
        debug!(action = name, "Dropped variants with no dynamic slot left");
    }
    if prunes && doc.prune_stale_overrides() {
        debug!(action = name, "Dropped overrides of removed elements");
    }
}

/// Positional fields of a dynamic element go to the active variant's
/// override; everything else lands on the base element.
fn update_element(doc: &mut EditorDocument, id: &ElementId, updates: ElementPatch) {
    let Some(index) = doc.element_index(id) else {
        debug!(element = %id, "Update for unknown element ignored");
        return;
    };

    let ElementPatch {
        position,
        properties,
    } = updates;

    if !position.is_empty() {
        let active = if doc.elements[index].is_dynamic() {
            doc.active_variant_id.clone()
        } else {
            None
        };
        if let Some(variant) = active.as_deref().and_then(|vid| doc.variant_mut(vid)) {
            variant.merge_override(id, &position);
        } else {
            position.apply(&mut doc.elements[index]);
        }
    }

    if let Some(properties) = properties {
        properties.apply(&mut doc.elements[index].kind);
    }
}

fn move_element(doc: &mut EditorDocument, id: &ElementId, direction: MoveDirection) {
    let Some(index) = doc.element_index(id) else {
        return;
    };
    match direction {
        MoveDirection::Up if index + 1 < doc.elements.len() => {
            doc.elements.swap(index, index + 1);
        }
        MoveDirection::Down if index > 0 => doc.elements.swap(index, index - 1),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{
        EditorElement, ElementKind, PositionalPatch, PropertiesPatch, TextProperties,
    };
    use crate::template::{Template, TemplatePatch};
    use crate::variant::{DynamicVariant, VariantPatch};

    fn doc() -> EditorDocument {
        EditorDocument::new(Template::new("t", "Tile", 1772, 2480))
    }

    fn text(id: &str) -> EditorElement {
        EditorElement::new_text().with_id(id)
    }

    fn slot(id: &str, key: &str) -> EditorElement {
        EditorElement::new(
            ElementKind::Text(TextProperties {
                text: "Hello".to_string(),
                is_dynamic: true,
                field_key: Some(key.to_string()),
                ..TextProperties::default()
            }),
            0.0,
            0.0,
        )
        .with_id(id)
    }

    fn ids(doc: &EditorDocument) -> Vec<&str> {
        doc.elements.iter().map(|el| el.id.as_str()).collect()
    }

    #[test]
    fn test_add_element_appends_and_selects() {
        let doc = reduce(doc(), Action::AddElement(text("a")));
        let doc = reduce(doc, Action::AddElement(text("b")));
        assert_eq!(ids(&doc), vec!["a", "b"]);
        assert_eq!(doc.selected_element_id, Some(ElementId::new("b")));
    }

    #[test]
    fn test_update_missing_id_is_noop() {
        let before = reduce(doc(), Action::AddElement(text("a")));
        let after = reduce(
            before.clone(),
            Action::UpdateElement {
                id: ElementId::new("zzz"),
                updates: ElementPatch::moved_to(1.0, 1.0),
            },
        );
        assert_eq!(before, after);
    }

    #[test]
    fn test_update_properties_merges() {
        let doc = reduce(doc(), Action::AddElement(text("a")));
        let doc = reduce(
            doc,
            Action::UpdateElement {
                id: ElementId::new("a"),
                updates: ElementPatch::properties(PropertiesPatch {
                    font_size: Some(40.0),
                    ..PropertiesPatch::default()
                }),
            },
        );
        let props = doc.elements[0].text().expect("text");
        assert!((props.font_size - 40.0).abs() < f32::EPSILON);
        assert_eq!(props.text, "Change me please...");
    }

    #[test]
    fn test_remove_clears_selection() {
        let doc = reduce(doc(), Action::AddElement(text("a")));
        let doc = reduce(doc, Action::RemoveElement(ElementId::new("a")));
        assert!(doc.elements.is_empty());
        assert!(doc.selected_element_id.is_none());
    }

    #[test]
    fn test_move_element_boundaries() {
        let mut d = doc();
        for id in ["a", "b", "c"] {
            d = reduce(d, Action::AddElement(text(id)));
        }
        let up = |d, id: &str| {
            reduce(
                d,
                Action::MoveElement {
                    id: ElementId::new(id),
                    direction: MoveDirection::Up,
                },
            )
        };
        let d = up(d, "c");
        assert_eq!(ids(&d), vec!["a", "b", "c"]);
        let d = up(d, "a");
        assert_eq!(ids(&d), vec!["b", "a", "c"]);
        let d = reduce(
            d,
            Action::MoveElement {
                id: ElementId::new("b"),
                direction: MoveDirection::Down,
            },
        );
        assert_eq!(ids(&d), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_reset_canvas_restores_viewport() {
        let d = reduce(doc(), Action::AddElement(text("a")));
        let d = reduce(d, Action::SetCanvasScale(3.0));
        let d = reduce(d, Action::SetCanvasPosition { x: 10.0, y: 5.0 });
        let d = reduce(d, Action::ResetCanvas);
        assert!(d.elements.is_empty());
        assert!((d.canvas.scale - 1.0).abs() < f32::EPSILON);
        assert!(d.canvas.x.abs() < f32::EPSILON);
        assert!((d.canvas.width - 1772.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_update_template_mirrors_size() {
        let mut d = doc();
        d.canvas.scale = 0.4;
        let d = reduce(d, Action::UpdateTemplate(TemplatePatch::size(100, 200)));
        assert_eq!(d.template.width, 100);
        assert!((d.canvas.width - 100.0).abs() < f32::EPSILON);
        assert!((d.canvas.height - 200.0).abs() < f32::EPSILON);
        assert!((d.canvas.scale - 0.4).abs() < f32::EPSILON);
    }

    #[test]
    fn test_positional_routing_to_active_variant() {
        let d = reduce(doc(), Action::AddElement(slot("t1", "name")));
        let d = reduce(
            d,
            Action::AddVariant(DynamicVariant::new("A").with_id("v1")),
        );
        let d = reduce(d, Action::SetActiveVariant(Some("v1".to_string())));
        let d = reduce(
            d,
            Action::UpdateElement {
                id: ElementId::new("t1"),
                updates: ElementPatch {
                    position: PositionalPatch::position(10.0, 20.0),
                    properties: Some(PropertiesPatch {
                        fill: Some("#ff0000".to_string()),
                        ..PropertiesPatch::default()
                    }),
                },
            },
        );

        let base = &d.elements[0];
        assert!(base.x.abs() < f32::EPSILON);
        assert_eq!(base.text().map(|p| p.fill.as_str()), Some("#ff0000"));
        let patch = d.dynamic_variants[0]
            .override_for(&ElementId::new("t1"))
            .expect("override");
        assert_eq!(*patch, PositionalPatch::position(10.0, 20.0));
    }

    #[test]
    fn test_dangling_active_variant_updates_base() {
        let mut d = reduce(doc(), Action::AddElement(slot("t1", "name")));
        d.active_variant_id = Some("missing".to_string());
        let d = reduce(
            d,
            Action::UpdateElement {
                id: ElementId::new("t1"),
                updates: ElementPatch::moved_to(7.0, 8.0),
            },
        );
        assert!((d.elements[0].x - 7.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_update_variant_and_remove_active() {
        let d = reduce(doc(), Action::AddElement(slot("t1", "name")));
        let d = reduce(d, Action::AddVariant(DynamicVariant::new("A").with_id("v1")));
        let d = reduce(
            d,
            Action::UpdateVariant {
                id: "v1".to_string(),
                updates: VariantPatch::label("Renamed"),
            },
        );
        assert_eq!(d.dynamic_variants[0].label, "Renamed");

        let d = reduce(d, Action::SetActiveVariant(Some("v1".to_string())));
        let d = reduce(d, Action::RemoveVariant("v1".to_string()));
        assert!(d.dynamic_variants.is_empty());
        assert!(d.active_variant_id.is_none());
    }

    #[test]
    fn test_remove_drops_overrides_of_removed_element() {
        let d = reduce(doc(), Action::AddElement(slot("t1", "name")));
        let d = reduce(d, Action::AddElement(slot("t2", "city")));
        let d = reduce(d, Action::AddVariant(DynamicVariant::new("A").with_id("v1")));
        let d = reduce(d, Action::SetActiveVariant(Some("v1".to_string())));
        let d = [ElementId::new("t1"), ElementId::new("t2")]
            .into_iter()
            .fold(d, |d, id| {
                reduce(
                    d,
                    Action::UpdateElement {
                        id,
                        updates: ElementPatch::moved_to(5.0, 5.0),
                    },
                )
            });
        assert_eq!(d.dynamic_variants[0].overrides.len(), 2);

        let d = reduce(d, Action::RemoveElement(ElementId::new("t1")));
        let variant = &d.dynamic_variants[0];
        assert!(variant.override_for(&ElementId::new("t1")).is_none());
        assert!(variant.override_for(&ElementId::new("t2")).is_some());
        assert_eq!(d.active_variant_id.as_deref(), Some("v1"));
    }

    #[test]
    fn test_variant_patch_cannot_target_missing_element() {
        let d = reduce(doc(), Action::AddElement(slot("t1", "name")));
        let d = reduce(d, Action::AddVariant(DynamicVariant::new("A").with_id("v1")));
        let mut overrides = std::collections::BTreeMap::new();
        overrides.insert(ElementId::new("ghost"), PositionalPatch::position(1.0, 1.0));
        overrides.insert(ElementId::new("t1"), PositionalPatch::position(2.0, 2.0));
        let d = reduce(
            d,
            Action::UpdateVariant {
                id: "v1".to_string(),
                updates: VariantPatch {
                    overrides: Some(overrides),
                    ..VariantPatch::default()
                },
            },
        );
        let keys: Vec<&str> = d.dynamic_variants[0]
            .overrides
            .keys()
            .map(ElementId::as_str)
            .collect();
        assert_eq!(keys, vec!["t1"]);
    }

    #[test]
    fn test_variant_actions_skip_collection() {
        // No dynamic elements, yet an added variant survives until a
        // structural change or an explicit cleanup.
        let d = reduce(doc(), Action::AddVariant(DynamicVariant::new("A")));
        assert_eq!(d.dynamic_variants.len(), 1);
        let d = reduce(d, Action::CleanupVariants);
        assert!(d.dynamic_variants.is_empty());
    }

    #[test]
    fn test_read_only_refuses_mutations() {
        let d = reduce(doc(), Action::AddElement(text("a")));
        let d = reduce(d, Action::UpdateTemplate(TemplatePatch::lock()));
        assert!(d.is_read_only());

        let locked = d.clone();
        let d = reduce(d, Action::RemoveElement(ElementId::new("a")));
        let d = reduce(
            d,
            Action::UpdateTemplate(TemplatePatch {
                is_editable: Some(true),
                ..TemplatePatch::default()
            }),
        );
        assert_eq!(d.elements, locked.elements);
        assert_eq!(d.template, locked.template);

        let d = reduce(d, Action::SetCanvasScale(2.0));
        assert!((d.canvas.scale - 2.0).abs() < f32::EPSILON);
    }
}

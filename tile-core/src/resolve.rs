//! Variant resolution: the element list a variant actually shows.

use std::borrow::Cow;

use crate::document::EditorDocument;
use crate::element::{EditorElement, ElementKind};
use crate::variant::DynamicVariant;

/// Effective elements for the document's active variant, in z-order.
///
/// Elements untouched by the variant are borrowed. The document is never
/// modified, so this is safe to call on every frame.
#[must_use]
pub fn effective_elements(document: &EditorDocument) -> Vec<Cow<'_, EditorElement>> {
    match document.active_variant() {
        Some(variant) => resolve_with(&document.elements, variant),
        None => document.elements.iter().map(Cow::Borrowed).collect(),
    }
}

/// Effective elements for an explicit variant.
#[must_use]
pub fn resolve_with<'a>(
    elements: &'a [EditorElement],
    variant: &DynamicVariant,
) -> Vec<Cow<'a, EditorElement>> {
    elements
        .iter()
        .map(|element| resolve_element(element, variant))
        .collect()
}

fn resolve_element<'a>(
    element: &'a EditorElement,
    variant: &DynamicVariant,
) -> Cow<'a, EditorElement> {
    let substitution = element
        .text()
        .and_then(|props| props.dynamic_key())
        .and_then(|key| variant.value(key));
    let position = variant.override_for(&element.id);

    if substitution.is_none() && position.is_none() {
        return Cow::Borrowed(element);
    }

    let mut resolved = element.clone();
    if let (Some(value), ElementKind::Text(props)) = (substitution, &mut resolved.kind) {
        value.clone_into(&mut props.text);
    }
    if let Some(position) = position {
        position.apply(&mut resolved);
    }
    Cow::Owned(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{ElementId, PositionalPatch, TextProperties};
    use crate::template::Template;

    fn slot(id: &str, key: Option<&str>, text: &str) -> EditorElement {
        EditorElement::new(
            ElementKind::Text(TextProperties {
                text: text.to_string(),
                is_dynamic: true,
                field_key: key.map(str::to_string),
                ..TextProperties::default()
            }),
            5.0,
            5.0,
        )
        .with_id(id)
    }

    fn text_of(element: &EditorElement) -> &str {
        element.text().map_or("", |props| props.text.as_str())
    }

    #[test]
    fn test_no_active_variant_borrows_everything() {
        let mut doc = EditorDocument::new(Template::new("t", "n", 10, 10));
        doc.elements.push(slot("t1", Some("name"), "Hello"));
        let out = effective_elements(&doc);
        assert!(matches!(out[0], Cow::Borrowed(_)));
    }

    #[test]
    fn test_substitutes_and_falls_back() {
        let elements = vec![
            slot("t1", Some("name"), "Hello"),
            slot("t2", Some("table"), "Table ?"),
        ];
        let variant = DynamicVariant::new("A").with_value("name", "Alice");
        let out = resolve_with(&elements, &variant);
        assert_eq!(text_of(&out[0]), "Alice");
        assert_eq!(text_of(&out[1]), "Table ?");
        assert!(matches!(out[1], Cow::Borrowed(_)));
    }

    #[test]
    fn test_missing_field_key_is_not_substituted() {
        let elements = vec![slot("t1", None, "Hello")];
        let variant = DynamicVariant::new("A").with_value("", "nope");
        let out = resolve_with(&elements, &variant);
        assert_eq!(text_of(&out[0]), "Hello");
    }

    #[test]
    fn test_override_merges_after_substitution() {
        let elements = vec![slot("t1", Some("name"), "Hello")];
        let mut variant = DynamicVariant::new("A").with_value("name", "Bob");
        variant.merge_override(
            &ElementId::new("t1"),
            &PositionalPatch {
                x: Some(40.0),
                rotation: Some(30.0),
                ..PositionalPatch::default()
            },
        );
        let out = resolve_with(&elements, &variant);
        assert_eq!(text_of(&out[0]), "Bob");
        assert!((out[0].x - 40.0).abs() < f32::EPSILON);
        assert!((out[0].y - 5.0).abs() < f32::EPSILON);
        assert_eq!(out[0].rotation, Some(30.0));
        // base untouched
        assert!((elements[0].x - 5.0).abs() < f32::EPSILON);
        assert_eq!(text_of(&elements[0]), "Hello");
    }
}

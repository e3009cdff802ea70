//! The design document: template, viewport, ordered elements and variants.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::element::{EditorElement, ElementId};
use crate::template::Template;
use crate::variant::DynamicVariant;
use crate::viewport::CanvasViewport;

/// Aggregate root of a design.
///
/// `elements` order is z-order: index 0 is the bottom layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorDocument {
    /// Viewport state. Not part of saved designs.
    #[serde(default)]
    pub canvas: CanvasViewport,
    /// Selected element, if any. May point at a removed id.
    #[serde(default)]
    pub selected_element_id: Option<ElementId>,
    /// Elements, bottom to top.
    #[serde(default)]
    pub elements: Vec<EditorElement>,
    /// Physical target.
    pub template: Template,
    /// Variants for dynamic text slots.
    #[serde(default)]
    pub dynamic_variants: Vec<DynamicVariant>,
    /// Active variant; `None` previews the base design.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_variant_id: Option<String>,
}

impl EditorDocument {
    /// Empty document for a template, with the canvas sized to it.
    #[must_use]
    pub fn new(template: Template) -> Self {
        Self {
            canvas: CanvasViewport::for_template(&template),
            template,
            ..Self::default()
        }
    }

    /// Whether mutations are refused.
    #[must_use]
    pub fn is_read_only(&self) -> bool {
        self.template.is_read_only()
    }

    /// Find an element by id.
    #[must_use]
    pub fn element(&self, id: &ElementId) -> Option<&EditorElement> {
        self.elements.iter().find(|el| &el.id == id)
    }

    /// Z-index of an element.
    #[must_use]
    pub fn element_index(&self, id: &ElementId) -> Option<usize> {
        self.elements.iter().position(|el| &el.id == id)
    }

    /// The selected element, when the selection still exists.
    #[must_use]
    pub fn selected_element(&self) -> Option<&EditorElement> {
        self.selected_element_id
            .as_ref()
            .and_then(|id| self.element(id))
    }

    /// Find a variant by id.
    #[must_use]
    pub fn variant(&self, id: &str) -> Option<&DynamicVariant> {
        self.dynamic_variants.iter().find(|v| v.id == id)
    }

    /// Mutable variant by id.
    pub fn variant_mut(&mut self, id: &str) -> Option<&mut DynamicVariant> {
        self.dynamic_variants.iter_mut().find(|v| v.id == id)
    }

    /// The active variant, when the selector points at an existing one.
    #[must_use]
    pub fn active_variant(&self) -> Option<&DynamicVariant> {
        self.active_variant_id
            .as_deref()
            .and_then(|id| self.variant(id))
    }

    /// Whether any element is a dynamic text slot.
    #[must_use]
    pub fn has_dynamic_elements(&self) -> bool {
        self.elements.iter().any(EditorElement::is_dynamic)
    }

    /// Field keys of all usable dynamic slots, unique, in z-order of first use.
    #[must_use]
    pub fn dynamic_field_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = Vec::new();
        for key in self
            .elements
            .iter()
            .filter_map(|el| el.text().and_then(|props| props.dynamic_key()))
        {
            if !keys.iter().any(|k| k == key) {
                keys.push(key.to_string());
            }
        }
        keys
    }

    /// A new variant whose values start from the slots' base text.
    ///
    /// Without a label the variant is called `Variant N`.
    #[must_use]
    pub fn new_variant(&self, label: Option<&str>) -> DynamicVariant {
        let label = match label.map(str::trim) {
            Some(label) if !label.is_empty() => label.to_string(),
            _ => format!("Variant {}", self.dynamic_variants.len() + 1),
        };
        let mut variant = DynamicVariant::new(label);
        for key in self.dynamic_field_keys() {
            let base = self
                .elements
                .iter()
                .filter_map(EditorElement::text)
                .find(|props| props.field_key.as_deref() == Some(key.as_str()))
                .map(|props| props.text.clone())
                .unwrap_or_default();
            variant.values.insert(key, base);
        }
        variant
    }

    /// Drop all variants once no dynamic slot remains.
    ///
    /// Returns `true` when something was removed.
    pub fn collect_orphan_variants(&mut self) -> bool {
        if self.dynamic_variants.is_empty() || self.has_dynamic_elements() {
            return false;
        }
        self.dynamic_variants.clear();
        self.active_variant_id = None;
        true
    }

    /// Drop variant overrides for elements that no longer exist.
    ///
    /// Returns `true` when something was removed.
    pub fn prune_stale_overrides(&mut self) -> bool {
        let live: BTreeSet<&ElementId> = self.elements.iter().map(|el| &el.id).collect();
        let mut pruned = false;
        for variant in &mut self.dynamic_variants {
            let before = variant.overrides.len();
            variant.overrides.retain(|id, _| live.contains(id));
            pruned |= variant.overrides.len() != before;
        }
        pruned
    }
}

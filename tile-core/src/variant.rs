//! Dynamic variants: named value sets that fill a design's text slots.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::element::{ElementId, PositionalPatch};

/// A named substitution set for the dynamic text slots of a design.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DynamicVariant {
    /// Variant identifier.
    pub id: String,
    /// Display label, also used in export file names.
    pub label: String,
    /// Replacement text per field key.
    #[serde(default)]
    pub values: BTreeMap<String, String>,
    /// Per-element positional overrides that apply only in this variant.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub overrides: BTreeMap<ElementId, PositionalPatch>,
}

impl DynamicVariant {
    /// Create an empty variant with a generated id.
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            id: format!("var-{}", Uuid::new_v4()),
            label: label.into(),
            values: BTreeMap::new(),
            overrides: BTreeMap::new(),
        }
    }

    /// Set the id.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Set one field value.
    #[must_use]
    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Value for a field key.
    #[must_use]
    pub fn value(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Positional override for an element.
    #[must_use]
    pub fn override_for(&self, id: &ElementId) -> Option<&PositionalPatch> {
        self.overrides.get(id)
    }

    /// Merge a positional patch into this variant's override for `id`.
    pub fn merge_override(&mut self, id: &ElementId, patch: &PositionalPatch) {
        self.overrides.entry(id.clone()).or_default().merge(patch);
    }

    /// Apply a shallow update: each present field replaces the old one.
    pub fn apply(&mut self, patch: &VariantPatch) {
        if let Some(label) = &patch.label {
            self.label.clone_from(label);
        }
        if let Some(values) = &patch.values {
            self.values.clone_from(values);
        }
        if let Some(overrides) = &patch.overrides {
            self.overrides.clone_from(overrides);
        }
    }
}

/// Shallow update of a variant. Present maps replace the old maps wholesale.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VariantPatch {
    /// New label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Replacement value map.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<BTreeMap<String, String>>,
    /// Replacement override map.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overrides: Option<BTreeMap<ElementId, PositionalPatch>>,
}

impl VariantPatch {
    /// Patch that renames the variant.
    #[must_use]
    pub fn label(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            ..Self::default()
        }
    }

    /// Patch that sets one field on top of the variant's current values.
    #[must_use]
    pub fn field(variant: &DynamicVariant, key: &str, value: impl Into<String>) -> Self {
        let mut values = variant.values.clone();
        values.insert(key.to_string(), value.into());
        Self {
            values: Some(values),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_override_creates_then_merges() {
        let mut variant = DynamicVariant::new("A");
        let id = ElementId::new("t1");
        variant.merge_override(&id, &PositionalPatch::position(10.0, 20.0));
        variant.merge_override(
            &id,
            &PositionalPatch {
                rotation: Some(15.0),
                ..PositionalPatch::default()
            },
        );
        let patch = variant.override_for(&id).expect("override");
        assert_eq!(patch.x, Some(10.0));
        assert_eq!(patch.rotation, Some(15.0));
    }

    #[test]
    fn test_field_patch_keeps_other_values() {
        let variant = DynamicVariant::new("A")
            .with_value("name", "Alice")
            .with_value("table", "4");
        let mut updated = variant.clone();
        updated.apply(&VariantPatch::field(&variant, "name", "Bob"));
        assert_eq!(updated.value("name"), Some("Bob"));
        assert_eq!(updated.value("table"), Some("4"));
    }

    #[test]
    fn test_json_shape() {
        let variant = DynamicVariant::new("Guest 1")
            .with_id("v1")
            .with_value("name", "Alice");
        let json = serde_json::to_value(&variant).expect("serialize");
        assert_eq!(json["values"]["name"], "Alice");
        assert!(json.get("overrides").is_none());

        let parsed: DynamicVariant = serde_json::from_str(
            r#"{"id":"v2","label":"B","values":{},"overrides":{"t1":{"x":5}}}"#,
        )
        .expect("deserialize");
        assert_eq!(
            parsed.override_for(&ElementId::new("t1")).and_then(|p| p.x),
            Some(5.0)
        );
    }
}

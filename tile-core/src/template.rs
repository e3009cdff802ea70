//! The physical tile a design is printed on.

use serde::{Deserialize, Deserializer, Serialize};

use crate::units::{cm_to_pixels, pixels_to_cm, DEFAULT_DPI};

/// Tile orientation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Landscape: the longer real side runs horizontally.
    #[default]
    Horizontal,
    /// Portrait.
    Vertical,
}

/// Physical design target in raster pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    /// Template identifier.
    pub id: String,
    /// Project name shown to the customer.
    pub name: String,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Background asset id from the catalog, `None` for no background.
    pub background_image: Option<String>,
    /// Current orientation.
    #[serde(default)]
    pub orientation: Orientation,
    /// `false` once the design has been committed to a cart. Never flips back.
    #[serde(default = "Template::default_editable")]
    pub is_editable: bool,
}

impl Template {
    const fn default_editable() -> bool {
        true
    }

    /// Create an editable template with no background.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            width,
            height,
            background_image: None,
            orientation: if height > width {
                Orientation::Vertical
            } else {
                Orientation::Horizontal
            },
            is_editable: true,
        }
    }

    /// Whether the design has been locked.
    #[must_use]
    pub const fn is_read_only(&self) -> bool {
        !self.is_editable
    }

    /// Apply a partial update.
    pub fn apply(&mut self, patch: &TemplatePatch) {
        if let Some(id) = &patch.id {
            self.id.clone_from(id);
        }
        if let Some(name) = &patch.name {
            self.name.clone_from(name);
        }
        if let Some(width) = patch.width {
            self.width = width;
        }
        if let Some(height) = patch.height {
            self.height = height;
        }
        if let Some(background) = &patch.background_image {
            self.background_image.clone_from(background);
        }
        if let Some(orientation) = patch.orientation {
            self.orientation = orientation;
        }
        if let Some(editable) = patch.is_editable {
            self.is_editable = editable;
        }
    }

    /// Patch that switches to `orientation` by swapping width and height.
    ///
    /// Returns `None` when the orientation is already current.
    #[must_use]
    pub fn orientation_patch(&self, orientation: Orientation) -> Option<TemplatePatch> {
        if orientation == self.orientation {
            return None;
        }
        Some(TemplatePatch {
            orientation: Some(orientation),
            width: Some(self.height),
            height: Some(self.width),
            ..TemplatePatch::default()
        })
    }

    /// Human readable physical size, e.g. `15 × 21 cm`.
    #[must_use]
    pub fn size_label(&self) -> String {
        let w = pixels_to_cm(self.width, DEFAULT_DPI).round();
        let h = pixels_to_cm(self.height, DEFAULT_DPI).round();
        format!("{w} × {h} cm")
    }
}

impl Default for Template {
    fn default() -> Self {
        generate_full_template(&TemplateSpec::default())
    }
}

/// Partial template update. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplatePatch {
    /// New identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// New project name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New width in pixels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    /// New height in pixels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    /// New background; `Some(None)` clears it.
    #[serde(
        default,
        deserialize_with = "present_nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub background_image: Option<Option<String>>,
    /// New orientation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orientation: Option<Orientation>,
    /// New editability flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_editable: Option<bool>,
}

impl TemplatePatch {
    /// Patch that only changes the pixel size.
    #[must_use]
    pub fn size(width: u32, height: u32) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
            ..Self::default()
        }
    }

    /// Patch that only changes the background.
    #[must_use]
    pub fn background(background: Option<String>) -> Self {
        Self {
            background_image: Some(background),
            ..Self::default()
        }
    }

    /// Patch that locks the design.
    #[must_use]
    pub fn lock() -> Self {
        Self {
            is_editable: Some(false),
            ..Self::default()
        }
    }
}

/// Distinguishes a present `null` from an absent key.
fn present_nullable<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

/// Physical description of a tile, in centimetres.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateSpec {
    /// Template identifier.
    pub id: String,
    /// Project name.
    pub name: String,
    /// Real width in centimetres.
    pub real_width: f32,
    /// Real height in centimetres.
    pub real_height: f32,
    /// Background asset id.
    #[serde(default)]
    pub background_image: Option<String>,
    /// Print resolution.
    #[serde(default = "TemplateSpec::default_dpi")]
    pub dpi: u32,
    /// Requested orientation.
    #[serde(default)]
    pub orientation: Orientation,
    /// Whether the design starts editable.
    #[serde(default = "Template::default_editable")]
    pub is_editable: bool,
}

impl TemplateSpec {
    const fn default_dpi() -> u32 {
        DEFAULT_DPI
    }
}

impl Default for TemplateSpec {
    fn default() -> Self {
        Self {
            id: "tile".to_string(),
            name: String::new(),
            real_width: 15.0,
            real_height: 21.0,
            background_image: None,
            dpi: DEFAULT_DPI,
            orientation: Orientation::Vertical,
            is_editable: true,
        }
    }
}

/// Build a pixel template from its physical description.
///
/// Vertical tiles take width from the real width; horizontal tiles swap the
/// two sides. A missing background resolves to the `transparent` option.
#[must_use]
pub fn generate_full_template(spec: &TemplateSpec) -> Template {
    let real_w = cm_to_pixels(spec.real_width, spec.dpi);
    let real_h = cm_to_pixels(spec.real_height, spec.dpi);
    let (width, height) = match spec.orientation {
        Orientation::Vertical => (real_w, real_h),
        Orientation::Horizontal => (real_h, real_w),
    };

    Template {
        id: spec.id.clone(),
        name: spec.name.clone(),
        width,
        height,
        background_image: Some(
            spec.background_image
                .clone()
                .unwrap_or_else(|| crate::catalog::TRANSPARENT_BACKGROUND.to_string()),
        ),
        orientation: spec.orientation,
        is_editable: spec.is_editable,
    }
}

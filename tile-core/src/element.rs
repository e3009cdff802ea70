//! Design elements - the text, image and vector pieces placed on a tile.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for an element.
///
/// Ids are opaque strings so designs saved by other clients load unchanged.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(String);

impl ElementId {
    /// Wrap an existing id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh id of the form `<prefix>-<uuid>`.
    #[must_use]
    pub fn generate(prefix: &str) -> Self {
        Self(format!("{prefix}-{}", Uuid::new_v4()))
    }

    /// The id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ElementId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Font weight and slant combination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FontStyle {
    /// Regular.
    #[default]
    #[serde(rename = "normal")]
    Normal,
    /// Bold.
    #[serde(rename = "bold")]
    Bold,
    /// Italic.
    #[serde(rename = "italic")]
    Italic,
    /// Bold and italic.
    #[serde(rename = "bold italic")]
    BoldItalic,
}

impl FontStyle {
    /// Compose a style from its two flags.
    #[must_use]
    pub const fn from_flags(bold: bool, italic: bool) -> Self {
        match (bold, italic) {
            (false, false) => Self::Normal,
            (true, false) => Self::Bold,
            (false, true) => Self::Italic,
            (true, true) => Self::BoldItalic,
        }
    }

    /// Whether the style is bold.
    #[must_use]
    pub const fn is_bold(self) -> bool {
        matches!(self, Self::Bold | Self::BoldItalic)
    }

    /// Whether the style is italic.
    #[must_use]
    pub const fn is_italic(self) -> bool {
        matches!(self, Self::Italic | Self::BoldItalic)
    }

    /// Flip the bold flag, keeping italic.
    #[must_use]
    pub const fn toggle_bold(self) -> Self {
        Self::from_flags(!self.is_bold(), self.is_italic())
    }

    /// Flip the italic flag, keeping bold.
    #[must_use]
    pub const fn toggle_italic(self) -> Self {
        Self::from_flags(self.is_bold(), !self.is_italic())
    }

    /// CSS/SVG `font-weight` value.
    #[must_use]
    pub const fn weight(self) -> &'static str {
        if self.is_bold() {
            "bold"
        } else {
            "normal"
        }
    }

    /// CSS/SVG `font-style` value.
    #[must_use]
    pub const fn slant(self) -> &'static str {
        if self.is_italic() {
            "italic"
        } else {
            "normal"
        }
    }
}

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    /// Flush left.
    #[default]
    Left,
    /// Centred.
    Center,
    /// Flush right.
    Right,
}

/// Properties of a text element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextProperties {
    /// Displayed text.
    pub text: String,
    /// Font size in pixels.
    pub font_size: f32,
    /// Font family name.
    pub font_family: String,
    /// Weight and slant.
    #[serde(default)]
    pub font_style: FontStyle,
    /// Horizontal alignment.
    #[serde(default)]
    pub align: TextAlign,
    /// Fill colour as hex.
    pub fill: String,
    /// Marks the element as a template slot filled from variants.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_dynamic: bool,
    /// Variant value key for a dynamic slot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_key: Option<String>,
}

impl Default for TextProperties {
    fn default() -> Self {
        Self {
            text: "Change me please...".to_string(),
            font_size: 124.0,
            font_family: "Inter".to_string(),
            font_style: FontStyle::Normal,
            align: TextAlign::Center,
            fill: "#000000".to_string(),
            is_dynamic: false,
            field_key: None,
        }
    }
}

impl TextProperties {
    /// The key this slot reads from variants, when it is a usable slot.
    #[must_use]
    pub fn dynamic_key(&self) -> Option<&str> {
        if !self.is_dynamic {
            return None;
        }
        self.field_key.as_deref().filter(|key| !key.is_empty())
    }

    /// Patch that switches the slot on or off.
    ///
    /// Switching on replaces the text with the `{{key}}` placeholder.
    #[must_use]
    pub fn dynamic_toggle_patch(&self, enabled: bool) -> PropertiesPatch {
        let mut patch = PropertiesPatch {
            is_dynamic: Some(enabled),
            ..PropertiesPatch::default()
        };
        if enabled {
            patch.text = Some(placeholder(self.field_key.as_deref().unwrap_or_default()));
        }
        patch
    }

    /// Patch that renames the slot key, keeping the placeholder in sync.
    #[must_use]
    pub fn field_key_patch(&self, key: &str) -> PropertiesPatch {
        PropertiesPatch {
            field_key: Some(key.to_string()),
            text: self.is_dynamic.then(|| placeholder(key)),
            ..PropertiesPatch::default()
        }
    }

    /// Rough natural size without a font engine: widest line at 0.6em per
    /// glyph, padded like the editor's text boxes.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn estimated_size(&self) -> (f32, f32) {
        let widest = self
            .text
            .lines()
            .map(|line| line.chars().count())
            .max()
            .unwrap_or(0);
        let measured = widest as f32 * self.font_size * 0.6;
        ((measured + 20.0).max(100.0), self.font_size + 20.0)
    }
}

fn placeholder(key: &str) -> String {
    format!("{{{{{key}}}}}")
}

/// Properties of an image element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageProperties {
    /// Data URI or URL.
    pub src: String,
    /// Alternative text, usually the uploaded file name.
    #[serde(default)]
    pub alt: String,
}

/// Properties of a vector element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SvgProperties {
    /// SVG markup.
    pub raw: String,
    /// Fill colour substituted into every shape.
    #[serde(default)]
    pub fill: String,
}

impl SvgProperties {
    /// Markup with the fill colour applied.
    #[must_use]
    pub fn recolored(&self) -> String {
        apply_fill_to_svg(&self.raw, &self.fill)
    }
}

/// Kind-specific element content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "properties", rename_all = "lowercase")]
pub enum ElementKind {
    /// Text block.
    Text(TextProperties),
    /// Raster image.
    Image(ImageProperties),
    /// Recolourable vector graphic.
    Svg(SvgProperties),
}

impl ElementKind {
    /// Short kind name used in ids and logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Image(_) => "image",
            Self::Svg(_) => "svg",
        }
    }
}

/// An element placed on the tile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorElement {
    /// Unique identifier.
    pub id: ElementId,
    /// Left edge in design pixels.
    pub x: f32,
    /// Top edge in design pixels.
    pub y: f32,
    /// Width; `None` means natural size.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f32>,
    /// Height; `None` means natural size.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f32>,
    /// Clockwise rotation in degrees about the top-left corner.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f32>,
    /// Content.
    #[serde(flatten)]
    pub kind: ElementKind,
}

/// Fallback box for images and vectors before they are measured.
pub const FALLBACK_SIZE: (f32, f32) = (100.0, 100.0);

impl EditorElement {
    /// Create an element with a generated id at `(x, y)`.
    #[must_use]
    pub fn new(kind: ElementKind, x: f32, y: f32) -> Self {
        Self {
            id: ElementId::generate(kind.name()),
            x,
            y,
            width: None,
            height: None,
            rotation: Some(0.0),
            kind,
        }
    }

    /// Default text block.
    #[must_use]
    pub fn new_text() -> Self {
        Self::new(ElementKind::Text(TextProperties::default()), 50.0, 50.0)
    }

    /// Image element from a source and its file name.
    #[must_use]
    pub fn new_image(src: impl Into<String>, alt: impl Into<String>) -> Self {
        Self::new(
            ElementKind::Image(ImageProperties {
                src: src.into(),
                alt: alt.into(),
            }),
            50.0,
            50.0,
        )
    }

    /// Vector element from markup and a fill colour.
    #[must_use]
    pub fn new_svg(raw: impl Into<String>, fill: impl Into<String>) -> Self {
        Self::new(
            ElementKind::Svg(SvgProperties {
                raw: raw.into(),
                fill: fill.into(),
            }),
            50.0,
            50.0,
        )
    }

    /// Replace the generated id.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<ElementId>) -> Self {
        self.id = id.into();
        self
    }

    /// Set the position.
    #[must_use]
    pub fn with_position(mut self, x: f32, y: f32) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    /// Set an explicit size.
    #[must_use]
    pub fn with_size(mut self, width: f32, height: f32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    /// Text properties, if this is a text element.
    #[must_use]
    pub fn text(&self) -> Option<&TextProperties> {
        match &self.kind {
            ElementKind::Text(props) => Some(props),
            _ => None,
        }
    }

    /// Whether this element is a dynamic text slot.
    #[must_use]
    pub fn is_dynamic(&self) -> bool {
        self.text().is_some_and(|props| props.is_dynamic)
    }

    /// Size used before the rendering surface measures the element.
    #[must_use]
    pub fn natural_size(&self) -> (f32, f32) {
        match &self.kind {
            ElementKind::Text(props) => props.estimated_size(),
            ElementKind::Image(_) | ElementKind::Svg(_) => FALLBACK_SIZE,
        }
    }

    /// Explicit size, falling back to the natural size per axis.
    #[must_use]
    pub fn resolved_size(&self) -> (f32, f32) {
        let (nw, nh) = self.natural_size();
        (self.width.unwrap_or(nw), self.height.unwrap_or(nh))
    }

    /// Check if a design-space point lies inside the rotated box.
    #[must_use]
    pub fn contains_point(&self, x: f32, y: f32) -> bool {
        let (w, h) = self.resolved_size();
        let (dx, dy) = (x - self.x, y - self.y);
        let theta = -self.rotation.unwrap_or(0.0).to_radians();
        let (sin, cos) = theta.sin_cos();
        let lx = dx * cos - dy * sin;
        let ly = dx * sin + dy * cos;
        (0.0..=w).contains(&lx) && (0.0..=h).contains(&ly)
    }
}

/// Partial update of the positional attributes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PositionalPatch {
    /// New left edge.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f32>,
    /// New top edge.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f32>,
    /// New width.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f32>,
    /// New height.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f32>,
    /// New rotation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f32>,
}

impl PositionalPatch {
    /// Patch that moves to `(x, y)`.
    #[must_use]
    pub const fn position(x: f32, y: f32) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            width: None,
            height: None,
            rotation: None,
        }
    }

    /// Whether no field is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.x.is_none()
            && self.y.is_none()
            && self.width.is_none()
            && self.height.is_none()
            && self.rotation.is_none()
    }

    /// Overlay `newer` on top of this patch.
    pub fn merge(&mut self, newer: &Self) {
        self.x = newer.x.or(self.x);
        self.y = newer.y.or(self.y);
        self.width = newer.width.or(self.width);
        self.height = newer.height.or(self.height);
        self.rotation = newer.rotation.or(self.rotation);
    }

    /// Write the set fields into an element.
    pub fn apply(&self, element: &mut EditorElement) {
        if let Some(x) = self.x {
            element.x = x;
        }
        if let Some(y) = self.y {
            element.y = y;
        }
        if self.width.is_some() {
            element.width = self.width;
        }
        if self.height.is_some() {
            element.height = self.height;
        }
        if self.rotation.is_some() {
            element.rotation = self.rotation;
        }
    }
}

/// Partial update of an element's properties bag.
///
/// Holds the union of all kinds' fields; only those matching the element's
/// kind are applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertiesPatch {
    /// Text content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Font size.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f32>,
    /// Font family.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    /// Weight and slant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_style: Option<FontStyle>,
    /// Alignment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub align: Option<TextAlign>,
    /// Fill colour, for text and vectors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
    /// Dynamic slot flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_dynamic: Option<bool>,
    /// Dynamic slot key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_key: Option<String>,
    /// Image source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    /// Image alternative text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    /// Vector markup.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
}

fn set<T: Clone>(slot: &mut T, value: Option<&T>) {
    if let Some(value) = value {
        slot.clone_from(value);
    }
}

impl PropertiesPatch {
    /// Merge one level deep into `kind`: set keys win, others are kept.
    pub fn apply(&self, kind: &mut ElementKind) {
        match kind {
            ElementKind::Text(props) => {
                set(&mut props.text, self.text.as_ref());
                set(&mut props.font_size, self.font_size.as_ref());
                set(&mut props.font_family, self.font_family.as_ref());
                set(&mut props.font_style, self.font_style.as_ref());
                set(&mut props.align, self.align.as_ref());
                set(&mut props.fill, self.fill.as_ref());
                set(&mut props.is_dynamic, self.is_dynamic.as_ref());
                if self.field_key.is_some() {
                    props.field_key.clone_from(&self.field_key);
                }
            }
            ElementKind::Image(props) => {
                set(&mut props.src, self.src.as_ref());
                set(&mut props.alt, self.alt.as_ref());
            }
            ElementKind::Svg(props) => {
                set(&mut props.raw, self.raw.as_ref());
                set(&mut props.fill, self.fill.as_ref());
            }
        }
    }
}

/// Update payload for an element: positional fields plus a properties patch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementPatch {
    /// Positional fields, eligible for per-variant override.
    #[serde(flatten)]
    pub position: PositionalPatch,
    /// Properties merged into the base element.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<PropertiesPatch>,
}

impl ElementPatch {
    /// Positional-only update.
    #[must_use]
    pub const fn positional(position: PositionalPatch) -> Self {
        Self {
            position,
            properties: None,
        }
    }

    /// Properties-only update.
    #[must_use]
    pub fn properties(properties: PropertiesPatch) -> Self {
        Self {
            position: PositionalPatch::default(),
            properties: Some(properties),
        }
    }

    /// Move to `(x, y)`.
    #[must_use]
    pub const fn moved_to(x: f32, y: f32) -> Self {
        Self::positional(PositionalPatch::position(x, y))
    }
}

/// Apply `fill` to every shape in an SVG document.
///
/// Every existing `fill` attribute is rewritten, single- or double-quoted;
/// when there is none a `fill` attribute is added to the root `<svg>` tag.
/// An empty fill returns the markup untouched.
#[must_use]
pub fn apply_fill_to_svg(raw: &str, fill: &str) -> String {
    if fill.is_empty() {
        return raw.to_string();
    }

    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    let mut replaced = false;
    while let Some((start, quote)) = find_fill_attr(rest) {
        // `fill=` plus the opening quote
        let value_start = start + "fill=".len() + 1;
        let Some(len) = rest[value_start..].find(quote) else {
            break;
        };
        out.push_str(&rest[..value_start]);
        out.push_str(fill);
        out.push(quote);
        rest = &rest[value_start + len + 1..];
        replaced = true;
    }
    out.push_str(rest);

    if replaced {
        return out;
    }

    match raw.find("<svg") {
        Some(pos) => {
            let insert_at = pos + "<svg".len();
            format!("{} fill=\"{fill}\"{}", &raw[..insert_at], &raw[insert_at..])
        }
        None => raw.to_string(),
    }
}

/// Byte offset and quote of the next standalone `fill=` attribute.
fn find_fill_attr(haystack: &str) -> Option<(usize, char)> {
    let mut offset = 0;
    while let Some(pos) = haystack[offset..].find("fill=") {
        let at = offset + pos;
        let standalone = match haystack[..at].chars().next_back() {
            Some(prev) => prev.is_whitespace(),
            None => true,
        };
        let quote = haystack[at + "fill=".len()..]
            .chars()
            .next()
            .filter(|c| *c == '"' || *c == '\'');
        if let (true, Some(quote)) = (standalone, quote) {
            return Some((at, quote));
        }
        offset = at + 1;
    }
    None
}

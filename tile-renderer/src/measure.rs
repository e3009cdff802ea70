//! Natural sizes for elements without an explicit box.
//!
//! The editor writes these back into an element the first time it is
//! transformed, so later frames no longer depend on measurement.

use base64::Engine;
use tile_core::{EditorElement, ElementKind, ElementPatch, PositionalPatch, TextProperties};

use crate::error::{RenderError, RenderResult};

/// Padding added around measured text, matching the editor's text boxes.
const TEXT_PADDING: f32 = 20.0;

/// Smallest natural text width.
const MIN_TEXT_WIDTH: f32 = 100.0;

/// Decode the payload of a `data:` URI.
///
/// # Errors
///
/// Returns an error if the URI is malformed or the payload is not base64.
pub fn decode_data_uri(uri: &str) -> RenderResult<Vec<u8>> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| RenderError::Resource("Not a data URI".to_string()))?;
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| RenderError::Resource("Invalid data URI: missing comma".to_string()))?;
    if meta.contains(";base64") {
        base64::engine::general_purpose::STANDARD
            .decode(payload)
            .map_err(|e| RenderError::Resource(format!("Failed to decode base64: {e}")))
    } else {
        Ok(payload.as_bytes().to_vec())
    }
}

/// Pixel size of an embedded raster image.
///
/// # Errors
///
/// Returns an error if the source is not a decodable data URI.
#[allow(clippy::cast_precision_loss)]
pub fn image_size(src: &str) -> RenderResult<(f32, f32)> {
    let bytes = decode_data_uri(src)?;
    let img = image::load_from_memory(&bytes)
        .map_err(|e| RenderError::Resource(format!("Failed to decode image: {e}")))?;
    Ok((img.width() as f32, img.height() as f32))
}

/// Intrinsic size of SVG markup.
///
/// # Errors
///
/// Returns an error if the markup cannot be parsed.
pub fn svg_size(markup: &str, options: &usvg::Options<'_>) -> RenderResult<(f32, f32)> {
    let tree =
        usvg::Tree::from_str(markup, options).map_err(|e| RenderError::Svg(e.to_string()))?;
    Ok((tree.size().width(), tree.size().height()))
}

/// Measured text box, or the glyph-count estimate when no font matched.
#[must_use]
pub fn text_size(props: &TextProperties, options: &usvg::Options<'_>) -> (f32, f32) {
    let line = props.text.lines().next().unwrap_or_default();
    let sample = format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"1\" height=\"1\"><text x=\"0\" y=\"{}\" font-size=\"{}\" font-family=\"{}\" font-weight=\"{}\" font-style=\"{}\">{}</text></svg>",
        props.font_size,
        props.font_size,
        props.font_family.replace('"', ""),
        props.font_style.weight(),
        props.font_style.slant(),
        line.replace('&', "&amp;").replace('<', "&lt;"),
    );
    let measured = usvg::Tree::from_str(&sample, options)
        .ok()
        .map(|tree| tree.root().abs_bounding_box().width())
        .filter(|w| *w > 0.0);
    match measured {
        Some(width) => (
            (width + TEXT_PADDING).max(MIN_TEXT_WIDTH),
            props.font_size + TEXT_PADDING,
        ),
        None => props.estimated_size(),
    }
}

/// Natural size of any element.
///
/// Images and vectors that cannot be decoded keep the editor's fallback box.
#[must_use]
pub fn natural_size(element: &EditorElement, options: &usvg::Options<'_>) -> (f32, f32) {
    let measured = match &element.kind {
        ElementKind::Text(props) => Ok(text_size(props, options)),
        ElementKind::Image(props) => image_size(&props.src),
        ElementKind::Svg(props) => svg_size(&props.raw, options),
    };
    match measured {
        Ok(size) => size,
        Err(err) => {
            tracing::debug!(element = %element.id, error = %err, "Using fallback size");
            element.natural_size()
        }
    }
}

/// Patch writing the natural size into an element that has none.
///
/// Returns `None` when both sides are already set.
#[must_use]
pub fn natural_size_patch(
    element: &EditorElement,
    options: &usvg::Options<'_>,
) -> Option<ElementPatch> {
    if element.width.is_some() && element.height.is_some() {
        return None;
    }
    let (width, height) = natural_size(element, options);
    Some(ElementPatch::positional(PositionalPatch {
        width: Some(element.width.unwrap_or(width)),
        height: Some(element.height.unwrap_or(height)),
        ..PositionalPatch::default()
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED_PIXEL: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mP8z8DwHwAFBQIAX8jx0gAAAABJRU5ErkJggg==";

    #[test]
    fn test_image_size_from_data_uri() {
        let (w, h) = image_size(RED_PIXEL).expect("size");
        assert!((w - 1.0).abs() < f32::EPSILON);
        assert!((h - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_invalid_data_uri() {
        assert!(decode_data_uri("not a data uri").is_err());
        assert!(decode_data_uri("data:image/png").is_err());
    }

    #[test]
    fn test_svg_size() {
        let size = svg_size(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"64\" height=\"32\"/>",
            &usvg::Options::default(),
        )
        .expect("size");
        assert_eq!(size, (64.0, 32.0));
    }

    #[test]
    fn test_undecodable_image_uses_fallback() {
        let element = EditorElement::new_image("https://example.com/a.png", "a.png");
        assert_eq!(
            natural_size(&element, &usvg::Options::default()),
            tile_core::element::FALLBACK_SIZE
        );
    }

    #[test]
    fn test_text_without_fonts_uses_estimate() {
        let element = EditorElement::new_text();
        let props = element.text().expect("text");
        // no fonts loaded into the default options database
        assert_eq!(
            text_size(props, &usvg::Options::default()),
            props.estimated_size()
        );
    }

    #[test]
    fn test_patch_only_for_missing_sides() {
        let options = usvg::Options::default();
        let sized = EditorElement::new_text().with_size(10.0, 10.0);
        assert!(natural_size_patch(&sized, &options).is_none());

        let mut half = EditorElement::new_image(RED_PIXEL, "px.png");
        half.width = Some(30.0);
        let patch = natural_size_patch(&half, &options).expect("patch");
        assert_eq!(patch.position.width, Some(30.0));
        assert_eq!(patch.position.height, Some(1.0));
    }
}

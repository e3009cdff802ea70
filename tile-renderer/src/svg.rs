//! Scene to SVG conversion.
//!
//! The document is laid out in stage coordinates: the tile group carries the
//! viewport translation and scale, so any stage-space region can be cut out
//! with a `viewBox`.

use std::fmt::Write;

use base64::Engine;
use serde::{Deserialize, Serialize};
use tile_core::catalog::CORNER_RADIUS;
use tile_core::{EditorElement, ElementKind, Scene, TextAlign, TextProperties};

/// Outline drawn around the tile.
const OUTLINE_COLOR: &str = "#e5e7eb";
const OUTLINE_WIDTH: f32 = 5.0;

/// Selection frame colour.
const SELECTION_COLOR: &str = "#3b82f6";

/// Drawing switches for one SVG document.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SvgStyle {
    /// Draw the background image layer.
    pub show_background: bool,
    /// Draw the tile outline.
    pub show_outline: bool,
    /// Tile corner radius in design pixels.
    pub corner_radius: f32,
}

impl Default for SvgStyle {
    fn default() -> Self {
        Self {
            show_background: true,
            show_outline: true,
            corner_radius: CORNER_RADIUS,
        }
    }
}

/// Stage-space rectangle an SVG document shows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewBox {
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    /// Width.
    pub width: f32,
    /// Height.
    pub height: f32,
}

/// Render a scene as an SVG document.
///
/// `view` selects the stage region; the document's pixel size is `out_w` by
/// `out_h`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn scene_to_svg(scene: &Scene, style: &SvgStyle, view: ViewBox, out_w: u32, out_h: u32) -> String {
    let tw = scene.template.width as f32;
    let th = scene.template.height as f32;
    let radius = style.corner_radius;
    let vp = &scene.viewport;

    let mut svg = String::with_capacity(4096);
    let _ = write!(
        svg,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" xmlns:xlink=\"http://www.w3.org/1999/xlink\" width=\"{out_w}\" height=\"{out_h}\" viewBox=\"{} {} {} {}\">",
        view.x, view.y, view.width, view.height,
    );
    let _ = write!(
        svg,
        "<defs><clipPath id=\"tile-clip\"><rect x=\"0\" y=\"0\" width=\"{tw}\" height=\"{th}\" rx=\"{radius}\" ry=\"{radius}\"/></clipPath></defs>",
    );
    let _ = write!(
        svg,
        "<g transform=\"translate({},{}) scale({})\">",
        vp.x, vp.y, vp.scale,
    );

    if style.show_outline {
        let _ = write!(
            svg,
            "<rect x=\"0\" y=\"0\" width=\"{tw}\" height=\"{th}\" rx=\"{radius}\" ry=\"{radius}\" fill=\"none\" stroke=\"{OUTLINE_COLOR}\" stroke-width=\"{OUTLINE_WIDTH}\"/>",
        );
    }

    if style.show_background {
        if let Some(src) = &scene.background {
            let _ = write!(
                svg,
                "<image class=\"template-bg\" x=\"0\" y=\"0\" width=\"{tw}\" height=\"{th}\" preserveAspectRatio=\"none\" clip-path=\"url(#tile-clip)\" xlink:href=\"{}\"/>",
                escape_xml(src),
            );
        }
    }

    svg.push_str("<g clip-path=\"url(#tile-clip)\">");
    for element in &scene.elements {
        render_element(&mut svg, element);
    }
    svg.push_str("</g>");

    if let Some(selected) = scene.selected_element() {
        render_selection(&mut svg, selected, vp.scale);
    }

    svg.push_str("</g></svg>");
    svg
}

fn rotation_attr(element: &EditorElement) -> String {
    match element.rotation {
        Some(r) if r.abs() > f32::EPSILON => {
            format!(" transform=\"rotate({r} {} {})\"", element.x, element.y)
        }
        _ => String::new(),
    }
}

fn render_element(svg: &mut String, element: &EditorElement) {
    let (w, h) = element.resolved_size();
    let rotate = rotation_attr(element);
    match &element.kind {
        ElementKind::Text(props) => render_text(svg, element, props, w, &rotate),
        ElementKind::Image(props) => {
            let _ = write!(
                svg,
                "<image x=\"{}\" y=\"{}\" width=\"{w}\" height=\"{h}\" preserveAspectRatio=\"none\" xlink:href=\"{}\"{rotate}/>",
                element.x,
                element.y,
                escape_xml(&props.src),
            );
        }
        ElementKind::Svg(props) => {
            let _ = write!(
                svg,
                "<image x=\"{}\" y=\"{}\" width=\"{w}\" height=\"{h}\" preserveAspectRatio=\"none\" xlink:href=\"{}\"{rotate}/>",
                element.x,
                element.y,
                svg_data_uri(&props.recolored()),
            );
        }
    }
}

fn render_text(svg: &mut String, element: &EditorElement, props: &TextProperties, width: f32, rotate: &str) {
    let (anchor, tx) = match props.align {
        TextAlign::Left => ("start", element.x),
        TextAlign::Center => ("middle", element.x + width / 2.0),
        TextAlign::Right => ("end", element.x + width),
    };
    let size = props.font_size;
    let _ = write!(
        svg,
        "<text x=\"{tx}\" y=\"{}\" font-size=\"{size}\" font-family=\"{}\" font-weight=\"{}\" font-style=\"{}\" fill=\"{}\" text-anchor=\"{anchor}\"{rotate}>",
        element.y + size,
        escape_xml(&props.font_family),
        props.font_style.weight(),
        props.font_style.slant(),
        escape_xml(&props.fill),
    );
    for (index, line) in props.text.lines().enumerate() {
        let dy = if index == 0 { 0.0 } else { size };
        let _ = write!(svg, "<tspan x=\"{tx}\" dy=\"{dy}\">{}</tspan>", escape_xml(line));
    }
    svg.push_str("</text>");
}

/// Dashed frame standing in for the transform handles.
fn render_selection(svg: &mut String, element: &EditorElement, scale: f32) {
    let (w, h) = element.resolved_size();
    let stroke = if scale > f32::EPSILON { 1.0 / scale } else { 1.0 };
    let _ = write!(
        svg,
        "<rect class=\"selection\" x=\"{}\" y=\"{}\" width=\"{w}\" height=\"{h}\" fill=\"none\" stroke=\"{SELECTION_COLOR}\" stroke-width=\"{stroke}\" stroke-dasharray=\"{} {}\"{}/>",
        element.x,
        element.y,
        4.0 * stroke,
        4.0 * stroke,
        rotation_attr(element),
    );
}

/// Embed SVG markup as a base64 data URI.
#[must_use]
pub fn svg_data_uri(markup: &str) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(markup.as_bytes());
    format!("data:image/svg+xml;base64,{encoded}")
}

/// Escape special XML characters.
fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

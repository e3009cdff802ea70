//! Rasterizing render surface.
//!
//! Keeps the last presented [`Scene`] and rasterizes stage-space regions of
//! it through usvg, resvg and tiny-skia.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use tile_core::{EditorResult, Region, RenderSurface, Scene};
use tracing::debug;

use crate::error::{RenderError, RenderResult};
use crate::svg::{scene_to_svg, SvgStyle, ViewBox};

/// Surface settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SurfaceConfig {
    /// Load installed fonts for text rendering.
    pub load_system_fonts: bool,
    /// Directory relative image paths (backgrounds) are resolved against.
    pub resources_dir: Option<PathBuf>,
    /// Drawing switches.
    pub style: SvgStyle,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            load_system_fonts: true,
            resources_dir: None,
            style: SvgStyle::default(),
        }
    }
}

/// A [`RenderSurface`] backed by an SVG intermediate representation.
pub struct SvgSurface {
    style: SvgStyle,
    options: usvg::Options<'static>,
    frame: Option<Scene>,
    background_visible: bool,
}

impl std::fmt::Debug for SvgSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SvgSurface")
            .field("style", &self.style)
            .field("has_frame", &self.frame.is_some())
            .field("background_visible", &self.background_visible)
            .finish_non_exhaustive()
    }
}

impl SvgSurface {
    /// Create a surface with the given configuration.
    #[must_use]
    pub fn new(config: SurfaceConfig) -> Self {
        let mut options = usvg::Options {
            resources_dir: config.resources_dir,
            ..usvg::Options::default()
        };
        if config.load_system_fonts {
            options.fontdb_mut().load_system_fonts();
        }
        Self {
            style: config.style,
            options,
            frame: None,
            background_visible: true,
        }
    }

    /// Create a surface with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(SurfaceConfig::default())
    }

    /// The last presented frame.
    #[must_use]
    pub fn frame(&self) -> Option<&Scene> {
        self.frame.as_ref()
    }

    /// Whether the background layer is currently drawn.
    #[must_use]
    pub fn background_visible(&self) -> bool {
        self.background_visible
    }

    /// SVG for a stage region of the current frame.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::NoFrame`] before the first `present`.
    pub fn region_svg(&self, region: Region, pixel_ratio: f32) -> RenderResult<String> {
        let scene = self.frame.as_ref().ok_or(RenderError::NoFrame)?;
        let (out_w, out_h) = output_size(region, pixel_ratio);
        let style = SvgStyle {
            show_background: self.style.show_background && self.background_visible,
            ..self.style
        };
        let view = ViewBox {
            x: region.x,
            y: region.y,
            width: region.width.max(f32::EPSILON),
            height: region.height.max(f32::EPSILON),
        };
        Ok(scene_to_svg(scene, &style, view, out_w, out_h))
    }

    /// Rasterize a stage region of the current frame to PNG bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if nothing was presented or rasterization fails.
    pub fn render_png(&self, region: Region, pixel_ratio: f32) -> RenderResult<Vec<u8>> {
        let svg = self.region_svg(region, pixel_ratio)?;
        let pixmap = self.rasterize_svg(&svg)?;
        pixmap
            .encode_png()
            .map_err(|e| RenderError::Raster(format!("PNG encoding failed: {e}")))
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn rasterize_svg(&self, svg: &str) -> RenderResult<tiny_skia::Pixmap> {
        let tree = usvg::Tree::from_str(svg, &self.options)
            .map_err(|e| RenderError::Svg(e.to_string()))?;

        let px_w = tree.size().width().round() as u32;
        let px_h = tree.size().height().round() as u32;

        let mut pixmap = tiny_skia::Pixmap::new(px_w.max(1), px_h.max(1))
            .ok_or_else(|| RenderError::Raster("Failed to create pixmap".to_string()))?;

        resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());

        Ok(pixmap)
    }
}

impl Default for SvgSurface {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl RenderSurface for SvgSurface {
    fn present(&mut self, scene: &Scene) -> EditorResult<()> {
        debug!(elements = scene.elements.len(), "Presenting frame");
        self.frame = Some(scene.clone());
        Ok(())
    }

    fn set_background_visible(&mut self, visible: bool) {
        self.background_visible = visible;
    }

    fn rasterize(&mut self, region: Region, pixel_ratio: f32) -> EditorResult<Vec<u8>> {
        Ok(self.render_png(region, pixel_ratio)?)
    }
}

/// Output pixel size of a region at a pixel ratio, at least 1x1.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn output_size(region: Region, pixel_ratio: f32) -> (u32, u32) {
    let w = (region.width * pixel_ratio).round().max(1.0) as u32;
    let h = (region.height * pixel_ratio).round().max(1.0) as u32;
    (w, h)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tile_core::{BackgroundCatalog, EditorDocument, Template};

    fn surface() -> SvgSurface {
        SvgSurface::new(SurfaceConfig {
            load_system_fonts: false,
            ..SurfaceConfig::default()
        })
    }

    fn region() -> Region {
        Region {
            x: 0.0,
            y: 0.0,
            width: 40.0,
            height: 20.0,
        }
    }

    #[test]
    fn test_rasterize_before_present_fails() {
        let mut surface = surface();
        assert!(surface.rasterize(region(), 1.0).is_err());
    }

    #[test]
    fn test_config_from_partial_json() {
        let config: SurfaceConfig =
            serde_json::from_str(r#"{"loadSystemFonts":false,"style":{"showOutline":false}}"#)
                .expect("config");
        assert!(!config.load_system_fonts);
        assert!(!config.style.show_outline);
        assert!(config.style.show_background);
        assert!((config.style.corner_radius - 42.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_output_size_scales_with_ratio() {
        assert_eq!(output_size(region(), 2.0), (80, 40));
        assert_eq!(output_size(region(), 0.0), (1, 1));
    }

    #[test]
    fn test_background_toggle_changes_svg() {
        let mut doc = EditorDocument::new(Template::new("t", "n", 40, 20));
        doc.template.background_image = Some("mirror-silver".to_string());
        let mut surface = surface();
        surface
            .present(&Scene::build(&doc, &BackgroundCatalog::default()))
            .expect("present");
        assert!(surface
            .region_svg(region(), 1.0)
            .expect("svg")
            .contains("template-bg"));
        surface.set_background_visible(false);
        assert!(!surface
            .region_svg(region(), 1.0)
            .expect("svg")
            .contains("template-bg"));
    }

    #[test]
    fn test_png_magic_bytes() {
        let doc = EditorDocument::new(Template::new("t", "n", 40, 20));
        let mut surface = surface();
        surface
            .present(&Scene::build(&doc, &BackgroundCatalog::default()))
            .expect("present");
        let png = surface.rasterize(region(), 2.0).expect("png");
        assert_eq!(&png[0..4], &[137, 80, 78, 71]);
    }
}

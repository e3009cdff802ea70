//! Export pipeline: PNG per variant and JSON project files.
//!
//! The exporter drives an abstract [`RenderSurface`]. Every variant switch is
//! followed by a fresh [`RenderSurface::present`] call, so the surface never
//! rasterizes the previous variant's frame.
//!
//! There is no cancellation: a multi-variant export runs to completion once
//! started.

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::action::Action;
use crate::error::EditorResult;
use crate::payload::ProjectExport;
use crate::scene::{Region, Scene};
use crate::session::EditorSession;

/// MIME type of raster exports.
pub const PNG_MIME: &str = "image/png";

/// MIME type of project exports.
pub const JSON_MIME: &str = "application/json";

/// Default file name pattern for multi-variant exports.
pub const DEFAULT_VARIANT_PATTERN: &str = "tile-{label}-{n}.png";

/// A retained-mode surface that can draw a scene and read pixels back.
pub trait RenderSurface {
    /// Replace the drawn frame with `scene`. Returns once the frame is flushed.
    ///
    /// # Errors
    ///
    /// Returns [`crate::EditorError::Render`] when drawing fails.
    fn present(&mut self, scene: &Scene) -> EditorResult<()>;

    /// Show or hide the background image layer.
    fn set_background_visible(&mut self, visible: bool);

    /// Encode the given stage-space region as PNG at `pixel_ratio`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::EditorError::Render`] when rasterization fails.
    fn rasterize(&mut self, region: Region, pixel_ratio: f32) -> EditorResult<Vec<u8>>;
}

/// Destination for downloaded files.
pub trait DownloadSink {
    /// Deliver a file to the user.
    ///
    /// # Errors
    ///
    /// Returns [`crate::EditorError::Download`] when delivery fails.
    fn download(&mut self, file_name: &str, mime: &str, bytes: &[u8]) -> EditorResult<()>;
}

/// PNG export settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportOptions {
    /// Keep the background finish in the image.
    pub include_background: bool,
    /// Output pixels per stage pixel.
    pub pixel_ratio: f32,
    /// Hand the image to the download sink.
    pub auto_download: bool,
    /// File name, or file name pattern for multi-variant exports.
    pub file_name: Option<String>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            include_background: true,
            pixel_ratio: 2.0,
            auto_download: true,
            file_name: None,
        }
    }
}

impl ExportOptions {
    fn default_file_name(&self) -> &'static str {
        if self.include_background {
            "tile-with-bg.png"
        } else {
            "tile-transparent.png"
        }
    }
}

/// One rasterized tile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedImage {
    /// Name the image was (or would be) downloaded as.
    pub file_name: String,
    /// Variant shown in the image, `None` for the base design.
    pub variant_id: Option<String>,
    /// PNG bytes.
    pub png: Vec<u8>,
}

/// Replace anything outside `[A-Za-z0-9_-]` with `_`.
#[must_use]
pub fn sanitize_label(label: &str) -> String {
    label
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Expand `{label}` and `{n}` in a variant file name pattern.
#[must_use]
pub fn variant_file_name(pattern: &str, label: &str, index: usize) -> String {
    pattern
        .replacen("{label}", &sanitize_label(label), 1)
        .replacen("{n}", &(index + 1).to_string(), 1)
}

/// Drives a surface and a download sink for one session.
pub struct Exporter<'a> {
    surface: Option<&'a mut dyn RenderSurface>,
    sink: Option<&'a mut dyn DownloadSink>,
}

impl<'a> Exporter<'a> {
    /// Exporter over a mounted surface, or none when nothing is mounted.
    #[must_use]
    pub fn new(surface: Option<&'a mut dyn RenderSurface>) -> Self {
        Self {
            surface,
            sink: None,
        }
    }

    /// Deliver auto-downloads to `sink`.
    #[must_use]
    pub fn with_sink(mut self, sink: &'a mut dyn DownloadSink) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Rasterize the tile for the active variant.
    ///
    /// Deselects first so handles never appear in the image. Returns
    /// `Ok(None)` when no surface is mounted.
    ///
    /// # Errors
    ///
    /// Returns an error if drawing, rasterizing or downloading fails. The
    /// background layer is visible again either way.
    pub fn png(
        &mut self,
        session: &mut EditorSession,
        options: &ExportOptions,
    ) -> EditorResult<Option<ExportedImage>> {
        let Some(surface) = self.surface.as_deref_mut() else {
            debug!("No surface mounted, skipping PNG export");
            return Ok(None);
        };
        session.dispatch(Action::SelectElement(None))?;
        let scene = session.committed_scene();
        surface.present(&scene)?;

        if !options.include_background {
            surface.set_background_visible(false);
        }
        let raster = surface.rasterize(scene.template_region(), options.pixel_ratio);
        surface.set_background_visible(true);
        let png = raster?;

        let file_name = options
            .file_name
            .clone()
            .unwrap_or_else(|| options.default_file_name().to_string());
        if options.auto_download {
            self.deliver(&file_name, PNG_MIME, &png)?;
        }
        info!(file = %file_name, bytes = png.len(), "Exported tile image");
        Ok(Some(ExportedImage {
            file_name,
            variant_id: session.document().active_variant_id.clone(),
            png,
        }))
    }

    /// Rasterize every variant in order, then restore the active variant.
    ///
    /// `options.file_name` is used as the name pattern, defaulting to
    /// [`DEFAULT_VARIANT_PATTERN`]. Without variants this is a single
    /// [`Exporter::png`] call.
    ///
    /// # Errors
    ///
    /// Stops at the first failing variant. The original active variant is
    /// restored before the error is returned.
    pub fn png_multi(
        &mut self,
        session: &mut EditorSession,
        options: &ExportOptions,
    ) -> EditorResult<Vec<ExportedImage>> {
        if session.document().dynamic_variants.is_empty() {
            return Ok(self.png(session, options)?.into_iter().collect());
        }
        if self.surface.is_none() {
            debug!("No surface mounted, skipping multi-variant export");
            return Ok(Vec::new());
        }

        let original = session.document().active_variant_id.clone();
        let variants: Vec<(String, String)> = session
            .document()
            .dynamic_variants
            .iter()
            .map(|v| (v.id.clone(), v.label.clone()))
            .collect();
        let pattern = options
            .file_name
            .as_deref()
            .unwrap_or(DEFAULT_VARIANT_PATTERN);

        let mut images = Vec::with_capacity(variants.len());
        let mut outcome = Ok(());
        for (index, (id, label)) in variants.iter().enumerate() {
            let per_variant = ExportOptions {
                file_name: Some(variant_file_name(pattern, label, index)),
                ..options.clone()
            };
            let step = session
                .dispatch(Action::SetActiveVariant(Some(id.clone())))
                .and_then(|()| self.png(session, &per_variant));
            match step {
                Ok(Some(image)) => images.push(image),
                Ok(None) => {}
                Err(err) => {
                    warn!(variant = %id, error = %err, "Variant export failed");
                    outcome = Err(err);
                    break;
                }
            }
        }

        session.dispatch(Action::SetActiveVariant(original))?;
        outcome?;
        info!(count = images.len(), "Exported variant images");
        Ok(images)
    }

    /// Download the design as a JSON project file stamped with `now`.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the download fails.
    pub fn json(
        &mut self,
        session: &EditorSession,
        now: DateTime<Utc>,
    ) -> EditorResult<ProjectExport> {
        let export = ProjectExport::new(session.document(), now);
        let body = export.to_json()?;
        let file_name = export.file_name();
        self.deliver(&file_name, JSON_MIME, body.as_bytes())?;
        info!(file = %file_name, bytes = body.len(), "Exported project JSON");
        Ok(export)
    }

    fn deliver(&mut self, file_name: &str, mime: &str, bytes: &[u8]) -> EditorResult<()> {
        match self.sink.as_deref_mut() {
            Some(sink) => sink.download(file_name, mime, bytes),
            None => {
                debug!(file = %file_name, "No download sink, keeping result only");
                Ok(())
            }
        }
    }
}

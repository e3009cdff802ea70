//! # Tile Renderer
//!
//! Rendering surface for acrylic tile designs. Scenes become SVG, which
//! resvg rasterizes to PNG.
//!
//! ## Pipeline
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  Scene (tile-core)                          │
//! ├─────────────────────────────────────────────┤
//! │  svg: outline, background, elements,        │
//! │       selection frame                       │
//! ├─────────────────────────────────────────────┤
//! │  surface: usvg → resvg → tiny-skia → PNG    │
//! ├─────────────────────────────────────────────┤
//! │  download: files on disk                    │
//! └─────────────────────────────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod download;
pub mod error;
pub mod measure;
pub mod surface;
pub mod svg;

pub use download::FsDownloadSink;
pub use error::{RenderError, RenderResult};
pub use measure::{natural_size, natural_size_patch};
pub use surface::{SurfaceConfig, SvgSurface};
pub use svg::{scene_to_svg, SvgStyle, ViewBox};

/// Tile renderer version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

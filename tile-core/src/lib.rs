//! # Tile Core
//!
//! Editor logic for acrylic tile designs. Compiles to WASM so the same
//! reducer runs in the browser and in native tooling.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │               tile-core.wasm                │
//! ├─────────────────────────────────────────────┤
//! │  Document        │  Gesture Controller      │
//! │  - Template      │  - Wheel / pinch zoom    │
//! │  - Elements      │  - Pan, drag, transform  │
//! │  - Variants      │  - Container fit         │
//! ├─────────────────────────────────────────────┤
//! │  Reducer         │  Variant Resolver        │
//! │  - Actions       │  - Text substitution     │
//! │  - Variant GC    │  - Positional overrides  │
//! ├─────────────────────────────────────────────┤
//! │  Export: RenderSurface → PNG, JSON project  │
//! └─────────────────────────────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod action;
pub mod catalog;
pub mod document;
pub mod element;
pub mod error;
pub mod event;
pub mod export;
pub mod gesture;
pub mod payload;
pub mod reducer;
pub mod resolve;
pub mod scene;
pub mod session;
pub mod template;
pub mod units;
pub mod variant;
pub mod viewport;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use action::{Action, MoveDirection};
pub use catalog::{BackgroundCatalog, BackgroundOption, TileSize};
pub use document::EditorDocument;
pub use element::{
    EditorElement, ElementId, ElementKind, ElementPatch, FontStyle, ImageProperties,
    PositionalPatch, PropertiesPatch, SvgProperties, TextAlign, TextProperties,
};
pub use error::{EditorError, EditorResult};
pub use event::{
    GesturePhase, HitTarget, InputEvent, LiveTransform, TouchEvent, TouchPhase, TouchPoint,
};
pub use export::{DownloadSink, ExportOptions, ExportedImage, Exporter, RenderSurface};
pub use gesture::{GestureConfig, GestureController, Preview, TouchPanMode};
pub use payload::{DesignJson, DesignStats, ProjectExport, SavedDesign, SizeLevel};
pub use reducer::reduce;
pub use resolve::effective_elements;
pub use scene::{Region, Scene};
pub use session::EditorSession;
pub use template::{Orientation, Template, TemplatePatch, TemplateSpec};
pub use variant::{DynamicVariant, VariantPatch};
pub use viewport::{CanvasViewport, ScaleBounds};

/// Tile core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

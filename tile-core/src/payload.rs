//! Outbound payloads: saved designs, JSON project exports and size stats.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::action::Action;
use crate::document::EditorDocument;
use crate::element::{EditorElement, ElementKind};
use crate::error::EditorResult;
use crate::export::sanitize_label;
use crate::template::Template;
use crate::variant::DynamicVariant;

/// Format version written into project exports.
pub const EXPORT_FORMAT_VERSION: &str = "1.0.0";

/// Largest serialized design the host store accepts, in UTF-16 code units.
pub const PERSISTED_SIZE_LIMIT: usize = 1_999_990;

/// The persisted part of a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignJson {
    /// Physical target.
    pub template: Template,
    /// Elements, bottom to top.
    pub elements: Vec<EditorElement>,
    /// Variants.
    #[serde(default)]
    pub dynamic_variants: Vec<DynamicVariant>,
    /// Active variant at save time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_variant_id: Option<String>,
}

impl DesignJson {
    /// Snapshot the persisted fields of a document.
    #[must_use]
    pub fn from_document(document: &EditorDocument) -> Self {
        Self {
            template: document.template.clone(),
            elements: document.elements.clone(),
            dynamic_variants: document.dynamic_variants.clone(),
            active_variant_id: document.active_variant_id.clone(),
        }
    }

    /// Action that loads this design into an editor.
    #[must_use]
    pub fn into_load_action(self) -> Action {
        Action::LoadProject {
            template: self.template,
            elements: self.elements,
            dynamic_variants: self.dynamic_variants,
            active_variant_id: self.active_variant_id,
        }
    }
}

/// Payload handed to the host's save callback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedDesign {
    /// Design title, taken from the template name.
    pub title: String,
    /// The design itself.
    pub design_json: DesignJson,
}

impl SavedDesign {
    /// Build the save payload for a document.
    #[must_use]
    pub fn from_document(document: &EditorDocument) -> Self {
        Self {
            title: document.template.name.clone(),
            design_json: DesignJson::from_document(document),
        }
    }
}

/// A downloadable JSON project file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectExport {
    /// The design, verbatim.
    #[serde(flatten)]
    pub design: DesignJson,
    /// When the file was produced.
    pub export_date: DateTime<Utc>,
    /// File format version.
    pub version: String,
}

impl ProjectExport {
    /// Export a document as of `now`.
    #[must_use]
    pub fn new(document: &EditorDocument, now: DateTime<Utc>) -> Self {
        Self {
            design: DesignJson::from_document(document),
            export_date: now,
            version: EXPORT_FORMAT_VERSION.to_string(),
        }
    }

    /// Download name: `<project name>-<unix millis>.json`, with the name
    /// sanitized like variant labels.
    #[must_use]
    pub fn file_name(&self) -> String {
        let name = self.design.template.name.trim();
        let name = if name.is_empty() {
            "project".to_string()
        } else {
            sanitize_label(name)
        };
        format!("{name}-{}.json", self.export_date.timestamp_millis())
    }

    /// Pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> EditorResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// How close a design is to the persisted size limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeLevel {
    /// Under 60%.
    Low,
    /// 60% to 80%.
    Medium,
    /// 80% to 100%.
    High,
    /// At or over the limit.
    Critical,
}

impl SizeLevel {
    /// Level for a usage percentage.
    #[must_use]
    pub fn from_percent(percent: f64) -> Self {
        if percent >= 100.0 {
            Self::Critical
        } else if percent >= 80.0 {
            Self::High
        } else if percent >= 60.0 {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

/// Payload size of one embedded image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageStat {
    /// Image alternative text.
    pub name: String,
    /// Length of the image source.
    pub size: usize,
}

/// Serialized size of a design against the host's limit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignStats {
    /// Serialized length in UTF-16 code units.
    pub size_chars: usize,
    /// Share of the limit used, in percent.
    pub usage_percent: f64,
    /// Warning level.
    pub level: SizeLevel,
    /// Per-image payload sizes.
    pub images: Vec<ImageStat>,
}

impl DesignStats {
    /// Measure a document's persisted form.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    #[allow(clippy::cast_precision_loss)]
    pub fn measure(document: &EditorDocument) -> EditorResult<Self> {
        let json = serde_json::to_string(&DesignJson::from_document(document))?;
        let size_chars = json.encode_utf16().count();
        let usage_percent = size_chars as f64 / PERSISTED_SIZE_LIMIT as f64 * 100.0;
        let images = document
            .elements
            .iter()
            .filter_map(|el| match &el.kind {
                ElementKind::Image(props) => Some(ImageStat {
                    name: props.alt.clone(),
                    size: props.src.encode_utf16().count(),
                }),
                _ => None,
            })
            .collect();
        Ok(Self {
            size_chars,
            usage_percent,
            level: SizeLevel::from_percent(usage_percent),
            images,
        })
    }

    /// Whether the design is too large to persist.
    #[must_use]
    pub fn is_over_limit(&self) -> bool {
        self.size_chars > PERSISTED_SIZE_LIMIT
    }

    /// Size in mebibytes, assuming one byte per code unit.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn size_mb(&self) -> f64 {
        self.size_chars as f64 / 1024.0 / 1024.0
    }
}

//! Product catalog: tile sizes, background finishes, prices and fonts.

use serde::{Deserialize, Serialize};

use crate::template::{Orientation, Template, TemplatePatch};
use crate::units::{cm_to_pixels, DEFAULT_DPI};

/// Background id meaning "no background layer".
pub const TRANSPARENT_BACKGROUND: &str = "transparent";

/// Corner radius of the physical tile, in design pixels.
pub const CORNER_RADIUS: f32 = 42.0;

/// A tile size offered in the shop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TileSize {
    /// Preset id, e.g. `14x21`.
    pub id: String,
    /// Display label.
    pub label: String,
    /// Short side in centimetres.
    pub width_cm: f32,
    /// Long side in centimetres.
    pub height_cm: f32,
    /// Base price in złoty.
    pub price: f64,
}

impl TileSize {
    fn preset(width_cm: f32, height_cm: f32, price: f64) -> Self {
        Self {
            id: format!("{width_cm}x{height_cm}"),
            label: format!("{width_cm} × {height_cm} cm"),
            width_cm,
            height_cm,
            price,
        }
    }

    /// Pixel size at the default DPI, in the preset's own orientation.
    #[must_use]
    pub fn pixels(&self) -> (u32, u32) {
        (
            cm_to_pixels(self.width_cm, DEFAULT_DPI),
            cm_to_pixels(self.height_cm, DEFAULT_DPI),
        )
    }

    /// Template patch selecting this size while keeping `orientation`.
    #[must_use]
    pub fn patch_for(&self, orientation: Orientation) -> TemplatePatch {
        let (w, h) = self.pixels();
        match orientation {
            Orientation::Vertical => TemplatePatch::size(w, h),
            Orientation::Horizontal => TemplatePatch::size(h, w),
        }
    }
}

/// Tile sizes available in the editor.
#[must_use]
pub fn default_tile_sizes() -> Vec<TileSize> {
    vec![
        TileSize::preset(14.0, 21.0, 20.0),
        TileSize::preset(15.0, 15.0, 25.0),
        TileSize::preset(16.0, 26.0, 30.0),
    ]
}

/// Find the preset matching a template's pixel size in either orientation.
#[must_use]
pub fn match_size_preset<'a>(sizes: &'a [TileSize], template: &Template) -> Option<&'a TileSize> {
    let actual = (template.width, template.height);
    sizes.iter().find(|size| {
        let (w, h) = size.pixels();
        actual == (w, h) || actual == (h, w)
    })
}

/// A background finish.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackgroundOption {
    /// Option id stored in `Template::background_image`.
    pub id: String,
    /// Display label.
    pub label: String,
    /// Image source, `None` for no background layer.
    pub src: Option<String>,
    /// Price surcharge in złoty. May be negative.
    pub price_modifier: f64,
}

/// The background finishes a design may reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackgroundCatalog {
    options: Vec<BackgroundOption>,
}

impl BackgroundCatalog {
    /// Catalog with the given options.
    #[must_use]
    pub fn new(options: Vec<BackgroundOption>) -> Self {
        Self { options }
    }

    /// All options in display order.
    #[must_use]
    pub fn options(&self) -> &[BackgroundOption] {
        &self.options
    }

    /// Look up an option by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&BackgroundOption> {
        self.options.iter().find(|opt| opt.id == id)
    }

    /// The option a template uses; a missing id means transparent.
    #[must_use]
    pub fn selected(&self, template: &Template) -> Option<&BackgroundOption> {
        self.get(
            template
                .background_image
                .as_deref()
                .unwrap_or(TRANSPARENT_BACKGROUND),
        )
    }

    /// Image source for a template's background, if it has one.
    #[must_use]
    pub fn resolve(&self, template: &Template) -> Option<&str> {
        let id = template.background_image.as_deref()?;
        self.get(id)?.src.as_deref()
    }

    /// Replace an option's image source, e.g. with a host asset URL.
    pub fn set_source(&mut self, id: &str, src: Option<String>) {
        if let Some(opt) = self.options.iter_mut().find(|opt| opt.id == id) {
            opt.src = src;
        }
    }
}

impl Default for BackgroundCatalog {
    fn default() -> Self {
        Self::new(vec![
            BackgroundOption {
                id: TRANSPARENT_BACKGROUND.to_string(),
                label: "Transparent".to_string(),
                src: None,
                price_modifier: 0.0,
            },
            BackgroundOption {
                id: "mirror-gold".to_string(),
                label: "Gold mirror".to_string(),
                src: Some("backgrounds/mirror-gold.png".to_string()),
                price_modifier: 2.0,
            },
            BackgroundOption {
                id: "mirror-silver".to_string(),
                label: "Silver mirror".to_string(),
                src: Some("backgrounds/mirror-silver.jpg".to_string()),
                price_modifier: 1.0,
            },
        ])
    }
}

/// Size price plus background surcharge. No size means no price.
#[must_use]
pub fn calculate_tile_price(size: Option<&TileSize>, background: Option<&BackgroundOption>) -> f64 {
    let Some(size) = size else {
        return 0.0;
    };
    size.price + background.map_or(0.0, |bg| bg.price_modifier)
}

/// Price of a template with the default catalog.
#[must_use]
pub fn template_price(template: &Template, backgrounds: &BackgroundCatalog) -> f64 {
    let sizes = default_tile_sizes();
    calculate_tile_price(
        match_size_preset(&sizes, template),
        backgrounds.selected(template),
    )
}

/// Format a price in złoty, e.g. `22.00 zł`.
#[must_use]
pub fn format_price(price: f64) -> String {
    format!("{price:.2} zł")
}

/// Font families offered for text elements.
pub const AVAILABLE_FONTS: &[&str] = &[
    "Inter",
    "Roboto",
    "Lato",
    "Montserrat",
    "Poppins",
    "Open Sans",
    "Playfair Display",
    "Raleway",
    "PT Serif",
    "Merriweather",
    "Nunito",
    "Source Sans Pro",
    "Oswald",
    "Ubuntu",
    "Work Sans",
    "Fira Sans",
    "Dancing Script",
    "Pacifico",
    "Lobster",
    "Rubik",
    "Quicksand",
    "Bebas Neue",
    "Archivo",
    "Cinzel",
    "Inconsolata",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_ids() {
        let ids: Vec<String> = default_tile_sizes().into_iter().map(|s| s.id).collect();
        assert_eq!(ids, vec!["14x21", "15x15", "16x26"]);
    }

    #[test]
    fn test_match_either_orientation() {
        let sizes = default_tile_sizes();
        let vertical = Template::new("t", "n", 1654, 2480);
        let horizontal = Template::new("t", "n", 2480, 1654);
        assert_eq!(
            match_size_preset(&sizes, &vertical).map(|s| s.id.as_str()),
            Some("14x21")
        );
        assert_eq!(
            match_size_preset(&sizes, &horizontal).map(|s| s.id.as_str()),
            Some("14x21")
        );
        assert!(match_size_preset(&sizes, &Template::new("t", "n", 10, 10)).is_none());
    }

    #[test]
    fn test_patch_for_respects_orientation() {
        let size = &default_tile_sizes()[2];
        let patch = size.patch_for(Orientation::Horizontal);
        assert_eq!(patch.width, Some(cm_to_pixels(26.0, DEFAULT_DPI)));
        assert_eq!(patch.height, Some(cm_to_pixels(16.0, DEFAULT_DPI)));
    }

    #[test]
    fn test_price_with_background() {
        let catalog = BackgroundCatalog::default();
        let mut template = Template::new("t", "n", 1654, 2480);
        template.background_image = Some("mirror-gold".to_string());
        let price = template_price(&template, &catalog);
        assert!((price - 22.0).abs() < f64::EPSILON);
        assert_eq!(format_price(price), "22.00 zł");
    }

    #[test]
    fn test_no_size_no_price() {
        assert!(calculate_tile_price(None, None).abs() < f64::EPSILON);
    }

    #[test]
    fn test_resolve_background() {
        let catalog = BackgroundCatalog::default();
        let mut template = Template::new("t", "n", 10, 10);
        assert!(catalog.resolve(&template).is_none());
        template.background_image = Some(TRANSPARENT_BACKGROUND.to_string());
        assert!(catalog.resolve(&template).is_none());
        template.background_image = Some("mirror-silver".to_string());
        assert_eq!(
            catalog.resolve(&template),
            Some("backgrounds/mirror-silver.jpg")
        );
        template.background_image = Some("unknown".to_string());
        assert!(catalog.resolve(&template).is_none());
    }

    #[test]
    fn test_fonts_include_default() {
        assert!(AVAILABLE_FONTS.contains(&"Inter"));
        assert_eq!(AVAILABLE_FONTS.len(), 25);
    }
}

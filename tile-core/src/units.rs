//! Conversion between physical lengths and raster pixels.
//!
//! Tiles are specified in centimetres and rendered at a fixed print DPI.

/// Print resolution used when none is given.
pub const DEFAULT_DPI: u32 = 300;

/// Centimetres per inch.
const CM_PER_INCH: f32 = 2.54;

/// Convert centimetres to whole pixels at the given DPI.
///
/// ```
/// use tile_core::units::{cm_to_pixels, DEFAULT_DPI};
///
/// assert_eq!(cm_to_pixels(2.54, DEFAULT_DPI), 300);
/// assert_eq!(cm_to_pixels(15.0, DEFAULT_DPI), 1772);
/// ```
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn cm_to_pixels(cm: f32, dpi: u32) -> u32 {
    let px = (cm * dpi as f32 / CM_PER_INCH).round();
    px.max(0.0) as u32
}

/// Convert pixels back to centimetres at the given DPI.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn pixels_to_cm(px: u32, dpi: u32) -> f32 {
    if dpi == 0 {
        return 0.0;
    }
    px as f32 * CM_PER_INCH / dpi as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cm_to_pixels_rounds() {
        // 14 * 300 / 2.54 = 1653.54
        assert_eq!(cm_to_pixels(14.0, DEFAULT_DPI), 1654);
        assert_eq!(cm_to_pixels(21.0, DEFAULT_DPI), 2480);
        assert_eq!(cm_to_pixels(0.0, DEFAULT_DPI), 0);
    }

    #[test]
    fn test_negative_length_clamps_to_zero() {
        assert_eq!(cm_to_pixels(-3.0, DEFAULT_DPI), 0);
    }

    #[test]
    fn test_pixels_to_cm_inverts_within_rounding() {
        for cm in [14.0_f32, 15.0, 16.0, 21.0, 26.0] {
            let back = pixels_to_cm(cm_to_pixels(cm, DEFAULT_DPI), DEFAULT_DPI);
            assert!((back - cm).abs() < 0.01, "{cm} -> {back}");
        }
    }

    #[test]
    fn test_zero_dpi_is_harmless() {
        assert!(pixels_to_cm(100, 0).abs() < f32::EPSILON);
    }
}

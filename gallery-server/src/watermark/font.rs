//! Banner font loading
//!
//! The banner text is optional: previews still render (with a warning) when
//! no usable font is found, so a bare container image does not block ingest.

use ab_glyph::FontArc;
use std::path::Path;

/// Well-known font locations probed when WATERMARK_FONT_PATH is unset
const FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/System/Library/Fonts/Helvetica.ttc",
];

/// Load the banner font from `configured` or from standard system locations
pub fn load_font(configured: Option<&str>) -> Option<FontArc> {
    if let Some(path) = configured {
        match try_load(Path::new(path)) {
            Some(font) => return Some(font),
            None => {
                tracing::warn!("Configured watermark font {} could not be loaded", path);
            }
        }
    }

    for candidate in FONT_CANDIDATES {
        if let Some(font) = try_load(Path::new(candidate)) {
            tracing::debug!("Watermark font loaded from {}", candidate);
            return Some(font);
        }
    }

    tracing::warn!("No watermark font found; previews will carry a blank banner");
    None
}

fn try_load(path: &Path) -> Option<FontArc> {
    let bytes = std::fs::read(path).ok()?;
    FontArc::try_from_vec(bytes).ok()
}

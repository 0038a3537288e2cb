//! Watermark Module
//!
//! Turns clean originals into watermarked storefront previews. Previews are
//! the only image bytes ever served before purchase.

mod compositor;
mod font;

pub use compositor::{
    BannerRect, JPEG_QUALITY, PREVIEW_MAX_HEIGHT, PREVIEW_MAX_WIDTH, WatermarkCompositor,
    WatermarkError, WatermarkLayout, fit_dimensions,
};
pub use font::load_font;

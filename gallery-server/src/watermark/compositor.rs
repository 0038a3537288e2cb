use ab_glyph::{Font, FontArc, PxScale, ScaleFont, point};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ExtendedColorType, ImageEncoder, RgbImage};
use shared::{AppError, ErrorCode};
use thiserror::Error;

/// Preview bounding box; originals are scaled to fit inside, never upscaled
pub const PREVIEW_MAX_WIDTH: u32 = 1200;
pub const PREVIEW_MAX_HEIGHT: u32 = 800;

/// JPEG quality for encoded previews
pub const JPEG_QUALITY: u8 = 80;

/// Fixed second text line on banner previews
const BANNER_SUBTITLE: &str = "PREVIEW ONLY";

/// Banner proportions relative to the resized preview
const BANNER_WIDTH_RATIO: f32 = 0.95;
const BANNER_HEIGHT_RATIO: f32 = 0.12;
const BANNER_TOP_RATIO: f32 = 0.60;
const BANNER_MIN_HEIGHT: u32 = 24;

/// Watermark errors
#[derive(Debug, Error)]
pub enum WatermarkError {
    #[error("overlay {overlay_w}x{overlay_h} does not fit inside image {image_w}x{image_h}")]
    OverlayTooLarge {
        overlay_w: u32,
        overlay_h: u32,
        image_w: u32,
        image_h: u32,
    },

    #[error("preview encoding failed: {0}")]
    Encode(String),
}

impl From<WatermarkError> for AppError {
    fn from(err: WatermarkError) -> Self {
        match &err {
            WatermarkError::OverlayTooLarge {
                overlay_w,
                overlay_h,
                image_w,
                image_h,
            } => AppError::new(ErrorCode::WatermarkTooLarge)
                .with_detail("overlay", format!("{overlay_w}x{overlay_h}"))
                .with_detail("image", format!("{image_w}x{image_h}")),
            WatermarkError::Encode(msg) => AppError::image_processing(msg.clone()),
        }
    }
}

/// How the watermark is laid over the preview
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WatermarkLayout {
    /// Single horizontal banner across the lower third
    #[default]
    Banner,
    /// Diagonal text repeated across the whole frame
    Tiled,
}

/// Banner placement inside a preview, in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BannerRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Scale `(width, height)` to fit inside the preview box, preserving aspect
/// ratio. Images already inside the box keep their dimensions.
pub fn fit_dimensions(width: u32, height: u32) -> (u32, u32) {
    if width <= PREVIEW_MAX_WIDTH && height <= PREVIEW_MAX_HEIGHT {
        return (width, height);
    }
    let scale = f64::min(
        PREVIEW_MAX_WIDTH as f64 / width as f64,
        PREVIEW_MAX_HEIGHT as f64 / height as f64,
    );
    let w = ((width as f64 * scale).round() as u32).max(1);
    let h = ((height as f64 * scale).round() as u32).max(1);
    (w, h)
}

/// Renders watermarked previews from decoded originals
///
/// Rendering is pure: the same input bytes, label and layout always produce
/// byte-identical JPEG output.
pub struct WatermarkCompositor {
    label: String,
    layout: WatermarkLayout,
    font: Option<FontArc>,
}

impl WatermarkCompositor {
    pub fn new(label: impl Into<String>, layout: WatermarkLayout, font: Option<FontArc>) -> Self {
        Self {
            label: label.into(),
            layout,
            font,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Compute banner placement for a preview of the given size
    ///
    /// Fails when the banner cannot fit strictly inside the image, which
    /// happens for very short inputs (the banner keeps a minimum height).
    pub fn banner_geometry(width: u32, height: u32) -> Result<BannerRect, WatermarkError> {
        let banner_w = ((width as f32 * BANNER_WIDTH_RATIO) as u32).max(1);
        let banner_h = ((height as f32 * BANNER_HEIGHT_RATIO) as u32).max(BANNER_MIN_HEIGHT);
        let y = (height as f32 * BANNER_TOP_RATIO) as u32;

        if banner_w >= width || y + banner_h > height {
            return Err(WatermarkError::OverlayTooLarge {
                overlay_w: banner_w,
                overlay_h: banner_h,
                image_w: width,
                image_h: height,
            });
        }

        Ok(BannerRect {
            x: (width - banner_w) / 2,
            y,
            width: banner_w,
            height: banner_h,
        })
    }

    /// Produce the watermarked preview JPEG for a decoded original
    pub fn render_preview(&self, original: &DynamicImage) -> Result<Vec<u8>, WatermarkError> {
        let (target_w, target_h) = fit_dimensions(original.width(), original.height());
        let mut preview: RgbImage =
            if (target_w, target_h) == (original.width(), original.height()) {
                original.to_rgb8()
            } else {
                original
                    .resize_exact(target_w, target_h, FilterType::Lanczos3)
                    .to_rgb8()
            };

        match self.layout {
            WatermarkLayout::Banner => self.draw_banner(&mut preview)?,
            WatermarkLayout::Tiled => self.draw_tiled(&mut preview)?,
        }

        let mut out = Vec::new();
        let encoder = JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY);
        encoder
            .write_image(
                preview.as_raw(),
                preview.width(),
                preview.height(),
                ExtendedColorType::Rgb8,
            )
            .map_err(|e| WatermarkError::Encode(e.to_string()))?;
        Ok(out)
    }

    fn draw_banner(&self, preview: &mut RgbImage) -> Result<(), WatermarkError> {
        let rect = Self::banner_geometry(preview.width(), preview.height())?;

        // Darken the banner area
        for y in rect.y..rect.y + rect.height {
            for x in rect.x..rect.x + rect.width {
                let px = preview.get_pixel_mut(x, y);
                for c in px.0.iter_mut() {
                    *c = (*c as f32 * 0.40) as u8;
                }
            }
        }

        let Some(font) = &self.font else {
            tracing::warn!("Rendering banner without text, no font available");
            return Ok(());
        };

        let center_x = rect.x as f32 + rect.width as f32 / 2.0;
        let label_scale = PxScale::from(rect.height as f32 * 0.45);
        let subtitle_scale = PxScale::from(rect.height as f32 * 0.26);

        draw_text_centered(
            preview,
            font,
            &self.label,
            label_scale,
            center_x,
            rect.y as f32 + rect.height as f32 * 0.48,
            0.92,
        );
        draw_text_centered(
            preview,
            font,
            BANNER_SUBTITLE,
            subtitle_scale,
            center_x,
            rect.y as f32 + rect.height as f32 * 0.86,
            0.80,
        );

        Ok(())
    }

    fn draw_tiled(&self, preview: &mut RgbImage) -> Result<(), WatermarkError> {
        let (width, height) = preview.dimensions();
        let Some(font) = &self.font else {
            tracing::warn!("Rendering tiled watermark without text, no font available");
            return Ok(());
        };

        let scale = PxScale::from((width.min(height) as f32 * 0.06).max(14.0));
        let tile = rasterize_line(font, &self.label, scale);
        if tile.width >= width || tile.height >= height {
            return Err(WatermarkError::OverlayTooLarge {
                overlay_w: tile.width,
                overlay_h: tile.height,
                image_w: width,
                image_h: height,
            });
        }

        // 45 degree rotation constants
        let cos = std::f32::consts::FRAC_1_SQRT_2;
        let sin = std::f32::consts::FRAC_1_SQRT_2;

        let step_x = (tile.width as i64 + tile.width as i64 / 2).max(1);
        let step_y = (tile.height as i64 * 5).max(1);
        let mut row = 0i64;
        let mut cy = -(tile.height as i64);
        while cy < height as i64 + tile.width as i64 {
            // Offset odd rows by half a step for a brick pattern
            let offset = if row % 2 == 0 { 0 } else { step_x / 2 };
            let mut cx = -(tile.width as i64) + offset;
            while cx < width as i64 + tile.width as i64 {
                blit_rotated(preview, &tile, cx as f32, cy as f32, cos, sin, 0.30);
                cx += step_x;
            }
            cy += step_y;
            row += 1;
        }

        Ok(())
    }
}

/// A rasterized line of text: coverage values, row-major
struct TextTile {
    width: u32,
    height: u32,
    coverage: Vec<f32>,
}

fn line_width(font: &FontArc, text: &str, scale: PxScale) -> f32 {
    let scaled = font.as_scaled(scale);
    let mut width = 0.0;
    let mut prev = None;
    for ch in text.chars() {
        let id = scaled.glyph_id(ch);
        if let Some(p) = prev {
            width += scaled.kern(p, id);
        }
        width += scaled.h_advance(id);
        prev = Some(id);
    }
    width
}

fn rasterize_line(font: &FontArc, text: &str, scale: PxScale) -> TextTile {
    let scaled = font.as_scaled(scale);
    let width = line_width(font, text, scale).ceil().max(1.0) as u32;
    let height = (scaled.ascent() - scaled.descent()).ceil().max(1.0) as u32;
    let mut coverage = vec![0.0f32; (width * height) as usize];

    let mut caret = 0.0f32;
    let baseline = scaled.ascent();
    let mut prev = None;
    for ch in text.chars() {
        let id = scaled.glyph_id(ch);
        if let Some(p) = prev {
            caret += scaled.kern(p, id);
        }
        let glyph = id.with_scale_and_position(scale, point(caret, baseline));
        if let Some(outlined) = font.outline_glyph(glyph) {
            let bounds = outlined.px_bounds();
            outlined.draw(|gx, gy, c| {
                let x = bounds.min.x as i64 + gx as i64;
                let y = bounds.min.y as i64 + gy as i64;
                if x >= 0 && y >= 0 && (x as u32) < width && (y as u32) < height {
                    let idx = (y as u32 * width + x as u32) as usize;
                    coverage[idx] = coverage[idx].max(c);
                }
            });
        }
        caret += scaled.h_advance(id);
        prev = Some(id);
    }

    TextTile {
        width,
        height,
        coverage,
    }
}

/// Blend white text onto the image, centered horizontally on `center_x`
fn draw_text_centered(
    img: &mut RgbImage,
    font: &FontArc,
    text: &str,
    scale: PxScale,
    center_x: f32,
    baseline_y: f32,
    alpha: f32,
) {
    let scaled = font.as_scaled(scale);
    let total = line_width(font, text, scale);
    let mut caret = center_x - total / 2.0;

    let mut prev = None;
    for ch in text.chars() {
        let id = scaled.glyph_id(ch);
        if let Some(p) = prev {
            caret += scaled.kern(p, id);
        }
        let glyph = id.with_scale_and_position(scale, point(caret, baseline_y));
        if let Some(outlined) = font.outline_glyph(glyph) {
            let bounds = outlined.px_bounds();
            outlined.draw(|gx, gy, c| {
                let x = bounds.min.x as i64 + gx as i64;
                let y = bounds.min.y as i64 + gy as i64;
                if x >= 0 && y >= 0 && (x as u32) < img.width() && (y as u32) < img.height() {
                    blend_white(img, x as u32, y as u32, c * alpha);
                }
            });
        }
        caret += scaled.h_advance(id);
        prev = Some(id);
    }
}

/// Blit a rasterized tile rotated around its center onto the image
fn blit_rotated(
    img: &mut RgbImage,
    tile: &TextTile,
    origin_x: f32,
    origin_y: f32,
    cos: f32,
    sin: f32,
    alpha: f32,
) {
    let half_w = tile.width as f32 / 2.0;
    let half_h = tile.height as f32 / 2.0;
    for ty in 0..tile.height {
        for tx in 0..tile.width {
            let c = tile.coverage[(ty * tile.width + tx) as usize];
            if c <= 0.01 {
                continue;
            }
            let rx = tx as f32 - half_w;
            let ry = ty as f32 - half_h;
            // Rotate counter-clockwise so the text climbs left to right
            let dx = origin_x + rx * cos + ry * sin;
            let dy = origin_y - rx * sin + ry * cos;
            if dx >= 0.0 && dy >= 0.0 && (dx as u32) < img.width() && (dy as u32) < img.height() {
                blend_white(img, dx as u32, dy as u32, c * alpha);
            }
        }
    }
}

fn blend_white(img: &mut RgbImage, x: u32, y: u32, alpha: f32) {
    let alpha = alpha.clamp(0.0, 1.0);
    let px = img.get_pixel_mut(x, y);
    for c in px.0.iter_mut() {
        *c = (*c as f32 * (1.0 - alpha) + 255.0 * alpha) as u8;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn solid_image(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([120, 130, 140])))
    }

    #[test]
    fn test_fit_shrinks_oversized() {
        assert_eq!(fit_dimensions(1600, 1200), (1067, 800));
        assert_eq!(fit_dimensions(2400, 1600), (1200, 800));
        assert_eq!(fit_dimensions(1200, 1600), (600, 800));
    }

    #[test]
    fn test_fit_never_upscales() {
        assert_eq!(fit_dimensions(640, 480), (640, 480));
        assert_eq!(fit_dimensions(1200, 800), (1200, 800));
    }

    #[test]
    fn test_fit_preserves_aspect_ratio() {
        let (w, h) = fit_dimensions(3000, 2000);
        let original = 3000.0 / 2000.0;
        let fitted = w as f64 / h as f64;
        assert!((original - fitted).abs() < 0.01);
    }

    #[test]
    fn test_banner_geometry_centered() {
        let rect = WatermarkCompositor::banner_geometry(1200, 800).unwrap();
        assert_eq!(rect.width, 1140);
        assert_eq!(rect.height, 96);
        assert_eq!(rect.y, 480);
        assert_eq!(rect.x, 30);
        assert!(rect.x + rect.width <= 1200);
        assert!(rect.y + rect.height <= 800);
    }

    #[test]
    fn test_banner_rejects_tiny_image() {
        let err = WatermarkCompositor::banner_geometry(40, 40).unwrap_err();
        assert!(matches!(err, WatermarkError::OverlayTooLarge { .. }));
    }

    #[test]
    fn test_render_without_font_still_produces_jpeg() {
        let compositor = WatermarkCompositor::new("GALLERY", WatermarkLayout::Banner, None);
        let bytes = compositor.render_preview(&solid_image(640, 480)).unwrap();
        // JPEG SOI marker
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (640, 480));
    }

    #[test]
    fn test_render_resizes_oversized_input() {
        let compositor = WatermarkCompositor::new("GALLERY", WatermarkLayout::Banner, None);
        let bytes = compositor.render_preview(&solid_image(1600, 1200)).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (1067, 800));
    }

    #[test]
    fn test_render_tiny_image_fails() {
        let compositor = WatermarkCompositor::new("GALLERY", WatermarkLayout::Banner, None);
        let err = compositor.render_preview(&solid_image(30, 30)).unwrap_err();
        assert!(matches!(err, WatermarkError::OverlayTooLarge { .. }));
    }

    #[test]
    fn test_render_is_deterministic() {
        let compositor = WatermarkCompositor::new("GALLERY", WatermarkLayout::Banner, None);
        let image = solid_image(800, 600);
        let first = compositor.render_preview(&image).unwrap();
        let second = compositor.render_preview(&image).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_banner_darkens_band_only() {
        let compositor = WatermarkCompositor::new("GALLERY", WatermarkLayout::Banner, None);
        let bytes = compositor.render_preview(&solid_image(640, 480)).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap().to_rgb8();
        let rect = WatermarkCompositor::banner_geometry(640, 480).unwrap();

        let inside = decoded.get_pixel(rect.x + rect.width / 2, rect.y + rect.height / 2);
        let outside = decoded.get_pixel(rect.x + rect.width / 2, rect.y.saturating_sub(20));
        assert!(inside.0[0] < outside.0[0]);
    }
}

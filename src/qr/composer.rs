//! QR code rendering with an optional centered logo.
//!
//! Codes are always encoded at error-correction level H so that a logo covering
//! the middle of the matrix stays within the recoverable damage budget.

use std::io::Cursor;
use std::path::Path;

use base64::{engine::general_purpose, Engine as _};
use image::imageops::{self, FilterType};
use image::{ImageFormat, Rgb, RgbImage, RgbaImage};
use log::{debug, warn};
use qrcode::{Color, EcLevel, QrCode};
use thiserror::Error;

const DARK: Rgb<u8> = Rgb([0, 0, 0]);
const LIGHT: Rgb<u8> = Rgb([255, 255, 255]);

#[derive(Debug, Error)]
pub enum QrError {
    #[error("QR payload cannot be empty")]
    EmptyPayload,
    #[error("QR encode error: {0}")]
    Encode(#[from] qrcode::types::QrError),
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QrSettings {
    /// Pixel side of one module.
    pub box_size: u32,
    /// Quiet zone width in modules.
    pub border: u32,
    /// Logo's longest side as a fraction of the image width.
    pub logo_ratio: f32,
    /// Backing pad side as a multiple of the logo side.
    pub padding_ratio: f32,
    pub pad_color: Rgb<u8>,
}

impl Default for QrSettings {
    fn default() -> Self {
        Self {
            box_size: 10,
            border: 4,
            logo_ratio: 0.2,
            padding_ratio: 1.2,
            pad_color: LIGHT,
        }
    }
}

pub struct QrComposer {
    settings: QrSettings,
    logo: Option<RgbaImage>,
}

impl QrComposer {
    pub fn new(settings: QrSettings, logo: Option<RgbaImage>) -> Self {
        Self { settings, logo }
    }

    pub fn has_logo(&self) -> bool {
        self.logo.is_some()
    }

    /// Encode `payload` and stamp the logo, if any, over a centered pad.
    pub fn compose(&self, payload: &str) -> Result<RgbImage, QrError> {
        if payload.is_empty() {
            return Err(QrError::EmptyPayload);
        }

        let code = QrCode::with_error_correction_level(payload.as_bytes(), EcLevel::H)?;
        let mut img = self.render(&code);

        if let Some(logo) = &self.logo {
            self.stamp_logo(&mut img, logo);
        }

        Ok(img)
    }

    /// Compose straight to PNG bytes.
    pub fn compose_png(&self, payload: &str) -> Result<Vec<u8>, QrError> {
        let img = self.compose(payload)?;
        to_png(&img)
    }

    fn render(&self, code: &QrCode) -> RgbImage {
        let modules = code.width() as u32;
        let box_size = self.settings.box_size;
        let border = self.settings.border;
        let side = (modules + 2 * border) * box_size;

        let mut img = RgbImage::from_pixel(side, side, LIGHT);

        for (i, color) in code.to_colors().iter().enumerate() {
            if *color != Color::Dark {
                continue;
            }
            let x = ((i as u32) % modules + border) * box_size;
            let y = ((i as u32) / modules + border) * box_size;
            for dy in 0..box_size {
                for dx in 0..box_size {
                    img.put_pixel(x + dx, y + dy, DARK);
                }
            }
        }

        img
    }

    fn stamp_logo(&self, img: &mut RgbImage, logo: &RgbaImage) {
        let (width, height) = img.dimensions();
        let target = (width as f32 * self.settings.logo_ratio) as u32;
        if target == 0 || logo.width() == 0 || logo.height() == 0 {
            warn!("Logo too small to place on a {}px QR code, skipping overlay", width);
            return;
        }

        let (logo_w, logo_h) = fit_within(logo.width(), logo.height(), target);
        let resized = imageops::resize(logo, logo_w, logo_h, FilterType::Lanczos3);

        let pad = ((target as f32 * self.settings.padding_ratio) as u32).min(width.min(height));
        let pad_x = (width - pad) / 2;
        let pad_y = (height - pad) / 2;
        for y in pad_y..pad_y + pad {
            for x in pad_x..pad_x + pad {
                img.put_pixel(x, y, self.settings.pad_color);
            }
        }

        overlay(img, &resized, (width - logo_w) / 2, (height - logo_h) / 2);
        debug!("Pasted {}x{} logo on a {}px pad", logo_w, logo_h, pad);
    }
}

/// Scale `(w, h)` so the longest side equals `target`, keeping aspect ratio.
fn fit_within(w: u32, h: u32, target: u32) -> (u32, u32) {
    let (w, h, t) = (w as u64, h as u64, target as u64);
    if w >= h {
        (target, ((h * t) / w).max(1) as u32)
    } else {
        (((w * t) / h).max(1) as u32, target)
    }
}

/// Alpha-composite `top` onto `base` at `(x, y)`. Transparent pixels leave `base` as is.
fn overlay(base: &mut RgbImage, top: &RgbaImage, x: u32, y: u32) {
    for (dx, dy, pixel) in top.enumerate_pixels() {
        let target_x = x + dx;
        let target_y = y + dy;
        if target_x >= base.width() || target_y >= base.height() {
            continue;
        }
        let alpha = pixel[3] as f32 / 255.0;
        if alpha > 0.99 {
            base.put_pixel(target_x, target_y, Rgb([pixel[0], pixel[1], pixel[2]]));
        } else if alpha > 0.01 {
            let bg = *base.get_pixel(target_x, target_y);
            let inv = 1.0 - alpha;
            let blend = |c: usize| (pixel[c] as f32 * alpha + bg[c] as f32 * inv) as u8;
            base.put_pixel(target_x, target_y, Rgb([blend(0), blend(1), blend(2)]));
        }
    }
}

pub fn to_png(img: &RgbImage) -> Result<Vec<u8>, QrError> {
    let mut png_bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut png_bytes), ImageFormat::Png)?;
    Ok(png_bytes)
}

pub fn to_data_uri(png: &[u8]) -> String {
    format!("data:image/png;base64,{}", general_purpose::STANDARD.encode(png))
}

/// Read a logo for overlay. Any problem is logged and yields `None`.
pub fn load_logo(path: &Path) -> Option<RgbaImage> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) => {
            warn!(
                "Company logo not found at '{}' ({}). QR codes will be generated without a logo.",
                path.display(),
                err
            );
            return None;
        }
    };

    match infer::get(&bytes) {
        Some(kind) if kind.matcher_type() == infer::MatcherType::Image => {}
        _ => {
            warn!("'{}' is not a recognised image file, skipping logo", path.display());
            return None;
        }
    }

    match image::load_from_memory(&bytes) {
        Ok(img) => Some(img.to_rgba8()),
        Err(err) => {
            warn!("Could not decode logo '{}': {}", path.display(), err);
            None
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use image::{DynamicImage, Rgba};

    pub(crate) fn decode(img: &RgbImage) -> String {
        let gray = DynamicImage::ImageRgb8(img.clone()).to_luma8();
        let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(
            gray.width() as usize,
            gray.height() as usize,
            |x, y| gray.get_pixel(x as u32, y as u32)[0],
        );
        let grids = prepared.detect_grids();
        assert_eq!(grids.len(), 1, "expected exactly one QR grid");
        let (_, content) = grids[0].decode().expect("grid should decode");
        content
    }

    fn red_logo() -> RgbaImage {
        RgbaImage::from_pixel(64, 64, Rgba([200, 20, 20, 255]))
    }

    #[test]
    fn plain_codes_decode_to_payload() {
        let composer = QrComposer::new(QrSettings::default(), None);
        for payload in [
            "x",
            "1234567890",
            "http://localhost:8080/employee/E1",
            "https://directory.example.org/emergency_details/ops-team_42",
        ] {
            let img = composer.compose(payload).unwrap();
            assert_eq!(img.width(), img.height());
            assert_eq!(decode(&img), payload);
        }
    }

    #[test]
    fn logo_at_quarter_width_still_decodes() {
        let settings = QrSettings {
            logo_ratio: 0.25,
            ..QrSettings::default()
        };
        let composer = QrComposer::new(settings, Some(red_logo()));
        let payload = "http://localhost:8080/employee/E1";
        assert_eq!(decode(&composer.compose(payload).unwrap()), payload);
    }

    #[test]
    fn logo_sits_centered_on_pad() {
        let composer = QrComposer::new(QrSettings::default(), Some(red_logo()));
        let img = composer.compose("http://localhost:8080/employee/E1").unwrap();
        let (w, h) = img.dimensions();

        let center = img.get_pixel(w / 2, h / 2);
        assert!(center[0] > 150 && center[1] < 80, "center should be logo red, got {:?}", center);

        // Between the logo edge and the pad edge only pad color shows.
        let target = (w as f32 * 0.2) as u32;
        let pad = (target as f32 * 1.2) as u32;
        let probe_x = (w - pad) / 2 + 1;
        assert_eq!(*img.get_pixel(probe_x, h / 2), LIGHT);
    }

    #[test]
    fn transparent_logo_pixels_keep_pad() {
        let logo = RgbaImage::from_pixel(32, 32, Rgba([0, 0, 0, 0]));
        let composer = QrComposer::new(QrSettings::default(), Some(logo));
        let img = composer.compose("http://localhost:8080/employee/E1").unwrap();
        let (w, h) = img.dimensions();
        assert_eq!(*img.get_pixel(w / 2, h / 2), LIGHT);
    }

    #[test]
    fn wide_logo_keeps_aspect_ratio() {
        assert_eq!(fit_within(200, 100, 80), (80, 40));
        assert_eq!(fit_within(50, 100, 80), (40, 80));
        assert_eq!(fit_within(1000, 1, 80), (80, 1));
    }

    #[test]
    fn image_size_follows_box_and_border() {
        let composer = QrComposer::new(QrSettings::default(), None);
        let img = composer.compose("x").unwrap();
        // Version 1 is 21 modules wide.
        assert_eq!(img.width(), (21 + 2 * 4) * 10);
    }

    #[test]
    fn empty_payload_is_rejected() {
        let composer = QrComposer::new(QrSettings::default(), None);
        assert!(matches!(composer.compose(""), Err(QrError::EmptyPayload)));
    }

    #[test]
    fn oversized_payload_is_an_encode_error() {
        let composer = QrComposer::new(QrSettings::default(), None);
        let payload = "a".repeat(4000);
        assert!(matches!(composer.compose(&payload), Err(QrError::Encode(_))));
    }

    #[test]
    fn composition_is_deterministic() {
        let composer = QrComposer::new(QrSettings::default(), Some(red_logo()));
        let a = composer.compose_png("http://localhost:8080/employee/E1").unwrap();
        let b = composer.compose_png("http://localhost:8080/employee/E1").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn data_uri_wraps_png() {
        let composer = QrComposer::new(QrSettings::default(), None);
        let png = composer.compose_png("x").unwrap();
        let uri = to_data_uri(&png);
        let encoded = uri.strip_prefix("data:image/png;base64,").unwrap();
        assert_eq!(general_purpose::STANDARD.decode(encoded).unwrap(), png);
        assert_eq!(infer::get(&png).unwrap().mime_type(), "image/png");
    }

    #[test]
    fn unreadable_logos_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_logo(&dir.path().join("missing.png")).is_none());

        let text = dir.path().join("logo.png");
        std::fs::write(&text, b"definitely not an image").unwrap();
        assert!(load_logo(&text).is_none());

        // PNG magic followed by garbage: sniffed as image, fails to decode.
        let truncated = dir.path().join("broken.png");
        std::fs::write(&truncated, b"\x89PNG\r\n\x1a\n\0\0\0\rIHDRjunk").unwrap();
        assert!(load_logo(&truncated).is_none());
    }

    #[test]
    fn valid_logo_file_loads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("company_logo.png");
        let png = to_png(&RgbImage::from_pixel(8, 8, Rgb([10, 120, 200]))).unwrap();
        std::fs::write(&path, png).unwrap();

        let logo = load_logo(&path).unwrap();
        assert_eq!(logo.dimensions(), (8, 8));
    }
}

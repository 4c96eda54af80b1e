// SPDX-License-Identifier: MIT

//! Three-color gradient rendering.
//!
//! Builds a ten-step color ramp from three hex stops, renders radial and
//! conic-style JPEGs, and emits a CSS radial-gradient string. Rendered
//! images are held in a short-lived in-memory store keyed by generation id.

use crate::error::AppError;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::io::Cursor;
use std::sync::Arc;

/// Interpolation steps in the color ramp.
const RAMP_STEPS: usize = 10;
/// Rendered gradients expire after ten minutes.
const GRADIENT_TTL_SECS: i64 = 600;

pub const MIN_SIZE: u32 = 640;
pub const MAX_SIZE: u32 = 10_000;
pub const DEFAULT_SIZE: u32 = 2048;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Parse a `#rrggbb` hex color. Rejects anything else.
pub fn parse_hex(input: &str) -> Result<Color, AppError> {
    let hex = input.strip_prefix('#').unwrap_or(input);
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(AppError::BadRequest(format!(
            "Invalid hex color: {}",
            input
        )));
    }

    let parse = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&hex[range], 16)
            .map_err(|_| AppError::BadRequest(format!("Invalid hex color: {}", input)))
    };

    Ok(Color {
        r: parse(0..2)?,
        g: parse(2..4)?,
        b: parse(4..6)?,
    })
}

pub fn to_hex(color: Color) -> String {
    format!("#{:02x}{:02x}{:02x}", color.r, color.g, color.b)
}

fn lerp_channel(a: u8, b: u8, t: f64) -> u8 {
    (a as f64 + (b as f64 - a as f64) * t).round().clamp(0.0, 255.0) as u8
}

fn lerp(a: Color, b: Color, t: f64) -> Color {
    Color {
        r: lerp_channel(a.r, b.r, t),
        g: lerp_channel(a.g, b.g, t),
        b: lerp_channel(a.b, b.b, t),
    }
}

/// Ten-step ramp through three stops: first half blends c1→c2, second
/// half c2→c3. Endpoints land exactly on c1 and c3, with c2 at the seam.
pub fn interpolate_colors(c1: Color, c2: Color, c3: Color) -> Vec<Color> {
    let half = RAMP_STEPS / 2;
    let mut ramp = Vec::with_capacity(RAMP_STEPS);

    for i in 0..half {
        let t = i as f64 / (half - 1) as f64;
        ramp.push(lerp(c1, c2, t));
    }
    for i in 0..half {
        let t = i as f64 / (half - 1) as f64;
        ramp.push(lerp(c2, c3, t));
    }

    ramp
}

/// One generated gradient set: the ramp, its CSS form, and both JPEGs.
pub struct GradientSet {
    pub color_stops: Vec<String>,
    pub css_gradient: String,
    pub radial_jpeg: Vec<u8>,
    pub conic_jpeg: Vec<u8>,
}

/// Renders gradient images at a fixed square size.
pub struct GradientMaker {
    size: u32,
}

impl GradientMaker {
    /// Size is clamped to the renderable range rather than rejected.
    pub fn new(size: u32) -> Self {
        Self {
            size: size.clamp(MIN_SIZE, MAX_SIZE),
        }
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn generate(&self, c1: Color, c2: Color, c3: Color) -> Result<GradientSet, AppError> {
        let ramp = interpolate_colors(c1, c2, c3);
        let stops: Vec<String> = ramp.iter().map(|&c| to_hex(c)).collect();
        let css_gradient = format!(
            "radial-gradient(circle at 50% 50%, {})",
            stops.join(", ")
        );

        let radial_jpeg = encode_jpeg(self.render_radial(&ramp))?;
        let conic_jpeg = encode_jpeg(self.render_conic(&ramp))?;

        Ok(GradientSet {
            color_stops: stops,
            css_gradient,
            radial_jpeg,
            conic_jpeg,
        })
    }

    /// Radial gradient: sample the ramp by distance from the center,
    /// normalized so the ramp's last color is reached at the edge midpoint.
    fn render_radial(&self, ramp: &[Color]) -> RgbImage {
        let size = self.size;
        let center = size as f64 / 2.0;
        let max_dist = center;

        RgbImage::from_fn(size, size, |x, y| {
            let dx = x as f64 - center;
            let dy = y as f64 - center;
            let t = (dx * dx + dy * dy).sqrt() / max_dist;
            Rgb(sample_ramp(ramp, t.min(1.0)))
        })
    }

    /// Conic approximation: a vertical sweep through the ramp, clipped to
    /// the inscribed circle with a white surround.
    fn render_conic(&self, ramp: &[Color]) -> RgbImage {
        let size = self.size;
        let center = size as f64 / 2.0;
        let radius = center;

        RgbImage::from_fn(size, size, |x, y| {
            let dx = x as f64 - center;
            let dy = y as f64 - center;
            if (dx * dx + dy * dy).sqrt() > radius {
                return Rgb([255, 255, 255]);
            }
            let t = y as f64 / size as f64;
            Rgb(sample_ramp(ramp, t))
        })
    }
}

/// Sample the ramp at `t` in [0, 1], blending between adjacent stops.
fn sample_ramp(ramp: &[Color], t: f64) -> [u8; 3] {
    let scaled = t * (ramp.len() - 1) as f64;
    let lower = scaled.floor() as usize;
    let upper = (lower + 1).min(ramp.len() - 1);
    let color = lerp(ramp[lower], ramp[upper], scaled - lower as f64);
    [color.r, color.g, color.b]
}

fn encode_jpeg(img: RgbImage) -> Result<Vec<u8>, AppError> {
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Jpeg)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("JPEG encoding failed: {}", e)))?;
    Ok(bytes)
}

// ─── Gradient store ──────────────────────────────────────────────

struct StoredGradient {
    bytes: Vec<u8>,
    expires_at: DateTime<Utc>,
}

/// In-memory store of rendered gradient JPEGs, evicted on expiry and
/// capped in size.
#[derive(Clone)]
pub struct GradientStore {
    entries: Arc<DashMap<String, StoredGradient>>,
    capacity: usize,
}

impl GradientStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            capacity,
        }
    }

    pub fn insert(&self, id: &str, bytes: Vec<u8>) {
        if self.entries.len() >= self.capacity {
            let now = Utc::now();
            self.entries.retain(|_, g| g.expires_at > now);
            if self.entries.len() >= self.capacity {
                let oldest = self
                    .entries
                    .iter()
                    .min_by_key(|e| e.value().expires_at)
                    .map(|e| e.key().clone());
                if let Some(key) = oldest {
                    self.entries.remove(&key);
                }
            }
        }

        self.entries.insert(
            id.to_string(),
            StoredGradient {
                bytes,
                expires_at: Utc::now() + chrono::Duration::seconds(GRADIENT_TTL_SECS),
            },
        );
    }

    pub fn get(&self, id: &str) -> Option<Vec<u8>> {
        let entry = self.entries.get(id)?;
        if entry.expires_at <= Utc::now() {
            drop(entry);
            self.entries.remove(id);
            return None;
        }
        Some(entry.bytes.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Color = Color { r: 255, g: 0, b: 0 };
    const GREEN: Color = Color { r: 0, g: 255, b: 0 };
    const BLUE: Color = Color { r: 0, g: 0, b: 255 };

    #[test]
    fn test_parse_hex_roundtrip() {
        let color = parse_hex("#1db954").unwrap();
        assert_eq!(color, Color { r: 0x1d, g: 0xb9, b: 0x54 });
        assert_eq!(to_hex(color), "#1db954");
    }

    #[test]
    fn test_parse_hex_rejects_malformed() {
        for bad in ["", "#fff", "#gggggg", "red", "#12345", "#1234567"] {
            assert!(matches!(parse_hex(bad), Err(AppError::BadRequest(_))));
        }
    }

    #[test]
    fn test_ramp_has_ten_steps_through_all_stops() {
        let ramp = interpolate_colors(RED, GREEN, BLUE);
        assert_eq!(ramp.len(), 10);
        assert_eq!(ramp[0], RED);
        assert_eq!(ramp[4], GREEN);
        assert_eq!(ramp[5], GREEN);
        assert_eq!(ramp[9], BLUE);
    }

    #[test]
    fn test_size_clamped_to_renderable_range() {
        assert_eq!(GradientMaker::new(100).size(), MIN_SIZE);
        assert_eq!(GradientMaker::new(50_000).size(), MAX_SIZE);
        assert_eq!(GradientMaker::new(2048).size(), 2048);
    }

    #[test]
    fn test_generate_produces_square_jpegs() {
        let set = GradientMaker::new(MIN_SIZE).generate(RED, GREEN, BLUE).unwrap();

        let radial = image::load_from_memory(&set.radial_jpeg).unwrap();
        assert_eq!(radial.width(), MIN_SIZE);
        assert_eq!(radial.height(), MIN_SIZE);

        let conic = image::load_from_memory(&set.conic_jpeg).unwrap();
        assert_eq!(conic.width(), MIN_SIZE);

        assert_eq!(set.color_stops.len(), 10);
        assert!(set.css_gradient.starts_with("radial-gradient(circle at 50% 50%, #ff0000"));
    }

    #[test]
    fn test_store_expires_and_caps() {
        let store = GradientStore::new(2);
        store.insert("a", vec![1]);
        store.insert("b", vec![2]);
        assert_eq!(store.get("a"), Some(vec![1]));

        // At capacity: inserting a third evicts the oldest live entry
        store.insert("c", vec![3]);
        assert!(store.get("c").is_some());
        assert!(store.entries.len() <= 2);

        assert!(store.get("missing").is_none());
    }
}

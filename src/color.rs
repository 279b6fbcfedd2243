// ── Colors and packed tints ───────────────────────────────────────────────────
//
// `Color` is an 8-bit RGBA value used for clear colors, camera backgrounds and
// fade/flash overlays.  Vertex tints are packed into a single `u32` in ABGR
// byte order (little-endian RGBA in memory), which is what the batch shaders
// read through a normalized `UNSIGNED_BYTE x 4` attribute.

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

// ── Color ─────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Default for Color {
    fn default() -> Self {
        Self::TRANSPARENT
    }
}

impl Color {
    pub const BLACK: Self = Self::rgba(0, 0, 0, 255);
    pub const WHITE: Self = Self::rgba(255, 255, 255, 255);
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    /// Opaque color from a packed `0xRRGGBB` value.
    pub const fn from_hex(hex: u32) -> Self {
        Self::rgb((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
    }

    /// Packed `0xRRGGBB`, alpha discarded.
    pub const fn to_hex(&self) -> u32 {
        (self.r as u32) << 16 | (self.g as u32) << 8 | self.b as u32
    }

    /// Normalized `[r, g, b, a]` for `clearColor` and uniforms.
    pub fn gl(&self) -> [f32; 4] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
            self.a as f32 / 255.0,
        ]
    }

    pub fn alpha_gl(&self) -> f32 {
        self.a as f32 / 255.0
    }

    pub fn is_transparent(&self) -> bool {
        self.a == 0
    }

    /// Parse `#rgb`, `#rrggbb`, `#rrggbbaa`, `0xrrggbb`, `rgb(r,g,b)` or
    /// `rgba(r,g,b,a)` where `a` is 0..1.
    pub fn parse(input: &str) -> Option<Self> {
        let s = input.trim();
        if let Some(hex) = s.strip_prefix('#').or_else(|| s.strip_prefix("0x")) {
            return Self::parse_hex(hex);
        }
        let (body, has_alpha) = if let Some(rest) = s.strip_prefix("rgba(") {
            (rest.strip_suffix(')')?, true)
        } else if let Some(rest) = s.strip_prefix("rgb(") {
            (rest.strip_suffix(')')?, false)
        } else {
            return None;
        };

        let parts: Vec<&str> = body.split(',').map(str::trim).collect();
        if parts.len() != if has_alpha { 4 } else { 3 } {
            return None;
        }
        let channel = |p: &str| p.parse::<f32>().ok().map(|v| v.clamp(0.0, 255.0) as u8);
        let r = channel(parts[0])?;
        let g = channel(parts[1])?;
        let b = channel(parts[2])?;
        let a = if has_alpha {
            let alpha = parts[3].parse::<f32>().ok()?;
            (alpha.clamp(0.0, 1.0) * 255.0).round() as u8
        } else {
            255
        };
        Some(Self::rgba(r, g, b, a))
    }

    fn parse_hex(hex: &str) -> Option<Self> {
        let byte = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
        match hex.len() {
            3 => {
                let nib = |i: usize| {
                    u8::from_str_radix(hex.get(i..i + 1)?, 16).ok().map(|v| v * 17)
                };
                Some(Self::rgb(nib(0)?, nib(1)?, nib(2)?))
            }
            6 => Some(Self::rgb(byte(0)?, byte(2)?, byte(4)?)),
            8 => Some(Self::rgba(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
            _ => None,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ColorVisitor;

        impl Visitor<'_> for ColorVisitor {
            type Value = Color;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a 0xRRGGBB number or a CSS color string")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Color, E> {
                u32::try_from(v)
                    .map(Color::from_hex)
                    .map_err(|_| E::custom(format!("color {v} out of range")))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Color, E> {
                u64::try_from(v)
                    .map_err(|_| E::custom(format!("negative color {v}")))
                    .and_then(|v| self.visit_u64(v))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Color, E> {
                Color::parse(v).ok_or_else(|| E::custom(format!("unrecognised color '{v}'")))
            }
        }

        deserializer.deserialize_any(ColorVisitor)
    }
}

// ── Tint packing ──────────────────────────────────────────────────────────────

/// Pack normalized RGBA floats into an ABGR `u32`.
pub fn get_tint_from_floats(r: f32, g: f32, b: f32, a: f32) -> u32 {
    let ur = ((r * 255.0) as u32) & 0xff;
    let ug = ((g * 255.0) as u32) & 0xff;
    let ub = ((b * 255.0) as u32) & 0xff;
    let ua = ((a * 255.0) as u32) & 0xff;
    (ua << 24) | (ub << 16) | (ug << 8) | ur
}

/// Combine an already-packed BGR value with a float alpha.
pub fn get_tint_append_float_alpha(rgb: u32, a: f32) -> u32 {
    let ua = ((a * 255.0) as u32) & 0xff;
    (ua << 24) | (rgb & 0x00ff_ffff)
}

/// Combine a `0xRRGGBB` color with a float alpha, swapping red and blue so
/// the result is ABGR.
pub fn get_tint_append_float_alpha_and_swap(rgb: u32, a: f32) -> u32 {
    let ur = (rgb >> 16) & 0xff;
    let ug = (rgb >> 8) & 0xff;
    let ub = rgb & 0xff;
    let ua = ((a * 255.0) as u32) & 0xff;
    (ua << 24) | (ub << 16) | (ug << 8) | ur
}

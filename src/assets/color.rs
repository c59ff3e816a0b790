use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::foundation::error::BookmockError;

/// Straight (non-premultiplied) sRGB color with alpha.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8 {
    /// Opaque color from three channels.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// `#rrggbb`; alpha is dropped because back colors are always opaque.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Channels as normalized floats.
    pub fn to_f64(self) -> [f64; 4] {
        [
            f64::from(self.r) / 255.0,
            f64::from(self.g) / 255.0,
            f64::from(self.b) / 255.0,
            f64::from(self.a) / 255.0,
        ]
    }

    /// Premultiplied byte order used by frames and pixmaps.
    pub fn to_premul_bytes(self) -> [u8; 4] {
        let mut px = [self.r, self.g, self.b, self.a];
        crate::foundation::math::premultiply_rgba8_in_place(&mut px);
        px
    }
}

impl FromStr for Rgba8 {
    type Err = BookmockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_hex(s).map_err(BookmockError::validation)
    }
}

impl fmt::Display for Rgba8 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Back-cover fill for hardcover books. Always opaque sRGB.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BackColor(Rgba8);

impl BackColor {
    /// Wrap a color, forcing it opaque.
    pub fn new(c: Rgba8) -> Self {
        Self(Rgba8 { a: 255, ..c })
    }

    /// Underlying color.
    pub fn rgba(self) -> Rgba8 {
        self.0
    }
}

impl Default for BackColor {
    fn default() -> Self {
        Self(Rgba8::rgb(255, 255, 255))
    }
}

impl FromStr for BackColor {
    type Err = BookmockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s.parse()?))
    }
}

impl fmt::Display for BackColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl Serialize for BackColor {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_hex())
    }
}

impl<'de> Deserialize<'de> for BackColor {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

fn parse_hex(s: &str) -> Result<Rgba8, String> {
    let s = s.trim();
    let s = s.strip_prefix('#').unwrap_or(s);

    fn hex_byte(pair: &str) -> Result<u8, String> {
        u8::from_str_radix(pair, 16).map_err(|_| format!("invalid hex byte \"{pair}\""))
    }

    if !s.is_ascii() {
        return Err("hex color must be ascii".to_owned());
    }

    match s.len() {
        3 => {
            let mut out = [0u8; 3];
            for (i, ch) in s.chars().enumerate() {
                let nib = ch
                    .to_digit(16)
                    .ok_or_else(|| format!("invalid hex digit '{ch}'"))?
                    as u8;
                out[i] = nib * 17;
            }
            Ok(Rgba8::rgb(out[0], out[1], out[2]))
        }
        6 => Ok(Rgba8::rgb(
            hex_byte(&s[0..2])?,
            hex_byte(&s[2..4])?,
            hex_byte(&s[4..6])?,
        )),
        8 => Ok(Rgba8 {
            r: hex_byte(&s[0..2])?,
            g: hex_byte(&s[2..4])?,
            b: hex_byte(&s[4..6])?,
            a: hex_byte(&s[6..8])?,
        }),
        _ => Err("hex color must be #RGB, #RRGGBB or #RRGGBBAA (case-insensitive)".to_owned()),
    }
}

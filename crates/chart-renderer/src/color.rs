//! Colors and continuous color scales.

use std::fmt;
use std::str::FromStr;

/// Color value in RGBA format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    pub const fn transparent() -> Self {
        Self::new(0, 0, 0, 0)
    }

    pub fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// `#rrggbb`, alpha ignored.
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Linear interpolation, `t` clamped to `[0, 1]`.
    pub fn lerp(self, other: Color, t: f32) -> Color {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Color::new(
            mix(self.r, other.r),
            mix(self.g, other.g),
            mix(self.b, other.b),
            mix(self.a, other.a),
        )
    }
}

/// Named scales for bathymetry rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorScale {
    #[default]
    Viridis,
    Plasma,
    Inferno,
    Turbo,
}

impl ColorScale {
    pub const ALL: [ColorScale; 4] = [
        ColorScale::Viridis,
        ColorScale::Plasma,
        ColorScale::Inferno,
        ColorScale::Turbo,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ColorScale::Viridis => "viridis",
            ColorScale::Plasma => "plasma",
            ColorScale::Inferno => "inferno",
            ColorScale::Turbo => "turbo",
        }
    }

    /// Evenly spaced stops from shallow (0.0) to deep (1.0).
    pub fn stops(&self) -> &'static [Color] {
        const VIRIDIS: [Color; 5] = [
            Color::rgb(0x44, 0x01, 0x54),
            Color::rgb(0x3b, 0x52, 0x8b),
            Color::rgb(0x21, 0x91, 0x8c),
            Color::rgb(0x5e, 0xc9, 0x62),
            Color::rgb(0xfd, 0xe7, 0x25),
        ];
        const PLASMA: [Color; 5] = [
            Color::rgb(0x0d, 0x08, 0x87),
            Color::rgb(0x7e, 0x03, 0xa8),
            Color::rgb(0xcc, 0x47, 0x78),
            Color::rgb(0xf8, 0x94, 0x41),
            Color::rgb(0xf0, 0xf9, 0x21),
        ];
        const INFERNO: [Color; 5] = [
            Color::rgb(0x00, 0x00, 0x04),
            Color::rgb(0x56, 0x10, 0x6d),
            Color::rgb(0xb8, 0x37, 0x6d),
            Color::rgb(0xfc, 0x89, 0x61),
            Color::rgb(0xfc, 0xfd, 0xbf),
        ];
        const TURBO: [Color; 5] = [
            Color::rgb(0x30, 0x12, 0x3b),
            Color::rgb(0x28, 0xbb, 0xec),
            Color::rgb(0xa2, 0xfc, 0x3c),
            Color::rgb(0xfb, 0x80, 0x22),
            Color::rgb(0x7a, 0x04, 0x03),
        ];
        match self {
            ColorScale::Viridis => &VIRIDIS,
            ColorScale::Plasma => &PLASMA,
            ColorScale::Inferno => &INFERNO,
            ColorScale::Turbo => &TURBO,
        }
    }

    /// Color at normalized position `t`.
    pub fn sample(&self, t: f32) -> Color {
        let stops = self.stops();
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        let scaled = t * (stops.len() - 1) as f32;
        let lower = (scaled.floor() as usize).min(stops.len() - 2);
        stops[lower].lerp(stops[lower + 1], scaled - lower as f32)
    }
}

impl fmt::Display for ColorScale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ColorScale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ColorScale::ALL
            .into_iter()
            .find(|scale| scale.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown color scale: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_hits_end_stops() {
        for scale in ColorScale::ALL {
            let stops = scale.stops();
            assert_eq!(scale.sample(0.0), stops[0]);
            assert_eq!(scale.sample(1.0), stops[stops.len() - 1]);
            assert_eq!(scale.sample(-3.0), stops[0]);
            assert_eq!(scale.sample(f32::NAN), stops[0]);
        }
    }

    #[test]
    fn lerp_midpoint() {
        let c = Color::rgb(0, 0, 0).lerp(Color::rgb(200, 100, 50), 0.5);
        assert_eq!(c, Color::rgb(100, 50, 25));
    }

    #[test]
    fn parses_scale_names() {
        assert_eq!("Plasma".parse::<ColorScale>().unwrap(), ColorScale::Plasma);
        assert!("rainbow".parse::<ColorScale>().is_err());
        assert_eq!(Color::rgb(0x44, 0x01, 0x54).to_hex(), "#440154");
    }
}

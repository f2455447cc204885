use std::fmt;

use bytemuck::{Pod, Zeroable};

/// Packed RGBA color, `r << 24 | g << 16 | b << 8 | a`.
///
/// Channel math truncates to bytes and `add` wraps at 256. Both are part of
/// the output format, so they are kept as-is rather than clamped.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Pod, Zeroable)]
#[repr(transparent)]
pub struct Color(pub u32);

impl Color {
    pub const BLACK: Color = Color::from_bytes(0, 0, 0, 255);
    pub const WHITE: Color = Color::from_bytes(255, 255, 255, 255);
    pub const RED: Color = Color::from_bytes(255, 0, 0, 255);
    pub const GREEN: Color = Color::from_bytes(0, 255, 0, 255);
    pub const BLUE: Color = Color::from_bytes(0, 0, 255, 255);

    pub const fn from_bytes(r: u8, g: u8, b: u8, a: u8) -> Self {
        Color((r as u32) << 24 | (g as u32) << 16 | (b as u32) << 8 | a as u32)
    }

    /// Components in [0, 1]; scaled by 255 and truncated, not rounded.
    pub fn from_floats(r: f64, g: f64, b: f64, a: f64) -> Self {
        Color::from_bytes(to_byte(r * 255.0), to_byte(g * 255.0), to_byte(b * 255.0), to_byte(a * 255.0))
    }

    pub const fn to_bytes(self) -> (u8, u8, u8, u8) {
        ((self.0 >> 24) as u8, (self.0 >> 16) as u8, (self.0 >> 8) as u8, self.0 as u8)
    }

    pub fn scale(self, k: f64) -> Self {
        let (r, g, b, a) = self.to_bytes();
        Color::from_bytes(
            to_byte(r as f64 * k),
            to_byte(g as f64 * k),
            to_byte(b as f64 * k),
            to_byte(a as f64 * k),
        )
    }

    pub fn add(self, other: Color) -> Self {
        let (r1, g1, b1, a1) = self.to_bytes();
        let (r2, g2, b2, a2) = other.to_bytes();
        Color::from_bytes(
            r1.wrapping_add(r2),
            g1.wrapping_add(g2),
            b1.wrapping_add(b2),
            a1.wrapping_add(a2),
        )
    }

    /// ORs `a` into the alpha byte. Does not overwrite bits already set.
    pub fn set_alpha(&mut self, a: u8) {
        self.0 |= a as u32;
    }

    pub fn with_alpha(mut self, a: u8) -> Self {
        self.set_alpha(a);
        self
    }
}

// Float to byte truncates toward zero. Out-of-range values saturate.
#[inline(always)]
fn to_byte(v: f64) -> u8 {
    v as u8
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (r, g, b, a) = self.to_bytes();
        write!(f, "{r},{g},{b},{a}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packs_channels_high_to_low() {
        let c = Color::from_bytes(0x12, 0x34, 0x56, 0x78);
        assert_eq!(c.0, 0x1234_5678);
        assert_eq!(c.to_bytes(), (0x12, 0x34, 0x56, 0x78));
    }

    #[test]
    fn pure_red_from_floats() {
        assert_eq!(Color::from_floats(1.0, 0.0, 0.0, 1.0), Color::from_bytes(255, 0, 0, 255));
        assert_eq!(Color::from_floats(1.0, 0.0, 0.0, 1.0), Color::RED);
    }

    #[test]
    fn from_floats_truncates() {
        // 0.5 * 255 = 127.5
        assert_eq!(Color::from_floats(0.5, 0.5, 0.5, 0.5).to_bytes(), (127, 127, 127, 127));
    }

    #[test]
    fn add_wraps_per_channel() {
        let c = Color::from_bytes(200, 0, 0, 255).add(Color::from_bytes(100, 0, 0, 0));
        assert_eq!(c.to_bytes().0, 44);
        assert_eq!(c.scale(1.0).to_bytes(), (44, 0, 0, 255));
    }

    #[test]
    fn scale_truncates_every_channel() {
        let c = Color::from_bytes(255, 100, 3, 255).scale(0.5);
        assert_eq!(c.to_bytes(), (127, 50, 1, 127));
    }

    #[test]
    fn set_alpha_is_bitwise_or() {
        let mut c = Color::from_bytes(1, 2, 3, 0b0101);
        c.set_alpha(0b0010);
        assert_eq!(c.to_bytes().3, 0b0111);

        let mut opaque = Color::WHITE.scale(0.5);
        opaque.set_alpha(255);
        assert_eq!(opaque.to_bytes(), (127, 127, 127, 255));
    }

    #[test]
    fn display_lists_channels() {
        assert_eq!(Color::from_bytes(1, 2, 3, 4).to_string(), "1,2,3,4");
    }
}

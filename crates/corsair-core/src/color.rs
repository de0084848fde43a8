//! Packed RGBA colors.
//!
//! Widget style colors travel through the generic property interface as
//! `i32`, packed `0xRRGGBBAA`. Transitions interpolate each channel
//! independently so a fade never smears across channel boundaries.

/// An 8-bit-per-channel RGBA color.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color(pub u8, pub u8, pub u8, pub u8);

impl Color {
    pub const TRANSPARENT: Color = Color(0, 0, 0, 0);
    pub const BLACK: Color = Color(0, 0, 0, 255);
    pub const WHITE: Color = Color(255, 255, 255, 255);

    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Color(r, g, b, 255)
    }

    pub const fn from_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Color(r, g, b, a)
    }

    /// Unpack from `0xRRGGBBAA`.
    pub const fn from_packed(v: u32) -> Self {
        Color((v >> 24) as u8, (v >> 16) as u8, (v >> 8) as u8, v as u8)
    }

    /// Pack to `0xRRGGBBAA`.
    pub const fn packed(self) -> u32 {
        ((self.0 as u32) << 24) | ((self.1 as u32) << 16) | ((self.2 as u32) << 8) | self.3 as u32
    }

    pub const fn with_alpha(self, a: u8) -> Self {
        Color(self.0, self.1, self.2, a)
    }
}

/// Interpolate two packed colors channel by channel at step `p` of `c`.
///
/// Both endpoints travel as property-interface integers. `p <= 0` returns
/// `a` exactly and `p >= c` returns `z` exactly.
pub fn lerp_packed(a: i32, z: i32, p: i32, c: i32) -> i32 {
    if p <= 0 || c <= 0 {
        return a;
    }
    if p >= c {
        return z;
    }
    let a = Color::from_packed(a as u32);
    let z = Color::from_packed(z as u32);
    let ch = |a: u8, z: u8| -> u8 { (a as i32 + ((z as i32 - a as i32) * p) / c) as u8 };
    Color(ch(a.0, z.0), ch(a.1, z.1), ch(a.2, z.2), ch(a.3, z.3)).packed() as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_roundtrip() {
        let c = Color::from_rgba(0x12, 0x34, 0x56, 0x78);
        assert_eq!(c.packed(), 0x12345678);
        assert_eq!(Color::from_packed(0x12345678), c);
    }

    #[test]
    fn test_lerp_endpoints() {
        let a = Color(0, 0, 0, 255).packed() as i32;
        let z = Color(255, 255, 255, 255).packed() as i32;
        assert_eq!(lerp_packed(a, z, 0, 10), a);
        assert_eq!(lerp_packed(a, z, 10, 10), z);
        assert_eq!(lerp_packed(a, z, 12, 10), z);
    }

    #[test]
    fn test_lerp_channels_independent() {
        // Red rises while alpha falls; green and blue hold still.
        let a = Color(0, 40, 200, 255).packed() as i32;
        let z = Color(100, 40, 200, 55).packed() as i32;
        let mid = Color::from_packed(lerp_packed(a, z, 5, 10) as u32);
        assert_eq!(mid, Color(50, 40, 200, 155));
    }
}

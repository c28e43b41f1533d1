//! RGBA color values and the validity gates used by every factory entry
//! point.

/// An RGBA color with each component in [0.0, 1.0].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0, 1.0);
    pub const RED: Color = Color::new(1.0, 0.0, 0.0, 1.0);
    pub const GREEN: Color = Color::new(0.0, 1.0, 0.0, 1.0);
    pub const BLUE: Color = Color::new(0.0, 0.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// True when every component lies in [0, 1].
    pub fn is_valid(&self) -> bool {
        [self.r, self.g, self.b, self.a]
            .iter()
            .all(|c| (0.0..=1.0).contains(c))
    }

    pub fn to_array(&self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Validity check for a single color. Factory functions call this before
/// allocating any geometry.
pub fn is_valid_color(color: &Color) -> bool {
    color.is_valid()
}

/// A collection passes only if it is non-empty and every member passes the
/// single-color check.
pub fn is_valid_colors(colors: &[Color]) -> bool {
    !colors.is_empty() && colors.iter().all(is_valid_color)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn components_outside_unit_range_are_invalid() {
        assert!(Color::new(0.0, 0.5, 1.0, 1.0).is_valid());
        assert!(!Color::new(2.0, 0.0, 0.0, 1.0).is_valid());
        assert!(!Color::new(0.0, -0.1, 0.0, 1.0).is_valid());
        assert!(!Color::new(0.0, 0.0, 0.0, 1.1).is_valid());
    }

    #[test]
    fn collection_fails_if_any_member_fails() {
        assert!(is_valid_colors(&[Color::RED, Color::GREEN]));
        assert!(!is_valid_colors(&[Color::RED, Color::new(1.5, 0.0, 0.0, 1.0)]));
        assert!(!is_valid_colors(&[]));
    }
}

//! Math types and glam re-exports.
//!
//! We re-export [glam](https://docs.rs/glam) types so users don't need to
//! depend on it directly. [`Affine2`] is the batcher's 3×2 transform:
//! rotation, scale, skew, and translation, no perspective.
//!
//! glam covers the plain constructors (`Affine2::from_angle`,
//! `from_scale`, `from_translation`, `from_scale_angle_translation`); the
//! functions here add the missing ones — skew, and rotating/scaling about an
//! arbitrary center point instead of the origin.

pub use glam::{Affine2, Mat4, Vec2};

/// A rotation of `radians` about `center` instead of the origin.
pub fn rotation_about(radians: f32, center: Vec2) -> Affine2 {
    about(Affine2::from_angle(radians), center)
}

/// A non-uniform scale about `center` instead of the origin.
pub fn scale_about(scale: Vec2, center: Vec2) -> Affine2 {
    about(Affine2::from_scale(scale), center)
}

/// A skew by `radians_x` along X and `radians_y` along Y:
/// `(x, y) → (x + tan(radians_x)·y, y + tan(radians_y)·x)`.
pub fn skew(radians_x: f32, radians_y: f32) -> Affine2 {
    Affine2::from_cols(
        Vec2::new(1.0, radians_y.tan()),
        Vec2::new(radians_x.tan(), 1.0),
        Vec2::ZERO,
    )
}

/// A skew about `center` instead of the origin.
pub fn skew_about(radians_x: f32, radians_y: f32, center: Vec2) -> Affine2 {
    about(skew(radians_x, radians_y), center)
}

/// Conjugate `transform` by a translation: move `center` to the origin,
/// apply, move back.
fn about(transform: Affine2, center: Vec2) -> Affine2 {
    Affine2::from_translation(center) * transform * Affine2::from_translation(-center)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vec2, b: Vec2) {
        assert!((a - b).length() < 1e-4, "expected {b:?}, got {a:?}");
    }

    #[test]
    fn rotation_about_fixes_center() {
        let center = Vec2::new(3.0, -2.0);
        let m = rotation_about(1.234, center);
        close(m.transform_point2(center), center);
    }

    #[test]
    fn rotation_about_quarter_turn() {
        let center = Vec2::new(1.0, 1.0);
        let m = rotation_about(std::f32::consts::FRAC_PI_2, center);
        // One unit right of center rotates to one unit above it (Y-down: below).
        close(m.transform_point2(Vec2::new(2.0, 1.0)), Vec2::new(1.0, 2.0));
    }

    #[test]
    fn scale_about_fixes_center() {
        let center = Vec2::new(10.0, 20.0);
        let m = scale_about(Vec2::new(2.0, 3.0), center);
        close(m.transform_point2(center), center);
        close(m.transform_point2(Vec2::new(11.0, 21.0)), Vec2::new(12.0, 23.0));
    }

    #[test]
    fn skew_x_shears_by_tangent() {
        let m = skew(std::f32::consts::FRAC_PI_4, 0.0);
        // tan(45°) = 1: a point at y = 2 shifts right by 2.
        close(m.transform_point2(Vec2::new(1.0, 2.0)), Vec2::new(3.0, 2.0));
    }

    #[test]
    fn skew_y_shears_by_tangent() {
        let m = skew(0.0, std::f32::consts::FRAC_PI_4);
        close(m.transform_point2(Vec2::new(2.0, 1.0)), Vec2::new(2.0, 3.0));
    }

    #[test]
    fn skew_about_fixes_center() {
        let center = Vec2::new(5.0, 5.0);
        let m = skew_about(0.5, 0.25, center);
        close(m.transform_point2(center), center);
    }
}

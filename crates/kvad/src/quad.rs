//! Quad geometry: corner positions and UVs for one textured rectangle.
//!
//! Corners are always emitted in the order top-left, top-right, bottom-right,
//! bottom-left — the same order the index topology in [`store`](crate::store)
//! assumes.
//!
//! Two paths, depending on whether a source region is selected:
//!
//! - **No source**: the quad is the texture's pixel rectangle
//!   `(0,0)..(W,H)`, and UVs are the corners divided by the texture size.
//! - **Source affine**: the affine is applied to the unit square, and the
//!   transformed points *are* the UVs. Positions come from applying the world
//!   transform to those fractional corners scaled back up by the texture
//!   size, so a half-size source region still draws at half the texture's
//!   pixel size before the world transform.

use glam::{Affine2, Vec2};

/// The unit square in corner order: TL, TR, BR, BL.
const UNIT: [Vec2; 4] = [
    Vec2::new(0.0, 0.0),
    Vec2::new(1.0, 0.0),
    Vec2::new(1.0, 1.0),
    Vec2::new(0.0, 1.0),
];

/// Compute the four corner positions and UVs for a quad of `texture_size`
/// pixels, transformed by `world`, optionally sampling the sub-region
/// selected by `source`.
pub(crate) fn build_quad(
    texture_size: Vec2,
    world: Affine2,
    source: Option<Affine2>,
) -> ([Vec2; 4], [Vec2; 4]) {
    let mut positions = [Vec2::ZERO; 4];
    let mut uvs = [Vec2::ZERO; 4];

    match source {
        None => {
            for (i, corner) in UNIT.iter().enumerate() {
                let px = *corner * texture_size;
                positions[i] = world.transform_point2(px);
                uvs[i] = *corner;
            }
        }
        Some(source) => {
            for (i, corner) in UNIT.iter().enumerate() {
                let uv = source.transform_point2(*corner);
                positions[i] = world.transform_point2(uv * texture_size);
                uvs[i] = uv;
            }
        }
    }

    (positions, uvs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_full_texture() {
        let (pos, uv) = build_quad(Vec2::new(64.0, 32.0), Affine2::IDENTITY, None);
        assert_eq!(
            pos,
            [
                Vec2::new(0.0, 0.0),
                Vec2::new(64.0, 0.0),
                Vec2::new(64.0, 32.0),
                Vec2::new(0.0, 32.0),
            ]
        );
        assert_eq!(
            uv,
            [
                Vec2::new(0.0, 0.0),
                Vec2::new(1.0, 0.0),
                Vec2::new(1.0, 1.0),
                Vec2::new(0.0, 1.0),
            ]
        );
    }

    #[test]
    fn world_translation_moves_positions_not_uvs() {
        let world = Affine2::from_translation(Vec2::new(10.0, 20.0));
        let (pos, uv) = build_quad(Vec2::new(8.0, 8.0), world, None);
        assert_eq!(pos[0], Vec2::new(10.0, 20.0));
        assert_eq!(pos[2], Vec2::new(18.0, 28.0));
        assert_eq!(uv[0], Vec2::new(0.0, 0.0));
        assert_eq!(uv[2], Vec2::new(1.0, 1.0));
    }

    #[test]
    fn source_scale_selects_top_left_quadrant() {
        let source = Affine2::from_scale(Vec2::new(0.5, 0.5));
        let (pos, uv) = build_quad(Vec2::new(100.0, 100.0), Affine2::IDENTITY, Some(source));
        assert_eq!(
            uv,
            [
                Vec2::new(0.0, 0.0),
                Vec2::new(0.5, 0.0),
                Vec2::new(0.5, 0.5),
                Vec2::new(0.0, 0.5),
            ]
        );
        // Positions are the fractional corners scaled by texture size.
        assert_eq!(pos[1], Vec2::new(50.0, 0.0));
        assert_eq!(pos[2], Vec2::new(50.0, 50.0));
    }

    #[test]
    fn source_translation_selects_offset_region() {
        // Bottom-right quadrant: scale 0.5 then translate 0.5.
        let source = Affine2::from_translation(Vec2::new(0.5, 0.5))
            * Affine2::from_scale(Vec2::new(0.5, 0.5));
        let (pos, uv) = build_quad(Vec2::new(100.0, 100.0), Affine2::IDENTITY, Some(source));
        assert_eq!(uv[0], Vec2::new(0.5, 0.5));
        assert_eq!(uv[2], Vec2::new(1.0, 1.0));
        assert_eq!(pos[0], Vec2::new(50.0, 50.0));
        assert_eq!(pos[2], Vec2::new(100.0, 100.0));
    }

    #[test]
    fn world_composes_after_source() {
        let source = Affine2::from_scale(Vec2::new(0.5, 0.5));
        let world = Affine2::from_translation(Vec2::new(7.0, 0.0));
        let (pos, _) = build_quad(Vec2::new(10.0, 10.0), world, Some(source));
        assert_eq!(pos[0], Vec2::new(7.0, 0.0));
        assert_eq!(pos[2], Vec2::new(12.0, 5.0));
    }
}

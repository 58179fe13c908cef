//! Camera occlusion: how far the boom must shrink so the camera does not sit
//! inside or behind world geometry.
//!
//! Two passes against the anchor→desired segment:
//! - solid: swept sphere over everything but the actor and thin layers;
//! - thin: only when the desired point overlaps thin geometry, the nearest
//!   ray entry into one of those overlapped colliders.

use collision_static::{LayerMask, SpatialQuery};
use glam::Vec3;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OcclusionResult {
    pub solid_ratio: f32,
    pub thin_ratio: f32,
    /// `min(solid_ratio, thin_ratio)`.
    pub ratio: f32,
    /// Occlusion-limited distance, `target_zoom * ratio`.
    pub final_zoom: f32,
}

impl OcclusionResult {
    #[must_use]
    pub fn clear(target_zoom: f32) -> Self {
        Self {
            solid_ratio: 1.0,
            thin_ratio: 1.0,
            ratio: 1.0,
            final_zoom: target_zoom,
        }
    }

    #[must_use]
    pub fn is_occluded(&self) -> bool {
        self.ratio < 1.0
    }
}

/// Fraction of the boom left by solid geometry.
#[must_use]
pub fn solid_ratio(world: &dyn SpatialQuery, anchor: Vec3, desired: Vec3, radius: f32) -> f32 {
    let total = anchor.distance(desired);
    if total <= f32::EPSILON {
        return 1.0;
    }
    let dir = (desired - anchor) / total;
    world
        .sphere_cast(anchor, radius, dir, total, LayerMask::solid_probe())
        .map_or(1.0, |hit| (hit.distance / total).clamp(0.0, 1.0))
}

/// Fraction of the boom left by thin geometry around the desired point.
#[must_use]
pub fn thin_ratio(world: &dyn SpatialQuery, anchor: Vec3, desired: Vec3, radius: f32) -> f32 {
    let total = anchor.distance(desired);
    if total <= f32::EPSILON {
        return 1.0;
    }
    let mask = LayerMask::thin();
    let around = world.overlap_sphere(desired, radius, mask);
    if around.is_empty() {
        return 1.0;
    }
    let dir = (desired - anchor) / total;
    let entry = world
        .raycast_all(anchor, dir, total, mask)
        .into_iter()
        .filter(|h| around.contains(&h.collider))
        .min_by(|a, b| a.distance.total_cmp(&b.distance));
    entry.map_or(1.0, |h| {
        ((h.point.distance(anchor) - radius) / total).clamp(0.0, 1.0)
    })
}

/// Run both passes for a camera `target_zoom` behind `anchor` along `forward`.
/// Without a world the boom is never shortened.
#[must_use]
pub fn resolve_zoom(
    world: Option<&dyn SpatialQuery>,
    anchor: Vec3,
    forward: Vec3,
    target_zoom: f32,
    radius: f32,
) -> OcclusionResult {
    let Some(world) = world else {
        return OcclusionResult::clear(target_zoom);
    };
    let desired = anchor - forward * target_zoom;
    let solid = solid_ratio(world, anchor, desired, radius);
    let thin = thin_ratio(world, anchor, desired, radius);
    let ratio = solid.min(thin);
    OcclusionResult {
        solid_ratio: solid,
        thin_ratio: thin,
        ratio,
        final_zoom: target_zoom * ratio,
    }
}

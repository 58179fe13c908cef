//! Spatial probes over a `StaticIndex`: sphere cast, ray cast-all and sphere
//! overlap. These back the follow camera's occlusion query.
//!
//! A sphere cast is a ray cast against the shape inflated by the sphere
//! radius. Boxes inflate to a larger box and cylinders grow in radius and
//! half-height, so rounded edges are treated as square. Rays that start
//! inside a shape do not report it.

use glam::Vec3;
use smallvec::SmallVec;

use crate::{Aabb, ColliderId, CylinderY, LayerMask, ShapeRef, StaticIndex};

/// Nearest surface entry along a probe.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CastHit {
    pub collider: ColliderId,
    /// Distance travelled along the probe direction before contact.
    pub distance: f32,
    /// Contact point on the (possibly inflated) surface.
    pub point: Vec3,
    pub normal: Vec3,
}

/// Read-only spatial queries the camera needs from the world.
pub trait SpatialQuery {
    /// Sweep a sphere from `origin` along unit `dir` for `max_dist`; nearest hit.
    fn sphere_cast(
        &self,
        origin: Vec3,
        radius: f32,
        dir: Vec3,
        max_dist: f32,
        mask: LayerMask,
    ) -> Option<CastHit>;

    /// Every collider the ray enters within `max_dist`, nearest first.
    fn raycast_all(
        &self,
        origin: Vec3,
        dir: Vec3,
        max_dist: f32,
        mask: LayerMask,
    ) -> SmallVec<[CastHit; 8]>;

    /// Colliders touching a sphere at `center`.
    fn overlap_sphere(&self, center: Vec3, radius: f32, mask: LayerMask)
    -> SmallVec<[ColliderId; 8]>;
}

/// Slab test. Returns entry distance and face normal, or `None` when the ray
/// misses, starts inside, or enters past `max_t`.
#[must_use]
pub fn ray_aabb_enter(origin: Vec3, dir: Vec3, b: &Aabb, max_t: f32) -> Option<(f32, Vec3)> {
    if b.contains(origin) {
        return None;
    }
    let mut t_enter = f32::NEG_INFINITY;
    let mut t_exit = f32::INFINITY;
    let mut normal = Vec3::ZERO;
    for axis in 0..3 {
        let o = origin[axis];
        let d = dir[axis];
        let (lo, hi) = (b.min[axis], b.max[axis]);
        if d.abs() < 1e-8 {
            if o < lo || o > hi {
                return None;
            }
            continue;
        }
        let inv = 1.0 / d;
        let mut t0 = (lo - o) * inv;
        let mut t1 = (hi - o) * inv;
        let mut n = Vec3::ZERO;
        n[axis] = -d.signum();
        if t0 > t1 {
            std::mem::swap(&mut t0, &mut t1);
        }
        if t0 > t_enter {
            t_enter = t0;
            normal = n;
        }
        t_exit = t_exit.min(t1);
        if t_enter > t_exit {
            return None;
        }
    }
    if t_enter < 0.0 || t_enter > max_t {
        return None;
    }
    Some((t_enter, normal))
}

/// Ray against a Y-up cylinder: side wall plus both caps.
#[must_use]
pub fn ray_cylinder_enter(
    origin: Vec3,
    dir: Vec3,
    c: &CylinderY,
    max_t: f32,
) -> Option<(f32, Vec3)> {
    let y_lo = c.center.y - c.half_height;
    let y_hi = c.center.y + c.half_height;
    let ox = origin.x - c.center.x;
    let oz = origin.z - c.center.z;
    let r2 = c.radius * c.radius;
    if ox * ox + oz * oz <= r2 && origin.y >= y_lo && origin.y <= y_hi {
        return None;
    }
    let mut best: Option<(f32, Vec3)> = None;
    let mut consider = |t: f32, n: Vec3| {
        if t >= 0.0 && t <= max_t && best.is_none_or(|(bt, _)| t < bt) {
            best = Some((t, n));
        }
    };

    let a = dir.x * dir.x + dir.z * dir.z;
    if a > 1e-10 {
        let b = 2.0 * (ox * dir.x + oz * dir.z);
        let cc = ox * ox + oz * oz - r2;
        let disc = b * b - 4.0 * a * cc;
        if disc >= 0.0 {
            let t = (-b - disc.sqrt()) / (2.0 * a);
            let y = origin.y + dir.y * t;
            if y >= y_lo && y <= y_hi {
                let n = Vec3::new(ox + dir.x * t, 0.0, oz + dir.z * t) / c.radius;
                consider(t, n);
            }
        }
    }
    if dir.y.abs() > 1e-8 {
        for (plane, n) in [(y_hi, Vec3::Y), (y_lo, Vec3::NEG_Y)] {
            // Only the cap facing the ray can be an entry.
            if n.y * dir.y >= 0.0 {
                continue;
            }
            let t = (plane - origin.y) / dir.y;
            let px = ox + dir.x * t;
            let pz = oz + dir.z * t;
            if px * px + pz * pz <= r2 {
                consider(t, n);
            }
        }
    }
    best
}

fn ray_shape_enter(origin: Vec3, dir: Vec3, shape: &ShapeRef, max_t: f32) -> Option<(f32, Vec3)> {
    match shape {
        ShapeRef::Box(b) => ray_aabb_enter(origin, dir, b, max_t),
        ShapeRef::Cyl(c) => ray_cylinder_enter(origin, dir, c, max_t),
    }
}

fn inflate(shape: &ShapeRef, r: f32) -> ShapeRef {
    match *shape {
        ShapeRef::Box(b) => ShapeRef::Box(b.expand(r)),
        ShapeRef::Cyl(c) => ShapeRef::Cyl(CylinderY {
            center: c.center,
            radius: c.radius + r,
            half_height: c.half_height + r,
        }),
    }
}

impl SpatialQuery for StaticIndex {
    fn sphere_cast(
        &self,
        origin: Vec3,
        radius: f32,
        dir: Vec3,
        max_dist: f32,
        mask: LayerMask,
    ) -> Option<CastHit> {
        let dir = dir.normalize_or_zero();
        if dir == Vec3::ZERO || max_dist <= 0.0 {
            return None;
        }
        let mut best: Option<CastHit> = None;
        for c in self.in_mask(mask) {
            let grown = inflate(&c.shape, radius);
            if let Some((t, n)) = ray_shape_enter(origin, dir, &grown, max_dist)
                && best.is_none_or(|b| t < b.distance)
            {
                best = Some(CastHit {
                    collider: c.id,
                    distance: t,
                    point: origin + dir * t,
                    normal: n,
                });
            }
        }
        best
    }

    fn raycast_all(
        &self,
        origin: Vec3,
        dir: Vec3,
        max_dist: f32,
        mask: LayerMask,
    ) -> SmallVec<[CastHit; 8]> {
        let mut hits: SmallVec<[CastHit; 8]> = SmallVec::new();
        let dir = dir.normalize_or_zero();
        if dir == Vec3::ZERO || max_dist <= 0.0 {
            return hits;
        }
        for c in self.in_mask(mask) {
            if let Some((t, n)) = ray_shape_enter(origin, dir, &c.shape, max_dist) {
                hits.push(CastHit {
                    collider: c.id,
                    distance: t,
                    point: origin + dir * t,
                    normal: n,
                });
            }
        }
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }

    fn overlap_sphere(
        &self,
        center: Vec3,
        radius: f32,
        mask: LayerMask,
    ) -> SmallVec<[ColliderId; 8]> {
        let r2 = radius * radius;
        self.in_mask(mask)
            .filter(|c| (c.shape.closest_point(center) - center).length_squared() <= r2)
            .map(|c| c.id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers;
    use approx::assert_abs_diff_eq;

    fn wall_at_z(z: f32) -> ShapeRef {
        ShapeRef::Box(Aabb {
            min: Vec3::new(-5.0, -5.0, z),
            max: Vec3::new(5.0, 5.0, z + 1.0),
        })
    }

    #[test]
    fn slab_entry_reports_face_normal() {
        let b = Aabb {
            min: Vec3::new(-1.0, -1.0, 4.0),
            max: Vec3::new(1.0, 1.0, 6.0),
        };
        let (t, n) = ray_aabb_enter(Vec3::ZERO, Vec3::Z, &b, 100.0).expect("hit");
        assert_abs_diff_eq!(t, 4.0, epsilon = 1e-6);
        assert_eq!(n, Vec3::NEG_Z);
        assert!(ray_aabb_enter(Vec3::ZERO, Vec3::Z, &b, 3.0).is_none());
        assert!(ray_aabb_enter(Vec3::new(0.0, 0.0, 5.0), Vec3::Z, &b, 100.0).is_none());
    }

    #[test]
    fn cylinder_side_and_cap_entries() {
        let c = CylinderY {
            center: Vec3::new(0.0, 0.0, 5.0),
            radius: 1.0,
            half_height: 2.0,
        };
        let (t, n) = ray_cylinder_enter(Vec3::ZERO, Vec3::Z, &c, 100.0).expect("side");
        assert_abs_diff_eq!(t, 4.0, epsilon = 1e-5);
        assert_abs_diff_eq!(n.z, -1.0, epsilon = 1e-5);
        let (t, n) = ray_cylinder_enter(Vec3::new(0.0, 10.0, 5.0), Vec3::NEG_Y, &c, 100.0)
            .expect("cap");
        assert_abs_diff_eq!(t, 8.0, epsilon = 1e-5);
        assert_eq!(n, Vec3::Y);
    }

    #[test]
    fn sphere_cast_stops_radius_short_of_surface() {
        let mut idx = StaticIndex::new();
        idx.push(layers::DEFAULT, wall_at_z(10.0));
        let hit = idx
            .sphere_cast(Vec3::ZERO, 0.5, Vec3::Z, 20.0, LayerMask::solid_probe())
            .expect("hit");
        assert_abs_diff_eq!(hit.distance, 9.5, epsilon = 1e-5);
    }

    #[test]
    fn sphere_cast_respects_mask() {
        let mut idx = StaticIndex::new();
        idx.push(layers::THIN, wall_at_z(10.0));
        idx.push(layers::ACTOR, wall_at_z(3.0));
        assert!(
            idx.sphere_cast(Vec3::ZERO, 0.2, Vec3::Z, 20.0, LayerMask::solid_probe())
                .is_none()
        );
    }

    #[test]
    fn raycast_all_sorts_nearest_first() {
        let mut idx = StaticIndex::new();
        let far = idx.push(layers::THIN, wall_at_z(12.0));
        let near = idx.push(layers::THIN, wall_at_z(6.0));
        let hits = idx.raycast_all(Vec3::ZERO, Vec3::Z, 20.0, LayerMask::thin());
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].collider, near);
        assert_eq!(hits[1].collider, far);
    }

    #[test]
    fn overlap_sphere_finds_touching_thin_pole() {
        let mut idx = StaticIndex::new();
        let pole = idx.push(
            layers::THIN,
            ShapeRef::Cyl(CylinderY {
                center: Vec3::new(0.1, 0.0, 10.0),
                radius: 0.05,
                half_height: 3.0,
            }),
        );
        let found = idx.overlap_sphere(Vec3::new(0.0, 0.0, 10.0), 0.2, LayerMask::thin());
        assert_eq!(found.as_slice(), &[pole]);
        let none = idx.overlap_sphere(Vec3::new(0.0, 0.0, 10.0), 0.2, LayerMask::solid_probe());
        assert!(none.is_empty());
    }
}

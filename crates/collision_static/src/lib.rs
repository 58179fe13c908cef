//! collision_static: layered static colliders (AABB boxes, Y-up cylinders),
//! spatial probes for the follow camera, and a capsule move-and-slide resolver.
//!
//! Everything here is static world geometry. The character itself is not a
//! collider in the index; its capsule is only used as the query shape for
//! `CapsuleMover`.

use glam::Vec3;
use serde::{Deserialize, Serialize};

pub mod probe;
pub mod slide;

pub use probe::{CastHit, SpatialQuery};
pub use slide::{CapsuleMover, CharacterMover, OpenSpace, SlideOutcome};

/// Well-known collision layers.
pub mod layers {
    /// Ordinary solid world geometry.
    pub const DEFAULT: u8 = 0;
    /// The controlled actor's own layer (never blocks its camera).
    pub const ACTOR: u8 = 1;
    /// Geometry too thin for a swept-sphere probe (poles, railings, wires).
    pub const THIN: u8 = 2;
}

/// Bit set of collision layers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct LayerMask(pub u32);

impl LayerMask {
    pub const NONE: Self = Self(0);
    pub const ALL: Self = Self(u32::MAX);

    #[must_use]
    pub const fn layer(index: u8) -> Self {
        Self(1 << index)
    }

    #[must_use]
    pub const fn without(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }

    #[must_use]
    pub const fn contains(self, layer: u8) -> bool {
        self.0 & (1 << layer) != 0
    }

    /// Everything that blocks the camera's swept probe: all layers except the
    /// actor's own and the thin layer.
    #[must_use]
    pub const fn solid_probe() -> Self {
        Self::ALL
            .without(Self::layer(layers::ACTOR))
            .without(Self::layer(layers::THIN))
    }

    #[must_use]
    pub const fn thin() -> Self {
        Self::layer(layers::THIN)
    }

    /// Everything the character capsule collides with.
    #[must_use]
    pub const fn movement() -> Self {
        Self::ALL.without(Self::layer(layers::ACTOR))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CylinderY {
    pub center: Vec3,
    pub radius: f32,
    pub half_height: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    #[must_use]
    pub fn contains(&self, p: Vec3) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }

    #[must_use]
    pub fn expand(&self, eps: f32) -> Aabb {
        Aabb {
            min: self.min - Vec3::splat(eps),
            max: self.max + Vec3::splat(eps),
        }
    }

    #[must_use]
    pub fn overlaps(&self, b: &Aabb) -> bool {
        !(self.max.x < b.min.x
            || self.min.x > b.max.x
            || self.max.y < b.min.y
            || self.min.y > b.max.y
            || self.max.z < b.min.z
            || self.min.z > b.max.z)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum ShapeRef {
    Cyl(CylinderY),
    Box(Aabb),
}

impl ShapeRef {
    /// World-space bounds used as the broadphase reject.
    #[must_use]
    pub fn bounds(&self) -> Aabb {
        match *self {
            ShapeRef::Box(b) => b,
            ShapeRef::Cyl(c) => Aabb {
                min: c.center - Vec3::new(c.radius, c.half_height, c.radius),
                max: c.center + Vec3::new(c.radius, c.half_height, c.radius),
            },
        }
    }

    /// Closest point on (or inside) the solid shape to `p`.
    #[must_use]
    pub fn closest_point(&self, p: Vec3) -> Vec3 {
        match *self {
            ShapeRef::Box(b) => p.clamp(b.min, b.max),
            ShapeRef::Cyl(c) => {
                let y = p.y.clamp(c.center.y - c.half_height, c.center.y + c.half_height);
                let dx = p.x - c.center.x;
                let dz = p.z - c.center.z;
                let d = (dx * dx + dz * dz).sqrt();
                let (x, z) = if d > c.radius {
                    (c.center.x + dx / d * c.radius, c.center.z + dz / d * c.radius)
                } else {
                    (p.x, p.z)
                };
                Vec3::new(x, y, z)
            }
        }
    }

    /// For a point inside the shape: the outward direction of the shallowest
    /// exit and the distance to the surface along it.
    #[must_use]
    pub fn exit_direction(&self, p: Vec3) -> (Vec3, f32) {
        match *self {
            ShapeRef::Box(b) => {
                let faces = [
                    (Vec3::NEG_X, p.x - b.min.x),
                    (Vec3::X, b.max.x - p.x),
                    (Vec3::NEG_Y, p.y - b.min.y),
                    (Vec3::Y, b.max.y - p.y),
                    (Vec3::NEG_Z, p.z - b.min.z),
                    (Vec3::Z, b.max.z - p.z),
                ];
                let mut best = faces[0];
                for f in faces {
                    if f.1 < best.1 {
                        best = f;
                    }
                }
                (best.0, best.1.max(0.0))
            }
            ShapeRef::Cyl(c) => {
                let dx = p.x - c.center.x;
                let dz = p.z - c.center.z;
                let d = (dx * dx + dz * dz).sqrt();
                let radial = c.radius - d;
                let top = c.center.y + c.half_height - p.y;
                let bottom = p.y - (c.center.y - c.half_height);
                if top <= radial && top <= bottom {
                    (Vec3::Y, top.max(0.0))
                } else if bottom <= radial {
                    (Vec3::NEG_Y, bottom.max(0.0))
                } else if d > 1e-6 {
                    (Vec3::new(dx / d, 0.0, dz / d), radial.max(0.0))
                } else {
                    (Vec3::X, radial.max(0.0))
                }
            }
        }
    }
}

/// Stable index of a collider inside a `StaticIndex`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColliderId(pub u32);

#[derive(Clone, Copy, Debug)]
pub struct StaticCollider {
    pub id: ColliderId,
    pub layer: u8,
    pub aabb: Aabb,
    pub shape: ShapeRef,
}

#[derive(Clone, Debug, Default)]
pub struct StaticIndex {
    pub colliders: Vec<StaticCollider>,
}

impl StaticIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a collider on `layer`; ids are assigned in insertion order.
    pub fn push(&mut self, layer: u8, shape: ShapeRef) -> ColliderId {
        let id = ColliderId(u32::try_from(self.colliders.len()).unwrap_or(u32::MAX));
        self.colliders.push(StaticCollider {
            id,
            layer,
            aabb: shape.bounds(),
            shape,
        });
        id
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.colliders.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.colliders.is_empty()
    }

    pub(crate) fn in_mask(&self, mask: LayerMask) -> impl Iterator<Item = &StaticCollider> {
        self.colliders.iter().filter(move |c| mask.contains(c.layer))
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Capsule {
    pub p0: Vec3,
    pub p1: Vec3,
    pub radius: f32,
}

impl Capsule {
    #[must_use]
    pub fn aabb(&self) -> Aabb {
        Aabb {
            min: self.p0.min(self.p1) - Vec3::splat(self.radius),
            max: self.p0.max(self.p1) + Vec3::splat(self.radius),
        }
    }

    #[must_use]
    pub fn translated(&self, by: Vec3) -> Capsule {
        Capsule {
            p0: self.p0 + by,
            p1: self.p1 + by,
            radius: self.radius,
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Hit {
    pub normal: Vec3,
    pub depth: f32,
}

/// Penetration of a capsule into a convex shape, if any.
///
/// The distance from a point to a convex solid is convex along a segment, so a
/// ternary search over the capsule axis finds the closest pair.
#[must_use]
pub fn capsule_vs_shape(cap: &Capsule, shape: &ShapeRef) -> Option<Hit> {
    let axis = cap.p1 - cap.p0;
    let dist_at = |t: f32| {
        let p = cap.p0 + axis * t;
        (p - shape.closest_point(p)).length_squared()
    };
    let (mut lo, mut hi) = (0.0f32, 1.0f32);
    for _ in 0..32 {
        let m1 = lo + (hi - lo) / 3.0;
        let m2 = hi - (hi - lo) / 3.0;
        if dist_at(m1) <= dist_at(m2) {
            hi = m2;
        } else {
            lo = m1;
        }
    }
    let seg_pt = cap.p0 + axis * ((lo + hi) * 0.5);
    let shape_pt = shape.closest_point(seg_pt);
    let d = seg_pt - shape_pt;
    let dist = d.length();
    if dist >= cap.radius {
        return None;
    }
    if dist > 1e-6 {
        Some(Hit {
            normal: d / dist,
            depth: cap.radius - dist,
        })
    } else {
        // Capsule core is inside the solid.
        let (normal, pen) = shape.exit_direction(seg_pt);
        Some(Hit {
            normal,
            depth: pen + cap.radius,
        })
    }
}

/// Collect capsule penetrations against colliders in `mask`.
pub fn capsule_vs_static_overlap(
    cap: &Capsule,
    idx: &StaticIndex,
    mask: LayerMask,
    out: &mut smallvec::SmallVec<[Hit; 8]>,
) {
    let query = cap.aabb().expand(0.01);
    for c in idx.in_mask(mask) {
        if !c.aabb.overlaps(&query) {
            continue;
        }
        if let Some(h) = capsule_vs_shape(cap, &c.shape) {
            out.push(h);
        }
    }
}

//! Capsule move-and-slide against the static index.
//!
//! The displacement is split into sub-steps no longer than half the capsule
//! radius, each followed by iterative push-out along the deepest contact.
//! Velocity loses its component into every contact normal it was pushed by.

use glam::Vec3;
use smallvec::SmallVec;

use crate::{Capsule, Hit, LayerMask, StaticIndex, capsule_vs_static_overlap};

/// Contact normals steeper than this (by `normal.y`) count as ground.
pub const GROUND_NORMAL_Y: f32 = 0.7;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SlideOutcome {
    pub position: Vec3,
    pub velocity: Vec3,
    pub grounded: bool,
}

/// Moves a body with collision response. `position` is the body's feet.
pub trait CharacterMover {
    fn move_and_slide(&self, position: Vec3, velocity: Vec3, dt: f32) -> SlideOutcome;
}

/// Mover with no world at all: plain integration.
#[derive(Clone, Copy, Debug, Default)]
pub struct OpenSpace;

impl CharacterMover for OpenSpace {
    fn move_and_slide(&self, position: Vec3, velocity: Vec3, dt: f32) -> SlideOutcome {
        SlideOutcome {
            position: position + velocity * dt,
            velocity,
            grounded: false,
        }
    }
}

/// Upright capsule resolved against the movement layers of a `StaticIndex`.
#[derive(Clone, Copy, Debug)]
pub struct CapsuleMover<'a> {
    pub index: &'a StaticIndex,
    pub radius: f32,
    pub height: f32,
    pub max_iters: u32,
}

impl<'a> CapsuleMover<'a> {
    #[must_use]
    pub fn new(index: &'a StaticIndex, radius: f32, height: f32) -> Self {
        Self {
            index,
            radius,
            height: height.max(radius * 2.0),
            max_iters: 4,
        }
    }

    fn capsule_at(&self, feet: Vec3) -> Capsule {
        Capsule {
            p0: feet + Vec3::Y * self.radius,
            p1: feet + Vec3::Y * (self.height - self.radius),
            radius: self.radius,
        }
    }

    /// Push the capsule out of overlaps. Returns the corrected feet position
    /// and the normals applied.
    pub fn resolve(&self, feet: Vec3, normals: &mut SmallVec<[Vec3; 8]>) -> Vec3 {
        let mut pos = feet;
        for _ in 0..self.max_iters {
            let mut hits: SmallVec<[Hit; 8]> = SmallVec::new();
            capsule_vs_static_overlap(
                &self.capsule_at(pos),
                self.index,
                LayerMask::movement(),
                &mut hits,
            );
            let mut best = Hit::default();
            for h in hits {
                if h.depth > best.depth {
                    best = h;
                }
            }
            if best.depth <= 1e-4 {
                break;
            }
            pos += best.normal * best.depth;
            normals.push(best.normal);
        }
        pos
    }
}

impl CharacterMover for CapsuleMover<'_> {
    fn move_and_slide(&self, position: Vec3, velocity: Vec3, dt: f32) -> SlideOutcome {
        let delta = velocity * dt;
        let max_step = (self.radius * 0.5).max(1e-3);
        // Float-to-int: bounded by the clamp.
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let steps = (delta.length() / max_step).ceil().clamp(1.0, 64.0) as u32;
        #[allow(clippy::cast_precision_loss)]
        let step = delta / steps as f32;

        let mut pos = position;
        let mut normals: SmallVec<[Vec3; 8]> = SmallVec::new();
        for _ in 0..steps {
            pos = self.resolve(pos + step, &mut normals);
        }

        let mut vel = velocity;
        let mut grounded = false;
        for n in &normals {
            let into = vel.dot(*n);
            if into < 0.0 {
                vel -= *n * into;
            }
            if n.y > GROUND_NORMAL_Y {
                grounded = true;
            }
        }
        SlideOutcome {
            position: pos,
            velocity: vel,
            grounded,
        }
    }
}

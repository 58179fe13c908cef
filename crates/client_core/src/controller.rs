//! Character locomotion integrator: camera-relative walking/sprinting, yaw
//! that turns towards the camera while moving, jump and gravity, with the
//! collision response delegated to a `CharacterMover`.

use collision_static::CharacterMover;
use data_runtime::configs::character::CharacterCfg;
use glam::{EulerRot, Quat, Vec3};

use crate::input::ControlFrame;
use crate::smoothing::smooth_damp_angle;
use crate::snapshot::PlayerSnapshot;

pub const GRAVITY: f32 = -9.81;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Quat,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CharacterState {
    pub position: Vec3,
    /// Degrees, unbounded.
    pub yaw_deg: f32,
    pub rotation: Quat,
    pub velocity: Vec3,
    pub yaw_velocity: f32,
    pub grounded: bool,
}

#[derive(Clone, Debug)]
pub struct PlayerController {
    cfg: CharacterCfg,
    state: CharacterState,
    /// Pose at the previous and latest tick, for render interpolation.
    previous: Pose,
    current: Pose,
    visual: Pose,
}

fn yaw_rotation(yaw_deg: f32) -> Quat {
    Quat::from_rotation_y(yaw_deg.to_radians())
}

impl PlayerController {
    #[must_use]
    pub fn new(cfg: CharacterCfg, spawn: Vec3) -> Self {
        let pose = Pose {
            position: spawn,
            rotation: Quat::IDENTITY,
        };
        Self {
            cfg,
            state: CharacterState {
                position: spawn,
                yaw_deg: 0.0,
                rotation: Quat::IDENTITY,
                velocity: Vec3::ZERO,
                yaw_velocity: 0.0,
                grounded: false,
            },
            previous: pose,
            current: pose,
            visual: pose,
        }
    }

    #[must_use]
    pub fn state(&self) -> &CharacterState {
        &self.state
    }

    #[must_use]
    pub fn cfg(&self) -> &CharacterCfg {
        &self.cfg
    }

    #[must_use]
    pub fn preset_name(&self) -> &str {
        &self.cfg.preset
    }

    /// Interpolated pose from the last `visual_pose` call.
    #[must_use]
    pub fn visual(&self) -> Pose {
        self.visual
    }

    /// Advance one fixed tick.
    pub fn tick(
        &mut self,
        frame: &ControlFrame,
        camera_yaw_deg: f32,
        dt: f32,
        mover: &dyn CharacterMover,
    ) {
        let cfg = &self.cfg;
        let s = &mut self.state;

        let speed = if frame.sprint_held {
            cfg.sprint_speed
        } else {
            cfg.walk_speed
        };

        // Movement basis from the rotation before this tick's turn.
        let right = s.rotation * Vec3::X;
        let forward = s.rotation * Vec3::Z;
        let (target_yaw, dir) = if frame.has_move() {
            (
                camera_yaw_deg,
                right * frame.move_input.x + forward * frame.move_input.y,
            )
        } else {
            (s.yaw_deg, Vec3::ZERO)
        };

        s.yaw_deg = smooth_damp_angle(
            s.yaw_deg,
            target_yaw,
            &mut s.yaw_velocity,
            cfg.yaw_smooth_time,
            f32::INFINITY,
            dt,
        );
        s.rotation = yaw_rotation(s.yaw_deg);

        s.velocity.x = dir.x * speed;
        s.velocity.z = dir.z * speed;

        if frame.jump_pressed {
            s.velocity.y = (cfg.jump_height * 2.0 * GRAVITY.abs() * cfg.gravity_factor).sqrt();
        }
        s.velocity.y += GRAVITY * cfg.gravity_factor * dt;

        let out = mover.move_and_slide(s.position, s.velocity, dt);
        s.position = out.position;
        s.velocity = out.velocity;
        s.grounded = out.grounded;

        self.previous = self.current;
        self.current = Pose {
            position: s.position,
            rotation: s.rotation,
        };
    }

    /// Interpolate between the last two tick poses. `alpha_raw` is the time
    /// since the last tick over the tick interval.
    pub fn visual_pose(&mut self, alpha_raw: f32) -> Pose {
        let a_pos = (alpha_raw * self.cfg.position_smooth_factor).clamp(0.0, 1.0);
        let a_rot = (alpha_raw * self.cfg.rotation_smooth_factor).clamp(0.0, 1.0);
        self.visual = Pose {
            position: self.previous.position.lerp(self.current.position, a_pos),
            rotation: self.previous.rotation.slerp(self.current.rotation, a_rot),
        };
        self.visual
    }

    #[must_use]
    pub fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            position: self.state.position,
            rotation: self.state.rotation,
            velocity: self.state.velocity,
        }
    }

    /// Teleport to a stored state; yaw smoothing and interpolation restart.
    pub fn apply_snapshot(&mut self, snap: &PlayerSnapshot) {
        let (yaw, _, _) = snap.rotation.to_euler(EulerRot::YXZ);
        let s = &mut self.state;
        s.position = snap.position;
        s.yaw_deg = yaw.to_degrees();
        s.rotation = snap.rotation;
        s.velocity = snap.velocity;
        s.yaw_velocity = 0.0;
        let pose = Pose {
            position: s.position,
            rotation: s.rotation,
        };
        self.previous = pose;
        self.current = pose;
        self.visual = pose;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use collision_static::OpenSpace;
    use glam::Vec2;

    fn forward() -> ControlFrame {
        ControlFrame {
            move_input: Vec2::new(0.0, 1.0),
            ..Default::default()
        }
    }

    #[test]
    fn idle_does_not_turn_towards_camera() {
        let mut pc = PlayerController::new(CharacterCfg::default(), Vec3::ZERO);
        pc.tick(&ControlFrame::default(), 90.0, 0.02, &OpenSpace);
        assert_eq!(pc.state().yaw_deg, 0.0);
    }

    #[test]
    fn moving_turns_towards_camera_yaw() {
        let mut pc = PlayerController::new(CharacterCfg::default(), Vec3::ZERO);
        for _ in 0..100 {
            pc.tick(&forward(), 90.0, 0.02, &OpenSpace);
        }
        assert_abs_diff_eq!(pc.state().yaw_deg, 90.0, epsilon = 1e-2);
        // Now walking along +X.
        assert_abs_diff_eq!(pc.state().velocity.x, 5.0, epsilon = 1e-2);
    }

    #[test]
    fn first_tick_moves_along_pre_turn_basis() {
        let mut pc = PlayerController::new(CharacterCfg::default(), Vec3::ZERO);
        pc.tick(&forward(), 90.0, 0.02, &OpenSpace);
        assert_abs_diff_eq!(pc.state().velocity.z, 5.0, epsilon = 1e-5);
        assert_abs_diff_eq!(pc.state().velocity.x, 0.0, epsilon = 1e-5);
    }

    #[test]
    fn sprint_uses_sprint_speed() {
        let mut pc = PlayerController::new(CharacterCfg::default(), Vec3::ZERO);
        let f = ControlFrame {
            sprint_held: true,
            ..forward()
        };
        pc.tick(&f, 0.0, 0.02, &OpenSpace);
        assert_abs_diff_eq!(pc.state().velocity.z, 8.0, epsilon = 1e-5);
    }

    #[test]
    fn visual_pose_interpolates_between_ticks() {
        let mut pc = PlayerController::new(CharacterCfg::default(), Vec3::ZERO);
        pc.tick(&forward(), 0.0, 0.02, &OpenSpace);
        let prev_z = 0.0;
        let cur_z = pc.state().position.z;
        let mid = pc.visual_pose(0.5);
        assert_abs_diff_eq!(mid.position.z, (prev_z + cur_z) * 0.5, epsilon = 1e-6);
        let end = pc.visual_pose(3.0);
        assert_abs_diff_eq!(end.position.z, cur_z, epsilon = 1e-6);
    }

    #[test]
    fn apply_snapshot_collapses_interpolation() {
        let mut pc = PlayerController::new(CharacterCfg::default(), Vec3::ZERO);
        let snap = PlayerSnapshot {
            position: Vec3::new(3.0, 1.0, -2.0),
            rotation: Quat::from_rotation_y(45f32.to_radians()),
            velocity: Vec3::new(0.0, 2.0, 0.0),
        };
        pc.apply_snapshot(&snap);
        assert_abs_diff_eq!(pc.state().yaw_deg, 45.0, epsilon = 1e-3);
        assert_eq!(pc.visual_pose(0.3).position, snap.position);
        assert_eq!(pc.snapshot().velocity, snap.velocity);
    }
}

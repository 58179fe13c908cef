//! Third-person follow camera: orbit (yaw/pitch) driven by look input, a
//! zoomable boom, and occlusion-aware boom shortening.
//!
//! Input is applied per tick. Orbit smoothing also runs per tick by default
//! (`OrbitClock::Tick`): the character steers by the smoothed yaw, so a
//! frame-clocked orbit would make replays depend on the render frame rate.
//! `OrbitClock::Frame` moves it into `frame_update`.
//!
//! The boom length and pose are resolved per frame: the boom snaps in when
//! geometry cuts it shorter than the current distance, otherwise it eases
//! towards the occlusion-limited length.

use collision_static::SpatialQuery;
use data_runtime::configs::camera::{CameraCfg, OrbitClock};
use glam::{EulerRot, Quat, Vec3};

use crate::input::ControlFrame;
use crate::smoothing::{lerp, smooth_damp_angle};
use crate::snapshot::CameraSnapshot;
use crate::systems::occlusion::{OcclusionResult, resolve_zoom};

/// Inputs below this magnitude are ignored.
pub const DEADZONE: f32 = 0.01;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraState {
    pub yaw_deg: f32,
    pub target_yaw_deg: f32,
    pub pitch_deg: f32,
    pub target_pitch_deg: f32,
    /// Rendered boom length.
    pub zoom: f32,
    /// Desired boom length before occlusion.
    pub target_zoom: f32,
    pub yaw_velocity: f32,
    pub pitch_velocity: f32,
    pub rotation: Quat,
    pub position: Vec3,
    pub occlusion: OcclusionResult,
}

#[must_use]
pub fn orbit_rotation(yaw_deg: f32, pitch_deg: f32) -> Quat {
    Quat::from_euler(EulerRot::YXZ, yaw_deg.to_radians(), pitch_deg.to_radians(), 0.0)
}

#[derive(Clone, Debug)]
pub struct FollowCamera {
    cfg: CameraCfg,
    state: CameraState,
}

impl FollowCamera {
    /// Camera at the configured initial orbit, looking at `anchor`.
    #[must_use]
    pub fn new(cfg: CameraCfg, anchor: Vec3) -> Self {
        let pitch = cfg
            .initial_pitch
            .clamp(cfg.min_vertical_angle, cfg.max_vertical_angle);
        let zoom = cfg.initial_zoom.clamp(cfg.min_zoom, cfg.max_zoom);
        let rotation = orbit_rotation(cfg.initial_yaw, pitch);
        let state = CameraState {
            yaw_deg: cfg.initial_yaw,
            target_yaw_deg: cfg.initial_yaw,
            pitch_deg: pitch,
            target_pitch_deg: pitch,
            zoom,
            target_zoom: zoom,
            yaw_velocity: 0.0,
            pitch_velocity: 0.0,
            rotation,
            position: anchor - rotation * Vec3::Z * zoom,
            occlusion: OcclusionResult::clear(zoom),
        };
        Self { cfg, state }
    }

    #[must_use]
    pub fn state(&self) -> &CameraState {
        &self.state
    }

    #[must_use]
    pub fn cfg(&self) -> &CameraCfg {
        &self.cfg
    }

    #[must_use]
    pub fn preset_name(&self) -> &str {
        &self.cfg.preset
    }

    /// Yaw the character steers by.
    #[must_use]
    pub fn logical_yaw(&self) -> f32 {
        self.state.yaw_deg
    }

    #[must_use]
    pub fn forward(&self) -> Vec3 {
        self.state.rotation * Vec3::Z
    }

    /// Apply one tick of look/zoom input.
    pub fn tick(&mut self, frame: &ControlFrame, dt: f32) {
        let s = &mut self.state;
        let look = frame.look_input;
        if look.x.abs() > DEADZONE {
            s.target_yaw_deg = s.yaw_deg + look.x * self.cfg.mouse_sensitivity;
        }
        if look.y.abs() > DEADZONE {
            s.target_pitch_deg = s.pitch_deg - look.y * self.cfg.mouse_sensitivity;
        }
        if frame.zoom_input.abs() > DEADZONE {
            s.target_zoom = (s.target_zoom - frame.zoom_input * self.cfg.zoom_sensitivity)
                .clamp(self.cfg.min_zoom, self.cfg.max_zoom);
        }
        if self.cfg.orbit_clock == OrbitClock::Tick {
            self.advance_orbit(dt);
        }
    }

    fn advance_orbit(&mut self, dt: f32) {
        let s = &mut self.state;
        let st = self.cfg.rotation_smooth_time;
        s.yaw_deg = smooth_damp_angle(
            s.yaw_deg,
            s.target_yaw_deg,
            &mut s.yaw_velocity,
            st,
            f32::INFINITY,
            dt,
        );
        let pitch = smooth_damp_angle(
            s.pitch_deg,
            s.target_pitch_deg,
            &mut s.pitch_velocity,
            st,
            f32::INFINITY,
            dt,
        );
        s.pitch_deg = pitch.clamp(self.cfg.min_vertical_angle, self.cfg.max_vertical_angle);
    }

    /// Resolve pose for a render frame following `anchor`.
    pub fn frame_update(
        &mut self,
        anchor: Vec3,
        dt: f32,
        world: Option<&dyn SpatialQuery>,
    ) -> OcclusionResult {
        if self.cfg.orbit_clock == OrbitClock::Frame {
            self.advance_orbit(dt);
        }
        let s = &mut self.state;
        s.rotation = orbit_rotation(s.yaw_deg, s.pitch_deg);
        let forward = s.rotation * Vec3::Z;
        let occ = resolve_zoom(world, anchor, forward, s.target_zoom, self.cfg.camera_radius);
        s.zoom = if occ.is_occluded() && occ.final_zoom < s.zoom {
            occ.final_zoom
        } else {
            lerp(s.zoom, occ.final_zoom, dt * self.cfg.zoom_smooth_factor)
        };
        s.position = anchor - forward * s.zoom;
        s.occlusion = occ;
        occ
    }

    /// Rotation reflects the latest orbit angles even if no frame has been
    /// resolved since the last tick.
    #[must_use]
    pub fn snapshot(&self) -> CameraSnapshot {
        CameraSnapshot {
            position: self.state.position,
            rotation: orbit_rotation(self.state.yaw_deg, self.state.pitch_deg),
            zoom: self.state.target_zoom,
        }
    }

    /// Jump straight to a stored pose; all smoothing state is reset. Pitch
    /// and zoom are clamped to this camera's ranges.
    pub fn apply_snapshot(&mut self, snap: &CameraSnapshot) {
        let (yaw, pitch, _roll) = snap.rotation.to_euler(EulerRot::YXZ);
        let s = &mut self.state;
        s.yaw_deg = yaw.to_degrees();
        s.target_yaw_deg = s.yaw_deg;
        s.pitch_deg = pitch
            .to_degrees()
            .clamp(self.cfg.min_vertical_angle, self.cfg.max_vertical_angle);
        s.target_pitch_deg = s.pitch_deg;
        s.target_zoom = snap.zoom.clamp(self.cfg.min_zoom, self.cfg.max_zoom);
        s.zoom = s.target_zoom;
        s.yaw_velocity = 0.0;
        s.pitch_velocity = 0.0;
        s.rotation = orbit_rotation(s.yaw_deg, s.pitch_deg);
        s.position = snap.position;
        s.occlusion = OcclusionResult::clear(s.target_zoom);
    }
}

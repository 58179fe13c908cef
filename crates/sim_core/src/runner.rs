//! Frame scheduler: owns every component and runs the fixed phase order
//! sample → tick(s) → render-smooth → end-of-frame.
//!
//! Within a tick: consume the live frame, apply mode toggles and their side
//! effects, pick the frame source, record, camera tick, character tick,
//! telemetry row, playback exhaustion.

use std::rc::Rc;

use client_core::controller::PlayerController;
use client_core::input::{ControlFrame, InputDevice, InputSampler};
use client_core::systems::camera::FollowCamera;
use client_core::systems::mode::{
    FrameSource, ModeController, ModeTransition, SimulationMode, TransitionReason,
};
use client_core::systems::occlusion::OcclusionResult;
use collision_static::{CapsuleMover, OpenSpace, SpatialQuery, StaticIndex};
use data_runtime::ConfigSet;
use data_runtime::world::WorldLayout;
use glam::Vec3;
use tracing::{debug, error, info, warn};

use crate::export::{CsvExporter, TelemetryRow};
use crate::replay::{PlaybackDriver, RecordStore};
use crate::storage::Storage;

/// Per-tick state captured for replay verification.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickSample {
    pub tick: u64,
    /// Mode in effect when the frame was consumed.
    pub mode: SimulationMode,
    pub source: FrameSource,
    pub position: Vec3,
    pub velocity: Vec3,
    pub yaw_deg: f32,
    pub camera_yaw_deg: f32,
    pub camera_pitch_deg: f32,
    pub target_zoom: f32,
}

impl TickSample {
    /// Largest absolute difference across the compared quantities.
    #[must_use]
    pub fn max_abs_diff(&self, other: &TickSample) -> f32 {
        let d = [
            (self.position - other.position).abs().max_element(),
            (self.velocity - other.velocity).abs().max_element(),
            (self.yaw_deg - other.yaw_deg).abs(),
            (self.camera_yaw_deg - other.camera_yaw_deg).abs(),
            (self.camera_pitch_deg - other.camera_pitch_deg).abs(),
            (self.target_zoom - other.target_zoom).abs(),
        ];
        d.into_iter().fold(0.0, f32::max)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FrameReport {
    pub frame: u64,
    pub ticks: u32,
    /// Seconds of backlog discarded because of the per-frame tick cap.
    pub dropped_backlog: f32,
    pub mode: SimulationMode,
    /// Fraction of a tick elapsed since the last one.
    pub alpha: f32,
    pub occlusion: OcclusionResult,
}

pub struct Simulation {
    cfg: ConfigSet,
    tick_dt: f32,
    sampler: InputSampler,
    mode: ModeController,
    character: PlayerController,
    camera: FollowCamera,
    world: Option<StaticIndex>,
    store: RecordStore,
    playback: PlaybackDriver,
    exporter: CsvExporter,
    accumulator: f32,
    tick_count: u64,
    frame_count: u64,
    /// Ticks since the current telemetry export began.
    export_tick: u64,
    trajectory: Option<Vec<TickSample>>,
}

impl Simulation {
    /// Without `storage` recording, playback and CSV export are disabled.
    /// Without `world` the character moves in open space and the camera is
    /// never occluded.
    #[must_use]
    pub fn new(
        cfg: ConfigSet,
        world: Option<&WorldLayout>,
        storage: Option<Rc<dyn Storage>>,
    ) -> Self {
        let (store, exporter) = if let Some(st) = storage {
            (RecordStore::new(Rc::clone(&st)), CsvExporter::new(st))
        } else {
            error!(target: "sim", "no storage configured; record/playback disabled");
            (RecordStore::disabled(), CsvExporter::disabled())
        };
        let spawn = world.map_or(Vec3::ZERO, WorldLayout::spawn);
        if world.is_none() {
            warn!(target: "sim", "no world layout; open space, no camera occlusion");
        }
        let character = PlayerController::new(cfg.character.clone(), spawn);
        let anchor = spawn + Vec3::Y * cfg.camera.target_height;
        let camera = FollowCamera::new(cfg.camera.clone(), anchor);
        info!(
            target: "sim",
            tick_hz = cfg.sim.tick_hz,
            character = %cfg.character.preset,
            camera = %cfg.camera.preset,
            colliders = world.map_or(0, |w| w.colliders.len()),
            "simulation ready"
        );
        Self {
            tick_dt: cfg.sim.tick_dt(),
            cfg,
            sampler: InputSampler::new(),
            mode: ModeController::new(),
            character,
            camera,
            world: world.map(WorldLayout::build_index),
            store,
            playback: PlaybackDriver::new(),
            exporter,
            accumulator: 0.0,
            tick_count: 0,
            frame_count: 0,
            export_tick: 0,
            trajectory: None,
        }
    }

    /// Keep a `TickSample` per tick (off by default).
    pub fn record_trajectory(&mut self, on: bool) {
        self.trajectory = on.then(Vec::new);
    }

    #[must_use]
    pub fn trajectory(&self) -> &[TickSample] {
        self.trajectory.as_deref().unwrap_or(&[])
    }

    #[must_use]
    pub fn mode(&self) -> SimulationMode {
        self.mode.current()
    }

    #[must_use]
    pub fn character(&self) -> &PlayerController {
        &self.character
    }

    #[must_use]
    pub fn camera(&self) -> &FollowCamera {
        &self.camera
    }

    #[must_use]
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    #[must_use]
    pub fn tick_dt(&self) -> f32 {
        self.tick_dt
    }

    #[must_use]
    pub fn is_recording(&self) -> bool {
        self.store.is_recording()
    }

    #[must_use]
    pub fn playback_remaining(&self) -> usize {
        self.playback.remaining()
    }

    #[must_use]
    pub fn config(&self) -> &ConfigSet {
        &self.cfg
    }

    /// Run one render frame of `frame_dt` seconds.
    pub fn frame(&mut self, device: &mut dyn InputDevice, frame_dt: f32) -> FrameReport {
        // 1) sample
        self.sampler.sample_frame(device);

        // 2) ticks
        let dt = frame_dt.clamp(0.0, self.cfg.sim.max_frame_delta);
        self.accumulator += dt;
        let mut ticks = 0u32;
        while self.accumulator >= self.tick_dt && ticks < self.cfg.sim.max_ticks_per_frame {
            self.accumulator -= self.tick_dt;
            self.tick();
            ticks += 1;
        }
        let mut dropped_backlog = 0.0;
        if self.accumulator >= self.tick_dt {
            dropped_backlog = self.accumulator;
            self.accumulator = 0.0;
            warn!(
                target: "sim",
                dropped_backlog_ms = dropped_backlog * 1000.0,
                max_ticks = self.cfg.sim.max_ticks_per_frame,
                "tick backlog dropped"
            );
        }

        // 3) render-smooth
        let alpha = self.accumulator / self.tick_dt;
        let visual = self.character.visual_pose(alpha);
        let anchor = visual.position + Vec3::Y * self.cfg.camera.target_height;
        let world = self.world.as_ref().map(|w| w as &dyn SpatialQuery);
        let occlusion = self.camera.frame_update(anchor, dt, world);

        // 4) end of frame
        self.frame_count += 1;
        FrameReport {
            frame: self.frame_count,
            ticks,
            dropped_backlog,
            mode: self.mode.current(),
            alpha,
            occlusion,
        }
    }

    fn tick(&mut self) {
        let live = self.sampler.consume_tick();
        if let Some(t) = self.mode.apply_toggles(&live) {
            self.on_transition(t);
        }

        let frame = match self.mode.frame_source() {
            FrameSource::Live => live,
            FrameSource::Replay => match self.playback.next_frame() {
                Some(f) => f,
                None => {
                    // Empty session: playback ends and this tick runs live.
                    if let Some(t) = self.mode.finish_playback() {
                        self.on_transition(t);
                    }
                    live
                }
            },
        };
        let mode = self.mode.current();
        let source = self.mode.frame_source();

        if mode == SimulationMode::Recording {
            // Failures are logged by the store.
            let _ = self.store.add_frame(&frame);
        }

        self.camera.tick(&frame, self.tick_dt);
        self.step_character(&frame);
        self.tick_count += 1;

        if self.exporter.is_open() {
            self.exporter.push(TelemetryRow {
                frame: self.export_tick,
                time: self.export_tick as f64 * f64::from(self.tick_dt),
                camera: self.camera.snapshot(),
                player: self.character.snapshot(),
            });
            self.export_tick += 1;
        }

        if mode == SimulationMode::Playback && self.playback.is_exhausted() {
            if let Some(t) = self.mode.finish_playback() {
                self.on_transition(t);
            }
        }

        if let Some(log) = self.trajectory.as_mut() {
            let c = self.camera.state();
            let s = self.character.state();
            log.push(TickSample {
                tick: self.tick_count,
                mode,
                source,
                position: s.position,
                velocity: s.velocity,
                yaw_deg: s.yaw_deg,
                camera_yaw_deg: c.yaw_deg,
                camera_pitch_deg: c.pitch_deg,
                target_zoom: c.target_zoom,
            });
        }
    }

    fn step_character(&mut self, frame: &ControlFrame) {
        let yaw = self.camera.logical_yaw();
        let ch = &self.cfg.character;
        match self.world.as_ref() {
            Some(idx) => {
                let mover = CapsuleMover::new(idx, ch.capsule_radius, ch.capsule_height);
                self.character.tick(frame, yaw, self.tick_dt, &mover);
            }
            None => self.character.tick(frame, yaw, self.tick_dt, &OpenSpace),
        }
    }

    fn on_transition(&mut self, t: ModeTransition) {
        self.sampler.reset_edges();
        match t.reason {
            TransitionReason::RecordFailed | TransitionReason::PlaybackFailed => return,
            TransitionReason::RecordToggle
            | TransitionReason::PlaybackToggle
            | TransitionReason::PlaybackExhausted => {}
        }
        if t.starts_recording() {
            self.begin_recording();
        } else if t.stops_recording() {
            if let Ok(frames) = self.store.stop_record() {
                debug!(target: "sim", frames, "recording closed");
            }
        } else if t.starts_playback() {
            self.begin_playback();
        } else if t.stops_playback() {
            self.playback.stop();
            if self.exporter.is_open() {
                let _ = self.exporter.stop();
            }
        }
    }

    fn begin_recording(&mut self) {
        let cam = self.camera.snapshot();
        let player = self.character.snapshot();
        if self.store.start_record(cam, player).is_err() {
            self.mode.abort_recording();
            return;
        }
        // Rebase onto the stored seed so the replay starts from the same
        // integrator state as this run.
        self.camera.apply_snapshot(&cam);
        self.character.apply_snapshot(&player);
    }

    fn begin_playback(&mut self) {
        let session = match self.store.load_session() {
            Ok(s) => s,
            Err(e) => {
                error!(target: "sim", error = %e, "playback start failed");
                self.mode.abort_playback();
                return;
            }
        };
        self.camera.apply_snapshot(&session.initial_camera);
        self.character.apply_snapshot(&session.initial_player);
        self.playback.start(session);
        if self.cfg.sim.export_csv {
            self.export_tick = 0;
            let _ = self
                .exporter
                .start(self.character.preset_name(), self.camera.preset_name());
        }
    }
}

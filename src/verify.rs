//! Record a scripted run, replay the saved session at another frame rate and
//! compare the two per-tick trajectories.

use std::rc::Rc;

use anyhow::{Context, Result, bail};
use client_core::input::{DeviceSample, IdleDevice, InputDevice, ScriptedDevice};
use client_core::systems::mode::{FrameSource, SimulationMode};
use data_runtime::ConfigSet;
use data_runtime::world::WorldLayout;
use sim_core::replay::SESSION_FILE;
use sim_core::{MemoryStorage, Simulation, Storage, TickSample};
use tracing::info;

use crate::script::InputScript;

/// Largest per-tick difference accepted as identical.
pub const TOLERANCE: f32 = 1e-3;

/// Frames allowed for a replay before giving up.
const MAX_REPLAY_FRAMES: usize = 1_000_000;

#[derive(Debug, Clone, PartialEq)]
pub struct VerifyReport {
    pub recorded_ticks: usize,
    pub replayed_ticks: usize,
    pub max_diff: f32,
    /// Index (within the recording) of the first tick over `TOLERANCE`.
    pub first_divergence: Option<usize>,
}

impl VerifyReport {
    #[must_use]
    pub fn is_match(&self) -> bool {
        self.recorded_ticks == self.replayed_ticks && self.first_divergence.is_none()
    }
}

fn toggle(record: bool) -> DeviceSample {
    DeviceSample {
        record_toggle: record,
        playback_toggle: !record,
        ..Default::default()
    }
}

/// Run `script` wrapped in record-start/record-stop toggles.
pub fn record(
    cfg: &ConfigSet,
    world: Option<&WorldLayout>,
    storage: Rc<dyn Storage>,
    script: &InputScript,
) -> Result<Vec<TickSample>> {
    let mut sim = Simulation::new(cfg.clone(), world, Some(storage));
    sim.record_trajectory(true);
    let (mut dev, dts) = script.device();
    let mut start = ScriptedDevice::new([toggle(true)]);
    sim.frame(&mut start, script.frame_dt);
    for dt in dts {
        sim.frame(&mut dev, dt);
    }
    // Stop, then flush until the toggle has been consumed by a tick.
    let mut stop = ScriptedDevice::new([toggle(true)]);
    sim.frame(&mut stop, script.frame_dt);
    let mut guard = 0;
    while sim.is_recording() {
        sim.frame(&mut IdleDevice, script.frame_dt);
        guard += 1;
        if guard > MAX_REPLAY_FRAMES {
            bail!("recording never stopped");
        }
    }
    Ok(sim
        .trajectory()
        .iter()
        .copied()
        .filter(|s| s.mode == SimulationMode::Recording)
        .collect())
}

/// Replay the stored session at `frame_dt`.
pub fn replay(
    cfg: &ConfigSet,
    world: Option<&WorldLayout>,
    storage: Rc<dyn Storage>,
    frame_dt: f32,
) -> Result<Vec<TickSample>> {
    if !storage.exists(SESSION_FILE) {
        bail!("no recorded session ({SESSION_FILE})");
    }
    let mut sim = Simulation::new(cfg.clone(), world, Some(storage));
    sim.record_trajectory(true);
    run_playback(&mut sim, frame_dt)?;
    Ok(sim
        .trajectory()
        .iter()
        .copied()
        .filter(|s| s.source == FrameSource::Replay)
        .collect())
}

/// Toggle playback and step frames until the session has been consumed.
pub fn run_playback(sim: &mut Simulation, frame_dt: f32) -> Result<u64> {
    let start = sim.tick_count();
    let mut dev = ScriptedDevice::new([toggle(false)]);
    for _ in 0..MAX_REPLAY_FRAMES {
        let d: &mut dyn InputDevice = if dev.is_exhausted() {
            &mut IdleDevice
        } else {
            &mut dev
        };
        sim.frame(d, frame_dt);
        if sim.tick_count() > start && sim.mode() == SimulationMode::Live {
            return Ok(sim.tick_count() - start);
        }
    }
    bail!("playback did not finish within {MAX_REPLAY_FRAMES} frames")
}

#[must_use]
pub fn compare(recorded: &[TickSample], replayed: &[TickSample]) -> VerifyReport {
    let mut max_diff = 0.0f32;
    let mut first_divergence = None;
    for (i, (a, b)) in recorded.iter().zip(replayed).enumerate() {
        let d = a.max_abs_diff(b);
        max_diff = max_diff.max(d);
        if d > TOLERANCE && first_divergence.is_none() {
            first_divergence = Some(i);
        }
    }
    VerifyReport {
        recorded_ticks: recorded.len(),
        replayed_ticks: replayed.len(),
        max_diff,
        first_divergence,
    }
}

/// Record in memory, replay at `replay_frame_dt`, compare.
pub fn record_and_replay(
    cfg: &ConfigSet,
    world: Option<&WorldLayout>,
    script: &InputScript,
    replay_frame_dt: f32,
) -> Result<VerifyReport> {
    let storage: Rc<dyn Storage> = Rc::new(MemoryStorage::new());
    let recorded = record(cfg, world, Rc::clone(&storage), script).context("record pass")?;
    let replayed = replay(cfg, world, storage, replay_frame_dt).context("replay pass")?;
    let report = compare(&recorded, &replayed);
    info!(
        target: "verify",
        recorded = report.recorded_ticks,
        replayed = report.replayed_ticks,
        max_diff = report.max_diff,
        "replay compared"
    );
    Ok(report)
}

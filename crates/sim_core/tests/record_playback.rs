mod common;

use std::rc::Rc;

use client_core::input::{DeviceSample, IdleDevice, ScriptedDevice};
use client_core::systems::mode::SimulationMode;
use data_runtime::ConfigSet;
use sim_core::replay::SESSION_FILE;
use sim_core::{FileStorage, MemoryStorage, RecordedSession, Simulation, Storage};

use common::{courtyard, toggle_playback, toggle_record, wander};

const DT: f32 = 0.02;

fn run(sim: &mut Simulation, samples: Vec<DeviceSample>, extra: usize) {
    let n = samples.len();
    let mut dev = ScriptedDevice::new(samples);
    for _ in 0..n + extra {
        sim.frame(&mut dev, DT);
    }
}

#[test]
fn recording_without_stop_persists_nothing() {
    let mem = Rc::new(MemoryStorage::new());
    let mut sim = Simulation::new(ConfigSet::default(), None, Some(mem.clone()));
    let mut samples = vec![toggle_record()];
    samples.extend(wander(50));
    run(&mut sim, samples, 0);
    assert_eq!(sim.mode(), SimulationMode::Recording);
    assert!(sim.is_recording());
    assert!(mem.get(SESSION_FILE).is_none());
}

#[test]
fn stop_persists_one_frame_per_recorded_tick() {
    let mem = Rc::new(MemoryStorage::new());
    let mut sim = Simulation::new(ConfigSet::default(), None, Some(mem.clone()));
    let mut samples = vec![toggle_record()];
    samples.extend(wander(30));
    samples.push(toggle_record());
    run(&mut sim, samples, 2);
    assert_eq!(sim.mode(), SimulationMode::Live);
    let session = RecordedSession::from_json(&mem.get(SESSION_FILE).expect("saved")).unwrap();
    // One tick per frame at DT: the start tick plus 30 wander ticks.
    assert_eq!(session.frames.len(), 31);
    assert!(session.frames.iter().all(|f| !f.record_toggle && !f.playback_toggle));
}

#[test]
fn playback_toggle_while_recording_is_ignored() {
    let mem = Rc::new(MemoryStorage::new());
    let mut sim = Simulation::new(ConfigSet::default(), None, Some(mem.clone()));
    run(&mut sim, vec![toggle_record(), toggle_playback()], 0);
    assert_eq!(sim.mode(), SimulationMode::Recording);
}

#[test]
fn playback_without_session_falls_back_to_live() {
    let mem = Rc::new(MemoryStorage::new());
    let mut sim = Simulation::new(ConfigSet::default(), None, Some(mem));
    run(&mut sim, vec![toggle_playback()], 2);
    assert_eq!(sim.mode(), SimulationMode::Live);
    assert_eq!(sim.playback_remaining(), 0);
}

#[test]
fn empty_session_ends_playback_on_the_same_tick() {
    let mem = Rc::new(MemoryStorage::new());
    let sim0 = Simulation::new(ConfigSet::default(), None, None);
    let session = RecordedSession::new(sim0.camera().snapshot(), sim0.character().snapshot());
    mem.write(SESSION_FILE, &session.to_json().unwrap()).unwrap();

    let mut sim = Simulation::new(ConfigSet::default(), None, Some(mem.clone()));
    let mut dev = ScriptedDevice::new([toggle_playback()]);
    let report = sim.frame(&mut dev, DT);
    assert_eq!(report.ticks, 1);
    assert_eq!(sim.mode(), SimulationMode::Live);
    // Export opened and closed with just the header.
    let csv = mem.get("Record_Default_Default.csv").expect("csv");
    assert_eq!(csv.lines().count(), 1);
}

#[test]
fn playback_ends_live_when_queue_runs_dry() {
    let mem = Rc::new(MemoryStorage::new());
    let world = courtyard();
    let mut sim = Simulation::new(ConfigSet::default(), Some(&world), Some(mem.clone()));
    let mut samples = vec![toggle_record()];
    samples.extend(wander(9));
    samples.push(toggle_record());
    samples.push(toggle_playback());
    run(&mut sim, samples, 0);
    assert_eq!(sim.mode(), SimulationMode::Playback);
    let mut idle = IdleDevice;
    // Ten recorded frames; one was consumed on the playback start tick.
    for _ in 0..8 {
        sim.frame(&mut idle, DT);
        assert_eq!(sim.mode(), SimulationMode::Playback);
    }
    sim.frame(&mut idle, DT);
    assert_eq!(sim.mode(), SimulationMode::Live);
    let csv = mem.get("Record_Default_Default.csv").expect("csv");
    assert_eq!(csv.lines().count(), 1 + 10);
}

#[test]
fn playback_toggle_stops_early_and_writes_partial_csv() {
    let mem = Rc::new(MemoryStorage::new());
    let mut sim = Simulation::new(ConfigSet::default(), None, Some(mem.clone()));
    let mut samples = vec![toggle_record()];
    samples.extend(wander(20));
    samples.push(toggle_record());
    samples.push(toggle_playback());
    samples.extend(std::iter::repeat_n(DeviceSample::default(), 4));
    samples.push(toggle_playback());
    run(&mut sim, samples, 0);
    assert_eq!(sim.mode(), SimulationMode::Live);
    let csv = mem.get("Record_Default_Default.csv").expect("csv");
    // Start tick plus four playback ticks.
    assert_eq!(csv.lines().count(), 1 + 5);
}

#[test]
fn missing_storage_disables_record_and_playback() {
    let mut sim = Simulation::new(ConfigSet::default(), None, None);
    run(&mut sim, vec![toggle_record()], 1);
    assert_eq!(sim.mode(), SimulationMode::Live);
    run(&mut sim, vec![toggle_playback()], 1);
    assert_eq!(sim.mode(), SimulationMode::Live);
}

#[test]
fn csv_export_can_be_switched_off() {
    let mem = Rc::new(MemoryStorage::new());
    let mut cfg = ConfigSet::default();
    cfg.sim.export_csv = false;
    let mut sim = Simulation::new(cfg, None, Some(mem.clone()));
    let mut samples = vec![toggle_record()];
    samples.extend(wander(5));
    samples.push(toggle_record());
    samples.push(toggle_playback());
    run(&mut sim, samples, 10);
    assert_eq!(sim.mode(), SimulationMode::Live);
    assert_eq!(mem.names(), vec![SESSION_FILE.to_string()]);
}

#[test]
fn unwritable_records_dir_keeps_running_live() {
    let dir = tempfile::tempdir().expect("tempdir");
    // Records dir nested under a regular file: every write fails.
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, "x").unwrap();
    let storage = Rc::new(FileStorage::new(blocker.join("Records")));
    let mut sim = Simulation::new(ConfigSet::default(), None, Some(storage.clone()));
    let mut samples = vec![toggle_record()];
    samples.extend(wander(10));
    samples.push(toggle_record());
    run(&mut sim, samples, 3);
    assert_eq!(sim.mode(), SimulationMode::Live);
    assert!(!sim.is_recording());
    assert!(!storage.exists(SESSION_FILE));
    // Still ticking after the failed save.
    let before = sim.tick_count();
    sim.frame(&mut IdleDevice, DT);
    assert_eq!(sim.tick_count(), before + 1);
}

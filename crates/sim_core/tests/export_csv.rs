mod common;

use std::rc::Rc;

use client_core::input::ScriptedDevice;
use client_core::systems::mode::SimulationMode;
use data_runtime::ConfigSet;
use sim_core::export::HEADER;
use sim_core::{FileStorage, Simulation};

use common::{courtyard, toggle_playback, toggle_record, wander};

#[test]
fn playback_writes_csv_next_to_session() {
    let dir = tempfile::tempdir().expect("tempdir");
    let records = dir.path().join("Records");
    let mut cfg = ConfigSet::default();
    cfg.character.preset = "Scout".into();
    cfg.camera.preset = "Wide".into();
    let world = courtyard();

    let mut samples = vec![toggle_record()];
    samples.extend(wander(25));
    samples.push(toggle_record());
    samples.push(toggle_playback());
    let n = samples.len();

    let mut sim = Simulation::new(cfg, Some(&world), Some(Rc::new(FileStorage::new(&records))));
    let mut dev = ScriptedDevice::new(samples);
    for _ in 0..n + 40 {
        sim.frame(&mut dev, 0.02);
    }
    assert_eq!(sim.mode(), SimulationMode::Live);

    assert!(records.join("Record.json").is_file());
    let csv = std::fs::read_to_string(records.join("Record_Scout_Wide.csv")).expect("csv");
    let mut lines = csv.lines();
    assert_eq!(lines.next(), Some(HEADER.join(",").as_str()));
    let rows: Vec<&str> = lines.collect();
    assert_eq!(rows.len(), 26);
    for (i, row) in rows.iter().enumerate() {
        let cells: Vec<&str> = row.split(',').collect();
        assert_eq!(cells.len(), HEADER.len());
        assert_eq!(cells[0], i.to_string());
        for c in &cells[1..] {
            let frac = c.rsplit('.').next().unwrap();
            assert_eq!(frac.len(), 6, "cell {c} in {row}");
        }
    }
    // Logical zoom column never shows an occlusion-shortened value.
    let zoom: f32 = rows[0].split(',').nth(9).unwrap().parse().unwrap();
    assert!((1.0..=30.0).contains(&zoom));
}

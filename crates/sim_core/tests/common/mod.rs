#![allow(dead_code)]

use client_core::input::DeviceSample;
use data_runtime::world::{ColliderSpec, LayerName, WorldLayout};
use glam::Vec2;

pub fn courtyard() -> WorldLayout {
    WorldLayout {
        name: "courtyard".into(),
        spawn: [0.0, 0.0, 0.0],
        colliders: vec![
            ColliderSpec::Box {
                min: [-40.0, -1.0, -40.0],
                max: [40.0, 0.0, 40.0],
                layer: LayerName::Default,
            },
            ColliderSpec::Box {
                min: [-6.0, 0.0, 8.0],
                max: [6.0, 4.0, 9.0],
                layer: LayerName::Default,
            },
            ColliderSpec::Cylinder {
                center: [3.0, 2.0, -4.0],
                radius: 0.05,
                half_height: 2.0,
                layer: LayerName::Thin,
            },
        ],
    }
}

pub fn toggle_record() -> DeviceSample {
    DeviceSample {
        record_toggle: true,
        ..Default::default()
    }
}

pub fn toggle_playback() -> DeviceSample {
    DeviceSample {
        playback_toggle: true,
        ..Default::default()
    }
}

/// A few seconds of mixed walking, turning, zooming and jumping.
pub fn wander(frames: usize) -> Vec<DeviceSample> {
    (0..frames)
        .map(|i| {
            let phase = i as f32 * 0.05;
            DeviceSample {
                move_input: Vec2::new(phase.sin() * 0.5, 1.0),
                look_input: if i % 7 == 0 {
                    Vec2::new(phase.cos(), 0.3 * phase.sin())
                } else {
                    Vec2::ZERO
                },
                zoom_input: if i % 40 == 5 { 0.05 } else { 0.0 },
                jump: i % 90 == 30,
                sprint: (i / 60) % 2 == 1,
                ..Default::default()
            }
        })
        .collect()
}

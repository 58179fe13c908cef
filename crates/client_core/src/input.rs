//! Input pipeline: per-frame device samples folded into one `ControlFrame`
//! per fixed tick.
//!
//! Frames and ticks run on unrelated clocks, so each input kind has its own
//! accumulation rule:
//! - move/look/sprint: latest value wins (every tick re-reads it);
//! - jump/interact/mode toggles: edges, OR-ed until a tick consumes them;
//! - zoom: latest non-zero delta since the last tick.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Assembled input consumed by exactly one tick.
#[derive(Default, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ControlFrame {
    pub move_input: Vec2,
    pub look_input: Vec2,
    pub zoom_input: f32,
    pub jump_pressed: bool,
    pub sprint_held: bool,
    pub interact_pressed: bool,
    /// Mode edges. Cleared before a frame is stored in a session.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub record_toggle: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub playback_toggle: bool,
}

impl ControlFrame {
    /// Copy with the mode-toggle edges cleared, as stored in a session.
    #[must_use]
    pub fn without_toggles(mut self) -> Self {
        self.record_toggle = false;
        self.playback_toggle = false;
        self
    }

    #[must_use]
    pub fn has_move(&self) -> bool {
        self.move_input.x.abs() > 0.01 || self.move_input.y.abs() > 0.01
    }
}

/// One raw poll of a device. Booleans are "pressed this frame" for edges and
/// "held" for sprint.
#[derive(Default, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeviceSample {
    pub move_input: Vec2,
    pub look_input: Vec2,
    pub zoom_input: f32,
    pub jump: bool,
    pub sprint: bool,
    pub interact: bool,
    pub record_toggle: bool,
    pub playback_toggle: bool,
}

/// Anything that can be polled once per frame.
pub trait InputDevice {
    fn poll(&mut self) -> DeviceSample;
}

/// Device that never reports input.
#[derive(Default, Debug, Clone, Copy)]
pub struct IdleDevice;

impl InputDevice for IdleDevice {
    fn poll(&mut self) -> DeviceSample {
        DeviceSample::default()
    }
}

/// Plays back a fixed list of samples, one per poll, then goes idle.
#[derive(Default, Debug, Clone)]
pub struct ScriptedDevice {
    queue: VecDeque<DeviceSample>,
}

impl ScriptedDevice {
    pub fn new(samples: impl IntoIterator<Item = DeviceSample>) -> Self {
        Self {
            queue: samples.into_iter().collect(),
        }
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.queue.len()
    }

    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.queue.is_empty()
    }
}

impl InputDevice for ScriptedDevice {
    fn poll(&mut self) -> DeviceSample {
        self.queue.pop_front().unwrap_or_default()
    }
}

/// Folds frame samples into tick frames.
#[derive(Default, Debug, Clone)]
pub struct InputSampler {
    move_input: Vec2,
    look_input: Vec2,
    sprint_held: bool,
    pending_zoom: f32,
    pending_jump: bool,
    pending_interact: bool,
    pending_record: bool,
    pending_playback: bool,
}

impl InputSampler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Poll `device` once and fold the sample in. Call once per frame.
    pub fn sample_frame(&mut self, device: &mut dyn InputDevice) {
        let s = device.poll();
        self.fold(&s);
    }

    /// Fold an already-polled sample.
    pub fn fold(&mut self, s: &DeviceSample) {
        self.move_input = s.move_input.normalize_or_zero();
        self.look_input = s.look_input;
        self.sprint_held = s.sprint;
        if s.zoom_input != 0.0 {
            self.pending_zoom = s.zoom_input;
        }
        self.pending_jump |= s.jump;
        self.pending_interact |= s.interact;
        self.pending_record |= s.record_toggle;
        self.pending_playback |= s.playback_toggle;
    }

    /// Assemble the frame for one tick and reset edge and zoom accumulators.
    pub fn consume_tick(&mut self) -> ControlFrame {
        let frame = ControlFrame {
            move_input: self.move_input,
            look_input: self.look_input,
            zoom_input: self.pending_zoom,
            jump_pressed: self.pending_jump,
            sprint_held: self.sprint_held,
            interact_pressed: self.pending_interact,
            record_toggle: self.pending_record,
            playback_toggle: self.pending_playback,
        };
        self.pending_zoom = 0.0;
        self.reset_edges();
        frame
    }

    /// Drop pending edges without consuming them.
    pub fn reset_edges(&mut self) {
        self.pending_jump = false;
        self.pending_interact = false;
        self.pending_record = false;
        self.pending_playback = false;
    }

    #[must_use]
    pub fn has_pending_edges(&self) -> bool {
        self.pending_jump || self.pending_interact || self.pending_record || self.pending_playback
    }
}

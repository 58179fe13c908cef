//! Simulation mode state machine: Live, Recording, Playback.
//!
//! Recording and Playback are mutually exclusive; switching between them
//! always passes through Live. Callers act on the returned `ModeTransition`
//! (start/stop the recorder, load a session, ...) inside the same tick.

use tracing::{info, warn};

use crate::input::ControlFrame;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SimulationMode {
    #[default]
    Live,
    Recording,
    Playback,
}

/// Where the tick takes its `ControlFrame` from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameSource {
    Live,
    Replay,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransitionReason {
    RecordToggle,
    PlaybackToggle,
    PlaybackExhausted,
    PlaybackFailed,
    RecordFailed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModeTransition {
    pub from: SimulationMode,
    pub to: SimulationMode,
    pub reason: TransitionReason,
}

impl ModeTransition {
    #[must_use]
    pub fn starts_recording(&self) -> bool {
        self.to == SimulationMode::Recording
    }

    #[must_use]
    pub fn stops_recording(&self) -> bool {
        self.from == SimulationMode::Recording
    }

    #[must_use]
    pub fn starts_playback(&self) -> bool {
        self.to == SimulationMode::Playback
    }

    #[must_use]
    pub fn stops_playback(&self) -> bool {
        self.from == SimulationMode::Playback
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ModeController {
    mode: SimulationMode,
}

impl ModeController {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn current(&self) -> SimulationMode {
        self.mode
    }

    #[must_use]
    pub fn frame_source(&self) -> FrameSource {
        match self.mode {
            SimulationMode::Playback => FrameSource::Replay,
            SimulationMode::Live | SimulationMode::Recording => FrameSource::Live,
        }
    }

    /// Apply the frame's mode edges. The record toggle is evaluated first; at
    /// most one transition happens per call.
    pub fn apply_toggles(&mut self, frame: &ControlFrame) -> Option<ModeTransition> {
        if frame.record_toggle {
            match self.mode {
                SimulationMode::Live => {
                    return Some(self.switch(SimulationMode::Recording, TransitionReason::RecordToggle));
                }
                SimulationMode::Recording => {
                    return Some(self.switch(SimulationMode::Live, TransitionReason::RecordToggle));
                }
                SimulationMode::Playback => {
                    warn!(target: "mode", mode = ?self.mode, "record toggle rejected during playback");
                }
            }
        }
        if frame.playback_toggle {
            match self.mode {
                SimulationMode::Live => {
                    return Some(self.switch(SimulationMode::Playback, TransitionReason::PlaybackToggle));
                }
                SimulationMode::Playback => {
                    return Some(self.switch(SimulationMode::Live, TransitionReason::PlaybackToggle));
                }
                SimulationMode::Recording => {
                    warn!(target: "mode", mode = ?self.mode, "playback toggle rejected while recording");
                }
            }
        }
        None
    }

    /// Recorded queue ran dry.
    pub fn finish_playback(&mut self) -> Option<ModeTransition> {
        (self.mode == SimulationMode::Playback)
            .then(|| self.switch(SimulationMode::Live, TransitionReason::PlaybackExhausted))
    }

    /// Playback could not start (missing or unreadable session).
    pub fn abort_playback(&mut self) -> Option<ModeTransition> {
        (self.mode == SimulationMode::Playback)
            .then(|| self.switch(SimulationMode::Live, TransitionReason::PlaybackFailed))
    }

    /// Recording could not start (no storage, session already open).
    pub fn abort_recording(&mut self) -> Option<ModeTransition> {
        (self.mode == SimulationMode::Recording)
            .then(|| self.switch(SimulationMode::Live, TransitionReason::RecordFailed))
    }

    fn switch(&mut self, to: SimulationMode, reason: TransitionReason) -> ModeTransition {
        let from = self.mode;
        self.mode = to;
        info!(target: "mode", from = ?from, to = ?to, reason = ?reason, "mode transition");
        ModeTransition { from, to, reason }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> ControlFrame {
        ControlFrame {
            record_toggle: true,
            ..Default::default()
        }
    }

    fn playback() -> ControlFrame {
        ControlFrame {
            playback_toggle: true,
            ..Default::default()
        }
    }

    #[test]
    fn record_toggle_round_trip() {
        let mut m = ModeController::new();
        let t = m.apply_toggles(&record()).expect("start");
        assert!(t.starts_recording());
        assert_eq!(m.frame_source(), FrameSource::Live);
        let t = m.apply_toggles(&record()).expect("stop");
        assert!(t.stops_recording());
        assert_eq!(m.current(), SimulationMode::Live);
    }

    #[test]
    fn both_toggles_in_one_frame_prefer_record() {
        let mut m = ModeController::new();
        let both = ControlFrame {
            record_toggle: true,
            playback_toggle: true,
            ..Default::default()
        };
        let t = m.apply_toggles(&both).expect("transition");
        assert_eq!(t.to, SimulationMode::Recording);
        assert_eq!(m.current(), SimulationMode::Recording);
    }

    #[test]
    fn finish_and_abort_only_apply_in_playback() {
        let mut m = ModeController::new();
        assert!(m.finish_playback().is_none());
        m.apply_toggles(&playback());
        assert_eq!(m.frame_source(), FrameSource::Replay);
        let t = m.abort_playback().expect("abort");
        assert_eq!(t.reason, TransitionReason::PlaybackFailed);
        assert_eq!(m.current(), SimulationMode::Live);
    }
}

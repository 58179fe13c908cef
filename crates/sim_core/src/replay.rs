//! Record store and playback driver.
//!
//! A session is opened at record start with both integrators' snapshots,
//! receives one frame per tick, and is written as a single JSON file at
//! record stop. A session that is never stopped is never written.

use std::collections::VecDeque;
use std::rc::Rc;

use client_core::input::ControlFrame;
use client_core::snapshot::{CameraSnapshot, PlayerSnapshot};
use tracing::{error, info, warn};

use crate::error::ReplayError;
use crate::session::RecordedSession;
use crate::storage::Storage;

pub const SESSION_FILE: &str = "Record.json";

pub struct RecordStore {
    storage: Option<Rc<dyn Storage>>,
    open: Option<RecordedSession>,
}

impl RecordStore {
    #[must_use]
    pub fn new(storage: Rc<dyn Storage>) -> Self {
        Self {
            storage: Some(storage),
            open: None,
        }
    }

    /// Store with no backing storage; every operation fails with `Disabled`.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            storage: None,
            open: None,
        }
    }

    #[must_use]
    pub fn is_recording(&self) -> bool {
        self.open.is_some()
    }

    /// Frames in the open session, zero when none is open.
    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.open.as_ref().map_or(0, |s| s.frames.len())
    }

    fn storage(&self) -> Result<&Rc<dyn Storage>, ReplayError> {
        self.storage.as_ref().ok_or_else(|| {
            error!(target: "replay", "record store has no storage");
            ReplayError::Disabled
        })
    }

    pub fn start_record(
        &mut self,
        camera: CameraSnapshot,
        player: PlayerSnapshot,
    ) -> Result<(), ReplayError> {
        self.storage()?;
        if self.open.is_some() {
            error!(target: "replay", "start_record while already recording");
            return Err(ReplayError::AlreadyRecording);
        }
        self.open = Some(RecordedSession::new(camera, player));
        info!(target: "replay", "recording started");
        Ok(())
    }

    /// Append one tick's frame; mode toggles are stripped.
    pub fn add_frame(&mut self, frame: &ControlFrame) -> Result<(), ReplayError> {
        self.storage()?;
        let Some(session) = self.open.as_mut() else {
            error!(target: "replay", "add_frame without an open recording");
            return Err(ReplayError::NotRecording);
        };
        session.frames.push(frame.without_toggles());
        Ok(())
    }

    /// Persist and close the open session. The session is closed even when
    /// the write fails.
    pub fn stop_record(&mut self) -> Result<usize, ReplayError> {
        let storage = Rc::clone(self.storage()?);
        let Some(session) = self.open.take() else {
            error!(target: "replay", "stop_record without an open recording");
            return Err(ReplayError::NotRecording);
        };
        let frames = session.frames.len();
        let txt = session.to_json()?;
        storage.write(SESSION_FILE, &txt).map_err(|e| {
            error!(target: "replay", error = %format!("{e:#}"), frames, "session write failed");
            ReplayError::Storage(e)
        })?;
        info!(target: "replay", frames, file = SESSION_FILE, "recording saved");
        Ok(frames)
    }

    pub fn load_session(&self) -> Result<RecordedSession, ReplayError> {
        let storage = self.storage()?;
        let txt = storage.read(SESSION_FILE)?;
        let session = RecordedSession::from_json(&txt)?;
        info!(target: "replay", frames = session.frames.len(), "session loaded");
        Ok(session)
    }
}

/// FIFO of recorded frames for one playback run.
#[derive(Debug, Default, Clone)]
pub struct PlaybackDriver {
    queue: VecDeque<ControlFrame>,
    active: bool,
}

impl PlaybackDriver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take over the session's frames. The caller applies the initial
    /// snapshots and resets smoothing state.
    pub fn start(&mut self, session: RecordedSession) {
        if self.active {
            warn!(target: "replay", remaining = self.queue.len(), "playback restarted");
        }
        self.queue = session.frames.into();
        self.active = true;
    }

    pub fn next_frame(&mut self) -> Option<ControlFrame> {
        if !self.active {
            return None;
        }
        self.queue.pop_front()
    }

    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.queue.is_empty()
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.queue.len()
    }

    pub fn stop(&mut self) {
        self.queue.clear();
        self.active = false;
    }
}

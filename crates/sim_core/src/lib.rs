//! sim_core: record/playback, telemetry export and the frame scheduler that
//! ties the input pipeline, character and camera together.

pub mod error;
pub mod export;
pub mod replay;
pub mod runner;
pub mod session;
pub mod storage;

pub use client_core::snapshot::{CameraSnapshot, PlayerSnapshot};
pub use error::ReplayError;
pub use runner::{FrameReport, Simulation, TickSample};
pub use session::RecordedSession;
pub use storage::{FileStorage, MemoryStorage, Storage};

//! threec: deterministic third-person character and follow camera with input
//! record and replay.
//!
//! The workspace crates do the work; this crate adds the scripted-input
//! format and the record/replay verification used by the `threec` CLI.

pub use client_core;
pub use collision_static;
pub use data_runtime;
pub use sim_core;

pub mod script;
pub mod verify;

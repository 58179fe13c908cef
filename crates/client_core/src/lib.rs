//! Client glue: input pipeline, character integrator and the follow camera.
//!
//! Everything here is deterministic given the `ControlFrame` stream and the
//! tick interval; render-rate work (boom resolution, visual interpolation)
//! never feeds back into the tick state unless the camera runs its orbit on
//! the frame clock.

pub mod controller;
pub mod input;
pub mod smoothing;
pub mod snapshot;
pub mod systems;
pub mod telemetry;

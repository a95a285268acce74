//! Controller layer: backend events surfaced to the UI and command orchestration.

pub mod events;
pub mod orchestration;

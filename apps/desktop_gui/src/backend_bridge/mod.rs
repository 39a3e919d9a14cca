//! Bridge between the egui thread and the backend worker that performs network and audio I/O.

pub mod commands;
#[cfg(feature = "audio-playback")]
pub mod playback;
pub mod runtime;

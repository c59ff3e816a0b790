/// System and in-memory clipboard sinks.
pub mod clipboard;
/// PNG encoding, file export and download labels.
pub mod png;
/// Single-pixel color readback.
pub mod sample;

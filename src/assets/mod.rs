/// Immutable decoded images.
pub mod bitmap;
/// sRGB colors and hex parsing.
pub mod color;
/// PNG and Photoshop decoding.
pub mod decode;
/// Process-wide placeholder and procedural resources.
pub mod defaults;
/// Cover/spine slot state, upload intake and paste handling.
pub mod slots;

/// Stateful owner of one mockup: inputs, derived scene, renderer and last frame.
pub mod mockup;

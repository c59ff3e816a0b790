/// Binding styles and scaling modes.
pub mod binding;
/// Normalized book proportions.
pub mod book;
/// Pixel/inch conversion and size inputs.
pub mod units;

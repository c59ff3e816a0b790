/// Binding-specific scene construction.
pub mod assemble;
/// Procedural booklet template used for saddle-stitched books.
pub mod booklet;
/// Retained scene graph types.
pub mod scene;

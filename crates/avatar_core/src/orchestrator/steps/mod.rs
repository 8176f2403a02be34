//! Pipeline step implementations, one per stage.

mod composite;
mod image_prep;
mod render;
mod speech;

pub use composite::CompositeStep;
pub use image_prep::ImagePrepStep;
pub use render::RenderStep;
pub use speech::SpeechStep;

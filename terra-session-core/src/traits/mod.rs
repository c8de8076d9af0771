pub mod renderer;

pub use renderer::{GameRenderer, RecordingRenderer, RenderedProjectile};

mod commands;
mod mirror;

pub use commands::RenderCommand;
pub use mirror::ProjectileMirror;

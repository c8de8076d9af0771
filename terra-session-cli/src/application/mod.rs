mod console_renderer;
mod demo;
mod online;

pub use console_renderer::ConsoleRenderer;
pub use demo::{run_demo, DemoReport};
pub use online::{run_online, OnlineOptions};

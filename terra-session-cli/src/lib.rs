pub mod application;
pub mod infrastructure;

pub use application::{run_demo, run_online, ConsoleRenderer, DemoReport, OnlineOptions};
pub use infrastructure::{CliError, LogConfig, Result};

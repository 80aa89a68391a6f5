mod types;

pub use types::{Cli, ToolsetConfig, available_tools};

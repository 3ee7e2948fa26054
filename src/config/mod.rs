mod loader;

pub use loader::{Config, LibraryConfig, OutputConfig, DEFAULT_CONFIG_PATH};

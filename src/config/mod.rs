mod loader;

pub use loader::load_config;
pub use loader::load_config_from;
pub use loader::Config;
pub use loader::ConfigError;
pub use loader::DEFAULT_OBJECTS;

pub mod data;
pub mod defaults;
pub mod io;
pub mod settings;

pub use data::{Config, PersonaEntry, Secrets};
pub use io::{AppPaths, ConfigError};
pub use settings::{EnvOverrides, RuntimeFlags, Settings};

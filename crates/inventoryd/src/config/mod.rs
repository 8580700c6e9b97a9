mod config;
mod partial;

pub use config::*;
pub use partial::PartialApiConfig;
pub use partial::PartialConfig;
pub use partial::PartialLoggingConfig;
pub use partial::PartialStorageConfig;

mod settings;

pub use settings::{DatabaseConfig, JwtConfig, LoggingConfig, ServerConfig, Settings};

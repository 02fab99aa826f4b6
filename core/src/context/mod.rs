mod config;
mod parsing_session;

pub use config::{ConfigError, load_config, load_config_str};
pub use parsing_session::ParsingSession;

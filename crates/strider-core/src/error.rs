use thiserror::Error;

/// Top-level error type for strider-core.
#[derive(Debug, Error)]
pub enum StriderError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Command error: {0}")]
    Command(#[from] CommandError),
}

/// Configuration errors.
///
/// Raised at construction time only; a running controller never produces one.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid filter frequency: {0} (must be > 0)")]
    InvalidFrequency(f64),

    #[error("Invalid link length for leg {leg}: {length} (must be > 0)")]
    InvalidLinkLength { leg: usize, length: f64 },

    #[error("Invalid timestep: {0} (must be > 0)")]
    InvalidTimestep(f64),

    #[error("Controller needs at least one leg")]
    NoLegs,

    #[error("Invalid configuration for {field}: {message}")]
    InvalidConfiguration { field: String, message: String },
}

impl ConfigError {
    /// Shorthand for [`ConfigError::InvalidConfiguration`].
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Errors produced while interpreting input commands.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Malformed arguments for {command}: {message}")]
    MalformedArguments { command: String, message: String },
}

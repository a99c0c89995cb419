use thiserror::Error;

pub type Result<T> = std::result::Result<T, FusionError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FusionError {
    /// A caller-supplied argument is outside its valid range.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Engine configuration failed validation.
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

use std::string::FromUtf8Error;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, PipeError>;

#[derive(Debug, Error)]
pub enum PipeError {
    #[error("invalid command: {0}")]
    InvalidCommandSpec(String),
    #[error("invalid runner configuration: {0}")]
    InvalidConfiguration(String),
    #[error("command `{command}` exited with status {code}")]
    CommandFailed { code: i32, command: String },
    #[error("no value specified")]
    Unresolved,
    #[error("output is not valid utf-8: {0}")]
    Decode(#[from] FromUtf8Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl PipeError {
    /// Exit code carried by a `CommandFailed`, if this is one.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            PipeError::CommandFailed { code, .. } => Some(*code),
            _ => None,
        }
    }
}

//! Error types for command execution and device access

use thiserror::Error;

/// Errors surfaced in a response envelope's `error` field
///
/// The `Display` output of each variant is the exact message published back
/// to the requester.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Envelope has no `cmd` field
    #[error("Message does not contain a command directive.")]
    MissingCommand,

    /// Command name is not in the registry
    #[error("Command ({0}) is not a valid directive.")]
    UnknownCommand(String),

    /// Supplied parameters do not match the handler's declared parameters
    #[error("Incorrect number of parameters for command.")]
    InvalidParameters,

    /// Mutually exclusive or jointly required parameters were violated
    #[error("{0}")]
    ConflictingParameters(String),

    /// Remote key name is not part of the key enumeration
    #[error("Key ({0}) is not a valid key code.")]
    InvalidKey(String),

    /// Exact channel-number lookup failed
    #[error("No channel matching number: {0}")]
    ChannelNotFound(String),

    /// Best fuzzy score fell below the match threshold
    #[error("No good matches for channel: {0}")]
    NoGoodMatch(String),

    /// Device acknowledged failure or could not be reached
    #[error("An unknown error has occurred.")]
    Device,
}

impl CommandError {
    /// Returns true for the parameter-shape family of errors
    pub fn is_invalid_parameters(&self) -> bool {
        matches!(
            self,
            Self::InvalidParameters | Self::ConflictingParameters(_)
        )
    }
}

impl From<DeviceError> for CommandError {
    fn from(_: DeviceError) -> Self {
        CommandError::Device
    }
}

/// Errors raised by a device client
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeviceError {
    /// A session could not be opened
    #[error("failed to open device session: {0}")]
    SessionUnavailable(String),
}

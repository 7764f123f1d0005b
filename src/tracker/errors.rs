//! Error types for the tracker
//!
//! Every failing call returns one of these instead of panicking. A failed
//! call never leaves the registry partially updated for the affected class.

use std::fmt;

use crate::types::track::TrackId;

/// Errors that can occur during a tracking call
#[derive(Debug, Clone, PartialEq)]
pub enum TrackerError {
    /// Malformed or unsupported input
    InvalidArgument {
        /// What was wrong with the input
        context: String,
    },

    /// A track reached the reporting boundary in a state with no mapping
    InternalConsistency {
        /// Offending track
        track_id: TrackId,
        /// Description of the inconsistency
        context: String,
    },

    /// Output buffers could not be reserved
    Allocation {
        /// Number of elements requested
        requested: usize,
    },

    /// Configuration error
    Config(ConfigError),
}

impl TrackerError {
    pub fn invalid_argument(context: String) -> Self {
        TrackerError::InvalidArgument { context }
    }

    pub fn internal_consistency(track_id: TrackId, context: impl Into<String>) -> Self {
        TrackerError::InternalConsistency {
            track_id,
            context: context.into(),
        }
    }
}

impl fmt::Display for TrackerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackerError::InvalidArgument { context } => {
                write!(f, "Invalid argument: {}", context)
            }
            TrackerError::InternalConsistency { track_id, context } => {
                write!(f, "Internal consistency error on track {}: {}", track_id, context)
            }
            TrackerError::Allocation { requested } => {
                write!(f, "Allocation failed for {} elements", requested)
            }
            TrackerError::Config(e) => write!(f, "Configuration error: {}", e),
        }
    }
}

impl std::error::Error for TrackerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TrackerError::Config(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigError> for TrackerError {
    fn from(e: ConfigError) -> Self {
        TrackerError::Config(e)
    }
}

/// Errors raised while building or parsing a configuration
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A field holds a value the tracker cannot use
    Invalid {
        /// Dotted field path
        field: &'static str,
        /// Why the value was rejected
        description: String,
    },

    /// The serialized form could not be parsed
    Parse {
        /// Parser message
        description: String,
    },
}

impl ConfigError {
    pub fn invalid(field: &'static str, description: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field,
            description: description.into(),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Invalid { field, description } => {
                write!(f, "invalid {}: {}", field, description)
            }
            ConfigError::Parse { description } => write!(f, "parse error: {}", description),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Reserve exactly `additional` slots, mapping failure to [`TrackerError::Allocation`]
pub(crate) fn reserve_exact<T>(buf: &mut Vec<T>, additional: usize) -> Result<(), TrackerError> {
    buf.try_reserve_exact(additional)
        .map_err(|_| TrackerError::Allocation {
            requested: additional,
        })
}

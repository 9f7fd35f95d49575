//! Error types for the registry client.
//!
//! Failures stay in three separate buckets. A malformed call is caught
//! before any frame is written ([`UsageError`]). A completed round trip the
//! kernel answered with a rejection is [`RegistryError::Kernel`]. A channel
//! failure with no kernel verdict at all is [`ChannelError`].

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Top-level error for every facade operation.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The call was malformed and never left the process.
    #[error(transparent)]
    Usage(#[from] UsageError),

    /// The kernel rejected or failed the command. The message is
    /// kernel-authored and reproduced verbatim; commands are never retried,
    /// since registry mutations are not idempotent.
    #[error("kernel rejected `{op}`: {message}")]
    Kernel { op: String, message: String },

    /// The command channel failed before a kernel verdict arrived.
    #[error(transparent)]
    Channel(#[from] ChannelError),
}

impl RegistryError {
    pub fn kernel(op: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Kernel {
            op: op.into(),
            message: message.into(),
        }
    }

    /// True when the failure was raised locally, without a round trip.
    pub fn is_local(&self) -> bool {
        matches!(self, RegistryError::Usage(_))
    }
}

/// Pre-flight failures; the kernel is never contacted.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UsageError {
    #[error("unknown model kind {given:?}, expected \"all\", \"nodes\" or \"synapses\"")]
    InvalidKind { given: String },

    /// The single-parameter short form only accepts scalar values.
    #[error("parameter '{name}' given a non-scalar value in the single-parameter form, pass a mapping instead")]
    NonScalarShorthand { name: String },
}

/// Transport-level failures on the channel to the kernel.
#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("could not reach the kernel at {path}: {source}")]
    Connect {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("channel i/o failed: {0}")]
    Io(#[from] io::Error),

    #[error("kernel closed the connection")]
    Disconnected,

    #[error("handshake failed: {0}")]
    Handshake(String),

    /// The kernel sent a frame that does not fit the exchange in progress.
    #[error("protocol violation: {0}")]
    Protocol(String),
}

pub type Result<T> = std::result::Result<T, RegistryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usage_errors_are_local() {
        let err = RegistryError::from(UsageError::InvalidKind {
            given: "bogus".to_string(),
        });
        assert!(err.is_local());
        assert!(!RegistryError::kernel("copy_model", "boom").is_local());
    }

    #[test]
    fn kernel_errors_quote_the_opcode_and_message() {
        let err = RegistryError::kernel("get_defaults", "UnknownModel: ghost");
        assert_eq!(
            err.to_string(),
            "kernel rejected `get_defaults`: UnknownModel: ghost"
        );
    }
}

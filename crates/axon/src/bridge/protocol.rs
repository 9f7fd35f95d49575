//! Wire protocol types for the kernel's registry channel.
//!
//! A connection opens with `hello`/`welcome`, after which the client issues
//! one `invoke` frame at a time and reads exactly one `ok` or `error` frame
//! back. Arguments travel in call order; the kernel pushes them onto its
//! operand stack and leaves whatever the command produced for the response.

use serde::{Deserialize, Serialize};

use crate::params::ParamValue;

/// Revision of the registry protocol this crate speaks.
///
/// The kernel echoes its own revision in `welcome`; a mismatch aborts the
/// handshake before any command is issued.
pub const PROTOCOL_VERSION: u32 = 1;

/// Identifier the kernel assigns to a connection at handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(uuid::Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &uuid::Uuid {
        &self.0
    }

    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        let uuid = uuid::Uuid::parse_str(s)?;
        Ok(Self(uuid))
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opcodes in the registry subset of the kernel's command language.
///
/// The full instruction set is much larger; these are the commands this
/// client issues. Stack effects are written `[args] -> [results]`, bottom
/// of stack first.
pub mod op {
    /// `[] -> [name, ...]` - node-model partition membership.
    pub const NODE_MODELS: &str = "node_models";
    /// `[] -> [name, ...]` - synapse-model partition membership.
    pub const SYNAPSE_MODELS: &str = "synapse_models";
    /// `[] -> [name, ...]` - connection-rule partition membership.
    pub const CONNECTION_RULES: &str = "connection_rules";
    /// `[model] -> [defaults]` - fetch a model's default parameter set.
    pub const GET_DEFAULTS: &str = "get_defaults";
    /// `[model, updates] -> []` - overwrite named keys in a model's defaults.
    pub const SET_DEFAULTS: &str = "set_defaults";
    /// `[existing, new, overrides] -> []` - register a copy of a model.
    pub const COPY_MODEL: &str = "copy_model";
}

/// Frames from client to kernel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Request {
    /// Must be the first frame on a fresh connection.
    Hello { client: String, protocol: u32 },

    /// Execute `op` with `args` pushed onto the operand stack in order.
    Invoke { op: String, args: Vec<ParamValue> },
}

/// Frames from kernel to client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    /// Answer to [`Request::Hello`].
    Welcome {
        session: SessionId,
        kernel: String,
        protocol: u32,
    },

    /// Command completed; `values` is what it left on the stack.
    Ok { values: Vec<ParamValue> },

    /// Command rejected or failed inside the kernel. The message is
    /// kernel-authored; this client never parses it.
    Error { op: String, message: String },
}

//! axon: Rust client for the soma simulation kernel's model registry.

mod validation;
mod version;

pub mod advisory;
pub mod bridge;
pub mod channel;
pub mod error;
pub mod params;
pub mod registry;
pub mod transport;

pub use advisory::{Advisory, AdvisoryKind, AdvisorySink, LogSink, MemorySink};
pub use bridge::protocol::{PROTOCOL_VERSION, SessionId};
pub use channel::{CommandChannel, KernelChannel};
pub use error::{ChannelError, RegistryError, Result, UsageError};
pub use params::{ParamMap, ParamValue, to_json};
pub use registry::{ModelKind, ModelRegistry};
pub use transport::{ConnectOptions, SOCKET_ENV};
pub use version::{AXON_VERSION, VersionInfo};

//! Where to find a running kernel.
//!
//! The kernel binds its registry socket at a well-known path; deployments
//! that relocate it export `SOMA_KERNEL_SOCKET`. Explicit paths always win
//! over the environment.

use std::env;
use std::path::PathBuf;

use crate::version::AXON_VERSION;

/// Environment variable naming the kernel's registry socket.
pub const SOCKET_ENV: &str = "SOMA_KERNEL_SOCKET";

/// Socket filename the kernel binds when no override is configured.
const SOCKET_FILE: &str = "soma-kernel.sock";

/// Connection settings for [`KernelChannel::connect`].
///
/// [`KernelChannel::connect`]: crate::channel::KernelChannel::connect
#[derive(Debug, Clone)]
pub struct ConnectOptions {
    socket: Option<PathBuf>,
    client: String,
}

impl Default for ConnectOptions {
    fn default() -> Self {
        Self {
            socket: None,
            client: format!("axon/{AXON_VERSION}"),
        }
    }
}

impl ConnectOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use an explicit socket path instead of the environment/default chain.
    pub fn with_socket(mut self, path: impl Into<PathBuf>) -> Self {
        self.socket = Some(path.into());
        self
    }

    /// Identity string announced to the kernel at handshake.
    pub fn with_client(mut self, client: impl Into<String>) -> Self {
        self.client = client.into();
        self
    }

    pub fn client(&self) -> &str {
        &self.client
    }

    /// Resolve the socket to connect to: explicit path, then
    /// `SOMA_KERNEL_SOCKET`, then the system temp directory.
    pub fn socket_path(&self) -> PathBuf {
        if let Some(path) = &self.socket {
            return path.clone();
        }
        if let Ok(path) = env::var(SOCKET_ENV)
            && !path.is_empty()
        {
            return PathBuf::from(path);
        }
        env::temp_dir().join(SOCKET_FILE)
    }
}

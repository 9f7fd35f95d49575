//! The command channel: one synchronous exchange at a time.
//!
//! Flow:
//! 1. Connect to the kernel's registry socket
//! 2. Send Hello, wait for Welcome (version check, session assignment)
//! 3. Per command: send one Invoke frame, read one Ok/Error frame
//!
//! The kernel applies commands in receipt order, so two sequential writes
//! from the same channel land in the order they were issued. There is no
//! pipelining; `&mut self` on [`CommandChannel::execute`] keeps that
//! one-command-in-flight contract visible in the types.

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::net::UnixStream;
use tokio::net::unix::{OwnedReadHalf, OwnedWriteHalf};
use tokio_util::codec::{FramedRead, FramedWrite};

use crate::bridge::codec::JsonCodec;
use crate::bridge::protocol::{PROTOCOL_VERSION, Request, Response, SessionId};
use crate::error::{ChannelError, RegistryError, Result};
use crate::params::ParamValue;
use crate::transport::ConnectOptions;
use crate::version::VersionInfo;

/// A synchronous command exchange with the kernel.
///
/// Arguments are pushed onto the kernel's operand stack in call order; the
/// result stack comes back once the opcode has run. Implementations never
/// retry: a command that reached the kernel may have mutated the registry,
/// and registry mutations are not idempotent.
#[async_trait]
pub trait CommandChannel: Send {
    async fn execute(&mut self, op: &str, args: Vec<ParamValue>) -> Result<Vec<ParamValue>>;
}

/// Socket-backed channel to a running kernel.
#[derive(Debug)]
pub struct KernelChannel {
    session: SessionId,
    kernel_version: String,
    reader: FramedRead<OwnedReadHalf, JsonCodec<Response>>,
    writer: FramedWrite<OwnedWriteHalf, JsonCodec<Request>>,
}

impl KernelChannel {
    /// Connect to the socket `options` resolves to and run the handshake.
    pub async fn connect(options: &ConnectOptions) -> std::result::Result<Self, ChannelError> {
        let path = options.socket_path();
        let stream =
            UnixStream::connect(&path)
                .await
                .map_err(|source| ChannelError::Connect {
                    path: path.clone(),
                    source,
                })?;
        tracing::debug!(path = %path.display(), "Connected to kernel socket");
        Self::from_stream_as(stream, options.client()).await
    }

    /// Run the handshake over an already-open stream.
    ///
    /// This is how tests attach to an in-process stub over a socket pair.
    pub async fn from_stream(stream: UnixStream) -> std::result::Result<Self, ChannelError> {
        let options = ConnectOptions::default();
        Self::from_stream_as(stream, options.client()).await
    }

    async fn from_stream_as(
        stream: UnixStream,
        client: &str,
    ) -> std::result::Result<Self, ChannelError> {
        let (read_half, write_half) = stream.into_split();
        let mut reader = FramedRead::new(read_half, JsonCodec::<Response>::new());
        let mut writer = FramedWrite::new(write_half, JsonCodec::<Request>::new());

        writer
            .send(Request::Hello {
                client: client.to_string(),
                protocol: PROTOCOL_VERSION,
            })
            .await?;

        match reader.next().await {
            Some(Ok(Response::Welcome {
                session,
                kernel,
                protocol,
            })) => {
                if protocol != PROTOCOL_VERSION {
                    return Err(ChannelError::Handshake(format!(
                        "kernel speaks protocol {protocol}, this client speaks {PROTOCOL_VERSION}"
                    )));
                }
                tracing::debug!(%session, kernel = %kernel, "Kernel handshake complete");
                Ok(Self {
                    session,
                    kernel_version: kernel,
                    reader,
                    writer,
                })
            }
            Some(Ok(Response::Error { message, .. })) => Err(ChannelError::Handshake(message)),
            Some(Ok(Response::Ok { .. })) => {
                Err(ChannelError::Protocol("ok frame during handshake".to_string()))
            }
            Some(Err(err)) => Err(ChannelError::Io(err)),
            None => Err(ChannelError::Disconnected),
        }
    }

    /// Session identifier the kernel assigned at handshake.
    pub fn session(&self) -> SessionId {
        self.session
    }

    /// Version string the kernel reported at handshake.
    pub fn kernel_version(&self) -> &str {
        &self.kernel_version
    }

    pub fn version_info(&self) -> VersionInfo {
        VersionInfo::new().with_kernel(self.kernel_version.clone())
    }
}

#[async_trait]
impl CommandChannel for KernelChannel {
    async fn execute(&mut self, op: &str, args: Vec<ParamValue>) -> Result<Vec<ParamValue>> {
        tracing::trace!(op, args = args.len(), "Issuing command");
        self.writer
            .send(Request::Invoke {
                op: op.to_string(),
                args,
            })
            .await
            .map_err(ChannelError::Io)?;

        match self.reader.next().await {
            Some(Ok(Response::Ok { values })) => Ok(values),
            Some(Ok(Response::Error { op, message })) => {
                tracing::debug!(op = %op, "Kernel rejected command");
                Err(RegistryError::Kernel { op, message })
            }
            Some(Ok(Response::Welcome { .. })) => {
                Err(ChannelError::Protocol("welcome frame outside handshake".to_string()).into())
            }
            Some(Err(err)) => Err(ChannelError::Io(err).into()),
            None => Err(ChannelError::Disconnected.into()),
        }
    }
}

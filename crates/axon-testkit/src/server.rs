//! Socket front end for the stub kernel.
//!
//! Speaks the registry wire protocol: one handshake, then a strict
//! one-frame-in one-frame-out command loop. Faults become error frames;
//! session teardown is a plain hangup.

use std::sync::{Arc, Mutex, MutexGuard};

use futures::{SinkExt, StreamExt};
use tokio::net::{UnixListener, UnixStream};
use tokio_util::codec::{FramedRead, FramedWrite};

use axon::KernelChannel;
use axon::bridge::codec::JsonCodec;
use axon::bridge::protocol::{PROTOCOL_VERSION, Request, Response, SessionId};
use axon::error::ChannelError;

use crate::kernel::StubKernel;

/// Kernel state shared between the serving task and the test body.
pub type SharedKernel = Arc<Mutex<StubKernel>>;

fn lock_kernel(kernel: &SharedKernel) -> MutexGuard<'_, StubKernel> {
    match kernel.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Serve one session over an already-open stream.
///
/// Returns when the peer hangs up or the handshake is refused.
pub async fn serve_stream(kernel: SharedKernel, stream: UnixStream) -> anyhow::Result<()> {
    let (read_half, write_half) = stream.into_split();
    let mut reader = FramedRead::new(read_half, JsonCodec::<Request>::new());
    let mut writer = FramedWrite::new(write_half, JsonCodec::<Response>::new());

    match reader.next().await {
        Some(Ok(Request::Hello { client, protocol })) => {
            if protocol != PROTOCOL_VERSION {
                writer
                    .send(Response::Error {
                        op: "hello".to_string(),
                        message: format!("unsupported protocol {protocol}"),
                    })
                    .await?;
                return Ok(());
            }
            let session = SessionId::new();
            tracing::debug!(%session, client = %client, "Session opened");
            writer
                .send(Response::Welcome {
                    session,
                    kernel: format!("soma-stub/{}", env!("CARGO_PKG_VERSION")),
                    protocol: PROTOCOL_VERSION,
                })
                .await?;
        }
        Some(Ok(Request::Invoke { op, .. })) => {
            writer
                .send(Response::Error {
                    op,
                    message: "no session, expected a hello frame".to_string(),
                })
                .await?;
            return Ok(());
        }
        Some(Err(err)) => return Err(err.into()),
        None => return Ok(()),
    }

    while let Some(frame) = reader.next().await {
        let response = match frame? {
            Request::Invoke { op, args } => {
                let outcome = lock_kernel(&kernel).apply(&op, args);
                match outcome {
                    Ok(values) => Response::Ok { values },
                    Err(fault) => {
                        tracing::debug!(op = %op, fault = %fault, "Command faulted");
                        Response::Error {
                            op,
                            message: fault.to_string(),
                        }
                    }
                }
            }
            Request::Hello { .. } => Response::Error {
                op: "hello".to_string(),
                message: "session already open".to_string(),
            },
        };
        writer.send(response).await?;
    }
    Ok(())
}

/// Accept sessions forever, one serving task per connection.
pub async fn serve(kernel: SharedKernel, listener: UnixListener) -> anyhow::Result<()> {
    loop {
        let (stream, _) = listener.accept().await?;
        let kernel = Arc::clone(&kernel);
        tokio::spawn(async move {
            if let Err(err) = serve_stream(kernel, stream).await {
                tracing::warn!(error = %err, "Stub session ended with error");
            }
        });
    }
}

/// Spin up a stub kernel on one end of a socket pair and hand back a
/// connected channel plus a handle on the kernel state.
pub async fn spawn_pair(kernel: StubKernel) -> Result<(KernelChannel, SharedKernel), ChannelError> {
    let shared = Arc::new(Mutex::new(kernel));
    let (client, server) = UnixStream::pair().map_err(ChannelError::Io)?;

    let serving = Arc::clone(&shared);
    tokio::spawn(async move {
        if let Err(err) = serve_stream(serving, server).await {
            tracing::warn!(error = %err, "Stub session ended with error");
        }
    });

    let channel = KernelChannel::from_stream(client).await?;
    Ok((channel, shared))
}

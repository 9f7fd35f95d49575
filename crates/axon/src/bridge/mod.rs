//! Wire layer for client-kernel communication.
//!
//! The kernel listens on a Unix-domain socket and speaks length-prefixed
//! JSON frames. This module provides:
//!
//! - **protocol**: message types (Request/Response) and the session handshake
//! - **codec**: JSON framing codec for AsyncRead/AsyncWrite

pub mod codec;
pub mod protocol;

//! In-process stand-in for the soma kernel's registry protocol.
//!
//! Tests drive the real client against [`StubKernel`], either directly
//! through [`StubKernel::apply`] or over a socket pair via
//! [`spawn_pair`], which runs the full framed wire protocol.

mod catalog;

pub mod kernel;
pub mod server;

pub use kernel::{KernelFault, StubKernel};
pub use server::{SharedKernel, serve, serve_stream, spawn_pair};

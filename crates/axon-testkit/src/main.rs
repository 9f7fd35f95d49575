//! soma-stub: run a stub kernel on a unix socket.
//!
//! Binds the built-in catalog behind the real wire protocol so clients can
//! be exercised without a kernel installation.

use std::path::PathBuf;
use std::process;
use std::sync::{Arc, Mutex};

use tokio::net::UnixListener;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use axon::{ConnectOptions, SOCKET_ENV};
use axon_testkit::{StubKernel, serve};

/// Initialize tracing with SOMA_LOG and LOG_FORMAT support.
fn init_tracing() {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        let level = match std::env::var("SOMA_LOG").as_deref() {
            Ok("debug") => "debug",
            Ok("warn") | Ok("warning") => "warn",
            Ok("error") => "error",
            _ => "info",
        };
        EnvFilter::new(format!("axon={level},axon_testkit={level},soma_stub={level}"))
    };

    let use_json = std::env::var("LOG_FORMAT").as_deref() == Ok("json");

    if use_json {
        let subscriber = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr));
        let _ = subscriber.try_init();
    } else {
        let subscriber = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr));
        let _ = subscriber.try_init();
    }
}

/// Explicit argument wins, then the same resolution clients use.
fn socket_path(args: &[String]) -> Result<PathBuf, String> {
    match args.len() {
        1 => Ok(ConnectOptions::new().socket_path()),
        2 => Ok(PathBuf::from(&args[1])),
        n => Err(format!("expected at most one argument, got {}", n - 1)),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();

    let path = match socket_path(&args) {
        Ok(path) => path,
        Err(msg) => {
            eprintln!("error: {msg}");
            eprintln!();
            eprintln!("Usage: soma-stub [socket-path]");
            eprintln!();
            eprintln!("Binds a stub registry kernel to the given unix socket.");
            eprintln!("Without an argument the socket comes from ${SOCKET_ENV},");
            eprintln!("falling back to the temp directory.");
            process::exit(2);
        }
    };

    init_tracing();

    if path.exists() {
        std::fs::remove_file(&path)?;
    }
    let listener = UnixListener::bind(&path)?;
    tracing::info!(path = %path.display(), "Stub kernel listening");

    let kernel = Arc::new(Mutex::new(StubKernel::with_builtins()));
    serve(kernel, listener).await
}

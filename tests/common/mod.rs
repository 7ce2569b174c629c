//! Shared helpers for loopback tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Once;
use std::time::Duration;

use anyhow::{Result, bail};
use pollnet::{Bridge, Handle, HostValue, Marshaller, SocketEvent};
use tokio::net::TcpListener;
use tokio::runtime::Handle as RuntimeHandle;
use tokio::time::sleep;
use tracing_subscriber::EnvFilter;

/// Poll interval while waiting for a result.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Polls before a wait is declared failed.
const MAX_POLLS: usize = 500;

static INIT: Once = Once::new();

/// Installs a test subscriber honouring `RUST_LOG`.
pub fn init_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Builds a bridge on the test's own runtime.
pub fn bridge() -> Result<Bridge> {
    init_tracing();
    Ok(Bridge::builder()
        .runtime_handle(RuntimeHandle::current())
        .build()?)
}

/// Returns a loopback port with nothing listening on it.
pub async fn closed_port() -> Result<SocketAddr> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    Ok(listener.local_addr()?)
}

/// Waits for the next socket event.
pub async fn next_event(bridge: &mut Bridge) -> Result<SocketEvent> {
    for _ in 0..MAX_POLLS {
        let handle = bridge.ws_try_recv();
        if !handle.is_none() {
            let value = bridge.handles_mut().consume(handle)?;
            return Ok(SocketEvent::from_host_value(&value)?);
        }
        sleep(POLL_INTERVAL).await;
    }
    bail!("timed out waiting for a socket event")
}

/// Waits for the result of request `id`.
pub async fn next_result(bridge: &mut Bridge, id: i32) -> Result<HostValue> {
    for _ in 0..MAX_POLLS {
        let handle = bridge.http_try_recv(id);
        if !handle.is_none() {
            return Ok(bridge.handles_mut().consume(handle)?);
        }
        sleep(POLL_INTERVAL).await;
    }
    bail!("timed out waiting for request {id}")
}

/// Wraps a string argument.
pub fn wrap(bridge: &mut Bridge, value: &str) -> Handle {
    bridge.handles_mut().wrap_string(value)
}

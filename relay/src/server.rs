//! The server loop, SPEC_FULL §4.G: owns the endpoint and the registry, dispatches
//! each datagram to either a command handler or broadcast fan-out, and races the
//! receive loop and the sweeper against shutdown.

use std::sync::Arc;
use std::time::{Duration, Instant};

use relay_core::{classify, parse_command, Classification, RelayError, Registry};
use tracing::{info, trace, warn};

use crate::broadcast;
use crate::endpoint::{Endpoint, Received};
use crate::handlers;
use crate::sweeper;

pub struct Server {
    endpoint: Endpoint,
    registry: Arc<Registry>,
    heartbeat_secs: u64,
    sweep_interval: Duration,
}

impl Server {
    pub async fn bind(
        addr: &str,
        registry: Arc<Registry>,
        heartbeat_secs: u64,
        sweep_interval: Duration,
    ) -> std::io::Result<Self> {
        let endpoint = Endpoint::bind(addr).await?;
        Ok(Self { endpoint, registry, heartbeat_secs, sweep_interval })
    }

    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.endpoint.local_addr()
    }

    /// Runs until `shutdown` resolves. The receive loop and the sweeper are two
    /// independent tasks sharing one `Arc<Registry>` guarded by its own mutex — no
    /// per-entity locking, per §5.
    pub async fn run(self, shutdown: impl std::future::Future<Output = ()>) {
        let registry = self.registry.clone();
        let sweep_interval = self.sweep_interval;

        tokio::select! {
            () = self.receive_loop() => {}
            () = sweeper::run(registry, sweep_interval) => {}
            () = shutdown => {
                info!("shutdown requested");
            }
        }
    }

    async fn receive_loop(&self) {
        loop {
            match self.endpoint.recv().await {
                Ok(Received::Datagram(bytes, src)) => self.dispatch(&bytes, src).await,
                Ok(Received::TooLarge(src)) => {
                    trace!(%src, "datagram filled receive buffer, rejecting as too large");
                    let reply = RelayError::too_large().to_string();
                    self.endpoint.send(reply.as_bytes(), src).await;
                }
                Err(e) => {
                    warn!(error = %e, "failed to receive datagram");
                }
            }
        }
    }

    async fn dispatch(&self, bytes: &[u8], src: std::net::SocketAddr) {
        let now = Instant::now();
        match classify(bytes) {
            Classification::Command(bytes) => {
                // Unlike the handlers below, a parse failure never reaches a handler,
                // so it does not call touch() — an unrecognized verb doesn't count as
                // activity per §4.D's "each handler first calls touch".
                let reply = match parse_command(bytes) {
                    Ok(cmd) => handlers::handle(&self.registry, src, cmd, now, self.heartbeat_secs),
                    Err(e) => e.to_string(),
                };
                self.endpoint.send(reply.as_bytes(), src).await;
            }
            Classification::Payload(payload) => {
                if let Some(err) = broadcast::fan_out(&self.endpoint, &self.registry, src, payload, now).await {
                    self.endpoint.send(err.to_string().as_bytes(), src).await;
                }
            }
        }
    }
}

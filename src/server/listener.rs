use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, error, info, warn, Instrument};

use crate::config::Config;
use crate::http::connection::Connection;

/// The accept loop and everything it owns.
///
/// One task is spawned per accepted connection. Tasks share only the
/// read-only configuration. Stopping is explicit: a [`ShutdownHandle`]
/// flips a watch signal, the accept loop exits and releases the listener,
/// then in-flight connections get `shutdown_grace` to finish before they
/// are aborted.
pub struct Server {
    listener: TcpListener,
    config: Arc<Config>,
    shutdown: Arc<watch::Sender<bool>>,
}

/// Cloneable handle that asks a running [`Server`] to stop.
#[derive(Clone)]
pub struct ShutdownHandle {
    shutdown: Arc<watch::Sender<bool>>,
}

impl ShutdownHandle {
    pub fn stop(&self) {
        info!("Server stopping");
        self.shutdown.send_replace(true);
    }

    pub fn is_stopped(&self) -> bool {
        *self.shutdown.borrow()
    }
}

impl Server {
    pub async fn bind(config: Config) -> anyhow::Result<Self> {
        let listener = TcpListener::bind(&config.listen_addr)
            .await
            .with_context(|| format!("binding {}", config.listen_addr))?;
        let (shutdown, _) = watch::channel(false);

        Ok(Self {
            listener,
            config: Arc::new(config),
            shutdown: Arc::new(shutdown),
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            shutdown: Arc::clone(&self.shutdown),
        }
    }

    /// Accepts connections until stopped, then drains in-flight ones.
    pub async fn run(self) -> anyhow::Result<()> {
        let mut stopped = self.shutdown.subscribe();
        let mut tasks = JoinSet::new();

        info!(address = %self.local_addr()?, "Listening");
        if self.config.directory.is_none() {
            warn!("No serving directory configured, /files/ routes will fail");
        }

        loop {
            if *stopped.borrow_and_update() {
                break;
            }

            tokio::select! {
                _ = stopped.changed() => continue,

                accepted = self.listener.accept() => match accepted {
                    Ok((socket, peer)) => {
                        debug!(peer = %peer, "Accepted connection");

                        let config = Arc::clone(&self.config);
                        let span = tracing::debug_span!("conn", peer = %peer);
                        tasks.spawn(
                            async move {
                                let mut conn = Connection::new(socket, config);
                                if let Err(e) = conn.run().await {
                                    debug!(error = %e, "Connection aborted");
                                }
                            }
                            .instrument(span),
                        );
                    }
                    Err(e) => {
                        error!(error = %e, "Failed to accept connection");
                    }
                },

                Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                    log_join(joined);
                }
            }
        }

        let Self { listener, config, .. } = self;
        drop(listener);
        info!(in_flight = tasks.len(), "Stopped accepting connections");

        let drain = async {
            while let Some(joined) = tasks.join_next().await {
                log_join(joined);
            }
        };

        if tokio::time::timeout(config.shutdown_grace, drain).await.is_err() {
            warn!(
                remaining = tasks.len(),
                "Shutdown grace period elapsed, aborting connections"
            );
            tasks.shutdown().await;
        }

        info!("Server stopped");
        Ok(())
    }
}

fn log_join(joined: Result<(), JoinError>) {
    if let Err(e) = joined {
        if e.is_panic() {
            error!(error = %e, "Connection task panicked");
        }
    }
}

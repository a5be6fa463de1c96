//! Tunnel broker protocol.
//!
//! A lease is requested with `GET {endpoint}/{subdomain}`. The broker
//! answers with the identifier it actually granted, the public URL, and
//! a TCP rendezvous port. The client then holds `max_conn_count` relay
//! connections to that port, each bidirectionally piped to the local
//! listener.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use thiserror::Error;
use tokio::io::copy_bidirectional;
use tokio::net::TcpStream;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::session::TunnelSession;

/// Pause before reopening a relay connection that failed or closed.
const RELAY_REOPEN_DELAY: Duration = Duration::from_secs(1);

fn default_conn_count() -> u8 {
    4
}

/// Lease response from the broker.
#[derive(Debug, Clone, Deserialize)]
pub struct TunnelLease {
    /// Identifier the broker granted. May differ from the request.
    pub id: String,
    /// TCP rendezvous port on the broker host.
    pub port: u16,
    /// Public URL assigned to this lease.
    pub url: String,
    /// How many relay connections the broker accepts.
    #[serde(default = "default_conn_count")]
    pub max_conn_count: u8,
}

/// Error negotiating with the broker.
#[derive(Debug, Error)]
pub enum BrokerError {
    /// The configured endpoint cannot be used at all. This is the one
    /// unrecoverable case; everything else is retried.
    #[error("invalid broker endpoint {endpoint}: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    #[error("broker request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("broker rejected lease request with status {0}")]
    Rejected(u16),
}

/// Negotiates tunnels with a broker.
#[async_trait]
pub trait TunnelBroker: Send + Sync {
    /// Request a lease for `subdomain`, delivering traffic to
    /// `127.0.0.1:{local_port}`. A returned session may carry a granted
    /// identifier that differs from the request; the caller decides
    /// whether to keep it.
    async fn lease(&self, subdomain: &str, local_port: u16) -> Result<TunnelSession, BrokerError>;
}

/// HTTP implementation of the broker protocol.
pub struct HttpBroker {
    endpoint: Url,
    client: reqwest::Client,
}

impl HttpBroker {
    /// Build a broker client for the given endpoint (e.g.
    /// `https://proxy.acu.run/`).
    pub fn new(endpoint: &str) -> Result<Self, BrokerError> {
        let endpoint = Url::parse(endpoint).map_err(|e| BrokerError::InvalidEndpoint {
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        })?;
        if endpoint.host_str().is_none() {
            return Err(BrokerError::InvalidEndpoint {
                endpoint: endpoint.to_string(),
                reason: "endpoint has no host".to_string(),
            });
        }
        Ok(Self {
            endpoint,
            client: reqwest::Client::new(),
        })
    }

    fn lease_url(&self, subdomain: &str) -> Result<Url, BrokerError> {
        self.endpoint
            .join(subdomain)
            .map_err(|e| BrokerError::InvalidEndpoint {
                endpoint: self.endpoint.to_string(),
                reason: e.to_string(),
            })
    }
}

#[async_trait]
impl TunnelBroker for HttpBroker {
    async fn lease(&self, subdomain: &str, local_port: u16) -> Result<TunnelSession, BrokerError> {
        let response = self.client.get(self.lease_url(subdomain)?).send().await?;
        if !response.status().is_success() {
            return Err(BrokerError::Rejected(response.status().as_u16()));
        }
        let lease: TunnelLease = response.json().await?;
        debug!(
            granted = %lease.id,
            url = %lease.url,
            rendezvous_port = lease.port,
            "broker lease obtained"
        );

        // host_str is validated in new()
        let remote = format!("{}:{}", self.endpoint.host_str().unwrap_or_default(), lease.port);
        let cancel = CancellationToken::new();
        let supervisor = tokio::spawn(run_relays(
            remote,
            local_port,
            lease.max_conn_count,
            cancel.clone(),
        ));

        Ok(TunnelSession::new(
            lease.id,
            lease.url,
            local_port,
            cancel,
            Some(supervisor),
        ))
    }
}

/// Keep `conn_count` relay connections alive until cancelled.
async fn run_relays(remote: String, local_port: u16, conn_count: u8, cancel: CancellationToken) {
    let mut relays = JoinSet::new();
    for slot in 0..conn_count.max(1) {
        let remote = remote.clone();
        let cancel = cancel.clone();
        relays.spawn(async move {
            relay_loop(slot, &remote, local_port, &cancel).await;
        });
    }
    while relays.join_next().await.is_some() {}
}

/// One relay slot: connect to the rendezvous port, pipe bytes to the
/// local listener, reopen when either side closes.
async fn relay_loop(slot: u8, remote: &str, local_port: u16, cancel: &CancellationToken) {
    loop {
        if cancel.is_cancelled() {
            return;
        }

        let connected = tokio::select! {
            () = cancel.cancelled() => return,
            conn = TcpStream::connect(remote) => conn,
        };

        match connected {
            Ok(mut remote_stream) => {
                match TcpStream::connect(("127.0.0.1", local_port)).await {
                    Ok(mut local_stream) => {
                        tokio::select! {
                            () = cancel.cancelled() => return,
                            result = copy_bidirectional(&mut remote_stream, &mut local_stream) => {
                                match result {
                                    Ok((up, down)) => debug!(
                                        slot, bytes_up = up, bytes_down = down,
                                        "relay connection closed"
                                    ),
                                    Err(e) => debug!(slot, "relay connection ended: {e}"),
                                }
                            }
                        }
                    }
                    Err(e) => {
                        warn!(slot, local_port, "local listener unreachable: {e}");
                    }
                }
            }
            Err(e) => {
                warn!(slot, remote, "relay connect failed: {e}");
            }
        }

        tokio::select! {
            () = cancel.cancelled() => return,
            () = tokio::time::sleep(RELAY_REOPEN_DELAY) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lease_parses_broker_response() {
        let lease: TunnelLease = serde_json::from_str(
            r#"{"id": "abc", "port": 41231, "url": "https://abc.acu.run", "max_conn_count": 10}"#,
        )
        .unwrap();
        assert_eq!(lease.id, "abc");
        assert_eq!(lease.port, 41231);
        assert_eq!(lease.max_conn_count, 10);
    }

    #[test]
    fn lease_conn_count_defaults_when_absent() {
        let lease: TunnelLease =
            serde_json::from_str(r#"{"id": "abc", "port": 41231, "url": "https://abc.acu.run"}"#)
                .unwrap();
        assert_eq!(lease.max_conn_count, 4);
    }

    #[test]
    fn invalid_endpoint_is_rejected_up_front() {
        assert!(matches!(
            HttpBroker::new("not a url"),
            Err(BrokerError::InvalidEndpoint { .. })
        ));
    }
}

//! Retrying tunnel acquisition.

use std::time::Duration;

use tracing::{info, warn};

use crate::broker::TunnelBroker;
use crate::session::TunnelSession;

/// Acquisition parameters.
#[derive(Debug, Clone)]
pub struct TunnelConfig {
    /// Local port tunneled traffic is delivered to.
    pub port: u16,
    /// Constant delay between attempts. No jitter, no growth.
    pub retry_delay: Duration,
}

impl Default for TunnelConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            retry_delay: Duration::from_millis(10_000),
        }
    }
}

/// Acquire a tunnel on the exact requested subdomain.
///
/// Loops forever until the broker grants precisely `subdomain`; the
/// service is meaningless without its named public endpoint, so there is
/// no attempt cutoff. A lease granted under any other identifier is
/// closed before the next attempt so connections never leak. The delay
/// between attempts is constant by design.
pub async fn acquire_tunnel(
    broker: &dyn TunnelBroker,
    subdomain: &str,
    config: &TunnelConfig,
) -> TunnelSession {
    loop {
        match broker.lease(subdomain, config.port).await {
            Ok(session) => {
                if session.granted_id() == subdomain {
                    info!(
                        subdomain,
                        url = session.public_url(),
                        "tunnel established"
                    );
                    return session;
                }
                warn!(
                    requested = subdomain,
                    granted = session.granted_id(),
                    url = session.public_url(),
                    "failed to claim subdomain, closing lease"
                );
                session.close().await;
            }
            Err(e) => {
                warn!("error creating tunnel: {e}");
            }
        }

        tokio::time::sleep(config.retry_delay).await;
    }
}

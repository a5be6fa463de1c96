//! Owned handle to an established tunnel.

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// A negotiated tunnel and its relay connections.
///
/// The session exclusively owns the underlying connections: dropping or
/// closing it cancels every relay task. A session is only *valid* when
/// the broker-granted identifier equals the requested subdomain; the
/// acquisition loop tears down anything else before retrying.
#[derive(Debug)]
pub struct TunnelSession {
    granted_id: String,
    public_url: String,
    local_port: u16,
    cancel: CancellationToken,
    supervisor: Option<JoinHandle<()>>,
}

impl TunnelSession {
    pub fn new(
        granted_id: impl Into<String>,
        public_url: impl Into<String>,
        local_port: u16,
        cancel: CancellationToken,
        supervisor: Option<JoinHandle<()>>,
    ) -> Self {
        Self {
            granted_id: granted_id.into(),
            public_url: public_url.into(),
            local_port,
            cancel,
            supervisor,
        }
    }

    /// Identifier the broker actually granted.
    pub fn granted_id(&self) -> &str {
        &self.granted_id
    }

    /// Public URL traffic arrives on.
    pub fn public_url(&self) -> &str {
        &self.public_url
    }

    /// Local port tunneled traffic is delivered to.
    pub fn local_port(&self) -> u16 {
        self.local_port
    }

    /// Tear the tunnel down and wait for its relay tasks to finish.
    pub async fn close(mut self) {
        self.cancel.cancel();
        if let Some(supervisor) = self.supervisor.take() {
            let _ = supervisor.await;
        }
    }
}

impl Drop for TunnelSession {
    fn drop(&mut self) {
        // Close without await: relays observe the token and exit on their own.
        self.cancel.cancel();
    }
}

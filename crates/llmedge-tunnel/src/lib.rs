//! Tunnel acquisition for the llmedge gateway.
//!
//! The broker speaks a localtunnel-style protocol: an HTTP lease request
//! names a subdomain, the broker answers with a public URL and a TCP
//! rendezvous port, and the client keeps a handful of relay connections
//! open that pipe tunneled traffic to the local listener.
//!
//! Acquisition retries forever with a constant delay until the broker
//! grants the *exact* requested subdomain; see [`client::acquire_tunnel`].

#![deny(unused_crate_dependencies)]

pub mod broker;
pub mod client;
pub mod session;

pub use broker::{BrokerError, HttpBroker, TunnelBroker, TunnelLease};
pub use client::{acquire_tunnel, TunnelConfig};
pub use session::TunnelSession;

//! Device identity port.

/// Identity of the device the gateway runs on.
///
/// The address doubles as the requested tunnel subdomain, so
/// implementations must return it lowercased.
pub trait DeviceIdentity: Send + Sync {
    fn address(&self) -> String;
}

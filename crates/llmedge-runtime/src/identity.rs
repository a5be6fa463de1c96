//! Device identity backed by configuration.

use llmedge_core::ports::DeviceIdentity;

/// Identity with a fixed, pre-resolved address.
///
/// The hosting platform hands the device address to the process through
/// the environment; this adapter normalizes it once at construction.
#[derive(Debug, Clone)]
pub struct StaticDeviceIdentity {
    address: String,
}

impl StaticDeviceIdentity {
    pub fn new(address: impl AsRef<str>) -> Self {
        Self {
            address: address.as_ref().to_lowercase(),
        }
    }
}

impl DeviceIdentity for StaticDeviceIdentity {
    fn address(&self) -> String {
        self.address.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_is_lowercased() {
        let identity = StaticDeviceIdentity::new("0xAbCd123");
        assert_eq!(identity.address(), "0xabcd123");
    }
}

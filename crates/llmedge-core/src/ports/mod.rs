//! Port definitions (trait abstractions) for platform capabilities.
//!
//! The hosting platform exposes device identity and inference-process
//! lifecycle control. Both are modeled as explicit ports passed into the
//! orchestrator instead of ambient globals.

pub mod device;
pub mod inference;

pub use device::DeviceIdentity;
pub use inference::{InferenceLaunchSpec, InferenceProcess, ProcessError};

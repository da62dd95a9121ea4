// Error taxonomy
//
// Every variant is recovered locally: initialization failures select the CPU
// path, per-frame failures skip the upload for that frame.

use crate::host::GraphicsBackend;
use crate::locator::Role;

/// Errors raised while bridging or presenting a frame.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("host device object is missing required member(s): {}", format_roles(.roles))]
    MissingMember { roles: Vec<Role> },

    #[error("failed to load the Vulkan loader: {0}")]
    NativeLoad(String),

    #[error("host graphics backend is {0:?}, not Vulkan")]
    UnsupportedBackend(GraphicsBackend),

    #[error("GPU context creation returned no context")]
    ContextCreation,

    #[error("GPU surface creation failed for {width}x{height}")]
    SurfaceCreation { width: i32, height: i32 },

    #[error("CPU raster surface allocation failed for {width}x{height}")]
    CpuSurface { width: i32, height: i32 },

    #[error("pixel readback failed: {0}")]
    Readback(String),

    #[error("texture upload failed: {0}")]
    Upload(#[from] HostError),
}

/// Errors reported by the host engine's texture API.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error("buffer length {actual} does not match texture size {expected}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("texture rejected update: {0}")]
    Rejected(String),
}

fn format_roles(roles: &[Role]) -> String {
    roles
        .iter()
        .map(|role| role.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_member_lists_every_role() {
        let err = BridgeError::MissingMember {
            roles: vec![Role::Instance, Role::Queue],
        };
        assert_eq!(
            err.to_string(),
            "host device object is missing required member(s): instance, queue"
        );
    }

    #[test]
    fn host_error_converts_into_upload() {
        let err: BridgeError = HostError::LengthMismatch { expected: 16, actual: 8 }.into();
        assert!(matches!(err, BridgeError::Upload(_)));
    }
}

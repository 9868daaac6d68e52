//! Accelerator discovery.
//!
//! Turns the answers of an [`AcceleratorRuntime`] into a list of
//! [`AcceleratorInfo`] descriptors. Nothing is cached: every call re-queries
//! the runtime.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::gpu::runtime::{AcceleratorRuntime, DeviceError};

/// Information about a single accelerator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcceleratorInfo {
    /// Device index.
    pub index: usize,

    /// Device name (e.g., "NVIDIA GeForce RTX 3090").
    pub name: String,

    /// Compute capability (major, minor).
    pub compute_capability: (u32, u32),
}

/// Enumerate every accelerator the runtime exposes, in index order.
///
/// Returns an empty list when the runtime reports nothing available; that is
/// a normal outcome (CPU-only host), not an error.
pub fn detect_devices(
    runtime: &dyn AcceleratorRuntime,
) -> Result<Vec<AcceleratorInfo>, DeviceError> {
    if !runtime.is_available() {
        info!(backend = runtime.backend(), "No accelerator available");
        return Ok(Vec::new());
    }

    let count = runtime.device_count()?;
    info!(backend = runtime.backend(), count, "Accelerators detected");

    let mut devices = Vec::with_capacity(count);
    for index in 0..count {
        let name = runtime.device_name(index)?;
        let compute_capability = runtime.device_capability(index)?;
        debug!(index, name = %name, ?compute_capability, "Accelerator");
        devices.push(AcceleratorInfo {
            index,
            name,
            compute_capability,
        });
    }

    Ok(devices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::runtime::{NullRuntime, StubRuntime};

    #[test]
    fn test_detect_none() {
        let devices = detect_devices(&NullRuntime).unwrap();
        assert!(devices.is_empty());
    }

    #[test]
    fn test_detect_mixed() {
        let table = vec![
            AcceleratorInfo {
                index: 0,
                name: "NVIDIA GeForce GTX 1070".to_string(),
                compute_capability: (6, 1),
            },
            AcceleratorInfo {
                index: 1,
                name: "NVIDIA Quadro M6000".to_string(),
                compute_capability: (5, 2),
            },
        ];
        let devices = detect_devices(&StubRuntime::new(table.clone())).unwrap();
        assert_eq!(devices, table);
    }

    #[test]
    fn test_descriptor_json() {
        let info = AcceleratorInfo {
            index: 3,
            name: "NVIDIA A100-SXM4-80GB".to_string(),
            compute_capability: (8, 0),
        };
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["index"], 3);
        assert_eq!(json["compute_capability"], serde_json::json!([8, 0]));
    }
}

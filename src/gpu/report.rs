//! Human-readable accelerator inventory.

use std::io::{self, Write};

use serde::Serialize;

use crate::config::LmConfig;
use crate::gpu::device::{detect_devices, AcceleratorInfo};
use crate::gpu::runtime::AcceleratorRuntime;

/// Line printed when the runtime finds no accelerator.
pub const NO_DEVICE_MESSAGE: &str = "No GPU available. Please check your CUDA installation.";

/// Write the inventory for `runtime` to `out`.
///
/// ```text
/// Number of GPUs: 2
/// GPU 0: NVIDIA GeForce GTX 1070
///   CUDA Capability: (6, 1)
/// GPU 1: NVIDIA GeForce GTX 1070
///   CUDA Capability: (6, 1)
/// ```
///
/// A driver failure after the runtime claimed availability is returned as
/// an `io::Error` of kind `Other`.
pub fn report_devices<W: Write>(
    runtime: &dyn AcceleratorRuntime,
    out: &mut W,
) -> io::Result<()> {
    let devices = detect_devices(runtime).map_err(io::Error::other)?;
    write_inventory(&devices, out)
}

/// Render an already-collected device list.
pub fn write_inventory<W: Write>(devices: &[AcceleratorInfo], out: &mut W) -> io::Result<()> {
    if devices.is_empty() {
        return writeln!(out, "{NO_DEVICE_MESSAGE}");
    }

    writeln!(out, "Number of GPUs: {}", devices.len())?;
    for device in devices {
        let (major, minor) = device.compute_capability;
        writeln!(out, "GPU {}: {}", device.index, device.name)?;
        writeln!(out, "  CUDA Capability: ({major}, {minor})")?;
    }
    Ok(())
}

/// Machine-readable form of the full probe output.
#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    devices: &'a [AcceleratorInfo],
    config: &'a LmConfig,
}

/// Write `{"devices": [...], "config": {...}}` as pretty JSON.
pub fn write_json<W: Write>(
    devices: &[AcceleratorInfo],
    config: &LmConfig,
    out: &mut W,
) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, &JsonReport { devices, config })?;
    writeln!(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::runtime::StubRuntime;

    #[test]
    fn test_write_inventory_empty() {
        let mut buf = Vec::new();
        write_inventory(&[], &mut buf).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "No GPU available. Please check your CUDA installation.\n"
        );
    }

    #[test]
    fn test_report_single_device() {
        let mut buf = Vec::new();
        report_devices(&StubRuntime::workstation(), &mut buf).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "Number of GPUs: 1\nGPU 0: NVIDIA GeForce RTX 3090\n  CUDA Capability: (8, 6)\n"
        );
    }
}

//! Accelerator runtime backends.
//!
//! The reporter only ever asks three questions of the hardware: is anything
//! there, how many devices, and what is device `i` called / what can it do.
//! [`AcceleratorRuntime`] captures exactly that so the reporter can be driven
//! by CUDA, by nothing at all, or by a stub table in tests.

use std::fmt::Display;
use std::panic::{self, AssertUnwindSafe};

use thiserror::Error;

use crate::gpu::device::AcceleratorInfo;

#[derive(Error, Debug)]
pub enum DeviceError {
    #[error("Device index {index} out of range ({count} devices present)")]
    IndexOutOfRange { index: usize, count: usize },

    #[error("Driver error: {0}")]
    Driver(String),
}

/// Read-only view of the accelerator registry.
pub trait AcceleratorRuntime {
    /// Short backend name used in logs.
    fn backend(&self) -> &'static str;

    /// True when at least one accelerator can be used. A failed count query
    /// (no driver, no library) means no accelerator.
    fn is_available(&self) -> bool {
        match self.device_count() {
            Ok(count) => count > 0,
            Err(e) => {
                tracing::debug!(
                    backend = self.backend(),
                    error = %e,
                    "Device count query failed"
                );
                false
            }
        }
    }

    fn device_count(&self) -> Result<usize, DeviceError>;

    fn device_name(&self, index: usize) -> Result<String, DeviceError>;

    /// Compute capability as (major, minor).
    fn device_capability(&self, index: usize) -> Result<(u32, u32), DeviceError>;
}

/// Run a driver call, turning both its error and any panic it raises into
/// [`DeviceError::Driver`]. Dynamically loaded drivers panic when the shared
/// library is missing.
pub fn guard_driver<T, E, F>(call: F) -> Result<T, DeviceError>
where
    E: Display,
    F: FnOnce() -> Result<T, E>,
{
    match panic::catch_unwind(AssertUnwindSafe(call)) {
        Ok(result) => result.map_err(|e| DeviceError::Driver(e.to_string())),
        Err(payload) => {
            let msg = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "driver panicked".to_string());
            Err(DeviceError::Driver(msg))
        }
    }
}

/// Pick the best runtime compiled into this binary.
pub fn default_runtime() -> Box<dyn AcceleratorRuntime> {
    #[cfg(feature = "cuda")]
    {
        Box::new(CudaRuntime::new())
    }

    #[cfg(not(feature = "cuda"))]
    {
        Box::new(NullRuntime)
    }
}

/// Runtime for builds without any accelerator backend. Never finds a device.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullRuntime;

impl AcceleratorRuntime for NullRuntime {
    fn backend(&self) -> &'static str {
        "none"
    }

    fn is_available(&self) -> bool {
        false
    }

    fn device_count(&self) -> Result<usize, DeviceError> {
        Ok(0)
    }

    fn device_name(&self, index: usize) -> Result<String, DeviceError> {
        Err(DeviceError::IndexOutOfRange { index, count: 0 })
    }

    fn device_capability(&self, index: usize) -> Result<(u32, u32), DeviceError> {
        Err(DeviceError::IndexOutOfRange { index, count: 0 })
    }
}

/// Fixed device table standing in for real hardware.
#[derive(Debug, Clone, Default)]
pub struct StubRuntime {
    devices: Vec<AcceleratorInfo>,
}

impl StubRuntime {
    pub fn new(devices: Vec<AcceleratorInfo>) -> Self {
        Self { devices }
    }

    /// `count` identical devices, indexed from 0.
    pub fn uniform(count: usize, name: &str, compute_capability: (u32, u32)) -> Self {
        let devices = (0..count)
            .map(|index| AcceleratorInfo {
                index,
                name: name.to_string(),
                compute_capability,
            })
            .collect();
        Self { devices }
    }

    /// Single-GPU workstation: 1x RTX 3090.
    pub fn workstation() -> Self {
        Self::uniform(1, "NVIDIA GeForce RTX 3090", (8, 6))
    }

    /// Training node: 8x A100.
    pub fn training_node() -> Self {
        Self::uniform(8, "NVIDIA A100-SXM4-80GB", (8, 0))
    }

    fn get(&self, index: usize) -> Result<&AcceleratorInfo, DeviceError> {
        self.devices.get(index).ok_or(DeviceError::IndexOutOfRange {
            index,
            count: self.devices.len(),
        })
    }
}

impl AcceleratorRuntime for StubRuntime {
    fn backend(&self) -> &'static str {
        "stub"
    }

    fn device_count(&self) -> Result<usize, DeviceError> {
        Ok(self.devices.len())
    }

    fn device_name(&self, index: usize) -> Result<String, DeviceError> {
        self.get(index).map(|d| d.name.clone())
    }

    fn device_capability(&self, index: usize) -> Result<(u32, u32), DeviceError> {
        self.get(index).map(|d| d.compute_capability)
    }
}

/// CUDA driver API backend.
#[cfg(feature = "cuda")]
#[derive(Debug, Clone, Copy, Default)]
pub struct CudaRuntime;

#[cfg(feature = "cuda")]
impl CudaRuntime {
    pub fn new() -> Self {
        Self
    }

    fn context(
        &self,
        index: usize,
    ) -> Result<std::sync::Arc<cudarc::driver::CudaContext>, DeviceError> {
        let count = self.device_count()?;
        if index >= count {
            return Err(DeviceError::IndexOutOfRange { index, count });
        }
        guard_driver(|| cudarc::driver::CudaContext::new(index))
    }
}

#[cfg(feature = "cuda")]
impl AcceleratorRuntime for CudaRuntime {
    fn backend(&self) -> &'static str {
        "cuda"
    }

    fn device_count(&self) -> Result<usize, DeviceError> {
        // First touch of the driver; loads libcuda.
        let count = guard_driver(cudarc::driver::CudaContext::device_count)?;
        Ok(count.max(0) as usize)
    }

    fn device_name(&self, index: usize) -> Result<String, DeviceError> {
        let ctx = self.context(index)?;
        guard_driver(|| ctx.name())
    }

    fn device_capability(&self, index: usize) -> Result<(u32, u32), DeviceError> {
        use cudarc::driver::sys::CUdevice_attribute;

        let ctx = self.context(index)?;
        let major = guard_driver(|| {
            ctx.attribute(CUdevice_attribute::CU_DEVICE_ATTRIBUTE_COMPUTE_CAPABILITY_MAJOR)
        })?;
        let minor = guard_driver(|| {
            ctx.attribute(CUdevice_attribute::CU_DEVICE_ATTRIBUTE_COMPUTE_CAPABILITY_MINOR)
        })?;
        tracing::debug!(index, major, minor, "Queried compute capability");
        Ok((major.max(0) as u32, minor.max(0) as u32))
    }
}

//! minimind-probe: accelerator inventory and model configuration probe.
//!
//! Run before a pretraining job to confirm which GPUs the CUDA runtime can
//! see and which model configuration the job would start from.

pub mod config;
pub mod gpu;

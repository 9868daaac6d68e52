//! Accelerator discovery and reporting.
//!
//! - [`runtime`]: Runtime abstraction (CUDA, none, stub)
//! - [`device`]: Accelerator descriptors and enumeration
//! - [`report`]: Text inventory written to stdout

pub mod device;
pub mod report;
pub mod runtime;

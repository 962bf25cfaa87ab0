//! Trace-transform kernels and floating-point conversion for the Rust
//! seismic platform.
//!
//! The modules mirror the legacy OpenMP autopick/AGC filter kernels and the
//! SEG-Y word converter while providing stride-aware views, fail-fast
//! contracts, and row-parallel execution.

pub mod filters;
pub mod fpconvert;
pub mod math;
pub mod prelude;
pub mod telemetry;

pub use filters::{automatic_gain_control, energy_ratio, envelope, trace_normalize};
pub use fpconvert::{ibm2ieee, ieee2ibm};
pub use prelude::{KernelError, KernelResult, TraceLayout};

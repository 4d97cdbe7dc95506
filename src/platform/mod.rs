// Platform-specific code module

pub mod nvml;

pub use nvml::NvmlLibrary;

use std::io;
use thiserror::Error;

use crate::core::types::GpuSetting;

/// Custom error type for the rig console
#[derive(Error, Debug)]
pub enum RigError {
    /// No GPU management library or driver could be reached
    #[error("GPU driver unavailable: {0}")]
    DriverUnavailable(String),

    /// A single device could not be read
    #[error("GPU {index}: query failed: {reason}")]
    DeviceQueryFailed { index: u32, reason: String },

    /// One or both settings writes failed for a device
    #[error("GPU {index}: failed to apply {}: {reason}", format_settings(.failed))]
    DeviceApplyFailed {
        index: u32,
        failed: Vec<GpuSetting>,
        reason: String,
    },

    #[error("Host metrics unavailable: {0}")]
    MetricsUnavailable(String),

    /// Operator input rejected before any hardware call
    #[error("{0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Prompt error: {0}")]
    Prompt(#[from] dialoguer::Error),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for the rig console
pub type Result<T> = std::result::Result<T, RigError>;

fn format_settings(settings: &[GpuSetting]) -> String {
    settings
        .iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>()
        .join(" and ")
}

impl RigError {
    pub fn driver_unavailable<S: Into<String>>(msg: S) -> Self {
        RigError::DriverUnavailable(msg.into())
    }

    pub fn device_query_failed<S: Into<String>>(index: u32, reason: S) -> Self {
        RigError::DeviceQueryFailed {
            index,
            reason: reason.into(),
        }
    }

    pub fn device_apply_failed<S: Into<String>>(
        index: u32,
        failed: Vec<GpuSetting>,
        reason: S,
    ) -> Self {
        RigError::DeviceApplyFailed {
            index,
            failed,
            reason: reason.into(),
        }
    }

    pub fn metrics_unavailable<S: Into<String>>(msg: S) -> Self {
        RigError::MetricsUnavailable(msg.into())
    }

    /// Create a validation error
    pub fn validation<S: Into<String>>(msg: S) -> Self {
        RigError::Validation(msg.into())
    }

    pub fn device_not_found(index: u32) -> Self {
        RigError::Validation(format!("GPU {} not found", index))
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        RigError::Other(msg.into())
    }

    /// True when the error means GPU features are degraded for the whole session
    pub fn is_driver_unavailable(&self) -> bool {
        matches!(self, RigError::DriverUnavailable(_))
    }
}

//! Error types for the fusion pipeline
//!
//! This module provides proper error handling instead of panics.

use std::fmt;

/// Errors that can occur while configuring or running the fusion cycle
#[derive(Debug, Clone)]
pub enum FusionError {
    /// Invalid static configuration (e.g. sample interval outside the
    /// range the gain table is tabulated for)
    Configuration {
        /// Description of the configuration issue
        description: String,
    },

    /// Live tunable read failed; propagated rather than silently defaulted
    TunableRead {
        /// Description of the read failure
        description: String,
    },
}

impl fmt::Display for FusionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FusionError::Configuration { description } => {
                write!(f, "Configuration error: {}", description)
            }
            FusionError::TunableRead { description } => {
                write!(f, "Tunable read failed: {}", description)
            }
        }
    }
}

impl std::error::Error for FusionError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_error_display() {
        let err = FusionError::Configuration {
            description: "radar sample interval 0.25s outside (0.01, 0.2)".to_string(),
        };
        assert!(err.to_string().contains("0.25"));
        assert!(err.to_string().contains("Configuration"));
    }

    #[test]
    fn test_tunable_read_error_display() {
        let err = FusionError::TunableRead {
            description: "parameter store unavailable".to_string(),
        };
        assert!(err.to_string().contains("parameter store"));
    }
}

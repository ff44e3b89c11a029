use thiserror::Error;

/// Errors raised while setting up a simulation. Collisions and failed
/// transmissions are ordinary outcomes and never surface here.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    /// Packet construction with a non-positive size, bandwidth or modulation.
    #[error("Invalid packet: size={size_bytes}B bandwidth={bandwidth} modulation={modulation}")]
    InvalidParameter {
        size_bytes: u32,
        bandwidth: f64,
        modulation: f64,
    },

    /// A run that cannot produce meaningful statistics.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl SimError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, SimError>;

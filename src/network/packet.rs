use crate::error::{Result, SimError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PacketKind {
    Data,
    Control,
    Management,
}

impl Default for PacketKind {
    fn default() -> Self {
        Self::Data
    }
}

/// A frame as far as the MAC cares: how big it is and how long it holds the air.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkPacket {
    size_bytes: u32,
    kind: PacketKind,
    transmission_time_sec: f64,
}

impl NetworkPacket {
    /// `modulation` is the effective bits carried per hertz (bits per symbol times coding rate).
    pub fn new(size_bytes: u32, bandwidth: f64, modulation: f64, kind: PacketKind) -> Result<Self> {
        // Written as negations so NaN is rejected too
        if size_bytes == 0 || !(bandwidth > 0.0) || !(modulation > 0.0) {
            return Err(SimError::InvalidParameter {
                size_bytes,
                bandwidth,
                modulation,
            });
        }

        Ok(Self {
            size_bytes,
            kind,
            transmission_time_sec: (size_bytes as f64 * 8.0) / (bandwidth * modulation),
        })
    }

    pub fn data(size_bytes: u32, bandwidth: f64, modulation: f64) -> Result<Self> {
        Self::new(size_bytes, bandwidth, modulation, PacketKind::Data)
    }

    pub fn size_bytes(&self) -> u32 {
        self.size_bytes
    }

    pub fn size_bits(&self) -> f64 {
        self.size_bytes as f64 * 8.0
    }

    pub fn kind(&self) -> PacketKind {
        self.kind
    }

    pub fn transmission_time_sec(&self) -> f64 {
        self.transmission_time_sec
    }

    pub fn transmission_time_ms(&self) -> f64 {
        self.transmission_time_sec * 1000.0
    }
}

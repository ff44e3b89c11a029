pub mod channel;
pub mod packet;

pub use channel::{ChannelState, ChannelStatus};
pub use packet::{NetworkPacket, PacketKind};

use crate::error::{Result, SimError};
use serde::{Deserialize, Serialize};

/// Radio figures shared by every access model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhyProfile {
    pub bandwidth_hz: f64,
    pub bits_per_symbol: f64,
    pub coding_rate: f64,
    pub packet_size_bytes: u32,
    pub sub_channel_count: usize,
}

impl Default for PhyProfile {
    fn default() -> Self {
        Self {
            bandwidth_hz: 20e6,   // 20 MHz
            bits_per_symbol: 8.0, // 256-QAM
            coding_rate: 5.0 / 6.0,
            packet_size_bytes: 1024,
            sub_channel_count: 10,
        }
    }
}

impl PhyProfile {
    pub fn link_rate_bps(&self) -> f64 {
        self.bandwidth_hz * self.bits_per_symbol * self.coding_rate
    }

    pub fn link_rate_mbps(&self) -> f64 {
        self.link_rate_bps() / 1e6
    }

    /// The packet every station sends. Fails on non-positive size, bandwidth or modulation.
    pub fn packet(&self) -> Result<NetworkPacket> {
        NetworkPacket::data(
            self.packet_size_bytes,
            self.bandwidth_hz,
            self.bits_per_symbol * self.coding_rate,
        )
    }

    pub fn validate(&self) -> Result<()> {
        self.packet()?;
        if self.sub_channel_count == 0 {
            return Err(SimError::config("sub-channel count must be at least 1"));
        }
        Ok(())
    }
}

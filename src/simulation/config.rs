use crate::access::{AccessModelRegistry, Generation};
use crate::error::{Result, SimError};
use crate::network::PhyProfile;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    pub name: String,
    pub model_name: String,
    pub client_counts: Vec<usize>,
    pub packet_count: u32,
    pub seed: u64,
    pub profile: PhyProfile,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            name: "default_sim".to_string(),
            model_name: "wifi4".to_string(),
            client_counts: vec![1, 10, 100],
            packet_count: 100,
            seed: 42,
            profile: PhyProfile::default(),
        }
    }
}

impl SimConfig {
    pub fn for_generation(generation: Generation) -> Self {
        Self::default().with_model(generation.model_name())
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model_name = model.into();
        self
    }

    pub fn with_clients(mut self, clients: impl Into<Vec<usize>>) -> Self {
        self.client_counts = clients.into();
        self
    }

    pub fn with_packets(mut self, packets: u32) -> Self {
        self.packet_count = packets;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_profile(mut self, profile: PhyProfile) -> Self {
        self.profile = profile;
        self
    }

    /// Seed for one run of the sweep, stable regardless of sweep order.
    pub fn seed_for(&self, clients: usize) -> u64 {
        self.seed.wrapping_add(clients as u64)
    }

    pub fn validate(&self) -> Result<()> {
        if !AccessModelRegistry::global().contains(&self.model_name) {
            return Err(SimError::config(format!("unknown access model: {}", self.model_name)));
        }
        if self.client_counts.is_empty() {
            return Err(SimError::config("no client counts given"));
        }
        if self.client_counts.contains(&0) {
            return Err(SimError::config("client count must be at least 1"));
        }
        if self.packet_count == 0 {
            return Err(SimError::config("packet count must be at least 1"));
        }
        self.profile.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = SimConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.client_counts, vec![1, 10, 100]);
    }

    #[test]
    fn test_validation_failures() {
        let cases = [
            SimConfig::default().with_model("wifi7"),
            SimConfig::default().with_clients(Vec::new()),
            SimConfig::default().with_clients(vec![1, 0]),
            SimConfig::default().with_packets(0),
        ];
        for config in cases {
            assert!(matches!(config.validate(), Err(SimError::InvalidConfiguration(_))));
        }

        let bad_packet = SimConfig::default().with_profile(PhyProfile {
            bandwidth_hz: -1.0,
            ..PhyProfile::default()
        });
        assert!(matches!(bad_packet.validate(), Err(SimError::InvalidParameter { .. })));
    }

    #[test]
    fn test_generation_config() {
        let config = SimConfig::for_generation(Generation::Wifi6).with_seed(9);
        assert_eq!(config.model_name, "wifi6");
        assert_eq!(config.seed_for(10), 19);
    }
}

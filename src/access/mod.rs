pub mod csma_ca;
pub mod mu_mimo;
pub mod ofdma;

use crate::error::{Result, SimError};
use crate::network::{ChannelState, PhyProfile};
use crate::SimRng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Generation {
    Wifi4,
    Wifi5,
    Wifi6,
}

impl Generation {
    pub const ALL: [Generation; 3] = [Self::Wifi4, Self::Wifi5, Self::Wifi6];

    pub fn number(self) -> u8 {
        match self {
            Self::Wifi4 => 4,
            Self::Wifi5 => 5,
            Self::Wifi6 => 6,
        }
    }

    /// Registry name of the access model for this generation.
    pub fn model_name(self) -> &'static str {
        match self {
            Self::Wifi4 => "wifi4",
            Self::Wifi5 => "wifi5",
            Self::Wifi6 => "wifi6",
        }
    }
}

impl TryFrom<u8> for Generation {
    type Error = SimError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            4 => Ok(Self::Wifi4),
            5 => Ok(Self::Wifi5),
            6 => Ok(Self::Wifi6),
            other => Err(SimError::config(format!("unsupported generation: {}", other))),
        }
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WiFi {}", self.number())
    }
}

/// Result of one station's transmission opportunity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttemptOutcome {
    pub succeeded: bool,
    /// Latency sample, only recorded on success.
    pub latency_ms: f64,
    /// Airtime the attempt consumed, counted whether it succeeded or not.
    pub elapsed_sec: f64,
    /// Throughput credited to a successful attempt.
    pub credit_bps: f64,
}

impl AttemptOutcome {
    pub fn success(latency_ms: f64, elapsed_sec: f64, credit_bps: f64) -> Self {
        Self { succeeded: true, latency_ms, elapsed_sec, credit_bps }
    }

    pub fn failure(elapsed_sec: f64) -> Self {
        Self { succeeded: false, latency_ms: 0.0, elapsed_sec, credit_bps: 0.0 }
    }
}

pub trait AccessModel: Send + fmt::Debug {
    fn name(&self) -> &str;
    fn generation(&self) -> Generation;
    fn station_count(&self) -> usize;

    /// True when nobody competes for the medium; the runner then skips contention entirely.
    fn is_uncontended(&self) -> bool {
        false
    }

    /// Evaluates station `station` (registration order) against the shared channel.
    fn attempt(
        &mut self,
        station: usize,
        channel: &mut ChannelState,
        rng: &mut SimRng,
    ) -> AttemptOutcome;
}

type ModelFactory =
    Box<dyn Fn(usize, &PhyProfile, &mut SimRng) -> Result<Box<dyn AccessModel>> + Send + Sync>;

pub struct AccessModelRegistry {
    models: HashMap<String, ModelFactory>,
}

impl AccessModelRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            models: HashMap::new(),
        };
        registry.register_builtin();
        registry
    }

    fn register_builtin(&mut self) {
        self.register("wifi4", build_csma_ca);
        self.register("csma-ca", build_csma_ca);
        self.register("wifi5", build_mu_mimo);
        self.register("mu-mimo", build_mu_mimo);
        self.register("wifi6", build_ofdma);
        self.register("ofdma", build_ofdma);
    }

    pub fn register<F>(&mut self, name: &str, factory: F)
    where
        F: Fn(usize, &PhyProfile, &mut SimRng) -> Result<Box<dyn AccessModel>>
            + Send
            + Sync
            + 'static,
    {
        self.models.insert(name.to_lowercase(), Box::new(factory));
    }

    pub fn create(
        &self,
        name: &str,
        station_count: usize,
        profile: &PhyProfile,
        rng: &mut SimRng,
    ) -> Result<Box<dyn AccessModel>> {
        if station_count == 0 {
            return Err(SimError::config("a run needs at least one station"));
        }
        let factory = self
            .models
            .get(&name.to_lowercase())
            .ok_or_else(|| SimError::config(format!("unknown access model: {}", name)))?;
        factory(station_count, profile, rng)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.models.contains_key(&name.to_lowercase())
    }

    pub fn list(&self) -> Vec<String> {
        let mut names: Vec<String> = self.models.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn global() -> &'static AccessModelRegistry {
        use std::sync::OnceLock;
        static REGISTRY: OnceLock<AccessModelRegistry> = OnceLock::new();
        REGISTRY.get_or_init(AccessModelRegistry::new)
    }
}

fn build_csma_ca(
    stations: usize,
    profile: &PhyProfile,
    rng: &mut SimRng,
) -> Result<Box<dyn AccessModel>> {
    Ok(Box::new(csma_ca::CsmaCa::new(stations, profile, rng)?))
}

fn build_mu_mimo(
    stations: usize,
    profile: &PhyProfile,
    rng: &mut SimRng,
) -> Result<Box<dyn AccessModel>> {
    Ok(Box::new(mu_mimo::MuMimo::new(stations, profile, rng)?))
}

fn build_ofdma(
    stations: usize,
    profile: &PhyProfile,
    _rng: &mut SimRng,
) -> Result<Box<dyn AccessModel>> {
    Ok(Box::new(ofdma::Ofdma::new(stations, profile)?))
}

impl Default for AccessModelRegistry {
    fn default() -> Self {
        Self::new()
    }
}

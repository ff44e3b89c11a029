use super::{AccessModel, AttemptOutcome, Generation};
use crate::error::Result;
use crate::network::{ChannelState, PhyProfile};
use crate::station::{Station, StationAttempt};
use crate::SimRng;
use rand::Rng;

pub const CONGESTION_PER_STATION: f64 = 0.05;
pub const MAX_CONGESTION: f64 = 0.5;

// Contention delay is drawn as 0..50 microsecond ticks
const CONTENTION_DRAW_MAX: u32 = 50;
const CONTENTION_TICK_MS: f64 = 0.001;

/// Collision scale for `station_count` clients, clamped into `[0, 1]`.
pub fn congestion_factor(station_count: usize) -> f64 {
    (CONGESTION_PER_STATION * station_count as f64)
        .min(MAX_CONGESTION)
        .clamp(0.0, 1.0)
}

/// Generation-4 random access: every station contends for one serialized channel.
#[derive(Debug, Clone)]
pub struct CsmaCa {
    stations: Vec<Station>,
    congestion: f64,
    ideal_duration_ms: f64,
    link_rate_bps: f64,
}

impl CsmaCa {
    pub fn new(station_count: usize, profile: &PhyProfile, rng: &mut SimRng) -> Result<Self> {
        let packet = profile.packet()?;
        let stations = (0..station_count)
            .map(|id| Station::new(id as u32, rng))
            .collect();

        Ok(Self {
            stations,
            congestion: congestion_factor(station_count),
            ideal_duration_ms: packet.transmission_time_ms(),
            link_rate_bps: profile.link_rate_bps(),
        })
    }

    pub fn congestion(&self) -> f64 {
        self.congestion
    }

    pub fn stations(&self) -> &[Station] {
        &self.stations
    }
}

impl AccessModel for CsmaCa {
    fn name(&self) -> &str {
        "CSMA/CA"
    }

    fn generation(&self) -> Generation {
        Generation::Wifi4
    }

    fn station_count(&self) -> usize {
        self.stations.len()
    }

    fn is_uncontended(&self) -> bool {
        self.stations.len() == 1
    }

    fn attempt(
        &mut self,
        station: usize,
        channel: &mut ChannelState,
        rng: &mut SimRng,
    ) -> AttemptOutcome {
        let contention_ms = rng.gen_range(0..CONTENTION_DRAW_MAX) as f64 * CONTENTION_TICK_MS;
        let client = &mut self.stations[station];
        let mut latency_ms = contention_ms + client.backoff_interval_ms();

        match client.attempt(channel, self.congestion, rng) {
            StationAttempt::Transmitted { backoff_ms } => {
                // The backoff is charged once while waiting and again when the slot is won
                latency_ms += backoff_ms + self.ideal_duration_ms;
                AttemptOutcome::success(latency_ms, latency_ms / 1000.0, self.link_rate_bps)
            }
            StationAttempt::Collided | StationAttempt::Deferred => {
                AttemptOutcome::failure(latency_ms / 1000.0)
            }
        }
    }
}

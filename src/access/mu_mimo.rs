use super::{AccessModel, AttemptOutcome, Generation};
use crate::error::Result;
use crate::network::{ChannelState, PhyProfile};
use crate::station::{Station, StationAttempt};
use crate::SimRng;

/// Fixed collision scale; spatial streams do not get busier with more clients.
pub const MU_MIMO_CONGESTION: f64 = 0.1;

/// Generation-5 access: the same backoff stations as CSMA/CA, but each one is
/// served on its own spatial stream so nobody waits on anybody else.
#[derive(Debug, Clone)]
pub struct MuMimo {
    stations: Vec<Station>,
    ideal_duration_sec: f64,
    link_rate_bps: f64,
}

impl MuMimo {
    pub fn new(station_count: usize, profile: &PhyProfile, rng: &mut SimRng) -> Result<Self> {
        let packet = profile.packet()?;
        Ok(Self {
            stations: (0..station_count).map(|id| Station::new(id as u32, rng)).collect(),
            ideal_duration_sec: packet.transmission_time_sec(),
            link_rate_bps: profile.link_rate_bps(),
        })
    }

    pub fn stations(&self) -> &[Station] {
        &self.stations
    }
}

impl AccessModel for MuMimo {
    fn name(&self) -> &str {
        "MU-MIMO"
    }

    fn generation(&self) -> Generation {
        Generation::Wifi5
    }

    fn station_count(&self) -> usize {
        self.stations.len()
    }

    fn attempt(
        &mut self,
        station: usize,
        channel: &mut ChannelState,
        rng: &mut SimRng,
    ) -> AttemptOutcome {
        let client = &mut self.stations[station];
        let waited_sec = client.backoff_interval_ms() / 1000.0;

        match client.attempt(channel, MU_MIMO_CONGESTION, rng) {
            StationAttempt::Transmitted { backoff_ms } => AttemptOutcome::success(
                backoff_ms,
                waited_sec + self.ideal_duration_sec,
                self.link_rate_bps,
            ),
            StationAttempt::Collided | StationAttempt::Deferred => {
                AttemptOutcome::failure(waited_sec)
            }
        }
    }
}

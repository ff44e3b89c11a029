use super::{AccessModel, AttemptOutcome, Generation};
use crate::error::{Result, SimError};
use crate::network::{ChannelState, PhyProfile};
use crate::station::OfdmaStation;
use crate::SimRng;
use rand::Rng;

// Latency samples are 0.0..=9.9ms in 0.1ms steps, independent of load
const LATENCY_DRAW_MAX: u32 = 100;
const LATENCY_STEP_MS: f64 = 0.1;

/// Generation-6 access: a round-robin scheduler hands out sub-channels, no random backoff.
#[derive(Debug, Clone)]
pub struct Ofdma {
    stations: Vec<OfdmaStation>,
    sub_channel_count: usize,
    // Shared by all stations, advanced after every attempt
    next_sub_channel: usize,
    credit_bps: f64,
    slot_duration_sec: f64,
}

impl Ofdma {
    pub fn new(station_count: usize, profile: &PhyProfile) -> Result<Self> {
        let packet = profile.packet()?;
        if profile.sub_channel_count == 0 {
            return Err(SimError::config("OFDMA needs at least one sub-channel"));
        }
        if station_count == 0 {
            return Err(SimError::config("OFDMA needs at least one station"));
        }

        let share_hz = profile.bandwidth_hz / station_count as f64;
        Ok(Self {
            stations: (0..station_count).map(|id| OfdmaStation::new(id as u32)).collect(),
            sub_channel_count: profile.sub_channel_count,
            next_sub_channel: 0,
            credit_bps: share_hz * profile.bits_per_symbol * profile.coding_rate,
            slot_duration_sec: packet.transmission_time_sec(),
        })
    }

    pub fn stations(&self) -> &[OfdmaStation] {
        &self.stations
    }

    pub fn next_sub_channel(&self) -> usize {
        self.next_sub_channel
    }

    pub fn sub_channel_count(&self) -> usize {
        self.sub_channel_count
    }

    fn advance(&mut self) {
        self.next_sub_channel = (self.next_sub_channel + 1) % self.sub_channel_count;
    }
}

impl AccessModel for Ofdma {
    fn name(&self) -> &str {
        "OFDMA"
    }

    fn generation(&self) -> Generation {
        Generation::Wifi6
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
        let sub_channel = self.next_sub_channel;
        let client = &mut self.stations[station];
        client.allocate(sub_channel);
        let transmitted = client.attempt(channel, sub_channel);
        self.advance();

        if transmitted {
            let latency_ms = rng.gen_range(0..LATENCY_DRAW_MAX) as f64 * LATENCY_STEP_MS;
            AttemptOutcome::success(latency_ms, self.slot_duration_sec, self.credit_bps)
        } else {
            AttemptOutcome::failure(self.slot_duration_sec)
        }
    }
}

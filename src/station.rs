// Backoff figures follow the classic CSMA/CA toy model: a 1..=21 slot draw
// doubled per collision, capped at 450ms.

use crate::network::ChannelState;
use crate::SimRng;
use rand::Rng;
use tracing::debug;

pub const BACKOFF_DRAW_MAX: u32 = 21;
pub const BACKOFF_CAP_MS: f64 = 450.0;
pub const COLLISION_SAMPLE_SPACE: u32 = 150;

// 21 * 2^5 already passes the cap
const MAX_BACKOFF_EXPONENT: u32 = 16;

/// What a contending station did with its turn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StationAttempt {
    /// Sat the slot out after a previous collision.
    Deferred,
    Collided,
    Transmitted { backoff_ms: f64 },
}

impl StationAttempt {
    pub fn succeeded(&self) -> bool {
        matches!(self, Self::Transmitted { .. })
    }
}

/// A client running exponential backoff (used by the generation-4 and generation-5 models).
#[derive(Debug, Clone)]
pub struct Station {
    id: u32,
    backoff_interval_ms: f64,
    collision_count: u32,
    waiting: bool,
}

impl Station {
    pub fn new(id: u32, rng: &mut SimRng) -> Self {
        let mut station = Self {
            id,
            backoff_interval_ms: 0.0,
            collision_count: 0,
            waiting: false,
        };
        station.reset_backoff(rng);
        station
    }

    pub fn reset_backoff(&mut self, rng: &mut SimRng) {
        let slots = rng.gen_range(1..=BACKOFF_DRAW_MAX) as f64;
        let exponent = self.collision_count.min(MAX_BACKOFF_EXPONENT) as i32;
        self.backoff_interval_ms = (slots * 2f64.powi(exponent)).min(BACKOFF_CAP_MS);
    }

    /// One contention turn. `congestion` is the collision scale in `[0, 1]`;
    /// a collision happens when a draw over 150 values lands below `congestion * 100`.
    /// A medium already held by someone else counts as a collision too, and is left held.
    pub fn attempt(
        &mut self,
        channel: &mut ChannelState,
        congestion: f64,
        rng: &mut SimRng,
    ) -> StationAttempt {
        debug_assert!((0.0..=1.0).contains(&congestion));

        if self.waiting {
            self.waiting = false;
            debug!("Station {} defers one slot", self.id);
            return StationAttempt::Deferred;
        }

        let collided = (rng.gen_range(0..COLLISION_SAMPLE_SPACE) as f64) < congestion * 100.0;

        if !collided && channel.occupy() {
            // Backoff is kept as drawn; only the next collision redraws it
            let backoff_ms = self.backoff_interval_ms;
            self.collision_count = 0;
            channel.release();
            return StationAttempt::Transmitted { backoff_ms };
        }

        self.collision_count += 1;
        self.reset_backoff(rng);
        self.waiting = true;
        debug!(
            "Station {} collided ({} in a row, medium {}), backoff now {:.1}ms",
            self.id,
            self.collision_count,
            if channel.is_free() { "free" } else { "busy" },
            self.backoff_interval_ms
        );
        StationAttempt::Collided
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn backoff_interval_ms(&self) -> f64 {
        self.backoff_interval_ms
    }

    pub fn collision_count(&self) -> u32 {
        self.collision_count
    }

    pub fn is_waiting(&self) -> bool {
        self.waiting
    }
}

/// A generation-6 client. Its sub-channel is only meaningful for the current round.
#[derive(Debug, Clone)]
pub struct OfdmaStation {
    id: u32,
    allocated_sub_channel: Option<usize>,
}

impl OfdmaStation {
    pub fn new(id: u32) -> Self {
        Self {
            id,
            allocated_sub_channel: None,
        }
    }

    pub fn allocate(&mut self, sub_channel: usize) {
        self.allocated_sub_channel = Some(sub_channel);
    }

    /// Succeeds only on the station's own sub-channel and while the medium is free.
    pub fn attempt(&mut self, channel: &mut ChannelState, sub_channel: usize) -> bool {
        if self.allocated_sub_channel == Some(sub_channel) && channel.is_free() {
            channel.occupy()
        } else {
            false
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn allocated_sub_channel(&self) -> Option<usize> {
        self.allocated_sub_channel
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_backoff_bounds() {
        let mut rng = SimRng::seed_from_u64(7);
        let mut station = Station::new(0, &mut rng);
        assert_eq!(station.collision_count(), 0);
        assert!((1.0..=21.0).contains(&station.backoff_interval_ms()));

        for collisions in 1..40 {
            station.collision_count = collisions;
            station.reset_backoff(&mut rng);
            let backoff = station.backoff_interval_ms();
            assert!((1.0..=BACKOFF_CAP_MS).contains(&backoff), "backoff {} out of range", backoff);
        }
    }

    #[test]
    fn test_backoff_grows_in_expectation() {
        let mut rng = SimRng::seed_from_u64(2024);
        let mut station = Station::new(0, &mut rng);

        let means: Vec<f64> = (0..8)
            .map(|collisions| {
                station.collision_count = collisions;
                let total: f64 = (0..5000)
                    .map(|_| {
                        station.reset_backoff(&mut rng);
                        station.backoff_interval_ms()
                    })
                    .sum();
                total / 5000.0
            })
            .collect();

        for pair in means.windows(2) {
            assert!(pair[0] <= pair[1], "mean backoff shrank: {:?}", means);
        }
        assert!(means.iter().all(|&m| m <= BACKOFF_CAP_MS));
        // Uncapped draws average 11ms
        assert!((means[0] - 11.0).abs() < 0.5, "{:?}", means);
    }

    #[test]
    fn test_backoff_saturates() {
        let mut rng = SimRng::seed_from_u64(11);
        let mut station = Station::new(0, &mut rng);
        station.collision_count = 9;
        for _ in 0..50 {
            station.reset_backoff(&mut rng);
            assert_eq!(station.backoff_interval_ms(), BACKOFF_CAP_MS);
        }
    }

    #[test]
    fn test_no_congestion_always_transmits() {
        let mut rng = SimRng::seed_from_u64(3);
        let mut channel = ChannelState::new("test");
        let mut station = Station::new(1, &mut rng);
        let backoff = station.backoff_interval_ms();

        for _ in 0..100 {
            let outcome = station.attempt(&mut channel, 0.0, &mut rng);
            assert_eq!(outcome, StationAttempt::Transmitted { backoff_ms: backoff });
            assert!(channel.is_free());
        }
    }

    #[test]
    fn test_collision_then_deferral() {
        let mut rng = SimRng::seed_from_u64(5);
        let mut channel = ChannelState::new("test");
        let mut station = Station::new(2, &mut rng);

        // Two in three draws collide at full congestion
        let mut collided = false;
        for _ in 0..1000 {
            if station.attempt(&mut channel, 1.0, &mut rng) == StationAttempt::Collided {
                collided = true;
                break;
            }
        }
        assert!(collided);
        assert!(station.is_waiting());
        assert_eq!(station.collision_count(), 1);

        let collisions = station.collision_count();
        assert_eq!(station.attempt(&mut channel, 1.0, &mut rng), StationAttempt::Deferred);
        assert!(!station.is_waiting());
        assert_eq!(station.collision_count(), collisions);
    }

    #[test]
    fn test_busy_medium_counts_as_collision() {
        let mut rng = SimRng::seed_from_u64(12);
        let mut channel = ChannelState::new("test");
        let mut station = Station::new(4, &mut rng);
        assert!(channel.occupy());

        assert_eq!(station.attempt(&mut channel, 0.0, &mut rng), StationAttempt::Collided);
        assert!(!channel.is_free(), "another holder's claim was cleared");
        assert_eq!(station.collision_count(), 1);
        assert!(station.is_waiting());

        channel.release();
        assert_eq!(station.attempt(&mut channel, 0.0, &mut rng), StationAttempt::Deferred);
        assert!(station.attempt(&mut channel, 0.0, &mut rng).succeeded());
        assert!(channel.is_free());
    }

    #[test]
    fn test_success_keeps_drawn_backoff() {
        let mut rng = SimRng::seed_from_u64(13);
        let mut channel = ChannelState::new("test");
        let mut station = Station::new(5, &mut rng);
        station.collision_count = 3;
        let before = station.backoff_interval_ms();

        assert!(station.attempt(&mut channel, 0.0, &mut rng).succeeded());
        assert_eq!(station.collision_count(), 0);
        assert_eq!(station.backoff_interval_ms(), before);
    }

    #[test]
    fn test_success_clears_collisions() {
        let mut rng = SimRng::seed_from_u64(9);
        let mut channel = ChannelState::new("test");
        let mut station = Station::new(3, &mut rng);
        station.collision_count = 4;

        assert!(station.attempt(&mut channel, 0.0, &mut rng).succeeded());
        assert_eq!(station.collision_count(), 0);
    }

    #[test]
    fn test_ofdma_station_needs_own_slot_and_free_channel() {
        let mut channel = ChannelState::new("test");
        let mut station = OfdmaStation::new(0);

        assert!(!station.attempt(&mut channel, 0));
        station.allocate(3);
        assert!(!station.attempt(&mut channel, 2));
        assert!(station.attempt(&mut channel, 3));
        assert!(!channel.is_free());
        assert!(!station.attempt(&mut channel, 3));
    }
}

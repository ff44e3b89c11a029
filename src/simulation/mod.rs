pub mod config;
pub use config::SimConfig;

use crate::access::{AccessModel, AccessModelRegistry, AttemptOutcome, Generation};
use crate::error::{Result, SimError};
use crate::metrics::{RunReport, StatisticsAggregator};
use crate::network::{ChannelState, NetworkPacket, PhyProfile};
use crate::SimRng;
use rand::SeedableRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Everything one run collected, handed to the aggregator once the run is over.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResults {
    pub model_name: String,
    pub generation: Generation,
    pub station_count: usize,
    pub round_count: u32,
    pub success_count: u64,
    pub attempt_count: u64,
    pub total_duration_sec: f64,
    pub latency_samples: Vec<f64>,
    pub credited_bps: f64,
}

impl SimulationResults {
    fn new(model: &dyn AccessModel, round_count: u32) -> Self {
        Self {
            model_name: model.name().to_string(),
            generation: model.generation(),
            station_count: model.station_count(),
            round_count,
            success_count: 0,
            attempt_count: 0,
            total_duration_sec: 0.0,
            // Grows with successes only; a heavily contended run keeps few samples
            latency_samples: Vec::new(),
            credited_bps: 0.0,
        }
    }

    fn record(&mut self, outcome: &AttemptOutcome) {
        self.attempt_count += 1;
        self.total_duration_sec += outcome.elapsed_sec;

        if outcome.succeeded {
            self.success_count += 1;
            self.latency_samples.push(outcome.latency_ms);
            self.credited_bps += outcome.credit_bps;
        }
    }
}

/// Drives a fixed number of rounds over one access point's stations.
#[derive(Debug)]
pub struct SimulationRunner {
    profile: PhyProfile,
    packet: NetworkPacket,
    rng: SimRng,
}

impl SimulationRunner {
    pub fn new(profile: PhyProfile, seed: u64) -> Result<Self> {
        profile.validate()?;
        let packet = profile.packet()?;
        Ok(Self {
            profile,
            packet,
            rng: SimRng::seed_from_u64(seed),
        })
    }

    pub fn packet(&self) -> &NetworkPacket {
        &self.packet
    }

    /// Registers `station_count` stations with the named access model and runs
    /// `round_count` rounds.
    pub fn run(
        &mut self,
        model_name: &str,
        station_count: usize,
        round_count: u32,
    ) -> Result<SimulationResults> {
        if station_count == 0 {
            return Err(SimError::config("a run needs at least one station"));
        }
        let mut model = AccessModelRegistry::global().create(
            model_name,
            station_count,
            &self.profile,
            &mut self.rng,
        )?;
        self.run_model(model.as_mut(), round_count)
    }

    pub fn run_model(
        &mut self,
        model: &mut dyn AccessModel,
        round_count: u32,
    ) -> Result<SimulationResults> {
        if model.station_count() == 0 {
            return Err(SimError::config("a run needs at least one station"));
        }
        if round_count == 0 {
            return Err(SimError::config("a run needs at least one round"));
        }

        let mut channel = ChannelState::new(format!("{}-channel", model.name().to_lowercase()));
        let mut results = SimulationResults::new(model, round_count);

        info!(
            "Running {} ({}) on {}: {} stations x {} rounds",
            model.name(),
            model.generation(),
            channel.id(),
            model.station_count(),
            round_count
        );

        if model.is_uncontended() {
            self.run_uncontended(&mut results, round_count);
        } else {
            for round in 0..round_count {
                for station in 0..model.station_count() {
                    let outcome = model.attempt(station, &mut channel, &mut self.rng);
                    // The medium has no hold time past the attempt that took it
                    channel.release();
                    results.record(&outcome);
                }
                debug!("Round {}: {} successes so far", round, results.success_count);
            }
        }

        info!(
            "{} finished: {}/{} attempts succeeded over {:.4}s",
            model.name(),
            results.success_count,
            results.attempt_count,
            results.total_duration_sec
        );

        Ok(results)
    }

    // A lone station never competes, so every packet goes out at the ideal duration.
    fn run_uncontended(&self, results: &mut SimulationResults, round_count: u32) {
        let ideal_sec = self.packet.transmission_time_sec();
        let link_rate_bps = self.profile.link_rate_bps();

        for _ in 0..round_count {
            results.attempt_count += 1;
            results.success_count += 1;
            results.latency_samples.push(ideal_sec * 1000.0);
            results.credited_bps += link_rate_bps;
        }
        results.total_duration_sec = round_count as f64 * ideal_sec;
    }
}

/// A sweep of one access model over several client counts.
pub struct Simulation {
    config: SimConfig,
}

impl Simulation {
    pub fn new(config: SimConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn run(&self) -> Result<Vec<RunReport>> {
        self.run_with_progress(|_| {})
    }

    /// Runs are independent (own seed, own channel) and execute in parallel;
    /// reports come back in `client_counts` order.
    pub fn run_with_progress<F>(&self, on_report: F) -> Result<Vec<RunReport>>
    where
        F: Fn(&RunReport) + Sync,
    {
        self.config.validate()?;

        info!("Starting simulation: {}", self.config.name);
        info!("Access model: {}", self.config.model_name);
        info!(
            "Clients: {:?}, packets: {}, seed: {}",
            self.config.client_counts, self.config.packet_count, self.config.seed
        );

        let aggregator = StatisticsAggregator::new(&self.config.profile)?;

        self.config
            .client_counts
            .par_iter()
            .map(|&clients| -> Result<RunReport> {
                let seed = self.config.seed_for(clients);
                let mut runner = SimulationRunner::new(self.config.profile.clone(), seed)?;
                let results =
                    runner.run(&self.config.model_name, clients, self.config.packet_count)?;
                let summary = aggregator.summarize(&results);
                let report = RunReport::new(&results, seed, summary);
                on_report(&report);
                Ok(report)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_station_wifi4_is_ideal() {
        let mut runner = SimulationRunner::new(PhyProfile::default(), 1).unwrap();
        let ideal = runner.packet().transmission_time_sec();
        let results = runner.run("wifi4", 1, 5).unwrap();

        assert_eq!(results.success_count, 5);
        assert_eq!(results.attempt_count, 5);
        assert_eq!(results.total_duration_sec, 5.0 * ideal);
        assert_eq!(results.latency_samples, vec![ideal * 1000.0; 5]);
    }

    #[test]
    fn test_single_station_wifi5_still_contends() {
        let mut runner = SimulationRunner::new(PhyProfile::default(), 4).unwrap();
        let results = runner.run("wifi5", 1, 500).unwrap();
        assert!(results.success_count < 500);
    }

    #[test]
    fn test_every_attempt_counts_toward_duration() {
        let mut runner = SimulationRunner::new(PhyProfile::default(), 17).unwrap();
        let results = runner.run("wifi4", 10, 20).unwrap();

        assert_eq!(results.attempt_count, 200);
        assert!(results.success_count < results.attempt_count);
        assert_eq!(results.latency_samples.len() as u64, results.success_count);

        let success_time: f64 = results.latency_samples.iter().sum::<f64>() / 1000.0;
        assert!(results.total_duration_sec > success_time);
    }

    #[test]
    fn test_ofdma_run_succeeds_every_attempt() {
        let mut runner = SimulationRunner::new(PhyProfile::default(), 2).unwrap();
        let results = runner.run("wifi6", 3, 10).unwrap();
        assert_eq!(results.success_count, 30);
        assert_eq!(results.generation, Generation::Wifi6);
    }

    #[test]
    fn test_same_seed_same_results() {
        let run = |seed| {
            SimulationRunner::new(PhyProfile::default(), seed)
                .unwrap()
                .run("wifi4", 10, 50)
                .unwrap()
        };
        assert_eq!(run(99), run(99));
    }

    #[test]
    fn test_rejects_empty_runs() {
        let mut runner = SimulationRunner::new(PhyProfile::default(), 1).unwrap();
        assert!(matches!(runner.run("wifi4", 0, 10), Err(SimError::InvalidConfiguration(_))));
        assert!(matches!(runner.run("wifi6", 3, 0), Err(SimError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_runner_rejects_bad_profile() {
        let profile = PhyProfile { packet_size_bytes: 0, ..PhyProfile::default() };
        assert!(matches!(
            SimulationRunner::new(profile, 1),
            Err(SimError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_huge_run_reserves_nothing_up_front() {
        let mut rng = SimRng::seed_from_u64(3);
        let model = AccessModelRegistry::global()
            .create("wifi4", 100, &PhyProfile::default(), &mut rng)
            .unwrap();

        let results = SimulationResults::new(model.as_ref(), u32::MAX);
        assert_eq!(results.latency_samples.capacity(), 0);
        assert_eq!(results.round_count, u32::MAX);
    }

    #[test]
    fn test_sweep_keeps_client_order() {
        let config = SimConfig::default().with_clients(vec![100, 1, 10]).with_packets(20);
        let reports = Simulation::new(config).run().unwrap();
        let clients: Vec<usize> = reports.iter().map(|r| r.clients).collect();
        assert_eq!(clients, vec![100, 1, 10]);
    }
}

// Copyright 2025 Servus Altissimi (Pseudonym)

// Permission is hereby granted, free of charge, to any person obtaining a copy of this software and associated documentation files (the "Software"), to deal in the Software without restriction, including without limitation the rights to use, copy, modify, merge, publish, distribute, sublicense, and/or sell copies of the Software, and to permit persons to whom the Software is furnished to do so, subject to the following conditions:
// The above copyright notice and this permission notice shall be included in all copies or substantial portions of the Software.
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use wifisim::metrics::logger::ReportLogger;
use wifisim::prelude::*;

use anyhow::Result;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Instant;
use tracing::{info, Level};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Sweep one generation over several client counts
    Run {
        /// 4, 5, 6 or a model name from `list`
        #[arg(short, long, default_value = "4")]
        generation: String,
        #[arg(short, long, default_value = "1,10,100")]
        clients: String,
        #[arg(short, long, default_value_t = 100)]
        packets: u32,
        #[arg(short, long)]
        seed: Option<u64>,
        /// Directory for CSV/JSON results
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Run all three generations with the same load
    Compare {
        #[arg(short, long, default_value = "1,10,100")]
        clients: String,
        #[arg(short, long, default_value_t = 100)]
        packets: u32,
        #[arg(short, long)]
        seed: Option<u64>,
        #[arg(short, long)]
        output: Option<String>,
    },

    List,
}

fn main() -> Result<()> {
    let program_start = Instant::now();

    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .init();

    match cli.command {
        Commands::Run { generation, clients, packets, seed, output } => {
            let config = SimConfig::default()
                .with_model(resolve_model(&generation)?)
                .with_clients(parse_clients(&clients)?)
                .with_packets(packets)
                .with_seed(seed.unwrap_or_else(rand::random));

            let reports = run_sweep(config.clone())?;
            report_table(&reports);

            if let Some(dir) = output {
                save_reports(&reports, &dir, &config.model_name)?;
            }
        }

        Commands::Compare { clients, packets, seed, output } => {
            let clients = parse_clients(&clients)?;
            let seed = seed.unwrap_or_else(rand::random);

            let mut all_reports = Vec::new();
            for generation in Generation::ALL {
                info!("Testing: {}", generation);
                let config = SimConfig::for_generation(generation)
                    .with_clients(clients.clone())
                    .with_packets(packets)
                    .with_seed(seed);
                all_reports.extend(run_sweep(config)?);
            }

            report_table(&all_reports);
            best_per_load(&all_reports);

            if let Some(dir) = output {
                save_reports(&all_reports, &dir, "comparison")?;
            }
        }

        Commands::List => {
            println!("\nAvailable Access Models");

            for name in AccessModelRegistry::global().list() {
                println!("  - {}", name);
            }

            println!("\nUsage: cargo run -- run --generation <4|5|6|name>");
            println!("Example: cargo run -- run --generation ofdma --packets 500\n");
        }
    }

    let total_time = program_start.elapsed();
    info!("Total runtime: {:.2}s", total_time.as_secs_f64());

    Ok(())
}

fn resolve_model(selection: &str) -> Result<String> {
    if let Ok(number) = selection.trim().parse::<u8>() {
        return Ok(Generation::try_from(number)?.model_name().to_string());
    }
    if AccessModelRegistry::global().contains(selection) {
        return Ok(selection.to_lowercase());
    }
    anyhow::bail!("Unknown generation or model: {}", selection)
}

fn parse_clients(list: &str) -> Result<Vec<usize>> {
    list.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<usize>()
                .map_err(|e| anyhow::anyhow!("Bad client count '{}': {}", s, e))
        })
        .collect()
}

fn run_sweep(config: SimConfig) -> Result<Vec<RunReport>> {
    let name = format!("{}_{}", config.model_name, config.packet_count);
    let config = SimConfig { name, ..config };

    let pb = ProgressBar::new(config.client_counts.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.orange/yellow} {pos}/{len} runs {msg}")?
            .progress_chars("█▓░"),
    );

    let reports = Simulation::new(config).run_with_progress(|report| {
        pb.inc(1);
        pb.set_message(format!(
            "{} clients: {:.2} Mbps",
            report.clients, report.achieved_throughput_mbps
        ));
    })?;

    pb.finish_with_message("Sweep complete");
    Ok(reports)
}

fn save_reports(reports: &[RunReport], dir: &str, label: &str) -> Result<()> {
    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    std::fs::create_dir_all(dir)?;

    let csv_path = Path::new(dir).join(format!("{}_{}.csv", label, timestamp));
    let mut logger = ReportLogger::create(&csv_path)?;
    logger.write_all(reports)?;
    logger.finish()?;
    info!("Results saved to: {}", csv_path.display());

    let json_path = Path::new(dir).join(format!("{}_{}.json", label, timestamp));
    std::fs::write(&json_path, serde_json::to_string_pretty(reports)?)?;
    info!("Results saved to: {}", json_path.display());

    Ok(())
}

fn report_table(reports: &[RunReport]) {
    println!("\n╔═════╦═════════╦═════════╦═══════════╦═══════════╦═══════════╦═══════════╦═══════════╗");
    println!("║ Gen ║ Clients ║ Success ║ Max       ║ Achieved  ║ Credited  ║ Avg Lat   ║ Peak Lat  ║");
    println!("║     ║         ║ (%)     ║ (Mbps)    ║ (Mbps)    ║ (Mbps)    ║ (ms)      ║ (ms)      ║");
    println!("╠═════╬═════════╬═════════╬═══════════╬═══════════╬═══════════╬═══════════╬═══════════╣");

    for report in reports {
        println!(
            "║ {:>3} ║ {:>7} ║ {:>6.1}% ║ {:>9.2} ║ {:>9.2} ║ {:>9.2} ║ {:>9.3} ║ {:>9.3} ║",
            report.generation,
            report.clients,
            report.success_rate() * 100.0,
            report.theoretical_max_throughput_mbps,
            report.achieved_throughput_mbps,
            report.credited_throughput_mbps,
            report.avg_latency_ms,
            report.peak_latency_ms,
        );
    }

    println!("╚═════╩═════════╩═════════╩═══════════╩═══════════╩═══════════╩═══════════╩═══════════╝\n");
}

fn best_per_load(reports: &[RunReport]) {
    let mut loads: Vec<usize> = reports.iter().map(|r| r.clients).collect();
    loads.sort_unstable();
    loads.dedup();

    for clients in loads {
        let at_load = reports.iter().filter(|r| r.clients == clients);

        let top_throughput = at_load
            .clone()
            .max_by(|a, b| a.achieved_throughput_mbps.total_cmp(&b.achieved_throughput_mbps));
        if let Some(best) = top_throughput {
            println!(
                "{} clients, top throughput: WiFi {} ({:.2} Mbps)",
                clients, best.generation, best.achieved_throughput_mbps
            );
        }

        let lowest_latency = at_load.min_by(|a, b| a.avg_latency_ms.total_cmp(&b.avg_latency_ms));
        if let Some(best) = lowest_latency {
            println!(
                "{} clients, lowest latency: WiFi {} ({:.3} ms)",
                clients, best.generation, best.avg_latency_ms
            );
        }
    }

    println!();
}

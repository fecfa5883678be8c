//! End-to-end sketch: generate a social graph, then estimate its female ratio three ways.
//!
//! ```text
//! cargo run --example social_walk -- --nodes 1000 --male-ratio 0.3 --steps 200
//! RUST_LOG=socialwalk=debug cargo run --example social_walk
//! ```
//!
//! The plain walk's raw ratio over-weights well-connected nodes; the Hansen–Hurwitz
//! correction and the Metropolis–Hastings walk should both land near the true ratio
//! once `--steps` is large enough.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use socialwalk::{ConnectionSpec, Connectivity, PopulationConfig, SimulationConfig, WalkConfig};

#[derive(Debug, Parser)]
#[command(about = "Estimate a social graph's female ratio with local random walks")]
struct Args {
    #[arg(long, default_value_t = 1000)]
    nodes: usize,
    #[arg(long, default_value_t = 0.3)]
    male_ratio: f64,
    #[arg(long, default_value_t = 200)]
    steps: usize,
    #[arg(long, default_value_t = 42)]
    seed: u64,
    /// Start node for both walks (random if omitted).
    #[arg(long)]
    start: Option<usize>,
    /// Connection counts as `mean,std_dev` for male->male, male->female,
    /// female->male, female->female.
    #[arg(long, value_parser = parse_connectivity, default_value = "20,6")]
    mm: Connectivity,
    #[arg(long, value_parser = parse_connectivity, default_value = "6,4")]
    mf: Connectivity,
    #[arg(long, value_parser = parse_connectivity, default_value = "4,2")]
    fm: Connectivity,
    #[arg(long, value_parser = parse_connectivity, default_value = "10,3")]
    ff: Connectivity,
    /// Run this many consecutive seeds and print one line per run.
    #[arg(long, default_value_t = 1)]
    runs: u64,
}

fn parse_connectivity(s: &str) -> Result<Connectivity, String> {
    let (mean, std_dev) = s
        .split_once(',')
        .ok_or_else(|| format!("expected `mean,std_dev`, got '{s}'"))?;
    let mean: f64 = mean.trim().parse().map_err(|e| format!("bad mean '{mean}': {e}"))?;
    let std_dev: f64 = std_dev
        .trim()
        .parse()
        .map_err(|e| format!("bad std_dev '{std_dev}': {e}"))?;
    Ok(Connectivity::new(mean, std_dev))
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let walk = WalkConfig { start: args.start, ..WalkConfig::new(args.steps) };
    let config = SimulationConfig {
        population: PopulationConfig {
            num_nodes: args.nodes,
            male_ratio: args.male_ratio,
            connections: ConnectionSpec {
                male_male: args.mm,
                male_female: args.mf,
                female_male: args.fm,
                female_female: args.ff,
            },
        },
        walk,
        seed: args.seed,
    };

    let seeds: Vec<u64> = (0..args.runs).map(|i| args.seed.wrapping_add(i)).collect();
    #[cfg(feature = "parallel")]
    let reports = socialwalk::run_batch_parallel(&config, &seeds);
    #[cfg(not(feature = "parallel"))]
    let reports = socialwalk::run_batch(&config, &seeds);

    for report in reports {
        let r = match report {
            Ok(r) => r,
            Err(e) => {
                eprintln!("run failed: {e}");
                std::process::exit(1);
            }
        };
        println!(
            "seed {}: population male={} female={} edges={}",
            r.seed, r.population.male, r.population.female, r.edges
        );
        println!("  true female ratio:         {:6.2}%", r.true_female_ratio * 100.0);
        println!(
            "  random walk tally:         male={} female={}",
            r.simple.tally.male, r.simple.tally.female
        );
        println!("  biased ratio (RW):         {:6.2}%", r.simple.biased_ratio * 100.0);
        println!("  unbiased ratio (RW, HH):   {:6.2}%", r.simple.unbiased_ratio * 100.0);
        println!(
            "  MH walk tally:             male={} female={}",
            r.metropolis.tally.male, r.metropolis.tally.female
        );
        println!("  ratio (MHRW):              {:6.2}%", r.metropolis.female_ratio * 100.0);
    }
}

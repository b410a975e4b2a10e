//! Fixed-temperature run of the 2-D Ising model
//! (see `Args` below for all run parameters).

use anyhow::{Context, Result};
use clap::Parser;
use csv::WriterBuilder;
use indicatif::{ProgressBar, ProgressStyle};
use ising::utils::rng::seeded_rng;
use ising::{Accumulator, Lattice, LatticeConfig, MetropolisSampler, Sample};
use std::path::PathBuf;
use tracing::info;

/// Run-time configuration.
#[derive(Parser, Debug)]
#[command(name = "ising", version, about = "2-D Ising model Metropolis simulation")]
struct Args {
    /// Linear lattice size N (N×N sites).
    #[arg(short = 'n', long, default_value_t = 64)]
    size: usize,

    /// Temperature T.
    #[arg(short, long, default_value_t = 0.01)]
    temperature: f64,

    /// Coupling constant J.
    #[arg(long, default_value_t = 1.0)]
    coupling: f64,

    /// Boltzmann constant stand-in k.
    #[arg(long, default_value_t = 1.0)]
    boltzmann: f64,

    /// Production sweeps.
    #[arg(short, long, default_value_t = 10_000)]
    sweeps: usize,

    /// Sweeps discarded before measuring.
    #[arg(long, default_value_t = 1_000)]
    equilibration: usize,

    /// Measure every this many production sweeps.
    #[arg(long, default_value_t = 10)]
    measure_every: usize,

    /// Master seed.
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// CSV time series output.
    #[arg(short, long, default_value = "ising_timeseries.csv")]
    output: PathBuf,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = args
        .log_level
        .parse::<tracing_subscriber::filter::LevelFilter>()
        .unwrap_or(tracing_subscriber::filter::LevelFilter::INFO);
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .init();

    let config = LatticeConfig::default()
        .with_k(args.boltzmann)
        .with_j(args.coupling)
        .with_temperature(args.temperature);
    let measure_every = args.measure_every.max(1);

    let mut rng = seeded_rng(args.seed, 0);
    let mut lattice = Lattice::new(args.size, config, &mut rng)
        .context("invalid lattice configuration")?;
    let mut sampler = MetropolisSampler::new(rng);

    info!(
        "N={} T={} J={} k={} Tc={:.4} β={:.4}",
        lattice.size(),
        lattice.temperature(),
        lattice.j(),
        lattice.k(),
        lattice.critical_temperature(),
        lattice.beta(),
    );

    let eq = sampler.sweep(&mut lattice, args.equilibration);
    info!(
        "equilibrated {} sweeps: E/N={:.4} m={:.4} acc={:.1}%",
        args.equilibration,
        lattice.energy_per_site(),
        lattice.magnetisation(),
        100.0 * eq.acceptance_rate(),
    );

    let mut wtr = WriterBuilder::new()
        .from_path(&args.output)
        .with_context(|| format!("cannot create {}", args.output.display()))?;
    wtr.write_record(["sweep", "energy", "magnetisation", "acceptance"])?;

    let bar = ProgressBar::new(args.sweeps as u64);
    bar.set_style(
        ProgressStyle::with_template(" {bar:40.cyan/blue} {pos}/{len} [{elapsed_precise}]")
            .context("bad progress template")?,
    );

    let mut acc = Accumulator::new();
    let mut done = 0;
    while done < args.sweeps {
        let batch = measure_every.min(args.sweeps - done);
        let stats = sampler.sweep(&mut lattice, batch);
        done += batch;

        acc.push(Sample::from_lattice(&lattice));
        wtr.write_record(&[
            done.to_string(),
            lattice.energy_per_site().to_string(),
            lattice.magnetisation().to_string(),
            stats.acceptance_rate().to_string(),
        ])?;
        bar.inc(batch as u64);
    }
    bar.finish();
    wtr.flush()?;

    let summary = acc.summary(lattice.beta(), lattice.n_sites());
    info!("samples      : {}", summary.samples);
    info!("⟨E⟩/N        : {:.6} ± {:.6}", summary.mean_energy, summary.energy_error);
    info!("⟨|m|⟩        : {:.6}", summary.mean_abs_magnetisation);
    info!("C            : {:.6}", summary.specific_heat);
    info!("χ            : {:.6}", summary.susceptibility);
    info!("U₄           : {:.6}", summary.binder_cumulant);
    info!("τ_int        : {:.2}", summary.tau_int);
    info!("time series → {}", args.output.display());

    Ok(())
}

use clap::Parser;
use pecsolve::catalyst::library;
use pecsolve::config::{BatchConfig, Regime, ScenarioConfig};
use pecsolve::output;
use pecsolve::presets;
use pecsolve::scenario::{self, scan};
use pecsolve::spectrum::SpectrumSet;
use pecsolve::stats::Stats;
use std::io;
use std::path::PathBuf;
use std::time::Instant;

/// Photoelectrochemical cell operating-point solver
#[derive(Parser)]
#[command(name = "pecsolve", version)]
struct Cli {
    /// Named scenario preset (see --list-presets)
    #[arg(long, conflicts_with = "config")]
    preset: Option<String>,

    /// TOML file with one scenario or a [[scenario]] batch
    #[arg(long)]
    config: Option<PathBuf>,

    /// Spectrum table in ASTM G173 layout; built-in reference when absent
    #[arg(long)]
    spectrum: Option<PathBuf>,

    /// Scan the configured bandgap ranges instead of solving one stack
    #[arg(long)]
    scan: bool,

    /// List presets and exit
    #[arg(long)]
    list_presets: bool,

    /// List built-in catalysts and exit
    #[arg(long)]
    list_catalysts: bool,

    /// Print run stats to stderr
    #[arg(long)]
    stats: bool,
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if cli.list_presets {
        for (id, description) in presets::PRESETS {
            println!("{:<14} {}", id, description);
        }
        return;
    }
    if cli.list_catalysts {
        for (name, reaction, source) in library::CATALOG {
            println!("{:<22} {:<18} {}", name, format!("{:?}", reaction), source);
        }
        return;
    }

    let mut stats = if cli.stats { Some(Stats::new()) } else { None };

    let start = Instant::now();
    let spectra = match &cli.spectrum {
        Some(path) => SpectrumSet::load(path),
        None => {
            tracing::warn!("no spectrum table given, using built-in blackbody approximation");
            SpectrumSet::reference()
        }
    }
    .unwrap_or_else(|e| {
        eprintln!("Spectrum error: {}", e);
        std::process::exit(1);
    });
    if let Some(ref mut s) = stats {
        s.add_phase("spectrum", start.elapsed());
    }

    let configs: Vec<ScenarioConfig> = match (&cli.preset, &cli.config) {
        (Some(id), _) => vec![presets::preset(id).unwrap_or_else(|e| {
            eprintln!("Preset error: {}", e);
            std::process::exit(1);
        })],
        (None, Some(path)) => {
            BatchConfig::from_file(path)
                .unwrap_or_else(|e| {
                    eprintln!("Config error in {}: {}", path.display(), e);
                    std::process::exit(1);
                })
                .scenario
        }
        (None, None) => {
            eprintln!("Nothing to solve: pass --preset <ID> or --config <FILE>");
            std::process::exit(2);
        }
    };

    let mut stdout = io::stdout();
    let start = Instant::now();

    if cli.scan {
        for config in &configs {
            let result = scan::run(config, &spectra, stats.as_mut()).unwrap_or_else(|e| {
                eprintln!("Scan error in {}: {}", config.name, e);
                std::process::exit(1);
            });
            output::write_scan_csv(&result, &mut stdout).unwrap_or_else(|e| {
                eprintln!("Output error: {}", e);
                std::process::exit(1);
            });
        }
    } else if let [config] = configs.as_slice() {
        let outcome = scenario::run(config, &spectra, stats.as_mut()).unwrap_or_else(|e| {
            eprintln!("Scenario {} failed: {}", config.name, e);
            std::process::exit(1);
        });
        output::write_outcome_csv(&outcome, sweep_parameter(config.regime), &mut stdout).unwrap_or_else(|e| {
            eprintln!("Output error: {}", e);
            std::process::exit(1);
        });
    } else {
        let entries = scenario::run_batch(&configs, &spectra, stats.as_mut());
        for (config, entry) in configs.iter().zip(&entries) {
            if let Ok(outcome) = &entry.outcome {
                output::write_outcome_csv(outcome, sweep_parameter(config.regime), &mut stdout).unwrap_or_else(
                    |e| {
                        eprintln!("Output error: {}", e);
                        std::process::exit(1);
                    },
                );
            }
        }
        output::write_batch_summary(&entries, &mut io::stderr()).unwrap_or_else(|e| {
            eprintln!("Output error: {}", e);
            std::process::exit(1);
        });
        if let Some(ref mut s) = stats {
            s.add_phase("solve", start.elapsed());
            s.display();
        }
        if entries.iter().any(|e| e.outcome.is_err()) {
            std::process::exit(1);
        }
        return;
    }

    if let Some(ref mut s) = stats {
        s.add_phase("solve", start.elapsed());
        s.display();
    }
}

fn sweep_parameter(regime: Regime) -> &'static str {
    match regime {
        Regime::Degradation => "degradation_pct",
        _ => "insolation",
    }
}

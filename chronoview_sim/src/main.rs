//! ChronoView Playback CLI
//!
//! Plays synthetic recordings through every frame source and checks that
//! scrubbing behaves like a video.

use chronoview_sim::{
    FrameExporter, PlaybackConfig, PlaybackRunner, RerunLogger, ScenarioId, ScenarioResult, SimError,
};
use clap::Parser;
use std::path::Path;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

/// ChronoView playback testing CLI
#[derive(Parser, Debug)]
#[command(name = "chronoview-sim")]
#[command(about = "Scrub synthetic recordings through ChronoView frame sources", long_about = None)]
struct Args {
    /// Master seed for determinism (0 = random from time)
    #[arg(short, long, default_value = "42")]
    seed: u64,

    /// Scenario to run (events, frames, gated_frames, poses, multi_body, points, all)
    #[arg(short = 'S', long, default_value = "all")]
    scenario: String,

    /// Number of consecutive seeds to test (for CI mode)
    #[arg(long, default_value = "1")]
    seeds: usize,

    /// Recording length in seconds
    #[arg(short, long, default_value = "10")]
    duration: f64,

    /// Time window per frame in seconds (overrides the config file)
    #[arg(short, long)]
    window: Option<f64>,

    /// JSON playback config
    #[arg(short, long)]
    config: Option<String>,

    /// Export frames as PGM/PPM plus manifest.json under this directory
    #[arg(long)]
    export: Option<String>,

    /// Export every n-th forward frame
    #[arg(long, default_value = "1")]
    stride: u64,

    /// Stream frames to a Rerun viewer (needs the `visualization` feature)
    #[arg(long)]
    visualize: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// JSON output for CI parsing
    #[arg(long)]
    json: bool,
}

/// Runs one scenario with the requested observers attached.
fn run_one(
    runner: &PlaybackRunner,
    scenario: ScenarioId,
    seed: u64,
    args: &Args,
) -> Result<ScenarioResult, SimError> {
    let exporter = match &args.export {
        Some(root) => {
            let dir = Path::new(root).join(format!("{}_seed{}", scenario.name(), seed));
            Some(FrameExporter::new(dir, scenario.name(), seed)?.with_stride(args.stride))
        }
        None => None,
    };
    let logger = args.visualize.then(|| RerunLogger::new(scenario.name()));

    let mut observers = (exporter, logger);
    runner.run_with(scenario, &mut observers)
}

fn main() {
    let args = Args::parse();

    // Initialize logging
    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(if args.json { Level::WARN } else { level })
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    if !args.json {
        info!("ChronoView Playback Harness v{}", env!("CARGO_PKG_VERSION"));
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    }

    // Parse scenarios
    let scenarios: Vec<ScenarioId> = if args.scenario == "all" {
        ScenarioId::all()
    } else {
        vec![args.scenario.parse().unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            eprintln!("Available scenarios: events, frames, gated_frames, poses, multi_body, points, all");
            std::process::exit(2);
        })]
    };

    // Load config
    let mut config = match &args.config {
        Some(path) => PlaybackConfig::load(path).unwrap_or_else(|e| {
            eprintln!("Error: failed to load {}: {}", path, e);
            std::process::exit(2);
        }),
        None => PlaybackConfig::default(),
    };
    if let Some(window) = args.window {
        config = config.with_window(window);
    }

    // Determine base seed
    let base_seed = if args.seed == 0 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(1)
    } else {
        args.seed
    };

    // Track results
    let mut all_results: Vec<ScenarioResult> = Vec::new();
    let mut failed_count = 0;

    for seed_offset in 0..args.seeds {
        let seed = base_seed.wrapping_add(seed_offset as u64);
        let runner = PlaybackRunner::new(seed)
            .with_duration(args.duration)
            .with_config(config.clone());

        for &scenario in &scenarios {
            let result = match run_one(&runner, scenario, seed, &args) {
                Ok(result) => result,
                Err(e) => {
                    error!("✗ {} (seed={}) could not run: {}", scenario.name(), seed, e);
                    std::process::exit(2);
                }
            };

            if !args.json {
                if result.passed {
                    info!("✓ {} (seed={}) PASSED", scenario.name(), seed);
                } else {
                    error!(
                        "✗ {} (seed={}) FAILED: {}",
                        scenario.name(),
                        seed,
                        result.failure_reason.as_deref().unwrap_or("unknown")
                    );
                }
            }

            if !result.passed {
                failed_count += 1;
            }
            all_results.push(result);
        }
    }

    // Summary
    let total = all_results.len();
    let passed = total - failed_count;

    if args.json {
        // JSON output for CI parsing
        let summary = serde_json::json!({
            "total": total,
            "passed": passed,
            "failed": failed_count,
            "results": all_results.iter().map(|r| {
                serde_json::json!({
                    "scenario": r.scenario.name(),
                    "seed": r.seed,
                    "passed": r.passed,
                    "ticks": r.total_ticks,
                    "time_secs": r.final_time_secs,
                    "width": r.dims.0,
                    "height": r.dims.1,
                    "colorfmt": r.colorfmt,
                    "frames_rendered": r.metrics.frames_rendered,
                    "seeks": r.metrics.seeks,
                    "uniform_frames": r.metrics.uniform_frames,
                    "violations": r.metrics.violations,
                    "failure_reason": r.failure_reason,
                })
            }).collect::<Vec<_>>(),
        });
        match serde_json::to_string_pretty(&summary) {
            Ok(text) => println!("{}", text),
            Err(e) => error!("Failed to serialize summary: {}", e),
        }
    } else {
        info!("");
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

        if failed_count == 0 {
            info!("✅ All {} scenario runs passed!", total);
        } else {
            error!("❌ {}/{} scenario runs failed!", failed_count, total);

            for result in &all_results {
                if !result.passed {
                    error!(
                        "  - {} seed={}: {}",
                        result.scenario.name(),
                        result.seed,
                        result.failure_reason.as_deref().unwrap_or("unknown")
                    );
                }
            }
        }
    }

    // Exit with proper code for CI
    if failed_count > 0 {
        std::process::exit(1);
    }
}

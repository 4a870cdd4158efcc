#![doc = include_str!("../README.md")]

use std::{path::PathBuf, time::Duration};

use clap::Parser;
use ftlog::LevelFilter;
use itml::{Budget, CursorWrap, DistanceReference, Itml, ItmlConfig, Mahalanobis, ProjectionParams};

mod data;
mod utils;

/// Learns an ITML metric on synthetic blobs.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// The number of classes.
    #[arg(short('c'), long, default_value_t = 3)]
    num_classes: usize,

    /// The number of points per class.
    #[arg(short('n'), long, default_value_t = 50)]
    per_class: usize,

    /// The dimensionality of the points.
    #[arg(short('d'), long, default_value_t = 8)]
    dim: usize,

    /// The distance between consecutive class centers along their axes.
    #[arg(long, default_value_t = 4.0)]
    separation: f64,

    /// The half-width of the uniform noise around each center.
    #[arg(long, default_value_t = 1.0)]
    spread: f64,

    /// The seed for the random number generator.
    #[arg(short('s'), long, default_value_t = 42)]
    seed: u64,

    /// The slack of the projection.
    #[arg(short('g'), long, default_value_t = 1e-4)]
    slack: f64,

    /// The tolerance on the relative change of the multipliers.
    #[arg(short('t'), long, default_value_t = 1e-10)]
    tolerance: f64,

    /// The maximum number of projection iterations.
    #[arg(short('m'), long, default_value_t = 1_000_000)]
    max_iterations: usize,

    /// The wall-clock limit for the projection, in seconds.
    #[arg(long)]
    time_limit: Option<u64>,

    /// Visit every constraint in every cycle.
    #[arg(long)]
    full_cycles: bool,

    /// Measure pair distances under the evolving matrix.
    #[arg(long)]
    current_distances: bool,

    /// Clip negative eigenvalues of the learned matrix.
    #[arg(long)]
    clip: bool,

    /// Path to a `.npy` file with the seed metric. Defaults to the identity.
    #[arg(long)]
    seed_metric: Option<PathBuf>,

    /// Path to the output directory.
    #[arg(short('o'), long)]
    out_dir: Option<PathBuf>,

    /// The directory for log files.
    #[arg(long, default_value = "logs")]
    log_dir: PathBuf,

    /// The maximum log level: off, error, warn, info, debug or trace.
    #[arg(short('l'), long, default_value_t = LevelFilter::Info)]
    log_level: LevelFilter,
}

fn main() -> Result<(), String> {
    let args = Args::parse();

    let log_path = utils::log_path(&args.log_dir, args.num_classes, args.per_class, args.dim)?;
    let _guard = utils::configure_logger(&log_path, args.log_level)?;
    println!("Log file: {log_path:?}");

    ftlog::info!("{args:?}");

    let patterns = data::blobs(
        args.num_classes,
        args.per_class,
        args.dim,
        args.separation,
        args.spread,
        args.seed,
    )?;
    ftlog::info!(
        "Generated {} patterns in {} classes.",
        patterns.cardinality(),
        patterns.num_classes()
    );

    let seed = match &args.seed_metric {
        Some(path) => itml::read_npy(path).map_err(|e| e.to_string())?,
        None => Mahalanobis::identity(args.dim),
    };

    let projection = ProjectionParams::default()
        .with_slack(args.slack)
        .with_tolerance(args.tolerance)
        .with_max_iterations(args.max_iterations)
        .with_cursor_wrap(if args.full_cycles { CursorWrap::Full } else { CursorWrap::SkipFirst })
        .with_distance_reference(if args.current_distances {
            DistanceReference::Current
        } else {
            DistanceReference::Seed
        });
    let config = ItmlConfig::default()
        .with_seed(args.seed)
        .with_projection(projection)
        .with_clip_negative_eigenvalues(args.clip);

    let budget = args
        .time_limit
        .map_or_else(Budget::unbounded, |s| Budget::unbounded().with_time_limit(Duration::from_secs(s)));

    let start = std::time::Instant::now();
    let learned = Itml::new(config)
        .and_then(|itml| itml.fit_with_budget(&patterns, &seed, &budget))
        .map_err(|e| e.to_string())?;
    let elapsed = start.elapsed().as_secs_f64();

    let (seed_same, seed_diff) = data::mean_distances(&patterns, |x, y| seed.distance_sq(x, y));
    let (same, diff) = data::mean_distances(&patterns, |x, y| learned.distance_sq(x, y));

    let summary = [
        format!("Learned in {elapsed:.3} s: {:?}", learned.report),
        format!("Bounds: lower {:.4e}, upper {:.4e}", learned.bounds.lower, learned.bounds.upper),
        format!(
            "Constraints: {} ({} similar, {} dissimilar), {:.2}% satisfied",
            learned.num_constraints,
            learned.num_similar,
            learned.num_dissimilar,
            100.0 * learned.satisfied_fraction
        ),
        format!("Seed metric: mean same-class {seed_same:.4e}, different-class {seed_diff:.4e}"),
        format!("Learned metric: mean same-class {same:.4e}, different-class {diff:.4e}"),
    ];
    for line in &summary {
        println!("{line}");
        ftlog::info!("{line}");
    }

    if let Some(out_dir) = args.out_dir {
        if !out_dir.exists() {
            std::fs::create_dir_all(&out_dir).map_err(|e| e.to_string())?;
        }
        let out_dir = out_dir.canonicalize().map_err(|e| e.to_string())?;

        learned.write_npy(out_dir.join("metric.npy")).map_err(|e| e.to_string())?;
        let bytes = learned.to_bytes().map_err(|e| e.to_string())?;
        std::fs::write(out_dir.join("learned.bin"), bytes).map_err(|e| e.to_string())?;
        ftlog::info!("Wrote the learned metric to {out_dir:?}");
    }

    Ok(())
}

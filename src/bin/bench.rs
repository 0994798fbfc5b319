use clap::Parser;
use dpll_solver::harness::{self, CONFIGS};
use log::{error, info};
use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use std::process::exit;
use std::time::Duration;

/// Time every solver configuration over a benchmark corpus and rank the
/// fastest per formula
#[derive(Debug, Parser)]
#[command(name = "dpll-bench", version, about)]
struct Args {
    /// Directory of .cnf formulas
    #[arg(long, default_value = "benchmark")]
    bench_dir: PathBuf,

    /// Solver binary to drive
    #[arg(long, default_value = "target/release/dpll-solver")]
    solver: PathBuf,

    /// Per-run wall-clock budget in seconds
    #[arg(long, default_value_t = 5.0)]
    timeout: f64,

    /// Where the CSV report goes
    #[arg(long, default_value = "benchmark_results.csv")]
    output: PathBuf,
}

fn main() -> io::Result<()> {
    pretty_env_logger::init();
    let args = Args::parse();

    let mut formulas: Vec<PathBuf> = fs::read_dir(&args.bench_dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().map_or(false, |ext| ext == "cnf"))
        .collect();
    formulas.sort_by_key(|path| corpus_key(path));

    if formulas.is_empty() {
        error!("no .cnf formulas under {}", args.bench_dir.display());
        exit(1);
    }

    info!(
        "benchmarking {} configurations over {} formulas, {}s per run",
        CONFIGS.len(),
        formulas.len(),
        args.timeout
    );
    let results = harness::run_corpus(
        &args.solver,
        CONFIGS,
        &formulas,
        Duration::from_secs_f64(args.timeout),
    );

    harness::log_summary(&formulas, &results);

    let mut csv = BufWriter::new(File::create(&args.output)?);
    harness::write_csv(&mut csv, &formulas, &results)?;
    info!("csv report saved to {}", args.output.display());

    Ok(())
}

/// `formula_12.cnf` sorts numerically; anything unnumbered sorts after,
/// lexically
fn corpus_key(path: &Path) -> (u64, String) {
    let stem = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    let index = stem
        .rsplit('_')
        .next()
        .and_then(|n| n.parse().ok())
        .unwrap_or(u64::MAX);
    (index, stem)
}

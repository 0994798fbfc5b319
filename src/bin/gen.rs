use clap::Parser;
use dpll_solver::{dimacs, gen};
use log::info;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::path::PathBuf;

/// Generate a corpus of random 3-SAT benchmark formulas around the
/// phase-transition ratio
#[derive(Debug, Parser)]
#[command(name = "dpll-gen", version, about)]
struct Args {
    /// Directory the formulas are written into
    #[arg(long, short, default_value = "benchmark")]
    output: PathBuf,

    /// Number of formulas
    #[arg(long, short = 'n', default_value_t = 100)]
    count: u32,

    /// Variables per formula
    #[arg(long, short, default_value_t = 50)]
    vars: u32,

    /// Literals per clause
    #[arg(long, short = 'k', default_value_t = 3)]
    clause_size: usize,

    /// Seed for a reproducible corpus
    #[arg(long, short)]
    seed: Option<u64>,
}

fn main() -> io::Result<()> {
    pretty_env_logger::init();
    let args = Args::parse();

    let mut rng = match args.seed {
        Some(seed) => {
            info!("using seed {}", seed);
            SmallRng::seed_from_u64(seed)
        }
        None => SmallRng::from_entropy(),
    };

    fs::create_dir_all(&args.output)?;
    info!(
        "generating {} formulas with {} vars and {} literals per clause",
        args.count, args.vars, args.clause_size
    );

    for i in 1..=args.count {
        let num_clauses = gen::sample_num_clauses(&mut rng, args.vars);
        let formula = gen::random_formula(&mut rng, args.vars, num_clauses, args.clause_size);

        let path = args.output.join(format!("formula_{}.cnf", i));
        let mut file = BufWriter::new(File::create(&path)?);
        let sizes = format!("vars: {}, clauses: {}", args.vars, formula.clauses().len());
        dimacs::write(
            &mut file,
            &formula,
            &["randomly generated benchmark formula", sizes.as_str()],
        )?;

        if i % 10 == 0 {
            info!("generated {}/{} formulas", i, args.count);
        }
    }

    info!("corpus written to {}", args.output.display());
    Ok(())
}

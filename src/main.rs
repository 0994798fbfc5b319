use clap::{Parser, ValueEnum};
use dpll_solver::engine::Solver;
use dpll_solver::harness;
use dpll_solver::heuristic::{Activity, Bohm, Heuristic};
use dpll_solver::restart::{LubyRestarts, NeverRestart, RestartPolicy};
use dpll_solver::transition::TransitionSolver;
use dpll_solver::{dimacs, Formula, Literal, UnknownReason, VarId, Verdict};
use log::{debug, error, info, warn};
use std::path::PathBuf;
use std::process::exit;
use std::time::Duration;

/// DPLL SAT solver for DIMACS CNF files
#[derive(Debug, Parser)]
#[command(name = "dpll-solver", version, about)]
struct Args {
    /// The CNF problem to solve
    path: PathBuf,

    /// Branching heuristic
    #[arg(long, value_enum, default_value = "bohm")]
    heuristic: HeuristicArg,

    /// Restart policy
    #[arg(long, value_enum, default_value = "luby")]
    restarts: RestartArg,

    /// Search engine realization
    #[arg(long, value_enum, default_value = "recursive")]
    engine: EngineArg,

    /// Wall-clock budget in seconds; a lapsed budget reports `unknown`
    #[arg(long)]
    timeout: Option<f64>,

    /// On sat, also print the model as DIMACS literals
    #[arg(long)]
    model: bool,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
enum HeuristicArg {
    Bohm,
    Activity,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
enum RestartArg {
    Luby,
    Off,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
enum EngineArg {
    Recursive,
    Transition,
}

fn main() {
    pretty_env_logger::init();
    let args = Args::parse();

    let formula = match dimacs::read_from_file(&args.path) {
        Ok(formula) => formula,
        Err(err) => {
            error!("{}: {}", args.path.display(), err);
            println!("{}", Verdict::Unknown(UnknownReason::ParseError));
            exit(1);
        }
    };
    info!(
        "solving {} with {} vars and {} clauses",
        args.path.display(),
        formula.num_vars(),
        formula.clauses().len()
    );

    let config = (args.heuristic, args.restarts, args.engine);
    let verdict = match args.timeout {
        Some(secs) => harness::solve_with_timeout(Duration::from_secs_f64(secs), move || {
            solve(formula, config)
        }),
        None => solve(formula, config),
    };

    println!("{}", verdict);
    match verdict {
        Verdict::Sat(model) => {
            if args.model {
                let lits: Vec<String> = model
                    .inner
                    .iter()
                    .enumerate()
                    .map(|(i, &value)| {
                        let lit = Literal::new(VarId::new(i as u32));
                        let lit = if value { lit } else { !lit };
                        lit.to_dimacs().to_string()
                    })
                    .collect();
                println!("{} 0", lits.join(" "));
            }
        }
        Verdict::Unsat => (),
        Verdict::Unknown(reason) => {
            warn!("no verdict: {}", reason);
            exit(1);
        }
    }
}

fn solve(formula: Formula, (heuristic, restarts, engine): (HeuristicArg, RestartArg, EngineArg)) -> Verdict {
    match engine {
        EngineArg::Transition => {
            let mut solver = TransitionSolver::new(&formula);
            let verdict = solver.solve();
            debug!("{:?}", solver.stats());
            verdict
        }
        EngineArg::Recursive => {
            let heuristic: Box<dyn Heuristic> = match heuristic {
                HeuristicArg::Bohm => Box::new(Bohm::default()),
                HeuristicArg::Activity => Box::new(Activity::new(formula.num_vars())),
            };
            let restarts: Box<dyn RestartPolicy> = match restarts {
                RestartArg::Luby => Box::new(LubyRestarts::default()),
                RestartArg::Off => Box::new(NeverRestart),
            };
            let mut solver = Solver::new(formula, heuristic, restarts);
            let verdict = solver.solve();
            debug!("{:?}", solver.stats());
            verdict
        }
    }
}

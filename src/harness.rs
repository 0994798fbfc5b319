//! Benchmark harness: time solver configurations against a formula corpus
//!
//! Cancellation is preemptive, not cooperative: the search has no timeout
//! checks sprinkled through it, so each (configuration, formula) run is a
//! child process killed at the wall-clock deadline.  One worker thread per
//! configuration walks the corpus; workers share nothing and report their
//! records back to the coordinator.

use crate::data::{UnknownReason, Verdict};
use crossbeam::channel;
use log::{info, warn};
use std::fmt;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

/// Run a solve on a worker thread under a wall-clock budget.
///
/// On timeout the worker is abandoned, still running; callers are expected
/// to exit soon after rather than keep issuing work in the same process.
pub fn solve_with_timeout<F>(timeout: Duration, job: F) -> Verdict
where
    F: FnOnce() -> Verdict + Send + 'static,
{
    let (tx, rx) = channel::bounded(1);
    thread::spawn(move || {
        let _ = tx.send(job());
    });
    match rx.recv_timeout(timeout) {
        Ok(verdict) => verdict,
        Err(_) => Verdict::Unknown(UnknownReason::Timeout),
    }
}

/// One named solver configuration: the flags handed to the solver binary
#[derive(Debug, Clone, Copy)]
pub struct SolverConfig {
    pub name: &'static str,
    pub args: &'static [&'static str],
}

/// The roster benchmarked by `dpll-bench`: every heuristic/restart pairing
/// of the recursive engine, plus the transition-system baseline
pub const CONFIGS: &[SolverConfig] = &[
    SolverConfig {
        name: "chrono-activity",
        args: &["--heuristic", "activity", "--restarts", "off"],
    },
    SolverConfig {
        name: "chrono-bohm",
        args: &["--heuristic", "bohm", "--restarts", "off"],
    },
    SolverConfig {
        name: "luby-activity",
        args: &["--heuristic", "activity", "--restarts", "luby"],
    },
    SolverConfig {
        name: "luby-bohm",
        args: &["--heuristic", "bohm", "--restarts", "luby"],
    },
    SolverConfig {
        name: "baseline",
        args: &["--engine", "transition"],
    },
];

/// A verdict as printed by a solver subprocess
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ReportedVerdict {
    Sat,
    Unsat,
    Unknown,
}

impl fmt::Display for ReportedVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ReportedVerdict::Sat => "sat",
            ReportedVerdict::Unsat => "unsat",
            ReportedVerdict::Unknown => "unknown",
        };
        write!(f, "{}", s)
    }
}

/// Classify a solver's stdout.  "unsat" anywhere beats "sat" (which it
/// contains); anything else is unknown.
pub fn parse_verdict(output: &str) -> ReportedVerdict {
    let lower = output.to_lowercase();
    if lower.contains("unsat") {
        ReportedVerdict::Unsat
    } else if lower.contains("sat") {
        ReportedVerdict::Sat
    } else {
        ReportedVerdict::Unknown
    }
}

/// Timing and verdict for one (configuration, formula) run.  `elapsed` is
/// `None` when the run was killed at the deadline.
#[derive(Debug, Clone, Copy)]
pub struct RunRecord {
    pub elapsed: Option<Duration>,
    pub verdict: ReportedVerdict,
}

impl RunRecord {
    fn timed_out() -> Self {
        Self {
            elapsed: None,
            verdict: ReportedVerdict::Unknown,
        }
    }
}

/// Run `solver args formula`, killing the child at `timeout`
pub fn run_solver(solver: &Path, args: &[&str], formula: &Path, timeout: Duration) -> RunRecord {
    let start = Instant::now();
    let mut child = match Command::new(solver)
        .args(args)
        .arg(formula)
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
    {
        Ok(child) => child,
        Err(err) => {
            warn!("failed to launch {}: {}", solver.display(), err);
            return RunRecord::timed_out();
        }
    };

    loop {
        match child.try_wait() {
            Ok(Some(_status)) => {
                let elapsed = start.elapsed();
                let mut output = String::new();
                if let Some(mut stdout) = child.stdout.take() {
                    let _ = stdout.read_to_string(&mut output);
                }
                return RunRecord {
                    elapsed: Some(elapsed),
                    verdict: parse_verdict(&output),
                };
            }
            Ok(None) => {
                if start.elapsed() >= timeout {
                    let _ = child.kill();
                    let _ = child.wait();
                    return RunRecord::timed_out();
                }
                thread::sleep(Duration::from_millis(10));
            }
            Err(err) => {
                warn!("lost track of {}: {}", solver.display(), err);
                let _ = child.kill();
                let _ = child.wait();
                return RunRecord::timed_out();
            }
        }
    }
}

/// Every record for one configuration, in corpus order
#[derive(Debug, Clone)]
pub struct ConfigResults {
    pub config: SolverConfig,
    pub records: Vec<RunRecord>,
}

/// Run every configuration over the corpus, one worker per configuration
pub fn run_corpus(
    solver: &Path,
    configs: &[SolverConfig],
    formulas: &[PathBuf],
    timeout: Duration,
) -> Vec<ConfigResults> {
    crossbeam::thread::scope(|scope| {
        let workers: Vec<_> = configs
            .iter()
            .map(|&config| {
                scope.spawn(move |_| {
                    info!("starting configuration {}", config.name);
                    let records = formulas
                        .iter()
                        .map(|formula| {
                            let record = run_solver(solver, config.args, formula, timeout);
                            match record.elapsed {
                                Some(elapsed) => info!(
                                    "{}: {} -> {} in {:.4}s",
                                    config.name,
                                    formula.display(),
                                    record.verdict,
                                    elapsed.as_secs_f64()
                                ),
                                None => info!(
                                    "{}: {} timed out",
                                    config.name,
                                    formula.display()
                                ),
                            }
                            record
                        })
                        .collect();
                    info!("finished configuration {}", config.name);
                    ConfigResults { config, records }
                })
            })
            .collect();

        workers
            .into_iter()
            .map(|worker| worker.join().unwrap())
            .collect()
    })
    .unwrap()
}

/// The fastest configuration with a definite verdict on one formula
pub fn winner(results: &[ConfigResults], formula_index: usize) -> Option<(&'static str, Duration)> {
    results
        .iter()
        .filter_map(|config_results| {
            let record = config_results.records[formula_index];
            match (record.elapsed, record.verdict) {
                (Some(elapsed), verdict) if verdict != ReportedVerdict::Unknown => {
                    Some((config_results.config.name, elapsed))
                }
                _ => None,
            }
        })
        .min_by_key(|&(_, elapsed)| elapsed)
}

/// Write the per-formula grid: a time and result column per configuration,
/// then the winner and its time
pub fn write_csv(
    w: &mut impl Write,
    formulas: &[PathBuf],
    results: &[ConfigResults],
) -> io::Result<()> {
    write!(w, "formula")?;
    for config_results in results {
        let name = config_results.config.name;
        write!(w, ",{}_time,{}_result", name, name)?;
    }
    writeln!(w, ",winner,winner_time")?;

    for (i, formula) in formulas.iter().enumerate() {
        let stem = formula
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        write!(w, "{}", stem)?;
        for config_results in results {
            let record = config_results.records[i];
            match record.elapsed {
                Some(elapsed) => {
                    write!(w, ",{:.4},{}", elapsed.as_secs_f64(), record.verdict)?
                }
                None => write!(w, ",inf,{}", record.verdict)?,
            }
        }
        match winner(results, i) {
            Some((name, elapsed)) => writeln!(w, ",{},{:.4}", name, elapsed.as_secs_f64())?,
            None => writeln!(w, ",none,inf")?,
        }
    }
    Ok(())
}

/// Log the per-configuration totals and the fastest-solver ranking
pub fn log_summary(formulas: &[PathBuf], results: &[ConfigResults]) {
    for config_results in results {
        let records = &config_results.records;
        let solved: Vec<Duration> = records.iter().filter_map(|r| r.elapsed).collect();
        let timeouts = records.len() - solved.len();
        if solved.is_empty() {
            info!(
                "{}: solved 0/{} ({} timeouts)",
                config_results.config.name,
                records.len(),
                timeouts
            );
        } else {
            let mean = solved.iter().sum::<Duration>() / solved.len() as u32;
            info!(
                "{}: solved {}/{} ({} timeouts), mean time {:.4}s",
                config_results.config.name,
                solved.len(),
                records.len(),
                timeouts,
                mean.as_secs_f64()
            );
        }
    }

    for config_results in results {
        let wins = (0..formulas.len())
            .filter(|&i| {
                winner(results, i)
                    .map(|(name, _)| name == config_results.config.name)
                    .unwrap_or(false)
            })
            .count();
        info!("{}: fastest on {} formulas", config_results.config.name, wins);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verdict_parsing_prefers_unsat() {
        assert_eq!(parse_verdict("sat\n"), ReportedVerdict::Sat);
        assert_eq!(parse_verdict("unsat\n"), ReportedVerdict::Unsat);
        assert_eq!(parse_verdict("UNSAT"), ReportedVerdict::Unsat);
        assert_eq!(parse_verdict("unknown\n"), ReportedVerdict::Unknown);
        assert_eq!(parse_verdict(""), ReportedVerdict::Unknown);
        assert_eq!(parse_verdict("solving...\nsat\n"), ReportedVerdict::Sat);
    }

    fn record(elapsed_ms: Option<u64>, verdict: ReportedVerdict) -> RunRecord {
        RunRecord {
            elapsed: elapsed_ms.map(Duration::from_millis),
            verdict,
        }
    }

    fn results() -> Vec<ConfigResults> {
        vec![
            ConfigResults {
                config: SolverConfig { name: "fast", args: &[] },
                records: vec![
                    record(Some(10), ReportedVerdict::Sat),
                    record(None, ReportedVerdict::Unknown),
                ],
            },
            ConfigResults {
                config: SolverConfig { name: "slow", args: &[] },
                records: vec![
                    record(Some(50), ReportedVerdict::Sat),
                    record(None, ReportedVerdict::Unknown),
                ],
            },
        ]
    }

    #[test]
    fn winner_is_the_fastest_definite_verdict() {
        let results = results();
        assert_eq!(winner(&results, 0).unwrap().0, "fast");
        // everyone timed out on the second formula
        assert_eq!(winner(&results, 1), None);
    }

    #[test]
    fn csv_layout_matches_the_report_format() {
        let formulas = vec![PathBuf::from("formula_1.cnf"), PathBuf::from("formula_2.cnf")];
        let mut out = Vec::new();
        write_csv(&mut out, &formulas, &results()).unwrap();
        let text = String::from_utf8(out).unwrap();

        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "formula,fast_time,fast_result,slow_time,slow_result,winner,winner_time"
        );
        assert_eq!(
            lines.next().unwrap(),
            "formula_1,0.0100,sat,0.0500,sat,fast,0.0100"
        );
        assert_eq!(lines.next().unwrap(), "formula_2,inf,unknown,inf,unknown,none,inf");
    }

    #[test]
    fn timeouts_preempt_the_worker() {
        let verdict = solve_with_timeout(Duration::from_millis(20), || {
            thread::sleep(Duration::from_secs(5));
            Verdict::Unsat
        });
        assert_eq!(verdict, Verdict::Unknown(UnknownReason::Timeout));
    }

    #[test]
    fn fast_workers_beat_the_deadline() {
        let verdict = solve_with_timeout(Duration::from_secs(5), || Verdict::Unsat);
        assert_eq!(verdict, Verdict::Unsat);
    }
}

//! Read and write the simplified DIMACS format used by the SAT competition
//!
//! See
//! (http://www.satcompetition.org/2011/format-benchmarks2011.html)[http://www.satcompetition.org/2011/format-benchmarks2011.html]
//! for a description of the format.
//!
//! Malformed input is a [`ParseError`], never a panic and never an unsat
//! verdict: the caller maps it to `unknown`.

use crate::data::{Clause, Literal};
use crate::formula::Formula;

use std::fs::File;
use std::io::{self, prelude::*, BufReader};
use std::path::Path;
use thiserror::Error;
use tinyvec::TinyVec;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
    #[error("missing `p cnf <vars> <clauses>` header")]
    MissingHeader,
    #[error("malformed header line {0:?}")]
    BadHeader(String),
    #[error("not an integer: {0:?}")]
    BadToken(String),
    #[error("literal {0} names a variable beyond the declared {1}")]
    OutOfRange(i32, u32),
    #[error("clause has no terminating 0: {0:?}")]
    MissingTerminator(String),
}

pub fn read_from_file(path: impl AsRef<Path>) -> Result<Formula, ParseError> {
    let file = File::open(path)?;
    read(BufReader::new(file))
}

/// Parse a CNF problem.  One clause per non-comment line after the header,
/// terminated by `0`.
pub fn read(reader: impl BufRead) -> Result<Formula, ParseError> {
    let mut lines = reader.lines();

    let (num_vars, num_clauses): (u32, u32) = loop {
        let line = match lines.next() {
            Some(line) => line?,
            None => return Err(ParseError::MissingHeader),
        };
        let line = line.trim();

        if line.is_empty() || line.starts_with('c') {
            continue;
        }
        if !line.starts_with('p') {
            // clauses before any header
            return Err(ParseError::MissingHeader);
        }

        // example line:
        // p cnf 5 3
        let bad = || ParseError::BadHeader(line.to_string());
        let parts: Vec<_> = line.split_whitespace().collect();
        if parts.len() != 4 || parts[0] != "p" || parts[1] != "cnf" {
            return Err(bad());
        }
        let num_vars: u32 = parts[2].parse().map_err(|_| bad())?;
        let num_clauses: u32 = parts[3].parse().map_err(|_| bad())?;
        if num_vars >= 1 << 31 {
            return Err(bad());
        }
        break (num_vars, num_clauses);
    };

    let mut clauses = Vec::with_capacity(num_clauses as usize);

    for line in lines {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('c') {
            continue;
        }

        let mut clause: Clause = TinyVec::new();
        let mut terminated = false;
        for chunk in line.split_whitespace() {
            let lit: i32 = chunk
                .parse()
                .map_err(|_| ParseError::BadToken(chunk.to_string()))?;
            if lit == 0 {
                // zero marks the end of the clause
                terminated = true;
                break;
            }
            if lit.unsigned_abs() > num_vars {
                return Err(ParseError::OutOfRange(lit, num_vars));
            }
            clause.push(Literal::from_dimacs(lit));
        }
        if !terminated {
            return Err(ParseError::MissingTerminator(line.to_string()));
        }
        clauses.push(clause);
    }

    Ok(Formula::new(num_vars, clauses))
}

/// Write a formula in DIMACS format, with `c` comment lines up front
pub fn write(w: &mut impl Write, formula: &Formula, comments: &[&str]) -> io::Result<()> {
    for comment in comments {
        writeln!(w, "c {}", comment)?;
    }
    writeln!(w, "p cnf {} {}", formula.num_vars(), formula.clauses().len())?;
    for clause in formula.clauses() {
        for &lit in &clause[..] {
            write!(w, "{} ", lit.to_dimacs())?;
        }
        writeln!(w, "0")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::VarId;

    fn parse(input: &str) -> Result<Formula, ParseError> {
        read(input.as_bytes())
    }

    #[test]
    fn parses_a_small_problem() {
        let formula = parse(
            "c a comment\n\
             c another comment\n\
             p cnf 3 2\n\
             1 -3 0\n\
             2 3 -1 0\n",
        )
        .unwrap();

        assert_eq!(formula.num_vars(), 3);
        assert_eq!(formula.clauses().len(), 2);
        assert_eq!(formula.clauses()[0][0], Literal::from_dimacs(1));
        assert_eq!(formula.clauses()[0][1], Literal::from_dimacs(-3));
        assert_eq!(formula.clauses()[1][2], Literal::from_dimacs(-1));
    }

    #[test]
    fn skips_blank_lines_and_late_comments() {
        let formula = parse("p cnf 2 2\n\n1 0\nc interlude\n-2 0\n").unwrap();
        assert_eq!(formula.clauses().len(), 2);
    }

    #[test]
    fn rejects_missing_header() {
        assert!(matches!(parse("1 2 0\n"), Err(ParseError::MissingHeader)));
        assert!(matches!(parse("c only comments\n"), Err(ParseError::MissingHeader)));
        assert!(matches!(parse(""), Err(ParseError::MissingHeader)));
    }

    #[test]
    fn rejects_malformed_headers() {
        assert!(matches!(parse("p cnf x 3\n"), Err(ParseError::BadHeader(_))));
        assert!(matches!(parse("p cnf 3\n"), Err(ParseError::BadHeader(_))));
        assert!(matches!(parse("p dnf 3 3\n"), Err(ParseError::BadHeader(_))));
    }

    #[test]
    fn rejects_bad_tokens() {
        assert!(matches!(
            parse("p cnf 2 1\n1 two 0\n"),
            Err(ParseError::BadToken(_))
        ));
    }

    #[test]
    fn rejects_out_of_range_literals() {
        assert!(matches!(
            parse("p cnf 2 1\n1 -3 0\n"),
            Err(ParseError::OutOfRange(-3, 2))
        ));
    }

    #[test]
    fn rejects_unterminated_clauses() {
        assert!(matches!(
            parse("p cnf 2 1\n1 2\n"),
            Err(ParseError::MissingTerminator(_))
        ));
    }

    #[test]
    fn round_trips_through_write() {
        let formula = parse("p cnf 3 2\n1 -2 0\n-1 2 3 0\n").unwrap();
        let mut out = Vec::new();
        write(&mut out, &formula, &["generated"]).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("c generated\np cnf 3 2\n"));

        let reparsed = read(text.as_bytes()).unwrap();
        assert_eq!(reparsed.num_vars(), 3);
        assert_eq!(reparsed.clauses(), formula.clauses());
        assert_eq!(reparsed.clauses()[1][0].var_id(), VarId::new(0));
    }
}

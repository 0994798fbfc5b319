pub mod data;
pub mod dimacs;
pub mod engine;
pub mod formula;
pub mod gen;
pub mod harness;
pub mod heuristic;
pub mod propagate;
pub mod restart;
pub mod transition;
pub mod vec_map;

pub use self::data::{Clause, Literal, UnknownReason, VarId, VarState, Verdict};
pub use self::engine::Solver;
pub use self::formula::{Assignment, Formula, Trail};
pub use self::heuristic::{Activity, Bohm, Heuristic};
pub use self::restart::{LubyRestarts, NeverRestart, RestartPolicy};
pub use self::transition::TransitionSolver;

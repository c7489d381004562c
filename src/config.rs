//! Command-line configuration, mirroring every flag documented in
//! `original_source/src/commands/solve.cpp` (`--max-confls`, `--seed`,
//! `--otf`, `--restart-type`, `--probing`, `--subsume`, `--tbr`,
//! `--vivify`, `--bve`, ...). `clap`'s derive API plays the role
//! `structopt` played in earlier CLI generations.

use crate::restart::RestartType;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug, Clone)]
#[clap(name = "dawnsat", about = "A CDCL SAT solver with inprocessing")]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Solve a DIMACS CNF file.
    Solve(SolveArgs),
    /// Check that a solution file satisfies a DIMACS CNF file.
    Check(CheckArgs),
    /// Simplify a DIMACS CNF file and print the result.
    Simplify(SimplifyArgs),
    /// Print statistics about a DIMACS CNF file without solving it.
    Stats(StatsArgs),
    /// Generate a random 3-SAT instance.
    Gen(GenArgs),
    /// Generate a structurally hard instance (pigeonhole-like).
    GenHard(GenHardArgs),
    /// Generate a circuit-derived instance.
    GenCircuit(GenCircuitArgs),
    /// Encode a (possibly reduced-round) SHA-256 preimage search as CNF.
    Sha256(Sha256Args),
}

#[derive(Parser, Debug, Clone)]
pub struct SolveArgs {
    pub input: String,
    /// Destination for the `s`/`v` solution; stdout if omitted.
    pub output: Option<String>,

    #[clap(long)]
    pub max_confls: Option<u64>,
    #[clap(long)]
    pub max_time: Option<u64>,
    #[clap(long, default_value = "0")]
    pub seed: u64,
    #[clap(long)]
    pub shuffle: bool,

    /// On-the-fly clause-shortening aggressiveness: 0=off, 1=basic, 2=recursive.
    #[clap(long, default_value = "1")]
    pub otf: u8,
    #[clap(long)]
    pub full_resolution: bool,
    /// 0=off, 1=static phase, 2=dynamic lookahead.
    #[clap(long = "branch-dominating", default_value = "0")]
    pub branch_dominating: u8,

    #[clap(long, default_value = "18446744073709551615")]
    pub max_learnt_size: usize,
    #[clap(long, default_value = "4294967295")]
    pub max_learnt_glue: u32,
    #[clap(long, default_value = "18446744073709551615")]
    pub max_learnt: usize,
    #[clap(long)]
    pub use_glue: bool,

    #[clap(long, default_value = "geometric")]
    pub restart_type: RestartType,
    #[clap(long, default_value = "100")]
    pub restart_base: f64,
    #[clap(long, default_value = "1.5")]
    pub restart_mult: f64,

    /// 0=off, 1=root failed-literal only, 2=+hyper-binary, 3=+binary probing.
    #[clap(long, default_value = "1")]
    pub probing: u8,
    /// 0=off, 1=binary only, 2=binary+long.
    #[clap(long, default_value = "2")]
    pub subsume: u8,
    /// 0=off, 2=on (matches the original's {0,2} value set).
    #[clap(long, default_value = "2")]
    pub tbr: u8,
    /// 0=off, 1=long only, 2=+binary-assisted, 3=+binary clauses themselves.
    #[clap(long, default_value = "2")]
    pub vivify: u8,
    #[clap(long)]
    pub bve: bool,
    #[clap(long)]
    pub bva: bool,

    #[clap(long, default_value = "3")]
    pub inprocess_iters: u32,
    #[clap(long)]
    pub watch_stats: bool,
    #[clap(long)]
    pub silent: bool,
    #[clap(long)]
    pub debug: bool,
    #[clap(long)]
    pub trace: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct CheckArgs {
    pub cnf: String,
    pub solution: String,
}

#[derive(Parser, Debug, Clone)]
pub struct SimplifyArgs {
    pub input: String,
    #[clap(long, default_value = "3")]
    pub inprocess_iters: u32,
    #[clap(long)]
    pub bve: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct StatsArgs {
    pub input: String,
}

#[derive(Parser, Debug, Clone)]
pub struct GenArgs {
    pub num_vars: u32,
    #[clap(long)]
    pub ratio: Option<f64>,
    #[clap(long, default_value = "0")]
    pub seed: u64,
}

#[derive(Parser, Debug, Clone)]
pub struct GenHardArgs {
    pub num_groups: u32,
    pub group_size: u32,
    #[clap(long, default_value = "0")]
    pub seed: u64,
}

#[derive(Parser, Debug, Clone)]
pub struct GenCircuitArgs {
    pub depth: u32,
    #[clap(long, default_value = "0")]
    pub seed: u64,
}

#[derive(Parser, Debug, Clone)]
pub struct Sha256Args {
    #[clap(long, default_value = "64")]
    pub rounds: u32,
    #[clap(long)]
    pub solve: bool,
    #[clap(long, default_value = "0")]
    pub fixed_zero_bits: u32,
}

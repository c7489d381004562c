//! CLI front end: the only part of this crate that touches the
//! filesystem, the clock or signals. Thin dispatch over the library,
//! mirroring `original_source/src/commands/*.cpp`'s one-file-per-
//! subcommand split (here folded into one binary, `clap` subcommands
//! standing in for the original's argv dispatch).

use clap::Parser;
use dawnsat::cleanup::{simplify, InprocessConfig};
use dawnsat::cnf::Cnf;
use dawnsat::config::{
    Cli, Command, CheckArgs, GenArgs, GenCircuitArgs, GenHardArgs, Sha256Args, SimplifyArgs,
    SolveArgs, StatsArgs,
};
use dawnsat::dimacs::{self, Solution};
use dawnsat::error::DawnResult;
use dawnsat::gen;
use dawnsat::interrupt::Interrupt;
use dawnsat::lit::Lit;
use dawnsat::reconstruction::Reconstruction;
use dawnsat::search::{SearchConfig, SearchResult, Searcher};
use dawnsat::sha256;
use dawnsat::stats::Stats;

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::thread;
use std::time::Duration;

fn main() {
    let cli = Cli::parse();
    init_logging(&cli.command);
    let code = match cli.command {
        Command::Solve(args) => cmd_solve(args),
        Command::Check(args) => cmd_check(args),
        Command::Simplify(args) => cmd_simplify(args),
        Command::Stats(args) => cmd_stats(args),
        Command::Gen(args) => cmd_gen(args),
        Command::GenHard(args) => cmd_gen_hard(args),
        Command::GenCircuit(args) => cmd_gen_circuit(args),
        Command::Sha256(args) => cmd_sha256(args),
    };
    std::process::exit(code);
}

/// Set the log level from `--debug`/`--trace`/`--silent`, mirroring
/// `original_source/src/commands/solve.cpp`'s per-component
/// `Logger::set_level` (folded here into one global filter rather than
/// per-module levels, since `env_logger`'s target filtering already
/// covers the `dawnsat::<module>` targets each module logs under).
fn init_logging(command: &Command) {
    let mut builder = env_logger::Builder::from_default_env();
    if let Command::Solve(args) = command {
        if args.silent {
            builder.filter_level(log::LevelFilter::Off);
        } else if args.trace {
            builder.filter_level(log::LevelFilter::Trace);
        } else if args.debug {
            builder.filter_level(log::LevelFilter::Debug);
        }
    }
    builder.init();
}

fn open_input(path: &str) -> DawnResult<Box<dyn BufRead>> {
    if path == "-" {
        Ok(Box::new(BufReader::new(io::stdin())))
    } else {
        Ok(Box::new(BufReader::new(File::open(path)?)))
    }
}

fn open_output(path: &Option<String>) -> DawnResult<Box<dyn Write>> {
    match path {
        Some(p) => Ok(Box::new(BufWriter::new(File::create(p)?))),
        None => Ok(Box::new(BufWriter::new(io::stdout()))),
    }
}

fn read_cnf(path: &str) -> DawnResult<Cnf> {
    let mut input = open_input(path)?;
    dimacs::parse_cnf(&mut *input)
}

/// Install a background timer that sets `interrupt` once `max_time`
/// seconds elapse; `original_source/src/commands/solve.cpp` installs a
/// `SIGALRM` handler for the same purpose, which this timer thread
/// stands in for in the absence of a signal-handling crate in the
/// dependency stack.
fn install_timeout(interrupt: &Interrupt, max_time: Option<u64>) {
    if let Some(secs) = max_time {
        let handle = interrupt.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_secs(secs));
            handle.set();
        });
    }
}

fn cmd_solve(args: SolveArgs) -> i32 {
    let mut cnf = match read_cnf(&args.input) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("PARSE ERROR: {}", e);
            return -1;
        }
    };

    let original_num_vars = cnf.num_vars;
    let interrupt = Interrupt::new();
    install_timeout(&interrupt, args.max_time);

    let mut recon = Reconstruction::new(original_num_vars);
    let mut stats = Stats::new();
    let inprocess_cfg = InprocessConfig {
        probing: args.probing > 0,
        subsume: args.subsume > 0,
        tbr: args.tbr > 0,
        vivify: args.vivify > 0,
        bve: args.bve,
        bce: false,
        iters: args.inprocess_iters,
        interrupt: Some(interrupt.clone()),
    };
    simplify(&mut cnf, &mut recon, &inprocess_cfg, &mut stats);

    let mut out = match open_output(&args.output) {
        Ok(w) => w,
        Err(e) => {
            eprintln!("PARSE ERROR: {}", e);
            return -1;
        }
    };

    if cnf.contradiction {
        let _ = dimacs::print_solution(&mut *out, &Solution::Unsat);
        if args.watch_stats {
            stats.print_summary();
        }
        return 20;
    }

    let search_cfg = SearchConfig {
        max_conflicts: args.max_confls,
        max_learnt_size: args.max_learnt_size,
        max_learnt_glue: args.max_learnt_glue,
        use_glue: args.use_glue,
        on_the_fly_minimize: args.otf > 0,
        restart_type: args.restart_type,
        restart_base: args.restart_base,
        restart_mult: args.restart_mult,
        var_decay: 1.05,
        branch_dominating: args.branch_dominating,
        max_learnt_clauses: args.max_learnt,
        interrupt: Some(interrupt),
    };

    let result = {
        let mut searcher = Searcher::new(&mut cnf, search_cfg.var_decay);
        let result = searcher.run(&search_cfg);
        stats.conflicts = searcher.conflicts();
        stats.decisions = searcher.decisions();
        stats.restarts = searcher.restarts();
        if result == SearchResult::Sat {
            let inner_model = searcher.model();
            Some((result, Some(inner_model)))
        } else {
            Some((result, None))
        }
    };

    let code = match result {
        Some((SearchResult::Sat, Some(inner_model))) => {
            let outer_model = recon.extend(&inner_model, original_num_vars);
            let _ = dimacs::print_solution(&mut *out, &Solution::Sat(outer_model));
            10
        }
        Some((SearchResult::Unsat, _)) => {
            let _ = dimacs::print_solution(&mut *out, &Solution::Unsat);
            20
        }
        _ => {
            let _ = dimacs::print_solution(&mut *out, &Solution::Unknown);
            30
        }
    };
    if args.watch_stats {
        stats.print_summary();
    }
    code
}

fn lit_value(model: &[bool], l: Lit) -> bool {
    model[l.var() as usize] != l.sign()
}

/// Verify that `model` satisfies every clause tier of `cnf`; grounded on
/// `original_source/src/commands/check.cpp`'s direct clause walk (no
/// solving, just evaluation).
fn verify_model(cnf: &Cnf, model: &[bool]) -> bool {
    if cnf.contradiction {
        return false;
    }
    for &u in &cnf.units {
        if !lit_value(model, u) {
            return false;
        }
    }
    for raw in 0..cnf.bins.len() {
        let a = Lit::new((raw / 2) as u32, raw % 2 == 1).neg();
        for &b in &cnf.bins[raw] {
            if a <= b && !(lit_value(model, a) || lit_value(model, b)) {
                return false;
            }
        }
    }
    for cref in cnf.clauses.iter() {
        if !cnf.clauses.lits(cref).iter().any(|&l| lit_value(model, l)) {
            return false;
        }
    }
    true
}

fn cmd_check(args: CheckArgs) -> i32 {
    let cnf = match read_cnf(&args.cnf) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("PARSE ERROR: {}", e);
            return -1;
        }
    };
    let mut sol_reader = match open_input(&args.solution) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("PARSE ERROR: {}", e);
            return -1;
        }
    };
    let solution = match dimacs::parse_solution(&mut *sol_reader, cnf.num_vars) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("PARSE ERROR: {}", e);
            return -1;
        }
    };
    match solution {
        Solution::Sat(model) => {
            if verify_model(&cnf, &model) {
                println!("s VERIFIED");
                0
            } else {
                println!("s FALSIFIED");
                -1
            }
        }
        Solution::Unsat | Solution::Unknown => {
            eprintln!("PARSE ERROR: solution file does not contain a model to check");
            -1
        }
    }
}

fn cmd_simplify(args: SimplifyArgs) -> i32 {
    let mut cnf = match read_cnf(&args.input) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("PARSE ERROR: {}", e);
            return -1;
        }
    };
    let mut recon = Reconstruction::new(cnf.num_vars);
    let mut stats = Stats::new();
    let cfg = InprocessConfig {
        bve: args.bve,
        iters: args.inprocess_iters,
        ..InprocessConfig::default()
    };
    simplify(&mut cnf, &mut recon, &cfg, &mut stats);
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let _ = dimacs::print_cnf(&cnf, &mut out);
    0
}

fn cmd_stats(args: StatsArgs) -> i32 {
    let cnf = match read_cnf(&args.input) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("PARSE ERROR: {}", e);
            return -1;
        }
    };
    println!("c variables:       {}", cnf.num_vars);
    println!("c unit clauses:    {}", cnf.num_units());
    println!("c binary clauses:  {}", cnf.num_bins());
    println!("c long clauses:    {}", cnf.num_long());

    let mut histogram: std::collections::BTreeMap<usize, usize> = std::collections::BTreeMap::new();
    for cref in cnf.clauses.iter() {
        *histogram.entry(cnf.clauses.lits(cref).len()).or_insert(0) += 1;
    }
    for (len, count) in histogram {
        println!("c   length {}: {}", len, count);
    }
    0
}

fn cmd_gen(args: GenArgs) -> i32 {
    let ratio = args.ratio.unwrap_or(gen::DEFAULT_RATIO_3SAT);
    let cnf = gen::gen_3sat(args.num_vars, ratio, args.seed);
    print_generated(&cnf)
}

fn cmd_gen_hard(args: GenHardArgs) -> i32 {
    let cnf = gen::gen_hard(args.num_groups, args.group_size, args.seed);
    print_generated(&cnf)
}

fn cmd_gen_circuit(args: GenCircuitArgs) -> i32 {
    let cnf = gen::gen_circuit(args.depth, args.seed);
    print_generated(&cnf)
}

fn print_generated(cnf: &Cnf) -> i32 {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match dimacs::print_cnf(cnf, &mut out) {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("PARSE ERROR: {}", e);
            -1
        }
    }
}

fn cmd_sha256(args: Sha256Args) -> i32 {
    let cnf = sha256::build_sha256_instance(args.rounds, args.fixed_zero_bits);
    if !args.solve {
        return print_generated(&cnf);
    }

    let mut cnf = cnf;
    let original_num_vars = cnf.num_vars;
    let mut recon = Reconstruction::new(original_num_vars);
    let mut stats = Stats::new();
    simplify(&mut cnf, &mut recon, &InprocessConfig::default(), &mut stats);

    if cnf.contradiction {
        println!("s UNSATISFIABLE");
        return 20;
    }

    let search_cfg = SearchConfig::default();
    let mut searcher = Searcher::new(&mut cnf, search_cfg.var_decay);
    match searcher.run(&search_cfg) {
        SearchResult::Sat => {
            let outer_model = recon.extend(&searcher.model(), original_num_vars);
            let stdout = io::stdout();
            let mut out = stdout.lock();
            let _ = dimacs::print_solution(&mut out, &Solution::Sat(outer_model));
            10
        }
        SearchResult::Unsat => {
            println!("s UNSATISFIABLE");
            20
        }
        SearchResult::Unknown => {
            println!("s UNKNOWN");
            30
        }
    }
}

//! Solver telemetry: conflict/decision/propagation counters plus simple
//! per-pass timers, grounded on
//! `original_source/src/sat/stats.h`'s `Stats` struct (there, a bag of
//! `int64_t` counters and `Stopwatch` timers; here, plain `Duration`
//! accumulators since the core has no wall-clock access of its own and
//! the CLI front end is the one that stamps timings).

use std::time::Duration;

#[derive(Default, Debug, Clone)]
pub struct Stats {
    pub conflicts: u64,
    pub decisions: u64,
    pub propagations: u64,
    pub restarts: u64,
    pub learnt_clauses: u64,
    pub units_derived: u64,
    pub probing_derived: u64,
    pub subsumed: u64,
    pub strengthened: u64,
    pub vivified: u64,
    pub eliminated_vars: u64,
    pub blocked_clauses: u64,
    pub inprocess_iters: u64,
    pub time_search: Duration,
    pub time_probe: Duration,
    pub time_subsume: Duration,
    pub time_vivify: Duration,
    pub time_eliminate: Duration,
}

impl Stats {
    pub fn new() -> Stats {
        Stats::default()
    }

    pub fn print_summary(&self) {
        println!("c conflicts:         {}", self.conflicts);
        println!("c decisions:         {}", self.decisions);
        println!("c propagations:      {}", self.propagations);
        println!("c restarts:          {}", self.restarts);
        println!("c learnt clauses:    {}", self.learnt_clauses);
        println!("c units derived:     {}", self.units_derived);
        println!("c probing derived:   {}", self.probing_derived);
        println!("c subsumed/stren.:   {}/{}", self.subsumed, self.strengthened);
        println!("c vivified:          {}", self.vivified);
        println!("c eliminated vars:   {}", self.eliminated_vars);
        println!("c blocked clauses:   {}", self.blocked_clauses);
        println!("c inprocess iters:   {}", self.inprocess_iters);
    }
}

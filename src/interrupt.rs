//! The process-wide interrupt flag: the one piece of shared mutable state
//! outside the solver core, per the single-threaded cooperative model.
//! The CLI's `SIGINT`/`SIGALRM` handler sets it; the core only ever reads
//! it, at well-defined quiescent points (after every conflict, between
//! inprocessing passes, and at the top of the vivification loop).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Clone, Default)]
pub struct Interrupt(Arc<AtomicBool>);

impl Interrupt {
    pub fn new() -> Interrupt {
        Interrupt(Arc::new(AtomicBool::new(false)))
    }

    pub fn set(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_unset_and_latches_once_set() {
        let i = Interrupt::new();
        assert!(!i.is_set());
        let j = i.clone();
        j.set();
        assert!(i.is_set());
    }
}

//! Named-phase CPU timing, reported at run end.
//!
//! An explicit context object rather than a global singleton: the
//! integrator owns one and threads it through, so multiple `Solver`
//! instances (e.g. in tests) never share timing state.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

/// The phase names reported at run end.
pub const PHASES: &[&str] = &[
    "Solver",
    "TimeStep",
    "Jacobian",
    "InternalForces",
    "ExplicitSolve",
    "Strains",
    "Density",
    "Predictor",
    "Pressure",
    "Stress",
    "FinalRotation",
];

/// Accumulated wall-clock time per named phase.
#[derive(Debug, Clone, Default)]
pub struct CpuTimes {
    totals: BTreeMap<&'static str, Duration>,
}

impl CpuTimes {
    pub fn new() -> Self {
        CpuTimes { totals: BTreeMap::new() }
    }

    /// Time `f` and add its wall-clock duration to `phase`'s running total.
    pub fn time<T>(&mut self, phase: &'static str, f: impl FnOnce() -> T) -> T {
        let start = Instant::now();
        let result = f();
        *self.totals.entry(phase).or_insert(Duration::ZERO) += start.elapsed();
        result
    }

    pub fn total(&self, phase: &str) -> Duration {
        self.totals.get(phase).copied().unwrap_or(Duration::ZERO)
    }

    /// Add an already-measured duration to `phase`'s running total, for
    /// callers that can't route the timed work through a single `time`
    /// closure (e.g. a phase that spans a call back into the owning type).
    pub fn add(&mut self, phase: &'static str, duration: Duration) {
        *self.totals.entry(phase).or_insert(Duration::ZERO) += duration;
    }

    /// Render the accumulated totals as the end-of-run report, one phase
    /// per line, in `PHASES` order.
    pub fn report(&self) -> String {
        let mut lines = Vec::with_capacity(PHASES.len());
        for &phase in PHASES {
            lines.push(format!("{phase:>16}: {:>10.6} s", self.total(phase).as_secs_f64()));
        }
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_accumulates_across_calls() {
        let mut timers = CpuTimes::new();
        timers.time("Jacobian", || std::thread::sleep(Duration::from_millis(1)));
        timers.time("Jacobian", || std::thread::sleep(Duration::from_millis(1)));
        assert!(timers.total("Jacobian") >= Duration::from_millis(2));
    }

    #[test]
    fn report_lists_every_phase() {
        let timers = CpuTimes::new();
        let report = timers.report();
        for &phase in PHASES {
            assert!(report.contains(phase));
        }
    }
}

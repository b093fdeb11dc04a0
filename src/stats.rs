//! Run statistics for `--stats` output.

use std::time::{Duration, Instant};

/// Collects solver counters and phase timings.
///
/// Created when `--stats` is passed, threaded as `Option<&mut Stats>`.
pub struct Stats {
    total_start: Instant,
    phases: Vec<(&'static str, Duration)>,
    pub pv_curves: u32,
    pub demand_curves: u32,
    pub intersections: u32,
    pub concentration_iterations: u32,
    pub scan_combinations: u32,
    pub scan_failures: u32,
    pub scenarios_failed: u32,
}

impl Default for Stats {
    fn default() -> Self {
        Self::new()
    }
}

impl Stats {
    pub fn new() -> Self {
        Self {
            total_start: Instant::now(),
            phases: Vec::new(),
            pv_curves: 0,
            demand_curves: 0,
            intersections: 0,
            concentration_iterations: 0,
            scan_combinations: 0,
            scan_failures: 0,
            scenarios_failed: 0,
        }
    }

    /// Record a completed phase with its duration.
    pub fn add_phase(&mut self, name: &'static str, duration: Duration) {
        self.phases.push((name, duration));
    }

    /// Print the stats table to stderr.
    pub fn display(&self) {
        let total = self.total_start.elapsed();
        eprintln!();
        eprintln!("=== pecsolve stats ===");

        for (name, dur) in &self.phases {
            eprintln!("  {:<24} {:>8.3}s", name, dur.as_secs_f64());
        }

        eprintln!("  PV curves:              {}", self.pv_curves);
        eprintln!("  Demand curves:          {}", self.demand_curves);
        eprintln!("  Intersections:          {}", self.intersections);
        if self.concentration_iterations > 0 {
            eprintln!("  Concentration steps:    {}", self.concentration_iterations);
        }
        if self.scan_combinations > 0 {
            eprintln!(
                "  Scan combinations:      {}  (no solution: {})",
                self.scan_combinations, self.scan_failures
            );
        }
        if self.scenarios_failed > 0 {
            eprintln!("  Failed scenarios:       {}", self.scenarios_failed);
        }

        eprintln!("  ─────────────────────────────────");
        eprintln!("  Total:                  {:>8.3}s", total.as_secs_f64());
    }
}

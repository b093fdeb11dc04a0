//! Solar concentration.
//!
//! Catalyst and PV have equal area. Sunlight (AM1.5D by default) is
//! concentrated until the stack drives the cathode at its peak-selectivity
//! current density j*. The factor is bracketed by doubling from one sun and
//! then bisected until |j_s − j*| falls within tolerance. Every evaluation
//! of j_s counts against the iteration budget.

use super::{solve_operating_point, Inputs, ScenarioResult};
use crate::catalyst::cell::CathodeOperation;
use crate::curve::Crossing;
use crate::error::{PecError, Result};
use crate::metrics::OperatingPoint;
use crate::stats::Stats;

/// Search state: the iteration budget is shared by bracketing and bisection.
struct Search<'i, 'a> {
    inputs: &'i Inputs<'a>,
    iterations: usize,
    label: String,
}

impl Search<'_, '_> {
    /// Operating point at concentration `c`, or `None` when the stack
    /// cannot drive the electrolyzer at all.
    fn evaluate(&mut self, c: f64, mut stats: Option<&mut Stats>) -> Result<Option<Crossing>> {
        let limits = &self.inputs.config.concentration;
        if self.iterations >= limits.max_iterations {
            return Err(PecError::Convergence {
                iterations: self.iterations,
                message: format!("{}: concentration search exhausted at C = {c:.3}", self.label),
            });
        }
        self.iterations += 1;
        if let Some(ref mut s) = stats {
            s.concentration_iterations += 1;
        }

        let _span = tracing::debug_span!("concentration_step", iteration = self.iterations, c).entered();
        let pv = self.inputs.pv_curve(c, stats.as_deref_mut())?;
        match solve_operating_point(
            &pv,
            &self.inputs.cell(),
            CathodeOperation::PeakSelectivity,
            &self.inputs.config.grid,
            &self.label,
            stats,
        ) {
            Ok(crossing) => {
                tracing::debug!(j_s = crossing.x, "evaluated concentration");
                Ok(Some(crossing))
            }
            Err(PecError::NoSolution(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

fn current(crossing: &Option<Crossing>) -> f64 {
    crossing.map_or(0.0, |c| c.x)
}

pub fn run(inputs: &Inputs, mut stats: Option<&mut Stats>) -> Result<ScenarioResult> {
    let _span = tracing::info_span!("concentrated", scenario = %inputs.config.name).entered();

    let limits = inputs.config.concentration;
    let target = inputs.reduction.peak_selectivity().current_density;
    let mut search = Search {
        inputs,
        iterations: 0,
        label: inputs.label(),
    };
    let converged = |crossing: &Option<Crossing>| (current(crossing) - target).abs() < limits.tolerance;

    // Bracket
    let mut lo = 1.0;
    let mut crossing = search.evaluate(lo, stats.as_deref_mut())?;
    let (c, crossing) = if converged(&crossing) {
        (lo, crossing)
    } else if current(&crossing) > target {
        return Err(PecError::NoSolution(format!(
            "{}: j_s = {:.2} mA/cm² already exceeds j* = {target} mA/cm² at one sun",
            search.label,
            current(&crossing)
        )));
    } else {
        let mut hi;
        loop {
            if lo >= limits.max_concentration {
                return Err(PecError::NoSolution(format!(
                    "{}: j* = {target} mA/cm² not reached below {} suns",
                    search.label, limits.max_concentration
                )));
            }
            hi = (2.0 * lo).min(limits.max_concentration);
            crossing = search.evaluate(hi, stats.as_deref_mut())?;
            if converged(&crossing) || current(&crossing) > target {
                break;
            }
            lo = hi;
        }

        // Bisect
        let mut c = hi;
        while !converged(&crossing) {
            c = 0.5 * (lo + hi);
            crossing = search.evaluate(c, stats.as_deref_mut())?;
            if current(&crossing) < target {
                lo = c;
            } else {
                hi = c;
            }
        }
        (c, crossing)
    };

    let Some(crossing) = crossing else {
        return Err(PecError::NoSolution(format!("{}: no operating point at C = {c}", search.label)));
    };
    tracing::info!(
        concentration = c,
        j_s = crossing.x,
        iterations = search.iterations,
        "concentration search converged"
    );

    let op = OperatingPoint {
        current_density: crossing.x,
        voltage: crossing.y,
        catalyst_current_density: crossing.x,
    };
    let incident_power = inputs.spectrum.incident_power() * c;
    let mut result = inputs.finish(op, incident_power)?;
    result.concentration_factor = Some(c);
    Ok(result)
}

//! Variable sunlight without concentration.
//!
//! For each insolation factor the one-sun spectrum is scaled, the stack is
//! rebuilt, and its curve is intersected with the full kinetic demand of the
//! electrolyzer. Each factor is solved on its own; a failure at one factor
//! is recorded and the sweep carries on.
//!
//! The cathode area is either the configured ratio or, with
//! [`SweepArea::SparseDesign`], fixed by the sparse-coverage design at one
//! sun.

use super::{solve_operating_point, sparse, Inputs, ScenarioResult, SweepPoint};
use crate::catalyst::cell::CathodeOperation;
use crate::config::SweepArea;
use crate::error::Result;
use crate::metrics::OperatingPoint;
use crate::stats::Stats;

pub fn run(inputs: &Inputs, mut stats: Option<&mut Stats>) -> Result<Vec<SweepPoint>> {
    let _span = tracing::info_span!("no_concentration", scenario = %inputs.config.name).entered();

    let area_ratio = match inputs.config.sweep_area {
        SweepArea::Configured => inputs.config.catalyst_area_ratio,
        SweepArea::SparseDesign => {
            let design = sparse::run(inputs, stats.as_deref_mut())?;
            let ratio = design.area_ratio.unwrap_or(inputs.config.catalyst_area_ratio);
            tracing::info!(area_ratio = ratio, "cathode sized by the one-sun sparse design");
            ratio
        }
    };

    let factors = inputs.config.insolation.values()?;
    let points: Vec<SweepPoint> = factors
        .into_iter()
        .map(|factor| SweepPoint {
            parameter: factor,
            outcome: solve_at(inputs, factor, area_ratio, stats.as_deref_mut()),
        })
        .collect();

    let solved = points.iter().filter(|p| p.outcome.is_ok()).count();
    tracing::info!(solved, total = points.len(), "insolation sweep finished");
    Ok(points)
}

/// Operating point at `insolation` suns with PV area over cathode area
/// `area_ratio`.
pub fn solve_at(
    inputs: &Inputs,
    insolation: f64,
    area_ratio: f64,
    mut stats: Option<&mut Stats>,
) -> Result<ScenarioResult> {
    let pv = inputs.pv_curve(insolation, stats.as_deref_mut())?;
    let cell = inputs.cell().with_area_ratio(area_ratio);
    let crossing = solve_operating_point(
        &pv,
        &cell,
        CathodeOperation::Kinetic,
        &inputs.config.grid,
        &inputs.label(),
        stats,
    )?;
    let op = OperatingPoint {
        current_density: crossing.x,
        voltage: crossing.y,
        catalyst_current_density: cell.reduction_current_density(crossing.x),
    };
    let mut result = inputs.finish(op, inputs.spectrum.incident_power() * insolation)?;
    result.insolation = Some(insolation);
    result.area_ratio = Some(area_ratio);
    tracing::debug!(insolation, j_s = crossing.x, "insolation point");
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalyst::BoundaryPolicy;
    use crate::config::{Range, Regime, ScenarioConfig};
    use crate::error::PecError;
    use crate::spectrum::SpectrumSet;
    use approx::assert_relative_eq;

    fn config() -> ScenarioConfig {
        let mut config = ScenarioConfig::new("sun", Regime::NoConcentration, &[1.9, 1.2], "oiid-cu", "nifeox-ph14");
        config.boundary_policy = BoundaryPolicy::Clamp;
        config.insolation = Range {
            start: 0.5,
            stop: 1.5,
            step: 0.5,
        };
        config
    }

    #[test]
    fn test_current_rises_with_insolation() {
        let spectra = SpectrumSet::reference().unwrap();
        let config = config();
        let inputs = Inputs::resolve(&config, &spectra).unwrap();
        let points = run(&inputs, None).unwrap();
        assert_eq!(points.len(), 3);
        let currents: Vec<f64> = points
            .iter()
            .map(|p| p.outcome.as_ref().unwrap().operating_point.current_density)
            .collect();
        assert!(currents.windows(2).all(|w| w[1] > w[0]), "{currents:?}");
        assert_eq!(points[1].outcome.as_ref().unwrap().insolation, Some(1.0));
    }

    #[test]
    fn test_sparse_design_area_holds_peak_at_one_sun() {
        let spectra = SpectrumSet::reference().unwrap();
        let mut config = config();
        config.sweep_area = SweepArea::SparseDesign;
        let inputs = Inputs::resolve(&config, &spectra).unwrap();
        let design = sparse::run(&inputs, None).unwrap();
        let points = run(&inputs, None).unwrap();

        let one_sun = points[1].outcome.as_ref().unwrap();
        assert_relative_eq!(one_sun.area_ratio.unwrap(), design.area_ratio.unwrap());
        assert_relative_eq!(one_sun.operating_point.catalyst_current_density, 250.0, max_relative = 1e-3);
        assert_relative_eq!(one_sun.faradaic_efficiency, design.faradaic_efficiency, epsilon = 1e-3);

        // Off one sun the cathode leaves its peak
        for p in [&points[0], &points[2]] {
            let r = p.outcome.as_ref().unwrap();
            assert!(r.faradaic_efficiency < design.faradaic_efficiency);
        }
    }

    #[test]
    fn test_strict_policy_records_out_of_range() {
        let spectra = SpectrumSet::reference().unwrap();
        let mut config = config();
        // The oiid-cu table starts at 20 mA/cm², above what half a sun delivers
        config.boundary_policy = BoundaryPolicy::Strict;
        config.insolation = Range {
            start: 0.1,
            stop: 0.5,
            step: 0.2,
        };
        let inputs = Inputs::resolve(&config, &spectra).unwrap();
        let points = run(&inputs, None).unwrap();
        assert_eq!(points.len(), 3);
        assert!(points
            .iter()
            .all(|p| matches!(p.outcome, Err(PecError::OutOfRange { .. }))));
    }
}

//! Catalyst degradation of a sparse-coverage design.
//!
//! The design is first solved at full activity to fix the cathode area.
//! Losing d % of the catalyst area then pushes the remaining sites to
//! j / (1 − d/100), on both electrodes, and the cathode leaves its
//! peak-selectivity point.

use super::{solve_operating_point, sparse, Inputs, SweepPoint};
use crate::catalyst::cell::CathodeOperation;
use crate::error::Result;
use crate::metrics::OperatingPoint;
use crate::stats::Stats;

pub fn run(inputs: &Inputs, mut stats: Option<&mut Stats>) -> Result<Vec<SweepPoint>> {
    let _span = tracing::info_span!("degradation", scenario = %inputs.config.name).entered();

    let design = sparse::run(inputs, stats.as_deref_mut())?;
    let area_ratio = design.area_ratio.unwrap_or(1.0);
    let pv = inputs.pv_curve(1.0, stats.as_deref_mut())?;
    let label = inputs.label();

    let mut points = Vec::new();
    for loss in inputs.config.degradation.values()? {
        let cell = inputs
            .cell()
            .with_area_ratio(area_ratio)
            .with_active_fraction(1.0 - loss / 100.0);
        let outcome = solve_operating_point(
            &pv,
            &cell,
            CathodeOperation::Kinetic,
            &inputs.config.grid,
            &label,
            stats.as_deref_mut(),
        )
        .and_then(|crossing| {
            let op = OperatingPoint {
                current_density: crossing.x,
                voltage: crossing.y,
                catalyst_current_density: cell.reduction_current_density(crossing.x),
            };
            let mut result = inputs.finish(op, inputs.spectrum.incident_power())?;
            result.area_ratio = Some(area_ratio);
            result.degradation = Some(loss);
            Ok(result)
        });
        if let Err(ref err) = outcome {
            tracing::debug!(loss, %err, "no operating point at this degradation");
        }
        points.push(SweepPoint {
            parameter: loss,
            outcome,
        });
    }
    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Range, Regime, ScenarioConfig};
    use crate::spectrum::SpectrumSet;
    use approx::assert_relative_eq;

    #[test]
    fn test_degradation_lowers_current() {
        let spectra = SpectrumSet::reference().unwrap();
        let mut config = ScenarioConfig::new("deg", Regime::Degradation, &[2.0, 1.3], "oiid-cu", "nifeox-ph14");
        config.degradation = Range {
            start: 0.0,
            stop: 20.0,
            step: 10.0,
        };
        let inputs = Inputs::resolve(&config, &spectra).unwrap();
        let design = sparse::run(&inputs, None).unwrap();
        let points = run(&inputs, None).unwrap();
        assert_eq!(points.len(), 3);

        let fresh = points[0].outcome.as_ref().unwrap();
        // At full activity the kinetic solution is the sparse design
        assert_relative_eq!(
            fresh.operating_point.current_density,
            design.operating_point.current_density,
            max_relative = 1e-2
        );
        let currents: Vec<f64> = points
            .iter()
            .map(|p| p.outcome.as_ref().unwrap().operating_point.current_density)
            .collect();
        assert!(currents.windows(2).all(|w| w[1] <= w[0]), "{currents:?}");
        assert_eq!(points[2].outcome.as_ref().unwrap().degradation, Some(20.0));
    }
}

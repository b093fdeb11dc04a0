//! Sparse catalyst coverage.
//!
//! The cathode covers only part of the PV area, so it carries the whole PV
//! current at its peak-selectivity current density j*. The electrolyzer
//! demand therefore uses η* at every current, and the cathode area follows
//! from the operating point: A_s / A_cat = j* / j_s.

use super::{solve_operating_point, Inputs, ScenarioResult};
use crate::catalyst::cell::CathodeOperation;
use crate::error::Result;
use crate::metrics::OperatingPoint;
use crate::stats::Stats;

pub fn run(inputs: &Inputs, mut stats: Option<&mut Stats>) -> Result<ScenarioResult> {
    let _span = tracing::info_span!("sparse_coverage", scenario = %inputs.config.name).entered();

    let peak = inputs.reduction.peak_selectivity();
    let pv = inputs.pv_curve(1.0, stats.as_deref_mut())?;
    let crossing = solve_operating_point(
        &pv,
        &inputs.cell(),
        CathodeOperation::PeakSelectivity,
        &inputs.config.grid,
        &inputs.label(),
        stats,
    )?;

    let j_s = crossing.x;
    let area_ratio = peak.current_density / j_s;
    let op = OperatingPoint {
        current_density: j_s,
        voltage: crossing.y,
        catalyst_current_density: peak.current_density,
    };
    let mut result = inputs.finish(op, inputs.spectrum.incident_power())?;
    result.area_ratio = Some(area_ratio);

    tracing::info!(j_s, voltage = crossing.y, area_ratio, "sparse coverage operating point");
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalyst::{Catalyst, CatalystCurvePoint};
    use crate::config::{CatalystSpec, Regime, ScenarioConfig};
    use crate::error::PecError;
    use crate::spectrum::SpectrumSet;
    use approx::assert_relative_eq;

    fn reduction() -> Catalyst {
        let points = [(0.0, 0.05, 0.2), (10.0, 0.1, 0.6), (20.0, 0.15, 0.8), (30.0, 0.2, 0.5)]
            .into_iter()
            .map(|(j, eta, fe)| CatalystCurvePoint {
                current_density: j,
                overpotential: eta,
                faradaic_efficiency: fe,
            })
            .collect();
        Catalyst::tabulated("table", 0.0, points).unwrap()
    }

    fn oxidation() -> Catalyst {
        Catalyst::tafel("anode", 0.9, 10.0, 0.05, 0.03).unwrap()
    }

    fn config(bandgaps: &[f64]) -> ScenarioConfig {
        ScenarioConfig::new(
            "single",
            Regime::SparseCoverage,
            bandgaps,
            CatalystSpec::Inline(reduction()),
            CatalystSpec::Inline(oxidation()),
        )
    }

    #[test]
    fn test_single_junction_operating_point() {
        let spectra = SpectrumSet::reference().unwrap();
        let config = config(&[1.6]);
        let inputs = Inputs::resolve(&config, &spectra).unwrap();
        let result = run(&inputs, None).unwrap();

        let j_s = result.operating_point.current_density;
        assert!(j_s > 0.0);
        let ratio = result.area_ratio.unwrap();
        assert!(ratio > 0.0);
        assert_relative_eq!(ratio * j_s, 20.0, max_relative = 1e-12);
        assert_eq!(result.operating_point.catalyst_current_density, 20.0);
        assert_eq!(result.faradaic_efficiency, 0.8);
        assert!(result.solar_to_fuel_efficiency > 0.0);
    }

    #[test]
    fn test_operating_voltage_matches_demand() {
        let spectra = SpectrumSet::reference().unwrap();
        let config = config(&[1.6]);
        let inputs = Inputs::resolve(&config, &spectra).unwrap();
        let result = run(&inputs, None).unwrap();
        let op = result.operating_point;
        let demand = inputs
            .cell()
            .required_voltage(op.current_density, CathodeOperation::PeakSelectivity)
            .unwrap();
        assert_relative_eq!(op.voltage, demand, max_relative = 1e-3);
    }

    #[test]
    fn test_stack_too_weak_has_no_solution() {
        let spectra = SpectrumSet::reference().unwrap();
        // 0.9 eV cannot reach the ~1.2 V the electrolyzer needs
        let config = config(&[0.9]);
        let inputs = Inputs::resolve(&config, &spectra).unwrap();
        assert!(matches!(run(&inputs, None), Err(PecError::NoSolution(_))));
    }
}

//! Integration tests for the scenario solver: config -> spectrum -> operating point.

use approx::assert_relative_eq;
use pecsolve::catalyst::cell::CathodeOperation;
use pecsolve::catalyst::{Catalyst, CatalystCurvePoint};
use pecsolve::config::{BatchConfig, CatalystSpec, Regime, ScenarioConfig};
use pecsolve::error::PecError;
use pecsolve::presets;
use pecsolve::scenario::{self, Inputs, ScenarioOutcome, ScenarioResult};
use pecsolve::spectrum::SpectrumSet;
use pecsolve::stats::Stats;

fn spectra() -> SpectrumSet {
    SpectrumSet::reference().expect("reference spectrum failed")
}

fn single(outcome: ScenarioOutcome) -> ScenarioResult {
    match outcome {
        ScenarioOutcome::Single(r) => r,
        ScenarioOutcome::Sweep(_) => panic!("expected a single operating point"),
    }
}

fn four_point_cathode() -> Catalyst {
    let points = [(0.0, 0.05, 0.2), (10.0, 0.1, 0.6), (20.0, 0.15, 0.8), (30.0, 0.2, 0.5)]
        .into_iter()
        .map(|(j, eta, fe)| CatalystCurvePoint {
            current_density: j,
            overpotential: eta,
            faradaic_efficiency: fe,
        })
        .collect();
    Catalyst::tabulated("four-point", 0.0, points).expect("catalyst table failed")
}

// ── Single-junction Sparse Coverage ─────────────────────────────────

#[test]
fn test_single_junction_sparse_end_to_end() {
    let spectra = spectra();
    let config = ScenarioConfig::new(
        "1.6 eV",
        Regime::SparseCoverage,
        &[1.6],
        CatalystSpec::Inline(four_point_cathode()),
        CatalystSpec::Inline(Catalyst::tafel("anode", 0.9, 10.0, 0.05, 0.03).expect("tafel failed")),
    );
    let result = single(scenario::run(&config, &spectra, None).expect("scenario failed"));

    let j_s = result.operating_point.current_density;
    assert!(j_s > 10.0 && j_s < 25.0, "j_s = {j_s}");
    assert_relative_eq!(result.area_ratio.expect("area ratio") * j_s, 20.0, max_relative = 1e-9);
    assert_eq!(result.faradaic_efficiency, 0.8);
    assert!(result.solar_to_fuel_efficiency > 0.0 && result.solar_to_fuel_efficiency < 1.0);
}

#[test]
fn test_operating_point_lies_on_both_curves() {
    let spectra = spectra();
    let config = presets::preset("A").expect("preset failed");
    let inputs = Inputs::resolve(&config, &spectra).expect("resolve failed");
    let result = scenario::run_single(&inputs, None).expect("scenario failed");
    let op = &result.operating_point;

    let pv = inputs.pv_curve(1.0, None).expect("pv curve failed");
    let pv_v = pv.voltage_at(op.current_density).expect("inside pv domain");
    let cell = inputs.cell();
    let demand_v = cell
        .required_voltage(op.current_density, CathodeOperation::PeakSelectivity)
        .expect("demand failed");
    assert_relative_eq!(op.voltage, pv_v, max_relative = 1e-3);
    assert_relative_eq!(op.voltage, demand_v, max_relative = 1e-3);
}

// ── Presets ─────────────────────────────────────────────────────────

#[test]
fn test_preset_a_sparse_coverage() {
    let spectra = spectra();
    let config = presets::preset("A").expect("preset failed");
    let mut stats = Stats::new();
    let result = single(scenario::run(&config, &spectra, Some(&mut stats)).expect("scenario failed"));

    // OIID-Cu peak selectivity
    assert_relative_eq!(result.operating_point.catalyst_current_density, 250.0, epsilon = 1e-9);
    assert_relative_eq!(result.faradaic_efficiency, 0.6118, epsilon = 1e-9);
    let ratio = result.area_ratio.expect("area ratio");
    assert!(ratio > 10.0 && ratio < 25.0, "ratio = {ratio}");
    assert!(stats.pv_curves >= 1);
    assert!(stats.intersections >= 1);
}

#[test]
fn test_preset_b_concentration_reaches_peak_current() {
    let spectra = spectra();
    let config = presets::preset("B").expect("preset failed");
    let result = single(scenario::run(&config, &spectra, None).expect("scenario failed"));

    let c = result.concentration_factor.expect("concentration");
    assert!(c > 1.0 && c <= config.concentration.max_concentration);
    assert!((result.operating_point.current_density - 250.0).abs() <= config.concentration.tolerance);
}

#[test]
fn test_preset_c_pv_ec_scaling() {
    let spectra = spectra();
    let config = presets::preset("C").expect("preset failed");
    let result = single(scenario::run(&config, &spectra, None).expect("scenario failed"));

    let j_s = result.operating_point.current_density;
    assert_relative_eq!(
        result.component_scaling.expect("scaling") * j_s,
        250.0,
        max_relative = 1e-9
    );
    let v_mpp = result.max_power_voltage.expect("mpp voltage");
    assert!(v_mpp > result.operating_point.voltage - 0.5);
    let pv_eff = result.pv_efficiency.expect("pv efficiency");
    assert!(pv_eff > result.solar_to_fuel_efficiency);
}

#[test]
fn test_preset_f_sweep_has_every_insolation() {
    let spectra = spectra();
    let config = presets::preset("F").expect("preset failed");
    let outcome = scenario::run(&config, &spectra, None).expect("scenario failed");
    let ScenarioOutcome::Sweep(points) = outcome else {
        panic!("expected a sweep");
    };
    assert_eq!(points.len(), 15);
    assert_relative_eq!(points[0].parameter, 0.1, epsilon = 1e-9);
    assert_relative_eq!(points[14].parameter, 1.5, epsilon = 1e-9);

    let currents: Vec<f64> = points
        .iter()
        .filter_map(|p| p.outcome.as_ref().ok())
        .map(|r| r.operating_point.current_density)
        .collect();
    assert!(!currents.is_empty());
    assert!(currents.windows(2).all(|w| w[1] > w[0]));
}

#[test]
fn test_sparse_design_sweep_peaks_at_one_sun() {
    let spectra = spectra();
    let config = presets::preset("f-sparse").expect("preset failed");
    let outcome = scenario::run(&config, &spectra, None).expect("scenario failed");
    let ScenarioOutcome::Sweep(points) = outcome else {
        panic!("expected a sweep");
    };
    assert_eq!(points.len(), 15);

    let one_sun = points
        .iter()
        .find(|p| (p.parameter - 1.0).abs() < 1e-9)
        .expect("one-sun point");
    let result = one_sun.outcome.as_ref().expect("one-sun point failed");
    // OIID-Cu peak: 250 mA/cm², FE 61.18 %
    assert_relative_eq!(result.faradaic_efficiency, 0.6118, epsilon = 1e-3);
    assert_relative_eq!(result.operating_point.catalyst_current_density, 250.0, max_relative = 1e-3);

    for p in &points {
        let r = p.outcome.as_ref().expect("clamped sweep point failed");
        assert!(r.faradaic_efficiency <= result.faradaic_efficiency + 1e-3);
    }
}

#[test]
fn test_preset_t_triple_junction() {
    let spectra = spectra();
    let config = presets::preset("T").expect("preset failed");
    let result = single(scenario::run(&config, &spectra, None).expect("scenario failed"));
    assert_eq!(result.bandgaps, vec![1.9, 1.4, 0.9]);
    assert!(result.operating_point.voltage > 2.0);
}

#[test]
fn test_fill_factor_lowers_output() {
    let spectra = spectra();
    let ideal = single(scenario::run(&presets::preset("A").expect("preset"), &spectra, None).expect("A failed"));
    let lossy = single(
        scenario::run(&presets::preset("ff-0.65").expect("preset"), &spectra, None).expect("ff-0.65 failed"),
    );
    assert!(lossy.operating_point.current_density <= ideal.operating_point.current_density + 1e-9);
}

// ── Batch ───────────────────────────────────────────────────────────

#[test]
fn test_batch_continues_past_failures() {
    let batch = BatchConfig::parse(
        r#"
[[scenario]]
name = "too weak"
regime = "sparse-coverage"
bandgaps = [0.9]
reduction_catalyst = "oiid-cu"
oxidation_catalyst = "nifeox-ph14"

[[scenario]]
name = "tandem"
regime = "sparse-coverage"
bandgaps = [2.0, 1.3]
reduction_catalyst = "oiid-cu"
oxidation_catalyst = "nifeox-ph14"

[[scenario]]
name = "unknown catalyst"
regime = "sparse-coverage"
bandgaps = [2.0, 1.3]
reduction_catalyst = "unobtainium"
oxidation_catalyst = "nifeox-ph14"
"#,
    )
    .expect("batch parse failed");

    let spectra = spectra();
    let mut stats = Stats::new();
    let entries = scenario::run_batch(&batch.scenario, &spectra, Some(&mut stats));
    assert_eq!(entries.len(), 3);
    assert!(matches!(entries[0].outcome, Err(PecError::NoSolution(_))));
    assert!(entries[1].outcome.is_ok());
    assert!(matches!(entries[2].outcome, Err(PecError::Config(_))));
    assert_eq!(stats.scenarios_failed, 2);
}

#[test]
fn test_sweep_regime_rejected_as_single_point() {
    let spectra = spectra();
    let config = presets::preset("F").expect("preset failed");
    let inputs = Inputs::resolve(&config, &spectra).expect("resolve failed");
    assert!(matches!(scenario::run_single(&inputs, None), Err(PecError::Config(_))));
}

//! Scenario solver: couples a PV stack to an electrolyzer under one of the
//! operating regimes and reports the resulting figures of merit.

pub mod concentrated;
pub mod degradation;
pub mod pv_ec;
pub mod scan;
pub mod sparse;
pub mod sweep;

use serde::Serialize;

use crate::catalyst::cell::{CathodeOperation, ElectrolysisCell};
use crate::catalyst::Catalyst;
use crate::config::{GridParams, Regime, ScenarioConfig};
use crate::curve::{self, Crossing};
use crate::error::{PecError, Result};
use crate::metrics::{self, OperatingPoint};
use crate::pv::{self, PvCurve};
use crate::spectrum::{Spectrum, SpectrumSet};
use crate::stats::Stats;

/// Outcome of one solved configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioResult {
    pub scenario: String,
    pub regime: Regime,
    /// eV, top junction first
    pub bandgaps: Vec<f64>,
    pub operating_point: OperatingPoint,
    pub faradaic_efficiency: f64,
    /// mol/s per cm² of PV
    pub production_rate: f64,
    pub solar_to_fuel_efficiency: f64,
    /// PV area over cathode area (sparse coverage, degradation).
    pub area_ratio: Option<f64>,
    /// Suns (concentrated).
    pub concentration_factor: Option<f64>,
    /// PV area over electrolyzer area (PV-EC).
    pub component_scaling: Option<f64>,
    /// Voltage at the PV maximum power point (PV-EC).
    pub max_power_voltage: Option<f64>,
    /// PV efficiency at the maximum power point (PV-EC).
    pub pv_efficiency: Option<f64>,
    /// Fraction of one sun (no concentration).
    pub insolation: Option<f64>,
    /// Lost catalyst area, % (degradation).
    pub degradation: Option<f64>,
}

impl ScenarioResult {
    /// Production rate in µmol/h per cm² of PV.
    pub fn production_rate_umol_per_hour(&self) -> f64 {
        self.production_rate * 1e6 * 3600.0
    }
}

/// One point of a parameter sweep. Failures are kept, not propagated.
#[derive(Debug)]
pub struct SweepPoint {
    pub parameter: f64,
    pub outcome: Result<ScenarioResult>,
}

#[derive(Debug)]
pub enum ScenarioOutcome {
    Single(ScenarioResult),
    Sweep(Vec<SweepPoint>),
}

/// Resolved, validated inputs of a scenario.
#[derive(Debug, Clone)]
pub struct Inputs<'a> {
    pub config: &'a ScenarioConfig,
    /// Sorted high to low.
    pub bandgaps: Vec<f64>,
    /// One-sun spectrum for the regime.
    pub spectrum: &'a Spectrum,
    pub reduction: Catalyst,
    pub oxidation: Catalyst,
}

impl<'a> Inputs<'a> {
    pub fn resolve(config: &'a ScenarioConfig, spectra: &'a SpectrumSet) -> Result<Self> {
        config.validate()?;
        let mut bandgaps = config.bandgaps.clone();
        bandgaps.sort_by(|a, b| b.total_cmp(a));
        Ok(Self {
            config,
            bandgaps,
            spectrum: spectra.get(config.spectrum_kind()),
            reduction: config.reduction_catalyst.resolve()?,
            oxidation: config.oxidation_catalyst.resolve()?,
        })
    }

    /// Same scenario with a different stack.
    pub fn with_bandgaps(&self, bandgaps: &[f64]) -> Self {
        let mut bandgaps = bandgaps.to_vec();
        bandgaps.sort_by(|a, b| b.total_cmp(a));
        Self { bandgaps, ..self.clone() }
    }

    /// Electrolyzer with the configured resistance and boundary policy.
    pub fn cell(&self) -> ElectrolysisCell<'_> {
        ElectrolysisCell::new(&self.reduction, &self.oxidation, self.config.fluid_resistance())
            .with_boundary(self.config.boundary_policy)
    }

    pub fn pv_curve(&self, concentration: f64, stats: Option<&mut Stats>) -> Result<PvCurve> {
        if let Some(s) = stats {
            s.pv_curves += 1;
        }
        pv::iv_curve_sampled(
            self.spectrum,
            &self.bandgaps,
            self.config.fill_factor,
            concentration,
            self.config.grid.samples,
        )
    }

    /// Human-readable identification for error messages.
    pub fn label(&self) -> String {
        let gaps: Vec<String> = self.bandgaps.iter().map(|g| format!("{g:.2}")).collect();
        format!("{} ({}, bandgaps [{}] eV)", self.config.name, self.config.regime, gaps.join(", "))
    }

    /// Derive the figures of merit and assemble a result.
    fn finish(&self, op: OperatingPoint, incident_power: f64) -> Result<ScenarioResult> {
        let m = metrics::compute(
            &op,
            &self.reduction,
            self.config.product,
            incident_power,
            self.config.boundary_policy,
        )?;
        Ok(ScenarioResult {
            scenario: self.config.name.clone(),
            regime: self.config.regime,
            bandgaps: self.bandgaps.clone(),
            operating_point: op,
            faradaic_efficiency: m.faradaic_efficiency,
            production_rate: m.production_rate,
            solar_to_fuel_efficiency: m.solar_to_fuel_efficiency,
            area_ratio: None,
            concentration_factor: None,
            component_scaling: None,
            max_power_voltage: None,
            pv_efficiency: None,
            insolation: None,
            degradation: None,
        })
    }
}

/// Run a scenario.
pub fn run(config: &ScenarioConfig, spectra: &SpectrumSet, stats: Option<&mut Stats>) -> Result<ScenarioOutcome> {
    let inputs = Inputs::resolve(config, spectra)?;
    match config.regime {
        Regime::NoConcentration => sweep::run(&inputs, stats).map(ScenarioOutcome::Sweep),
        Regime::Degradation => degradation::run(&inputs, stats).map(ScenarioOutcome::Sweep),
        _ => run_single(&inputs, stats).map(ScenarioOutcome::Single),
    }
}

/// Run one of the regimes that yields a single operating point.
pub fn run_single(inputs: &Inputs, stats: Option<&mut Stats>) -> Result<ScenarioResult> {
    match inputs.config.regime {
        Regime::SparseCoverage => sparse::run(inputs, stats),
        Regime::Concentrated => concentrated::run(inputs, stats),
        Regime::PvEc => pv_ec::run(inputs, stats),
        regime @ (Regime::NoConcentration | Regime::Degradation) => Err(PecError::Config(format!(
            "{}: regime {regime} yields a sweep, not a single operating point",
            inputs.config.name
        ))),
    }
}

/// Status of one scenario in a batch.
#[derive(Debug)]
pub struct BatchEntry {
    pub name: String,
    pub outcome: Result<ScenarioOutcome>,
}

/// Run every scenario, recording failures instead of stopping.
pub fn run_batch(configs: &[ScenarioConfig], spectra: &SpectrumSet, mut stats: Option<&mut Stats>) -> Vec<BatchEntry> {
    configs
        .iter()
        .map(|config| {
            let outcome = run(config, spectra, stats.as_deref_mut());
            if let Err(ref err) = outcome {
                tracing::warn!(scenario = %config.name, %err, "scenario failed");
                if let Some(ref mut s) = stats {
                    s.scenarios_failed += 1;
                }
            }
            BatchEntry {
                name: config.name.clone(),
                outcome,
            }
        })
        .collect()
}

/// Intersect a PV curve with the electrolyzer demand and pick the
/// lowest-current crossing.
///
/// The demand is sampled from the grid's current floor to the stack
/// short-circuit current. No crossing is [`PecError::NoSolution`], unless
/// the demand was cut short by the cathode table, in which case the
/// out-of-range error is returned.
pub(crate) fn solve_operating_point(
    pv: &PvCurve,
    cell: &ElectrolysisCell,
    operation: CathodeOperation,
    grid: &GridParams,
    label: &str,
    mut stats: Option<&mut Stats>,
) -> Result<Crossing> {
    let j_max = pv.short_circuit_current();
    if j_max <= grid.current_floor {
        return Err(PecError::NoSolution(format!(
            "{label}: stack current {j_max:.3} mA/cm² below the grid floor"
        )));
    }
    let currents = curve::linear_grid(grid.current_floor, j_max, grid.samples + 1);
    let demand = cell.demand_curve(&currents, operation)?;
    if let Some(ref mut s) = stats {
        s.demand_curves += 1;
        s.intersections += 1;
    }

    match curve::first_crossing(pv.curve(), &demand.curve) {
        Some(crossing) => {
            tracing::debug!(j = crossing.x, v = crossing.y, "operating point");
            Ok(crossing)
        }
        None => Err(demand.truncation.unwrap_or_else(|| {
            PecError::NoSolution(format!(
                "{label}: PV curve (Voc {:.3} V) never meets the electrolyzer demand",
                pv.open_circuit_voltage()
            ))
        })),
    }
}

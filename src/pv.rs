//! Detailed-balance photovoltaic model.
//!
//! Each junction is a single diode with a radiative-limit saturation
//! current and an optional series resistance. Junctions are stacked in
//! series, highest bandgap on top, and the stack current is limited by the
//! weakest junction.

use crate::constants::{
    thermal_voltage, CELL_TEMPERATURE, A_PER_M2_TO_MA_PER_CM2, ELEMENTARY_CHARGE,
    REDUCED_PLANCK, SPEED_OF_LIGHT,
};
use crate::curve::{self, Crossing, Curve};
use crate::error::{PecError, Result};
use crate::spectrum::Spectrum;

/// Number of current samples on a stack I-V curve.
pub const DEFAULT_CURVE_SAMPLES: usize = 500;
/// Largest supported stack.
pub const MAX_JUNCTIONS: usize = 3;

const FILL_FACTOR_TOLERANCE: f64 = 1e-4;
const FILL_FACTOR_MAX_ITERATIONS: usize = 200;
const FILL_FACTOR_SAMPLES: usize = 500;
const SHORT_CIRCUIT_ITERATIONS: usize = 100;
/// Series resistance search bracket (Ω·cm²).
const SERIES_RESISTANCE_RANGE: (f64, f64) = (1e-6, 1e3);

/// Refractive indices either side of the top junction (air, silicon-like).
const TOP_CELL_INDICES: (f64, f64) = (1.0, 3.42);
/// A buried junction emits into the cell above and not out of the back.
const BURIED_CELL_INDICES: (f64, f64) = (3.3, 0.0);

/// Radiative-limit saturation current density (mA/cm²).
///
/// Henry (1980): J0 = q (n1² + n2²) (q Eg)² kT / (4π² ħ³ c²) · exp(−Eg/V_T)
pub fn radiative_saturation_current(bandgap: f64, top: bool, temperature: f64) -> f64 {
    let (n1, n2) = if top { TOP_CELL_INDICES } else { BURIED_CELL_INDICES };
    let vt = thermal_voltage(temperature);
    let eg_joule = bandgap * ELEMENTARY_CHARGE;
    let prefactor = ELEMENTARY_CHARGE * (n1 * n1 + n2 * n2) * eg_joule * eg_joule * vt * ELEMENTARY_CHARGE
        / (4.0 * std::f64::consts::PI.powi(2) * REDUCED_PLANCK.powi(3) * SPEED_OF_LIGHT.powi(2));
    prefactor * (-bandgap / vt).exp() * A_PER_M2_TO_MA_PER_CM2
}

/// One junction of a stack.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubCell {
    /// eV
    pub bandgap: f64,
    /// mA/cm²
    pub photocurrent: f64,
    /// mA/cm²
    pub saturation_current: f64,
    /// Ω·cm²
    pub series_resistance: f64,
    /// K
    pub temperature: f64,
}

impl SubCell {
    /// Ideal junction (no series resistance) in the radiative limit.
    pub fn radiative(bandgap: f64, photocurrent: f64, top: bool) -> Self {
        Self {
            bandgap,
            photocurrent,
            saturation_current: radiative_saturation_current(bandgap, top, CELL_TEMPERATURE),
            series_resistance: 0.0,
            temperature: CELL_TEMPERATURE,
        }
    }

    pub fn with_series_resistance(self, series_resistance: f64) -> Self {
        Self { series_resistance, ..self }
    }

    /// Terminal voltage at current density `j` (mA/cm²).
    ///
    /// V(j) = V_T ln((Jph − j + J0) / J0) − j·Rs, with Rs in Ω·cm².
    /// Returns −∞ past the diode's reverse limit.
    pub fn voltage_at(&self, j: f64) -> f64 {
        let arg = (self.photocurrent - j + self.saturation_current) / self.saturation_current;
        if arg <= 0.0 {
            return f64::NEG_INFINITY;
        }
        thermal_voltage(self.temperature) * arg.ln() - j * 1e-3 * self.series_resistance
    }

    pub fn open_circuit_voltage(&self) -> f64 {
        self.voltage_at(0.0)
    }

    /// Current density where the terminal voltage reaches zero.
    pub fn short_circuit_current(&self) -> f64 {
        if self.series_resistance == 0.0 {
            return self.photocurrent;
        }
        let (mut lo, mut hi) = (0.0, self.photocurrent);
        for _ in 0..SHORT_CIRCUIT_ITERATIONS {
            let mid = 0.5 * (lo + hi);
            if self.voltage_at(mid) > 0.0 {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        0.5 * (lo + hi)
    }

    pub fn fill_factor(&self) -> f64 {
        let jsc = self.short_circuit_current();
        let voc = self.open_circuit_voltage();
        if jsc <= 0.0 || voc <= 0.0 {
            return 0.0;
        }
        let p_max = curve::linear_grid(0.0, jsc, FILL_FACTOR_SAMPLES + 1)
            .into_iter()
            .map(|j| j * self.voltage_at(j))
            .fold(0.0, f64::max);
        p_max / (jsc * voc)
    }

    /// Add series resistance until the fill factor drops to `target`.
    ///
    /// A junction whose ideal fill factor is already at or below the target
    /// is returned unchanged.
    pub fn match_fill_factor(self, target: f64) -> Result<Self> {
        let ideal = self.fill_factor();
        if ideal <= target {
            tracing::warn!(
                bandgap = self.bandgap,
                ideal,
                target,
                "ideal fill factor below target, keeping ideal junction"
            );
            return Ok(self);
        }

        let (lo_rs, hi_rs) = SERIES_RESISTANCE_RANGE;
        if self.with_series_resistance(hi_rs).fill_factor() > target {
            return Err(PecError::Convergence {
                iterations: 0,
                message: format!(
                    "fill factor {target} unreachable for {} eV junction within Rs <= {hi_rs} Ω·cm²",
                    self.bandgap
                ),
            });
        }

        // Fill factor falls monotonically with Rs; bisect in log space.
        let (mut lo, mut hi) = (lo_rs.ln(), hi_rs.ln());
        for iteration in 0..FILL_FACTOR_MAX_ITERATIONS {
            let mid = 0.5 * (lo + hi);
            let cell = self.with_series_resistance(mid.exp());
            let ff = cell.fill_factor();
            if (ff - target).abs() < FILL_FACTOR_TOLERANCE {
                tracing::debug!(
                    bandgap = self.bandgap,
                    series_resistance = cell.series_resistance,
                    iterations = iteration + 1,
                    "matched fill factor"
                );
                return Ok(cell);
            }
            if ff > target {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        Err(PecError::Convergence {
            iterations: FILL_FACTOR_MAX_ITERATIONS,
            message: format!("fill factor search for {} eV junction did not settle", self.bandgap),
        })
    }
}

/// Series-connected stack of junctions, top (highest bandgap) first.
#[derive(Debug, Clone, PartialEq)]
pub struct PvStack {
    cells: Vec<SubCell>,
}

impl PvStack {
    /// Build a current-matched stack under `spectrum`.
    ///
    /// The top junction absorbs every photon above its gap; each lower
    /// junction absorbs the band between its gap and the gap above it.
    pub fn build(spectrum: &Spectrum, bandgaps: &[f64], fill_factor: f64) -> Result<Self> {
        validate_bandgaps(bandgaps)?;
        validate_fill_factor(fill_factor)?;

        let mut gaps = bandgaps.to_vec();
        gaps.sort_by(|a, b| b.total_cmp(a));

        let mut cells = Vec::with_capacity(gaps.len());
        for (i, &gap) in gaps.iter().enumerate() {
            let upper = if i == 0 { None } else { Some(gaps[i - 1]) };
            let photocurrent = spectrum.band_current_density(gap, upper)?;
            let cell = SubCell::radiative(gap, photocurrent, i == 0).match_fill_factor(fill_factor)?;
            cells.push(cell);
        }
        Ok(Self { cells })
    }

    pub fn cells(&self) -> &[SubCell] {
        &self.cells
    }

    /// Short-circuit current of the stack: the smallest junction Jsc.
    pub fn matched_current(&self) -> f64 {
        self.cells
            .iter()
            .map(SubCell::short_circuit_current)
            .fold(f64::INFINITY, f64::min)
    }

    pub fn voltage_at(&self, j: f64) -> f64 {
        self.cells.iter().map(|c| c.voltage_at(j)).sum()
    }

    /// Sample the stack on `samples + 1` evenly spaced currents from 0 to
    /// the matched short-circuit current.
    pub fn iv_curve(&self, samples: usize, concentration: f64) -> Result<PvCurve> {
        let j_match = self.matched_current();
        if !(j_match > 0.0) {
            return Err(PecError::Computation(format!(
                "stack short-circuit current {j_match} mA/cm² is not positive"
            )));
        }
        let grid = curve::linear_grid(0.0, j_match, samples.max(1) + 1);
        let curve = Curve::from_fn(grid, |j| Ok(self.voltage_at(j)))?;
        Ok(PvCurve { curve, concentration })
    }
}

/// Sampled J-V characteristic of a stack: x is current density (mA/cm²),
/// y is voltage (V). Voltage is non-increasing along the curve.
#[derive(Debug, Clone, PartialEq)]
pub struct PvCurve {
    curve: Curve,
    concentration: f64,
}

impl PvCurve {
    pub fn curve(&self) -> &Curve {
        &self.curve
    }

    pub fn concentration(&self) -> f64 {
        self.concentration
    }

    pub fn short_circuit_current(&self) -> f64 {
        self.curve.domain().1
    }

    pub fn open_circuit_voltage(&self) -> f64 {
        self.curve.ys()[0]
    }

    pub fn voltage_at(&self, j: f64) -> Option<f64> {
        self.curve.y_at(j)
    }

    /// Current density at which the stack delivers `voltage`, if it can.
    pub fn current_at_voltage(&self, voltage: f64) -> Option<f64> {
        let (lo, hi) = self.curve.domain();
        let line = Curve::constant(lo, hi, voltage).ok()?;
        curve::first_crossing(&self.curve, &line).map(|Crossing { x, .. }| x)
    }

    /// (current density, voltage) at maximum power.
    pub fn max_power_point(&self) -> (f64, f64) {
        self.curve
            .points()
            .max_by(|a, b| (a.0 * a.1).total_cmp(&(b.0 * b.1)))
            .unwrap_or((0.0, 0.0))
    }

    pub fn fill_factor(&self) -> f64 {
        let (j, v) = self.max_power_point();
        let denom = self.short_circuit_current() * self.open_circuit_voltage();
        if denom > 0.0 {
            j * v / denom
        } else {
            0.0
        }
    }

    /// Power conversion efficiency at the maximum power point, for an
    /// incident power in mW/cm².
    pub fn efficiency(&self, incident_power: f64) -> f64 {
        let (j, v) = self.max_power_point();
        j * v / incident_power
    }
}

/// Build the I-V curve of a stack under `spectrum` scaled by
/// `concentration`.
pub fn iv_curve(spectrum: &Spectrum, bandgaps: &[f64], fill_factor: f64, concentration: f64) -> Result<PvCurve> {
    iv_curve_sampled(spectrum, bandgaps, fill_factor, concentration, DEFAULT_CURVE_SAMPLES)
}

/// [`iv_curve`] with an explicit number of current intervals.
pub fn iv_curve_sampled(
    spectrum: &Spectrum,
    bandgaps: &[f64],
    fill_factor: f64,
    concentration: f64,
    samples: usize,
) -> Result<PvCurve> {
    let illuminated;
    let spectrum = if concentration == 1.0 {
        spectrum
    } else {
        illuminated = spectrum.concentrated(concentration)?;
        &illuminated
    };
    PvStack::build(spectrum, bandgaps, fill_factor)?.iv_curve(samples, concentration)
}

fn validate_bandgaps(bandgaps: &[f64]) -> Result<()> {
    if bandgaps.is_empty() || bandgaps.len() > MAX_JUNCTIONS {
        return Err(PecError::Config(format!(
            "stack needs 1 to {MAX_JUNCTIONS} bandgaps, got {}",
            bandgaps.len()
        )));
    }
    for (i, a) in bandgaps.iter().enumerate() {
        if bandgaps[i + 1..].iter().any(|b| a == b) {
            return Err(PecError::Config(format!("duplicate bandgap {a} eV in stack")));
        }
    }
    Ok(())
}

fn validate_fill_factor(fill_factor: f64) -> Result<()> {
    if !(fill_factor > 0.0 && fill_factor <= 1.0) {
        return Err(PecError::Config(format!(
            "fill factor must lie in (0, 1], got {fill_factor}"
        )));
    }
    Ok(())
}

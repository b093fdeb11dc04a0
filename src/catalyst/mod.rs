//! Electrocatalyst kinetics.
//!
//! A catalyst is either a table of literature measurements (current
//! density, overpotential, Faradaic efficiency) interpolated piecewise
//! linearly, or a Tafel law. Overpotentials are positive and measured from
//! the equilibrium potential of the reaction.

pub mod cell;
pub mod library;

use serde::{Deserialize, Serialize};

use crate::curve::interpolate;
use crate::error::{PecError, Result};

/// What to do with a lookup outside the tabulated range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryPolicy {
    /// Reject with [`PecError::OutOfRange`].
    #[default]
    Strict,
    /// Use the nearest tabulated endpoint and log a warning.
    Clamp,
}

/// One tabulated measurement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CatalystCurvePoint {
    /// mA/cm²
    pub current_density: f64,
    /// V, positive
    pub overpotential: f64,
    /// Fraction in [0, 1]
    pub faradaic_efficiency: f64,
}

/// Validated measurement table, sorted by current density.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<CatalystCurvePoint>", into = "Vec<CatalystCurvePoint>")]
pub struct CatalystTable {
    current_density: Vec<f64>,
    overpotential: Vec<f64>,
    faradaic_efficiency: Vec<f64>,
}

impl TryFrom<Vec<CatalystCurvePoint>> for CatalystTable {
    type Error = PecError;

    fn try_from(mut points: Vec<CatalystCurvePoint>) -> Result<Self> {
        if points.len() < 2 {
            return Err(PecError::Data(format!(
                "catalyst table needs at least two points, got {}",
                points.len()
            )));
        }
        for p in &points {
            if !(p.current_density.is_finite() && p.overpotential.is_finite() && p.faradaic_efficiency.is_finite()) {
                return Err(PecError::Data(format!("non-finite catalyst point {p:?}")));
            }
            if !(0.0..=1.0).contains(&p.faradaic_efficiency) {
                return Err(PecError::Data(format!(
                    "Faradaic efficiency {} outside [0, 1]",
                    p.faradaic_efficiency
                )));
            }
        }
        points.sort_by(|a, b| a.current_density.total_cmp(&b.current_density));
        for w in points.windows(2) {
            if w[1].current_density <= w[0].current_density {
                return Err(PecError::Data(format!(
                    "duplicate current density {} mA/cm² in catalyst table",
                    w[0].current_density
                )));
            }
            if w[1].overpotential <= w[0].overpotential {
                return Err(PecError::Data(format!(
                    "overpotential must rise with current density ({} V at {} mA/cm², {} V at {} mA/cm²)",
                    w[0].overpotential, w[0].current_density, w[1].overpotential, w[1].current_density
                )));
            }
        }
        Ok(Self {
            current_density: points.iter().map(|p| p.current_density).collect(),
            overpotential: points.iter().map(|p| p.overpotential).collect(),
            faradaic_efficiency: points.iter().map(|p| p.faradaic_efficiency).collect(),
        })
    }
}

impl From<CatalystTable> for Vec<CatalystCurvePoint> {
    fn from(table: CatalystTable) -> Self {
        table.points().collect()
    }
}

impl CatalystTable {
    pub fn points(&self) -> impl Iterator<Item = CatalystCurvePoint> + '_ {
        (0..self.current_density.len()).map(|i| CatalystCurvePoint {
            current_density: self.current_density[i],
            overpotential: self.overpotential[i],
            faradaic_efficiency: self.faradaic_efficiency[i],
        })
    }

    pub fn current_range(&self) -> (f64, f64) {
        (self.current_density[0], self.current_density[self.current_density.len() - 1])
    }

    pub fn overpotential_range(&self) -> (f64, f64) {
        (self.overpotential[0], self.overpotential[self.overpotential.len() - 1])
    }
}

/// Kinetic model of one electrode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Kinetics {
    Tabulated { points: CatalystTable },
    /// η = b·log10(j / i0), with i0 = j_ref / 10^(η_ref / b).
    Tafel {
        /// mA/cm²
        reference_current_density: f64,
        /// V at the reference current density
        reference_overpotential: f64,
        /// V/decade
        tafel_slope: f64,
        #[serde(default = "unit_efficiency")]
        faradaic_efficiency: f64,
    },
}

fn unit_efficiency() -> f64 {
    1.0
}

/// Peak-selectivity operating window of a catalyst.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Selectivity {
    /// j* (mA/cm²)
    pub current_density: f64,
    /// η* (V)
    pub overpotential: f64,
    /// FE*
    pub faradaic_efficiency: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalyst {
    pub name: String,
    /// Equilibrium potential of the half-reaction vs RHE (V).
    pub equilibrium_potential: f64,
    pub kinetics: Kinetics,
}

impl Catalyst {
    pub fn tabulated(name: &str, equilibrium_potential: f64, points: Vec<CatalystCurvePoint>) -> Result<Self> {
        Ok(Self {
            name: name.to_string(),
            equilibrium_potential,
            kinetics: Kinetics::Tabulated { points: CatalystTable::try_from(points)? },
        })
    }

    pub fn tafel(
        name: &str,
        equilibrium_potential: f64,
        reference_current_density: f64,
        reference_overpotential: f64,
        tafel_slope: f64,
    ) -> Result<Self> {
        let catalyst = Self {
            name: name.to_string(),
            equilibrium_potential,
            kinetics: Kinetics::Tafel {
                reference_current_density,
                reference_overpotential,
                tafel_slope,
                faradaic_efficiency: 1.0,
            },
        };
        catalyst.validate()?;
        Ok(catalyst)
    }

    /// Check parameters that deserialization alone cannot.
    pub fn validate(&self) -> Result<()> {
        if !self.equilibrium_potential.is_finite() {
            return Err(PecError::Data(format!("{}: equilibrium potential must be finite", self.name)));
        }
        if let Kinetics::Tafel {
            reference_current_density,
            reference_overpotential,
            tafel_slope,
            faradaic_efficiency,
        } = self.kinetics
        {
            if !(reference_current_density > 0.0 && tafel_slope > 0.0 && reference_overpotential.is_finite()) {
                return Err(PecError::Data(format!(
                    "{}: Tafel law needs positive reference current and slope",
                    self.name
                )));
            }
            if !(0.0..=1.0).contains(&faradaic_efficiency) {
                return Err(PecError::Data(format!(
                    "{}: Faradaic efficiency {faradaic_efficiency} outside [0, 1]",
                    self.name
                )));
            }
        }
        Ok(())
    }

    /// Overpotential (V) needed to drive `j` mA/cm².
    pub fn overpotential_at(&self, j: f64) -> Result<f64> {
        self.overpotential_with(j, BoundaryPolicy::Strict)
    }

    pub fn overpotential_with(&self, j: f64, policy: BoundaryPolicy) -> Result<f64> {
        match &self.kinetics {
            Kinetics::Tabulated { points } => {
                let j = self.bounded("current density", j, points.current_range(), policy)?;
                lookup(&points.current_density, &points.overpotential, j)
            }
            Kinetics::Tafel {
                reference_current_density,
                reference_overpotential,
                tafel_slope,
                ..
            } => {
                if j <= 0.0 {
                    return Ok(0.0);
                }
                let i0 = exchange_current(*reference_current_density, *reference_overpotential, *tafel_slope);
                Ok((tafel_slope * (j / i0).log10()).max(0.0))
            }
        }
    }

    /// Faradaic efficiency (fraction) toward the target product at `j`.
    pub fn faradaic_efficiency_at(&self, j: f64) -> Result<f64> {
        self.faradaic_efficiency_with(j, BoundaryPolicy::Strict)
    }

    pub fn faradaic_efficiency_with(&self, j: f64, policy: BoundaryPolicy) -> Result<f64> {
        match &self.kinetics {
            Kinetics::Tabulated { points } => {
                let j = self.bounded("current density", j, points.current_range(), policy)?;
                lookup(&points.current_density, &points.faradaic_efficiency, j)
            }
            Kinetics::Tafel { faradaic_efficiency, .. } => Ok(*faradaic_efficiency),
        }
    }

    /// Current density (mA/cm²) the catalyst passes at overpotential `eta`.
    pub fn current_density_at_overpotential(&self, eta: f64) -> Result<f64> {
        match &self.kinetics {
            Kinetics::Tabulated { points } => {
                let eta = self.bounded("overpotential", eta, points.overpotential_range(), BoundaryPolicy::Strict)?;
                lookup(&points.overpotential, &points.current_density, eta)
            }
            Kinetics::Tafel {
                reference_current_density,
                reference_overpotential,
                tafel_slope,
                ..
            } => {
                if !eta.is_finite() || eta < 0.0 {
                    return Err(PecError::Domain(format!(
                        "{}: Tafel overpotential must be non-negative, got {eta} V",
                        self.name
                    )));
                }
                let i0 = exchange_current(*reference_current_density, *reference_overpotential, *tafel_slope);
                Ok(i0 * 10f64.powf(eta / tafel_slope))
            }
        }
    }

    /// Operating point with the highest Faradaic efficiency. The first
    /// tabulated maximum wins; a Tafel catalyst reports its reference point.
    pub fn peak_selectivity(&self) -> Selectivity {
        match &self.kinetics {
            Kinetics::Tabulated { points } => {
                let mut best = 0;
                for (i, fe) in points.faradaic_efficiency.iter().enumerate() {
                    if *fe > points.faradaic_efficiency[best] {
                        best = i;
                    }
                }
                Selectivity {
                    current_density: points.current_density[best],
                    overpotential: points.overpotential[best],
                    faradaic_efficiency: points.faradaic_efficiency[best],
                }
            }
            Kinetics::Tafel {
                reference_current_density,
                reference_overpotential,
                faradaic_efficiency,
                ..
            } => Selectivity {
                current_density: *reference_current_density,
                overpotential: *reference_overpotential,
                faradaic_efficiency: *faradaic_efficiency,
            },
        }
    }

    /// Tabulated current range, if the catalyst has one.
    pub fn current_range(&self) -> Option<(f64, f64)> {
        match &self.kinetics {
            Kinetics::Tabulated { points } => Some(points.current_range()),
            Kinetics::Tafel { .. } => None,
        }
    }

    fn bounded(&self, axis: &'static str, value: f64, (min, max): (f64, f64), policy: BoundaryPolicy) -> Result<f64> {
        if value >= min && value <= max {
            return Ok(value);
        }
        match policy {
            BoundaryPolicy::Clamp if !value.is_nan() => {
                let clamped = value.clamp(min, max);
                tracing::warn!(catalyst = %self.name, axis, value, clamped, "clamping lookup to tabulated range");
                Ok(clamped)
            }
            _ => Err(PecError::OutOfRange { axis, value, min, max }),
        }
    }
}

fn exchange_current(reference_current_density: f64, reference_overpotential: f64, tafel_slope: f64) -> f64 {
    reference_current_density / 10f64.powf(reference_overpotential / tafel_slope)
}

fn lookup(xs: &[f64], ys: &[f64], x: f64) -> Result<f64> {
    interpolate(xs, ys, x).ok_or_else(|| PecError::Computation(format!("interpolation at {x} failed")))
}

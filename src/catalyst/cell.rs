//! Electrolysis cell voltage demand.
//!
//! The voltage a cell needs to pass current density j (per PV area) is
//!
//! ```text
//! V_req(j) = (E_eq,ox − E_eq,red) + η_ox(j / a) + η_red(j · r / a) + j · R_fluid
//! ```
//!
//! where `r` is the PV-to-cathode area ratio and `a` the fraction of
//! catalyst area still active.

use super::{BoundaryPolicy, Catalyst};
use crate::curve::Curve;
use crate::error::{PecError, Result};

/// How the cathode overpotential is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CathodeOperation {
    /// Cathode area is sized so the catalyst always sits at peak selectivity.
    PeakSelectivity,
    /// Cathode overpotential follows its kinetics at the delivered current.
    Kinetic,
}

/// Demand curve, possibly cut short where the cathode table ends.
#[derive(Debug)]
pub struct DemandCurve {
    pub curve: Curve,
    /// Why the curve does not span the whole requested grid.
    pub truncation: Option<PecError>,
}

#[derive(Debug, Clone, Copy)]
pub struct ElectrolysisCell<'a> {
    pub reduction: &'a Catalyst,
    pub oxidation: &'a Catalyst,
    /// Ω·cm²
    pub fluid_resistance: f64,
    /// PV area over cathode area.
    pub catalyst_area_ratio: f64,
    /// Fraction of catalyst area still active, in (0, 1].
    pub active_fraction: f64,
    pub boundary: BoundaryPolicy,
}

impl<'a> ElectrolysisCell<'a> {
    pub fn new(reduction: &'a Catalyst, oxidation: &'a Catalyst, fluid_resistance: f64) -> Self {
        Self {
            reduction,
            oxidation,
            fluid_resistance,
            catalyst_area_ratio: 1.0,
            active_fraction: 1.0,
            boundary: BoundaryPolicy::Strict,
        }
    }

    pub fn with_area_ratio(self, catalyst_area_ratio: f64) -> Self {
        Self { catalyst_area_ratio, ..self }
    }

    pub fn with_active_fraction(self, active_fraction: f64) -> Self {
        Self { active_fraction, ..self }
    }

    pub fn with_boundary(self, boundary: BoundaryPolicy) -> Self {
        Self { boundary, ..self }
    }

    /// Thermodynamic cell voltage (V).
    pub fn equilibrium_voltage(&self) -> f64 {
        self.oxidation.equilibrium_potential - self.reduction.equilibrium_potential
    }

    /// Current density on the cathode for PV current density `j`.
    pub fn reduction_current_density(&self, j: f64) -> f64 {
        j * self.catalyst_area_ratio / self.active_fraction
    }

    pub fn ohmic_loss(&self, j: f64) -> f64 {
        j * 1e-3 * self.fluid_resistance
    }

    pub fn required_voltage(&self, j: f64, operation: CathodeOperation) -> Result<f64> {
        let eta_ox = self
            .oxidation
            .overpotential_with(j / self.active_fraction, self.boundary)?;
        let eta_red = match operation {
            CathodeOperation::PeakSelectivity => self.reduction.peak_selectivity().overpotential,
            CathodeOperation::Kinetic => self
                .reduction
                .overpotential_with(self.reduction_current_density(j), self.boundary)?,
        };
        Ok(self.equilibrium_voltage() + eta_ox + eta_red + self.ohmic_loss(j))
    }

    /// Evaluate the demand on `grid`.
    ///
    /// Grid points where a strict table lookup falls outside the tabulated
    /// range are dropped; the first such error is kept as the truncation
    /// reason. Any other error aborts.
    pub fn demand_curve(&self, grid: &[f64], operation: CathodeOperation) -> Result<DemandCurve> {
        self.check()?;
        let mut xs = Vec::with_capacity(grid.len());
        let mut ys = Vec::with_capacity(grid.len());
        let mut truncation = None;
        for &j in grid {
            match self.required_voltage(j, operation) {
                Ok(v) => {
                    xs.push(j);
                    ys.push(v);
                }
                Err(e @ PecError::OutOfRange { .. }) => {
                    if truncation.is_none() {
                        truncation = Some(e);
                    }
                }
                Err(e) => return Err(e),
            }
        }
        if xs.len() < 2 {
            return Err(truncation.unwrap_or_else(|| {
                PecError::Computation("demand curve needs at least two grid points".into())
            }));
        }
        Ok(DemandCurve {
            curve: Curve::new(xs, ys)?,
            truncation,
        })
    }

    fn check(&self) -> Result<()> {
        if !(self.fluid_resistance >= 0.0 && self.fluid_resistance.is_finite()) {
            return Err(PecError::Config(format!(
                "fluid resistance must be non-negative, got {} Ω·cm²",
                self.fluid_resistance
            )));
        }
        if !(self.catalyst_area_ratio > 0.0 && self.catalyst_area_ratio.is_finite()) {
            return Err(PecError::Config(format!(
                "catalyst area ratio must be positive, got {}",
                self.catalyst_area_ratio
            )));
        }
        if !(self.active_fraction > 0.0 && self.active_fraction <= 1.0) {
            return Err(PecError::Config(format!(
                "active catalyst fraction must lie in (0, 1], got {}",
                self.active_fraction
            )));
        }
        Ok(())
    }
}

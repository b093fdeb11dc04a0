//! Figures of merit at an operating point.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::catalyst::{BoundaryPolicy, Catalyst};
use crate::constants::FARADAY;
use crate::error::{PecError, Result};

/// Target product of the cathode reaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Product {
    #[default]
    Ethylene,
    Hydrogen,
}

impl Product {
    /// Electrons transferred per molecule.
    pub fn electrons(self) -> f64 {
        match self {
            Product::Ethylene => 12.0,
            Product::Hydrogen => 2.0,
        }
    }

    /// Higher heating value (J/mol).
    pub fn heating_value(self) -> f64 {
        match self {
            Product::Ethylene => 1_411.2e3,
            Product::Hydrogen => 285.8e3,
        }
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Product::Ethylene => write!(f, "C2H4"),
            Product::Hydrogen => write!(f, "H2"),
        }
    }
}

/// Self-consistent PV / electrolyzer operating point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OperatingPoint {
    /// j_s, per PV area (mA/cm²)
    pub current_density: f64,
    /// V
    pub voltage: f64,
    /// Current density on the cathode (mA/cm²)
    pub catalyst_current_density: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Metrics {
    /// Fraction in [0, 1]
    pub faradaic_efficiency: f64,
    /// mol/s per cm² of PV
    pub production_rate: f64,
    /// Fraction of incident solar power stored as product HHV
    pub solar_to_fuel_efficiency: f64,
}

impl Metrics {
    /// Production rate in µmol/h per cm² of PV.
    pub fn production_rate_umol_per_hour(&self) -> f64 {
        self.production_rate * 1e6 * 3600.0
    }
}

/// Compute FE, production rate and solar-to-fuel efficiency.
///
/// `incident_power` is the concentrated solar power on the PV (mW/cm²).
pub fn compute(
    op: &OperatingPoint,
    reduction: &Catalyst,
    product: Product,
    incident_power: f64,
    policy: BoundaryPolicy,
) -> Result<Metrics> {
    if !(incident_power.is_finite() && incident_power > 0.0) {
        return Err(PecError::Computation(format!(
            "incident power must be positive, got {incident_power} mW/cm²"
        )));
    }
    let faradaic_efficiency = reduction.faradaic_efficiency_with(op.catalyst_current_density, policy)?;
    let production_rate = op.current_density * 1e-3 * faradaic_efficiency / (product.electrons() * FARADAY);
    let solar_to_fuel_efficiency = production_rate * product.heating_value() / (incident_power * 1e-3);

    for (name, value) in [
        ("current density", op.current_density),
        ("Faradaic efficiency", faradaic_efficiency),
        ("production rate", production_rate),
        ("solar-to-fuel efficiency", solar_to_fuel_efficiency),
    ] {
        if !value.is_finite() || value < 0.0 {
            return Err(PecError::Computation(format!("{name} is {value}")));
        }
    }

    Ok(Metrics {
        faradaic_efficiency,
        production_rate,
        solar_to_fuel_efficiency,
    })
}

//! Wired PV-electrolyzer (PV-EC) at a fixed operating voltage.
//!
//! The electrolyzer runs at its peak-selectivity point, which fixes the
//! voltage it needs. The PV stack is intersected with that constant voltage
//! and the component areas are scaled so the currents agree.

use super::{Inputs, ScenarioResult};
use crate::error::{PecError, Result};
use crate::metrics::OperatingPoint;
use crate::stats::Stats;

/// Operating voltage of the electrolyzer: configured, or derived as
/// E_cell + η_ox(j*) + η* + membrane loss.
///
/// η_ox comes from the configured anode at j*, not from a fixed reference
/// OER overpotential; set `pv_ec.target_voltage` to pin the voltage instead.
pub fn target_voltage(inputs: &Inputs) -> Result<f64> {
    let params = &inputs.config.pv_ec;
    if let Some(v) = params.target_voltage {
        if !(v > 0.0 && v.is_finite()) {
            return Err(PecError::Config(format!("PV-EC target voltage must be positive, got {v}")));
        }
        return Ok(v);
    }
    let peak = inputs.reduction.peak_selectivity();
    let cell = inputs.cell();
    let eta_ox = inputs
        .oxidation
        .overpotential_with(peak.current_density, inputs.config.boundary_policy)?;
    Ok(cell.equilibrium_voltage() + eta_ox + peak.overpotential + params.membrane_loss)
}

pub fn run(inputs: &Inputs, mut stats: Option<&mut Stats>) -> Result<ScenarioResult> {
    let _span = tracing::info_span!("pv_ec", scenario = %inputs.config.name).entered();

    let peak = inputs.reduction.peak_selectivity();
    let voltage = target_voltage(inputs)?;
    let pv = inputs.pv_curve(1.0, stats.as_deref_mut())?;
    if let Some(ref mut s) = stats {
        s.intersections += 1;
    }
    let j_s = pv.current_at_voltage(voltage).ok_or_else(|| {
        PecError::NoSolution(format!(
            "{}: stack Voc {:.3} V cannot reach {voltage:.3} V",
            inputs.label(),
            pv.open_circuit_voltage()
        ))
    })?;
    if j_s <= 0.0 {
        return Err(PecError::NoSolution(format!(
            "{}: stack delivers no current at {voltage:.3} V",
            inputs.label()
        )));
    }

    let incident_power = inputs.spectrum.incident_power();
    let (_, mpp_voltage) = pv.max_power_point();
    let op = OperatingPoint {
        current_density: j_s,
        voltage,
        catalyst_current_density: peak.current_density,
    };
    let mut result = inputs.finish(op, incident_power)?;
    result.component_scaling = Some(peak.current_density / j_s);
    result.max_power_voltage = Some(mpp_voltage);
    result.pv_efficiency = Some(pv.efficiency(incident_power));

    tracing::info!(j_s, voltage, mpp_voltage, "PV-EC operating point");
    Ok(result)
}

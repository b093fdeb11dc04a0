//! Results output formatting (CSV).

use std::io::Write;

use crate::error::Result;
use crate::scenario::scan::ScanResult;
use crate::scenario::{BatchEntry, ScenarioOutcome, ScenarioResult, SweepPoint};

const RESULT_HEADER: &str = "scenario,regime,bandgaps_ev,current_density_ma_cm2,voltage_v,\
catalyst_current_density_ma_cm2,faradaic_efficiency,production_umol_h_cm2,solar_to_fuel_efficiency,\
area_ratio,concentration_factor,component_scaling,max_power_voltage_v,pv_efficiency,insolation,degradation_pct";

/// Write single-point results as CSV, one row per result.
///
/// Format:
/// ```csv
/// scenario,regime,bandgaps_ev,current_density_ma_cm2,voltage_v,...
/// A: sparse coverage,sparse-coverage,2.00/1.30,14.69,2.27,...
/// ```
/// Fields that do not apply to a regime are left empty.
pub fn write_results_csv<W: Write>(results: &[ScenarioResult], writer: &mut W) -> Result<()> {
    writeln!(writer, "{RESULT_HEADER}")?;
    for r in results {
        write_result_row(r, writer)?;
    }
    Ok(())
}

fn write_result_row<W: Write>(r: &ScenarioResult, writer: &mut W) -> Result<()> {
    let gaps: Vec<String> = r.bandgaps.iter().map(|g| format!("{g:.3}")).collect();
    let op = &r.operating_point;
    writeln!(
        writer,
        "{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{}",
        field(&r.scenario),
        r.regime,
        gaps.join("/"),
        op.current_density,
        op.voltage,
        op.catalyst_current_density,
        r.faradaic_efficiency,
        r.production_rate_umol_per_hour(),
        r.solar_to_fuel_efficiency,
        optional(r.area_ratio),
        optional(r.concentration_factor),
        optional(r.component_scaling),
        optional(r.max_power_voltage),
        optional(r.pv_efficiency),
        optional(r.insolation),
        optional(r.degradation),
    )?;
    Ok(())
}

/// Write a parameter sweep as CSV. Failed points keep their parameter and
/// carry the error in the status column.
///
/// Format:
/// ```csv
/// insolation,current_density_ma_cm2,voltage_v,catalyst_current_density_ma_cm2,faradaic_efficiency,production_umol_h_cm2,solar_to_fuel_efficiency,status
/// 0.1,1.67,2.10,1.67,0.17,0.82,0.0031,ok
/// ```
pub fn write_sweep_csv<W: Write>(parameter: &str, points: &[SweepPoint], writer: &mut W) -> Result<()> {
    writeln!(
        writer,
        "{parameter},current_density_ma_cm2,voltage_v,catalyst_current_density_ma_cm2,\
faradaic_efficiency,production_umol_h_cm2,solar_to_fuel_efficiency,status"
    )?;
    for point in points {
        match &point.outcome {
            Ok(r) => {
                let op = &r.operating_point;
                writeln!(
                    writer,
                    "{},{},{},{},{},{},{},ok",
                    point.parameter,
                    op.current_density,
                    op.voltage,
                    op.catalyst_current_density,
                    r.faradaic_efficiency,
                    r.production_rate_umol_per_hour(),
                    r.solar_to_fuel_efficiency,
                )?;
            }
            Err(e) => writeln!(writer, "{},,,,,,,{}", point.parameter, field(&e.to_string()))?,
        }
    }
    Ok(())
}

/// Write every solved design of a scan, preferred first (see
/// [`ScanResult::ranked`]).
pub fn write_scan_csv<W: Write>(scan: &ScanResult, writer: &mut W) -> Result<()> {
    writeln!(writer, "{RESULT_HEADER}")?;
    for r in scan.ranked() {
        write_result_row(r, writer)?;
    }
    Ok(())
}

/// Write a scenario outcome in the matching format.
pub fn write_outcome_csv<W: Write>(outcome: &ScenarioOutcome, parameter: &str, writer: &mut W) -> Result<()> {
    match outcome {
        ScenarioOutcome::Single(result) => write_results_csv(std::slice::from_ref(result), writer),
        ScenarioOutcome::Sweep(points) => write_sweep_csv(parameter, points, writer),
    }
}

/// One status line per batch entry.
///
/// Format:
/// ```csv
/// scenario,status
/// A: sparse coverage,ok
/// B: solar concentration,"No solution: ..."
/// ```
pub fn write_batch_summary<W: Write>(entries: &[BatchEntry], writer: &mut W) -> Result<()> {
    writeln!(writer, "scenario,status")?;
    for entry in entries {
        let status = match &entry.outcome {
            Ok(_) => "ok".to_string(),
            Err(e) => e.to_string(),
        };
        writeln!(writer, "{},{}", field(&entry.name), field(&status))?;
    }
    Ok(())
}

fn optional(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Quote a text field when it contains separators or quotes.
fn field(s: &str) -> String {
    if s.contains([',', '"', '\n']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

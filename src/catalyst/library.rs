//! Built-in catalyst data from the literature.
//!
//! CO2RR tables are stored as reported: electrode potential vs RHE,
//! ethylene partial current density and Faradaic efficiency in percent.
//! They are converted to overpotential from the CO2-to-ethylene equilibrium
//! potential. OER and HER catalysts are Tafel parameter sets.

use super::{Catalyst, CatalystCurvePoint};
use crate::error::{PecError, Result};

/// CO2 to C2H4 equilibrium potential vs RHE (V).
pub const CO2RR_EQUILIBRIUM: f64 = 0.08;
/// Oxygen evolution equilibrium potential vs RHE (V).
pub const OER_EQUILIBRIUM: f64 = 1.23;
/// Hydrogen evolution equilibrium potential vs RHE (V).
pub const HER_EQUILIBRIUM: f64 = 0.0;

/// Half-reaction a library catalyst drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reaction {
    Co2Reduction,
    HydrogenEvolution,
    OxygenEvolution,
}

/// (name, reaction, source)
pub const CATALOG: &[(&str, Reaction, &str)] = &[
    ("oiid-cu", Reaction::Co2Reduction, "oxide-derived Cu, iodine-doped"),
    ("oid-cu", Reaction::Co2Reduction, "oxide-derived Cu"),
    ("cu-ag", Reaction::Co2Reduction, "CuAg bimetallic"),
    ("copper", Reaction::Co2Reduction, "polycrystalline Cu"),
    ("cu-au", Reaction::Co2Reduction, "CuAu bimetallic"),
    ("ren-2017", Reaction::Co2Reduction, "Ren et al. 2017"),
    ("dinh-2018", Reaction::Co2Reduction, "Dinh et al. 2018, flow cell"),
    ("tan-2021-koh", Reaction::Co2Reduction, "Tan et al. 2021, KOH"),
    ("tan-2021-near-neutral", Reaction::Co2Reduction, "Tan et al. 2021, near-neutral"),
    ("platinum", Reaction::HydrogenEvolution, "Pt"),
    ("ni-mo", Reaction::HydrogenEvolution, "NiMo alloy"),
    ("ruo2-neutral", Reaction::OxygenEvolution, "RuO2, neutral pH"),
    ("nifeox-neutral", Reaction::OxygenEvolution, "NiFeOx, neutral pH"),
    ("cuxo", Reaction::OxygenEvolution, "CuxO"),
    ("nifeox-ph14", Reaction::OxygenEvolution, "NiFeOx, pH 14"),
    ("irox-ph14", Reaction::OxygenEvolution, "IrOx, pH 14"),
    ("nicoox-ph14", Reaction::OxygenEvolution, "NiCoOx, pH 14"),
];

pub fn names() -> impl Iterator<Item = &'static str> {
    CATALOG.iter().map(|(name, _, _)| *name)
}

pub fn reaction(name: &str) -> Option<Reaction> {
    CATALOG.iter().find(|(n, _, _)| *n == name).map(|(_, r, _)| *r)
}

/// Look up a catalyst by name (case-insensitive).
pub fn lookup(name: &str) -> Result<Catalyst> {
    let key = name.to_ascii_lowercase();
    match key.as_str() {
        "oiid-cu" => reported(
            &key,
            &[-0.40, -0.44, -0.5375, -0.575, -0.60, -0.615, -0.627, -0.6375, -0.65],
            &[20.0, 50.0, 100.0, 150.0, 200.0, 250.0, 300.0, 350.0, 400.0],
            &[17.0, 17.25, 43.0, 57.23, 58.73, 61.18, 59.79, 57.28, 52.13],
        ),
        "oid-cu" => reported(
            &key,
            &[-0.60, -0.61, -0.66, -0.68, -0.70, -0.72, -0.73, -0.74, -0.75],
            &[20.0, 50.0, 100.0, 150.0, 200.0, 250.0, 300.0, 350.0, 400.0],
            &[0.0, 14.02, 42.75, 49.02, 50.74, 55.94, 53.25, 53.09, 52.63],
        ),
        "cu-ag" => reported(
            &key,
            &[-0.6, -0.7, -0.8, -0.9, -0.95, -1.0, -1.05, -1.1, -1.15, -1.2, -1.25, -1.3],
            &[1.82, 3.69, 6.2, 12.66, 18.62, 28.58, 35.12, 48.04, 64.43, 80.29, 110.0, 200.0],
            &[0.57, 0.93, 3.30, 12.93, 24.00, 34.03, 51.50, 35.33, 26.13, 15.70, 10.0, 5.0],
        ),
        "copper" => reported(
            &key,
            &[-0.6, -0.7, -0.8, -0.9, -0.95, -1.0, -1.05, -1.1, -1.15, -1.2],
            &[2.23, 3.95, 9.13, 12.85, 19.0, 25.47, 28.08, 35.2, 54.43, 68.94],
            &[0.0, 1.8, 4.17, 10.80, 23.83, 33.20, 30.47, 25.47, 24.07, 12.07],
        ),
        "cu-au" => reported(
            &key,
            &[-0.6, -0.7, -0.8, -0.9, -0.95, -1.0, -1.05, -1.1, -1.15],
            &[2.0, 4.53, 7.7, 17.73, 24.32, 31.24, 42.87, 48.82, 63.98],
            &[0.0, 1.15, 4.8, 31.7, 34.1, 36.17, 38.7, 34.97, 15.85],
        ),
        "ren-2017" => reported(
            &key,
            &[-1.1, -1.05, -1.0, -0.95, -0.9, -0.85],
            &[70.0, 47.0, 36.0, 25.5, 19.0, 11.0],
            &[4.0, 14.5, 26.8, 30.0, 24.0, 20.5],
        ),
        "dinh-2018" => reported(
            &key,
            &[-0.58, -0.57, -0.53, -0.47, -0.41, -0.32, -0.25],
            &[150.0, 100.0, 60.0, 35.0, 25.0, 15.0, 10.0],
            &[65.0, 70.0, 67.0, 58.0, 50.0, 40.0, 0.0],
        ),
        "tan-2021-koh" => reported(
            &key,
            &[-0.95, -0.9, -0.85, -0.8, -0.75, -0.7, -0.65, -0.6],
            &[170.0, 155.0, 140.0, 130.0, 120.0, 112.0, 105.0, 102.0],
            &[38.0, 48.0, 52.5, 59.5, 66.0, 76.0, 62.5, 48.5],
        ),
        "tan-2021-near-neutral" => reported(
            &key,
            &[-1.3, -1.25, -1.2, -1.15, -1.1, -1.05, -1.0, -0.95, -0.9],
            &[37.5, 33.0, 29.5, 25.5, 22.5, 19.0, 16.5, 15.0, 12.0],
            &[40.0, 47.0, 55.0, 60.0, 69.8, 55.0, 41.0, 33.0, 33.0],
        ),
        "platinum" => Catalyst::tafel(&key, HER_EQUILIBRIUM, 10.0, 0.055, 0.030),
        "ni-mo" => Catalyst::tafel(&key, HER_EQUILIBRIUM, 10.0, 0.075, 0.040),
        "ruo2-neutral" => Catalyst::tafel(&key, OER_EQUILIBRIUM, 10.0, 0.240, 0.037),
        "nifeox-neutral" => Catalyst::tafel(&key, OER_EQUILIBRIUM, 10.0, 0.280, 0.040),
        "cuxo" => Catalyst::tafel(&key, OER_EQUILIBRIUM, 50.0, 0.61, 0.044),
        "nifeox-ph14" => Catalyst::tafel(&key, OER_EQUILIBRIUM, 10.0, 0.327, 0.034),
        "irox-ph14" => Catalyst::tafel(&key, OER_EQUILIBRIUM, 10.0, 0.325, 0.040),
        "nicoox-ph14" => Catalyst::tafel(&key, OER_EQUILIBRIUM, 10.0, 0.345, 0.033),
        _ => Err(PecError::Config(format!(
            "unknown catalyst '{name}' (known: {})",
            names().collect::<Vec<_>>().join(", ")
        ))),
    }
}

/// Build a CO2RR table from reported potentials vs RHE (V), current
/// densities (mA/cm²) and Faradaic efficiencies (%).
pub fn reported(name: &str, potentials: &[f64], current_densities: &[f64], fe_percent: &[f64]) -> Result<Catalyst> {
    if potentials.len() != current_densities.len() || potentials.len() != fe_percent.len() {
        return Err(PecError::Data(format!("{name}: column lengths differ")));
    }
    let points = potentials
        .iter()
        .zip(current_densities)
        .zip(fe_percent)
        .map(|((e, j), fe)| CatalystCurvePoint {
            current_density: *j,
            overpotential: CO2RR_EQUILIBRIUM - e,
            faradaic_efficiency: fe / 100.0,
        })
        .collect();
    Catalyst::tabulated(name, CO2RR_EQUILIBRIUM, points)
}

//! Named scenario presets.

use crate::catalyst::BoundaryPolicy;
use crate::config::{Range, Regime, ScanParams, ScenarioConfig, SweepArea};
use crate::error::{PecError, Result};
use crate::metrics::Product;

/// (id, description)
pub const PRESETS: &[(&str, &str)] = &[
    ("A", "sparse coverage, OIID-Cu / NiFeOx pH 14, tandem"),
    ("B", "solar concentration, OIID-Cu / NiFeOx pH 14, AM1.5D"),
    ("C", "PV-EC at the electrolyzer peak-selectivity voltage"),
    ("F", "no concentration, insolation 0.1-1.5 suns"),
    ("f-sparse", "insolation 0.1-1.5 suns on the one-sun sparse-coverage cathode"),
    ("T", "sparse coverage with a triple junction"),
    ("cuag", "sparse coverage, CuAg / NiFeOx pH 14"),
    ("oid-cu", "sparse coverage, OID-Cu / NiFeOx pH 14"),
    ("ff-0.75", "sparse coverage at fill factor 0.75"),
    ("ff-0.65", "sparse coverage at fill factor 0.65"),
    ("degradation", "sparse design A under 0-35 % catalyst area loss"),
    ("hu-2013-pt", "HER, Pt / RuO2 neutral, one sun"),
    ("hu-2013-nimo", "HER, NiMo / NiFeOx neutral, one sun"),
];

fn range(start: f64, stop: f64, step: f64) -> Range {
    Range { start, stop, step }
}

fn tandem_scan() -> ScanParams {
    ScanParams {
        ranges: vec![range(1.6, 2.6, 0.05), range(1.0, 2.1, 0.05)],
    }
}

fn co2rr(name: &str, regime: Regime, bandgaps: &[f64]) -> ScenarioConfig {
    let mut config = ScenarioConfig::new(name, regime, bandgaps, "oiid-cu", "nifeox-ph14");
    config.scan = Some(tandem_scan());
    config
}

fn her(name: &str, reduction: &str, oxidation: &str) -> ScenarioConfig {
    let mut config = ScenarioConfig::new(name, Regime::NoConcentration, &[1.7, 1.1], reduction, oxidation);
    config.product = Product::Hydrogen;
    config.insolation = range(1.0, 1.0, 0.1);
    config.scan = Some(ScanParams {
        ranges: vec![range(1.35, 2.45, 0.05), range(0.65, 1.325, 0.025)],
    });
    config
}

/// Look up a preset by id (case-insensitive for the lettered scenarios).
pub fn preset(id: &str) -> Result<ScenarioConfig> {
    let config = match id.to_ascii_lowercase().as_str() {
        "a" => co2rr("A: sparse coverage", Regime::SparseCoverage, &[2.0, 1.3]),
        "b" => co2rr("B: solar concentration", Regime::Concentrated, &[1.9, 1.2]),
        "c" => {
            let mut config = co2rr("C: PV-EC", Regime::PvEc, &[2.1, 1.4]);
            config.scan = Some(ScanParams {
                ranges: vec![range(1.35, 2.4, 0.01), range(0.5, 1.3, 0.01)],
            });
            config
        }
        "f" => {
            let mut config = co2rr("F: no concentration", Regime::NoConcentration, &[1.9, 1.2]);
            config.boundary_policy = BoundaryPolicy::Clamp;
            config.insolation = range(0.1, 1.5, 0.1);
            config.scan = None;
            config
        }
        "f-sparse" => {
            let mut config = co2rr("F: sparse design under variable sunlight", Regime::NoConcentration, &[1.9, 1.2]);
            config.boundary_policy = BoundaryPolicy::Clamp;
            config.sweep_area = SweepArea::SparseDesign;
            config.scan = None;
            config
        }
        "t" => {
            let mut config = co2rr("T: triple junction", Regime::SparseCoverage, &[1.9, 1.4, 0.9]);
            config.scan = Some(ScanParams {
                ranges: vec![range(1.6, 2.0, 0.05), range(0.9, 1.5, 0.05), range(0.35, 1.0, 0.05)],
            });
            config
        }
        "cuag" => {
            let mut config = co2rr("CuAg sparse coverage", Regime::SparseCoverage, &[2.0, 1.3]);
            config.reduction_catalyst = "cu-ag".into();
            config
        }
        "oid-cu" => {
            let mut config = co2rr("OID-Cu sparse coverage", Regime::SparseCoverage, &[2.0, 1.3]);
            config.reduction_catalyst = "oid-cu".into();
            config
        }
        "ff-0.75" => {
            let mut config = co2rr("FF 0.75 sparse coverage", Regime::SparseCoverage, &[2.0, 1.3]);
            config.fill_factor = 0.75;
            config
        }
        "ff-0.65" => {
            let mut config = co2rr("FF 0.65 sparse coverage", Regime::SparseCoverage, &[2.0, 1.3]);
            config.fill_factor = 0.65;
            config
        }
        "degradation" => {
            let mut config = co2rr("A: catalyst degradation", Regime::Degradation, &[2.0, 1.3]);
            config.boundary_policy = BoundaryPolicy::Clamp;
            config.scan = None;
            config
        }
        "hu-2013-pt" => her("Hu 2013 Pt / RuO2", "platinum", "ruo2-neutral"),
        "hu-2013-nimo" => her("Hu 2013 NiMo / NiFeOx", "ni-mo", "nifeox-neutral"),
        _ => {
            let known: Vec<&str> = PRESETS.iter().map(|(id, _)| *id).collect();
            return Err(PecError::Config(format!(
                "unknown preset '{id}' (known: {})",
                known.join(", ")
            )));
        }
    };
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_preset_validates() {
        for (id, _) in PRESETS {
            let config = preset(id).unwrap_or_else(|e| panic!("{id}: {e}"));
            config.validate().unwrap_or_else(|e| panic!("{id}: {e}"));
        }
    }

    #[test]
    fn test_preset_regimes() {
        assert_eq!(preset("A").unwrap().regime, Regime::SparseCoverage);
        assert_eq!(preset("b").unwrap().regime, Regime::Concentrated);
        assert_eq!(preset("B").unwrap().fluid_resistance(), 1.0);
        assert_eq!(preset("C").unwrap().regime, Regime::PvEc);
        assert_eq!(preset("F").unwrap().boundary_policy, BoundaryPolicy::Clamp);
        assert_eq!(preset("F").unwrap().sweep_area, SweepArea::Configured);
        assert_eq!(preset("f-sparse").unwrap().sweep_area, SweepArea::SparseDesign);
        assert_eq!(preset("T").unwrap().bandgaps.len(), 3);
        assert_eq!(preset("hu-2013-pt").unwrap().product, Product::Hydrogen);
    }

    #[test]
    fn test_unknown_preset() {
        assert!(matches!(preset("Z"), Err(PecError::Config(_))));
    }
}

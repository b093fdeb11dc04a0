//! Bandgap design scan.
//!
//! Every combination of the configured bandgap ranges with strictly
//! descending gaps (top junction first) is solved in parallel under the
//! scenario's single-point regime. Combinations without an operating
//! point are recorded with their error. The best design maximizes
//! solar-to-fuel efficiency, except under PV-EC, where it is the design
//! whose maximum power point lies closest to the electrolyzer voltage.

use rayon::prelude::*;

use super::{pv_ec, run_single, Inputs, ScenarioResult};
use crate::config::{Regime, ScenarioConfig};
use crate::error::{PecError, Result};
use crate::spectrum::SpectrumSet;
use crate::stats::Stats;

#[derive(Debug)]
pub struct ScanResult {
    pub results: Vec<ScenarioResult>,
    /// Combinations with no solution, and why.
    pub failures: Vec<(Vec<f64>, PecError)>,
    /// Electrolyzer voltage the maximum power point should meet (PV-EC).
    pub mpp_target: Option<f64>,
}

impl ScanResult {
    pub fn evaluated(&self) -> usize {
        self.results.len() + self.failures.len()
    }

    /// Preferred design: closest MPP match when a target is set, highest
    /// solar-to-fuel efficiency otherwise.
    pub fn best(&self) -> Option<&ScenarioResult> {
        match self.mpp_target {
            Some(target) => self.closest_mpp(target),
            None => self.most_efficient(),
        }
    }

    /// Design with the highest solar-to-fuel efficiency.
    pub fn most_efficient(&self) -> Option<&ScenarioResult> {
        self.results
            .iter()
            .max_by(|a, b| a.solar_to_fuel_efficiency.total_cmp(&b.solar_to_fuel_efficiency))
    }

    /// Design whose maximum power voltage lies closest to `target`.
    pub fn closest_mpp(&self, target: f64) -> Option<&ScenarioResult> {
        self.results
            .iter()
            .filter_map(|r| r.max_power_voltage.map(|v| ((v - target).abs(), r)))
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, r)| r)
    }

    /// Every solved design, preferred first.
    pub fn ranked(&self) -> Vec<&ScenarioResult> {
        let mut ranked: Vec<&ScenarioResult> = self.results.iter().collect();
        match self.mpp_target {
            Some(target) => ranked.sort_by(|a, b| mpp_mismatch(a, target).total_cmp(&mpp_mismatch(b, target))),
            None => ranked.sort_by(|a, b| b.solar_to_fuel_efficiency.total_cmp(&a.solar_to_fuel_efficiency)),
        }
        ranked
    }
}

fn mpp_mismatch(result: &ScenarioResult, target: f64) -> f64 {
    result
        .max_power_voltage
        .map_or(f64::INFINITY, |v| (v - target).abs())
}

/// Cartesian product of the ranges, keeping strictly descending tuples.
pub fn combinations(ranges: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let mut combos: Vec<Vec<f64>> = vec![Vec::new()];
    for values in ranges {
        combos = combos
            .into_iter()
            .flat_map(|prefix| {
                let last = prefix.last().copied();
                values
                    .iter()
                    .filter(move |v| last.map_or(true, |l| **v < l))
                    .map(move |v| {
                        let mut next = prefix.clone();
                        next.push(*v);
                        next
                    })
                    .collect::<Vec<_>>()
            })
            .collect();
    }
    combos
}

pub fn run(config: &ScenarioConfig, spectra: &SpectrumSet, stats: Option<&mut Stats>) -> Result<ScanResult> {
    let _span = tracing::info_span!("bandgap_scan", scenario = %config.name).entered();

    if matches!(config.regime, Regime::NoConcentration | Regime::Degradation) {
        return Err(PecError::Config(format!(
            "{}: regime {} cannot be scanned",
            config.name, config.regime
        )));
    }
    let scan = config
        .scan
        .as_ref()
        .ok_or_else(|| PecError::Config(format!("{}: no [scan] ranges configured", config.name)))?;
    let ranges = scan.ranges.iter().map(|r| r.values()).collect::<Result<Vec<_>>>()?;
    let combos = combinations(&ranges);
    if combos.is_empty() {
        return Err(PecError::Config(format!(
            "{}: scan ranges contain no descending bandgap combination",
            config.name
        )));
    }
    tracing::info!(combinations = combos.len(), "scanning bandgaps");

    let base = Inputs::resolve(config, spectra)?;
    let mpp_target = match config.regime {
        Regime::PvEc => Some(pv_ec::target_voltage(&base)?),
        _ => None,
    };
    let outcomes: Vec<(Vec<f64>, Result<ScenarioResult>)> = combos
        .into_par_iter()
        .map(|gaps| {
            let inputs = base.with_bandgaps(&gaps);
            let outcome = run_single(&inputs, None);
            (gaps, outcome)
        })
        .collect();

    let mut result = ScanResult {
        results: Vec::new(),
        failures: Vec::new(),
        mpp_target,
    };
    let mut faults = 0;
    for (gaps, outcome) in outcomes {
        match outcome {
            Ok(r) => result.results.push(r),
            Err(e) => {
                if !e.is_recoverable() {
                    tracing::debug!(bandgaps = ?gaps, err = %e, "combination failed");
                    faults += 1;
                }
                result.failures.push((gaps, e));
            }
        }
    }
    if faults > 0 {
        tracing::warn!(faults, "scan combinations failed with errors other than a missing solution");
    }

    if let Some(s) = stats {
        s.scan_combinations += result.evaluated() as u32;
        s.scan_failures += result.failures.len() as u32;
    }
    if let Some(best) = result.best() {
        tracing::info!(
            bandgaps = ?best.bandgaps,
            solar_to_fuel = best.solar_to_fuel_efficiency,
            max_power_voltage = ?best.max_power_voltage,
            mpp_target = ?result.mpp_target,
            "best design"
        );
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Range, ScanParams};
    use crate::metrics::OperatingPoint;

    #[test]
    fn test_combinations_descending_only() {
        let combos = combinations(&[vec![1.0, 2.0], vec![1.0, 1.5]]);
        assert_eq!(combos, vec![vec![2.0, 1.0], vec![2.0, 1.5]]);
        assert_eq!(combinations(&[vec![1.0, 2.0]]).len(), 2);
        assert!(combinations(&[vec![1.0], vec![2.0]]).is_empty());
    }

    #[test]
    fn test_scan_finds_best_design() {
        let spectra = SpectrumSet::reference().unwrap();
        let mut config = ScenarioConfig::new("scan", Regime::SparseCoverage, &[2.0, 1.3], "oiid-cu", "nifeox-ph14");
        config.grid.samples = 200;
        config.scan = Some(ScanParams {
            ranges: vec![
                Range {
                    start: 1.8,
                    stop: 2.1,
                    step: 0.1,
                },
                Range {
                    start: 0.9,
                    stop: 1.3,
                    step: 0.2,
                },
            ],
        });
        let mut stats = Stats::new();
        let scan = run(&config, &spectra, Some(&mut stats)).unwrap();
        assert_eq!(scan.evaluated(), 12);
        assert_eq!(stats.scan_combinations, 12);
        let best = scan.best().unwrap();
        assert!(scan
            .results
            .iter()
            .all(|r| r.solar_to_fuel_efficiency <= best.solar_to_fuel_efficiency));
        assert!(best.bandgaps[0] > best.bandgaps[1]);
    }

    fn design(gaps: [f64; 2], stf: f64, vmpp: f64) -> ScenarioResult {
        ScenarioResult {
            scenario: "pvec".into(),
            regime: Regime::PvEc,
            bandgaps: gaps.to_vec(),
            operating_point: OperatingPoint {
                current_density: 12.0,
                voltage: 2.32,
                catalyst_current_density: 250.0,
            },
            faradaic_efficiency: 0.6118,
            production_rate: 1e-8,
            solar_to_fuel_efficiency: stf,
            area_ratio: None,
            concentration_factor: None,
            component_scaling: Some(20.0),
            max_power_voltage: Some(vmpp),
            pv_efficiency: Some(0.3),
            insolation: None,
            degradation: None,
        }
    }

    #[test]
    fn test_mpp_target_overrides_efficiency() {
        let mut scan = ScanResult {
            results: vec![
                design([2.0, 1.4], 0.109, 2.355),
                design([1.9, 1.4], 0.098, 2.315),
                design([2.2, 1.5], 0.080, 2.600),
            ],
            failures: Vec::new(),
            mpp_target: None,
        };
        assert_eq!(scan.best().unwrap().bandgaps, vec![2.0, 1.4]);

        scan.mpp_target = Some(2.3195);
        assert_eq!(scan.best().unwrap().bandgaps, vec![1.9, 1.4]);
        assert_eq!(scan.most_efficient().unwrap().bandgaps, vec![2.0, 1.4]);
        let order: Vec<f64> = scan.ranked().iter().map(|r| r.bandgaps[0]).collect();
        assert_eq!(order, vec![1.9, 2.0, 2.2]);
    }

    #[test]
    fn test_pv_ec_scan_selects_closest_mpp() {
        let spectra = SpectrumSet::reference().unwrap();
        let mut config = ScenarioConfig::new("pvec", Regime::PvEc, &[2.1, 1.4], "oiid-cu", "nifeox-ph14");
        config.grid.samples = 200;
        config.scan = Some(ScanParams {
            ranges: vec![
                Range {
                    start: 1.8,
                    stop: 2.2,
                    step: 0.1,
                },
                Range {
                    start: 1.2,
                    stop: 1.4,
                    step: 0.1,
                },
            ],
        });
        let inputs = Inputs::resolve(&config, &spectra).unwrap();
        let target = pv_ec::target_voltage(&inputs).unwrap();

        let scan = run(&config, &spectra, None).unwrap();
        assert_eq!(scan.mpp_target, Some(target));
        let best = scan.best().unwrap();
        let mismatch = (best.max_power_voltage.unwrap() - target).abs();
        assert!(scan
            .results
            .iter()
            .all(|r| (r.max_power_voltage.unwrap() - target).abs() >= mismatch));
    }

    #[test]
    fn test_faulty_combination_does_not_abort_scan() {
        let spectra = SpectrumSet::reference().unwrap();
        let mut config = ScenarioConfig::new("scan", Regime::SparseCoverage, &[2.0, 1.3], "oiid-cu", "nifeox-ph14");
        config.grid.samples = 200;
        // The built-in spectrum ends near 4.4 eV; 5 eV has no photons to integrate
        config.scan = Some(ScanParams {
            ranges: vec![
                Range {
                    start: 2.0,
                    stop: 5.0,
                    step: 3.0,
                },
                Range {
                    start: 1.3,
                    stop: 1.3,
                    step: 0.1,
                },
            ],
        });
        let mut stats = Stats::new();
        let scan = run(&config, &spectra, Some(&mut stats)).unwrap();
        assert_eq!(scan.evaluated(), 2);
        assert_eq!(scan.results.len(), 1);
        assert_eq!(scan.results[0].bandgaps, vec![2.0, 1.3]);
        assert_eq!(scan.failures.len(), 1);
        assert!(matches!(scan.failures[0].1, PecError::Domain(_)));
        assert_eq!(stats.scan_failures, 1);
    }

    #[test]
    fn test_sweep_regime_not_scannable() {
        let spectra = SpectrumSet::reference().unwrap();
        let mut config = ScenarioConfig::new("scan", Regime::NoConcentration, &[2.0, 1.3], "oiid-cu", "nifeox-ph14");
        config.scan = Some(ScanParams {
            ranges: vec![Range {
                start: 1.5,
                stop: 2.0,
                step: 0.5,
            }],
        });
        assert!(matches!(run(&config, &spectra, None), Err(PecError::Config(_))));
    }

    #[test]
    fn test_missing_scan_ranges() {
        let spectra = SpectrumSet::reference().unwrap();
        let config = ScenarioConfig::new("scan", Regime::SparseCoverage, &[2.0, 1.3], "oiid-cu", "nifeox-ph14");
        assert!(matches!(run(&config, &spectra, None), Err(PecError::Config(_))));
    }
}

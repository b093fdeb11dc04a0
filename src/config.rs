//! Scenario configuration, loaded from TOML or built from presets.
//!
//! ```toml
//! name = "tandem sparse"
//! regime = "sparse-coverage"
//! product = "ethylene"
//! bandgaps = [2.0, 1.3]
//! reduction_catalyst = "oiid-cu"
//! oxidation_catalyst = "nifeox-ph14"
//!
//! [scan]
//! ranges = [{ start = 1.6, stop = 2.6, step = 0.05 }, { start = 1.0, stop = 2.1, step = 0.05 }]
//! ```

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::catalyst::{library, BoundaryPolicy, Catalyst};
use crate::error::{PecError, Result};
use crate::metrics::Product;
use crate::pv::MAX_JUNCTIONS;
use crate::spectrum::SpectrumKind;

/// How the PV and the electrolyzer are coupled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Regime {
    /// Cathode area shrunk so it runs at peak selectivity.
    SparseCoverage,
    /// Sunlight concentrated until the catalyst runs at peak selectivity.
    Concentrated,
    /// PV and electrolyzer wired together at a fixed voltage.
    PvEc,
    /// Sweep of insolation with no concentration.
    NoConcentration,
    /// Sparse design swept over loss of active catalyst area.
    Degradation,
}

impl fmt::Display for Regime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Regime::SparseCoverage => "sparse-coverage",
            Regime::Concentrated => "concentrated",
            Regime::PvEc => "pv-ec",
            Regime::NoConcentration => "no-concentration",
            Regime::Degradation => "degradation",
        };
        write!(f, "{s}")
    }
}

impl FromStr for Regime {
    type Err = PecError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "sparse-coverage" | "sparse" => Ok(Regime::SparseCoverage),
            "concentrated" => Ok(Regime::Concentrated),
            "pv-ec" => Ok(Regime::PvEc),
            "no-concentration" => Ok(Regime::NoConcentration),
            "degradation" => Ok(Regime::Degradation),
            other => Err(PecError::Config(format!("unknown regime '{other}'"))),
        }
    }
}

/// A catalyst given by library name or spelled out inline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CatalystSpec {
    Named(String),
    Inline(Catalyst),
}

impl CatalystSpec {
    pub fn resolve(&self) -> Result<Catalyst> {
        match self {
            CatalystSpec::Named(name) => library::lookup(name),
            CatalystSpec::Inline(catalyst) => {
                catalyst.validate()?;
                Ok(catalyst.clone())
            }
        }
    }
}

impl From<&str> for CatalystSpec {
    fn from(name: &str) -> Self {
        CatalystSpec::Named(name.to_string())
    }
}

/// Cathode sizing for the insolation sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SweepArea {
    /// `catalyst_area_ratio` as configured.
    #[default]
    Configured,
    /// Area ratio of the sparse-coverage design at one sun, so the cathode
    /// sits at peak selectivity under full sunlight.
    SparseDesign,
}

/// Upper bound on the number of values a [`Range`] may expand to.
pub const MAX_RANGE_POINTS: usize = 1_000_000;

/// Inclusive arithmetic range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Range {
    pub start: f64,
    pub stop: f64,
    pub step: f64,
}

impl Range {
    pub fn values(&self) -> Result<Vec<f64>> {
        if !(self.step > 0.0) || !self.start.is_finite() || !self.stop.is_finite() || self.stop < self.start {
            return Err(PecError::Config(format!(
                "invalid range {}..={} step {}",
                self.start, self.stop, self.step
            )));
        }
        // Half-step slack so the stop value survives rounding
        let n = ((self.stop - self.start) / self.step + 0.5).floor();
        if n >= MAX_RANGE_POINTS as f64 {
            return Err(PecError::Config(format!(
                "range {}..={} step {} expands to more than {MAX_RANGE_POINTS} points",
                self.start, self.stop, self.step
            )));
        }
        let n = n as usize;
        Ok((0..=n).map(|i| self.start + self.step * i as f64).collect())
    }
}

/// Bounds of the concentration search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConcentrationSearch {
    /// Accepted |j_s − j*| (mA/cm²).
    pub tolerance: f64,
    /// Evaluations of j_s allowed.
    pub max_iterations: usize,
    pub max_concentration: f64,
}

impl Default for ConcentrationSearch {
    fn default() -> Self {
        Self {
            tolerance: 0.5,
            max_iterations: 60,
            max_concentration: 1000.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PvEcParams {
    /// Fixed operating voltage; derived from the electrolyzer at peak
    /// selectivity when absent.
    pub target_voltage: Option<f64>,
    /// Membrane and contact loss added to the derived voltage (V).
    pub membrane_loss: f64,
}

impl Default for PvEcParams {
    fn default() -> Self {
        Self {
            target_voltage: None,
            membrane_loss: 0.1,
        }
    }
}

/// Sampling of the current-density axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GridParams {
    /// Intervals on the PV and demand curves.
    pub samples: usize,
    /// Lowest current density on the demand curve (mA/cm²). Tafel laws
    /// are meaningless at zero current.
    pub current_floor: f64,
}

impl Default for GridParams {
    fn default() -> Self {
        Self {
            samples: 500,
            current_floor: 0.1,
        }
    }
}

/// Bandgap ranges for a design scan, top junction first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScanParams {
    pub ranges: Vec<Range>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    pub name: String,
    pub regime: Regime,
    #[serde(default)]
    pub product: Product,
    pub bandgaps: Vec<f64>,
    #[serde(default = "default_fill_factor")]
    pub fill_factor: f64,
    /// Ω·cm²; regime default when absent.
    #[serde(default)]
    pub fluid_resistance: Option<f64>,
    pub reduction_catalyst: CatalystSpec,
    pub oxidation_catalyst: CatalystSpec,
    /// Regime default when absent.
    #[serde(default)]
    pub spectrum: Option<SpectrumKind>,
    #[serde(default)]
    pub boundary_policy: BoundaryPolicy,
    /// PV area over cathode area for the kinetic regimes.
    #[serde(default = "default_area_ratio")]
    pub catalyst_area_ratio: f64,
    /// Where the insolation sweep takes its cathode area from.
    #[serde(default)]
    pub sweep_area: SweepArea,
    #[serde(default = "default_insolation")]
    pub insolation: Range,
    /// Lost catalyst area (%).
    #[serde(default = "default_degradation")]
    pub degradation: Range,
    #[serde(default)]
    pub concentration: ConcentrationSearch,
    #[serde(default)]
    pub pv_ec: PvEcParams,
    #[serde(default)]
    pub grid: GridParams,
    #[serde(default)]
    pub scan: Option<ScanParams>,
}

fn default_fill_factor() -> f64 {
    0.85
}

fn default_area_ratio() -> f64 {
    1.0
}

fn default_insolation() -> Range {
    Range {
        start: 0.1,
        stop: 1.5,
        step: 0.1,
    }
}

fn default_degradation() -> Range {
    Range {
        start: 0.0,
        stop: 35.0,
        step: 5.0,
    }
}

impl ScenarioConfig {
    /// Minimal configuration with every optional field at its default.
    pub fn new(
        name: &str,
        regime: Regime,
        bandgaps: &[f64],
        reduction_catalyst: impl Into<CatalystSpec>,
        oxidation_catalyst: impl Into<CatalystSpec>,
    ) -> Self {
        Self {
            name: name.to_string(),
            regime,
            product: Product::default(),
            bandgaps: bandgaps.to_vec(),
            fill_factor: default_fill_factor(),
            fluid_resistance: None,
            reduction_catalyst: reduction_catalyst.into(),
            oxidation_catalyst: oxidation_catalyst.into(),
            spectrum: None,
            boundary_policy: BoundaryPolicy::default(),
            catalyst_area_ratio: default_area_ratio(),
            sweep_area: SweepArea::default(),
            insolation: default_insolation(),
            degradation: default_degradation(),
            concentration: ConcentrationSearch::default(),
            pv_ec: PvEcParams::default(),
            grid: GridParams::default(),
            scan: None,
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Ω·cm²; 1 under concentration, 5 otherwise.
    pub fn fluid_resistance(&self) -> f64 {
        self.fluid_resistance.unwrap_or(match self.regime {
            Regime::Concentrated => 1.0,
            _ => 5.0,
        })
    }

    /// AM1.5D under concentration, AM1.5G otherwise.
    pub fn spectrum_kind(&self) -> SpectrumKind {
        self.spectrum.unwrap_or(match self.regime {
            Regime::Concentrated => SpectrumKind::Direct,
            _ => SpectrumKind::Global,
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.bandgaps.is_empty() || self.bandgaps.len() > MAX_JUNCTIONS {
            return Err(PecError::Config(format!(
                "{}: stack needs 1 to {MAX_JUNCTIONS} bandgaps, got {}",
                self.name,
                self.bandgaps.len()
            )));
        }
        if !(self.fill_factor > 0.0 && self.fill_factor <= 1.0) {
            return Err(PecError::Config(format!(
                "{}: fill factor must lie in (0, 1], got {}",
                self.name, self.fill_factor
            )));
        }
        let r = self.fluid_resistance();
        if !(r >= 0.0 && r.is_finite()) {
            return Err(PecError::Config(format!("{}: invalid fluid resistance {r}", self.name)));
        }
        if !(self.catalyst_area_ratio > 0.0 && self.catalyst_area_ratio.is_finite()) {
            return Err(PecError::Config(format!(
                "{}: catalyst area ratio must be positive, got {}",
                self.name, self.catalyst_area_ratio
            )));
        }
        if self.grid.samples < 2 || !(self.grid.current_floor > 0.0) {
            return Err(PecError::Config(format!(
                "{}: grid needs at least 2 samples and a positive current floor",
                self.name
            )));
        }
        if !(self.concentration.tolerance > 0.0 && self.concentration.max_concentration >= 1.0) {
            return Err(PecError::Config(format!(
                "{}: concentration search needs a positive tolerance and a limit of at least 1",
                self.name
            )));
        }
        if self.insolation.values()?.iter().any(|f| *f <= 0.0) {
            return Err(PecError::Config(format!("{}: insolation factors must be positive", self.name)));
        }
        if self.degradation.values()?.iter().any(|d| !(0.0..100.0).contains(d)) {
            return Err(PecError::Config(format!("{}: degradation must lie in [0, 100) %", self.name)));
        }
        if let Some(scan) = &self.scan {
            if scan.ranges.is_empty() || scan.ranges.len() > MAX_JUNCTIONS {
                return Err(PecError::Config(format!(
                    "{}: scan needs 1 to {MAX_JUNCTIONS} bandgap ranges",
                    self.name
                )));
            }
            for range in &scan.ranges {
                range.values()?;
            }
        }
        self.reduction_catalyst.resolve()?;
        self.oxidation_catalyst.resolve()?;
        Ok(())
    }
}

/// Several scenarios in one file, as `[[scenario]]` tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BatchConfig {
    pub scenario: Vec<ScenarioConfig>,
}

impl BatchConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// Parse either a batch file or a single scenario.
    pub fn parse(text: &str) -> Result<Self> {
        let value: toml::Table = toml::from_str(text)?;
        let batch = if value.contains_key("scenario") {
            toml::from_str::<BatchConfig>(text)?
        } else {
            BatchConfig {
                scenario: vec![toml::from_str::<ScenarioConfig>(text)?],
            }
        };
        if batch.scenario.is_empty() {
            return Err(PecError::Config("batch contains no scenarios".into()));
        }
        Ok(batch)
    }
}

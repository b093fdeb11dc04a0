//! Solar spectrum representation and photon-flux integration.
//!
//! A [`Spectrum`] is an immutable table of spectral irradiance (W/m²/nm)
//! against wavelength (nm). Photocurrent integrals assume unit quantum
//! efficiency above the absorption threshold.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::{
    ev_to_wavelength, wavelength_to_ev, A_PER_M2_TO_MA_PER_CM2, BOLTZMANN, ELEMENTARY_CHARGE,
    PLANCK, SPEED_OF_LIGHT,
};
use crate::error::{PecError, Result};
use crate::parser;

/// Photosphere temperature used by the built-in reference spectra (K).
const SUN_TEMPERATURE: f64 = 5778.0;
/// Total irradiance of the built-in AM1.5G approximation (W/m²).
const GLOBAL_IRRADIANCE: f64 = 1000.0;
/// Total irradiance of the built-in AM1.5D approximation (W/m²).
const DIRECT_IRRADIANCE: f64 = 900.0;

/// Which reference spectrum a scenario is illuminated with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpectrumKind {
    /// AM1.5 global tilt, used at one sun.
    #[default]
    Global,
    /// AM1.5 direct + circumsolar, used under concentration.
    Direct,
}

impl fmt::Display for SpectrumKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpectrumKind::Global => write!(f, "AM1.5G"),
            SpectrumKind::Direct => write!(f, "AM1.5D"),
        }
    }
}

impl FromStr for SpectrumKind {
    type Err = PecError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "global" | "am1.5g" => Ok(SpectrumKind::Global),
            "direct" | "am1.5d" => Ok(SpectrumKind::Direct),
            other => Err(PecError::Config(format!("unknown spectrum '{other}'"))),
        }
    }
}

/// One row of a spectrum.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpectrumSample {
    pub wavelength_nm: f64,
    /// Spectral irradiance (W/m²/nm).
    pub irradiance: f64,
}

#[derive(Debug, Clone)]
pub struct Spectrum {
    wavelengths: Vec<f64>,
    irradiance: Vec<f64>,
    photon_flux: Vec<f64>,
    concentration: f64,
}

impl Spectrum {
    /// Build a spectrum from wavelength (nm) and irradiance (W/m²/nm) columns.
    pub fn from_columns(wavelengths: Vec<f64>, irradiance: Vec<f64>) -> Result<Self> {
        if wavelengths.len() != irradiance.len() {
            return Err(PecError::Data(format!(
                "{} wavelengths but {} irradiance values",
                wavelengths.len(),
                irradiance.len()
            )));
        }
        if wavelengths.len() < 2 {
            return Err(PecError::Data("spectrum needs at least two samples".into()));
        }
        if wavelengths[0] <= 0.0 || wavelengths.windows(2).any(|w| w[1] <= w[0]) {
            return Err(PecError::Data("wavelengths must be positive and strictly increasing".into()));
        }
        if irradiance.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(PecError::Data("irradiance must be finite and non-negative".into()));
        }

        let photon_flux = photon_flux(&wavelengths, &irradiance);
        Ok(Self {
            wavelengths,
            irradiance,
            photon_flux,
            concentration: 1.0,
        })
    }

    pub fn from_samples(samples: &[SpectrumSample]) -> Result<Self> {
        Self::from_columns(
            samples.iter().map(|s| s.wavelength_nm).collect(),
            samples.iter().map(|s| s.irradiance).collect(),
        )
    }

    /// Blackbody-shaped spectrum on `[min_nm, max_nm]` with 1 nm resolution,
    /// scaled so that it integrates to `total_irradiance` (W/m²).
    pub fn blackbody(temperature: f64, total_irradiance: f64, min_nm: f64, max_nm: f64) -> Result<Self> {
        if temperature <= 0.0 || total_irradiance <= 0.0 || min_nm <= 0.0 || max_nm <= min_nm {
            return Err(PecError::Domain(format!(
                "invalid blackbody parameters T={temperature} P={total_irradiance} range=[{min_nm}, {max_nm}]"
            )));
        }
        let n = (max_nm - min_nm).floor() as usize + 1;
        let wavelengths: Vec<f64> = (0..n).map(|i| min_nm + i as f64).collect();
        let shape: Vec<f64> = wavelengths
            .iter()
            .map(|&nm| {
                let lambda = nm * 1e-9;
                let x = PLANCK * SPEED_OF_LIGHT / (lambda * BOLTZMANN * temperature);
                1.0 / (lambda.powi(5) * x.exp_m1())
            })
            .collect();
        let area = trapezoid(&wavelengths, &shape);
        let irradiance = shape.iter().map(|v| v * total_irradiance / area).collect();
        Self::from_columns(wavelengths, irradiance)
    }

    /// Built-in approximation of the ASTM G173 reference spectra.
    pub fn reference(kind: SpectrumKind) -> Result<Self> {
        let total = match kind {
            SpectrumKind::Global => GLOBAL_IRRADIANCE,
            SpectrumKind::Direct => DIRECT_IRRADIANCE,
        };
        Self::blackbody(SUN_TEMPERATURE, total, 280.0, 4000.0)
    }

    /// A new spectrum with every irradiance value multiplied by `factor`.
    pub fn concentrated(&self, factor: f64) -> Result<Self> {
        if !factor.is_finite() || factor <= 0.0 {
            return Err(PecError::Domain(format!("concentration factor must be positive, got {factor}")));
        }
        Ok(Self {
            wavelengths: self.wavelengths.clone(),
            irradiance: self.irradiance.iter().map(|v| v * factor).collect(),
            photon_flux: self.photon_flux.iter().map(|v| v * factor).collect(),
            concentration: self.concentration * factor,
        })
    }

    /// Concentration relative to the spectrum this one was derived from.
    pub fn concentration(&self) -> f64 {
        self.concentration
    }

    pub fn samples(&self) -> impl Iterator<Item = SpectrumSample> + '_ {
        self.wavelengths
            .iter()
            .zip(&self.irradiance)
            .map(|(&wavelength_nm, &irradiance)| SpectrumSample { wavelength_nm, irradiance })
    }

    /// Photon energy range covered by the table (eV), lowest first.
    pub fn energy_range(&self) -> (f64, f64) {
        let last = self.wavelengths[self.wavelengths.len() - 1];
        (wavelength_to_ev(last), wavelength_to_ev(self.wavelengths[0]))
    }

    /// Incident power (mW/cm²).
    pub fn incident_power(&self) -> f64 {
        trapezoid(&self.wavelengths, &self.irradiance) * A_PER_M2_TO_MA_PER_CM2
    }

    /// Photocurrent density (mA/cm²) of an ideal absorber with the given
    /// bandgap (eV): every photon at or above the gap yields one electron.
    pub fn photon_current_density(&self, bandgap: f64) -> Result<f64> {
        self.band_current_density(bandgap, None)
    }

    /// Photocurrent density (mA/cm²) from photons with energy in
    /// `[lower, upper)` eV. `None` means no upper limit.
    pub fn band_current_density(&self, lower: f64, upper: Option<f64>) -> Result<f64> {
        self.check_bandgap(lower)?;
        let long_edge = ev_to_wavelength(lower);
        let short_edge = match upper {
            Some(u) if u <= lower => {
                return Err(PecError::Domain(format!("band [{lower}, {u}) eV is empty")));
            }
            Some(u) => ev_to_wavelength(u),
            None => self.wavelengths[0],
        };
        let photons = integrate_between(&self.wavelengths, &self.photon_flux, short_edge, long_edge);
        Ok(photons * ELEMENTARY_CHARGE * A_PER_M2_TO_MA_PER_CM2)
    }

    fn check_bandgap(&self, bandgap: f64) -> Result<()> {
        let (min_ev, max_ev) = self.energy_range();
        if !bandgap.is_finite() || bandgap <= 0.0 {
            return Err(PecError::Domain(format!("bandgap must be positive, got {bandgap} eV")));
        }
        if bandgap < min_ev || bandgap > max_ev {
            return Err(PecError::Domain(format!(
                "bandgap {bandgap} eV outside spectrum range [{min_ev:.3}, {max_ev:.3}] eV"
            )));
        }
        Ok(())
    }
}

/// The pair of spectra a run draws from.
#[derive(Debug, Clone)]
pub struct SpectrumSet {
    pub global: Spectrum,
    pub direct: Spectrum,
}

impl SpectrumSet {
    pub fn reference() -> Result<Self> {
        Ok(Self {
            global: Spectrum::reference(SpectrumKind::Global)?,
            direct: Spectrum::reference(SpectrumKind::Direct)?,
        })
    }

    /// Load a spectrum table from disk.
    ///
    /// Column layout after the wavelength:
    /// - three or more columns: extraterrestrial, global, direct (ASTM G173)
    /// - two columns: global, direct
    /// - one column: used for both
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let table = parser::parse_spectrum_table(&text)?;
        let (global, direct) = match table.columns.len() {
            1 => (0, 0),
            2 => (0, 1),
            _ => (1, 2),
        };
        tracing::debug!(path = %path.display(), rows = table.wavelengths.len(), "loaded spectrum table");
        Ok(Self {
            global: Spectrum::from_columns(table.wavelengths.clone(), table.columns[global].clone())?,
            direct: Spectrum::from_columns(table.wavelengths, table.columns[direct].clone())?,
        })
    }

    pub fn get(&self, kind: SpectrumKind) -> &Spectrum {
        match kind {
            SpectrumKind::Global => &self.global,
            SpectrumKind::Direct => &self.direct,
        }
    }
}

/// Photon flux (photons/s/m²/nm) from irradiance (W/m²/nm).
fn photon_flux(wavelengths: &[f64], irradiance: &[f64]) -> Vec<f64> {
    wavelengths
        .iter()
        .zip(irradiance)
        .map(|(nm, e)| e * nm * 1e-9 / (PLANCK * SPEED_OF_LIGHT))
        .collect()
}

fn trapezoid(xs: &[f64], ys: &[f64]) -> f64 {
    xs.windows(2)
        .zip(ys.windows(2))
        .map(|(x, y)| 0.5 * (y[0] + y[1]) * (x[1] - x[0]))
        .sum()
}

/// Trapezoid integral of `ys` over `[lo, hi]`, interpolating linearly at
/// the edges.
fn integrate_between(xs: &[f64], ys: &[f64], lo: f64, hi: f64) -> f64 {
    let mut total = 0.0;
    for (x, y) in xs.windows(2).zip(ys.windows(2)) {
        let start = x[0].max(lo);
        let end = x[1].min(hi);
        if end <= start {
            continue;
        }
        let slope = (y[1] - y[0]) / (x[1] - x[0]);
        let y_start = y[0] + slope * (start - x[0]);
        let y_end = y[0] + slope * (end - x[0]);
        total += 0.5 * (y_start + y_end) * (end - start);
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn flat() -> Spectrum {
        // 1 W/m²/nm between 400 and 800 nm
        Spectrum::from_columns(vec![400.0, 600.0, 800.0], vec![1.0, 1.0, 1.0]).unwrap()
    }

    #[test]
    fn test_reference_power() {
        let global = Spectrum::reference(SpectrumKind::Global).unwrap();
        let direct = Spectrum::reference(SpectrumKind::Direct).unwrap();
        assert_relative_eq!(global.incident_power(), 100.0, max_relative = 1e-9);
        assert_relative_eq!(direct.incident_power(), 90.0, max_relative = 1e-9);
    }

    #[test]
    fn test_flat_spectrum_photocurrent() {
        let s = flat();
        // Integral of λ over [400, 800] nm = 240000 nm²
        let expected = 240_000.0 * 1e-9 / (PLANCK * SPEED_OF_LIGHT) * ELEMENTARY_CHARGE * 0.1;
        let low_gap = wavelength_to_ev(800.0);
        assert_relative_eq!(s.photon_current_density(low_gap).unwrap(), expected, max_relative = 1e-9);
    }

    #[test]
    fn test_partial_band_interpolates_cutoff() {
        let s = flat();
        // Cut-off at 500 nm falls inside the first segment
        let j = s.photon_current_density(wavelength_to_ev(500.0)).unwrap();
        let expected = 0.5 * (500.0f64.powi(2) - 400.0f64.powi(2)) * 1e-9 / (PLANCK * SPEED_OF_LIGHT)
            * ELEMENTARY_CHARGE
            * 0.1;
        assert_relative_eq!(j, expected, max_relative = 1e-9);
    }

    #[test]
    fn test_bands_sum_to_total() {
        let s = Spectrum::reference(SpectrumKind::Global).unwrap();
        let total = s.photon_current_density(1.1).unwrap();
        let top = s.photon_current_density(1.8).unwrap();
        let bottom = s.band_current_density(1.1, Some(1.8)).unwrap();
        assert_relative_eq!(top + bottom, total, max_relative = 1e-9);
    }

    #[test]
    fn test_photocurrent_non_increasing_in_bandgap() {
        let s = Spectrum::reference(SpectrumKind::Global).unwrap();
        let mut prev = f64::INFINITY;
        for i in 0..=80 {
            let eg = 0.5 + 0.03 * i as f64;
            let j = s.photon_current_density(eg).unwrap();
            assert!(j <= prev, "J({eg}) = {j} > {prev}");
            prev = j;
        }
    }

    #[test]
    fn test_bandgap_outside_range_is_domain_error() {
        let s = flat();
        assert!(matches!(s.photon_current_density(0.0), Err(PecError::Domain(_))));
        assert!(matches!(s.photon_current_density(-1.0), Err(PecError::Domain(_))));
        assert!(matches!(s.photon_current_density(5.0), Err(PecError::Domain(_))));
        assert!(matches!(s.photon_current_density(1.0), Err(PecError::Domain(_))));
    }

    #[test]
    fn test_concentration_scales_linearly() {
        let s = Spectrum::reference(SpectrumKind::Direct).unwrap();
        let c = s.concentrated(10.0).unwrap();
        assert_relative_eq!(c.incident_power(), 10.0 * s.incident_power(), max_relative = 1e-12);
        assert_relative_eq!(
            c.photon_current_density(1.4).unwrap(),
            10.0 * s.photon_current_density(1.4).unwrap(),
            max_relative = 1e-12
        );
        assert_abs_diff_eq!(c.concentration(), 10.0);
        assert!(s.concentrated(0.0).is_err());
    }

    #[test]
    fn test_malformed_columns_rejected() {
        assert!(Spectrum::from_columns(vec![400.0, 300.0], vec![1.0, 1.0]).is_err());
        assert!(Spectrum::from_columns(vec![400.0, 500.0], vec![1.0]).is_err());
        assert!(Spectrum::from_columns(vec![400.0, 500.0], vec![1.0, f64::NAN]).is_err());
    }

    #[test]
    fn test_kind_from_str() {
        assert_eq!("AM1.5D".parse::<SpectrumKind>().unwrap(), SpectrumKind::Direct);
        assert_eq!("global".parse::<SpectrumKind>().unwrap(), SpectrumKind::Global);
        assert!("am0".parse::<SpectrumKind>().is_err());
    }
}

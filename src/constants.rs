//! Physical constants (CODATA 2018 exact values where defined).

/// Planck constant (J·s).
pub const PLANCK: f64 = 6.626_070_15e-34;
/// Reduced Planck constant (J·s).
pub const REDUCED_PLANCK: f64 = PLANCK / (2.0 * std::f64::consts::PI);
/// Speed of light in vacuum (m/s).
pub const SPEED_OF_LIGHT: f64 = 299_792_458.0;
/// Elementary charge (C).
pub const ELEMENTARY_CHARGE: f64 = 1.602_176_634e-19;
/// Boltzmann constant (J/K).
pub const BOLTZMANN: f64 = 1.380_649e-23;
/// Faraday constant (C/mol).
pub const FARADAY: f64 = 96_485.332_12;

/// hc/q expressed in eV·nm, for wavelength/photon energy conversion.
pub const EV_NM: f64 = 1239.841_98;

/// Cell temperature (K).
pub const CELL_TEMPERATURE: f64 = 298.15;

/// Convert A/m² to mA/cm².
pub const A_PER_M2_TO_MA_PER_CM2: f64 = 0.1;

/// Thermal voltage kT/q (V).
pub fn thermal_voltage(temperature: f64) -> f64 {
    BOLTZMANN * temperature / ELEMENTARY_CHARGE
}

/// Photon energy (eV) for a wavelength (nm).
pub fn wavelength_to_ev(wavelength_nm: f64) -> f64 {
    EV_NM / wavelength_nm
}

/// Wavelength (nm) for a photon energy (eV).
pub fn ev_to_wavelength(energy_ev: f64) -> f64 {
    EV_NM / energy_ev
}

//! Unit conversions between canonical and presentation units.
//!
//! Canonical storage is Celsius and kilopascal; Fahrenheit and inches of
//! mercury only exist at the upload and display boundaries. Two fixed
//! conversions are all this system ever needs, so these are plain tested
//! functions rather than a generic unit framework.

/// Kilopascals per inch of mercury.
const KPA_PER_IN_HG: f64 = 3.386;

pub fn celsius_to_fahrenheit(temp_c: f64) -> f64 {
    temp_c * 9.0 / 5.0 + 32.0
}

pub fn fahrenheit_to_celsius(temp_f: f64) -> f64 {
    (temp_f - 32.0) * 5.0 / 9.0
}

pub fn kpa_to_inches_hg(pressure_kpa: f64) -> f64 {
    pressure_kpa / KPA_PER_IN_HG
}

pub fn inches_hg_to_kpa(pressure_in_hg: f64) -> f64 {
    pressure_in_hg * KPA_PER_IN_HG
}

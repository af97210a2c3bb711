use std::fmt;

const GRAVITY: f64 = 9.80665; // [m/s^2]
const GAS_CONSTANT: f64 = 287.05287; // [J/(kg K)] dry air
const LAPSE_RATE: f64 = 6.5e-3; // [K/m] tropospheric
const GAMMA_AIR: f64 = 1.4;
const TROPOPAUSE: f64 = 11_000.0; // [m]

pub const DEG_TO_RAD: f64 = std::f64::consts::PI / 180.0;

/// Free-stream operating point: Mach number, angle of attack and the ISA
/// atmosphere at the given altitude. Immutable once built; changing the
/// operating condition means constructing a new one.
#[derive(Debug, Clone)]
pub struct OperatingCondition {
    mach: f64,
    aoa_deg: f64,
    altitude: f64,
    t0: f64,
    p0: f64,

    temperature: f64,
    pressure: f64,
    density: f64,
    sound_speed: f64,
    velocity: f64,
    pdyn: f64,
    viscosity: f64,
    re_unit: f64,
}

impl OperatingCondition {
    /// Standard sea-level atmosphere (T0 = 288.15 K, P0 = 101325 Pa).
    pub fn new(mach: f64, aoa_deg: f64, altitude: f64) -> Self {
        Self::with_sea_level(mach, aoa_deg, altitude, 288.15, 101_325.0)
    }

    pub fn with_sea_level(mach: f64, aoa_deg: f64, altitude: f64, t0: f64, p0: f64) -> Self {
        let (temperature, pressure) = if altitude <= TROPOPAUSE {
            let t = t0 - LAPSE_RATE * altitude;
            let p = p0 * (t / t0).powf(GRAVITY / (LAPSE_RATE * GAS_CONSTANT));
            (t, p)
        } else {
            // isothermal layer above the tropopause
            let t11 = t0 - LAPSE_RATE * TROPOPAUSE;
            let p11 = p0 * (t11 / t0).powf(GRAVITY / (LAPSE_RATE * GAS_CONSTANT));
            let p = p11 * (-GRAVITY * (altitude - TROPOPAUSE) / (GAS_CONSTANT * t11)).exp();
            (t11, p)
        };

        let density = pressure / (GAS_CONSTANT * temperature);
        let sound_speed = (GAMMA_AIR * GAS_CONSTANT * temperature).sqrt();
        let velocity = mach * sound_speed;
        let pdyn = 0.5 * density * velocity * velocity;
        let viscosity = sutherland(temperature);
        let re_unit = density * velocity / viscosity;

        Self {
            mach,
            aoa_deg,
            altitude,
            t0,
            p0,
            temperature,
            pressure,
            density,
            sound_speed,
            velocity,
            pdyn,
            viscosity,
            re_unit,
        }
    }

    pub fn mach(&self) -> f64 {
        self.mach
    }

    pub fn aoa_deg(&self) -> f64 {
        self.aoa_deg
    }

    pub fn aoa_rad(&self) -> f64 {
        self.aoa_deg * DEG_TO_RAD
    }

    pub fn altitude(&self) -> f64 {
        self.altitude
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    pub fn pressure(&self) -> f64 {
        self.pressure
    }

    pub fn density(&self) -> f64 {
        self.density
    }

    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    pub fn pdyn(&self) -> f64 {
        self.pdyn
    }

    pub fn viscosity(&self) -> f64 {
        self.viscosity
    }

    /// Reynolds number per unit reference length.
    pub fn re_unit(&self) -> f64 {
        self.re_unit
    }
}

/// Sutherland's law for the dynamic viscosity of air.
fn sutherland(t: f64) -> f64 {
    let t_ref = 273.15;
    let s = 110.4;
    1.716e-5 * (t / t_ref).powf(1.5) * (t_ref + s) / (t + s)
}

impl fmt::Display for OperatingCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "*** operating condition ***")?;
        writeln!(f, "  Mach        = {:.4}", self.mach)?;
        writeln!(f, "  AoA         = {:.4} deg", self.aoa_deg)?;
        writeln!(f, "  altitude    = {:.1} m", self.altitude)?;
        writeln!(f, "  T0 / P0     = {:.2} K / {:.0} Pa", self.t0, self.p0)?;
        writeln!(f, "  temperature = {:.2} K", self.temperature)?;
        writeln!(f, "  pressure    = {:.1} Pa", self.pressure)?;
        writeln!(f, "  density     = {:.4} kg/m3", self.density)?;
        writeln!(f, "  velocity    = {:.2} m/s (a = {:.2} m/s)", self.velocity, self.sound_speed)?;
        writeln!(f, "  Pdyn        = {:.1} Pa", self.pdyn)?;
        write!(f, "  Re/L        = {:.4e} 1/m", self.re_unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn sea_level_density() {
        let oc = OperatingCondition::new(0.2, 0.0, 0.0);
        assert_relative_eq!(oc.density(), 1.225, epsilon = 1e-3);
        assert_relative_eq!(oc.temperature(), 288.15, epsilon = 1e-10);
    }

    #[test]
    fn tropospheric_profile_at_10km() {
        let oc = OperatingCondition::new(0.8, 3.5, 10_000.0);
        assert_relative_eq!(oc.temperature(), 223.15, epsilon = 1e-10);
        // standard tables give ~26.5 kPa and ~0.413 kg/m3
        assert!((oc.pressure() - 26_500.0).abs() < 200.0);
        assert!((oc.density() - 0.413).abs() < 0.005);
        assert!(oc.pdyn() > 0.0);
        assert!(oc.re_unit() > 1e6);
    }

    #[test]
    fn stratosphere_is_isothermal() {
        let a = OperatingCondition::new(0.8, 0.0, 12_000.0);
        let b = OperatingCondition::new(0.8, 0.0, 15_000.0);
        assert_relative_eq!(a.temperature(), b.temperature());
        assert!(b.pressure() < a.pressure());
    }
}

//! Material properties and hardening laws for the explicit constitutive update.

use std::fmt;
use std::sync::Arc;

/// A hardening law: flow stress and its derivative with respect to plastic
/// strain, as a function of accumulated plastic strain, plastic strain
/// rate, and temperature.
pub trait HardeningLaw: fmt::Debug + Send + Sync {
    /// `y(ε_p, ε̇_p, T)`.
    fn yield_stress(&self, plastic_strain: f64, plastic_strain_rate: f64, temperature: f64) -> f64;

    /// `∂y/∂ε_p` at the same point.
    fn hardening_modulus(&self, plastic_strain: f64, plastic_strain_rate: f64, temperature: f64) -> f64;
}

/// Rate- and temperature-independent linear hardening: `y = y0 + H * ep`.
#[derive(Debug, Clone, Copy)]
pub struct LinearHardening {
    pub y0: f64,
    pub h: f64,
}

impl HardeningLaw for LinearHardening {
    fn yield_stress(&self, plastic_strain: f64, _rate: f64, _temperature: f64) -> f64 {
        self.y0 + self.h * plastic_strain
    }

    fn hardening_modulus(&self, _plastic_strain: f64, _rate: f64, _temperature: f64) -> f64 {
        self.h
    }
}

/// Johnson-Cook-style hardening:
/// `y = (A + B ep^n) (1 + C ln(max(ep_dot/ep_dot0, 1))) (1 - Thom^m)`,
/// `Thom = (T - Troom) / (Tmelt - Troom)`.
#[derive(Debug, Clone, Copy)]
pub struct JohnsonCookHardening {
    pub a: f64,
    pub b: f64,
    pub n: f64,
    pub c: f64,
    pub reference_rate: f64,
    pub m: f64,
    pub room_temperature: f64,
    pub melt_temperature: f64,
}

impl JohnsonCookHardening {
    fn rate_factor(&self, plastic_strain_rate: f64) -> f64 {
        1.0 + self.c * (plastic_strain_rate / self.reference_rate).max(1.0).ln()
    }

    fn thermal_factor(&self, temperature: f64) -> f64 {
        let t_hom = (temperature - self.room_temperature) / (self.melt_temperature - self.room_temperature);
        1.0 - t_hom.clamp(0.0, 1.0).powf(self.m)
    }

    fn static_term(&self, plastic_strain: f64) -> f64 {
        self.a + self.b * plastic_strain.max(0.0).powf(self.n)
    }

    fn static_term_derivative(&self, plastic_strain: f64) -> f64 {
        if plastic_strain <= 0.0 || self.n == 0.0 {
            0.0
        } else {
            self.b * self.n * plastic_strain.powf(self.n - 1.0)
        }
    }
}

impl HardeningLaw for JohnsonCookHardening {
    fn yield_stress(&self, plastic_strain: f64, plastic_strain_rate: f64, temperature: f64) -> f64 {
        self.static_term(plastic_strain) * self.rate_factor(plastic_strain_rate) * self.thermal_factor(temperature)
    }

    fn hardening_modulus(&self, plastic_strain: f64, plastic_strain_rate: f64, temperature: f64) -> f64 {
        self.static_term_derivative(plastic_strain) * self.rate_factor(plastic_strain_rate) * self.thermal_factor(temperature)
    }
}

/// Elastic constants, density, thermal properties, and the hardening law
/// shared by every element bound to this material.
#[derive(Debug, Clone)]
pub struct Material {
    pub name: String,
    pub young_modulus: f64,
    pub poisson_ratio: f64,
    pub density: f64,
    pub specific_heat: f64,
    /// Taylor-Quinney fraction of plastic work converted to heat.
    pub taylor_quinney: f64,
    pub initial_temperature: f64,
    pub hardening: Arc<dyn HardeningLaw>,
}

impl Material {
    pub fn new(
        name: impl Into<String>,
        young_modulus: f64,
        poisson_ratio: f64,
        density: f64,
        specific_heat: f64,
        taylor_quinney: f64,
        initial_temperature: f64,
        hardening: Arc<dyn HardeningLaw>,
    ) -> Self {
        Material {
            name: name.into(),
            young_modulus,
            poisson_ratio,
            density,
            specific_heat,
            taylor_quinney,
            initial_temperature,
            hardening,
        }
    }

    /// Bulk modulus `K = E / (3(1-2ν))`.
    pub fn bulk_modulus(&self) -> f64 {
        self.young_modulus / (3.0 * (1.0 - 2.0 * self.poisson_ratio))
    }

    /// Shear modulus `G = E / (2(1+ν))`.
    pub fn shear_modulus(&self) -> f64 {
        self.young_modulus / (2.0 * (1.0 + self.poisson_ratio))
    }

    /// `2G`, the constant used directly in the deviatoric stress update.
    pub fn two_shear_modulus(&self) -> f64 {
        2.0 * self.shear_modulus()
    }

    /// Adiabatic heating coefficient `h = eta_TQ / (rho * c_p)`.
    pub fn adiabatic_heating_coefficient(&self) -> f64 {
        self.taylor_quinney / (self.density * self.specific_heat)
    }

    /// Longitudinal elastic wave speed `sqrt(E(1-ν)/(ρ(1+ν)(1-2ν)))`, used
    /// only for the Courant timestep.
    pub fn elongation_wave_speed(&self, mean_density: f64) -> f64 {
        let e = self.young_modulus;
        let nu = self.poisson_ratio;
        (e * (1.0 - nu) / (mean_density * (1.0 + nu) * (1.0 - 2.0 * nu))).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn steel() -> Material {
        Material::new(
            "steel",
            210.0e9,
            0.3,
            7800.0,
            460.0,
            0.9,
            293.15,
            Arc::new(LinearHardening { y0: 300.0e6, h: 1.0e9 }),
        )
    }

    #[test]
    fn bulk_and_shear_moduli() {
        let mat = steel();
        assert_relative_eq!(mat.bulk_modulus(), 175.0e9, epsilon = 1.0e6);
        assert_relative_eq!(mat.shear_modulus(), 80.769e9, epsilon = 1.0e7);
    }

    #[test]
    fn linear_hardening_is_affine() {
        let law = LinearHardening { y0: 300.0e6, h: 1.0e9 };
        assert_relative_eq!(law.yield_stress(0.0, 0.0, 0.0), 300.0e6);
        assert_relative_eq!(law.yield_stress(0.01, 0.0, 0.0), 310.0e6);
        assert_relative_eq!(law.hardening_modulus(0.01, 0.0, 0.0), 1.0e9);
    }

    #[test]
    fn johnson_cook_reduces_to_static_term_at_reference_rate_and_room_temperature() {
        let law = JohnsonCookHardening {
            a: 90.0e6,
            b: 292.0e6,
            n: 0.31,
            c: 0.025,
            reference_rate: 1.0,
            m: 1.09,
            room_temperature: 293.0,
            melt_temperature: 1356.0,
        };
        let y = law.yield_stress(0.1, 1.0, 293.0);
        let expected = 90.0e6 + 292.0e6 * 0.1f64.powf(0.31);
        assert_relative_eq!(y, expected, epsilon = 1.0);
    }

    #[test]
    fn johnson_cook_softens_toward_melt() {
        let law = JohnsonCookHardening {
            a: 90.0e6,
            b: 292.0e6,
            n: 0.31,
            c: 0.025,
            reference_rate: 1.0,
            m: 1.09,
            room_temperature: 293.0,
            melt_temperature: 1356.0,
        };
        let y_cold = law.yield_stress(0.1, 1.0, 293.0);
        let y_hot = law.yield_stress(0.1, 1.0, 1000.0);
        assert!(y_hot < y_cold);
    }
}

//! Radial-return isotropic J2 plasticity and the element-mean pressure
//! update that precedes it.

use crate::error::DynelaError;
use crate::materials::Material;
use crate::state::IntegrationPoint;
use crate::tensor::{SymTensor2, SQRT_2_3, SQRT_3_2};

/// Maximum Newton-Raphson-with-bisection iterations before the return
/// mapping is declared non-convergent.
const MAX_RETURN_ITERATIONS: usize = 250;
/// Convergence threshold on the plastic-multiplier increment.
const GAMMA_TOLERANCE: f64 = 1e-8;
/// Seed used to evaluate an as-yet-unset yield stress, and as the initial
/// plastic-multiplier guess for a virgin integration point.
const GAMMA_SEED: f64 = 1e-8;

/// Element-mean volumetric (B-bar) pressure update: replace each
/// integration point's volumetric strain increment by the element average
/// before computing its pressure, curing volumetric locking.
pub fn update_pressure(integration_points: &mut [IntegrationPoint], bulk_modulus: f64) {
    if integration_points.is_empty() {
        return;
    }
    let mean_volumetric_strain_inc: f64 = integration_points
        .iter()
        .map(|ip| ip.strain_inc.trace())
        .sum::<f64>()
        / integration_points.len() as f64;

    for ip in integration_points.iter_mut() {
        ip.pressure = ip.stress.third_trace() + bulk_modulus * mean_volumetric_strain_inc;
    }
}

/// Apply the radial-return constitutive update to one integration point.
/// Expects `ip.strain_inc` and `ip.pressure` already populated for this
/// step (by the kinematics and pressure passes, respectively).
pub fn update_stress(
    ip: &mut IntegrationPoint,
    material: &Material,
    element: u64,
    int_point: usize,
    dt: f64,
) -> Result<(), DynelaError> {
    let two_g = material.two_shear_modulus();
    let h = material.adiabatic_heating_coefficient();

    let s_old = ip.stress.deviator();
    let s0 = s_old.norm();

    let s_tr = s_old + two_g * ip.strain_inc.deviator();
    let s1 = s_tr.norm();
    let sigma_tr = SQRT_3_2 * s1;

    if ip.yield_stress == 0.0 {
        ip.yield_stress =
            material.hardening.yield_stress(GAMMA_SEED, GAMMA_SEED / dt, ip.temperature);
    }
    let y_prev = ip.yield_stress;

    ip.plastic_strain_inc = SymTensor2::ZERO;

    if sigma_tr <= y_prev {
        ip.gamma = 0.0;
        finalize(ip, s_tr, s0, material, 0.0);
        return Ok(());
    }

    let mut gamma_min = 0.0;
    let mut gamma_max = (sigma_tr - y_prev) / (two_g * SQRT_3_2);
    let mut gamma = if ip.plastic_strain_scalar == 0.0 { GAMMA_SEED * SQRT_3_2 } else { ip.gamma };

    let mut converged = false;
    for _ in 0..MAX_RETURN_ITERATIONS {
        let ep_trial = ip.plastic_strain_scalar + SQRT_2_3 * gamma;
        let ep_rate_trial = SQRT_2_3 * gamma / dt;
        let t_trial = ip.temperature + 0.5 * h * gamma * (SQRT_2_3 * y_prev + s0);

        let y = material.hardening.yield_stress(ep_trial, ep_rate_trial, t_trial);
        let h_y = material.hardening.hardening_modulus(ep_trial, ep_rate_trial, t_trial);

        let f = sigma_tr - gamma * two_g * SQRT_3_2 - y;
        let f_prime = two_g * SQRT_3_2 + SQRT_2_3 * h_y;

        if f < 0.0 {
            gamma_max = gamma;
        } else {
            gamma_min = gamma;
        }

        let mut next_gamma = gamma + f / f_prime;
        if next_gamma < gamma_min || next_gamma > gamma_max {
            next_gamma = 0.5 * (gamma_min + gamma_max);
        }

        let delta = next_gamma - gamma;
        gamma = next_gamma;
        if delta.abs() < GAMMA_TOLERANCE {
            converged = true;
            break;
        }
    }

    if !converged {
        return Err(DynelaError::NonConvergentReturn {
            element,
            int_point,
            iterations: MAX_RETURN_ITERATIONS,
            gamma,
            gamma_min,
            gamma_max,
            dt,
        });
    }

    let ep_new = ip.plastic_strain_scalar + SQRT_2_3 * gamma;
    let ep_rate_new = SQRT_2_3 * gamma / dt;
    let t_new = ip.temperature + 0.5 * h * gamma * (SQRT_2_3 * y_prev + s0);
    ip.plastic_strain_scalar = ep_new;
    ip.plastic_strain_rate_scalar = ep_rate_new;
    ip.yield_stress = material.hardening.yield_stress(ep_new, ep_rate_new, t_new);
    ip.gamma = gamma;
    ip.gamma_cumulate += gamma;

    let s_new = s_tr * (1.0 - two_g * gamma / s1);
    ip.plastic_strain_inc = (gamma / s1) * s_tr;
    ip.plastic_strain += ip.plastic_strain_inc;

    finalize(ip, s_new, s0, material, gamma);
    Ok(())
}

/// Shared tail of the elastic/plastic branches: reassemble stress from the
/// deviator and the already-updated pressure, then do the stress-power and
/// plastic-work energy accounting.
fn finalize(ip: &mut IntegrationPoint, s_new: SymTensor2, s0: f64, material: &Material, gamma: f64) {
    let sigma_old = ip.stress;
    let sigma_new = s_new + SymTensor2::from_diag(ip.pressure, ip.pressure, ip.pressure);

    let delta_w_int = 0.5 * ip.strain_inc.double_contraction(&(sigma_old + sigma_new));
    ip.internal_energy += delta_w_int / ip.density;

    if gamma > 0.0 {
        let delta_w_p = 0.5 * gamma * (s_new.norm() + s0);
        ip.inelastic_energy += delta_w_p / ip.density;
        ip.temperature += material.adiabatic_heating_coefficient() * delta_w_p;
    }

    ip.stress = sigma_new;
}

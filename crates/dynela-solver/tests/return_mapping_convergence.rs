//! Property check: for convex hardening laws, the radial-return
//! Newton-Raphson-with-bisection mapping converges (returns `Ok`) across a
//! sweep of strain increments from just past yield up to heavily plastic,
//! and the resulting stress state never exceeds the freshly hardened yield
//! surface.

use std::sync::Arc;

use dynela_solver::{update_stress, IntegrationPoint, LinearHardening, Material};

fn linear_hardening_steel() -> Material {
    Material::new(
        "steel",
        210.0e9,
        0.3,
        7800.0,
        460.0,
        0.9,
        293.15,
        Arc::new(LinearHardening { y0: 250.0e6, h: 1.5e9 }),
    )
}

fn johnson_cook_steel() -> Material {
    Material::new(
        "steel",
        210.0e9,
        0.3,
        7800.0,
        460.0,
        0.9,
        293.15,
        Arc::new(dynela_solver::JohnsonCookHardening {
            a: 250.0e6,
            b: 500.0e6,
            n: 0.3,
            c: 0.01,
            reference_rate: 1.0,
            m: 1.0,
            room_temperature: 293.15,
            melt_temperature: 1800.0,
        }),
    )
}

#[test]
fn linear_hardening_return_mapping_converges_across_a_strain_sweep() {
    let material = linear_hardening_steel();
    let mut ip = IntegrationPoint::new(0, material.density, material.initial_temperature);
    ip.pressure = 0.0;

    for magnitude in [2.0e-3, 4.0e-3, 8.0e-3, 1.6e-2, 3.2e-2] {
        ip.strain_inc = dynela_solver::SymTensor2::from_diag(magnitude, -0.5 * magnitude, -0.5 * magnitude);
        update_stress(&mut ip, &material, 1, 0, 1.0e-6).expect("return mapping should converge");
        assert!(
            ip.stress.mises_equivalent() <= ip.yield_stress * (1.0 + 1.0e-6),
            "mises stress exceeded yield surface after increment {magnitude}"
        );
    }
    assert!(ip.plastic_strain_scalar > 0.0);
}

#[test]
fn johnson_cook_return_mapping_converges_across_a_strain_sweep() {
    let material = johnson_cook_steel();
    let mut ip = IntegrationPoint::new(0, material.density, material.initial_temperature);
    ip.pressure = 0.0;

    for magnitude in [2.0e-3, 4.0e-3, 8.0e-3, 1.6e-2] {
        ip.strain_inc = dynela_solver::SymTensor2::from_diag(magnitude, -0.5 * magnitude, -0.5 * magnitude);
        update_stress(&mut ip, &material, 1, 0, 1.0e-4).expect("return mapping should converge");
        assert!(
            ip.stress.mises_equivalent() <= ip.yield_stress * (1.0 + 1.0e-6),
            "mises stress exceeded yield surface after increment {magnitude}"
        );
    }
    assert!(ip.plastic_strain_scalar > 0.0);
}

//! The Chung-Hulbert explicit predictor/corrector time integrator.
//!
//! One [`Solver`] owns a [`Model`], the boundary conditions bound to its
//! nodes, and the result/history sinks driven at the end of each accepted
//! step. `solve` runs the step loop until the requested end time, reporting
//! a [`CpuTimes`] breakdown by named phase and flushing an emergency
//! snapshot before propagating a fatal mid-step error.

use std::sync::Arc;

use rayon::prelude::*;

use crate::boundary::BoundaryCondition;
use crate::constitutive;
use crate::error::DynelaError;
use crate::kinematics;
use crate::mesh::Mesh;
use crate::model::Model;
use crate::sinks::{HistorySink, ResultSink};
use crate::tensor::Vec3;
use crate::timing::CpuTimes;

/// Spectral radius at the bifurcation frequency and the safety factor
/// applied to the Courant estimate. `rho_b` close to 1 recovers
/// undamped central difference; lower values add high-frequency
/// numerical dissipation.
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub struct ChungHulbertConfig {
    pub rho_b: f64,
    pub safety_factor: f64,
    /// Emit a progress line (step, t, dt) plus a remaining-wall-time
    /// estimate every this-many accepted steps. Zero disables progress
    /// reporting entirely.
    pub report_frequency: usize,
}

impl Default for ChungHulbertConfig {
    fn default() -> Self {
        ChungHulbertConfig { rho_b: 0.8182, safety_factor: 0.9, report_frequency: 100 }
    }
}

/// Derived integration constants from `rho_b`.
#[derive(Debug, Clone, Copy)]
pub struct ChungHulbertConstants {
    pub alpha_m: f64,
    pub beta: f64,
    pub gamma: f64,
    /// Stable-frequency multiplier; kept for reporting and potential
    /// future use but not bound into the adopted timestep (the adopted
    /// `dt` is `safety_factor * courant_timestep`).
    pub omega_s: f64,
}

impl ChungHulbertConfig {
    pub fn constants(&self) -> Result<ChungHulbertConstants, DynelaError> {
        if !(0.0..=1.0).contains(&self.rho_b) {
            return Err(DynelaError::ConfigOutOfRange(format!(
                "spectral radius rho_b = {} outside [0, 1]",
                self.rho_b
            )));
        }
        if self.safety_factor <= 0.0 || self.safety_factor > 1.0 {
            return Err(DynelaError::ConfigOutOfRange(format!(
                "safety factor {} outside (0, 1]",
                self.safety_factor
            )));
        }

        let rho_b = self.rho_b;
        let alpha_m = (2.0 * rho_b - 1.0) / (1.0 + rho_b);
        let beta = (5.0 - 3.0 * rho_b) / ((1.0 + rho_b).powi(2) * (2.0 - rho_b));
        let gamma = 1.5 - alpha_m;
        let omega_s = (12.0 * (1.0 + rho_b).powi(3) * (2.0 - rho_b)
            / (10.0 + 15.0 * rho_b - rho_b.powi(2) + rho_b.powi(3) - rho_b.powi(4)))
        .sqrt();

        Ok(ChungHulbertConstants { alpha_m, beta, gamma, omega_s })
    }
}

/// Owns the model, the per-node boundary bindings, the result/history
/// sinks, and the running clock. Constructed once per analysis; `solve`
/// may be called repeatedly to advance in increments.
pub struct Solver {
    pub model: Model,
    constants: ChungHulbertConstants,
    safety_factor: f64,
    boundary_conditions: Vec<Option<Arc<dyn BoundaryCondition>>>,
    result_sinks: Vec<Box<dyn ResultSink>>,
    history_sinks: Vec<Box<dyn HistorySink>>,
    pub timing: CpuTimes,
    pub time: f64,
    dt: f64,
    report_frequency: usize,
    step_count: u64,
}

impl Solver {
    pub fn new(
        mut model: Model,
        config: ChungHulbertConfig,
        boundary_conditions: Vec<Option<Arc<dyn BoundaryCondition>>>,
    ) -> Result<Self, DynelaError> {
        if boundary_conditions.len() != model.mesh.nodes.len() {
            return Err(DynelaError::InvalidMesh(format!(
                "boundary condition table has {} entries but mesh has {} nodes",
                boundary_conditions.len(),
                model.mesh.nodes.len()
            )));
        }

        let constants = config.constants()?;
        model.compute_mass_matrix(true);

        for (index, bc) in boundary_conditions.iter().enumerate() {
            if let Some(bc) = bc {
                bc.apply_initial_on_current_fields(&mut model.mesh.nodes[index], 0.0, 0.0);
            }
        }

        let dt = config.safety_factor * model.courant_timestep();

        Ok(Solver {
            model,
            constants,
            safety_factor: config.safety_factor,
            boundary_conditions,
            result_sinks: Vec::new(),
            history_sinks: Vec::new(),
            timing: CpuTimes::new(),
            time: 0.0,
            dt,
            report_frequency: config.report_frequency,
            step_count: 0,
        })
    }

    pub fn add_result_sink(&mut self, sink: Box<dyn ResultSink>) {
        self.result_sinks.push(sink);
    }

    pub fn add_history_sink(&mut self, sink: Box<dyn HistorySink>) {
        self.history_sinks.push(sink);
    }

    pub fn current_time(&self) -> f64 {
        self.time
    }

    pub fn current_timestep(&self) -> f64 {
        self.dt
    }

    /// Advance the integrator until `t_end`. On a fatal mid-step failure
    /// (degenerate element, non-convergent return mapping or polar
    /// decomposition) an emergency snapshot is flushed from the last
    /// consistent (`current`) state before the error propagates.
    pub fn solve(&mut self, t_end: f64) -> Result<(), DynelaError> {
        let start = std::time::Instant::now();
        let t_start = self.time;
        let mut timer = std::mem::take(&mut self.timing);

        let mut result = Ok(());
        while self.time < t_end {
            result = self.step(t_end, &mut timer);
            if let Err(err) = &result {
                log::warn!("step {} failed at t = {:e}: {err}", self.step_count, self.time);
                if err.is_fatal_mid_step() {
                    for sink in &mut self.result_sinks {
                        sink.write_emergency(self.time, &self.model)?;
                    }
                }
                break;
            }

            if self.report_frequency > 0 && self.step_count % self.report_frequency as u64 == 0 {
                let elapsed = start.elapsed().as_secs_f64();
                let progress = (self.time - t_start) / (t_end - t_start).max(f64::EPSILON);
                let remaining = if progress > 0.0 { elapsed * (1.0 / progress - 1.0) } else { f64::NAN };
                log::info!(
                    "step {}: t = {:e}, dt = {:e} ({:.1}% done, ~{:.1}s remaining)",
                    self.step_count,
                    self.time,
                    self.dt,
                    100.0 * progress,
                    remaining
                );
            }
        }

        timer.add("Solver", start.elapsed());
        self.timing = timer;
        result
    }

    fn step(&mut self, t_end: f64, timer: &mut CpuTimes) -> Result<(), DynelaError> {
        let t = self.time;
        let constants = self.constants;

        let (dt, t_new) = timer.time("TimeStep", || {
            let mut dt = self.dt;
            let mut t_new = t + dt;
            if t_new > t_end {
                dt = t_end - t;
                t_new = t_end;
            }
            (dt, t_new)
        });

        timer.time("Predictor", || {
            for node in self.model.mesh.nodes.iter_mut() {
                let old = *node.current();
                let mut new_fields = old;
                new_fields.incremental_displacement =
                    dt * old.velocity + (0.5 - constants.beta) * dt * dt * old.acceleration;
                new_fields.velocity = old.velocity + (1.0 - constants.gamma) * dt * old.acceleration;
                new_fields.acceleration = Vec3::zeros();
                *node.new_fields_mut() = new_fields;
            }
            for (index, bc) in self.boundary_conditions.iter().enumerate() {
                if let Some(bc) = bc {
                    bc.apply_constant_on_new_fields(&mut self.model.mesh.nodes[index], t, dt);
                }
            }
        });

        timer.time("Jacobian", || {
            let Mesh { nodes, elements } = &mut self.model.mesh;
            let nodes: &[crate::state::Node] = nodes.as_slice();
            for element in elements.iter_mut() {
                kinematics::compute_jacobian(element, nodes, t)?;
            }
            Ok::<(), DynelaError>(())
        })?;

        timer.time("Strains", || {
            let Mesh { nodes, elements } = &mut self.model.mesh;
            let nodes: &[crate::state::Node] = nodes.as_slice();
            elements.par_iter_mut().try_for_each(|element| kinematics::compute_strains(element, nodes))
        })?;

        timer.time("Pressure", || {
            self.model.mesh.elements.par_iter_mut().for_each(|element| {
                let bulk_modulus = element.material.bulk_modulus();
                constitutive::update_pressure(&mut element.integration_points, bulk_modulus);
            });
        });

        timer.time("Stress", || {
            self.model.mesh.elements.par_iter_mut().try_for_each(|element| {
                let material = element.material.clone();
                let element_id = element.id;
                element
                    .integration_points
                    .par_iter_mut()
                    .enumerate()
                    .try_for_each(|(int_point, ip)| {
                        constitutive::update_stress(ip, &material, element_id, int_point, dt)
                    })
            })
        })?;

        timer.time("FinalRotation", || {
            self.model.mesh.elements.par_iter_mut().for_each(|element| {
                for ip in &mut element.integration_points {
                    ip.stress = ip.stress.rotate_by(&ip.rotation);
                    ip.strain = ip.strain.rotate_by(&ip.rotation);
                    ip.plastic_strain = ip.plastic_strain.rotate_by(&ip.rotation);
                }
            });
        });

        timer.time("InternalForces", || {
            self.model.assemble_internal_forces();
        });

        timer.time("ExplicitSolve", || {
            let alpha_m = constants.alpha_m;
            let Model { internal_force, mesh, .. } = &mut self.model;
            for (index, node) in mesh.nodes.iter_mut().enumerate() {
                let mass = node.mass;
                let f_int = internal_force[index];
                let old = *node.current();
                let f_ext = node.new_fields().external_force;
                let a_new = ((f_ext - f_int) / mass - alpha_m * old.acceleration) / (1.0 - alpha_m);

                let new_fields = node.new_fields_mut();
                let delta_u_pred = new_fields.incremental_displacement;
                new_fields.velocity += constants.gamma * dt * a_new;
                new_fields.acceleration = a_new;
                new_fields.incremental_displacement = delta_u_pred + constants.beta * dt * dt * a_new;
            }

            for (index, bc) in self.boundary_conditions.iter().enumerate() {
                if let Some(bc) = bc {
                    bc.apply_constant_on_new_fields(&mut self.model.mesh.nodes[index], t_new, dt);
                }
            }

            for node in self.model.mesh.nodes.iter_mut() {
                let old_displacement = node.current().displacement;
                let delta_u = node.new_fields().incremental_displacement;
                node.new_fields_mut().displacement = old_displacement + delta_u;
                node.position += delta_u;
            }
        });

        timer.time("Density", || {
            for element in &mut self.model.mesh.elements {
                for ip in &mut element.integration_points {
                    ip.density = ip.density * ip.det_j0 / ip.det_j;
                }
            }
        });

        for sink in &mut self.history_sinks {
            sink.record(t_new, &self.model)?;
        }
        for sink in &mut self.result_sinks {
            sink.maybe_write(t_new, &self.model)?;
        }

        self.time = t_new;
        self.step_count += 1;
        for node in self.model.mesh.nodes.iter_mut() {
            node.swap_fields();
        }

        timer.time("TimeStep", || {
            self.dt = self.safety_factor * self.model.courant_timestep();
        });

        Ok(())
    }
}

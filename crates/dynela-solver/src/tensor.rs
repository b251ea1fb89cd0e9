//! Small-tensor algebra: 3-vectors, dense 3x3 tensors, symmetric 3x3 tensors,
//! and the Jacobi-rotation polar decomposition used by the kinematics update.
//!
//! Dense linear algebra at this scale is deliberately built on plain
//! `nalgebra::Matrix3`/`Vector3` rather than hand-rolled arrays: the element
//! kinematics and constitutive update only ever need 3x3 and 6-component
//! objects, so the general `DMatrix`/`DVector` machinery used elsewhere in
//! the workspace for BLAS/LAPACK-backed solves would be the wrong tool here.

use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};

use crate::error::DynelaError;

/// A 3-component vector (position, displacement, velocity, force, ...).
pub type Vec3 = Vector3<f64>;

/// A general (non-symmetric) second-order tensor, e.g. the deformation
/// gradient `F` or the polar rotation `R`.
pub type Tensor2 = Matrix3<f64>;

/// Index table mapping `(i, j)` to one of the six storage slots of a
/// [`SymTensor2`]: `(xx, xy, xz, yy, yz, zz)`.
const SYM_INDEX: [[usize; 3]; 3] = [[0, 1, 2], [1, 3, 4], [2, 4, 5]];

/// A symmetric second-order tensor stored as six scalars.
///
/// Used for stress, strain, and plastic-strain state: storing only the
/// six independent components avoids redundant arithmetic on the
/// (identical) off-diagonal pair and keeps [`IntegrationPoint`](crate::state::IntegrationPoint)
/// compact.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SymTensor2 {
    data: [f64; 6],
}

impl SymTensor2 {
    pub const ZERO: SymTensor2 = SymTensor2 { data: [0.0; 6] };

    /// The identity tensor.
    pub fn identity() -> Self {
        SymTensor2 { data: [1.0, 0.0, 0.0, 1.0, 0.0, 1.0] }
    }

    pub fn from_diag(xx: f64, yy: f64, zz: f64) -> Self {
        SymTensor2 { data: [xx, 0.0, 0.0, yy, 0.0, zz] }
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[SYM_INDEX[i][j]]
    }

    #[inline]
    pub fn set(&mut self, i: usize, j: usize, value: f64) {
        self.data[SYM_INDEX[i][j]] = value;
    }

    #[inline]
    pub fn xx(&self) -> f64 { self.data[0] }
    #[inline]
    pub fn xy(&self) -> f64 { self.data[1] }
    #[inline]
    pub fn xz(&self) -> f64 { self.data[2] }
    #[inline]
    pub fn yy(&self) -> f64 { self.data[3] }
    #[inline]
    pub fn yz(&self) -> f64 { self.data[4] }
    #[inline]
    pub fn zz(&self) -> f64 { self.data[5] }

    /// `tr(A) = Axx + Ayy + Azz`.
    pub fn trace(&self) -> f64 {
        self.data[0] + self.data[3] + self.data[5]
    }

    /// `tr(A) / 3`, the mean (hydrostatic) normal component.
    pub fn third_trace(&self) -> f64 {
        self.trace() / 3.0
    }

    /// `dev(A) = A - third_trace(A) * I`.
    pub fn deviator(&self) -> SymTensor2 {
        let m = self.third_trace();
        SymTensor2 {
            data: [
                self.data[0] - m,
                self.data[1],
                self.data[2],
                self.data[3] - m,
                self.data[4],
                self.data[5] - m,
            ],
        }
    }

    /// Double contraction `A:B = sum_ij A_ij B_ij`, weighting the off-diagonal
    /// storage slots by 2 since each represents two (equal) tensor entries.
    pub fn double_contraction(&self, other: &SymTensor2) -> f64 {
        self.data[0] * other.data[0]
            + self.data[3] * other.data[3]
            + self.data[5] * other.data[5]
            + 2.0 * (self.data[1] * other.data[1]
                + self.data[2] * other.data[2]
                + self.data[4] * other.data[4])
    }

    pub fn double_product(&self, other: &SymTensor2) -> f64 {
        self.double_contraction(other)
    }

    /// Frobenius norm `sqrt(A:A)`.
    pub fn norm(&self) -> f64 {
        self.double_contraction(self).max(0.0).sqrt()
    }

    /// Von Mises equivalent stress `sqrt(3/2) * ||dev(sigma)||`.
    pub fn mises_equivalent(&self) -> f64 {
        SQRT_3_2 * self.deviator().norm()
    }

    pub fn as_dense(&self) -> Tensor2 {
        Tensor2::new(
            self.data[0], self.data[1], self.data[2],
            self.data[1], self.data[3], self.data[4],
            self.data[2], self.data[4], self.data[5],
        )
    }

    pub fn from_dense_symmetric_part(t: &Tensor2) -> Self {
        SymTensor2 {
            data: [
                t[(0, 0)],
                0.5 * (t[(0, 1)] + t[(1, 0)]),
                0.5 * (t[(0, 2)] + t[(2, 0)]),
                t[(1, 1)],
                0.5 * (t[(1, 2)] + t[(2, 1)]),
                t[(2, 2)],
            ],
        }
    }

    /// `R . self . R^T`, the push-forward of a symmetric tensor through an
    /// orthogonal rotation. Closed form: result is symmetric by construction.
    pub fn rotate_by(&self, r: &Tensor2) -> SymTensor2 {
        let rotated = r * self.as_dense() * r.transpose();
        SymTensor2::from_dense_symmetric_part(&rotated)
    }
}

impl std::ops::Add for SymTensor2 {
    type Output = SymTensor2;
    fn add(self, rhs: SymTensor2) -> SymTensor2 {
        let mut data = self.data;
        for i in 0..6 {
            data[i] += rhs.data[i];
        }
        SymTensor2 { data }
    }
}

impl std::ops::AddAssign for SymTensor2 {
    fn add_assign(&mut self, rhs: SymTensor2) {
        for i in 0..6 {
            self.data[i] += rhs.data[i];
        }
    }
}

impl std::ops::Sub for SymTensor2 {
    type Output = SymTensor2;
    fn sub(self, rhs: SymTensor2) -> SymTensor2 {
        let mut data = self.data;
        for i in 0..6 {
            data[i] -= rhs.data[i];
        }
        SymTensor2 { data }
    }
}

impl std::ops::Mul<f64> for SymTensor2 {
    type Output = SymTensor2;
    fn mul(self, rhs: f64) -> SymTensor2 {
        let mut data = self.data;
        for v in &mut data {
            *v *= rhs;
        }
        SymTensor2 { data }
    }
}

impl std::ops::Mul<SymTensor2> for f64 {
    type Output = SymTensor2;
    fn mul(self, rhs: SymTensor2) -> SymTensor2 {
        rhs * self
    }
}

pub const SQRT_2_3: f64 = 0.816_496_580_927_726; // sqrt(2/3)
pub const SQRT_3_2: f64 = 1.224_744_871_391_589; // sqrt(3/2)

/// Maximum number of Jacobi rotations before [`polar_decompose_ln_u`] gives up.
const MAX_JACOBI_SWEEPS: usize = 30;
/// Convergence threshold on the largest remaining off-diagonal magnitude.
const JACOBI_TOLERANCE: f64 = 1e-10;

/// Result of a polar decomposition: `F = R * U` with `R` orthogonal and `U`
/// symmetric positive-definite.
pub struct PolarDecomposition {
    pub r: Tensor2,
    pub ln_u: SymTensor2,
    pub u: SymTensor2,
}

/// Polar-decompose `f = r * u` via rotation-of-axes Jacobi iteration on
/// `c = f^T f`, returning both `u` and `ln(u)`.
///
/// At each iteration the largest-magnitude off-diagonal entry of `c` is
/// zeroed by a planar (Givens) rotation; the accumulated rotation
/// diagonalizes `c` into eigenvalues `lambda_i > 0` with eigenvectors
/// `q_i`, from which
/// `u = sum sqrt(lambda_i) q_i ⊗ q_i`,
/// `ln(u) = sum (1/2 ln lambda_i) q_i ⊗ q_i`,
/// and `r = f . u^{-1}` is recovered directly from the eigenbasis without a
/// separate matrix inverse.
pub fn polar_decompose(f: &Tensor2) -> Result<PolarDecomposition, DynelaError> {
    let mut c = SymTensor2::from_dense_symmetric_part(&(f.transpose() * f));
    let mut q = Tensor2::identity();

    let mut converged = false;
    for _ in 0..MAX_JACOBI_SWEEPS {
        let (p, qi, max_off) = largest_off_diagonal(&c);
        if max_off < JACOBI_TOLERANCE {
            converged = true;
            break;
        }

        let app = c.get(p, p);
        let aqq = c.get(qi, qi);
        let apq = c.get(p, qi);

        let alpha = (aqq - app) / (2.0 * apq);
        let theta = if alpha != 0.0 {
            let sign = if alpha > 0.0 { 1.0 } else { -1.0 };
            1.0 / (alpha + sign * (alpha * alpha + 1.0).sqrt())
        } else {
            1.0
        };
        let c_theta = 1.0 / (1.0 + theta * theta).sqrt();
        let s_theta = theta * c_theta;

        let mut rot = Tensor2::identity();
        rot[(p, p)] = c_theta;
        rot[(qi, qi)] = c_theta;
        rot[(p, qi)] = s_theta;
        rot[(qi, p)] = -s_theta;

        let c_dense = rot.transpose() * c.as_dense() * rot;
        c = SymTensor2::from_dense_symmetric_part(&c_dense);
        q = q * rot;
    }

    if !converged {
        return Err(DynelaError::NonConvergentDecomposition {
            sweeps: MAX_JACOBI_SWEEPS,
        });
    }

    let lambda = [c.xx().max(0.0), c.yy().max(0.0), c.zz().max(0.0)];
    let sqrt_lambda: Vec3 = Vec3::new(lambda[0].sqrt(), lambda[1].sqrt(), lambda[2].sqrt());
    let ln_lambda: Vec3 = Vec3::new(
        0.5 * lambda[0].ln(),
        0.5 * lambda[1].ln(),
        0.5 * lambda[2].ln(),
    );

    let mut u = Tensor2::zeros();
    let mut ln_u = Tensor2::zeros();
    let mut u_inv = Tensor2::zeros();
    for i in 0..3 {
        let qi = q.column(i);
        let outer = qi * qi.transpose();
        u += sqrt_lambda[i] * outer;
        ln_u += ln_lambda[i] * outer;
        u_inv += outer / sqrt_lambda[i];
    }

    let r = f * u_inv;

    Ok(PolarDecomposition {
        r,
        ln_u: SymTensor2::from_dense_symmetric_part(&ln_u),
        u: SymTensor2::from_dense_symmetric_part(&u),
    })
}

/// Find the off-diagonal pair `(p, q)` (`p < q`) of `c` with the largest
/// magnitude, returning that magnitude alongside the indices.
fn largest_off_diagonal(c: &SymTensor2) -> (usize, usize, f64) {
    let candidates = [(0usize, 1usize, c.xy().abs()), (0, 2, c.xz().abs()), (1, 2, c.yz().abs())];
    candidates
        .into_iter()
        .max_by(|a, b| a.2.partial_cmp(&b.2).unwrap())
        .unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn identity_deformation_gradient_has_zero_strain_and_identity_rotation() {
        let f = Tensor2::identity();
        let decomp = polar_decompose(&f).unwrap();
        assert_relative_eq!(decomp.ln_u.norm(), 0.0, epsilon = 1e-12);
        assert_relative_eq!(decomp.r, Tensor2::identity(), epsilon = 1e-12);
    }

    #[test]
    fn polar_decomposition_round_trip() {
        // Combine a stretch with a rotation: F = R0 * U0.
        let u0 = Tensor2::new(1.2, 0.05, 0.0, 0.05, 0.9, 0.0, 0.0, 0.0, 1.05);
        let theta = 0.3f64;
        let r0 = Tensor2::new(
            theta.cos(), -theta.sin(), 0.0,
            theta.sin(), theta.cos(), 0.0,
            0.0, 0.0, 1.0,
        );
        let f = r0 * u0;

        let decomp = polar_decompose(&f).unwrap();

        assert_relative_eq!(decomp.r * decomp.u.as_dense(), f, epsilon = 1e-8);
        assert_relative_eq!(decomp.r.transpose() * decomp.r, Tensor2::identity(), epsilon = 1e-8);

        let expm_ln_u = matrix_exp_sym(&decomp.ln_u);
        assert_relative_eq!(decomp.r * expm_ln_u, f, epsilon = 1e-6);
    }

    /// Matrix exponential of a symmetric tensor via its dense eigen-decomposition,
    /// used only to check the `R . expm(lnU) = F` test property.
    fn matrix_exp_sym(t: &SymTensor2) -> Tensor2 {
        let eig = nalgebra::SymmetricEigen::new(t.as_dense());
        let mut result = Tensor2::zeros();
        for i in 0..3 {
            let v = eig.eigenvectors.column(i);
            result += eig.eigenvalues[i].exp() * (v * v.transpose());
        }
        result
    }

    #[test]
    fn deviator_is_traceless() {
        let s = SymTensor2 { data: [10.0, 1.0, 2.0, 20.0, 3.0, 30.0] };
        assert_relative_eq!(s.deviator().trace(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn rotate_by_identity_is_noop() {
        let s = SymTensor2 { data: [10.0, 1.0, 2.0, 20.0, 3.0, 30.0] };
        let rotated = s.rotate_by(&Tensor2::identity());
        assert_relative_eq!(rotated.xx(), s.xx(), epsilon = 1e-12);
        assert_relative_eq!(rotated.xy(), s.xy(), epsilon = 1e-12);
    }
}

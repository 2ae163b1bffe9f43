// ─────────────────────────────────────────────────────────────────────
// SCPN Halo Dynamo — Free Decay Modes
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Free decay modes of a conducting unit sphere in vacuum.
//!
//! Each mode of spherical-harmonic degree l has a radial profile
//!   Q(r) = r^(-1/2) J_{l+1/2}(k r)        r <= 1
//!   Q(r) = Q(1) r^(-(l+1))                r > 1
//! and, with X = d(rQ)/dr,
//!   poloidal: B_r = C A(θ) Q / r,  B_θ = C A'(θ) X / (l(l+1) r),  B_φ = 0
//!   toroidal: B_r = B_θ = 0,       B_φ = C T(θ) Q
//! where A is proportional to P_l(cos θ) and T to -dP_l/dθ.
//!
//! Interior values use r^(-1/2) J_{l+1/2}(kr) = sqrt(2k/π) j_l(kr), with
//! j_l from its power series at small argument, so the removable
//! singularity at kr → 0 never divides by zero. X follows from
//! d(r j_l(kr))/dr = j_l(y) + y j_l'(y), y = kr.
//!
//! Poloidal wavenumbers are roots of j_{l-1} (B_θ continuous at r = 1),
//! toroidal ones roots of j_l (B_φ vanishes at r = 1).

use dynamo_math::bessel::{bessel_j_half, spherical_jn, spherical_jn_derivative};
use dynamo_types::constants::{
    ANTISYMMETRIC_NORMALIZATION, J0_ROOT_1, J0_ROOT_2, J1_ROOT_1, J2_ROOT_1, J3_ROOT_1,
    MODES_PER_FAMILY, SYMMETRIC_NORMALIZATION,
};
use dynamo_types::error::{DynamoError, DynamoResult};
use dynamo_types::state::{SphericalGrid, VectorField};
use ndarray::{Array, Dimension, Zip};
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

/// Equatorial symmetry class of a mode family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModeSymmetry {
    Symmetric,
    Antisymmetric,
}

impl ModeSymmetry {
    /// Family selected by the `symmetric_field` configuration flag.
    pub fn from_symmetric_flag(symmetric: bool) -> Self {
        if symmetric {
            ModeSymmetry::Symmetric
        } else {
            ModeSymmetry::Antisymmetric
        }
    }

    fn prefix(self) -> char {
        match self {
            ModeSymmetry::Symmetric => 's',
            ModeSymmetry::Antisymmetric => 'a',
        }
    }
}

impl fmt::Display for ModeSymmetry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModeSymmetry::Symmetric => f.write_str("symmetric"),
            ModeSymmetry::Antisymmetric => f.write_str("antisymmetric"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModeParity {
    /// Meridional field: B_φ = 0.
    Poloidal,
    /// Azimuthal field: B_r = B_θ = 0.
    Toroidal,
}

/// Normalization constant and wavenumber of one mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModeParams {
    pub c: f64,
    pub k: f64,
}

impl ModeParams {
    pub fn new(c: f64, k: f64) -> DynamoResult<Self> {
        let params = ModeParams { c, k };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> DynamoResult<()> {
        if !self.c.is_finite() {
            return Err(DynamoError::ConfigError(format!(
                "mode normalization must be finite, got {}",
                self.c
            )));
        }
        if !self.k.is_finite() || self.k <= 0.0 {
            return Err(DynamoError::ConfigError(format!(
                "mode wavenumber must be finite and > 0, got {}",
                self.k
            )));
        }
        Ok(())
    }

    /// Free decay eigenvalue γ = -k².
    pub fn gamma(&self) -> f64 {
        -self.k * self.k
    }
}

/// One entry of the fixed mode list: `a_1..a_4` or `s_1..s_4`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModeDescriptor {
    symmetry: ModeSymmetry,
    index: usize,
}

impl ModeDescriptor {
    /// `index` is 1-based, as in the mode labels.
    pub fn new(symmetry: ModeSymmetry, index: usize) -> DynamoResult<Self> {
        if index == 0 || index > MODES_PER_FAMILY {
            return Err(DynamoError::UnsupportedMode {
                symmetry: symmetry.to_string(),
                index,
            });
        }
        Ok(ModeDescriptor { symmetry, index })
    }

    /// All modes of a family, in their fixed order.
    pub fn family(symmetry: ModeSymmetry) -> Vec<ModeDescriptor> {
        (1..=MODES_PER_FAMILY)
            .map(|index| ModeDescriptor { symmetry, index })
            .collect()
    }

    /// The first `count` modes of a family.
    pub fn leading(symmetry: ModeSymmetry, count: usize) -> DynamoResult<Vec<ModeDescriptor>> {
        if count == 0 || count > MODES_PER_FAMILY {
            return Err(DynamoError::ConfigError(format!(
                "requested {count} {symmetry} modes, only 1..={MODES_PER_FAMILY} are available"
            )));
        }
        let mut modes = Self::family(symmetry);
        modes.truncate(count);
        Ok(modes)
    }

    pub fn symmetry(&self) -> ModeSymmetry {
        self.symmetry
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn parity(&self) -> ModeParity {
        match (self.symmetry, self.index) {
            (ModeSymmetry::Antisymmetric, 3)
            | (ModeSymmetry::Symmetric, 2)
            | (ModeSymmetry::Symmetric, 4) => ModeParity::Toroidal,
            _ => ModeParity::Poloidal,
        }
    }

    /// Spherical-harmonic degree l.
    pub fn degree(&self) -> usize {
        match (self.symmetry, self.index) {
            (ModeSymmetry::Antisymmetric, 1) | (ModeSymmetry::Antisymmetric, 4) => 1,
            (ModeSymmetry::Antisymmetric, 2) => 3,
            (ModeSymmetry::Antisymmetric, _) => 2,
            (ModeSymmetry::Symmetric, 1) => 2,
            (ModeSymmetry::Symmetric, 2) => 1,
            (ModeSymmetry::Symmetric, 3) => 4,
            (ModeSymmetry::Symmetric, _) => 3,
        }
    }

    pub fn default_params(&self) -> ModeParams {
        let slot = self.index - 1;
        let (c, k) = match self.symmetry {
            ModeSymmetry::Antisymmetric => (
                ANTISYMMETRIC_NORMALIZATION[slot],
                [J0_ROOT_1, J2_ROOT_1, J2_ROOT_1, J0_ROOT_2][slot],
            ),
            ModeSymmetry::Symmetric => (
                SYMMETRIC_NORMALIZATION[slot],
                [J1_ROOT_1, J1_ROOT_1, J3_ROOT_1, J3_ROOT_1][slot],
            ),
        };
        ModeParams { c, k }
    }

    pub fn label(&self) -> String {
        format!("{}_{}", self.symmetry.prefix(), self.index)
    }

    /// Angular factors at (sin θ, cos θ).
    ///
    /// Poloidal: `(A, A'/(l(l+1)))`, the B_r and B_θ patterns.
    /// Toroidal: `(T, 0)`.
    fn angular(&self, s: f64, c: f64) -> (f64, f64) {
        let c2 = c * c;
        match (self.symmetry, self.index) {
            (ModeSymmetry::Antisymmetric, 1) | (ModeSymmetry::Antisymmetric, 4) => (2.0 * c, -s),
            (ModeSymmetry::Antisymmetric, 2) => {
                (4.0 * c * (5.0 * c2 - 3.0), -s * (5.0 * c2 - 1.0))
            }
            (ModeSymmetry::Antisymmetric, _) => (s * c, 0.0),
            (ModeSymmetry::Symmetric, 1) => (3.0 * c2 - 1.0, -s * c),
            (ModeSymmetry::Symmetric, 2) => (s, 0.0),
            (ModeSymmetry::Symmetric, 3) => (
                35.0 * c2 * c2 - 30.0 * c2 + 3.0,
                s * c * (3.0 - 7.0 * c2),
            ),
            (ModeSymmetry::Symmetric, _) => (3.0 * s * (5.0 * c2 - 1.0), 0.0),
        }
    }

    fn assemble(&self, params: &ModeParams, q: f64, x: f64, r: f64, theta: f64) -> [f64; 3] {
        let (s, c) = theta.sin_cos();
        let (pattern, polar) = self.angular(s, c);
        match self.parity() {
            ModeParity::Poloidal => [
                params.c * pattern * q / r,
                params.c * polar * x / r,
                0.0,
            ],
            ModeParity::Toroidal => [0.0, 0.0, params.c * pattern * q],
        }
    }
}

impl fmt::Display for ModeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

impl FromStr for ModeDescriptor {
    type Err = DynamoError;

    /// Parses `a_1`, `s_3`, ... (the underscore is optional).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.trim().chars();
        let symmetry = match chars.next() {
            Some('a') | Some('A') => ModeSymmetry::Antisymmetric,
            Some('s') | Some('S') => ModeSymmetry::Symmetric,
            _ => {
                return Err(DynamoError::ConfigError(format!(
                    "unknown mode label '{s}'"
                )))
            }
        };
        let digits = chars.as_str().trim_start_matches('_');
        let index = digits
            .parse::<usize>()
            .map_err(|_| DynamoError::ConfigError(format!("unknown mode label '{s}'")))?;
        ModeDescriptor::new(symmetry, index)
    }
}

/// Q and X inside the sphere.
fn interior_radial(l: usize, k: f64, r: f64) -> (f64, f64) {
    let y = k * r;
    let q = bessel_j_half(l, y) / r.sqrt();
    let x = (2.0 * k / PI).sqrt() * (spherical_jn(l, y) + y * spherical_jn_derivative(l, y));
    (q, x)
}

/// Q and X outside the sphere: the boundary value carried by r^(-(l+1)).
fn exterior_radial(l: usize, k: f64, r: f64) -> (f64, f64) {
    let boundary = bessel_j_half(l, k);
    let q = boundary * r.powi(-(l as i32 + 1));
    (q, -(l as f64) * q)
}

/// Interior solution at one point, valid for 0 < r <= 1.
pub fn evaluate_interior(mode: ModeDescriptor, params: &ModeParams, r: f64, theta: f64) -> [f64; 3] {
    let (q, x) = interior_radial(mode.degree(), params.k, r);
    mode.assemble(params, q, x, r, theta)
}

/// Exterior solution at one point, valid for r >= 1.
pub fn evaluate_exterior(mode: ModeDescriptor, params: &ModeParams, r: f64, theta: f64) -> [f64; 3] {
    let (q, x) = exterior_radial(mode.degree(), params.k, r);
    mode.assemble(params, q, x, r, theta)
}

/// `[B_r, B_θ, B_φ]` at one point. The modes are axisymmetric, so φ
/// does not enter.
pub fn evaluate_point(mode: ModeDescriptor, params: &ModeParams, r: f64, theta: f64) -> [f64; 3] {
    if r <= 1.0 {
        evaluate_interior(mode, params, r, theta)
    } else {
        evaluate_exterior(mode, params, r, theta)
    }
}

fn check_coordinates<D: Dimension>(
    r: &Array<f64, D>,
    theta: &Array<f64, D>,
    phi: &Array<f64, D>,
) -> DynamoResult<()> {
    for (name, c) in [("theta", theta), ("phi", phi)] {
        if c.shape() != r.shape() {
            return Err(DynamoError::ShapeMismatch {
                context: format!("mode coordinates ({name} vs r)"),
                expected: r.shape().to_vec(),
                found: c.shape().to_vec(),
            });
        }
    }
    if r.is_empty() {
        return Err(DynamoError::DomainError(format!(
            "mode evaluation grid has no points (shape {:?})",
            r.shape()
        )));
    }
    Ok(())
}

fn check_point(r: f64, theta: f64) -> DynamoResult<()> {
    if !(r > 0.0 && r.is_finite()) {
        return Err(DynamoError::DomainError(format!(
            "mode evaluation requires finite r > 0, got r = {r}"
        )));
    }
    if !theta.is_finite() {
        return Err(DynamoError::DomainError(format!(
            "mode evaluation requires finite theta, got {theta}"
        )));
    }
    Ok(())
}

/// Evaluate a mode with its default (C, k) on co-indexed coordinate arrays.
pub fn evaluate_mode<D: Dimension>(
    mode: ModeDescriptor,
    r: &Array<f64, D>,
    theta: &Array<f64, D>,
    phi: &Array<f64, D>,
) -> DynamoResult<VectorField<D>> {
    evaluate_mode_with(mode, &mode.default_params(), r, theta, phi)
}

/// Evaluate a mode with explicit (C, k). Fails on an empty grid or any r <= 0.
pub fn evaluate_mode_with<D: Dimension>(
    mode: ModeDescriptor,
    params: &ModeParams,
    r: &Array<f64, D>,
    theta: &Array<f64, D>,
    phi: &Array<f64, D>,
) -> DynamoResult<VectorField<D>> {
    params.validate()?;
    check_coordinates(r, theta, phi)?;
    for (&rv, &tv) in r.iter().zip(theta.iter()) {
        check_point(rv, tv)?;
    }
    let packed = Zip::from(r)
        .and(theta)
        .map_collect(|&rv, &tv| evaluate_point(mode, params, rv, tv));
    Ok(VectorField::unpack(&packed))
}

/// Evaluate only where `mask` is true; other points are zero and are not
/// checked against the domain.
pub fn evaluate_mode_masked<D: Dimension>(
    mode: ModeDescriptor,
    params: &ModeParams,
    r: &Array<f64, D>,
    theta: &Array<f64, D>,
    phi: &Array<f64, D>,
    mask: &Array<bool, D>,
) -> DynamoResult<VectorField<D>> {
    params.validate()?;
    check_coordinates(r, theta, phi)?;
    if mask.shape() != r.shape() {
        return Err(DynamoError::ShapeMismatch {
            context: "mode evaluation mask".to_string(),
            expected: r.shape().to_vec(),
            found: mask.shape().to_vec(),
        });
    }
    for ((&rv, &tv), &m) in r.iter().zip(theta.iter()).zip(mask.iter()) {
        if m {
            check_point(rv, tv)?;
        }
    }
    let packed = Zip::from(r).and(theta).and(mask).map_collect(|&rv, &tv, &m| {
        if m {
            evaluate_point(mode, params, rv, tv)
        } else {
            [0.0; 3]
        }
    });
    Ok(VectorField::unpack(&packed))
}

/// Evaluate a mode on the meshgrid of a spherical grid.
pub fn evaluate_on_grid(
    mode: ModeDescriptor,
    params: &ModeParams,
    grid: &SphericalGrid,
) -> DynamoResult<VectorField> {
    evaluate_mode_with(mode, params, &grid.rr, &grid.tt, &grid.pp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dynamo_math::bessel::spherical_jn_zero;
    use ndarray::{array, Array1, Array3};

    fn all_modes() -> Vec<ModeDescriptor> {
        let mut modes = ModeDescriptor::family(ModeSymmetry::Antisymmetric);
        modes.extend(ModeDescriptor::family(ModeSymmetry::Symmetric));
        modes
    }

    #[test]
    fn test_descriptor_rejects_unknown_index() {
        for index in [0, 5, 9] {
            let err = ModeDescriptor::new(ModeSymmetry::Antisymmetric, index).unwrap_err();
            assert!(matches!(err, DynamoError::UnsupportedMode { .. }));
            assert!(err.is_configuration());
        }
    }

    #[test]
    fn test_descriptor_labels() {
        let a1: ModeDescriptor = "a_1".parse().unwrap();
        assert_eq!(a1.symmetry(), ModeSymmetry::Antisymmetric);
        assert_eq!(a1.index(), 1);
        let s4: ModeDescriptor = "s4".parse().unwrap();
        assert_eq!(s4.label(), "s_4");
        assert!(matches!(
            "x_1".parse::<ModeDescriptor>(),
            Err(DynamoError::ConfigError(_))
        ));
        assert!(matches!(
            "a_7".parse::<ModeDescriptor>(),
            Err(DynamoError::UnsupportedMode { .. })
        ));
    }

    #[test]
    fn test_leading_modes_bounds() {
        let modes = ModeDescriptor::leading(ModeSymmetry::Symmetric, 3).unwrap();
        assert_eq!(modes.len(), 3);
        assert_eq!(modes[2].label(), "s_3");
        assert!(ModeDescriptor::leading(ModeSymmetry::Symmetric, 5).is_err());
        assert!(ModeDescriptor::leading(ModeSymmetry::Antisymmetric, 0).is_err());
    }

    #[test]
    fn test_parity_table() {
        let toroidal: Vec<String> = all_modes()
            .into_iter()
            .filter(|m| m.parity() == ModeParity::Toroidal)
            .map(|m| m.label())
            .collect();
        assert_eq!(toroidal, vec!["a_3", "s_2", "s_4"]);
    }

    #[test]
    fn test_wavenumbers_are_bessel_roots() {
        for mode in all_modes() {
            let l = mode.degree();
            let k = mode.default_params().k;
            let (order, nth) = match mode.parity() {
                ModeParity::Poloidal => (l - 1, if mode.label() == "a_4" { 2 } else { 1 }),
                ModeParity::Toroidal => (l, 1),
            };
            let root = spherical_jn_zero(order, nth).unwrap();
            assert!((root - k).abs() < 1e-10, "{mode}: k={k} root={root}");
        }
    }

    #[test]
    fn test_gamma_is_minus_k_squared() {
        let p = ModeDescriptor::new(ModeSymmetry::Antisymmetric, 1)
            .unwrap()
            .default_params();
        assert!((p.gamma() + PI * PI).abs() < 1e-12);
    }

    #[test]
    fn test_continuity_at_unit_sphere() {
        let thetas = Array1::linspace(0.0, PI, 13);
        for mode in all_modes() {
            let params = mode.default_params();
            for &theta in thetas.iter() {
                let inside = evaluate_interior(mode, &params, 1.0, theta);
                let outside = evaluate_exterior(mode, &params, 1.0, theta);
                for c in 0..3 {
                    let scale = inside[c].abs().max(outside[c].abs()).max(1e-12);
                    assert!(
                        (inside[c] - outside[c]).abs() / scale < 1e-6,
                        "{mode} component {c} at theta={theta}: {} vs {}",
                        inside[c],
                        outside[c]
                    );
                }
            }
        }
    }

    #[test]
    fn test_continuity_across_boundary() {
        let eps = 1e-7;
        for mode in all_modes() {
            let params = mode.default_params();
            let below = evaluate_point(mode, &params, 1.0 - eps, 0.7);
            let above = evaluate_point(mode, &params, 1.0 + eps, 0.7);
            for c in 0..3 {
                assert!((below[c] - above[c]).abs() < 1e-4, "{mode} component {c}");
            }
        }
    }

    #[test]
    fn test_parity_zero_components() {
        let r = Array1::linspace(0.05, 2.0, 40);
        let theta = Array1::linspace(0.1, 3.0, 40);
        let phi = Array1::zeros(40);
        for mode in all_modes() {
            let b = evaluate_mode(mode, &r, &theta, &phi).unwrap();
            match mode.parity() {
                ModeParity::Toroidal => {
                    assert!(b.r.iter().all(|&v| v == 0.0));
                    assert!(b.theta.iter().all(|&v| v == 0.0));
                    assert!(b.phi.iter().any(|&v| v != 0.0));
                }
                ModeParity::Poloidal => {
                    assert!(b.phi.iter().all(|&v| v == 0.0));
                    assert!(b.r.iter().any(|&v| v != 0.0));
                }
            }
        }
    }

    #[test]
    fn test_finite_near_origin() {
        let grid = SphericalGrid::new([60, 30, 1], [1e-9, 2.0], [0.1, PI], [0.0, 0.0]).unwrap();
        for mode in all_modes() {
            let b = evaluate_on_grid(mode, &mode.default_params(), &grid).unwrap();
            assert!(b.is_finite(), "{mode} produced non-finite values");
        }
    }

    #[test]
    fn test_a1_regular_at_centre() {
        // j_1(y) ~ y/3, so B_r → 2C sqrt(2k/π) k/3 along the axis.
        let mode = ModeDescriptor::new(ModeSymmetry::Antisymmetric, 1).unwrap();
        let p = mode.default_params();
        let b = evaluate_point(mode, &p, 1e-8, 0.0);
        let limit = 2.0 * p.c * (2.0 * p.k / PI).sqrt() * p.k / 3.0;
        assert!((b[0] - limit).abs() / limit < 1e-6);
    }

    #[test]
    fn test_a1_reference_point() {
        let mode = ModeDescriptor::new(ModeSymmetry::Antisymmetric, 1).unwrap();
        let p = mode.default_params();
        let (r, theta) = (0.5, PI / 2.0);
        let b = evaluate_mode(mode, &array![r], &array![theta], &array![0.0]).unwrap();

        let y = p.k * r;
        let j32 = (2.0 / (PI * y)).sqrt() * (y.sin() / y - y.cos());
        let q = r.powf(-0.5) * j32;
        let x = (2.0 / PI).sqrt() * (y * y * y.sin() - y.sin() + y * y.cos())
            / (p.k.powf(-0.5) * y * y);
        let br = p.c * (2.0 / r) * q * theta.cos();
        let btheta = p.c * (-theta.sin() / r) * x;

        assert_eq!(b.phi[0], 0.0);
        assert!(b.r[0].is_finite() && b.r[0] != 0.0);
        assert!(b.theta[0].is_finite() && b.theta[0] != 0.0);
        assert!((b.r[0] - br).abs() <= 1e-12 * br.abs());
        assert!((b.theta[0] - btheta).abs() <= 1e-12 * btheta.abs());
    }

    #[test]
    fn test_exterior_power_law() {
        for mode in all_modes() {
            let p = mode.default_params();
            let l = mode.degree() as i32;
            let b1 = evaluate_point(mode, &p, 1.5, 0.4);
            let b2 = evaluate_point(mode, &p, 2.0, 0.4);
            match mode.parity() {
                ModeParity::Poloidal => {
                    let ratio = (1.5f64 / 2.0).powi(l + 2);
                    assert!((b2[0] / b1[0] - ratio).abs() < 1e-12);
                    assert!((b2[1] / b1[1] - ratio).abs() < 1e-12);
                }
                ModeParity::Toroidal => {
                    // J_{l+1/2}(k) = 0: the toroidal field is confined.
                    assert!(b1[2].abs() < 1e-12 && b2[2].abs() < 1e-12);
                }
            }
        }
    }

    #[test]
    fn test_deterministic_evaluation() {
        let grid = SphericalGrid::new([15, 9, 3], [0.1, 2.0], [0.1, 3.0], [0.0, 6.0]).unwrap();
        let mode = ModeDescriptor::new(ModeSymmetry::Symmetric, 3).unwrap();
        let p = mode.default_params();
        let first = evaluate_on_grid(mode, &p, &grid).unwrap();
        let second = evaluate_on_grid(mode, &p, &grid).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_rejects_nonpositive_radius() {
        let mode = ModeDescriptor::new(ModeSymmetry::Symmetric, 1).unwrap();
        let err = evaluate_mode(mode, &array![0.5, 0.0], &array![1.0, 1.0], &array![0.0, 0.0])
            .unwrap_err();
        assert!(matches!(err, DynamoError::DomainError(_)));
        let err = evaluate_mode(mode, &array![-1.0], &array![1.0], &array![0.0]).unwrap_err();
        assert!(matches!(err, DynamoError::DomainError(_)));
    }

    #[test]
    fn test_rejects_empty_grid() {
        let mode = ModeDescriptor::new(ModeSymmetry::Antisymmetric, 1).unwrap();
        let empty = Array1::<f64>::zeros(0);
        let err = evaluate_mode(mode, &empty, &empty, &empty).unwrap_err();
        assert!(matches!(err, DynamoError::DomainError(_)));

        let mask = Array1::from_elem(0, true);
        let err = evaluate_mode_masked(mode, &mode.default_params(), &empty, &empty, &empty, &mask)
            .unwrap_err();
        assert!(matches!(err, DynamoError::DomainError(_)));

        let flat = Array3::<f64>::zeros((3, 0, 2));
        assert!(evaluate_mode(mode, &flat, &flat, &flat).is_err());
    }

    #[test]
    fn test_rejects_shape_mismatch() {
        let mode = ModeDescriptor::new(ModeSymmetry::Symmetric, 1).unwrap();
        let err = evaluate_mode(mode, &array![0.5, 1.0], &array![1.0], &array![0.0, 0.0])
            .unwrap_err();
        assert!(matches!(err, DynamoError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_rejects_bad_params() {
        let mode = ModeDescriptor::new(ModeSymmetry::Symmetric, 1).unwrap();
        let params = ModeParams { c: 1.0, k: -2.0 };
        assert!(evaluate_mode_with(mode, &params, &array![0.5], &array![1.0], &array![0.0]).is_err());
        assert!(ModeParams::new(f64::NAN, 1.0).is_err());
    }

    #[test]
    fn test_masked_evaluation() {
        let mode = ModeDescriptor::new(ModeSymmetry::Antisymmetric, 2).unwrap();
        let p = mode.default_params();
        let r = array![0.0, 0.5, 1.5];
        let theta = array![0.3, 0.3, 0.3];
        let phi = array![0.0, 0.0, 0.0];
        let mask = array![false, true, true];
        let b = evaluate_mode_masked(mode, &p, &r, &theta, &phi, &mask).unwrap();
        assert_eq!(b.r[0], 0.0);
        assert_eq!(b.theta[0], 0.0);
        let full = evaluate_point(mode, &p, 0.5, 0.3);
        assert_eq!(b.r[1], full[0]);
        assert_eq!(b.theta[1], full[1]);

        let all = array![true, true, true];
        assert!(evaluate_mode_masked(mode, &p, &r, &theta, &phi, &all).is_err());
    }

    #[test]
    fn test_arbitrary_dimension_matches_pointwise() {
        let mode = ModeDescriptor::new(ModeSymmetry::Symmetric, 2).unwrap();
        let p = ModeParams::new(2.0, 4.0).unwrap();
        let r = Array3::from_shape_fn((3, 2, 2), |(i, j, k)| 0.3 + 0.4 * i as f64 + 0.1 * (j + k) as f64);
        let theta = Array3::from_shape_fn((3, 2, 2), |(i, j, _)| 0.2 + 0.5 * (i + j) as f64);
        let phi = Array3::zeros((3, 2, 2));
        let b = evaluate_mode_with(mode, &p, &r, &theta, &phi).unwrap();
        for ((idx, &rv), &tv) in r.indexed_iter().zip(theta.iter()) {
            let expected = evaluate_point(mode, &p, rv, tv);
            assert_eq!(b.phi[idx], expected[2]);
        }
    }
}

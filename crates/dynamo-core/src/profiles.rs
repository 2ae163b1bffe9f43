// ─────────────────────────────────────────────────────────────────────
// SCPN Halo Dynamo — Alpha and Rotation Profiles
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Alpha-effect and rotation-velocity profiles sampled on the grid.
//!
//! Any closure `Fn(&Array3, &Array3, &Array3) -> ...` over the (r, θ, φ)
//! meshgrids is a profile; `SimpleAlpha` and `SimpleRotation` are the
//! built-in choices.

use dynamo_types::config::{AlphaProfileConfig, RotationProfileConfig};
use dynamo_types::error::{DynamoError, DynamoResult};
use dynamo_types::state::{SphericalGrid, VectorField};
use ndarray::{Array3, Zip};

/// Scalar alpha-effect α(r, θ, φ).
pub trait AlphaProfile {
    fn alpha(&self, r: &Array3<f64>, theta: &Array3<f64>, phi: &Array3<f64>) -> Array3<f64>;
}

/// Rotation velocity V(r, θ, φ) in spherical components.
pub trait RotationProfile {
    fn velocity(&self, r: &Array3<f64>, theta: &Array3<f64>, phi: &Array3<f64>) -> VectorField;
}

impl<F> AlphaProfile for F
where
    F: Fn(&Array3<f64>, &Array3<f64>, &Array3<f64>) -> Array3<f64>,
{
    fn alpha(&self, r: &Array3<f64>, theta: &Array3<f64>, phi: &Array3<f64>) -> Array3<f64> {
        self(r, theta, phi)
    }
}

impl<F> RotationProfile for F
where
    F: Fn(&Array3<f64>, &Array3<f64>, &Array3<f64>) -> VectorField,
{
    fn velocity(&self, r: &Array3<f64>, theta: &Array3<f64>, phi: &Array3<f64>) -> VectorField {
        self(r, theta, phi)
    }
}

/// α = α₀ cos θ inside the unit sphere, zero outside.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimpleAlpha {
    pub alpha0: f64,
}

impl From<&AlphaProfileConfig> for SimpleAlpha {
    fn from(cfg: &AlphaProfileConfig) -> Self {
        SimpleAlpha { alpha0: cfg.alpha0 }
    }
}

impl AlphaProfile for SimpleAlpha {
    fn alpha(&self, r: &Array3<f64>, theta: &Array3<f64>, _phi: &Array3<f64>) -> Array3<f64> {
        Zip::from(r)
            .and(theta)
            .map_collect(|&r, &t| if r <= 1.0 { self.alpha0 * t.cos() } else { 0.0 })
    }
}

/// Flat rotation curve with a linear rise near the axis:
/// V_φ = V₀ (1 − exp(−s / (s_v r_h))) / (1 − exp(−1 / s_v)), s = r sin θ.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimpleRotation {
    pub v0: f64,
    pub s_v: f64,
    pub r_h: f64,
}

impl From<&RotationProfileConfig> for SimpleRotation {
    fn from(cfg: &RotationProfileConfig) -> Self {
        SimpleRotation {
            v0: cfg.v0,
            s_v: cfg.s_v,
            r_h: cfg.r_h,
        }
    }
}

impl SimpleRotation {
    /// Azimuthal speed at cylindrical radius `s`.
    pub fn speed(&self, s: f64) -> f64 {
        let norm = -(-1.0 / self.s_v).exp_m1();
        self.v0 * -(-s / (self.s_v * self.r_h)).exp_m1() / norm
    }
}

impl RotationProfile for SimpleRotation {
    fn velocity(&self, r: &Array3<f64>, theta: &Array3<f64>, _phi: &Array3<f64>) -> VectorField {
        let vphi = Zip::from(r)
            .and(theta)
            .map_collect(|&r, &t| self.speed(r * t.sin()));
        VectorField {
            r: Array3::zeros(r.raw_dim()),
            theta: Array3::zeros(r.raw_dim()),
            phi: vphi,
        }
    }
}

/// Sample α on the grid, checking the output shape.
pub fn sample_alpha<A: AlphaProfile + ?Sized>(
    profile: &A,
    grid: &SphericalGrid,
) -> DynamoResult<Array3<f64>> {
    let alpha = profile.alpha(&grid.rr, &grid.tt, &grid.pp);
    if alpha.shape() != grid.rr.shape() {
        return Err(DynamoError::ShapeMismatch {
            context: "alpha profile".to_string(),
            expected: grid.rr.shape().to_vec(),
            found: alpha.shape().to_vec(),
        });
    }
    Ok(alpha)
}

/// Sample V on the grid, checking every component shape.
pub fn sample_rotation<V: RotationProfile + ?Sized>(
    profile: &V,
    grid: &SphericalGrid,
) -> DynamoResult<VectorField> {
    let v = profile.velocity(&grid.rr, &grid.tt, &grid.pp);
    for (name, c) in [("r", &v.r), ("theta", &v.theta), ("phi", &v.phi)] {
        if c.shape() != grid.rr.shape() {
            return Err(DynamoError::ShapeMismatch {
                context: format!("rotation profile {name} component"),
                expected: grid.rr.shape().to_vec(),
                found: c.shape().to_vec(),
            });
        }
    }
    Ok(v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn grid() -> SphericalGrid {
        SphericalGrid::new([9, 7, 1], [0.25, 2.0], [0.1, PI], [0.0, 0.0]).unwrap()
    }

    #[test]
    fn test_simple_alpha_confined_to_sphere() {
        let g = grid();
        let alpha = sample_alpha(&SimpleAlpha { alpha0: 2.0 }, &g).unwrap();
        for ((i, j, k), &a) in alpha.indexed_iter() {
            let r = g.rr[[i, j, k]];
            if r <= 1.0 {
                assert!((a - 2.0 * g.tt[[i, j, k]].cos()).abs() < 1e-15);
            } else {
                assert_eq!(a, 0.0);
            }
        }
    }

    #[test]
    fn test_simple_rotation_normalized_at_halo_radius() {
        let rot = SimpleRotation::from(&RotationProfileConfig::default());
        assert!((rot.speed(rot.r_h) - rot.v0).abs() < 1e-14);
        assert_eq!(rot.speed(0.0), 0.0);
        assert!(rot.speed(3.0) < rot.v0 / (1.0 - (-2.0f64).exp()) + 1e-12);
    }

    #[test]
    fn test_simple_rotation_is_azimuthal() {
        let g = grid();
        let rot = SimpleRotation {
            v0: 1.5,
            s_v: 0.3,
            r_h: 1.0,
        };
        let v = sample_rotation(&rot, &g).unwrap();
        assert!(v.r.iter().all(|&x| x == 0.0));
        assert!(v.theta.iter().all(|&x| x == 0.0));
        assert!(v.phi.iter().all(|&x| x >= 0.0 && x.is_finite()));
    }

    #[test]
    fn test_closure_profiles() {
        let g = grid();
        let uniform = |r: &Array3<f64>, _: &Array3<f64>, _: &Array3<f64>| r.mapv(|_| 0.5);
        let alpha = sample_alpha(&uniform, &g).unwrap();
        assert!(alpha.iter().all(|&a| a == 0.5));

        let solid_body = |r: &Array3<f64>, t: &Array3<f64>, _: &Array3<f64>| VectorField {
            r: Array3::zeros(r.raw_dim()),
            theta: Array3::zeros(r.raw_dim()),
            phi: r * &t.mapv(f64::sin),
        };
        let v = sample_rotation(&solid_body, &g).unwrap();
        assert!((v.phi[[4, 3, 0]] - g.rr[[4, 3, 0]] * g.tt[[4, 3, 0]].sin()).abs() < 1e-15);
    }

    #[test]
    fn test_profile_shape_mismatch() {
        let g = grid();
        let wrong = |_: &Array3<f64>, _: &Array3<f64>, _: &Array3<f64>| Array3::<f64>::zeros((2, 2, 2));
        let err = sample_alpha(&wrong, &g).unwrap_err();
        assert!(matches!(err, DynamoError::ShapeMismatch { .. }));
        assert!(err.is_configuration());

        let wrong_v = |r: &Array3<f64>, _: &Array3<f64>, _: &Array3<f64>| VectorField {
            r: Array3::zeros(r.raw_dim()),
            theta: Array3::zeros((1, 1, 1)),
            phi: Array3::zeros(r.raw_dim()),
        };
        assert!(sample_rotation(&wrong_v, &g).is_err());
    }
}

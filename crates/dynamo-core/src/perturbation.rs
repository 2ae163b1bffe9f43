// ─────────────────────────────────────────────────────────────────────
// SCPN Halo Dynamo — Perturbation Operator
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Dynamo induction operator acting on a free decay mode.
//!
//!   alpha-omega:  W(B)_i = Ra (curl(αB)_i − curl(αB)_φ) + Ro curl(V×B)_i
//!   alpha2-omega: W(B)_i = Ra curl(αB)_i + Ro curl(V×B)_i
//!
//! Derivatives are finite differences on the spherical grid. Along the
//! polar axis sin θ is clamped away from zero, mirroring the radial clamp.

use dynamo_math::gradient::gradient_axis;
use dynamo_types::config::{DynamoNumbers, DynamoType};
use dynamo_types::error::{DynamoError, DynamoResult};
use dynamo_types::state::{SphericalAxis, SphericalGrid, VectorField};
use ndarray::{Array3, Axis, Dimension, Zip};

/// Minimum r used as a divisor.
const R_SAFE_MIN: f64 = 1e-12;

/// Minimum sin θ used as a divisor, reached only on the polar axis.
const SIN_SAFE_MIN: f64 = 1e-12;

fn check_shape(grid: &SphericalGrid, context: &str, field: &Array3<f64>) -> DynamoResult<()> {
    if field.shape() != grid.rr.shape() {
        return Err(DynamoError::ShapeMismatch {
            context: context.to_string(),
            expected: grid.rr.shape().to_vec(),
            found: field.shape().to_vec(),
        });
    }
    Ok(())
}

fn check_field(grid: &SphericalGrid, context: &str, field: &VectorField) -> DynamoResult<()> {
    for c in field.components() {
        check_shape(grid, context, c)?;
    }
    Ok(())
}

fn derivative(grid: &SphericalGrid, field: &Array3<f64>, axis: SphericalAxis) -> Array3<f64> {
    gradient_axis(field, Axis(axis.index()), grid.spacing(axis))
}

/// Curl of a vector field in spherical coordinates:
///
///   (∇×A)_r = [∂_θ(sin θ A_φ) − ∂_φ A_θ] / (r sin θ)
///   (∇×A)_θ = [∂_φ A_r / sin θ − ∂_r(r A_φ)] / r
///   (∇×A)_φ = [∂_r(r A_θ) − ∂_θ A_r] / r
///
/// φ derivatives vanish on an axisymmetric grid.
pub fn curl_spherical(grid: &SphericalGrid, a: &VectorField) -> DynamoResult<VectorField> {
    check_field(grid, "curl input", a)?;

    let (sin_t, cos_t) = (grid.tt.mapv(f64::sin), grid.tt.mapv(f64::cos));
    let sin_t = sin_t.mapv(|s| s.max(SIN_SAFE_MIN));
    let r_safe = grid.rr.mapv(|r| r.max(R_SAFE_MIN));

    // ∂_θ(sin θ A_φ) is expanded so that A_φ → 0 on the axis keeps the
    // cot θ term bounded.
    let d_theta_aphi = derivative(grid, &a.phi, SphericalAxis::Polar);
    let d_r_aphi = derivative(grid, &(&grid.rr * &a.phi), SphericalAxis::Radial);
    let d_r_atheta = derivative(grid, &(&grid.rr * &a.theta), SphericalAxis::Radial);
    let d_theta_ar = derivative(grid, &a.r, SphericalAxis::Polar);
    let d_phi_ar = derivative(grid, &a.r, SphericalAxis::Azimuthal);
    let d_phi_atheta = derivative(grid, &a.theta, SphericalAxis::Azimuthal);

    let mut curl_r = Zip::from(&a.phi)
        .and(&d_theta_aphi)
        .and(&sin_t)
        .and(&cos_t)
        .map_collect(|&ap, &dap, &s, &c| c * ap / s + dap);
    Zip::from(&mut curl_r)
        .and(&d_phi_atheta)
        .and(&sin_t)
        .and(&r_safe)
        .for_each(|v, &dat, &s, &r| *v = (*v - dat / s) / r);

    let curl_theta = Zip::from(&d_phi_ar)
        .and(&d_r_aphi)
        .and(&r_safe)
        .and(&sin_t)
        .map_collect(|&a, &b, &r, &s| (a / s - b) / r);

    let curl_phi = Zip::from(&d_r_atheta)
        .and(&d_theta_ar)
        .and(&r_safe)
        .map_collect(|&a, &b, &r| (a - b) / r);

    Ok(VectorField {
        r: curl_r,
        theta: curl_theta,
        phi: curl_phi,
    })
}

/// Pointwise cross product `a × b` in an orthonormal (r, θ, φ) frame.
pub fn cross<D: Dimension>(a: &VectorField<D>, b: &VectorField<D>) -> DynamoResult<VectorField<D>> {
    if a.shape() != b.shape() {
        return Err(DynamoError::ShapeMismatch {
            context: "cross product operands".to_string(),
            expected: a.shape().to_vec(),
            found: b.shape().to_vec(),
        });
    }
    let r = Zip::from(&a.theta)
        .and(&a.phi)
        .and(&b.theta)
        .and(&b.phi)
        .map_collect(|&at, &ap, &bt, &bp| at * bp - ap * bt);
    let theta = Zip::from(&a.phi)
        .and(&a.r)
        .and(&b.phi)
        .and(&b.r)
        .map_collect(|&ap, &ar, &bp, &br| ap * br - ar * bp);
    let phi = Zip::from(&a.r)
        .and(&a.theta)
        .and(&b.r)
        .and(&b.theta)
        .map_collect(|&ar, &at, &br, &bt| ar * bt - at * br);
    Ok(VectorField { r, theta, phi })
}

/// Apply the dynamo perturbation operator to `b`.
///
/// `alpha` and `velocity` are the profiles sampled on `grid`. Every input
/// must share the grid shape.
pub fn perturbation_operator(
    grid: &SphericalGrid,
    b: &VectorField,
    alpha: &Array3<f64>,
    velocity: &VectorField,
    numbers: &DynamoNumbers,
) -> DynamoResult<VectorField> {
    numbers.validate()?;
    check_field(grid, "magnetic field", b)?;
    check_shape(grid, "alpha profile", alpha)?;
    check_field(grid, "rotation profile", velocity)?;

    let alpha_b = VectorField {
        r: &b.r * alpha,
        theta: &b.theta * alpha,
        phi: &b.phi * alpha,
    };
    let curl_ab = curl_spherical(grid, &alpha_b)?;
    let curl_vxb = curl_spherical(grid, &cross(velocity, b)?)?;

    let (ra, ro) = (numbers.ra, numbers.ro);
    let combine = |c: &Array3<f64>, w: &Array3<f64>| -> Array3<f64> {
        match numbers.dynamo_type {
            DynamoType::AlphaOmega => Zip::from(c)
                .and(&curl_ab.phi)
                .and(w)
                .map_collect(|&c, &cp, &w| ra * (c - cp) + ro * w),
            DynamoType::Alpha2Omega => Zip::from(c)
                .and(w)
                .map_collect(|&c, &w| ra * c + ro * w),
        }
    };

    Ok(VectorField {
        r: combine(&curl_ab.r, &curl_vxb.r),
        theta: combine(&curl_ab.theta, &curl_vxb.theta),
        phi: combine(&curl_ab.phi, &curl_vxb.phi),
    })
}

// ─────────────────────────────────────────────────────────────────────
// SCPN Halo Dynamo — Finite Differences
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Finite-difference derivatives along one axis of an n-dimensional array.
//!
//! Central differences in the interior, one-sided differences at the two
//! ends (the `numpy.gradient` convention).

use ndarray::{Array, Axis, Dimension, Zip};

/// Derivative of `field` along `axis` for uniform sample spacing `spacing`.
///
/// Returns zeros when the axis has a single sample or zero spacing: a
/// collapsed axis carries no variation (e.g. φ on an axisymmetric grid).
pub fn gradient_axis<D: Dimension>(field: &Array<f64, D>, axis: Axis, spacing: f64) -> Array<f64, D> {
    let mut out = Array::zeros(field.raw_dim());
    let n = field.len_of(axis);
    if n < 2 || spacing == 0.0 {
        return out;
    }

    Zip::from(out.lanes_mut(axis))
        .and(field.lanes(axis))
        .for_each(|mut d, f| {
            d[0] = (f[1] - f[0]) / spacing;
            d[n - 1] = (f[n - 1] - f[n - 2]) / spacing;
            for i in 1..n - 1 {
                d[i] = (f[i + 1] - f[i - 1]) / (2.0 * spacing);
            }
        });
    out
}

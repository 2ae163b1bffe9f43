// ─────────────────────────────────────────────────────────────────────
// SCPN Halo Dynamo — Quadrature
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Composite Simpson quadrature on uniformly spaced samples.
//!
//! The composite rule is fourth order only for an odd sample count. For
//! even counts the averaged variant integrates the first (or last)
//! interval by the trapezoid rule and averages both choices; it is only
//! applied when the caller asks for it explicitly.

use dynamo_types::error::{DynamoError, DynamoResult};
use ndarray::{Array, ArrayView1, Axis, RemoveAxis};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimpsonRule {
    /// Odd sample counts only.
    Strict,
    /// Any count >= 2; even counts use the averaged variant.
    Averaged,
}

fn check_samples(n: usize, rule: SimpsonRule) -> DynamoResult<()> {
    match rule {
        SimpsonRule::Strict if n < 3 || n % 2 == 0 => Err(DynamoError::DomainError(format!(
            "strict Simpson rule needs an odd sample count >= 3, got {n}"
        ))),
        SimpsonRule::Averaged if n < 2 => Err(DynamoError::DomainError(format!(
            "Simpson rule needs at least 2 samples, got {n}"
        ))),
        _ => Ok(()),
    }
}

/// Composite Simpson sum over `y[start..end]`, `end - start` odd.
fn simpson_odd(y: &ArrayView1<f64>, start: usize, end: usize, dx: f64) -> f64 {
    let n = end - start;
    if n < 3 {
        return 0.0;
    }
    let mut sum = y[start] + y[end - 1];
    for i in 1..n - 1 {
        let w = if i % 2 == 1 { 4.0 } else { 2.0 };
        sum += w * y[start + i];
    }
    sum * dx / 3.0
}

fn simpson_view(y: &ArrayView1<f64>, dx: f64) -> f64 {
    let n = y.len();
    if n % 2 == 1 {
        return simpson_odd(y, 0, n, dx);
    }
    let first = simpson_odd(y, 0, n - 1, dx) + 0.5 * dx * (y[n - 2] + y[n - 1]);
    let last = 0.5 * dx * (y[0] + y[1]) + simpson_odd(y, 1, n, dx);
    0.5 * (first + last)
}

/// Integrate uniformly spaced samples with spacing `dx`.
pub fn simpson(y: ArrayView1<f64>, dx: f64, rule: SimpsonRule) -> DynamoResult<f64> {
    check_samples(y.len(), rule)?;
    Ok(simpson_view(&y, dx))
}

/// Integrate along `axis`, removing it from the result.
pub fn simpson_axis<D: RemoveAxis>(
    values: &Array<f64, D>,
    axis: Axis,
    dx: f64,
    rule: SimpsonRule,
) -> DynamoResult<Array<f64, D::Smaller>> {
    check_samples(values.len_of(axis), rule)?;
    Ok(values.map_axis(axis, |lane| simpson_view(&lane, dx)))
}

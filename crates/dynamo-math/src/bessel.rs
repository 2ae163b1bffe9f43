// ─────────────────────────────────────────────────────────────────────
// SCPN Halo Dynamo — Spherical Bessel Functions
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Spherical Bessel functions of the first kind, j_n(x).
//!
//! Closed forms like j_2(x) = (3/x³ − 1/x) sin x − 3 cos x / x² cancel
//! catastrophically as x → 0. Below `max(1, n)` the ascending power series
//!
//!   j_n(x) = xⁿ Σ_k (−x²/2)ᵏ / (k! (2n+2k+1)!!)
//!
//! is used instead; above it, upward recurrence from j_0 and j_1 is stable.

use dynamo_types::error::{DynamoError, DynamoResult};
use std::f64::consts::PI;

const SERIES_MAX_TERMS: usize = 60;

/// Scan step when bracketing Bessel roots. Consecutive roots are ~π apart.
const ROOT_SCAN_STEP: f64 = 0.05;

const ROOT_BISECTION_ITERS: usize = 200;

/// j_n(x) via the ascending series. Accurate for |x| up to a few times n.
fn spherical_jn_series(n: usize, x: f64) -> f64 {
    let mut prefactor = 1.0;
    for m in 0..n {
        prefactor *= x / (2 * m + 3) as f64;
    }
    // prefactor = xⁿ / (2n+1)!!
    let half_x2 = -0.5 * x * x;
    let mut term = 1.0;
    let mut sum = 1.0;
    for k in 1..SERIES_MAX_TERMS {
        term *= half_x2 / (k * (2 * n + 2 * k + 1)) as f64;
        sum += term;
        if term.abs() <= f64::EPSILON * 1e-2 * sum.abs() {
            break;
        }
    }
    prefactor * sum
}

/// Spherical Bessel function j_n(x).
pub fn spherical_jn(n: usize, x: f64) -> f64 {
    if x.abs() < (n as f64).max(1.0) {
        return spherical_jn_series(n, x);
    }
    let (s, c) = x.sin_cos();
    let j0 = s / x;
    if n == 0 {
        return j0;
    }
    let j1 = s / (x * x) - c / x;
    let (mut prev, mut cur) = (j0, j1);
    for m in 1..n {
        let next = (2 * m + 1) as f64 / x * cur - prev;
        prev = cur;
        cur = next;
    }
    cur
}

/// Derivative j_n'(x), using the form without a 1/x factor so it stays
/// regular at the origin.
pub fn spherical_jn_derivative(n: usize, x: f64) -> f64 {
    if n == 0 {
        return -spherical_jn(1, x);
    }
    let nf = n as f64;
    (nf * spherical_jn(n - 1, x) - (nf + 1.0) * spherical_jn(n + 1, x)) / (2.0 * nf + 1.0)
}

/// Half-integer order Bessel function J_{n+1/2}(x) = √(2x/π) j_n(x), x >= 0.
pub fn bessel_j_half(n: usize, x: f64) -> f64 {
    (2.0 * x / PI).sqrt() * spherical_jn(n, x)
}

/// The `m`-th positive root of j_n (m starts at 1).
///
/// Brackets by scanning upward from x = max(n, 0.5), then bisects to
/// machine precision.
pub fn spherical_jn_zero(n: usize, m: usize) -> DynamoResult<f64> {
    if m == 0 {
        return Err(DynamoError::ConfigError(
            "Bessel root index starts at 1".to_string(),
        ));
    }
    let start = (n as f64).max(0.5);
    let limit = start + (m as f64 + n as f64 + 2.0) * PI * 2.0;
    bracket_root(n, m, start, limit)
}

/// The `m`-th sign change of j_n in [start, limit), refined by bisection.
fn bracket_root(n: usize, m: usize, start: f64, limit: f64) -> DynamoResult<f64> {
    let mut found = 0usize;
    let mut a = start;
    let mut fa = spherical_jn(n, a);
    while a < limit {
        let b = a + ROOT_SCAN_STEP;
        let fb = spherical_jn(n, b);
        if fa == 0.0 || fa * fb < 0.0 {
            found += 1;
            if found == m {
                return Ok(if fa == 0.0 { a } else { bisect(n, a, b, fa) });
            }
        }
        a = b;
        fa = fb;
    }
    Err(DynamoError::DomainError(format!(
        "root {m} of j_{n} not bracketed below x={limit:.1}"
    )))
}

fn bisect(n: usize, mut lo: f64, mut hi: f64, mut f_lo: f64) -> f64 {
    for _ in 0..ROOT_BISECTION_ITERS {
        let mid = 0.5 * (lo + hi);
        if mid <= lo || mid >= hi {
            break;
        }
        let f_mid = spherical_jn(n, mid);
        if f_mid == 0.0 {
            return mid;
        }
        if f_lo * f_mid < 0.0 {
            hi = mid;
        } else {
            lo = mid;
            f_lo = f_mid;
        }
    }
    0.5 * (lo + hi)
}

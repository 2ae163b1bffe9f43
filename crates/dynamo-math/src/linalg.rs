// ─────────────────────────────────────────────────────────────────────
// SCPN Halo Dynamo — Linear Algebra
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Linear algebra utilities.
//!
//! General (non-symmetric) real eigendecomposition and singular values
//! for the small dense matrices of the Galerkin projection.

use dynamo_types::error::{DynamoError, DynamoResult};
use ndarray::{Array1, Array2};
use num_complex::Complex64;

/// QR sweeps allowed per eigenvalue before giving up.
const MAX_QR_ITER_PER_ROOT: usize = 60;

/// Sweep cap for the one-sided Jacobi SVD.
const MAX_JACOBI_SWEEPS: usize = 100;

/// Eigenvalues and right eigenvectors of a real square matrix.
///
/// `vectors` holds one eigenvector per column, scaled to unit 2-norm,
/// so that `A · vectors[:, k] = values[k] · vectors[:, k]`.
#[derive(Debug, Clone)]
pub struct EigenDecomposition {
    pub values: Array1<Complex64>,
    pub vectors: Array2<Complex64>,
}

/// Eigendecomposition of a general real matrix.
///
/// Householder reduction to upper Hessenberg form, Francis double-shift QR
/// to real Schur form, then back-substitution for the eigenvectors of the
/// quasi-triangular factor (the EISPACK orthes/hqr2 pair). Eigenvalues of
/// a matrix that is already triangular come out in diagonal order.
pub fn eig_general(a: &Array2<f64>) -> DynamoResult<EigenDecomposition> {
    let (rows, cols) = a.dim();
    if rows != cols {
        return Err(DynamoError::LinAlg(format!(
            "eigendecomposition needs a square matrix, got {rows}x{cols}"
        )));
    }
    if a.iter().any(|v| !v.is_finite()) {
        return Err(DynamoError::LinAlg(
            "matrix contains non-finite entries".to_string(),
        ));
    }
    let n = rows;
    if n == 0 {
        return Ok(EigenDecomposition {
            values: Array1::zeros(0),
            vectors: Array2::zeros((0, 0)),
        });
    }

    let mut h = a.clone();
    let mut v = Array2::<f64>::eye(n);
    orthes(&mut h, &mut v);
    let mut d = vec![0.0; n];
    let mut e = vec![0.0; n];
    hqr2(&mut h, &mut v, &mut d, &mut e)?;

    let mut values = Array1::zeros(n);
    let mut vectors = Array2::zeros((n, n));
    let mut k = 0;
    while k < n {
        if e[k] == 0.0 {
            values[k] = Complex64::new(d[k], 0.0);
            for i in 0..n {
                vectors[[i, k]] = Complex64::new(v[[i, k]], 0.0);
            }
            k += 1;
        } else {
            // Pair (k, k+1): λ = d ± i|e|, x = v[:, k] ± i v[:, k+1]
            values[k] = Complex64::new(d[k], e[k]);
            values[k + 1] = Complex64::new(d[k + 1], e[k + 1]);
            for i in 0..n {
                let re = v[[i, k]];
                let im = v[[i, k + 1]];
                vectors[[i, k]] = Complex64::new(re, im);
                vectors[[i, k + 1]] = Complex64::new(re, -im);
            }
            k += 2;
        }
    }

    for mut col in vectors.columns_mut() {
        let norm = col.iter().map(|z| z.norm_sqr()).sum::<f64>().sqrt();
        if norm > 0.0 {
            col.mapv_inplace(|z| z / norm);
        }
    }

    Ok(EigenDecomposition { values, vectors })
}

/// Householder reduction to Hessenberg form, accumulating the transform in `v`.
fn orthes(h: &mut Array2<f64>, v: &mut Array2<f64>) {
    let n = h.nrows();
    if n < 3 {
        return;
    }
    let high = n - 1;
    let mut ort = vec![0.0; n];

    for m in 1..high {
        let scale: f64 = (m..=high).map(|i| h[[i, m - 1]].abs()).sum();
        if scale == 0.0 {
            continue;
        }
        let mut hh = 0.0;
        for i in (m..=high).rev() {
            ort[i] = h[[i, m - 1]] / scale;
            hh += ort[i] * ort[i];
        }
        let mut g = hh.sqrt();
        if ort[m] > 0.0 {
            g = -g;
        }
        hh -= ort[m] * g;
        ort[m] -= g;

        for j in m..n {
            let f = (m..=high).rev().map(|i| ort[i] * h[[i, j]]).sum::<f64>() / hh;
            for i in m..=high {
                h[[i, j]] -= f * ort[i];
            }
        }
        for i in 0..=high {
            let f = (m..=high).rev().map(|j| ort[j] * h[[i, j]]).sum::<f64>() / hh;
            for j in m..=high {
                h[[i, j]] -= f * ort[j];
            }
        }
        ort[m] *= scale;
        h[[m, m - 1]] = scale * g;
    }

    for m in (1..high).rev() {
        if h[[m, m - 1]] == 0.0 {
            continue;
        }
        for i in m + 1..=high {
            ort[i] = h[[i, m - 1]];
        }
        for j in m..=high {
            let g = (m..=high).map(|i| ort[i] * v[[i, j]]).sum::<f64>();
            // Double division avoids underflow.
            let g = (g / ort[m]) / h[[m, m - 1]];
            for i in m..=high {
                v[[i, j]] += g * ort[i];
            }
        }
    }
}

fn cdiv(xr: f64, xi: f64, yr: f64, yi: f64) -> (f64, f64) {
    let q = Complex64::new(xr, xi) / Complex64::new(yr, yi);
    (q.re, q.im)
}

/// Real Schur form by double-shift QR, then eigenvectors by back-substitution.
#[allow(clippy::many_single_char_names, unused_assignments)]
fn hqr2(h: &mut Array2<f64>, v: &mut Array2<f64>, d: &mut [f64], e: &mut [f64]) -> DynamoResult<()> {
    let nn = h.nrows();
    let low = 0usize;
    let high = nn - 1;
    let eps = f64::EPSILON;
    let mut exshift = 0.0;
    let (mut p, mut q, mut r, mut s, mut z) = (0.0f64, 0.0f64, 0.0f64, 0.0f64, 0.0f64);
    let (mut w, mut x, mut y) = (0.0f64, 0.0f64, 0.0f64);

    let mut norm = 0.0;
    for i in 0..nn {
        for j in i.saturating_sub(1)..nn {
            norm += h[[i, j]].abs();
        }
    }

    let mut n = high as isize;
    let mut iter = 0usize;
    while n >= low as isize {
        let nu = n as usize;

        // Look for a single small sub-diagonal element.
        let mut l = nu;
        while l > low {
            s = h[[l - 1, l - 1]].abs() + h[[l, l]].abs();
            if s == 0.0 {
                s = norm;
            }
            if h[[l, l - 1]].abs() < eps * s {
                break;
            }
            l -= 1;
        }

        if l == nu {
            // One root.
            h[[nu, nu]] += exshift;
            d[nu] = h[[nu, nu]];
            e[nu] = 0.0;
            n -= 1;
            iter = 0;
        } else if l + 1 == nu {
            // Two roots.
            w = h[[nu, nu - 1]] * h[[nu - 1, nu]];
            p = (h[[nu - 1, nu - 1]] - h[[nu, nu]]) / 2.0;
            q = p * p + w;
            z = q.abs().sqrt();
            h[[nu, nu]] += exshift;
            h[[nu - 1, nu - 1]] += exshift;
            x = h[[nu, nu]];

            if q >= 0.0 {
                z = if p >= 0.0 { p + z } else { p - z };
                d[nu - 1] = x + z;
                d[nu] = d[nu - 1];
                if z != 0.0 {
                    d[nu] = x - w / z;
                }
                e[nu - 1] = 0.0;
                e[nu] = 0.0;
                x = h[[nu, nu - 1]];
                s = x.abs() + z.abs();
                p = x / s;
                q = z / s;
                r = (p * p + q * q).sqrt();
                p /= r;
                q /= r;

                for j in nu - 1..nn {
                    z = h[[nu - 1, j]];
                    h[[nu - 1, j]] = q * z + p * h[[nu, j]];
                    h[[nu, j]] = q * h[[nu, j]] - p * z;
                }
                for i in 0..=nu {
                    z = h[[i, nu - 1]];
                    h[[i, nu - 1]] = q * z + p * h[[i, nu]];
                    h[[i, nu]] = q * h[[i, nu]] - p * z;
                }
                for i in low..=high {
                    z = v[[i, nu - 1]];
                    v[[i, nu - 1]] = q * z + p * v[[i, nu]];
                    v[[i, nu]] = q * v[[i, nu]] - p * z;
                }
            } else {
                d[nu - 1] = x + p;
                d[nu] = x + p;
                e[nu - 1] = z;
                e[nu] = -z;
            }
            n -= 2;
            iter = 0;
        } else {
            // No convergence yet: form the shift.
            x = h[[nu, nu]];
            y = 0.0;
            w = 0.0;
            if l < nu {
                y = h[[nu - 1, nu - 1]];
                w = h[[nu, nu - 1]] * h[[nu - 1, nu]];
            }

            // Wilkinson's exceptional shift.
            if iter == 10 {
                exshift += x;
                for i in low..=nu {
                    h[[i, i]] -= x;
                }
                s = h[[nu, nu - 1]].abs() + h[[nu - 1, nu - 2]].abs();
                x = 0.75 * s;
                y = x;
                w = -0.4375 * s * s;
            }

            // Second exceptional shift.
            if iter == 30 {
                s = (y - x) / 2.0;
                s = s * s + w;
                if s > 0.0 {
                    s = s.sqrt();
                    if y < x {
                        s = -s;
                    }
                    s = x - w / ((y - x) / 2.0 + s);
                    for i in low..=nu {
                        h[[i, i]] -= s;
                    }
                    exshift += s;
                    x = 0.964;
                    y = x;
                    w = x;
                }
            }

            iter += 1;
            if iter > MAX_QR_ITER_PER_ROOT {
                return Err(DynamoError::LinAlg(format!(
                    "QR iteration did not converge for eigenvalue {nu} after {MAX_QR_ITER_PER_ROOT} sweeps"
                )));
            }

            // Look for two consecutive small sub-diagonal elements.
            let mut m = nu - 2;
            loop {
                z = h[[m, m]];
                r = x - z;
                s = y - z;
                p = (r * s - w) / h[[m + 1, m]] + h[[m, m + 1]];
                q = h[[m + 1, m + 1]] - z - r - s;
                r = h[[m + 2, m + 1]];
                s = p.abs() + q.abs() + r.abs();
                p /= s;
                q /= s;
                r /= s;
                if m == l {
                    break;
                }
                if h[[m, m - 1]].abs() * (q.abs() + r.abs())
                    < eps * (p.abs() * (h[[m - 1, m - 1]].abs() + z.abs() + h[[m + 1, m + 1]].abs()))
                {
                    break;
                }
                m -= 1;
            }

            for i in m + 2..=nu {
                h[[i, i - 2]] = 0.0;
                if i > m + 2 {
                    h[[i, i - 3]] = 0.0;
                }
            }

            // Double QR step on rows l..=n and columns m..=n.
            for k in m..nu {
                let notlast = k != nu - 1;
                if k != m {
                    p = h[[k, k - 1]];
                    q = h[[k + 1, k - 1]];
                    r = if notlast { h[[k + 2, k - 1]] } else { 0.0 };
                    x = p.abs() + q.abs() + r.abs();
                    if x == 0.0 {
                        continue;
                    }
                    p /= x;
                    q /= x;
                    r /= x;
                }
                s = (p * p + q * q + r * r).sqrt();
                if p < 0.0 {
                    s = -s;
                }
                if s == 0.0 {
                    continue;
                }
                if k != m {
                    h[[k, k - 1]] = -s * x;
                } else if l != m {
                    h[[k, k - 1]] = -h[[k, k - 1]];
                }
                p += s;
                x = p / s;
                y = q / s;
                z = r / s;
                q /= p;
                r /= p;

                for j in k..nn {
                    p = h[[k, j]] + q * h[[k + 1, j]];
                    if notlast {
                        p += r * h[[k + 2, j]];
                        h[[k + 2, j]] -= p * z;
                    }
                    h[[k, j]] -= p * x;
                    h[[k + 1, j]] -= p * y;
                }
                for i in 0..=nu.min(k + 3) {
                    p = x * h[[i, k]] + y * h[[i, k + 1]];
                    if notlast {
                        p += z * h[[i, k + 2]];
                        h[[i, k + 2]] -= p * r;
                    }
                    h[[i, k]] -= p;
                    h[[i, k + 1]] -= p * q;
                }
                for i in low..=high {
                    p = x * v[[i, k]] + y * v[[i, k + 1]];
                    if notlast {
                        p += z * v[[i, k + 2]];
                        v[[i, k + 2]] -= p * r;
                    }
                    v[[i, k]] -= p;
                    v[[i, k + 1]] -= p * q;
                }
            }
        }
    }

    if norm == 0.0 {
        return Ok(());
    }

    // Back-substitute to find vectors of the upper triangular form.
    for nu in (0..nn).rev() {
        p = d[nu];
        q = e[nu];

        if q == 0.0 {
            // Real vector.
            let mut l = nu;
            h[[nu, nu]] = 1.0;
            for i in (0..nu).rev() {
                w = h[[i, i]] - p;
                r = (l..=nu).map(|j| h[[i, j]] * h[[j, nu]]).sum();
                if e[i] < 0.0 {
                    z = w;
                    s = r;
                } else {
                    l = i;
                    if e[i] == 0.0 {
                        h[[i, nu]] = if w != 0.0 { -r / w } else { -r / (eps * norm) };
                    } else {
                        x = h[[i, i + 1]];
                        y = h[[i + 1, i]];
                        q = (d[i] - p) * (d[i] - p) + e[i] * e[i];
                        let t = (x * s - z * r) / q;
                        h[[i, nu]] = t;
                        h[[i + 1, nu]] = if x.abs() > z.abs() {
                            (-r - w * t) / x
                        } else {
                            (-s - y * t) / z
                        };
                    }
                    let t = h[[i, nu]].abs();
                    if (eps * t) * t > 1.0 {
                        for j in i..=nu {
                            h[[j, nu]] /= t;
                        }
                    }
                }
            }
        } else if q < 0.0 {
            // Complex vector; the last component is imaginary.
            let mut l = nu - 1;
            if h[[nu, nu - 1]].abs() > h[[nu - 1, nu]].abs() {
                h[[nu - 1, nu - 1]] = q / h[[nu, nu - 1]];
                h[[nu - 1, nu]] = -(h[[nu, nu]] - p) / h[[nu, nu - 1]];
            } else {
                let (cr, ci) = cdiv(0.0, -h[[nu - 1, nu]], h[[nu - 1, nu - 1]] - p, q);
                h[[nu - 1, nu - 1]] = cr;
                h[[nu - 1, nu]] = ci;
            }
            h[[nu, nu - 1]] = 0.0;
            h[[nu, nu]] = 1.0;

            for i in (0..nu - 1).rev() {
                let mut ra = 0.0;
                let mut sa = 0.0;
                for j in l..=nu {
                    ra += h[[i, j]] * h[[j, nu - 1]];
                    sa += h[[i, j]] * h[[j, nu]];
                }
                w = h[[i, i]] - p;

                if e[i] < 0.0 {
                    z = w;
                    r = ra;
                    s = sa;
                } else {
                    l = i;
                    if e[i] == 0.0 {
                        let (cr, ci) = cdiv(-ra, -sa, w, q);
                        h[[i, nu - 1]] = cr;
                        h[[i, nu]] = ci;
                    } else {
                        x = h[[i, i + 1]];
                        y = h[[i + 1, i]];
                        let mut vr = (d[i] - p) * (d[i] - p) + e[i] * e[i] - q * q;
                        let vi = (d[i] - p) * 2.0 * q;
                        if vr == 0.0 && vi == 0.0 {
                            vr = eps * norm * (w.abs() + q.abs() + x.abs() + y.abs() + z.abs());
                        }
                        let (cr, ci) = cdiv(
                            x * r - z * ra + q * sa,
                            x * s - z * sa - q * ra,
                            vr,
                            vi,
                        );
                        h[[i, nu - 1]] = cr;
                        h[[i, nu]] = ci;
                        if x.abs() > z.abs() + q.abs() {
                            h[[i + 1, nu - 1]] = (-ra - w * h[[i, nu - 1]] + q * h[[i, nu]]) / x;
                            h[[i + 1, nu]] = (-sa - w * h[[i, nu]] - q * h[[i, nu - 1]]) / x;
                        } else {
                            let (cr, ci) =
                                cdiv(-r - y * h[[i, nu - 1]], -s - y * h[[i, nu]], z, q);
                            h[[i + 1, nu - 1]] = cr;
                            h[[i + 1, nu]] = ci;
                        }
                    }

                    let t = h[[i, nu - 1]].abs().max(h[[i, nu]].abs());
                    if (eps * t) * t > 1.0 {
                        for j in i..=nu {
                            h[[j, nu - 1]] /= t;
                            h[[j, nu]] /= t;
                        }
                    }
                }
            }
        }
    }

    // Back transformation to eigenvectors of the original matrix.
    for j in (low..nn).rev() {
        for i in low..=high {
            z = (low..=j.min(high)).map(|k| v[[i, k]] * h[[k, j]]).sum();
            v[[i, j]] = z;
        }
    }

    Ok(())
}

/// Singular values of a real matrix, sorted in descending order.
///
/// One-sided Jacobi (Hestenes): columns are rotated pairwise until mutually
/// orthogonal, and the singular values are the resulting column norms. Small
/// singular values keep their relative accuracy, which matters when the
/// matrix is close to rank deficient.
pub fn singular_values(a: &Array2<f64>) -> Array1<f64> {
    let (m, n) = a.dim();
    let mut u = if m >= n { a.clone() } else { a.t().to_owned() };
    let cols = u.ncols();

    for _ in 0..MAX_JACOBI_SWEEPS {
        let mut rotated = false;
        for i in 0..cols {
            for j in (i + 1)..cols {
                let alpha = u.column(i).dot(&u.column(i));
                let beta = u.column(j).dot(&u.column(j));
                let gamma = u.column(i).dot(&u.column(j));
                if gamma.abs() <= f64::EPSILON * (alpha * beta).sqrt() || gamma == 0.0 {
                    continue;
                }
                rotated = true;
                let zeta = (beta - alpha) / (2.0 * gamma);
                let t = zeta.signum() / (zeta.abs() + (1.0 + zeta * zeta).sqrt());
                let cos = 1.0 / (1.0 + t * t).sqrt();
                let sin = cos * t;
                for r in 0..u.nrows() {
                    let ui = u[[r, i]];
                    let uj = u[[r, j]];
                    u[[r, i]] = cos * ui - sin * uj;
                    u[[r, j]] = sin * ui + cos * uj;
                }
            }
        }
        if !rotated {
            break;
        }
    }

    let mut sigma: Vec<f64> = u.columns().into_iter().map(|c| c.dot(&c).sqrt()).collect();
    sigma.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));
    sigma.truncate(m.min(n));
    Array1::from(sigma)
}

/// 2-norm condition number of a complex matrix, σ_max / σ_min.
///
/// Uses the real embedding [[Re, −Im], [Im, Re]], whose singular values
/// are those of the complex matrix, each repeated twice. Returns infinity
/// for a singular matrix.
pub fn condition_number(a: &Array2<Complex64>) -> f64 {
    let (m, n) = a.dim();
    if m == 0 || n == 0 {
        return 1.0;
    }
    let mut embed = Array2::zeros((2 * m, 2 * n));
    for i in 0..m {
        for j in 0..n {
            let z = a[[i, j]];
            embed[[i, j]] = z.re;
            embed[[i, j + n]] = -z.im;
            embed[[i + m, j]] = z.im;
            embed[[i + m, j + n]] = z.re;
        }
    }
    let sigma = singular_values(&embed);
    let max = sigma[0];
    let min = sigma[sigma.len() - 1];
    if min <= 0.0 {
        f64::INFINITY
    } else {
        max / min
    }
}

// ─────────────────────────────────────────────────────────────────────
// SCPN Halo Dynamo — State
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use crate::error::{DynamoError, DynamoResult};
use ndarray::{Array, Array1, Array3, Dimension, Ix3, Zip};
use std::fmt;

/// Axes of a spherical grid, in storage order `[r, θ, φ]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SphericalAxis {
    Radial,
    Polar,
    Azimuthal,
}

impl SphericalAxis {
    pub fn index(self) -> usize {
        match self {
            SphericalAxis::Radial => 0,
            SphericalAxis::Polar => 1,
            SphericalAxis::Azimuthal => 2,
        }
    }
}

impl fmt::Display for SphericalAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SphericalAxis::Radial => "r",
            SphericalAxis::Polar => "theta",
            SphericalAxis::Azimuthal => "phi",
        };
        f.write_str(name)
    }
}

/// Rectilinear grid in spherical coordinates with precomputed meshgrids.
///
/// Arrays are indexed `[ir, itheta, iphi]`. A single azimuthal sample
/// (`nphi == 1`) marks an axisymmetric grid; `dphi` is then zero.
#[derive(Debug, Clone)]
pub struct SphericalGrid {
    pub nr: usize,
    pub ntheta: usize,
    pub nphi: usize,
    pub r: Array1<f64>,
    pub theta: Array1<f64>,
    pub phi: Array1<f64>,
    pub dr: f64,
    pub dtheta: f64,
    pub dphi: f64,
    pub rr: Array3<f64>,
    pub tt: Array3<f64>,
    pub pp: Array3<f64>,
}

impl SphericalGrid {
    /// Build a grid from `[nr, ntheta, nphi]` and inclusive coordinate ranges.
    ///
    /// Requires r_min > 0 (r = 0 is singular for every mode) and
    /// 0 <= θ_min < θ_max <= π. A φ axis with one sample takes `phi_range[0]`.
    pub fn new(
        resolution: [usize; 3],
        r_range: [f64; 2],
        theta_range: [f64; 2],
        phi_range: [f64; 2],
    ) -> DynamoResult<Self> {
        let [nr, ntheta, nphi] = resolution;
        if nr == 0 || ntheta == 0 || nphi == 0 {
            return Err(DynamoError::DomainError(format!(
                "grid resolution must be >= 1 along every axis, got {resolution:?}"
            )));
        }
        let ranges = [r_range, theta_range, phi_range];
        if ranges.iter().flatten().any(|v| !v.is_finite()) {
            return Err(DynamoError::DomainError(
                "grid ranges must be finite".to_string(),
            ));
        }
        if r_range[0] <= 0.0 {
            return Err(DynamoError::DomainError(format!(
                "grid r_min must be > 0, got {}",
                r_range[0]
            )));
        }
        if theta_range[0] < 0.0 || theta_range[1] > std::f64::consts::PI {
            return Err(DynamoError::DomainError(format!(
                "grid theta range must lie in [0, pi], got {theta_range:?}"
            )));
        }
        for (name, n, range) in [
            ("r", nr, r_range),
            ("theta", ntheta, theta_range),
            ("phi", nphi, phi_range),
        ] {
            if n > 1 && range[1] <= range[0] {
                return Err(DynamoError::DomainError(format!(
                    "grid {name} range {range:?} is degenerate for {n} samples"
                )));
            }
        }

        let r = axis(nr, r_range);
        let theta = axis(ntheta, theta_range);
        let phi = axis(nphi, phi_range);
        let dr = spacing(&r);
        let dtheta = spacing(&theta);
        let dphi = spacing(&phi);

        let shape = (nr, ntheta, nphi);
        let rr = Array3::from_shape_fn(shape, |(i, _, _)| r[i]);
        let tt = Array3::from_shape_fn(shape, |(_, j, _)| theta[j]);
        let pp = Array3::from_shape_fn(shape, |(_, _, k)| phi[k]);

        Ok(SphericalGrid {
            nr,
            ntheta,
            nphi,
            r,
            theta,
            phi,
            dr,
            dtheta,
            dphi,
            rr,
            tt,
            pp,
        })
    }

    pub fn shape(&self) -> [usize; 3] {
        [self.nr, self.ntheta, self.nphi]
    }

    pub fn is_axisymmetric(&self) -> bool {
        self.nphi == 1
    }

    pub fn spacing(&self, axis: SphericalAxis) -> f64 {
        match axis {
            SphericalAxis::Radial => self.dr,
            SphericalAxis::Polar => self.dtheta,
            SphericalAxis::Azimuthal => self.dphi,
        }
    }

    pub fn len(&self, axis: SphericalAxis) -> usize {
        self.shape()[axis.index()]
    }
}

fn axis(n: usize, range: [f64; 2]) -> Array1<f64> {
    if n == 1 {
        Array1::from_elem(1, range[0])
    } else {
        Array1::linspace(range[0], range[1], n)
    }
}

fn spacing(axis: &Array1<f64>) -> f64 {
    if axis.len() > 1 {
        axis[1] - axis[0]
    } else {
        0.0
    }
}

/// Vector field sampled pointwise: radial, polar and azimuthal components
/// of identical shape.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorField<D: Dimension = Ix3> {
    pub r: Array<f64, D>,
    pub theta: Array<f64, D>,
    pub phi: Array<f64, D>,
}

impl<D: Dimension> VectorField<D> {
    pub fn new(r: Array<f64, D>, theta: Array<f64, D>, phi: Array<f64, D>) -> DynamoResult<Self> {
        for (name, c) in [("theta", &theta), ("phi", &phi)] {
            if c.shape() != r.shape() {
                return Err(DynamoError::ShapeMismatch {
                    context: format!("vector field {name} component"),
                    expected: r.shape().to_vec(),
                    found: c.shape().to_vec(),
                });
            }
        }
        Ok(VectorField { r, theta, phi })
    }

    pub fn zeros(dim: D) -> Self {
        VectorField {
            r: Array::zeros(dim.clone()),
            theta: Array::zeros(dim.clone()),
            phi: Array::zeros(dim),
        }
    }

    /// Split an array of `[r, θ, φ]` triples into components.
    pub fn unpack(packed: &Array<[f64; 3], D>) -> Self {
        VectorField {
            r: packed.mapv(|v| v[0]),
            theta: packed.mapv(|v| v[1]),
            phi: packed.mapv(|v| v[2]),
        }
    }

    pub fn shape(&self) -> &[usize] {
        self.r.shape()
    }

    pub fn components(&self) -> [&Array<f64, D>; 3] {
        [&self.r, &self.theta, &self.phi]
    }

    /// Pointwise dot product `self · other`.
    pub fn dot(&self, other: &VectorField<D>) -> Array<f64, D> {
        let mut out = Zip::from(&self.r)
            .and(&other.r)
            .and(&self.theta)
            .and(&other.theta)
            .map_collect(|&ar, &br, &at, &bt| ar * br + at * bt);
        Zip::from(&mut out)
            .and(&self.phi)
            .and(&other.phi)
            .for_each(|o, &ap, &bp| *o += ap * bp);
        out
    }

    /// Pointwise Euclidean magnitude.
    pub fn magnitude(&self) -> Array<f64, D> {
        self.dot(self).mapv(f64::sqrt)
    }

    pub fn is_finite(&self) -> bool {
        self.components()
            .iter()
            .all(|c| c.iter().all(|v| v.is_finite()))
    }
}

/// Conditions that degrade accuracy without invalidating a result.
#[derive(Debug, Clone, PartialEq)]
pub enum NumericalWarning {
    /// Simpson's rule applied to an even number of samples; the averaged
    /// variant (first/last interval by trapezoid) was used.
    EvenQuadratureAxis { axis: SphericalAxis, samples: usize },
    /// The eigenvector matrix is close to singular.
    IllConditionedEigenvectors { condition: f64, threshold: f64 },
    /// Two eigenvalues coincide to within the solver tolerance.
    RepeatedEigenvalues {
        first: usize,
        second: usize,
        separation: f64,
    },
}

impl fmt::Display for NumericalWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumericalWarning::EvenQuadratureAxis { axis, samples } => write!(
                f,
                "even sample count {samples} on {axis} axis: Simpson's rule averaged"
            ),
            NumericalWarning::IllConditionedEigenvectors {
                condition,
                threshold,
            } => write!(
                f,
                "eigenvector matrix condition {condition:.3e} exceeds {threshold:.3e}"
            ),
            NumericalWarning::RepeatedEigenvalues {
                first,
                second,
                separation,
            } => write!(
                f,
                "eigenvalues {first} and {second} separated by only {separation:.3e}"
            ),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────
// SCPN Halo Dynamo — Galerkin Coefficient Solver
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Galerkin projection of the dynamo operator onto free decay modes.
//!
//! W[i, j] = ∫ B_i · W(B_j) r² sin θ dφ dθ dr for i ≠ j and
//! W[i, i] = γ_i = −k_i². The eigenvalues of W are the growth rates and
//! its eigenvectors the mode coefficients of each eigen-field.

use crate::modes::{evaluate_on_grid, ModeDescriptor, ModeParams, ModeSymmetry};
use crate::perturbation::perturbation_operator;
use crate::profiles::{sample_alpha, sample_rotation, AlphaProfile, RotationProfile};
use crate::profiles::{SimpleAlpha, SimpleRotation};
use dynamo_math::linalg::{condition_number, eig_general};
use dynamo_math::quadrature::{simpson, simpson_axis, SimpsonRule};
use dynamo_types::config::{
    DynamoNumbers, EvenAxisPolicy, ExecutionBackend, HaloDynamoConfig,
};
use dynamo_types::constants::MODES_PER_FAMILY;
use dynamo_types::error::{DynamoError, DynamoResult};
use dynamo_types::state::{NumericalWarning, SphericalAxis, SphericalGrid, VectorField};
use ndarray::{Array1, Array2, Array3, ArrayView1, Axis, Zip};
use num_complex::Complex64;
use rayon::prelude::*;
use std::f64::consts::PI;

/// Relative gap below which two eigenvalues count as repeated.
const REPEATED_EIGENVALUE_TOL: f64 = 1e-8;

/// Numerical policies of one Galerkin solve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GalerkinOptions {
    pub even_axis_policy: EvenAxisPolicy,
    pub max_eigenvector_condition: f64,
    pub return_matrix: bool,
    pub growing_mode_only: bool,
    pub backend: ExecutionBackend,
}

impl Default for GalerkinOptions {
    fn default() -> Self {
        GalerkinOptions {
            even_axis_policy: EvenAxisPolicy::Warn,
            max_eigenvector_condition: 1e8,
            return_matrix: false,
            growing_mode_only: false,
            backend: ExecutionBackend::Serial,
        }
    }
}

impl From<&HaloDynamoConfig> for GalerkinOptions {
    fn from(cfg: &HaloDynamoConfig) -> Self {
        GalerkinOptions {
            even_axis_policy: cfg.even_axis_policy,
            max_eigenvector_condition: cfg.max_eigenvector_condition,
            return_matrix: cfg.return_matrix,
            growing_mode_only: cfg.growing_mode_only,
            backend: cfg.backend,
        }
    }
}

/// Growth rates and mode coefficients of the projected dynamo.
#[derive(Debug, Clone)]
pub struct GalerkinResult {
    /// Basis the coefficients refer to, in matrix order.
    pub modes: Vec<ModeDescriptor>,
    /// Eigenvalues of W; Re > 0 means growth.
    pub growth_rates: Array1<Complex64>,
    /// One unit-norm eigenvector per column.
    pub eigenvectors: Array2<Complex64>,
    /// The coupling matrix, when requested.
    pub matrix: Option<Array2<f64>>,
    /// 2-norm condition number of the full eigenvector matrix.
    pub eigenvector_condition: f64,
    pub warnings: Vec<NumericalWarning>,
    pub solve_time_ms: f64,
}

impl GalerkinResult {
    /// Indices of eigenmodes with positive growth rate.
    pub fn growing_modes(&self) -> Vec<usize> {
        self.growth_rates
            .iter()
            .enumerate()
            .filter(|(_, g)| g.re > 0.0)
            .map(|(i, _)| i)
            .collect()
    }

    /// Index of the eigenmode with the largest growth rate.
    pub fn dominant_mode(&self) -> Option<usize> {
        self.growth_rates
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.re.total_cmp(&b.1.re))
            .map(|(i, _)| i)
    }

    /// Mode coefficients of eigenmode `i`.
    pub fn coefficients(&self, i: usize) -> Option<ArrayView1<'_, Complex64>> {
        (i < self.eigenvectors.ncols()).then(|| self.eigenvectors.column(i))
    }

    pub fn is_reliable(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Builds and solves the Galerkin eigenproblem on a fixed grid and basis.
pub struct GalerkinSolver {
    grid: SphericalGrid,
    modes: Vec<ModeDescriptor>,
    params: Vec<ModeParams>,
    numbers: DynamoNumbers,
    options: GalerkinOptions,
}

impl GalerkinSolver {
    /// Use the default (C, k) of every mode.
    pub fn new(
        grid: SphericalGrid,
        modes: Vec<ModeDescriptor>,
        numbers: DynamoNumbers,
        options: GalerkinOptions,
    ) -> DynamoResult<Self> {
        let params = modes.iter().map(|m| m.default_params()).collect();
        Self::with_params(grid, modes, params, numbers, options)
    }

    pub fn with_params(
        grid: SphericalGrid,
        modes: Vec<ModeDescriptor>,
        params: Vec<ModeParams>,
        numbers: DynamoNumbers,
        options: GalerkinOptions,
    ) -> DynamoResult<Self> {
        if modes.is_empty() {
            return Err(DynamoError::ConfigError(
                "Galerkin expansion needs at least one mode".to_string(),
            ));
        }
        if modes.len() > MODES_PER_FAMILY {
            return Err(DynamoError::ConfigError(format!(
                "requested {} modes, a family has only {MODES_PER_FAMILY}",
                modes.len()
            )));
        }
        for (i, m) in modes.iter().enumerate() {
            if modes[..i].contains(m) {
                return Err(DynamoError::ConfigError(format!(
                    "mode {m} appears more than once in the basis"
                )));
            }
        }
        if params.len() != modes.len() {
            return Err(DynamoError::ConfigError(format!(
                "{} mode parameter sets for {} modes",
                params.len(),
                modes.len()
            )));
        }
        for p in &params {
            p.validate()?;
        }
        numbers.validate()?;
        if !(options.max_eigenvector_condition.is_finite() && options.max_eigenvector_condition > 1.0)
        {
            return Err(DynamoError::ConfigError(format!(
                "max_eigenvector_condition must be finite and > 1, got {}",
                options.max_eigenvector_condition
            )));
        }
        Ok(GalerkinSolver {
            grid,
            modes,
            params,
            numbers,
            options,
        })
    }

    /// Validated configuration → grid and the leading modes of the family.
    pub fn from_config(config: &HaloDynamoConfig) -> DynamoResult<Self> {
        config.validate()?;
        let symmetry = ModeSymmetry::from_symmetric_flag(config.symmetric_field);
        let modes = ModeDescriptor::leading(symmetry, config.n_free_decay_modes)?;
        let grid = config.grid.create_grid()?;
        Self::new(grid, modes, config.dynamo_numbers(), GalerkinOptions::from(config))
    }

    pub fn grid(&self) -> &SphericalGrid {
        &self.grid
    }

    pub fn modes(&self) -> &[ModeDescriptor] {
        &self.modes
    }

    /// Simpson variant per integrated axis, plus the warnings it implies.
    fn quadrature_rules(&self) -> DynamoResult<(Vec<(SphericalAxis, SimpsonRule)>, Vec<NumericalWarning>)> {
        let mut axes = vec![SphericalAxis::Radial, SphericalAxis::Polar];
        if !self.grid.is_axisymmetric() {
            axes.push(SphericalAxis::Azimuthal);
        }
        let mut rules = Vec::with_capacity(axes.len());
        let mut warnings = Vec::new();
        for axis in axes {
            let samples = self.grid.len(axis);
            let rule = if samples % 2 == 1 {
                SimpsonRule::Strict
            } else {
                match self.options.even_axis_policy {
                    EvenAxisPolicy::Reject => {
                        return Err(DynamoError::ConfigError(format!(
                            "Simpson's rule needs an odd sample count on {axis}, got {samples}"
                        )))
                    }
                    EvenAxisPolicy::Warn => {
                        warnings.push(NumericalWarning::EvenQuadratureAxis { axis, samples });
                        SimpsonRule::Averaged
                    }
                }
            };
            rules.push((axis, rule));
        }
        Ok((rules, warnings))
    }

    /// Volume integral of `f r² sin θ`: φ (or 2π), then θ, then r.
    fn integrate(&self, integrand: Array3<f64>, rules: &[(SphericalAxis, SimpsonRule)]) -> DynamoResult<f64> {
        let rule_of = |axis: SphericalAxis| {
            rules
                .iter()
                .find(|(a, _)| *a == axis)
                .map(|(_, r)| *r)
                .unwrap_or(SimpsonRule::Strict)
        };
        let over_phi = if self.grid.is_axisymmetric() {
            integrand.index_axis(Axis(2), 0).mapv(|v| v * 2.0 * PI)
        } else {
            simpson_axis(
                &integrand,
                Axis(2),
                self.grid.dphi,
                rule_of(SphericalAxis::Azimuthal),
            )?
        };
        let over_theta = simpson_axis(
            &over_phi,
            Axis(1),
            self.grid.dtheta,
            rule_of(SphericalAxis::Polar),
        )?;
        simpson(over_theta.view(), self.grid.dr, rule_of(SphericalAxis::Radial))
    }

    /// Assemble the coupling matrix W for the given profiles.
    pub fn coupling_matrix<A, V>(
        &self,
        alpha: &A,
        rotation: &V,
    ) -> DynamoResult<(Array2<f64>, Vec<NumericalWarning>)>
    where
        A: AlphaProfile + ?Sized,
        V: RotationProfile + ?Sized,
    {
        let (rules, warnings) = self.quadrature_rules()?;
        let alpha = sample_alpha(alpha, &self.grid)?;
        let velocity = sample_rotation(rotation, &self.grid)?;

        let fields: Vec<VectorField> = self
            .modes
            .iter()
            .zip(&self.params)
            .map(|(m, p)| evaluate_on_grid(*m, p, &self.grid))
            .collect::<DynamoResult<_>>()?;
        log::debug!(
            "evaluated {} modes on a {:?} grid",
            fields.len(),
            self.grid.shape()
        );

        let apply = |b: &VectorField| {
            perturbation_operator(&self.grid, b, &alpha, &velocity, &self.numbers)
        };
        let images: Vec<VectorField> = match self.options.backend {
            ExecutionBackend::Serial => fields.iter().map(apply).collect::<DynamoResult<_>>()?,
            ExecutionBackend::Threaded => {
                fields.par_iter().map(apply).collect::<DynamoResult<_>>()?
            }
        };

        let weight = Zip::from(&self.grid.rr)
            .and(&self.grid.tt)
            .map_collect(|&r, &t| r * r * t.sin());

        let n = self.modes.len();
        let pairs: Vec<(usize, usize)> = (0..n)
            .flat_map(|i| (0..n).filter(move |&j| j != i).map(move |j| (i, j)))
            .collect();
        let entry = |&(i, j): &(usize, usize)| -> DynamoResult<f64> {
            let mut integrand = fields[i].dot(&images[j]);
            integrand *= &weight;
            self.integrate(integrand, &rules)
        };
        let values: Vec<f64> = match self.options.backend {
            ExecutionBackend::Serial => pairs.iter().map(entry).collect::<DynamoResult<_>>()?,
            ExecutionBackend::Threaded => {
                pairs.par_iter().map(entry).collect::<DynamoResult<_>>()?
            }
        };

        let mut w = Array2::zeros((n, n));
        for (&(i, j), v) in pairs.iter().zip(values) {
            w[[i, j]] = v;
        }
        for (i, p) in self.params.iter().enumerate() {
            w[[i, i]] = p.gamma();
        }
        log::debug!("assembled {n}x{n} coupling matrix ({:?} backend)", self.options.backend);
        Ok((w, warnings))
    }

    /// Full pipeline: coupling matrix, eigen-solve, conditioning checks.
    pub fn solve<A, V>(&self, alpha: &A, rotation: &V) -> DynamoResult<GalerkinResult>
    where
        A: AlphaProfile + ?Sized,
        V: RotationProfile + ?Sized,
    {
        let start = std::time::Instant::now();
        let (w, mut warnings) = self.coupling_matrix(alpha, rotation)?;

        let eig = eig_general(&w)?;
        let condition = condition_number(&eig.vectors);
        log::debug!("eigen-solve finished, eigenvector condition {condition:.3e}");

        if condition > self.options.max_eigenvector_condition {
            warnings.push(NumericalWarning::IllConditionedEigenvectors {
                condition,
                threshold: self.options.max_eigenvector_condition,
            });
        }
        warnings.extend(repeated_eigenvalues(&eig.values));
        for warning in &warnings {
            log::warn!("Galerkin solve: {warning}");
        }

        let keep: Vec<usize> = if self.options.growing_mode_only {
            (0..eig.values.len())
                .filter(|&k| eig.values[k].re > 0.0)
                .collect()
        } else {
            (0..eig.values.len()).collect()
        };
        let growth_rates = keep.iter().map(|&k| eig.values[k]).collect::<Array1<_>>();
        let eigenvectors = eig.vectors.select(Axis(1), &keep);

        Ok(GalerkinResult {
            modes: self.modes.clone(),
            growth_rates,
            eigenvectors,
            matrix: self.options.return_matrix.then_some(w),
            eigenvector_condition: condition,
            warnings,
            solve_time_ms: start.elapsed().as_secs_f64() * 1000.0,
        })
    }
}

fn repeated_eigenvalues(values: &Array1<Complex64>) -> Vec<NumericalWarning> {
    let mut out = Vec::new();
    for a in 0..values.len() {
        for b in (a + 1)..values.len() {
            let separation = (values[a] - values[b]).norm();
            let scale = values[a].norm().max(values[b].norm()).max(1.0);
            if separation <= REPEATED_EIGENVALUE_TOL * scale {
                out.push(NumericalWarning::RepeatedEigenvalues {
                    first: a,
                    second: b,
                    separation,
                });
            }
        }
    }
    out
}

/// Solve with the built-in profiles described by the configuration.
pub fn solve_from_config(config: &HaloDynamoConfig) -> DynamoResult<GalerkinResult> {
    let solver = GalerkinSolver::from_config(config)?;
    let alpha = SimpleAlpha::from(&config.alpha);
    let rotation = SimpleRotation::from(&config.rotation);
    solver.solve(&alpha, &rotation)
}

// ─────────────────────────────────────────────────────────────────────
// SCPN Halo Dynamo — Config
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use crate::constants::MODES_PER_FAMILY;
use crate::error::{DynamoError, DynamoResult};
use crate::state::SphericalGrid;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How the alpha-effect and differential rotation enter the induction operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DynamoType {
    /// Alpha regeneration acts only in the meridional components.
    #[serde(rename = "alpha-omega")]
    AlphaOmega,
    /// Alpha regeneration acts in all three components.
    #[serde(rename = "alpha2-omega")]
    Alpha2Omega,
}

impl FromStr for DynamoType {
    type Err = DynamoError;

    fn from_str(tag: &str) -> DynamoResult<Self> {
        match tag {
            "alpha-omega" => Ok(DynamoType::AlphaOmega),
            "alpha2-omega" => Ok(DynamoType::Alpha2Omega),
            other => Err(DynamoError::ConfigError(format!(
                "invalid dynamo_type '{other}', expected 'alpha-omega' or 'alpha2-omega'"
            ))),
        }
    }
}

impl fmt::Display for DynamoType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DynamoType::AlphaOmega => f.write_str("alpha-omega"),
            DynamoType::Alpha2Omega => f.write_str("alpha2-omega"),
        }
    }
}

/// Dimensionless dynamo numbers and the operator variant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DynamoNumbers {
    /// Alpha-effect strength R_α.
    pub ra: f64,
    /// Differential-rotation strength R_ω.
    pub ro: f64,
    pub dynamo_type: DynamoType,
}

impl DynamoNumbers {
    pub fn new(ra: f64, ro: f64, dynamo_type: DynamoType) -> DynamoResult<Self> {
        let numbers = DynamoNumbers {
            ra,
            ro,
            dynamo_type,
        };
        numbers.validate()?;
        Ok(numbers)
    }

    pub fn validate(&self) -> DynamoResult<()> {
        if !self.ra.is_finite() || !self.ro.is_finite() {
            return Err(DynamoError::ConfigError(format!(
                "dynamo numbers must be finite, got Ra={}, Ro={}",
                self.ra, self.ro
            )));
        }
        Ok(())
    }
}

/// Behaviour of Simpson's rule on an axis with an even number of samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvenAxisPolicy {
    /// Use the averaged Simpson variant and record a numerical warning.
    #[default]
    Warn,
    /// Refuse the grid with a configuration error.
    Reject,
}

/// Evaluation strategy for the independent coupling-matrix entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionBackend {
    #[default]
    Serial,
    /// Rayon thread pool, one task per (i, j) pair.
    Threaded,
}

/// Spherical integration grid for the Galerkin projection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GalerkinGridConfig {
    #[serde(default = "default_r_range")]
    pub r_range: [f64; 2],
    #[serde(default = "default_theta_range")]
    pub theta_range: [f64; 2],
    /// Zero-width φ range implies axisymmetry.
    #[serde(default = "default_phi_range")]
    pub phi_range: [f64; 2],
    /// `[nr, ntheta, nphi]`; odd counts keep Simpson's rule exact in order.
    #[serde(default = "default_resolution")]
    pub resolution: [usize; 3],
}

fn default_r_range() -> [f64; 2] {
    [1e-4, 2.0]
}
fn default_theta_range() -> [f64; 2] {
    [0.1, std::f64::consts::PI]
}
fn default_phi_range() -> [f64; 2] {
    [0.0, 0.0]
}
fn default_resolution() -> [usize; 3] {
    [251, 251, 1]
}

impl Default for GalerkinGridConfig {
    fn default() -> Self {
        GalerkinGridConfig {
            r_range: default_r_range(),
            theta_range: default_theta_range(),
            phi_range: default_phi_range(),
            resolution: default_resolution(),
        }
    }
}

impl GalerkinGridConfig {
    pub fn create_grid(&self) -> DynamoResult<SphericalGrid> {
        let resolution = if self.phi_range[1] == self.phi_range[0] {
            [self.resolution[0], self.resolution[1], 1]
        } else {
            self.resolution
        };
        SphericalGrid::new(resolution, self.r_range, self.theta_range, self.phi_range)
    }
}

/// Parameters of the built-in rotation curve.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RotationProfileConfig {
    /// Asymptotic rotation speed.
    #[serde(default = "default_v0")]
    pub v0: f64,
    /// Turnover scale, in units of `r_h`.
    #[serde(default = "default_s_v")]
    pub s_v: f64,
    /// Halo radius.
    #[serde(default = "default_r_h")]
    pub r_h: f64,
}

fn default_v0() -> f64 {
    1.0
}
fn default_s_v() -> f64 {
    0.5
}
fn default_r_h() -> f64 {
    1.0
}

impl Default for RotationProfileConfig {
    fn default() -> Self {
        RotationProfileConfig {
            v0: default_v0(),
            s_v: default_s_v(),
            r_h: default_r_h(),
        }
    }
}

/// Parameters of the built-in alpha profile.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AlphaProfileConfig {
    #[serde(default = "default_alpha0")]
    pub alpha0: f64,
}

fn default_alpha0() -> f64 {
    1.0
}

impl Default for AlphaProfileConfig {
    fn default() -> Self {
        AlphaProfileConfig {
            alpha0: default_alpha0(),
        }
    }
}

/// Top-level halo dynamo configuration. Every field has a documented
/// default so partial JSON files are accepted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HaloDynamoConfig {
    /// Symmetric (true) or antisymmetric (false) mode family.
    #[serde(default = "default_symmetric_field")]
    pub symmetric_field: bool,
    #[serde(default = "default_n_free_decay_modes")]
    pub n_free_decay_modes: usize,
    #[serde(default = "default_dynamo_type")]
    pub dynamo_type: DynamoType,
    #[serde(default = "default_dynamo_number")]
    pub ra: f64,
    #[serde(default = "default_dynamo_number")]
    pub ro: f64,
    #[serde(default)]
    pub grid: GalerkinGridConfig,
    #[serde(default)]
    pub rotation: RotationProfileConfig,
    #[serde(default)]
    pub alpha: AlphaProfileConfig,
    #[serde(default)]
    pub even_axis_policy: EvenAxisPolicy,
    #[serde(default = "default_max_eigenvector_condition")]
    pub max_eigenvector_condition: f64,
    /// Keep the coupling matrix W in the result.
    #[serde(default)]
    pub return_matrix: bool,
    /// Report only eigenmodes with a positive growth rate.
    #[serde(default)]
    pub growing_mode_only: bool,
    #[serde(default)]
    pub backend: ExecutionBackend,
}

fn default_symmetric_field() -> bool {
    true
}
fn default_n_free_decay_modes() -> usize {
    4
}
fn default_dynamo_type() -> DynamoType {
    DynamoType::AlphaOmega
}
fn default_dynamo_number() -> f64 {
    1.0
}
fn default_max_eigenvector_condition() -> f64 {
    1e8
}

impl Default for HaloDynamoConfig {
    fn default() -> Self {
        HaloDynamoConfig {
            symmetric_field: default_symmetric_field(),
            n_free_decay_modes: default_n_free_decay_modes(),
            dynamo_type: default_dynamo_type(),
            ra: default_dynamo_number(),
            ro: default_dynamo_number(),
            grid: GalerkinGridConfig::default(),
            rotation: RotationProfileConfig::default(),
            alpha: AlphaProfileConfig::default(),
            even_axis_policy: EvenAxisPolicy::default(),
            max_eigenvector_condition: default_max_eigenvector_condition(),
            return_matrix: false,
            growing_mode_only: false,
            backend: ExecutionBackend::default(),
        }
    }
}

impl HaloDynamoConfig {
    /// Load from a JSON file and validate.
    pub fn from_file(path: &str) -> DynamoResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn dynamo_numbers(&self) -> DynamoNumbers {
        DynamoNumbers {
            ra: self.ra,
            ro: self.ro,
            dynamo_type: self.dynamo_type,
        }
    }

    /// Check every field; grid ranges are checked again by `SphericalGrid::new`.
    pub fn validate(&self) -> DynamoResult<()> {
        if self.n_free_decay_modes == 0 || self.n_free_decay_modes > MODES_PER_FAMILY {
            return Err(DynamoError::ConfigError(format!(
                "n_free_decay_modes must be in 1..={MODES_PER_FAMILY}, got {}",
                self.n_free_decay_modes
            )));
        }
        self.dynamo_numbers().validate()?;

        let [nr, ntheta, _] = self.grid.resolution;
        if nr < 3 || ntheta < 3 {
            return Err(DynamoError::ConfigError(format!(
                "Galerkin grid needs >= 3 samples in r and theta, got {:?}",
                self.grid.resolution
            )));
        }
        if self.grid.r_range[0] <= 0.0 {
            return Err(DynamoError::ConfigError(format!(
                "Galerkin grid r_min must be > 0, got {}",
                self.grid.r_range[0]
            )));
        }
        if self.even_axis_policy == EvenAxisPolicy::Reject {
            let phi_samples = if self.grid.phi_range[1] == self.grid.phi_range[0] {
                1
            } else {
                self.grid.resolution[2]
            };
            for (name, n) in [("r", nr), ("theta", ntheta), ("phi", phi_samples)] {
                if n > 1 && n % 2 == 0 {
                    return Err(DynamoError::ConfigError(format!(
                        "Simpson's rule needs an odd sample count on {name}, got {n}"
                    )));
                }
            }
        }

        let rot = &self.rotation;
        if !(rot.v0.is_finite() && rot.s_v > 0.0 && rot.r_h > 0.0) {
            return Err(DynamoError::ConfigError(format!(
                "rotation profile needs finite v0 and s_v, r_h > 0, got {rot:?}"
            )));
        }
        if !self.alpha.alpha0.is_finite() {
            return Err(DynamoError::ConfigError(
                "alpha0 must be finite".to_string(),
            ));
        }
        if !self.max_eigenvector_condition.is_finite() || self.max_eigenvector_condition <= 1.0 {
            return Err(DynamoError::ConfigError(format!(
                "max_eigenvector_condition must be > 1, got {}",
                self.max_eigenvector_condition
            )));
        }
        Ok(())
    }
}

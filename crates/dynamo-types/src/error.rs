// ─────────────────────────────────────────────────────────────────────
// SCPN Halo Dynamo — Errors
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DynamoError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Unsupported free decay mode: symmetry={symmetry}, index={index}")]
    UnsupportedMode { symmetry: String, index: usize },

    #[error("Shape mismatch in {context}: expected {expected:?}, got {found:?}")]
    ShapeMismatch {
        context: String,
        expected: Vec<usize>,
        found: Vec<usize>,
    },

    #[error("Domain error: {0}")]
    DomainError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Linear algebra error: {0}")]
    LinAlg(String),
}

impl DynamoError {
    /// True for errors raised before any numerical work: bad parameters,
    /// unknown modes and inconsistent array shapes.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            DynamoError::ConfigError(_)
                | DynamoError::UnsupportedMode { .. }
                | DynamoError::ShapeMismatch { .. }
                | DynamoError::Json(_)
        )
    }
}

pub type DynamoResult<T> = Result<T, DynamoError>;

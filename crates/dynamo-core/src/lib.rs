// ─────────────────────────────────────────────────────────────────────
// SCPN Halo Dynamo — Core
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Galactic halo dynamo: free decay modes and Galerkin growth rates.
//!
//! modes → perturbation (with profiles) → galerkin

pub mod galerkin;
pub mod modes;
pub mod perturbation;
pub mod profiles;

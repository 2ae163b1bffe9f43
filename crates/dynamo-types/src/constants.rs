// ─────────────────────────────────────────────────────────────────────
// SCPN Halo Dynamo — Constants
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Physical constants of the free decay mode basis.
//!
//! Wavenumbers are roots of spherical Bessel functions j_n. Only these
//! exact roots make the interior and exterior solutions match at r = 1;
//! the three-digit values quoted in the literature (4.493, 5.763, 6.988)
//! leave a ~1e-3 jump in B_θ at the boundary.

/// First root of j_0: π.
pub const J0_ROOT_1: f64 = std::f64::consts::PI;

/// Second root of j_0: 2π.
pub const J0_ROOT_2: f64 = 2.0 * std::f64::consts::PI;

/// First root of j_1 (tan x = x).
pub const J1_ROOT_1: f64 = 4.493_409_457_909_064;

/// First root of j_2.
pub const J2_ROOT_1: f64 = 5.763_459_196_894_550;

/// First root of j_3.
pub const J3_ROOT_1: f64 = 6.987_932_000_500_520;

/// Normalization constants C of the antisymmetric modes a_1..a_4.
pub const ANTISYMMETRIC_NORMALIZATION: [f64; 4] = [0.346, 0.250, 3.445, 0.244];

/// Normalization constants C of the symmetric modes s_1..s_4.
pub const SYMMETRIC_NORMALIZATION: [f64; 4] = [0.662, 1.330, 0.339, 0.540];

/// Number of enumerated modes per symmetry family.
pub const MODES_PER_FAMILY: usize = 4;

// ─────────────────────────────────────────────────────────────────────
// SCPN Halo Dynamo — Property-Based Tests (proptest) for dynamo-core
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Property-based tests for dynamo-core using proptest.
//!
//! Covers: mode continuity and parity, pointwise evaluation, the
//! perturbation operator's dependence on the dynamo numbers, and the
//! coupling-matrix diagonal.

use dynamo_core::galerkin::{GalerkinOptions, GalerkinSolver};
use dynamo_core::modes::{
    evaluate_exterior, evaluate_interior, evaluate_mode_with, evaluate_on_grid, evaluate_point,
    ModeDescriptor, ModeParams, ModeParity, ModeSymmetry,
};
use dynamo_core::perturbation::perturbation_operator;
use dynamo_core::profiles::{sample_alpha, sample_rotation, SimpleAlpha, SimpleRotation};
use dynamo_types::config::{DynamoNumbers, DynamoType};
use dynamo_types::state::SphericalGrid;
use ndarray::Array1;
use proptest::prelude::*;
use std::f64::consts::PI;

fn any_mode() -> impl Strategy<Value = ModeDescriptor> {
    (any::<bool>(), 1usize..=4).prop_map(|(symmetric, index)| {
        ModeDescriptor::new(ModeSymmetry::from_symmetric_flag(symmetric), index).unwrap()
    })
}

fn any_dynamo_type() -> impl Strategy<Value = DynamoType> {
    prop_oneof![Just(DynamoType::AlphaOmega), Just(DynamoType::Alpha2Omega)]
}

// ── Mode Library Properties ──────────────────────────────────────────

proptest! {
    /// Interior and exterior solutions agree on the unit sphere.
    #[test]
    fn modes_continuous_at_unit_sphere(mode in any_mode(), theta in 0.0f64..PI) {
        let p = mode.default_params();
        let inside = evaluate_interior(mode, &p, 1.0, theta);
        let outside = evaluate_exterior(mode, &p, 1.0, theta);
        for c in 0..3 {
            let scale = inside[c].abs().max(outside[c].abs()).max(1e-12);
            prop_assert!((inside[c] - outside[c]).abs() / scale < 1e-6,
                "{} component {}: {} vs {}", mode, c, inside[c], outside[c]);
        }
    }

    /// Toroidal modes are purely azimuthal, poloidal modes purely meridional.
    #[test]
    fn modes_respect_parity(mode in any_mode(), r in 1e-6f64..2.0, theta in 0.1f64..PI) {
        let b = evaluate_point(mode, &mode.default_params(), r, theta);
        match mode.parity() {
            ModeParity::Toroidal => {
                prop_assert_eq!(b[0], 0.0);
                prop_assert_eq!(b[1], 0.0);
            }
            ModeParity::Poloidal => prop_assert_eq!(b[2], 0.0),
        }
    }

    /// No NaN or Inf anywhere in (0, 2] × (0.1, π).
    #[test]
    fn modes_finite(mode in any_mode(), r in 1e-12f64..=2.0, theta in 0.1f64..PI) {
        let b = evaluate_point(mode, &mode.default_params(), r, theta);
        prop_assert!(b.iter().all(|v| v.is_finite()), "{} at r={} theta={}: {:?}", mode, r, theta, b);
    }

    /// The field scales linearly with the normalization constant.
    #[test]
    fn modes_linear_in_normalization(mode in any_mode(), c in -5.0f64..5.0, r in 0.01f64..2.0, theta in 0.1f64..PI) {
        let k = mode.default_params().k;
        let unit = evaluate_point(mode, &ModeParams::new(1.0, k).unwrap(), r, theta);
        let scaled = evaluate_point(mode, &ModeParams::new(c, k).unwrap(), r, theta);
        for i in 0..3 {
            prop_assert!((scaled[i] - c * unit[i]).abs() <= 1e-12 * (1.0 + (c * unit[i]).abs()));
        }
    }

    /// Array evaluation is the pointwise map: no coupling between indices.
    #[test]
    fn array_evaluation_is_pointwise(
        mode in any_mode(),
        points in prop::collection::vec((0.01f64..2.0, 0.1f64..PI), 1..20),
    ) {
        let r: Array1<f64> = points.iter().map(|p| p.0).collect();
        let theta: Array1<f64> = points.iter().map(|p| p.1).collect();
        let phi = Array1::zeros(points.len());
        let p = mode.default_params();
        let b = evaluate_mode_with(mode, &p, &r, &theta, &phi).unwrap();
        for (i, &(rv, tv)) in points.iter().enumerate() {
            let expected = evaluate_point(mode, &p, rv, tv);
            prop_assert_eq!([b.r[i], b.theta[i], b.phi[i]], expected);
        }
    }

    /// r <= 0 anywhere is a domain error.
    #[test]
    fn nonpositive_radius_rejected(mode in any_mode(), bad in -2.0f64..=0.0) {
        let r = Array1::from(vec![0.5, bad]);
        let theta = Array1::from(vec![1.0, 1.0]);
        let phi = Array1::zeros(2);
        prop_assert!(evaluate_mode_with(mode, &mode.default_params(), &r, &theta, &phi).is_err());
    }
}

// ── Perturbation Operator Properties ─────────────────────────────────

fn small_grid() -> SphericalGrid {
    SphericalGrid::new([15, 15, 1], [0.05, 2.0], [0.1, PI], [0.0, 0.0]).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Both operator variants differ by Ra·curl(αB)_φ in every component,
    /// which is recovered as the azimuthal output difference.
    #[test]
    fn operator_variants_differ_by_azimuthal_alpha_term(
        mode in any_mode(),
        ra in -10.0f64..10.0,
        ro in -50.0f64..50.0,
    ) {
        let g = small_grid();
        let b = evaluate_on_grid(mode, &mode.default_params(), &g).unwrap();
        let alpha = sample_alpha(&SimpleAlpha { alpha0: 1.0 }, &g).unwrap();
        let v = sample_rotation(&SimpleRotation { v0: 1.0, s_v: 0.5, r_h: 1.0 }, &g).unwrap();
        let ao = perturbation_operator(&g, &b, &alpha, &v,
            &DynamoNumbers::new(ra, ro, DynamoType::AlphaOmega).unwrap()).unwrap();
        let a2 = perturbation_operator(&g, &b, &alpha, &v,
            &DynamoNumbers::new(ra, ro, DynamoType::Alpha2Omega).unwrap()).unwrap();
        let d_phi = &a2.phi - &ao.phi;
        for (x2, xo) in [(&a2.r, &ao.r), (&a2.theta, &ao.theta)] {
            for ((&p2, &po), &dp) in x2.iter().zip(xo.iter()).zip(d_phi.iter()) {
                let scale = 1.0 + p2.abs() + po.abs() + dp.abs();
                prop_assert!(((p2 - po) - dp).abs() <= 1e-9 * scale);
            }
        }
    }

    /// Ra = Ro = 0 switches the operator off.
    #[test]
    fn operator_vanishes_without_dynamo_numbers(mode in any_mode(), kind in any_dynamo_type()) {
        let g = small_grid();
        let b = evaluate_on_grid(mode, &mode.default_params(), &g).unwrap();
        let alpha = sample_alpha(&SimpleAlpha { alpha0: 2.0 }, &g).unwrap();
        let v = sample_rotation(&SimpleRotation { v0: 3.0, s_v: 0.2, r_h: 1.0 }, &g).unwrap();
        let w = perturbation_operator(&g, &b, &alpha, &v,
            &DynamoNumbers::new(0.0, 0.0, kind).unwrap()).unwrap();
        prop_assert!(w.components().iter().all(|c| c.iter().all(|&x| x == 0.0)));
    }
}

// ── Galerkin Properties ──────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(12))]

    /// The diagonal of W is γ_i regardless of the dynamo numbers.
    #[test]
    fn coupling_diagonal_is_gamma(
        symmetric in any::<bool>(),
        count in 1usize..=4,
        ra in -20.0f64..20.0,
        ro in -100.0f64..100.0,
        kind in any_dynamo_type(),
    ) {
        let symmetry = ModeSymmetry::from_symmetric_flag(symmetric);
        let modes = ModeDescriptor::leading(symmetry, count).unwrap();
        let solver = GalerkinSolver::new(
            small_grid(),
            modes.clone(),
            DynamoNumbers::new(ra, ro, kind).unwrap(),
            GalerkinOptions::default(),
        ).unwrap();
        let (w, _) = solver
            .coupling_matrix(&SimpleAlpha { alpha0: 1.0 }, &SimpleRotation { v0: 1.0, s_v: 0.5, r_h: 1.0 })
            .unwrap();
        prop_assert_eq!(w.dim(), (count, count));
        for (i, mode) in modes.iter().enumerate() {
            prop_assert_eq!(w[[i, i]], mode.default_params().gamma());
        }
        prop_assert!(w.iter().all(|x| x.is_finite()));
    }
}

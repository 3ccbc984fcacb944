// tests/ou_process_test.rs
use exact_sde::models::{sde_ou, ExactProcess, OuProcess};
use exact_sde::options::{OutputRequest, SdeOptions};
use exact_sde::rng::{NormalSource, RandomSource};
use exact_sde::{GeneratorViolation, Precision, RealVec, SdeError};
use ndarray::Array2;
use std::cell::Cell;
use std::rc::Rc;

fn grid(steps: usize, dt: f64) -> Vec<f64> {
    (0..=steps).map(|i| i as f64 * dt).collect()
}

/// Generator that records how often it is called and then returns zeros
fn counting_zeros(calls: Rc<Cell<usize>>) -> impl FnMut(usize, usize) -> Array2<f64> {
    move |count: usize, width: usize| {
        calls.set(calls.get() + 1);
        Array2::zeros((count, width))
    }
}

struct Throwing;

impl RandomSource for Throwing {
    fn generate(&mut self, _count: usize, _width: usize) -> Result<Array2<f64>, String> {
        Err("this generator always fails".to_string())
    }
}

#[test]
fn test_zero_draws_give_pure_decay() {
    let t = grid(100, 0.01);
    let calls = Rc::new(Cell::new(0));
    let mut options = SdeOptions::new().with_rand_fn(counting_zeros(calls.clone()));

    let sol = sde_ou(4.0, 0.0, 0.25, t.clone(), 1.0, &mut options).expect("valid inputs");

    assert_eq!(calls.get(), 1, "one batched draw per run");
    assert_eq!(sol.len(), 101);
    for (i, &ti) in t.iter().enumerate() {
        assert_eq!(sol.y[[i, 0]], (-4.0 * ti).exp(), "row {}", i);
    }
}

#[test]
fn test_zero_diffusion_never_invokes_generator() {
    let t = grid(50, 0.02);
    let mut options = SdeOptions::new()
        .with_rand_fn(Throwing)
        .with_outputs(OutputRequest::NOISE);

    let sol = sde_ou([1.0, 3.0], [0.5, -0.5], 0.0, t.clone(), [2.0, 1.0], &mut options)
        .expect("generator must not be called");

    for (i, &ti) in t.iter().enumerate() {
        assert_eq!(sol.y[[i, 0]], (-1.0 * ti).exp() * (2.0 - 0.5) + 0.5);
        assert_eq!(sol.y[[i, 1]], (-3.0 * ti).exp() * (1.0 + 0.5) - 0.5);
    }
    assert!(sol.w.unwrap().iter().all(|&v| v == 0.0));
}

#[test]
fn test_throwing_generator_is_reported() {
    let mut options = SdeOptions::new().with_rand_fn(Throwing);
    let err = sde_ou(1.0, 0.0, 0.5, grid(10, 0.1), 0.0, &mut options);
    assert!(matches!(
        err,
        Err(SdeError::RandGeneratorContractViolation(
            GeneratorViolation::Failed { .. }
        ))
    ));
}

#[test]
fn test_wrong_shape_generator_is_reported() {
    let narrow = |count: usize, _width: usize| Array2::<f64>::zeros((count, 1));
    let mut options = SdeOptions::new().with_rand_fn(narrow);
    let err = sde_ou(1.0, 0.0, [0.5, 0.5], grid(10, 0.1), [0.0, 0.0], &mut options);
    match err {
        Err(SdeError::RandGeneratorContractViolation(GeneratorViolation::ShapeMismatch {
            expected,
            found,
        })) => {
            assert_eq!(expected, (10, 2));
            assert_eq!(found, (10, 1));
        }
        other => panic!("expected ShapeMismatch, got {:?}", other.map(|s| s.len())),
    }
}

#[test]
fn test_same_seed_reproduces_path_bit_for_bit() {
    let t = grid(200, 0.005);
    let run = || {
        let mut options = SdeOptions::new()
            .with_seed(2024)
            .with_outputs(OutputRequest::NOISE);
        sde_ou([0.7, 0.0, 2.0], 1.0, [0.3, 0.2, 0.0], t.clone(), [0.0, 1.0, 2.0], &mut options)
            .expect("valid inputs")
    };

    let a = run();
    let b = run();
    assert_eq!(a.y, b.y);
    assert_eq!(a.w, b.w);
}

#[test]
fn test_scalar_and_broadcast_coefficients_agree() {
    let t = grid(40, 0.025);
    let y0 = [1.0f64, -2.0, 0.5];
    let thetas: [RealVec; 4] = [
        RealVec::from(2.0),
        RealVec::from(0.0),
        RealVec::from([2.0, 0.0, 2.0]),
        RealVec::from([0.0, 2.0, 0.0]),
    ];
    let sigmas: [RealVec; 3] = [
        RealVec::from(0.3),
        RealVec::from(0.0),
        RealVec::from([0.3, 0.0, 0.3]),
    ];

    for theta in &thetas {
        for sigma in &sigmas {
            let as_vector = |c: &RealVec| -> RealVec {
                if c.len() == 1 {
                    RealVec::from(vec![c.values()[0]; 3])
                } else {
                    c.clone()
                }
            };
            let run = |theta: RealVec, mu: RealVec, sigma: RealVec| {
                let mut options = SdeOptions::new()
                    .with_rand_fn(NormalSource::from_seed(77))
                    .with_outputs(OutputRequest::NOISE);
                OuProcess::new(theta, mu, sigma)
                    .unwrap()
                    .simulate(&RealVec::from(t.clone()), &RealVec::from(y0), &mut options)
                    .unwrap()
            };

            let scalar = run(theta.clone(), RealVec::from(0.25), sigma.clone());
            let vector = run(as_vector(theta), RealVec::from([0.25; 3]), as_vector(sigma));
            assert_eq!(scalar.y, vector.y, "theta={:?} sigma={:?}", theta, sigma);
            assert_eq!(scalar.w, vector.w, "theta={:?} sigma={:?}", theta, sigma);
        }
    }
}

#[test]
fn test_first_row_is_initial_condition() {
    let mut options = SdeOptions::new().with_seed(5);
    let y0 = [0.1f64, 0.2, 0.3];
    let sol = sde_ou([1.0, 0.0, 5.0], 0.7, [0.2, 0.4, 0.0], grid(20, 0.05), y0, &mut options)
        .unwrap();
    for k in 0..3 {
        assert_eq!(sol.y[[0, k]], y0[k]);
    }
}

#[test]
fn test_backward_grid_runs_decay_in_reverse() {
    let t: Vec<f64> = (0..=10).rev().map(|i| i as f64 * 0.1).collect();
    let mut options = SdeOptions::new();
    let sol = sde_ou(1.0, 0.0, 0.0, t.clone(), 1.0, &mut options).unwrap();

    let last = sol.len() - 1;
    assert!((sol.y[[last, 0]] - 1.0f64.exp()).abs() < 1e-12);
}

#[test]
fn test_mixed_precision_warns_but_succeeds() {
    let mut options = SdeOptions::new().with_seed(1);
    let sol = sde_ou(2.0f32, 0.0, 0.1, grid(10, 0.1), 1.0, &mut options).unwrap();

    assert_eq!(sol.precision, Precision::Double);
    assert_eq!(sol.warnings.len(), 1);
    assert!(matches!(
        sol.warnings[0],
        SdeError::PrecisionInconsistency { promoted: Precision::Double, .. }
    ));
}

#[test]
fn test_single_precision_inputs_give_single_precision_outputs() {
    let t: Vec<f32> = (0..=10).map(|i| i as f32 * 0.1).collect();
    let mut options = SdeOptions::new().with_seed(1);
    let sol = sde_ou(2.0f32, 0.5f32, 0.1f32, t, 1.0f32, &mut options).unwrap();

    assert_eq!(sol.precision, Precision::Single);
    assert!(sol.warnings.is_empty());
    assert!(sol.y.iter().all(|&v| v as f32 as f64 == v));
}

#[test]
fn test_exact_moments_helpers() {
    let ou = OuProcess::new(2.0, 0.5, 0.4).unwrap();
    assert!((ou.exact_mean(0, 1.5, 1.0) - ((-2.0f64).exp() + 0.5)).abs() < 1e-15);
    let expected_var = 0.16 / 4.0 * (1.0 - (-4.0f64).exp());
    assert!((ou.exact_variance(0, 1.0) - expected_var).abs() < 1e-15);
}

#[test]
fn test_closed_form_round_trips_through_noise() {
    // Non-uniform grid with a non-zero start
    let t = vec![0.5, 0.55, 0.7, 0.71, 1.2, 1.25, 2.0, 3.5];
    let (theta, mu, sigma, y0) = (1.3f64, 0.4f64, 0.6f64, 0.2f64);
    let mut options = SdeOptions::new()
        .with_seed(31)
        .with_outputs(OutputRequest::NOISE);

    let sol = sde_ou(theta, mu, sigma, t.clone(), y0, &mut options).unwrap();
    let w = sol.w.expect("noise requested");
    assert!(w.iter().any(|&v| v != 0.0));

    for (i, &ti) in t.iter().enumerate() {
        let decay = (-theta * (ti - t[0])).exp();
        let closed =
            decay * (y0 - mu) + mu + decay * sigma / (2.0 * theta).sqrt() * w[[i, 0]];
        assert!(
            (sol.y[[i, 0]] - closed).abs() < 1e-12,
            "row {}: {} vs {}",
            i,
            sol.y[[i, 0]],
            closed
        );
    }
}

#[test]
fn test_fast_reversion_over_long_horizon_stays_finite() {
    let t = grid(100, 0.1);
    let mut options = SdeOptions::new()
        .with_seed(1)
        .with_outputs(OutputRequest::NOISE);

    let sol = sde_ou(50.0, 0.0, 1.0, t.clone(), 1.0, &mut options).unwrap();

    let bad: Vec<usize> = (0..sol.len())
        .filter(|&i| !sol.y[[i, 0]].is_finite())
        .collect();
    assert!(bad.is_empty(), "non-finite rows: {:?}", bad);
    assert_eq!(sol.y[[0, 0]], 1.0);

    // The noise column holds the discounted path e^{-θτ} W
    let w = sol.w.unwrap();
    assert!(w.iter().all(|v| v.is_finite()));
    for (i, &ti) in t.iter().enumerate() {
        let closed = (-50.0 * ti).exp() * 1.0 + 1.0 / 100.0f64.sqrt() * w[[i, 0]];
        assert!((sol.y[[i, 0]] - closed).abs() < 1e-12, "row {}", i);
    }
}

#[test]
fn test_fast_reversion_matches_between_scalar_and_vector_rates() {
    let t = grid(100, 0.1);
    let run = |theta: RealVec| {
        let mut options = SdeOptions::new()
            .with_seed(8)
            .with_outputs(OutputRequest::NOISE);
        OuProcess::new(theta, 0.5, 0.2)
            .unwrap()
            .simulate(&RealVec::from(t.clone()), &RealVec::from([0.0f64, 1.0]), &mut options)
            .unwrap()
    };

    let scalar = run(RealVec::from(50.0));
    let vector = run(RealVec::from([50.0f64, 50.0]));
    assert_eq!(scalar.y, vector.y);
    assert_eq!(scalar.w, vector.w);
}

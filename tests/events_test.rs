// tests/events_test.rs
use exact_sde::events::{Direction, EventLocation, EventValues, PerEvent};
use exact_sde::models::{sde_bm, sde_ou};
use exact_sde::options::{OutputRequest, SdeOptions};
use exact_sde::SdeError;
use ndarray::{array, Array2, ArrayView1};

fn unit_grid(steps: usize) -> Vec<f64> {
    (0..=steps).map(|i| i as f64).collect()
}

fn level(threshold: f64) -> impl FnMut(f64, ArrayView1<f64>) -> EventValues {
    move |_t: f64, y: ArrayView1<f64>| EventValues::terminal(y[0] - threshold)
}

#[test]
fn test_terminal_event_truncates_path() {
    let mut options = SdeOptions::new()
        .with_events(level(4.5))
        .with_outputs(OutputRequest::EVENTS);

    let sol = sde_bm(1.0, 0.0, unit_grid(10), 0.0, &mut options).unwrap();

    assert!(sol.terminated);
    assert_eq!(sol.len(), 6);
    assert_eq!(sol.t[5], 5.0);
    assert_eq!(sol.y[[5, 0]], 5.0);

    let events = sol.events.expect("events requested");
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].time, 5.0);
    assert_eq!(events[0].state, array![5.0]);
    assert_eq!(events[0].index, 0);
    assert_eq!(events[0].step, 5);
}

#[test]
fn test_truncation_applies_to_noise_output() {
    let zeros = |c: usize, d: usize| Array2::<f64>::zeros((c, d));
    let mut options = SdeOptions::new()
        .with_rand_fn(zeros)
        .with_events(level(4.5))
        .with_outputs(OutputRequest::NOISE | OutputRequest::EVENTS);

    let sol = sde_bm(1.0, 0.3, unit_grid(10), 0.0, &mut options).unwrap();

    assert_eq!(sol.len(), 6);
    let w = sol.w.expect("noise requested");
    assert_eq!(w.dim(), (6, 1));
    assert_eq!(sol.events.map(|e| e.len()), Some(1));
}

#[test]
fn test_interpolated_event_location() {
    let mut options = SdeOptions::new()
        .with_events(level(4.5))
        .with_event_location(EventLocation::Interpolated)
        .with_outputs(OutputRequest::EVENTS);

    let sol = sde_bm(1.0, 0.0, unit_grid(10), 0.0, &mut options).unwrap();
    let events = sol.events.clone().unwrap();

    assert!((events[0].time - 4.5).abs() < 1e-12);
    assert!((events[0].state[0] - 4.5).abs() < 1e-12);
    assert_eq!(events[0].step, 5);
    assert_eq!(sol.len(), 6);
}

#[test]
fn test_non_terminal_events_keep_full_path() {
    // Two watched levels, one each way; the falling one never fires on a rising path
    let watch = |_t: f64, y: ArrayView1<f64>| EventValues {
        values: vec![y[0] - 2.5, y[0] - 7.5, y[0] - 3.5],
        terminal: PerEvent::All(false),
        direction: PerEvent::Each(vec![Direction::Rising, Direction::Either, Direction::Falling]),
    };
    let mut options = SdeOptions::new()
        .with_events(watch)
        .with_outputs(OutputRequest::EVENTS);

    let sol = sde_bm(1.0, 0.0, unit_grid(10), 0.0, &mut options).unwrap();

    assert!(!sol.terminated);
    assert_eq!(sol.len(), 11);
    let found: Vec<(usize, usize)> = sol
        .events
        .unwrap()
        .iter()
        .map(|e| (e.step, e.index))
        .collect();
    assert_eq!(found, vec![(3, 0), (8, 1)]);
}

#[test]
fn test_events_truncate_even_when_not_returned() {
    let mut options = SdeOptions::new().with_events(level(4.5));

    let sol = sde_bm(1.0, 0.0, unit_grid(10), 0.0, &mut options).unwrap();

    assert!(sol.terminated);
    assert_eq!(sol.len(), 6);
    assert!(sol.events.is_none());
}

#[test]
fn test_events_on_decaying_ou_path() {
    // y = 2 e^{-t} falls through 1 between t = 0.6 and t = 0.7
    let t: Vec<f64> = (0..=20).map(|i| i as f64 * 0.1).collect();
    let falling = |_t: f64, y: ArrayView1<f64>| EventValues {
        values: vec![y[0] - 1.0],
        terminal: PerEvent::All(true),
        direction: PerEvent::All(Direction::Falling),
    };
    let mut options = SdeOptions::new()
        .with_events(falling)
        .with_outputs(OutputRequest::EVENTS);

    let sol = sde_ou(1.0, 0.0, 0.0, t, 2.0, &mut options).unwrap();
    let events = sol.events.clone().unwrap();

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].step, 7);
    assert_eq!(sol.len(), 8);
    assert!(sol.y[[7, 0]] <= 1.0 && sol.y[[6, 0]] > 1.0);
}

#[test]
fn test_events_requested_without_function() {
    let mut options = SdeOptions::new().with_outputs(OutputRequest::EVENTS);
    let result = sde_ou(1.0, 0.0, 0.1, unit_grid(3), 0.0, &mut options);
    assert!(matches!(
        result,
        Err(SdeError::TooManyOutputsRequested { .. })
    ));
}

#[test]
fn test_event_function_contract_violation() {
    let mut calls = 0;
    let unstable = move |_t: f64, _y: ArrayView1<f64>| {
        calls += 1;
        EventValues {
            values: if calls > 2 { vec![1.0, 1.0] } else { vec![1.0] },
            terminal: PerEvent::All(false),
            direction: PerEvent::All(Direction::Either),
        }
    };
    let mut options = SdeOptions::new().with_events(unstable);
    let result = sde_bm(1.0, 0.0, unit_grid(5), 0.0, &mut options);
    assert!(matches!(
        result,
        Err(SdeError::EventFunctionContract { .. })
    ));
}

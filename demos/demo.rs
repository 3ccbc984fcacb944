// demos/demo.rs
use exact_sde::ensemble::{simulate_ensemble, EnsembleConfig};
use exact_sde::events::{EventLocation, EventValues};
use exact_sde::math_utils::Timer;
use exact_sde::models::{sde_bm, sde_ou, ExactProcess, OuProcess};
use exact_sde::options::{OutputRequest, SdeOptions};
use exact_sde::output;
use ndarray::ArrayView1;

fn main() {
    let args: Vec<String> = std::env::args().collect();
    if args.len() > 1 && args[1] == "--ensemble" {
        run_ensemble();
    } else {
        run_demo_mode();
    }
}

fn run_demo_mode() {
    println!("Running exact-sde Demo\n");

    let tspan: Vec<f64> = (0..=1000).map(|i| i as f64 * 0.005).collect();

    let mut options = SdeOptions::new()
        .with_seed(42)
        .with_outputs(OutputRequest::NOISE);
    let ou = sde_ou([4.0, 0.5], [0.0, 1.0], [0.25, 0.5], tspan.clone(), [1.0, -1.0], &mut options)
        .expect("valid OU inputs");
    println!(
        "OU path: {} samples, final state {:?}",
        ou.len(),
        ou.final_state().to_vec()
    );
    output::write_solution_csv("ou_path.csv", &ou).expect("could not write ou_path.csv");

    // Drifted Brownian motion that stops the first time it reaches 2
    let hit_two = |_t: f64, y: ArrayView1<f64>| EventValues::terminal(y[0] - 2.0);
    let mut options = SdeOptions::new()
        .with_seed(7)
        .with_events(hit_two)
        .with_event_location(EventLocation::Interpolated)
        .with_outputs(OutputRequest::NOISE | OutputRequest::EVENTS);
    let bm = sde_bm(0.8, 0.6, tspan, 0.0, &mut options).expect("valid BM inputs");
    match bm.events.as_deref() {
        Some([first, ..]) => println!(
            "BM path hit 2.0 at t = {:.4} (sample {}), {} samples kept",
            first.time,
            first.step,
            bm.len()
        ),
        _ => println!("BM path never reached 2.0"),
    }
    output::write_solution_csv("bm_path.csv", &bm).expect("could not write bm_path.csv");
    if let Some(events) = &bm.events {
        output::write_events_csv("bm_events.csv", events).expect("could not write bm_events.csv");
    }

    println!("\nResults written to ou_path.csv, bm_path.csv and bm_events.csv");
}

fn run_ensemble() {
    let ou = OuProcess::new(2.0, 0.5, 0.4).expect("valid OU parameters");
    let tspan: Vec<f64> = (0..=50).map(|i| i as f64 * 0.02).collect();
    let cfg = EnsembleConfig {
        paths: 100_000,
        ..Default::default()
    };

    let timer = Timer::new();
    let ensemble = simulate_ensemble(&ou, tspan, 1.5, &cfg).expect("valid ensemble");
    let elapsed = timer.elapsed_ms() / 1000.0;
    let summary = ensemble.summary();

    println!("Paths:            {}", summary.paths);
    println!(
        "Mean at t = 1:    {:.6} ± {:.6} (exact {:.6})",
        summary.mean[0],
        summary.std_error(0),
        ou.exact_mean(0, 1.5, 1.0)
    );
    println!(
        "Variance at t = 1: {:.6} (exact {:.6})",
        summary.variance[0],
        ou.exact_variance(0, 1.0)
    );
    println!("Paths/sec:        {:.0}", summary.paths as f64 / elapsed);
}

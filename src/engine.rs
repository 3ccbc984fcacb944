// src/engine.rs
//! Stages shared by the exact evaluators: the batched random draw at the
//! start of a run and the precision/event/output handling at its end.

use crate::args::{Precision, SolveArgs};
use crate::error::SdeResult;
use crate::events::{scan_events, ZeroCrossing};
use crate::increments::place_draws;
use crate::options::{OutputRequest, SdeOptions};
use crate::params::{Coverage, RegimeTable};
use crate::rng::{guarded_draw, NormalSource};
use crate::solution::Solution;
use ndarray::{Array1, Array2};
use tracing::{debug, trace, warn};

/// Allocate the `M x N` noise buffer and fill its noise-active columns with raw draws.
///
/// The generator is not touched when no dimension carries diffusion.
pub(crate) fn draw_noise(
    args: &SolveArgs,
    table: &RegimeTable,
    options: &mut SdeOptions,
) -> SdeResult<Array2<f64>> {
    let mut w = Array2::zeros((args.samples(), args.n));
    if table.noise_mask().coverage() == Coverage::None {
        debug!("no diffusion-active dimensions, skipping random draws");
        return Ok(w);
    }

    let columns = table.noise_columns();
    trace!(
        steps = args.steps(),
        width = columns.len(),
        drift = ?table.drift_mask().coverage(),
        noise = ?table.noise_mask().coverage(),
        user_supplied = options.user_generator(),
        "drawing increments"
    );
    let draws = match options.rand_fn.as_mut() {
        Some(source) => guarded_draw(source.as_mut(), args.steps(), columns.len())?,
        None => {
            let mut source = NormalSource::from_options(options.seed);
            guarded_draw(&mut source, args.steps(), columns.len())?
        }
    };
    place_draws(&mut w, draws.view(), &columns);
    Ok(w)
}

/// Round to the promoted precision, scan for events and assemble the requested outputs
pub(crate) fn finish(
    args: &SolveArgs,
    mut y: Array2<f64>,
    mut w: Array2<f64>,
    options: &mut SdeOptions,
) -> SdeResult<Solution> {
    let mut warnings = Vec::new();
    if let Some(warning) = args.precision_warning() {
        warn!("{}", warning);
        warnings.push(warning);
    }

    let mut t = Array1::from(args.t.clone());
    if args.precision == Precision::Single {
        t.mapv_inplace(|v| Precision::Single.round(v));
        y.mapv_inplace(|v| Precision::Single.round(v));
        w.mapv_inplace(|v| Precision::Single.round(v));
    }

    let mut solution = Solution {
        t,
        y,
        w: options.outputs.contains(OutputRequest::NOISE).then_some(w),
        events: None,
        terminated: false,
        precision: args.precision,
        warnings,
    };

    if let Some(func) = options.events.as_mut() {
        let t0 = solution.t[0];
        let mut detector =
            ZeroCrossing::new(func.as_mut(), options.event_location, t0, solution.y.row(0))?;
        let times = solution.t.to_vec();
        let scan = scan_events(&mut detector, &times, solution.y.view())?;
        debug!(
            found = scan.events.len(),
            terminated_at = ?scan.terminated_at,
            "event scan complete"
        );
        if let Some(last) = scan.terminated_at {
            solution.truncate(last);
        }
        if options.outputs.contains(OutputRequest::EVENTS) {
            solution.events = Some(scan.events);
        }
    }

    Ok(solution)
}

use ndarray::Zip;

use crate::math::stats::StatsHelper;
use crate::prelude::{KernelResult, TraceLayout};
use crate::telemetry::log::LogManager;

/// Scales each trace by its peak absolute amplitude into [-1, 1].
///
/// An all-zero trace is copied through unchanged: the degenerate case is
/// handled by branching, not by a damping term.
pub fn trace_normalize(
    input: &[f32],
    output: &mut [f32],
    layout: &TraceLayout,
) -> KernelResult<()> {
    let traces = layout.view(input)?;
    let mut scaled = layout.view_mut(output)?;

    let logger = LogManager::scoped("traceNormalize");
    logger.record(&format!(
        "traces {} samples {} rms {:.4}",
        layout.traces,
        layout.samples,
        StatsHelper::rms(traces.view())
    ));

    Zip::from(traces.rows())
        .and(scaled.rows_mut())
        .par_for_each(|trace, mut norm| {
            let maxval = StatsHelper::max_abs(trace.view());
            if maxval != 0.0 {
                for j in 0..trace.len() {
                    norm[j] = trace[j] / maxval;
                }
            } else {
                for j in 0..trace.len() {
                    norm[j] = trace[j];
                }
            }
        });

    Ok(())
}

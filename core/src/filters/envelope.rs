use ndarray::Zip;

use crate::math::hilbert::HilbertHelper;
use crate::math::stats::StatsHelper;
use crate::prelude::{KernelResult, TraceLayout};
use crate::telemetry::log::LogManager;

/// Instantaneous-amplitude envelope of each trace.
///
/// Replaces each sample with `sqrt(s[j]^2 + H(s)[j]^2)`, the magnitude of
/// the analytic signal, with `H` the Hilbert transform evaluated through the
/// frequency domain. Each trace is treated as one period of a periodic
/// signal.
pub fn envelope(input: &[f32], output: &mut [f32], layout: &TraceLayout) -> KernelResult<()> {
    let traces = layout.view(input)?;
    let mut amplitudes = layout.view_mut(output)?;

    let logger = LogManager::scoped("envelope");
    logger.record(&format!(
        "traces {} samples {} rms {:.4}",
        layout.traces,
        layout.samples,
        StatsHelper::rms(traces.view())
    ));

    if layout.samples == 0 || layout.traces == 0 {
        return Ok(());
    }

    let helper = HilbertHelper::new(layout.samples);
    Zip::from(traces.rows())
        .and(amplitudes.rows_mut())
        .par_for_each(|trace, amplitude| {
            helper.envelope_into(trace, amplitude);
        });

    Ok(())
}
